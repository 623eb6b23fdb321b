//! Unbounded multi-producer multi-consumer FIFO queue.
//!
//! This is the non-blocking queue from Michael and Scott, "Simple, Fast, and
//! Practical Non-Blocking and Blocking Concurrent Queue Algorithms" (PODC '96).
//! The paper avoids ABA with tagged pointers and a double-width CAS. Here every
//! node is freshly allocated and retired through `crossbeam-epoch`, so a node
//! address cannot be reused while any pinned thread may still hold it.

use std::fmt;
use std::mem::{ManuallyDrop, MaybeUninit};
use std::sync::atomic::Ordering::{Acquire, Relaxed, Release};

use crossbeam::utils::CachePadded;
use crossbeam_epoch::{self as epoch, Atomic, Owned, Shared};

/// A link in the queue.
///
/// `value` is uninitialized in the initial dummy and has been moved out of
/// every node that later became the dummy, so dropping a `Node` never drops
/// its value.
struct Node<T> {
    value: MaybeUninit<T>,
    /// Null until a successor is linked.
    next: Atomic<Node<T>>,
}

impl<T> Node<T> {
    fn sentinel() -> Self {
        Node {
            value: MaybeUninit::uninit(),
            next: Atomic::null(),
        }
    }

    fn new(value: T) -> Self {
        Node {
            value: MaybeUninit::new(value),
            next: Atomic::null(),
        }
    }
}

/// Lock-free unbounded FIFO queue.
///
/// `head` always points at a dummy node whose successor holds the oldest
/// element. `tail` points at the last node or at most one link behind it;
/// both operations help move a lagging `tail` forward.
pub struct LockFreeQueue<T> {
    head: CachePadded<Atomic<Node<T>>>,
    tail: CachePadded<Atomic<Node<T>>>,
}

// Values are only ever moved between threads, never shared.
unsafe impl<T: Send> Send for LockFreeQueue<T> {}
unsafe impl<T: Send> Sync for LockFreeQueue<T> {}

impl<T> LockFreeQueue<T> {
    /// Creates an empty queue holding a single dummy node.
    pub fn new() -> Self {
        let queue = LockFreeQueue {
            head: CachePadded::new(Atomic::null()),
            tail: CachePadded::new(Atomic::null()),
        };

        // SAFETY: the queue is not shared yet.
        unsafe {
            let guard = epoch::unprotected();
            let sentinel = Owned::new(Node::sentinel()).into_shared(guard);
            queue.head.store(sentinel, Relaxed);
            queue.tail.store(sentinel, Relaxed);
        }

        queue
    }

    /// Appends `value` at the back of the queue.
    ///
    /// Never fails; retries until the new node is linked after the last node.
    pub fn enqueue(&self, value: T) {
        let guard = &epoch::pin();
        let node = Owned::new(Node::new(value)).into_shared(guard);

        loop {
            let tail = self.tail.load(Acquire, guard);
            // SAFETY: `tail` is never null and cannot be freed while we are pinned.
            let tail_ref = unsafe { tail.deref() };

            match tail_ref
                .next
                .compare_exchange(Shared::null(), node, Release, Acquire, guard)
            {
                Ok(_) => {
                    // Swing tail to the new node. Someone else may already have.
                    let _ = self.tail.compare_exchange(tail, node, Release, Relaxed, guard);
                    return;
                }
                Err(err) => {
                    // Tail was lagging, help it forward and try again.
                    let _ = self
                        .tail
                        .compare_exchange(tail, err.current, Release, Relaxed, guard);
                }
            }
        }
    }

    /// Removes the element at the front of the queue.
    ///
    /// Returns `None` if the queue was empty at the moment of the attempt.
    pub fn dequeue(&self) -> Option<T> {
        let guard = &epoch::pin();

        loop {
            let head = self.head.load(Acquire, guard);
            let tail = self.tail.load(Acquire, guard);
            // SAFETY: `head` is never null and cannot be freed while we are pinned.
            let next = unsafe { head.deref() }.next.load(Acquire, guard);

            // The snapshot is only usable if head did not move while we read it.
            if head != self.head.load(Acquire, guard) {
                continue;
            }

            if head == tail {
                if next.is_null() {
                    return None;
                }
                // An enqueue linked a node but has not swung tail yet.
                let _ = self.tail.compare_exchange(tail, next, Release, Relaxed, guard);
                continue;
            }

            // SAFETY: pinned, so `next` stays allocated even if another
            // dequeue advances past it.
            let next_ref = match unsafe { next.as_ref() } {
                Some(node) => node,
                None => continue,
            };

            // The value has to be read before head moves: afterwards `next`
            // is the dummy and its value belongs to whoever won the CAS. If we
            // lose, this bitwise copy is discarded without being dropped.
            let value = ManuallyDrop::new(unsafe { next_ref.value.as_ptr().read() });

            if self
                .head
                .compare_exchange(head, next, Release, Relaxed, guard)
                .is_ok()
            {
                // SAFETY: `head` is unlinked and no new operation can reach it.
                unsafe { guard.defer_destroy(head) };
                return Some(ManuallyDrop::into_inner(value));
            }
        }
    }

    /// Returns `true` if the queue holds no elements.
    ///
    /// Only a snapshot: concurrent operations may change the answer before it
    /// is used.
    pub fn is_empty(&self) -> bool {
        let guard = &epoch::pin();
        let head = self.head.load(Acquire, guard);
        // SAFETY: `head` is never null and cannot be freed while we are pinned.
        unsafe { head.deref() }.next.load(Acquire, guard).is_null()
    }
}

impl<T> Default for LockFreeQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for LockFreeQueue<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad("LockFreeQueue { .. }")
    }
}

impl<T> Drop for LockFreeQueue<T> {
    fn drop(&mut self) {
        // SAFETY: `&mut self` means no other thread can touch the chain.
        unsafe {
            let guard = epoch::unprotected();
            let mut current = self.head.load(Relaxed, guard);
            let mut is_dummy = true;

            while !current.is_null() {
                let next = current.deref().next.load(Relaxed, guard);
                let mut node = current.into_owned();
                if !is_dummy {
                    node.value.assume_init_drop();
                }
                drop(node);
                is_dummy = false;
                current = next;
            }
        }
    }
}
