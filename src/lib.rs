//! Lock-free unbounded multi-producer multi-consumer FIFO queue.
//!
//! [`LockFreeQueue`] is the Michael-Scott queue with epoch-based memory
//! reclamation. The [`stress`] module contains the concurrent acceptance
//! harness that checks every enqueued value comes out exactly once.
//!
//! ```
//! use msqueue::LockFreeQueue;
//!
//! let queue = LockFreeQueue::new();
//! queue.enqueue(1);
//! queue.enqueue(2);
//! assert_eq!(queue.dequeue(), Some(1));
//! assert_eq!(queue.dequeue(), Some(2));
//! assert_eq!(queue.dequeue(), None);
//! ```

pub mod stress;
pub mod structures;

pub use structures::lockfreequeue::LockFreeQueue;
