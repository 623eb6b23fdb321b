pub mod lockfreequeue;
