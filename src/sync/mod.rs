//! Hand-built synchronization primitives: the reader-writer lock guarding the
//! shared index and the fixed-pool work queue that drives every concurrent
//! phase.

mod queue;
mod rwlock;

pub use queue::WorkQueue;
pub use rwlock::ReadWriteLock;
