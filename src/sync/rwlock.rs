//! A multi-reader / single-writer lock that remembers which thread holds the
//! write side.
//!
//! `std::sync::RwLock` would give us the reader/writer exclusion, but not the
//! ownership check: releasing the write lock from a thread that never acquired
//! it is a bug we want to fail loudly on, not a silent unlock. So the lock is
//! counter state behind a `Mutex` with a single `Condvar`; every release of
//! the last reader or of the writer wakes all waiters and lets them re-check.
//!
//! Not re-entrant for readers or writers, no upgrade or downgrade, and
//! fairness is whatever the condvar wakeup order provides.

use std::sync::{Condvar, Mutex};
use std::thread::{self, ThreadId};

#[derive(Debug, Default)]
struct LockState {
    readers: usize,
    writers: usize,
    /// Thread currently holding the write lock, for the release-side check.
    writer_thread: Option<ThreadId>,
}

/// A fair-enough reader-writer lock with a writer-identity check on release.
#[derive(Debug, Default)]
pub struct ReadWriteLock {
    state: Mutex<LockState>,
    changed: Condvar,
}

impl ReadWriteLock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Blocks until no writer is active, then registers a reader.
    pub fn read_lock(&self) {
        let mut state = self.state.lock().unwrap();
        while state.writers > 0 {
            state = self.changed.wait(state).unwrap();
        }
        state.readers += 1;
    }

    /// Releases one reader; the last reader out wakes every waiter.
    pub fn read_unlock(&self) {
        let mut state = self.state.lock().unwrap();
        assert!(state.readers > 0, "read_unlock without a matching read_lock");
        state.readers -= 1;
        if state.readers == 0 {
            self.changed.notify_all();
        }
    }

    /// Blocks until no reader or writer is active, then takes exclusive
    /// ownership for the calling thread.
    pub fn write_lock(&self) {
        let mut state = self.state.lock().unwrap();
        while state.readers > 0 || state.writers > 0 {
            state = self.changed.wait(state).unwrap();
        }
        state.writers += 1;
        state.writer_thread = Some(thread::current().id());
    }

    /// Releases the write lock and wakes every waiter.
    ///
    /// # Panics
    ///
    /// Panics when the calling thread is not the one that acquired the lock
    /// (including when no thread holds it). That situation is a programming
    /// bug in the caller's lock discipline, and limping on with a corrupted
    /// lock would be worse than stopping.
    pub fn write_unlock(&self) {
        let mut state = self.state.lock().unwrap();
        if state.writer_thread != Some(thread::current().id()) {
            // Drop the guard first so the panic does not poison the state mutex.
            drop(state);
            panic!("write lock released by a thread that does not hold it");
        }
        state.writers -= 1;
        state.writer_thread = None;
        self.changed.notify_all();
    }

    /// Runs `f` with the read lock held, releasing even if `f` panics.
    pub fn with_read<R>(&self, f: impl FnOnce() -> R) -> R {
        struct Release<'a>(&'a ReadWriteLock);
        impl Drop for Release<'_> {
            fn drop(&mut self) {
                self.0.read_unlock();
            }
        }

        self.read_lock();
        let _release = Release(self);
        f()
    }

    /// Runs `f` with the write lock held, releasing even if `f` panics.
    /// The release happens on the acquiring thread, so the ownership check
    /// always passes.
    pub fn with_write<R>(&self, f: impl FnOnce() -> R) -> R {
        struct Release<'a>(&'a ReadWriteLock);
        impl Drop for Release<'_> {
            fn drop(&mut self) {
                self.0.write_unlock();
            }
        }

        self.write_lock();
        let _release = Release(self);
        f()
    }
}
