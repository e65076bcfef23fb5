//! Thread-safe façade over [`InvertedIndex`].
//!
//! Composition instead of a subclass-per-method wrapper: the façade owns the
//! lock and the inner index, and every operation routes through exactly one
//! lock acquisition. Mutators hold the write lock for their entire duration —
//! which is what makes [`SharedIndex::add_all`] atomic for readers — and all
//! read operations hold the read lock and hand back **owned copies**, never
//! references into the live structure. Builds and searches are allowed to
//! overlap, so a borrowed view could be invalidated mid-iteration; the copy
//! is the safety argument, and its cost is noise next to the file and network
//! I/O that feeds the index.

use std::cell::UnsafeCell;
use std::collections::{BTreeMap, BTreeSet};

use crate::index::{InvertedIndex, SearchResult};
use crate::sync::ReadWriteLock;

/// An [`InvertedIndex`] safe to share across build and search threads.
pub struct SharedIndex {
    lock: ReadWriteLock,
    inner: UnsafeCell<InvertedIndex>,
}

// SAFETY: `inner` is only ever touched between lock/unlock pairs below; the
// lock admits many readers xor one writer, so `&InvertedIndex` is never live
// alongside `&mut InvertedIndex`.
unsafe impl Sync for SharedIndex {}
unsafe impl Send for SharedIndex {}

impl SharedIndex {
    pub fn new() -> Self {
        SharedIndex {
            lock: ReadWriteLock::new(),
            inner: UnsafeCell::new(InvertedIndex::new()),
        }
    }

    fn read<R>(&self, f: impl FnOnce(&InvertedIndex) -> R) -> R {
        // SAFETY: read lock held for the duration of `f`; see the Sync impl.
        self.lock.with_read(|| f(unsafe { &*self.inner.get() }))
    }

    fn write<R>(&self, f: impl FnOnce(&mut InvertedIndex) -> R) -> R {
        // SAFETY: write lock held for the duration of `f`; see the Sync impl.
        self.lock.with_write(|| f(unsafe { &mut *self.inner.get() }))
    }

    /// Records one position. Prefer building a local index and merging it with
    /// [`SharedIndex::add_all`]; per-position locking on hot stems is exactly
    /// the contention the local-merge pattern exists to avoid.
    pub fn add(&self, stem: &str, location: &str, position: usize) {
        self.write(|index| index.add(stem, location, position));
    }

    /// Merges a privately-built local index in one critical section.
    ///
    /// Readers observe either the pre-merge or post-merge index, never a
    /// partial merge.
    pub fn add_all(&self, local: InvertedIndex) {
        self.write(|index| index.add_all(local));
    }

    pub fn contains(&self, stem: &str) -> bool {
        self.read(|index| index.contains(stem))
    }

    pub fn contains_at(&self, stem: &str, location: &str) -> bool {
        self.read(|index| index.contains_at(stem, location))
    }

    pub fn contains_position(&self, stem: &str, location: &str, position: usize) -> bool {
        self.read(|index| index.contains_position(stem, location, position))
    }

    /// Sorted stems, copied out.
    pub fn stems(&self) -> Vec<String> {
        self.read(|index| index.stems().map(str::to_owned).collect())
    }

    /// Sorted locations for `stem`, copied out.
    pub fn locations(&self, stem: &str) -> Vec<String> {
        self.read(|index| index.locations(stem).map(str::to_owned).collect())
    }

    /// Positions of `stem` at `location`, copied out.
    pub fn positions(&self, stem: &str, location: &str) -> BTreeSet<usize> {
        self.read(|index| index.positions(stem, location).cloned().unwrap_or_default())
    }

    /// Per-location token counts, copied out.
    pub fn counts(&self) -> BTreeMap<String, usize> {
        self.read(|index| index.counts().clone())
    }

    pub fn search(&self, stems: &BTreeSet<String>, exact: bool) -> Vec<SearchResult> {
        self.read(|index| index.search(stems, exact))
    }

    pub fn exact_search(&self, stems: &BTreeSet<String>) -> Vec<SearchResult> {
        self.read(|index| index.exact_search(stems))
    }

    pub fn partial_search(&self, stems: &BTreeSet<String>) -> Vec<SearchResult> {
        self.read(|index| index.partial_search(stems))
    }

    /// Clones the entire inner index under the read lock.
    ///
    /// The JSON writers run over this, so output reflects one consistent
    /// point-in-time state no matter what the pools are doing.
    pub fn snapshot(&self) -> InvertedIndex {
        self.read(InvertedIndex::clone)
    }
}

impl Default for SharedIndex {
    fn default() -> Self {
        Self::new()
    }
}
