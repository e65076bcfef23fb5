//! The positional inverted index.
//!
//! # INVARIANTS (DO NOT VIOLATE)
//!
//! 1. **COUNT_COVERS_POSITIONS**: for every `(stem, location, pos)` recorded,
//!    `word_count[location] >= pos`
//! 2. **COUNT_IFF_POSTED**: `word_count` has an entry for a location iff that
//!    location appears under at least one stem
//! 3. **POSITIONS_UNIQUE**: positions within a `(stem, location)` pair are a set
//! 4. **SORTED_ITERATION**: stems, locations, and positions all iterate in
//!    sorted order (this is what the JSON output and search ordering observe)
//!
//! Everything here is plain single-threaded data; [`SharedIndex`](crate::SharedIndex)
//! adds the locking discipline on top. Worker tasks build private instances of
//! this type with no synchronization at all and bulk-merge them into the shared
//! one with [`InvertedIndex::add_all`].

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet, HashMap};

use serde::Serialize;

/// Nested postings: stem -> location -> 1-based positions.
pub type Postings = BTreeMap<String, BTreeMap<String, BTreeSet<usize>>>;

/// A positional word -> location -> positions map with per-location token
/// counts and exact/prefix search.
#[derive(Debug, Default, Clone)]
pub struct InvertedIndex {
    postings: Postings,
    word_count: BTreeMap<String, usize>,
}

impl InvertedIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `position` for `stem` at `location`.
    ///
    /// The location's word count rises to `position` when it is the highest
    /// seen so far; since builders feed positions from a 1-based incrementing
    /// counter, the count ends up equal to the location's token count.
    /// Repeating an identical call is a no-op.
    pub fn add(&mut self, stem: &str, location: &str, position: usize) {
        self.postings
            .entry(stem.to_owned())
            .or_default()
            .entry(location.to_owned())
            .or_default()
            .insert(position);

        let count = self.word_count.entry(location.to_owned()).or_insert(0);
        if position > *count {
            *count = position;
        }
    }

    /// Bulk-merges `other` into this index.
    ///
    /// Position sets are unioned; word counts take the max of the two sides,
    /// so merging overlapping locations can never drop below a recorded
    /// position. Callers that need the merge to be atomic for readers go
    /// through [`SharedIndex`](crate::SharedIndex), which holds the write lock
    /// for the whole call.
    pub fn add_all(&mut self, other: InvertedIndex) {
        for (stem, locations) in other.postings {
            let entry = self.postings.entry(stem).or_default();
            for (location, positions) in locations {
                entry.entry(location).or_default().extend(positions);
            }
        }
        for (location, count) in other.word_count {
            let current = self.word_count.entry(location).or_insert(0);
            if count > *current {
                *current = count;
            }
        }
    }

    /// Whether any location contains `stem`.
    pub fn contains(&self, stem: &str) -> bool {
        self.postings.contains_key(stem)
    }

    /// Whether `stem` was recorded at `location`.
    pub fn contains_at(&self, stem: &str, location: &str) -> bool {
        self.postings
            .get(stem)
            .is_some_and(|locations| locations.contains_key(location))
    }

    /// Whether `stem` was recorded at `location` with exactly `position`.
    pub fn contains_position(&self, stem: &str, location: &str, position: usize) -> bool {
        self.positions(stem, location)
            .is_some_and(|positions| positions.contains(&position))
    }

    /// All stems, sorted.
    pub fn stems(&self) -> impl Iterator<Item = &str> {
        self.postings.keys().map(String::as_str)
    }

    /// Locations containing `stem`, sorted. Empty when the stem is absent.
    pub fn locations<'a>(&'a self, stem: &str) -> impl Iterator<Item = &'a str> {
        self.postings
            .get(stem)
            .into_iter()
            .flat_map(|locations| locations.keys().map(String::as_str))
    }

    /// Positions of `stem` at `location`, when recorded.
    pub fn positions(&self, stem: &str, location: &str) -> Option<&BTreeSet<usize>> {
        self.postings.get(stem)?.get(location)
    }

    /// Per-location token counts, sorted by location.
    pub fn counts(&self) -> &BTreeMap<String, usize> {
        &self.word_count
    }

    /// The full nested postings map (what the JSON writer walks).
    pub fn postings(&self) -> &Postings {
        &self.postings
    }

    pub fn is_empty(&self) -> bool {
        self.postings.is_empty()
    }

    /// Number of distinct stems.
    pub fn stem_count(&self) -> usize {
        self.postings.len()
    }

    /// Runs one query: exact when `exact`, prefix otherwise.
    pub fn search(&self, stems: &BTreeSet<String>, exact: bool) -> Vec<SearchResult> {
        if exact {
            self.exact_search(stems)
        } else {
            self.partial_search(stems)
        }
    }

    /// Folds the locations of every query stem present in the index.
    pub fn exact_search(&self, stems: &BTreeSet<String>) -> Vec<SearchResult> {
        let mut results = Vec::new();
        let mut tracker = HashMap::new();
        for stem in stems {
            if self.contains(stem) {
                self.fold_stem(stem, &mut tracker, &mut results);
            }
        }
        results.sort();
        results
    }

    /// Folds the locations of every index stem that begins with a query stem.
    ///
    /// For each query stem the ordered map is entered at the first key `>=`
    /// the stem and walked forward only while keys keep the prefix, so a
    /// prefix lookup touches O(log n + matches) entries rather than the whole
    /// vocabulary.
    pub fn partial_search(&self, stems: &BTreeSet<String>) -> Vec<SearchResult> {
        let mut results = Vec::new();
        let mut tracker = HashMap::new();
        for stem in stems {
            for indexed in self.postings.range(stem.clone()..).map(|(s, _)| s) {
                if !indexed.starts_with(stem.as_str()) {
                    break;
                }
                self.fold_stem(indexed, &mut tracker, &mut results);
            }
        }
        results.sort();
        results
    }

    /// Accumulates one matching stem's locations into the current query's
    /// results.
    ///
    /// `tracker` maps a location already seen by this query to its slot in
    /// `results`, so a location hit by several stems keeps one entry whose
    /// match count grows.
    fn fold_stem<'a>(
        &'a self,
        stem: &str,
        tracker: &mut HashMap<&'a str, usize>,
        results: &mut Vec<SearchResult>,
    ) {
        let Some(locations) = self.postings.get(stem) else {
            return;
        };
        for (location, positions) in locations {
            // COUNT_IFF_POSTED: a posted location always has a word count.
            let total = self.word_count.get(location).copied().unwrap_or(0);
            debug_assert!(total > 0, "posted location {location} has no word count");
            match tracker.get(location.as_str()) {
                Some(&slot) => {
                    let result = &mut results[slot];
                    result.matches += positions.len();
                    result.score = result.matches as f64 / total as f64;
                }
                None => {
                    tracker.insert(location, results.len());
                    results.push(SearchResult {
                        location: location.clone(),
                        matches: positions.len(),
                        score: positions.len() as f64 / total as f64,
                    });
                }
            }
        }
    }
}

/// One ranked hit for one query.
#[derive(Debug, Clone, Serialize)]
pub struct SearchResult {
    /// File path or URL where the query's stems appeared.
    pub location: String,
    /// Total positions contributed by every matching stem at this location.
    pub matches: usize,
    /// `matches / word_count[location]` — a term-frequency relevance proxy.
    pub score: f64,
}

impl Ord for SearchResult {
    /// Ranking order: higher score first, then more matches, then
    /// case-insensitive location as the final ascending tiebreak.
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .score
            .total_cmp(&self.score)
            .then_with(|| other.matches.cmp(&self.matches))
            .then_with(|| {
                let lhs = self.location.bytes().map(|b| b.to_ascii_lowercase());
                let rhs = other.location.bytes().map(|b| b.to_ascii_lowercase());
                lhs.cmp(rhs)
            })
    }
}

impl PartialOrd for SearchResult {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for SearchResult {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for SearchResult {}
