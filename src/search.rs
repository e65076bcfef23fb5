//! Batched query execution against a built index.
//!
//! Each line of the query file is tokenized and stemmed into a sorted set of
//! unique stems; the set joined by single spaces is the query's *canonical
//! key*, which de-duplicates repeats ("Quick fox" and "fox quick!" are the
//! same query). Results are accumulated into an ordered map keyed by the
//! canonical key, which is exactly the shape the results JSON wants.
//!
//! The concurrent mode submits one task per line. The duplicate check and the
//! insert each take the map mutex; the search itself runs outside it under the
//! index's read lock only, so slow queries never serialize the whole batch.
//! (That also respects the crate-wide lock order: never hold the map mutex
//! while acquiring the index lock.)

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::sync::{Arc, Mutex};

use crate::error::{Error, Result};
use crate::index::{InvertedIndex, SearchResult};
use crate::shared::SharedIndex;
use crate::sync::WorkQueue;
use crate::text::WordStemmer;

/// Ordered map of canonical query key -> ranked results.
pub type ResultMap = BTreeMap<String, Vec<SearchResult>>;

/// Accumulates ranked results for a batch of queries.
#[derive(Debug, Default)]
pub struct QueryLog {
    results: ResultMap,
}

impl QueryLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs every line of `path` as a query against `index`, sequentially.
    pub fn run_file(&mut self, path: &Path, index: &InvertedIndex, exact: bool) -> Result<()> {
        let stemmer = WordStemmer::new();
        for line in read_lines(path)? {
            let line = line.map_err(|e| Error::io(path, e))?;
            self.run_line(&line, &stemmer, index, exact);
        }
        Ok(())
    }

    /// Runs one query line; empty and duplicate queries are skipped.
    pub fn run_line(&mut self, line: &str, stemmer: &WordStemmer, index: &InvertedIndex, exact: bool) {
        let stems = stemmer.unique_stems(line);
        if stems.is_empty() {
            return;
        }
        let key = canonical_key(&stems);
        if self.results.contains_key(&key) {
            return;
        }
        let ranked = index.search(&stems, exact);
        self.results.insert(key, ranked);
    }

    /// Runs every line of `path` as a query task on a pool of `threads`
    /// workers against the shared index.
    pub fn run_file_concurrent(
        &mut self,
        path: &Path,
        shared: &Arc<SharedIndex>,
        exact: bool,
        threads: usize,
    ) -> Result<()> {
        let lines: Vec<String> = read_lines(path)?
            .collect::<std::io::Result<_>>()
            .map_err(|e| Error::io(path, e))?;
        let results = Arc::new(Mutex::new(std::mem::take(&mut self.results)));
        let queue = WorkQueue::with_threads(threads);

        for line in lines {
            let shared = Arc::clone(shared);
            let results = Arc::clone(&results);
            queue.execute(move || {
                let stemmer = WordStemmer::new();
                let stems = stemmer.unique_stems(&line);
                if stems.is_empty() {
                    return;
                }
                let key = canonical_key(&stems);
                {
                    let results = results.lock().unwrap();
                    if results.contains_key(&key) {
                        return;
                    }
                }
                // Search outside the map mutex; only the index read lock is held.
                let ranked = shared.search(&stems, exact);
                results.lock().unwrap().insert(key, ranked);
            });
        }

        queue.finish();
        queue.shutdown();

        self.results = Arc::try_unwrap(results)
            .expect("query tasks still hold the result map")
            .into_inner()
            .unwrap();
        Ok(())
    }

    /// The accumulated results, ordered by canonical key.
    pub fn results(&self) -> &ResultMap {
        &self.results
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }
}

/// Sorted unique stems joined by single spaces.
fn canonical_key(stems: &std::collections::BTreeSet<String>) -> String {
    stems.iter().cloned().collect::<Vec<_>>().join(" ")
}

fn read_lines(path: &Path) -> Result<std::io::Lines<BufReader<File>>> {
    let file = File::open(path).map_err(|e| Error::io(path, e))?;
    Ok(BufReader::new(file).lines())
}
