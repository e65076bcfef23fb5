//! Tokenizing and stemming.
//!
//! Every key in the index is a *stem*: a lowercase ASCII word run through the
//! Snowball English stemmer. Queries go through the exact same pipeline, so
//! "running" in a document and "runs" in a query meet at "run".

use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::Regex;
use rust_stemmers::{Algorithm, Stemmer};

/// Word splitter: maximal ASCII-letter runs, in text order, repeats included.
static WORDS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[A-Za-z]+").unwrap());

/// Splits `text` into lowercase ASCII-letter tokens in text order.
///
/// Digits, punctuation, and non-ASCII characters act as separators and are
/// dropped. Duplicates are kept; positions in the index are assigned from this
/// ordering.
pub fn tokenize(text: &str) -> Vec<String> {
    WORDS
        .find_iter(text)
        .map(|m| m.as_str().to_ascii_lowercase())
        .collect()
}

/// A Snowball English stemmer.
///
/// Construction is cheap but not free, so pipelines create one per unit of
/// work (per file, per fetched page) and reuse it across lines.
pub struct WordStemmer {
    inner: Stemmer,
}

impl WordStemmer {
    pub fn new() -> Self {
        WordStemmer {
            inner: Stemmer::create(Algorithm::English),
        }
    }

    /// Stems a single already-tokenized word.
    pub fn stem(&self, word: &str) -> String {
        self.inner.stem(word).into_owned()
    }

    /// Tokenizes and stems a line, preserving text order and repeats.
    pub fn stems(&self, line: &str) -> Vec<String> {
        tokenize(line)
            .into_iter()
            .map(|word| self.stem(&word))
            .collect()
    }

    /// Tokenizes and stems a line into a sorted set of unique stems.
    ///
    /// This is the query-side shape: the sorted unique stems joined by single
    /// spaces form a query's canonical key.
    pub fn unique_stems(&self, line: &str) -> BTreeSet<String> {
        tokenize(line)
            .into_iter()
            .map(|word| self.stem(&word))
            .collect()
    }
}

impl Default for WordStemmer {
    fn default() -> Self {
        Self::new()
    }
}
