//! Concurrent positional text search.
//!
//! Quarry ingests a corpus — a directory tree of text files or a bounded web
//! crawl — into a positional inverted index keyed by Snowball-stemmed words,
//! then answers batches of free-text queries with exact or prefix matching
//! and term-frequency ranking.
//!
//! # Architecture
//!
//! ```text
//!   files (build)  ──┐                        ┌── exact / prefix search
//!                    ├─▶ local InvertedIndex ─┤
//!   pages (crawl)  ──┘        │ add_all       └── ranked SearchResults
//!                             ▼
//!                   SharedIndex (ReadWriteLock
//!                    over InvertedIndex)
//! ```
//!
//! The concurrency story is deliberately coarse: worker tasks from the
//! [`sync::WorkQueue`] build *private* indexes with no synchronization and
//! merge them into the shared one in a single write-locked `add_all` per unit
//! of work (file or page). Readers — searches and the JSON snapshot — take
//! the read side of the same [`sync::ReadWriteLock`] and copy out what they
//! need, so nothing ever iterates live shared state without holding a lock.
//!
//! | Module   | Role                                                    |
//! |----------|---------------------------------------------------------|
//! | `text`   | tokenizer + Snowball English stemmer                    |
//! | `index`  | the inverted index, search, and ranking                 |
//! | `sync`   | reader-writer lock and fixed-pool work queue            |
//! | `shared` | thread-safe façade with copy-out views                  |
//! | `build`  | filesystem ingestion, sequential and concurrent         |
//! | `search` | query batches, canonical keys, result accumulation      |
//! | `crawl`  | bounded BFS crawler, HTML fetch/clean, link extraction  |
//! | `json`   | deterministic pretty JSON output                        |

pub mod build;
pub mod crawl;
pub mod error;
pub mod index;
pub mod json;
pub mod search;
pub mod shared;
pub mod sync;
pub mod text;

pub use crawl::Crawler;
pub use error::{Error, Result};
pub use index::{InvertedIndex, SearchResult};
pub use search::QueryLog;
pub use shared::SharedIndex;
pub use sync::{ReadWriteLock, WorkQueue};
