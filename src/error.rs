//! Error types shared across the build, search, and crawl pipelines.
//!
//! The engine is deliberately best-effort: a single unreadable file or
//! unreachable URL is logged and skipped, never fatal. These variants exist so
//! the driver can report *what kind* of unit failed before moving on. The one
//! fatal condition in the crate — releasing the write lock from a thread that
//! does not hold it — is a programming bug and panics instead of passing
//! through here.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors surfaced by the indexing and crawling pipelines.
#[derive(Debug, Error)]
pub enum Error {
    /// A required input (corpus path, query file, seed URL) was not provided
    /// or does not exist.
    #[error("missing input: {0}")]
    InputMissing(String),

    /// Reading a corpus file or writing an output file failed.
    #[error("i/o failure on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A URL could not be parsed or resolved against its base.
    #[error("malformed url {url}: {source}")]
    MalformedUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    /// An HTTP fetch failed at the transport level.
    #[error("fetch failed for {url}: {source}")]
    Fetch {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

impl Error {
    /// Attach a path to a raw [`io::Error`].
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }
}

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, Error>;
