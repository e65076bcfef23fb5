// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Command-line surface for the quarry driver.
//!
//! One build per run: either `--path` (filesystem corpus) or `--url` (bounded
//! crawl, always multi-threaded), then optional JSON outputs and a query
//! batch. Thread and limit values arrive as raw strings on purpose — the
//! contract is that garbage falls back to the default rather than aborting
//! the run.

use std::path::PathBuf;

use clap::Parser;

/// Default worker count when `--threads` is absent or unusable.
pub const DEFAULT_THREADS: usize = 5;

/// Default crawl budget when `--limit` is absent or unusable.
pub const DEFAULT_LIMIT: usize = 50;

#[derive(Debug, Parser)]
#[command(
    name = "quarry",
    about = "Build a positional inverted index from files or a web crawl, then search it",
    version
)]
pub struct Cli {
    /// Build the index from the tree of .txt/.text files at this path
    #[arg(long, value_name = "DIR")]
    pub path: Option<PathBuf>,

    /// Crawl from this seed URL instead (implies multi-threaded)
    #[arg(long, value_name = "URL")]
    pub url: Option<String>,

    /// Worker threads; anything invalid or below 1 falls back to 5
    #[arg(long, value_name = "N")]
    pub threads: Option<String>,

    /// Crawl budget in pages; anything invalid or below 1 falls back to 50
    #[arg(long, value_name = "N")]
    pub limit: Option<String>,

    /// Write the inverted index as JSON (default path: index.json)
    #[arg(long, value_name = "FILE", num_args = 0..=1, default_missing_value = "index.json")]
    pub index: Option<PathBuf>,

    /// Write per-location token counts as JSON (default path: counts.json)
    #[arg(long, value_name = "FILE", num_args = 0..=1, default_missing_value = "counts.json")]
    pub counts: Option<PathBuf>,

    /// Run each line of this file as a query
    #[arg(long, value_name = "FILE")]
    pub query: Option<PathBuf>,

    /// Exact-match search (default is prefix matching)
    #[arg(long)]
    pub exact: bool,

    /// Write ranked query results as JSON (default path: results.json)
    #[arg(long, value_name = "FILE", num_args = 0..=1, default_missing_value = "results.json")]
    pub results: Option<PathBuf>,
}

impl Cli {
    /// Normalized worker count.
    pub fn thread_count(&self) -> usize {
        parse_or(self.threads.as_deref(), DEFAULT_THREADS)
    }

    /// Normalized crawl budget.
    pub fn crawl_limit(&self) -> usize {
        parse_or(self.limit.as_deref(), DEFAULT_LIMIT)
    }

    /// Whether this run uses the shared index and worker pools.
    pub fn concurrent(&self) -> bool {
        self.threads.is_some() || self.url.is_some()
    }
}

fn parse_or(raw: Option<&str>, default: usize) -> usize {
    raw.and_then(|value| value.trim().parse::<usize>().ok())
        .filter(|&n| n >= 1)
        .unwrap_or(default)
}
