// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Quarry driver: build an index from files or a crawl, write JSON views,
//! run a query batch.
//!
//! ```bash
//! # Index a directory and write the index JSON
//! quarry --path ./corpus --index
//!
//! # Crawl 50 pages from a seed and answer queries with prefix matching
//! quarry --url https://example.com --limit 50 --query queries.txt --results
//!
//! # Same corpus, eight workers, exact matching
//! quarry --path ./corpus --threads 8 --query queries.txt --exact --results
//! ```
//!
//! Every failure is logged to stderr and the run moves on to its next phase;
//! the exit code is 0 regardless. The index that gets written is whatever was
//! successfully built.

use std::sync::Arc;
use std::time::Instant;

use clap::Parser;
use tracing::error;
use tracing_subscriber::EnvFilter;

use quarry::{build, json, Crawler, InvertedIndex, QueryLog, SharedIndex};

mod cli;
use cli::Cli;

/// Redirects followed per fetch during a crawl.
const REDIRECTS: usize = 3;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let start = Instant::now();

    if cli.concurrent() {
        run_concurrent(&cli);
    } else {
        run_sequential(&cli);
    }

    println!("Elapsed: {:.6} seconds", start.elapsed().as_secs_f64());
}

/// Plain index, no locks anywhere.
fn run_sequential(cli: &Cli) {
    let mut index = InvertedIndex::new();
    match &cli.path {
        Some(path) => {
            if let Err(e) = build::build(path, &mut index) {
                error!("index build failed: {e}");
            }
        }
        None => error!("no --path or --url given; nothing to index"),
    }

    write_index_outputs(cli, &index);

    let mut log = QueryLog::new();
    if let Some(query) = &cli.query {
        if let Err(e) = log.run_file(query, &index, cli.exact) {
            error!("query run failed: {e}");
        }
    }
    write_results_output(cli, &log);
}

/// Shared index behind the reader-writer lock, one worker pool per phase.
fn run_concurrent(cli: &Cli) {
    let shared = Arc::new(SharedIndex::new());
    let threads = cli.thread_count();

    if let Some(seed) = &cli.url {
        let crawler = Crawler::new(Arc::clone(&shared), cli.crawl_limit(), threads);
        if let Err(e) = crawler.run(seed, REDIRECTS) {
            error!("crawl failed: {e}");
        }
    } else if let Some(path) = &cli.path {
        if let Err(e) = build::build_concurrent(path, &shared, threads) {
            error!("index build failed: {e}");
        }
    } else {
        error!("no --path or --url given; nothing to index");
    }

    write_index_outputs(cli, &shared.snapshot());

    let mut log = QueryLog::new();
    if let Some(query) = &cli.query {
        if let Err(e) = log.run_file_concurrent(query, &shared, cli.exact, threads) {
            error!("query run failed: {e}");
        }
    }
    write_results_output(cli, &log);
}

fn write_index_outputs(cli: &Cli, index: &InvertedIndex) {
    if let Some(path) = &cli.index {
        if let Err(e) = json::write_index(index, path) {
            error!("failed to write index json: {e}");
        }
    }
    if let Some(path) = &cli.counts {
        if let Err(e) = json::write_counts(index.counts(), path) {
            error!("failed to write counts json: {e}");
        }
    }
}

fn write_results_output(cli: &Cli, log: &QueryLog) {
    if let Some(path) = &cli.results {
        if let Err(e) = json::write_results(log.results(), path) {
            error!("failed to write results json: {e}");
        }
    }
}
