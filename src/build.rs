// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! File-corpus ingestion.
//!
//! Walks a directory tree (following symlinks) for `.txt`/`.text` files and
//! feeds them through tokenize → stem → `add(stem, path, position)`. Two
//! modes share the same per-file parser:
//!
//! - **Sequential**: files go straight into a plain [`InvertedIndex`], no
//!   locking anywhere.
//! - **Concurrent**: one task per file on the work queue. Each task fills a
//!   private local index without synchronization and then merges it into the
//!   shared index in a single `add_all` — one coarse critical section per
//!   file instead of one tiny one per word, which keeps hot stems from
//!   turning the write lock into a convoy.
//!
//! A file that cannot be read or is not valid UTF-8 is logged and skipped;
//! one bad file never aborts a build.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use indicatif::{ProgressBar, ProgressStyle};
use tracing::warn;
use walkdir::WalkDir;

use crate::error::{Error, Result};
use crate::index::InvertedIndex;
use crate::shared::SharedIndex;
use crate::sync::WorkQueue;
use crate::text::WordStemmer;

/// Whether the path names a text corpus file (`.txt` or `.text`, any case).
fn is_text_file(path: &Path) -> bool {
    let lowered = path.to_string_lossy().to_lowercase();
    lowered.ends_with(".txt") || lowered.ends_with(".text")
}

/// Collects every text file under `start`, following symlinks, sorted so that
/// build order (and therefore anything order-dependent downstream) is
/// deterministic.
pub fn text_files(start: &Path) -> Result<Vec<PathBuf>> {
    if !start.exists() {
        return Err(Error::InputMissing(start.display().to_string()));
    }

    let mut files: Vec<PathBuf> = WalkDir::new(start)
        .follow_links(true)
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                warn!("skipping unreadable directory entry: {e}");
                None
            }
        })
        .filter(|entry| entry.file_type().is_file() && is_text_file(entry.path()))
        .map(|entry| entry.into_path())
        .collect();
    files.sort();
    Ok(files)
}

/// Parses one file into `index`: UTF-8, line by line, with a single 1-based
/// position counter spanning the whole file.
pub fn parse_file(path: &Path, index: &mut InvertedIndex) -> Result<()> {
    let file = File::open(path).map_err(|e| Error::io(path, e))?;
    let reader = BufReader::new(file);
    let stemmer = WordStemmer::new();
    let location = path.to_string_lossy();

    let mut position = 1usize;
    for line in reader.lines() {
        let line = line.map_err(|e| Error::io(path, e))?;
        for stem in stemmer.stems(&line) {
            index.add(&stem, &location, position);
            position += 1;
        }
    }
    Ok(())
}

/// Builds `index` from every text file under `start`, single-threaded.
pub fn build(start: &Path, index: &mut InvertedIndex) -> Result<()> {
    for path in text_files(start)? {
        if let Err(e) = parse_file(&path, index) {
            warn!("skipping {}: {e}", path.display());
        }
    }
    Ok(())
}

/// Builds the shared index from every text file under `start` with a pool of
/// `threads` workers, one task per file, local-merge per task.
pub fn build_concurrent(start: &Path, shared: &Arc<SharedIndex>, threads: usize) -> Result<()> {
    let files = text_files(start)?;
    let progress = build_progress(files.len());
    let queue = WorkQueue::with_threads(threads);

    for path in files {
        let shared = Arc::clone(shared);
        let progress = progress.clone();
        queue.execute(move || {
            let mut local = InvertedIndex::new();
            match parse_file(&path, &mut local) {
                Ok(()) => shared.add_all(local),
                Err(e) => warn!("skipping {}: {e}", path.display()),
            }
            progress.inc(1);
        });
    }

    queue.finish();
    queue.shutdown();
    progress.finish_and_clear();
    Ok(())
}

fn build_progress(files: usize) -> ProgressBar {
    let progress = ProgressBar::new(files as u64);
    progress.set_style(
        ProgressStyle::with_template("{spinner:.cyan} indexing [{bar:40.cyan/dim}] {pos}/{len}")
            .unwrap()
            .progress_chars("━━╸"),
    );
    progress
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn corpus(files: &[(&str, &str)]) -> TempDir {
        let dir = TempDir::new().unwrap();
        for (name, contents) in files {
            let path = dir.path().join(name);
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent).unwrap();
            }
            fs::write(path, contents).unwrap();
        }
        dir
    }

    #[test]
    fn walk_keeps_only_text_extensions() {
        let dir = corpus(&[
            ("a.txt", "alpha"),
            ("b.TEXT", "beta"),
            ("sub/c.txt", "gamma"),
            ("d.md", "ignored"),
            ("e", "ignored"),
        ]);

        let files = text_files(dir.path()).unwrap();
        let names: Vec<String> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names.len(), 3);
        assert!(names.contains(&"a.txt".to_string()));
        assert!(names.contains(&"b.TEXT".to_string()));
        assert!(names.contains(&"c.txt".to_string()));
    }

    #[test]
    fn missing_root_is_input_missing() {
        let err = text_files(Path::new("/definitely/not/here")).unwrap_err();
        assert!(matches!(err, Error::InputMissing(_)));
    }

    #[test]
    fn position_counter_spans_lines() {
        let dir = corpus(&[("a.txt", "one two\nthree\n\nfour")]);
        let path = dir.path().join("a.txt");

        let mut index = InvertedIndex::new();
        parse_file(&path, &mut index).unwrap();

        let location = path.to_string_lossy().into_owned();
        assert!(index.contains_position("one", &location, 1));
        assert!(index.contains_position("two", &location, 2));
        assert!(index.contains_position("three", &location, 3));
        assert!(index.contains_position("four", &location, 4));
        assert_eq!(index.counts()[&location], 4);
    }

    #[test]
    fn single_token_file() {
        let dir = corpus(&[("a.txt", "lonely")]);
        let mut index = InvertedIndex::new();
        build(dir.path(), &mut index).unwrap();

        let location = dir.path().join("a.txt").to_string_lossy().into_owned();
        assert_eq!(index.counts()[&location], 1);
        assert!(index.contains_position("lone", &location, 1));
    }

    #[test]
    fn empty_corpus_builds_empty_index() {
        let dir = corpus(&[]);
        let mut index = InvertedIndex::new();
        build(dir.path(), &mut index).unwrap();
        assert!(index.is_empty());
    }

    #[test]
    fn concurrent_build_matches_sequential() {
        let dir = corpus(&[
            ("a.txt", "the quick brown fox jumps over the lazy dog"),
            ("b.txt", "quick foxes and quick dogs"),
            ("c.txt", "nothing in common here"),
        ]);

        let mut sequential = InvertedIndex::new();
        build(dir.path(), &mut sequential).unwrap();

        let shared = Arc::new(SharedIndex::new());
        build_concurrent(dir.path(), &shared, 4).unwrap();
        let concurrent = shared.snapshot();

        assert_eq!(sequential.postings(), concurrent.postings());
        assert_eq!(sequential.counts(), concurrent.counts());
    }
}
