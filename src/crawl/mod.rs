// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Bounded breadth-first web crawl feeding the shared index.
//!
//! The crawl budget counts *submissions*, not successes: a unit of budget is
//! spent the moment a URL is handed to the work queue, so retries or dead
//! links can never push the crawl past its cap. Budget and the seen-URL set
//! live behind one mutex, and the whole check-seen / mark-seen / decrement /
//! submit step is a single critical section — splitting it is how a racing
//! crawl over-submits.
//!
//! Each crawl task indexes its page through the same local-merge pattern as
//! the file builder: tokenize into a private index, one `add_all` into the
//! shared one. The seed page is indexed exactly once, inline from the HTML
//! already fetched for link discovery, and never re-fetched.
//!
//! All crawl state is per-instance; independent crawlers never contend.

mod fetch;
pub mod html;
pub mod links;

pub use fetch::PageFetcher;

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use tracing::{info, warn};
use url::Url;

use crate::error::{Error, Result};
use crate::index::InvertedIndex;
use crate::shared::SharedIndex;
use crate::sync::WorkQueue;
use crate::text::WordStemmer;

struct CrawlState {
    /// Remaining crawl submissions.
    budget: usize,
    /// Every URL already discovered or submitted, as a cleaned string.
    seen: HashSet<String>,
}

/// A bounded concurrent crawler over one seed URL.
#[derive(Clone)]
pub struct Crawler {
    shared: Arc<SharedIndex>,
    queue: Arc<WorkQueue>,
    fetcher: Arc<PageFetcher>,
    state: Arc<Mutex<CrawlState>>,
}

impl Crawler {
    /// Creates a crawler that will submit at most `limit` page crawls to a
    /// pool of `threads` workers.
    pub fn new(shared: Arc<SharedIndex>, limit: usize, threads: usize) -> Self {
        Crawler {
            shared,
            queue: Arc::new(WorkQueue::with_threads(threads)),
            fetcher: Arc::new(PageFetcher::new()),
            state: Arc::new(Mutex::new(CrawlState {
                budget: limit,
                seen: HashSet::new(),
            })),
        }
    }

    /// Crawls from `seed`, following up to `redirects` redirects per fetch,
    /// and blocks until the whole bounded crawl has drained.
    ///
    /// Consumes the crawl: the worker pool is shut down before returning.
    pub fn run(&self, seed: &str, redirects: usize) -> Result<()> {
        let seed_url = Url::parse(seed).map_err(|source| Error::MalformedUrl {
            url: seed.to_string(),
            source,
        })?;
        let seed_url = links::clean(&seed_url);

        if self.state.lock().unwrap().budget == 0 {
            self.queue.shutdown();
            return Ok(());
        }

        let Some(page) = self.fetcher.fetch(seed_url.as_str(), redirects) else {
            warn!("seed {seed_url} did not yield html; nothing to crawl");
            self.queue.shutdown();
            return Ok(());
        };

        let link_html = html::strip_block_elements(&page);
        let discovered = links::links(&seed_url, &link_html);
        {
            let mut state = self.state.lock().unwrap();
            state.seen.insert(seed_url.to_string());
            state.seen.extend(discovered.iter().cloned());
            // The seed consumes the first unit of budget.
            state.budget -= 1;
            for link in discovered {
                if link == seed_url.as_str() {
                    continue;
                }
                if state.budget == 0 {
                    break;
                }
                state.budget -= 1;
                self.submit(link, redirects);
            }
        }

        // Index the seed once, from the html we already have.
        self.index_page(seed_url.as_str(), &link_html);

        self.queue.finish();
        self.queue.shutdown();
        info!("crawl from {seed_url} complete");
        Ok(())
    }

    fn submit(&self, url: String, redirects: usize) {
        let crawler = self.clone();
        self.queue.execute(move || crawler.crawl_page(&url, redirects));
    }

    /// One crawl task: fetch, discover, then index via local merge.
    fn crawl_page(&self, url: &str, redirects: usize) {
        let Some(page) = self.fetcher.fetch(url, redirects) else {
            return;
        };
        let link_html = html::strip_block_elements(&page);

        if let Ok(base) = Url::parse(url) {
            let found = links::links(&base, &link_html);
            let mut state = self.state.lock().unwrap();
            for link in found {
                if state.budget == 0 {
                    break;
                }
                if state.seen.insert(link.clone()) {
                    state.budget -= 1;
                    self.submit(link, redirects);
                }
            }
        }

        self.index_page(url, &link_html);
    }

    /// Tokenizes the page text into a local index and bulk-merges it.
    fn index_page(&self, location: &str, link_html: &str) {
        let text = html::to_text(link_html);
        let stemmer = WordStemmer::new();
        let mut local = InvertedIndex::new();
        let mut position = 1usize;
        for stem in stemmer.stems(&text) {
            local.add(&stem, location, position);
            position += 1;
        }
        self.shared.add_all(local);
    }

    /// Number of URLs discovered so far (seen set size); mostly useful for
    /// inspecting a finished crawl.
    pub fn seen_count(&self) -> usize {
        self.state.lock().unwrap().seen.len()
    }

    /// Budget still unspent after the crawl.
    pub fn remaining_budget(&self) -> usize {
        self.state.lock().unwrap().budget
    }
}
