// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! HTML fetching over HTTP(S).
//!
//! The contract the crawler relies on: a fetch yields `Some(body)` iff the
//! final response is status 200 with a Content-Type starting with
//! `text/html`; anything else — transport errors, non-HTML content, redirect
//! chains longer than the budget — is `None`. Redirects are followed
//! manually (the client's automatic redirects are disabled) so the caller's
//! redirect budget is enforced exactly.

use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::{CONTENT_TYPE, LOCATION};
use reqwest::redirect::Policy;
use tracing::{debug, warn};
use url::Url;

use crate::error::{Error, Result};

/// A blocking HTTP client shared by all crawl tasks.
pub struct PageFetcher {
    client: Client,
}

impl PageFetcher {
    pub fn new() -> Self {
        let client = Client::builder()
            .redirect(Policy::none())
            .timeout(Duration::from_secs(30))
            .build()
            .expect("failed to construct http client");
        PageFetcher { client }
    }

    /// Fetches `url`, following at most `redirects` redirects, logging any
    /// failure and flattening it to `None`.
    ///
    /// The crawl is best-effort; a dead link is noise on stderr, not an
    /// error that stops anything.
    pub fn fetch(&self, url: &str, redirects: usize) -> Option<String> {
        match self.try_fetch(url, redirects) {
            Ok(body) => body,
            Err(e) => {
                warn!("{e}");
                None
            }
        }
    }

    /// Fetches `url`, following at most `redirects` redirects.
    ///
    /// `Ok(Some(body))` only for a final `200 text/html` response;
    /// `Ok(None)` for non-HTML content, exhausted redirect budgets, and
    /// other well-formed refusals; `Err` for malformed URLs and transport
    /// failures.
    pub fn try_fetch(&self, url: &str, redirects: usize) -> Result<Option<String>> {
        let mut current = Url::parse(url).map_err(|source| Error::MalformedUrl {
            url: url.to_string(),
            source,
        })?;

        let mut remaining = redirects;
        loop {
            let response = self
                .client
                .get(current.clone())
                .send()
                .map_err(|source| Error::Fetch {
                    url: current.to_string(),
                    source,
                })?;

            let status = response.status();
            if status.as_u16() == 200 {
                if !is_html(&response) {
                    debug!("skipping non-html content at {current}");
                    return Ok(None);
                }
                return response
                    .text()
                    .map(Some)
                    .map_err(|source| Error::Fetch {
                        url: current.to_string(),
                        source,
                    });
            }

            if status.is_redirection() && remaining > 0 {
                let Some(next) = response
                    .headers()
                    .get(LOCATION)
                    .and_then(|value| value.to_str().ok())
                    .and_then(|location| current.join(location).ok())
                else {
                    debug!("redirect from {current} without a usable location");
                    return Ok(None);
                };
                remaining -= 1;
                current = next;
                continue;
            }

            debug!("giving up on {current}: status {status}");
            return Ok(None);
        }
    }
}

impl Default for PageFetcher {
    fn default() -> Self {
        Self::new()
    }
}

fn is_html(response: &reqwest::blocking::Response) -> bool {
    response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.to_ascii_lowercase().starts_with("text/html"))
}
