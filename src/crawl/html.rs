//! HTML-to-text cleaning.
//!
//! Two levels of stripping, used at different points of the crawl:
//! block-element stripping keeps anchor tags alive for link extraction while
//! dropping scripts/styles/head matter whose hrefs we must not follow; full
//! tag-and-entity stripping turns the page into plain text for indexing.
//! Replacements use a space rather than the empty string so adjacent words do
//! not fuse; the tokenizer collapses the extra whitespace anyway.

use std::sync::LazyLock;

use regex::Regex;

/// Elements removed wholesale (with their contents) before link extraction.
const BLOCK_ELEMENTS: [&str; 5] = ["head", "style", "script", "noscript", "svg"];

static COMMENTS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)<!--.*?-->").unwrap());
static TAGS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)<[^>]*>").unwrap());
static ENTITIES: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"&[^\s;]+;").unwrap());
static BLOCKS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    BLOCK_ELEMENTS
        .iter()
        .map(|name| {
            Regex::new(&format!(r"(?is)<{name}\b[^>]*>.*?</{name}\s*>")).unwrap()
        })
        .collect()
});

/// Removes comments and the complete block elements, leaving inline markup
/// (and in particular anchors) in place.
pub fn strip_block_elements(html: &str) -> String {
    let mut cleaned = COMMENTS.replace_all(html, " ").into_owned();
    for block in BLOCKS.iter() {
        cleaned = block.replace_all(&cleaned, " ").into_owned();
    }
    cleaned
}

/// Replaces every remaining tag with a space.
pub fn strip_tags(html: &str) -> String {
    TAGS.replace_all(html, " ").into_owned()
}

/// Replaces every `&...;` entity with a space.
pub fn strip_entities(html: &str) -> String {
    ENTITIES.replace_all(html, " ").into_owned()
}

/// Full pipeline from (block-stripped) HTML to indexable plain text.
pub fn to_text(html: &str) -> String {
    strip_entities(&strip_tags(html))
}
