//! Link extraction from anchor tags.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use tracing::warn;
use url::Url;

/// `href` attribute values of anchor tags, in document order.
static HREF: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?is)<a[^>]+href\s*=\s*"(.+?)""#).unwrap());

/// Strips the fragment from a URL; the `url` crate already normalizes
/// escaping, so two spellings of the same page compare equal as strings.
pub fn clean(url: &Url) -> Url {
    let mut cleaned = url.clone();
    cleaned.set_fragment(None);
    cleaned
}

/// Returns the cleaned absolute http(s) links found in `html`'s anchor hrefs,
/// resolved against `base`, de-duplicated, in document order.
pub fn links(base: &Url, html: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut found = Vec::new();
    for capture in HREF.captures_iter(html) {
        let href = &capture[1];
        match base.join(href) {
            Ok(absolute) => {
                let absolute = clean(&absolute);
                if !matches!(absolute.scheme(), "http" | "https") {
                    continue;
                }
                let link = absolute.to_string();
                if seen.insert(link.clone()) {
                    found.push(link);
                }
            }
            Err(e) => warn!("malformed href {href:?}: {e}"),
        }
    }
    found
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Url {
        Url::parse("https://example.com/docs/page.html").unwrap()
    }

    #[test]
    fn relative_links_resolve_against_base() {
        let found = links(&base(), r#"<a href="other.html">x</a>"#);
        assert_eq!(found, ["https://example.com/docs/other.html"]);
    }

    #[test]
    fn fragments_are_stripped() {
        let found = links(&base(), r#"<a href="https://example.com/a#section">x</a>"#);
        assert_eq!(found, ["https://example.com/a"]);
    }

    #[test]
    fn non_http_schemes_are_dropped() {
        let html = r#"<a href="mailto:x@example.com">m</a><a href="ftp://example.com/f">f</a><a href="/ok">k</a>"#;
        let found = links(&base(), html);
        assert_eq!(found, ["https://example.com/ok"]);
    }

    #[test]
    fn document_order_and_dedup() {
        let html = r#"<a href="/b">1</a><a href="/a">2</a><a href="/b">3</a>"#;
        let found = links(&base(), html);
        assert_eq!(found, ["https://example.com/b", "https://example.com/a"]);
    }

    #[test]
    fn same_page_fragments_collapse_after_cleaning() {
        let html = r#"<a href="/a#one">1</a><a href="/a#two">2</a>"#;
        assert_eq!(links(&base(), html), ["https://example.com/a"]);
    }

    #[test]
    fn clean_is_idempotent() {
        let url = Url::parse("https://example.com/a?q=1#frag").unwrap();
        let once = clean(&url);
        assert_eq!(once, clean(&once));
        assert_eq!(once.as_str(), "https://example.com/a?q=1");
    }
}
