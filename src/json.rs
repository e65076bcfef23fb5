//! Pretty JSON output for the index, the per-location counts, and the ranked
//! search results.
//!
//! The formats are part of the tool's contract: tab indentation, one element
//! per line, keys in the containers' sorted iteration order, and scores with
//! exactly eight decimal digits. Hand-rolled rather than `serde_json` because
//! a generic pretty-printer controls none of those things. Determinism falls
//! out of the ordered maps: byte-identical corpora produce byte-identical
//! files regardless of thread count.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use crate::error::{Error, Result};
use crate::index::{InvertedIndex, SearchResult};

/// Renders the full index as `{ stem: { location: [positions...] } }`.
pub fn index_to_string(index: &InvertedIndex) -> String {
    let mut out = String::from("{");
    let mut first_stem = true;
    for (stem, locations) in index.postings() {
        if !first_stem {
            out.push(',');
        }
        first_stem = false;
        out.push('\n');
        out.push('\t');
        push_quoted(&mut out, stem);
        out.push_str(": {");
        let mut first_location = true;
        for (location, positions) in locations {
            if !first_location {
                out.push(',');
            }
            first_location = false;
            out.push_str("\n\t\t");
            push_quoted(&mut out, location);
            out.push_str(": [");
            let mut first_position = true;
            for position in positions {
                if !first_position {
                    out.push(',');
                }
                first_position = false;
                out.push_str("\n\t\t\t");
                out.push_str(&position.to_string());
            }
            if !positions.is_empty() {
                out.push_str("\n\t\t");
            }
            out.push(']');
        }
        out.push_str("\n\t}");
    }
    out.push_str("\n}");
    out
}

/// Renders the per-location token counts as `{ location: count }`.
pub fn counts_to_string(counts: &BTreeMap<String, usize>) -> String {
    let mut out = String::from("{");
    let mut first = true;
    for (location, count) in counts {
        if !first {
            out.push(',');
        }
        first = false;
        out.push('\n');
        out.push('\t');
        push_quoted(&mut out, location);
        out.push_str(": ");
        out.push_str(&count.to_string());
    }
    out.push_str("\n}");
    out
}

/// Renders the ranked results per canonical query:
/// `{ query: [ { "where": ..., "count": ..., "score": ... } ] }`.
///
/// Scores carry exactly eight decimal digits.
pub fn results_to_string(results: &BTreeMap<String, Vec<SearchResult>>) -> String {
    let mut out = String::from("{");
    let mut first_query = true;
    for (query, ranked) in results {
        if !first_query {
            out.push(',');
        }
        first_query = false;
        out.push('\n');
        out.push('\t');
        push_quoted(&mut out, query);
        out.push_str(": [");
        let mut first_result = true;
        for result in ranked {
            if !first_result {
                out.push(',');
            }
            first_result = false;
            out.push_str("\n\t\t{\n\t\t\t\"where\": ");
            push_quoted(&mut out, &result.location);
            out.push_str(",\n\t\t\t\"count\": ");
            out.push_str(&result.matches.to_string());
            out.push_str(",\n\t\t\t\"score\": ");
            out.push_str(&format!("{:.8}", result.score));
            out.push_str("\n\t\t}");
        }
        if !ranked.is_empty() {
            out.push_str("\n\t");
        }
        out.push(']');
    }
    out.push_str("\n}");
    out
}

/// Writes the index JSON to `path`.
pub fn write_index(index: &InvertedIndex, path: &Path) -> Result<()> {
    fs::write(path, index_to_string(index)).map_err(|e| Error::io(path, e))
}

/// Writes the counts JSON to `path`.
pub fn write_counts(counts: &BTreeMap<String, usize>, path: &Path) -> Result<()> {
    fs::write(path, counts_to_string(counts)).map_err(|e| Error::io(path, e))
}

/// Writes the results JSON to `path`.
pub fn write_results(results: &BTreeMap<String, Vec<SearchResult>>, path: &Path) -> Result<()> {
    fs::write(path, results_to_string(results)).map_err(|e| Error::io(path, e))
}

/// Appends `value` quoted, escaping backslashes and double quotes (paths and
/// URLs can contain both).
fn push_quoted(out: &mut String, value: &str) {
    out.push('"');
    for c in value.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            _ => out.push(c),
        }
    }
    out.push('"');
}
