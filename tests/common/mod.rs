//! Shared test fixtures: on-disk corpora and a canned-response HTTP server
//! for crawl tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::io::{Read, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::Arc;
use std::thread;

use tempfile::TempDir;

/// Writes `files` (relative name, contents) into a fresh temp directory.
pub fn corpus(files: &[(&str, &str)]) -> TempDir {
    let dir = TempDir::new().expect("failed to create temp corpus");
    for (name, contents) in files {
        let path = dir.path().join(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("failed to create corpus subdir");
        }
        std::fs::write(path, contents).expect("failed to write corpus file");
    }
    dir
}

/// Builds an index from in-memory (location, token stream) pairs, assigning
/// 1-based positions in order. Tokens are used verbatim (no stemming), so
/// tests control index contents exactly.
pub fn index_of(docs: &[(&str, &[&str])]) -> quarry::InvertedIndex {
    let mut index = quarry::InvertedIndex::new();
    for (location, tokens) in docs {
        for (i, token) in tokens.iter().enumerate() {
            index.add(token, location, i + 1);
        }
    }
    index
}

/// One canned HTTP response.
#[derive(Clone)]
pub struct Page {
    pub status: u16,
    pub content_type: &'static str,
    pub body: String,
    pub location: Option<String>,
}

impl Page {
    pub fn html(body: impl Into<String>) -> Self {
        Page {
            status: 200,
            content_type: "text/html; charset=UTF-8",
            body: body.into(),
            location: None,
        }
    }

    pub fn plain(body: impl Into<String>) -> Self {
        Page {
            status: 200,
            content_type: "text/plain",
            body: body.into(),
            location: None,
        }
    }

    pub fn redirect(to: impl Into<String>) -> Self {
        Page {
            status: 302,
            content_type: "text/html",
            body: String::new(),
            location: Some(to.into()),
        }
    }
}

/// A minimal HTTP/1.1 server over canned pages, for exercising the crawler
/// without touching the network. Unknown paths return 404. The accept loop
/// runs on a detached thread for the lifetime of the test process.
pub struct TestServer {
    addr: SocketAddr,
}

impl TestServer {
    pub fn serve(pages: HashMap<String, Page>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").expect("failed to bind test server");
        let addr = listener.local_addr().expect("no local addr");
        let pages = Arc::new(pages);

        thread::spawn(move || {
            for stream in listener.incoming() {
                let Ok(stream) = stream else { continue };
                let pages = Arc::clone(&pages);
                thread::spawn(move || handle(stream, &pages));
            }
        });

        TestServer { addr }
    }

    /// Absolute URL for `path` on this server.
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

fn handle(mut stream: TcpStream, pages: &HashMap<String, Page>) {
    let mut buffer = [0u8; 4096];
    let mut request = Vec::new();
    // Read until the end of headers; the crawler only ever sends GETs.
    loop {
        let Ok(n) = stream.read(&mut buffer) else { return };
        if n == 0 {
            break;
        }
        request.extend_from_slice(&buffer[..n]);
        if request.windows(4).any(|w| w == b"\r\n\r\n") {
            break;
        }
    }

    let request = String::from_utf8_lossy(&request);
    let path = request
        .lines()
        .next()
        .and_then(|line| line.split_whitespace().nth(1))
        .unwrap_or("/")
        .to_string();

    let response = match pages.get(&path) {
        Some(page) => {
            let mut head = format!(
                "HTTP/1.1 {} {}\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n",
                page.status,
                reason(page.status),
                page.content_type,
                page.body.len(),
            );
            if let Some(location) = &page.location {
                head.push_str(&format!("Location: {location}\r\n"));
            }
            format!("{head}\r\n{}", page.body)
        }
        None => "HTTP/1.1 404 Not Found\r\nContent-Length: 0\r\nConnection: close\r\n\r\n".to_string(),
    };

    let _ = stream.write_all(response.as_bytes());
}

fn reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        302 => "Found",
        404 => "Not Found",
        _ => "Unknown",
    }
}

/// An HTML page whose body links to each of `targets` in order.
pub fn page_with_links(text: &str, targets: &[&str]) -> String {
    let anchors: String = targets
        .iter()
        .map(|t| format!("<a href=\"{t}\">link</a>"))
        .collect();
    format!("<html><head><title>t</title></head><body><p>{text}</p>{anchors}</body></html>")
}
