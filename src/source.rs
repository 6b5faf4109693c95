/*!
Where a notes document comes from.

Every fetch retrieves the current version of the document, nothing is cached.
Closures taking the URI implement [`Fetch`] too, which is handy for documents that are already in memory:

```
# use notes_tree::{Fetch, FetchError};
let fetcher = |_uri: &str| Ok::<_, FetchError>(r#"[{"name": "Rust"}]"#.to_owned());
assert_eq!(fetcher.fetch("notes.json")?, r#"[{"name": "Rust"}]"#);
# Ok::<(), FetchError>(())
```
*/

use crate::error::FetchError;

/// Retrieve the body of a document.
pub trait Fetch {
    /// # Errors
    ///
    /// Errors when the document can not be retrieved completely.
    fn fetch(&self, uri: &str) -> Result<String, FetchError>;
}

impl<F> Fetch for F
where
    F: Fn(&str) -> Result<String, FetchError>,
{
    fn fetch(&self, uri: &str) -> Result<String, FetchError> {
        self(uri)
    }
}

/// Reads documents from the file system.
#[derive(Debug, Default, Clone, Copy)]
pub struct FileFetcher;

impl Fetch for FileFetcher {
    fn fetch(&self, uri: &str) -> Result<String, FetchError> {
        std::fs::read_to_string(uri).map_err(|source| FetchError::Io {
            uri: uri.to_owned(),
            source,
        })
    }
}

/// Fetches documents over HTTP while asking every cache on the way to revalidate.
#[cfg(feature = "http")]
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    agent: ureq::Agent,
}

#[cfg(feature = "http")]
impl HttpFetcher {
    #[must_use]
    pub fn new() -> Self {
        Self {
            agent: ureq::AgentBuilder::new().build(),
        }
    }

    /// Use an already configured agent (proxy, TLS, user agent, ...).
    #[must_use]
    pub const fn with_agent(agent: ureq::Agent) -> Self {
        Self { agent }
    }
}

#[cfg(feature = "http")]
impl Default for HttpFetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "http")]
impl Fetch for HttpFetcher {
    fn fetch(&self, uri: &str) -> Result<String, FetchError> {
        let response = self
            .agent
            .get(uri)
            .set("Cache-Control", "no-cache, no-store")
            .set("Pragma", "no-cache")
            .call()
            .map_err(|error| match error {
                ureq::Error::Status(status, _) => FetchError::Status {
                    uri: uri.to_owned(),
                    status,
                },
                ureq::Error::Transport(transport) => FetchError::Transport {
                    uri: uri.to_owned(),
                    source: Box::new(transport),
                },
            })?;

        // ureq only reports >= 400 as error, redirects it could not follow end up here
        let status = response.status();
        if !(200..300).contains(&status) {
            return Err(FetchError::Status {
                uri: uri.to_owned(),
                status,
            });
        }

        response.into_string().map_err(|source| FetchError::Io {
            uri: uri.to_owned(),
            source,
        })
    }
}

/// Whether `uri` is an HTTP(S) URL. Surrounding whitespace is not skipped.
#[must_use]
pub fn is_remote(uri: &str) -> bool {
    let lower = uri.to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

/// Pick the fetcher fitting the location: HTTP(S) URLs are requested, everything else is a path.
#[cfg(feature = "http")]
#[must_use]
pub fn fetcher_for(uri: &str) -> Box<dyn Fetch + Send + Sync> {
    if is_remote(uri) {
        Box::new(HttpFetcher::new())
    } else {
        Box::new(FileFetcher)
    }
}

/// Without the `http` feature every location is a path.
#[cfg(not(feature = "http"))]
#[must_use]
pub fn fetcher_for(_uri: &str) -> Box<dyn Fetch + Send + Sync> {
    Box::new(FileFetcher)
}

#[test]
fn remote_detection() {
    assert!(is_remote("http://example.com/notes.json"));
    assert!(is_remote("HTTPS://example.com/notes.json"));
    assert!(!is_remote("notes.json"));
    assert!(!is_remote("./http/notes.json"));
    // Leading whitespace is no URL
    assert!(!is_remote(" http://example.com/notes.json"));
}

#[test]
fn file_fetcher_reads_latest_content() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("notes.json");
    let uri = path.to_str().unwrap();

    std::fs::write(&path, "[]").unwrap();
    assert_eq!(FileFetcher.fetch(uri).unwrap(), "[]");

    std::fs::write(&path, r#"[{"name": "new"}]"#).unwrap();
    assert_eq!(FileFetcher.fetch(uri).unwrap(), r#"[{"name": "new"}]"#);
}

#[test]
fn file_fetcher_missing_file() {
    let result = FileFetcher.fetch("/definitely/not/here/notes.json");
    assert!(matches!(result, Err(FetchError::Io { uri, .. }) if uri == "/definitely/not/here/notes.json"));
}

#[cfg(all(test, feature = "http"))]
mod http_tests {
    use std::io::{BufRead, BufReader, Write};
    use std::net::TcpListener;
    use std::sync::mpsc;

    use super::*;

    /// Serve exactly one request with the given raw response and hand back the request head.
    fn serve_once(response: &'static str) -> (String, mpsc::Receiver<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let uri = format!("http://{}/notes.json", listener.local_addr().unwrap());
        let (sender, receiver) = mpsc::channel();
        std::thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut reader = BufReader::new(stream.try_clone().unwrap());
            let mut head = String::new();
            loop {
                let mut line = String::new();
                reader.read_line(&mut line).unwrap();
                if line == "\r\n" || line.is_empty() {
                    break;
                }
                head.push_str(&line);
            }
            stream.write_all(response.as_bytes()).unwrap();
            stream.flush().unwrap();
            sender.send(head).unwrap();
        });
        (uri, receiver)
    }

    #[test]
    fn ok_returns_body_and_bypasses_cache() {
        let (uri, head) = serve_once(
            "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: 2\r\nConnection: close\r\n\r\n[]",
        );
        let body = HttpFetcher::new().fetch(&uri).unwrap();
        assert_eq!(body, "[]");
        let head = head.recv().unwrap().to_ascii_lowercase();
        assert!(head.contains("cache-control: no-cache"));
        assert!(head.contains("pragma: no-cache"));
    }

    #[test]
    fn not_found_is_status_error() {
        let (uri, _head) =
            serve_once("HTTP/1.1 404 Not Found\r\nContent-Length: 0\r\nConnection: close\r\n\r\n");
        let result = HttpFetcher::new().fetch(&uri);
        assert!(matches!(result, Err(FetchError::Status { status: 404, .. })));
    }

    #[test]
    fn not_modified_is_status_error() {
        let (uri, _head) =
            serve_once("HTTP/1.1 304 Not Modified\r\nContent-Length: 0\r\nConnection: close\r\n\r\n");
        let result = HttpFetcher::new().fetch(&uri);
        assert!(matches!(result, Err(FetchError::Status { status: 304, .. })));
    }

    #[test]
    fn refused_connection_is_transport_error() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let uri = format!("http://{}/notes.json", listener.local_addr().unwrap());
        drop(listener);
        let result = HttpFetcher::new().fetch(&uri);
        assert!(matches!(result, Err(FetchError::Transport { .. })));
    }
}
