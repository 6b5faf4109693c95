//! Errors of loading a notes document.
//!
//! Both kinds end up in the same place: [`Host`](crate::Host) logs them and shows its fallback message.

/// The document could not be retrieved.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// The server answered with a non-success status.
    #[error("fetching {uri} failed with status {status}")]
    Status { uri: String, status: u16 },

    /// The request did not reach the server or the connection broke.
    #[cfg(feature = "http")]
    #[error("fetching {uri} failed")]
    Transport {
        uri: String,
        #[source]
        source: Box<ureq::Transport>,
    },

    /// Reading the body or a local file failed.
    #[error("reading {uri} failed")]
    Io {
        uri: String,
        #[source]
        source: std::io::Error,
    },
}

/// The document was retrieved but is not a notes hierarchy.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("invalid JSON")]
    Json(#[from] serde_json::Error),

    #[error("the document is not a JSON array")]
    NotAnArray,

    /// `path` holds the indices from the top level array down to the offending element.
    #[error("element at {path:?} is not a JSON object")]
    NotAnObject { path: Vec<usize> },

    #[error("the document is nested deeper than {max_depth} levels")]
    TooDeep { max_depth: usize },
}

/// Either [`FetchError`] or [`ParseError`].
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Parse(#[from] ParseError),
}

#[test]
fn status_error_names_uri_and_status() {
    let error = FetchError::Status {
        uri: "notes.json".to_owned(),
        status: 404,
    };
    assert_eq!(
        error.to_string(),
        "fetching notes.json failed with status 404"
    );
}

#[test]
fn load_error_is_transparent() {
    let error = LoadError::from(ParseError::TooDeep { max_depth: 3 });
    assert_eq!(
        error.to_string(),
        "the document is nested deeper than 3 levels"
    );
}

#[test]
fn json_error_keeps_its_source() {
    let json = serde_json::from_str::<serde_json::Value>("[").unwrap_err();
    let error = LoadError::from(ParseError::from(json));
    let source = std::error::Error::source(&error).expect("transparent forwards the source");
    assert!(source.downcast_ref::<serde_json::Error>().is_some());
}
