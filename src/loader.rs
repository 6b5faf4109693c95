use crate::error::LoadError;
use crate::node::{parse_document, Node, DEPTH_LIMIT, MAX_DEPTH};
use crate::source::Fetch;

/// Well-known location of the notes document.
pub const DEFAULT_SOURCE: &str = "notes.json";

/// What to load and how far to descend into it.
///
/// # Example
///
/// ```
/// # use notes_tree::LoadOptions;
/// let options = LoadOptions::new("https://example.com/notes.json").max_depth(8);
/// assert_eq!(options.get_source(), "https://example.com/notes.json");
/// assert_eq!(options.get_max_depth(), 8);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadOptions {
    source: String,
    max_depth: usize,
}

impl LoadOptions {
    /// Surrounding whitespace of `source` is dropped.
    #[must_use]
    pub fn new<S>(source: S) -> Self
    where
        S: Into<String>,
    {
        let source = source.into();
        Self {
            source: source.trim().to_owned(),
            max_depth: MAX_DEPTH,
        }
    }

    /// Bound how deep the document may nest, at most [`DEPTH_LIMIT`].
    #[must_use]
    pub const fn max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = if max_depth > DEPTH_LIMIT {
            DEPTH_LIMIT
        } else {
            max_depth
        };
        self
    }

    #[must_use]
    pub fn get_source(&self) -> &str {
        &self.source
    }

    #[must_use]
    pub const fn get_max_depth(&self) -> usize {
        self.max_depth
    }
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self::new(DEFAULT_SOURCE)
    }
}

/// Fetch and parse the notes document at `uri`.
///
/// # Errors
///
/// Errors when fetching or parsing fails. Nothing is retried.
pub fn load<F>(fetcher: &F, uri: &str) -> Result<Vec<Node>, LoadError>
where
    F: Fetch + ?Sized,
{
    load_with(fetcher, &LoadOptions::new(uri))
}

/// Same as [`load`] with all [`LoadOptions`].
///
/// # Errors
///
/// Errors when fetching or parsing fails. Nothing is retried.
pub fn load_with<F>(fetcher: &F, options: &LoadOptions) -> Result<Vec<Node>, LoadError>
where
    F: Fetch + ?Sized,
{
    log::debug!("loading notes from {}", options.source);
    let body = fetcher.fetch(&options.source)?;
    let nodes = parse_document(&body, options.max_depth)?;
    log::debug!("loaded {} top level notes from {}", nodes.len(), options.source);
    Ok(nodes)
}

#[cfg(test)]
use crate::error::{FetchError, ParseError};

#[test]
fn load_passes_uri_to_fetcher() {
    let fetcher = |uri: &str| -> Result<String, FetchError> {
        assert_eq!(uri, "somewhere/notes.json");
        Ok(r#"[{"name": "A"}, {"title": "B", "href": "b.md"}]"#.to_owned())
    };
    let nodes = load(&fetcher, "somewhere/notes.json").unwrap();
    assert_eq!(nodes, [Node::folder("A", vec![]), Node::leaf("B", "b.md")]);
}

#[test]
fn load_reports_status() {
    let fetcher = |uri: &str| -> Result<String, FetchError> {
        Err(FetchError::Status {
            uri: uri.to_owned(),
            status: 500,
        })
    };
    let result = load(&fetcher, DEFAULT_SOURCE);
    assert!(matches!(
        result,
        Err(LoadError::Fetch(FetchError::Status { status: 500, .. }))
    ));
}

#[test]
fn load_reports_parse_failure() {
    let fetcher = |_: &str| Ok::<_, FetchError>("not json".to_owned());
    let result = load(&fetcher, DEFAULT_SOURCE);
    assert!(matches!(result, Err(LoadError::Parse(ParseError::Json(_)))));
}

#[test]
fn load_with_respects_max_depth() {
    let fetcher = |_: &str| Ok::<_, FetchError>(r#"[{"name": "a", "children": [{"name": "b"}]}]"#.to_owned());
    let result = load_with(&fetcher, &LoadOptions::default().max_depth(1));
    assert!(matches!(
        result,
        Err(LoadError::Parse(ParseError::TooDeep { max_depth: 1 }))
    ));
    assert!(load_with(&fetcher, &LoadOptions::default().max_depth(2)).is_ok());
}

#[test]
fn load_works_through_boxed_fetcher() {
    let fetcher: Box<dyn Fetch> = Box::new(|_: &str| Ok::<_, FetchError>("[]".to_owned()));
    assert!(load(&*fetcher, DEFAULT_SOURCE).unwrap().is_empty());
}

#[test]
fn max_depth_is_clamped() {
    assert_eq!(LoadOptions::default().get_max_depth(), MAX_DEPTH);
    assert_eq!(LoadOptions::default().max_depth(200).get_max_depth(), DEPTH_LIMIT);

    let mut text = String::from(r#"{"name": "bottom"}"#);
    for _ in 0..DEPTH_LIMIT {
        text = format!(r#"{{"name": "level", "children": [{text}]}}"#);
    }
    let text = format!("[{text}]");
    let fetcher = move |_: &str| Ok::<_, FetchError>(text.clone());
    let result = load_with(&fetcher, &LoadOptions::default().max_depth(200));
    assert!(matches!(
        result,
        Err(LoadError::Parse(ParseError::TooDeep {
            max_depth: DEPTH_LIMIT
        }))
    ));
}

#[test]
fn source_is_trimmed() {
    let options = LoadOptions::new(" http://example.com/notes.json\n");
    assert_eq!(options.get_source(), "http://example.com/notes.json");
    assert!(crate::source::is_remote(options.get_source()));
}
