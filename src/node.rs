use serde_json::{Map, Value};

use crate::error::ParseError;

/// Default bound of how deep a document may nest.
pub const MAX_DEPTH: usize = 32;

/// Largest bound [`parse_document`] enforces on its own.
///
/// Every level nests an object in an array and `serde_json` stops at 128 nested values.
/// Bounds above this are clamped so that one level too deep still reports [`ParseError::TooDeep`].
pub const DEPTH_LIMIT: usize = 62;

/// Where a link is opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    /// A new browsing context, detached from the tree.
    NewContext,
}

/// What the opened target learns about where the link was followed from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Referrer {
    /// Neither referrer nor a handle to the opener is passed on.
    NoReferrer,
}

/// Something the reader can navigate to.
///
/// Links are always opened in a new context without referrer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    text: String,
    href: String,
}

impl Link {
    #[must_use]
    pub fn new<T, H>(text: T, href: H) -> Self
    where
        T: Into<String>,
        H: Into<String>,
    {
        Self {
            text: text.into(),
            href: href.into(),
        }
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub fn href(&self) -> &str {
        &self.href
    }

    #[must_use]
    pub const fn target(&self) -> Target {
        Target::NewContext
    }

    #[must_use]
    pub const fn referrer(&self) -> Referrer {
        Referrer::NoReferrer
    }
}

/// One entry of the notes hierarchy.
///
/// `children` keep the order of the document.
///
/// # Example
///
/// ```
/// # use notes_tree::Node;
/// let note = Node::leaf("Ownership", "https://example.com/ownership");
/// let rust = Node::folder("Rust", vec![note]);
/// assert_eq!(rust.children().len(), 1);
/// assert!(rust.link().is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Leaf {
        label: String,
        link: Link,
    },
    Folder {
        label: String,
        children: Vec<Node>,
    },
    /// A folder whose title is a link on its own.
    MixedFolder {
        label: String,
        link: Link,
        children: Vec<Node>,
    },
}

impl Node {
    /// Create a [`Node::Leaf`] whose link text is its label.
    #[must_use]
    pub fn leaf<L, H>(label: L, href: H) -> Self
    where
        L: Into<String>,
        H: Into<String>,
    {
        let label = label.into();
        Self::Leaf {
            link: Link::new(label.clone(), href),
            label,
        }
    }

    #[must_use]
    pub fn folder<L>(label: L, children: Vec<Self>) -> Self
    where
        L: Into<String>,
    {
        Self::Folder {
            label: label.into(),
            children,
        }
    }

    /// Create a [`Node::MixedFolder`] whose link text is its label.
    #[must_use]
    pub fn mixed<L, H>(label: L, href: H, children: Vec<Self>) -> Self
    where
        L: Into<String>,
        H: Into<String>,
    {
        let label = label.into();
        Self::MixedFolder {
            link: Link::new(label.clone(), href),
            label,
            children,
        }
    }

    #[must_use]
    pub fn label(&self) -> &str {
        match self {
            Self::Leaf { label, .. }
            | Self::Folder { label, .. }
            | Self::MixedFolder { label, .. } => label,
        }
    }

    #[must_use]
    pub const fn link(&self) -> Option<&Link> {
        match self {
            Self::Leaf { link, .. } | Self::MixedFolder { link, .. } => Some(link),
            Self::Folder { .. } => None,
        }
    }

    #[must_use]
    pub fn children(&self) -> &[Self] {
        match self {
            Self::Leaf { .. } => &[],
            Self::Folder { children, .. } | Self::MixedFolder { children, .. } => children,
        }
    }

    /// Levels of this node including itself.
    #[must_use]
    pub fn depth(&self) -> usize {
        1 + self.children().iter().map(Self::depth).max().unwrap_or(0)
    }
}

/// Parse the text of a notes document.
///
/// # Errors
///
/// Errors when the text is no JSON, the JSON is not an array of objects or it nests deeper than `max_depth`.
/// `max_depth` is clamped to [`DEPTH_LIMIT`].
pub fn parse_document(text: &str, max_depth: usize) -> Result<Vec<Node>, ParseError> {
    let value = serde_json::from_str::<Value>(text)?;
    parse_nodes(&value, max_depth.min(DEPTH_LIMIT))
}

/// Create [`Node`]s from the top level array of a notes document.
///
/// # Errors
///
/// Errors when `root` is not an array of objects or nests deeper than `max_depth`.
pub fn parse_nodes(root: &Value, max_depth: usize) -> Result<Vec<Node>, ParseError> {
    let Value::Array(array) = root else {
        return Err(ParseError::NotAnArray);
    };
    let mut path = Vec::new();
    from_array(array, &mut path, max_depth)
}

fn from_array(
    array: &[Value],
    path: &mut Vec<usize>,
    max_depth: usize,
) -> Result<Vec<Node>, ParseError> {
    if path.len() >= max_depth && !array.is_empty() {
        return Err(ParseError::TooDeep { max_depth });
    }
    let mut result = Vec::with_capacity(array.len());
    for (index, value) in array.iter().enumerate() {
        path.push(index);
        let node = match value {
            Value::Object(object) => from_object(object, path, max_depth)?,
            _ => return Err(ParseError::NotAnObject { path: path.clone() }),
        };
        path.pop();
        result.push(node);
    }
    Ok(result)
}

fn non_empty_str<'a>(object: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    object
        .get(key)
        .and_then(Value::as_str)
        .filter(|value| !value.is_empty())
}

/// Whether a field counts as set: `null`, `false`, `0` and `""` do not.
fn is_set(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(value) => *value,
        Value::Number(number) => number.as_f64().is_some_and(|number| number.abs() > 0.0),
        Value::String(value) => !value.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn from_object(
    object: &Map<String, Value>,
    path: &mut Vec<usize>,
    max_depth: usize,
) -> Result<Node, ParseError> {
    let name = non_empty_str(object, "name");
    let title = non_empty_str(object, "title");
    let label = name.or(title).unwrap_or_default().to_owned();

    let link = non_empty_str(object, "href").map(|href| {
        let text = title.or(name).unwrap_or(href);
        Link::new(text, href)
    });

    // Any set `children` makes a folder, only an array fills it
    let children = match object.get("children") {
        Some(Value::Array(array)) => Some(from_array(array, path, max_depth)?),
        Some(value) if is_set(value) => Some(Vec::new()),
        _ => None,
    };

    Ok(match (link, children) {
        (Some(link), None) => Node::Leaf { label, link },
        (Some(link), Some(children)) => Node::MixedFolder {
            label,
            link,
            children,
        },
        (None, children) => Node::Folder {
            label,
            children: children.unwrap_or_default(),
        },
    })
}

#[cfg(test)]
fn parse(text: &str) -> Vec<Node> {
    parse_document(text, MAX_DEPTH).unwrap()
}

#[test]
fn folder_with_leaf() {
    let nodes = parse(r#"[{"name": "X", "children": [{"title": "Y", "href": "http://e.x"}]}]"#);
    assert_eq!(
        nodes,
        [Node::folder("X", vec![Node::leaf("Y", "http://e.x")])]
    );
}

#[test]
fn name_wins_for_label_title_wins_for_link_text() {
    let nodes = parse(r#"[{"name": "Folder", "title": "Note", "href": "a.md", "children": []}]"#);
    assert_eq!(
        nodes,
        [Node::MixedFolder {
            label: "Folder".to_owned(),
            link: Link::new("Note", "a.md"),
            children: Vec::new(),
        }]
    );
}

#[test]
fn link_text_falls_back_to_href() {
    let nodes = parse(r#"[{"href": "a.md"}]"#);
    assert_eq!(nodes[0].label(), "");
    assert_eq!(nodes[0].link(), Some(&Link::new("a.md", "a.md")));
}

#[test]
fn missing_fields_are_an_empty_folder() {
    let nodes = parse(r#"[{}, {"name": "Empty", "children": "nope"}, {"name": "", "href": ""}]"#);
    assert_eq!(
        nodes,
        [
            Node::folder("", Vec::new()),
            Node::folder("Empty", Vec::new()),
            Node::folder("", Vec::new()),
        ]
    );
}

#[test]
fn order_is_kept() {
    let nodes = parse(
        r#"[{"name": "b"}, {"name": "a", "children": [{"title": "z", "href": "z"}, {"title": "y", "href": "y"}]}]"#,
    );
    let labels = nodes.iter().map(Node::label).collect::<Vec<_>>();
    assert_eq!(labels, ["b", "a"]);
    let labels = nodes[1].children().iter().map(Node::label).collect::<Vec<_>>();
    assert_eq!(labels, ["z", "y"]);
}

#[test]
fn not_an_array_fails() {
    let result = parse_document(r#"{"name": "X"}"#, MAX_DEPTH);
    assert!(matches!(result, Err(ParseError::NotAnArray)));
}

#[test]
fn invalid_json_fails() {
    let result = parse_document("<html>not found</html>", MAX_DEPTH);
    assert!(matches!(result, Err(ParseError::Json(_))));
}

#[test]
fn non_object_element_reports_its_path() {
    let result = parse_document(r#"[{"name": "X", "children": [{}, 42]}]"#, MAX_DEPTH);
    match result {
        Err(ParseError::NotAnObject { path }) => assert_eq!(path, [0, 1]),
        other => panic!("unexpected {other:?}"),
    }
}

#[cfg(test)]
fn nested(levels: usize) -> String {
    let mut text = String::from(r#"{"name": "bottom"}"#);
    for _ in 1..levels {
        text = format!(r#"{{"name": "level", "children": [{text}]}}"#);
    }
    format!("[{text}]")
}

#[test]
fn depth_guard_allows_max_depth() {
    let nodes = parse_document(&nested(4), 4).unwrap();
    assert_eq!(nodes[0].depth(), 4);
}

#[test]
fn depth_guard_rejects_deeper_documents() {
    let result = parse_document(&nested(5), 4);
    assert!(matches!(result, Err(ParseError::TooDeep { max_depth: 4 })));
}

#[test]
fn default_depth_guard() {
    let nodes = parse_document(&nested(MAX_DEPTH), MAX_DEPTH).unwrap();
    assert_eq!(nodes[0].depth(), MAX_DEPTH);
    let result = parse_document(&nested(MAX_DEPTH + 1), MAX_DEPTH);
    assert!(matches!(result, Err(ParseError::TooDeep { max_depth: MAX_DEPTH })));
}

#[test]
fn depth_guard_is_clamped_below_json_nesting_limit() {
    let nodes = parse_document(&nested(DEPTH_LIMIT), usize::MAX).unwrap();
    assert_eq!(nodes[0].depth(), DEPTH_LIMIT);
    let result = parse_document(&nested(DEPTH_LIMIT + 1), 200);
    assert!(matches!(result, Err(ParseError::TooDeep { max_depth: DEPTH_LIMIT })));
}

#[test]
fn set_non_array_children_make_a_folder() {
    let nodes = parse(
        r#"[{"name": "X", "children": [
            {"title": "a", "href": "a.md", "children": "soon"},
            {"title": "b", "href": "b.md", "children": {}},
            {"title": "c", "href": "c.md", "children": null},
            {"title": "d", "href": "d.md", "children": false},
            {"title": "e", "href": "e.md", "children": ""},
            {"title": "f", "href": "f.md", "children": 0}
        ]}]"#,
    );
    assert_eq!(
        nodes[0].children(),
        [
            Node::mixed("a", "a.md", Vec::new()),
            Node::mixed("b", "b.md", Vec::new()),
            Node::leaf("c", "c.md"),
            Node::leaf("d", "d.md"),
            Node::leaf("e", "e.md"),
            Node::leaf("f", "f.md"),
        ]
    );
}

#[test]
fn links_open_detached() {
    let link = Link::new("Y", "http://e.x");
    assert_eq!(link.target(), Target::NewContext);
    assert_eq!(link.referrer(), Referrer::NoReferrer);
}
