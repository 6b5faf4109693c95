use crate::element::{Entry, Folder};
use crate::node::Node;
#[cfg(test)]
use crate::node::Link;

/// Materialize a [`Node`] and all of its descendants.
///
/// The children region holds the node's own link first, followed by its children in order.
/// Leaf children become links, every other child becomes a nested [`Folder`].
///
/// # Example
///
/// ```
/// # use notes_tree::{render, Entry, Node};
/// let node = Node::folder("X", vec![Node::leaf("Y", "http://e.x")]);
/// let folder = render(&node);
/// assert_eq!(folder.label(), "X");
/// assert!(matches!(&folder.children()[0], Entry::Link(link) if link.href() == "http://e.x"));
/// ```
#[must_use]
pub fn render(node: &Node) -> Folder {
    let own_link = node.link().cloned().map(Entry::Link);
    let children = node.children().iter().map(|child| match child {
        Node::Leaf { link, .. } => Entry::Link(link.clone()),
        Node::Folder { .. } | Node::MixedFolder { .. } => Entry::Folder(render(child)),
    });
    Folder::new(node.label(), own_link.into_iter().chain(children).collect())
}

/// Render every top level node. Each one becomes a [`Folder`], bare leaves included.
#[must_use]
pub fn render_all(nodes: &[Node]) -> Vec<Folder> {
    nodes.iter().map(render).collect()
}

#[test]
fn top_level_leaf_becomes_folder_holding_its_link() {
    let folders = render_all(&[Node::leaf("Readme", "readme.md")]);
    assert_eq!(
        folders,
        [Folder::new(
            "Readme",
            vec![Entry::Link(Link::new("Readme", "readme.md"))]
        )]
    );
}

#[test]
fn mixed_folder_keeps_link_and_children() {
    let node = Node::mixed(
        "Rust",
        "rust.md",
        vec![
            Node::leaf("Ownership", "ownership.md"),
            Node::folder("Async", vec![]),
        ],
    );
    assert_eq!(
        render(&node),
        Folder::new(
            "Rust",
            vec![
                Entry::Link(Link::new("Rust", "rust.md")),
                Entry::Link(Link::new("Ownership", "ownership.md")),
                Entry::Folder(Folder::new("Async", vec![])),
            ]
        )
    );
}

#[test]
fn nested_mixed_folder_stays_a_folder() {
    let node = Node::folder(
        "Top",
        vec![Node::mixed("Inner", "inner.md", vec![Node::leaf("Deep", "deep.md")])],
    );
    let folder = render(&node);
    let Entry::Folder(inner) = &folder.children()[0] else {
        panic!("inner should be a folder");
    };
    assert_eq!(inner.children().len(), 2);
}

#[test]
fn top_level_count_matches_input() {
    let nodes = vec![
        Node::folder("a", vec![]),
        Node::leaf("b", "b.md"),
        Node::mixed("c", "c.md", vec![]),
    ];
    assert_eq!(render_all(&nodes).len(), nodes.len());
}
