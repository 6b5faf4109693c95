use std::collections::HashSet;

use crate::element::{Entry, Folder, Item};

/// A visible row of the tree together with its path.
#[must_use]
pub struct Row<'a> {
    pub path: Vec<usize>,
    pub item: Item<'a>,
}

impl<'a> Row<'a> {
    /// Zero based depth. Depth 0 means top level with 0 indentation.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.path.len() - 1
    }
}

/// Get a flat list of all visible rows: every top level folder and below that whatever sits in expanded folders.
///
/// `current` starts empty: `&[]`
#[must_use]
pub fn flatten<'a>(
    expanded: &HashSet<Vec<usize>>,
    folders: &'a [Folder],
    current: &[usize],
) -> Vec<Row<'a>> {
    let mut result = Vec::new();
    for (index, folder) in folders.iter().enumerate() {
        let mut path = current.to_vec();
        path.push(index);
        push_folder(expanded, folder, path, &mut result);
    }
    result
}

fn push_folder<'a>(
    expanded: &HashSet<Vec<usize>>,
    folder: &'a Folder,
    path: Vec<usize>,
    result: &mut Vec<Row<'a>>,
) {
    let is_expanded = expanded.contains(&path);
    result.push(Row {
        path: path.clone(),
        item: Item::Folder(folder),
    });
    if !is_expanded {
        return;
    }
    for (index, entry) in folder.children().iter().enumerate() {
        let mut child_path = path.clone();
        child_path.push(index);
        match entry {
            Entry::Link(link) => result.push(Row {
                path: child_path,
                item: Item::Link(link),
            }),
            Entry::Folder(folder) => push_folder(expanded, folder, child_path, result),
        }
    }
}

#[test]
fn depth_works() {
    let mut expanded = HashSet::new();
    expanded.insert(vec![1]);
    expanded.insert(vec![1, 1]);
    let folders = Folder::example();
    let depths = flatten(&expanded, &folders, &[])
        .into_iter()
        .map(|row| row.depth())
        .collect::<Vec<_>>();
    assert_eq!(depths, [0, 0, 1, 1, 2, 2, 1, 0]);
}

#[cfg(test)]
fn flatten_works(expanded: &HashSet<Vec<usize>>, expected: &[&str]) {
    let folders = Folder::example();
    let actual = flatten(expanded, &folders, &[])
        .into_iter()
        .map(|row| match row.item {
            Item::Folder(folder) => folder.label(),
            Item::Link(link) => link.text(),
        })
        .collect::<Vec<_>>();
    assert_eq!(actual, expected);
}

#[test]
fn flatten_nothing_expanded_is_top_level() {
    let expanded = HashSet::new();
    flatten_works(&expanded, &["Alfa", "Bravo", "Hotel"]);
}

#[test]
fn flatten_child_of_collapsed_is_hidden() {
    let mut expanded = HashSet::new();
    expanded.insert(vec![1, 1]);
    flatten_works(&expanded, &["Alfa", "Bravo", "Hotel"]);
}

#[test]
fn flatten_one_is_expanded() {
    let mut expanded = HashSet::new();
    expanded.insert(vec![1]);
    flatten_works(&expanded, &["Alfa", "Bravo", "c", "Delta", "g", "Hotel"]);
}

#[test]
fn flatten_all_expanded() {
    let mut expanded = HashSet::new();
    expanded.insert(vec![0]);
    expanded.insert(vec![1]);
    expanded.insert(vec![1, 1]);
    expanded.insert(vec![2]);
    flatten_works(
        &expanded,
        &["Alfa", "a", "Bravo", "c", "Delta", "e", "f", "g", "Hotel"],
    );
}
