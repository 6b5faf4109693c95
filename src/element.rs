use crate::node::Link;

/// Pictogram in front of a title row label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Icon {
    Folder,
}

/// The clickable row of a [`Folder`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TitleRow {
    icon: Icon,
    label: String,
}

impl TitleRow {
    #[must_use]
    pub fn new<L>(label: L) -> Self
    where
        L: Into<String>,
    {
        Self {
            icon: Icon::Folder,
            label: label.into(),
        }
    }

    #[must_use]
    pub const fn icon(&self) -> Icon {
        self.icon
    }

    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }
}

/// Content of a children region.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Entry {
    Link(Link),
    Folder(Folder),
}

/// The rendered form of a [`Node`](crate::Node): a title row and a children region.
///
/// Whether the children region is visible is not part of the element, see [`ExpansionState`](crate::ExpansionState).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Folder {
    title: TitleRow,
    children: Vec<Entry>,
}

impl Folder {
    #[must_use]
    pub fn new<L>(label: L, children: Vec<Entry>) -> Self
    where
        L: Into<String>,
    {
        Self {
            title: TitleRow::new(label),
            children,
        }
    }

    #[must_use]
    pub const fn title(&self) -> &TitleRow {
        &self.title
    }

    /// Text of the title row.
    #[must_use]
    pub fn label(&self) -> &str {
        self.title.label()
    }

    #[must_use]
    pub fn children(&self) -> &[Entry] {
        &self.children
    }

    /// Folders in this subtree including itself.
    #[must_use]
    pub fn folder_count(&self) -> usize {
        1 + self
            .children
            .iter()
            .map(|entry| match entry {
                Entry::Folder(folder) => folder.folder_count(),
                Entry::Link(_) => 0,
            })
            .sum::<usize>()
    }
}

/// Borrowed view on whatever a path points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Item<'a> {
    Folder(&'a Folder),
    Link(&'a Link),
}

/// Follow `path` into `folders`.
///
/// The first index selects the top level folder, every further one an entry of the children region.
#[must_use]
pub fn resolve<'a>(folders: &'a [Folder], path: &[usize]) -> Option<Item<'a>> {
    let (first, rest) = path.split_first()?;
    let mut current = Item::Folder(folders.get(*first)?);
    for index in rest {
        let Item::Folder(folder) = current else {
            return None;
        };
        current = match folder.children.get(*index)? {
            Entry::Folder(folder) => Item::Folder(folder),
            Entry::Link(link) => Item::Link(link),
        };
    }
    Some(current)
}

#[cfg(test)]
impl Folder {
    pub(crate) fn example() -> Vec<Self> {
        vec![
            Self::new("Alfa", vec![Entry::Link(Link::new("a", "a.md"))]),
            Self::new(
                "Bravo",
                vec![
                    Entry::Link(Link::new("c", "c.md")),
                    Entry::Folder(Self::new(
                        "Delta",
                        vec![
                            Entry::Link(Link::new("e", "e.md")),
                            Entry::Link(Link::new("f", "f.md")),
                        ],
                    )),
                    Entry::Link(Link::new("g", "g.md")),
                ],
            ),
            Self::new("Hotel", vec![]),
        ]
    }
}

#[test]
fn resolve_walks_entries() {
    let folders = Folder::example();
    assert!(matches!(resolve(&folders, &[1]), Some(Item::Folder(folder)) if folder.label() == "Bravo"));
    assert!(matches!(resolve(&folders, &[1, 1]), Some(Item::Folder(folder)) if folder.label() == "Delta"));
    assert!(matches!(resolve(&folders, &[1, 1, 0]), Some(Item::Link(link)) if link.href() == "e.md"));
}

#[test]
fn resolve_rejects_invalid_paths() {
    let folders = Folder::example();
    assert_eq!(resolve(&folders, &[]), None);
    assert_eq!(resolve(&folders, &[3]), None);
    assert_eq!(resolve(&folders, &[1, 7]), None);
    // Links have no children
    assert_eq!(resolve(&folders, &[1, 0, 0]), None);
}

#[test]
fn folder_count_is_recursive() {
    let total = Folder::example()
        .iter()
        .map(Folder::folder_count)
        .sum::<usize>();
    assert_eq!(total, 4);
}

#[test]
fn title_row_shows_folder_icon() {
    let folders = Folder::example();
    assert_eq!(folders[1].title(), &TitleRow::new("Bravo"));
    assert_eq!(folders[1].title().icon(), Icon::Folder);
    assert_eq!(folders[1].label(), "Bravo");
}
