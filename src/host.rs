use crate::element::{resolve, Folder, Item};
use crate::error::LoadError;
use crate::expansion::{ExpansionState, Indicator, ToggleEffect};
use crate::flatten::{flatten, Row};
use crate::loader::{load_with, LoadOptions};
use crate::node::{Link, Node};
use crate::render::render_all;
use crate::source::Fetch;

/// Well-known identifier of the container receiving the notes tree.
pub const HOST_ID: &str = "tree-root";

/// Shown instead of the tree when loading fails.
pub const DEFAULT_FALLBACK_MESSAGE: &str = "No notes available. Please upload notes.json";

/// Everything a [`Host`] can show.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Content {
    Empty,
    Tree(Vec<Folder>),
    Fallback(String),
}

/// Identifies one load request. Later requests have greater tickets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Ticket(u64);

/// What [`Host::finish`] did with a load result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    /// The content was replaced with a tree of this many top level folders.
    Tree { folders: usize },
    /// Loading failed, the content was replaced with the fallback message.
    Fallback,
    /// A newer request was issued meanwhile, the content is untouched.
    Stale,
}

/// Result of a click on the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Click {
    /// The title row of the folder at `path` was clicked.
    Toggled { path: Vec<usize>, expanded: bool },
    /// A link was clicked. Following it is up to the caller.
    Link(Link),
    /// Nothing clickable is there.
    Missed,
}

/// The container the notes tree is rendered into.
///
/// Its content is always replaced as a whole.
/// Replacing it also forgets which folders were expanded.
///
/// # Example
///
/// ```
/// # use notes_tree::{Applied, Content, FetchError, Host, LoadOptions};
/// let fetcher = |_: &str| Ok::<_, FetchError>(r#"[{"name": "Rust", "children": []}]"#.to_owned());
/// let mut host = Host::default();
/// assert_eq!(host.mount(&fetcher, &LoadOptions::default()), Applied::Tree { folders: 1 });
/// assert!(matches!(host.content(), Content::Tree(folders) if folders.len() == 1));
/// ```
#[derive(Debug, Clone)]
pub struct Host {
    id: String,
    fallback_message: String,
    pub(super) content: Content,
    pub(super) expansion: ExpansionState,
    issued: u64,
}

impl Default for Host {
    fn default() -> Self {
        Self::new(HOST_ID)
    }
}

impl Host {
    #[must_use]
    pub fn new<I>(id: I) -> Self
    where
        I: Into<String>,
    {
        Self {
            id: id.into(),
            fallback_message: DEFAULT_FALLBACK_MESSAGE.to_owned(),
            content: Content::Empty,
            expansion: ExpansionState::default(),
            issued: 0,
        }
    }

    #[must_use]
    pub fn fallback_message<M>(mut self, message: M) -> Self
    where
        M: Into<String>,
    {
        self.fallback_message = message.into();
        self
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    #[must_use]
    pub const fn content(&self) -> &Content {
        &self.content
    }

    #[must_use]
    pub const fn expansion(&self) -> &ExpansionState {
        &self.expansion
    }

    pub fn expansion_mut(&mut self) -> &mut ExpansionState {
        &mut self.expansion
    }

    /// Top level folders currently shown. Empty unless a tree is shown.
    #[must_use]
    pub fn folders(&self) -> &[Folder] {
        match &self.content {
            Content::Tree(folders) => folders,
            Content::Empty | Content::Fallback(_) => &[],
        }
    }

    /// Replace the whole content. Every folder of the new content starts collapsed.
    pub fn replace(&mut self, content: Content) {
        self.content = content;
        self.expansion = ExpansionState::default();
    }

    /// Render `nodes` and show them.
    pub fn show_tree(&mut self, nodes: &[Node]) {
        self.replace(Content::Tree(render_all(nodes)));
    }

    pub fn show_fallback(&mut self) {
        self.replace(Content::Fallback(self.fallback_message.clone()));
    }

    /// Start a new load request. Results of all earlier requests become stale.
    pub fn begin(&mut self) -> Ticket {
        self.issued += 1;
        Ticket(self.issued)
    }

    /// Apply the result of the request identified by `ticket`.
    ///
    /// Only the latest request is applied.
    /// A failure is logged and shows the fallback message, it never escapes from here.
    pub fn finish(&mut self, ticket: Ticket, result: Result<Vec<Node>, LoadError>) -> Applied {
        if ticket.0 != self.issued {
            log::warn!(
                "{}: dropping result of request {} as request {} is newer",
                self.id,
                ticket.0,
                self.issued
            );
            return Applied::Stale;
        }
        match result {
            Ok(nodes) => {
                self.show_tree(&nodes);
                log::info!("{}: showing {} top level notes", self.id, nodes.len());
                Applied::Tree {
                    folders: nodes.len(),
                }
            }
            Err(error) => {
                log::error!("{}: could not load notes: {error}", self.id);
                let mut source = std::error::Error::source(&error);
                while let Some(cause) = source {
                    log::error!("{}: caused by: {cause}", self.id);
                    source = cause.source();
                }
                self.show_fallback();
                Applied::Fallback
            }
        }
    }

    /// Load the notes document and show it, or the fallback message when that fails.
    ///
    /// Can be called any number of times, every call replaces the content.
    pub fn mount<F>(&mut self, fetcher: &F, options: &LoadOptions) -> Applied
    where
        F: Fetch + ?Sized,
    {
        let ticket = self.begin();
        let result = load_with(fetcher, options);
        self.finish(ticket, result)
    }

    /// Get a flat list of all visible rows.
    #[must_use]
    pub fn visible(&self) -> Vec<Row<'_>> {
        flatten(&self.expansion.expanded, self.folders(), &[])
    }

    /// Whatever `path` points at in the current tree.
    #[must_use]
    pub fn get(&self, path: &[usize]) -> Option<Item<'_>> {
        resolve(self.folders(), path)
    }

    /// Click on the row at `path`.
    ///
    /// A folder title toggles that folder only and reports the new state to `effect`.
    pub fn click<E>(&mut self, path: &[usize], effect: &mut E) -> Click
    where
        E: ToggleEffect + ?Sized,
    {
        match self.get(path) {
            None => return Click::Missed,
            Some(Item::Link(link)) => return Click::Link(link.clone()),
            Some(Item::Folder(_)) => {}
        }
        let expanded = self.expansion.toggle(path.to_vec());
        effect.apply(path, Indicator::for_state(expanded));
        Click::Toggled {
            path: path.to_vec(),
            expanded,
        }
    }

    /// Click on the terminal cell where the host was rendered last.
    pub fn click_at<E>(&mut self, column: u16, row: u16, effect: &mut E) -> Click
    where
        E: ToggleEffect + ?Sized,
    {
        let Some(path) = self.expansion.rendered_at(column, row).map(<[usize]>::to_vec) else {
            return Click::Missed;
        };
        self.expansion.select(path.clone());
        self.click(&path, effect)
    }

    /// Act on the selected row like a click would.
    pub fn activate_selected<E>(&mut self, effect: &mut E) -> Click
    where
        E: ToggleEffect + ?Sized,
    {
        self.expansion.ensure_selected_in_view_on_next_render = true;
        let selected = self.expansion.selected();
        self.click(&selected, effect)
    }

    /// Select the first row.
    ///
    /// Returns `true` when the selection changed.
    pub fn select_first(&mut self) -> bool {
        let path = if self.folders().is_empty() {
            Vec::new()
        } else {
            vec![0]
        };
        self.expansion.select(path)
    }

    /// Select the last visible row.
    ///
    /// Returns `true` when the selection changed.
    pub fn select_last(&mut self) -> bool {
        let path = self
            .visible()
            .into_iter()
            .last()
            .map_or(Vec::new(), |row| row.path);
        self.expansion.select(path)
    }

    /// Move the current selection with the direction/amount by the given function.
    ///
    /// Returns `true` when the selection changed.
    pub fn select_visible_relative<F>(&mut self, change_function: F) -> bool
    where
        F: FnOnce(Option<usize>) -> usize,
    {
        let visible = self.visible();
        let current_index = visible
            .iter()
            .position(|row| row.path == self.expansion.selected);
        let new_index = change_function(current_index).min(visible.len().saturating_sub(1));
        let new_path = visible
            .into_iter()
            .nth(new_index)
            .map_or(Vec::new(), |row| row.path);
        self.expansion.select(new_path)
    }

    /// Handles the up arrow key.
    pub fn key_up(&mut self) -> bool {
        self.select_visible_relative(|current| {
            current.map_or(usize::MAX, |current| current.saturating_sub(1))
        })
    }

    /// Handles the down arrow key.
    pub fn key_down(&mut self) -> bool {
        self.select_visible_relative(|current| {
            current.map_or(0, |current| current.saturating_add(1))
        })
    }

    /// Handles the left arrow key.
    /// Collapses the selected folder or moves to its parent.
    pub fn key_left(&mut self) -> bool {
        let expansion = &mut self.expansion;
        expansion.ensure_selected_in_view_on_next_render = true;
        let mut changed = expansion.expanded.remove(&expansion.selected);
        if !changed {
            // Select the parent by removing the last index
            let popped = expansion.selected.pop();
            changed = popped.is_some();
        }
        changed
    }

    /// Handles the right arrow key.
    /// Expands the selected folder.
    pub fn key_right(&mut self) -> bool {
        self.expansion.ensure_selected_in_view_on_next_render = true;
        let selected = self.expansion.selected();
        if matches!(self.get(&selected), Some(Item::Folder(_))) {
            self.expansion.expand(selected)
        } else {
            false
        }
    }
}

#[cfg(test)]
use crate::error::{FetchError, ParseError};

#[cfg(test)]
fn tree_host() -> Host {
    let mut host = Host::default();
    host.replace(Content::Tree(Folder::example()));
    host
}

#[test]
fn starts_empty() {
    let host = Host::default();
    assert_eq!(host.id(), HOST_ID);
    assert_eq!(host.content(), &Content::Empty);
    assert!(host.visible().is_empty());
}

#[test]
fn failure_shows_fallback() {
    let mut host = tree_host();
    let ticket = host.begin();
    let applied = host.finish(
        ticket,
        Err(LoadError::Parse(ParseError::NotAnArray)),
    );
    assert_eq!(applied, Applied::Fallback);
    assert_eq!(
        host.content(),
        &Content::Fallback(DEFAULT_FALLBACK_MESSAGE.to_owned())
    );
    assert!(host.folders().is_empty());
}

#[test]
fn custom_fallback_message() {
    let mut host = Host::new("notes").fallback_message("nothing here");
    let fetcher = |uri: &str| -> Result<String, FetchError> {
        Err(FetchError::Status {
            uri: uri.to_owned(),
            status: 404,
        })
    };
    host.mount(&fetcher, &LoadOptions::default());
    assert_eq!(host.content(), &Content::Fallback("nothing here".to_owned()));
}

#[test]
fn stale_result_is_dropped() {
    let mut host = Host::default();
    let slow = host.begin();
    let fast = host.begin();
    assert!(slow < fast);

    let applied = host.finish(fast, Ok(vec![Node::folder("fast", vec![])]));
    assert_eq!(applied, Applied::Tree { folders: 1 });

    let applied = host.finish(slow, Ok(vec![Node::folder("slow", vec![])]));
    assert_eq!(applied, Applied::Stale);
    assert_eq!(host.folders()[0].label(), "fast");
}

#[test]
fn stale_failure_keeps_tree() {
    let mut host = Host::default();
    let slow = host.begin();
    let fast = host.begin();
    host.finish(fast, Ok(vec![Node::folder("fast", vec![])]));
    let applied = host.finish(slow, Err(ParseError::NotAnArray.into()));
    assert_eq!(applied, Applied::Stale);
    assert!(matches!(host.content(), Content::Tree(_)));
}

#[test]
fn replacing_collapses_everything() {
    let mut host = tree_host();
    host.click(&[1], &mut ());
    assert!(host.expansion().is_expanded(&[1]));
    host.show_tree(&[Node::folder("new", vec![])]);
    assert!(!host.expansion().is_expanded(&[1]));
}

#[test]
fn click_toggles_only_that_folder() {
    let mut host = tree_host();
    let mut effects = Vec::new();
    let mut record = |path: &[usize], indicator: Indicator| effects.push((path.to_vec(), indicator));

    assert_eq!(
        host.click(&[1], &mut record),
        Click::Toggled {
            path: vec![1],
            expanded: true
        }
    );
    host.click(&[1, 1], &mut record);
    host.click(&[1, 1], &mut record);

    assert!(host.expansion().is_expanded(&[1]));
    assert!(!host.expansion().is_expanded(&[1, 1]));
    assert!(!host.expansion().is_expanded(&[0]));
    assert_eq!(
        effects,
        [
            (vec![1], Indicator::Rotated),
            (vec![1, 1], Indicator::Rotated),
            (vec![1, 1], Indicator::Resting),
        ]
    );
}

#[test]
fn click_on_link_does_not_toggle() {
    let mut host = tree_host();
    let click = host.click(&[1, 0], &mut ());
    assert_eq!(click, Click::Link(Link::new("c", "c.md")));
    assert!(host.expansion().get_all_expanded().is_empty());
}

#[test]
fn click_on_nothing_is_missed() {
    let mut host = tree_host();
    assert_eq!(host.click(&[9], &mut ()), Click::Missed);
    assert_eq!(host.click(&[], &mut ()), Click::Missed);
}

#[test]
fn keys_move_selection() {
    let mut host = tree_host();
    assert!(host.key_down());
    assert_eq!(host.expansion().selected(), [0]);
    host.key_down();
    assert!(host.key_right());
    assert!(host.expansion().is_expanded(&[1]));
    host.key_down();
    assert_eq!(host.expansion().selected(), [1, 0]);
    // Links can not be expanded
    assert!(!host.key_right());
    // Left on a link moves to the parent
    assert!(host.key_left());
    assert_eq!(host.expansion().selected(), [1]);
    // Left on an expanded folder collapses it
    assert!(host.key_left());
    assert!(!host.expansion().is_expanded(&[1]));
    assert!(host.select_last());
    assert_eq!(host.expansion().selected(), [2]);
    assert!(host.key_up());
    assert_eq!(host.expansion().selected(), [1]);
}

#[test]
fn activate_selected_toggles() {
    let mut host = tree_host();
    host.select_first();
    let click = host.activate_selected(&mut ());
    assert_eq!(
        click,
        Click::Toggled {
            path: vec![0],
            expanded: true
        }
    );
}
