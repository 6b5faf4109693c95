use std::collections::HashSet;

use ratatui::layout::Rect;

/// The state transition of a click on a title row.
///
/// ```
/// # use notes_tree::toggled;
/// assert!(toggled(false));
/// assert!(!toggled(toggled(false)));
/// ```
#[must_use]
pub const fn toggled(expanded: bool) -> bool {
    !expanded
}

/// Visual indicator on a title row, kept in sync with the visibility of the children region.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Indicator {
    /// Children are hidden.
    Resting,
    /// Children are shown.
    Rotated,
}

impl Indicator {
    #[must_use]
    pub const fn for_state(expanded: bool) -> Self {
        if expanded {
            Self::Rotated
        } else {
            Self::Resting
        }
    }
}

/// Side effect of a toggled folder on whatever displays it.
///
/// The [`NotesTree`](crate::NotesTree) widget reads the [`ExpansionState`] on every draw and needs none.
/// Surfaces which are not redrawn completely can update the single folder here.
pub trait ToggleEffect {
    fn apply(&mut self, path: &[usize], indicator: Indicator);
}

impl ToggleEffect for () {
    fn apply(&mut self, _path: &[usize], _indicator: Indicator) {}
}

impl<F> ToggleEffect for F
where
    F: FnMut(&[usize], Indicator),
{
    fn apply(&mut self, path: &[usize], indicator: Indicator) {
        self(path, indicator);
    }
}

/// Keeps which folders are expanded, what is selected and where the rows were drawn last.
///
/// Folders are identified by their path, see [`resolve`](crate::resolve).
/// Every folder starts collapsed.
///
/// # Example
///
/// ```
/// # use notes_tree::ExpansionState;
/// let mut state = ExpansionState::default();
/// assert!(!state.is_expanded(&[0]));
/// assert!(state.toggle(vec![0]));
/// assert!(state.is_expanded(&[0]));
/// ```
#[derive(Debug, Default, Clone)]
pub struct ExpansionState {
    pub(super) offset: usize,
    pub(super) expanded: HashSet<Vec<usize>>,
    pub(super) selected: Vec<usize>,
    pub(super) ensure_selected_in_view_on_next_render: bool,
    pub(super) last_area: Rect,
    pub(super) last_rows: Vec<Vec<usize>>,
}

impl ExpansionState {
    #[must_use]
    pub const fn get_offset(&self) -> usize {
        self.offset
    }

    #[must_use]
    pub fn is_expanded(&self, path: &[usize]) -> bool {
        self.expanded.contains(path)
    }

    #[must_use]
    pub fn get_all_expanded(&self) -> Vec<Vec<usize>> {
        self.expanded.iter().cloned().collect()
    }

    #[must_use]
    pub fn selected(&self) -> Vec<usize> {
        self.selected.clone()
    }

    /// Selects the given path.
    ///
    /// Returns `true` when the selection changed.
    ///
    /// Clear the selection by passing an empty path.
    pub fn select(&mut self, path: Vec<usize>) -> bool {
        self.ensure_selected_in_view_on_next_render = true;
        let changed = self.selected != path;
        self.selected = path;
        changed
    }

    /// Expand a folder.
    /// Returns `true` if the folder was collapsed and has been expanded.
    pub fn expand(&mut self, path: Vec<usize>) -> bool {
        if path.is_empty() {
            false
        } else {
            self.expanded.insert(path)
        }
    }

    /// Collapse a folder.
    /// Returns `true` if the folder was expanded and has been collapsed.
    pub fn collapse(&mut self, path: &[usize]) -> bool {
        self.expanded.remove(path)
    }

    /// Flip the folder at `path` and nothing else.
    ///
    /// Returns the new expanded state.
    /// Ancestors, siblings and descendants keep theirs, a collapsed ancestor still hides the folder.
    pub fn toggle(&mut self, path: Vec<usize>) -> bool {
        if path.is_empty() {
            return false;
        }
        let expanded = toggled(self.is_expanded(&path));
        if expanded {
            self.expand(path);
        } else {
            self.collapse(&path);
        }
        expanded
    }

    /// Collapses all folders.
    ///
    /// Returns `true` when any folder was collapsed.
    pub fn collapse_all(&mut self) -> bool {
        if self.expanded.is_empty() {
            false
        } else {
            self.expanded.clear();
            true
        }
    }

    /// Ensure the selected row is visible on next render
    pub fn scroll_selected_into_view(&mut self) {
        self.ensure_selected_in_view_on_next_render = true;
    }

    /// Scroll the specified amount of lines up
    ///
    /// Returns `true` when the scroll position changed.
    pub fn scroll_up(&mut self, lines: usize) -> bool {
        let before = self.offset;
        self.offset = self.offset.saturating_sub(lines);
        before != self.offset
    }

    /// Scroll the specified amount of lines down
    ///
    /// The actual change is determined on render. Always returns `true`.
    pub fn scroll_down(&mut self, lines: usize) -> bool {
        self.offset = self.offset.saturating_add(lines);
        true
    }

    /// Path of the row drawn at the given terminal cell on the last render.
    #[must_use]
    pub fn rendered_at(&self, column: u16, row: u16) -> Option<&[usize]> {
        let area = self.last_area;
        let inside = column >= area.x
            && column < area.x.saturating_add(area.width)
            && row >= area.y
            && row < area.y.saturating_add(area.height);
        if !inside {
            return None;
        }
        self.last_rows
            .get(usize::from(row - area.y))
            .map(Vec::as_slice)
    }
}

#[test]
fn everything_starts_collapsed() {
    let state = ExpansionState::default();
    assert!(!state.is_expanded(&[0]));
    assert!(state.get_all_expanded().is_empty());
}

#[test]
fn double_toggle_returns_to_collapsed() {
    let mut state = ExpansionState::default();
    assert!(state.toggle(vec![2]));
    assert!(state.is_expanded(&[2]));
    assert!(!state.toggle(vec![2]));
    assert!(!state.is_expanded(&[2]));
}

#[test]
fn toggle_is_local() {
    let mut state = ExpansionState::default();
    state.toggle(vec![1]);
    state.toggle(vec![1, 3]);
    state.toggle(vec![0]);

    // Collapsing the parent keeps the child state
    state.toggle(vec![1]);
    assert!(!state.is_expanded(&[1]));
    assert!(state.is_expanded(&[1, 3]));
    assert!(state.is_expanded(&[0]));

    // Collapsing the child keeps the others
    state.toggle(vec![1, 3]);
    assert!(!state.is_expanded(&[1, 3]));
    assert!(state.is_expanded(&[0]));
}

#[test]
fn toggle_empty_path_does_nothing() {
    let mut state = ExpansionState::default();
    assert!(!state.toggle(Vec::new()));
    assert!(state.get_all_expanded().is_empty());
}

#[test]
fn indicator_follows_state() {
    assert_eq!(Indicator::for_state(false), Indicator::Resting);
    assert_eq!(Indicator::for_state(toggled(false)), Indicator::Rotated);
}

#[test]
fn rendered_at_maps_rows() {
    let mut state = ExpansionState {
        last_area: Rect::new(2, 1, 10, 3),
        last_rows: vec![vec![0], vec![0, 0]],
        ..ExpansionState::default()
    };
    assert_eq!(state.rendered_at(2, 1), Some([0].as_slice()));
    assert_eq!(state.rendered_at(11, 2), Some([0, 0].as_slice()));
    // Inside the area but below the last row
    assert_eq!(state.rendered_at(5, 3), None);
    // Outside of the area
    assert_eq!(state.rendered_at(1, 1), None);
    assert_eq!(state.rendered_at(12, 1), None);
    assert_eq!(state.rendered_at(5, 0), None);

    state.last_rows.clear();
    assert_eq!(state.rendered_at(2, 1), None);
}
