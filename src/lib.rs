#![forbid(unsafe_code)]
#![warn(clippy::pedantic, clippy::nursery)]

/*!
Collapsible notes tree loaded from a JSON document.

A notes document is an array of entries with a `name` or `title`, an optional `href` and optional `children`.
[`load`] fetches and parses it into [`Node`]s, [`render`] materializes them into [`Folder`]s
and a [`Host`] holds whatever is shown: the tree or a fallback message when loading failed.
The [`NotesTree`] widget draws a [`Host`] with every folder collapsed until its title row is clicked.
*/

use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::widgets::{Block, Scrollbar, ScrollbarState, StatefulWidget, Widget};
use unicode_width::UnicodeWidthStr;

mod element;
mod error;
mod expansion;
mod flatten;
mod host;
mod loader;
mod node;
mod render;
mod source;

pub use crate::element::{resolve, Entry, Folder, Icon, Item, TitleRow};
pub use crate::error::{FetchError, LoadError, ParseError};
pub use crate::expansion::{toggled, ExpansionState, Indicator, ToggleEffect};
pub use crate::flatten::Row;
pub use crate::host::{Applied, Click, Content, Host, Ticket, DEFAULT_FALLBACK_MESSAGE, HOST_ID};
pub use crate::loader::{load, load_with, LoadOptions, DEFAULT_SOURCE};
pub use crate::node::{
    parse_document, parse_nodes, Link, Node, Referrer, Target, DEPTH_LIMIT, MAX_DEPTH,
};
pub use crate::render::{render, render_all};
#[cfg(feature = "http")]
pub use crate::source::HttpFetcher;
pub use crate::source::{fetcher_for, is_remote, Fetch, FileFetcher};

/// Draws the content of a [`Host`].
///
/// Which folders are expanded, the selection and where rows end up are kept in the [`Host`].
///
/// # Example
///
/// ```
/// # use notes_tree::{Host, Node, NotesTree};
/// # use ratatui::backend::TestBackend;
/// # use ratatui::Terminal;
/// # use ratatui::widgets::Block;
/// # let mut terminal = Terminal::new(TestBackend::new(32, 32)).unwrap();
/// let mut host = Host::default();
/// host.show_tree(&[Node::folder("Rust", vec![Node::leaf("Ownership", "ownership.md")])]);
///
/// terminal.draw(|frame| {
///     let area = frame.size();
///     let widget = NotesTree::new().block(Block::bordered().title("Notes"));
///     frame.render_stateful_widget(widget, area, &mut host);
/// })?;
/// # Ok::<(), std::io::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct NotesTree<'a> {
    block: Option<Block<'a>>,
    scrollbar: Option<Scrollbar<'a>>,
    /// Style used as a base style for the widget
    style: Style,

    /// Style used to render the selected row
    highlight_style: Style,
    /// Symbol in front of the selected row (Shift all rows to the right)
    highlight_symbol: &'a str,

    /// Style of link rows, patched onto the base style
    link_style: Style,
    /// Style of the fallback message, patched onto the base style
    fallback_style: Style,

    /// Symbol displayed in front of a collapsed folder
    node_closed_symbol: &'a str,
    /// Symbol displayed in front of an expanded folder
    node_open_symbol: &'a str,
    /// Symbol displayed in front of a link
    link_symbol: &'a str,
    /// Symbol of [`Icon::Folder`], between the indicator and the label
    folder_icon: &'a str,
}

impl<'a> Default for NotesTree<'a> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> NotesTree<'a> {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            block: None,
            scrollbar: None,
            style: Style::new(),
            highlight_style: Style::new(),
            highlight_symbol: "",
            link_style: Style::new(),
            fallback_style: Style::new(),
            node_closed_symbol: "\u{25b6} ", // Arrow to right
            node_open_symbol: "\u{25bc} ",   // Arrow down
            link_symbol: "  ",
            folder_icon: "\u{25a1} ", // White square
        }
    }

    #[allow(clippy::missing_const_for_fn)]
    #[must_use]
    pub fn block(mut self, block: Block<'a>) -> Self {
        self.block = Some(block);
        self
    }

    /// Show the scrollbar when rendering this widget.
    ///
    /// Experimental: Can change on any release without any additional notice.
    #[must_use]
    pub const fn experimental_scrollbar(mut self, scrollbar: Option<Scrollbar<'a>>) -> Self {
        self.scrollbar = scrollbar;
        self
    }

    #[must_use]
    pub const fn style(mut self, style: Style) -> Self {
        self.style = style;
        self
    }

    #[must_use]
    pub const fn highlight_style(mut self, style: Style) -> Self {
        self.highlight_style = style;
        self
    }

    #[must_use]
    pub const fn highlight_symbol(mut self, highlight_symbol: &'a str) -> Self {
        self.highlight_symbol = highlight_symbol;
        self
    }

    #[must_use]
    pub const fn link_style(mut self, style: Style) -> Self {
        self.link_style = style;
        self
    }

    #[must_use]
    pub const fn fallback_style(mut self, style: Style) -> Self {
        self.fallback_style = style;
        self
    }

    #[must_use]
    pub const fn node_closed_symbol(mut self, symbol: &'a str) -> Self {
        self.node_closed_symbol = symbol;
        self
    }

    #[must_use]
    pub const fn node_open_symbol(mut self, symbol: &'a str) -> Self {
        self.node_open_symbol = symbol;
        self
    }

    #[must_use]
    pub const fn link_symbol(mut self, symbol: &'a str) -> Self {
        self.link_symbol = symbol;
        self
    }

    #[must_use]
    pub const fn folder_icon(mut self, symbol: &'a str) -> Self {
        self.folder_icon = symbol;
        self
    }
}

impl<'a> StatefulWidget for NotesTree<'a> {
    type State = Host;

    #[allow(clippy::too_many_lines)]
    fn render(self, full_area: Rect, buf: &mut Buffer, host: &mut Self::State) {
        buf.set_style(full_area, self.style);

        // Get the inner area inside a possible block, otherwise use the full area
        let area = self.block.map_or(full_area, |block| {
            let inner_area = block.inner(full_area);
            block.render(full_area, buf);
            inner_area
        });

        let state = &mut host.expansion;
        state.last_area = area;
        state.last_rows.clear();

        if area.width < 1 || area.height < 1 {
            return;
        }

        let folders = match &host.content {
            Content::Empty => return,
            Content::Fallback(message) => {
                buf.set_stringn(
                    area.x,
                    area.y,
                    message,
                    area.width as usize,
                    self.style.patch(self.fallback_style),
                );
                return;
            }
            Content::Tree(folders) => folders,
        };

        let visible = flatten::flatten(&state.expanded, folders, &[]);
        if visible.is_empty() {
            return;
        }
        let available_height = area.height as usize;

        let ensure_index_in_view =
            if state.ensure_selected_in_view_on_next_render && !state.selected.is_empty() {
                visible.iter().position(|row| row.path == state.selected)
            } else {
                None
            };

        // Ensure last line is still visible
        let mut start = state.offset.min(visible.len().saturating_sub(1));

        if let Some(ensure_index_in_view) = ensure_index_in_view {
            start = start.min(ensure_index_in_view);
            if ensure_index_in_view >= start + available_height {
                start = ensure_index_in_view + 1 - available_height;
            }
        }

        let end = visible.len().min(start + available_height);
        let height = end - start;

        state.offset = start;
        state.ensure_selected_in_view_on_next_render = false;

        if let Some(scrollbar) = self.scrollbar {
            let mut scrollbar_state = ScrollbarState::new(visible.len().saturating_sub(height))
                .position(start)
                .viewport_content_length(height);
            let scrollbar_area = Rect {
                // Inner height to be exactly as the content
                y: area.y,
                height: area.height,
                // Outer width to stay on the right border
                x: full_area.x,
                width: full_area.width,
            };
            scrollbar.render(scrollbar_area, buf, &mut scrollbar_state);
        }

        let blank_symbol = " ".repeat(self.highlight_symbol.width());
        let has_selection = !state.selected.is_empty();

        #[allow(clippy::cast_possible_truncation)]
        for (index, row) in visible.into_iter().skip(start).take(height).enumerate() {
            let x = area.x;
            let y = area.y + index as u16;
            let row_area = Rect {
                x,
                y,
                width: area.width,
                height: 1,
            };

            let (symbol, icon, text, item_style) = match row.item {
                Item::Folder(folder) => {
                    let symbol = match Indicator::for_state(state.is_expanded(&row.path)) {
                        Indicator::Resting => self.node_closed_symbol,
                        Indicator::Rotated => self.node_open_symbol,
                    };
                    let icon = match folder.title().icon() {
                        Icon::Folder => self.folder_icon,
                    };
                    (symbol, icon, folder.label(), self.style)
                }
                Item::Link(link) => (
                    self.link_symbol,
                    "",
                    link.text(),
                    self.style.patch(self.link_style),
                ),
            };
            buf.set_style(row_area, item_style);

            let is_selected = state.selected == row.path;
            let after_highlight_symbol_x = if has_selection {
                let symbol = if is_selected {
                    self.highlight_symbol
                } else {
                    &blank_symbol
                };
                let (x, _) = buf.set_stringn(x, y, symbol, area.width as usize, item_style);
                x
            } else {
                x
            };

            let after_depth_x = {
                let indent_width = row.depth() * 2;
                let (after_indent_x, _) = buf.set_stringn(
                    after_highlight_symbol_x,
                    y,
                    " ".repeat(indent_width),
                    indent_width,
                    item_style,
                );
                let max_width = area.width.saturating_sub(after_indent_x - x);
                let (after_symbol_x, _) =
                    buf.set_stringn(after_indent_x, y, symbol, max_width as usize, item_style);
                let max_width = area.width.saturating_sub(after_symbol_x - x);
                let (x, _) =
                    buf.set_stringn(after_symbol_x, y, icon, max_width as usize, item_style);
                x
            };

            let max_element_width = area.width.saturating_sub(after_depth_x - x);
            buf.set_stringn(
                after_depth_x,
                y,
                text,
                max_element_width as usize,
                item_style,
            );
            if is_selected {
                buf.set_style(row_area, self.highlight_style);
            }

            state.last_rows.push(row.path);
        }
    }
}

#[cfg(test)]
fn draw(widget: NotesTree, host: &mut Host, width: u16, height: u16) -> Vec<String> {
    let area = Rect::new(0, 0, width, height);
    let mut buffer = Buffer::empty(area);
    StatefulWidget::render(widget, area, &mut buffer, host);
    buffer
        .content
        .chunks(width as usize)
        .map(|cells| {
            cells
                .iter()
                .map(ratatui::buffer::Cell::symbol)
                .collect::<String>()
                .trim_end()
                .to_owned()
        })
        .collect()
}

#[cfg(test)]
fn example_host() -> Host {
    let mut host = Host::default();
    host.replace(Content::Tree(Folder::example()));
    host
}

#[test]
fn renders_collapsed() {
    let mut host = example_host();
    let lines = draw(NotesTree::new(), &mut host, 12, 4);
    assert_eq!(lines, ["▶ □ Alfa", "▶ □ Bravo", "▶ □ Hotel", ""]);
}

#[test]
fn renders_expanded_with_indent() {
    let mut host = example_host();
    host.click(&[1], &mut ());
    host.click(&[1, 1], &mut ());
    let lines = draw(NotesTree::new(), &mut host, 12, 8);
    assert_eq!(
        lines,
        [
            "▶ □ Alfa",
            "▼ □ Bravo",
            "    c",
            "  ▼ □ Delta",
            "      e",
            "      f",
            "    g",
            "▶ □ Hotel",
        ]
    );
}

#[test]
fn renders_custom_folder_icon() {
    let mut host = example_host();
    host.click(&[0], &mut ());
    let lines = draw(NotesTree::new().folder_icon("+ "), &mut host, 12, 3);
    assert_eq!(lines, ["▼ + Alfa", "    a", "▶ + Bravo"]);
    let lines = draw(NotesTree::new().folder_icon(""), &mut host, 12, 1);
    assert_eq!(lines, ["▼ Alfa"]);
}

#[test]
fn renders_fallback_message() {
    let mut host = Host::default().fallback_message("No notes");
    host.show_fallback();
    let lines = draw(NotesTree::new(), &mut host, 10, 2);
    assert_eq!(lines, ["No notes", ""]);
    assert!(host.expansion().rendered_at(0, 0).is_none());
}

#[test]
fn renders_highlight_symbol_for_selection() {
    let mut host = example_host();
    host.expansion_mut().select(vec![1]);
    let lines = draw(NotesTree::new().highlight_symbol(">> "), &mut host, 12, 3);
    assert_eq!(lines, ["   ▶ □ Alfa", ">> ▶ □ Bravo", "   ▶ □ Hotel"]);
}

#[test]
fn scrolls_selection_into_view() {
    let mut host = example_host();
    host.click(&[1], &mut ());
    host.expansion_mut().select(vec![2]);
    let lines = draw(NotesTree::new(), &mut host, 12, 2);
    assert_eq!(lines, ["    g", "▶ □ Hotel"]);
    assert_eq!(host.expansion().get_offset(), 4);
}

#[test]
fn click_at_uses_last_render() {
    let mut host = example_host();
    draw(NotesTree::new(), &mut host, 12, 4);
    let click = host.click_at(3, 1, &mut ());
    assert_eq!(
        click,
        Click::Toggled {
            path: vec![1],
            expanded: true
        }
    );

    let lines = draw(NotesTree::new(), &mut host, 12, 8);
    assert_eq!(lines[1], "▼ □ Bravo");
    assert_eq!(lines[2], "    c");

    let click = host.click_at(5, 2, &mut ());
    assert_eq!(click, Click::Link(Link::new("c", "c.md")));
    // Below the last of the six visible rows
    assert_eq!(host.click_at(0, 7, &mut ()), Click::Missed);
    assert!(host.expansion().is_expanded(&[1]));
}
