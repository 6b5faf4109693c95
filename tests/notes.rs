use notes_tree::{
    Applied, Click, Content, Entry, FetchError, Folder, Host, Indicator, Item, LoadOptions,
    NotesTree, DEFAULT_FALLBACK_MESSAGE,
};
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::widgets::StatefulWidget;

const SAMPLE: &str = r#"[
    {"name": "X", "children": [{"title": "Y", "href": "http://e.x"}]},
    {"name": "Mixed", "title": "Mixed note", "href": "mixed.md", "children": [
        {"title": "Inner", "href": "inner.md"},
        {"name": "Nested", "children": [{"title": "Deep", "href": "deep.md"}]}
    ]},
    {"title": "Loose", "href": "loose.md"},
    {"name": "Empty"}
]"#;

fn serving(body: &'static str) -> impl Fn(&str) -> Result<String, FetchError> {
    move |_| Ok(body.to_owned())
}

fn mounted(body: &'static str) -> Host {
    let mut host = Host::default();
    host.mount(&serving(body), &LoadOptions::default());
    host
}

/// Paths of every folder in the host, depth first.
fn folder_paths(host: &Host) -> Vec<Vec<usize>> {
    fn collect(folder: &Folder, path: Vec<usize>, result: &mut Vec<Vec<usize>>) {
        for (index, entry) in folder.children().iter().enumerate() {
            if let Entry::Folder(child) = entry {
                let mut child_path = path.clone();
                child_path.push(index);
                collect(child, child_path, result);
            }
        }
        result.push(path);
    }
    let mut result = Vec::new();
    for (index, folder) in host.folders().iter().enumerate() {
        collect(folder, vec![index], &mut result);
    }
    result
}

fn draw(host: &mut Host) -> Vec<String> {
    let area = Rect::new(0, 0, 30, 12);
    let mut buffer = Buffer::empty(area);
    NotesTree::new().render(area, &mut buffer, host);
    buffer
        .content
        .chunks(area.width as usize)
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

#[test]
fn top_level_count_matches_document() {
    let host = mounted(SAMPLE);
    assert_eq!(host.folders().len(), 4);
    let host = mounted("[]");
    assert!(host.folders().is_empty());
    assert!(matches!(host.content(), Content::Tree(_)));
}

#[test]
fn every_folder_starts_collapsed() {
    let mut host = mounted(SAMPLE);
    let paths = folder_paths(&host);
    assert_eq!(paths.len(), 5);
    assert!(paths.iter().all(|path| !host.expansion().is_expanded(path)));
    assert_eq!(
        draw(&mut host)[..5],
        ["▶ □ X", "▶ □ Mixed", "▶ □ Loose", "▶ □ Empty", ""]
    );
}

#[test]
fn click_twice_shows_then_hides() {
    let mut host = mounted(SAMPLE);
    let mut indicators = Vec::new();
    let mut record = |_: &[usize], indicator: Indicator| indicators.push(indicator);

    host.click(&[0], &mut record);
    assert!(host.expansion().is_expanded(&[0]));
    assert_eq!(draw(&mut host)[..3], ["▼ □ X", "    Y", "▶ □ Mixed"]);

    host.click(&[0], &mut record);
    assert!(!host.expansion().is_expanded(&[0]));
    assert_eq!(draw(&mut host)[..2], ["▶ □ X", "▶ □ Mixed"]);

    assert_eq!(indicators, [Indicator::Rotated, Indicator::Resting]);
}

#[test]
fn click_never_changes_other_folders() {
    let mut host = mounted(SAMPLE);
    let paths = folder_paths(&host);
    for clicked in &paths {
        // Bring every folder into a mixed state first
        for (index, path) in paths.iter().enumerate() {
            if index % 2 == 0 && !host.expansion().is_expanded(path) {
                host.click(path, &mut ());
            }
        }
        let before = paths
            .iter()
            .map(|path| host.expansion().is_expanded(path))
            .collect::<Vec<_>>();

        host.click(clicked, &mut ());

        for (path, was_expanded) in paths.iter().zip(before) {
            let expected = if path == clicked {
                !was_expanded
            } else {
                was_expanded
            };
            assert_eq!(
                host.expansion().is_expanded(path),
                expected,
                "{path:?} after clicking {clicked:?}"
            );
        }
    }
}

#[test]
fn clicking_nested_title_does_not_reach_ancestor() {
    let mut host = mounted(SAMPLE);
    host.click(&[1], &mut ());
    let click = host.click(&[1, 2], &mut ());
    assert_eq!(
        click,
        Click::Toggled {
            path: vec![1, 2],
            expanded: true
        }
    );
    assert!(host.expansion().is_expanded(&[1]));
}

#[test]
fn folder_with_leaf_link() {
    let host = mounted(r#"[{"name": "X", "children": [{"title": "Y", "href": "http://e.x"}]}]"#);
    let folders = host.folders();
    assert_eq!(folders.len(), 1);
    assert_eq!(folders[0].label(), "X");
    assert_eq!(folders[0].children().len(), 1);
    match host.get(&[0, 0]) {
        Some(Item::Link(link)) => {
            assert_eq!(link.text(), "Y");
            assert_eq!(link.href(), "http://e.x");
        }
        other => panic!("expected a link, got {other:?}"),
    }
}

#[test]
fn non_success_status_shows_only_fallback() {
    let mut host = mounted(SAMPLE);
    let failing = |uri: &str| -> Result<String, FetchError> {
        Err(FetchError::Status {
            uri: uri.to_owned(),
            status: 404,
        })
    };
    assert_eq!(
        host.mount(&failing, &LoadOptions::default()),
        Applied::Fallback
    );
    assert_eq!(
        host.content(),
        &Content::Fallback(DEFAULT_FALLBACK_MESSAGE.to_owned())
    );
    assert!(host.folders().is_empty());
    assert!(host.visible().is_empty());
}

#[test]
fn invalid_body_behaves_like_failed_fetch() {
    for body in ["<!doctype html>", r#"{"name": "X"}"#, "[1, 2]", "[{"] {
        let mut host = mounted(SAMPLE);
        assert_eq!(
            host.mount(&serving(body), &LoadOptions::default()),
            Applied::Fallback,
            "{body}"
        );
        assert_eq!(
            host.content(),
            &Content::Fallback(DEFAULT_FALLBACK_MESSAGE.to_owned())
        );
        assert_eq!(draw(&mut host)[0], DEFAULT_FALLBACK_MESSAGE[..30].trim_end());
    }
}

#[test]
fn mixed_node_keeps_link_and_children() {
    let mut host = mounted(SAMPLE);
    let mixed = &host.folders()[1];
    assert_eq!(mixed.label(), "Mixed");
    assert!(matches!(&mixed.children()[0], Entry::Link(link) if link.text() == "Mixed note" && link.href() == "mixed.md"));
    assert!(matches!(&mixed.children()[1], Entry::Link(link) if link.href() == "inner.md"));
    assert!(matches!(&mixed.children()[2], Entry::Folder(folder) if folder.label() == "Nested"));

    host.click(&[1], &mut ());
    assert_eq!(
        draw(&mut host)[..6],
        [
            "▶ □ X",
            "▼ □ Mixed",
            "    Mixed note",
            "    Inner",
            "  ▶ □ Nested",
            "▶ □ Loose"
        ]
    );
}

#[test]
fn loose_leaf_is_folder_with_its_link() {
    let host = mounted(SAMPLE);
    let loose = &host.folders()[2];
    assert_eq!(loose.label(), "Loose");
    assert!(matches!(&loose.children()[..], [Entry::Link(link)] if link.href() == "loose.md"));
}

#[test]
fn remounting_replaces_everything() {
    let mut host = mounted(SAMPLE);
    host.click(&[0], &mut ());
    host.mount(&serving(r#"[{"name": "Only"}]"#), &LoadOptions::default());
    assert_eq!(host.folders().len(), 1);
    assert!(!host.expansion().is_expanded(&[0]));
}

#[test]
fn loads_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("notes.json");
    std::fs::write(&path, SAMPLE).unwrap();

    let options = LoadOptions::new(path.to_str().unwrap());
    let fetcher = notes_tree::fetcher_for(options.get_source());
    let mut host = Host::default();
    assert_eq!(
        host.mount(&*fetcher, &options),
        Applied::Tree { folders: 4 }
    );
}

#[test]
fn missing_file_shows_fallback() {
    let mut host = Host::default();
    let applied = host.mount(
        &notes_tree::FileFetcher,
        &LoadOptions::new("/definitely/not/here/notes.json"),
    );
    assert_eq!(applied, Applied::Fallback);
}
