use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BatchSize, Criterion, Throughput};
use notes_tree::{parse_document, render_all, Content, Host, NotesTree, MAX_DEPTH};
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::widgets::StatefulWidget;

const DEMO_NOTES: &str = include_str!("../demos/notes.json");

/// A document with `width` folders per level, `depth` levels deep.
fn wide_document(width: usize, depth: usize) -> String {
    fn level(width: usize, depth: usize) -> String {
        let entries = (0..width)
            .map(|index| {
                if depth <= 1 {
                    format!(r#"{{"title": "note {index}", "href": "note-{index}.md"}}"#)
                } else {
                    format!(
                        r#"{{"name": "folder {index}", "children": {}}}"#,
                        level(width, depth - 1)
                    )
                }
            })
            .collect::<Vec<_>>();
        format!("[{}]", entries.join(","))
    }
    level(width, depth)
}

fn parse(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("parse");
    group.throughput(Throughput::Elements(1));

    group.bench_function("empty", |bencher| {
        bencher.iter(|| black_box(parse_document(black_box("[]"), MAX_DEPTH).unwrap()));
    });

    group.bench_function("demo", |bencher| {
        bencher.iter(|| black_box(parse_document(black_box(DEMO_NOTES), MAX_DEPTH).unwrap()));
    });

    let wide = wide_document(6, 4);
    group.bench_function("wide", |bencher| {
        bencher.iter(|| black_box(parse_document(black_box(&wide), MAX_DEPTH).unwrap()));
    });

    group.finish();
}

fn materialize(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("materialize");
    group.throughput(Throughput::Elements(1));

    let demo = parse_document(DEMO_NOTES, MAX_DEPTH).unwrap();
    group.bench_function("demo", |bencher| {
        bencher.iter(|| black_box(render_all(black_box(&demo))));
    });

    let wide = parse_document(&wide_document(6, 4), MAX_DEPTH).unwrap();
    group.bench_function("wide", |bencher| {
        bencher.iter(|| black_box(render_all(black_box(&wide))));
    });

    group.finish();
}

fn draws(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("draw");
    group.throughput(Throughput::Elements(1)); // Frames per second

    let buffer_size = Rect::new(0, 0, 100, 100);

    group.bench_function("empty", |bencher| {
        bencher.iter_batched(
            Host::default,
            |mut host| {
                let mut buffer = Buffer::empty(buffer_size);
                NotesTree::new().render(buffer_size, black_box(&mut buffer), &mut host);
            },
            BatchSize::SmallInput,
        );
    });

    let wide = render_all(&parse_document(&wide_document(6, 4), MAX_DEPTH).unwrap());
    group.bench_function("wide-expanded", |bencher| {
        bencher.iter_batched(
            || {
                let mut host = Host::default();
                host.replace(Content::Tree(wide.clone()));
                for first in 0..6 {
                    host.expansion_mut().expand(vec![first]);
                    host.expansion_mut().expand(vec![first, 0]);
                }
                host
            },
            |mut host| {
                let mut buffer = Buffer::empty(buffer_size);
                NotesTree::new().render(buffer_size, black_box(&mut buffer), &mut host);
            },
            BatchSize::SmallInput,
        );
    });

    group.finish();
}

/// Create flamegraphs with `cargo bench --bench bench -- --profile-time=5`
#[cfg(unix)]
fn profiled() -> Criterion {
    use pprof::criterion::{Output, PProfProfiler};
    Criterion::default().with_profiler(PProfProfiler::new(100, Output::Flamegraph(None)))
}
#[cfg(not(unix))]
fn profiled() -> Criterion {
    Criterion::default()
}

criterion_group! {
    name = benches;
    config = profiled();
    targets = parse, materialize, draws
}
criterion_main!(benches);
