//! Writer benchmark: Measure how fast buffers are built and diffed to output.
//!
//! Target: < 100µs per keystroke redraw of a 200-column, 50-line frame

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use linewheel::{Buffer, BufferBuilder, Color, Style, Writer};

/// A frame of `lines` wrapped lines of styled code.
fn create_frame(width: usize, lines: usize, seed: usize) -> Buffer {
    let keyword = Style::PLAIN.fg(Color::GREEN).sgr();
    let mut bb = BufferBuilder::new(width);
    bb.write_plain("~> ");
    for i in 0..lines {
        if i > 0 {
            bb.newline();
        }
        bb.write_str("echo", &keyword);
        let word: String = (0..width / 2)
            .map(|j| char::from(b'a' + ((i + j + seed) % 26) as u8))
            .collect();
        bb.write_plain(&format!(" {word}"));
    }
    bb.buffer()
}

fn build_frame(c: &mut Criterion) {
    c.bench_function("build_200x50", |b| {
        b.iter(|| create_frame(black_box(200), black_box(50), 0));
    });
}

fn commit_identical(c: &mut Criterion) {
    let frame = create_frame(200, 50, 0);
    let mut writer = Writer::new(Vec::with_capacity(65536));
    writer.commit(None, &frame, false).unwrap();

    c.bench_function("commit_200x50_identical", |b| {
        b.iter(|| {
            writer.get_mut().clear();
            writer.commit(None, black_box(&frame), false).unwrap();
        });
    });
}

fn commit_one_keystroke(c: &mut Criterion) {
    let before = create_frame(200, 50, 0);
    let mut after = before.clone();
    after.extend_right(BufferBuilder::new(1).write_plain("x").buffer());
    let mut writer = Writer::new(Vec::with_capacity(65536));

    c.bench_function("commit_200x50_keystroke", |b| {
        b.iter(|| {
            writer.get_mut().clear();
            writer.commit(None, &before, false).unwrap();
            writer.commit(None, black_box(&after), false).unwrap();
        });
    });
}

fn commit_full(c: &mut Criterion) {
    let mut group = c.benchmark_group("commit_full_by_size");
    for (width, lines) in [(80, 24), (120, 40), (200, 50)] {
        let frame = create_frame(width, lines, 1);
        let notes = create_frame(width, 2, 2);
        group.bench_with_input(
            BenchmarkId::new("full", format!("{width}x{lines}")),
            &(frame, notes),
            |b, (frame, notes)| {
                let mut writer = Writer::new(Vec::with_capacity(65536));
                b.iter(|| {
                    writer.get_mut().clear();
                    writer.commit(Some(notes), black_box(frame), true).unwrap();
                });
            },
        );
    }
    group.finish();
}

criterion_group!(
    benches,
    build_frame,
    commit_identical,
    commit_one_keystroke,
    commit_full,
);
criterion_main!(benches);
