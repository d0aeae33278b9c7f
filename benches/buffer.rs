//! Benchmarks for the grid primitives and transcript emission.

use cellgrid::{Attribute, Color, ColorMode, TerminalBuffer};
use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;

const WIDTH: usize = 120;
const HEIGHT: usize = 40;

fn scene() -> TerminalBuffer {
    let bar = Attribute::DEFAULT.with_background(ColorMode::Palette, Color::Blue.index());
    let text = Attribute::DEFAULT.with_foreground(ColorMode::Palette, Color::White.index());

    let mut buf = TerminalBuffer::new(WIDTH, HEIGHT);
    buf.fill(0, 0, 1, WIDTH as i32, "", Some(&bar)).unwrap();
    for row in 1..HEIGHT as i32 {
        buf.write(row, 0, "中文測試 row content 0123456789", Some(&text))
            .unwrap();
    }
    buf
}

fn bench_write(c: &mut Criterion) {
    let mut buf = TerminalBuffer::new(WIDTH, HEIGHT);
    c.bench_function("write_mixed_width_row", |b| {
        b.iter(|| {
            buf.write(
                black_box(5),
                black_box(0),
                black_box("中文測試 the quick brown fox 0123456789"),
                None,
            )
            .unwrap()
        });
    });
}

fn bench_fill(c: &mut Criterion) {
    let attr = Attribute::DEFAULT.with_background(ColorMode::Palette, Color::Red.index());
    let mut buf = TerminalBuffer::new(WIDTH, HEIGHT);
    c.bench_function("fill_full_screen", |b| {
        b.iter(|| {
            buf.fill(0, 0, HEIGHT as i32, WIDTH as i32, "", Some(black_box(&attr)))
                .unwrap();
        });
    });
}

fn bench_serialize(c: &mut Criterion) {
    let buf = scene();
    c.bench_function("serialize_full_screen", |b| {
        b.iter(|| black_box(&buf).serialize().unwrap());
    });
}

fn bench_diff(c: &mut Criterion) {
    let baseline = scene();
    let mut changed = scene();
    changed.write(20, 10, "delta 変更", None).unwrap();

    c.bench_function("diff_identical", |b| {
        b.iter(|| {
            baseline
                .diff(
                    black_box(&baseline),
                    0,
                    0,
                    0,
                    0,
                    HEIGHT as i32,
                    WIDTH as i32,
                )
                .unwrap()
        });
    });
    c.bench_function("diff_one_line_changed", |b| {
        b.iter(|| {
            changed
                .diff(
                    black_box(&baseline),
                    0,
                    0,
                    0,
                    0,
                    HEIGHT as i32,
                    WIDTH as i32,
                )
                .unwrap()
        });
    });
}

criterion_group!(benches, bench_write, bench_fill, bench_serialize, bench_diff);
criterion_main!(benches);
