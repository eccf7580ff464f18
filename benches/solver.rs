//! Benchmarks for the Bimaru solver.

use std::io::Cursor;

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use bimaru::moves;
use bimaru::parse::read_board;
use bimaru::puzzle::Puzzle;

/// A full-size 10x10 puzzle with the standard fleet.
const PUZZLE: &str = concat!(
    "ROWS 5 2 4 1 1 3 0 1 0 3\n",
    "COLUMNS 6 1 1 2 2 2 0 2 0 4\n",
    "4\n",
    "HINT 0 0 T\n",
    "HINT 2 4 L\n",
    "HINT 6 6 W\n",
    "HINT 9 9 C\n"
);

/// Benchmark loading and the initial propagation pass.
fn bench_parse_and_propagate(c: &mut Criterion) {
    c.bench_function("parse_and_propagate", |b| {
        b.iter(|| read_board(Cursor::new(black_box(PUZZLE))).unwrap())
    });
}

/// Benchmark the complete solve of a full-size puzzle.
fn bench_solve(c: &mut Criterion) {
    let board = read_board(Cursor::new(PUZZLE)).unwrap();
    let mut group = c.benchmark_group("solve");
    group.sample_size(10);
    group.bench_function("full_10x10", |b| {
        let puzzle = Puzzle::new(board.clone());
        b.iter(|| puzzle.solve(black_box(None)))
    });
    group.finish();
}

/// Benchmark enumerating the legal placements of the next ship class.
fn bench_placements(c: &mut Criterion) {
    let board = read_board(Cursor::new(PUZZLE)).unwrap();
    c.bench_function("placements", |b| {
        b.iter(|| moves::placements(black_box(&board)))
    });
}

/// Benchmark one search transition: clone, apply, re-propagate.
fn bench_apply(c: &mut Criterion) {
    let board = read_board(Cursor::new(PUZZLE)).unwrap();
    let placement = moves::placements(&board)[0];
    c.bench_function("clone_and_apply", |b| {
        b.iter(|| {
            let mut next = black_box(&board).clone();
            moves::apply(&mut next, &placement);
            next
        })
    });
}

criterion_group!(
    benches,
    bench_parse_and_propagate,
    bench_solve,
    bench_placements,
    bench_apply
);
criterion_main!(benches);
