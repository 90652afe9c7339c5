//! Interval-tree insert and query performance.

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use deltalog::interval::{coalesce, IntervalTree, ResolvedInterval};
use std::time::Duration;

fn seeded_tree(size: i64) -> IntervalTree {
    let mut tree = IntervalTree::new();
    for i in 0..size {
        tree.insert(ResolvedInterval::new(i * 2, i * 2 + 3));
    }
    tree
}

fn bench_insert(c: &mut Criterion) {
    let mut group = c.benchmark_group("interval_insert");
    for &size in &[100u64, 1_000, 10_000] {
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, &size| {
            b.iter(|| {
                let mut tree = IntervalTree::new();
                for i in 0..size as i64 {
                    tree.insert(ResolvedInterval::new(i * 2, i * 2 + 3));
                }
                tree
            });
        });
    }
    group.finish();
}

fn bench_point_query(c: &mut Criterion) {
    let tree = seeded_tree(10_000);
    c.bench_function("interval_query_point", |b| {
        b.iter(|| tree.query_point(5_000));
    });
}

fn bench_range_query(c: &mut Criterion) {
    let tree = seeded_tree(10_000);
    c.bench_function("interval_query_range", |b| {
        b.iter(|| tree.query_range(5_000, 5_100));
    });
}

fn bench_coalesce(c: &mut Criterion) {
    c.bench_function("interval_coalesce", |b| {
        b.iter(|| {
            let mut tree = seeded_tree(10_000);
            coalesce(&mut tree);
            tree
        });
    });
}

criterion_group! {
    name = benches;
    config = Criterion::default()
        .measurement_time(Duration::from_secs(10))
        .warm_up_time(Duration::from_secs(3));
    targets = bench_insert, bench_point_query, bench_range_query, bench_coalesce
}
criterion_main!(benches);
