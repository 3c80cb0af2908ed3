//! Performance benchmarks for IntervalRemap
//!
//! Run with: cargo bench

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use interval_remap::core::{Interval, MergePolicy, Pipeline, RemapOptions, Remapper, TranslationEntry, TranslationTable};
use interval_remap::formats::parse_almanac_str;

/// Build a table of `entries` evenly spaced blocks with alternating offsets
fn synthetic_table(entries: usize, seed: i64) -> TranslationTable {
    (0..entries)
        .map(|i| {
            let source_start = i as i64 * 1_000;
            let offset = if i % 2 == 0 { seed * 37 } else { -(seed * 53) };
            TranslationEntry::new(source_start, source_start + offset, 700)
        })
        .collect()
}

fn synthetic_pipeline(stages: usize, entries: usize) -> Pipeline {
    (0..stages as i64).map(|s| synthetic_table(entries, s + 1)).collect()
}

fn synthetic_almanac(stages: usize, entries: usize) -> String {
    let mut text = String::from("seeds: 0 500000 750000 1000000\n");
    for s in 0..stages {
        text.push_str(&format!("\nstage{}-to-stage{} map:\n", s, s + 1));
        for i in 0..entries {
            let source_start = i * 1_000;
            text.push_str(&format!("{} {} 700\n", source_start + 10 * (s + 1), source_start));
        }
    }
    text
}

/// Benchmark splitting one range against tables of growing size
fn bench_map_range(c: &mut Criterion) {
    let mut group = c.benchmark_group("map_range");

    for entries in [10, 100, 1000].iter() {
        let table = synthetic_table(*entries, 3);
        let query = Interval::new(-5_000, *entries as u64 * 1_000 + 10_000);
        group.throughput(Throughput::Elements(*entries as u64));
        group.bench_with_input(BenchmarkId::from_parameter(entries), &table, |b, table| {
            b.iter(|| black_box(table.map_range(black_box(query))))
        });
    }

    group.finish();
}

/// Benchmark single value lookup
fn bench_map_point(c: &mut Criterion) {
    let table = synthetic_table(1000, 3);

    c.bench_function("map_point", |b| {
        b.iter(|| {
            for v in (0..1_000_000i64).step_by(997) {
                black_box(table.map_point(black_box(v)));
            }
        })
    });
}

/// Benchmark sequential vs parallel pipeline execution
fn bench_pipeline(c: &mut Criterion) {
    let pipeline = synthetic_pipeline(7, 200);
    let initial: Vec<Interval> = (0..256).map(|i| Interval::new(i * 731, 5_000)).collect();

    let mut group = c.benchmark_group("pipeline");
    group.throughput(Throughput::Elements(initial.len() as u64));
    group.bench_function("execute", |b| b.iter(|| black_box(pipeline.execute(black_box(&initial)))));
    group.bench_function("execute_parallel", |b| {
        b.iter(|| black_box(pipeline.execute_parallel(black_box(&initial))))
    });
    group.finish();
}

/// Benchmark the merge policies
fn bench_merge_policies(c: &mut Criterion) {
    let pipeline = synthetic_pipeline(7, 200);
    let initial: Vec<Interval> = (0..256).map(|i| Interval::new(i * 731, 5_000)).collect();

    let mut group = c.benchmark_group("merge_policy");
    for (name, merge) in [
        ("never", MergePolicy::Never),
        ("between", MergePolicy::BetweenStages),
        ("final", MergePolicy::Final),
    ] {
        let remapper = Remapper::with_options(pipeline.clone(), RemapOptions { merge, threads: 1 });
        group.bench_function(name, |b| b.iter(|| black_box(remapper.remap(black_box(&initial)))));
    }
    group.finish();
}

/// Benchmark almanac parsing
fn bench_almanac_parsing(c: &mut Criterion) {
    let text = synthetic_almanac(7, 500);

    let mut group = c.benchmark_group("almanac_parsing");
    group.throughput(Throughput::Bytes(text.len() as u64));
    group.bench_function("parse_str", |b| {
        b.iter(|| {
            let almanac = parse_almanac_str(black_box(&text)).unwrap();
            black_box(almanac)
        })
    });
    group.finish();
}

criterion_group!(
    benches,
    bench_map_range,
    bench_map_point,
    bench_pipeline,
    bench_merge_policies,
    bench_almanac_parsing,
);

criterion_main!(benches);
