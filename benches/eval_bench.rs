//! Benchmarks for rule evaluation and aggregation.

#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::explicit_iter_loop,
    missing_docs
)]

use std::sync::Arc;

use arrow::array::{ArrayRef, Float64Array, Int64Array};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use medir::{col, lit, Aggregator, DataTable, Evaluator, RuleSet};

fn create_table(rows: usize) -> DataTable {
    #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
    let ids: Vec<i64> = (0..rows as i64).collect();
    #[allow(clippy::cast_precision_loss)]
    let scores: Vec<f64> = ids.iter().map(|i| *i as f64 * 1.5).collect();
    let groups: Vec<i64> = ids.iter().map(|i| i % 8).collect();

    let id: ArrayRef = Arc::new(Int64Array::from(ids));
    let score: ArrayRef = Arc::new(Float64Array::from(scores));
    let group: ArrayRef = Arc::new(Int64Array::from(groups));

    DataTable::from_columns(vec![("id", id), ("score", score), ("group", group)])
        .expect("Failed to create table")
}

fn create_rules() -> RuleSet {
    let mut rules = RuleSet::new();
    rules
        .bind("score_positive", col("score").gt(lit(0.0)))
        .expect("Failed to bind rule");
    rules
        .bind("score_in_range", col("score").lt(lit(1_000_000.0)))
        .expect("Failed to bind rule");
    rules
        .bind(
            "materiality",
            col("score").gt(lit(100.0)).mul(col("score")),
        )
        .expect("Failed to bind rule");
    rules
        .bind("mean_score", col("score").mean())
        .expect("Failed to bind rule");
    rules
}

fn bench_evaluation(c: &mut Criterion) {
    let mut group = c.benchmark_group("evaluation");
    let rules = create_rules();

    for size in [1_000, 10_000, 100_000].iter() {
        let table = create_table(*size);
        group.throughput(Throughput::Elements(*size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &table, |b, table| {
            let evaluator = Evaluator::new();
            b.iter(|| evaluator.evaluate(black_box(&rules), table).unwrap());
        });
    }

    group.finish();
}

fn bench_parallel_evaluation(c: &mut Criterion) {
    let mut group = c.benchmark_group("evaluation_parallel");
    let rules = create_rules();

    for workers in [1, 2, 4].iter() {
        let table = create_table(100_000);
        group.bench_with_input(
            BenchmarkId::from_parameter(workers),
            &table,
            |b, table| {
                let evaluator = Evaluator::new().num_workers(*workers);
                b.iter(|| evaluator.evaluate(black_box(&rules), table).unwrap());
            },
        );
    }

    group.finish();
}

fn bench_aggregation(c: &mut Criterion) {
    let mut group = c.benchmark_group("aggregation");
    let rules = create_rules();

    for size in [1_000, 10_000, 100_000].iter() {
        let table = create_table(*size);
        let result = Evaluator::new()
            .evaluate(&rules, &table)
            .expect("Failed to evaluate");
        group.throughput(Throughput::Elements(*size as u64));
        group.bench_with_input(
            BenchmarkId::from_parameter(size),
            &(table, result),
            |b, (table, result)| {
                let aggregator = Aggregator::new().group_by("group");
                b.iter(|| aggregator.aggregate(black_box(result), table).unwrap());
            },
        );
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_evaluation,
    bench_parallel_evaluation,
    bench_aggregation
);
criterion_main!(benches);
