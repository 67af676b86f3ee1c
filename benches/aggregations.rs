//! Grouped-statistics and correlation benchmarks
//!
//! Establishes a baseline for the two hot paths: partitioned
//! mean/std summarization and pairwise Pearson computation.
//!
//! Run with: cargo bench --bench aggregations

use claridad::config::CorrelationPair;
use claridad::corr::{self, pearson};
use claridad::dataset::{Dataset, FieldValue};
use claridad::stats;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const SMALL_SIZE: usize = 1_000;
const MEDIUM_SIZE: usize = 100_000;

fn trial_dataset(rows: usize, buckets: i64, missing_rate: f64) -> Dataset {
    let mut rng = StdRng::seed_from_u64(42);
    let keys: Vec<FieldValue> = (0..rows)
        .map(|_| FieldValue::Int(rng.gen_range(0..buckets) * 50))
        .collect();
    let sample = |rng: &mut StdRng| -> Option<f64> {
        if rng.gen_bool(missing_rate) {
            None
        } else {
            Some(rng.gen_range(0.0..1.0))
        }
    };
    let consistency: Vec<Option<f64>> = (0..rows).map(|_| sample(&mut rng)).collect();
    let readability: Vec<Option<f64>> = (0..rows).map(|_| sample(&mut rng)).collect();

    Dataset::builder()
        .key_column("TargetLength", keys)
        .metric_column("NLI_AverageScore", consistency)
        .metric_column("FleschKincaid", readability)
        .build()
        .unwrap()
}

fn bench_summarize(c: &mut Criterion) {
    let mut group = c.benchmark_group("grouped_summarize");
    let grouping_key = vec!["TargetLength".to_string()];
    let metrics = vec![
        "NLI_AverageScore".to_string(),
        "FleschKincaid".to_string(),
    ];

    for size in [SMALL_SIZE, MEDIUM_SIZE] {
        let dataset = trial_dataset(size, 5, 0.05);
        group.bench_with_input(
            BenchmarkId::new("mean_std", size),
            &dataset,
            |b, dataset| {
                b.iter(|| {
                    stats::summarize(black_box(dataset), &grouping_key, &metrics).unwrap()
                });
            },
        );
    }
    group.finish();
}

fn bench_correlations(c: &mut Criterion) {
    let mut group = c.benchmark_group("pearson_correlation");

    let mut rng = StdRng::seed_from_u64(7);
    let xs: Vec<f64> = (0..MEDIUM_SIZE).map(|_| rng.gen_range(0.0..1.0)).collect();
    let ys: Vec<f64> = (0..MEDIUM_SIZE).map(|_| rng.gen_range(0.0..1.0)).collect();
    group.bench_function(BenchmarkId::new("raw_pearson", MEDIUM_SIZE), |b| {
        b.iter(|| pearson(black_box(&xs), black_box(&ys)));
    });

    let dataset = trial_dataset(MEDIUM_SIZE, 5, 0.05);
    let grouping_key = vec!["TargetLength".to_string()];
    let pairs = vec![CorrelationPair::inverted(
        "NLI_AverageScore",
        "FleschKincaid",
    )];
    group.bench_function(BenchmarkId::new("length_controlled", MEDIUM_SIZE), |b| {
        b.iter(|| {
            corr::correlate_by(black_box(&dataset), &grouping_key, &pairs, 3).unwrap()
        });
    });

    group.finish();
}

criterion_group!(benches, bench_summarize, bench_correlations);
criterion_main!(benches);
