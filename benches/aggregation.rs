//! Benchmarks for KPI computation and grouped scoring.

use chrono::{Duration, TimeZone, Utc};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use forecast_kpi::aggregate::{aggregate_and_score, AggregationConfig};
use forecast_kpi::core::ObservationTable;
use forecast_kpi::metrics::compute_from_pairs;
use forecast_kpi::report::{period_chart, PeriodSeriesConfig, Theme};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn generate_pairs(n: usize) -> (Vec<f64>, Vec<f64>) {
    let mut rng = StdRng::seed_from_u64(42);
    let targets: Vec<f64> = (0..n).map(|_| rng.gen_range(0.0..100.0)).collect();
    let preds = targets
        .iter()
        .map(|t| t * rng.gen_range(0.8..1.2))
        .collect();
    (targets, preds)
}

/// `days` of daily observations for 20 stores and 50 products.
fn generate_table(days: i64) -> ObservationTable {
    let mut rng = StdRng::seed_from_u64(7);
    let start = Utc.with_ymd_and_hms(2022, 1, 3, 0, 0, 0).unwrap();
    let mut dates = Vec::new();
    let mut stores = Vec::new();
    let mut products = Vec::new();
    let mut sales = Vec::new();
    let mut fc = Vec::new();

    for day in 0..days {
        let ts = start + Duration::days(day);
        for store in 0..20 {
            for product in 0..50 {
                let actual: f64 = rng.gen_range(0.0..20.0);
                dates.push(ts);
                stores.push(format!("store{}", store));
                products.push(format!("p{}", product));
                sales.push(actual);
                fc.push(actual + rng.gen_range(-2.0..2.0));
            }
        }
    }

    ObservationTable::builder()
        .timestamp("C_DATE", dates)
        .categorical("store", stores)
        .categorical("product", products)
        .numeric("N_SALES", sales)
        .numeric("PREDICTIONS", fc)
        .build()
        .unwrap()
}

fn bench_metrics(c: &mut Criterion) {
    let mut group = c.benchmark_group("compute_from_pairs");

    for size in [1_000, 10_000, 100_000].iter() {
        let (targets, preds) = generate_pairs(*size);
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| compute_from_pairs(black_box(&targets), black_box(&preds), 0))
        });
    }

    group.finish();
}

fn bench_scoring(c: &mut Criterion) {
    let mut group = c.benchmark_group("aggregate_and_score");
    group.sample_size(20);

    for days in [7, 28].iter() {
        let table = generate_table(*days);

        group.bench_with_input(BenchmarkId::new("by_store", days), days, |b, _| {
            let config = AggregationConfig::new("store", "N_SALES", "PREDICTIONS")
                .with_entity_field("product");
            b.iter(|| aggregate_and_score(black_box(&table), &config))
        });

        group.bench_with_input(BenchmarkId::new("by_store_daily", days), days, |b, _| {
            let config = AggregationConfig::new("store", "N_SALES", "PREDICTIONS")
                .with_granularity(vec!["C_DATE"]);
            b.iter(|| aggregate_and_score(black_box(&table), &config))
        });
    }

    group.finish();
}

fn bench_period_chart(c: &mut Criterion) {
    let table = generate_table(365);
    let config = PeriodSeriesConfig::weekly("N_SALES", vec!["PREDICTIONS"]);
    let theme = Theme::default();

    c.bench_function("weekly_period_chart", |b| {
        b.iter(|| period_chart(black_box(&table), &config, "weekly", &theme))
    });
}

criterion_group!(benches, bench_metrics, bench_scoring, bench_period_chart);
criterion_main!(benches);
