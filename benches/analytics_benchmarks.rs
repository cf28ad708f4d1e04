use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use supply_chain_analytics::{
    config::AppConfig,
    services::{
        analytics::AnalyticsService,
        kpi::KpiCalculator,
        synthesizer::{DataSynthesizer, SynthesisSettings},
    },
};

fn settings(sku_count: usize) -> SynthesisSettings {
    SynthesisSettings {
        seed: 42,
        sku_count,
        year: 2024,
        lead_time_days: 14,
    }
}

// Benchmark for dataset synthesis across catalogue sizes
fn synthesis_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("synthesis");

    for size in [100, 1_000, 5_000].iter() {
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, &size| {
            b.iter(|| {
                let mut synthesizer = DataSynthesizer::new(settings(size)).unwrap();
                black_box(synthesizer.generate())
            });
        });
    }

    group.finish();
}

// Benchmark for inventory KPIs on a fixed dataset
fn inventory_kpi_benchmark(c: &mut Criterion) {
    let inventory = DataSynthesizer::new(settings(5_000))
        .unwrap()
        .generate_inventory();
    let calculator = KpiCalculator::default();

    c.bench_function("inventory_kpis", |b| {
        b.iter(|| {
            let rows = calculator.assess_inventory(black_box(&inventory));
            black_box(calculator.inventory_kpis(&rows))
        });
    });
}

// Benchmark for revenue aggregation
fn revenue_aggregation_benchmark(c: &mut Criterion) {
    let sales = DataSynthesizer::new(settings(100)).unwrap().generate_sales();
    let calculator = KpiCalculator::default();

    c.bench_function("revenue_aggregation", |b| {
        b.iter(|| black_box(calculator.aggregate_revenue(black_box(&sales)).unwrap()));
    });
}

// Benchmark for the full in-memory analysis
fn analysis_benchmark(c: &mut Criterion) {
    let service = AnalyticsService::new(AppConfig::default()).unwrap();

    c.bench_function("synthesize_and_analyze", |b| {
        b.iter(|| {
            let dataset = service.synthesize().unwrap();
            black_box(service.analyze(dataset).unwrap())
        });
    });
}

criterion_group!(
    benches,
    synthesis_benchmark,
    inventory_kpi_benchmark,
    revenue_aggregation_benchmark,
    analysis_benchmark
);
criterion_main!(benches);
