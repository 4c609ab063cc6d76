use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use solar_compare::analysis::descriptive;
use solar_compare::analysis::significance::{kruskal_wallis, one_way_anova};
use std::hint::black_box;

// ── Helpers ──────────────────────────────────────────────────────────

/// Deterministic irradiance-like samples with a per-group offset and ties
fn synthetic_groups(size: usize) -> Vec<Vec<f64>> {
    (0..3)
        .map(|group| {
            (0..size)
                .map(|i| {
                    let wave = ((i * 37 + group * 11) % 1000) as f64;
                    (wave + group as f64 * 25.0).round()
                })
                .collect()
        })
        .collect()
}

// ── Significance tests ───────────────────────────────────────────────

fn bench_kruskal_wallis(c: &mut Criterion) {
    let mut group = c.benchmark_group("kruskal_wallis");
    for size in [1_000, 10_000, 100_000] {
        let groups = synthetic_groups(size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &groups, |b, groups| {
            b.iter(|| kruskal_wallis("GHI", black_box(groups)))
        });
    }
    group.finish();
}

fn bench_anova(c: &mut Criterion) {
    let mut group = c.benchmark_group("anova");
    for size in [1_000, 10_000, 100_000] {
        let groups = synthetic_groups(size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &groups, |b, groups| {
            b.iter(|| one_way_anova("GHI", black_box(groups)))
        });
    }
    group.finish();
}

// ── Descriptive statistics ───────────────────────────────────────────

fn bench_median(c: &mut Criterion) {
    let values: Vec<f64> = synthetic_groups(100_000).concat();
    c.bench_function("descriptive/median_300k", |b| {
        b.iter(|| descriptive::median(black_box(&values)))
    });
}

criterion_group!(benches, bench_kruskal_wallis, bench_anova, bench_median);
criterion_main!(benches);
