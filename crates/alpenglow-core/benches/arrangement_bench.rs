//! Criterion benchmarks for building an arrangement from regular n-gons.
//! Focus sizes: n in {4, 16, 64, 256}.

use alpenglow_core::arrangement::{build_arrangement, FillRule, RenderPath, Vector2};
use criterion::{criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion};

fn regular_ngon(n: usize, radius: f64, center: (f64, f64)) -> RenderPath {
    let mut points = Vec::with_capacity(n);
    for i in 0..n {
        let theta = std::f64::consts::TAU * (i as f64) / (n as f64);
        points.push(Vector2::new(center.0 + radius * theta.cos(), center.1 + radius * theta.sin()));
    }
    RenderPath::new(FillRule::NonZero, vec![points])
}

fn bench_build_arrangement(c: &mut Criterion) {
    let mut group = c.benchmark_group("build_arrangement");
    for &n in &[4usize, 16, 64, 256] {
        group.bench_with_input(BenchmarkId::new("single_ngon", n), &n, |b, &n| {
            b.iter_batched(
                || vec![regular_ngon(n, 100.0, (0.0, 0.0))],
                |paths| {
                    let _arrangement = build_arrangement(&paths).unwrap();
                },
                BatchSize::SmallInput,
            )
        });

        group.bench_with_input(BenchmarkId::new("overlapping_ngon_pair", n), &n, |b, &n| {
            b.iter_batched(
                || vec![regular_ngon(n, 100.0, (0.0, 0.0)), regular_ngon(n, 100.0, (60.0, 0.0))],
                |paths| {
                    let _arrangement = build_arrangement(&paths).unwrap();
                },
                BatchSize::SmallInput,
            )
        });
    }
    group.finish();
}

criterion_group!(benches, bench_build_arrangement);
criterion_main!(benches);
