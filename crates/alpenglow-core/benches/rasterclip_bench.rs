//! Criterion benchmarks for the raster-clip segmented reduction's
//! classify/scan/scatter stage. Focus sizes: edge counts in {64, 512, 4096}.

use alpenglow_core::rasterclip::{chunk_indices, patch_chunks, scan_offsets, scatter, EdgeClip};
use criterion::{criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion};
use rand::{rngs::StdRng, Rng, SeedableRng};

fn random_clips(count: usize, num_chunks: u32, seed: u64) -> Vec<EdgeClip> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut clips = Vec::with_capacity(count);
    let per_chunk = (count as u32 / num_chunks).max(1);
    for i in 0..count {
        let chunk_index = (i as u32 / per_chunk).min(num_chunks - 1);
        let is_first_edge = i as u32 % per_chunk == 0;
        let is_last_edge = i as u32 % per_chunk == per_chunk - 1;
        clips.push(EdgeClip {
            chunk_index,
            is_first_edge,
            is_last_edge,
            start: (rng.gen_range(0.0..1.0), rng.gen_range(0.0..1.0)),
            end: (rng.gen_range(0.0..1.0), rng.gen_range(0.0..1.0)),
            reducible: rng.gen_bool(0.3),
        });
    }
    clips
}

fn bench_scan_and_scatter(c: &mut Criterion) {
    let mut group = c.benchmark_group("rasterclip_scan_scatter");
    for &count in &[64usize, 512, 4096] {
        group.bench_with_input(BenchmarkId::new("scan_offsets", count), &count, |b, &count| {
            b.iter_batched(
                || random_clips(count, 16, 7),
                |clips| {
                    let _offsets = scan_offsets(&clips, 256);
                },
                BatchSize::SmallInput,
            )
        });

        group.bench_with_input(BenchmarkId::new("scatter", count), &count, |b, &count| {
            b.iter_batched(
                || {
                    let clips = random_clips(count, 16, 7);
                    let offsets = scan_offsets(&clips, 256);
                    (clips, offsets)
                },
                |(clips, offsets)| {
                    let _split = scatter(&clips, &offsets);
                },
                BatchSize::SmallInput,
            )
        });

        group.bench_with_input(BenchmarkId::new("chunk_patch", count), &count, |b, &count| {
            b.iter_batched(
                || random_clips(count, 16, 7),
                |clips| {
                    let indices = chunk_indices(&clips, 16);
                    let _headers = patch_chunks(&indices);
                },
                BatchSize::SmallInput,
            )
        });
    }
    group.finish();
}

criterion_group!(benches, bench_scan_and_scatter);
criterion_main!(benches);
