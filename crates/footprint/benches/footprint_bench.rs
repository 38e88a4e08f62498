//! Criterion benchmarks for the footprint pipeline.
//! Focus sizes: square grids with side in {64, 128, 256}.
//! Results: by default under target/criterion; to store under data/bench, run:
//!   CARGO_TARGET_DIR=data/bench cargo bench -p footprint

use criterion::{criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion};
use footprint::api::{
    convex_hull, draw_footprint_grid, min_area_rect, valid_pixels, FootprintExtractor,
    FootprintReplay, FootprintSampleCfg, GeomCfg, QuadRefiner,
};

fn sample_cfg(side: usize) -> FootprintSampleCfg {
    FootprintSampleCfg {
        width: side,
        height: side,
        ..FootprintSampleCfg::default()
    }
}

fn bench_footprint(c: &mut Criterion) {
    let mut group = c.benchmark_group("footprint");
    group.sample_size(20);
    for &side in &[64usize, 128, 256] {
        let tok = FootprintReplay { seed: 7, index: side as u64 };
        let (grid, _) = draw_footprint_grid(sample_cfg(side), tok);
        let points = valid_pixels(&grid);

        group.bench_with_input(BenchmarkId::new("convex_hull", side), &points, |b, pts| {
            b.iter(|| convex_hull(pts, GeomCfg::default()).unwrap())
        });

        let hull = convex_hull(&points, GeomCfg::default()).unwrap();
        group.bench_with_input(BenchmarkId::new("min_area_rect", side), &hull, |b, h| {
            b.iter(|| min_area_rect(h).unwrap())
        });

        let seed = min_area_rect(&hull).unwrap().to_quad();
        group.bench_with_input(BenchmarkId::new("refine", side), &hull, |b, h| {
            let refiner = QuadRefiner::default();
            b.iter(|| refiner.refine(&seed, h))
        });

        group.bench_with_input(BenchmarkId::new("extract_pixels", side), &side, |b, &side| {
            let ex = FootprintExtractor::default();
            b.iter_batched(
                || draw_footprint_grid(sample_cfg(side), tok).0,
                |g| {
                    let _fp = ex.extract_pixels(&g).unwrap();
                },
                BatchSize::LargeInput,
            )
        });
    }
    group.finish();
}

criterion_group!(benches, bench_footprint);
criterion_main!(benches);
