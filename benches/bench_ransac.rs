use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use lidarguard_core::{PointCloud, PointXYZ};
use lidarguard_segmentation::segment_plane_seeded;
use rand::prelude::*;

/// Ground plane with scattered elevated outliers, like a filtered city frame.
fn scene(n: usize) -> PointCloud<PointXYZ> {
    let mut rng = StdRng::seed_from_u64(42);
    (0..n)
        .map(|i| {
            if i % 5 == 0 {
                PointXYZ::new(
                    rng.gen_range(-20.0..20.0),
                    rng.gen_range(-7.0..7.0),
                    rng.gen_range(0.5..3.0),
                )
            } else {
                PointXYZ::new(
                    rng.gen_range(-20.0..20.0),
                    rng.gen_range(-7.0..7.0),
                    rng.gen_range(-0.05..0.05),
                )
            }
        })
        .collect()
}

fn bench_ransac(c: &mut Criterion) {
    let mut group = c.benchmark_group("segment_plane");
    for size in [5_000, 20_000, 80_000] {
        let cloud = scene(size);
        group.bench_with_input(BenchmarkId::new("lidarguard", size), &cloud, |b, cloud| {
            b.iter(|| segment_plane_seeded(cloud, 50, 0.15, 42).unwrap())
        });
    }
    group.finish();
}

criterion_group!(benches, bench_ransac);
criterion_main!(benches);
