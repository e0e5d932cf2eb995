use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use rand::SeedableRng;
use rand::rngs::StdRng;
use voroplane::sampling::uniform_in_rect;
use voroplane::{BoundingRect, ClusterAssigner, KMeansConfig, Seeding};

const SIZES: [usize; 3] = [100, 10_000, 100_000];
const K: usize = 16;

fn benchmark_kmeans(c: &mut Criterion) {
    let bounds = BoundingRect::new(0.0, 100.0, 0.0, 100.0);
    let mut group = c.benchmark_group("kmeans_10_iterations");
    group.sample_size(10);

    for &size in &SIZES {
        let mut rng = StdRng::seed_from_u64(7);
        let points = uniform_in_rect(size, &bounds, &mut rng);

        for parallel in [true, false] {
            let name = if parallel { "parallel" } else { "serial" };
            group.bench_with_input(BenchmarkId::new(name, size), &points, |b, points| {
                let config = KMeansConfig::new(K, Seeding::RandomUniform(bounds)).with_parallel(parallel);
                b.iter(|| {
                    let mut km = ClusterAssigner::initialize(black_box(points), config.clone()).unwrap();
                    km.run(10)
                })
            });
        }
    }
    group.finish();
}

criterion_group!(benches, benchmark_kmeans);
criterion_main!(benches);
