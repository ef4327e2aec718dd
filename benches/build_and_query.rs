use std::time::Duration;

use criterion::{BatchSize, Criterion, criterion_group, criterion_main};
use minikd::{
    KdTree, StackCache,
    geometry::{FloatType, Ray, WorldBox, WorldPoint, WorldTriangle, WorldVector},
};
use rand::{Rng, SeedableRng, rngs::SmallRng};

fn random_soup(count: usize) -> Vec<WorldTriangle> {
    let mut rng = SmallRng::seed_from_u64(1234);
    (0..count)
        .map(|_| {
            let center = WorldPoint::new(
                rng.random_range(-9.0..9.0),
                rng.random_range(-9.0..9.0),
                rng.random_range(-9.0..9.0),
            );
            let mut vertex = || {
                center
                    + WorldVector::new(
                        rng.random_range(-1.0..1.0),
                        rng.random_range(-1.0..1.0),
                        rng.random_range(-1.0..1.0),
                    )
            };
            WorldTriangle::new(vertex(), vertex(), vertex())
        })
        .collect()
}

fn bounds() -> WorldBox {
    WorldBox::new([-10.0, -10.0, -10.0].into(), [10.0, 10.0, 10.0].into())
}

fn rays() -> Vec<Ray> {
    (0..64)
        .flat_map(|y| {
            (0..64).map(move |x| {
                Ray::new(
                    WorldPoint::new(0.0, 0.0, 30.0),
                    WorldVector::new(
                        (x as FloatType / 32.0 - 1.0) * 10.0,
                        (y as FloatType / 32.0 - 1.0) * 10.0,
                        -30.0,
                    ),
                )
            })
        })
        .collect()
}

fn criterion_benchmark(c: &mut Criterion) {
    let triangles = random_soup(20_000);

    c.bench_function("build_20k", |b| {
        b.iter_batched(
            || triangles.clone(),
            |triangles| KdTree::build(&triangles, bounds()).unwrap(),
            BatchSize::LargeInput,
        )
    });

    let tree = KdTree::build(&triangles, bounds()).unwrap();
    let rays = rays();
    c.bench_function("query_4k_rays", |b| {
        let mut stack = StackCache::default();
        b.iter(|| {
            rays.iter()
                .filter(|ray| tree.intersect_with_stack(ray, &mut stack).is_some())
                .count()
        })
    });
}

criterion_group! {
    name = benches;
    config = Criterion::default().sample_size(20).measurement_time(Duration::from_secs(20));
    targets = criterion_benchmark
}
criterion_main!(benches);
