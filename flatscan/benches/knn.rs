/*
 * Copyright (c) Microsoft Corporation.
 * Licensed under the MIT license.
 */

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rand::{rngs::StdRng, Rng, SeedableRng};
use rand_distr::StandardNormal;

use flatscan::{create_thread_pool, knn_l2sqr, HeapArray, MatrixView, NoInterrupt};

fn random_vectors(rng: &mut StdRng, len: usize) -> Vec<f32> {
    (0..len).map(|_| rng.sample(StandardNormal)).collect()
}

fn bench_knn_l2sqr(c: &mut Criterion) {
    let pool = create_thread_pool(0).unwrap();
    let mut rng = StdRng::seed_from_u64(0x5eed5eed5eed5eed);

    let mut group = c.benchmark_group("knn_l2sqr");
    for &(nx, ny, d, k) in &[(10usize, 10_000usize, 96usize, 10usize), (256, 10_000, 96, 10)] {
        let x_data = random_vectors(&mut rng, nx * d);
        let y_data = random_vectors(&mut rng, ny * d);
        let x = MatrixView::try_from(&x_data, nx, d).unwrap();
        let y = MatrixView::try_from(&y_data, ny, d).unwrap();

        group.throughput(Throughput::Elements((nx * ny) as u64));
        group.bench_function(BenchmarkId::from_parameter(format!("{nx}x{ny}x{d}")), |b| {
            let mut values = vec![0.0f32; nx * k];
            let mut ids = vec![0i64; nx * k];
            b.iter(|| {
                let mut heaps = HeapArray::try_new(&mut values, &mut ids, k).unwrap();
                knn_l2sqr(x, y, &mut heaps, None, &pool, &NoInterrupt).unwrap();
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_knn_l2sqr);
criterion_main!(benches);
