/*
 * Boid Simulation Benchmark
 *
 * Measures the key operations of a tick: the exhaustive neighbor scan, the
 * steering force calculations, and the full step on the sequential and
 * parallel backends.
 */

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::time::Duration;

use flocking::neighbors::neighbors;
use flocking::parallel::{default_chunk_size, step_parallel};
use flocking::steering::compute_forces;
use flocking::{initialize_with_rng, step_into, Boid, SimulationParams};

fn flock(n: usize) -> (Vec<Boid>, SimulationParams) {
    let params = SimulationParams {
        num_boids: n,
        spawn_radius: 80.0,
        ..SimulationParams::default()
    };
    let boids = initialize_with_rng(&params, &mut StdRng::seed_from_u64(42));
    (boids, params)
}

// Benchmark the neighbor query for every boid
fn bench_neighbor_query(c: &mut Criterion) {
    let mut group = c.benchmark_group("neighbor_query");

    for num_boids in [100, 500, 1000, 2000].iter() {
        group.bench_with_input(BenchmarkId::from_parameter(num_boids), num_boids, |b, &n| {
            let (boids, params) = flock(n);
            b.iter(|| {
                for i in 0..boids.len() {
                    black_box(neighbors(i, &boids, &params));
                }
            });
        });
    }

    group.finish();
}

// Benchmark the force calculations with precomputed neighbor sets
fn bench_force_calculations(c: &mut Criterion) {
    let mut group = c.benchmark_group("force_calculations");

    for num_boids in [100, 500, 1000, 2000].iter() {
        group.bench_with_input(BenchmarkId::from_parameter(num_boids), num_boids, |b, &n| {
            let (boids, params) = flock(n);
            let neighbor_sets: Vec<Vec<usize>> =
                (0..boids.len()).map(|i| neighbors(i, &boids, &params)).collect();

            b.iter(|| {
                for (boid, set) in boids.iter().zip(&neighbor_sets) {
                    black_box(compute_forces(boid, set, &boids, &params));
                }
            });
        });
    }

    group.finish();
}

// Benchmark the full step on both backends
fn bench_update_loop(c: &mut Criterion) {
    let mut group = c.benchmark_group("update_loop");

    for num_boids in [500, 2000, 8000].iter() {
        group.bench_with_input(BenchmarkId::new("sequential", num_boids), num_boids, |b, &n| {
            let (boids, params) = flock(n);
            let mut out = boids.clone();
            b.iter(|| step_into(black_box(&boids), &params, &mut out));
        });

        group.bench_with_input(BenchmarkId::new("parallel", num_boids), num_boids, |b, &n| {
            let (boids, params) = flock(n);
            let mut out = boids.clone();
            let chunk_size = default_chunk_size(n);
            b.iter(|| step_parallel(black_box(&boids), &params, &mut out, chunk_size));
        });
    }

    group.finish();
}

// Configure the benchmarks
criterion_group! {
    name = benches;
    config = Criterion::default()
        .sample_size(10)
        .measurement_time(Duration::from_secs(5))
        .warm_up_time(Duration::from_secs(1));
    targets = bench_neighbor_query, bench_force_calculations, bench_update_loop
}

criterion_main!(benches);
