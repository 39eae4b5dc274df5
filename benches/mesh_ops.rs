//! Benchmarks for mesh preprocessing operations.

use criterion::{criterion_group, criterion_main, Criterion};
use meshprep::prelude::*;
use nalgebra::Point3;

fn create_grid_mesh(n: usize) -> (Vec<Point3<f32>>, Vec<u32>) {
    let mut positions = Vec::with_capacity((n + 1) * (n + 1));
    let mut indices = Vec::with_capacity(n * n * 6);

    // Create grid vertices
    for j in 0..=n {
        for i in 0..=n {
            positions.push(Point3::new(i as f32, j as f32, 0.0));
        }
    }

    // Create triangles
    for j in 0..n {
        for i in 0..n {
            let v00 = (j * (n + 1) + i) as u32;
            let v10 = v00 + 1;
            let v01 = v00 + (n + 1) as u32;
            let v11 = v01 + 1;

            indices.extend_from_slice(&[v00, v10, v11]);
            indices.extend_from_slice(&[v00, v11, v01]);
        }
    }

    (positions, indices)
}

fn bench_topology(c: &mut Criterion) {
    let (positions, indices) = create_grid_mesh(50);

    c.bench_function("adjacency_and_point_reps_50x50", |b| {
        b.iter(|| generate_adjacency_and_point_reps(&indices, &positions, 0.0).unwrap());
    });

    c.bench_function("point_reps_with_tolerance_50x50", |b| {
        b.iter(|| generate_point_reps(&indices, &positions, 1e-4).unwrap());
    });
}

fn bench_clean(c: &mut Criterion) {
    let (positions, indices) = create_grid_mesh(50);
    let adjacency = generate_adjacency(&indices, &positions, 0.0).unwrap();

    c.bench_function("clean_50x50", |b| {
        b.iter(|| {
            let mut ib = indices.clone();
            let mut adj = adjacency.clone();
            clean(&mut ib, positions.len(), Some(&mut adj), None, true).unwrap()
        });
    });
}

fn bench_attributes(c: &mut Criterion) {
    let (positions, indices) = create_grid_mesh(50);

    c.bench_function("compute_normals_50x50", |b| {
        b.iter(|| compute_normals(&indices, &positions, &NormalOptions::default()).unwrap());
    });
}

fn bench_optimize(c: &mut Criterion) {
    let (positions, indices) = create_grid_mesh(50);
    let adjacency = generate_adjacency(&indices, &positions, 0.0).unwrap();

    c.bench_function("optimize_faces_50x50", |b| {
        b.iter(|| optimize_faces(&indices, &adjacency, FaceOptimization::default()).unwrap());
    });

    c.bench_function("vertex_cache_miss_rate_50x50", |b| {
        b.iter(|| vertex_cache_miss_rate(&indices, positions.len(), 16).unwrap());
    });
}

criterion_group!(benches, bench_topology, bench_clean, bench_attributes, bench_optimize);
criterion_main!(benches);
