//! Benchmarks for a full solver step.
//!
//! Run with: `cargo bench --bench step_bench`
//!
//! Benchmarks boundary pass, assembly and update on a rectangular basin
//! with a sloshing initial level, for several mesh and layer counts.

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use tidal_fe::{CurrentSolver, DepthLevels, MeshTopology, NodeIndex, SolverConfig, TriMesh};

/// Basin of `nx × ny` cells, 10 m deep, with `n_layers` layers.
fn setup_solver(nx: usize, ny: usize, n_layers: usize) -> CurrentSolver<TriMesh> {
    let mesh = TriMesh::uniform_rectangle(0.0, 5000.0, 0.0, 2000.0, nx, ny, |_, _| 10.0);
    let levels = DepthLevels::uniform(n_layers, 10.0 / n_layers as f64).unwrap();
    let mut solver = CurrentSolver::initialize(mesh, levels, SolverConfig::default(), 0.0).unwrap();
    for n in 0..solver.mesh().n_nodes() {
        let (x, _) = solver.mesh().position(n);
        let eta = 0.2 * (std::f64::consts::PI * x / 5000.0).cos();
        solver.set_water_level(NodeIndex::new(n), eta).unwrap();
    }
    solver
}

/// Benchmark one step for growing meshes.
fn bench_step(c: &mut Criterion) {
    let mut group = c.benchmark_group("step");

    for (nx, ny) in [(20, 8), (40, 16), (80, 32)] {
        let n_elements = 2 * nx * ny;
        let mut solver = setup_solver(nx, ny, 5);

        group.bench_with_input(
            BenchmarkId::new("basin_5_layers", format!("{}_elements", n_elements)),
            &n_elements,
            |b, _| {
                b.iter(|| black_box(solver.step(black_box(1.0)).unwrap()));
            },
        );
    }

    group.finish();
}

/// Benchmark one step for growing layer counts.
fn bench_layers(c: &mut Criterion) {
    let mut group = c.benchmark_group("layers");

    for n_layers in [1, 5, 10, 20] {
        let mut solver = setup_solver(40, 16, n_layers);

        group.bench_with_input(BenchmarkId::new("basin_1280_elements", n_layers), &n_layers, |b, _| {
            b.iter(|| black_box(solver.step(black_box(1.0)).unwrap()));
        });
    }

    group.finish();
}

/// Benchmark assembly alone.
fn bench_assembly(c: &mut Criterion) {
    let mut solver = setup_solver(40, 16, 5);
    solver.apply_boundary_conditions().unwrap();

    c.bench_function("assemble_1280_elements", |b| {
        b.iter(|| {
            solver.apply_boundary_conditions().unwrap();
            black_box(solver.assemble().unwrap())
        });
    });
}

criterion_group!(benches, bench_step, bench_layers, bench_assembly);
criterion_main!(benches);
