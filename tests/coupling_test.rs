//! Integration tests for coupled sub-model data and friction.
//!
//! These tests verify:
//! - Bed depths from a bathymetry source reach the node state
//! - Wave radiation stress drives the current
//! - The Strickler law sets the bed-layer friction coefficient

use tidal_fe::{
    CurrentSolver, DepthLevels, FrictionLaw, LayerIndex, MeshTopology, NodeIndex, Quantity,
    SolverConfig, TriMesh, WaveData, WaveSource,
};

const LENGTH: f64 = 1000.0;

fn basin(config: SolverConfig) -> CurrentSolver<TriMesh> {
    let mesh = TriMesh::uniform_rectangle(0.0, LENGTH, 0.0, 200.0, 10, 2, |_, _| 2.0);
    let levels = DepthLevels::uniform(3, 1.0).unwrap();
    CurrentSolver::initialize(mesh, levels, config, 0.0).unwrap()
}

#[test]
fn test_bathymetry_source_moves_bed() {
    let mut solver = basin(SolverConfig::default());
    let target = 7;
    solver.set_bathymetry(Box::new(move |n: usize, t: f64| {
        if n == target {
            Some(3.0 + t)
        } else if n == target + 1 {
            Some(f64::NAN)
        } else {
            None
        }
    }));
    solver.step(1.0).unwrap();

    {
        let s = solver.store().lock(target);
        assert_eq!(s.bottom, 3.0);
        assert!((s.total_depth - (3.0 + s.eta)).abs() < 1e-12);
        // The deeper bed opens the third layer.
        assert!(s.get(2, Quantity::Thickness) > 0.0);
    }
    // Non-finite depths are ignored.
    assert_eq!(solver.store().lock(target + 1).bottom, 2.0);
    assert_eq!(solver.store().lock(0).bottom, 2.0);

    // Read again at the start of the next step.
    solver.step(1.0).unwrap();
    assert_eq!(solver.store().lock(target).bottom, 4.0);
}

/// Wave model that covers no node.
struct Calm;

impl WaveSource for Calm {
    fn wave(&self, _node: usize, _t: f64) -> Option<WaveData> {
        None
    }
}

/// Radiation stress S_xx falling linearly toward +x.
struct Gradient {
    positions: Vec<(f64, f64)>,
}

impl WaveSource for Gradient {
    fn wave(&self, node: usize, _t: f64) -> Option<WaveData> {
        let (x, _) = self.positions[node];
        Some(WaveData {
            sxx: 1.0 - x / LENGTH,
            sxy: 0.0,
            syy: 0.0,
            amplitude: 0.2,
        })
    }
}

#[test]
fn test_radiation_stress_drives_current() {
    let mut solver = basin(SolverConfig::default());
    let positions = (0..solver.mesh().n_nodes())
        .map(|n| solver.mesh().position(n))
        .collect();
    solver.set_waves(Box::new(Gradient { positions }));
    solver.step(1.0).unwrap();

    let mid = solver.mesh().nodes_at_x(500.0, 1e-6)[1];
    let s = solver.store().lock(mid);
    assert!(s.sub_models.wave.is_some());
    for k in s.layer_range() {
        // a = -(1/H)·∂S_xx/∂x = 1/(1000·2)
        let u = s.get(k, Quantity::U);
        assert!(u > 0.0, "layer {k}: u = {u}");
        assert!(u < 1.0e-3);
    }
}

#[test]
fn test_waves_absent_leave_still_water() {
    let mut solver = basin(SolverConfig::default());
    solver.set_waves(Box::new(Calm));
    solver.step(1.0).unwrap();
    assert!(solver.store().lock(3).sub_models.wave.is_none());
    assert_eq!(solver.max_speed(), 0.0);
}

#[test]
fn test_strickler_friction_on_bed_layer() {
    let config = SolverConfig::default().with_friction(FrictionLaw::Strickler, 40.0);
    let mut solver = basin(config);
    let mut roughness = vec![40.0; solver.mesh().n_nodes()];
    roughness[4] = 5.0;
    solver.set_roughness(&roughness).unwrap();
    solver.step(1.0).unwrap();

    // Still water: depth 2 m, bed layer 1.
    let expected = 9.81 / (40.0 * 40.0 * 2f64.cbrt());
    let node = NodeIndex::new(0);
    let store = solver.store();
    assert!((store.get(node, LayerIndex::new(1), Quantity::Friction) - expected).abs() < 1e-12);
    assert_eq!(store.get(node, LayerIndex::new(0), Quantity::Friction), 0.0);

    // A very rough bed hits the upper clamp.
    let rough = store.get(NodeIndex::new(4), LayerIndex::new(1), Quantity::Friction);
    assert_eq!(rough, 0.1);
}
