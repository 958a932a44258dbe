//! Integration tests for boundary forcing.
//!
//! These tests verify:
//! - Forced levels follow their time function exactly
//! - Velocity forcing and controlled discharges set every wet layer
//! - Flow rates turn into velocity only above the wetting threshold
//! - Velocity forcing that cannot be applied leaves the node free
//! - Lenient and strict handling of unknown boundary nodes
//! - Extrapolated nodes relax toward their neighbours

use tidal_fe::{
    BoundaryForcing, CurrentSolver, DepthLevels, LayerIndex, LevelController, MeshTopology,
    NodeIndex, Quantity, SolverConfig, SolverError, SpatialProfile, TimeFunction, TriMesh,
};

fn channel(config: SolverConfig) -> (CurrentSolver<TriMesh>, Vec<usize>) {
    let mesh = TriMesh::uniform_rectangle(0.0, 400.0, 0.0, 100.0, 4, 1, |_, _| 2.0);
    let open = mesh.nodes_at_x(0.0, 1e-6);
    let mesh = mesh.with_open_boundary(&open);
    let levels = DepthLevels::uniform(3, 1.0).unwrap();
    let solver = CurrentSolver::initialize(mesh, levels, config, 0.0).unwrap();
    (solver, open)
}

#[test]
fn test_forced_level_follows_sinusoid() {
    let (mut solver, open) = channel(SolverConfig::default());
    let tide = TimeFunction::sinusoid(0.5, 44_700.0);
    assert_eq!(solver.assign_forcing(&open, BoundaryForcing::level(tide.clone())).unwrap(), 2);

    for t in [0.0, 3_000.0, 11_175.0, 20_000.0] {
        // Disturb the neighbours; the forced level must not depend on them.
        for n in 0..solver.mesh().n_nodes() {
            if !open.contains(&n) {
                solver.set_water_level(NodeIndex::new(n), 0.01 * n as f64).unwrap();
            }
        }
        solver.set_time(t);
        solver.apply_boundary_conditions().unwrap();
        let expected = tide.evaluate(t).value;
        for &n in &open {
            let s = solver.store().lock(n);
            assert!((s.eta - expected).abs() < 1e-12, "t = {t}");
            assert!((s.total_depth - (2.0 + expected)).abs() < 1e-12);
        }
    }
}

#[test]
fn test_level_profile_offsets_each_node() {
    let (mut solver, open) = channel(SolverConfig::default());
    let profile = SpatialProfile::points(vec![(0.0, 0.0, 0.0), (0.0, 100.0, 0.1)]).unwrap();
    solver
        .assign_level_forcing(&open, TimeFunction::Constant(0.2), Some(&profile))
        .unwrap();
    solver.apply_boundary_conditions().unwrap();

    for &n in &open {
        let (x, y) = solver.mesh().position(n);
        let expected = 0.2 + profile.evaluate(x, y);
        assert!((solver.store().lock(n).eta - expected).abs() < 1e-12);
    }
}

#[test]
fn test_velocity_forcing_sets_wet_layers() {
    let (mut solver, open) = channel(SolverConfig::default());
    let forcing = BoundaryForcing::Velocity {
        u: TimeFunction::Constant(0.3),
        v: TimeFunction::Constant(-0.1),
    };
    solver.assign_forcing(&open, forcing).unwrap();
    solver.apply_boundary_conditions().unwrap();

    for &n in &open {
        let s = solver.store().lock(n);
        for k in s.layer_range() {
            assert_eq!(s.get(k, Quantity::U), 0.3);
            assert_eq!(s.get(k, Quantity::V), -0.1);
        }
    }

    // Prescribed velocity survives the step.
    solver.step(1.0).unwrap();
    let n = open[0];
    assert_eq!(solver.store().get(NodeIndex::new(n), LayerIndex::new(1), Quantity::U), 0.3);
}

#[test]
fn test_controlled_discharge_follows_gauge_error() {
    let (mut solver, open) = channel(SolverConfig::default());
    let gauge = solver.mesh().nodes_at_x(400.0, 1e-6)[0];
    let controller = LevelController::new(gauge, TimeFunction::Constant(0.2), 1.0, (1.0, 0.0), open.clone());
    solver.set_discharge_controller(Box::new(controller));
    solver.assign_forcing(&open, BoundaryForcing::ControlledDischarge).unwrap();
    solver.apply_boundary_conditions().unwrap();

    // q = 1.0 · (0.2 − 0) spread over 2 m of water.
    for &n in &open {
        let s = solver.store().lock(n);
        for k in s.layer_range() {
            assert!((s.get(k, Quantity::U) - 0.1).abs() < 1e-12);
            assert_eq!(s.get(k, Quantity::V), 0.0);
        }
    }
}

fn flow_rate(discharge: f64) -> BoundaryForcing {
    BoundaryForcing::FlowRate {
        discharge: TimeFunction::Constant(discharge),
        width: 100.0,
        direction: (1.0, 0.0),
    }
}

#[test]
fn test_flow_rate_spread_over_depth() {
    let (mut solver, open) = channel(SolverConfig::default());
    solver.assign_forcing(&open, flow_rate(2.0)).unwrap();
    solver.step(1.0).unwrap();

    // Q / (width·H) = 2 / (100·2)
    for &n in &open {
        let s = solver.store().lock(n);
        assert!(s.has_prescribed_velocity());
        for k in s.layer_range() {
            assert!((s.get(k, Quantity::U) - 0.01).abs() < 1e-12, "node {n}, layer {k}");
            assert_eq!(s.get(k, Quantity::V), 0.0);
        }
    }
}

#[test]
fn test_flow_rate_skipped_on_shallow_node() {
    let (mut solver, open) = channel(SolverConfig::default());
    let n = open[0];
    solver.set_water_level(NodeIndex::new(n), -1.93).unwrap();
    solver.set_velocity(NodeIndex::new(n), 0.2, 0.3).unwrap();
    solver.assign_forcing(&open, flow_rate(2.0)).unwrap();
    solver.apply_boundary_conditions().unwrap();

    {
        let s = solver.store().lock(n);
        assert!(s.total_depth < solver.config().watt);
        assert!(!s.has_prescribed_velocity());
        // Wall slip along y = 0 removes the normal component.
        assert!((s.get(0, Quantity::U) - 0.2).abs() < 1e-12);
        assert!(s.get(0, Quantity::V).abs() < 1e-12);
    }
    assert!(solver.store().lock(open[1]).has_prescribed_velocity());

    // The update integrates the free node.
    solver.step(1.0).unwrap();
    let u = solver.store().get(NodeIndex::new(n), LayerIndex::new(0), Quantity::U);
    assert!(u != 0.2, "velocity frozen at {u}");
}

#[test]
fn test_controlled_discharge_without_controller_leaves_node_free() {
    let (mut solver, open) = channel(SolverConfig::default());
    let n = open[0];
    solver.set_velocity(NodeIndex::new(n), 0.2, 0.3).unwrap();
    solver.assign_forcing(&[n], BoundaryForcing::ControlledDischarge).unwrap();
    solver.apply_boundary_conditions().unwrap();

    let s = solver.store().lock(n);
    assert!(!s.has_prescribed_velocity());
    for k in s.layer_range() {
        assert!((s.get(k, Quantity::U) - 0.2).abs() < 1e-12);
        assert!(s.get(k, Quantity::V).abs() < 1e-12);
    }
}

#[test]
fn test_unknown_boundary_nodes() {
    let (mut solver, _) = channel(SolverConfig::default());
    let assigned = solver
        .assign_forcing(&[0, 999], BoundaryForcing::level(TimeFunction::Constant(0.0)))
        .unwrap();
    assert_eq!(assigned, 1);

    let (mut strict, _) = channel(SolverConfig::default().with_strict_boundary_nodes(true));
    let err = strict
        .assign_forcing(&[0, 999], BoundaryForcing::level(TimeFunction::Constant(0.0)))
        .unwrap_err();
    assert!(matches!(err, SolverError::UnknownBoundaryNode { node: 999 }));
}

#[test]
fn test_extrapolated_level_moves_toward_neighbours() {
    let (mut solver, open) = channel(SolverConfig::default());
    for n in 0..solver.mesh().n_nodes() {
        solver.set_water_level(NodeIndex::new(n), 0.1).unwrap();
    }
    let n = open[0];
    solver.set_water_level(NodeIndex::new(n), 0.0).unwrap();
    solver.set_extrapolation(&[n], true, false).unwrap();
    solver.apply_boundary_conditions().unwrap();

    let eta = solver.store().lock(n).eta;
    assert!(eta > 0.0 && eta <= 0.1, "eta = {eta}");
}
