//! Integration tests for wetting and drying.
//!
//! These tests verify:
//! - Seepage eligibility of a dry node next to a wet one
//! - Fully dry elements only feed the vertical residual
//! - Level setter idempotence and wetting factor bounds
//! - Depth and velocity invariants on a flooding beach
//! - Volume of a seiche running up a closed beach

use tidal_fe::{
    BoundaryForcing, CurrentSolver, DepthLevels, LayeredState, MeshTopology, NodeIndex, Quantity,
    SolverConfig, TimeFunction, TriMesh,
};

/// Unit square split into two triangles; node 0 sits on a shoal.
fn shoal(shoal_bottom: f64) -> CurrentSolver<TriMesh> {
    let mesh = TriMesh::uniform_rectangle(0.0, 10.0, 0.0, 10.0, 1, 1, move |x, y| {
        if x == 0.0 && y == 0.0 { shoal_bottom } else { 2.0 }
    });
    let levels = DepthLevels::uniform(3, 1.0).unwrap();
    CurrentSolver::initialize(mesh, levels, SolverConfig::default(), 0.0).unwrap()
}

#[test]
fn test_seepage_enabled_once_neighbour_is_high_enough() {
    let mut solver = shoal(0.05);
    solver.set_water_level(NodeIndex::new(0), -0.05).unwrap();
    {
        let s = solver.store().lock(0);
        assert_eq!(s.total_depth, 0.0);
        assert_eq!(s.eta, -0.05);
    }

    // Neighbours at datum lie below the shoal level plus 0.9·WATT.
    solver.apply_boundary_conditions().unwrap();
    assert!(!solver.store().lock(0).seepage);

    for n in 1..4 {
        solver.set_water_level(NodeIndex::new(n), 0.05).unwrap();
    }
    solver.apply_boundary_conditions().unwrap();
    assert!(solver.store().lock(0).seepage);
}

#[test]
fn test_fully_dry_elements_only_seep() {
    let mesh = TriMesh::uniform_rectangle(0.0, 20.0, 0.0, 20.0, 2, 2, |_, _| -1.0);
    let levels = DepthLevels::uniform(2, 1.0).unwrap();
    let config = SolverConfig::default().with_seepage_rate(2.0e-5);
    let mut solver = CurrentSolver::initialize(mesh, levels, config, 0.0).unwrap();

    solver.apply_boundary_conditions().unwrap();
    let dt = solver.assemble().unwrap();
    assert_eq!(dt, f64::INFINITY);

    for n in 0..solver.mesh().n_nodes() {
        let s = solver.store().lock(n);
        assert!(s.column(Quantity::ResidualU).iter().all(|&r| r == 0.0));
        assert!(s.column(Quantity::ResidualV).iter().all(|&r| r == 0.0));
        let expected = 2.0e-5 * solver.lumped_mass()[n];
        let w = s.get(s.surface_layer, Quantity::ResidualW);
        assert!((w - expected).abs() < 1e-12 * expected.max(1.0), "node {n}");
        assert_eq!(s.puddle, 0.0);
    }

    // After the update the dry surface layer carries the seepage velocity.
    let report = solver.step(1.0).unwrap();
    assert_eq!(report.dry_nodes, 9);
    for n in 0..solver.mesh().n_nodes() {
        let s = solver.store().lock(n);
        assert_eq!(s.total_depth, 0.0);
        assert!((s.get(s.surface_layer, Quantity::W) - 2.0e-5).abs() < 1e-15);
    }
}

#[test]
fn test_level_setter_idempotent() {
    let levels = DepthLevels::new(vec![0.0, 0.5, 1.5, 3.0]).unwrap();
    let mut once = LayeredState::new(levels.n_layers(), 2.2, 0.01);
    once.set_water_level(0.3, &levels, 0.1);
    let mut twice = once.clone();
    twice.set_water_level(0.3, &levels, 0.1);

    assert_eq!(once.column(Quantity::Thickness), twice.column(Quantity::Thickness));
    let total: f64 = once.column(Quantity::Thickness).iter().sum();
    assert!((total - 2.5).abs() < 1e-12);
    assert_eq!(once.column(Quantity::Thickness)[3], 0.0);
}

#[test]
fn test_wet_factor_bounds() {
    let levels = DepthLevels::uniform(4, 1.0).unwrap();
    let watt = 0.1;
    for eta in [-3.0, -1.0, -0.99, -0.95, -0.9, 0.0, 0.5] {
        let mut s = LayeredState::new(4, 1.0, 0.01);
        s.set_water_level(eta, &levels, watt);
        assert!(s.total_depth >= 0.0);
        assert!((0.0..=1.0).contains(&s.wet_factor), "eta {eta}");
        assert_eq!(s.wet_factor + s.dry_factor(), 1.0);
        if s.total_depth == 0.0 {
            assert_eq!(s.eta, -1.0);
            assert!(s.column(Quantity::U).iter().all(|&u| u == 0.0));
        }
    }
}

#[test]
fn test_flooding_beach_keeps_depth_invariants() {
    // Bed rises from 2 m below datum at x = 0 to 0.5 m above it at x = 400.
    let mesh = TriMesh::uniform_rectangle(0.0, 400.0, 0.0, 100.0, 8, 2, |x, _| 2.0 - x / 160.0);
    let open = mesh.nodes_at_x(0.0, 1e-6);
    let mesh = mesh.with_open_boundary(&open);
    let levels = DepthLevels::uniform(4, 0.5).unwrap();
    let mut solver = CurrentSolver::initialize(mesh, levels, SolverConfig::default(), 0.0).unwrap();
    let rising = TimeFunction::from(tidal_fe::TimeTable::new(vec![0.0, 600.0], vec![0.0, 0.3]).unwrap());
    solver.assign_forcing(&open, BoundaryForcing::level(rising)).unwrap();

    let first = solver.step(0.5).unwrap();
    assert!(first.dry_nodes > 0);
    let reports = solver.advance(300.0).unwrap();
    assert!(reports.iter().all(|r| r.volume.is_finite()));

    let watt = solver.config().watt;
    for n in 0..solver.mesh().n_nodes() {
        let s = solver.store().lock(n);
        assert!(s.total_depth >= 0.0);
        assert!((0.0..=1.0).contains(&s.wet_factor));
        if s.total_depth == 0.0 {
            assert!(s.column(Quantity::U).iter().all(|&u| u == 0.0), "node {n}");
            assert!(s.column(Quantity::V).iter().all(|&v| v == 0.0), "node {n}");
        }
        if s.total_depth >= watt {
            assert!(s.eta.is_finite());
        }
    }
    // Forced nodes follow the table.
    solver.apply_boundary_conditions().unwrap();
    let expected = 0.3 * solver.time() / 600.0;
    for &n in &open {
        assert!((solver.store().lock(n).eta - expected).abs() < 1e-12);
    }
}

#[test]
fn test_closed_beach_conserves_volume() {
    // Bed from 2 m below datum to a bank 0.5 m above it.
    const LENGTH: f64 = 400.0;
    let mesh = TriMesh::uniform_rectangle(0.0, LENGTH, 0.0, 100.0, 16, 4, |x, _| 2.0 - x / 160.0);
    let levels = DepthLevels::uniform(4, 0.5).unwrap();
    let config = SolverConfig::default().with_seepage_rate(0.0);
    let mut solver = CurrentSolver::initialize(mesh, levels, config, 0.0).unwrap();
    for n in 0..solver.mesh().n_nodes() {
        let (x, _) = solver.mesh().position(n);
        let eta = 0.1 * (std::f64::consts::PI * x / LENGTH).cos();
        solver.set_water_level(NodeIndex::new(n), eta).unwrap();
    }
    let initial = solver.total_volume();

    let mut dry_seen = false;
    for _ in 0..1600 {
        let report = solver.step(0.25).unwrap();
        dry_seen |= report.dry_nodes > 0;
    }
    assert!(dry_seen);
    let drift = (solver.total_volume() - initial).abs() / initial;
    assert!(drift < 1.0e-3, "volume drift {drift:e} after {} s", solver.time());
}
