//! The current solver and its step state machine.
//!
//! ```text
//! Idle ──step──▶ SteppingBCs ──▶ SteppingAssembly ──▶ SteppingUpdate ──▶ Idle
//!                                                          │
//!                                                          └─ divergence ─▶ Fatal
//! ```
//!
//! A step never stops halfway: boundary conditions are applied to every
//! node before assembly starts, and assembly completes before any node is
//! updated. `Fatal` is terminal.

use crate::assembly;
use crate::boundary::applicator::BoundaryPass;
use crate::boundary::resolve_nodes;
use crate::config::{SimulationContext, SolverConfig};
use crate::coupling::{
    BathymetrySource, Collaborators, MeteorologySource, RoughnessSource, SnapshotSink, WaveSource,
};
use crate::error::{Result, SolverError};
use crate::forcing::{BoundaryForcing, DischargeController, SpatialProfile, TimeFunction};
use crate::io::Snapshot;
use crate::mesh::{ElementGeometry, MeshTopology, wall_contacts};
use crate::source::BedFriction;
use crate::state::{LayeredStore, Quantity};
use crate::types::NodeIndex;
use crate::vertical::DepthLevels;

use super::update::update_nodes;

/// Where the integrator is within a step.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IntegratorPhase {
    /// Between steps
    Idle,
    /// Applying boundary conditions
    SteppingBCs,
    /// Assembling element residuals
    SteppingAssembly,
    /// Updating node states
    SteppingUpdate,
    /// Stopped after divergence
    Fatal,
}

/// Summary of a completed step.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StepReport {
    /// Simulation time at the end of the step (s)
    pub time: f64,
    /// Step taken (s)
    pub dt: f64,
    /// Admissible step from assembly (s), infinite when all is dry
    pub admissible_dt: f64,
    /// Nodes with depth at or above the wetting threshold
    pub wet_nodes: usize,
    /// Remaining nodes
    pub dry_nodes: usize,
    /// Water volume Σ M·H (m³)
    pub volume: f64,
}

/// Three-dimensional current model on a triangle mesh with z-levels.
///
/// # Example
///
/// ```
/// use tidal_fe::{CurrentSolver, DepthLevels, SolverConfig, TriMesh};
///
/// let mesh = TriMesh::uniform_rectangle(0.0, 100.0, 0.0, 50.0, 4, 2, |_, _| 2.0);
/// let levels = DepthLevels::uniform(2, 1.0).unwrap();
/// let mut solver = CurrentSolver::initialize(mesh, levels, SolverConfig::default(), 0.0).unwrap();
/// let report = solver.step(1.0).unwrap();
/// assert_eq!(report.dry_nodes, 0);
/// ```
pub struct CurrentSolver<M: MeshTopology> {
    mesh: M,
    config: SolverConfig,
    ctx: SimulationContext,
    store: LayeredStore,
    geometry: Vec<ElementGeometry>,
    mass: Vec<f64>,
    neighbours: Vec<Vec<usize>>,
    collaborators: Collaborators,
    phase: IntegratorPhase,
    admissible_dt: f64,
}

impl<M: MeshTopology> std::fmt::Debug for CurrentSolver<M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CurrentSolver")
            .field("n_nodes", &self.mesh.n_nodes())
            .field("n_elements", &self.mesh.n_elements())
            .field("n_layers", &self.store.n_layers())
            .field("time", &self.ctx.time)
            .field("phase", &self.phase)
            .field("collaborators", &self.collaborators)
            .finish()
    }
}

impl<M: MeshTopology> CurrentSolver<M> {
    /// Build the node states for `mesh` at a uniform initial water level.
    ///
    /// Nodes whose bed lies above `initial_level` start dry.
    ///
    /// # Errors
    /// [`SolverError::InvalidConfig`] when `config` fails validation,
    /// [`SolverError::InvalidMesh`] for an empty mesh, a node or element
    /// number out of range, a triangle without area or a node without mass.
    pub fn initialize(
        mesh: M,
        levels: DepthLevels,
        config: SolverConfig,
        initial_level: f64,
    ) -> Result<Self> {
        config.validate()?;
        let n_nodes = mesh.n_nodes();
        let n_elements = mesh.n_elements();
        if n_nodes == 0 || n_elements == 0 {
            return Err(SolverError::InvalidMesh(format!(
                "mesh has {n_nodes} nodes and {n_elements} elements"
            )));
        }
        check_connectivity(&mesh)?;

        let geometry: Vec<ElementGeometry> =
            (0..n_elements).map(|e| mesh.element_geometry(e)).collect();
        if let Some(e) = geometry.iter().position(|g| !(g.area > 0.0)) {
            return Err(SolverError::InvalidMesh(format!(
                "element {e} has area {}",
                geometry[e].area
            )));
        }

        let mass: Vec<f64> = (0..n_nodes).map(|n| mesh.lumped_mass(n)).collect();
        if let Some(n) = mass.iter().position(|m| !(*m > 0.0 && m.is_finite())) {
            return Err(SolverError::InvalidMesh(format!(
                "node {n} has lumped mass {}",
                mass[n]
            )));
        }
        let neighbours: Vec<Vec<usize>> = (0..n_nodes).map(|n| mesh.node_neighbors(n)).collect();

        let mut store = LayeredStore::new(
            levels,
            (0..n_nodes).map(|n| mesh.bottom(n)),
            config.default_roughness,
        );
        let walls = wall_contacts(&mesh);
        let store_levels = store.levels().clone();
        for (n, wall) in walls.into_iter().enumerate() {
            let s = store.get_mut(n);
            s.wall = wall;
            s.set_water_level(initial_level, &store_levels, config.watt);
        }

        let ctx = SimulationContext::new(&config);
        log::info!(
            "current solver: {n_nodes} nodes, {n_elements} elements, {} layers, f = {:.3e} 1/s",
            store.n_layers(),
            ctx.coriolis
        );

        Ok(Self {
            mesh,
            config,
            ctx,
            store,
            geometry,
            mass,
            neighbours,
            collaborators: Collaborators::default(),
            phase: IntegratorPhase::Idle,
            admissible_dt: f64::INFINITY,
        })
    }

    // =========================================================================
    // Initial and boundary data
    // =========================================================================

    fn node_index(&self, node: NodeIndex) -> Result<usize> {
        let n = node.get();
        if n < self.store.n_nodes() {
            Ok(n)
        } else {
            Err(SolverError::UnknownBoundaryNode { node: n })
        }
    }

    /// Set the water level of one node.
    pub fn set_water_level(&mut self, node: NodeIndex, eta: f64) -> Result<()> {
        let n = self.node_index(node)?;
        self.store.set_water_level(NodeIndex::new(n), eta, self.config.watt);
        Ok(())
    }

    /// Set the same velocity in every wet layer of one node.
    pub fn set_velocity(&mut self, node: NodeIndex, u: f64, v: f64) -> Result<()> {
        let n = self.node_index(node)?;
        let mut s = self.store.lock(n);
        for k in s.layer_range() {
            if s.get(k, Quantity::Thickness) > 0.0 {
                s.set(k, Quantity::U, u);
                s.set(k, Quantity::V, v);
            }
        }
        s.update_discharge();
        Ok(())
    }

    /// Attach a forcing to a list of nodes; returns how many were assigned.
    ///
    /// # Errors
    /// [`SolverError::UnknownBoundaryNode`] in strict mode when a node is
    /// not part of the mesh.
    pub fn assign_forcing(&mut self, nodes: &[usize], forcing: BoundaryForcing) -> Result<usize> {
        let nodes = resolve_nodes(nodes, self.store.n_nodes(), self.config.strict_boundary_nodes)?;
        for &n in &nodes {
            self.store.get_mut(n).forcing = Some(forcing.clone());
        }
        Ok(nodes.len())
    }

    /// Prescribe a level at a list of nodes, optionally offset by a
    /// spatial profile sampled at each node position.
    pub fn assign_level_forcing(
        &mut self,
        nodes: &[usize],
        function: TimeFunction,
        profile: Option<&SpatialProfile>,
    ) -> Result<usize> {
        let nodes = resolve_nodes(nodes, self.store.n_nodes(), self.config.strict_boundary_nodes)?;
        for &n in &nodes {
            let offset = profile.map_or(0.0, |p| {
                let (x, y) = self.mesh.position(n);
                p.evaluate(x, y)
            });
            self.store.get_mut(n).forcing = Some(BoundaryForcing::Level {
                function: function.clone(),
                offset,
            });
        }
        Ok(nodes.len())
    }

    /// Remove any forcing from a list of nodes.
    pub fn clear_forcing(&mut self, nodes: &[usize]) -> Result<usize> {
        let nodes = resolve_nodes(nodes, self.store.n_nodes(), self.config.strict_boundary_nodes)?;
        for &n in &nodes {
            self.store.get_mut(n).forcing = None;
        }
        Ok(nodes.len())
    }

    /// Flag nodes for level and/or velocity extrapolation from neighbours.
    pub fn set_extrapolation(&mut self, nodes: &[usize], level: bool, velocity: bool) -> Result<usize> {
        let nodes = resolve_nodes(nodes, self.store.n_nodes(), self.config.strict_boundary_nodes)?;
        for &n in &nodes {
            let s = self.store.get_mut(n);
            s.extrapolate_level = level;
            s.extrapolate_velocity = velocity;
        }
        Ok(nodes.len())
    }

    /// Load per-node roughness from a collaborator.
    ///
    /// # Errors
    /// [`SolverError::RoughnessSource`] when the source fails,
    /// [`SolverError::NodeCountMismatch`] when it delivers the wrong count.
    pub fn load_roughness(&mut self, source: &dyn RoughnessSource) -> Result<()> {
        let values = source.roughness()?;
        self.set_roughness(&values)
    }

    /// Set per-node roughness. Invalid entries fall back to the default
    /// roughness with a warning.
    pub fn set_roughness(&mut self, values: &[f64]) -> Result<()> {
        let n_nodes = self.store.n_nodes();
        if values.len() != n_nodes {
            return Err(SolverError::NodeCountMismatch {
                dataset: "roughness",
                expected: n_nodes,
                found: values.len(),
            });
        }
        let friction = BedFriction::new(
            self.config.friction,
            self.config.g,
            self.config.watt,
            self.config.default_roughness,
        );
        let mut replaced = 0usize;
        for (n, &value) in values.iter().enumerate() {
            let resolved = friction.resolve_roughness(value);
            if resolved != value {
                replaced += 1;
            }
            self.store.get_mut(n).roughness = resolved;
        }
        if replaced > 0 {
            log::warn!(
                "{replaced} of {n_nodes} roughness values invalid, using default {}",
                self.config.default_roughness
            );
        }
        Ok(())
    }

    // =========================================================================
    // Collaborators
    // =========================================================================

    /// Attach a bathymetry source.
    pub fn set_bathymetry(&mut self, source: Box<dyn BathymetrySource>) {
        self.collaborators.bathymetry = Some(source);
    }

    /// Attach a meteorology source.
    pub fn set_meteorology(&mut self, source: Box<dyn MeteorologySource>) {
        self.collaborators.meteorology = Some(source);
    }

    /// Attach a wave source.
    pub fn set_waves(&mut self, source: Box<dyn WaveSource>) {
        self.collaborators.waves = Some(source);
    }

    /// Attach the discharge controller queried by controlled-discharge nodes.
    pub fn set_discharge_controller(&mut self, controller: Box<dyn DischargeController>) {
        self.collaborators.discharge = Some(controller);
    }

    /// Attach an output sink.
    pub fn set_sink(&mut self, sink: Box<dyn SnapshotSink>) {
        self.collaborators.sink = Some(sink);
    }

    /// Detach and return the output sink.
    pub fn take_sink(&mut self) -> Option<Box<dyn SnapshotSink>> {
        self.collaborators.sink.take()
    }

    // =========================================================================
    // Stepping
    // =========================================================================

    /// Set the simulation clock, e.g. for a hot start.
    pub fn set_time(&mut self, time: f64) {
        self.ctx.time = time;
    }

    fn ensure_running(&self) -> Result<()> {
        if self.phase == IntegratorPhase::Fatal {
            Err(SolverError::Halted)
        } else {
            Ok(())
        }
    }

    /// Run the boundary pass for the current time.
    ///
    /// Levels forced at this time are in place afterwards, so this can be
    /// used to inspect boundary values without stepping.
    pub fn apply_boundary_conditions(&mut self) -> Result<()> {
        self.ensure_running()?;
        self.phase = IntegratorPhase::SteppingBCs;
        {
            let pass = BoundaryPass::new(
                &self.store,
                &self.neighbours,
                &self.config,
                &self.ctx,
                &self.collaborators,
            );
            pass.reset_and_force();
            pass.extrapolate();
        }
        if let Some(controller) = self.collaborators.discharge.as_mut() {
            controller.update(self.ctx.time, &self.store);
        }
        {
            let pass = BoundaryPass::new(
                &self.store,
                &self.neighbours,
                &self.config,
                &self.ctx,
                &self.collaborators,
            );
            pass.resolve();
        }
        self.phase = IntegratorPhase::Idle;
        Ok(())
    }

    /// Assemble all element residuals; returns the admissible step.
    ///
    /// Expects [`apply_boundary_conditions`](Self::apply_boundary_conditions)
    /// to have cleared the residual channels.
    pub fn assemble(&mut self) -> Result<f64> {
        self.ensure_running()?;
        self.phase = IntegratorPhase::SteppingAssembly;
        self.admissible_dt = assembly::assemble(&self.store, &self.geometry, &self.config, &self.ctx);
        self.phase = IntegratorPhase::Idle;
        Ok(self.admissible_dt)
    }

    /// Advance by exactly `dt` seconds.
    ///
    /// # Errors
    /// [`SolverError::Diverged`] when the step blows up,
    /// [`SolverError::Halted`] on every call after that.
    pub fn step(&mut self, dt: f64) -> Result<StepReport> {
        self.ensure_running()?;
        if !(dt > 0.0 && dt.is_finite()) {
            return Err(SolverError::InvalidTimeStep(dt));
        }
        self.apply_boundary_conditions()?;
        let admissible = self.assemble()?;
        if dt > admissible {
            log::warn!(
                "t = {:.3} s: dt {dt:.4} s exceeds admissible step {admissible:.4} s",
                self.ctx.time
            );
        }
        self.update(dt, admissible)
    }

    /// Advance by `duration` seconds with adaptive steps.
    ///
    /// Each step takes [`SolverConfig::courant`] times the admissible step
    /// of its own assembly, capped by [`SolverConfig::dt_max`] and by the
    /// time left.
    ///
    /// # Errors
    /// [`SolverError::InvalidTimeStep`] when the chosen step is not a
    /// positive finite number, plus the errors of [`step`](Self::step).
    pub fn advance(&mut self, duration: f64) -> Result<Vec<StepReport>> {
        self.ensure_running()?;
        if !(duration >= 0.0 && duration.is_finite()) {
            return Err(SolverError::InvalidTimeStep(duration));
        }
        let end = self.ctx.time + duration;
        let tolerance = 1.0e-9 * end.abs().max(1.0);
        let mut reports = Vec::new();
        while end - self.ctx.time > tolerance {
            self.apply_boundary_conditions()?;
            let admissible = self.assemble()?;
            let remaining = end - self.ctx.time;
            let dt = (self.config.courant * admissible)
                .min(self.config.dt_max)
                .min(remaining);
            if !(dt > 0.0 && dt.is_finite()) {
                return Err(SolverError::InvalidTimeStep(dt));
            }
            let mut report = self.update(dt, admissible)?;
            if dt == remaining {
                self.ctx.time = end;
                report.time = end;
            }
            reports.push(report);
        }
        Ok(reports)
    }

    fn update(&mut self, dt: f64, admissible: f64) -> Result<StepReport> {
        self.phase = IntegratorPhase::SteppingUpdate;
        let last_good = self
            .collaborators
            .sink
            .is_some()
            .then(|| Snapshot::capture(&self.store, self.ctx.time, self.ctx.step));

        if let Err(divergence) = update_nodes(&self.store, &self.mass, dt, &self.config, &self.ctx) {
            self.phase = IntegratorPhase::Fatal;
            let time = self.ctx.time + dt;
            log::error!(
                "divergence at t = {time:.3} s, node {}: value {}",
                divergence.node,
                divergence.value
            );
            if let (Some(sink), Some(last_good)) = (self.collaborators.sink.as_mut(), last_good) {
                let failing = Snapshot::capture(&self.store, time, self.ctx.step + 1);
                if let Err(e) = sink.write_fatal(&last_good, &failing) {
                    log::warn!("could not write fatal snapshots: {e}");
                }
            }
            return Err(SolverError::Diverged {
                time,
                node: NodeIndex::new(divergence.node),
                value: divergence.value,
            });
        }

        self.ctx.advance(dt);
        self.phase = IntegratorPhase::Idle;

        let (wet_nodes, dry_nodes) = self.wet_dry_counts();
        let report = StepReport {
            time: self.ctx.time,
            dt,
            admissible_dt: admissible,
            wet_nodes,
            dry_nodes,
            volume: self.total_volume(),
        };
        log::debug!(
            "step {}: t = {:.3} s, dt = {:.4} s, admissible {:.4} s, {} wet",
            self.ctx.step,
            report.time,
            dt,
            admissible,
            wet_nodes
        );

        if let Some(sink) = self.collaborators.sink.as_mut() {
            let snapshot = Snapshot::capture(&self.store, self.ctx.time, self.ctx.step);
            if let Err(e) = sink.write_step(&snapshot) {
                log::warn!("could not write snapshot at t = {:.3} s: {e}", self.ctx.time);
            }
        }
        Ok(report)
    }

    // =========================================================================
    // Accessors and diagnostics
    // =========================================================================

    /// Current phase.
    pub fn phase(&self) -> IntegratorPhase {
        self.phase
    }

    /// Current simulation time (s).
    pub fn time(&self) -> f64 {
        self.ctx.time
    }

    /// Per-step context.
    pub fn context(&self) -> &SimulationContext {
        &self.ctx
    }

    /// Configuration.
    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    /// The mesh.
    pub fn mesh(&self) -> &M {
        &self.mesh
    }

    /// Node states.
    pub fn store(&self) -> &LayeredStore {
        &self.store
    }

    /// Lumped mass of every node (m²).
    pub fn lumped_mass(&self) -> &[f64] {
        &self.mass
    }

    /// Admissible step from the latest assembly.
    pub fn admissible_dt(&self) -> f64 {
        self.admissible_dt
    }

    /// Copy of the current state.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot::capture(&self.store, self.ctx.time, self.ctx.step)
    }

    /// Water volume Σ M·H (m³).
    pub fn total_volume(&self) -> f64 {
        self.mass
            .iter()
            .enumerate()
            .map(|(n, m)| m * self.store.lock(n).total_depth)
            .sum()
    }

    /// Largest horizontal speed over all nodes and layers (m/s).
    pub fn max_speed(&self) -> f64 {
        (0..self.store.n_nodes())
            .map(|n| {
                let s = self.store.lock(n);
                let u = s.column(Quantity::U);
                let v = s.column(Quantity::V);
                u.iter()
                    .zip(v)
                    .map(|(a, b)| a.hypot(*b))
                    .fold(0.0, f64::max)
            })
            .fold(0.0, f64::max)
    }

    fn wet_dry_counts(&self) -> (usize, usize) {
        let wet = (0..self.store.n_nodes())
            .filter(|&n| self.store.lock(n).is_wet(self.ctx.watt))
            .count();
        (wet, self.store.n_nodes() - wet)
    }
}

/// Every node and element number handed out by `mesh` must be in range.
fn check_connectivity<M: MeshTopology>(mesh: &M) -> Result<()> {
    let n_nodes = mesh.n_nodes();
    let n_elements = mesh.n_elements();
    for e in 0..n_elements {
        if let Some(n) = mesh.element_nodes(e).into_iter().find(|&n| n >= n_nodes) {
            return Err(SolverError::InvalidMesh(format!(
                "element {e} references node {n} of {n_nodes}"
            )));
        }
    }
    for n in 0..n_nodes {
        if let Some(&e) = mesh.node_elements(n).iter().find(|&&e| e >= n_elements) {
            return Err(SolverError::InvalidMesh(format!(
                "node {n} references element {e} of {n_elements}"
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::SnapshotRecorder;
    use crate::mesh::TriMesh;

    fn basin(depth: f64) -> CurrentSolver<TriMesh> {
        let mesh = TriMesh::uniform_rectangle(0.0, 100.0, 0.0, 50.0, 4, 2, move |_, _| depth);
        let levels = DepthLevels::uniform(3, 1.0).unwrap();
        CurrentSolver::initialize(mesh, levels, SolverConfig::default(), 0.0).unwrap()
    }

    #[test]
    fn test_initialize_computes_mass() {
        let solver = basin(2.0);
        let total: f64 = solver.lumped_mass().iter().sum();
        assert!((total - 5000.0).abs() < 1e-9);
        assert!((solver.total_volume() - 10_000.0).abs() < 1e-6);
        assert_eq!(solver.phase(), IntegratorPhase::Idle);
    }

    #[test]
    fn test_step_advances_clock() {
        let mut solver = basin(2.0);
        let report = solver.step(2.0).unwrap();
        assert_eq!(report.time, 2.0);
        assert_eq!(solver.context().step, 1);
        assert!(report.admissible_dt > 0.0);
    }

    #[test]
    fn test_rejects_bad_time_step() {
        let mut solver = basin(2.0);
        assert!(matches!(solver.step(0.0), Err(SolverError::InvalidTimeStep(_))));
        assert!(matches!(solver.step(f64::NAN), Err(SolverError::InvalidTimeStep(_))));
    }

    #[test]
    fn test_advance_lands_on_end_time() {
        let mut solver = basin(2.0);
        let reports = solver.advance(10.0).unwrap();
        assert!(!reports.is_empty());
        assert_eq!(solver.time(), 10.0);
        let courant = SolverConfig::default().courant;
        assert!(
            reports
                .iter()
                .all(|r| r.dt <= (courant * r.admissible_dt).min(60.0) + 1e-12)
        );
    }

    #[test]
    fn test_initialize_rejects_invalid_config() {
        let mesh = || TriMesh::uniform_rectangle(0.0, 100.0, 0.0, 50.0, 4, 2, |_, _| 2.0);
        let levels = || DepthLevels::uniform(3, 1.0).unwrap();
        for config in [
            SolverConfig::default().with_dt_max(0.0),
            SolverConfig::default().with_watt(0.0),
            SolverConfig::default().with_watt(-0.5),
        ] {
            let result = CurrentSolver::initialize(mesh(), levels(), config, 0.0);
            assert!(matches!(result, Err(SolverError::InvalidConfig(_))));
        }
    }

    /// One triangle whose third node number is past the end.
    struct BrokenMesh;

    impl MeshTopology for BrokenMesh {
        fn n_nodes(&self) -> usize {
            3
        }

        fn n_elements(&self) -> usize {
            1
        }

        fn position(&self, node: usize) -> (f64, f64) {
            [(0.0, 0.0), (10.0, 0.0), (0.0, 10.0)][node]
        }

        fn bottom(&self, _node: usize) -> f64 {
            2.0
        }

        fn element_nodes(&self, _element: usize) -> [usize; 3] {
            [0, 1, 3]
        }

        fn node_elements(&self, _node: usize) -> &[usize] {
            &[0]
        }
    }

    #[test]
    fn test_initialize_rejects_out_of_range_node() {
        let levels = DepthLevels::uniform(3, 1.0).unwrap();
        let result = CurrentSolver::initialize(BrokenMesh, levels, SolverConfig::default(), 0.0);
        match result {
            Err(SolverError::InvalidMesh(msg)) => assert!(msg.contains("node 3")),
            other => panic!("expected InvalidMesh, got {other:?}"),
        }
    }

    #[test]
    fn test_initialize_uses_provider_mass() {
        let solver = basin(2.0);
        for n in 0..solver.mesh().n_nodes() {
            assert_eq!(solver.lumped_mass()[n], solver.mesh().lumped_mass(n));
        }
    }

    #[test]
    fn test_roughness_count_mismatch() {
        let mut solver = basin(2.0);
        let err = solver.set_roughness(&[0.01; 3]).unwrap_err();
        assert!(matches!(
            err,
            SolverError::NodeCountMismatch { dataset: "roughness", expected: 15, found: 3 }
        ));
    }

    #[test]
    fn test_invalid_roughness_replaced_by_default() {
        let mut solver = basin(2.0);
        let mut values = vec![0.05; 15];
        values[3] = f64::NAN;
        values[4] = -1.0;
        solver.set_roughness(&values).unwrap();
        assert_eq!(solver.store().lock(3).roughness, 0.01);
        assert_eq!(solver.store().lock(4).roughness, 0.01);
        assert_eq!(solver.store().lock(5).roughness, 0.05);
    }

    #[test]
    fn test_sink_receives_each_step() {
        let mut solver = basin(2.0);
        let recorder = SnapshotRecorder::new();
        solver.set_sink(Box::new(recorder.clone()));
        solver.step(1.0).unwrap();
        solver.step(1.0).unwrap();
        let recording = recorder.recording();
        assert_eq!(recording.steps.len(), 2);
        assert_eq!(recording.steps[1].step, 2);
        assert!(recording.fatal.is_none());
    }
}
