//! Snapshots of the model state and an in-memory recorder.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::coupling::SnapshotSink;
use crate::state::{LayeredStore, Quantity};

/// Per-layer velocity triple (u, v, w).
pub type LayerVelocity = [f64; 3];

/// Copy of the model state at one instant.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Snapshot {
    /// Simulation time (s)
    pub time: f64,
    /// Completed steps
    pub step: u64,
    /// Water level per node (m)
    pub water_level: Vec<f64>,
    /// Water depth per node (m)
    pub depth: Vec<f64>,
    /// Bed depth per node (m)
    pub bottom: Vec<f64>,
    /// (u, v, w) per node and layer
    pub velocity: Vec<Vec<LayerVelocity>>,
    /// Depth-integrated discharge per node (m²/s)
    pub discharge: Vec<(f64, f64)>,
    /// Bed shear (τx, τy, |τ|) per node
    pub bed_shear: Vec<[f64; 3]>,
}

impl Snapshot {
    /// Capture every node of the store.
    pub fn capture(store: &LayeredStore, time: f64, step: u64) -> Self {
        let n = store.n_nodes();
        let mut snap = Snapshot {
            time,
            step,
            water_level: Vec::with_capacity(n),
            depth: Vec::with_capacity(n),
            bottom: Vec::with_capacity(n),
            velocity: Vec::with_capacity(n),
            discharge: Vec::with_capacity(n),
            bed_shear: Vec::with_capacity(n),
        };
        for node in 0..n {
            let state = store.lock(node);
            snap.water_level.push(state.eta);
            snap.depth.push(state.total_depth);
            snap.bottom.push(state.bottom);
            let u = state.column(Quantity::U);
            let v = state.column(Quantity::V);
            let w = state.column(Quantity::W);
            snap.velocity
                .push((0..state.n_layers()).map(|k| [u[k], v[k], w[k]]).collect());
            snap.discharge.push(state.discharge);
            snap.bed_shear.push(state.bed_shear);
        }
        snap
    }

    /// Number of nodes.
    pub fn n_nodes(&self) -> usize {
        self.water_level.len()
    }

    /// First non-finite value in the snapshot, as `(node, value)`.
    pub fn first_non_finite(&self) -> Option<(usize, f64)> {
        (0..self.n_nodes()).find_map(|n| {
            std::iter::once(self.water_level[n])
                .chain(self.velocity[n].iter().flatten().copied())
                .find(|x| !x.is_finite())
                .map(|x| (n, x))
        })
    }
}

/// Snapshots collected by a [`SnapshotRecorder`].
#[derive(Clone, Debug, Default)]
pub struct Recording {
    /// Snapshots after successful steps
    pub steps: Vec<Snapshot>,
    /// Last good and failing snapshots of a diverged step
    pub fatal: Option<(Snapshot, Snapshot)>,
}

/// Sink that keeps snapshots in memory.
///
/// Cloning yields another handle to the same recording, so a caller can keep
/// one handle after giving the other to the solver.
#[derive(Clone, Debug)]
pub struct SnapshotRecorder {
    inner: Arc<Mutex<Recording>>,
    keep_steps: bool,
}

impl SnapshotRecorder {
    /// Recorder keeping every step.
    pub fn new() -> Self {
        Self {
            inner: Arc::default(),
            keep_steps: true,
        }
    }

    /// Recorder keeping only the fatal pair.
    pub fn fatal_only() -> Self {
        Self {
            inner: Arc::default(),
            keep_steps: false,
        }
    }

    /// Copy of everything recorded so far.
    pub fn recording(&self) -> Recording {
        self.inner.lock().clone()
    }
}

impl Default for SnapshotRecorder {
    fn default() -> Self {
        Self::new()
    }
}

impl SnapshotSink for SnapshotRecorder {
    fn write_step(&mut self, snapshot: &Snapshot) -> std::io::Result<()> {
        if self.keep_steps {
            self.inner.lock().steps.push(snapshot.clone());
        }
        Ok(())
    }

    fn write_fatal(&mut self, last_good: &Snapshot, failing: &Snapshot) -> std::io::Result<()> {
        self.inner.lock().fatal = Some((last_good.clone(), failing.clone()));
        Ok(())
    }
}
