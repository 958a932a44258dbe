//! Interfaces to the models coupled with the current solver.
//!
//! The solver pulls bed depths, wind and wave data from collaborators at the
//! start of every step and pushes snapshots out at the end. Each interface is
//! a small `Send + Sync` trait, so a collaborator can be a full model, a file
//! reader or a closure.
//!
//! ```
//! use tidal_fe::coupling::{BathymetrySource, WindData, MeteorologySource, ConstantWind};
//!
//! // Bed sinking by 1 mm per hour everywhere.
//! let erosion = |_node: usize, t: f64| Some(5.0 + 1.0e-3 * t / 3600.0);
//! let bed = erosion.bottom(0, 3600.0).unwrap();
//! assert!((bed - 5.001).abs() < 1e-12);
//!
//! let wind = ConstantWind::new(WindData::from_direction(10.0, 270.0));
//! assert!(wind.wind(3, 0.0).is_some());
//! ```

use crate::forcing::DischargeController;
use crate::io::Snapshot;

/// 10 m wind at a node.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WindData {
    /// Wind speed (m/s)
    pub speed: f64,
    /// Direction the wind blows from, degrees clockwise from north
    pub direction: f64,
}

impl WindData {
    /// Wind given as speed and meteorological direction.
    pub fn from_direction(speed: f64, direction: f64) -> Self {
        Self { speed, direction }
    }

    /// Velocity components (u, v) the wind blows toward.
    ///
    /// A westerly (from 270°) blows toward +x.
    pub fn components(&self) -> (f64, f64) {
        let rad = self.direction.to_radians();
        (-self.speed * rad.sin(), -self.speed * rad.cos())
    }
}

/// Wave data delivered by a spectral wave model.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WaveData {
    /// Radiation stress S_xx divided by water density (m³/s²)
    pub sxx: f64,
    /// Radiation stress S_xy divided by water density (m³/s²)
    pub sxy: f64,
    /// Radiation stress S_yy divided by water density (m³/s²)
    pub syy: f64,
    /// Wave amplitude (m), used to taper the stress in very shallow water
    pub amplitude: f64,
}

/// Latest coupled sub-model data held by a node.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SubModelData {
    /// Wind, if a meteorology source is attached and covers the node
    pub wind: Option<WindData>,
    /// Waves, if a wave source is attached and covers the node
    pub wave: Option<WaveData>,
}

/// Supplies bed depth updates (e.g. from a morphodynamic model).
pub trait BathymetrySource: Send + Sync {
    /// New bed depth below datum for `node` at time `t`, `None` to keep it.
    fn bottom(&self, node: usize, t: f64) -> Option<f64>;
}

impl<F> BathymetrySource for F
where
    F: Fn(usize, f64) -> Option<f64> + Send + Sync,
{
    fn bottom(&self, node: usize, t: f64) -> Option<f64> {
        self(node, t)
    }
}

/// Supplies wind at nodes.
pub trait MeteorologySource: Send + Sync {
    /// Wind at `node` and time `t`.
    fn wind(&self, node: usize, t: f64) -> Option<WindData>;
}

/// Spatially uniform, steady wind.
#[derive(Clone, Copy, Debug)]
pub struct ConstantWind {
    wind: WindData,
}

impl ConstantWind {
    /// Same wind at every node.
    pub fn new(wind: WindData) -> Self {
        Self { wind }
    }
}

impl MeteorologySource for ConstantWind {
    fn wind(&self, _node: usize, _t: f64) -> Option<WindData> {
        Some(self.wind)
    }
}

/// Supplies wave radiation stresses at nodes.
pub trait WaveSource: Send + Sync {
    /// Wave data at `node` and time `t`.
    fn wave(&self, node: usize, t: f64) -> Option<WaveData>;
}

/// Supplies per-node bed roughness.
pub trait RoughnessSource {
    /// One roughness value per node, in the units of the configured law.
    fn roughness(&self) -> std::io::Result<Vec<f64>>;
}

impl RoughnessSource for Vec<f64> {
    fn roughness(&self) -> std::io::Result<Vec<f64>> {
        Ok(self.clone())
    }
}

/// Receives model state for output.
///
/// Write failures are logged by the solver and do not stop the run.
pub trait SnapshotSink: Send {
    /// State after a successful step.
    fn write_step(&mut self, snapshot: &Snapshot) -> std::io::Result<()>;

    /// State before and after a step that diverged.
    fn write_fatal(&mut self, last_good: &Snapshot, failing: &Snapshot) -> std::io::Result<()>;
}

/// The collaborators attached to a solver. Every slot is optional.
#[derive(Default)]
pub struct Collaborators {
    /// Bed depth updates
    pub bathymetry: Option<Box<dyn BathymetrySource>>,
    /// Wind
    pub meteorology: Option<Box<dyn MeteorologySource>>,
    /// Wave radiation stress
    pub waves: Option<Box<dyn WaveSource>>,
    /// Feedback-controlled boundary discharge
    pub discharge: Option<Box<dyn DischargeController>>,
    /// Output
    pub sink: Option<Box<dyn SnapshotSink>>,
}

impl std::fmt::Debug for Collaborators {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Collaborators")
            .field("bathymetry", &self.bathymetry.is_some())
            .field("meteorology", &self.meteorology.is_some())
            .field("waves", &self.waves.is_some())
            .field("discharge", &self.discharge.is_some())
            .field("sink", &self.sink.is_some())
            .finish()
    }
}
