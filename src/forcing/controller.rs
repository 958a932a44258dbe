//! Feedback-controlled discharges.
//!
//! A [`DischargeController`] is updated once per step against the current
//! model state and then queried per node during boundary application. The
//! queried value is a depth-integrated discharge per unit width (m²/s); the
//! boundary pass spreads it over the wet layers as a uniform velocity.

use super::time_function::TimeFunction;
use crate::state::LayeredStore;

/// Vector-valued forcing driven by the model state.
pub trait DischargeController: Send + Sync {
    /// Refresh the controller from the state at time `time`.
    fn update(&mut self, time: f64, store: &LayeredStore);

    /// Discharge per unit width (qx, qy) at `node`, `None` if not controlled.
    fn discharge(&self, node: usize) -> Option<(f64, f64)>;
}

/// Proportional controller holding a gauge node near a target level.
///
/// The discharge through the controlled nodes is
/// `clamp(gain · (target(t) - η_gauge), -max, max)` along `direction`.
/// A positive discharge raises the gauge level when `direction` points into
/// the domain.
#[derive(Clone, Debug)]
pub struct LevelController {
    gauge: usize,
    target: TimeFunction,
    gain: f64,
    max_discharge: f64,
    direction: (f64, f64),
    nodes: Vec<usize>,
    current: f64,
}

impl LevelController {
    /// Create a controller.
    ///
    /// # Arguments
    /// * `gauge` - Node whose level is controlled
    /// * `target` - Target level as a function of time
    /// * `gain` - Discharge per metre of level error (m²/s per m)
    /// * `direction` - Flow direction of a positive discharge (normalized here)
    /// * `nodes` - Nodes receiving the discharge
    pub fn new(
        gauge: usize,
        target: TimeFunction,
        gain: f64,
        direction: (f64, f64),
        nodes: Vec<usize>,
    ) -> Self {
        let len = direction.0.hypot(direction.1);
        let direction = if len > 0.0 {
            (direction.0 / len, direction.1 / len)
        } else {
            (1.0, 0.0)
        };
        let mut nodes = nodes;
        nodes.sort_unstable();
        nodes.dedup();
        Self {
            gauge,
            target,
            gain,
            max_discharge: f64::INFINITY,
            direction,
            nodes,
            current: 0.0,
        }
    }

    /// Limit the discharge magnitude.
    pub fn with_max_discharge(mut self, max_discharge: f64) -> Self {
        self.max_discharge = max_discharge.abs();
        self
    }

    /// Discharge chosen at the last update.
    pub fn current(&self) -> f64 {
        self.current
    }
}

impl DischargeController for LevelController {
    fn update(&mut self, time: f64, store: &LayeredStore) {
        if self.gauge >= store.n_nodes() {
            log::warn!("level controller gauge node {} is outside the mesh", self.gauge);
            self.current = 0.0;
            return;
        }
        let level = store.lock(self.gauge).eta;
        let error = self.target.evaluate(time).value - level;
        self.current = (self.gain * error).clamp(-self.max_discharge, self.max_discharge);
        log::trace!("level controller: error {error:.4} m, discharge {:.4}", self.current);
    }

    fn discharge(&self, node: usize) -> Option<(f64, f64)> {
        self.nodes
            .binary_search(&node)
            .ok()
            .map(|_| (self.current * self.direction.0, self.current * self.direction.1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::NodeIndex;
    use crate::vertical::DepthLevels;

    #[test]
    fn test_level_controller_tracks_error() {
        let store = LayeredStore::new(DepthLevels::single(), [2.0, 2.0], 0.01);
        store.set_water_level(NodeIndex::new(0), -0.2, 0.1);

        let mut controller =
            LevelController::new(0, TimeFunction::Constant(0.0), 5.0, (0.0, 2.0), vec![1])
                .with_max_discharge(0.5);
        controller.update(0.0, &store);

        assert!((controller.current() - 0.5).abs() < 1e-12);
        assert_eq!(controller.discharge(1), Some((0.0, 0.5)));
        assert_eq!(controller.discharge(0), None);
    }
}
