//! Divergence detection for the explicit update.
//!
//! The update phase hands every candidate value (new level, new layer
//! velocities) to a [`DivergenceCheck`] before committing it. A value that
//! is NaN, infinite or larger in magnitude than the threshold marks the
//! step as fatal.

/// First offending value found on a node.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Divergence {
    /// Node number
    pub node: usize,
    /// Offending value
    pub value: f64,
}

/// Threshold test applied to candidate node values.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DivergenceCheck {
    /// Largest admissible magnitude
    pub threshold: f64,
}

impl Default for DivergenceCheck {
    fn default() -> Self {
        Self { threshold: 1.0e5 }
    }
}

impl DivergenceCheck {
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }

    /// True when `value` is non-finite or exceeds the threshold.
    #[inline]
    pub fn is_divergent(&self, value: f64) -> bool {
        !value.is_finite() || value.abs() > self.threshold
    }

    /// First divergent value of a node's candidate level and velocities.
    pub fn scan<'a>(
        &self,
        node: usize,
        values: impl IntoIterator<Item = &'a f64>,
    ) -> Option<Divergence> {
        values
            .into_iter()
            .find(|&&v| self.is_divergent(v))
            .map(|&value| Divergence { node, value })
    }

    /// Keep the divergence on the lowest node number.
    ///
    /// Nodes are updated in parallel, so the first report in time is not
    /// reproducible; the lowest node is.
    pub fn merge(current: Option<Divergence>, found: Divergence) -> Divergence {
        match current {
            Some(c) if c.node <= found.node => c,
            _ => found,
        }
    }
}
