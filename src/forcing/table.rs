//! Piecewise-linear time tables.

use super::time_function::ForcingValue;
use crate::error::{Result, SolverError};

/// Values sampled at increasing times, linearly interpolated.
///
/// Outside the sampled range a non-periodic table holds its end values; a
/// periodic table wraps time into `[t_first, t_last)`.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TimeTable {
    times: Vec<f64>,
    values: Vec<f64>,
    periodic: bool,
}

impl TimeTable {
    /// Build a table from matching time and value columns.
    ///
    /// # Errors
    /// [`SolverError::InvalidForcing`] if the columns differ in length, are
    /// empty, or the times do not increase strictly.
    pub fn new(times: Vec<f64>, values: Vec<f64>) -> Result<Self> {
        if times.len() != values.len() {
            return Err(SolverError::InvalidForcing(format!(
                "table has {} times but {} values",
                times.len(),
                values.len()
            )));
        }
        if times.is_empty() {
            return Err(SolverError::InvalidForcing("empty time table".into()));
        }
        if times.windows(2).any(|w| !(w[1] > w[0])) {
            return Err(SolverError::InvalidForcing(
                "table times must increase strictly".into(),
            ));
        }
        Ok(Self {
            times,
            values,
            periodic: false,
        })
    }

    /// Repeat the table with period `t_last - t_first`.
    pub fn periodic(mut self) -> Self {
        self.periodic = self.times.len() > 1;
        self
    }

    /// Whether the table repeats.
    pub fn is_periodic(&self) -> bool {
        self.periodic
    }

    /// Covered time range.
    pub fn time_range(&self) -> (f64, f64) {
        (self.times[0], self.times[self.times.len() - 1])
    }

    /// Value and slope at time `t`.
    pub fn evaluate(&self, t: f64) -> ForcingValue {
        let (t0, t1) = self.time_range();
        let t = if self.periodic {
            t0 + (t - t0).rem_euclid(t1 - t0)
        } else {
            t
        };

        if t <= t0 {
            return ForcingValue::constant(self.values[0]);
        }
        if t >= t1 {
            return ForcingValue::constant(self.values[self.values.len() - 1]);
        }

        // First sample strictly after t; t0 < t < t1 so 1 <= i < len.
        let i = self.times.partition_point(|&s| s <= t);
        let (ta, tb) = (self.times[i - 1], self.times[i]);
        let (va, vb) = (self.values[i - 1], self.values[i]);
        let slope = (vb - va) / (tb - ta);
        ForcingValue {
            value: va + slope * (t - ta),
            derivative: slope,
        }
    }
}
