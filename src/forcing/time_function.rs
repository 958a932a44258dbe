//! Scalar functions of time used by boundary forcings.
//!
//! Every forcing evaluates to a [`ForcingValue`]: the value and its time
//! derivative. The derivative drives the vertical-velocity profile under a
//! prescribed level, so tables and harmonics both provide it analytically.

use std::fmt;
use std::sync::Arc;

use super::table::TimeTable;
use super::tidal::{HarmonicSeries, TidalConstituent};

/// Value of a forcing function and its time derivative.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ForcingValue {
    /// Function value
    pub value: f64,
    /// Time derivative
    pub derivative: f64,
}

impl ForcingValue {
    /// Constant value, zero derivative.
    pub const fn constant(value: f64) -> Self {
        Self {
            value,
            derivative: 0.0,
        }
    }
}

/// Externally controlled scalar, e.g. a sluice schedule driven by another model.
pub trait ScalarController: Send + Sync {
    /// Value and derivative at time `t`.
    fn evaluate(&self, t: f64) -> ForcingValue;

    /// Whether the signal repeats.
    fn is_periodic(&self) -> bool {
        false
    }
}

/// A scalar forcing function of time.
#[derive(Clone)]
pub enum TimeFunction {
    /// Fixed value
    Constant(f64),
    /// Sum of harmonic constituents
    Harmonic(HarmonicSeries),
    /// Piecewise-linear table
    Table(TimeTable),
    /// Value supplied by an external controller
    Controlled(Arc<dyn ScalarController>),
}

impl TimeFunction {
    /// Pure sine `amplitude · sin(2πt / period)` around zero.
    pub fn sinusoid(amplitude: f64, period: f64) -> Self {
        let constituent =
            TidalConstituent::new("sine", amplitude, period, -std::f64::consts::FRAC_PI_2);
        TimeFunction::Harmonic(HarmonicSeries::new(0.0, vec![constituent]))
    }

    /// Value and derivative at time `t`.
    pub fn evaluate(&self, t: f64) -> ForcingValue {
        match self {
            TimeFunction::Constant(v) => ForcingValue::constant(*v),
            TimeFunction::Harmonic(series) => series.evaluate(t),
            TimeFunction::Table(table) => table.evaluate(t),
            TimeFunction::Controlled(controller) => controller.evaluate(t),
        }
    }

    /// Whether the function repeats in time.
    pub fn is_periodic(&self) -> bool {
        match self {
            TimeFunction::Constant(_) => true,
            TimeFunction::Harmonic(series) => series.is_periodic(),
            TimeFunction::Table(table) => table.is_periodic(),
            TimeFunction::Controlled(controller) => controller.is_periodic(),
        }
    }
}

impl fmt::Debug for TimeFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimeFunction::Constant(v) => f.debug_tuple("Constant").field(v).finish(),
            TimeFunction::Harmonic(s) => f.debug_tuple("Harmonic").field(s).finish(),
            TimeFunction::Table(t) => f.debug_tuple("Table").field(t).finish(),
            TimeFunction::Controlled(_) => write!(f, "Controlled(<dyn>)"),
        }
    }
}

impl From<f64> for TimeFunction {
    fn from(value: f64) -> Self {
        TimeFunction::Constant(value)
    }
}

impl From<TimeTable> for TimeFunction {
    fn from(table: TimeTable) -> Self {
        TimeFunction::Table(table)
    }
}

impl From<HarmonicSeries> for TimeFunction {
    fn from(series: HarmonicSeries) -> Self {
        TimeFunction::Harmonic(series)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOL: f64 = 1e-12;

    struct Ramp;

    impl ScalarController for Ramp {
        fn evaluate(&self, t: f64) -> ForcingValue {
            ForcingValue {
                value: 2.0 * t,
                derivative: 2.0,
            }
        }
    }

    #[test]
    fn test_sinusoid() {
        let f = TimeFunction::sinusoid(0.5, 44700.0);
        assert!(f.evaluate(0.0).value.abs() < TOL);
        assert!((f.evaluate(44700.0 / 4.0).value - 0.5).abs() < TOL);
        let omega = 2.0 * std::f64::consts::PI / 44700.0;
        assert!((f.evaluate(0.0).derivative - 0.5 * omega).abs() < TOL);
        assert!(f.is_periodic());
    }

    #[test]
    fn test_constant() {
        let f = TimeFunction::from(1.5);
        assert_eq!(f.evaluate(123.0), ForcingValue::constant(1.5));
    }

    #[test]
    fn test_controlled() {
        let f = TimeFunction::Controlled(Arc::new(Ramp));
        let v = f.evaluate(3.0);
        assert_eq!(v.value, 6.0);
        assert_eq!(v.derivative, 2.0);
        assert!(!f.is_periodic());
        assert_eq!(format!("{f:?}"), "Controlled(<dyn>)");
    }
}
