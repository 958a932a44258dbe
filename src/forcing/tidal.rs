//! Harmonic tidal series.
//!
//! The level at an open boundary is a sum of harmonic constituents:
//!
//! η(t) = η₀ + R(t) × Σᵢ Aᵢ cos(ωᵢ t + φᵢ)
//!
//! where Aᵢ is amplitude, ωᵢ = 2π/Tᵢ the angular frequency, φᵢ the phase,
//! and R(t) an optional smooth ramp from 0 to 1 that keeps a cold start from
//! launching a bore into the domain.

use std::f64::consts::PI;

use super::time_function::ForcingValue;

/// A single harmonic component.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TidalConstituent {
    /// Name of the constituent (e.g. "M2", "S2")
    pub name: String,
    /// Amplitude (m, or m/s for velocity forcing)
    pub amplitude: f64,
    /// Period (s)
    pub period: f64,
    /// Phase (radians)
    pub phase: f64,
}

impl TidalConstituent {
    /// Create a new constituent.
    pub fn new(name: impl Into<String>, amplitude: f64, period: f64, phase: f64) -> Self {
        Self {
            name: name.into(),
            amplitude,
            period,
            phase,
        }
    }

    /// Angular frequency ω = 2π/T.
    pub fn angular_frequency(&self) -> f64 {
        2.0 * PI / self.period
    }

    /// Value and time derivative at time `t`.
    pub fn evaluate(&self, t: f64) -> ForcingValue {
        let omega = self.angular_frequency();
        let arg = omega * t + self.phase;
        ForcingValue {
            value: self.amplitude * arg.cos(),
            derivative: -self.amplitude * omega * arg.sin(),
        }
    }

    /// Principal lunar semidiurnal (M2), period ≈ 12.42 h.
    pub fn m2(amplitude: f64, phase: f64) -> Self {
        Self::new("M2", amplitude, 12.42 * 3600.0, phase)
    }

    /// Principal solar semidiurnal (S2), period 12 h.
    pub fn s2(amplitude: f64, phase: f64) -> Self {
        Self::new("S2", amplitude, 12.0 * 3600.0, phase)
    }

    /// Larger lunar elliptic semidiurnal (N2), period ≈ 12.66 h.
    pub fn n2(amplitude: f64, phase: f64) -> Self {
        Self::new("N2", amplitude, 12.66 * 3600.0, phase)
    }

    /// Lunar diurnal (K1), period ≈ 23.93 h.
    pub fn k1(amplitude: f64, phase: f64) -> Self {
        Self::new("K1", amplitude, 23.93 * 3600.0, phase)
    }

    /// Lunar diurnal (O1), period ≈ 25.82 h.
    pub fn o1(amplitude: f64, phase: f64) -> Self {
        Self::new("O1", amplitude, 25.82 * 3600.0, phase)
    }
}

/// Mean value plus a sum of constituents with an optional ramp.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HarmonicSeries {
    /// Mean value (not ramped)
    pub mean: f64,
    /// Constituents
    pub constituents: Vec<TidalConstituent>,
    /// Ramp-up duration (s); `None` starts at full amplitude
    pub ramp_duration: Option<f64>,
}

impl HarmonicSeries {
    /// Series without ramp.
    pub fn new(mean: f64, constituents: Vec<TidalConstituent>) -> Self {
        Self {
            mean,
            constituents,
            ramp_duration: None,
        }
    }

    /// Enable a smooth ramp `3τ² - 2τ³`, τ = t / duration.
    pub fn with_ramp(mut self, duration: f64) -> Self {
        self.ramp_duration = Some(duration);
        self
    }

    fn ramp(&self, t: f64) -> (f64, f64) {
        match self.ramp_duration {
            Some(duration) if duration > 0.0 && t < duration => {
                if t <= 0.0 {
                    return (0.0, 0.0);
                }
                let tau = t / duration;
                (
                    tau * tau * (3.0 - 2.0 * tau),
                    6.0 * tau * (1.0 - tau) / duration,
                )
            }
            _ => (1.0, 0.0),
        }
    }

    /// Value and derivative at time `t`.
    pub fn evaluate(&self, t: f64) -> ForcingValue {
        let (ramp, ramp_rate) = self.ramp(t);
        let mut out = ForcingValue::constant(self.mean);
        for c in &self.constituents {
            let f = c.evaluate(t);
            out.value += ramp * f.value;
            out.derivative += ramp_rate * f.value + ramp * f.derivative;
        }
        out
    }

    /// True when there is a single constituent and no ramp.
    pub fn is_periodic(&self) -> bool {
        self.constituents.len() == 1 && self.ramp_duration.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOL: f64 = 1e-10;

    #[test]
    fn test_constituent_derivative_matches_finite_difference() {
        let c = TidalConstituent::m2(1.2, 0.4);
        let t = 5000.0;
        let dt = 1e-3;
        let fd = (c.evaluate(t + dt).value - c.evaluate(t - dt).value) / (2.0 * dt);
        assert!((c.evaluate(t).derivative - fd).abs() < 1e-8);
    }

    #[test]
    fn test_series_sum() {
        let series = HarmonicSeries::new(
            0.3,
            vec![TidalConstituent::m2(1.0, 0.0), TidalConstituent::s2(0.5, 0.0)],
        );
        assert!((series.evaluate(0.0).value - 1.8).abs() < TOL);
        assert!(series.evaluate(0.0).derivative.abs() < TOL);
        assert!(!series.is_periodic());
    }

    #[test]
    fn test_ramp() {
        let series = HarmonicSeries::new(0.0, vec![TidalConstituent::m2(1.0, 0.0)]).with_ramp(3600.0);
        assert_eq!(series.evaluate(0.0).value, 0.0);
        let half = series.evaluate(1800.0).value;
        let full = TidalConstituent::m2(1.0, 0.0).evaluate(1800.0).value;
        assert!((half - 0.5 * full).abs() < TOL);
        let after = series.evaluate(7200.0).value;
        assert!((after - TidalConstituent::m2(1.0, 0.0).evaluate(7200.0).value).abs() < TOL);
    }
}
