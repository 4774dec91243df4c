//! Pitch glides.
//!
//! A glide moves an operator's frequency from its base value to `target`
//! over the sound's duration, following one of four shapes. The phase of a
//! gliding oscillator is the integral of its frequency; every shape has a
//! closed-form integral, so any sample can be computed from its absolute
//! time alone.

use std::f64::consts::TAU;

use serde::{Deserialize, Serialize};

/// Steepness of the exponential and logarithmic shapes.
const CURVATURE: f64 = 4.0;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GlideCurve {
    #[default]
    Linear,
    /// Slow start, fast finish.
    #[serde(alias = "exp")]
    Exponential,
    /// Fast start, slow finish (the inverse function of `Exponential`).
    #[serde(alias = "log")]
    Logarithmic,
    /// `Logarithmic` mirrored through the center point.
    #[serde(alias = "inverse_log")]
    InverseLogarithmic,
}

impl GlideCurve {
    /// Shape `g(u)` on `u` in `[0, 1]`, with `g(0) = 0` and `g(1) = 1`.
    pub fn shape(self, u: f64) -> f64 {
        let u = u.clamp(0.0, 1.0);
        match self {
            GlideCurve::Linear => u,
            GlideCurve::Exponential => (CURVATURE * u).exp_m1() / CURVATURE.exp_m1(),
            GlideCurve::Logarithmic => log_shape(u),
            GlideCurve::InverseLogarithmic => 1.0 - log_shape(1.0 - u),
        }
    }

    /// `G(u)`, the integral of [`shape`](Self::shape) from 0 to `u`.
    pub fn integral(self, u: f64) -> f64 {
        let u = u.clamp(0.0, 1.0);
        match self {
            GlideCurve::Linear => 0.5 * u * u,
            GlideCurve::Exponential => {
                ((CURVATURE * u).exp_m1() / CURVATURE - u) / CURVATURE.exp_m1()
            }
            GlideCurve::Logarithmic => log_integral(u),
            GlideCurve::InverseLogarithmic => u - (log_integral(1.0) - log_integral(1.0 - u)),
        }
    }
}

fn log_shape(u: f64) -> f64 {
    let a = CURVATURE.exp_m1();
    (a * u).ln_1p() / CURVATURE
}

fn log_integral(u: f64) -> f64 {
    let a = CURVATURE.exp_m1();
    let x = 1.0 + a * u;
    (x * x.ln() - a * u) / (a * CURVATURE)
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Glide {
    /// Frequency reached at the end of the sound, in Hz.
    pub target: f64,
    #[serde(default)]
    pub curve: GlideCurve,
}

impl Glide {
    /// Instantaneous frequency at `time` for a sound lasting `duration`.
    pub fn frequency(&self, base: f64, time: f64, duration: f64) -> f64 {
        if duration <= 0.0 || time >= duration {
            return self.target;
        }
        base + (self.target - base) * self.curve.shape(time / duration)
    }

    /// Oscillator phase in radians at `time`. Holds the target frequency once
    /// the duration has elapsed.
    pub fn phase(&self, base: f64, time: f64, duration: f64) -> f64 {
        if duration <= 0.0 {
            return TAU * self.target * time;
        }
        let span = time.min(duration);
        let u = span / duration;
        let mut cycles = base * span + (self.target - base) * duration * self.curve.integral(u);
        if time > duration {
            cycles += self.target * (time - duration);
        }
        TAU * cycles
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f64 = 1e-6;

    fn approx_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < EPSILON
    }

    const CURVES: [GlideCurve; 4] = [
        GlideCurve::Linear,
        GlideCurve::Exponential,
        GlideCurve::Logarithmic,
        GlideCurve::InverseLogarithmic,
    ];

    #[test]
    fn shapes_hit_both_endpoints() {
        for curve in CURVES {
            assert!(approx_eq(curve.shape(0.0), 0.0), "{:?}", curve);
            assert!(approx_eq(curve.shape(1.0), 1.0), "{:?}", curve);
        }
    }

    #[test]
    fn log_is_inverse_of_exp() {
        for i in 0..=10 {
            let u = i as f64 / 10.0;
            let there = GlideCurve::Exponential.shape(u);
            assert!(approx_eq(GlideCurve::Logarithmic.shape(there), u));
        }
    }

    #[test]
    fn integral_matches_numeric_sum() {
        let steps = 20_000;
        for curve in CURVES {
            let mut sum = 0.0;
            for i in 0..steps {
                let u = (i as f64 + 0.5) / steps as f64;
                sum += curve.shape(u) / steps as f64;
            }
            assert!((curve.integral(1.0) - sum).abs() < 1e-5, "{:?}", curve);
        }
    }

    #[test]
    fn phase_holds_target_after_duration() {
        let glide = Glide {
            target: 880.0,
            curve: GlideCurve::Exponential,
        };
        let at_end = glide.phase(440.0, 1.0, 1.0);
        let later = glide.phase(440.0, 1.5, 1.0);
        assert!(approx_eq(later - at_end, TAU * 880.0 * 0.5));
        assert!(approx_eq(glide.frequency(440.0, 2.0, 1.0), 880.0));
        assert!(approx_eq(glide.frequency(440.0, 0.0, 1.0), 440.0));
    }

    #[test]
    fn linear_phase_is_average_frequency() {
        let glide = Glide {
            target: 200.0,
            curve: GlideCurve::Linear,
        };
        // Average of 100 and 200 Hz over one second = 150 cycles.
        assert!(approx_eq(glide.phase(100.0, 1.0, 1.0), TAU * 150.0));
    }
}
