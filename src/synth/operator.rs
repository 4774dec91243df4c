use std::f64::consts::{PI, TAU};

use serde::{Deserialize, Serialize};

use crate::synth::glide::Glide;

/// Oscillator shape of an operator. Every shape is in `[-1, 1]` and starts
/// its cycle like a sine (rising through zero at phase 0).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Waveform {
    #[default]
    #[serde(alias = "smooth")]
    Sine,
    Triangle,
    Sawtooth,
    Square,
}

impl Waveform {
    /// Raw value at `phase` radians.
    pub fn raw(self, phase: f64) -> f64 {
        match self {
            Waveform::Sine => phase.sin(),
            Waveform::Triangle => (2.0 / PI) * phase.sin().asin(),
            Waveform::Sawtooth => {
                let cycle = (phase / TAU + 0.5).rem_euclid(1.0);
                2.0 * cycle - 1.0
            }
            Waveform::Square => {
                if (phase / TAU).rem_euclid(1.0) < 0.5 {
                    1.0
                } else {
                    -1.0
                }
            }
        }
    }
}

fn default_threshold_low() -> f64 {
    -1.0
}

fn default_threshold_high() -> f64 {
    1.0
}

/// One FM operator: an oscillator whose phase is offset by the summed output
/// of its modulators, scaled by `modulation_index`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Operator {
    /// Base frequency in Hz.
    pub frequency: f64,
    #[serde(default)]
    pub modulation_index: f64,
    #[serde(default)]
    pub waveform: Waveform,
    /// Output range the raw `[-1, 1]` shape is mapped into.
    #[serde(default = "default_threshold_low")]
    pub threshold_low: f64,
    #[serde(default = "default_threshold_high")]
    pub threshold_high: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub glide: Option<Glide>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub modulators: Vec<Operator>,
}

impl Operator {
    pub fn new(frequency: f64, waveform: Waveform) -> Self {
        Self {
            frequency,
            modulation_index: 0.0,
            waveform,
            threshold_low: -1.0,
            threshold_high: 1.0,
            glide: None,
            modulators: Vec::new(),
        }
    }

    pub fn with_thresholds(mut self, low: f64, high: f64) -> Self {
        self.threshold_low = low;
        self.threshold_high = high;
        self
    }

    pub fn with_glide(mut self, glide: Glide) -> Self {
        self.glide = Some(glide);
        self
    }

    pub fn with_modulator(mut self, modulation_index: f64, modulator: Operator) -> Self {
        self.modulation_index = modulation_index;
        self.modulators.push(modulator);
        self
    }

    /// Unmodulated phase in radians at `time`.
    pub fn phase(&self, time: f64, duration: f64) -> f64 {
        match &self.glide {
            Some(glide) => glide.phase(self.frequency, time, duration),
            None => TAU * self.frequency * time,
        }
    }

    /// Output of this operator (and, recursively, its modulators) at `time`
    /// seconds into a sound lasting `duration`.
    pub fn sample(&self, time: f64, duration: f64) -> f64 {
        let mut phase = self.phase(time, duration);
        if self.modulation_index != 0.0 && !self.modulators.is_empty() {
            let modulation: f64 = self
                .modulators
                .iter()
                .map(|m| m.sample(time, duration))
                .sum();
            phase += self.modulation_index * modulation;
        }
        let raw = self.waveform.raw(phase);
        self.threshold_low + (raw + 1.0) * 0.5 * (self.threshold_high - self.threshold_low)
    }

    /// Number of operators in this subtree, itself included.
    pub fn count(&self) -> usize {
        1 + self.modulators.iter().map(Operator::count).sum::<usize>()
    }

    pub(crate) fn is_finite(&self) -> bool {
        self.frequency.is_finite()
            && self.modulation_index.is_finite()
            && self.threshold_low.is_finite()
            && self.threshold_high.is_finite()
            && self.glide.is_none_or(|g| g.target.is_finite())
            && self.modulators.iter().all(Operator::is_finite)
    }
}
