use serde::{Deserialize, Serialize};

use crate::assets::AssetError;
use crate::synth::operator::Operator;
use crate::synth::playback::SoundParams;

/// A tree of operators. The first `num_carriers` top-level operators are
/// summed into the output sample; any further top-level operators are not
/// heard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Algorithm {
    pub num_carriers: usize,
    pub operators: Vec<Operator>,
}

impl Algorithm {
    pub fn new(operators: Vec<Operator>) -> Self {
        Self {
            num_carriers: operators.len(),
            operators,
        }
    }

    pub fn validate(&self) -> Result<(), AssetError> {
        if self.num_carriers == 0 {
            return Err(AssetError::Invalid("algorithm has no carriers".into()));
        }
        if self.num_carriers > self.operators.len() {
            return Err(AssetError::Invalid(format!(
                "num_carriers is {} but only {} operators are defined",
                self.num_carriers,
                self.operators.len()
            )));
        }
        if !self.operators.iter().all(Operator::is_finite) {
            return Err(AssetError::Invalid("operator values must be finite".into()));
        }
        Ok(())
    }

    /// Sum of the carriers at `time`, clamped to `[-1, 1]`.
    pub fn sample(&self, time: f64, duration: f64) -> f64 {
        self.operators
            .iter()
            .take(self.num_carriers)
            .map(|op| op.sample(time, duration))
            .sum::<f64>()
            .clamp(-1.0, 1.0)
    }

    /// Linear fade envelope: the smaller of the fade-in ramp over
    /// `[0, fade_in]` and the fade-out ramp over `[duration - fade_out,
    /// duration]`. Zero outside `[0, duration]`.
    pub fn envelope(time: f64, params: &SoundParams) -> f64 {
        if time < 0.0 || time > params.duration {
            return 0.0;
        }
        let fade_in = if params.fade_in > 0.0 {
            (time / params.fade_in).min(1.0)
        } else {
            1.0
        };
        let fade_out = if params.fade_out > 0.0 {
            ((params.duration - time) / params.fade_out).min(1.0)
        } else {
            1.0
        };
        fade_in.min(fade_out)
    }

    /// Fill `buffer` with samples starting at frame `*cursor`, advancing the
    /// cursor by one per sample. Frames past the duration are silent.
    ///
    /// Returns `true` when the cursor's time has passed the duration, so the
    /// caller can retire the sound.
    pub fn generate(
        &self,
        sample_rate: u32,
        buffer: &mut [i16],
        cursor: &mut u64,
        params: &SoundParams,
    ) -> bool {
        let rate = f64::from(sample_rate.max(1));
        let volume = f64::from(params.max_volume);
        for slot in buffer.iter_mut() {
            let time = *cursor as f64 / rate;
            *slot = if time > params.duration {
                0
            } else {
                let value = self.sample(time, params.duration)
                    * Self::envelope(time, params)
                    * volume;
                (value.clamp(-1.0, 1.0) * f64::from(i16::MAX)) as i16
            };
            *cursor += 1;
        }
        (*cursor as f64 / rate) > params.duration
    }
}
