use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::events::Sender;
use crate::synth::algorithm::Algorithm;

/// Per-trigger parameters of a sound.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SoundParams {
    /// Peak amplitude in `[0, 1]`.
    pub max_volume: f32,
    /// Seconds.
    pub duration: f64,
    pub fade_in: f64,
    pub fade_out: f64,
}

impl SoundParams {
    pub fn new(max_volume: f32, duration: f64, fade_in: f64, fade_out: f64) -> Self {
        Self {
            max_volume: max_volume.clamp(0.0, 1.0),
            duration: duration.max(0.0),
            fade_in: fade_in.max(0.0),
            fade_out: fade_out.max(0.0),
        }
    }
}

/// One triggered sound on its way to (or inside) the mixer.
#[derive(Debug, Clone)]
pub struct PlaybackInstance {
    pub id: String,
    pub algorithm: Arc<Algorithm>,
    pub params: SoundParams,
    /// Absolute sample-frame index of the next sample to render.
    pub cursor: u64,
    pub owner: Sender,
    /// Reset generation of the owning component at trigger time.
    pub generation: u32,
}

impl PlaybackInstance {
    pub fn new(
        id: impl Into<String>,
        algorithm: Arc<Algorithm>,
        params: SoundParams,
        owner: Sender,
    ) -> Self {
        Self {
            id: id.into(),
            algorithm,
            params,
            cursor: 0,
            owner,
            generation: 0,
        }
    }

    pub fn with_generation(mut self, generation: u32) -> Self {
        self.generation = generation;
        self
    }

    /// Render the next `buffer.len()` samples. Returns `true` once the sound
    /// has played through its duration.
    pub fn render(&mut self, sample_rate: u32, buffer: &mut [i16]) -> bool {
        self.algorithm
            .generate(sample_rate, buffer, &mut self.cursor, &self.params)
    }
}
