//! Software FM synthesizer.
//!
//! Sounds are produced by [`Algorithm`]s: trees of [`Operator`]s whose phases
//! are modulated by their children. Samples are a pure function of the
//! absolute sample index, so a [`PlaybackInstance`] only carries a cursor and
//! can be rendered on the audio thread without any shared state.
//!
//! Submodules:
//! - [`algorithm`] – carrier summing, fade envelope and buffer generation
//! - [`glide`] – pitch glide shapes and their closed-form phase integrals
//! - [`operator`] – waveforms and the modulated oscillator
//! - [`playback`] – triggered sound instances and their parameters
//!
//! [`Synthesizer`] is the algorithm table owned by the engine.

pub mod algorithm;
pub mod glide;
pub mod operator;
pub mod playback;

use std::path::Path;
use std::sync::Arc;

use log::{info, warn};
use rustc_hash::FxHashMap;

use crate::assets::AssetError;

pub use algorithm::Algorithm;
pub use glide::{Glide, GlideCurve};
pub use operator::{Operator, Waveform};
pub use playback::{PlaybackInstance, SoundParams};

/// Table of named algorithms.
#[derive(Debug, Default)]
pub struct Synthesizer {
    algorithms: FxHashMap<String, Arc<Algorithm>>,
}

impl Synthesizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a JSON algorithm asset. The algorithm is registered under the
    /// file stem, which is returned. On error nothing is registered.
    pub fn load(&mut self, path: impl AsRef<Path>) -> Result<String, AssetError> {
        let path = path.as_ref();
        let id = path
            .file_stem()
            .and_then(|s| s.to_str())
            .ok_or_else(|| AssetError::Invalid(format!("no file stem in {:?}", path)))?
            .to_string();
        let text = std::fs::read_to_string(path).map_err(|source| AssetError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let algorithm: Algorithm = serde_json::from_str(&text).map_err(|e| {
            AssetError::Parse {
                path: path.to_path_buf(),
                message: e.to_string(),
            }
        })?;
        algorithm.validate()?;
        info!(
            "Loaded sound '{}' ({} carriers, {} operators) from {:?}",
            id,
            algorithm.num_carriers,
            algorithm.operators.iter().map(Operator::count).sum::<usize>(),
            path
        );
        self.algorithms.insert(id.clone(), Arc::new(algorithm));
        Ok(id)
    }

    /// Register (or replace) an algorithm under `id`.
    pub fn add_algorithm(
        &mut self,
        id: impl Into<String>,
        algorithm: Algorithm,
    ) -> Result<(), AssetError> {
        algorithm.validate()?;
        let id = id.into();
        if self.algorithms.insert(id.clone(), Arc::new(algorithm)).is_some() {
            warn!("sound '{}' replaced", id);
        }
        Ok(())
    }

    pub fn algorithm(&self, id: &str) -> Option<Arc<Algorithm>> {
        self.algorithms.get(id).cloned()
    }

    pub fn remove(&mut self, id: &str) -> bool {
        self.algorithms.remove(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.algorithms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.algorithms.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_and_lookup() {
        let mut synth = Synthesizer::new();
        let tone = Algorithm::new(vec![Operator::new(440.0, Waveform::Sine)]);
        synth.add_algorithm("beep", tone.clone()).unwrap();
        assert_eq!(synth.algorithm("beep").as_deref(), Some(&tone));
        assert!(synth.algorithm("boop").is_none());
        assert!(synth.remove("beep"));
        assert!(!synth.remove("beep"));
    }

    #[test]
    fn invalid_algorithm_is_not_registered() {
        let mut synth = Synthesizer::new();
        let broken = Algorithm {
            num_carriers: 3,
            operators: vec![Operator::new(440.0, Waveform::Sine)],
        };
        assert!(synth.add_algorithm("broken", broken).is_err());
        assert!(synth.is_empty());
    }
}
