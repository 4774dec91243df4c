//! Per-entity sound triggering.
//!
//! [`AudioComponent::play_sound`] only queues a request; the audio system
//! resolves the algorithm and hands a
//! [`PlaybackInstance`](crate::synth::PlaybackInstance) to the mixer during
//! the component's update.

use log::debug;

use crate::scene::EntityId;

/// A sound waiting for the next audio update.
#[derive(Debug, Clone, PartialEq)]
pub struct SoundRequest {
    pub sound_id: String,
    /// `None` uses the configured default volume.
    pub max_volume: Option<f32>,
    pub duration: f64,
    pub fade_in: f64,
    pub fade_out: f64,
}

#[derive(Debug, Clone, Default)]
pub struct AudioComponent {
    queue: Vec<SoundRequest>,
    /// Sounds handed to the mixer and not yet reported finished.
    pub(crate) playing: usize,
    /// Bumped on every reset; sounds started before it are stale.
    pub(crate) generation: u32,
    pub(super) owner: Option<EntityId>,
}

impl AudioComponent {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue `sound_id` at the default volume.
    pub fn play_sound(&mut self, sound_id: &str, duration: f64, fade_in: f64, fade_out: f64) {
        self.push(SoundRequest {
            sound_id: sound_id.to_string(),
            max_volume: None,
            duration,
            fade_in,
            fade_out,
        });
    }

    pub fn play_sound_with_volume(
        &mut self,
        sound_id: &str,
        max_volume: f32,
        duration: f64,
        fade_in: f64,
        fade_out: f64,
    ) {
        self.push(SoundRequest {
            sound_id: sound_id.to_string(),
            max_volume: Some(max_volume),
            duration,
            fade_in,
            fade_out,
        });
    }

    pub fn queued(&self) -> &[SoundRequest] {
        &self.queue
    }

    pub fn playing(&self) -> usize {
        self.playing
    }

    pub fn generation(&self) -> u32 {
        self.generation
    }

    pub(crate) fn take_queue(&mut self) -> Vec<SoundRequest> {
        std::mem::take(&mut self.queue)
    }

    /// Drop queued requests. Stopping sounds already in the mixer is done by
    /// [`crate::systems::audio::reset`].
    pub fn reset(&mut self) {
        self.queue.clear();
        self.playing = 0;
        self.generation = self.generation.wrapping_add(1);
    }

    fn push(&mut self, request: SoundRequest) {
        debug!("queued sound '{}' for {}s", request.sound_id, request.duration);
        self.queue.push(request);
    }
}
