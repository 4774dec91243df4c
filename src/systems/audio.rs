//! Audio mixing and the audio component update.
//!
//! Two halves live here:
//! - [`Mixer`] runs on the audio side. The platform moves it into its audio
//!   callback and calls [`Mixer::fill`] for every buffer. It owns the active
//!   playback list outright; the simulation only talks to it through
//!   [`AudioCmd`] messages, so the list is never shared between threads.
//! - [`update`], [`reset`] and [`forward_finished`] run on the simulation
//!   thread: they turn queued sound requests into playback instances, stop
//!   an entity's sounds, and republish the mixer's `SoundFinished` reports as
//!   `DidFinishSound` events.
//!
//! See also: [`crate::events::audio`] and [`crate::resources::audio`].

use std::fmt;

use crossbeam_channel::{Receiver, Sender as ChannelSender};
use log::{debug, info, warn};

use crate::components::{Capability, Component};
use crate::engine::Engine;
use crate::events::audio::{AudioCmd, AudioMessage};
use crate::events::{DID_FINISH_SOUND, Sender};
use crate::scene::EntityId;
use crate::synth::playback::{PlaybackInstance, SoundParams};

/// Additive mixer over every active playback instance.
pub struct Mixer {
    sample_rate: u32,
    rx_cmd: Receiver<AudioCmd>,
    tx_msg: ChannelSender<AudioMessage>,
    active: Vec<PlaybackInstance>,
    scratch: Vec<i16>,
    accum: Vec<i32>,
    shut_down: bool,
}

impl fmt::Debug for Mixer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Mixer")
            .field("sample_rate", &self.sample_rate)
            .field("active", &self.active.len())
            .field("shut_down", &self.shut_down)
            .finish()
    }
}

impl Mixer {
    pub fn new(
        sample_rate: u32,
        rx_cmd: Receiver<AudioCmd>,
        tx_msg: ChannelSender<AudioMessage>,
    ) -> Self {
        Self {
            sample_rate,
            rx_cmd,
            tx_msg,
            active: Vec::new(),
            scratch: Vec::new(),
            accum: Vec::new(),
            shut_down: false,
        }
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Number of instances currently mixed.
    pub fn active(&self) -> usize {
        self.active.len()
    }

    pub fn is_shut_down(&self) -> bool {
        self.shut_down
    }

    /// Fill `out` with the next mixed samples.
    ///
    /// Pending commands are applied first. Instances that play through their
    /// duration are retired and reported as `SoundFinished`. Returns `false`
    /// once the mixer has been shut down (`out` is then silent).
    pub fn fill(&mut self, out: &mut [i16]) -> bool {
        self.drain_commands();
        if self.shut_down {
            out.fill(0);
            return false;
        }

        self.accum.clear();
        self.accum.resize(out.len(), 0);
        self.scratch.resize(out.len(), 0);

        let mut finished = Vec::new();
        for (index, instance) in self.active.iter_mut().enumerate() {
            if instance.render(self.sample_rate, &mut self.scratch) {
                finished.push(index);
            }
            for (acc, sample) in self.accum.iter_mut().zip(&self.scratch) {
                *acc += i32::from(*sample);
            }
        }

        for (slot, acc) in out.iter_mut().zip(&self.accum) {
            *slot = (*acc).clamp(i32::from(i16::MIN), i32::from(i16::MAX)) as i16;
        }

        for index in finished.into_iter().rev() {
            let instance = self.active.remove(index);
            let _ = self.tx_msg.send(AudioMessage::SoundFinished {
                id: instance.id,
                owner: instance.owner,
                generation: instance.generation,
            });
        }
        true
    }

    fn drain_commands(&mut self) {
        for cmd in self.rx_cmd.try_iter() {
            match cmd {
                AudioCmd::Play(instance) => {
                    if !self.shut_down {
                        self.active.push(instance);
                    }
                }
                AudioCmd::StopOwner { owner } => {
                    self.active.retain(|instance| instance.owner != owner);
                }
                AudioCmd::StopAll => self.active.clear(),
                AudioCmd::Shutdown => {
                    self.active.clear();
                    self.shut_down = true;
                }
            }
        }
    }
}

fn owner_of(entity: EntityId) -> Sender {
    Sender::Component(entity, Capability::Audio)
}

/// Hand the entity's queued sounds to the mixer.
///
/// Unknown sound ids are logged and dropped. Without a running audio device
/// the requests are dropped as well.
pub fn update(engine: &mut Engine, entity: EntityId) {
    let (requests, generation, owner) = match engine
        .scene_mut()
        .get_mut(entity)
        .and_then(|e| e.audio_mut())
    {
        Some(audio) => (
            audio.take_queue(),
            audio.generation,
            audio.sender().unwrap_or_else(|| owner_of(entity)),
        ),
        None => return,
    };
    if requests.is_empty() {
        return;
    }

    let default_volume = engine.config().max_volume;
    let mut started = 0;
    for request in requests {
        let Some(algorithm) = engine.synthesizer().algorithm(&request.sound_id) else {
            warn!("play_sound: unknown sound '{}'", request.sound_id);
            continue;
        };
        let params = SoundParams::new(
            request.max_volume.unwrap_or(default_volume),
            request.duration,
            request.fade_in,
            request.fade_out,
        );
        let instance = PlaybackInstance::new(request.sound_id, algorithm, params, owner)
            .with_generation(generation);
        match engine.audio_bridge() {
            Some(bridge) => {
                if bridge.send(AudioCmd::Play(instance)) {
                    started += 1;
                }
            }
            None => debug!("no audio device; dropping '{}'", instance.id),
        }
    }

    if let Some(audio) = engine.scene_mut().get_mut(entity).and_then(|e| e.audio_mut()) {
        audio.playing += started;
    }
}

/// Clear the entity's queue and stop its sounds in the mixer.
pub fn reset(engine: &mut Engine, entity: EntityId) {
    let Some(audio) = engine.scene_mut().get_mut(entity).and_then(|e| e.audio_mut()) else {
        return;
    };
    let had_sounds = audio.playing > 0;
    audio.reset();
    if !had_sounds {
        return;
    }
    if let Some(bridge) = engine.audio_bridge() {
        bridge.send(AudioCmd::StopOwner {
            owner: owner_of(entity),
        });
    }
}

/// Publish every `SoundFinished` report as `DidFinishSound` from the owning
/// audio component.
///
/// Reports for entities that no longer exist are dropped, and so are reports
/// for sounds started before the component's last reset: the mixer may have
/// retired them before it saw the `StopOwner`.
pub fn forward_finished(engine: &mut Engine) {
    let messages = match engine.audio_bridge() {
        Some(bridge) => bridge.poll(),
        None => return,
    };
    for message in messages {
        match message {
            AudioMessage::SoundFinished {
                id,
                owner,
                generation,
            } => {
                let Some(entity) = owner.entity() else {
                    continue;
                };
                let Some(audio) = engine.scene_mut().get_mut(entity).and_then(|e| e.audio_mut())
                else {
                    debug!("sound '{}' finished for a destroyed entity", id);
                    continue;
                };
                if audio.generation != generation {
                    debug!("sound '{}' finished after its owner was reset", id);
                    continue;
                }
                audio.playing = audio.playing.saturating_sub(1);
                info!("sound '{}' finished", id);
                engine.notify(&DID_FINISH_SOUND, owner);
            }
        }
    }
}
