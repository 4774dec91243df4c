//! Bridge between the simulation thread and the audio callback.
//!
//! Use [`setup_audio`] once during initialization: it creates the command and
//! message channels and returns the engine side ([`AudioBridge`]) together
//! with the [`Mixer`] that the platform moves into its audio callback.

use crossbeam_channel::{Receiver, Sender, unbounded};
use log::warn;

use crate::events::audio::{AudioCmd, AudioMessage};
use crate::systems::audio::Mixer;

/// Engine side of the audio channels.
///
/// Commands go out through [`AudioBridge::tx_cmd`]; the mixer reports back on
/// [`AudioBridge::rx_msg`].
#[derive(Debug)]
pub struct AudioBridge {
    /// Sender for [`AudioCmd`] messages (engine -> mixer).
    pub tx_cmd: Sender<AudioCmd>,
    /// Receiver for [`AudioMessage`] messages (mixer -> engine).
    pub rx_msg: Receiver<AudioMessage>,
    pub sample_rate: u32,
}

/// Create the channels and both ends of the audio hand-off.
pub fn setup_audio(sample_rate: u32) -> (AudioBridge, Mixer) {
    let (tx_cmd, rx_cmd) = unbounded::<AudioCmd>();
    let (tx_msg, rx_msg) = unbounded::<AudioMessage>();
    let mixer = Mixer::new(sample_rate, rx_cmd, tx_msg);
    (
        AudioBridge {
            tx_cmd,
            rx_msg,
            sample_rate,
        },
        mixer,
    )
}

impl AudioBridge {
    /// Send a command to the mixer. Returns `false` if the mixer is gone.
    pub fn send(&self, cmd: AudioCmd) -> bool {
        match self.tx_cmd.send(cmd) {
            Ok(()) => true,
            Err(e) => {
                warn!("audio mixer disconnected, dropping {:?}", e.into_inner());
                false
            }
        }
    }

    /// Drain every message the mixer has reported so far.
    pub fn poll(&self) -> Vec<AudioMessage> {
        self.rx_msg.try_iter().collect()
    }

    /// Ask the mixer to stop and drop every playback.
    pub fn shutdown(&self) {
        let _ = self.tx_cmd.send(AudioCmd::Shutdown);
    }
}
