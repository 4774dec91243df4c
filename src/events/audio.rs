use crate::events::Sender;
use crate::synth::playback::PlaybackInstance;

/// Commands sent *to* the mixer on the audio side.
#[derive(Debug)]
pub enum AudioCmd {
    /// Start mixing a playback instance.
    Play(PlaybackInstance),
    /// Stop every instance started by `owner`, without reporting them finished.
    StopOwner { owner: Sender },
    StopAll,
    Shutdown,
}

/// Messages sent *back* from the mixer.
#[derive(Debug, Clone, PartialEq)]
pub enum AudioMessage {
    /// An instance played through its whole duration and was retired.
    /// `generation` is the owner's reset generation when it was started.
    SoundFinished {
        id: String,
        owner: Sender,
        generation: u32,
    },
}
