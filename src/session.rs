//! Side-effect channel towards the host
//!
//! The engine never renders or plays anything itself. Everything it wants
//! the outside world to do goes through a [`Tunnel`]: state snapshots for
//! the presentation layer and named cues for the audio collaborator.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::UpdateMessage;

/// Named audio cues the engine asks the host to play
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display)]
#[serde(rename_all = "kebab-case")]
pub enum AudioCue {
    /// Background music that runs for the length of a round
    #[display("round-start-music")]
    RoundStartMusic,
    /// One-off sound marking the end of a round
    #[display("round-end-sound")]
    RoundEndSound,
    /// Pause the round music
    #[display("pause-music")]
    PauseMusic,
    /// Resume the paused round music
    #[display("resume-music")]
    ResumeMusic,
    /// Stop the round music
    #[display("stop-music")]
    StopMusic,
}

/// Failure reported by the host while playing a cue
#[derive(Debug, Clone, Error)]
pub enum CueError {
    /// The host environment refused playback (autoplay rules, muted tab)
    #[error("playback of `{0}` was denied")]
    Denied(AudioCue),
    /// The cue could not be played for another reason
    #[error("playback of `{cue}` failed: {reason}")]
    Failed {
        /// The cue that failed
        cue: AudioCue,
        /// Host supplied description
        reason: String,
    },
}

/// Trait for sending requests to the presentation and audio collaborators
///
/// Implementations decide how messages reach the screen (direct call,
/// channel, WebSocket) and how cues map to sound files.
pub trait Tunnel {
    /// Sends an update message to the presentation layer
    ///
    /// # Arguments
    ///
    /// * `message` - The update message to send
    fn send_message(&self, message: &UpdateMessage);

    /// Asks the audio collaborator to act on a cue
    ///
    /// # Errors
    ///
    /// Returns a [`CueError`] when playback fails. The engine logs the
    /// error and carries on.
    fn play_cue(&self, cue: AudioCue) -> Result<(), CueError>;
}

/// Issues a cue and swallows playback failures
pub(crate) fn request_cue<T: Tunnel>(tunnel: &T, cue: AudioCue) {
    if let Err(error) = tunnel.play_cue(cue) {
        tracing::warn!(%cue, %error, "audio cue failed");
    }
}
