//! # Audio Cues
//!
//! The core never synthesizes or plays sound itself; it asks an `AudioSink` supplied by
//! the embedding engine to play a named cue on a channel.

use serde::{Deserialize, Serialize};

/// Sounds the game logic can trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SoundCue {
    /// Movement was blocked by a wall or the level edge
    Collide,
    /// Level jingle
    Level,
}

impl SoundCue {
    /// Name the engine registers the sound under.
    pub fn name(self) -> &'static str {
        match self {
            SoundCue::Collide => "collide",
            SoundCue::Level => "level",
        }
    }

    /// Channel the game logic plays this cue on.
    pub fn channel(self) -> u8 {
        match self {
            SoundCue::Collide => 0,
            SoundCue::Level => 1,
        }
    }
}

/// Receives sound requests from the game logic.
pub trait AudioSink {
    /// Plays `cue` on `channel`.
    fn play(&mut self, cue: SoundCue, channel: u8);
}

/// Discards every request.
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentAudio;

impl AudioSink for SilentAudio {
    fn play(&mut self, _cue: SoundCue, _channel: u8) {}
}

/// Records requests in order, which is what headless runs and tests want.
impl AudioSink for Vec<(SoundCue, u8)> {
    fn play(&mut self, cue: SoundCue, channel: u8) {
        self.push((cue, channel));
    }
}
