//! Message definitions for communication between the control thread and the
//! real-time audio thread.
//!
//! This module defines the enums that serve as the wire format for messages passed through the
//! ring buffers between the control thread and the audio callback.

use crate::audio_engine::platform_io::Level;

/// Message that is emitted from the audio thread.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AudioMessage {
    /// Response to a Ping message.
    Pong,

    /// The loop channel was switched on or off.
    LoopToggled(bool),

    /// Bubble mode was switched on or off.
    BubbleModeToggled(bool),

    /// A sensor hit started a voice.
    ///
    /// # Parameters
    /// * `slot` - Voice slot that was claimed
    /// * `sound` - Sound being played
    VoiceStarted { slot: usize, sound: usize },

    /// A sensor hit found every voice slot busy and was dropped.
    VoiceDropped { sound: usize },
}

/// Message that is emitted from the control thread.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ControlMessage {
    /// Used for testing message passing functionality.
    Ping,

    /// Rest a simulated digital input at `level`.
    SetInput { pin: usize, level: Level },

    /// Hold a simulated digital input at `level` for `frames` frames.
    Pulse {
        pin: usize,
        level: Level,
        frames: usize,
    },

    /// Stop every bubble voice.
    ResetVoices,
}
