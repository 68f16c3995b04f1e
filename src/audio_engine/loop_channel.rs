//! The looping playback cursor.
//!
//! Unlike pooled voices, the loop wraps to the start of its sound instead of
//! ending, and restarts from the beginning every time it is switched on.

use crate::audio_engine::sample_bank::SampleBank;

#[derive(Debug, Clone)]
pub struct LoopChannel {
    enabled: bool,
    sample_id: usize,
    frame_pos: usize,
}

impl LoopChannel {
    /// Creates a disabled loop over sound `sample_id`.
    pub fn new(sample_id: usize) -> Self {
        Self {
            enabled: false,
            sample_id,
            frame_pos: 0,
        }
    }

    /// Flips the loop on or off and returns the new state.
    ///
    /// Switching on always rewinds to frame 0.
    pub fn toggle(&mut self) -> bool {
        self.enabled = !self.enabled;
        if self.enabled {
            self.frame_pos = 0;
        }
        self.enabled
    }

    /// Returns the current frame and advances, wrapping at the end of the
    /// sound. Produces silence while disabled.
    pub fn tick(&mut self, bank: &SampleBank) -> f32 {
        if !self.enabled {
            return 0.0;
        }

        let Some(samples) = bank.buffer(self.sample_id) else {
            return 0.0;
        };

        let out = samples.get(self.frame_pos).copied().unwrap_or(0.0);
        self.frame_pos += 1;
        if self.frame_pos >= samples.len() {
            self.frame_pos = 0;
        }
        out
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn position(&self) -> usize {
        self.frame_pos
    }
}
