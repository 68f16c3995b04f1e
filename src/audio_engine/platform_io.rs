//! Per-frame digital and audio I/O seen by the mixer.
//!
//! The mixer only ever reads a digital level for a frame and writes one sample
//! per output channel for that frame. [`PlatformIo`] captures exactly that, so
//! the same render path drives the cpal callback and offline buffers.

use crate::audio_engine::constants::NUM_DIGITAL_PINS;

/// Logic level of a digital pin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Level {
    #[default]
    Low,
    High,
}

impl Level {
    pub fn toggled(self) -> Self {
        match self {
            Level::Low => Level::High,
            Level::High => Level::Low,
        }
    }
}

impl From<bool> for Level {
    fn from(high: bool) -> Self {
        if high { Level::High } else { Level::Low }
    }
}

/// One block of frames exchanged with the platform.
pub trait PlatformIo {
    /// Number of frames in this block.
    fn frames(&self) -> usize;

    /// Level of digital input `pin` at `frame`.
    fn digital_read(&self, frame: usize, pin: usize) -> Level;

    /// Drives digital output `pin` from `frame` onwards.
    fn digital_write(&mut self, frame: usize, pin: usize, level: Level);

    /// Writes one output sample. Channels the platform lacks are ignored.
    fn audio_write(&mut self, frame: usize, channel: usize, value: f32);

    /// Called once `frame` has been fully rendered.
    fn frame_done(&mut self, _frame: usize) {}
}

/// Simulated digital inputs for hosts without GPIO.
///
/// A pin either rests at a level or is held at a pulse level for a fixed
/// number of frames before returning to rest.
#[derive(Debug, Clone)]
pub struct SimulatedPins {
    rest: [Level; NUM_DIGITAL_PINS],
    pulse: [Option<(Level, usize)>; NUM_DIGITAL_PINS],
}

impl SimulatedPins {
    pub fn new(rest: [Level; NUM_DIGITAL_PINS]) -> Self {
        Self {
            rest,
            pulse: [None; NUM_DIGITAL_PINS],
        }
    }

    /// Sets the resting level of `pin`, cancelling any pulse on it.
    pub fn set(&mut self, pin: usize, level: Level) {
        if let Some(rest) = self.rest.get_mut(pin) {
            *rest = level;
            self.pulse[pin] = None;
        }
    }

    /// Holds `pin` at `level` for the next `frames` frames.
    pub fn pulse(&mut self, pin: usize, level: Level, frames: usize) {
        if let Some(pulse) = self.pulse.get_mut(pin) {
            *pulse = (frames > 0).then_some((level, frames));
        }
    }

    /// Current level of `pin`.
    pub fn level(&self, pin: usize) -> Level {
        match self.pulse.get(pin) {
            Some(Some((level, _))) => *level,
            Some(None) => self.rest[pin],
            None => Level::Low,
        }
    }

    /// Advances all pulses by one frame.
    pub fn advance(&mut self) {
        for pulse in &mut self.pulse {
            if let Some((_, remaining)) = pulse.as_mut() {
                *remaining = remaining.saturating_sub(1);
            }
            if matches!(pulse, Some((_, 0))) {
                *pulse = None;
            }
        }
    }
}

/// Offline I/O backed by plain buffers.
///
/// Inputs are scripted per frame and outputs are captured, which makes
/// whole render blocks inspectable without audio hardware.
#[derive(Debug, Clone)]
pub struct BufferIo {
    inputs: Vec<[Level; NUM_DIGITAL_PINS]>,
    /// Only the frames an output was written on; reads carry the last write forward.
    digital_out: Vec<[Option<Level>; NUM_DIGITAL_PINS]>,
    audio_out: Vec<Vec<f32>>,
}

impl BufferIo {
    /// Creates a block with one scripted input row per frame.
    pub fn from_inputs(inputs: Vec<[Level; NUM_DIGITAL_PINS]>, channels: usize) -> Self {
        let frames = inputs.len();
        Self {
            digital_out: vec![[None; NUM_DIGITAL_PINS]; frames],
            audio_out: vec![vec![0.0; frames]; channels],
            inputs,
        }
    }

    /// Captured samples of `channel`.
    pub fn channel(&self, channel: usize) -> &[f32] {
        self.audio_out.get(channel).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Level of output `pin` at `frame`: the most recent write at or before
    /// `frame`, or low if it was never driven.
    pub fn digital_output(&self, frame: usize, pin: usize) -> Level {
        let end = frame.saturating_add(1).min(self.digital_out.len());
        self.digital_out[..end]
            .iter()
            .rev()
            .find_map(|row| row.get(pin).copied().flatten())
            .unwrap_or_default()
    }
}

impl PlatformIo for BufferIo {
    fn frames(&self) -> usize {
        self.inputs.len()
    }

    fn digital_read(&self, frame: usize, pin: usize) -> Level {
        self.inputs
            .get(frame)
            .and_then(|row| row.get(pin))
            .copied()
            .unwrap_or_default()
    }

    fn digital_write(&mut self, frame: usize, pin: usize, level: Level) {
        if let Some(slot) = self
            .digital_out
            .get_mut(frame)
            .and_then(|row| row.get_mut(pin))
        {
            *slot = Some(level);
        }
    }

    fn audio_write(&mut self, frame: usize, channel: usize, value: f32) {
        if let Some(sample) = self
            .audio_out
            .get_mut(channel)
            .and_then(|samples| samples.get_mut(frame))
        {
            *sample = value;
        }
    }
}
