//! Audio engine configuration constants and limits.

use std::ops::RangeInclusive;

/// Number of sounds in the sample bank (`magic0.wav` .. `magic7.wav`).
pub const NUMBER_OF_SOUNDS: usize = 8;

/// Maximum number of bubble voices that can sound simultaneously.
pub const MAX_VOICES: usize = 10;

/// Sound played by the loop channel.
pub const LOOP_SELECTION: usize = 0;

/// Sounds a sensor hit picks from. Sound 0 is reserved for the loop.
pub const BUBBLE_SOUNDS: RangeInclusive<usize> = 1..=7;

/// Consecutive active sensor frames needed for one hit.
pub const DWELL_THRESHOLD: u32 = 10_000;

/// Attenuation applied when the loop and bubble mode sound together.
pub const COMBINED_GAIN: f32 = 0.5;

/// Frames per audio callback block.
pub const BLOCK_SIZE: u32 = 512;

/// Capacity of both real-time message ring buffers.
pub const MESSAGE_QUEUE_CAPACITY: usize = 1024;

/// Peak that float-encoded samples are normalised to.
pub const NORMALIZE_CEILING: f32 = 32_700.0 / 32_768.0;

/// Below this peak a float-encoded sample is left unscaled.
pub const SILENCE_THRESHOLD: f64 = 1e-10;

/// Digital input wired to the loop button.
pub const LOOP_BUTTON_PIN: usize = 0;

/// Digital input wired to the bubble-mode button.
pub const BUBBLE_BUTTON_PIN: usize = 1;

/// Digital input wired to the infrared bubble sensor.
pub const SENSOR_PIN: usize = 2;

/// Digital output driving the indicator LED.
pub const INDICATOR_PIN: usize = 3;

/// Number of simulated digital pins.
pub const NUM_DIGITAL_PINS: usize = 4;

/// Output channels the mono mix is duplicated to.
pub const OUTPUT_CHANNELS: usize = 2;
