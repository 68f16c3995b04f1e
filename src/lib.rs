//! Polyphonic sample-trigger engine for a button, sensor and speaker rig.
//!
//! Sounds are loaded into a [`SampleBank`](audio_engine::SampleBank) at
//! startup; the [`RtMixer`](audio_engine::RtMixer) then turns debounced
//! control input into loop and bubble playback one frame at a time.

pub mod audio_engine;
pub mod config;
pub mod messages;

pub use audio_engine::{RtMixer, SampleBank};
pub use config::EngineConfig;
