//! Audio Engine Module
//!
//! This module provides the real-time sample-trigger engine. It is organized
//! into sub-modules, each with a specific responsibility:
//!
//! - [`audio_stream`]: CPAL audio stream management and real-time callback
//! - [`constants`]: Configuration constants and limits
//! - [`errors`]: Audio-specific error types
//! - [`sample_bank`]: Immutable store of pre-loaded sounds
//! - [`sample_loader`]: Audio file loading and decoding
//! - [`debounce`]: Edge and dwell detection on raw digital inputs
//! - [`voice_pool`]: Fixed-capacity one-shot voices
//! - [`loop_channel`]: The wrapping loop cursor
//! - [`platform_io`]: Per-frame digital and audio I/O
//! - [`mixer`]: Real-time per-frame orchestration
//!
//! The [`RtMixer`] owns every piece of engine state and is moved into the
//! audio callback once the [`SampleBank`] has been fully loaded.

pub mod audio_stream;
pub mod constants;
pub mod debounce;
pub mod errors;
pub mod loop_channel;
pub mod mixer;
pub mod platform_io;
pub mod sample_bank;
pub mod sample_loader;
pub mod voice_pool;

pub use audio_stream::{AudioStreamHandle, create_audio_stream, setup_logger, start_stream};
pub use errors::{SampleBankError, SampleLoadError, StreamError};
pub use mixer::{FrameInputs, FrameOutput, RtMixer};
pub use platform_io::{BufferIo, Level, PlatformIo};
pub use sample_bank::{SampleBank, SampleBuffer};
pub use sample_loader::load_sample_bank;
