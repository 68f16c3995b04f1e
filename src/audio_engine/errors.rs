//! Audio-specific error types.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while loading a single audio file.
#[derive(Debug, Error)]
pub enum SampleLoadError {
    /// Failed to open the audio file.
    #[error("failed to open file: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to decode the audio file.
    #[error("failed to decode audio file: {0}")]
    Decode(#[from] symphonia::core::errors::Error),

    /// Audio file has no default track.
    #[error("audio file has no default track")]
    NoDefaultTrack,

    /// Audio file is missing channel information.
    #[error("audio file is missing channel information")]
    MissingChannels,

    /// Only mono files can be loaded into the bank.
    #[error("not a mono file: found {channels} channels")]
    NotMono {
        /// Number of channels in the source file.
        channels: usize,
    },

    /// Audio file contains no frames.
    #[error("audio file contains no frames")]
    Empty,
}

/// Errors that abort building the sample bank.
#[derive(Debug, Error)]
pub enum SampleBankError {
    /// One of the bank's files could not be loaded.
    #[error("couldn't load {}: {source}", path.display())]
    Load {
        path: PathBuf,
        #[source]
        source: SampleLoadError,
    },

    /// A buffer handed to the bank has no frames.
    #[error("sound {id} has no frames")]
    EmptyBuffer { id: usize },

    /// The bank would hold no sounds at all.
    #[error("sample bank is empty")]
    Empty,
}

/// Errors raised while opening or starting the output stream.
#[derive(Debug, Error)]
pub enum StreamError {
    #[error("no audio output device found")]
    NoDevice,

    #[error("no default output config: {0}")]
    DefaultConfig(#[from] cpal::DefaultStreamConfigError),

    #[error("failed to create audio stream: {0}")]
    Build(#[from] cpal::BuildStreamError),

    #[error("failed to start audio stream: {0}")]
    Play(#[from] cpal::PlayStreamError),
}
