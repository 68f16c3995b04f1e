//! Immutable bank of pre-loaded mono sounds.
//!
//! The bank is built once before the output stream starts and only read from
//! the audio callback afterwards.

use std::sync::Arc;

use crate::audio_engine::errors::SampleBankError;

/// A decoded mono sound.
#[derive(Debug, Clone)]
pub struct SampleBuffer {
    /// Normalised amplitude values, one per frame.
    pub samples: Arc<[f32]>,

    /// Sample rate of the source file in Hz, when known.
    pub sample_rate: Option<u32>,
}

impl SampleBuffer {
    pub fn new(samples: Vec<f32>, sample_rate: Option<u32>) -> Self {
        Self {
            samples: Arc::from(samples.into_boxed_slice()),
            sample_rate,
        }
    }

    /// Number of frames in the buffer.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

/// Fully populated set of sounds, indexed `0..len()`.
///
/// Every buffer holds at least one frame.
#[derive(Debug, Clone)]
pub struct SampleBank {
    buffers: Vec<SampleBuffer>,
}

impl SampleBank {
    /// Builds a bank from already decoded buffers.
    pub fn new(buffers: Vec<SampleBuffer>) -> Result<Self, SampleBankError> {
        if buffers.is_empty() {
            return Err(SampleBankError::Empty);
        }

        if let Some(id) = buffers.iter().position(SampleBuffer::is_empty) {
            return Err(SampleBankError::EmptyBuffer { id });
        }

        Ok(Self { buffers })
    }

    /// Convenience constructor for in-memory sounds without a known rate.
    pub fn from_samples<I>(sounds: I) -> Result<Self, SampleBankError>
    where
        I: IntoIterator<Item = Vec<f32>>,
    {
        Self::new(
            sounds
                .into_iter()
                .map(|samples| SampleBuffer::new(samples, None))
                .collect(),
        )
    }

    /// Amplitude values of sound `id`, if it exists.
    pub fn buffer(&self, id: usize) -> Option<&[f32]> {
        self.buffers.get(id).map(|buffer| &*buffer.samples)
    }

    /// Frame count of sound `id`, or 0 if it doesn't exist.
    pub fn length(&self, id: usize) -> usize {
        self.buffers.get(id).map_or(0, SampleBuffer::len)
    }

    /// Number of sounds in the bank.
    pub fn len(&self) -> usize {
        self.buffers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffers.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SampleBuffer> {
        self.buffers.iter()
    }
}
