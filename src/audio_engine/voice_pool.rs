//! Fixed-capacity pool of one-shot voices.
//!
//! Slots are allocated up front and reused; triggering, advancing and freeing
//! voices never touches the allocator. Allocation is a linear first-free scan,
//! so it costs O(capacity) rather than O(1).

use crate::audio_engine::sample_bank::SampleBank;

/// One playback slot in the pool.
///
/// While `active`, `frame_pos < bank.length(sample_id)`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VoiceSlot {
    pub active: bool,
    pub sample_id: usize,
    pub frame_pos: usize,
}

impl VoiceSlot {
    pub fn start(&mut self, sample_id: usize) {
        self.active = true;
        self.sample_id = sample_id;
        self.frame_pos = 0;
    }

    pub fn stop(&mut self) {
        self.active = false;
        self.sample_id = 0;
        self.frame_pos = 0;
    }
}

/// Polyphonic voice storage with a drop-new overflow policy.
#[derive(Debug, Clone)]
pub struct VoicePool {
    slots: Box<[VoiceSlot]>,
}

impl VoicePool {
    /// Creates a pool with `capacity` inactive slots.
    pub fn new(capacity: usize) -> Self {
        Self {
            slots: vec![VoiceSlot::default(); capacity].into_boxed_slice(),
        }
    }

    /// Starts `sample_id` in the lowest-index free slot.
    ///
    /// Returns the claimed slot, or `None` when every slot is busy. A dropped
    /// request leaves the pool untouched and is never retried.
    pub fn allocate(&mut self, sample_id: usize) -> Option<usize> {
        let (index, slot) = self
            .slots
            .iter_mut()
            .enumerate()
            .find(|(_, slot)| !slot.active)?;

        slot.start(sample_id);
        Some(index)
    }

    /// Reads one frame from every active voice and returns their sum.
    ///
    /// Each voice reads at its position, then advances. A voice that reaches
    /// the end of its buffer is freed in the same step and never wraps.
    pub fn advance_all(&mut self, bank: &SampleBank) -> f32 {
        let mut out = 0.0;

        for voice in self.slots.iter_mut().filter(|slot| slot.active) {
            let Some(samples) = bank.buffer(voice.sample_id) else {
                voice.stop();
                continue;
            };

            if let Some(sample) = samples.get(voice.frame_pos) {
                out += *sample;
            }

            voice.frame_pos += 1;
            if voice.frame_pos >= samples.len() {
                voice.stop();
            }
        }

        out
    }

    /// Frees every slot.
    pub fn reset_all(&mut self) {
        for voice in self.slots.iter_mut() {
            voice.stop();
        }
    }

    pub fn active_count(&self) -> usize {
        self.slots.iter().filter(|slot| slot.active).count()
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn slots(&self) -> &[VoiceSlot] {
        &self.slots
    }
}
