//! Real-time mixer implementation.
//!
//! This module provides the [`RtMixer`] struct, the per-frame orchestrator of the
//! engine. For every frame it reads the controls, runs edge and dwell detection,
//! fires voices, advances the [`LoopChannel`] and the [`VoicePool`], and writes a
//! mono mix duplicated to both output channels.
//!
//! All state is owned by the mixer and mutated only from the render path. A
//! frame performs no allocation, no blocking calls and at most O(voices) work.

use std::ops::RangeInclusive;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::audio_engine::constants::{
    BUBBLE_BUTTON_PIN, COMBINED_GAIN, INDICATOR_PIN, LOOP_BUTTON_PIN, OUTPUT_CHANNELS, SENSOR_PIN,
};
use crate::audio_engine::debounce::{ButtonDebouncer, ButtonEvent, DwellDetector};
use crate::audio_engine::loop_channel::LoopChannel;
use crate::audio_engine::platform_io::{Level, PlatformIo};
use crate::audio_engine::sample_bank::SampleBank;
use crate::audio_engine::voice_pool::VoicePool;
use crate::config::EngineConfig;
use crate::messages::AudioMessage;

/// Raw control levels sampled for one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameInputs {
    pub loop_button: Level,
    pub bubble_button: Level,
    pub sensor: Level,
}

impl FrameInputs {
    pub fn read<I: PlatformIo + ?Sized>(io: &I, frame: usize) -> Self {
        Self {
            loop_button: io.digital_read(frame, LOOP_BUTTON_PIN),
            bubble_button: io.digital_read(frame, BUBBLE_BUTTON_PIN),
            sensor: io.digital_read(frame, SENSOR_PIN),
        }
    }
}

/// Result of rendering one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameOutput {
    /// Mono sample written to every output channel.
    pub sample: f32,

    /// Indicator level, mirroring whether the loop button is held.
    pub indicator: Level,
}

/// Real-time mixer owning every piece of engine state.
///
/// `R` picks which sound a sensor hit plays; inject a seeded generator for
/// reproducible runs.
pub struct RtMixer<R = StdRng> {
    bank: SampleBank,
    voices: VoicePool,
    loop_channel: LoopChannel,
    loop_button: ButtonDebouncer,
    bubble_button: ButtonDebouncer,
    sensor: DwellDetector,
    bubble_mode: bool,
    bubble_sounds: RangeInclusive<usize>,
    rng: R,
}

impl RtMixer<StdRng> {
    /// Creates a mixer seeded from `config.seed`, or from entropy if unset.
    pub fn from_config(config: &EngineConfig, bank: SampleBank) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self::new(config, bank, rng)
    }
}

impl<R: Rng> RtMixer<R> {
    /// Creates a mixer over `bank`.
    ///
    /// `config` is expected to have passed [`EngineConfig::validate`] against a
    /// bank of the same size.
    pub fn new(config: &EngineConfig, bank: SampleBank, rng: R) -> Self {
        Self {
            bank,
            voices: VoicePool::new(config.max_voices),
            loop_channel: LoopChannel::new(config.loop_selection),
            loop_button: ButtonDebouncer::new(config.button_active_level),
            bubble_button: ButtonDebouncer::new(config.button_active_level),
            sensor: DwellDetector::new(config.sensor_active_level, config.dwell_threshold),
            bubble_mode: false,
            bubble_sounds: config.bubble_sounds.clone(),
            rng,
        }
    }

    /// Renders one frame from its raw inputs.
    ///
    /// State changes are reported through `notify`, which must not block.
    pub fn process_frame<F>(&mut self, inputs: FrameInputs, notify: &mut F) -> FrameOutput
    where
        F: FnMut(AudioMessage),
    {
        if self.loop_button.process(inputs.loop_button) == Some(ButtonEvent::Pressed) {
            notify(AudioMessage::LoopToggled(self.loop_channel.toggle()));
        }

        if self.bubble_button.process(inputs.bubble_button) == Some(ButtonEvent::Pressed) {
            self.bubble_mode = !self.bubble_mode;
            notify(AudioMessage::BubbleModeToggled(self.bubble_mode));
        }

        let indicator = Level::from(self.loop_button.is_active(inputs.loop_button));

        let loop_enabled = self.loop_channel.is_enabled();
        if !loop_enabled && !self.bubble_mode {
            return FrameOutput {
                sample: 0.0,
                indicator,
            };
        }

        let mut out = 0.0;

        if loop_enabled {
            out += self.loop_channel.tick(&self.bank);
        }

        if self.bubble_mode {
            if self.sensor.process(inputs.sensor) && !self.bubble_sounds.is_empty() {
                let sound = self.rng.gen_range(self.bubble_sounds.clone());
                match self.voices.allocate(sound) {
                    Some(slot) => notify(AudioMessage::VoiceStarted { slot, sound }),
                    None => notify(AudioMessage::VoiceDropped { sound }),
                }
            }

            out += self.voices.advance_all(&self.bank);
        }

        let gain = if loop_enabled && self.bubble_mode {
            COMBINED_GAIN
        } else {
            1.0
        };

        FrameOutput {
            sample: out * gain,
            indicator,
        }
    }

    /// Renders every frame of an I/O block.
    pub fn render<I, F>(&mut self, io: &mut I, mut notify: F)
    where
        I: PlatformIo + ?Sized,
        F: FnMut(AudioMessage),
    {
        for frame in 0..io.frames() {
            let inputs = FrameInputs::read(io, frame);
            let output = self.process_frame(inputs, &mut notify);

            io.digital_write(frame, INDICATOR_PIN, output.indicator);
            for channel in 0..OUTPUT_CHANNELS {
                io.audio_write(frame, channel, output.sample);
            }
            io.frame_done(frame);
        }
    }

    /// Stops every bubble voice.
    pub fn reset_voices(&mut self) {
        self.voices.reset_all();
    }

    pub fn is_loop_enabled(&self) -> bool {
        self.loop_channel.is_enabled()
    }

    pub fn is_bubble_mode(&self) -> bool {
        self.bubble_mode
    }

    pub fn is_playing(&self) -> bool {
        self.is_loop_enabled() || self.bubble_mode
    }

    pub fn voices(&self) -> &VoicePool {
        &self.voices
    }

    pub fn loop_channel(&self) -> &LoopChannel {
        &self.loop_channel
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio_engine::constants::NUM_DIGITAL_PINS;
    use crate::audio_engine::platform_io::BufferIo;

    use crate::audio_engine::platform_io::Level::{High, Low};

    /// Pin row for one frame: loop button, bubble button, sensor.
    fn row(loop_button: Level, bubble_button: Level, sensor: Level) -> [Level; NUM_DIGITAL_PINS] {
        let mut pins = [High; NUM_DIGITAL_PINS];
        pins[LOOP_BUTTON_PIN] = loop_button;
        pins[BUBBLE_BUTTON_PIN] = bubble_button;
        pins[SENSOR_PIN] = sensor;
        pins
    }

    fn config(sounds: usize, bubble_sounds: RangeInclusive<usize>, dwell: u32) -> EngineConfig {
        EngineConfig {
            sound_count: sounds,
            max_voices: 4,
            loop_selection: 0,
            bubble_sounds,
            dwell_threshold: dwell,
            seed: Some(1),
            ..Default::default()
        }
    }

    fn mixer(bank: SampleBank, config: &EngineConfig) -> RtMixer {
        RtMixer::from_config(config, bank)
    }

    fn run<R: Rng>(
        mixer: &mut RtMixer<R>,
        rows: Vec<[Level; NUM_DIGITAL_PINS]>,
    ) -> (BufferIo, Vec<AudioMessage>) {
        let mut io = BufferIo::from_inputs(rows, OUTPUT_CHANNELS);
        let mut messages = Vec::new();
        mixer.render(&mut io, |msg| messages.push(msg));
        (io, messages)
    }

    fn assert_samples(actual: &[f32], expected: &[f32]) {
        assert_eq!(actual.len(), expected.len());
        for (a, e) in actual.iter().zip(expected) {
            assert!((a - e).abs() < 1e-6, "got {actual:?}, expected {expected:?}");
        }
    }

    #[test]
    fn test_idle_is_silent() {
        let bank = SampleBank::from_samples([vec![0.9; 4], vec![0.9; 4]]).unwrap();
        let config = config(2, 1..=1, 1);
        let mut mixer = mixer(bank, &config);

        // Sensor active the whole time, but nothing is enabled.
        let (io, messages) = run(&mut mixer, vec![row(High, High, Low); 16]);

        assert!(io.channel(0).iter().all(|&s| s == 0.0));
        assert!(io.channel(1).iter().all(|&s| s == 0.0));
        assert!(messages.is_empty());
        assert_eq!(mixer.voices().active_count(), 0);
        assert!(!mixer.is_playing());
    }

    #[test]
    fn test_loop_plays_and_wraps() {
        let bank = SampleBank::from_samples([vec![0.2, 0.4, 0.6], vec![0.0]]).unwrap();
        let config = config(2, 1..=1, 1);
        let mut mixer = mixer(bank, &config);

        let mut rows = vec![row(High, High, High)];
        rows.extend(vec![row(Low, High, High); 4]);
        let (io, messages) = run(&mut mixer, rows);

        assert_samples(io.channel(0), &[0.0, 0.2, 0.4, 0.6, 0.2]);
        assert_samples(io.channel(1), &[0.0, 0.2, 0.4, 0.6, 0.2]);
        assert_eq!(messages, vec![AudioMessage::LoopToggled(true)]);
        assert_eq!(mixer.loop_channel().position(), 1);
    }

    #[test]
    fn test_loop_toggle_off_and_restart() {
        let bank = SampleBank::from_samples([vec![0.1, 0.2, 0.3], vec![0.0]]).unwrap();
        let config = config(2, 1..=1, 1);
        let mut mixer = mixer(bank, &config);

        let rows = vec![
            row(High, High, High),
            row(Low, High, High),  // on: 0.1
            row(High, High, High), // 0.2
            row(Low, High, High),  // off
            row(High, High, High),
            row(Low, High, High), // on again, restarts: 0.1
        ];
        let (io, messages) = run(&mut mixer, rows);

        assert_samples(io.channel(0), &[0.0, 0.1, 0.2, 0.0, 0.0, 0.1]);
        assert_eq!(
            messages,
            vec![
                AudioMessage::LoopToggled(true),
                AudioMessage::LoopToggled(false),
                AudioMessage::LoopToggled(true),
            ]
        );
    }

    #[test]
    fn test_bubble_voice_plays_once() {
        let bank = SampleBank::from_samples([vec![0.0], vec![1.0, 1.0]]).unwrap();
        let config = config(2, 1..=1, 1);
        let mut mixer = mixer(bank, &config);

        let rows = vec![
            row(High, High, High),
            row(High, Low, High), // bubble mode on
            row(High, Low, Low),  // sensor hit
            row(High, Low, High),
            row(High, Low, High),
            row(High, Low, High),
        ];
        let (io, messages) = run(&mut mixer, rows);

        assert_samples(io.channel(0), &[0.0, 0.0, 1.0, 1.0, 0.0, 0.0]);
        assert_eq!(
            messages,
            vec![
                AudioMessage::BubbleModeToggled(true),
                AudioMessage::VoiceStarted { slot: 0, sound: 1 },
            ]
        );
        assert_eq!(mixer.voices().active_count(), 0);
    }

    #[test]
    fn test_loop_and_bubbles_are_attenuated() {
        let bank = SampleBank::from_samples([vec![1.0; 8], vec![1.0, 1.0]]).unwrap();
        let config = config(2, 1..=1, 1);
        let mut mixer = mixer(bank, &config);

        let rows = vec![
            row(High, High, High),
            row(Low, Low, Low), // both on, sensor hit
            row(Low, Low, High),
            row(Low, Low, High),
        ];
        let (io, _) = run(&mut mixer, rows);

        // (1.0 + 1.0) * 0.5 while the voice sounds, then the loop alone at half gain.
        assert_samples(io.channel(0), &[0.0, 1.0, 1.0, 0.5]);
    }

    #[test]
    fn test_dwell_only_counts_in_bubble_mode() {
        let bank = SampleBank::from_samples([vec![0.0], vec![1.0; 4]]).unwrap();
        let config = config(2, 1..=1, 3);
        let mut mixer = mixer(bank, &config);

        let mut rows = vec![row(High, High, Low); 5];
        rows.push(row(High, Low, Low)); // bubble mode on, count 1
        rows.push(row(High, Low, Low)); // count 2
        rows.push(row(High, Low, Low)); // count 3: hit
        let (io, messages) = run(&mut mixer, rows);

        assert_samples(io.channel(0), &[0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 1.0]);
        assert_eq!(messages.len(), 2);
    }

    #[test]
    fn test_full_pool_drops_hits() {
        let bank = SampleBank::from_samples([vec![0.0], vec![0.25; 16]]).unwrap();
        let config = EngineConfig {
            max_voices: 2,
            ..config(2, 1..=1, 1)
        };
        let mut mixer = mixer(bank, &config);

        let mut rows = vec![row(High, High, High), row(High, Low, High)];
        rows.extend(vec![row(High, Low, Low); 3]);
        let (io, messages) = run(&mut mixer, rows);

        assert_eq!(
            &messages[1..],
            &[
                AudioMessage::VoiceStarted { slot: 0, sound: 1 },
                AudioMessage::VoiceStarted { slot: 1, sound: 1 },
                AudioMessage::VoiceDropped { sound: 1 },
            ]
        );
        // The dropped hit doesn't disturb voices already playing.
        assert_samples(io.channel(0), &[0.0, 0.0, 0.25, 0.5, 0.5]);
        assert_eq!(mixer.voices().active_count(), 2);
    }

    #[test]
    fn test_indicator_mirrors_loop_button() {
        let bank = SampleBank::from_samples([vec![0.0], vec![0.0]]).unwrap();
        let config = config(2, 1..=1, 1);
        let mut mixer = mixer(bank, &config);

        let rows = vec![
            row(High, High, High),
            row(Low, High, High),
            row(High, High, High),
        ];
        let (io, _) = run(&mut mixer, rows);

        assert_eq!(io.digital_output(0, INDICATOR_PIN), Low);
        assert_eq!(io.digital_output(1, INDICATOR_PIN), High);
        assert_eq!(io.digital_output(2, INDICATOR_PIN), Low);
    }

    #[test]
    fn test_seeded_sound_selection_is_reproducible() {
        let sounds: Vec<Vec<f32>> = (0..4).map(|_| vec![0.0; 64]).collect();
        let config = EngineConfig {
            max_voices: 32,
            ..config(4, 1..=3, 1)
        };

        let picks = |seed: u64| {
            let bank = SampleBank::from_samples(sounds.clone()).unwrap();
            let mut mixer = RtMixer::new(&config, bank, StdRng::seed_from_u64(seed));
            let mut rows = vec![row(High, High, High), row(High, Low, High)];
            rows.extend(vec![row(High, Low, Low); 20]);
            let (_, messages) = run(&mut mixer, rows);
            messages
                .into_iter()
                .filter_map(|msg| match msg {
                    AudioMessage::VoiceStarted { sound, .. } => Some(sound),
                    _ => None,
                })
                .collect::<Vec<_>>()
        };

        let first = picks(42);
        assert_eq!(first.len(), 20);
        assert!(first.iter().all(|sound| (1..=3).contains(sound)));
        assert_eq!(first, picks(42));
    }

    #[test]
    fn test_reset_voices() {
        let bank = SampleBank::from_samples([vec![0.0], vec![1.0; 16]]).unwrap();
        let config = config(2, 1..=1, 1);
        let mut mixer = mixer(bank, &config);

        run(
            &mut mixer,
            vec![row(High, High, High), row(High, Low, Low), row(High, Low, Low)],
        );
        assert_eq!(mixer.voices().active_count(), 2);

        mixer.reset_voices();
        assert_eq!(mixer.voices().active_count(), 0);
    }
}
