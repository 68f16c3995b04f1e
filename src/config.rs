//! Engine configuration and its validation.
//!
//! Everything here is checked once at startup, before any sample is loaded, so
//! the render path can index sounds without runtime checks.

use std::ops::RangeInclusive;
use std::path::PathBuf;

use thiserror::Error;

use crate::audio_engine::constants::{
    BLOCK_SIZE, BUBBLE_SOUNDS, DWELL_THRESHOLD, LOOP_SELECTION, MAX_VOICES, NUMBER_OF_SOUNDS,
};
use crate::audio_engine::platform_io::Level;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("sound count must be at least 1")]
    NoSounds,

    #[error("voice count must be at least 1")]
    NoVoices,

    #[error("dwell threshold must be at least 1 frame")]
    ZeroDwell,

    #[error("block size must be at least 1 frame")]
    ZeroBlockSize,

    #[error("loop sound {selection} is out of range (expected 0..{count})")]
    LoopOutOfRange { selection: usize, count: usize },

    #[error("bubble sounds {start}-{end} are empty or out of range (expected 0..{count})")]
    BubbleRangeInvalid {
        start: usize,
        end: usize,
        count: usize,
    },

    #[error("invalid sound range '{0}' (expected A-B)")]
    RangeSyntax(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    /// Directory holding `magic<i>.wav`.
    pub sample_dir: PathBuf,

    /// Number of sounds loaded into the bank.
    pub sound_count: usize,

    /// Capacity of the voice pool.
    pub max_voices: usize,

    /// Sound played by the loop channel.
    pub loop_selection: usize,

    /// Sounds a sensor hit picks from.
    pub bubble_sounds: RangeInclusive<usize>,

    /// Consecutive active sensor frames per hit.
    pub dwell_threshold: u32,

    /// Level a button reads while pressed.
    pub button_active_level: Level,

    /// Level the sensor reads while it detects something.
    pub sensor_active_level: Level,

    /// Seed for sound selection; entropy when `None`.
    pub seed: Option<u64>,

    /// Frames per audio callback.
    pub block_size: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            sample_dir: PathBuf::from("."),
            sound_count: NUMBER_OF_SOUNDS,
            max_voices: MAX_VOICES,
            loop_selection: LOOP_SELECTION,
            bubble_sounds: BUBBLE_SOUNDS,
            dwell_threshold: DWELL_THRESHOLD,
            button_active_level: Level::Low,
            sensor_active_level: Level::Low,
            seed: None,
            block_size: BLOCK_SIZE,
        }
    }
}

impl EngineConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sound_count == 0 {
            return Err(ConfigError::NoSounds);
        }
        if self.max_voices == 0 {
            return Err(ConfigError::NoVoices);
        }
        if self.dwell_threshold == 0 {
            return Err(ConfigError::ZeroDwell);
        }
        if self.block_size == 0 {
            return Err(ConfigError::ZeroBlockSize);
        }
        if self.loop_selection >= self.sound_count {
            return Err(ConfigError::LoopOutOfRange {
                selection: self.loop_selection,
                count: self.sound_count,
            });
        }

        let (start, end) = (*self.bubble_sounds.start(), *self.bubble_sounds.end());
        if self.bubble_sounds.is_empty() || end >= self.sound_count {
            return Err(ConfigError::BubbleRangeInvalid {
                start,
                end,
                count: self.sound_count,
            });
        }

        Ok(())
    }

    /// Level a button rests at when not pressed.
    pub fn button_idle_level(&self) -> Level {
        self.button_active_level.toggled()
    }

    /// Level the sensor rests at when it detects nothing.
    pub fn sensor_idle_level(&self) -> Level {
        self.sensor_active_level.toggled()
    }
}

/// Parses an inclusive sound range written as `A-B` (or a single `A`).
pub fn parse_sound_range(value: &str) -> Result<RangeInclusive<usize>, ConfigError> {
    let syntax = || ConfigError::RangeSyntax(value.to_string());
    let parse = |s: &str| s.trim().parse::<usize>().map_err(|_| syntax());

    match value.split_once('-') {
        Some((start, end)) => Ok(parse(start)?..=parse(end)?),
        None => {
            let single = parse(value)?;
            Ok(single..=single)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = EngineConfig::default();

        assert_eq!(config.validate(), Ok(()));
        assert_eq!(config.sound_count, 8);
        assert_eq!(config.max_voices, 10);
        assert_eq!(config.bubble_sounds, 1..=7);
        assert_eq!(config.button_idle_level(), Level::High);
    }

    #[test]
    fn test_loop_selection_out_of_range() {
        let config = EngineConfig {
            loop_selection: 8,
            ..Default::default()
        };

        assert_eq!(
            config.validate(),
            Err(ConfigError::LoopOutOfRange {
                selection: 8,
                count: 8
            })
        );
    }

    #[test]
    fn test_bubble_range_past_bank() {
        let config = EngineConfig {
            sound_count: 4,
            loop_selection: 0,
            bubble_sounds: 1..=4,
            ..Default::default()
        };

        assert!(matches!(
            config.validate(),
            Err(ConfigError::BubbleRangeInvalid { .. })
        ));
    }

    #[test]
    fn test_empty_bubble_range() {
        #[allow(clippy::reversed_empty_ranges)]
        let config = EngineConfig {
            bubble_sounds: 5..=2,
            ..Default::default()
        };

        assert!(matches!(
            config.validate(),
            Err(ConfigError::BubbleRangeInvalid { .. })
        ));
    }

    #[test]
    fn test_zero_limits() {
        let zero_voices = EngineConfig {
            max_voices: 0,
            ..Default::default()
        };
        let zero_dwell = EngineConfig {
            dwell_threshold: 0,
            ..Default::default()
        };

        assert_eq!(zero_voices.validate(), Err(ConfigError::NoVoices));
        assert_eq!(zero_dwell.validate(), Err(ConfigError::ZeroDwell));
    }

    #[test]
    fn test_parse_sound_range() {
        assert_eq!(parse_sound_range("1-7"), Ok(1..=7));
        assert_eq!(parse_sound_range(" 2 - 3 "), Ok(2..=3));
        assert_eq!(parse_sound_range("4"), Ok(4..=4));
        assert!(parse_sound_range("a-b").is_err());
        assert!(parse_sound_range("").is_err());
    }
}
