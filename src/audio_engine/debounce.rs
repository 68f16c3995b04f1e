//! Turning raw digital levels into discrete trigger events.
//!
//! Two policies live here:
//!
//! - [`ButtonDebouncer`] compares each frame's level with the previous frame's
//!   and reports a press or release on every change. There is no dead time: a
//!   single frame at the opposite level is a real edge.
//! - [`DwellDetector`] counts consecutive frames at the active level and fires
//!   once when the count reaches its threshold.

use crate::audio_engine::platform_io::Level;

/// A discrete event produced by a momentary control.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonEvent {
    Pressed,
    Released,
}

/// Edge detector for one momentary control.
#[derive(Debug, Clone)]
pub struct ButtonDebouncer {
    active_level: Level,
    previous_level: Option<Level>,
}

impl ButtonDebouncer {
    /// Creates a debouncer for a control that reads `active_level` while held.
    pub fn new(active_level: Level) -> Self {
        Self {
            active_level,
            previous_level: None,
        }
    }

    /// Feeds this frame's raw level.
    ///
    /// The first frame only primes the history. Afterwards an event is
    /// returned exactly when the level differs from the previous frame's.
    pub fn process(&mut self, level: Level) -> Option<ButtonEvent> {
        let previous = self.previous_level.replace(level)?;
        if previous == level {
            return None;
        }

        if level == self.active_level {
            Some(ButtonEvent::Pressed)
        } else {
            Some(ButtonEvent::Released)
        }
    }

    /// Whether `level` counts as held for this control.
    pub fn is_active(&self, level: Level) -> bool {
        level == self.active_level
    }
}

/// Fires after a level sensor stays active for `threshold` consecutive frames.
#[derive(Debug, Clone)]
pub struct DwellDetector {
    active_level: Level,
    threshold: u32,
    count: u32,
}

impl DwellDetector {
    pub fn new(active_level: Level, threshold: u32) -> Self {
        Self {
            active_level,
            threshold: threshold.max(1),
            count: 0,
        }
    }

    /// Feeds this frame's raw level and returns `true` on a hit.
    ///
    /// An inactive frame clears all progress.
    pub fn process(&mut self, level: Level) -> bool {
        if level != self.active_level {
            self.count = 0;
            return false;
        }

        self.count += 1;
        if self.count >= self.threshold {
            self.count = 0;
            return true;
        }
        false
    }

    /// Consecutive active frames seen since the last hit or reset.
    pub fn count(&self) -> u32 {
        self.count
    }
}
