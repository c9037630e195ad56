//! Long-press gesture timing.
//!
//! A widget arms the timer when a press lands on it and polls it on every
//! subsequent delivery. The first fire comes after [`LONG_PRESS_MS`]; each
//! repeat re-stamps the timer so the next fire is [`REPEAT_MS`] later.
//! Widgets without a long-press handler get `ForceRelease` at the threshold
//! instead, so a held-down press is never silently eaten.

/// Milliseconds of continuous contact before the first long-press fire.
pub const LONG_PRESS_MS: u64 = 1000;
/// Milliseconds between repeat fires while the contact is held.
pub const REPEAT_MS: u64 = 500;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GestureFire {
    None,
    /// First long-press fire.
    Long,
    /// Subsequent fire while still held.
    Repeat,
    /// Threshold crossed but the widget has no long-press handler.
    ForceRelease,
}

#[derive(Clone, Copy, Debug, Default)]
pub struct GestureTimers {
    pressed_at_ms: u64,
    armed: bool,
    long_active: bool,
}

impl GestureTimers {
    pub fn arm(&mut self, now_ms: u64) {
        self.pressed_at_ms = now_ms;
        self.armed = true;
        self.long_active = false;
    }

    pub fn clear(&mut self) {
        self.armed = false;
        self.long_active = false;
    }

    /// Whether a long press already fired during the current gesture.
    pub fn long_active(&self) -> bool {
        self.long_active
    }

    pub fn poll(&mut self, now_ms: u64, has_long_handler: bool) -> GestureFire {
        if !self.armed {
            return GestureFire::None;
        }
        let threshold = if self.long_active {
            REPEAT_MS
        } else {
            LONG_PRESS_MS
        };
        if now_ms.saturating_sub(self.pressed_at_ms) < threshold {
            return GestureFire::None;
        }
        if !has_long_handler {
            self.clear();
            return GestureFire::ForceRelease;
        }
        // re-stamp so the next fire is a repeat interval away
        self.pressed_at_ms = now_ms;
        if self.long_active {
            GestureFire::Repeat
        } else {
            self.long_active = true;
            GestureFire::Long
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn long_press_fires_once_then_repeats() {
        let mut t = GestureTimers::default();
        t.arm(0);
        assert_eq!(t.poll(999, true), GestureFire::None);
        assert_eq!(t.poll(1000, true), GestureFire::Long);
        assert_eq!(t.poll(1400, true), GestureFire::None);
        assert_eq!(t.poll(1500, true), GestureFire::Repeat);
        assert_eq!(t.poll(2000, true), GestureFire::Repeat);
    }

    #[test]
    fn no_handler_forces_release_at_threshold() {
        let mut t = GestureTimers::default();
        t.arm(100);
        assert_eq!(t.poll(1099, false), GestureFire::None);
        assert_eq!(t.poll(1100, false), GestureFire::ForceRelease);
        // force release disarms
        assert_eq!(t.poll(5000, false), GestureFire::None);
    }

    #[test]
    fn clear_stops_the_cycle() {
        let mut t = GestureTimers::default();
        t.arm(0);
        assert_eq!(t.poll(1000, true), GestureFire::Long);
        t.clear();
        assert!(!t.long_active());
        assert_eq!(t.poll(2000, true), GestureFire::None);
    }
}
