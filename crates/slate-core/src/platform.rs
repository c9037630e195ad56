//! Platform integration seam.
//!
//! Everything the toolkit needs from the host lives behind [`Platform`]: a
//! millisecond clock and the display-controller handshake used by
//! synchronized buffer flips. Tests substitute a manual clock; firmware
//! implements the vsync hooks against the real controller.

use std::time::Instant;

/// Host services the toolkit depends on.
///
/// The flip sequence calls these in a fixed order: `wait_for_vsync`, then the
/// caller swaps buffers and calls `set_layer_pointer` with the new visible
/// buffer, then `flipping_completed`. Implementations that have no display
/// handshake can leave the defaults, which do nothing.
pub trait Platform {
    /// Monotonic milliseconds. Only differences are meaningful.
    fn now_ms(&self) -> u64;

    /// Block until the next vertical blanking interval.
    fn wait_for_vsync(&self) {}

    /// Point the display controller at the buffer that just became visible.
    fn set_layer_pointer(&self, _address: usize) {}

    /// Called after the flip is committed.
    fn flipping_completed(&self) {}
}

/// Default host backed by [`Instant`]. No display handshake.
pub struct SystemPlatform {
    epoch: Instant,
}

impl SystemPlatform {
    pub fn new() -> Self {
        SystemPlatform {
            epoch: Instant::now(),
        }
    }
}

impl Default for SystemPlatform {
    fn default() -> Self {
        Self::new()
    }
}

impl Platform for SystemPlatform {
    fn now_ms(&self) -> u64 {
        self.epoch.elapsed().as_millis() as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    /// Manually advanced clock for deterministic timing tests.
    pub struct ManualClock {
        now: Cell<u64>,
    }

    impl ManualClock {
        pub fn at(ms: u64) -> Self {
            ManualClock { now: Cell::new(ms) }
        }

        pub fn advance(&self, ms: u64) {
            self.now.set(self.now.get() + ms);
        }
    }

    impl Platform for ManualClock {
        fn now_ms(&self) -> u64 {
            self.now.get()
        }
    }

    #[test]
    fn manual_clock_advances() {
        let clock = ManualClock::at(100);
        assert_eq!(clock.now_ms(), 100);
        clock.advance(250);
        assert_eq!(clock.now_ms(), 350);
    }

    #[test]
    fn system_platform_is_monotonic() {
        let p = SystemPlatform::new();
        let a = p.now_ms();
        let b = p.now_ms();
        assert!(b >= a);
    }
}
