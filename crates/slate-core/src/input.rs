//! Touch input model.
//!
//! The panel driver reports raw samples; the per-tick edge detector turns the
//! previous/current pair into a [`TouchState`] that widgets consume. Widgets
//! answer every delivery with a [`TouchResponse`], which is how capture and
//! release decisions propagate back up the tree.

use crate::geometry::Point;

/// Edge-detected state of the single touch contact.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TouchState {
    /// No contact this tick or last tick.
    #[default]
    Idle,
    /// Contact went down this tick.
    Pressed,
    /// Contact held down across ticks (position may or may not have moved).
    Moving,
    /// Contact lifted this tick.
    Released,
}

/// One touch delivery: where the gesture started, where it is now, and the
/// edge-detected state.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TouchEvent {
    pub state: TouchState,
    /// Position where the contact first went down.
    pub start: Point,
    /// Current position.
    pub current: Point,
}

impl TouchEvent {
    pub fn new(state: TouchState, start: Point, current: Point) -> Self {
        TouchEvent {
            state,
            start,
            current,
        }
    }

    pub fn delta(&self) -> Point {
        Point::new(self.current.x - self.start.x, self.current.y - self.start.y)
    }
}

/// A widget's answer to a touch delivery.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TouchResponse {
    /// The widget owns the gesture; keep forwarding to it.
    Handled,
    /// The widget owns the gesture and is running a long-press cycle.
    LongPress,
    /// The widget gave the gesture up; the parent takes over.
    Released,
    /// The delivery did not apply to this widget at all.
    NotApplicable,
}

impl TouchResponse {
    /// Whether the responder keeps ownership of the gesture.
    pub fn retains_capture(self) -> bool {
        matches!(self, TouchResponse::Handled | TouchResponse::LongPress)
    }
}

/// A raw sample from the touch panel driver. `pressed == false` means the
/// contact is up regardless of coordinates.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TouchSample {
    pub pos: Point,
    pub pressed: bool,
}

impl TouchSample {
    pub fn down(x: i32, y: i32) -> Self {
        TouchSample {
            pos: Point::new(x, y),
            pressed: true,
        }
    }

    pub fn up() -> Self {
        TouchSample {
            pos: Point::default(),
            pressed: false,
        }
    }
}

/// Edge detection over consecutive panel samples.
pub fn touch_state(prev: TouchSample, now: TouchSample) -> TouchState {
    match (prev.pressed, now.pressed) {
        (false, false) => TouchState::Idle,
        (false, true) => TouchState::Pressed,
        (true, true) => TouchState::Moving,
        (true, false) => TouchState::Released,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edge_detection() {
        let up = TouchSample::up();
        let down = TouchSample::down(5, 5);
        assert_eq!(touch_state(up, up), TouchState::Idle);
        assert_eq!(touch_state(up, down), TouchState::Pressed);
        assert_eq!(touch_state(down, down), TouchState::Moving);
        assert_eq!(touch_state(down, up), TouchState::Released);
    }

    #[test]
    fn capture_retention() {
        assert!(TouchResponse::Handled.retains_capture());
        assert!(TouchResponse::LongPress.retains_capture());
        assert!(!TouchResponse::Released.retains_capture());
        assert!(!TouchResponse::NotApplicable.retains_capture());
    }
}
