//! Core types for the Slate embedded UI toolkit.
//!
//! This crate has no rendering or widget code. It defines the vocabulary the
//! rest of the workspace shares: integer geometry, pixel formats and color
//! math, the touch input model, the application event queue, and the platform
//! seam (clock and display handshake).

pub mod color;
pub mod error;
pub mod event;
pub mod format;
pub mod geometry;
pub mod input;
pub mod platform;

pub use color::{blend, Color, Palette};
pub use error::SlateError;
pub use event::{EventKind, EventQueue, UiEvent};
pub use format::{convert, from_argb8888, to_argb8888, PixelFormat};
pub use geometry::{angle_diff, constrain_angle, Point, Rect};
pub use input::{touch_state, TouchEvent, TouchResponse, TouchSample, TouchState};
pub use platform::{Platform, SystemPlatform};
