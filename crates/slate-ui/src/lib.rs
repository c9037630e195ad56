//! Widget tree for the Slate embedded UI toolkit.
//!
//! Widgets draw through `slate-render` and answer touch deliveries with the
//! responses defined in `slate-core`. The [`Ui`] context owns the screens,
//! the framebuffers, and the event queue, and runs the cooperative tick:
//! touch dispatch, event drain, draw, flip.

pub mod context;
pub mod gesture;
pub mod panel;
pub mod screen;
pub mod scroll;
pub mod widget;

pub use context::Ui;
pub use gesture::{GestureFire, GestureTimers, LONG_PRESS_MS, REPEAT_MS};
pub use panel::Panel;
pub use screen::Screen;
pub use scroll::{ScrollTuning, ScrollView};
pub use widget::{find_widget, BorderSides, Button, DrawCtx, TouchCtx, Widget, WidgetCore};
