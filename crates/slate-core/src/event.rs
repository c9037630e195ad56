//! Application event queue.
//!
//! Widgets do not call application code directly. Interactions push a
//! [`UiEvent`] onto the shared [`EventQueue`]; the application drains the
//! queue once per tick, after touch dispatch and before drawing, in strict
//! FIFO order.

use std::collections::VecDeque;
use std::sync::Arc;

use parking_lot::Mutex;

/// What happened, independent of which widget it happened to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EventKind {
    /// Full press-and-release inside the widget.
    Click,
    /// Contact went down on the widget.
    Press,
    /// Contact lifted (or capture was forcibly released).
    Release,
    /// Long-press threshold crossed, or a repeat interval elapsed.
    LongPress,
    /// The view slides left: a rightward drag committed before any
    /// vertical scroll.
    SlideLeft,
    /// The view slides right: a leftward drag committed before any
    /// vertical scroll.
    SlideRight,
    /// Application-defined event carried by name.
    Custom(String),
}

/// An event tagged with the id of the widget that produced it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UiEvent {
    pub source: Arc<str>,
    pub kind: EventKind,
}

impl UiEvent {
    pub fn new(source: Arc<str>, kind: EventKind) -> Self {
        UiEvent { source, kind }
    }
}

/// FIFO queue shared between the widget tree and the application loop.
///
/// Push happens during touch dispatch and gesture timing; drain happens once
/// per tick. Cloning the handle shares the underlying queue.
#[derive(Clone, Default)]
pub struct EventQueue {
    inner: Arc<Mutex<VecDeque<UiEvent>>>,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, event: UiEvent) {
        self.inner.lock().push_back(event);
    }

    pub fn pop(&self) -> Option<UiEvent> {
        self.inner.lock().pop_front()
    }

    /// Remove and return everything queued, oldest first.
    pub fn drain(&self) -> Vec<UiEvent> {
        self.inner.lock().drain(..).collect()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }
}
