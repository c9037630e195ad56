//! The widget trait and the state every widget shares.
//!
//! Widgets are positioned relative to their parent; `origin` in the draw and
//! touch entry points is the parent's absolute top-left. The leaf touch
//! protocol lives on [`WidgetCore`] so every interactive widget behaves
//! identically: capture on press inside the inflated rect, veto oversized
//! drags, fire `Release` always and `Click` only for a clean in-bounds tap.

use std::sync::Arc;

use bitflags::bitflags;
use slate_core::{Color, EventKind, EventQueue, Point, Rect, TouchEvent, TouchResponse, TouchState};
use slate_render::{draw_text_in_bounds, Compositor, Font, Painter, TextAlign};

use crate::gesture::{GestureFire, GestureTimers};

bitflags! {
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct BorderSides: u8 {
        const TOP = 1;
        const BOTTOM = 1 << 1;
        const LEFT = 1 << 2;
        const RIGHT = 1 << 3;
        const ALL = Self::TOP.bits() | Self::BOTTOM.bits() | Self::LEFT.bits() | Self::RIGHT.bits();
    }
}

/// Per-frame drawing context handed down the tree alongside the painter.
pub struct DrawCtx<'a> {
    pub now_ms: u64,
    compositor: &'a mut Compositor,
    has_backdrop: bool,
}

impl<'a> DrawCtx<'a> {
    pub fn new(compositor: &'a mut Compositor, has_backdrop: bool, now_ms: u64) -> Self {
        DrawCtx {
            now_ms,
            compositor,
            has_backdrop,
        }
    }

    /// Register rows repainted by a translucent surface. Without a backdrop
    /// image, or with an opaque surface, nothing needs restoring.
    pub fn mark_dirty(&mut self, y: i32, height: i32, surface_color: Color) {
        if self.has_backdrop {
            self.compositor.add(y, height, surface_color);
        }
    }
}

/// Touch dispatch context: the queue interactions land on and the tick clock.
pub struct TouchCtx<'a> {
    pub events: &'a EventQueue,
    pub now_ms: u64,
}

impl TouchCtx<'_> {
    pub fn push(&self, source: &Arc<str>, kind: EventKind) {
        self.events
            .push(slate_core::UiEvent::new(source.clone(), kind));
    }
}

pub trait Widget {
    fn core(&self) -> &WidgetCore;
    fn core_mut(&mut self) -> &mut WidgetCore;

    fn draw(&mut self, painter: &mut Painter<'_>, ctx: &mut DrawCtx<'_>, origin: Point);

    fn process_touch(
        &mut self,
        touch: TouchEvent,
        ctx: &mut TouchCtx<'_>,
        origin: Point,
        margin: i32,
    ) -> TouchResponse;

    /// Containers expose their children for traversal; leaves return `None`.
    fn children_mut(&mut self) -> Option<&mut [Box<dyn Widget>]> {
        None
    }
}

/// Depth-first lookup by id.
pub fn find_widget<'a>(root: &'a mut dyn Widget, id: &str) -> Option<&'a mut dyn Widget> {
    if root.core().id.as_ref() == id {
        return Some(root);
    }
    for child in root.children_mut()?.iter_mut() {
        if let Some(found) = find_widget(child.as_mut(), id) {
            return Some(found);
        }
    }
    None
}

/// State shared by every widget.
pub struct WidgetCore {
    pub id: Arc<str>,
    /// Position relative to the parent.
    pub rect: Rect,
    pub visible: bool,
    pub background: Color,
    pub foreground: Color,
    pub active_background: Color,
    pub active_foreground: Color,
    pub border_color: Color,
    pub border: BorderSides,
    /// Application-level On/Off state (checkboxes, toggles).
    pub state_on: bool,
    touch_active: bool,
    timers: GestureTimers,
}

impl WidgetCore {
    pub fn new(id: impl Into<Arc<str>>, rect: Rect) -> Self {
        WidgetCore {
            id: id.into(),
            rect,
            visible: true,
            background: Color::TRANSPARENT,
            foreground: Color::WHITE,
            active_background: Color::TRANSPARENT,
            active_foreground: Color::WHITE,
            border_color: Color::TRANSPARENT,
            border: BorderSides::empty(),
            state_on: false,
            touch_active: false,
            timers: GestureTimers::default(),
        }
    }

    /// The widget's rect in screen coordinates.
    pub fn absolute(&self, origin: Point) -> Rect {
        Rect::new(
            origin.x + self.rect.x,
            origin.y + self.rect.y,
            self.rect.w,
            self.rect.h,
        )
    }

    /// Contact currently captured by this widget.
    pub fn is_pressed(&self) -> bool {
        self.touch_active
    }

    pub fn current_background(&self) -> Color {
        if self.touch_active || self.state_on {
            self.active_background
        } else {
            self.background
        }
    }

    pub fn current_foreground(&self) -> Color {
        if self.touch_active || self.state_on {
            self.active_foreground
        } else {
            self.foreground
        }
    }

    fn drag_exceeds(delta: i32, size: i32) -> bool {
        delta.abs() > (size + 9) / 10 + 1
    }

    /// Take ownership of the gesture without emitting a `Press` event.
    /// Containers use this so they can pick up a gesture a child drops.
    pub fn arm_capture(&mut self, now_ms: u64) {
        self.touch_active = true;
        self.timers.arm(now_ms);
    }

    pub fn drop_capture(&mut self) {
        self.touch_active = false;
        self.timers.clear();
    }

    /// The leaf touch protocol. `has_long_handler` enables the long-press
    /// cycle; without it a held press force-releases at the threshold.
    pub fn process_touch_leaf(
        &mut self,
        touch: TouchEvent,
        ctx: &mut TouchCtx<'_>,
        origin: Point,
        margin: i32,
        has_long_handler: bool,
    ) -> TouchResponse {
        let abs = self.absolute(origin);
        match touch.state {
            TouchState::Idle => TouchResponse::NotApplicable,
            TouchState::Pressed => {
                self.touch_active = false;
                self.timers.clear();
                if !self.visible || !abs.contains_with_margin(touch.start, margin) {
                    return TouchResponse::NotApplicable;
                }
                self.touch_active = true;
                self.timers.arm(ctx.now_ms);
                ctx.push(&self.id, EventKind::Press);
                TouchResponse::Handled
            }
            TouchState::Moving => {
                if !self.touch_active {
                    return TouchResponse::NotApplicable;
                }
                let delta = touch.delta();
                if Self::drag_exceeds(delta.x, self.rect.w)
                    || Self::drag_exceeds(delta.y, self.rect.h)
                {
                    self.touch_active = false;
                    self.timers.clear();
                    ctx.push(&self.id, EventKind::Release);
                    return TouchResponse::Released;
                }
                match self.timers.poll(ctx.now_ms, has_long_handler) {
                    GestureFire::Long | GestureFire::Repeat => {
                        ctx.push(&self.id, EventKind::LongPress);
                        TouchResponse::LongPress
                    }
                    GestureFire::ForceRelease => {
                        self.touch_active = false;
                        ctx.push(&self.id, EventKind::Release);
                        TouchResponse::Released
                    }
                    GestureFire::None => {
                        if self.timers.long_active() {
                            TouchResponse::LongPress
                        } else {
                            TouchResponse::Handled
                        }
                    }
                }
            }
            TouchState::Released => {
                if !self.touch_active {
                    return TouchResponse::NotApplicable;
                }
                self.touch_active = false;
                let went_long = self.timers.long_active();
                self.timers.clear();
                ctx.push(&self.id, EventKind::Release);
                if abs.contains_with_margin(touch.current, margin) && !went_long {
                    ctx.push(&self.id, EventKind::Click);
                }
                TouchResponse::Released
            }
        }
    }

    pub fn draw_background(&self, painter: &mut Painter<'_>, origin: Point) {
        let bg = self.current_background();
        if !bg.is_transparent() {
            painter.fill_rect(self.absolute(origin), bg);
        }
    }

    pub fn draw_border(&self, painter: &mut Painter<'_>, origin: Point) {
        if self.border.is_empty() || self.border_color.is_transparent() {
            return;
        }
        let r = self.absolute(origin);
        if self.border.contains(BorderSides::TOP) {
            painter.draw_hline(r.x, r.y, r.w, self.border_color);
        }
        if self.border.contains(BorderSides::BOTTOM) {
            painter.draw_hline(r.x, r.bottom() - 1, r.w, self.border_color);
        }
        if self.border.contains(BorderSides::LEFT) {
            painter.draw_vline(r.x, r.y, r.h, self.border_color);
        }
        if self.border.contains(BorderSides::RIGHT) {
            painter.draw_vline(r.right() - 1, r.y, r.h, self.border_color);
        }
    }
}

/// Pressable rectangle with an optional centered label.
pub struct Button {
    core: WidgetCore,
    pub label: String,
    pub font: Option<Arc<Font>>,
    pub long_press_enabled: bool,
}

impl Button {
    pub fn new(id: impl Into<Arc<str>>, rect: Rect) -> Self {
        Button {
            core: WidgetCore::new(id, rect),
            label: String::new(),
            font: None,
            long_press_enabled: false,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>, font: Arc<Font>) -> Self {
        self.label = label.into();
        self.font = Some(font);
        self
    }
}

impl Widget for Button {
    fn core(&self) -> &WidgetCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut WidgetCore {
        &mut self.core
    }

    fn draw(&mut self, painter: &mut Painter<'_>, ctx: &mut DrawCtx<'_>, origin: Point) {
        if !self.core.visible {
            return;
        }
        let abs = self.core.absolute(origin);
        ctx.mark_dirty(abs.y, abs.h, self.core.current_background());
        self.core.draw_background(painter, origin);
        if let Some(font) = &self.font {
            if !self.label.is_empty() {
                draw_text_in_bounds(
                    painter,
                    font,
                    abs,
                    &self.label,
                    self.core.current_foreground(),
                    TextAlign::Center,
                );
            }
        }
        self.core.draw_border(painter, origin);
    }

    fn process_touch(
        &mut self,
        touch: TouchEvent,
        ctx: &mut TouchCtx<'_>,
        origin: Point,
        margin: i32,
    ) -> TouchResponse {
        self.core
            .process_touch_leaf(touch, ctx, origin, margin, self.long_press_enabled)
    }
}
