//! Generic container.
//!
//! A panel owns its children outright and tracks at most one gesture captor
//! by index. Press probing runs topmost first (last added draws last, so it
//! probes first); once a child captures, every later delivery of the gesture
//! goes only to it. A child that gives the gesture up is dropped and the
//! panel handles the remainder itself.

use slate_core::{Point, TouchEvent, TouchResponse, TouchState};
use slate_render::Painter;

use crate::widget::{DrawCtx, TouchCtx, Widget, WidgetCore};

pub struct Panel {
    core: WidgetCore,
    children: Vec<Box<dyn Widget>>,
    active_child: Option<usize>,
    /// Panels forward long presses only if the application opted in.
    pub long_press_enabled: bool,
}

impl Panel {
    pub fn new(core: WidgetCore) -> Self {
        Panel {
            core,
            children: Vec::new(),
            active_child: None,
            long_press_enabled: false,
        }
    }

    pub fn add_child(&mut self, child: Box<dyn Widget>) {
        self.warn_misplaced(child.as_ref());
        self.children.push(child);
    }

    pub fn children(&self) -> &[Box<dyn Widget>] {
        &self.children
    }

    /// Index of the child currently holding the gesture, if any.
    pub fn active_child(&self) -> Option<usize> {
        self.active_child
    }

    /// A child outside the parent rect never gets touched and draws clipped;
    /// almost always a layout bug worth flagging.
    fn warn_misplaced(&self, child: &dyn Widget) {
        let inner = child.core().rect;
        if inner.x < 0
            || inner.y < 0
            || inner.right() > self.core.rect.w
            || inner.bottom() > self.core.rect.h
        {
            log::warn!(
                "widget {:?} at {:?} overflows parent {:?} ({:?})",
                child.core().id,
                inner,
                self.core.id,
                self.core.rect
            );
        }
    }

    fn child_origin(&self, origin: Point) -> Point {
        Point::new(origin.x + self.core.rect.x, origin.y + self.core.rect.y)
    }

    fn dispatch_press(
        &mut self,
        touch: TouchEvent,
        ctx: &mut TouchCtx<'_>,
        origin: Point,
        margin: i32,
    ) -> TouchResponse {
        self.active_child = None;
        self.core.drop_capture();
        let abs = self.core.absolute(origin);
        if !self.core.visible || !abs.contains_with_margin(touch.start, margin) {
            return TouchResponse::NotApplicable;
        }
        let child_origin = self.child_origin(origin);
        for i in (0..self.children.len()).rev() {
            let resp = self.children[i].process_touch(touch, ctx, child_origin, margin);
            if resp.retains_capture() {
                self.active_child = Some(i);
                // stay armed so a later drop can hand the gesture to us
                self.core.arm_capture(ctx.now_ms);
                return resp;
            }
        }
        self.core
            .process_touch_leaf(touch, ctx, origin, margin, self.long_press_enabled)
    }

    fn forward_to_captured(
        &mut self,
        touch: TouchEvent,
        ctx: &mut TouchCtx<'_>,
        origin: Point,
        margin: i32,
    ) -> Option<TouchResponse> {
        let index = self.active_child?;
        let child_origin = self.child_origin(origin);
        let resp = self.children[index].process_touch(touch, ctx, child_origin, margin);
        if resp.retains_capture() {
            return Some(resp);
        }
        // child gave the gesture up
        self.active_child = None;
        if touch.state == TouchState::Released {
            self.core.drop_capture();
            return Some(TouchResponse::Released);
        }
        None
    }
}

impl Widget for Panel {
    fn core(&self) -> &WidgetCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut WidgetCore {
        &mut self.core
    }

    fn children_mut(&mut self) -> Option<&mut [Box<dyn Widget>]> {
        Some(&mut self.children)
    }

    fn draw(&mut self, painter: &mut Painter<'_>, ctx: &mut DrawCtx<'_>, origin: Point) {
        if !self.core.visible {
            return;
        }
        let abs = self.core.absolute(origin);
        ctx.mark_dirty(abs.y, abs.h, self.core.current_background());
        self.core.draw_background(painter, origin);
        painter.push_bounds(abs);
        let child_origin = self.child_origin(origin);
        for child in &mut self.children {
            child.draw(painter, ctx, child_origin);
        }
        painter.pop_bounds();
        self.core.draw_border(painter, origin);
    }

    fn process_touch(
        &mut self,
        touch: TouchEvent,
        ctx: &mut TouchCtx<'_>,
        origin: Point,
        margin: i32,
    ) -> TouchResponse {
        match touch.state {
            TouchState::Idle => TouchResponse::NotApplicable,
            TouchState::Pressed => self.dispatch_press(touch, ctx, origin, margin),
            TouchState::Moving | TouchState::Released => {
                if let Some(resp) = self.forward_to_captured(touch, ctx, origin, margin) {
                    return resp;
                }
                // no captured child (or it just dropped): handle it ourselves
                self.core
                    .process_touch_leaf(touch, ctx, origin, margin, self.long_press_enabled)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::widget::Button;
    use slate_core::{EventKind, EventQueue, Rect};

    fn panel_with_two_buttons() -> Panel {
        let mut p = Panel::new(WidgetCore::new("panel", Rect::new(0, 0, 100, 100)));
        // overlapping buttons; "top" added last so it probes first
        p.add_child(Box::new(Button::new("bottom", Rect::new(10, 10, 40, 40))));
        p.add_child(Box::new(Button::new("top", Rect::new(10, 10, 40, 40))));
        p
    }

    fn ev(state: TouchState, sx: i32, sy: i32, x: i32, y: i32) -> TouchEvent {
        TouchEvent::new(state, Point::new(sx, sy), Point::new(x, y))
    }

    fn sources(events: &EventQueue) -> Vec<(String, EventKind)> {
        events
            .drain()
            .into_iter()
            .map(|e| (e.source.to_string(), e.kind))
            .collect()
    }

    #[test]
    fn topmost_child_captures() {
        let mut p = panel_with_two_buttons();
        let events = EventQueue::new();
        let mut ctx = TouchCtx {
            events: &events,
            now_ms: 0,
        };
        let resp = p.process_touch(
            ev(TouchState::Pressed, 20, 20, 20, 20),
            &mut ctx,
            Point::default(),
            0,
        );
        assert_eq!(resp, TouchResponse::Handled);
        let got = sources(&events);
        assert_eq!(got, vec![("top".to_string(), EventKind::Press)]);
    }

    #[test]
    fn captured_child_receives_release_outside_its_rect() {
        let mut p = panel_with_two_buttons();
        let events = EventQueue::new();
        let mut ctx = TouchCtx {
            events: &events,
            now_ms: 0,
        };
        p.process_touch(
            ev(TouchState::Pressed, 20, 20, 20, 20),
            &mut ctx,
            Point::default(),
            0,
        );
        events.drain();
        // lift far outside the captured child: Release still reaches it,
        // Click does not fire
        let resp = p.process_touch(
            ev(TouchState::Released, 20, 20, 90, 90),
            &mut ctx,
            Point::default(),
            0,
        );
        assert_eq!(resp, TouchResponse::Released);
        assert_eq!(sources(&events), vec![("top".to_string(), EventKind::Release)]);
    }

    #[test]
    fn press_outside_panel_misses() {
        let mut p = panel_with_two_buttons();
        let events = EventQueue::new();
        let mut ctx = TouchCtx {
            events: &events,
            now_ms: 0,
        };
        let resp = p.process_touch(
            ev(TouchState::Pressed, 200, 200, 200, 200),
            &mut ctx,
            Point::default(),
            0,
        );
        assert_eq!(resp, TouchResponse::NotApplicable);
        assert!(events.is_empty());
    }

    #[test]
    fn press_in_gap_is_handled_by_panel_itself() {
        let mut p = panel_with_two_buttons();
        let events = EventQueue::new();
        let mut ctx = TouchCtx {
            events: &events,
            now_ms: 0,
        };
        let resp = p.process_touch(
            ev(TouchState::Pressed, 80, 80, 80, 80),
            &mut ctx,
            Point::default(),
            0,
        );
        assert_eq!(resp, TouchResponse::Handled);
        assert_eq!(sources(&events), vec![("panel".to_string(), EventKind::Press)]);
    }

    #[test]
    fn dropped_child_hands_gesture_to_panel() {
        let mut p = panel_with_two_buttons();
        let events = EventQueue::new();
        let mut ctx = TouchCtx {
            events: &events,
            now_ms: 0,
        };
        p.process_touch(
            ev(TouchState::Pressed, 20, 20, 20, 20),
            &mut ctx,
            Point::default(),
            0,
        );
        // drag past the child's tolerance (5 for a 40px child) but inside the
        // panel's own (11 for 100px): child vetoes, panel takes over
        let resp = p.process_touch(
            ev(TouchState::Moving, 20, 20, 26, 20),
            &mut ctx,
            Point::default(),
            0,
        );
        assert_eq!(resp, TouchResponse::Handled);
        // subsequent release goes to the panel
        let resp = p.process_touch(
            ev(TouchState::Released, 20, 20, 26, 20),
            &mut ctx,
            Point::default(),
            0,
        );
        assert_eq!(resp, TouchResponse::Released);
        let got = sources(&events);
        assert!(got.contains(&("top".to_string(), EventKind::Release)));
        assert!(got.contains(&("panel".to_string(), EventKind::Release)));
    }

    #[test]
    fn nested_lookup_finds_grandchildren() {
        let mut outer = Panel::new(WidgetCore::new("outer", Rect::new(0, 0, 100, 100)));
        let mut inner = Panel::new(WidgetCore::new("inner", Rect::new(0, 0, 50, 50)));
        inner.add_child(Box::new(Button::new("leaf", Rect::new(0, 0, 10, 10))));
        outer.add_child(Box::new(inner));
        let found = crate::widget::find_widget(&mut outer, "leaf");
        assert!(found.is_some());
        assert!(crate::widget::find_widget(&mut outer, "ghost").is_none());
    }
}
