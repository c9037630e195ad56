//! The toolkit context: screens, touch routing, and the frame loop.
//!
//! `Ui` is constructed explicitly and threaded through the application; there
//! is no global instance. A cooperative tick runs three phases in order:
//! touch dispatch into the active screen, draining queued events to the
//! application handler, then drawing and flipping. Event handlers therefore
//! always observe the tree state that produced the events.

use std::collections::HashMap;
use std::sync::Arc;

use slate_core::{
    touch_state, EventQueue, Platform, Point, SlateError, TouchEvent, TouchSample, TouchState,
    UiEvent,
};
use slate_render::{Blitter, Compositor, FramebufferSet, Painter};

use crate::screen::Screen;
use crate::widget::{DrawCtx, TouchCtx, Widget};

pub struct Ui {
    platform: Box<dyn Platform>,
    buffers: FramebufferSet,
    blitter: Blitter,
    compositor: Compositor,
    events: EventQueue,
    screens: HashMap<Arc<str>, Screen>,
    active: Option<Arc<str>>,
    prev_sample: TouchSample,
    touch_start: Point,
    /// Inflation applied to every hit test, for fat-finger tolerance.
    pub touch_margin: i32,
}

impl Ui {
    pub fn new(
        width: i32,
        height: i32,
        depth_bytes: u8,
        platform: Box<dyn Platform>,
    ) -> Result<Ui, SlateError> {
        let buffers = FramebufferSet::new(width, height, depth_bytes)?;
        Ok(Ui {
            platform,
            compositor: Compositor::new(height),
            buffers,
            blitter: Blitter::Software,
            events: EventQueue::new(),
            screens: HashMap::new(),
            active: None,
            prev_sample: TouchSample::default(),
            touch_start: Point::default(),
            touch_margin: 0,
        })
    }

    pub fn set_blitter(&mut self, blitter: Blitter) {
        self.blitter = blitter;
    }

    pub fn events(&self) -> &EventQueue {
        &self.events
    }

    /// The first screen added becomes active.
    pub fn add_screen(&mut self, screen: Screen) {
        let id = screen.core().id.clone();
        if self.active.is_none() {
            self.active = Some(id.clone());
        }
        self.screens.insert(id, screen);
    }

    pub fn set_active(&mut self, id: &str) {
        if let Some((key, _)) = self.screens.get_key_value(id) {
            self.active = Some(key.clone());
        } else {
            log::warn!("no screen named {id:?}");
        }
    }

    pub fn active_screen_mut(&mut self) -> Option<&mut Screen> {
        let id = self.active.clone()?;
        self.screens.get_mut(&id)
    }

    /// Touch entry point, called once per tick with the latest panel sample.
    /// Consecutive samples are edge-detected into the four touch states and
    /// dispatched into the active screen.
    pub fn process_touch_point(&mut self, touched: bool, x: i32, y: i32) {
        let now = TouchSample {
            pos: Point::new(x, y),
            pressed: touched,
        };
        let state = touch_state(self.prev_sample, now);
        self.prev_sample = now;
        if state == TouchState::Idle {
            return;
        }
        if state == TouchState::Pressed {
            self.touch_start = now.pos;
        }
        let touch = TouchEvent::new(state, self.touch_start, now.pos);
        let now_ms = self.platform.now_ms();
        let margin = self.touch_margin;
        let events = self.events.clone();
        let Some(screen) = self.active_screen_mut() else {
            return;
        };
        let mut ctx = TouchCtx {
            events: &events,
            now_ms,
        };
        screen.process_touch(touch, &mut ctx, Point::default(), margin);
    }

    /// Deliver every queued event, oldest first.
    pub fn drain_events<F: FnMut(UiEvent)>(&mut self, mut handler: F) {
        for event in self.events.drain() {
            handler(event);
        }
    }

    /// Render the active screen and flip: restore backdrop strips, draw into
    /// the work buffer with a fresh clip stack, merge into the pending
    /// display buffer, and hand it to the controller.
    pub fn draw(&mut self) {
        let Some(id) = self.active.clone() else {
            return;
        };
        let Some(screen) = self.screens.get_mut(&id) else {
            return;
        };
        let now_ms = self.platform.now_ms();
        self.compositor
            .begin_frame(&mut self.buffers, screen.backdrop(), &self.blitter);
        let has_backdrop = screen.backdrop().is_some();
        {
            let mut painter = Painter::new(self.buffers.work_mut(), &self.blitter);
            painter.reset_bounds();
            let mut ctx = DrawCtx::new(&mut self.compositor, has_backdrop, now_ms);
            screen.draw(&mut painter, &mut ctx, Point::default());
        }
        self.compositor.merge_buffers(&mut self.buffers);
        self.buffers.flip_synchronized(self.platform.as_ref());
    }

    /// One cooperative frame: touch, events, draw.
    pub fn tick<F: FnMut(UiEvent)>(&mut self, touched: bool, x: i32, y: i32, handler: F) {
        self.process_touch_point(touched, x, y);
        self.drain_events(handler);
        self.draw();
    }

    /// The display buffer currently scanned out, for host presentation.
    pub fn visible_buffer(&self) -> &slate_render::FrameBuffer {
        self.buffers.visible()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::widget::Button;
    use slate_core::{Color, EventKind, Rect};
    use std::cell::Cell;
    use std::rc::Rc;

    struct TestClock(Rc<Cell<u64>>);

    impl Platform for TestClock {
        fn now_ms(&self) -> u64 {
            self.0.get()
        }
    }

    fn ui_with_button() -> (Ui, Rc<Cell<u64>>) {
        let clock = Rc::new(Cell::new(0));
        let mut ui = Ui::new(100, 100, 4, Box::new(TestClock(clock.clone()))).unwrap();
        let mut screen = Screen::new("home", 100, 100);
        let mut button = Button::new("ok", Rect::new(10, 10, 40, 20));
        button.core_mut().background = Color::RED;
        screen.add_child(Box::new(button));
        ui.add_screen(screen);
        (ui, clock)
    }

    #[test]
    fn tap_produces_ordered_events() {
        let (mut ui, _clock) = ui_with_button();
        let mut seen = Vec::new();
        ui.tick(true, 20, 15, |e| seen.push((e.source.to_string(), e.kind)));
        ui.tick(false, 20, 15, |e| seen.push((e.source.to_string(), e.kind)));
        assert_eq!(
            seen,
            vec![
                ("ok".to_string(), EventKind::Press),
                ("ok".to_string(), EventKind::Release),
                ("ok".to_string(), EventKind::Click),
            ]
        );
    }

    #[test]
    fn draw_flips_the_rendered_frame_to_visible() {
        let (mut ui, _clock) = ui_with_button();
        ui.draw();
        // button pixels arrive on the now-visible buffer
        assert_eq!(ui.visible_buffer().read_raw(20, 15), Color::RED.0);
        // screen background is opaque black elsewhere
        assert_eq!(ui.visible_buffer().read_raw(90, 90), Color::BLACK.0);
    }

    #[test]
    fn long_press_timing_through_the_clock() {
        let (mut ui, clock) = ui_with_button();
        let mut seen = Vec::new();
        ui.process_touch_point(true, 20, 15);
        clock.set(1000);
        ui.process_touch_point(true, 20, 15);
        ui.drain_events(|e| seen.push(e.kind));
        // no long-press handler: the held press is force released
        assert_eq!(seen, vec![EventKind::Press, EventKind::Release]);
    }

    #[test]
    fn idle_samples_do_nothing() {
        let (mut ui, _clock) = ui_with_button();
        ui.process_touch_point(false, 0, 0);
        assert!(ui.events().is_empty());
    }

    #[test]
    fn unknown_screen_is_ignored() {
        let (mut ui, _clock) = ui_with_button();
        ui.set_active("missing");
        // the original screen stays active
        let mut seen = 0;
        ui.tick(true, 20, 15, |_| seen += 1);
        assert_eq!(seen, 1);
    }
}
