//! Vertical scroll view with inertial scrolling.
//!
//! Elements stack top to bottom; the view translates them by the scroll
//! offset and culls what falls outside the viewport. Dragging moves content
//! directly, releasing converts the recent per-tick deltas into a coasting
//! speed, and the draw pass decays that speed linearly until it crosses zero
//! or the content hits a boundary. Pulling past either end rubber-bands:
//! half of every out-of-range pixel accumulates into a bounded overscroll
//! that snaps back once the finger lifts.
//!
//! The element list sits behind a mutex so an application thread can rebuild
//! it while a tick is running; the view side only ever uses `try_lock` and
//! abandons the pass when it loses the race.

use std::sync::Arc;

use parking_lot::Mutex;
use serde::Deserialize;
use slate_core::{Color, EventKind, Point, Rect, TouchEvent, TouchResponse, TouchState};
use slate_render::Painter;

use crate::widget::{DrawCtx, TouchCtx, Widget, WidgetCore};

/// Scroll physics constants, deserializable from application config.
#[derive(Clone, Copy, Debug, Deserialize)]
#[serde(default)]
pub struct ScrollTuning {
    /// Rubber-band cap in pixels at either end.
    pub overscroll_limit: f32,
    /// Fixed speed substituted for short flicks the ring undersampled.
    pub kick_speed: f32,
    /// Minimum average delta for the kick to apply.
    pub kick_threshold: f32,
    /// Multiplier on the averaged delta when fully sampled.
    pub acceleration: f32,
    /// Averages below this get the slow boost.
    pub slow_boost_threshold: f32,
    pub slow_boost: f32,
    /// Speeds at or below this never start coasting.
    pub coast_min_speed: f32,
    /// Linear speed decay in px/tick per second of wall time.
    pub decay_per_second: f32,
    /// Indicator stays solid this long after the last scroll activity.
    pub indicator_delay_ms: u64,
    /// Then fades out over this long.
    pub indicator_fade_ms: u64,
}

impl Default for ScrollTuning {
    fn default() -> Self {
        ScrollTuning {
            overscroll_limit: 50.0,
            kick_speed: 45.0,
            kick_threshold: 2.0,
            acceleration: 1.2,
            slow_boost_threshold: 25.0,
            slow_boost: 2.0,
            coast_min_speed: 0.1,
            decay_per_second: 30.0,
            indicator_delay_ms: 800,
            indicator_fade_ms: 400,
        }
    }
}

const DELTA_SAMPLES: usize = 3;

pub struct ScrollView {
    core: WidgetCore,
    elements: Arc<Mutex<Vec<Box<dyn Widget>>>>,
    tuning: ScrollTuning,
    pub indicator_color: Color,
    pub split_line_color: Option<Color>,

    active_child: Option<usize>,
    slide_done: bool,
    /// Set once vertical travel reaches h/10; blocks slides for the rest
    /// of the gesture.
    scroll_committed: bool,

    scroll: f32,
    scroll_max: i32,
    items_height: i32,
    /// Net applied scroll since the last `take_scroll_change`, a direction
    /// hint for content prefetch.
    scroll_change: f32,
    overscroll: f32,
    speed: f32,
    animating: bool,

    deltas: [i32; DELTA_SAMPLES],
    delta_index: usize,
    last_y: i32,
    last_draw_ms: u64,
    last_activity_ms: u64,
}

impl ScrollView {
    pub fn new(core: WidgetCore) -> Self {
        ScrollView {
            core,
            elements: Arc::new(Mutex::new(Vec::new())),
            tuning: ScrollTuning::default(),
            indicator_color: Color::rgba(0xFF, 0xFF, 0xFF, 0xA0),
            split_line_color: None,
            active_child: None,
            slide_done: false,
            scroll_committed: false,
            scroll: 0.0,
            scroll_max: 0,
            items_height: 0,
            scroll_change: 0.0,
            overscroll: 0.0,
            speed: 0.0,
            animating: false,
            deltas: [0; DELTA_SAMPLES],
            delta_index: 0,
            last_y: 0,
            last_draw_ms: 0,
            last_activity_ms: 0,
        }
    }

    pub fn with_tuning(mut self, tuning: ScrollTuning) -> Self {
        self.tuning = tuning;
        self
    }

    /// Shared handle for application threads that rebuild the list.
    pub fn elements_handle(&self) -> Arc<Mutex<Vec<Box<dyn Widget>>>> {
        self.elements.clone()
    }

    /// Append an element below the current stack and grow the scroll range.
    pub fn add_element(&mut self, mut child: Box<dyn Widget>) {
        child.core_mut().rect.y = self.items_height;
        child.core_mut().rect.x = 0;
        self.items_height += child.core().rect.h;
        self.scroll_max = (self.items_height - self.core.rect.h).max(0);
        self.elements.lock().push(child);
    }

    pub fn clear_elements(&mut self) {
        self.elements.lock().clear();
        self.items_height = 0;
        self.scroll_max = 0;
        self.scroll = 0.0;
        self.overscroll = 0.0;
        self.speed = 0.0;
        self.animating = false;
        self.active_child = None;
    }

    pub fn scroll_value(&self) -> i32 {
        self.scroll as i32
    }

    pub fn scroll_max(&self) -> i32 {
        self.scroll_max
    }

    pub fn overscroll(&self) -> f32 {
        self.overscroll
    }

    pub fn is_coasting(&self) -> bool {
        self.animating
    }

    /// Net scroll movement since the last call, for prefetch direction.
    pub fn take_scroll_change(&mut self) -> f32 {
        std::mem::take(&mut self.scroll_change)
    }

    /// Apply a new scroll target: out-of-range halves feed the rubber band
    /// up to the limit, then the value clamps to `[0, scroll_max]`.
    pub fn set_scroll_value(&mut self, value: f32) {
        let limit = self.tuning.overscroll_limit;
        let mut v = value;
        if v < 0.0 {
            self.overscroll = (self.overscroll + v / 2.0).clamp(-limit, limit);
            v = 0.0;
        } else if v > self.scroll_max as f32 {
            let over = v - self.scroll_max as f32;
            self.overscroll = (self.overscroll + over / 2.0).clamp(-limit, limit);
            v = self.scroll_max as f32;
        }
        self.scroll_change += v - self.scroll;
        self.scroll = v;
    }

    fn push_delta(&mut self, dy: i32) {
        if dy == 0 {
            return;
        }
        self.deltas[self.delta_index] = dy;
        self.delta_index = (self.delta_index + 1) % DELTA_SAMPLES;
    }

    fn clear_deltas(&mut self) {
        self.deltas = [0; DELTA_SAMPLES];
        self.delta_index = 0;
    }

    /// Turn the sampled deltas into a coasting speed. Short flicks leave the
    /// ring undersampled; those get a fixed kick in the flick direction
    /// rather than a meaninglessly small average.
    fn flick_speed(&self) -> f32 {
        let valid: Vec<i32> = self.deltas.iter().copied().filter(|&d| d != 0).collect();
        if valid.is_empty() {
            return 0.0;
        }
        let avg = valid.iter().sum::<i32>() as f32 / valid.len() as f32;
        if valid.len() < DELTA_SAMPLES {
            if avg.abs() > self.tuning.kick_threshold {
                return self.tuning.kick_speed.copysign(avg);
            }
            return 0.0;
        }
        let mut speed = avg * self.tuning.acceleration;
        if avg.abs() < self.tuning.slow_boost_threshold {
            speed *= self.tuning.slow_boost;
        }
        speed
    }

    fn slide_direction(&self, touch: TouchEvent) -> Option<EventKind> {
        let delta = touch.delta();
        if delta.y.abs() < self.core.rect.h / 10 && delta.x.abs() > self.core.rect.w / 10 {
            // the view moves opposite the finger
            Some(if delta.x > 0 {
                EventKind::SlideLeft
            } else {
                EventKind::SlideRight
            })
        } else {
            None
        }
    }

    fn content_origin(&self, origin: Point) -> Point {
        Point::new(
            origin.x + self.core.rect.x,
            origin.y + self.core.rect.y - self.scroll as i32,
        )
    }

    /// Advance coasting and rubber-band snap-back by the elapsed wall time.
    fn advance_animation(&mut self, now_ms: u64) {
        let dt_ms = now_ms.saturating_sub(self.last_draw_ms);
        self.last_draw_ms = now_ms;
        if dt_ms == 0 {
            return;
        }
        let decay = self.tuning.decay_per_second * dt_ms as f32 / 1000.0;
        if self.animating {
            let slowed = self.speed.abs() - decay;
            if slowed <= 0.0 {
                // zero-crossing: stop exactly, never reverse
                self.speed = 0.0;
                self.animating = false;
            } else {
                self.speed = slowed.copysign(self.speed);
                let before = self.scroll;
                let target = self.scroll - self.speed;
                if target <= 0.0 || target >= self.scroll_max as f32 {
                    self.scroll = target.clamp(0.0, self.scroll_max as f32);
                    self.speed = 0.0;
                    self.animating = false;
                } else {
                    self.scroll = target;
                }
                self.scroll_change += self.scroll - before;
                self.last_activity_ms = now_ms;
            }
        }
        if !self.core.is_pressed() && self.overscroll != 0.0 {
            let snapped = self.overscroll.abs() - decay;
            self.overscroll = if snapped <= 0.0 {
                0.0
            } else {
                snapped.copysign(self.overscroll)
            };
        }
    }

    fn indicator_alpha(&self, now_ms: u64) -> u8 {
        let base = self.indicator_color.alpha() as u64;
        let idle = now_ms.saturating_sub(self.last_activity_ms);
        if idle <= self.tuning.indicator_delay_ms {
            return base as u8;
        }
        let fade = idle - self.tuning.indicator_delay_ms;
        if fade >= self.tuning.indicator_fade_ms {
            return 0;
        }
        (base * (self.tuning.indicator_fade_ms - fade) / self.tuning.indicator_fade_ms) as u8
    }

    fn draw_indicator(&self, painter: &mut Painter<'_>, abs: Rect, now_ms: u64) {
        if self.scroll_max == 0 || self.items_height <= 0 {
            return;
        }
        let alpha = self.indicator_alpha(now_ms);
        if alpha == 0 {
            return;
        }
        let track = abs.h;
        let knob_h = (track * abs.h / self.items_height).max(8);
        let knob_y = abs.y
            + ((track - knob_h) as f32 * self.scroll / self.scroll_max as f32) as i32;
        painter.fill_rect(
            Rect::new(abs.right() - 3, knob_y, 2, knob_h),
            self.indicator_color.with_alpha(alpha),
        );
    }

    fn draw_overscroll(&self, painter: &mut Painter<'_>, abs: Rect) {
        let band = self.overscroll.abs() as i32;
        if band == 0 {
            return;
        }
        let color = self.indicator_color.with_alpha(self.indicator_color.alpha() / 2);
        if self.overscroll < 0.0 {
            painter.fill_rect(Rect::new(abs.x, abs.y, abs.w, band), color);
        } else {
            painter.fill_rect(Rect::new(abs.x, abs.bottom() - band, abs.w, band), color);
        }
    }
}

impl Widget for ScrollView {
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
        self.advance_animation(ctx.now_ms);
        let abs = self.core.absolute(origin);
        ctx.mark_dirty(abs.y, abs.h, self.core.current_background());
        // background also covers the trailing space below a short list
        self.core.draw_background(painter, origin);
        let elements = self.elements.clone();
        let Some(mut guard) = elements.try_lock() else {
            log::debug!("scroll view {:?}: element list busy, skipping draw", self.core.id);
            return;
        };
        painter.push_bounds(abs);
        let content = self.content_origin(origin);
        let viewport = Rect::new(abs.x, abs.y, abs.w, abs.h);
        for element in guard.iter_mut() {
            let r = element.core().absolute(content);
            if r.intersect(&viewport).is_empty() {
                continue;
            }
            element.draw(painter, ctx, content);
            if let Some(split) = self.split_line_color {
                painter.draw_hline(r.x, r.bottom() - 1, r.w, split);
            }
        }
        drop(guard);
        self.draw_overscroll(painter, abs);
        self.draw_indicator(painter, abs, ctx.now_ms);
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
            TouchState::Pressed => {
                self.active_child = None;
                self.slide_done = false;
                self.scroll_committed = false;
                self.core.drop_capture();
                let abs = self.core.absolute(origin);
                if !self.core.visible || !abs.contains_with_margin(touch.start, margin) {
                    return TouchResponse::NotApplicable;
                }
                // a press anywhere in the viewport stops coasting
                self.animating = false;
                self.speed = 0.0;
                self.clear_deltas();
                self.last_y = touch.current.y;
                self.last_activity_ms = ctx.now_ms;
                let content = self.content_origin(origin);
                let elements = self.elements.clone();
                if let Some(mut guard) = elements.try_lock() {
                    for (i, element) in guard.iter_mut().enumerate() {
                        let resp = element.process_touch(touch, ctx, content, margin);
                        if resp.retains_capture() {
                            self.active_child = Some(i);
                            break;
                        }
                    }
                } else {
                    log::debug!(
                        "scroll view {:?}: element list busy, touch probes skipped",
                        self.core.id
                    );
                }
                self.core.arm_capture(ctx.now_ms);
                TouchResponse::Handled
            }
            TouchState::Moving => {
                if !self.core.is_pressed() {
                    return TouchResponse::NotApplicable;
                }
                if let Some(i) = self.active_child {
                    let content = self.content_origin(origin);
                    let elements = self.elements.clone();
                    if let Some(mut guard) = elements.try_lock() {
                        if let Some(element) = guard.get_mut(i) {
                            let resp = element.process_touch(touch, ctx, content, margin);
                            if resp.retains_capture() {
                                return resp;
                            }
                        }
                    }
                    // child gave it up: the view scrolls from here on
                    self.active_child = None;
                }
                if touch.delta().y.abs() >= self.core.rect.h / 10 {
                    self.scroll_committed = true;
                }
                if !self.slide_done && !self.scroll_committed {
                    if let Some(kind) = self.slide_direction(touch) {
                        self.slide_done = true;
                        ctx.push(&self.core.id, kind);
                        self.core.drop_capture();
                        return TouchResponse::Released;
                    }
                }
                let dy = touch.current.y - self.last_y;
                self.last_y = touch.current.y;
                if dy != 0 {
                    self.push_delta(dy);
                    let target = self.scroll - dy as f32;
                    self.set_scroll_value(target);
                    self.last_activity_ms = ctx.now_ms;
                }
                TouchResponse::Handled
            }
            TouchState::Released => {
                if let Some(i) = self.active_child.take() {
                    self.core.drop_capture();
                    let content = self.content_origin(origin);
                    let elements = self.elements.clone();
                    if let Some(mut guard) = elements.try_lock() {
                        if let Some(element) = guard.get_mut(i) {
                            element.process_touch(touch, ctx, content, margin);
                        }
                    }
                    return TouchResponse::Released;
                }
                if !self.core.is_pressed() {
                    return TouchResponse::NotApplicable;
                }
                self.core.drop_capture();
                let speed = self.flick_speed();
                if speed.abs() > self.tuning.coast_min_speed {
                    self.speed = speed;
                    self.animating = true;
                }
                self.clear_deltas();
                TouchResponse::Released
            }
        }
    }
}
