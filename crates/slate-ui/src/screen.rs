//! Full-display screens.
//!
//! A screen is a panel stretched over the whole display, optionally backed
//! by a wall image the compositor restores under translucent widgets. When
//! no child holds the touch, a mostly-horizontal drag commits to a slide
//! gesture: the event fires once and the gesture is released, so a slide can
//! never also scroll or click.

use slate_core::{Color, EventKind, Point, Rect, TouchEvent, TouchResponse, TouchState};
use slate_render::{ImageData, Painter};

use crate::panel::Panel;
use crate::widget::{DrawCtx, TouchCtx, Widget, WidgetCore};

pub struct Screen {
    panel: Panel,
    backdrop: Option<ImageData>,
    slide_done: bool,
}

impl Screen {
    pub fn new(id: impl Into<std::sync::Arc<str>>, width: i32, height: i32) -> Self {
        let mut core = WidgetCore::new(id, Rect::new(0, 0, width, height));
        core.background = Color::BLACK;
        Screen {
            panel: Panel::new(core),
            backdrop: None,
            slide_done: false,
        }
    }

    pub fn set_backdrop(&mut self, image: ImageData) {
        self.backdrop = Some(image);
    }

    pub fn backdrop(&self) -> Option<&ImageData> {
        self.backdrop.as_ref()
    }

    pub fn add_child(&mut self, child: Box<dyn Widget>) {
        self.panel.add_child(child);
    }

    /// Let presses held on the screen itself run the long-press cycle.
    pub fn set_long_press_enabled(&mut self, enabled: bool) {
        self.panel.long_press_enabled = enabled;
    }

    /// Slide commits only while the screen itself holds the gesture: small
    /// vertical travel, large horizontal travel.
    fn slide_direction(&self, touch: TouchEvent) -> Option<EventKind> {
        let delta = touch.delta();
        let r = self.panel.core().rect;
        if delta.y.abs() < r.h / 10 && delta.x.abs() > r.w / 10 {
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
}

impl Widget for Screen {
    fn core(&self) -> &WidgetCore {
        self.panel.core()
    }

    fn core_mut(&mut self) -> &mut WidgetCore {
        self.panel.core_mut()
    }

    fn children_mut(&mut self) -> Option<&mut [Box<dyn Widget>]> {
        self.panel.children_mut()
    }

    fn draw(&mut self, painter: &mut Painter<'_>, ctx: &mut DrawCtx<'_>, origin: Point) {
        if self.backdrop.is_some() {
            // the wall is already in the work buffer; only children paint
            let abs = self.panel.core().absolute(origin);
            painter.push_bounds(abs);
            if let Some(children) = self.panel.children_mut() {
                for child in children {
                    child.draw(painter, ctx, Point::new(abs.x, abs.y));
                }
            }
            painter.pop_bounds();
        } else {
            self.panel.draw(painter, ctx, origin);
        }
    }

    fn process_touch(
        &mut self,
        touch: TouchEvent,
        ctx: &mut TouchCtx<'_>,
        origin: Point,
        margin: i32,
    ) -> TouchResponse {
        if touch.state == TouchState::Pressed {
            self.slide_done = false;
        }
        if touch.state == TouchState::Moving
            && !self.slide_done
            && self.panel.active_child().is_none()
            && self.panel.core().is_pressed()
        {
            if let Some(kind) = self.slide_direction(touch) {
                self.slide_done = true;
                ctx.push(&self.panel.core().id, kind);
                self.panel.core_mut().drop_capture();
                return TouchResponse::Released;
            }
        }
        self.panel.process_touch(touch, ctx, origin, margin)
    }
}
