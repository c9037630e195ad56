//! Software rasterizer over a work framebuffer.
//!
//! All widget drawing goes through a [`Painter`]. It owns a clip-bounds
//! stack: containers push their content rect before handing the painter to
//! children and pop afterwards, so a child cannot paint outside its parent.
//! Primitives blend through the canonical ARGB8888 path and encode into
//! whatever format the work buffer uses.

use std::f32::consts::PI;

use slate_core::{angle_diff, blend, constrain_angle, Color, Point, Rect};
use smallvec::SmallVec;

use crate::blit::{Blitter, SourceView};
use crate::framebuffer::FrameBuffer;
use crate::image::ImageData;

pub struct Painter<'a> {
    target: &'a mut FrameBuffer,
    blitter: &'a Blitter,
    bounds: SmallVec<[Rect; 8]>,
    clip: Rect,
}

impl<'a> Painter<'a> {
    pub fn new(target: &'a mut FrameBuffer, blitter: &'a Blitter) -> Self {
        let clip = Rect::new(0, 0, target.width(), target.height());
        Painter {
            target,
            blitter,
            bounds: SmallVec::new(),
            clip,
        }
    }

    fn full_rect(&self) -> Rect {
        Rect::new(0, 0, self.target.width(), self.target.height())
    }

    pub fn clip(&self) -> Rect {
        self.clip
    }

    /// Restrict drawing to the intersection of `rect` and the current clip.
    pub fn push_bounds(&mut self, rect: Rect) {
        self.bounds.push(self.clip);
        self.clip = self.clip.intersect(&rect);
    }

    pub fn pop_bounds(&mut self) {
        if let Some(prev) = self.bounds.pop() {
            self.clip = prev;
        }
    }

    /// Drop the whole stack; called at the top of each frame.
    pub fn reset_bounds(&mut self) {
        self.bounds.clear();
        self.clip = self.full_rect();
    }

    pub fn draw_pixel(&mut self, x: i32, y: i32, color: Color) {
        if x < self.clip.x || x >= self.clip.right() || y < self.clip.y || y >= self.clip.bottom() {
            return;
        }
        let format = self.target.format();
        if color.is_opaque() {
            self.target.write_raw(x, y, color.encode(format));
        } else if !color.is_transparent() {
            let bg = Color::decode(self.target.read_raw(x, y), format);
            self.target.write_raw(x, y, blend(bg, color).encode(format));
        }
    }

    pub fn fill_rect(&mut self, rect: Rect, color: Color) {
        self.blitter
            .fill(self.target, rect.intersect(&self.clip), color);
    }

    pub fn draw_hline(&mut self, x: i32, y: i32, len: i32, color: Color) {
        self.fill_rect(Rect::new(x, y, len, 1), color);
    }

    pub fn draw_vline(&mut self, x: i32, y: i32, len: i32, color: Color) {
        self.fill_rect(Rect::new(x, y, 1, len), color);
    }

    pub fn draw_rect(&mut self, rect: Rect, color: Color) {
        if rect.is_empty() {
            return;
        }
        self.draw_hline(rect.x, rect.y, rect.w, color);
        self.draw_hline(rect.x, rect.bottom() - 1, rect.w, color);
        self.draw_vline(rect.x, rect.y + 1, rect.h - 2, color);
        self.draw_vline(rect.right() - 1, rect.y + 1, rect.h - 2, color);
    }

    /// Bresenham line, endpoints inclusive.
    pub fn draw_line(&mut self, x0: i32, y0: i32, x1: i32, y1: i32, color: Color) {
        let dx = (x1 - x0).abs();
        let dy = -(y1 - y0).abs();
        let sx = if x0 < x1 { 1 } else { -1 };
        let sy = if y0 < y1 { 1 } else { -1 };
        let mut err = dx + dy;
        let (mut x, mut y) = (x0, y0);
        loop {
            self.draw_pixel(x, y, color);
            if x == x1 && y == y1 {
                break;
            }
            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x += sx;
            }
            if e2 <= dx {
                err += dx;
                y += sy;
            }
        }
    }

    fn weighted(&mut self, x: i32, y: i32, color: Color, weight: u32) {
        let a = color.alpha() as u32 * weight / 255;
        self.draw_pixel(x, y, color.with_alpha(a as u8));
    }

    /// Wu antialiased line. Axis-aligned and exact-diagonal lines degrade to
    /// the solid path since they need no coverage ramp. Endpoints are drawn
    /// solid.
    pub fn draw_line_aa(&mut self, x0: i32, y0: i32, x1: i32, y1: i32, color: Color) {
        // work top to bottom
        let (mut x0, mut y0, x1, y1) = if y0 > y1 {
            (x1, y1, x0, y0)
        } else {
            (x0, y0, x1, y1)
        };
        let dx = x1 - x0;
        let dy = y1 - y0;
        if dx == 0 || dy == 0 || dx.abs() == dy {
            self.draw_line(x0, y0, x1, y1, color);
            return;
        }
        self.draw_pixel(x0, y0, color);
        self.draw_pixel(x1, y1, color);

        let xdir = if dx > 0 { 1 } else { -1 };
        let adx = dx.abs() as u32;
        let ady = dy as u32;
        let mut err_acc: u32 = 0;
        const INTENSITY_SHIFT: u32 = 8;
        const WEIGHT_MASK: u32 = 255;

        if ady > adx {
            // y-major
            let err_adj = (adx << 16) / ady;
            for _ in 0..ady.saturating_sub(1) {
                let prev = err_acc;
                err_acc = (err_acc + err_adj) & 0xFFFF;
                if err_acc <= prev {
                    x0 += xdir;
                }
                y0 += 1;
                let w = err_acc >> INTENSITY_SHIFT;
                self.weighted(x0, y0, color, w ^ WEIGHT_MASK);
                self.weighted(x0 + xdir, y0, color, w);
            }
        } else {
            // x-major
            let err_adj = (ady << 16) / adx;
            for _ in 0..adx.saturating_sub(1) {
                let prev = err_acc;
                err_acc = (err_acc + err_adj) & 0xFFFF;
                if err_acc <= prev {
                    y0 += 1;
                }
                x0 += xdir;
                let w = err_acc >> INTENSITY_SHIFT;
                self.weighted(x0, y0, color, w ^ WEIGHT_MASK);
                self.weighted(x0, y0 + 1, color, w);
            }
        }
    }

    /// Midpoint circle outline.
    pub fn draw_circle(&mut self, cx: i32, cy: i32, radius: i32, color: Color) {
        if radius < 0 {
            return;
        }
        let mut x = 0;
        let mut y = radius;
        let mut d = 3 - 2 * radius;
        while x <= y {
            for (px, py) in [
                (cx + x, cy + y),
                (cx - x, cy + y),
                (cx + x, cy - y),
                (cx - x, cy - y),
                (cx + y, cy + x),
                (cx - y, cy + x),
                (cx + y, cy - x),
                (cx - y, cy - x),
            ] {
                self.draw_pixel(px, py, color);
            }
            if d < 0 {
                d += (x << 2) + 6;
            } else {
                d += ((x - y) << 2) + 10;
                y -= 1;
            }
            x += 1;
        }
    }

    /// Filled circle via horizontal spans from the same midpoint walk.
    pub fn fill_circle(&mut self, cx: i32, cy: i32, radius: i32, color: Color) {
        if radius < 0 {
            return;
        }
        let mut x = 0;
        let mut y = radius;
        let mut d = 3 - 2 * radius;
        while x <= y {
            self.draw_hline(cx - x, cy + y, 2 * x + 1, color);
            self.draw_hline(cx - x, cy - y, 2 * x + 1, color);
            self.draw_hline(cx - y, cy + x, 2 * y + 1, color);
            self.draw_hline(cx - y, cy - x, 2 * y + 1, color);
            if d < 0 {
                d += (x << 2) + 6;
            } else {
                d += ((x - y) << 2) + 10;
                y -= 1;
            }
            x += 1;
        }
    }

    /// Ellipse outline: the circle walk at the vertical radius with the
    /// horizontal coordinate rescaled by rx/ry.
    pub fn draw_ellipse(&mut self, cx: i32, cy: i32, rx: i32, ry: i32, color: Color) {
        if rx <= 0 || ry <= 0 {
            return;
        }
        if rx == ry {
            self.draw_circle(cx, cy, rx, color);
            return;
        }
        let k = rx as f32 / ry as f32;
        let mut x = 0;
        let mut y = ry;
        let mut d = 3 - 2 * ry;
        let scale = |v: i32| (v as f32 * k + 0.5) as i32;
        while x <= y {
            for (px, py) in [
                (cx + scale(x), cy + y),
                (cx - scale(x), cy + y),
                (cx + scale(x), cy - y),
                (cx - scale(x), cy - y),
                (cx + scale(y), cy + x),
                (cx - scale(y), cy + x),
                (cx + scale(y), cy - x),
                (cx - scale(y), cy - x),
            ] {
                self.draw_pixel(px, py, color);
            }
            if d < 0 {
                d += (x << 2) + 6;
            } else {
                d += ((x - y) << 2) + 10;
                y -= 1;
            }
            x += 1;
        }
    }

    pub fn fill_ellipse(&mut self, cx: i32, cy: i32, rx: i32, ry: i32, color: Color) {
        if rx <= 0 || ry <= 0 {
            return;
        }
        let k = rx as f32 / ry as f32;
        let mut x = 0;
        let mut y = ry;
        let mut d = 3 - 2 * ry;
        let scale = |v: i32| (v as f32 * k + 0.5) as i32;
        while x <= y {
            let sx = scale(x);
            let sy = scale(y);
            self.draw_hline(cx - sx, cy + y, 2 * sx + 1, color);
            self.draw_hline(cx - sx, cy - y, 2 * sx + 1, color);
            self.draw_hline(cx - sy, cy + x, 2 * sy + 1, color);
            self.draw_hline(cx - sy, cy - x, 2 * sy + 1, color);
            if d < 0 {
                d += (x << 2) + 6;
            } else {
                d += ((x - y) << 2) + 10;
                y -= 1;
            }
            x += 1;
        }
    }

    /// Flat-filled triangle. The longest vertical edge anchors the span
    /// interpolation; the two shorter edges supply the opposite span ends.
    pub fn fill_triangle(&mut self, a: Point, b: Point, c: Point, color: Color) {
        // sort by y
        let mut v = [a, b, c];
        v.sort_by_key(|p| p.y);
        let [top, mid, bot] = v;
        if top.y == bot.y {
            let xs = top.x.min(mid.x).min(bot.x);
            let xe = top.x.max(mid.x).max(bot.x);
            self.draw_hline(xs, top.y, xe - xs + 1, color);
            return;
        }
        let long_dx = (bot.x - top.x) as f32 / (bot.y - top.y) as f32;
        let mut span = |y: i32, x_long: f32, x_other: f32| {
            let (mut xs, mut xe) = (
                (x_long + 0.5).floor() as i32,
                (x_other + 0.5).floor() as i32,
            );
            if xs > xe {
                std::mem::swap(&mut xs, &mut xe);
            }
            self.draw_hline(xs, y, xe - xs + 1, color);
        };
        if mid.y > top.y {
            let dx = (mid.x - top.x) as f32 / (mid.y - top.y) as f32;
            for y in top.y..=mid.y {
                let t = (y - top.y) as f32;
                span(y, top.x as f32 + long_dx * t, top.x as f32 + dx * t);
            }
        }
        if bot.y > mid.y {
            let dx = (bot.x - mid.x) as f32 / (bot.y - mid.y) as f32;
            for y in mid.y..=bot.y {
                let tl = (y - top.y) as f32;
                let ts = (y - mid.y) as f32;
                span(y, top.x as f32 + long_dx * tl, mid.x as f32 + dx * ts);
            }
        }
    }

    /// Filled arc between two angles (degrees, 0 at twelve o'clock, growing
    /// clockwise) as an 80-step triangle fan, with the color interpolated
    /// from `start_color` at the start angle to `end_color` at the end.
    pub fn fill_arc(
        &mut self,
        cx: i32,
        cy: i32,
        radius: i32,
        start_angle: f32,
        end_angle: f32,
        start_color: Color,
        end_color: Color,
    ) {
        const STEPS: i32 = 80;
        if radius <= 0 {
            return;
        }
        let start = constrain_angle(start_angle);
        let mut sweep = angle_diff(start, constrain_angle(end_angle));
        if sweep < 0.0 {
            sweep += 360.0;
        }
        if sweep == 0.0 {
            return;
        }
        let step = sweep / STEPS as f32;
        let point_at = |deg: f32| {
            let rad = (deg - 90.0) * PI / 180.0;
            Point::new(
                cx + (radius as f32 * rad.cos() + 0.5).floor() as i32,
                cy + (radius as f32 * rad.sin() + 0.5).floor() as i32,
            )
        };
        let lerp_color = |t: f32| {
            let ch = |s: u8, e: u8| (s as f32 + (e as f32 - s as f32) * t + 0.5) as u8;
            Color::rgba(
                ch(start_color.red(), end_color.red()),
                ch(start_color.green(), end_color.green()),
                ch(start_color.blue(), end_color.blue()),
                ch(start_color.alpha(), end_color.alpha()),
            )
        };
        let center = Point::new(cx, cy);
        for i in 0..STEPS {
            let a0 = start + step * i as f32;
            let a1 = start + step * (i + 1) as f32;
            let color = lerp_color((i as f32 + 0.5) / STEPS as f32);
            self.fill_triangle(center, point_at(a0), point_at(a1), color);
        }
    }

    /// Composite an image with its top-left at `(x, y)`, honoring the clip
    /// stack. Images whose allocation is shorter than their header claims
    /// are skipped.
    pub fn blit_image(&mut self, image: &ImageData, x: i32, y: i32) {
        let Some(src) = SourceView::from_image(image) else {
            log::warn!(
                "image {}x{} truncated, skipping blit",
                image.width(),
                image.height()
            );
            return;
        };
        self.blitter
            .composite(self.target, &src, x, y, Color::WHITE, None, self.clip);
    }

    /// Composite a coverage bitmap (one byte per pixel) in `color`.
    pub fn blit_coverage(&mut self, data: &[u8], w: i32, h: i32, x: i32, y: i32, color: Color) {
        let src = SourceView::new(data, w, h, slate_core::PixelFormat::A8, None);
        self.blitter
            .composite(self.target, &src, x, y, color, None, self.clip);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slate_core::PixelFormat;

    fn canvas(w: i32, h: i32) -> FrameBuffer {
        FrameBuffer::new(w, h, PixelFormat::Argb8888)
    }

    fn count_colored(fb: &FrameBuffer, color: Color) -> usize {
        let mut n = 0;
        for y in 0..fb.height() {
            for x in 0..fb.width() {
                if fb.read_raw(x, y) == color.0 {
                    n += 1;
                }
            }
        }
        n
    }

    #[test]
    fn horizontal_line_paints_inclusive_endpoints() {
        let mut fb = canvas(20, 20);
        let blitter = Blitter::Software;
        let mut p = Painter::new(&mut fb, &blitter);
        p.draw_line(0, 0, 10, 0, Color::RED);
        assert_eq!(count_colored(&fb, Color::RED), 11);
        for x in 0..=10 {
            assert_eq!(fb.read_raw(x, 0), Color::RED.0);
        }
    }

    #[test]
    fn bounds_stack_clips_and_restores() {
        let mut fb = canvas(10, 10);
        let blitter = Blitter::Software;
        let mut p = Painter::new(&mut fb, &blitter);
        p.push_bounds(Rect::new(2, 2, 4, 4));
        p.fill_rect(Rect::new(0, 0, 10, 10), Color::GREEN);
        p.pop_bounds();
        p.draw_pixel(0, 0, Color::RED);
        assert_eq!(fb.read_raw(0, 0), Color::RED.0);
        assert_eq!(fb.read_raw(1, 1), 0);
        assert_eq!(fb.read_raw(2, 2), Color::GREEN.0);
        assert_eq!(fb.read_raw(5, 5), Color::GREEN.0);
        assert_eq!(fb.read_raw(6, 6), 0);
    }

    #[test]
    fn nested_bounds_intersect() {
        let mut fb = canvas(10, 10);
        let blitter = Blitter::Software;
        let mut p = Painter::new(&mut fb, &blitter);
        p.push_bounds(Rect::new(0, 0, 5, 5));
        p.push_bounds(Rect::new(3, 3, 5, 5));
        assert_eq!(p.clip(), Rect::new(3, 3, 2, 2));
        p.reset_bounds();
        assert_eq!(p.clip(), Rect::new(0, 0, 10, 10));
    }

    #[test]
    fn rect_outline_leaves_interior() {
        let mut fb = canvas(8, 8);
        let blitter = Blitter::Software;
        let mut p = Painter::new(&mut fb, &blitter);
        p.draw_rect(Rect::new(1, 1, 5, 5), Color::BLUE);
        assert_eq!(fb.read_raw(1, 1), Color::BLUE.0);
        assert_eq!(fb.read_raw(5, 5), Color::BLUE.0);
        assert_eq!(fb.read_raw(3, 3), 0);
    }

    #[test]
    fn circle_is_symmetric() {
        let mut fb = canvas(21, 21);
        let blitter = Blitter::Software;
        let mut p = Painter::new(&mut fb, &blitter);
        p.draw_circle(10, 10, 6, Color::WHITE);
        assert_eq!(fb.read_raw(10, 4), Color::WHITE.0);
        assert_eq!(fb.read_raw(10, 16), Color::WHITE.0);
        assert_eq!(fb.read_raw(4, 10), Color::WHITE.0);
        assert_eq!(fb.read_raw(16, 10), Color::WHITE.0);
        assert_eq!(fb.read_raw(10, 10), 0);
    }

    #[test]
    fn filled_circle_covers_center() {
        let mut fb = canvas(21, 21);
        let blitter = Blitter::Software;
        let mut p = Painter::new(&mut fb, &blitter);
        p.fill_circle(10, 10, 5, Color::RED);
        assert_eq!(fb.read_raw(10, 10), Color::RED.0);
        assert_eq!(fb.read_raw(10, 5), Color::RED.0);
        assert_eq!(fb.read_raw(0, 0), 0);
    }

    #[test]
    fn triangle_fills_spans() {
        let mut fb = canvas(20, 20);
        let blitter = Blitter::Software;
        let mut p = Painter::new(&mut fb, &blitter);
        p.fill_triangle(
            Point::new(2, 2),
            Point::new(12, 2),
            Point::new(2, 12),
            Color::GREEN,
        );
        assert_eq!(fb.read_raw(3, 3), Color::GREEN.0);
        assert_eq!(fb.read_raw(2, 2), Color::GREEN.0);
        assert_eq!(fb.read_raw(15, 15), 0);
    }

    #[test]
    fn aa_line_degenerates_to_solid_on_axes() {
        let mut fb = canvas(10, 10);
        let blitter = Blitter::Software;
        let mut p = Painter::new(&mut fb, &blitter);
        p.draw_line_aa(0, 3, 7, 3, Color::RED);
        for x in 0..=7 {
            assert_eq!(fb.read_raw(x, 3), Color::RED.0);
        }
    }

    #[test]
    fn aa_line_endpoints_are_solid() {
        let mut fb = canvas(20, 20);
        let blitter = Blitter::Software;
        let mut p = Painter::new(&mut fb, &blitter);
        p.draw_line_aa(1, 1, 9, 4, Color::WHITE);
        assert_eq!(fb.read_raw(1, 1), Color::WHITE.0);
        assert_eq!(fb.read_raw(9, 4), Color::WHITE.0);
    }

    #[test]
    fn arc_full_sweep_paints_ring_area() {
        let mut fb = canvas(41, 41);
        let blitter = Blitter::Software;
        let mut p = Painter::new(&mut fb, &blitter);
        p.fill_arc(20, 20, 10, 0.0, 359.9, Color::RED, Color::RED);
        assert_eq!(fb.read_raw(20, 20), Color::RED.0);
        assert_eq!(fb.read_raw(20, 12), Color::RED.0);
        assert_eq!(fb.read_raw(0, 0), 0);
    }
}
