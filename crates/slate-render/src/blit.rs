//! Pixel transfer engine.
//!
//! All bulk pixel movement funnels through [`Blitter`]. The software variant
//! does everything on the CPU; the hardware variant offers each operation to
//! an [`Accelerator`] first and falls back to the software path when the
//! accelerator declines. Callers never branch on acceleration themselves.

use slate_core::{blend, Color, Palette, PixelFormat, Rect};

use crate::framebuffer::FrameBuffer;
use crate::image::ImageData;

/// Borrowed view of source pixels for a composite operation.
#[derive(Clone, Copy)]
pub struct SourceView<'a> {
    data: &'a [u8],
    width: i32,
    height: i32,
    stride: usize,
    format: PixelFormat,
    palette: Option<&'a Palette>,
}

impl<'a> SourceView<'a> {
    pub fn new(
        data: &'a [u8],
        width: i32,
        height: i32,
        format: PixelFormat,
        palette: Option<&'a Palette>,
    ) -> Self {
        SourceView {
            data,
            width,
            height,
            stride: width as usize * format.bytes_per_pixel(),
            format,
            palette,
        }
    }

    /// View over an image's active frame. `None` when the image allocation
    /// is truncated.
    pub fn from_image(image: &'a ImageData) -> Option<Self> {
        Some(SourceView::new(
            image.frame_data()?,
            image.width(),
            image.height(),
            image.format(),
            image.palette(),
        ))
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn format(&self) -> PixelFormat {
        self.format
    }

    fn raw(&self, x: i32, y: i32) -> u32 {
        let bpp = self.format.bytes_per_pixel();
        let off = y as usize * self.stride + x as usize * bpp;
        let mut raw = 0u32;
        for i in 0..bpp {
            raw |= (*self.data.get(off + i).unwrap_or(&0) as u32) << (8 * i);
        }
        raw
    }

    /// Source pixel resolved to ARGB8888, applying the palette and the
    /// front-color substitution for coverage-only formats.
    fn resolve(&self, x: i32, y: i32, front: Color) -> Color {
        let raw = self.raw(x, y);
        match self.format {
            PixelFormat::L8 => match self.palette {
                Some(p) => p.lookup(raw as u8),
                None => Color::decode(raw, PixelFormat::L8),
            },
            // Coverage formats take RGB from the active front color and
            // modulate its alpha by the stored coverage.
            PixelFormat::A8 | PixelFormat::A4 | PixelFormat::Axxx8888 => {
                let coverage = Color::decode(raw, self.format).alpha() as u32;
                let a = coverage * front.alpha() as u32 / 255;
                front.with_alpha(a as u8)
            }
            f => Color::decode(raw, f),
        }
    }
}

/// Hardware 2D engine hook. Each method returns `true` when the engine took
/// the job; `false` sends the operation down the software path.
pub trait Accelerator {
    fn fill(&self, dst: &mut FrameBuffer, rect: Rect, color: Color) -> bool;
    fn composite(&self, dst: &mut FrameBuffer, src: &SourceView<'_>, x: i32, y: i32) -> bool;
}

/// Pixel-transfer strategy.
pub enum Blitter {
    Software,
    Hardware(Box<dyn Accelerator>),
}

impl Blitter {
    /// Fill `rect` (clipped to the buffer) with `color`, blending when the
    /// color is translucent.
    pub fn fill(&self, dst: &mut FrameBuffer, rect: Rect, color: Color) {
        let clipped = rect.intersect(&Rect::new(0, 0, dst.width(), dst.height()));
        if clipped.is_empty() || color.is_transparent() {
            return;
        }
        if let Blitter::Hardware(engine) = self {
            if engine.fill(dst, clipped, color) {
                return;
            }
        }
        let format = dst.format();
        if color.is_opaque() {
            let raw = color.encode(format);
            for y in clipped.y..clipped.bottom() {
                for x in clipped.x..clipped.right() {
                    dst.write_raw(x, y, raw);
                }
            }
        } else {
            for y in clipped.y..clipped.bottom() {
                for x in clipped.x..clipped.right() {
                    let bg = Color::decode(dst.read_raw(x, y), format);
                    dst.write_raw(x, y, blend(bg, color).encode(format));
                }
            }
        }
    }

    /// Composite `src` with its top-left at `(x, y)`, clipped to both the
    /// source extent and the destination buffer.
    ///
    /// `front` supplies RGB for coverage-only sources. When `background` is
    /// set, each destination pixel is replaced by `background` before the
    /// source blends over it, which is how the compositor restores the wall
    /// color under redrawn strips. `clip` further restricts the write area
    /// (pass the full buffer rect for no extra clipping).
    pub fn composite(
        &self,
        dst: &mut FrameBuffer,
        src: &SourceView<'_>,
        x: i32,
        y: i32,
        front: Color,
        background: Option<Color>,
        clip: Rect,
    ) {
        let dst_rect = Rect::new(x, y, src.width(), src.height())
            .intersect(&Rect::new(0, 0, dst.width(), dst.height()))
            .intersect(&clip);
        if dst_rect.is_empty() {
            return;
        }
        if background.is_none() {
            if let Blitter::Hardware(engine) = self {
                if engine.composite(dst, src, x, y) {
                    return;
                }
            }
        }
        let format = dst.format();
        for dy in dst_rect.y..dst_rect.bottom() {
            for dx in dst_rect.x..dst_rect.right() {
                let fg = src.resolve(dx - x, dy - y, front);
                let bg = match background {
                    Some(c) => c,
                    None => Color::decode(dst.read_raw(dx, dy), format),
                };
                dst.write_raw(dx, dy, blend(bg, fg).encode(format));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn fill_clips_to_buffer() {
        let mut fb = FrameBuffer::new(4, 4, PixelFormat::Argb8888);
        Blitter::Software.fill(&mut fb, Rect::new(2, 2, 10, 10), Color::RED);
        assert_eq!(fb.read_raw(3, 3), Color::RED.0);
        assert_eq!(fb.read_raw(1, 1), 0);
    }

    #[test]
    fn coverage_source_takes_front_color() {
        let mut fb = FrameBuffer::new(2, 1, PixelFormat::Argb8888);
        let data = [0xFFu8, 0x00];
        let src = SourceView::new(&data, 2, 1, PixelFormat::A8, None);
        Blitter::Software.composite(&mut fb, &src, 0, 0, Color::GREEN, None, Rect::new(0, 0, 2, 1));
        assert_eq!(fb.read_raw(0, 0), Color::GREEN.0);
        assert_eq!(fb.read_raw(1, 0), 0);
    }

    #[test]
    fn indexed_source_goes_through_palette() {
        let mut fb = FrameBuffer::new(2, 1, PixelFormat::Argb8888);
        let palette = Palette::new(vec![Color::TRANSPARENT, Color::BLUE]);
        let data = [1u8, 0];
        let src = SourceView::new(&data, 2, 1, PixelFormat::L8, Some(&palette));
        Blitter::Software.composite(&mut fb, &src, 0, 0, Color::WHITE, None, Rect::new(0, 0, 2, 1));
        assert_eq!(fb.read_raw(0, 0), Color::BLUE.0);
        assert_eq!(fb.read_raw(1, 0), 0);
    }

    #[test]
    fn background_replaces_before_blend() {
        let mut fb = FrameBuffer::new(1, 1, PixelFormat::Argb8888);
        fb.write_raw(0, 0, Color::RED.0);
        let data = [0u8]; // fully transparent coverage
        let src = SourceView::new(&data, 1, 1, PixelFormat::A8, None);
        Blitter::Software.composite(
            &mut fb,
            &src,
            0,
            0,
            Color::WHITE,
            Some(Color::GREEN),
            Rect::new(0, 0, 1, 1),
        );
        assert_eq!(fb.read_raw(0, 0), Color::GREEN.0);
    }

    struct CountingEngine {
        fills: Cell<u32>,
        accept: bool,
    }

    impl Accelerator for CountingEngine {
        fn fill(&self, dst: &mut FrameBuffer, rect: Rect, color: Color) -> bool {
            self.fills.set(self.fills.get() + 1);
            if self.accept {
                let raw = color.encode(dst.format());
                for y in rect.y..rect.bottom() {
                    for x in rect.x..rect.right() {
                        dst.write_raw(x, y, raw);
                    }
                }
            }
            self.accept
        }

        fn composite(&self, _: &mut FrameBuffer, _: &SourceView<'_>, _: i32, _: i32) -> bool {
            false
        }
    }

    #[test]
    fn declined_hardware_op_falls_back_to_software() {
        let mut fb = FrameBuffer::new(2, 2, PixelFormat::Rgb565);
        let blitter = Blitter::Hardware(Box::new(CountingEngine {
            fills: Cell::new(0),
            accept: false,
        }));
        blitter.fill(&mut fb, Rect::new(0, 0, 2, 2), Color::WHITE);
        assert_eq!(fb.read_raw(1, 1), 0xFFFF);
    }
}
