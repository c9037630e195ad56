//! Decoded image container.
//!
//! Images arrive from the asset pipeline already decoded into one of the
//! supported pixel formats. Multi-frame images store all frames in one
//! contiguous allocation; the active frame selects which slice the blitter
//! reads.

use slate_core::{Color, Palette, PixelFormat};

#[derive(Clone, Debug)]
pub struct ImageData {
    width: i32,
    height: i32,
    format: PixelFormat,
    /// All frames back to back, `frame_count * height` rows.
    data: Vec<u8>,
    palette: Option<Palette>,
    frame_count: usize,
    active_frame: usize,
}

impl ImageData {
    pub fn new(width: i32, height: i32, format: PixelFormat, data: Vec<u8>) -> Self {
        ImageData {
            width,
            height,
            format,
            data,
            palette: None,
            frame_count: 1,
            active_frame: 0,
        }
    }

    pub fn with_palette(mut self, palette: Palette) -> Self {
        self.palette = Some(palette);
        self
    }

    pub fn with_frames(mut self, frame_count: usize) -> Self {
        self.frame_count = frame_count.max(1);
        self
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

    pub fn palette(&self) -> Option<&Palette> {
        self.palette.as_ref()
    }

    pub fn frame_count(&self) -> usize {
        self.frame_count
    }

    pub fn active_frame(&self) -> usize {
        self.active_frame
    }

    /// Select the frame the blitter reads. Out-of-range wraps, so animation
    /// drivers can just increment.
    pub fn set_active_frame(&mut self, frame: usize) {
        self.active_frame = frame % self.frame_count;
    }

    pub fn row_bytes(&self) -> usize {
        self.width as usize * self.format.bytes_per_pixel()
    }

    fn frame_bytes(&self) -> usize {
        self.row_bytes() * self.height as usize
    }

    /// Bytes of the active frame, or `None` when the allocation is shorter
    /// than the frame table claims.
    pub fn frame_data(&self) -> Option<&[u8]> {
        let start = self.active_frame * self.frame_bytes();
        let end = start + self.frame_bytes();
        self.data.get(start..end)
    }

    /// Raw pixel value at `(x, y)` within the active frame.
    pub fn raw_pixel(&self, x: i32, y: i32) -> Option<u32> {
        if x < 0 || y < 0 || x >= self.width || y >= self.height {
            return None;
        }
        let frame = self.frame_data()?;
        let bpp = self.format.bytes_per_pixel();
        let off = y as usize * self.row_bytes() + x as usize * bpp;
        let bytes = frame.get(off..off + bpp)?;
        let mut raw = 0u32;
        for (i, b) in bytes.iter().enumerate() {
            raw |= (*b as u32) << (8 * i);
        }
        Some(raw)
    }

    /// Pixel resolved to canonical ARGB8888, going through the palette for
    /// indexed data.
    pub fn pixel(&self, x: i32, y: i32) -> Option<Color> {
        let raw = self.raw_pixel(x, y)?;
        if self.format == PixelFormat::L8 {
            if let Some(palette) = &self.palette {
                return Some(palette.lookup(raw as u8));
            }
        }
        Some(Color::decode(raw, self.format))
    }

    /// Whether compositing this image can leave background showing through.
    pub fn has_transparency(&self) -> bool {
        match self.format {
            PixelFormat::L8 => self
                .palette
                .as_ref()
                .map(|p| p.has_transparency())
                .unwrap_or(false),
            f => f.has_alpha(),
        }
    }
}
