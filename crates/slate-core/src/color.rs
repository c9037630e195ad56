//! ARGB8888 color value and alpha compositing.

use crate::format::{convert, PixelFormat};

/// A color in canonical ARGB8888 layout, alpha in the top byte.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Color(pub u32);

impl Color {
    pub const TRANSPARENT: Color = Color(0x0000_0000);
    pub const BLACK: Color = Color(0xFF00_0000);
    pub const WHITE: Color = Color(0xFFFF_FFFF);
    pub const RED: Color = Color(0xFFFF_0000);
    pub const GREEN: Color = Color(0xFF00_FF00);
    pub const BLUE: Color = Color(0xFF00_00FF);

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Color {
        Color(((a as u32) << 24) | ((r as u32) << 16) | ((g as u32) << 8) | b as u32)
    }

    pub const fn alpha(self) -> u8 {
        (self.0 >> 24) as u8
    }

    pub const fn red(self) -> u8 {
        (self.0 >> 16) as u8
    }

    pub const fn green(self) -> u8 {
        (self.0 >> 8) as u8
    }

    pub const fn blue(self) -> u8 {
        self.0 as u8
    }

    pub const fn is_opaque(self) -> bool {
        self.0 >> 24 == 0xFF
    }

    pub const fn is_transparent(self) -> bool {
        self.0 >> 24 == 0
    }

    pub fn with_alpha(self, a: u8) -> Color {
        Color((self.0 & 0x00FF_FFFF) | ((a as u32) << 24))
    }

    /// Encode into a raw pixel value of the given format.
    pub fn encode(self, format: PixelFormat) -> u32 {
        convert(self.0, PixelFormat::Argb8888, format)
    }

    /// Decode a raw pixel value of the given format.
    pub fn decode(raw: u32, format: PixelFormat) -> Color {
        Color(convert(raw, format, PixelFormat::Argb8888))
    }
}

impl From<u32> for Color {
    fn from(v: u32) -> Self {
        Color(v)
    }
}

/// Composite `fg` over `bg`, both ARGB8888 with straight (non-premultiplied)
/// alpha.
///
/// The result alpha is `a_fg + a_bg - a_fg*a_bg/255`; when it comes out zero
/// the whole pixel is zero. An opaque foreground short-circuits to `fg` and a
/// fully transparent one to `bg`, so the arithmetic path only runs for true
/// partial coverage.
pub fn blend(bg: Color, fg: Color) -> Color {
    let a_fg = (fg.0 >> 24) & 0xFF;
    if a_fg == 0xFF {
        return fg;
    }
    if a_fg == 0 {
        return bg;
    }
    let a_bg = (bg.0 >> 24) & 0xFF;
    let a_mult = a_fg * a_bg / 255;
    let a_r = a_fg + a_bg - a_mult;
    if a_r == 0 {
        return Color(0);
    }
    let ch = |shift: u32| {
        let f = (fg.0 >> shift) & 0xFF;
        let b = (bg.0 >> shift) & 0xFF;
        ((f * a_fg + b * a_bg - b * a_mult) / a_r) & 0xFF
    };
    Color((a_r << 24) | (ch(16) << 16) | (ch(8) << 8) | ch(0))
}

/// Color lookup table for indexed (`L8`) image data.
///
/// Entries are ARGB8888. `has_transparency` is computed once at construction
/// so the blitter can pick the opaque fast path without rescanning.
#[derive(Clone, Debug)]
pub struct Palette {
    entries: Vec<Color>,
    has_transparency: bool,
}

impl Palette {
    pub fn new(entries: Vec<Color>) -> Palette {
        let has_transparency = entries.iter().any(|c| !c.is_opaque());
        Palette {
            entries,
            has_transparency,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Out-of-range indices resolve to transparent.
    pub fn lookup(&self, index: u8) -> Color {
        self.entries
            .get(index as usize)
            .copied()
            .unwrap_or(Color::TRANSPARENT)
    }

    pub fn has_transparency(&self) -> bool {
        self.has_transparency
    }
}
