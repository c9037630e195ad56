//! Pixel formats and conversion between them.
//!
//! ARGB8888 is the canonical intermediate: every conversion decodes the
//! source format to ARGB8888 and encodes to the target, so the function is
//! total over the declared set (the format-equality fast path just returns
//! the input). Buffer stride arithmetic everywhere in the toolkit relies on
//! [`PixelFormat::bytes_per_pixel`] being exact.
//!
//! The low-bit expansion on decode (e.g. `*527 + 23 >> 6` for 5-bit
//! channels) reproduces the display controller's rounding, so lossy round
//! trips stay within one quantization step per channel.

/// Hardware pixel encodings supported by the blitter and framebuffers.
///
/// `L8` is an indexed format; resolving indices through a palette happens at
/// blit time (the conversion here treats the index as a luminance value,
/// which is what the palette-less path has always done). `A8`/`A4`/
/// `Axxx8888` carry only coverage; their RGB comes from the active front
/// color at blit time.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PixelFormat {
    Argb8888,
    Rgb888,
    Rgb565,
    Argb1555,
    Argb4444,
    Argb6666,
    L8,
    Al88,
    L4,
    A8,
    A4,
    Axxx8888,
}

impl PixelFormat {
    pub const fn bytes_per_pixel(self) -> usize {
        match self {
            PixelFormat::Argb8888 | PixelFormat::Axxx8888 => 4,
            PixelFormat::Rgb888 | PixelFormat::Argb6666 => 3,
            PixelFormat::Rgb565
            | PixelFormat::Argb1555
            | PixelFormat::Argb4444
            | PixelFormat::Al88 => 2,
            PixelFormat::L8 | PixelFormat::L4 | PixelFormat::A8 | PixelFormat::A4 => 1,
        }
    }

    /// Whether the format carries an alpha channel at all.
    pub const fn has_alpha(self) -> bool {
        !matches!(
            self,
            PixelFormat::Rgb888 | PixelFormat::Rgb565 | PixelFormat::L8 | PixelFormat::L4
        )
    }
}

#[inline]
fn luma(r: u32, g: u32, b: u32) -> u32 {
    (r * 77 + g * 151 + b * 28) >> 8
}

/// Expand a 5-bit channel to 8 bits with rounding.
#[inline]
fn expand5(v: u32) -> u32 {
    (v * 527 + 23) >> 6
}

/// Expand a 6-bit channel to 8 bits with rounding.
#[inline]
fn expand6(v: u32) -> u32 {
    (v * 259 + 33) >> 6
}

/// Decode a raw pixel value in `format` to canonical ARGB8888.
pub fn to_argb8888(raw: u32, format: PixelFormat) -> u32 {
    match format {
        PixelFormat::Argb8888 => raw,
        PixelFormat::Rgb888 => (raw & 0x00FF_FFFF) | 0xFF00_0000,
        PixelFormat::Rgb565 => {
            let r = expand5((raw >> 11) & 0x1F);
            let g = expand6((raw >> 5) & 0x3F);
            let b = expand5(raw & 0x1F);
            0xFF00_0000 | (r << 16) | (g << 8) | b
        }
        PixelFormat::Argb1555 => {
            let a = if raw & 0x8000 != 0 { 0xFF } else { 0x00 };
            let r = expand5((raw >> 10) & 0x1F);
            let g = expand5((raw >> 5) & 0x1F);
            let b = expand5(raw & 0x1F);
            (a << 24) | (r << 16) | (g << 8) | b
        }
        PixelFormat::Argb4444 => {
            let a = (raw >> 12) & 0xF;
            let r = (raw >> 8) & 0xF;
            let g = (raw >> 4) & 0xF;
            let b = raw & 0xF;
            // nibble duplication: 0xF -> 0xFF
            (a << 28 | a << 24) | (r << 20 | r << 16) | (g << 12 | g << 8) | (b << 4 | b)
        }
        PixelFormat::Argb6666 => {
            let a = (raw >> 18) & 0x3F;
            let r = (raw >> 12) & 0x3F;
            let g = (raw >> 6) & 0x3F;
            let b = raw & 0x3F;
            let dup = |v: u32| (v << 2) | (v >> 4);
            (dup(a) << 24) | (dup(r) << 16) | (dup(g) << 8) | dup(b)
        }
        PixelFormat::L8 => {
            let l = raw & 0xFF;
            0xFF00_0000 | (l << 16) | (l << 8) | l
        }
        PixelFormat::Al88 => {
            let l = raw & 0xFF;
            let a = (raw >> 8) & 0xFF;
            (a << 24) | (l << 16) | (l << 8) | l
        }
        PixelFormat::L4 => {
            let l4 = raw & 0xF;
            let l = (l4 << 4) | l4;
            0xFF00_0000 | (l << 16) | (l << 8) | l
        }
        PixelFormat::A8 => (raw & 0xFF) << 24,
        PixelFormat::A4 => {
            let a4 = raw & 0xF;
            ((a4 << 4) | a4) << 24
        }
        PixelFormat::Axxx8888 => raw & 0xFF00_0000,
    }
}

/// Encode a canonical ARGB8888 color into `format`.
pub fn from_argb8888(color: u32, format: PixelFormat) -> u32 {
    let a = (color >> 24) & 0xFF;
    let r = (color >> 16) & 0xFF;
    let g = (color >> 8) & 0xFF;
    let b = color & 0xFF;
    match format {
        PixelFormat::Argb8888 => color,
        PixelFormat::Rgb888 => color & 0x00FF_FFFF,
        PixelFormat::Rgb565 => ((r >> 3) << 11) | ((g >> 2) << 5) | (b >> 3),
        PixelFormat::Argb1555 => ((a >> 7) << 15) | ((r >> 3) << 10) | ((g >> 3) << 5) | (b >> 3),
        PixelFormat::Argb4444 => ((a >> 4) << 12) | ((r >> 4) << 8) | ((g >> 4) << 4) | (b >> 4),
        PixelFormat::Argb6666 => ((a >> 2) << 18) | ((r >> 2) << 12) | ((g >> 2) << 6) | (b >> 2),
        PixelFormat::L8 => luma(r, g, b),
        PixelFormat::Al88 => (a << 8) | luma(r, g, b),
        PixelFormat::L4 => luma(r, g, b) >> 4,
        PixelFormat::A8 => a,
        PixelFormat::A4 => a >> 4,
        PixelFormat::Axxx8888 => color & 0xFF00_0000,
    }
}

/// Total conversion between any two declared formats.
pub fn convert(raw: u32, from: PixelFormat, to: PixelFormat) -> u32 {
    if from == to {
        return raw;
    }
    from_argb8888(to_argb8888(raw, from), to)
}
