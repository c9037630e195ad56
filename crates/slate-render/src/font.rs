//! Bitmap fonts.
//!
//! A font is a fixed-height set of variable-width glyphs stored as A8
//! coverage bitmaps. Both text measurement and text drawing run the same
//! layout walk, so a string is always drawn exactly as wide as it measures.

use std::collections::HashMap;

use slate_core::SlateError;

#[derive(Clone, Debug)]
pub struct Glyph {
    pub width: i32,
    /// Horizontal distance to the next glyph origin, before kerning.
    pub advance: i32,
    /// `width * font_height` coverage bytes, row major.
    pub bitmap: Vec<u8>,
}

#[derive(Clone, Debug)]
pub struct Font {
    height: i32,
    space_width: i32,
    /// Spacing between glyph pairs without an explicit kerning entry.
    default_kerning: i32,
    kerning: HashMap<(char, char), i32>,
    glyphs: HashMap<char, Glyph>,
}

impl Font {
    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn space_width(&self) -> i32 {
        self.space_width
    }

    /// Kerning adjustment between a pair of characters.
    pub fn kerning(&self, left: char, right: char) -> i32 {
        self.kerning
            .get(&(left, right))
            .copied()
            .unwrap_or(self.default_kerning)
    }

    /// Look up `c`, substituting `'_'` for anything the font lacks. Returns
    /// `None` only when the substitute is missing too.
    pub fn glyph(&self, c: char) -> Option<&Glyph> {
        if let Some(g) = self.glyphs.get(&c) {
            return Some(g);
        }
        log::debug!("font has no glyph for {c:?}, substituting '_'");
        self.glyphs.get(&'_')
    }

    /// The single layout walk shared by measurement and drawing. Calls
    /// `visit` with the x offset and glyph of every drawable character and
    /// returns the total advance width.
    pub fn walk<F: FnMut(i32, &Glyph)>(&self, text: &str, mut visit: F) -> i32 {
        let mut x = 0;
        // kerning pairs look through spaces: the left side of the pair is
        // the last drawn glyph, even when spaces intervene
        let mut prev: Option<char> = None;
        for c in text.chars() {
            if c == ' ' {
                x += self.space_width;
                continue;
            }
            let Some(glyph) = self.glyph(c) else {
                continue;
            };
            if let Some(left) = prev {
                x += self.kerning(left, c);
            }
            visit(x, glyph);
            x += glyph.advance;
            prev = Some(c);
        }
        x
    }

    pub fn text_width(&self, text: &str) -> i32 {
        self.walk(text, |_, _| {})
    }
}

/// Validating constructor for [`Font`].
pub struct FontBuilder {
    height: i32,
    space_width: i32,
    default_kerning: i32,
    kerning: HashMap<(char, char), i32>,
    glyphs: HashMap<char, Glyph>,
}

impl FontBuilder {
    pub fn new(height: i32) -> Self {
        FontBuilder {
            height,
            space_width: height / 3,
            default_kerning: 1,
            kerning: HashMap::new(),
            glyphs: HashMap::new(),
        }
    }

    pub fn space_width(mut self, w: i32) -> Self {
        self.space_width = w;
        self
    }

    pub fn kerning(mut self, k: i32) -> Self {
        self.default_kerning = k;
        self
    }

    /// Override the spacing for one character pair.
    pub fn kerning_pair(mut self, left: char, right: char, adjust: i32) -> Self {
        self.kerning.insert((left, right), adjust);
        self
    }

    /// Add a glyph whose bitmap must hold exactly `width * height` bytes.
    pub fn glyph(mut self, c: char, width: i32, bitmap: Vec<u8>) -> Result<Self, SlateError> {
        let expected = (width * self.height) as usize;
        if width <= 0 || bitmap.len() != expected {
            return Err(SlateError::FontData(format!(
                "glyph {c:?}: {} bytes for {}x{}",
                bitmap.len(),
                width,
                self.height
            )));
        }
        self.glyphs.insert(
            c,
            Glyph {
                width,
                advance: width,
                bitmap,
            },
        );
        Ok(self)
    }

    pub fn build(self) -> Result<Font, SlateError> {
        if self.height <= 0 {
            return Err(SlateError::FontData("non-positive height".into()));
        }
        if self.glyphs.is_empty() {
            return Err(SlateError::FontData("no glyphs".into()));
        }
        Ok(Font {
            height: self.height,
            space_width: self.space_width,
            default_kerning: self.default_kerning,
            kerning: self.kerning,
            glyphs: self.glyphs,
        })
    }
}

#[cfg(test)]
pub(crate) mod test_fonts {
    use super::*;

    /// 3x4 fully-solid glyphs for 'a', 'b' and '_'.
    pub fn solid() -> Font {
        let bitmap = vec![0xFF; 12];
        FontBuilder::new(4)
            .space_width(2)
            .kerning(1)
            .glyph('a', 3, bitmap.clone())
            .unwrap()
            .glyph('b', 3, bitmap.clone())
            .unwrap()
            .glyph('_', 3, bitmap)
            .unwrap()
            .build()
            .unwrap()
    }
}
