//! Text drawing on top of [`Painter`].

use slate_core::{Color, Rect};

use crate::font::Font;
use crate::painter::Painter;

/// Horizontal placement of text inside a rect.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TextAlign {
    #[default]
    Left,
    Center,
    Right,
}

/// Draw `text` with its top-left at `(x, y)`. Returns the advance width.
pub fn draw_text(
    painter: &mut Painter<'_>,
    font: &Font,
    x: i32,
    y: i32,
    text: &str,
    color: Color,
) -> i32 {
    let height = font.height();
    font.walk(text, |gx, glyph| {
        painter.blit_coverage(&glyph.bitmap, glyph.width, height, x + gx, y, color);
    })
}

/// Draw `text` clipped and aligned inside `rect`. Glyph rows falling outside
/// the rect are trimmed by the clip stack. Vertical placement centers the
/// font height in the rect.
pub fn draw_text_in_bounds(
    painter: &mut Painter<'_>,
    font: &Font,
    rect: Rect,
    text: &str,
    color: Color,
    align: TextAlign,
) {
    if rect.is_empty() {
        return;
    }
    let width = font.text_width(text);
    let x = match align {
        TextAlign::Left => rect.x,
        TextAlign::Center => rect.x + (rect.w - width) / 2,
        TextAlign::Right => rect.right() - width,
    };
    let y = rect.y + (rect.h - font.height()) / 2;
    painter.push_bounds(rect);
    draw_text(painter, font, x, y, text, color);
    painter.pop_bounds();
}
