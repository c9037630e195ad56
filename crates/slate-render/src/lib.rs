//! Rendering for the Slate embedded UI toolkit.
//!
//! The pipeline each frame: widgets draw into a work framebuffer through
//! [`Painter`], the [`Compositor`] merges dirty strips and converts into the
//! pending display buffer, and [`FramebufferSet::flip_synchronized`] hands
//! the result to the display controller. All pixel movement funnels through
//! the [`Blitter`] strategy so a 2D engine can accelerate it.

pub mod blit;
pub mod compose;
pub mod font;
pub mod framebuffer;
pub mod image;
pub mod painter;
pub mod text;

pub use blit::{Accelerator, Blitter, SourceView};
pub use compose::{merge_plan, BackgroundBlock, Compositor, Transfer};
pub use font::{Font, FontBuilder, Glyph};
pub use framebuffer::{FrameBuffer, FramebufferSet};
pub use image::ImageData;
pub use painter::Painter;
pub use text::{draw_text, draw_text_in_bounds, TextAlign};
