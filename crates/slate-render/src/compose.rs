//! Dirty-region compositing from the work buffer to the display buffer.
//!
//! Widgets that sit translucently over a backdrop image register the
//! horizontal strips they dirtied each frame. The next frame starts by
//! restoring the backdrop under those strips so translucent paint always
//! blends against a clean wall: `merge_plan` folds the strips into an
//! ordered cover of the whole screen and `begin_frame` executes its
//! backdrop spans. The end of every frame copies the work buffer into the
//! pending display buffer with format conversion.

use slate_core::{convert, Color, Rect};

use crate::blit::{Blitter, SourceView};
use crate::framebuffer::FramebufferSet;
use crate::image::ImageData;

/// A horizontal strip that needs the backdrop restored under it, tagged
/// with the translucent surface color that exposed it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BackgroundBlock {
    pub y: i32,
    pub height: i32,
    pub color: Color,
}

/// One row range of the final plan.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Transfer {
    pub y: i32,
    pub height: i32,
    /// Restore the backdrop under these rows before copying.
    pub with_background: bool,
}

/// Merge registered strips into an exact cover of `[0, screen_height)`.
///
/// Strips are processed in increasing `y`; touching or overlapping strips
/// coalesce into one backdrop transfer, and the gaps between them become
/// plain transfers. The output heights always sum to `screen_height`.
pub fn merge_plan(blocks: &[BackgroundBlock], screen_height: i32) -> Vec<Transfer> {
    let mut sorted: Vec<BackgroundBlock> = blocks.to_vec();
    sorted.sort_by_key(|b| b.y);

    let mut plan = Vec::new();
    let mut cursor = 0;
    let mut iter = sorted.into_iter().peekable();
    while let Some(block) = iter.next() {
        let mut start = block.y.max(cursor);
        let mut end = (block.y + block.height).min(screen_height);
        if end <= start {
            continue;
        }
        // coalesce any strip that begins at or before the current end
        while let Some(next) = iter.peek() {
            if next.y <= end {
                end = end.max((next.y + next.height).min(screen_height));
                iter.next();
            } else {
                break;
            }
        }
        start = start.max(cursor);
        if start > cursor {
            plan.push(Transfer {
                y: cursor,
                height: start - cursor,
                with_background: false,
            });
        }
        plan.push(Transfer {
            y: start,
            height: end - start,
            with_background: true,
        });
        cursor = end;
    }
    if cursor < screen_height {
        plan.push(Transfer {
            y: cursor,
            height: screen_height - cursor,
            with_background: false,
        });
    }
    plan
}

/// Per-frame collector of backdrop strips plus the execution of the plan.
///
/// Strips registered while drawing frame N are the rows translucent widgets
/// painted over; frame N+1 starts by restoring the backdrop under exactly
/// those rows so the next blend starts from a clean wall. The first frame
/// restores everything.
pub struct Compositor {
    screen_height: i32,
    blocks: Vec<BackgroundBlock>,
    backdrop_primed: bool,
}

impl Compositor {
    pub fn new(screen_height: i32) -> Self {
        Compositor {
            screen_height,
            blocks: Vec::new(),
            backdrop_primed: false,
        }
    }

    /// Register rows painted in `color` that need backdrop restore. An
    /// opaque color covers the backdrop completely, so it registers
    /// nothing; strips that start above the screen, have no height, or
    /// begin past the bottom are ignored, and heights clamp to the screen.
    pub fn add(&mut self, y: i32, height: i32, color: Color) {
        if color.is_opaque() {
            return;
        }
        if y < 0 || height <= 0 || y >= self.screen_height {
            return;
        }
        let height = height.min(self.screen_height - y);
        self.blocks.push(BackgroundBlock { y, height, color });
    }

    pub fn pending_blocks(&self) -> &[BackgroundBlock] {
        &self.blocks
    }

    /// Start a frame: restore the backdrop in the work buffer under every
    /// strip registered last frame (the whole screen on the first frame),
    /// then forget those strips. Widgets draw over the restored rows next.
    pub fn begin_frame(
        &mut self,
        set: &mut FramebufferSet,
        backdrop: Option<&ImageData>,
        blitter: &Blitter,
    ) {
        let width = set.width();
        let plan = merge_plan(&self.blocks, self.screen_height);
        self.blocks.clear();
        let Some(image) = backdrop else {
            self.backdrop_primed = false;
            return;
        };
        let Some(src) = SourceView::from_image(image) else {
            return;
        };
        if !self.backdrop_primed {
            let clip = Rect::new(0, 0, width, self.screen_height);
            blitter.composite(set.work_mut(), &src, 0, 0, Color::WHITE, None, clip);
            self.backdrop_primed = true;
            return;
        }
        for transfer in plan.iter().filter(|t| t.with_background) {
            let clip = Rect::new(0, transfer.y, width, transfer.height);
            blitter.composite(set.work_mut(), &src, 0, 0, Color::WHITE, None, clip);
        }
    }

    /// End a frame: copy every row of the work buffer into the pending
    /// display buffer with format conversion. The backdrop was already
    /// restored by `begin_frame`, so no row needs special handling here;
    /// registered strips stay for the next `begin_frame`.
    pub fn merge_buffers(&self, set: &mut FramebufferSet) {
        transfer_rows_into_pending(set, 0, self.screen_height);
    }
}

/// Copy `height` rows starting at `y` from the work buffer into the pending
/// display buffer, converting pixel formats.
fn transfer_rows_into_pending(set: &mut FramebufferSet, y: i32, height: i32) {
    let width = set.width();
    let work_fmt = set.work_format();
    let display_fmt = set.display_format();
    for row in y..y + height {
        for x in 0..width {
            let raw = set.work().read_raw(x, row);
            let out = convert(raw, work_fmt, display_fmt);
            set.pending_mut().write_raw(x, row, out);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slate_core::PixelFormat;

    fn total_height(plan: &[Transfer]) -> i32 {
        plan.iter().map(|t| t.height).sum()
    }

    #[test]
    fn empty_blocks_yield_single_plain_transfer() {
        let plan = merge_plan(&[], 100);
        assert_eq!(
            plan,
            vec![Transfer {
                y: 0,
                height: 100,
                with_background: false
            }]
        );
    }

    #[test]
    fn plan_is_exact_cover() {
        let glass = Color::rgba(1, 2, 3, 0x80);
        let blocks = [
            BackgroundBlock { y: 10, height: 20, color: glass },
            BackgroundBlock { y: 50, height: 10, color: glass },
        ];
        let plan = merge_plan(&blocks, 100);
        assert_eq!(total_height(&plan), 100);
        assert_eq!(plan[0], Transfer { y: 0, height: 10, with_background: false });
        assert_eq!(plan[1], Transfer { y: 10, height: 20, with_background: true });
        assert_eq!(plan[2], Transfer { y: 30, height: 20, with_background: false });
        assert_eq!(plan[3], Transfer { y: 50, height: 10, with_background: true });
        assert_eq!(plan[4], Transfer { y: 60, height: 40, with_background: false });
        // consecutive and in order
        let mut cursor = 0;
        for t in &plan {
            assert_eq!(t.y, cursor);
            cursor += t.height;
        }
    }

    #[test]
    fn touching_and_overlapping_blocks_coalesce() {
        let glass = Color::rgba(1, 2, 3, 0x80);
        let blocks = [
            BackgroundBlock { y: 10, height: 10, color: glass },
            BackgroundBlock { y: 20, height: 10, color: glass },
            BackgroundBlock { y: 25, height: 10, color: glass },
        ];
        let plan = merge_plan(&blocks, 60);
        assert_eq!(
            plan,
            vec![
                Transfer { y: 0, height: 10, with_background: false },
                Transfer { y: 10, height: 25, with_background: true },
                Transfer { y: 35, height: 25, with_background: false },
            ]
        );
    }

    #[test]
    fn blocks_clamp_to_screen() {
        let glass = Color::rgba(1, 2, 3, 0x80);
        let mut c = Compositor::new(50);
        c.add(-5, 10, glass); // starts above: dropped
        c.add(10, 0, glass); // no height: dropped
        c.add(60, 10, glass); // past bottom: dropped
        c.add(45, 20, glass); // clamped to 5 rows
        assert_eq!(
            c.pending_blocks(),
            &[BackgroundBlock { y: 45, height: 5, color: glass }]
        );
    }

    #[test]
    fn opaque_color_registers_nothing() {
        let mut c = Compositor::new(50);
        c.add(0, 10, Color::RED);
        assert!(c.pending_blocks().is_empty());
        c.add(0, 10, Color::rgba(1, 2, 3, 0x80));
        assert_eq!(c.pending_blocks().len(), 1);
    }

    #[test]
    fn merge_converts_work_to_display_format() {
        let mut set = FramebufferSet::new(2, 2, 2).unwrap();
        // opaque white in ARGB4444
        set.work_mut().write_raw(0, 0, 0xFFFF);
        let c = Compositor::new(2);
        c.merge_buffers(&mut set);
        // white in RGB565
        assert_eq!(set.pending().read_raw(0, 0), 0xFFFF);
        assert_eq!(set.pending().read_raw(1, 1), 0x0000);
    }

    #[test]
    fn merge_copies_rows_inside_and_outside_registered_strips() {
        let mut set = FramebufferSet::new(1, 4, 4).unwrap();
        set.work_mut().write_raw(0, 1, Color::RED.0);
        set.work_mut().write_raw(0, 3, Color::GREEN.0);
        let mut c = Compositor::new(4);
        c.add(1, 1, Color::rgba(0, 0, 0, 0x80));
        c.merge_buffers(&mut set);
        assert_eq!(set.pending().read_raw(0, 1), Color::RED.0);
        assert_eq!(set.pending().read_raw(0, 3), Color::GREEN.0);
        // strips survive the merge for the next frame's restore
        assert_eq!(c.pending_blocks().len(), 1);
    }

    #[test]
    fn begin_frame_restores_last_frames_strips() {
        let mut set = FramebufferSet::new(2, 4, 4).unwrap();
        let backdrop = ImageData::new(
            2,
            4,
            PixelFormat::Argb8888,
            Color::BLUE.0.to_le_bytes().repeat(8),
        );
        let blitter = Blitter::Software;
        let mut c = Compositor::new(4);
        // first frame primes the whole work buffer with the backdrop
        c.begin_frame(&mut set, Some(&backdrop), &blitter);
        assert_eq!(set.work().read_raw(1, 3), Color::BLUE.0);
        // a widget scribbles on rows 1..3 and registers them
        set.work_mut().write_raw(0, 1, Color::RED.0);
        set.work_mut().write_raw(0, 2, Color::RED.0);
        c.add(1, 2, Color::rgba(0, 0, 0, 0x80));
        c.merge_buffers(&mut set);
        // next frame: the scribbled rows come back as backdrop
        c.begin_frame(&mut set, Some(&backdrop), &blitter);
        assert_eq!(set.work().read_raw(0, 1), Color::BLUE.0);
        assert_eq!(set.work().read_raw(0, 2), Color::BLUE.0);
    }
}
