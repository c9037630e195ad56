//! Pixel buffers and the double-buffered display set.

use slate_core::{Platform, PixelFormat, SlateError};

/// One owned pixel buffer. Rows are tightly packed, no padding.
#[derive(Clone, Debug)]
pub struct FrameBuffer {
    width: i32,
    height: i32,
    format: PixelFormat,
    data: Vec<u8>,
}

impl FrameBuffer {
    pub fn new(width: i32, height: i32, format: PixelFormat) -> Self {
        let len = width as usize * height as usize * format.bytes_per_pixel();
        FrameBuffer {
            width,
            height,
            format,
            data: vec![0; len],
        }
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

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    pub fn row_bytes(&self) -> usize {
        self.width as usize * self.format.bytes_per_pixel()
    }

    pub fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && x < self.width && y < self.height
    }

    /// Raw pixel value at `(x, y)`. Out-of-bounds reads return zero; the
    /// painter clips before it gets here, so this only backs tests and the
    /// compositor's format transfer.
    pub fn read_raw(&self, x: i32, y: i32) -> u32 {
        if !self.in_bounds(x, y) {
            return 0;
        }
        let bpp = self.format.bytes_per_pixel();
        let off = y as usize * self.row_bytes() + x as usize * bpp;
        let mut raw = 0u32;
        for i in 0..bpp {
            raw |= (self.data[off + i] as u32) << (8 * i);
        }
        raw
    }

    /// Write a raw pixel value; out-of-bounds writes are dropped.
    pub fn write_raw(&mut self, x: i32, y: i32, raw: u32) {
        if !self.in_bounds(x, y) {
            return;
        }
        let bpp = self.format.bytes_per_pixel();
        let off = y as usize * self.row_bytes() + x as usize * bpp;
        for i in 0..bpp {
            self.data[off + i] = (raw >> (8 * i)) as u8;
        }
    }

    pub fn clear(&mut self) {
        self.data.fill(0);
    }
}

/// The four buffers behind the screen: two work buffers (one active for
/// drawing, the spare for transition frames) and two display buffers the
/// controller scans out from.
///
/// The depth argument picks the format pairing the display hardware expects:
/// 2 bytes scans out RGB565, 3 bytes RGB888, 4 bytes ARGB8888. Work buffers
/// stay at ARGB4444 below full depth to halve compositor bandwidth.
pub struct FramebufferSet {
    work: [FrameBuffer; 2],
    active_work: usize,
    display: [FrameBuffer; 2],
    visible: usize,
}

impl FramebufferSet {
    pub fn new(width: i32, height: i32, depth: u8) -> Result<Self, SlateError> {
        if width <= 0 || height <= 0 {
            return Err(SlateError::ZeroDisplaySize);
        }
        let (work_fmt, display_fmt) = match depth {
            2 => (PixelFormat::Argb4444, PixelFormat::Rgb565),
            3 => (PixelFormat::Argb4444, PixelFormat::Rgb888),
            4 => (PixelFormat::Argb8888, PixelFormat::Argb8888),
            other => return Err(SlateError::UnsupportedDepth(other)),
        };
        Ok(FramebufferSet {
            work: [
                FrameBuffer::new(width, height, work_fmt),
                FrameBuffer::new(width, height, work_fmt),
            ],
            active_work: 0,
            display: [
                FrameBuffer::new(width, height, display_fmt),
                FrameBuffer::new(width, height, display_fmt),
            ],
            visible: 0,
        })
    }

    pub fn width(&self) -> i32 {
        self.work[0].width()
    }

    pub fn height(&self) -> i32 {
        self.work[0].height()
    }

    pub fn work_format(&self) -> PixelFormat {
        self.work[0].format()
    }

    pub fn display_format(&self) -> PixelFormat {
        self.display[0].format()
    }

    /// The work buffer the painter draws into this tick.
    pub fn work_mut(&mut self) -> &mut FrameBuffer {
        &mut self.work[self.active_work]
    }

    pub fn work(&self) -> &FrameBuffer {
        &self.work[self.active_work]
    }

    /// Select which work buffer draws; transition animations render their
    /// A and B frames into different buffers.
    pub fn select_work(&mut self, index: usize) {
        self.active_work = index & 1;
    }

    pub fn active_work(&self) -> usize {
        self.active_work
    }

    /// The display buffer currently being scanned out.
    pub fn visible(&self) -> &FrameBuffer {
        &self.display[self.visible]
    }

    /// The display buffer the compositor fills for the next flip.
    pub fn pending_mut(&mut self) -> &mut FrameBuffer {
        &mut self.display[1 - self.visible]
    }

    pub fn pending(&self) -> &FrameBuffer {
        &self.display[1 - self.visible]
    }

    /// Swap which display buffer is visible.
    pub fn flip(&mut self) {
        self.visible = 1 - self.visible;
    }

    /// Flip in lockstep with the display controller: wait for vblank, swap,
    /// hand the controller the new visible buffer, confirm.
    pub fn flip_synchronized(&mut self, platform: &dyn Platform) {
        platform.wait_for_vsync();
        self.flip();
        platform.set_layer_pointer(self.visible().data().as_ptr() as usize);
        platform.flipping_completed();
    }
}
