//! Display Output
//!
//! The renderer draws 8-bit palette indices into a packed `FrameBuffer`; at
//! frame submission the scheduler converts the VDP color table into the
//! byte order the panel expects and hands both to the `DisplaySink`. Sinks
//! are frontend territory; the null implementations keep the scheduler
//! runnable headless.

use crate::vdp::COLOR_TABLE_LEN;

/// Widest active display mode (H40).
pub const FRAME_WIDTH: u16 = 320;

/// Tallest active display mode (V30, PAL only).
pub const FRAME_HEIGHT: u16 = 240;

/// Pixel encodings a sink can be asked to present.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelFormat {
    /// 8-bit palette indices with an RGB565 palette stored high byte first.
    Pal565Be,
}

/// Geometry of the frame data passed to `DisplaySink::submit`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceFormat {
    pub width: u16,
    pub height: u16,
    pub offset_x: u16,
    pub offset_y: u16,
    /// Line pitch in pixels.
    pub stride: u16,
    pub format: PixelFormat,
}

impl SourceFormat {
    /// Tightly packed frame at the given active resolution.
    pub fn packed(width: u16, height: u16) -> Self {
        Self {
            width,
            height,
            offset_x: 0,
            offset_y: 0,
            stride: width,
            format: PixelFormat::Pal565Be,
        }
    }
}

/// Indexed frame storage, packed at the current active resolution.
#[derive(Debug)]
pub struct FrameBuffer {
    pixels: Vec<u8>,
    palette: [u16; COLOR_TABLE_LEN],
    width: u16,
    height: u16,
}

impl FrameBuffer {
    pub fn new() -> Self {
        Self {
            pixels: vec![0; FRAME_WIDTH as usize * FRAME_HEIGHT as usize],
            palette: [0; COLOR_TABLE_LEN],
            width: FRAME_WIDTH,
            height: FRAME_HEIGHT,
        }
    }

    /// Switch the active resolution. Lines stay packed, so the whole frame
    /// must be redrawn after a change.
    pub fn set_geometry(&mut self, width: u16, height: u16) {
        self.width = width.min(FRAME_WIDTH);
        self.height = height.min(FRAME_HEIGHT);
    }

    pub fn width(&self) -> u16 {
        self.width
    }

    pub fn height(&self) -> u16 {
        self.height
    }

    /// One scanline of index pixels at the active width.
    pub fn line_mut(&mut self, line: u16) -> &mut [u8] {
        let start = line as usize * self.width as usize;
        &mut self.pixels[start..start + self.width as usize]
    }

    /// The packed active frame.
    pub fn frame(&self) -> &[u8] {
        &self.pixels[..self.width as usize * self.height as usize]
    }

    /// Convert the native-endian 565 color table for the panel, which takes
    /// the high byte first.
    pub fn load_palette(&mut self, table: &[u16; COLOR_TABLE_LEN]) {
        for (slot, &color) in self.palette.iter_mut().zip(table.iter()) {
            *slot = color.swap_bytes();
        }
    }

    pub fn palette(&self) -> &[u16; COLOR_TABLE_LEN] {
        &self.palette
    }

    pub fn clear(&mut self) {
        self.pixels.fill(0);
    }
}

impl Default for FrameBuffer {
    fn default() -> Self {
        Self::new()
    }
}

/// Receives finished frames from the scheduler.
pub trait DisplaySink {
    /// Called before rendering whenever the active resolution changes,
    /// including before the first submitted frame.
    fn set_source_format(&mut self, format: SourceFormat);

    /// One complete frame of index pixels plus its palette.
    fn submit(&mut self, pixels: &[u8], palette: &[u16; COLOR_TABLE_LEN]);
}

/// Receives one frame's worth of mixed mono samples.
pub trait AudioSink {
    fn submit(&mut self, samples: &[i16]);
}

/// Discards frames; headless default.
#[derive(Debug, Default)]
pub struct NullDisplaySink;

impl DisplaySink for NullDisplaySink {
    fn set_source_format(&mut self, _format: SourceFormat) {}

    fn submit(&mut self, _pixels: &[u8], _palette: &[u16; COLOR_TABLE_LEN]) {}
}

/// Discards samples; headless default.
#[derive(Debug, Default)]
pub struct NullAudioSink;

impl AudioSink for NullAudioSink {
    fn submit(&mut self, _samples: &[i16]) {}
}
