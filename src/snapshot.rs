//! Frame Snapshots
//!
//! Saves an indexed frame to an image file, expanding palette indices
//! through the native 565 color table. Frontends use this for savestate
//! preview thumbnails.

use image::{Rgb, RgbImage};
use std::io;
use std::path::Path;

use crate::vdp::COLOR_TABLE_LEN;

/// Expand a native-endian 565 color to full-range 8-bit RGB.
fn rgb565_to_rgb888(color: u16) -> Rgb<u8> {
    let r = ((color >> 11) & 0x1F) as u8;
    let g = ((color >> 5) & 0x3F) as u8;
    let b = (color & 0x1F) as u8;
    Rgb([(r << 3) | (r >> 2), (g << 2) | (g >> 4), (b << 3) | (b >> 2)])
}

/// Write one packed frame of palette indices to `path`. The image format
/// follows the file extension.
pub fn save_frame<P: AsRef<Path>>(
    path: P,
    pixels: &[u8],
    palette: &[u16; COLOR_TABLE_LEN],
    width: u16,
    height: u16,
) -> io::Result<()> {
    let width = u32::from(width);
    let height = u32::from(height);
    if pixels.len() != (width * height) as usize {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            "pixel count does not match frame dimensions",
        ));
    }

    let frame = RgbImage::from_fn(width, height, |x, y| {
        let index = pixels[(y * width + x) as usize];
        rgb565_to_rgb888(palette[usize::from(index)])
    });
    frame.save(path).map_err(io::Error::other)
}
