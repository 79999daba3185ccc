//! Test fixtures: synthetic source images.

use tiny_skia::{Color, Pixmap};

/// Opaque horizontal/vertical gradient: red follows x, green follows y,
/// blue is constant 64.
pub fn gradient(width: u32, height: u32) -> Pixmap {
    let mut pixmap = Pixmap::new(width, height).unwrap();
    let data = pixmap.data_mut();
    for y in 0..height {
        for x in 0..width {
            let idx = ((y * width + x) * 4) as usize;
            data[idx] = (x * 255 / width.saturating_sub(1).max(1)) as u8;
            data[idx + 1] = (y * 255 / height.saturating_sub(1).max(1)) as u8;
            data[idx + 2] = 64;
            data[idx + 3] = 255;
        }
    }
    pixmap
}

/// Single-colour opaque image.
pub fn solid(width: u32, height: u32, r: u8, g: u8, b: u8) -> Pixmap {
    let mut pixmap = Pixmap::new(width, height).unwrap();
    pixmap.fill(Color::from_rgba8(r, g, b, 255));
    pixmap
}

/// Scaled-down stand-ins for camera-sized inputs, kept small enough for
/// unit-test speed. Engines built by `engines::small_engine` treat these
/// like their full-size counterparts.
pub mod sizes {
    /// Below the small high-res threshold
    pub const ORDINARY: (u32, u32) = (40, 30);
    /// Above high-res, below tile threshold
    pub const HIGH_RES: (u32, u32) = (100, 80);
    /// Above tile threshold
    pub const HUGE: (u32, u32) = (240, 160);
}
