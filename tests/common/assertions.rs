//! Assertion helpers for tests.

use pretty_assertions::assert_eq;
use rasterfit::{Dimensions, ProcessingResult, Surface};

/// Assert a surface has the expected size
pub fn assert_size(surface: &Surface, width: u32, height: u32) {
    assert_eq!(
        surface.dimensions(),
        Dimensions::new(width, height),
        "Unexpected surface size"
    );
}

/// Assert a pixel is opaque with the given colour, within `tolerance` per channel
pub fn assert_pixel(surface: &Surface, x: u32, y: u32, rgb: (u8, u8, u8), tolerance: u8) {
    let pixel = surface
        .pixel(x, y)
        .unwrap_or_else(|| panic!("pixel {x},{y} outside {:?}", surface.dimensions()))
        .demultiply();
    assert_eq!(pixel.alpha(), 255, "Pixel {x},{y} is not opaque");
    let close = pixel.red().abs_diff(rgb.0) <= tolerance
        && pixel.green().abs_diff(rgb.1) <= tolerance
        && pixel.blue().abs_diff(rgb.2) <= tolerance;
    assert!(
        close,
        "Pixel {x},{y} is ({}, {}, {}), expected {:?} ±{tolerance}",
        pixel.red(),
        pixel.green(),
        pixel.blue(),
        rgb
    );
}

/// Assert a pixel is fully transparent
pub fn assert_transparent(surface: &Surface, x: u32, y: u32) {
    let pixel = surface.pixel(x, y).unwrap();
    assert_eq!(pixel.alpha(), 0, "Pixel {x},{y} should be transparent");
}

/// Assert the whole image rectangle carries source pixels (blue 64 in the
/// gradient fixture), i.e. no region was skipped
pub fn assert_no_gaps(result: &ProcessingResult) {
    let layout = result.layout;
    for y in layout.position.y..layout.position.y + layout.image_size.height {
        for x in layout.position.x..layout.position.x + layout.image_size.width {
            let pixel = result.surface.pixel(x, y).unwrap();
            assert!(
                pixel.alpha() == 255 && pixel.blue().abs_diff(64) <= 1,
                "Gap at {x},{y} with strategy {}",
                result.strategy
            );
        }
    }
}

/// Assert bytes look like a PNG file
pub fn assert_png(bytes: &[u8]) {
    assert!(
        bytes.starts_with(b"\x89PNG\r\n\x1a\n"),
        "Expected PNG image, got {} bytes starting with {:?}",
        bytes.len(),
        &bytes[..8.min(bytes.len())]
    );
}
