//! Shared test utilities: synthetic images and reference computations.

use crate::pixelate::Region;
use image::{Rgba, RgbaImage};

/// Opaque image whose channels vary with position, so neighbouring squares
/// average to different colors.
pub fn gradient_image(width: u32, height: u32) -> RgbaImage {
    RgbaImage::from_fn(width, height, |x, y| {
        Rgba([
            ((x * 37 + y * 11) % 256) as u8,
            ((x * 5 + y * 71) % 256) as u8,
            ((x * y * 13 + 7) % 256) as u8,
            255,
        ])
    })
}

/// Floor mean of each 8-bit channel over `region`, computed the obvious way.
pub fn brute_force_mean(img: &RgbaImage, region: Region) -> Rgba<u8> {
    let mut sums = [0u64; 3];
    let mut count = 0u64;
    for y in region.y0..region.y1 {
        for x in region.x0..region.x1 {
            let p = img.get_pixel(x, y).0;
            for c in 0..3 {
                sums[c] += u64::from(p[c]);
            }
            count += 1;
        }
    }
    Rgba([
        (sums[0] / count) as u8,
        (sums[1] / count) as u8,
        (sums[2] / count) as u8,
        255,
    ])
}

/// Assert every pixel of `region` in `img` equals `color`.
pub fn assert_solid(img: &RgbaImage, region: Region, color: Rgba<u8>) {
    for (x, y) in region.pixels() {
        assert_eq!(
            *img.get_pixel(x, y),
            color,
            "pixel ({x}, {y}) in {region:?}"
        );
    }
}
