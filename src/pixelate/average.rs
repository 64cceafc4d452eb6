//! Mean color of a rectangular region.
//!
//! Channels are read at 16 bits per channel through [`PixelSource`] and the
//! mean is scaled back down to 8 bits with [`CHANNEL_SCALE`], the same factor
//! an 8-bit source is widened by. For 8-bit input this makes the result exactly
//! the floor of the per-channel mean.

use super::region::Region;
use image::{ImageBuffer, Rgba};

/// Factor between 8-bit and 16-bit channel values (`0xff * 0x101 == 0xffff`).
pub const CHANNEL_SCALE: u64 = 0x101;

const OPAQUE: u8 = u8::MAX;

/// Read access to individual pixels as 16-bit RGBA.
pub trait PixelSource {
    /// Channels of the pixel at `(x, y)`. Callers only ask for coordinates the
    /// source covers.
    fn rgba16(&self, x: u32, y: u32) -> [u16; 4];
}

/// Widen an 8-bit pixel to 16 bits per channel.
#[inline]
pub fn widen(px: [u8; 4]) -> [u16; 4] {
    px.map(|c| u16::from(c) * CHANNEL_SCALE as u16)
}

impl<C> PixelSource for ImageBuffer<Rgba<u8>, C>
where
    C: std::ops::Deref<Target = [u8]>,
{
    fn rgba16(&self, x: u32, y: u32) -> [u16; 4] {
        widen(self.get_pixel(x, y).0)
    }
}

/// Full-depth access for callers holding 16-bit buffers. The file pipeline
/// converts to 8 bits before pixelating and does not use this.
impl<C> PixelSource for ImageBuffer<Rgba<u16>, C>
where
    C: std::ops::Deref<Target = [u16]>,
{
    fn rgba16(&self, x: u32, y: u32) -> [u16; 4] {
        self.get_pixel(x, y).0
    }
}

/// Average the red, green and blue channels over `region`.
///
/// Alpha is ignored; the returned color is fully opaque.
///
/// # Panics
///
/// Panics on a zero-area region. Square generation never produces one.
pub fn average_color<S>(region: Region, source: &S) -> Rgba<u8>
where
    S: PixelSource + ?Sized,
{
    let mut sums = [0u64; 3];
    for (x, y) in region.pixels() {
        let [r, g, b, _] = source.rgba16(x, y);
        sums[0] += u64::from(r);
        sums[1] += u64::from(g);
        sums[2] += u64::from(b);
    }

    let area = region.area();
    let [r, g, b] = sums.map(|sum| (sum / area / CHANNEL_SCALE) as u8);
    Rgba([r, g, b, OPAQUE])
}
