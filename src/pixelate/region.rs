//! Half-open pixel rectangles.
//!
//! A [`Region`] describes either one square to average or the x-range a
//! worker owns (a strip, spanning the full image height).

use serde::Serialize;

/// Rectangle `[x0, x1) × [y0, y1)` in image coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Region {
    pub x0: u32,
    pub y0: u32,
    pub x1: u32,
    pub y1: u32,
}

impl Region {
    pub fn new(x0: u32, y0: u32, x1: u32, y1: u32) -> Self {
        debug_assert!(x0 < x1 && y0 < y1, "empty region {x0},{y0}..{x1},{y1}");
        Self { x0, y0, x1, y1 }
    }

    /// Square of edge `size` at `(x, y)`, clamped to `limit`'s right/bottom edges.
    pub fn square_within(x: u32, y: u32, size: u32, limit: &Region) -> Self {
        Self::new(
            x,
            y,
            x.saturating_add(size).min(limit.x1),
            y.saturating_add(size).min(limit.y1),
        )
    }

    pub fn width(&self) -> u32 {
        self.x1 - self.x0
    }

    pub fn height(&self) -> u32 {
        self.y1 - self.y0
    }

    /// Number of pixels covered.
    pub fn area(&self) -> u64 {
        u64::from(self.width()) * u64::from(self.height())
    }

    pub fn contains(&self, x: u32, y: u32) -> bool {
        (self.x0..self.x1).contains(&x) && (self.y0..self.y1).contains(&y)
    }

    /// Iterate every `(x, y)` in the region, column by column.
    pub fn pixels(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        (self.x0..self.x1).flat_map(move |x| (self.y0..self.y1).map(move |y| (x, y)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn area_is_width_times_height() {
        let r = Region::new(2, 3, 7, 5);
        assert_eq!(r.width(), 5);
        assert_eq!(r.height(), 2);
        assert_eq!(r.area(), 10);
    }

    #[test]
    fn square_within_clamps_at_edges() {
        let image = Region::new(0, 0, 5, 3);
        assert_eq!(Region::square_within(4, 2, 2, &image), Region::new(4, 2, 5, 3));
        assert_eq!(Region::square_within(0, 0, 2, &image), Region::new(0, 0, 2, 2));
    }

    #[test]
    fn contains_is_half_open() {
        let r = Region::new(1, 1, 3, 3);
        assert!(r.contains(1, 1));
        assert!(r.contains(2, 2));
        assert!(!r.contains(3, 2));
        assert!(!r.contains(2, 3));
    }

    #[test]
    fn pixels_visits_every_coordinate_once() {
        let r = Region::new(1, 2, 3, 5);
        let pixels: Vec<_> = r.pixels().collect();
        assert_eq!(pixels.len() as u64, r.area());
        assert_eq!(pixels[0], (1, 2));
        assert_eq!(pixels[pixels.len() - 1], (2, 4));
    }
}
