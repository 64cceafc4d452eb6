//! Pure grid math: worker count, strip bounds and square generation.
//!
//! Nothing here touches pixels, so every partitioning rule is unit testable
//! in isolation.
//!
//! ```text
//! W = 10, S = 3, Multi → 4 workers, stride 3
//!
//!   x: 0  1  2 | 3  4  5 | 6  7  8 | 9
//!      strip 0 | strip 1 | strip 2 | strip 3
//! ```
//!
//! The stride is `ceil(W / workers)` rounded up to a multiple of `S`, which
//! keeps every strip boundary on the square grid: a square never straddles two
//! workers, and the output does not depend on the worker count.

use super::region::Region;
use crate::config::{ConfigError, Mode};

/// Validated square edge length.
///
/// Holds `0 < S <= width` and `0 < S <= height` for the image it was
/// validated against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SquareSize(u32);

impl SquareSize {
    /// Validate a raw square size against image dimensions.
    ///
    /// Takes a signed value so that negative input from the command line is
    /// reported as an out-of-range size rather than a parse failure.
    pub fn new(size: i64, width: u32, height: u32) -> Result<Self, ConfigError> {
        let out_of_range = || ConfigError::SquareSize {
            size,
            width,
            height,
        };
        let size = u32::try_from(size).map_err(|_| out_of_range())?;
        if size == 0 || size > width || size > height {
            return Err(out_of_range());
        }
        Ok(Self(size))
    }

    pub fn get(self) -> u32 {
        self.0
    }
}

/// Number of workers for a mode: 1 for single, `ceil(width / size)` for multi.
pub fn worker_count(width: u32, square: SquareSize, mode: Mode) -> u32 {
    match mode {
        Mode::Single => 1,
        Mode::Multi => width.div_ceil(square.get()),
    }
}

/// Horizontal distance between the starts of consecutive strips.
///
/// `ceil(width / workers)` rounded up to a multiple of the square size.
pub fn strip_stride(width: u32, square: SquareSize, workers: u32) -> u32 {
    let s = square.get();
    width.div_ceil(workers.max(1)).div_ceil(s) * s
}

/// Partition plan for one image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Layout {
    width: u32,
    height: u32,
    square: SquareSize,
    mode: Mode,
}

impl Layout {
    pub fn new(width: u32, height: u32, square: SquareSize, mode: Mode) -> Self {
        Self {
            width,
            height,
            square,
            mode,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn square(&self) -> SquareSize {
        self.square
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// The whole image as a region.
    pub fn bounds(&self) -> Region {
        Region::new(0, 0, self.width, self.height)
    }

    /// Workers requested by the mode, before empty strips are dropped.
    pub fn worker_count(&self) -> u32 {
        worker_count(self.width, self.square, self.mode)
    }

    pub fn stride(&self) -> u32 {
        strip_stride(self.width, self.square, self.worker_count())
    }

    /// Contiguous, disjoint strips covering `[0, width)`, full height each.
    ///
    /// Worker `i` owns `[i * stride, min((i + 1) * stride, width))`; a worker
    /// whose range would start at or past the right edge gets no strip.
    pub fn strips(&self) -> Vec<Region> {
        let stride = self.stride();
        (0..self.worker_count())
            .map_while(|i| i.checked_mul(stride).filter(|&x0| x0 < self.width))
            .map(|x0| {
                Region::new(
                    x0,
                    0,
                    x0.saturating_add(stride).min(self.width),
                    self.height,
                )
            })
            .collect()
    }

    /// Squares inside `strip`, clamped at the strip's right edge and the image
    /// bottom. Ordered column by column.
    pub fn squares(&self, strip: Region) -> impl Iterator<Item = Region> + use<> {
        let s = self.square.get();
        let height = self.height;
        (strip.x0..strip.x1).step_by(s as usize).flat_map(move |x| {
            (0..height)
                .step_by(s as usize)
                .map(move |y| Region::square_within(x, y, s, &strip))
        })
    }
}
