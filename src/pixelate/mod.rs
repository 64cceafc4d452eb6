//! The pixelation core: square averaging and its parallel strip scheduler.
//!
//! | Piece | Role |
//! |---|---|
//! | [`region`] | Half-open rectangles for squares and strips |
//! | [`average`] | Mean color of a region over any [`PixelSource`] |
//! | [`layout`] | Worker count, strip bounds and clamped square generation |
//! | [`tiler`] | Splits the buffer into per-strip views and runs the workers |

pub mod average;
pub mod layout;
pub mod region;
pub mod tiler;

pub use average::{PixelSource, average_color};
pub use layout::{Layout, SquareSize};
pub use region::Region;
pub use tiler::{PixelateEvent, WorkerReport, pixelate};
