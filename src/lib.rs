//! # blockpix
//!
//! Pixelates an image: the image plane is partitioned into fixed-size squares,
//! every square is replaced with its average color, and the result is written
//! back to disk.
//!
//! # Architecture
//!
//! ```text
//! load (imaging)  →  validate (config, pixelate::layout)  →  pixelate (tiler)  →  save (imaging)
//! ```
//!
//! Only the middle is interesting. The tiler cuts the image into vertical
//! strips, hands each strip to its own worker, and every worker walks its
//! strip square by square: average, then repaint. Strips are disjoint and
//! cover the image exactly once, so workers never need to coordinate beyond
//! the final join.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`pixelate`] | Averaging, strip/square layout, and the parallel pass |
//! | [`process`] | One full run: resolve paths, load, validate, pixelate, save |
//! | [`config`] | `blockpix.toml` loading, merging, validation; processing mode |
//! | [`imaging`] | Decoding and encoding through the [`imaging::ImageBackend`] trait |
//! | [`output`] | CLI output formatting for progress, summaries and plans |
//!
//! # Design Decisions
//!
//! ## Strips Aligned to the Square Grid
//!
//! A strip's width is always a multiple of the square size (except the last
//! strip, which ends at the image edge). A square therefore never straddles two
//! workers, and single and multi mode produce byte-identical output.
//!
//! ## Borrow-Checked Disjointness
//!
//! Workers do not share the image through a lock or raw pointers. The RGBA
//! buffer is sliced row by row at strip boundaries with `split_at_mut`, so
//! each worker owns `&mut` references to exactly its own pixels.
//!
//! ## Errors as Values
//!
//! Bad parameters surface as [`config::ConfigError`], decode/encode failures as
//! [`imaging::BackendError`]. Nothing in the library exits the process; the
//! binary decides how to report them.

pub mod config;
pub mod imaging;
pub mod output;
pub mod pixelate;
pub mod process;

#[cfg(test)]
pub(crate) mod test_helpers;
