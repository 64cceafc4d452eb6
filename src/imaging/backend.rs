//! Image I/O backend trait and shared types.
//!
//! The [`ImageBackend`] trait covers the three operations the pipeline needs
//! from the outside world: identify, load and save. Everything between load
//! and save is in-memory pixel work that does not go through the backend.
//!
//! The production implementation is
//! [`RustBackend`](super::rust_backend::RustBackend), built on the `image`
//! crate's pure-Rust codecs.

use super::params::Quality;
use image::{DynamicImage, RgbaImage};
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to decode {path}: {reason}")]
    Decode { path: String, reason: String },
    #[error("Failed to encode {path}: {reason}")]
    Encode { path: String, reason: String },
    #[error("Unsupported output format: '{0}'")]
    UnsupportedFormat(String),
}

/// Result of an identify operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

/// Trait for image I/O backends.
pub trait ImageBackend: Sync {
    /// Read image dimensions without decoding pixel data.
    fn identify(&self, path: &Path) -> Result<Dimensions, BackendError>;

    /// Open and decode an image.
    fn load(&self, path: &Path) -> Result<DynamicImage, BackendError>;

    /// Encode `image` in the format implied by `path`'s extension and write it.
    ///
    /// Either the whole file is written or nothing is.
    fn save(&self, image: &RgbaImage, path: &Path, quality: Quality) -> Result<(), BackendError>;
}
