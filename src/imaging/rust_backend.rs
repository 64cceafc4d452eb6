//! Pure Rust image backend.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Identify | `image::image_dimensions` |
//! | Decode (JPEG, PNG, TIFF, WebP) | `image::ImageReader` with content sniffing |
//! | Encode JPEG | `image::codecs::jpeg::JpegEncoder` (quality, RGB only) |
//! | Encode AVIF | `image::codecs::avif::AvifEncoder` (rav1e, speed 6) |
//! | Encode PNG, TIFF, WebP | `image::DynamicImage::write_to` (lossless) |

use super::backend::{BackendError, Dimensions, ImageBackend};
use super::params::{OutputFormat, Quality};
use image::{DynamicImage, ImageReader, RgbaImage};
use std::io::Cursor;
use std::path::Path;

/// AVIF encoder speed (1 = slowest/best, 10 = fastest).
const AVIF_SPEED: u8 = 6;

/// Pure Rust backend using the `image` crate ecosystem.
pub struct RustBackend;

impl RustBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RustBackend {
    fn default() -> Self {
        Self::new()
    }
}

/// Encode `image` into memory in the given format.
fn encode(
    image: &RgbaImage,
    format: OutputFormat,
    quality: Quality,
) -> Result<Vec<u8>, image::ImageError> {
    let mut bytes = Vec::new();
    let dynamic = if format.keeps_alpha() {
        DynamicImage::ImageRgba8(image.clone())
    } else {
        DynamicImage::ImageRgb8(DynamicImage::ImageRgba8(image.clone()).to_rgb8())
    };

    match format {
        OutputFormat::Jpeg => {
            let encoder =
                image::codecs::jpeg::JpegEncoder::new_with_quality(&mut bytes, quality.as_u8());
            dynamic.write_with_encoder(encoder)?;
        }
        OutputFormat::Avif => {
            let encoder = image::codecs::avif::AvifEncoder::new_with_speed_quality(
                &mut bytes,
                AVIF_SPEED,
                quality.as_u8(),
            );
            dynamic.write_with_encoder(encoder)?;
        }
        OutputFormat::Png | OutputFormat::Tiff | OutputFormat::WebP => {
            dynamic.write_to(&mut Cursor::new(&mut bytes), format.image_format())?;
        }
    }
    Ok(bytes)
}

impl ImageBackend for RustBackend {
    fn identify(&self, path: &Path) -> Result<Dimensions, BackendError> {
        let (width, height) =
            image::image_dimensions(path).map_err(|e| BackendError::Decode {
                path: path.display().to_string(),
                reason: e.to_string(),
            })?;
        Ok(Dimensions { width, height })
    }

    fn load(&self, path: &Path) -> Result<DynamicImage, BackendError> {
        ImageReader::open(path)?
            .with_guessed_format()?
            .decode()
            .map_err(|e| BackendError::Decode {
                path: path.display().to_string(),
                reason: e.to_string(),
            })
    }

    fn save(&self, image: &RgbaImage, path: &Path, quality: Quality) -> Result<(), BackendError> {
        let format = OutputFormat::from_path(path)?;
        let bytes = encode(image, format, quality).map_err(|e| BackendError::Encode {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        std::fs::write(path, bytes)?;
        Ok(())
    }
}
