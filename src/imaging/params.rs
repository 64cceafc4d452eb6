//! Parameter types for encoding the result.
//!
//! - [`Quality`]: lossy encoding quality (1–100, default 90). Clamped on construction.
//! - [`OutputFormat`]: encoder selected from the output file extension.

use super::backend::BackendError;
use image::ImageFormat;
use std::path::Path;

/// Quality setting for lossy image encoding (1-100).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quality(u32);

impl Quality {
    pub fn new(value: u32) -> Self {
        Self(value.clamp(1, 100))
    }

    pub fn value(self) -> u32 {
        self.0
    }

    /// Quality as the `u8` the `image` encoders take.
    pub fn as_u8(self) -> u8 {
        self.0 as u8
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(90)
    }
}

/// Output encoders compiled in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Jpeg,
    Png,
    Tiff,
    WebP,
    Avif,
}

impl OutputFormat {
    /// Pick the encoder from a path's extension (case-insensitive).
    pub fn from_path(path: &Path) -> Result<Self, BackendError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();
        match ext.as_str() {
            "jpg" | "jpeg" => Ok(Self::Jpeg),
            "png" => Ok(Self::Png),
            "tif" | "tiff" => Ok(Self::Tiff),
            "webp" => Ok(Self::WebP),
            "avif" => Ok(Self::Avif),
            other => Err(BackendError::UnsupportedFormat(other.to_string())),
        }
    }

    /// Whether the encoder stores an alpha channel.
    pub fn keeps_alpha(self) -> bool {
        !matches!(self, Self::Jpeg)
    }

    pub fn image_format(self) -> ImageFormat {
        match self {
            Self::Jpeg => ImageFormat::Jpeg,
            Self::Png => ImageFormat::Png,
            Self::Tiff => ImageFormat::Tiff,
            Self::WebP => ImageFormat::WebP,
            Self::Avif => ImageFormat::Avif,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quality_clamps_to_valid_range() {
        assert_eq!(Quality::new(0).value(), 1);
        assert_eq!(Quality::new(50).value(), 50);
        assert_eq!(Quality::new(150).value(), 100);
        assert_eq!(Quality::new(150).as_u8(), 100);
    }

    #[test]
    fn quality_default_is_90() {
        assert_eq!(Quality::default().value(), 90);
    }

    #[test]
    fn format_from_extension_ignores_case() {
        assert_eq!(
            OutputFormat::from_path(Path::new("a/result.JPG")).unwrap(),
            OutputFormat::Jpeg
        );
        assert_eq!(
            OutputFormat::from_path(Path::new("result.jpeg")).unwrap(),
            OutputFormat::Jpeg
        );
        assert_eq!(
            OutputFormat::from_path(Path::new("result.tif")).unwrap(),
            OutputFormat::Tiff
        );
        assert_eq!(
            OutputFormat::from_path(Path::new("result.avif")).unwrap(),
            OutputFormat::Avif
        );
    }

    #[test]
    fn format_rejects_unknown_or_missing_extension() {
        assert!(matches!(
            OutputFormat::from_path(Path::new("result.bmp")),
            Err(BackendError::UnsupportedFormat(ext)) if ext == "bmp"
        ));
        assert!(OutputFormat::from_path(Path::new("result")).is_err());
    }

    #[test]
    fn only_jpeg_drops_alpha() {
        assert!(!OutputFormat::Jpeg.keeps_alpha());
        assert!(OutputFormat::Png.keeps_alpha());
        assert!(OutputFormat::WebP.keeps_alpha());
    }
}
