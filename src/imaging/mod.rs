//! Image I/O: decoding the input and encoding the result.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Identify** | `image::image_dimensions` |
//! | **Load** | `image::ImageReader` (format sniffed from content) |
//! | **Save** | per-format `image` encoders, chosen by output extension |
//!
//! The module is split into:
//! - **Parameters**: [`Quality`] and [`OutputFormat`]
//! - **Backend**: [`ImageBackend`] trait + [`RustBackend`]

pub mod backend;
mod params;
pub mod rust_backend;

pub use backend::{BackendError, Dimensions, ImageBackend};
pub use params::{OutputFormat, Quality};
pub use rust_backend::RustBackend;
