//! The end-to-end pixelation run: load, validate, pixelate, save.
//!
//! ## Order of operations
//!
//! ```text
//! 1. resolve output path    (<input dir>/<file_stem>.<input ext> unless given)
//! 2. check output format    (unsupported extension → error, nothing decoded)
//! 3. load input             (open + decode → IO error, reduced to 8-bit RGBA)
//! 4. validate square size   (against the decoded dimensions → config error)
//! 5. pixelate               (parallel strips, joined before continuing)
//! 6. save                   (encode in memory, then one write)
//! ```
//!
//! Every failure aborts the run. Validation happens before any pixel is
//! touched and the result is only written once the whole pass has finished,
//! so a failed run never leaves a partial output file behind.

use crate::config::{ConfigError, Mode};
use crate::imaging::{BackendError, ImageBackend, OutputFormat, Quality, RustBackend};
use crate::pixelate::tiler::serialize_micros;
use crate::pixelate::{Layout, PixelateEvent, SquareSize, WorkerReport, pixelate};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;
use std::time::{Duration, Instant};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProcessError {
    #[error("{0}")]
    Config(#[from] ConfigError),
    #[error("{0}")]
    Imaging(#[from] BackendError),
}

/// Everything one run needs, already merged from config file and CLI.
#[derive(Debug, Clone)]
pub struct PixelateRequest {
    pub input: PathBuf,
    /// Explicit output path; `None` derives one from the input.
    pub output: Option<PathBuf>,
    /// Raw square size, validated against the image once it is decoded.
    pub square_size: i64,
    pub mode: Mode,
    pub quality: Quality,
    /// Stem of the derived output file name.
    pub file_stem: String,
}

/// Summary of a finished run.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub input: PathBuf,
    pub output: PathBuf,
    pub width: u32,
    pub height: u32,
    pub square_size: u32,
    pub mode: Mode,
    pub workers: Vec<WorkerReport>,
    #[serde(serialize_with = "serialize_micros", rename = "elapsed_us")]
    pub elapsed: Duration,
}

/// Worker plan for an image, without running it.
#[derive(Debug, Clone)]
pub struct Plan {
    pub output: PathBuf,
    pub layout: Layout,
}

/// Output path used when none is given: `<input dir>/<stem>.<input ext>`.
pub fn default_output_path(input: &Path, stem: &str) -> PathBuf {
    let name = match input.extension() {
        Some(ext) => format!("{}.{}", stem, ext.to_string_lossy()),
        None => stem.to_string(),
    };
    input.with_file_name(name)
}

fn resolve_output(request: &PixelateRequest) -> Result<PathBuf, ProcessError> {
    let output = request
        .output
        .clone()
        .unwrap_or_else(|| default_output_path(&request.input, &request.file_stem));
    OutputFormat::from_path(&output)?;
    Ok(output)
}

/// Pixelate `request.input` with the pure Rust backend.
pub fn run(
    request: &PixelateRequest,
    events: Option<Sender<PixelateEvent>>,
) -> Result<RunReport, ProcessError> {
    run_with_backend(&RustBackend::new(), request, events)
}

/// Pixelate using a specific backend (allows testing with mock).
pub fn run_with_backend(
    backend: &impl ImageBackend,
    request: &PixelateRequest,
    events: Option<Sender<PixelateEvent>>,
) -> Result<RunReport, ProcessError> {
    let start = Instant::now();
    let output = resolve_output(request)?;

    let mut image = backend.load(&request.input)?.to_rgba8();
    let (width, height) = image.dimensions();
    let square = SquareSize::new(request.square_size, width, height)?;
    let layout = Layout::new(width, height, square, request.mode);

    let workers = pixelate(&mut image, &layout, events.as_ref());

    backend.save(&image, &output, request.quality)?;
    if let Some(tx) = &events {
        tx.send(PixelateEvent::Saved {
            path: output.clone(),
        })
        .ok();
    }
    drop(events);

    Ok(RunReport {
        input: request.input.clone(),
        output,
        width,
        height,
        square_size: square.get(),
        mode: request.mode,
        workers,
        elapsed: start.elapsed(),
    })
}

/// Validate a request against the image's dimensions and return the worker
/// plan, without decoding pixels or writing anything.
pub fn plan_with_backend(
    backend: &impl ImageBackend,
    request: &PixelateRequest,
) -> Result<Plan, ProcessError> {
    let output = resolve_output(request)?;
    let dims = backend.identify(&request.input)?;
    let square = SquareSize::new(request.square_size, dims.width, dims.height)?;
    Ok(Plan {
        output,
        layout: Layout::new(dims.width, dims.height, square, request.mode),
    })
}

/// [`plan_with_backend`] with the pure Rust backend.
pub fn plan(request: &PixelateRequest) -> Result<Plan, ProcessError> {
    plan_with_backend(&RustBackend::new(), request)
}
