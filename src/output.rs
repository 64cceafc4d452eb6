//! CLI output formatting.
//!
//! # Output Format
//!
//! ## Pixelate
//!
//! ```text
//! Pixelating 640x480 with 30px squares (multi)
//! Workers: 22
//!     003 x 60..90: 16 squares in 1.204ms
//!     001 x 0..30: 16 squares in 1.311ms
//!     ...
//! Saved photos/result.jpg
//! Finished in 48.2ms (multi, 22 workers)
//! ```
//!
//! ## Check
//!
//! ```text
//! Image: 640x480
//! Square: 30px
//! Mode: multi
//! Workers: 22 (stride 30px)
//!     001 x 0..30
//!     002 x 30..60
//!     ...
//! Output: photos/result.jpg
//! ```
//!
//! # Architecture
//!
//! Each view has a `format_*` function (returns `Vec<String>`) for testability
//! and, where the CLI needs it, a `print_*` wrapper that writes to stdout.
//! Format functions are pure and do no I/O.

use crate::pixelate::{PixelateEvent, Region, WorkerReport};
use crate::process::{Plan, RunReport};

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Strip x-range as `x0..x1`.
fn strip_range(strip: &Region) -> String {
    format!("x {}..{}", strip.x0, strip.x1)
}

fn worker_line(report: &WorkerReport) -> String {
    format!(
        "    {} {}: {} squares in {:?}",
        format_index(report.index + 1),
        strip_range(&report.strip),
        report.squares,
        report.elapsed
    )
}

/// Format a single progress event as display lines.
pub fn format_event(event: &PixelateEvent) -> Vec<String> {
    match event {
        PixelateEvent::Started {
            width,
            height,
            square_size,
            mode,
            worker_count,
        } => vec![
            format!(
                "Pixelating {}x{} with {}px squares ({})",
                width, height, square_size, mode
            ),
            format!("Workers: {}", worker_count),
        ],
        PixelateEvent::WorkerFinished(report) => vec![worker_line(report)],
        PixelateEvent::Saved { path } => vec![format!("Saved {}", path.display())],
    }
}

/// Format the closing summary of a run.
pub fn format_run_summary(report: &RunReport) -> Vec<String> {
    vec![format!(
        "Finished in {:?} ({}, {} workers)",
        report.elapsed,
        report.mode,
        report.workers.len()
    )]
}

/// Print the closing summary of a run to stdout.
pub fn print_run_summary(report: &RunReport) {
    for line in format_run_summary(report) {
        println!("{}", line);
    }
}

/// Format the worker plan shown by `check`.
pub fn format_plan(plan: &Plan) -> Vec<String> {
    let layout = &plan.layout;
    let strips = layout.strips();
    let mut lines = vec![
        format!("Image: {}x{}", layout.width(), layout.height()),
        format!("Square: {}px", layout.square().get()),
        format!("Mode: {}", layout.mode()),
        format!("Workers: {} (stride {}px)", strips.len(), layout.stride()),
    ];
    for (i, strip) in strips.iter().enumerate() {
        lines.push(format!("    {} {}", format_index(i + 1), strip_range(strip)));
    }
    lines.push(format!("Output: {}", plan.output.display()));
    lines
}

/// Print the worker plan to stdout.
pub fn print_plan(plan: &Plan) {
    for line in format_plan(plan) {
        println!("{}", line);
    }
}

// ============================================================================
// Tests
// ============================================================================
