//! Run configuration.
//!
//! Settings come from three layers, each overriding the one before:
//!
//! 1. Stock defaults ([`PixelateConfig::default`])
//! 2. A TOML file: `--config FILE`, or `blockpix.toml` in the working directory
//! 3. Command-line arguments
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [pixelate]
//! square_size = 30          # Square edge in pixels
//! mode = "multi"            # "single" (one worker) or "multi" (one per strip)
//!
//! [output]
//! file_stem = "result"      # Output file name next to the input, extension kept
//! quality = 90              # Lossy encoder quality (1-100)
//!
//! [processing]
//! max_threads = 4           # Max parallel threads (omit for auto = CPU cores)
//! ```
//!
//! Config files are sparse: override just the values you want. Unknown keys
//! are rejected to catch typos early.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;

/// File name looked up in the working directory when no `--config` is given.
pub const CONFIG_FILE_NAME: &str = "blockpix.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
    #[error(
        "Out of bounds or non-positive square size {size} for a {width}x{height} image. \
         The square size must be between 1 and the smaller image dimension"
    )]
    SquareSize { size: i64, width: u32, height: u32 },
    #[error("Wrong processing mode '{0}'. Use S for single or M for multi-threaded mode")]
    InvalidMode(String),
}

/// How many workers share the image.
///
/// Config files and the command line accept the same tokens (see [`FromStr`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum Mode {
    /// One worker processes the whole image.
    Single,
    /// One worker per square-wide strip.
    #[default]
    Multi,
}

impl FromStr for Mode {
    type Err = ConfigError;

    fn from_str(token: &str) -> Result<Self, Self::Err> {
        match token.to_ascii_lowercase().as_str() {
            "s" | "single" => Ok(Mode::Single),
            "m" | "multi" => Ok(Mode::Multi),
            _ => Err(ConfigError::InvalidMode(token.to_string())),
        }
    }
}

impl TryFrom<String> for Mode {
    type Error = ConfigError;

    fn try_from(token: String) -> Result<Self, Self::Error> {
        token.parse()
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Single => f.write_str("single"),
            Mode::Multi => f.write_str("multi"),
        }
    }
}

/// Top-level configuration loaded from `blockpix.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PixelateConfig {
    /// Square size and worker mode.
    pub pixelate: PixelateSection,
    /// Output naming and encoding.
    pub output: OutputConfig,
    /// Thread pool sizing.
    pub processing: ProcessingConfig,
}

impl PixelateConfig {
    /// Validate config values are within acceptable ranges.
    ///
    /// The square size is checked against the image later, once its
    /// dimensions are known.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.pixelate.square_size == 0 {
            return Err(ConfigError::Validation(
                "pixelate.square_size must be positive".into(),
            ));
        }
        if !(1..=100).contains(&self.output.quality) {
            return Err(ConfigError::Validation(
                "output.quality must be 1-100".into(),
            ));
        }
        let stem = &self.output.file_stem;
        if stem.is_empty() || stem.contains(['/', '\\']) {
            return Err(ConfigError::Validation(
                "output.file_stem must be a plain, non-empty file name".into(),
            ));
        }
        if self.processing.max_threads == Some(0) {
            return Err(ConfigError::Validation(
                "processing.max_threads must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PixelateSection {
    /// Square edge in pixels, used when none is given on the command line.
    pub square_size: u32,
    /// Worker mode, used when none is given on the command line.
    pub mode: Mode,
}

impl Default for PixelateSection {
    fn default() -> Self {
        Self {
            square_size: 30,
            mode: Mode::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputConfig {
    /// Default output file name (without extension), written next to the input.
    pub file_stem: String,
    /// Lossy encoding quality (1 = worst, 100 = best).
    pub quality: u32,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            file_stem: "result".to_string(),
            quality: 90,
        }
    }
}

/// Parallel processing settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Maximum number of threads in the worker pool.
    /// When absent, defaults to the number of CPU cores.
    /// Values larger than the core count are clamped down.
    pub max_threads: Option<usize>,
}

/// Resolve the effective thread count from config.
///
/// - `None` → use all available cores
/// - `Some(n)` → use `min(n, cores)` (user can constrain down, not up)
pub fn effective_threads(config: &ProcessingConfig) -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    config.max_threads.map(|n| n.min(cores)).unwrap_or(cores)
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    toml::Value::try_from(PixelateConfig::default())
        .map_err(|e| ConfigError::Validation(format!("default config must serialize: {e}")))
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Read a config file as a raw TOML value.
pub fn load_raw_config(path: &Path) -> Result<toml::Value, ConfigError> {
    let content = fs::read_to_string(path)?;
    Ok(toml::from_str(&content)?)
}

/// Merge an optional overlay onto the stock defaults, then deserialize and validate.
pub fn resolve_config(overlay: Option<toml::Value>) -> Result<PixelateConfig, ConfigError> {
    let base = stock_defaults_value()?;
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    // Surface a bad mode as InvalidMode rather than a generic TOML error.
    if let Some(token) = merged
        .get("pixelate")
        .and_then(|section| section.get("mode"))
        .and_then(|mode| mode.as_str())
    {
        token.parse::<Mode>()?;
    }
    let config: PixelateConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load the effective configuration.
///
/// An explicit `path` must exist. Without one, `blockpix.toml` in `dir` is
/// used if present, otherwise the stock defaults.
pub fn load_config(path: Option<&Path>, dir: &Path) -> Result<PixelateConfig, ConfigError> {
    let overlay = match path {
        Some(path) => Some(load_raw_config(path)?),
        None => {
            let implicit = dir.join(CONFIG_FILE_NAME);
            if implicit.exists() {
                Some(load_raw_config(&implicit)?)
            } else {
                None
            }
        }
    };
    resolve_config(overlay)
}

/// Returns a fully-commented stock `blockpix.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# blockpix configuration
# ======================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
#
# blockpix reads ./blockpix.toml, or the file passed with --config.
# Command-line arguments override anything set here.
# Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Pixelation
# ---------------------------------------------------------------------------
[pixelate]
# Square edge in pixels. Must not exceed the image width or height.
square_size = 30

# "single": one worker processes the whole image.
# "multi":  one worker per square-wide vertical strip, run in parallel.
mode = "multi"

# ---------------------------------------------------------------------------
# Output
# ---------------------------------------------------------------------------
[output]
# Output file name, written next to the input with the input's extension.
file_stem = "result"

# Lossy encoding quality (1 = worst, 100 = best). Used for JPEG and AVIF.
quality = 90

# ---------------------------------------------------------------------------
# Processing
# ---------------------------------------------------------------------------
[processing]
# Maximum parallel threads.
# Omit or comment out to auto-detect (= number of CPU cores).
# max_threads = 4
"##
}
