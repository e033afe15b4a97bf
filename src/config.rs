//! Engine configuration module.
//!
//! Every constant the metric kernels and the decoder rely on is an empirical
//! tunable. The defaults reproduce the reference scores exactly; a
//! `framescore.toml` (or any file passed with `--config`) overrides only the
//! keys it names.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [working]
//! max_width = 300           # Working surface bound, per axis
//! max_height = 400
//!
//! [kernels]
//! dark_cutoff = 85          # Luma bucket below this counts as dark
//! bright_cutoff = 170       # Luma bucket above this counts as bright
//! contrast_divisor = 128.0  # Luma std-dev normalizer
//! edge_divisor = 500.0      # Mean Sobel magnitude normalizer
//! detail_threshold = 50.0   # Sobel magnitude that counts as detail
//! detail_scale = 2.0
//! thirds_window = 40        # Side of the square sampled at each thirds point
//! center_radius_divisor = 4.0
//! subject_threshold = 30.0  # Horizontal-difference contrast for subject pixels
//! subject_scale = 10.0
//! center_density_scale = 2.0
//!
//! [feedback]
//! locale = "en"             # "en" or "zh-CN"
//!
//! [processing]
//! max_processes = 4         # Max parallel batch workers (omit for auto = CPU cores)
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::imaging::WorkingBounds;
use crate::suggest::Locale;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// File picked up from the working directory when `--config` is not given.
pub const DEFAULT_CONFIG_FILENAME: &str = "framescore.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Engine configuration loaded from TOML.
///
/// All fields have defaults matching the reference implementation. User
/// files need only specify the values they want to override.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Working resolution the decoder draws into.
    pub working: WorkingConfig,
    /// Normalization constants and thresholds for the pixel kernels.
    pub kernels: KernelConfig,
    /// Language of suggestion and hint strings.
    pub feedback: FeedbackConfig,
    /// Parallel batch evaluation settings.
    pub processing: ProcessingConfig,
}

impl EngineConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.working.max_width == 0 || self.working.max_height == 0 {
            return Err(ConfigError::Validation(
                "working.max_width and working.max_height must be non-zero".into(),
            ));
        }
        let k = &self.kernels;
        if k.bright_cutoff > 255 {
            return Err(ConfigError::Validation(
                "kernels.bright_cutoff must be 0-255".into(),
            ));
        }
        if k.dark_cutoff >= k.bright_cutoff {
            return Err(ConfigError::Validation(
                "kernels.dark_cutoff must be below kernels.bright_cutoff".into(),
            ));
        }
        if k.thirds_window == 0 {
            return Err(ConfigError::Validation(
                "kernels.thirds_window must be non-zero".into(),
            ));
        }
        let positive = [
            ("contrast_divisor", k.contrast_divisor),
            ("edge_divisor", k.edge_divisor),
            ("detail_scale", k.detail_scale),
            ("center_radius_divisor", k.center_radius_divisor),
            ("subject_scale", k.subject_scale),
            ("center_density_scale", k.center_density_scale),
        ];
        for (name, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigError::Validation(format!(
                    "kernels.{name} must be a positive number"
                )));
            }
        }
        let non_negative = [
            ("detail_threshold", k.detail_threshold),
            ("subject_threshold", k.subject_threshold),
        ];
        for (name, value) in non_negative {
            if !(value.is_finite() && value >= 0.0) {
                return Err(ConfigError::Validation(format!(
                    "kernels.{name} must be zero or positive"
                )));
            }
        }
        Ok(())
    }
}

/// Working surface bounds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WorkingConfig {
    pub max_width: u32,
    pub max_height: u32,
}

impl Default for WorkingConfig {
    fn default() -> Self {
        let bounds = WorkingBounds::default();
        Self {
            max_width: bounds.max_width,
            max_height: bounds.max_height,
        }
    }
}

impl WorkingConfig {
    pub fn bounds(&self) -> WorkingBounds {
        WorkingBounds {
            max_width: self.max_width,
            max_height: self.max_height,
        }
    }
}

/// Kernel normalization constants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct KernelConfig {
    /// Histogram buckets `0..dark_cutoff` count toward `dark_ratio`.
    pub dark_cutoff: u32,
    /// Histogram buckets `bright_cutoff+1..=255` count toward `bright_ratio`.
    pub bright_cutoff: u32,
    pub contrast_divisor: f64,
    pub edge_divisor: f64,
    pub detail_threshold: f64,
    pub detail_scale: f64,
    /// Side length in pixels of the window sampled around each thirds point.
    pub thirds_window: u32,
    /// Center region radius is `min(width, height) / center_radius_divisor`.
    pub center_radius_divisor: f64,
    pub subject_threshold: f64,
    pub subject_scale: f64,
    pub center_density_scale: f64,
}

impl Default for KernelConfig {
    fn default() -> Self {
        Self {
            dark_cutoff: 85,
            bright_cutoff: 170,
            contrast_divisor: 128.0,
            edge_divisor: 500.0,
            detail_threshold: 50.0,
            detail_scale: 2.0,
            thirds_window: 40,
            center_radius_divisor: 4.0,
            subject_threshold: 30.0,
            subject_scale: 10.0,
            center_density_scale: 2.0,
        }
    }
}

/// Feedback text settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FeedbackConfig {
    pub locale: Locale,
}

/// Parallel processing settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Maximum number of parallel evaluation workers.
    /// When absent or null, defaults to the number of CPU cores.
    /// Values larger than the core count are clamped down.
    pub max_processes: Option<usize>,
}

/// Resolve the effective thread count from config.
///
/// - `None` → use all available cores
/// - `Some(n)` → use `min(n, cores)` (user can constrain down, not up)
pub fn effective_threads(config: &ProcessingConfig) -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    config
        .max_processes
        .map(|n| n.clamp(1, cores))
        .unwrap_or(cores)
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    toml::Value::try_from(EngineConfig::default())
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

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<EngineConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: EngineConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load the engine config.
///
/// `None` yields the validated stock defaults; `Some(path)` merges that file
/// on top of them. A missing explicit file is an error.
pub fn load_config(path: Option<&Path>) -> Result<EngineConfig, ConfigError> {
    let base = stock_defaults_value()?;
    let overlay = path.map(load_raw_config).transpose()?;
    resolve_config(base, overlay)
}

/// Find [`DEFAULT_CONFIG_FILENAME`] in `dir`, if present.
pub fn discover_config(dir: &Path) -> Option<PathBuf> {
    let candidate = dir.join(DEFAULT_CONFIG_FILENAME);
    candidate.is_file().then_some(candidate)
}

/// Returns a fully-commented stock `framescore.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# framescore configuration
# ========================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults and reproduce the reference scores.
#
# Place this file as ./framescore.toml or pass it with --config.
# Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Working resolution
# ---------------------------------------------------------------------------
[working]
# Photos are drawn onto a surface of min(width, max_width) x min(height, max_height)
# before any pixel statistic is computed. Each axis is clamped on its own.
max_width = 300
max_height = 400

# ---------------------------------------------------------------------------
# Pixel kernels
# ---------------------------------------------------------------------------
[kernels]
# Luma histogram cut-offs for the dark / bright pixel ratios.
dark_cutoff = 85
bright_cutoff = 170

# Luma standard deviation is divided by this to get contrast (0-1).
contrast_divisor = 128.0

# Mean Sobel magnitude is divided by this to get edge strength (0-1).
edge_divisor = 500.0

# Sobel magnitude above which a pixel counts as detail, and the factor the
# detail fraction is multiplied by.
detail_threshold = 50.0
detail_scale = 2.0

# Side of the square window sampled around each rule-of-thirds point.
thirds_window = 40

# Center region radius = min(width, height) / center_radius_divisor.
center_radius_divisor = 4.0

# Horizontal-difference contrast above which a pixel looks like subject,
# and the factors applied to the subject and center-density fractions.
subject_threshold = 30.0
subject_scale = 10.0
center_density_scale = 2.0

# ---------------------------------------------------------------------------
# Feedback
# ---------------------------------------------------------------------------
[feedback]
# Language of suggestions and live hints: "en" or "zh-CN".
locale = "en"

# ---------------------------------------------------------------------------
# Processing
# ---------------------------------------------------------------------------
[processing]
# Maximum parallel evaluation workers for batch runs.
# Omit or comment out to auto-detect (= number of CPU cores).
# max_processes = 4
"##
}
