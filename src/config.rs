//! Editor configuration.
//!
//! Handles loading, validating, and merging `crop-studio.toml`. Stock
//! defaults are serialized to a TOML table, the user file is merged on top of
//! it, and the result is deserialized and validated. Command-line flags are
//! applied by the binary after loading, so they win over the file.
//!
//! ## Config File Location
//!
//! `crop-studio.toml` in the working directory is picked up automatically.
//! Pass `--config <path>` to use another file; an explicit path must exist.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [output]
//! width = 800
//! height = 600
//! # preset = "desktop-large"   # Overrides width/height when set
//! filename = "edited-image.png"
//!
//! [overlay]
//! visible = true
//! width_percent = 60.0
//! opacity = 0.9
//! color = "#ffffff"
//!
//! [tolerance]
//! enabled = false
//! percent = 30.0
//! reference = "#ffffff"
//! region = "band"               # "band" (overlay geometry) or "full"
//!
//! [resample]
//! filter = "bilinear"           # bilinear, catmull-rom, lanczos3
//!
//! [batch]
//! width = 200
//! height = 200
//! padding = 25
//! suffix = "-sm"
//! save_to_original = false
//!
//! [processing]
//! max_processes = 4             # Omit for auto = CPU cores
//!
//! [generation]
//! # api_key = "sk-..."
//! endpoint = "https://api.openai.com/v1/images/generations"
//! size = "1024x1024"
//!
//! [logging]
//! level = "warn"
//! json = false
//! ```
//!
//! ## Partial Configuration
//!
//! Config files are sparse. Override just the values you want:
//!
//! ```toml
//! [overlay]
//! color = "#000000"
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::batch::IconConfig;
use crate::generation::GenerationConfig;
use crate::imaging::{
    CropRegion, MaskRegion, Opacity, OverlayConfig, Percent, RenderParams, ResampleFilter, Rgb,
    TargetSize, ToleranceConfig,
};
use crate::naming::{DEFAULT_BATCH_SUFFIX, DEFAULT_EXPORT_NAME};
use crate::presets::find_preset;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// File picked up from the working directory when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "crop-studio.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("TOML serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Editor configuration loaded from `crop-studio.toml`.
///
/// All fields have sensible defaults. User config files need only specify
/// the values they want to override. Unknown keys are rejected.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EditorConfig {
    /// Single-image output size and export name.
    pub output: OutputConfig,
    /// Background column overlay.
    pub overlay: OverlaySettings,
    /// Magic-wand transparency.
    pub tolerance: ToleranceSettings,
    /// Interpolation filter for every resize.
    pub resample: ResampleConfig,
    /// Icon padding batch.
    pub batch: BatchConfig,
    /// Parallel processing settings.
    pub processing: ProcessingConfig,
    /// Text-to-image service.
    pub generation: GenerationConfig,
    /// Log verbosity and format.
    pub logging: LoggingConfig,
}

impl EditorConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |msg: &str| Err(ConfigError::Validation(msg.into()));

        match &self.output.preset {
            Some(slug) if find_preset(slug).is_none() => {
                return Err(ConfigError::Validation(format!(
                    "output.preset {slug:?} is not a known preset"
                )));
            }
            Some(_) => {}
            None if self.output.width == 0 || self.output.height == 0 => {
                return invalid("output.width and output.height must be positive");
            }
            None => {}
        }
        if self.output.filename.trim().is_empty() {
            return invalid("output.filename must not be empty");
        }
        if !(0.0..=100.0).contains(&self.overlay.width_percent) {
            return invalid("overlay.width_percent must be 0-100");
        }
        if !(0.0..=1.0).contains(&self.overlay.opacity) {
            return invalid("overlay.opacity must be 0.0-1.0");
        }
        if !(0.0..=100.0).contains(&self.tolerance.percent) {
            return invalid("tolerance.percent must be 0-100");
        }
        if self.batch.width == 0 || self.batch.height == 0 {
            return invalid("batch.width and batch.height must be positive");
        }
        let twice = self.batch.padding.saturating_mul(2);
        if twice >= self.batch.width || twice >= self.batch.height {
            return invalid("batch.padding must leave room for the image (2 * padding < size)");
        }
        if self.processing.max_processes == Some(0) {
            return invalid("processing.max_processes must be at least 1");
        }
        if tracing_subscriber::EnvFilter::try_new(&self.logging.level).is_err() {
            return Err(ConfigError::Validation(format!(
                "logging.level {:?} is not a valid filter",
                self.logging.level
            )));
        }
        Ok(())
    }

    /// Output size: the preset when one is named, else width × height.
    pub fn target(&self) -> TargetSize {
        self.output
            .preset
            .as_deref()
            .and_then(find_preset)
            .map(|p| p.target())
            .unwrap_or(TargetSize::new(self.output.width, self.output.height))
    }

    pub fn overlay_config(&self) -> OverlayConfig {
        OverlayConfig {
            visible: self.overlay.visible,
            width_percent: Percent::new(self.overlay.width_percent),
            opacity: Opacity::new(self.overlay.opacity),
            color: self.overlay.color,
        }
    }

    /// A `band` region reuses the overlay's width.
    pub fn tolerance_config(&self) -> ToleranceConfig {
        let region = match self.tolerance.region {
            MaskArea::Full => MaskRegion::Full,
            MaskArea::Band => MaskRegion::Band {
                width_percent: Percent::new(self.overlay.width_percent),
            },
        };
        ToleranceConfig {
            enabled: self.tolerance.enabled,
            tolerance: Percent::new(self.tolerance.percent),
            reference: self.tolerance.reference,
            region,
        }
    }

    pub fn icon_config(&self) -> IconConfig {
        IconConfig {
            canvas: TargetSize::new(self.batch.width, self.batch.height),
            padding: self.batch.padding,
            filter: self.resample.filter,
        }
    }

    /// Render parameters for `crop` with every configured setting.
    pub fn render_params(&self, crop: CropRegion) -> RenderParams {
        RenderParams {
            crop,
            target: self.target(),
            overlay: self.overlay_config(),
            tolerance: self.tolerance_config(),
            filter: self.resample.filter,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputConfig {
    pub width: u32,
    pub height: u32,
    /// Preset slug; takes precedence over width/height.
    pub preset: Option<String>,
    /// Default export file name.
    pub filename: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
            preset: None,
            filename: DEFAULT_EXPORT_NAME.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OverlaySettings {
    pub visible: bool,
    pub width_percent: f32,
    pub opacity: f32,
    pub color: Rgb,
}

impl Default for OverlaySettings {
    fn default() -> Self {
        Self {
            visible: true,
            width_percent: 60.0,
            opacity: 0.9,
            color: Rgb::WHITE,
        }
    }
}

/// Mask area as it can be named in a config file or on the command line.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum MaskArea {
    #[default]
    Band,
    Full,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ToleranceSettings {
    pub enabled: bool,
    pub percent: f32,
    pub reference: Rgb,
    pub region: MaskArea,
}

impl Default for ToleranceSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            percent: 30.0,
            reference: Rgb::WHITE,
            region: MaskArea::Band,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ResampleConfig {
    pub filter: ResampleFilter,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BatchConfig {
    pub width: u32,
    pub height: u32,
    /// Transparent margin on every side, in pixels.
    pub padding: u32,
    /// Inserted between the original stem and `.png`.
    pub suffix: String,
    /// Write next to each source instead of into an output directory.
    pub save_to_original: bool,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            width: 200,
            height: 200,
            padding: 25,
            suffix: DEFAULT_BATCH_SUFFIX.to_string(),
            save_to_original: false,
        }
    }
}

/// Parallel processing settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Maximum number of parallel batch workers.
    /// When absent, defaults to the number of CPU cores.
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
    config.max_processes.map(|n| n.min(cores)).unwrap_or(cores)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    /// `EnvFilter` directive; `RUST_LOG` takes precedence.
    pub level: String,
    /// Emit JSON lines instead of human-readable text.
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            json: false,
        }
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
///
/// This is the canonical representation of all default values, used as the
/// base layer for merging user overrides on top.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    Ok(toml::Value::try_from(EditorConfig::default())?)
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
///
/// Returns `Ok(None)` if the file does not exist.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<EditorConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: EditorConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load the editor config.
///
/// With an explicit path the file must exist. Without one,
/// [`DEFAULT_CONFIG_FILE`] in the working directory is used if present and
/// stock defaults otherwise.
pub fn load_config(path: Option<&Path>) -> Result<EditorConfig, ConfigError> {
    let overlay: Option<toml::Value> = match path {
        Some(p) => Some(toml::from_str(&fs::read_to_string(p)?)?),
        None => load_raw_config(Path::new(DEFAULT_CONFIG_FILE))?,
    };
    resolve_config(stock_defaults_value()?, overlay)
}

/// Returns a fully-commented stock `crop-studio.toml` with all keys and
/// explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# Crop Studio Configuration
# =========================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
#
# Command-line flags override anything set here.
# Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Single-image output
# ---------------------------------------------------------------------------
[output]
# Output size in pixels. The crop is stretched to fill it exactly.
width = 800
height = 600

# Named size from `crop-studio presets`. Overrides width/height when set.
# preset = "desktop-large"

# File name used when no output path is given.
filename = "edited-image.png"

# ---------------------------------------------------------------------------
# Background column overlay
# ---------------------------------------------------------------------------
[overlay]
# Paint a vertical band, centered horizontally, over the full height.
visible = true

# Band width as a percentage of the output width (0-100).
width_percent = 60.0

# Band opacity (0.0 = invisible, 1.0 = solid color).
opacity = 0.9

# Band color as #rrggbb.
color = "#ffffff"

# ---------------------------------------------------------------------------
# Magic wand (color-threshold transparency)
# ---------------------------------------------------------------------------
[tolerance]
# Make pixels close to the reference color fully transparent.
enabled = false

# Per-channel distance allowed, as a percentage of 255 (0-100).
# 0 clears nothing, 100 clears everything in the region.
percent = 30.0

# Color to match, as #rrggbb.
reference = "#ffffff"

# "band" limits the mask to the overlay column; "full" covers the whole output.
region = "band"

# ---------------------------------------------------------------------------
# Resampling
# ---------------------------------------------------------------------------
[resample]
# Interpolation filter: "bilinear", "catmull-rom" or "lanczos3".
filter = "bilinear"

# ---------------------------------------------------------------------------
# Batch icon padding
# ---------------------------------------------------------------------------
[batch]
# Canvas size of every icon.
width = 200
height = 200

# Transparent margin on each side, in pixels.
padding = 25

# Added to the original file name: logo.jpg -> logo-sm.png
suffix = "-sm"

# Write icons next to their source files instead of an output directory.
save_to_original = false

# ---------------------------------------------------------------------------
# Processing
# ---------------------------------------------------------------------------
[processing]
# Maximum parallel batch workers.
# Omit or comment out to auto-detect (= number of CPU cores).
# max_processes = 4

# ---------------------------------------------------------------------------
# Image generation service
# ---------------------------------------------------------------------------
[generation]
# Bearer key for the service. Generation is unavailable without one.
# api_key = "sk-..."

endpoint = "https://api.openai.com/v1/images/generations"

# Requested image size.
size = "1024x1024"

# ---------------------------------------------------------------------------
# Logging
# ---------------------------------------------------------------------------
[logging]
# Filter directive such as "info" or "crop_studio=debug".
# The RUST_LOG environment variable takes precedence.
level = "warn"

# Emit JSON lines instead of plain text.
json = false
"##
}
