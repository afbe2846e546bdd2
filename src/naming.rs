//! Export filename conventions.
//!
//! Single-image exports default to `edited-image.png`. Batch exports keep the
//! original file's stem and add a suffix marker so they sit next to their
//! source without overwriting it:
//! - `logo.jpg` → `logo-sm.png`
//! - `app.icon.webp` → `app.icon-sm.png`
//! - `README` → `README-sm.png`
//!
//! The extension is always `.png` because that is the only encoding we write.

use crate::imaging::TargetSize;
use std::path::Path;

/// Default download name for a single edited image.
pub const DEFAULT_EXPORT_NAME: &str = "edited-image.png";

/// Suffix marker added to batch outputs.
pub const DEFAULT_BATCH_SUFFIX: &str = "-sm";

/// Derive the batch output filename from the original file's name.
pub fn batch_output_name(original: &Path, suffix: &str) -> String {
    let stem = original
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "image".to_string());
    format!("{stem}{suffix}.png")
}

/// Parse a `WIDTHxHEIGHT` string such as `200x200`.
///
/// Accepts `x` or `X` with optional surrounding whitespace. Zero sides are
/// parsed as-is; validation happens in the pipeline.
pub fn parse_dimensions(input: &str) -> Option<TargetSize> {
    let (w, h) = input.trim().split_once(['x', 'X'])?;
    let width = w.trim().parse().ok()?;
    let height = h.trim().parse().ok()?;
    Some(TargetSize::new(width, height))
}
