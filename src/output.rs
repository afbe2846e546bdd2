//! CLI output formatting for every command.
//!
//! # Output Format
//!
//! ## Render
//!
//! ```text
//! photo.jpg → edited-image.png
//!     Crop: 1600x1200+0+0
//!     Size: 800x600 (bilinear)
//!     Overlay: 60% #ffffff at 0.90
//!     Mask: 41200 of 480000 pixels cleared (30% of #ffffff)
//! ```
//!
//! ## Batch
//!
//! ```text
//! Padding 3 images
//!     001 logo.jpg → out/logo-sm.png
//!     003 broken.png
//!         Error: decode failed: corrupt image data: ...
//!     002 mark.webp → out/mark-sm.png
//! Padded 2 icons, 1 failed
//! ```
//!
//! Progress lines arrive in completion order, so the index is the file's
//! position in the input list rather than its position in the output.
//!
//! ## Presets
//!
//! ```text
//! mobile-small       320x480     Mobile Small
//! desktop-large      1920x1080   Desktop Large
//! ```
//!
//! # Architecture
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure: no I/O, no side effects.

use crate::batch::{BatchEvent, BatchReport};
use crate::imaging::{MaskStats, RenderParams};
use crate::presets::Preset;
use std::path::Path;

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|f| f.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn plural(n: usize, one: &str, many: &str) -> String {
    if n == 1 {
        format!("{n} {one}")
    } else {
        format!("{n} {many}")
    }
}

// ============================================================================
// Render output
// ============================================================================

/// Describe one single-image render.
pub fn format_render_summary(
    input: &Path,
    output: &Path,
    params: &RenderParams,
    mask: Option<MaskStats>,
) -> Vec<String> {
    let mut lines = vec![
        format!("{} \u{2192} {}", file_name(input), output.display()),
        format!("    Crop: {}", params.crop),
        format!("    Size: {} ({})", params.target, params.filter),
    ];

    let overlay = &params.overlay;
    if overlay.visible {
        lines.push(format!(
            "    Overlay: {}% {} at {:.2}",
            overlay.width_percent.value(),
            overlay.color,
            overlay.opacity.value()
        ));
    } else {
        lines.push("    Overlay: off".to_string());
    }

    match mask {
        Some(stats) => lines.push(format!(
            "    Mask: {} of {} pixels cleared ({}% of {})",
            stats.cleared,
            stats.inspected,
            params.tolerance.tolerance.value(),
            params.tolerance.reference
        )),
        None => lines.push("    Mask: off".to_string()),
    }
    lines
}

pub fn print_render_summary(
    input: &Path,
    output: &Path,
    params: &RenderParams,
    mask: Option<MaskStats>,
) {
    for line in format_render_summary(input, output, params, mask) {
        println!("{}", line);
    }
}

// ============================================================================
// Batch output
// ============================================================================

/// Format a single batch progress event as display lines.
pub fn format_batch_event(event: &BatchEvent) -> Vec<String> {
    match event {
        BatchEvent::Started { total } => {
            vec![format!("Padding {}", plural(*total, "image", "images"))]
        }
        BatchEvent::Padded {
            index,
            source,
            output,
        } => vec![format!(
            "    {} {} \u{2192} {}",
            format_index(index + 1),
            file_name(source),
            output.display()
        )],
        BatchEvent::Failed {
            index,
            source,
            error,
        } => vec![
            format!("    {} {}", format_index(index + 1), file_name(source)),
            format!("        Error: {}", error),
        ],
    }
}

/// Closing summary of a batch.
pub fn format_batch_report(report: &BatchReport) -> Vec<String> {
    if report.total() == 0 {
        return vec!["No images found".to_string()];
    }
    let mut line = format!("Padded {}", plural(report.altered.len(), "icon", "icons"));
    if !report.failed.is_empty() {
        line.push_str(&format!(", {} failed", report.failed.len()));
    }
    vec![line]
}

pub fn print_batch_report(report: &BatchReport) {
    for line in format_batch_report(report) {
        println!("{}", line);
    }
}

// ============================================================================
// Presets output
// ============================================================================

pub fn format_presets(presets: &[Preset]) -> Vec<String> {
    let slug_width = presets.iter().map(|p| p.slug.len()).max().unwrap_or(0);
    presets
        .iter()
        .map(|p| {
            format!(
                "{:<slug_width$}   {:<10}  {}",
                p.slug,
                p.target().to_string(),
                p.label
            )
        })
        .collect()
}

pub fn print_presets(presets: &[Preset]) {
    for line in format_presets(presets) {
        println!("{}", line);
    }
}
