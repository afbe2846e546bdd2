//! Centered column overlay.
//!
//! Paints a vertical band of a single color over the middle of the output,
//! the "background column" that gives text placed on the image a calm,
//! readable backdrop.

use super::geometry::centered_band;
use super::params::{Opacity, Percent, Rgb};
use super::raster::OutputRaster;

/// Overlay band settings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverlayConfig {
    pub visible: bool,
    /// Band width as a share of the output width.
    pub width_percent: Percent,
    pub opacity: Opacity,
    pub color: Rgb,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            visible: true,
            width_percent: Percent::new(60.0),
            opacity: Opacity::new(0.9),
            color: Rgb::WHITE,
        }
    }
}

impl OverlayConfig {
    pub fn hidden() -> Self {
        Self {
            visible: false,
            ..Self::default()
        }
    }
}

/// Composite the band onto `buffer` in place.
///
/// Pixels outside the band are never touched.
pub fn apply_overlay(buffer: &mut OutputRaster, config: &OverlayConfig) {
    if !config.visible {
        return;
    }
    let band = centered_band(buffer.width(), config.width_percent.value());
    if band.is_empty() {
        return;
    }

    let alpha = config.opacity.value();
    let src = config.color.channels();
    let height = buffer.height();
    for y in 0..height {
        for x in band.start..band.end() {
            let px = buffer.pixel_mut(x, y);
            px.0 = blend_over(src, alpha, px.0);
        }
    }
}

/// Source-over of an opaque color at `alpha` onto a straight-alpha pixel.
///
/// Against an opaque destination this reduces to
/// `src * alpha + dst * (1 - alpha)` per channel.
fn blend_over(src: [u8; 3], alpha: f32, dst: [u8; 4]) -> [u8; 4] {
    let dst_a = dst[3] as f32 / 255.0;
    let out_a = alpha + dst_a * (1.0 - alpha);
    if out_a <= 0.0 {
        return [0, 0, 0, 0];
    }
    let dst_weight = dst_a * (1.0 - alpha);
    let channel = |i: usize| {
        let v = (src[i] as f32 * alpha + dst[i] as f32 * dst_weight) / out_a;
        v.round().clamp(0.0, 255.0) as u8
    };
    [
        channel(0),
        channel(1),
        channel(2),
        (out_a * 255.0).round().clamp(0.0, 255.0) as u8,
    ]
}
