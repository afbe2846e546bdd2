//! Color-threshold transparency ("magic wand").
//!
//! Despite the name there is no seed point and no flood fill: every pixel in
//! the region is tested on its own against the reference color, so matching
//! pixels are cleared even when nothing connects them.

use super::geometry::{Bounds, CropRegion, GeometryError, centered_band, validate_crop};
use super::params::{Percent, Rgb};
use super::raster::OutputRaster;

/// Which part of the output the mask may touch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MaskRegion {
    /// The whole output.
    Full,
    /// The centered band, with the same geometry as the overlay band.
    Band { width_percent: Percent },
    /// An explicit rectangle in output coordinates.
    Rect(CropRegion),
}

impl MaskRegion {
    /// Resolve against the output size. `Ok(None)` means an empty region.
    pub fn resolve(&self, bounds: Bounds) -> Result<Option<CropRegion>, GeometryError> {
        match *self {
            MaskRegion::Full => Ok(Some(CropRegion::full(bounds))),
            MaskRegion::Band { width_percent } => {
                let band = centered_band(bounds.width, width_percent.value());
                if band.is_empty() || bounds.height == 0 {
                    return Ok(None);
                }
                Ok(Some(CropRegion::new(band.start, 0, band.width, bounds.height)))
            }
            MaskRegion::Rect(region) => validate_crop(region, bounds).map(Some),
        }
    }
}

/// Threshold mask settings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ToleranceConfig {
    pub enabled: bool,
    pub tolerance: Percent,
    pub reference: Rgb,
    pub region: MaskRegion,
}

impl Default for ToleranceConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            tolerance: Percent::new(30.0),
            reference: Rgb::WHITE,
            region: MaskRegion::Full,
        }
    }
}

/// Counts from one mask pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MaskStats {
    pub inspected: u64,
    pub cleared: u64,
}

/// Per-channel distance limit derived from a tolerance percentage.
fn threshold(tolerance: Percent) -> f32 {
    tolerance.value() * 255.0 / 100.0
}

/// True when every RGB channel is strictly closer than `limit` to `reference`.
///
/// At 100 % every pixel matches, including the exact opposite of the
/// reference whose distance equals the limit.
fn is_near(pixel: [u8; 4], reference: [u8; 3], tolerance: Percent, limit: f32) -> bool {
    if tolerance.value() >= 100.0 {
        return true;
    }
    (0..3).all(|c| (pixel[c] as f32 - reference[c] as f32).abs() < limit)
}

/// Clear alpha of near-reference pixels inside the configured region.
///
/// Color channels are left as they are; only alpha changes. Pixels outside
/// the region are never read or written.
pub fn apply_threshold_mask(
    buffer: &mut OutputRaster,
    config: &ToleranceConfig,
) -> Result<MaskStats, GeometryError> {
    let bounds = Bounds::new(buffer.width(), buffer.height());
    let Some(region) = config.region.resolve(bounds)? else {
        return Ok(MaskStats::default());
    };

    let limit = threshold(config.tolerance);
    let reference = config.reference.channels();
    let mut stats = MaskStats::default();

    for y in region.y..region.y + region.height {
        for x in region.x..region.x + region.width {
            let px = buffer.pixel_mut(x, y);
            stats.inspected += 1;
            if is_near(px.0, reference, config.tolerance, limit) {
                px.0[3] = 0;
                stats.cleared += 1;
            }
        }
    }
    Ok(stats)
}
