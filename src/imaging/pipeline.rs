//! The render pipeline: one pure function from (source, parameters) to pixels.
//!
//! ```text
//! validate geometry → resample → overlay (if visible) → mask (if enabled)
//! ```
//!
//! The order is fixed. Masking runs last so it can clear alpha on pixels the
//! overlay painted, exposing whatever sits underneath once the result is
//! composited elsewhere.
//!
//! Every call allocates a fresh [`OutputRaster`]. Nothing is cached or patched
//! between calls, so identical inputs always give byte-identical output.

use super::geometry::{CropRegion, GeometryError, TargetSize, validate_crop, validate_target_size};
use super::mask::{MaskStats, ToleranceConfig, apply_threshold_mask};
use super::overlay::{OverlayConfig, apply_overlay};
use super::params::ResampleFilter;
use super::raster::{OutputRaster, SourceRaster};
use super::resample::resample;
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RenderError {
    #[error("invalid geometry: {0}")]
    Geometry(#[from] GeometryError),
    #[error("source image has no pixel data")]
    EmptySource,
}

/// The full parameter tuple of one render.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderParams {
    pub crop: CropRegion,
    pub target: TargetSize,
    pub overlay: OverlayConfig,
    pub tolerance: ToleranceConfig,
    pub filter: ResampleFilter,
}

impl RenderParams {
    /// Whole source scaled to `target`, default overlay, mask off.
    pub fn full_frame(source: &SourceRaster, target: TargetSize) -> Self {
        Self {
            crop: CropRegion::full(source.bounds()),
            target,
            overlay: OverlayConfig::default(),
            tolerance: ToleranceConfig::default(),
            filter: ResampleFilter::default(),
        }
    }
}

/// Output of [`render_with_stats`]: the pixels plus what the mask did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rendered {
    pub raster: OutputRaster,
    pub mask: Option<MaskStats>,
}

/// Run the pipeline.
pub fn render(source: &SourceRaster, params: &RenderParams) -> Result<OutputRaster, RenderError> {
    render_with_stats(source, params).map(|r| r.raster)
}

/// Run the pipeline and report mask counts.
pub fn render_with_stats(
    source: &SourceRaster,
    params: &RenderParams,
) -> Result<Rendered, RenderError> {
    if source.is_empty() {
        return Err(RenderError::EmptySource);
    }
    let crop = validate_crop(params.crop, source.bounds())?;
    let target = validate_target_size(params.target)?;
    // Reject a bad mask rectangle before any pixel work
    if params.tolerance.enabled {
        params.tolerance.region.resolve(target.bounds())?;
    }

    let mut raster = resample(source, crop, target, params.filter)?;
    debug!(%crop, %target, filter = ?params.filter, "resampled");

    if params.overlay.visible {
        apply_overlay(&mut raster, &params.overlay);
        debug!(
            width_percent = params.overlay.width_percent.value(),
            opacity = params.overlay.opacity.value(),
            color = %params.overlay.color,
            "overlay applied"
        );
    }

    let mask = if params.tolerance.enabled {
        let stats = apply_threshold_mask(&mut raster, &params.tolerance)?;
        debug!(
            tolerance = params.tolerance.tolerance.value(),
            inspected = stats.inspected,
            cleared = stats.cleared,
            "threshold mask applied"
        );
        Some(stats)
    } else {
        None
    };

    Ok(Rendered { raster, mask })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::mask::MaskRegion;
    use crate::imaging::params::{Opacity, Percent, Rgb};
    use crate::test_helpers::{gradient_source, solid_source};

    fn black_band(width: f32, opacity: f32) -> OverlayConfig {
        OverlayConfig {
            visible: true,
            width_percent: Percent::new(width),
            opacity: Opacity::new(opacity),
            color: Rgb::BLACK,
        }
    }

    #[test]
    fn render_is_deterministic() {
        let source = gradient_source(97, 61);
        let params = RenderParams {
            crop: CropRegion::new(5, 3, 80, 50),
            target: TargetSize::new(33, 77),
            overlay: black_band(37.0, 0.3),
            tolerance: ToleranceConfig {
                enabled: true,
                tolerance: Percent::new(25.0),
                reference: Rgb([120, 60, 200]),
                region: MaskRegion::Full,
            },
            filter: ResampleFilter::Lanczos3,
        };
        let a = render(&source, &params).unwrap();
        let b = render(&source, &params).unwrap();
        assert_eq!(a.as_bytes(), b.as_bytes());
    }

    #[test]
    fn mask_runs_after_overlay() {
        // White band painted over black, then a white mask clears exactly the band
        let source = solid_source(10, 4, [0, 0, 0, 255]);
        let params = RenderParams {
            overlay: OverlayConfig {
                color: Rgb::WHITE,
                ..black_band(40.0, 1.0)
            },
            tolerance: ToleranceConfig {
                enabled: true,
                tolerance: Percent::new(5.0),
                ..ToleranceConfig::default()
            },
            ..RenderParams::full_frame(&source, TargetSize::new(10, 4))
        };
        let rendered = render_with_stats(&source, &params).unwrap();
        assert_eq!(rendered.mask.unwrap().cleared, 16);
        assert_eq!(rendered.raster.pixel(3, 0), [255, 255, 255, 0]);
        assert_eq!(rendered.raster.pixel(2, 0), [0, 0, 0, 255]);
    }

    #[test]
    fn disabled_steps_are_skipped() {
        let source = gradient_source(16, 16);
        let params = RenderParams {
            overlay: OverlayConfig::hidden(),
            ..RenderParams::full_frame(&source, TargetSize::new(16, 16))
        };
        let rendered = render_with_stats(&source, &params).unwrap();
        assert_eq!(rendered.mask, None);
        assert_eq!(rendered.raster.as_bytes(), source.as_bytes());
    }

    #[test]
    fn out_of_bounds_crop_fails() {
        let source = solid_source(500, 500, [9, 9, 9, 255]);
        let params = RenderParams {
            crop: CropRegion::new(0, 0, 1000, 1000),
            ..RenderParams::full_frame(&source, TargetSize::new(10, 10))
        };
        assert!(matches!(
            render(&source, &params),
            Err(RenderError::Geometry(GeometryError::OutOfBounds { .. }))
        ));
    }

    #[test]
    fn bad_mask_rect_fails_even_when_geometry_is_fine() {
        let source = solid_source(50, 50, [9, 9, 9, 255]);
        let params = RenderParams {
            tolerance: ToleranceConfig {
                enabled: true,
                region: MaskRegion::Rect(CropRegion::new(0, 0, 11, 10)),
                ..ToleranceConfig::default()
            },
            ..RenderParams::full_frame(&source, TargetSize::new(10, 10))
        };
        assert!(matches!(
            render(&source, &params),
            Err(RenderError::Geometry(GeometryError::OutOfBounds { .. }))
        ));
    }

    #[test]
    fn bad_mask_rect_ignored_when_mask_disabled() {
        let source = solid_source(50, 50, [9, 9, 9, 255]);
        let params = RenderParams {
            tolerance: ToleranceConfig {
                enabled: false,
                region: MaskRegion::Rect(CropRegion::new(0, 0, 11, 10)),
                ..ToleranceConfig::default()
            },
            ..RenderParams::full_frame(&source, TargetSize::new(10, 10))
        };
        assert!(render(&source, &params).is_ok());
    }

    #[test]
    fn empty_source_fails() {
        let source = SourceRaster::from_rgba(0, 0, Vec::new()).unwrap();
        let params = RenderParams::full_frame(&source, TargetSize::new(10, 10));
        assert_eq!(render(&source, &params), Err(RenderError::EmptySource));
    }
}
