//! Crop rectangles, target sizes and band geometry.
//!
//! All functions here are pure and testable without any pixels.
//!
//! Coordinates are unsigned, so the `x ≥ 0, y ≥ 0` half of the crop invariant
//! holds by construction; [`validate_crop`] checks the rest with
//! overflow-safe arithmetic.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GeometryError {
    #[error("region {region} exceeds {bounds_width}x{bounds_height} bounds")]
    OutOfBounds {
        region: CropRegion,
        bounds_width: u32,
        bounds_height: u32,
    },
    #[error("region {0} has zero width or height")]
    DegenerateRegion(CropRegion),
    #[error("dimensions must be positive, got {width}x{height}")]
    NonPositiveDimension { width: u32, height: u32 },
}

/// Width and height of a raster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Bounds {
    pub width: u32,
    pub height: u32,
}

impl Bounds {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// Sub-rectangle of a raster in pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CropRegion {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl CropRegion {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// The whole raster.
    pub fn full(bounds: Bounds) -> Self {
        Self::new(0, 0, bounds.width, bounds.height)
    }

    /// Largest region with the given aspect ratio, centered in `bounds`.
    ///
    /// `AspectRatio::Free` yields the full raster. The short side is rounded
    /// to the nearest pixel and never exceeds the bounds. Empty bounds give
    /// the (empty) full raster, which validation then rejects.
    pub fn largest_centered(bounds: Bounds, aspect: AspectRatio) -> Self {
        let AspectRatio::Fixed { width: aw, height: ah } = aspect else {
            return Self::full(bounds);
        };
        if bounds.width == 0 || bounds.height == 0 {
            return Self::full(bounds);
        }
        let (bw, bh) = (bounds.width as u64, bounds.height as u64);
        let (aw, ah) = (aw as u64, ah as u64);

        // Compare bw/bh against aw/ah without floats
        let (w, h) = if bw * ah > bh * aw {
            // Bounds wider than the ratio: full height
            let w = ((bh * aw) as f64 / ah as f64).round() as u64;
            (w.clamp(1, bw), bh)
        } else {
            let h = ((bw * ah) as f64 / aw as f64).round() as u64;
            (bw, h.clamp(1, bh))
        };

        Self::new(
            ((bw - w) / 2) as u32,
            ((bh - h) / 2) as u32,
            w as u32,
            h as u32,
        )
    }

    /// Exclusive right edge, `None` on overflow.
    fn right(&self) -> Option<u32> {
        self.x.checked_add(self.width)
    }

    /// Exclusive bottom edge, `None` on overflow.
    fn bottom(&self) -> Option<u32> {
        self.y.checked_add(self.height)
    }

    pub fn contains(&self, px: u32, py: u32) -> bool {
        px >= self.x
            && py >= self.y
            && self.right().is_none_or(|r| px < r)
            && self.bottom().is_none_or(|b| py < b)
    }

    pub fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }
}

impl fmt::Display for CropRegion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}x{}+{}+{}",
            self.width, self.height, self.x, self.y
        )
    }
}

/// Parses `x,y,width,height`.
impl FromStr for CropRegion {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(',').map(str::trim).collect();
        let [x, y, w, h] = parts.as_slice() else {
            return Err(format!("expected x,y,width,height, got {s:?}"));
        };
        let num = |v: &str| {
            v.parse::<u32>()
                .map_err(|e| format!("invalid crop component {v:?}: {e}"))
        };
        Ok(Self::new(num(x)?, num(y)?, num(w)?, num(h)?))
    }
}

/// Output dimensions. Independent of the crop's aspect ratio.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TargetSize {
    pub width: u32,
    pub height: u32,
}

impl TargetSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn bounds(&self) -> Bounds {
        Bounds::new(self.width, self.height)
    }
}

impl fmt::Display for TargetSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Aspect-ratio constraint a crop producer honours when emitting a region.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AspectRatio {
    #[default]
    Free,
    Fixed { width: u32, height: u32 },
}

impl AspectRatio {
    pub const LANDSCAPE_16_9: AspectRatio = AspectRatio::Fixed {
        width: 16,
        height: 9,
    };
    pub const PORTRAIT_9_16: AspectRatio = AspectRatio::Fixed {
        width: 9,
        height: 16,
    };

    /// Ratio matching a target size.
    pub fn of(size: TargetSize) -> Self {
        if size.width == 0 || size.height == 0 {
            return AspectRatio::Free;
        }
        AspectRatio::Fixed {
            width: size.width,
            height: size.height,
        }
    }
}

impl FromStr for AspectRatio {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("free") {
            return Ok(AspectRatio::Free);
        }
        let (w, h) = s
            .split_once(':')
            .ok_or_else(|| format!("expected W:H or \"free\", got {s:?}"))?;
        let width: u32 = w.trim().parse().map_err(|_| format!("invalid ratio {s:?}"))?;
        let height: u32 = h.trim().parse().map_err(|_| format!("invalid ratio {s:?}"))?;
        if width == 0 || height == 0 {
            return Err(format!("ratio sides must be positive, got {s:?}"));
        }
        Ok(AspectRatio::Fixed { width, height })
    }
}

/// A full-height vertical band, possibly empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Band {
    pub start: u32,
    pub width: u32,
}

impl Band {
    pub fn is_empty(&self) -> bool {
        self.width == 0
    }

    pub fn end(&self) -> u32 {
        self.start + self.width
    }
}

/// Horizontally centered band covering `width_percent` of `raster_width`.
///
/// `band_width = round(raster_width * pct / 100)` and
/// `band_start = floor((raster_width - band_width) / 2)`.
pub fn centered_band(raster_width: u32, width_percent: f32) -> Band {
    let pct = width_percent.clamp(0.0, 100.0) as f64;
    let width = ((raster_width as f64 * pct / 100.0).round() as u32).min(raster_width);
    Band {
        start: (raster_width - width) / 2,
        width,
    }
}

/// Check a crop region against the source it will be read from.
pub fn validate_crop(region: CropRegion, source: Bounds) -> Result<CropRegion, GeometryError> {
    if region.width == 0 || region.height == 0 {
        return Err(GeometryError::DegenerateRegion(region));
    }
    let fits = region.right().is_some_and(|r| r <= source.width)
        && region.bottom().is_some_and(|b| b <= source.height);
    if !fits {
        return Err(GeometryError::OutOfBounds {
            region,
            bounds_width: source.width,
            bounds_height: source.height,
        });
    }
    Ok(region)
}

pub fn validate_target_size(size: TargetSize) -> Result<TargetSize, GeometryError> {
    if size.width == 0 || size.height == 0 {
        return Err(GeometryError::NonPositiveDimension {
            width: size.width,
            height: size.height,
        });
    }
    Ok(size)
}

#[cfg(test)]
mod tests {
    use super::*;

    // =========================================================================
    // validate_crop
    // =========================================================================

    #[test]
    fn crop_inside_bounds_is_accepted() {
        let region = CropRegion::new(10, 20, 100, 50);
        assert_eq!(validate_crop(region, Bounds::new(200, 100)), Ok(region));
    }

    #[test]
    fn crop_touching_edges_is_accepted() {
        let region = CropRegion::new(0, 0, 500, 500);
        assert!(validate_crop(region, Bounds::new(500, 500)).is_ok());
    }

    #[test]
    fn oversized_crop_is_out_of_bounds() {
        let err = validate_crop(CropRegion::new(0, 0, 1000, 1000), Bounds::new(500, 500));
        assert!(matches!(err, Err(GeometryError::OutOfBounds { .. })));
    }

    #[test]
    fn offset_pushing_past_edge_is_out_of_bounds() {
        let err = validate_crop(CropRegion::new(450, 0, 100, 10), Bounds::new(500, 500));
        assert!(matches!(err, Err(GeometryError::OutOfBounds { .. })));
    }

    #[test]
    fn overflowing_offset_is_out_of_bounds() {
        let err = validate_crop(CropRegion::new(u32::MAX, 0, 2, 2), Bounds::new(500, 500));
        assert!(matches!(err, Err(GeometryError::OutOfBounds { .. })));
    }

    #[test]
    fn zero_sized_crop_is_degenerate() {
        let err = validate_crop(CropRegion::new(0, 0, 0, 10), Bounds::new(500, 500));
        assert!(matches!(err, Err(GeometryError::DegenerateRegion(_))));
        let err = validate_crop(CropRegion::new(0, 0, 10, 0), Bounds::new(500, 500));
        assert!(matches!(err, Err(GeometryError::DegenerateRegion(_))));
    }

    #[test]
    fn target_size_must_be_positive() {
        assert!(validate_target_size(TargetSize::new(1, 1)).is_ok());
        assert_eq!(
            validate_target_size(TargetSize::new(0, 300)),
            Err(GeometryError::NonPositiveDimension {
                width: 0,
                height: 300
            })
        );
    }

    // =========================================================================
    // centered_band
    // =========================================================================

    #[test]
    fn band_half_width() {
        assert_eq!(centered_band(400, 50.0), Band { start: 100, width: 200 });
    }

    #[test]
    fn band_zero_percent_is_empty() {
        assert!(centered_band(400, 0.0).is_empty());
    }

    #[test]
    fn band_full_width() {
        assert_eq!(centered_band(401, 100.0), Band { start: 0, width: 401 });
    }

    #[test]
    fn band_rounds_width_and_floors_start() {
        // 801 * 0.6 = 480.6 -> 481; (801 - 481) / 2 = 160
        assert_eq!(centered_band(801, 60.0), Band { start: 160, width: 481 });
        // 10 * 0.25 = 2.5 -> 3; (10 - 3) / 2 = 3.5 -> 3
        assert_eq!(centered_band(10, 25.0), Band { start: 3, width: 3 });
    }

    // =========================================================================
    // Aspect ratios and default regions
    // =========================================================================

    #[test]
    fn largest_centered_free_is_full() {
        let b = Bounds::new(640, 480);
        assert_eq!(
            CropRegion::largest_centered(b, AspectRatio::Free),
            CropRegion::full(b)
        );
    }

    #[test]
    fn largest_centered_16_9_in_square() {
        let region =
            CropRegion::largest_centered(Bounds::new(1600, 1600), AspectRatio::LANDSCAPE_16_9);
        assert_eq!(region, CropRegion::new(0, 350, 1600, 900));
    }

    #[test]
    fn largest_centered_9_16_in_landscape() {
        let region =
            CropRegion::largest_centered(Bounds::new(1920, 1080), AspectRatio::PORTRAIT_9_16);
        // 1080 * 9 / 16 = 607.5 -> 608
        assert_eq!(region, CropRegion::new(656, 0, 608, 1080));
        assert!(validate_crop(region, Bounds::new(1920, 1080)).is_ok());
    }

    #[test]
    fn largest_centered_in_empty_bounds_is_empty() {
        for b in [Bounds::new(0, 0), Bounds::new(0, 10), Bounds::new(10, 0)] {
            let region = CropRegion::largest_centered(b, AspectRatio::LANDSCAPE_16_9);
            assert_eq!(region, CropRegion::full(b));
            assert!(matches!(
                validate_crop(region, b),
                Err(GeometryError::DegenerateRegion(_))
            ));
        }
    }

    #[test]
    fn aspect_ratio_parses() {
        assert_eq!("16:9".parse(), Ok(AspectRatio::LANDSCAPE_16_9));
        assert_eq!("FREE".parse(), Ok(AspectRatio::Free));
        assert!("16x9".parse::<AspectRatio>().is_err());
        assert!("0:9".parse::<AspectRatio>().is_err());
    }

    #[test]
    fn crop_region_parses_csv() {
        assert_eq!("0, 10,200,100".parse(), Ok(CropRegion::new(0, 10, 200, 100)));
        assert!("1,2,3".parse::<CropRegion>().is_err());
        assert!("a,b,c,d".parse::<CropRegion>().is_err());
    }

    #[test]
    fn contains_respects_exclusive_edges() {
        let r = CropRegion::new(2, 2, 3, 3);
        assert!(r.contains(2, 2));
        assert!(r.contains(4, 4));
        assert!(!r.contains(5, 4));
        assert!(!r.contains(1, 3));
    }
}
