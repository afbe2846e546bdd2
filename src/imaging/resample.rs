//! Crop-and-scale.
//!
//! The crop is copied out of the source first, so the filter kernel sees the
//! crop boundary as the image edge: samples past it clamp to the outermost
//! crop pixels instead of bleeding in neighbouring source pixels or wrapping.

use super::geometry::{CropRegion, TargetSize, validate_crop, validate_target_size};
use super::params::ResampleFilter;
use super::pipeline::RenderError;
use super::raster::{OutputRaster, SourceRaster};
use image::imageops;

/// Scale `crop` of `source` to fill `target` exactly.
///
/// Horizontal and vertical scale factors are independent; the crop's aspect
/// ratio is not preserved unless `target` was chosen to match it.
pub fn resample(
    source: &SourceRaster,
    crop: CropRegion,
    target: TargetSize,
    filter: ResampleFilter,
) -> Result<OutputRaster, RenderError> {
    if source.is_empty() {
        return Err(RenderError::EmptySource);
    }
    let crop = validate_crop(crop, source.bounds())?;
    let target = validate_target_size(target)?;

    let cropped =
        imageops::crop_imm(source.as_image(), crop.x, crop.y, crop.width, crop.height).to_image();

    // Identity scale: the kernel would only reproduce the same pixels
    if crop.width == target.width && crop.height == target.height {
        return Ok(OutputRaster::from_image(cropped));
    }

    let scaled = imageops::resize(
        &cropped,
        target.width,
        target.height,
        filter.filter_type(),
    );
    Ok(OutputRaster::from_image(scaled))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::geometry::GeometryError;
    use crate::test_helpers::{gradient_source, solid_source};

    #[test]
    fn output_matches_target_dimensions() {
        let source = gradient_source(64, 48);
        for (w, h) in [(1, 1), (32, 24), (200, 10), (64, 48), (7, 300)] {
            let out = resample(
                &source,
                CropRegion::new(8, 4, 40, 30),
                TargetSize::new(w, h),
                ResampleFilter::Bilinear,
            )
            .unwrap();
            assert_eq!(out.size(), TargetSize::new(w, h));
            assert_eq!(out.as_bytes().len(), (w * h * 4) as usize);
        }
    }

    #[test]
    fn solid_color_survives_downscale() {
        let source = solid_source(800, 600, [255, 255, 255, 255]);
        let out = resample(
            &source,
            CropRegion::new(0, 0, 800, 600),
            TargetSize::new(400, 300),
            ResampleFilter::Bilinear,
        )
        .unwrap();
        assert!(out.as_image().pixels().all(|p| p.0 == [255, 255, 255, 255]));
    }

    #[test]
    fn identity_crop_copies_region() {
        let source = gradient_source(10, 10);
        let out = resample(
            &source,
            CropRegion::new(2, 3, 4, 5),
            TargetSize::new(4, 5),
            ResampleFilter::Lanczos3,
        )
        .unwrap();
        for y in 0..5 {
            for x in 0..4 {
                assert_eq!(out.pixel(x, y), source.as_image().get_pixel(x + 2, y + 3).0);
            }
        }
    }

    #[test]
    fn crop_edges_clamp_instead_of_bleeding() {
        // Left half red, right half blue; crop only the red half
        let mut source = solid_source(20, 10, [255, 0, 0, 255]).as_image().clone();
        for y in 0..10 {
            for x in 10..20 {
                source.put_pixel(x, y, image::Rgba([0, 0, 255, 255]));
            }
        }
        let source = SourceRaster::from_image(source);
        let out = resample(
            &source,
            CropRegion::new(0, 0, 10, 10),
            TargetSize::new(25, 25),
            ResampleFilter::CatmullRom,
        )
        .unwrap();
        assert!(out.as_image().pixels().all(|p| p.0 == [255, 0, 0, 255]));
    }

    #[test]
    fn downscale_interpolates_instead_of_picking() {
        // Alternating black/white columns average to gray, never pure black or white
        let mut img = image::RgbaImage::new(8, 2);
        for (x, _, p) in img.enumerate_pixels_mut() {
            let v = if x % 2 == 0 { 0 } else { 255 };
            *p = image::Rgba([v, v, v, 255]);
        }
        let source = SourceRaster::from_image(img);
        let out = resample(
            &source,
            CropRegion::new(0, 0, 8, 2),
            TargetSize::new(2, 1),
            ResampleFilter::Bilinear,
        )
        .unwrap();
        for x in 0..2 {
            let [r, _, _, _] = out.pixel(x, 0);
            assert!(r > 40 && r < 215, "expected blended gray, got {r}");
        }
    }

    #[test]
    fn empty_source_fails_before_geometry() {
        let source = SourceRaster::from_rgba(0, 0, Vec::new()).unwrap();
        let err = resample(
            &source,
            CropRegion::new(0, 0, 10, 10),
            TargetSize::new(5, 5),
            ResampleFilter::Bilinear,
        );
        assert!(matches!(err, Err(RenderError::EmptySource)));
    }

    #[test]
    fn invalid_geometry_is_reported() {
        let source = solid_source(500, 500, [0, 0, 0, 255]);
        let err = resample(
            &source,
            CropRegion::new(0, 0, 1000, 1000),
            TargetSize::new(5, 5),
            ResampleFilter::Bilinear,
        );
        assert!(matches!(
            err,
            Err(RenderError::Geometry(GeometryError::OutOfBounds { .. }))
        ));

        let err = resample(
            &source,
            CropRegion::new(0, 0, 10, 10),
            TargetSize::new(0, 5),
            ResampleFilter::Bilinear,
        );
        assert!(matches!(
            err,
            Err(RenderError::Geometry(GeometryError::NonPositiveDimension { .. }))
        ));
    }
}
