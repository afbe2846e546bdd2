//! Pixel buffers.
//!
//! [`SourceRaster`] is the decoded input: immutable, shared behind an `Arc`
//! by whoever needs it. [`OutputRaster`] is the working buffer of exactly one
//! pipeline run; it is never shared while being written, and a new one is
//! produced for every parameter change.

use super::geometry::{Bounds, TargetSize};
use image::{DynamicImage, Rgba, RgbaImage};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("pixel buffer of {len} bytes does not hold {width}x{height} RGBA pixels")]
pub struct BufferSizeError {
    pub width: u32,
    pub height: u32,
    pub len: usize,
}

/// Immutable decoded image, row-major RGBA8.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceRaster {
    pixels: RgbaImage,
}

impl SourceRaster {
    /// Wrap raw RGBA bytes. The length must be exactly `width * height * 4`.
    pub fn from_rgba(width: u32, height: u32, data: Vec<u8>) -> Result<Self, BufferSizeError> {
        let len = data.len();
        let expected = width as u64 * height as u64 * 4;
        if len as u64 != expected {
            return Err(BufferSizeError { width, height, len });
        }
        RgbaImage::from_raw(width, height, data)
            .map(|pixels| Self { pixels })
            .ok_or(BufferSizeError { width, height, len })
    }

    pub fn from_image(image: RgbaImage) -> Self {
        Self { pixels: image }
    }

    /// Convert any decoded image to RGBA8.
    pub fn from_dynamic(image: DynamicImage) -> Self {
        Self {
            pixels: image.into_rgba8(),
        }
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn bounds(&self) -> Bounds {
        Bounds::new(self.width(), self.height())
    }

    /// True when the pixel buffer holds no bytes.
    pub fn is_empty(&self) -> bool {
        self.pixels.as_raw().is_empty()
    }

    pub fn as_image(&self) -> &RgbaImage {
        &self.pixels
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.pixels.as_raw()
    }
}

/// Working buffer of one pipeline run, RGBA8.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputRaster {
    pixels: RgbaImage,
}

impl OutputRaster {
    /// Fully transparent buffer.
    pub fn transparent(size: TargetSize) -> Self {
        Self {
            pixels: RgbaImage::new(size.width, size.height),
        }
    }

    pub fn from_image(image: RgbaImage) -> Self {
        Self { pixels: image }
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn size(&self) -> TargetSize {
        TargetSize::new(self.width(), self.height())
    }

    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        self.pixels.get_pixel(x, y).0
    }

    pub fn pixel_mut(&mut self, x: u32, y: u32) -> &mut Rgba<u8> {
        self.pixels.get_pixel_mut(x, y)
    }

    pub fn as_image(&self) -> &RgbaImage {
        &self.pixels
    }

    pub(crate) fn as_image_mut(&mut self) -> &mut RgbaImage {
        &mut self.pixels
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.pixels.as_raw()
    }

    pub fn into_image(self) -> RgbaImage {
        self.pixels
    }
}
