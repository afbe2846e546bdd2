//! Shared test utilities for the crop-studio test suite.
//!
//! Provides synthetic rasters and on-disk fixtures so unit tests can exercise
//! pixel logic without shipping image files.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let source = gradient_source(64, 48);
//! let tmp = tempfile::TempDir::new().unwrap();
//! let path = write_png_fixture(tmp.path(), "icon.png", 32, 32, [255, 0, 0, 255]);
//! ```

use crate::imaging::{OutputRaster, SourceRaster, TargetSize};
use image::{Rgba, RgbaImage};
use std::path::{Path, PathBuf};

// =========================================================================
// In-memory rasters
// =========================================================================

/// Single-color source.
pub fn solid_source(width: u32, height: u32, rgba: [u8; 4]) -> SourceRaster {
    SourceRaster::from_image(RgbaImage::from_pixel(width, height, Rgba(rgba)))
}

/// Opaque source whose channels vary with position, so every pixel differs
/// from its neighbours.
pub fn gradient_source(width: u32, height: u32) -> SourceRaster {
    SourceRaster::from_image(gradient_image(width, height))
}

pub fn solid_output(size: TargetSize, rgba: [u8; 4]) -> OutputRaster {
    OutputRaster::from_image(RgbaImage::from_pixel(size.width, size.height, Rgba(rgba)))
}

/// Opaque output with the same pattern as [`gradient_source`].
pub fn gradient_output(width: u32, height: u32) -> OutputRaster {
    OutputRaster::from_image(gradient_image(width, height))
}

fn gradient_image(width: u32, height: u32) -> RgbaImage {
    RgbaImage::from_fn(width, height, |x, y| {
        Rgba([
            (x * 7 % 256) as u8,
            (y * 13 % 256) as u8,
            ((x + y) * 3 % 256) as u8,
            255,
        ])
    })
}

// =========================================================================
// Encoded fixtures
// =========================================================================

pub fn png_bytes(raster: &OutputRaster) -> Vec<u8> {
    crate::imaging::encode(raster).unwrap()
}

/// Write a single-color PNG into `dir` and return its path.
pub fn write_png_fixture(dir: &Path, name: &str, width: u32, height: u32, rgba: [u8; 4]) -> PathBuf {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    let raster = solid_output(TargetSize::new(width, height), rgba);
    std::fs::write(&path, png_bytes(&raster)).unwrap();
    path
}
