//! Pixel pipeline in pure Rust on top of the `image` crate.
//!
//! | Step | Module | Crate / function |
//! |---|---|---|
//! | Validate crop / size | [`geometry`] | pure arithmetic |
//! | Crop + scale | [`resample`] | `imageops::crop_imm` + `imageops::resize` |
//! | Column overlay | [`overlay`] | straight-alpha source-over |
//! | Magic wand | [`mask`] | per-pixel color distance |
//! | Compose | [`pipeline`] | [`render`] |
//! | Decode / encode | [`codec`] | `image` decoders, PNG encoder |
//!
//! The module is split into:
//! - **Geometry and parameters**: value types and validation (unit testable)
//! - **Operations**: one function per pixel step, each mutating a buffer it owns
//! - **Pipeline**: the fixed composition of those steps
//! - **Codec**: the byte boundary on both sides

pub mod codec;
pub mod geometry;
pub mod mask;
pub mod overlay;
mod params;
pub mod pipeline;
pub mod raster;
pub mod resample;

pub use codec::{DecodeError, EncodeError, decode, decode_file, encode, write_png};
pub use geometry::{
    AspectRatio, Bounds, CropRegion, GeometryError, TargetSize, validate_crop,
    validate_target_size,
};
pub use mask::{MaskRegion, MaskStats, ToleranceConfig, apply_threshold_mask};
pub use overlay::{OverlayConfig, apply_overlay};
pub use params::{ColorParseError, Opacity, Percent, ResampleFilter, Rgb};
pub use pipeline::{RenderError, RenderParams, Rendered, render, render_with_stats};
pub use raster::{OutputRaster, SourceRaster};
pub use resample::resample;
