//! Parameter types for pixel operations.
//!
//! These types describe *how much* of an effect to apply. They are the values
//! the parameter surface (CLI flags, config file, an interactive form) hands
//! to the pipeline, so every constructor clamps instead of failing: a slider
//! dragged past 100 % is still a usable 100 %.
//!
//! ## Types
//!
//! - [`Percent`]: 0–100, used for band width and mask tolerance.
//! - [`Opacity`]: 0.0–1.0 blend factor for the overlay band.
//! - [`Rgb`]: an sRGB color, parsed from `#rrggbb` / `#rgb`.
//! - [`ResampleFilter`]: interpolation kernel for the resampler.

use image::imageops::FilterType;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Percentage in the range 0–100.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Percent(f32);

impl Percent {
    pub fn new(value: f32) -> Self {
        if value.is_nan() {
            return Self(0.0);
        }
        Self(value.clamp(0.0, 100.0))
    }

    pub fn value(self) -> f32 {
        self.0
    }

    /// The percentage as a fraction in 0.0–1.0.
    pub fn fraction(self) -> f32 {
        self.0 / 100.0
    }
}

impl Default for Percent {
    fn default() -> Self {
        Self(0.0)
    }
}

/// Blend factor in the range 0.0–1.0.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Opacity(f32);

impl Opacity {
    pub fn new(value: f32) -> Self {
        if value.is_nan() {
            return Self(0.0);
        }
        Self(value.clamp(0.0, 1.0))
    }

    pub fn value(self) -> f32 {
        self.0
    }
}

impl Default for Opacity {
    fn default() -> Self {
        Self(1.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid color {0:?}: expected #rrggbb or #rgb")]
pub struct ColorParseError(String);

/// An sRGB color without alpha.
///
/// Serialized as a `#rrggbb` string so config files stay readable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Rgb(pub [u8; 3]);

impl Rgb {
    pub const WHITE: Rgb = Rgb([255, 255, 255]);
    pub const BLACK: Rgb = Rgb([0, 0, 0]);

    pub fn channels(self) -> [u8; 3] {
        self.0
    }
}

impl Default for Rgb {
    fn default() -> Self {
        Self::WHITE
    }
}

impl FromStr for Rgb {
    type Err = ColorParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex = s.trim().trim_start_matches('#');
        let err = || ColorParseError(s.to_string());
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(err());
        }
        match hex.len() {
            6 => {
                let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| err());
                Ok(Rgb([channel(0)?, channel(2)?, channel(4)?]))
            }
            3 => {
                // #abc expands to #aabbcc
                let channel = |i: usize| {
                    u8::from_str_radix(&hex[i..i + 1], 16)
                        .map(|v| v * 17)
                        .map_err(|_| err())
                };
                Ok(Rgb([channel(0)?, channel(1)?, channel(2)?]))
            }
            _ => Err(err()),
        }
    }
}

impl TryFrom<String> for Rgb {
    type Error = ColorParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Rgb> for String {
    fn from(color: Rgb) -> Self {
        color.to_string()
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [r, g, b] = self.0;
        write!(f, "#{r:02x}{g:02x}{b:02x}")
    }
}

/// Interpolation kernel used when scaling the crop to the target size.
///
/// Every option is a continuous filter. Nearest-neighbor is deliberately
/// absent: it aliases badly on downscale.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResampleFilter {
    /// Triangle kernel; widens with the scale factor when shrinking.
    #[default]
    Bilinear,
    CatmullRom,
    Lanczos3,
}

impl ResampleFilter {
    pub(crate) fn filter_type(self) -> FilterType {
        match self {
            ResampleFilter::Bilinear => FilterType::Triangle,
            ResampleFilter::CatmullRom => FilterType::CatmullRom,
            ResampleFilter::Lanczos3 => FilterType::Lanczos3,
        }
    }
}

impl fmt::Display for ResampleFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ResampleFilter::Bilinear => "bilinear",
            ResampleFilter::CatmullRom => "catmull-rom",
            ResampleFilter::Lanczos3 => "lanczos3",
        })
    }
}

impl FromStr for ResampleFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "bilinear" | "triangle" => Ok(ResampleFilter::Bilinear),
            "catmull-rom" | "catmullrom" | "bicubic" => Ok(ResampleFilter::CatmullRom),
            "lanczos3" | "lanczos" => Ok(ResampleFilter::Lanczos3),
            other => Err(format!(
                "unknown filter {other:?} (expected bilinear, catmull-rom or lanczos3)"
            )),
        }
    }
}
