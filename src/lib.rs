//! # Crop Studio
//!
//! Crop, resize, column overlay and color-threshold transparency for raster
//! images, plus a batch icon padder. Everything runs on decoded RGBA8 pixels
//! in pure Rust.
//!
//! # Architecture: One Pixel Pipeline
//!
//! Every editor is a thin front end over the same fixed pipeline:
//!
//! ```text
//! bytes ─decode─▶ SourceRaster ─render(params)─▶ OutputRaster ─encode─▶ PNG
//!                                │
//!                                ├─ 1. crop + resample to the target size
//!                                ├─ 2. overlay a centered column band
//!                                └─ 3. clear alpha near a reference color
//! ```
//!
//! `render` is a pure function of its inputs. There is no canvas that
//! survives between calls: changing any parameter renders again from the
//! immutable source, and the preview and the saved file are two encodings of
//! the same buffer.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`imaging`] | Geometry, rasters, resample, overlay, mask, pipeline and codec |
//! | [`presets`] | Named output sizes (device screens, social formats) |
//! | [`naming`] | Export file names and `WxH` parsing |
//! | [`batch`] | Parallel icon padding over a directory of images |
//! | [`session`] | Editor state: last-writer-wins loads, keep-last-good render |
//! | [`generation`] | Text-to-image service boundary behind a transport trait |
//! | [`config`] | `crop-studio.toml` loading, merging and validation |
//! | [`logging`] | `tracing` subscriber setup |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## PNG-Only Output
//!
//! The mask produces real transparency, so the export format must carry an
//! alpha channel losslessly. PNG does, decodes everywhere, and round-trips
//! the rendered bytes exactly, which keeps tests honest.
//!
//! ## A Global Threshold, Not a Flood Fill
//!
//! The "magic wand" tests every pixel in its region against the reference
//! color independently. Disconnected matching pixels are cleared too. See
//! [`imaging::mask`].
//!
//! ## Bring Your Own Transport
//!
//! Image generation needs an HTTP client and a credential. The crate owns
//! the request shape, validation and response handling; the wire call goes
//! through [`generation::Transport`], so the library has no network stack
//! and tests script the service.

pub mod batch;
pub mod config;
pub mod generation;
pub mod imaging;
pub mod logging;
pub mod naming;
pub mod output;
pub mod presets;
pub mod session;

#[cfg(test)]
pub(crate) mod test_helpers;
