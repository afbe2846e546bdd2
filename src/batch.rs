//! Batch icon padding.
//!
//! Turns a folder of arbitrary images into uniformly sized icons with a
//! transparent margin: every source is scaled (stretched, not letterboxed)
//! into the inset `canvas - 2 * padding` and placed at `(padding, padding)`
//! on a fully transparent canvas.
//!
//! ## Pipeline per file
//!
//! ```text
//! read bytes → decode → pad_icon → encode PNG → write
//! ```
//!
//! ## Parallel Processing
//!
//! Files are processed in parallel using [rayon](https://docs.rs/rayon). Each
//! worker reads, decodes, renders and writes its own file end to end: no
//! buffer is shared between files, so there is nothing to lock. A file that
//! fails is reported in [`BatchReport::failed`] and the rest carry on.
//!
//! ## Output Location
//!
//! ```text
//! icons/                       out/
//! ├── logo.jpg        ──▶      ├── logo-sm.png
//! └── sub/app.webp    ──▶      └── app-sm.png
//! ```
//!
//! or, with [`Destination::BesideOriginal`], `icons/logo-sm.png` and
//! `icons/sub/app-sm.png`.
//!
//! Output paths are resolved for the whole batch before any worker starts.
//! Two sources that map to the same output (`a/logo.png` and `b/logo.png`
//! into one directory, or `logo.png` next to `logo.jpg`) keep the first in
//! input order; the later ones fail with [`BatchError::OutputCollision`]. An
//! output that is itself one of the inputs fails with
//! [`BatchError::WouldOverwrite`].

use crate::imaging::{
    CropRegion, DecodeError, EncodeError, GeometryError, OutputRaster, RenderError,
    ResampleFilter, SourceRaster, TargetSize, decode_file, resample, validate_target_size,
    write_png,
};
use crate::naming::{DEFAULT_BATCH_SUFFIX, batch_output_name};
use image::imageops;
use rayon::prelude::*;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;
use thiserror::Error;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum BatchError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("decode failed: {0}")]
    Decode(#[from] DecodeError),
    #[error("render failed: {0}")]
    Render(#[from] RenderError),
    #[error("encode failed: {0}")]
    Encode(#[from] EncodeError),
    #[error("output would overwrite its source: {0}")]
    WouldOverwrite(PathBuf),
    #[error("output already claimed by {}: {}", .first.display(), .output.display())]
    OutputCollision { output: PathBuf, first: PathBuf },
}

/// Canvas size and margin for one icon.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IconConfig {
    pub canvas: TargetSize,
    pub padding: u32,
    pub filter: ResampleFilter,
}

impl Default for IconConfig {
    fn default() -> Self {
        Self {
            canvas: TargetSize::new(200, 200),
            padding: 25,
            filter: ResampleFilter::default(),
        }
    }
}

/// Where padded icons are written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Destination {
    /// Flat into one directory (created if missing).
    Directory(PathBuf),
    /// Next to each source file.
    BesideOriginal,
}

#[derive(Debug, Clone)]
pub struct BatchOptions {
    pub icon: IconConfig,
    pub destination: Destination,
    pub suffix: String,
}

impl BatchOptions {
    pub fn new(icon: IconConfig, destination: Destination) -> Self {
        Self {
            icon,
            destination,
            suffix: DEFAULT_BATCH_SUFFIX.to_string(),
        }
    }

    fn output_path(&self, source: &Path) -> PathBuf {
        let name = batch_output_name(source, &self.suffix);
        match &self.destination {
            Destination::Directory(dir) => dir.join(name),
            Destination::BesideOriginal => source
                .parent()
                .map(|p| p.join(&name))
                .unwrap_or_else(|| PathBuf::from(name)),
        }
    }
}

/// Progress events emitted while a batch runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchEvent {
    Started { total: usize },
    Padded {
        index: usize,
        source: PathBuf,
        output: PathBuf,
    },
    Failed {
        index: usize,
        source: PathBuf,
        error: String,
    },
}

#[derive(Debug)]
pub struct PaddedIcon {
    pub source: PathBuf,
    pub output: PathBuf,
}

#[derive(Debug)]
pub struct FailedIcon {
    pub source: PathBuf,
    pub error: BatchError,
}

/// Outcome of a batch, in input order.
#[derive(Debug, Default)]
pub struct BatchReport {
    pub altered: Vec<PaddedIcon>,
    pub failed: Vec<FailedIcon>,
}

impl BatchReport {
    pub fn total(&self) -> usize {
        self.altered.len() + self.failed.len()
    }
}

/// Scale the whole source into the padded inset of a transparent canvas.
pub fn pad_icon(source: &SourceRaster, config: &IconConfig) -> Result<OutputRaster, RenderError> {
    let canvas = validate_target_size(config.canvas)?;
    let twice = config.padding.saturating_mul(2);
    let inset = TargetSize::new(
        canvas.width.saturating_sub(twice),
        canvas.height.saturating_sub(twice),
    );
    if inset.width == 0 || inset.height == 0 {
        return Err(GeometryError::DegenerateRegion(CropRegion::new(
            config.padding,
            config.padding,
            inset.width,
            inset.height,
        ))
        .into());
    }

    let scaled = resample(source, CropRegion::full(source.bounds()), inset, config.filter)?;
    let mut out = OutputRaster::transparent(canvas);
    imageops::replace(
        out.as_image_mut(),
        scaled.as_image(),
        config.padding as i64,
        config.padding as i64,
    );
    Ok(out)
}

/// Find decodable images under `dir`, recursively, in a stable order.
///
/// Hidden files and directories (leading `.`) are skipped.
pub fn collect_sources(dir: &Path) -> Result<Vec<PathBuf>, BatchError> {
    let mut files = Vec::new();
    let walker = WalkDir::new(dir)
        .follow_links(true)
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !e.file_name().to_string_lossy().starts_with('.'));
    for entry in walker {
        let entry = entry.map_err(std::io::Error::from)?;
        if entry.file_type().is_file() && crate::imaging::codec::is_supported_path(entry.path()) {
            files.push(entry.into_path());
        }
    }
    files.sort();
    Ok(files)
}

/// Resolve every output path up front, so no two workers share a file.
fn plan_outputs(files: &[PathBuf], options: &BatchOptions) -> Vec<Result<PathBuf, BatchError>> {
    let inputs: HashSet<&Path> = files.iter().map(PathBuf::as_path).collect();
    let mut claimed: HashMap<PathBuf, &Path> = HashMap::new();
    files
        .iter()
        .map(|source| {
            let output = options.output_path(source);
            if inputs.contains(output.as_path()) {
                return Err(BatchError::WouldOverwrite(output));
            }
            if let Some(first) = claimed.get(&output) {
                return Err(BatchError::OutputCollision {
                    first: first.to_path_buf(),
                    output,
                });
            }
            claimed.insert(output.clone(), source.as_path());
            Ok(output)
        })
        .collect()
}

/// Pad one file and write the result to its planned output.
fn process_file(
    source: &Path,
    output: PathBuf,
    options: &BatchOptions,
) -> Result<PathBuf, BatchError> {
    let raster = decode_file(source)?;
    let icon = pad_icon(&raster, &options.icon)?;
    if let Some(parent) = output.parent() {
        std::fs::create_dir_all(parent)?;
    }
    write_png(&icon, &output)?;
    Ok(output)
}

/// Pad every file in parallel.
///
/// Never fails as a whole: per-file errors land in the report. Events, when
/// a sender is given, arrive in completion order; the report is in input
/// order.
pub fn run_batch(
    files: &[PathBuf],
    options: &BatchOptions,
    events: Option<Sender<BatchEvent>>,
) -> BatchReport {
    let send = |event: BatchEvent| {
        if let Some(tx) = &events {
            // A closed receiver only means nobody is listening
            let _ = tx.send(event);
        }
    };
    send(BatchEvent::Started { total: files.len() });

    let planned = plan_outputs(files, options);
    let results: Vec<(PathBuf, Result<PathBuf, BatchError>)> = files
        .par_iter()
        .zip(planned)
        .enumerate()
        .map(|(index, (source, output))| {
            let result = output.and_then(|output| process_file(source, output, options));
            match &result {
                Ok(output) => {
                    debug!(source = %source.display(), output = %output.display(), "icon padded");
                    send(BatchEvent::Padded {
                        index,
                        source: source.clone(),
                        output: output.clone(),
                    });
                }
                Err(e) => {
                    warn!(source = %source.display(), error = %e, "icon failed");
                    send(BatchEvent::Failed {
                        index,
                        source: source.clone(),
                        error: e.to_string(),
                    });
                }
            }
            (source.clone(), result)
        })
        .collect();

    let mut report = BatchReport::default();
    for (source, result) in results {
        match result {
            Ok(output) => report.altered.push(PaddedIcon { source, output }),
            Err(error) => report.failed.push(FailedIcon { source, error }),
        }
    }
    info!(
        altered = report.altered.len(),
        failed = report.failed.len(),
        "batch finished"
    );
    report
}
