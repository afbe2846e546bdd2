use clap::{Parser, Subcommand};
use crop_studio::batch::{self, BatchOptions, Destination};
use crop_studio::config::{self, EditorConfig, MaskArea};
use crop_studio::imaging::{self, AspectRatio, CropRegion, ResampleFilter, Rgb, TargetSize};
use crop_studio::session::EditorSession;
use crop_studio::{logging, naming, output, presets};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "crop-studio")]
#[command(about = "Crop, resize, overlay and mask raster images")]
#[command(long_about = "\
Crop, resize, overlay and mask raster images

Single images go through a fixed pipeline:

  1. crop      --crop x,y,w,h or --aspect 16:9 (largest centered box)
  2. resize    --size WxH or --preset <slug>, stretched to fill exactly
  3. overlay   a centered vertical band: --band-width, --opacity, --color
  4. mask      pixels near --reference (default white) become transparent
               when --tolerance is given; --mask band|full picks the area

Batch mode pads every image in a directory onto a transparent square:

  crop-studio batch icons/ --size 200x200 --padding 25 --output out/

Settings are read from crop-studio.toml when present. Run
'crop-studio gen-config' for a documented stock file.")]
#[command(version)]
struct Cli {
    /// Config file (default: ./crop-studio.toml when it exists)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Args)]
struct RenderArgs {
    /// Image to edit
    input: PathBuf,

    /// Output PNG (default: output.filename from config)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Crop rectangle in source pixels
    #[arg(long, value_name = "X,Y,W,H", conflicts_with = "aspect")]
    crop: Option<CropRegion>,

    /// Largest centered crop with this ratio (16:9, 9:16, free)
    #[arg(long, value_name = "W:H")]
    aspect: Option<AspectRatio>,

    /// Output size
    #[arg(long, value_name = "WxH", value_parser = parse_size, conflicts_with = "preset")]
    size: Option<TargetSize>,

    /// Named output size (see `crop-studio presets`)
    #[arg(long)]
    preset: Option<String>,

    /// Skip the column overlay
    #[arg(long)]
    no_overlay: bool,

    /// Overlay band width, percent of output width
    #[arg(long, value_name = "PERCENT")]
    band_width: Option<f32>,

    /// Overlay opacity, 0.0-1.0
    #[arg(long)]
    opacity: Option<f32>,

    /// Overlay color (#rrggbb)
    #[arg(long)]
    color: Option<Rgb>,

    /// Enable the magic wand with this tolerance, percent
    #[arg(long, value_name = "PERCENT")]
    tolerance: Option<f32>,

    /// Color the magic wand clears (#rrggbb)
    #[arg(long)]
    reference: Option<Rgb>,

    /// Area the magic wand may touch
    #[arg(long, value_enum)]
    mask: Option<MaskArea>,

    /// Interpolation filter (bilinear, catmull-rom, lanczos3)
    #[arg(long)]
    filter: Option<ResampleFilter>,
}

#[derive(clap::Args)]
struct BatchArgs {
    /// Directory of images (searched recursively)
    input: PathBuf,

    /// Directory for padded icons
    #[arg(short, long, default_value = "icons-out", conflicts_with = "save_to_original")]
    output: PathBuf,

    /// Icon canvas size
    #[arg(long, value_name = "WxH", value_parser = parse_size)]
    size: Option<TargetSize>,

    /// Transparent margin in pixels
    #[arg(long)]
    padding: Option<u32>,

    /// Added to each file stem: logo.jpg -> logo-sm.png
    #[arg(long)]
    suffix: Option<String>,

    /// Write icons next to their source files
    #[arg(long)]
    save_to_original: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Crop, resize, overlay and mask a single image
    Render(RenderArgs),
    /// Pad every image in a directory onto a transparent canvas
    Batch(BatchArgs),
    /// List the named output sizes
    Presets,
    /// Print a stock crop-studio.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Command::Render(args) => {
            let mut config = config::load_config(cli.config.as_deref())?;
            apply_render_overrides(&mut config, &args);
            config.validate()?;
            logging::init_logging(&config.logging);
            render(&config, &args)?;
        }
        Command::Batch(args) => {
            let mut config = config::load_config(cli.config.as_deref())?;
            apply_batch_overrides(&mut config, &args);
            config.validate()?;
            logging::init_logging(&config.logging);
            init_thread_pool(&config.processing);
            run_batch(&config, &args)?;
        }
        Command::Presets => {
            output::print_presets(presets::PRESETS);
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

fn render(config: &EditorConfig, args: &RenderArgs) -> Result<(), Box<dyn std::error::Error>> {
    // The session swaps in a full-frame crop once the image is decoded
    let mut session = EditorSession::new(config.render_params(CropRegion::new(0, 0, 0, 0)));
    let ticket = session.begin_load();
    session.complete_load(ticket, imaging::decode_file(&args.input))?;

    let bounds = session.source().ok_or("no image was loaded")?.bounds();
    let crop = match (args.crop, args.aspect) {
        (Some(crop), _) => crop,
        (None, Some(aspect)) => CropRegion::largest_centered(bounds, aspect),
        (None, None) => CropRegion::full(bounds),
    };
    session.update_params(config.render_params(crop))?;

    let preview = session.preview().ok_or("nothing was rendered")?;
    let out_path = args
        .output
        .clone()
        .unwrap_or_else(|| PathBuf::from(&config.output.filename));
    imaging::write_png(&preview, &out_path)?;
    output::print_render_summary(&args.input, &out_path, session.params(), session.mask_stats());
    Ok(())
}

fn run_batch(config: &EditorConfig, args: &BatchArgs) -> Result<(), Box<dyn std::error::Error>> {
    let files = batch::collect_sources(&args.input)?;
    let destination = if config.batch.save_to_original {
        Destination::BesideOriginal
    } else {
        Destination::Directory(args.output.clone())
    };
    let options = BatchOptions {
        suffix: config.batch.suffix.clone(),
        ..BatchOptions::new(config.icon_config(), destination)
    };

    let (tx, rx) = std::sync::mpsc::channel();
    let printer = std::thread::spawn(move || {
        for event in rx {
            for line in output::format_batch_event(&event) {
                println!("{}", line);
            }
        }
    });
    let report = batch::run_batch(&files, &options, Some(tx));
    printer.join().map_err(|_| "output thread panicked")?;
    output::print_batch_report(&report);

    if !report.failed.is_empty() {
        return Err(format!("{} of {} images failed", report.failed.len(), report.total()).into());
    }
    Ok(())
}

/// Command-line flags win over the config file.
fn apply_render_overrides(config: &mut EditorConfig, args: &RenderArgs) {
    if let Some(size) = args.size {
        config.output.width = size.width;
        config.output.height = size.height;
        config.output.preset = None;
    }
    if let Some(preset) = &args.preset {
        config.output.preset = Some(preset.clone());
    }
    if args.no_overlay {
        config.overlay.visible = false;
    }
    if let Some(width) = args.band_width {
        config.overlay.width_percent = width;
    }
    if let Some(opacity) = args.opacity {
        config.overlay.opacity = opacity;
    }
    if let Some(color) = args.color {
        config.overlay.color = color;
    }
    if let Some(tolerance) = args.tolerance {
        config.tolerance.enabled = true;
        config.tolerance.percent = tolerance;
    }
    if let Some(reference) = args.reference {
        config.tolerance.reference = reference;
    }
    if let Some(region) = args.mask {
        config.tolerance.region = region;
    }
    if let Some(filter) = args.filter {
        config.resample.filter = filter;
    }
}

fn apply_batch_overrides(config: &mut EditorConfig, args: &BatchArgs) {
    if let Some(size) = args.size {
        config.batch.width = size.width;
        config.batch.height = size.height;
    }
    if let Some(padding) = args.padding {
        config.batch.padding = padding;
    }
    if let Some(suffix) = &args.suffix {
        config.batch.suffix = suffix.clone();
    }
    if args.save_to_original {
        config.batch.save_to_original = true;
    }
}

fn parse_size(s: &str) -> Result<TargetSize, String> {
    naming::parse_dimensions(s).ok_or_else(|| format!("expected WIDTHxHEIGHT, got {s:?}"))
}

/// Initialize the rayon thread pool based on processing config.
///
/// Caps at the number of available CPU cores; the user can constrain down, not up.
fn init_thread_pool(processing: &config::ProcessingConfig) {
    let threads = config::effective_threads(processing);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .ok();
}
