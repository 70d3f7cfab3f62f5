use anyhow::Context;
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::time::Duration;
use tracing::Level;

use houghtune::batch::{self, BatchOptions, BatchRunner};
use houghtune::detection::{self, Channel, HoughGradientDetector};
use houghtune::{HoughError, HoughParams, ParameterSet, PreviewFile, Trigger, Tuner, console};

#[derive(Parser)]
#[command(name = "houghtune")]
#[command(about = "Detect circles in bitmap images and tune Hough parameters interactively")]
#[command(version)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Detect circles in one image or every matching image in a directory.
    /// Without a path, runs a demo on a synthesized test image.
    Detect(DetectArgs),

    /// Tune detection parameters live on one image.
    Tune(TuneArgs),
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ChannelArg {
    Luma,
    Green,
}

impl From<ChannelArg> for Channel {
    fn from(value: ChannelArg) -> Self {
        match value {
            ChannelArg::Luma => Channel::Luma,
            ChannelArg::Green => Channel::Green,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ModeArg {
    /// Recompute on every parameter change
    Events,
    /// Recompute once per poll interval
    Poll,
}

#[derive(Debug, Clone, Args)]
struct HoughArgs {
    /// Accumulator resolution: image resolution / accumulator resolution
    #[arg(long, default_value_t = 1.0)]
    dp: f32,

    /// Minimum distance between detected centres
    #[arg(long, default_value_t = 50.0)]
    min_dist: f32,

    /// Upper Canny threshold (the lower one is half of it)
    #[arg(long, default_value_t = 50.0)]
    param1: f32,

    /// Accumulator threshold; smaller finds more circles
    #[arg(long, default_value_t = 30.0)]
    param2: f32,

    #[arg(long, default_value_t = 10)]
    min_radius: u32,

    /// 0 means no upper bound
    #[arg(long, default_value_t = 300)]
    max_radius: u32,
}

impl HoughArgs {
    fn to_params(&self) -> HoughParams {
        HoughParams {
            dp: self.dp,
            min_dist: self.min_dist,
            param1: self.param1,
            param2: self.param2,
            min_radius: self.min_radius,
            max_radius: self.max_radius,
        }
    }
}

#[derive(Debug, Clone, Args)]
struct DetectArgs {
    /// Image file or directory of images
    #[arg(value_name = "PATH")]
    path: Option<PathBuf>,

    /// File name pattern used for directories
    #[arg(long, default_value = batch::DEFAULT_PATTERN)]
    pattern: String,

    /// Do not write annotated copies to results/
    #[arg(long)]
    no_save: bool,

    /// Also write each image's Canny edge map to results/<stem>_edges.png
    #[arg(long)]
    edges: bool,

    /// Write all detections as JSON
    #[arg(long, value_name = "FILE")]
    json: Option<PathBuf>,

    /// Where the demo image is written when no path is given
    #[arg(long, value_name = "DIR", default_value = ".")]
    demo_dir: PathBuf,

    /// Save preprocessing outputs to directory (must be empty)
    #[arg(long, value_name = "DIR")]
    debug_out: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = ChannelArg::Luma)]
    channel: ChannelArg,

    #[command(flatten)]
    hough: HoughArgs,
}

#[derive(Debug, Clone, Args)]
struct TuneArgs {
    /// Image to tune on
    #[arg(value_name = "IMAGE")]
    image_path: PathBuf,

    #[arg(long, value_enum, default_value_t = ModeArg::Events)]
    mode: ModeArg,

    /// Poll interval in milliseconds (poll mode)
    #[arg(long, default_value_t = 500)]
    poll_ms: u64,

    /// File the annotated frame is written to after every cycle
    #[arg(long, value_name = "FILE", default_value = "hough_tune.png")]
    preview: PathBuf,

    /// Starting slider values (JSON)
    #[arg(long, value_name = "FILE")]
    params: Option<PathBuf>,

    /// Write the final slider values here on exit (JSON)
    #[arg(long, value_name = "FILE")]
    save_params: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = ChannelArg::Green)]
    channel: ChannelArg,
}

fn init_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Detect(args) => run_detect(args, cli.verbose),
        Commands::Tune(args) => run_tune(args, cli.verbose),
    }
}

fn run_detect(args: DetectArgs, verbose: bool) -> anyhow::Result<()> {
    let params = args.hough.to_params();
    params.validate()?;

    let mut pipeline = detection::build_standard_pipeline(verbose).with_channel(args.channel.into());
    if let Some(debug_dir) = args.debug_out.clone() {
        pipeline = pipeline.with_debug(debug_dir)?;
    }

    let detector = HoughGradientDetector::new();
    let options = BatchOptions {
        save_results: !args.no_save,
        save_edges: args.edges,
        verbose,
        pattern: args.pattern.clone(),
        ..BatchOptions::default()
    };
    let runner = BatchRunner::new(&detector, &pipeline, params).with_options(options);

    let reports = match &args.path {
        Some(path) => match runner.run_path(path) {
            Ok(reports) => reports,
            Err(e @ HoughError::InvalidPath(_)) => {
                println!("Error: {}", e);
                return Ok(());
            }
            Err(e) => return Err(e.into()),
        },
        None => {
            print_usage();
            vec![runner.run_demo(&args.demo_dir)?]
        }
    };

    if let Some(json_path) = &args.json {
        write_json(json_path, &reports)?;
    }
    Ok(())
}

fn print_usage() {
    println!("Provide a BMP image path or a directory containing BMP images");
    println!("Usage: houghtune detect [IMAGE_OR_DIRECTORY]");
}

fn write_json(path: &Path, reports: &[houghtune::ImageReport]) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(reports)?;
    std::fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))?;
    println!("Report written to: {}", path.display());
    Ok(())
}

fn run_tune(args: TuneArgs, verbose: bool) -> anyhow::Result<()> {
    if verbose {
        println!("Loading image: {:?}", args.image_path);
    }

    let image = image::open(&args.image_path).map_err(|source| HoughError::Load {
        path: args.image_path.clone(),
        source,
    })?;

    let gray = detection::build_tuning_pipeline(verbose)
        .with_channel(args.channel.into())
        .run(&image)?;

    let initial = match &args.params {
        Some(path) => ParameterSet::load(path)?,
        None => ParameterSet::default(),
    };

    let trigger = match args.mode {
        ModeArg::Events => Trigger::EventDriven,
        ModeArg::Poll => Trigger::Polling {
            interval: Duration::from_millis(args.poll_ms.max(1)),
        },
    };

    println!("Preview: {}", args.preview.display());
    print!("{}", console::help_text());

    let detector = HoughGradientDetector::new();
    let mut viewer = PreviewFile::new(args.preview.clone());
    let (tx, rx) = mpsc::channel();
    // the reader blocks on stdin; it is left detached when the loop closes
    let _reader = console::spawn_stdin_reader(tx);

    let summary = Tuner::new(gray, initial, &detector, &mut viewer)
        .with_trigger(trigger)
        .with_verbose(verbose)
        .run(&rx)?;

    println!("Ran {} detection cycles", summary.cycles);
    println!("Final parameters: {}", summary.final_params);
    if let Some(path) = &args.save_params {
        summary.final_params.save(path)?;
        println!("Parameters saved to: {}", path.display());
    }
    Ok(())
}
