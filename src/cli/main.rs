//! Main CLI implementation

use crate::cli::config::{CliConfigBuilder, MISSING_PATHS};
use crate::{
    config::{has_extension, CanvasSize, PIPELINE_EXTENSIONS, SUPPORTED_INPUT_EXTENSIONS},
    resize::resize_directory,
    services::{
        BatchProgressUpdate, ConsoleProgressReporter, ImageIOService, ProgressReporter,
    },
    tracing_config::init_cli_tracing,
    types::{BatchReport, CatalogRun, ItemOutcome},
    CatalogProcessor,
};
use anyhow::{Context, Result};
use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use log::{info, warn};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Turn product photos into labeled catalog images
#[derive(Parser)]
#[command(name = "catalog-stamp")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose logging (default: INFO, -v: DEBUG, -vv: TRACE)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Resize a directory, then matte, label and stamp the results in place
    Run {
        /// Directory of source photos
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Directory that receives the catalog images
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Logo image (PNG or JPEG)
        #[arg(short, long)]
        logo: Option<PathBuf>,

        #[command(flatten)]
        style: StyleArgs,

        #[command(flatten)]
        batch: BatchArgs,
    },

    /// Matte, label and stamp individual images or directories without resizing
    Annotate {
        /// Image files or directories
        #[arg(value_name = "INPUT", required = true)]
        inputs: Vec<PathBuf>,

        /// Directory that receives the catalog images
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Logo image (PNG or JPEG)
        #[arg(short, long)]
        logo: Option<PathBuf>,

        #[command(flatten)]
        style: StyleArgs,

        #[command(flatten)]
        batch: BatchArgs,
    },

    /// Only resize a directory of photos to the canvas size
    Resize {
        #[arg(short, long)]
        input: Option<PathBuf>,

        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Canvas width in pixels
        #[arg(long, default_value_t = 1280)]
        width: u32,

        /// Canvas height in pixels
        #[arg(long, default_value_t = 960)]
        height: u32,
    },
}

/// Canvas, label and logo settings
#[derive(Args, Debug, Clone)]
pub struct StyleArgs {
    /// Label prefix
    #[arg(long, default_value = "A4P-")]
    pub base_text: String,

    /// First counter value
    #[arg(long, default_value_t = 25)]
    pub start: u64,

    /// Text appended after the counter
    #[arg(long, default_value = " SIZE-10X14 CODE-BGN", allow_hyphen_values = true)]
    pub suffix: String,

    /// Font family name or path to a .ttf/.otf file
    #[arg(long, default_value = "Arial")]
    pub font: String,

    /// Font size in pixels per em
    #[arg(long, default_value_t = 50.0)]
    pub font_size: f32,

    #[arg(long, default_value_t = 250, allow_negative_numbers = true)]
    pub text_x: i32,

    #[arg(long, default_value_t = 800, allow_negative_numbers = true)]
    pub text_y: i32,

    /// Text color as RRGGBB
    #[arg(long, default_value = "000000")]
    pub text_color: String,

    /// Replacement background color as RRGGBB
    #[arg(long, default_value = "ffffff")]
    pub background: String,

    /// Canvas width in pixels
    #[arg(long, default_value_t = 1280)]
    pub width: u32,

    /// Canvas height in pixels
    #[arg(long, default_value_t = 960)]
    pub height: u32,

    /// Logo bounding box edge in pixels
    #[arg(long, default_value_t = 170)]
    pub logo_box: u32,

    #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
    pub logo_x: i32,

    #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
    pub logo_y: i32,
}

/// Foreground extraction settings
#[derive(Args, Debug, Clone)]
pub struct MatteArgs {
    /// Foreground extraction method
    #[arg(long, value_enum, default_value_t = MatteMethod::BorderKey)]
    pub matte: MatteMethod,

    /// ONNX segmentation model for `--matte model`
    #[arg(long)]
    pub model: Option<PathBuf>,

    /// Square input size of the segmentation model
    #[arg(long, default_value_t = 1024)]
    pub model_input_size: u32,

    /// Give up on a single extraction after this many seconds
    #[arg(long)]
    pub matte_timeout: Option<f64>,

    /// Color distance treated as background by the border key
    #[arg(long, default_value_t = 40.0)]
    pub key_tolerance: f32,

    /// Width of the border key's alpha ramp
    #[arg(long, default_value_t = 20.0)]
    pub key_softness: f32,
}

/// Batch selection and reporting
#[derive(Args, Debug, Clone)]
pub struct BatchArgs {
    #[command(flatten)]
    pub matte: MatteArgs,

    /// Only process files whose name matches this glob (e.g. "*.jpg")
    #[arg(long)]
    pub pattern: Option<String>,

    /// Write a JSON report of the run to this file
    #[arg(long)]
    pub report: Option<PathBuf>,

    /// Show a progress bar
    #[arg(long)]
    pub progress: bool,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatteMethod {
    /// Key out the color found along the image border
    BorderKey,
    /// Use the input's own alpha channel
    Alpha,
    /// ONNX segmentation model (requires the `tract` feature)
    Model,
}

/// Main entry point for the CLI application
pub fn main() -> Result<()> {
    let cli = Cli::parse();

    init_cli_tracing(cli.verbose).context("Failed to initialize tracing")?;

    match cli.command {
        Command::Run {
            input,
            output,
            logo,
            style,
            batch,
        } => {
            let (input, output, logo) = CliConfigBuilder::validate_paths(
                input.as_deref(),
                output.as_deref(),
                logo.as_deref(),
            )?;
            run_pipeline(&input, &output, &logo, &style, &batch, cli.verbose)
        },
        Command::Annotate {
            inputs,
            output,
            logo,
            style,
            batch,
        } => {
            let (_, output, logo) = CliConfigBuilder::validate_paths(
                inputs.first().map(PathBuf::as_path),
                output.as_deref(),
                logo.as_deref(),
            )?;
            annotate_inputs(&inputs, &output, &logo, &style, &batch, cli.verbose)
        },
        Command::Resize {
            input,
            output,
            width,
            height,
        } => {
            let (Some(input), Some(output)) = (input, output) else {
                anyhow::bail!(MISSING_PATHS);
            };
            let size = CanvasSize::new(width, height);
            let summary = resize_directory(&input, &output, size)
                .with_context(|| format!("Failed to resize {}", input.display()))?;
            println!(
                "All images resized to {} and saved to {}",
                size,
                output.display()
            );
            if !summary.failed.is_empty() {
                warn!("{} image(s) could not be resized", summary.failed.len());
            }
            Ok(())
        },
    }
}

fn run_pipeline(
    input: &Path,
    output: &Path,
    logo: &Path,
    style: &StyleArgs,
    batch: &BatchArgs,
    verbose: u8,
) -> Result<()> {
    let config = CliConfigBuilder::from_args(style)?;
    let extractor = CliConfigBuilder::build_extractor(&batch.matte)?;

    let resize = resize_directory(input, output, config.canvas)
        .with_context(|| format!("Failed to resize {}", input.display()))?;

    let discovered = ImageIOService::list_images(output, PIPELINE_EXTENSIONS)
        .with_context(|| format!("Failed to list {}", output.display()))?;
    let paths = filter_by_pattern(discovered, batch.pattern.as_deref())?;

    let mut processor = CatalogProcessor::new(config, extractor)?
        .with_progress(progress_reporter(batch.progress, verbose));
    let report = processor.process_batch(&paths, output, logo)?;

    log_summary(&report);
    if let Some(path) = &batch.report {
        write_report(path, &CatalogRun { resize, batch: report })?;
    }

    println!("All images processed and saved to {}", output.display());
    Ok(())
}

fn annotate_inputs(
    inputs: &[PathBuf],
    output: &Path,
    logo: &Path,
    style: &StyleArgs,
    batch: &BatchArgs,
    verbose: u8,
) -> Result<()> {
    let config = CliConfigBuilder::from_args(style)?;
    let extractor = CliConfigBuilder::build_extractor(&batch.matte)?;

    let paths = filter_by_pattern(collect_inputs(inputs)?, batch.pattern.as_deref())?;
    if paths.is_empty() {
        warn!("No image files found to process");
        return Ok(());
    }

    let mut processor = CatalogProcessor::new(config, extractor)?
        .with_progress(progress_reporter(batch.progress, verbose));
    let report = processor.process_batch(&paths, output, logo)?;

    log_summary(&report);
    if let Some(path) = &batch.report {
        write_report(path, &report)?;
    }

    println!("All images processed and saved to {}", output.display());
    Ok(())
}

/// Expand directories and keep explicit files, sorted and deduplicated
fn collect_inputs(inputs: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for input in inputs {
        if input.is_dir() {
            files.extend(
                ImageIOService::list_images(input, SUPPORTED_INPUT_EXTENSIONS)
                    .with_context(|| format!("Failed to list {}", input.display()))?,
            );
        } else if has_extension(input, SUPPORTED_INPUT_EXTENSIONS) {
            // Missing files stay in the list so the batch reports them as skipped
            files.push(input.clone());
        } else {
            warn!("Skipping unsupported file: {}", input.display());
        }
    }

    files.sort();
    files.dedup();
    Ok(files)
}

fn filter_by_pattern(paths: Vec<PathBuf>, pattern: Option<&str>) -> Result<Vec<PathBuf>> {
    let Some(pattern) = pattern else {
        return Ok(paths);
    };
    // Reject a malformed glob up front instead of silently matching nothing
    glob::Pattern::new(pattern).with_context(|| format!("Invalid --pattern {pattern:?}"))?;

    Ok(paths
        .into_iter()
        .filter(|path| matches_pattern(path, Some(pattern)))
        .collect())
}

/// Check if a file name matches the given glob pattern
fn matches_pattern(path: &Path, pattern: Option<&str>) -> bool {
    match pattern {
        Some(pat) => {
            if let Some(filename) = path.file_name().and_then(|n| n.to_str()) {
                glob::Pattern::new(pat)
                    .map(|p| p.matches(filename))
                    .unwrap_or(false)
            } else {
                false
            }
        },
        None => true,
    }
}

fn progress_reporter(show_bar: bool, verbose: u8) -> Box<dyn ProgressReporter> {
    if show_bar {
        Box::new(IndicatifProgressReporter::new())
    } else {
        Box::new(ConsoleProgressReporter::new(verbose > 1))
    }
}

fn log_summary(report: &BatchReport) {
    let processed = report.items.len();
    info!("Batch processing completed:");
    info!("  Saved: {}", report.saved_count());
    info!("  Skipped: {}", report.skipped_count());
    info!("  Failed: {}", report.failed_count());
    info!("  Total time: {:.2}s", report.elapsed_ms as f64 / 1000.0);
    if processed > 0 {
        info!(
            "  Average time per image: {:.0}ms",
            report.elapsed_ms as f64 / processed as f64
        );
    }
}

fn write_report<T: Serialize>(path: &Path, report: &T) -> Result<()> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("Failed to create report {}", path.display()))?;
    serde_json::to_writer_pretty(std::io::BufWriter::new(file), report)
        .with_context(|| format!("Failed to write report {}", path.display()))?;
    info!("Report written to {}", path.display());
    Ok(())
}

/// Progress bar for interactive batch runs
struct IndicatifProgressReporter {
    bar: ProgressBar,
}

impl IndicatifProgressReporter {
    fn new() -> Self {
        let bar = ProgressBar::new(0);
        let style = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-");
        bar.set_style(style);
        Self { bar }
    }
}

impl ProgressReporter for IndicatifProgressReporter {
    fn report_batch_start(&self, total: usize) {
        self.bar.set_length(total as u64);
        self.bar.set_position(0);
    }

    fn report_progress(&self, update: &BatchProgressUpdate<'_>) {
        let name = update
            .current_item
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.bar
            .set_message(format!("{} {}", update.stage.description(), name));
    }

    fn report_item_finished(&self, outcome: &ItemOutcome) {
        self.bar.inc(1);
        if let ItemOutcome::Failed { input, reason, .. } = outcome {
            self.bar
                .println(format!("Failed: {} ({})", input.display(), reason));
        }
    }

    fn report_completion(&self, report: &BatchReport) {
        self.bar.finish_with_message(format!(
            "Completed! Saved: {}, Skipped: {}, Failed: {}",
            report.saved_count(),
            report.skipped_count(),
            report.failed_count()
        ));
    }
}
