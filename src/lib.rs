#![allow(clippy::too_many_lines)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::uninlined_format_args)]

//! # Catalog Stamp
//!
//! Batch pipeline that turns a directory of product photos into listing-ready
//! catalog images.
//!
//! Every image goes through the same ordered stages:
//!
//! 1. **Resize** to a fixed canvas (1280x960 by default) with Lanczos resampling
//! 2. **Background replacement**: a [`ForegroundExtractor`] separates the subject and the
//!    result is flattened onto a solid color
//! 3. **Annotation**: a sequential product code (`A4P-25 SIZE-10X14 CODE-BGN`,
//!    `A4P-26 ...`) is burned into the pixels
//! 4. **Logo**: a logo, thumbnailed into a 170x170 box, is composited at the origin
//! 5. **Save** under the original file name
//!
//! Failures are isolated per image and reported in a [`BatchReport`]; one bad file
//! never stops the batch.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use catalog_stamp::{BorderKeyExtractor, CatalogProcessor, PipelineConfig};
//!
//! # fn example() -> catalog_stamp::Result<()> {
//! let config = PipelineConfig::builder()
//!     .base_text("A4P-")
//!     .counter_start(25)
//!     .build()?;
//!
//! let mut processor = CatalogProcessor::new(config, Box::new(BorderKeyExtractor::default()))?;
//! let run = processor.run("photos", "catalog", "logo.png")?;
//!
//! println!(
//!     "{} resized, {} labeled",
//!     run.resize.resized_count(),
//!     run.batch.saved_count()
//! );
//! # Ok(())
//! # }
//! ```
//!
//! ### Feature Flags
//!
//! - `cli` (default): the `catalog-stamp` binary, progress bars and subscriber setup
//! - `tract`: [`TractExtractor`](matte::TractExtractor), ONNX segmentation in pure Rust

pub mod annotate;
#[cfg(feature = "cli")]
pub mod cli;
pub mod compositing;
pub mod config;
pub mod error;
pub mod labeler;
pub mod logo;
pub mod matte;
pub mod processor;
pub mod resize;
pub mod services;
pub mod tracing_config;
pub mod types;

pub use annotate::Annotator;
pub use config::{
    CanvasSize, FontSource, LabelConfig, LogoPlacement, PipelineConfig, PipelineConfigBuilder,
    RgbColor, TextStyle, LOGO_EXTENSIONS, PIPELINE_EXTENSIONS, SUPPORTED_INPUT_EXTENSIONS,
};
pub use error::{CatalogError, Result};
pub use labeler::SequenceLabeler;
pub use logo::LogoStamper;
#[cfg(feature = "tract")]
pub use matte::TractExtractor;
pub use matte::{
    AlphaChannelExtractor, BorderKeyExtractor, DeadlineExtractor, FnExtractor,
    ForegroundExtractor, MatteCompositor,
};
pub use processor::CatalogProcessor;
pub use resize::resize_directory;
pub use services::{
    BatchProgressUpdate, ConsoleProgressReporter, ImageIOService, NoOpProgressReporter,
    ProcessingStage, ProgressReporter,
};
pub use tracing_config::{TracingConfig, TracingFormat};
pub use types::{
    BatchReport, CatalogRun, ItemOutcome, LogoOutcome, ResizeFailure, ResizeSummary,
    TextRendering,
};

use std::path::{Path, PathBuf};

/// Annotate a list of images with default progress handling
///
/// Convenience wrapper around [`CatalogProcessor::process_batch`] for callers
/// that do not need to keep the processor around.
///
/// # Errors
/// - `config` is invalid
/// - `output_dir` cannot be created
pub fn annotate_images<P, L>(
    paths: &[PathBuf],
    output_dir: P,
    logo_path: L,
    config: PipelineConfig,
    extractor: Box<dyn ForegroundExtractor>,
) -> Result<BatchReport>
where
    P: AsRef<Path>,
    L: AsRef<Path>,
{
    let mut processor = CatalogProcessor::new(config, extractor)?;
    processor.process_batch(paths, output_dir, logo_path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};
    use tempfile::tempdir;

    #[test]
    fn test_annotate_images_convenience() {
        let input = tempdir().unwrap();
        let output = tempdir().unwrap();
        let path = input.path().join("item.png");
        RgbImage::from_pixel(32, 32, Rgb([12, 34, 56])).save(&path).unwrap();

        let report = annotate_images(
            &[path],
            output.path(),
            input.path().join("missing_logo.png"),
            PipelineConfig::default(),
            Box::new(AlphaChannelExtractor),
        )
        .unwrap();

        assert_eq!(report.saved_count(), 1);
        assert!(output.path().join("item.png").exists());
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let config = PipelineConfig {
            canvas: CanvasSize::new(0, 0),
            ..PipelineConfig::default()
        };
        let result = annotate_images(
            &[],
            "unused",
            "unused.png",
            config,
            Box::new(AlphaChannelExtractor),
        );
        assert!(matches!(result, Err(CatalogError::InvalidConfig(_))));
    }
}
