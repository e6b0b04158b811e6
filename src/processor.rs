//! Pipeline Driver
//!
//! `CatalogProcessor` runs matte → label → annotate → logo → save over a list
//! of images. Every item is isolated: a failure is recorded in the
//! [`BatchReport`] and the loop moves on to the next path.

use crate::{
    annotate::Annotator,
    config::{PipelineConfig, PIPELINE_EXTENSIONS},
    error::Result,
    labeler::SequenceLabeler,
    logo::LogoStamper,
    matte::{ForegroundExtractor, MatteCompositor},
    resize::resize_directory,
    services::{
        BatchProgressUpdate, ImageIOService, NoOpProgressReporter, ProcessingStage,
        ProgressReporter,
    },
    tracing_config::spans,
    types::{BatchReport, CatalogRun, ItemOutcome, LogoOutcome},
};
use image::DynamicImage;
use instant::Instant;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};

/// Position of one item inside the running batch
struct ItemContext<'a> {
    index: usize,
    total: usize,
    path: &'a Path,
    batch_start: Instant,
}

impl<'a> ItemContext<'a> {
    fn update(&self, stage: ProcessingStage) -> BatchProgressUpdate<'a> {
        BatchProgressUpdate {
            index: self.index,
            total: self.total,
            current_item: self.path,
            stage,
            elapsed_ms: self.batch_start.elapsed().as_millis() as u64,
        }
    }
}

/// Orchestrates the per-image pipeline
pub struct CatalogProcessor {
    config: PipelineConfig,
    compositor: MatteCompositor,
    annotator: Annotator,
    progress: Box<dyn ProgressReporter>,
}

impl CatalogProcessor {
    /// Create a processor, resolving the annotation font up front
    ///
    /// # Errors
    /// Returns `CatalogError::InvalidConfig` when `config` fails validation
    pub fn new(config: PipelineConfig, extractor: Box<dyn ForegroundExtractor>) -> Result<Self> {
        config.validate()?;
        let annotator = Annotator::new(config.text.clone());
        Ok(Self::with_parts(config, extractor, annotator))
    }

    /// Create a processor with an already constructed annotator
    ///
    /// # Errors
    /// Returns `CatalogError::InvalidConfig` when `config` fails validation
    pub fn with_annotator(
        config: PipelineConfig,
        extractor: Box<dyn ForegroundExtractor>,
        annotator: Annotator,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self::with_parts(config, extractor, annotator))
    }

    fn with_parts(
        config: PipelineConfig,
        extractor: Box<dyn ForegroundExtractor>,
        annotator: Annotator,
    ) -> Self {
        let compositor = MatteCompositor::new(extractor, config.background);
        Self {
            config,
            compositor,
            annotator,
            progress: Box::new(NoOpProgressReporter),
        }
    }

    /// Replace the progress reporter
    #[must_use]
    pub fn with_progress(mut self, reporter: Box<dyn ProgressReporter>) -> Self {
        self.progress = reporter;
        self
    }

    #[must_use]
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Run the pipeline over `paths`, writing results into `output_dir`
    ///
    /// The label counter starts from the configured value on every call. Items
    /// are processed in the order given; outputs keep the input's file name
    /// and overwrite any existing file of that name.
    ///
    /// # Errors
    /// Only when `output_dir` cannot be created. Per-image failures are
    /// reported in the returned [`BatchReport`].
    pub fn process_batch<P, L>(&mut self, paths: &[PathBuf], output_dir: P, logo_path: L) -> Result<BatchReport>
    where
        P: AsRef<Path>,
        L: AsRef<Path>,
    {
        let output_dir = output_dir.as_ref();
        let batch_start = Instant::now();
        let _span = spans::batch_processing(paths.len(), output_dir).entered();

        ImageIOService::ensure_directory(output_dir)?;

        let mut labeler = SequenceLabeler::new(&self.config.label);
        let stamper = LogoStamper::load(logo_path, self.config.logo);

        info!(
            "Processing {} image(s) with {} background removal",
            paths.len(),
            self.compositor.extractor_name()
        );
        self.progress.report_batch_start(paths.len());

        let mut items = Vec::with_capacity(paths.len());
        for (index, path) in paths.iter().enumerate() {
            let _file_span = spans::file_processing(path, index).entered();
            let item = ItemContext {
                index,
                total: paths.len(),
                path,
                batch_start,
            };
            let outcome = self.process_item(&item, &mut labeler, &stamper, output_dir);
            self.progress.report_item_finished(&outcome);
            items.push(outcome);
        }

        let report = BatchReport {
            output_dir: output_dir.to_path_buf(),
            items,
            elapsed_ms: batch_start.elapsed().as_millis() as u64,
        };

        if report.skipped_count() + report.failed_count() > 0 {
            warn!(
                "Some images were not processed. Saved: {}, Skipped: {}, Failed: {}",
                report.saved_count(),
                report.skipped_count(),
                report.failed_count()
            );
        }
        debug!(
            "Issued {} label(s), next counter value {}",
            labeler.issued(),
            labeler.peek()
        );
        self.progress.report_completion(&report);

        Ok(report)
    }

    fn process_item(
        &mut self,
        item: &ItemContext<'_>,
        labeler: &mut SequenceLabeler,
        stamper: &LogoStamper,
        output_dir: &Path,
    ) -> ItemOutcome {
        let item_start = Instant::now();
        let path = item.path;

        self.progress
            .report_progress(&item.update(ProcessingStage::BackgroundRemoval));

        let mut image = match self.compositor.remove_background(path) {
            Ok(image) => image,
            Err(e) => {
                warn!("Skipping image {} due to processing error: {}", path.display(), e);
                return ItemOutcome::Skipped {
                    input: path.to_path_buf(),
                    reason: e.to_string(),
                };
            },
        };

        if image.dimensions() != self.config.canvas.as_tuple() {
            debug!(
                "{} is {}x{}, expected canvas {}",
                path.display(),
                image.width(),
                image.height(),
                self.config.canvas
            );
        }

        let label = labeler.next_label();

        self.progress.report_progress(&item.update(ProcessingStage::Annotation));
        let text = self.annotator.annotate(&mut image, &label);

        self.progress.report_progress(&item.update(ProcessingStage::LogoStamping));
        let logo = stamper.stamp(&mut image);
        if let LogoOutcome::Unchanged { reason } = &logo {
            debug!("No logo on {}: {}", path.display(), reason);
        }

        self.progress.report_progress(&item.update(ProcessingStage::Saving));
        let Some(file_name) = path.file_name() else {
            error!("Cannot derive an output name from {}", path.display());
            return ItemOutcome::Failed {
                input: path.to_path_buf(),
                label,
                reason: "input path has no file name".to_string(),
            };
        };
        let output = output_dir.join(file_name);

        match ImageIOService::save_image(&DynamicImage::ImageRgb8(image), &output) {
            Ok(()) => {
                info!("Processed image saved to {}", output.display());
                ItemOutcome::Saved {
                    input: path.to_path_buf(),
                    output,
                    label,
                    text,
                    logo,
                    elapsed_ms: item_start.elapsed().as_millis() as u64,
                }
            },
            Err(e) => {
                error!("Failed to save {}: {}", output.display(), e);
                ItemOutcome::Failed {
                    input: path.to_path_buf(),
                    label,
                    reason: e.to_string(),
                }
            },
        }
    }

    /// Annotate every image directly inside `input_dir` whose extension is in
    /// `extensions`, in sorted order
    ///
    /// # Errors
    /// - `input_dir` cannot be listed
    /// - `output_dir` cannot be created
    pub fn process_directory<I, O, L>(
        &mut self,
        input_dir: I,
        output_dir: O,
        logo_path: L,
        extensions: &[&str],
    ) -> Result<BatchReport>
    where
        I: AsRef<Path>,
        O: AsRef<Path>,
        L: AsRef<Path>,
    {
        let paths = ImageIOService::list_images(input_dir, extensions)?;
        self.process_batch(&paths, output_dir, logo_path)
    }

    /// Full run: resize `input_dir` into `output_dir`, then annotate the PNG
    /// and JPEG files found there in place
    ///
    /// # Errors
    /// - `input_dir` or `output_dir` cannot be listed
    /// - `output_dir` cannot be created
    pub fn run<I, O, L>(&mut self, input_dir: I, output_dir: O, logo_path: L) -> Result<CatalogRun>
    where
        I: AsRef<Path>,
        O: AsRef<Path>,
        L: AsRef<Path>,
    {
        let output_dir = output_dir.as_ref();
        let resize = resize_directory(input_dir, output_dir, self.config.canvas)?;
        let batch = self.process_directory(output_dir, output_dir, logo_path, PIPELINE_EXTENSIONS)?;

        info!("All images processed and saved to {}", output_dir.display());
        Ok(CatalogRun { resize, batch })
    }
}
