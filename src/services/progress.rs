//! Progress reporting service
//!
//! Keeps progress display out of the pipeline so each frontend can decide how
//! (and whether) to show it.

use crate::types::{BatchReport, ItemOutcome};
use std::path::Path;

/// Pipeline stages an item passes through
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessingStage {
    /// Decoding the source and replacing its background
    BackgroundRemoval,
    /// Burning in the product code
    Annotation,
    /// Compositing the logo
    LogoStamping,
    /// Encoding and writing the result
    Saving,
}

impl ProcessingStage {
    #[must_use]
    pub fn description(&self) -> &'static str {
        match self {
            ProcessingStage::BackgroundRemoval => "Removing background",
            ProcessingStage::Annotation => "Drawing product code",
            ProcessingStage::LogoStamping => "Stamping logo",
            ProcessingStage::Saving => "Saving result",
        }
    }
}

/// Progress update for one item of a batch
#[derive(Debug, Clone)]
pub struct BatchProgressUpdate<'a> {
    /// Zero-based position of the item in the batch
    pub index: usize,
    pub total: usize,
    pub current_item: &'a Path,
    pub stage: ProcessingStage,
    /// Milliseconds since the batch started
    pub elapsed_ms: u64,
}

/// Receives progress notifications from the Pipeline Driver
pub trait ProgressReporter {
    /// Called once before the first item
    fn report_batch_start(&self, total: usize) {
        let _ = total;
    }

    /// Called when an item enters a stage
    fn report_progress(&self, update: &BatchProgressUpdate<'_>);

    /// Called once per item with its final outcome
    fn report_item_finished(&self, outcome: &ItemOutcome) {
        let _ = outcome;
    }

    /// Called once after the last item
    fn report_completion(&self, report: &BatchReport);
}

/// Progress reporter that discards all updates
pub struct NoOpProgressReporter;

impl ProgressReporter for NoOpProgressReporter {
    fn report_progress(&self, _update: &BatchProgressUpdate<'_>) {}

    fn report_completion(&self, _report: &BatchReport) {}
}

/// Progress reporter that writes progress through the logging facade
pub struct ConsoleProgressReporter {
    verbose: bool,
}

impl ConsoleProgressReporter {
    /// Create a new console progress reporter
    ///
    /// With `verbose` set every stage transition is logged, otherwise only the
    /// start of each item.
    #[must_use]
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }
}

impl ProgressReporter for ConsoleProgressReporter {
    fn report_progress(&self, update: &BatchProgressUpdate<'_>) {
        if self.verbose {
            log::info!(
                "[{}/{}] {}: {} ({}ms elapsed)",
                update.index + 1,
                update.total,
                update.stage.description(),
                update.current_item.display(),
                update.elapsed_ms
            );
        } else if update.stage == ProcessingStage::BackgroundRemoval {
            log::info!(
                "[{}/{}] {}",
                update.index + 1,
                update.total,
                update.current_item.display()
            );
        }
    }

    fn report_completion(&self, report: &BatchReport) {
        log::info!(
            "Batch finished in {}ms: {} saved, {} skipped, {} failed",
            report.elapsed_ms,
            report.saved_count(),
            report.skipped_count(),
            report.failed_count()
        );
    }
}
