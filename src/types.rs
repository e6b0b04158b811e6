//! Outcome and report types produced by the pipeline stages

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Which glyph source the annotator drew with
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TextRendering {
    /// Scalable font resolved from the configured source
    Scalable { font: String },
    /// Built-in fixed-size bitmap glyphs
    BitmapFallback,
    /// Empty label, nothing drawn
    Nothing,
}

/// What the logo stage did to an image
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LogoOutcome {
    /// Logo composited with the given thumbnail size
    Stamped { width: u32, height: u32 },
    /// Logo could not be applied; image left as it was
    Unchanged { reason: String },
}

/// Per-image result of one pipeline pass
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ItemOutcome {
    /// Image went through every stage and was written
    Saved {
        input: PathBuf,
        output: PathBuf,
        label: String,
        text: TextRendering,
        logo: LogoOutcome,
        elapsed_ms: u64,
    },
    /// Background replacement failed; nothing downstream ran and no label was used
    Skipped { input: PathBuf, reason: String },
    /// Image was labeled but could not be written
    Failed {
        input: PathBuf,
        label: String,
        reason: String,
    },
}

impl ItemOutcome {
    #[must_use]
    pub fn input(&self) -> &PathBuf {
        match self {
            Self::Saved { input, .. } | Self::Skipped { input, .. } | Self::Failed { input, .. } => {
                input
            },
        }
    }

    /// Label consumed by this item, if any
    #[must_use]
    pub fn label(&self) -> Option<&str> {
        match self {
            Self::Saved { label, .. } | Self::Failed { label, .. } => Some(label),
            Self::Skipped { .. } => None,
        }
    }

    #[must_use]
    pub fn is_saved(&self) -> bool {
        matches!(self, Self::Saved { .. })
    }
}

/// Summary of one Pipeline Driver invocation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchReport {
    pub output_dir: PathBuf,
    pub items: Vec<ItemOutcome>,
    pub elapsed_ms: u64,
}

impl BatchReport {
    #[must_use]
    pub fn saved_count(&self) -> usize {
        self.items.iter().filter(|item| item.is_saved()).count()
    }

    #[must_use]
    pub fn skipped_count(&self) -> usize {
        self.items
            .iter()
            .filter(|item| matches!(item, ItemOutcome::Skipped { .. }))
            .count()
    }

    #[must_use]
    pub fn failed_count(&self) -> usize {
        self.items
            .iter()
            .filter(|item| matches!(item, ItemOutcome::Failed { .. }))
            .count()
    }

    /// Labels in the order they were issued
    #[must_use]
    pub fn labels(&self) -> Vec<&str> {
        self.items.iter().filter_map(ItemOutcome::label).collect()
    }

    /// Output files written by this batch
    #[must_use]
    pub fn outputs(&self) -> Vec<&PathBuf> {
        self.items
            .iter()
            .filter_map(|item| match item {
                ItemOutcome::Saved { output, .. } => Some(output),
                _ => None,
            })
            .collect()
    }
}

/// A file the resizer could not handle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResizeFailure {
    pub path: PathBuf,
    pub reason: String,
}

/// Summary of one Resizer invocation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResizeSummary {
    pub output_dir: PathBuf,
    pub resized: Vec<PathBuf>,
    pub failed: Vec<ResizeFailure>,
}

impl ResizeSummary {
    #[must_use]
    pub fn resized_count(&self) -> usize {
        self.resized.len()
    }
}

/// Result of the full resize-then-annotate flow
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogRun {
    pub resize: ResizeSummary,
    pub batch: BatchReport,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_report() -> BatchReport {
        BatchReport {
            output_dir: PathBuf::from("out"),
            items: vec![
                ItemOutcome::Saved {
                    input: PathBuf::from("a.png"),
                    output: PathBuf::from("out/a.png"),
                    label: "A4P-25 SIZE-10X14 CODE-BGN".to_string(),
                    text: TextRendering::BitmapFallback,
                    logo: LogoOutcome::Stamped {
                        width: 170,
                        height: 43,
                    },
                    elapsed_ms: 12,
                },
                ItemOutcome::Skipped {
                    input: PathBuf::from("b.png"),
                    reason: "extraction failed".to_string(),
                },
                ItemOutcome::Failed {
                    input: PathBuf::from("c.png"),
                    label: "A4P-26 SIZE-10X14 CODE-BGN".to_string(),
                    reason: "disk full".to_string(),
                },
            ],
            elapsed_ms: 40,
        }
    }

    #[test]
    fn test_report_counts() {
        let report = sample_report();
        assert_eq!(report.saved_count(), 1);
        assert_eq!(report.skipped_count(), 1);
        assert_eq!(report.failed_count(), 1);
        assert_eq!(
            report.labels(),
            vec!["A4P-25 SIZE-10X14 CODE-BGN", "A4P-26 SIZE-10X14 CODE-BGN"]
        );
        assert_eq!(report.outputs(), vec![&PathBuf::from("out/a.png")]);
    }

    #[test]
    fn test_report_serializes_with_status_tags() {
        let json = serde_json::to_value(sample_report()).unwrap();
        let items = json["items"].as_array().unwrap();
        assert_eq!(items[0]["status"], "saved");
        assert_eq!(items[0]["text"]["kind"], "bitmap_fallback");
        assert_eq!(items[0]["logo"]["kind"], "stamped");
        assert_eq!(items[1]["status"], "skipped");
        assert_eq!(items[2]["status"], "failed");
    }
}
