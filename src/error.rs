//! Error types for catalog pipeline operations

use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// Result type alias for catalog pipeline operations
pub type Result<T> = std::result::Result<T, CatalogError>;

/// Error types surfaced by the pipeline stages
#[derive(Error, Debug)]
pub enum CatalogError {
    /// Input/output errors (file not found, permission denied, etc.)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Image decode/encode errors
    #[error("Image processing error: {0}")]
    Image(#[from] image::ImageError),

    /// The foreground-extraction collaborator failed
    #[error("Foreground extraction failed: {0}")]
    Extraction(String),

    /// The foreground-extraction collaborator did not answer in time
    #[error("Foreground extraction exceeded the {0:?} deadline")]
    ExtractionTimeout(Duration),

    /// An extractor returned a foreground that does not match its source
    #[error("Foreground is {actual_width}x{actual_height} but source is {expected_width}x{expected_height}")]
    DimensionMismatch {
        expected_width: u32,
        expected_height: u32,
        actual_width: u32,
        actual_height: u32,
    },

    /// Scalable font could not be resolved or parsed
    #[error("Font unavailable: {0}")]
    Font(String),

    /// Logo asset could not be loaded
    #[error("Logo unavailable: {0}")]
    Logo(String),

    /// Invalid configuration or parameters
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Processing errors not covered above
    #[error("Processing error: {0}")]
    Processing(String),
}

impl CatalogError {
    /// Create a new invalid configuration error
    pub fn invalid_config<S: Into<String>>(msg: S) -> Self {
        Self::InvalidConfig(msg.into())
    }

    /// Create a new extraction error
    pub fn extraction<S: Into<String>>(msg: S) -> Self {
        Self::Extraction(msg.into())
    }

    /// Create a new font error
    pub fn font<S: Into<String>>(msg: S) -> Self {
        Self::Font(msg.into())
    }

    /// Create a new logo error
    pub fn logo<S: Into<String>>(msg: S) -> Self {
        Self::Logo(msg.into())
    }

    /// Create a new processing error
    pub fn processing<S: Into<String>>(msg: S) -> Self {
        Self::Processing(msg.into())
    }

    /// Create file I/O error with operation context
    pub fn file_io_error<P: AsRef<Path>>(operation: &str, path: P, error: &std::io::Error) -> Self {
        let path_display = path.as_ref().display();
        Self::Io(std::io::Error::new(
            error.kind(),
            format!("Failed to {operation} '{path_display}': {error}"),
        ))
    }

    /// Create image loading error with format context
    pub fn image_load_error<P: AsRef<Path>>(path: P, error: &image::ImageError) -> Self {
        let path_display = path.as_ref().display();
        let extension = path
            .as_ref()
            .extension()
            .and_then(|s| s.to_str())
            .unwrap_or("unknown");

        Self::Image(image::ImageError::IoError(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            format!(
                "Failed to load image '{path_display}' (format: {extension}): {error}. Supported formats: PNG, JPEG, BMP, GIF"
            ),
        )))
    }

    /// Whether this error came out of the foreground-extraction boundary
    #[must_use]
    pub fn is_extraction_failure(&self) -> bool {
        matches!(
            self,
            Self::Extraction(_) | Self::ExtractionTimeout(_) | Self::DimensionMismatch { .. }
        )
    }
}
