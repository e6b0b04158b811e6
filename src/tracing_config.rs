//! Tracing configuration for structured logging
//!
//! The library only emits events and spans. Installing a subscriber is left to
//! the binary, which does so through [`TracingConfig::init`] behind the `cli`
//! feature.

#[cfg(feature = "cli")]
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};

/// Configuration for tracing output format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TracingFormat {
    /// Human-readable console output with colors (default for CLI)
    Console,
    /// Plain console output for CI logs and redirected output
    Compact,
}

/// Tracing configuration builder
#[derive(Debug)]
pub struct TracingConfig {
    /// Verbosity level (maps to log levels)
    pub verbosity: u8,
    pub format: TracingFormat,
    /// Environment filter string (overrides verbosity if set)
    pub env_filter: Option<String>,
    /// Session ID for correlating the lines of one run
    pub session_id: Option<String>,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            verbosity: 0,
            format: TracingFormat::Console,
            env_filter: None,
            session_id: None,
        }
    }
}

impl TracingConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set verbosity level (0-2+)
    #[must_use]
    pub fn with_verbosity(mut self, verbosity: u8) -> Self {
        self.verbosity = verbosity;
        self
    }

    #[must_use]
    pub fn with_format(mut self, format: TracingFormat) -> Self {
        self.format = format;
        self
    }

    /// Set custom environment filter
    #[must_use]
    pub fn with_env_filter<S: Into<String>>(mut self, filter: S) -> Self {
        self.env_filter = Some(filter.into());
        self
    }

    #[must_use]
    pub fn with_session_id<S: Into<String>>(mut self, session_id: S) -> Self {
        self.session_id = Some(session_id.into());
        self
    }

    /// Convert verbosity level to tracing filter string
    #[must_use]
    pub fn verbosity_to_filter(&self) -> &'static str {
        match self.verbosity {
            0 => "info",  // operator-facing progress lines
            1 => "debug", // -v: per-stage details
            _ => "trace", // -vv and above
        }
    }

    /// Install the global subscriber
    ///
    /// # Errors
    /// - The filter string cannot be parsed
    /// - A global subscriber is already installed
    #[cfg(feature = "cli")]
    pub fn init(self) -> anyhow::Result<()> {
        use tracing_subscriber::fmt;

        let filter = match &self.env_filter {
            Some(env_filter) => EnvFilter::try_new(env_filter)?,
            None => EnvFilter::try_new(self.verbosity_to_filter())?,
        };

        let registry = Registry::default().with(filter);

        match self.format {
            TracingFormat::Console => {
                let fmt_layer = fmt::layer()
                    .with_ansi(true)
                    .with_target(false)
                    .with_thread_ids(false)
                    .with_thread_names(false)
                    .with_file(false)
                    .with_line_number(false)
                    .with_level(true)
                    .compact();

                registry.with(fmt_layer).try_init()?;
            },
            TracingFormat::Compact => {
                let fmt_layer = fmt::layer()
                    .with_ansi(false)
                    .with_target(false)
                    .with_thread_ids(false)
                    .with_thread_names(false)
                    .with_file(false)
                    .with_line_number(false)
                    .compact();

                registry.with(fmt_layer).try_init()?;
            },
        }

        if let Some(session_id) = &self.session_id {
            tracing::info!(session_id = %session_id, "Catalog session started");
        }

        Ok(())
    }
}

/// Initialize tracing with CLI-friendly defaults and a fresh session id
///
/// # Errors
/// Propagates [`TracingConfig::init`] failures
#[cfg(feature = "cli")]
pub fn init_cli_tracing(verbosity: u8) -> anyhow::Result<()> {
    let session_id = uuid::Uuid::new_v4().to_string();
    let format = if std::env::var_os("NO_COLOR").is_some() {
        TracingFormat::Compact
    } else {
        TracingFormat::Console
    };

    TracingConfig::new()
        .with_verbosity(verbosity)
        .with_format(format)
        .with_session_id(session_id)
        .init()
}

/// Span creation helpers for the pipeline stages
pub mod spans {
    use crate::config::CanvasSize;
    use std::path::Path;
    use tracing::{Level, Span};

    /// Span covering one Pipeline Driver invocation
    pub fn batch_processing(file_count: usize, output_dir: &Path) -> Span {
        tracing::span!(
            Level::INFO,
            "batch_processing",
            file_count = %file_count,
            output_dir = %output_dir.display()
        )
    }

    /// Span covering one image inside a batch
    pub fn file_processing(file_path: &Path, index: usize) -> Span {
        tracing::span!(
            Level::INFO,
            "file_processing",
            file_path = %file_path.display(),
            index = %index
        )
    }

    /// Span covering one Resizer invocation
    pub fn resize_span(input_dir: &Path, size: CanvasSize) -> Span {
        tracing::span!(
            Level::INFO,
            "resize",
            input_dir = %input_dir.display(),
            width = %size.width,
            height = %size.height
        )
    }

    /// Span around a foreground-extraction call
    pub fn extraction(extractor: &str, dimensions: (u32, u32)) -> Span {
        tracing::span!(
            Level::DEBUG,
            "extraction",
            extractor = %extractor,
            width = %dimensions.0,
            height = %dimensions.1
        )
    }
}
