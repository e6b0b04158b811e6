//! Conversion of CLI arguments into pipeline configuration

use crate::cli::main_impl::{MatteArgs, MatteMethod, StyleArgs};
use crate::{
    config::{has_extension, FontSource, PipelineConfig, RgbColor, LOGO_EXTENSIONS},
    matte::{AlphaChannelExtractor, BorderKeyExtractor, DeadlineExtractor, ForegroundExtractor},
};
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Message shown when a required path was not supplied
pub(crate) const MISSING_PATHS: &str = "Please select all necessary paths";

/// Convert CLI arguments to a validated `PipelineConfig`
pub(crate) struct CliConfigBuilder;

impl CliConfigBuilder {
    /// Build a `PipelineConfig` from the shared style arguments
    pub(crate) fn from_args(style: &StyleArgs) -> Result<PipelineConfig> {
        let text_color = RgbColor::parse_hex(&style.text_color).context("Invalid --text-color")?;
        let background = RgbColor::parse_hex(&style.background).context("Invalid --background")?;

        PipelineConfig::builder()
            .canvas_size(style.width, style.height)
            .background(background)
            .font(FontSource::parse(&style.font))
            .font_size(style.font_size)
            .text_color(text_color)
            .text_position(style.text_x, style.text_y)
            .base_text(style.base_text.clone())
            .counter_start(style.start)
            .label_suffix(style.suffix.clone())
            .logo_box(style.logo_box, style.logo_box)
            .logo_offset(style.logo_x, style.logo_y)
            .build()
            .context("Invalid configuration")
    }

    /// Require every path to be present and non-empty, and the logo to be PNG/JPEG
    pub(crate) fn validate_paths(
        input: Option<&Path>,
        output: Option<&Path>,
        logo: Option<&Path>,
    ) -> Result<(PathBuf, PathBuf, PathBuf)> {
        let present = |path: Option<&Path>| {
            path.filter(|p| !p.as_os_str().is_empty())
                .map(Path::to_path_buf)
        };

        let (Some(input), Some(output), Some(logo)) = (present(input), present(output), present(logo))
        else {
            anyhow::bail!(MISSING_PATHS);
        };

        Self::validate_logo(&logo)?;
        Ok((input, output, logo))
    }

    /// Logo files must be PNG or JPEG
    pub(crate) fn validate_logo(logo: &Path) -> Result<()> {
        if !has_extension(logo, LOGO_EXTENSIONS) {
            anyhow::bail!(
                "Logo must be a .png, .jpg or .jpeg file: {}",
                logo.display()
            );
        }
        Ok(())
    }

    /// Build the foreground extractor selected by `--matte`
    pub(crate) fn build_extractor(args: &MatteArgs) -> Result<Box<dyn ForegroundExtractor>> {
        let timeout = match args.matte_timeout {
            Some(seconds) if seconds.is_finite() && seconds > 0.0 => {
                Some(Duration::from_secs_f64(seconds))
            },
            Some(seconds) => anyhow::bail!("--matte-timeout must be positive, got {seconds}"),
            None => None,
        };

        match args.matte {
            MatteMethod::BorderKey => Ok(with_deadline(
                BorderKeyExtractor::new(args.key_tolerance, args.key_softness),
                timeout,
            )),
            MatteMethod::Alpha => Ok(with_deadline(AlphaChannelExtractor, timeout)),
            MatteMethod::Model => Self::model_extractor(args, timeout),
        }
    }

    #[cfg(feature = "tract")]
    fn model_extractor(
        args: &MatteArgs,
        timeout: Option<Duration>,
    ) -> Result<Box<dyn ForegroundExtractor>> {
        let model = args
            .model
            .as_ref()
            .context("--model is required with --matte model")?;
        let extractor = crate::matte::TractExtractor::from_path(model, args.model_input_size)
            .with_context(|| format!("Failed to load model {}", model.display()))?;
        Ok(with_deadline(extractor, timeout))
    }

    #[cfg(not(feature = "tract"))]
    fn model_extractor(
        _args: &MatteArgs,
        _timeout: Option<Duration>,
    ) -> Result<Box<dyn ForegroundExtractor>> {
        anyhow::bail!("--matte model requires building with the `tract` feature")
    }
}

fn with_deadline<E>(extractor: E, timeout: Option<Duration>) -> Box<dyn ForegroundExtractor>
where
    E: ForegroundExtractor + Send + 'static,
{
    match timeout {
        Some(timeout) => Box::new(DeadlineExtractor::new(extractor, timeout)),
        None => Box::new(extractor),
    }
}
