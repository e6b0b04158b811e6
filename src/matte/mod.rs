//! Matte Compositor: foreground extraction and background replacement
//!
//! The extraction itself sits behind [`ForegroundExtractor`]. Bundled
//! implementations:
//! - [`BorderKeyExtractor`] keys out the backdrop color sampled from the image border
//! - [`AlphaChannelExtractor`] trusts the alpha channel already present in the source
//! - [`FnExtractor`] adapts a closure, mostly for tests and embedding
//! - `TractExtractor` runs an ONNX segmentation model (feature `tract`)
//!
//! [`DeadlineExtractor`] wraps any of them with a timeout.

mod border_key;
mod deadline;
#[cfg(feature = "tract")]
mod tract;

pub use border_key::BorderKeyExtractor;
pub use deadline::DeadlineExtractor;
#[cfg(feature = "tract")]
pub use tract::TractExtractor;

use crate::{
    compositing,
    config::RgbColor,
    error::{CatalogError, Result},
    services::ImageIOService,
    tracing_config::spans,
};
use image::{DynamicImage, RgbImage, RgbaImage};
use instant::Instant;
use std::path::Path;

/// Separates a subject from its background
///
/// Implementations receive a decoded image and must return an RGBA image of
/// the same dimensions whose alpha marks the subject (opaque) versus the
/// background (transparent or partial). Extraction may be slow and may fail.
pub trait ForegroundExtractor {
    /// Short name used in logs
    fn name(&self) -> &str;

    /// Produce the foreground-with-alpha for `image`
    ///
    /// # Errors
    /// Any failure of the underlying matting routine
    fn extract(&mut self, image: &DynamicImage) -> Result<RgbaImage>;
}

impl<E: ForegroundExtractor + ?Sized> ForegroundExtractor for Box<E> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn extract(&mut self, image: &DynamicImage) -> Result<RgbaImage> {
        (**self).extract(image)
    }
}

/// Uses the source's own alpha channel as the matte
///
/// Sources without alpha come back fully opaque, so the background color
/// never shows through.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlphaChannelExtractor;

impl ForegroundExtractor for AlphaChannelExtractor {
    fn name(&self) -> &str {
        "alpha"
    }

    fn extract(&mut self, image: &DynamicImage) -> Result<RgbaImage> {
        Ok(image.to_rgba8())
    }
}

/// Adapts a closure into a [`ForegroundExtractor`]
pub struct FnExtractor<F> {
    name: String,
    func: F,
}

impl<F> FnExtractor<F>
where
    F: FnMut(&DynamicImage) -> Result<RgbaImage>,
{
    pub fn new<S: Into<String>>(name: S, func: F) -> Self {
        Self {
            name: name.into(),
            func,
        }
    }
}

impl<F> ForegroundExtractor for FnExtractor<F>
where
    F: FnMut(&DynamicImage) -> Result<RgbaImage>,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn extract(&mut self, image: &DynamicImage) -> Result<RgbaImage> {
        (self.func)(image)
    }
}

/// Replaces an image's background with a solid color
pub struct MatteCompositor {
    extractor: Box<dyn ForegroundExtractor>,
    background: RgbColor,
}

impl MatteCompositor {
    #[must_use]
    pub fn new(extractor: Box<dyn ForegroundExtractor>, background: RgbColor) -> Self {
        Self {
            extractor,
            background,
        }
    }

    #[must_use]
    pub fn extractor_name(&self) -> &str {
        self.extractor.name()
    }

    #[must_use]
    pub fn background(&self) -> RgbColor {
        self.background
    }

    /// Decode `path` and composite its foreground over the background color
    ///
    /// # Errors
    /// - The file cannot be read or decoded
    /// - See [`composite`](Self::composite)
    pub fn remove_background<P: AsRef<Path>>(&mut self, path: P) -> Result<RgbImage> {
        let image = ImageIOService::load_image(path)?;
        self.composite(&image)
    }

    /// Composite the foreground of `image` over the background color
    ///
    /// The result always has the dimensions of `image` and no alpha channel.
    ///
    /// # Errors
    /// - The extractor fails
    /// - The extractor returns an image of different dimensions
    pub fn composite(&mut self, image: &DynamicImage) -> Result<RgbImage> {
        let dimensions = (image.width(), image.height());
        let _span = spans::extraction(self.extractor.name(), dimensions).entered();

        let start = Instant::now();
        let foreground = self.extractor.extract(image)?;
        log::debug!(
            "{} extraction finished in {}ms",
            self.extractor.name(),
            start.elapsed().as_millis()
        );

        if foreground.dimensions() != dimensions {
            return Err(CatalogError::DimensionMismatch {
                expected_width: dimensions.0,
                expected_height: dimensions.1,
                actual_width: foreground.width(),
                actual_height: foreground.height(),
            });
        }

        Ok(compositing::flatten_onto(&foreground, self.background))
    }
}
