//! Logo Stamper: composites a thumbnailed logo onto each image

use crate::{
    compositing::{blend_over, thumbnail_size},
    config::LogoPlacement,
    error::{CatalogError, Result},
    services::ImageIOService,
    types::LogoOutcome,
};
use image::{imageops::FilterType, RgbImage, RgbaImage};
use std::path::{Path, PathBuf};

#[derive(Debug)]
enum LogoAsset {
    Ready(RgbaImage),
    Unavailable(String),
}

/// Holds the logo for one batch run
///
/// The logo is decoded and thumbnailed once in [`load`](Self::load) and the
/// same pixels are reused for every image. A logo that fails to load leaves
/// every target unchanged instead of aborting the run.
#[derive(Debug)]
pub struct LogoStamper {
    path: PathBuf,
    offset: (i32, i32),
    asset: LogoAsset,
}

impl LogoStamper {
    /// Decode the logo at `path` and fit it inside the placement's bounding box
    #[must_use]
    pub fn load<P: AsRef<Path>>(path: P, placement: LogoPlacement) -> Self {
        let path = path.as_ref().to_path_buf();
        let asset = match Self::prepare(&path, placement) {
            Ok(logo) => {
                log::debug!(
                    "Logo {} prepared at {}x{}",
                    path.display(),
                    logo.width(),
                    logo.height()
                );
                LogoAsset::Ready(logo)
            },
            Err(e) => {
                log::warn!("Error adding logo: {}", e);
                LogoAsset::Unavailable(e.to_string())
            },
        };

        Self {
            path,
            offset: placement.offset,
            asset,
        }
    }

    fn prepare(path: &Path, placement: LogoPlacement) -> Result<RgbaImage> {
        let logo = ImageIOService::load_image(path)
            .map_err(|e| CatalogError::logo(format!("{}: {e}", path.display())))?
            .to_rgba8();

        let (width, height) = thumbnail_size(
            logo.dimensions(),
            (placement.max_width, placement.max_height),
        );
        if (width, height) == logo.dimensions() {
            return Ok(logo);
        }
        Ok(image::imageops::resize(&logo, width, height, FilterType::Lanczos3))
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Thumbnail dimensions, if the logo loaded
    #[must_use]
    pub fn logo_size(&self) -> Option<(u32, u32)> {
        match &self.asset {
            LogoAsset::Ready(logo) => Some(logo.dimensions()),
            LogoAsset::Unavailable(_) => None,
        }
    }

    /// Alpha-composite the logo onto `target` at the configured offset
    pub fn stamp(&self, target: &mut RgbImage) -> LogoOutcome {
        match &self.asset {
            LogoAsset::Ready(logo) => {
                let offset = (i64::from(self.offset.0), i64::from(self.offset.1));
                blend_over(target, logo, offset);
                LogoOutcome::Stamped {
                    width: logo.width(),
                    height: logo.height(),
                }
            },
            LogoAsset::Unavailable(reason) => LogoOutcome::Unchanged {
                reason: reason.clone(),
            },
        }
    }
}
