//! Resizer stage: scale a directory of source photos to the catalog canvas

use crate::{
    config::{CanvasSize, SUPPORTED_INPUT_EXTENSIONS},
    error::{CatalogError, Result},
    services::ImageIOService,
    tracing_config::spans,
    types::{ResizeFailure, ResizeSummary},
};
use image::imageops::FilterType;
use std::path::Path;
use tracing::{debug, info, warn};

/// Resize every supported image directly inside `input_dir` to `size`
///
/// Results are written to `output_dir` under their original filenames. The
/// aspect ratio is not preserved. A file that cannot be decoded or written is
/// logged once, recorded in the summary and skipped.
///
/// # Errors
/// - `input_dir` cannot be listed
/// - `output_dir` cannot be created
pub fn resize_directory<P, Q>(input_dir: P, output_dir: Q, size: CanvasSize) -> Result<ResizeSummary>
where
    P: AsRef<Path>,
    Q: AsRef<Path>,
{
    let input_dir = input_dir.as_ref();
    let output_dir = output_dir.as_ref();
    let _span = spans::resize_span(input_dir, size).entered();

    if size.width == 0 || size.height == 0 {
        return Err(CatalogError::invalid_config(format!(
            "Resize target must be non-zero, got {size}"
        )));
    }

    ImageIOService::ensure_directory(output_dir)?;
    let files = ImageIOService::list_images(input_dir, SUPPORTED_INPUT_EXTENSIONS)?;
    debug!(count = files.len(), "Found images to resize");

    let mut summary = ResizeSummary {
        output_dir: output_dir.to_path_buf(),
        ..ResizeSummary::default()
    };

    for path in files {
        let Some(file_name) = path.file_name() else {
            continue;
        };
        let target = output_dir.join(file_name);

        match resize_file(&path, &target, size) {
            Ok(()) => {
                debug!("Resized {} -> {}", path.display(), target.display());
                summary.resized.push(target);
            },
            Err(e) => {
                warn!("Failed to resize {}: {}", path.display(), e);
                summary.failed.push(ResizeFailure {
                    path,
                    reason: e.to_string(),
                });
            },
        }
    }

    info!(
        "All images resized to {} and saved to {} ({} resized, {} failed)",
        size,
        output_dir.display(),
        summary.resized.len(),
        summary.failed.len()
    );

    Ok(summary)
}

fn resize_file(source: &Path, target: &Path, size: CanvasSize) -> Result<()> {
    let image = ImageIOService::load_image(source)?;
    let resized = image.resize_exact(size.width, size.height, FilterType::Lanczos3);
    ImageIOService::save_image(&resized, target)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_resize_skips_non_images_and_subdirectories() {
        let input = tempdir().unwrap();
        let output = tempdir().unwrap();

        RgbImage::from_pixel(64, 32, Rgb([200, 10, 10]))
            .save(input.path().join("red.png"))
            .unwrap();
        RgbImage::from_pixel(20, 40, Rgb([10, 200, 10]))
            .save(input.path().join("green.BMP"))
            .unwrap();
        fs::write(input.path().join("readme.txt"), b"hello").unwrap();
        fs::create_dir(input.path().join("nested")).unwrap();
        RgbImage::new(5, 5)
            .save(input.path().join("nested").join("inner.png"))
            .unwrap();

        let summary = resize_directory(input.path(), output.path(), CanvasSize::new(32, 24)).unwrap();

        assert_eq!(summary.resized_count(), 2);
        assert!(summary.failed.is_empty());
        for name in ["red.png", "green.BMP"] {
            let resized = image::open(output.path().join(name)).unwrap();
            assert_eq!((resized.width(), resized.height()), (32, 24));
        }
        assert!(!output.path().join("readme.txt").exists());
        assert!(!output.path().join("inner.png").exists());
    }

    #[test]
    fn test_resize_records_corrupted_file_and_continues() {
        let input = tempdir().unwrap();
        let output = tempdir().unwrap();

        RgbImage::new(10, 10).save(input.path().join("good.png")).unwrap();
        fs::write(input.path().join("bad.jpg"), b"not a jpeg").unwrap();

        let summary = resize_directory(input.path(), output.path(), CanvasSize::new(8, 8)).unwrap();

        assert_eq!(summary.resized_count(), 1);
        assert_eq!(summary.failed.len(), 1);
        assert!(summary.failed[0].path.ends_with("bad.jpg"));
        assert!(!output.path().join("bad.jpg").exists());
    }

    #[test]
    fn test_resize_creates_output_directory() {
        let input = tempdir().unwrap();
        let output = tempdir().unwrap();
        let nested = output.path().join("a").join("b");
        RgbImage::new(10, 10).save(input.path().join("one.png")).unwrap();

        resize_directory(input.path(), &nested, CanvasSize::new(4, 4)).unwrap();
        assert!(nested.join("one.png").exists());
    }

    #[test]
    fn test_resize_missing_input_is_error() {
        let output = tempdir().unwrap();
        let result = resize_directory(output.path().join("absent"), output.path(), CanvasSize::default());
        assert!(result.is_err());
    }
}
