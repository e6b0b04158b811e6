//! Image I/O operations service
//!
//! This module separates file I/O operations from pipeline logic,
//! making the stages testable without touching the filesystem.

use crate::{
    config::has_extension,
    error::{CatalogError, Result},
};
use image::{ColorType, DynamicImage, ImageFormat};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Service for handling image file input/output operations
pub struct ImageIOService;

impl ImageIOService {
    /// Load an image from a file path
    ///
    /// Decoding is attempted by extension first and falls back to content sniffing,
    /// so a PNG saved with a `.jpg` name still loads.
    ///
    /// # Errors
    /// - File does not exist or cannot be read
    /// - Neither extension-based nor content-based decoding succeeds
    pub fn load_image<P: AsRef<Path>>(path: P) -> Result<DynamicImage> {
        let path_ref = path.as_ref();

        if !path_ref.exists() {
            return Err(CatalogError::file_io_error(
                "read image file",
                path_ref,
                &std::io::Error::new(std::io::ErrorKind::NotFound, "file does not exist"),
            ));
        }

        match image::open(path_ref) {
            Ok(img) => Ok(img),
            Err(e) => {
                log::debug!(
                    "Extension-based loading failed for {}: {}. Attempting content-based detection.",
                    path_ref.display(),
                    e
                );

                let data = std::fs::read(path_ref).map_err(|io_err| {
                    CatalogError::file_io_error("read image data", path_ref, &io_err)
                })?;

                image::load_from_memory(&data)
                    .map_err(|content_err| CatalogError::image_load_error(path_ref, &content_err))
            },
        }
    }

    /// Save an image, choosing the encoder from the file extension
    ///
    /// Encoders without alpha support (JPEG) receive an RGB copy.
    ///
    /// # Errors
    /// - Unknown or unsupported extension
    /// - Parent directory cannot be created
    /// - Encoding or write failure
    pub fn save_image<P: AsRef<Path>>(image: &DynamicImage, path: P) -> Result<()> {
        let path_ref = path.as_ref();

        let format = ImageFormat::from_path(path_ref).map_err(|e| {
            CatalogError::processing(format!(
                "Cannot determine output format for {}: {}",
                path_ref.display(),
                e
            ))
        })?;

        if let Some(parent) = path_ref.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| {
                CatalogError::file_io_error("create output directory", parent, &e)
            })?;
        }

        let result = match (format, image.color()) {
            (ImageFormat::Jpeg, ColorType::Rgb8 | ColorType::L8)
            | (ImageFormat::Gif, ColorType::Rgb8 | ColorType::Rgba8) => {
                image.save_with_format(path_ref, format)
            },
            (ImageFormat::Jpeg, _) => {
                DynamicImage::ImageRgb8(image.to_rgb8()).save_with_format(path_ref, format)
            },
            (ImageFormat::Gif, _) => {
                DynamicImage::ImageRgba8(image.to_rgba8()).save_with_format(path_ref, format)
            },
            _ => image.save_with_format(path_ref, format),
        };

        result.map_err(|e| {
            CatalogError::processing(format!(
                "Failed to save {} as {:?}: {}",
                path_ref.display(),
                format,
                e
            ))
        })
    }

    /// Create a directory (and parents) if it does not exist yet
    ///
    /// # Errors
    /// - The path exists and is a file
    /// - Directory creation fails
    pub fn ensure_directory<P: AsRef<Path>>(dir: P) -> Result<()> {
        let dir = dir.as_ref();
        if dir.is_file() {
            return Err(CatalogError::invalid_config(format!(
                "Output path exists and is a file, not a directory: {}",
                dir.display()
            )));
        }
        std::fs::create_dir_all(dir)
            .map_err(|e| CatalogError::file_io_error("create output directory", dir, &e))
    }

    /// List the files directly inside `dir` whose extension is in `extensions`
    ///
    /// Subdirectories are not entered. Symlinks to files are listed under the
    /// link's own path; dangling links are skipped. Results are sorted by path
    /// so batch numbering is reproducible.
    ///
    /// # Errors
    /// - The directory cannot be read
    pub fn list_images<P: AsRef<Path>>(dir: P, extensions: &[&str]) -> Result<Vec<PathBuf>> {
        let dir = dir.as_ref();
        let mut files = Vec::new();

        for entry in WalkDir::new(dir).min_depth(1).max_depth(1) {
            let entry = entry.map_err(|e| {
                let io_err = e
                    .into_io_error()
                    .unwrap_or_else(|| std::io::Error::other("directory walk failed"));
                CatalogError::file_io_error("list directory", dir, &io_err)
            })?;

            let path = entry.path();
            if !path.is_file() {
                continue;
            }

            if has_extension(path, extensions) {
                files.push(path.to_path_buf());
            } else {
                log::debug!("Skipping non-image file: {}", path.display());
            }
        }

        files.sort();
        Ok(files)
    }
}
