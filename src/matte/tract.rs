//! Model-backed foreground extraction using Tract
//!
//! Runs a single-channel salient-object segmentation model (ISNet/U2-Net
//! style, NCHW float input, `1x1xHxW` output in `0..=1`) with pure Rust
//! inference.

use super::ForegroundExtractor;
use crate::error::{CatalogError, Result};
use image::{imageops::FilterType, DynamicImage, ImageBuffer, Rgb, RgbImage, RgbaImage};
use instant::Instant;
use ndarray::Array4;
use std::path::Path;
use tract_onnx::prelude::*;

/// Type alias for the runnable Tract model
type TractModel = RunnableModel<TypedFact, Box<dyn TypedOp>, Graph<TypedFact, Box<dyn TypedOp>>>;

const IMAGENET_MEAN: [f32; 3] = [0.485, 0.456, 0.406];
const IMAGENET_STD: [f32; 3] = [0.229, 0.224, 0.225];

/// Maps source pixel coordinates onto the letterboxed model input
#[derive(Debug, Clone, Copy)]
struct Letterbox {
    scale: f32,
    offset_x: u32,
    offset_y: u32,
}

impl Letterbox {
    fn new(original: (u32, u32), target_size: u32) -> Self {
        let target = target_size as f32;
        let scale = (target / original.0 as f32).min(target / original.1 as f32);
        let scaled_width = ((original.0 as f32 * scale).round() as u32).min(target_size);
        let scaled_height = ((original.1 as f32 * scale).round() as u32).min(target_size);

        Self {
            scale,
            offset_x: (target_size - scaled_width) / 2,
            offset_y: (target_size - scaled_height) / 2,
        }
    }

    fn scaled_size(&self, original: (u32, u32)) -> (u32, u32) {
        (
            ((original.0 as f32 * self.scale).round() as u32).max(1),
            ((original.1 as f32 * self.scale).round() as u32).max(1),
        )
    }
}

/// Foreground extractor backed by an ONNX segmentation model
pub struct TractExtractor {
    model: TractModel,
    input_size: u32,
}

impl TractExtractor {
    /// Load and optimize the model at `path`
    ///
    /// # Errors
    /// - The file cannot be read
    /// - The model cannot be parsed, optimized or made runnable
    pub fn from_path<P: AsRef<Path>>(path: P, input_size: u32) -> Result<Self> {
        let path = path.as_ref();
        let load_start = Instant::now();

        if input_size == 0 {
            return Err(CatalogError::invalid_config("Model input size must be non-zero"));
        }

        let model_data = std::fs::read(path)
            .map_err(|e| CatalogError::file_io_error("read model file", path, &e))?;

        let model = onnx()
            .model_for_read(&mut std::io::Cursor::new(model_data))
            .map_err(|e| CatalogError::extraction(format!("Failed to load ONNX model: {e}")))?
            .into_optimized()
            .map_err(|e| CatalogError::extraction(format!("Failed to optimize model: {e}")))?
            .into_runnable()
            .map_err(|e| {
                CatalogError::extraction(format!("Failed to create runnable model: {e}"))
            })?;

        log::info!(
            "Loaded segmentation model {} in {}ms",
            path.display(),
            load_start.elapsed().as_millis()
        );

        Ok(Self { model, input_size })
    }

    /// Letterbox the image onto a square canvas and normalize it to NCHW
    #[allow(clippy::indexing_slicing)]
    // Safe: tensor dimensions are allocated from the canvas size
    fn preprocess(&self, image: &DynamicImage, letterbox: &Letterbox) -> Array4<f32> {
        let rgb = image.to_rgb8();
        let (scaled_width, scaled_height) = letterbox.scaled_size(rgb.dimensions());
        let resized = image::imageops::resize(&rgb, scaled_width, scaled_height, FilterType::Triangle);

        let size = self.input_size;
        let mut canvas: RgbImage = ImageBuffer::from_pixel(size, size, Rgb([255, 255, 255]));
        for (x, y, pixel) in resized.enumerate_pixels() {
            let canvas_x = x + letterbox.offset_x;
            let canvas_y = y + letterbox.offset_y;
            if canvas_x < size && canvas_y < size {
                canvas.put_pixel(canvas_x, canvas_y, *pixel);
            }
        }

        let side = size as usize;
        let mut tensor = Array4::<f32>::zeros((1, 3, side, side));
        for (x, y, pixel) in canvas.enumerate_pixels() {
            for channel in 0..3 {
                tensor[[0, channel, y as usize, x as usize]] =
                    (f32::from(pixel[channel]) / 255.0 - IMAGENET_MEAN[channel]) / IMAGENET_STD[channel];
            }
        }
        tensor
    }

    fn infer(&self, input: Array4<f32>) -> Result<Array4<f32>> {
        let outputs = self
            .model
            .run(tvec![Tensor::from(input).into()])
            .map_err(|e| CatalogError::extraction(format!("Tract inference failed: {e}")))?;

        let output_tensor = outputs
            .into_iter()
            .next()
            .ok_or_else(|| CatalogError::extraction("No output tensor found"))?
            .into_arc_tensor();

        let view = output_tensor.to_array_view::<f32>().map_err(|e| {
            CatalogError::extraction(format!("Failed to convert output tensor: {e}"))
        })?;

        let shape = view.shape().to_vec();
        let [batch, channels, height, width] = shape[..] else {
            return Err(CatalogError::extraction(format!(
                "Expected 4D output tensor, got {}D",
                shape.len()
            )));
        };
        if batch != 1 || channels != 1 {
            return Err(CatalogError::extraction(format!(
                "Expected a 1x1xHxW mask, got {shape:?}"
            )));
        }

        Array4::from_shape_vec(
            (batch, channels, height, width),
            view.to_owned().into_raw_vec_and_offset().0,
        )
        .map_err(|e| CatalogError::extraction(format!("Failed to reshape output tensor: {e}")))
    }
}

impl ForegroundExtractor for TractExtractor {
    fn name(&self) -> &str {
        "model"
    }

    fn extract(&mut self, image: &DynamicImage) -> Result<RgbaImage> {
        let original = (image.width(), image.height());
        if original.0 == 0 || original.1 == 0 {
            return Err(CatalogError::extraction("Cannot segment an empty image"));
        }

        let letterbox = Letterbox::new(original, self.input_size);
        let mask = self.infer(self.preprocess(image, &letterbox))?;
        let mask_height = mask.shape().get(2).copied().unwrap_or(0) as u32;
        let mask_width = mask.shape().get(3).copied().unwrap_or(0) as u32;

        let mut rgba = image.to_rgba8();
        for (x, y, pixel) in rgba.enumerate_pixels_mut() {
            let mask_x = (x as f32 * letterbox.scale).round() as u32 + letterbox.offset_x;
            let mask_y = (y as f32 * letterbox.scale).round() as u32 + letterbox.offset_y;

            let value = if mask_x < mask_width && mask_y < mask_height {
                mask.get([0, 0, mask_y as usize, mask_x as usize])
                    .copied()
                    .unwrap_or(0.0)
            } else {
                0.0
            };

            let alpha = (value.clamp(0.0, 1.0) * 255.0).round() as u8;
            pixel.0[3] = pixel.0[3].min(alpha);
        }

        Ok(rgba)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_letterbox_centers_wide_images() {
        let letterbox = Letterbox::new((2000, 1000), 1024);
        assert!((letterbox.scale - 0.512).abs() < 1e-6);
        assert_eq!(letterbox.offset_x, 0);
        assert_eq!(letterbox.offset_y, 256);
        assert_eq!(letterbox.scaled_size((2000, 1000)), (1024, 512));
    }

    #[test]
    fn test_letterbox_upscales_small_images() {
        let letterbox = Letterbox::new((100, 200), 1024);
        assert_eq!(letterbox.scaled_size((100, 200)), (512, 1024));
        assert_eq!(letterbox.offset_x, 256);
        assert_eq!(letterbox.offset_y, 0);
    }

    #[test]
    fn test_missing_model_file_is_error() {
        let temp_dir = tempfile::tempdir().unwrap();
        assert!(TractExtractor::from_path(temp_dir.path().join("absent.onnx"), 1024).is_err());
    }
}
