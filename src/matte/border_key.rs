//! Backdrop keying for studio-style product shots

use super::ForegroundExtractor;
use crate::error::{CatalogError, Result};
use image::{DynamicImage, Rgba, RgbaImage};
use std::collections::VecDeque;

/// Keys out the backdrop color found along the image border
///
/// The key color is the per-channel median of all border pixels. Pixels are
/// removed by flood fill from the border, so backdrop-colored areas enclosed
/// by the subject stay opaque. Within `tolerance` (RGB euclidean distance) of
/// the key a pixel becomes fully transparent; the following `softness` band
/// ramps back to opaque for anti-aliased edges.
#[derive(Debug, Clone, Copy)]
pub struct BorderKeyExtractor {
    tolerance: f32,
    softness: f32,
}

impl Default for BorderKeyExtractor {
    fn default() -> Self {
        Self {
            tolerance: 40.0,
            softness: 20.0,
        }
    }
}

impl BorderKeyExtractor {
    #[must_use]
    pub fn new(tolerance: f32, softness: f32) -> Self {
        Self {
            tolerance: tolerance.max(0.0),
            softness: softness.max(0.0),
        }
    }

    /// Per-channel median of the border pixels
    fn key_color(image: &RgbaImage) -> [u8; 3] {
        let (width, height) = image.dimensions();
        let mut channels: [Vec<u8>; 3] = [Vec::new(), Vec::new(), Vec::new()];

        for (x, y, pixel) in image.enumerate_pixels() {
            if x == 0 || y == 0 || x + 1 == width || y + 1 == height {
                for (channel, value) in channels.iter_mut().zip(pixel.0) {
                    channel.push(value);
                }
            }
        }

        let mut key = [0u8; 3];
        for (slot, channel) in key.iter_mut().zip(channels.iter_mut()) {
            channel.sort_unstable();
            *slot = channel.get(channel.len() / 2).copied().unwrap_or(0);
        }
        key
    }

    fn distance(pixel: &Rgba<u8>, key: [u8; 3]) -> f32 {
        pixel
            .0
            .iter()
            .zip(key)
            .map(|(&value, key_value)| {
                let diff = f32::from(value) - f32::from(key_value);
                diff * diff
            })
            .sum::<f32>()
            .sqrt()
    }

    fn alpha_for(&self, distance: f32) -> u8 {
        if distance <= self.tolerance {
            0
        } else if self.softness <= 0.0 {
            255
        } else {
            let ramp = ((distance - self.tolerance) / self.softness).clamp(0.0, 1.0);
            (ramp * 255.0).round() as u8
        }
    }
}

impl ForegroundExtractor for BorderKeyExtractor {
    fn name(&self) -> &str {
        "border-key"
    }

    #[allow(clippy::indexing_slicing)]
    // Safe: indices are produced from in-bounds coordinates of `rgba`
    fn extract(&mut self, image: &DynamicImage) -> Result<RgbaImage> {
        let mut rgba = image.to_rgba8();
        let (width, height) = rgba.dimensions();
        if width == 0 || height == 0 {
            return Err(CatalogError::extraction("Cannot key an empty image"));
        }

        let key = Self::key_color(&rgba);
        let reach = self.tolerance + self.softness;
        let index = |x: u32, y: u32| (y as usize) * (width as usize) + x as usize;

        let mut visited = vec![false; width as usize * height as usize];
        let mut queue = VecDeque::new();

        let seed = |x: u32, y: u32, queue: &mut VecDeque<(u32, u32)>, visited: &mut Vec<bool>| {
            let i = index(x, y);
            if !visited[i] && Self::distance(rgba.get_pixel(x, y), key) <= reach {
                visited[i] = true;
                queue.push_back((x, y));
            }
        };

        for x in 0..width {
            seed(x, 0, &mut queue, &mut visited);
            seed(x, height - 1, &mut queue, &mut visited);
        }
        for y in 0..height {
            seed(0, y, &mut queue, &mut visited);
            seed(width - 1, y, &mut queue, &mut visited);
        }

        while let Some((x, y)) = queue.pop_front() {
            let neighbours = [
                (x.wrapping_sub(1), y),
                (x + 1, y),
                (x, y.wrapping_sub(1)),
                (x, y + 1),
            ];
            for (nx, ny) in neighbours {
                if nx < width && ny < height {
                    seed(nx, ny, &mut queue, &mut visited);
                }
            }
        }

        let mut keyed = 0usize;
        for (x, y, pixel) in rgba.enumerate_pixels_mut() {
            if !visited[index(x, y)] {
                continue;
            }
            let alpha = self.alpha_for(Self::distance(pixel, key));
            pixel.0[3] = pixel.0[3].min(alpha);
            keyed += 1;
        }

        log::trace!(
            "Keyed {} of {} pixels against #{:02x}{:02x}{:02x}",
            keyed,
            visited.len(),
            key[0],
            key[1],
            key[2]
        );

        Ok(rgba)
    }
}
