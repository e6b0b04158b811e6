//! Pixel-level compositing helpers shared by the matte and logo stages

use crate::config::RgbColor;
use image::{imageops, DynamicImage, Rgba, RgbImage, RgbaImage};

/// Alpha-composite `src` onto the opaque `dst` with its top-left corner at `offset`
///
/// Pixels that fall outside `dst` are dropped; a negative offset clips the
/// leading rows/columns of `src`.
pub fn blend_over(dst: &mut RgbImage, src: &RgbaImage, offset: (i64, i64)) {
    let mut canvas = DynamicImage::ImageRgb8(std::mem::take(dst)).into_rgba8();
    imageops::overlay(&mut canvas, src, offset.0, offset.1);
    *dst = DynamicImage::ImageRgba8(canvas).into_rgb8();
}

/// Flatten a foreground-with-alpha onto a solid background of the same size
#[must_use]
pub fn flatten_onto(foreground: &RgbaImage, background: RgbColor) -> RgbImage {
    let [r, g, b] = background.0;
    let mut canvas = RgbaImage::from_pixel(foreground.width(), foreground.height(), Rgba([r, g, b, 255]));
    imageops::overlay(&mut canvas, foreground, 0, 0);
    DynamicImage::ImageRgba8(canvas).into_rgb8()
}

/// Size an image must take to fit inside `bounds` without distortion
///
/// Never enlarges. Rounding picks whichever of floor/ceil keeps the aspect
/// ratio closest to the source, preferring floor on ties, and never returns
/// a zero side.
#[must_use]
pub fn thumbnail_size(source: (u32, u32), bounds: (u32, u32)) -> (u32, u32) {
    let (width, height) = source;
    let (max_width, max_height) = bounds;

    if width == 0 || height == 0 || max_width == 0 || max_height == 0 {
        return source;
    }
    if max_width >= width && max_height >= height {
        return source;
    }

    let aspect = f64::from(width) / f64::from(height);
    let box_x = f64::from(max_width);
    let box_y = f64::from(max_height);

    if box_x / box_y >= aspect {
        let new_width = round_aspect(box_y * aspect, |n| (aspect - n / box_y).abs());
        (new_width, max_height)
    } else {
        let new_height = round_aspect(box_x / aspect, |n| {
            if n == 0.0 {
                0.0
            } else {
                (aspect - box_x / n).abs()
            }
        });
        (max_width, new_height)
    }
}

fn round_aspect<F>(value: f64, key: F) -> u32
where
    F: Fn(f64) -> f64,
{
    let floor = value.floor();
    let ceil = value.ceil();
    let chosen = if key(ceil) < key(floor) { ceil } else { floor };
    (chosen as u32).max(1)
}
