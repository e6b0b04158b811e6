//! Annotator: burns the product code into the image

mod bitmap;
mod font;

pub use font::{load_font, LoadedFont};

use crate::{config::TextStyle, types::TextRendering};
use image::RgbImage;
use imageproc::drawing::draw_text_mut;

/// Draws label text at a fixed position with a fixed style
///
/// The scalable font is resolved once at construction. When it cannot be
/// loaded the annotator switches to the built-in bitmap glyphs and keeps
/// going; that switch is logged once per annotator.
#[derive(Debug)]
pub struct Annotator {
    style: TextStyle,
    font: Option<LoadedFont>,
}

impl Annotator {
    #[must_use]
    pub fn new(style: TextStyle) -> Self {
        let font = match load_font(&style.font) {
            Ok(font) => Some(font),
            Err(e) => {
                log::warn!("TTF font not found. Using default font. ({e})");
                None
            },
        };
        Self { style, font }
    }

    /// Annotator that always uses the built-in bitmap glyphs
    #[must_use]
    pub fn with_bitmap_font(style: TextStyle) -> Self {
        Self { style, font: None }
    }

    #[must_use]
    pub fn style(&self) -> &TextStyle {
        &self.style
    }

    /// Whether a scalable font was resolved
    #[must_use]
    pub fn has_scalable_font(&self) -> bool {
        self.font.is_some()
    }

    /// Draw `text` at the configured position
    ///
    /// Text is drawn literally with no wrapping or fitting; anything that
    /// falls outside the canvas is clipped.
    pub fn annotate(&self, image: &mut RgbImage, text: &str) -> TextRendering {
        if text.is_empty() {
            return TextRendering::Nothing;
        }

        let color = self.style.color.to_rgb();
        let (x, y) = self.style.position;

        match &self.font {
            Some(loaded) => {
                let scale = loaded.px_scale(self.style.size);
                draw_text_mut(image, color, x, y, scale, &loaded.font, text);
                TextRendering::Scalable {
                    font: loaded.name.clone(),
                }
            },
            None => {
                let (text_width, text_height) = bitmap::text_extent(text);
                let right = i64::from(x) + i64::from(text_width);
                let bottom = i64::from(y) + i64::from(text_height);
                if x < 0 || y < 0 || right > i64::from(image.width()) || bottom > i64::from(image.height()) {
                    log::debug!(
                        "Label {:?} at ({}, {}) is clipped by the {}x{} canvas",
                        text,
                        x,
                        y,
                        image.width(),
                        image.height()
                    );
                }
                bitmap::draw_text(image, (i64::from(x), i64::from(y)), color, text);
                TextRendering::BitmapFallback
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{FontSource, RgbColor};
    use image::Rgb;

    fn style_at(x: i32, y: i32) -> TextStyle {
        TextStyle {
            font: FontSource::Family("No Such Family 7f3a9c".to_string()),
            size: 50.0,
            color: RgbColor::BLACK,
            position: (x, y),
        }
    }

    #[test]
    fn test_missing_font_falls_back_to_bitmap() {
        let annotator = Annotator::new(style_at(10, 10));
        assert!(!annotator.has_scalable_font());

        let mut image = RgbImage::from_pixel(200, 60, Rgb([255, 255, 255]));
        let rendering = annotator.annotate(&mut image, "A4P-25");

        assert_eq!(rendering, TextRendering::BitmapFallback);
        assert!(image.pixels().any(|p| p.0 == [0, 0, 0]));
        assert_eq!(image.get_pixel(0, 0), &Rgb([255, 255, 255]));
    }

    #[test]
    fn test_empty_text_draws_nothing() {
        let annotator = Annotator::with_bitmap_font(style_at(0, 0));
        let mut image = RgbImage::from_pixel(20, 20, Rgb([255, 255, 255]));

        assert_eq!(annotator.annotate(&mut image, ""), TextRendering::Nothing);
        assert!(image.pixels().all(|p| p.0 == [255, 255, 255]));
    }

    #[test]
    fn test_off_canvas_position_is_absorbed() {
        let annotator = Annotator::with_bitmap_font(style_at(250, 800));
        let mut image = RgbImage::from_pixel(64, 48, Rgb([255, 255, 255]));

        let rendering = annotator.annotate(&mut image, "A4P-25 SIZE-10X14 CODE-BGN");
        assert_eq!(rendering, TextRendering::BitmapFallback);
        assert!(image.pixels().all(|p| p.0 == [255, 255, 255]));
    }

    #[test]
    fn test_text_uses_configured_color() {
        let mut style = style_at(0, 0);
        style.color = RgbColor([200, 0, 0]);
        let annotator = Annotator::with_bitmap_font(style);
        let mut image = RgbImage::from_pixel(40, 20, Rgb([255, 255, 255]));

        annotator.annotate(&mut image, "H");
        assert_eq!(image.get_pixel(0, 0), &Rgb([200, 0, 0]));
    }
}
