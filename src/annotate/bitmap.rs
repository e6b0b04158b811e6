//! Built-in 5x7 bitmap glyphs used when no scalable font is available

use image::{Rgb, RgbImage};

const GLYPH_WIDTH: i64 = 5;
const GLYPH_HEIGHT: i64 = 7;
/// Columns between the start of two consecutive glyphs
const GLYPH_ADVANCE: i64 = 6;
/// Every glyph pixel is drawn as a `SCALE`x`SCALE` block
pub(crate) const SCALE: i64 = 2;

/// Row patterns for a character, bit 4 is the leftmost column
fn glyph(ch: char) -> [u8; 7] {
    match ch.to_ascii_uppercase() {
        'A' => [0b01110, 0b10001, 0b10001, 0b11111, 0b10001, 0b10001, 0b10001],
        'B' => [0b11110, 0b10001, 0b10001, 0b11110, 0b10001, 0b10001, 0b11110],
        'C' => [0b01110, 0b10001, 0b10000, 0b10000, 0b10000, 0b10001, 0b01110],
        'D' => [0b11110, 0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b11110],
        'E' => [0b11111, 0b10000, 0b10000, 0b11110, 0b10000, 0b10000, 0b11111],
        'F' => [0b11111, 0b10000, 0b10000, 0b11110, 0b10000, 0b10000, 0b10000],
        'G' => [0b01110, 0b10001, 0b10000, 0b10111, 0b10001, 0b10001, 0b01111],
        'H' => [0b10001, 0b10001, 0b10001, 0b11111, 0b10001, 0b10001, 0b10001],
        'I' => [0b01110, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100, 0b01110],
        'J' => [0b00111, 0b00010, 0b00010, 0b00010, 0b00010, 0b10010, 0b01100],
        'K' => [0b10001, 0b10010, 0b10100, 0b11000, 0b10100, 0b10010, 0b10001],
        'L' => [0b10000, 0b10000, 0b10000, 0b10000, 0b10000, 0b10000, 0b11111],
        'M' => [0b10001, 0b11011, 0b10101, 0b10101, 0b10001, 0b10001, 0b10001],
        'N' => [0b10001, 0b10001, 0b11001, 0b10101, 0b10011, 0b10001, 0b10001],
        'O' => [0b01110, 0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b01110],
        'P' => [0b11110, 0b10001, 0b10001, 0b11110, 0b10000, 0b10000, 0b10000],
        'Q' => [0b01110, 0b10001, 0b10001, 0b10001, 0b10101, 0b10010, 0b01101],
        'R' => [0b11110, 0b10001, 0b10001, 0b11110, 0b10100, 0b10010, 0b10001],
        'S' => [0b01111, 0b10000, 0b10000, 0b01110, 0b00001, 0b00001, 0b11110],
        'T' => [0b11111, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100],
        'U' => [0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b01110],
        'V' => [0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b01010, 0b00100],
        'W' => [0b10001, 0b10001, 0b10001, 0b10101, 0b10101, 0b10101, 0b01010],
        'X' => [0b10001, 0b10001, 0b01010, 0b00100, 0b01010, 0b10001, 0b10001],
        'Y' => [0b10001, 0b10001, 0b10001, 0b01010, 0b00100, 0b00100, 0b00100],
        'Z' => [0b11111, 0b00001, 0b00010, 0b00100, 0b01000, 0b10000, 0b11111],
        '0' => [0b01110, 0b10001, 0b10011, 0b10101, 0b11001, 0b10001, 0b01110],
        '1' => [0b00100, 0b01100, 0b00100, 0b00100, 0b00100, 0b00100, 0b01110],
        '2' => [0b01110, 0b10001, 0b00001, 0b00010, 0b00100, 0b01000, 0b11111],
        '3' => [0b11111, 0b00010, 0b00100, 0b00010, 0b00001, 0b10001, 0b01110],
        '4' => [0b00010, 0b00110, 0b01010, 0b10010, 0b11111, 0b00010, 0b00010],
        '5' => [0b11111, 0b10000, 0b11110, 0b00001, 0b00001, 0b10001, 0b01110],
        '6' => [0b00110, 0b01000, 0b10000, 0b11110, 0b10001, 0b10001, 0b01110],
        '7' => [0b11111, 0b00001, 0b00010, 0b00100, 0b01000, 0b01000, 0b01000],
        '8' => [0b01110, 0b10001, 0b10001, 0b01110, 0b10001, 0b10001, 0b01110],
        '9' => [0b01110, 0b10001, 0b10001, 0b01111, 0b00001, 0b00010, 0b01100],
        '-' => [0b00000, 0b00000, 0b00000, 0b11111, 0b00000, 0b00000, 0b00000],
        '_' => [0b00000, 0b00000, 0b00000, 0b00000, 0b00000, 0b00000, 0b11111],
        '.' => [0b00000, 0b00000, 0b00000, 0b00000, 0b00000, 0b01100, 0b01100],
        ':' => [0b00000, 0b01100, 0b01100, 0b00000, 0b01100, 0b01100, 0b00000],
        '/' => [0b00000, 0b00001, 0b00010, 0b00100, 0b01000, 0b10000, 0b00000],
        ' ' => [0; 7],
        _ => [0b11111, 0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b11111],
    }
}

/// Width and height in pixels that `text` occupies
#[must_use]
pub(crate) fn text_extent(text: &str) -> (u32, u32) {
    let count = text.chars().count() as i64;
    if count == 0 {
        return (0, 0);
    }
    let width = ((count - 1) * GLYPH_ADVANCE + GLYPH_WIDTH) * SCALE;
    (width as u32, (GLYPH_HEIGHT * SCALE) as u32)
}

/// Draw `text` with its top-left corner at `origin`
///
/// Pixels outside the image are dropped, so text may start off-canvas or run
/// past the right edge.
pub(crate) fn draw_text(image: &mut RgbImage, origin: (i64, i64), color: Rgb<u8>, text: &str) {
    let (width, height) = (i64::from(image.width()), i64::from(image.height()));

    for (position, ch) in text.chars().enumerate() {
        let glyph_x = origin.0 + position as i64 * GLYPH_ADVANCE * SCALE;
        if glyph_x >= width {
            break;
        }

        for (row, bits) in glyph(ch).iter().enumerate() {
            for column in 0..GLYPH_WIDTH {
                if bits & (1 << (GLYPH_WIDTH - 1 - column)) == 0 {
                    continue;
                }

                let block_x = glyph_x + column * SCALE;
                let block_y = origin.1 + row as i64 * SCALE;
                for dy in 0..SCALE {
                    for dx in 0..SCALE {
                        let (x, y) = (block_x + dx, block_y + dy);
                        if (0..width).contains(&x) && (0..height).contains(&y) {
                            image.put_pixel(x as u32, y as u32, color);
                        }
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ink(image: &RgbImage) -> usize {
        image.pixels().filter(|p| p.0 == [0, 0, 0]).count()
    }

    #[test]
    fn test_glyphs_are_case_insensitive() {
        assert_eq!(glyph('a'), glyph('A'));
        assert_eq!(glyph(' '), [0; 7]);
        assert_ne!(glyph('?'), [0; 7]);
    }

    #[test]
    fn test_draw_text_marks_pixels_in_extent() {
        let mut image = RgbImage::from_pixel(100, 40, Rgb([255, 255, 255]));
        draw_text(&mut image, (5, 5), Rgb([0, 0, 0]), "A4P-25");

        let (text_width, text_height) = text_extent("A4P-25");
        assert!(ink(&image) > 0);
        for (x, y, pixel) in image.enumerate_pixels() {
            if pixel.0 == [0, 0, 0] {
                assert!(x >= 5 && x < 5 + text_width, "x={x}");
                assert!(y >= 5 && y < 5 + text_height, "y={y}");
            }
        }
    }

    #[test]
    fn test_draw_text_clips_instead_of_panicking() {
        let mut image = RgbImage::from_pixel(10, 10, Rgb([255, 255, 255]));
        draw_text(&mut image, (-4, -4), Rgb([0, 0, 0]), "HELLO WORLD");
        draw_text(&mut image, (8, 8), Rgb([0, 0, 0]), "XYZ");
        draw_text(&mut image, (500, 500), Rgb([0, 0, 0]), "OFF");
        assert!(ink(&image) > 0);
    }

    #[test]
    fn test_text_extent() {
        assert_eq!(text_extent(""), (0, 0));
        assert_eq!(text_extent("A"), (10, 14));
        assert_eq!(text_extent("AB"), (22, 14));
    }
}
