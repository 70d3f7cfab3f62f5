//! Drawing detected circles on top of an image.
use crate::models::Circle;
use image::{DynamicImage, Rgb, RgbImage};
use imageproc::drawing::{draw_filled_circle_mut, draw_hollow_circle_mut};

/// How circles are drawn
#[derive(Debug, Clone, PartialEq)]
pub struct AnnotationStyle {
    pub outline: Rgb<u8>,
    pub thickness: u32,
    /// Small filled dot at the centre
    pub center_marker: bool,
    /// `(x,y),r=R` text above the circle
    pub labels: bool,
}

impl Default for AnnotationStyle {
    fn default() -> Self {
        Self {
            outline: Rgb([255, 0, 0]),
            thickness: 2,
            center_marker: false,
            labels: false,
        }
    }
}

impl AnnotationStyle {
    /// Green outline with centre dot and coordinate label
    pub fn detailed() -> Self {
        Self {
            outline: Rgb([0, 255, 0]),
            thickness: 2,
            center_marker: true,
            labels: true,
        }
    }
}

/// Copy of `base` with `circles` drawn on it.
///
/// With no circles the copy is pixel-identical and keeps the original colour
/// type; otherwise the result is RGB.
pub fn annotate(base: &DynamicImage, circles: &[Circle], style: &AnnotationStyle) -> DynamicImage {
    if circles.is_empty() {
        return base.clone();
    }

    let mut canvas = base.to_rgb8();
    for circle in circles {
        draw_circle(&mut canvas, circle, style);
    }
    DynamicImage::ImageRgb8(canvas)
}

fn draw_circle(canvas: &mut RgbImage, circle: &Circle, style: &AnnotationStyle) {
    let center = (circle.x as i32, circle.y as i32);
    let radius = circle.radius as i32;
    let thickness = style.thickness.max(1) as i32;

    // thickness grows the ring both inward and outward
    for offset in 0..thickness {
        let r = radius + offset - thickness / 2;
        if r > 0 {
            draw_hollow_circle_mut(canvas, center, r, style.outline);
        }
    }

    if style.center_marker {
        draw_filled_circle_mut(canvas, center, 2, style.outline);
    }

    if style.labels {
        let x = circle.x as i32 - radius;
        let y = circle.y as i32 - radius - 10 - font::GLYPH_HEIGHT as i32 * LABEL_SCALE;
        font::draw_text(canvas, &circle.label(), x, y, LABEL_SCALE, style.outline);
    }
}

const LABEL_SCALE: i32 = 2;

/// Tiny 3x5 bitmap font covering what circle labels need
mod font {
    use image::{Rgb, RgbImage};

    pub const GLYPH_WIDTH: u32 = 3;
    pub const GLYPH_HEIGHT: u32 = 5;

    fn glyph(c: char) -> Option<[u8; 5]> {
        let rows = match c {
            '0' => [0b111, 0b101, 0b101, 0b101, 0b111],
            '1' => [0b010, 0b110, 0b010, 0b010, 0b111],
            '2' => [0b111, 0b001, 0b111, 0b100, 0b111],
            '3' => [0b111, 0b001, 0b111, 0b001, 0b111],
            '4' => [0b101, 0b101, 0b111, 0b001, 0b001],
            '5' => [0b111, 0b100, 0b111, 0b001, 0b111],
            '6' => [0b111, 0b100, 0b111, 0b101, 0b111],
            '7' => [0b111, 0b001, 0b001, 0b001, 0b001],
            '8' => [0b111, 0b101, 0b111, 0b101, 0b111],
            '9' => [0b111, 0b101, 0b111, 0b001, 0b111],
            '(' => [0b001, 0b010, 0b010, 0b010, 0b001],
            ')' => [0b100, 0b010, 0b010, 0b010, 0b100],
            ',' => [0b000, 0b000, 0b000, 0b010, 0b100],
            '=' => [0b000, 0b111, 0b000, 0b111, 0b000],
            'r' => [0b000, 0b101, 0b110, 0b100, 0b100],
            _ => return None,
        };
        Some(rows)
    }

    /// Draw `text` with its top-left corner at (`x`, `y`); pixels outside the canvas are clipped
    pub fn draw_text(canvas: &mut RgbImage, text: &str, x: i32, y: i32, scale: i32, color: Rgb<u8>) {
        let (w, h) = (canvas.width() as i32, canvas.height() as i32);
        let advance = (GLYPH_WIDTH as i32 + 1) * scale;

        for (i, c) in text.chars().enumerate() {
            let Some(rows) = glyph(c) else { continue };
            let gx = x + i as i32 * advance;
            for (row, bits) in rows.iter().enumerate() {
                for col in 0..GLYPH_WIDTH {
                    if bits & (1 << (GLYPH_WIDTH - 1 - col)) == 0 {
                        continue;
                    }
                    for sy in 0..scale {
                        for sx in 0..scale {
                            let px = gx + col as i32 * scale + sx;
                            let py = y + row as i32 * scale + sy;
                            if px >= 0 && py >= 0 && px < w && py < h {
                                canvas.put_pixel(px as u32, py as u32, color);
                            }
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
    use image::{GrayImage, Luma};

    fn gradient_image() -> DynamicImage {
        DynamicImage::ImageLuma8(GrayImage::from_fn(64, 48, |x, y| Luma([(x * 3 + y) as u8])))
    }

    #[test]
    fn test_empty_circles_returns_identical_copy() {
        let base = gradient_image();
        let out = annotate(&base, &[], &AnnotationStyle::detailed());
        assert_eq!(out, base);
    }

    #[test]
    fn test_outline_drawn_without_touching_base() {
        let base = gradient_image();
        let before = base.clone();
        let circle = Circle::new(32, 24, 10);

        let out = annotate(&base, &[circle], &AnnotationStyle::default()).to_rgb8();
        assert_eq!(base, before);
        assert_eq!(*out.get_pixel(42, 24), Rgb([255, 0, 0]));
        // centre is untouched without a marker
        assert_ne!(*out.get_pixel(32, 24), Rgb([255, 0, 0]));
    }

    #[test]
    fn test_center_marker_and_label_clip_at_border() {
        let base = DynamicImage::ImageRgb8(RgbImage::new(40, 40));
        let circle = Circle::new(5, 5, 4);

        let out = annotate(&base, &[circle], &AnnotationStyle::detailed()).to_rgb8();
        assert_eq!(*out.get_pixel(5, 5), Rgb([0, 255, 0]));
    }

    #[test]
    fn test_label_pixels_present() {
        let base = DynamicImage::ImageRgb8(RgbImage::new(200, 200));
        let circle = Circle::new(100, 120, 30);

        let out = annotate(&base, &[circle], &AnnotationStyle::detailed()).to_rgb8();
        // label band sits above the circle
        let label_top = 120 - 30 - 10 - 10;
        let lit = (label_top..label_top + 10)
            .flat_map(|y| (70..150).map(move |x| (x, y)))
            .filter(|&(x, y)| *out.get_pixel(x, y) == Rgb([0, 255, 0]))
            .count();
        assert!(lit > 20);
    }
}
