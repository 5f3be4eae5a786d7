//! In-memory RGB canvas.
//!
//! # Algorithm
//!
//! Images are drawn by inverse mapping: for each destination pixel whose
//! center lies inside the target rectangle, we compute the matching source
//! position and sample it bilinearly.
//!
//! ```text
//! src_x = (dst_x + 0.5 - rect.x) * src_w / rect.w - 0.5
//! src_y = (dst_y + 0.5 - rect.y) * src_h / rect.h - 0.5
//! ```
//!
//! When the target is less than half the source size in either direction,
//! the source is first shrunk with a triangle filter so that downscaled
//! photos don't alias. The output depends only on the inputs, so drawing the
//! same scene twice gives identical pixels.

use std::borrow::Cow;

use super::{RasterSurface, Rect, Rgb, WHITE};
use crate::decode::{resize, DecodedImage, FilterType};
use crate::encode::{encode_image, EncodeError, OutputFormat};

/// An offscreen RGB surface backed by a [`DecodedImage`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Canvas {
    image: DecodedImage,
}

impl Canvas {
    /// Create a white canvas.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            image: DecodedImage::filled(width, height, WHITE),
        }
    }

    /// Current contents.
    pub fn image(&self) -> &DecodedImage {
        &self.image
    }

    /// Consume the canvas, returning its contents.
    pub fn into_image(self) -> DecodedImage {
        self.image
    }

    fn put(&mut self, x: u32, y: u32, rgb: Rgb) {
        let idx = ((y as usize) * (self.image.width as usize) + x as usize) * 3;
        self.image.pixels[idx..idx + 3].copy_from_slice(&rgb);
    }

    fn get(&self, x: u32, y: u32) -> Rgb {
        let idx = ((y as usize) * (self.image.width as usize) + x as usize) * 3;
        [
            self.image.pixels[idx],
            self.image.pixels[idx + 1],
            self.image.pixels[idx + 2],
        ]
    }

    /// Integer pixel range covered by `rect`, clipped to the canvas.
    fn span(&self, rect: &Rect) -> Option<(u32, u32, u32, u32)> {
        let (w, h) = (self.image.width as f64, self.image.height as f64);
        let x_start = rect.x.floor().clamp(0.0, w) as u32;
        let x_end = rect.right().ceil().clamp(0.0, w) as u32;
        let y_start = rect.y.floor().clamp(0.0, h) as u32;
        let y_end = rect.bottom().ceil().clamp(0.0, h) as u32;

        if x_start >= x_end || y_start >= y_end {
            None
        } else {
            Some((x_start, x_end, y_start, y_end))
        }
    }
}

impl RasterSurface for Canvas {
    fn size(&self) -> (u32, u32) {
        (self.image.width, self.image.height)
    }

    fn fill_background(&mut self, color: Rgb) {
        for chunk in self.image.pixels.chunks_exact_mut(3) {
            chunk.copy_from_slice(&color);
        }
    }

    fn draw_image_scaled_at(&mut self, image: &DecodedImage, dest: Rect) {
        if image.is_empty() || !dest.is_drawable() {
            return;
        }
        if image.pixels.len() != image.pixel_count() * 3 {
            tracing::warn!(
                width = image.width,
                height = image.height,
                len = image.pixels.len(),
                "skipping image with mismatched pixel buffer"
            );
            return;
        }
        let Some((x_start, x_end, y_start, y_end)) = self.span(&dest) else {
            return;
        };

        let source = prepare_source(image, &dest);
        let scale_x = source.width as f64 / dest.width;
        let scale_y = source.height as f64 / dest.height;

        for py in y_start..y_end {
            let cy = py as f64 + 0.5;
            if cy < dest.y || cy >= dest.bottom() {
                continue;
            }
            let src_y = (cy - dest.y) * scale_y - 0.5;

            for px in x_start..x_end {
                let cx = px as f64 + 0.5;
                if cx < dest.x || cx >= dest.right() {
                    continue;
                }
                let src_x = (cx - dest.x) * scale_x - 0.5;
                let rgb = sample_bilinear(&source, src_x, src_y);
                self.put(px, py, rgb);
            }
        }
    }

    fn blend_rect(&mut self, area: Rect, color: Rgb, opacity: f32) {
        let alpha = opacity.clamp(0.0, 1.0) as f64;
        if alpha == 0.0 || !area.is_drawable() {
            return;
        }
        let Some((x_start, x_end, y_start, y_end)) = self.span(&area) else {
            return;
        };

        for py in y_start..y_end {
            for px in x_start..x_end {
                let base = self.get(px, py);
                let mut out = [0u8; 3];
                for i in 0..3 {
                    let v = base[i] as f64 * (1.0 - alpha) + color[i] as f64 * alpha;
                    out[i] = v.clamp(0.0, 255.0).round() as u8;
                }
                self.put(px, py, out);
            }
        }
    }

    fn encode(&self, format: OutputFormat) -> Result<Vec<u8>, EncodeError> {
        encode_image(&self.image, format)
    }
}

/// Shrink very large sources before sampling them into a small box.
fn prepare_source<'a>(image: &'a DecodedImage, dest: &Rect) -> Cow<'a, DecodedImage> {
    let too_wide = dest.width * 2.0 < image.width as f64;
    let too_tall = dest.height * 2.0 < image.height as f64;
    if !too_wide && !too_tall {
        return Cow::Borrowed(image);
    }

    let target_w = (dest.width.ceil() as u32).clamp(1, image.width);
    let target_h = (dest.height.ceil() as u32).clamp(1, image.height);
    match resize(image, target_w, target_h, FilterType::Bilinear) {
        Ok(resized) => Cow::Owned(resized),
        Err(_) => Cow::Borrowed(image),
    }
}

#[inline]
fn get_pixel_f64(image: &DecodedImage, px: usize, py: usize) -> [f64; 3] {
    let idx = (py * image.width as usize + px) * 3;
    [
        image.pixels[idx] as f64,
        image.pixels[idx + 1] as f64,
        image.pixels[idx + 2] as f64,
    ]
}

/// Bilinear sample with edge clamping.
///
/// Positions outside the image repeat the nearest edge pixel, so the border
/// of a tile is never blended with the background.
fn sample_bilinear(image: &DecodedImage, x: f64, y: f64) -> Rgb {
    let max_x = (image.width - 1) as f64;
    let max_y = (image.height - 1) as f64;
    let x = x.clamp(0.0, max_x);
    let y = y.clamp(0.0, max_y);

    let x0 = x.floor() as usize;
    let y0 = y.floor() as usize;
    let x1 = (x0 + 1).min(image.width as usize - 1);
    let y1 = (y0 + 1).min(image.height as usize - 1);

    let fx = x - x0 as f64;
    let fy = y - y0 as f64;

    let p00 = get_pixel_f64(image, x0, y0);
    let p10 = get_pixel_f64(image, x1, y0);
    let p01 = get_pixel_f64(image, x0, y1);
    let p11 = get_pixel_f64(image, x1, y1);

    let mut result = [0u8; 3];
    for i in 0..3 {
        let v = p00[i] * (1.0 - fx) * (1.0 - fy)
            + p10[i] * fx * (1.0 - fy)
            + p01[i] * (1.0 - fx) * fy
            + p11[i] * fx * fy;
        result[i] = v.clamp(0.0, 255.0).round() as u8;
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn checker(width: u32, height: u32) -> DecodedImage {
        let mut pixels = Vec::with_capacity((width * height * 3) as usize);
        for y in 0..height {
            for x in 0..width {
                let v = ((x + y) % 2 * 200) as u8;
                pixels.extend_from_slice(&[v, v, v]);
            }
        }
        DecodedImage::new(width, height, pixels)
    }

    #[test]
    fn test_new_canvas_is_white() {
        let canvas = Canvas::new(3, 2);
        assert_eq!(canvas.size(), (3, 2));
        assert!(canvas.image().pixels.iter().all(|&v| v == 255));
    }

    #[test]
    fn test_fill_background() {
        let mut canvas = Canvas::new(2, 2);
        canvas.fill_background([1, 2, 3]);
        assert_eq!(canvas.image().pixel(1, 1), Some([1, 2, 3]));
    }

    #[test]
    fn test_same_size_draw_is_exact_copy() {
        let src = checker(6, 4);
        let mut canvas = Canvas::new(10, 10);
        canvas.draw_image_scaled_at(&src, Rect::new(2.0, 3.0, 6.0, 4.0));

        for y in 0..4 {
            for x in 0..6 {
                assert_eq!(canvas.image().pixel(x + 2, y + 3), src.pixel(x, y));
            }
        }
        // Outside the box stays white
        assert_eq!(canvas.image().pixel(1, 3), Some(WHITE));
        assert_eq!(canvas.image().pixel(8, 3), Some(WHITE));
        assert_eq!(canvas.image().pixel(2, 7), Some(WHITE));
    }

    #[test]
    fn test_stretch_fills_exact_box() {
        let src = DecodedImage::filled(3, 7, [10, 20, 30]);
        let mut canvas = Canvas::new(20, 20);
        canvas.draw_image_scaled_at(&src, Rect::new(4.0, 5.0, 9.0, 6.0));

        let mut covered = 0;
        for y in 0..20 {
            for x in 0..20 {
                let inside = (4..13).contains(&x) && (5..11).contains(&y);
                let px = canvas.image().pixel(x, y).unwrap();
                if inside {
                    assert_eq!(px, [10, 20, 30]);
                    covered += 1;
                } else {
                    assert_eq!(px, WHITE);
                }
            }
        }
        assert_eq!(covered, 9 * 6);
    }

    #[test]
    fn test_draw_is_clipped_to_canvas() {
        let src = DecodedImage::filled(4, 4, [0, 0, 0]);
        let mut canvas = Canvas::new(4, 4);
        canvas.draw_image_scaled_at(&src, Rect::new(-2.0, -2.0, 4.0, 4.0));

        assert_eq!(canvas.image().pixel(0, 0), Some([0, 0, 0]));
        assert_eq!(canvas.image().pixel(1, 1), Some([0, 0, 0]));
        assert_eq!(canvas.image().pixel(2, 2), Some(WHITE));
    }

    #[test]
    fn test_fully_outside_draw_is_noop() {
        let src = DecodedImage::filled(4, 4, [0, 0, 0]);
        let mut canvas = Canvas::new(4, 4);
        canvas.draw_image_scaled_at(&src, Rect::new(10.0, 10.0, 4.0, 4.0));
        assert_eq!(canvas, Canvas::new(4, 4));
    }

    #[test]
    fn test_degenerate_inputs_are_ignored() {
        let mut canvas = Canvas::new(4, 4);
        canvas.draw_image_scaled_at(&DecodedImage::new(0, 0, vec![]), Rect::new(0.0, 0.0, 4.0, 4.0));
        canvas.draw_image_scaled_at(&DecodedImage::filled(2, 2, [0, 0, 0]), Rect::new(0.0, 0.0, 0.0, 4.0));
        let broken = DecodedImage {
            width: 4,
            height: 4,
            pixels: vec![0; 5],
        };
        canvas.draw_image_scaled_at(&broken, Rect::new(0.0, 0.0, 4.0, 4.0));
        assert_eq!(canvas, Canvas::new(4, 4));
    }

    #[test]
    fn test_large_downscale_averages() {
        // A 1px checkerboard shrunk 10x should come out as mid gray, not
        // as whichever of black/white the sampler happened to hit.
        let src = checker(200, 200);
        let mut canvas = Canvas::new(20, 20);
        canvas.draw_image_scaled_at(&src, Rect::new(0.0, 0.0, 20.0, 20.0));

        let [v, _, _] = canvas.image().pixel(10, 10).unwrap();
        assert!((70..=130).contains(&v), "got {v}");
    }

    #[test]
    fn test_blend_rect() {
        let mut canvas = Canvas::new(4, 4);
        canvas.fill_background([0, 0, 0]);
        canvas.blend_rect(Rect::new(0.0, 1.0, 4.0, 1.0), WHITE, 0.4);

        assert_eq!(canvas.image().pixel(2, 1), Some([102, 102, 102]));
        assert_eq!(canvas.image().pixel(2, 0), Some([0, 0, 0]));
        assert_eq!(canvas.image().pixel(2, 2), Some([0, 0, 0]));
    }

    #[test]
    fn test_encode_jpeg() {
        let canvas = Canvas::new(8, 8);
        let bytes = canvas.encode(OutputFormat::Jpeg { quality: 90 }).unwrap();
        assert_eq!(&bytes[0..2], &[0xFF, 0xD8]);
    }

    #[test]
    fn test_draw_is_deterministic() {
        let src = checker(37, 23);
        let dest = Rect::new(1.3, 2.7, 15.2, 9.9);
        let mut a = Canvas::new(20, 16);
        let mut b = Canvas::new(20, 16);
        a.draw_image_scaled_at(&src, dest);
        b.draw_image_scaled_at(&src, dest);
        assert_eq!(a, b);
    }
}
