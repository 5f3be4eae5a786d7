//! Tonal adjustments for the cropped photo.
//!
//! Applies the three photo adjustments to RGB pixel data with the same
//! semantics as the CSS `brightness()`, `contrast()` and `saturate()` filter
//! functions, so a browser preview and the exported tile agree.
//!
//! ## Adjustment Order
//! 1. Brightness
//! 2. Contrast
//! 3. Saturation
//!
//! Each stage clamps to [0, 1] before the next one runs.

use crate::decode::DecodedImage;
use crate::Adjustments;

/// Apply adjustments to a raster, producing a new image.
///
/// The source is never modified, so the cropped photo can be re-adjusted
/// any number of times.
///
/// # Example
/// ```
/// use quickpassport_core::{Adjustments, adjustments::apply_adjustments};
/// use quickpassport_core::decode::DecodedImage;
///
/// let cropped = DecodedImage::filled(2, 2, [100, 100, 100]);
/// let adj = Adjustments { brightness: 120.0, ..Default::default() };
/// let adjusted = apply_adjustments(&cropped, &adj);
/// assert!(adjusted.pixels[0] > 100);
/// ```
pub fn apply_adjustments(image: &DecodedImage, adjustments: &Adjustments) -> DecodedImage {
    let mut output = image.clone();
    apply_adjustments_in_place(&mut output.pixels, adjustments);
    output
}

/// Apply adjustments to RGB pixel data in place.
pub fn apply_adjustments_in_place(pixels: &mut [u8], adjustments: &Adjustments) {
    if adjustments.is_identity() {
        return;
    }

    let brightness = adjustments.brightness / 100.0;
    let contrast = adjustments.contrast / 100.0;
    let saturation = adjustments.saturation / 100.0;

    for chunk in pixels.chunks_exact_mut(3) {
        let mut r = chunk[0] as f32 / 255.0;
        let mut g = chunk[1] as f32 / 255.0;
        let mut b = chunk[2] as f32 / 255.0;

        (r, g, b) = apply_brightness(r, g, b, brightness);
        (r, g, b) = apply_contrast(r, g, b, contrast);
        (r, g, b) = apply_saturation(r, g, b, saturation);

        chunk[0] = to_u8(r);
        chunk[1] = to_u8(g);
        chunk[2] = to_u8(b);
    }
}

#[inline]
fn to_u8(v: f32) -> u8 {
    (v.clamp(0.0, 1.0) * 255.0).round() as u8
}

#[inline]
fn clamp3(r: f32, g: f32, b: f32) -> (f32, f32, f32) {
    (r.clamp(0.0, 1.0), g.clamp(0.0, 1.0), b.clamp(0.0, 1.0))
}

/// Brightness multiplier.
///
/// Formula: `output = input * factor` (1.0 = unchanged)
#[inline]
fn apply_brightness(r: f32, g: f32, b: f32, factor: f32) -> (f32, f32, f32) {
    if factor == 1.0 {
        return (r, g, b);
    }
    clamp3(r * factor, g * factor, b * factor)
}

/// Contrast around mid-gray.
///
/// Formula: `output = (input - 0.5) * factor + 0.5`
#[inline]
fn apply_contrast(r: f32, g: f32, b: f32, factor: f32) -> (f32, f32, f32) {
    if factor == 1.0 {
        return (r, g, b);
    }
    clamp3(
        (r - 0.5) * factor + 0.5,
        (g - 0.5) * factor + 0.5,
        (b - 0.5) * factor + 0.5,
    )
}

/// Saturation using the CSS/SVG `saturate` color matrix.
///
/// 0.0 = grayscale, 1.0 = unchanged, > 1.0 = oversaturated.
#[inline]
fn apply_saturation(r: f32, g: f32, b: f32, s: f32) -> (f32, f32, f32) {
    if s == 1.0 {
        return (r, g, b);
    }
    clamp3(
        (0.213 + 0.787 * s) * r + (0.715 - 0.715 * s) * g + (0.072 - 0.072 * s) * b,
        (0.213 - 0.213 * s) * r + (0.715 + 0.285 * s) * g + (0.072 - 0.072 * s) * b,
        (0.213 - 0.213 * s) * r + (0.715 - 0.715 * s) * g + (0.072 + 0.928 * s) * b,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> DecodedImage {
        DecodedImage::new(
            3,
            1,
            vec![
                200, 40, 40, // red-ish
                40, 200, 40, // green-ish
                128, 128, 128, // gray
            ],
        )
    }

    #[test]
    fn test_identity_is_noop() {
        let img = sample();
        assert_eq!(apply_adjustments(&img, &Adjustments::default()), img);
    }

    #[test]
    fn test_source_not_mutated() {
        let img = sample();
        let adj = Adjustments {
            brightness: 150.0,
            ..Default::default()
        };
        let _ = apply_adjustments(&img, &adj);
        assert_eq!(img, sample());
    }

    #[test]
    fn test_brightness_scales_channels() {
        let img = DecodedImage::filled(1, 1, [100, 50, 200]);
        let adj = Adjustments {
            brightness: 50.0,
            ..Default::default()
        };
        let out = apply_adjustments(&img, &adj);
        assert_eq!(out.pixels, vec![50, 25, 100]);
    }

    #[test]
    fn test_brightness_clamps_at_white() {
        let img = DecodedImage::filled(1, 1, [250, 250, 250]);
        let adj = Adjustments {
            brightness: 150.0,
            ..Default::default()
        };
        assert_eq!(apply_adjustments(&img, &adj).pixels, vec![255, 255, 255]);
    }

    #[test]
    fn test_contrast_keeps_mid_gray() {
        let img = DecodedImage::filled(1, 1, [128, 128, 128]);
        for contrast in [50.0, 150.0] {
            let adj = Adjustments {
                contrast,
                ..Default::default()
            };
            let out = apply_adjustments(&img, &adj);
            // 128/255 is a hair above 0.5
            assert!((out.pixels[0] as i32 - 128).abs() <= 1);
        }
    }

    #[test]
    fn test_contrast_spreads_values() {
        let img = DecodedImage::new(2, 1, vec![64, 64, 64, 192, 192, 192]);
        let adj = Adjustments {
            contrast: 150.0,
            ..Default::default()
        };
        let out = apply_adjustments(&img, &adj);
        assert!(out.pixels[0] < 64);
        assert!(out.pixels[3] > 192);
    }

    #[test]
    fn test_zero_saturation_is_grayscale() {
        let img = sample();
        let adj = Adjustments {
            saturation: 0.0,
            ..Default::default()
        };
        let out = apply_adjustments(&img, &adj);
        for chunk in out.pixels.chunks_exact(3) {
            assert!((chunk[0] as i32 - chunk[1] as i32).abs() <= 1);
            assert!((chunk[1] as i32 - chunk[2] as i32).abs() <= 1);
        }
    }

    #[test]
    fn test_saturation_leaves_gray_alone() {
        let img = DecodedImage::filled(1, 1, [128, 128, 128]);
        let adj = Adjustments {
            saturation: 150.0,
            ..Default::default()
        };
        let out = apply_adjustments(&img, &adj);
        for v in out.pixels {
            assert!((v as i32 - 128).abs() <= 1);
        }
    }

    #[test]
    fn test_oversaturation_increases_spread() {
        let img = DecodedImage::filled(1, 1, [160, 100, 100]);
        let adj = Adjustments {
            saturation: 150.0,
            ..Default::default()
        };
        let out = apply_adjustments(&img, &adj);
        assert!(out.pixels[0] as i32 - out.pixels[1] as i32 > 60);
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================
