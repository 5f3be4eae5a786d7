//! JPEG encoding for crop and sheet export.

use image::codecs::jpeg::JpegEncoder;
use image::ExtendedColorType;
use image::ImageEncoder;
use std::io::Cursor;

use super::{validate, EncodeError};
use crate::decode::DecodedImage;

/// Quality used when encoding the finished A4 sheet.
pub const SHEET_JPEG_QUALITY: u8 = 90;

/// Quality used when encoding a single cropped photo.
pub const CROP_JPEG_QUALITY: u8 = 95;

/// Convert a canvas-style quality fraction (0.0 to 1.0) to a JPEG quality (1-100).
///
/// ```
/// use quickpassport_core::encode::quality_from_fraction;
///
/// assert_eq!(quality_from_fraction(0.9), 90);
/// assert_eq!(quality_from_fraction(2.0), 100);
/// ```
pub fn quality_from_fraction(fraction: f32) -> u8 {
    if !fraction.is_finite() {
        return SHEET_JPEG_QUALITY;
    }
    (fraction.clamp(0.0, 1.0) * 100.0).round().clamp(1.0, 100.0) as u8
}

/// Encode an RGB image to JPEG bytes.
///
/// # Arguments
///
/// * `image` - Source raster
/// * `quality` - JPEG quality (1-100, clamped)
///
/// # Quality Guidelines
///
/// * 95: cropped single photos that may be re-encoded later
/// * 90: the final sheet (print shops accept this without visible artifacts)
///
/// # Example
///
/// ```
/// use quickpassport_core::decode::DecodedImage;
/// use quickpassport_core::encode::encode_jpeg;
///
/// let image = DecodedImage::filled(100, 100, [128, 128, 128]);
/// let jpeg = encode_jpeg(&image, 90).unwrap();
/// assert_eq!(&jpeg[0..2], &[0xFF, 0xD8]);
/// ```
pub fn encode_jpeg(image: &DecodedImage, quality: u8) -> Result<Vec<u8>, EncodeError> {
    validate(image)?;

    let quality = quality.clamp(1, 100);
    let mut buffer = Cursor::new(Vec::new());
    let encoder = JpegEncoder::new_with_quality(&mut buffer, quality);

    encoder
        .write_image(
            &image.pixels,
            image.width,
            image.height,
            ExtendedColorType::Rgb8,
        )
        .map_err(|e| EncodeError::EncodingFailed(e.to_string()))?;

    Ok(buffer.into_inner())
}


// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Property: Valid input always produces a well-formed JPEG.
        #[test]
        fn prop_valid_input_produces_valid_jpeg(
            width in 1u32..=40,
            height in 1u32..=40,
            quality in 1u8..=100,
        ) {
            let img = DecodedImage::filled(width, height, [90, 160, 220]);
            let jpeg = encode_jpeg(&img, quality).unwrap();

            prop_assert_eq!(&jpeg[0..2], &[0xFF, 0xD8]);
            let len = jpeg.len();
            prop_assert_eq!(&jpeg[len - 2..], &[0xFF, 0xD9]);
        }

        /// Property: Encoding is deterministic.
        #[test]
        fn prop_deterministic_output(
            width in 1u32..=20,
            height in 1u32..=20,
            quality in 1u8..=100,
        ) {
            let img = DecodedImage::filled(width, height, [100, 100, 100]);
            prop_assert_eq!(encode_jpeg(&img, quality).unwrap(), encode_jpeg(&img, quality).unwrap());
        }
    }
}
