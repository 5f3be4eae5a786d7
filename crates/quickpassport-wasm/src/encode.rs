//! Image encoding WASM bindings.
//!
//! # Functions
//!
//! - [`encode_jpeg`] - Encode RGB pixel data to JPEG bytes
//! - [`encode_jpeg_from_image`] - Encode a JsDecodedImage to JPEG bytes
//! - [`encode_png_from_image`] - Encode a JsDecodedImage to PNG bytes
//! - [`quality_from_fraction`] - Convert a canvas-style 0.0-1.0 quality to 1-100
//!
//! # Example
//!
//! ```typescript
//! import { encode_jpeg_from_image, quality_from_fraction } from '@quickpassport/wasm';
//!
//! const jpeg = encode_jpeg_from_image(croppedPhoto, quality_from_fraction(0.95));
//! ```

use crate::types::{to_js_error, JsDecodedImage};
use quickpassport_core::decode::DecodedImage;
use quickpassport_core::encode;
use wasm_bindgen::prelude::*;

/// Encode RGB pixel data to JPEG bytes.
///
/// # Arguments
///
/// * `pixels` - RGB pixel data as a `Uint8Array` (3 bytes per pixel, row-major order)
/// * `width` - Image width in pixels
/// * `height` - Image height in pixels
/// * `quality` - JPEG quality (1-100; sheets use 90, single crops 95)
///
/// # Errors
///
/// Returns an error if:
/// - The pixel data length doesn't match width * height * 3
/// - Width or height is zero
/// - Encoding fails internally
#[wasm_bindgen]
pub fn encode_jpeg(pixels: &[u8], width: u32, height: u32, quality: u8) -> Result<Vec<u8>, JsValue> {
    let image = DecodedImage {
        width,
        height,
        pixels: pixels.to_vec(),
    };
    encode::encode_jpeg(&image, quality).map_err(to_js_error)
}

/// Encode a JsDecodedImage to JPEG bytes.
#[wasm_bindgen]
pub fn encode_jpeg_from_image(image: &JsDecodedImage, quality: u8) -> Result<Vec<u8>, JsValue> {
    encode::encode_jpeg(&image.to_decoded(), quality).map_err(to_js_error)
}

/// Encode a JsDecodedImage to lossless PNG bytes.
///
/// Used to hand a photo to the background-removal service.
#[wasm_bindgen]
pub fn encode_png_from_image(image: &JsDecodedImage) -> Result<Vec<u8>, JsValue> {
    encode::encode_png(&image.to_decoded()).map_err(to_js_error)
}

/// Convert a canvas `toDataURL` quality (0.0-1.0) to a 1-100 JPEG quality.
#[wasm_bindgen]
pub fn quality_from_fraction(fraction: f32) -> u8 {
    encode::quality_from_fraction(fraction)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_jpeg_valid() {
        let pixels = vec![128u8; 16 * 16 * 3];
        let jpeg = encode_jpeg(&pixels, 16, 16, 90).unwrap();
        assert_eq!(&jpeg[0..2], &[0xFF, 0xD8]);
    }

    #[test]
    fn test_encode_from_image() {
        let image = JsDecodedImage::new(4, 4, vec![200u8; 4 * 4 * 3]);
        let jpeg = encode_jpeg_from_image(&image, 95).unwrap();
        let png = encode_png_from_image(&image).unwrap();
        assert_eq!(&jpeg[0..2], &[0xFF, 0xD8]);
        assert_eq!(&png[1..4], b"PNG");
    }

    #[test]
    fn test_quality_from_fraction() {
        assert_eq!(quality_from_fraction(0.9), 90);
        assert_eq!(quality_from_fraction(0.95), 95);
    }
}
