//! Image decoding WASM bindings.
//!
//! This module exposes upload decoding to JavaScript.
//!
//! # Functions
//!
//! - [`decode_image`] - Decode a JPEG/PNG upload, honoring EXIF orientation
//! - [`decode_image_no_orientation`] - Decode without applying orientation
//! - [`get_orientation`] - Read the EXIF orientation value (1-8)
//!
//! # Example
//!
//! ```typescript
//! import { decode_image } from '@quickpassport/wasm';
//!
//! const bytes = new Uint8Array(await file.arrayBuffer());
//! const photo = decode_image(bytes);
//! console.log(`Uploaded ${photo.width}x${photo.height}`);
//! ```

use crate::types::{to_js_error, JsDecodedImage};
use quickpassport_core::decode;
use wasm_bindgen::prelude::*;

/// Decode an uploaded photo from bytes.
///
/// EXIF orientation is applied so the photo appears the way the browser
/// shows it, and any transparency is flattened onto white.
///
/// # Errors
///
/// Returns an error if the bytes are not a JPEG or PNG, or are truncated.
#[wasm_bindgen]
pub fn decode_image(bytes: &[u8]) -> Result<JsDecodedImage, JsValue> {
    decode::decode_image(bytes)
        .map(JsDecodedImage::from_decoded)
        .map_err(to_js_error)
}

/// Decode an uploaded photo without applying EXIF orientation.
#[wasm_bindgen]
pub fn decode_image_no_orientation(bytes: &[u8]) -> Result<JsDecodedImage, JsValue> {
    decode::decode_image_no_orientation(bytes)
        .map(JsDecodedImage::from_decoded)
        .map_err(to_js_error)
}

/// EXIF orientation of the photo (1 when absent).
#[wasm_bindgen]
pub fn get_orientation(bytes: &[u8]) -> u8 {
    decode::get_orientation(bytes) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use quickpassport_core::decode::DecodedImage;
    use quickpassport_core::encode::encode_png;

    #[test]
    fn test_decode_png() {
        let png = encode_png(&DecodedImage::filled(5, 4, [10, 20, 30])).unwrap();
        let image = decode_image(&png).unwrap();
        assert_eq!(image.width(), 5);
        assert_eq!(image.height(), 4);
        assert_eq!(&image.pixels()[0..3], &[10, 20, 30]);
    }

    #[test]
    fn test_orientation_without_exif() {
        let png = encode_png(&DecodedImage::filled(2, 2, [0, 0, 0])).unwrap();
        assert_eq!(get_orientation(&png), 1);
    }
}

#[cfg(all(test, target_arch = "wasm32"))]
mod wasm_tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    #[wasm_bindgen_test]
    fn test_decode_invalid_data() {
        assert!(decode_image(&[0, 1, 2, 3]).is_err());
    }

    #[wasm_bindgen_test]
    fn test_decode_empty() {
        assert!(decode_image(&[]).is_err());
    }
}
