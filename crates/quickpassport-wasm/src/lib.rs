//! QuickPassport WASM - WebAssembly bindings for QuickPassport
//!
//! This crate exposes the quickpassport-core crop and sheet engine to the
//! browser front end.
//!
//! # Module Structure
//!
//! - `catalog` - Photo size catalog and mm to pixel conversion
//! - `types` - WASM-compatible wrapper types for image data
//! - `decode` - Upload decoding with EXIF orientation
//! - `transform` - Interactive pan/zoom cropper
//! - `adjustments` - Brightness, contrast and saturation
//! - `sheet` - The 30-slot A4 sheet, preview and export
//! - `encode` - JPEG/PNG encoding
//!
//! # Usage
//!
//! ```typescript
//! import init, { decode_image, JsCropper, JsSheet } from '@quickpassport/wasm';
//!
//! await init();
//!
//! const photo = decode_image(new Uint8Array(await file.arrayBuffer()));
//! const cropper = new JsCropper('passport_in_std');
//! cropper.set_source(photo, 350, 450);
//!
//! const sheet = new JsSheet();
//! sheet.add_many(cropper.export(350), 'passport_in_std', 8);
//! const { file_name } = sheet.export_jpeg();
//! ```

use wasm_bindgen::prelude::*;

mod adjustments;
mod catalog;
mod decode;
mod encode;
mod sheet;
mod transform;
mod types;

// Re-export public types
pub use adjustments::{apply_adjustments, Adjustments};
pub use catalog::{default_size_id, mm_to_px, photo_sizes, print_dpi};
pub use decode::{decode_image, decode_image_no_orientation, get_orientation};
pub use encode::{encode_jpeg, encode_jpeg_from_image, encode_png_from_image, quality_from_fraction};
pub use sheet::{export_file_name, JsSheet, JsSheetExport};
pub use transform::{max_zoom, min_zoom, JsCropper};
pub use types::JsDecodedImage;

/// Initialize the WASM module (called automatically on load)
#[wasm_bindgen(start)]
pub fn init() {}

/// Get the version of the WASM module
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
