//! Photo size catalog and unit conversion bindings.

use crate::types::to_js_error;
use quickpassport_core::catalog::{PhotoSize, PHOTO_SIZES};
use quickpassport_core::units;
use serde::Serialize;
use wasm_bindgen::prelude::*;

/// Catalog entry as shown in the size picker.
#[derive(Serialize)]
struct PhotoSizeJs {
    #[serde(flatten)]
    size: PhotoSize,
    cm_label: String,
    inch_label: String,
    print_width_px: u32,
    print_height_px: u32,
}

impl From<&PhotoSize> for PhotoSizeJs {
    fn from(size: &PhotoSize) -> Self {
        let (print_width_px, print_height_px) = size.pixel_size(units::PRINT_DPI);
        Self {
            size: *size,
            cm_label: size.cm_label(),
            inch_label: size.inch_label(),
            print_width_px,
            print_height_px,
        }
    }
}

/// All supported sizes, in display order.
#[wasm_bindgen]
pub fn photo_sizes() -> Result<JsValue, JsValue> {
    let sizes: Vec<PhotoSizeJs> = PHOTO_SIZES.iter().map(PhotoSizeJs::from).collect();
    serde_wasm_bindgen::to_value(&sizes).map_err(to_js_error)
}

/// Id of the size selected when a session starts.
#[wasm_bindgen]
pub fn default_size_id() -> String {
    PhotoSize::default_size().id.to_string()
}

/// Millimeters to whole pixels at `dpi`.
#[wasm_bindgen]
pub fn mm_to_px(mm: f64, dpi: f64) -> u32 {
    units::mm_to_px(mm, dpi)
}

/// Print resolution used for exports.
#[wasm_bindgen]
pub fn print_dpi() -> f64 {
    units::PRINT_DPI
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_size() {
        assert_eq!(default_size_id(), "passport_in_official");
    }

    #[test]
    fn test_mm_to_px() {
        assert_eq!(mm_to_px(35.0, print_dpi()), 413);
        assert_eq!(mm_to_px(45.0, 96.0), 170);
    }

    #[test]
    fn test_size_entry() {
        let entry = PhotoSizeJs::from(&PHOTO_SIZES[1]);
        assert_eq!(entry.cm_label, "3.5 x 4.5");
        assert_eq!((entry.print_width_px, entry.print_height_px), (413, 531));
    }
}
