//! Fixed catalog of supported photo sizes.
//!
//! The catalog ids and dimensions are part of the external interface: saved
//! sheets and front ends refer to sizes by id, so entries must not change.

use serde::Serialize;

use crate::units::{mm_to_inches, mm_to_px};

/// A physical photo size from the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PhotoSize {
    /// Stable identifier (e.g. `"passport_in_std"`).
    pub id: &'static str,
    /// Human readable name.
    pub name: &'static str,
    /// Width in millimeters.
    pub width_mm: f64,
    /// Height in millimeters.
    pub height_mm: f64,
    /// Short description shown next to the size.
    pub description: &'static str,
}

/// All supported sizes, in display order.
pub static PHOTO_SIZES: [PhotoSize; 7] = [
    PhotoSize {
        id: "passport_in_official",
        name: "Indian Passport (Official)",
        width_mm: 51.0,
        height_mm: 51.0,
        description: "Official 2 x 2 inch (51mm x 51mm)",
    },
    PhotoSize {
        id: "passport_in_std",
        name: "Standard (India)",
        width_mm: 35.0,
        height_mm: 45.0,
        description: "Common 3.5cm x 4.5cm size",
    },
    PhotoSize {
        id: "pan_card",
        name: "PAN Card",
        width_mm: 25.0,
        height_mm: 35.0,
        description: "Indian PAN Card standard",
    },
    PhotoSize {
        id: "stamp_in",
        name: "Stamp Size",
        width_mm: 20.0,
        height_mm: 25.0,
        description: "Small official documents",
    },
    PhotoSize {
        id: "3r",
        name: "3R Photo",
        width_mm: 89.0,
        height_mm: 127.0,
        description: "3.5\" x 5\" standard print",
    },
    PhotoSize {
        id: "4r",
        name: "4R Photo",
        width_mm: 102.0,
        height_mm: 152.0,
        description: "4\" x 6\" standard print",
    },
    PhotoSize {
        id: "5r",
        name: "5R Photo",
        width_mm: 127.0,
        height_mm: 178.0,
        description: "5\" x 7\" standard print",
    },
];

impl PhotoSize {
    /// Look up a catalog entry by id.
    pub fn by_id(id: &str) -> Option<&'static PhotoSize> {
        PHOTO_SIZES.iter().find(|size| size.id == id)
    }

    /// The first catalog entry, selected when a session starts.
    pub fn default_size() -> &'static PhotoSize {
        &PHOTO_SIZES[0]
    }

    /// Width / height.
    pub fn aspect_ratio(&self) -> f64 {
        self.width_mm / self.height_mm
    }

    /// Tile box in whole pixels at the given DPI.
    pub fn pixel_size(&self, dpi: f64) -> (u32, u32) {
        (mm_to_px(self.width_mm, dpi), mm_to_px(self.height_mm, dpi))
    }

    /// Dimensions formatted in centimeters, e.g. `"3.5 x 4.5"`.
    pub fn cm_label(&self) -> String {
        format!("{:.1} x {:.1}", self.width_mm / 10.0, self.height_mm / 10.0)
    }

    /// Dimensions formatted in inches, e.g. `"1.38 x 1.77"`.
    pub fn inch_label(&self) -> String {
        format!(
            "{:.2} x {:.2}",
            mm_to_inches(self.width_mm),
            mm_to_inches(self.height_mm)
        )
    }
}
