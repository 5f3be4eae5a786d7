//! QuickPassport Core - passport photo sheet engine
//!
//! This crate provides the image side of QuickPassport: decoding uploads,
//! the pan/zoom cropper, tonal adjustments, and packing and rendering
//! finished photos onto a printable A4 sheet.

pub mod adjustments;
pub mod background;
pub mod catalog;
pub mod decode;
pub mod encode;
pub mod raster;
pub mod session;
pub mod sheet;
pub mod transform;
pub mod units;

pub use background::{BackgroundRemover, ProcessingError};
pub use catalog::{PhotoSize, PHOTO_SIZES};
pub use session::{Session, SessionError, Step};
pub use sheet::{
    export_sheet, pack, ExportError, ExportSettings, PageLayout, Placement, SheetExport,
    SheetSpec, SlotError, SlotGrid, MAX_SLOTS,
};
pub use transform::{CropTransform, Cropper};
pub use units::{is_supported_dpi, mm_to_px, MAX_DPI, PRINT_DPI};

/// Lowest value of the adjustment sliders, in percent.
pub const ADJUSTMENT_MIN: f32 = 50.0;

/// Highest value of the adjustment sliders, in percent.
pub const ADJUSTMENT_MAX: f32 = 150.0;

/// Tonal adjustments, each a percentage where 100 leaves the photo unchanged.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct Adjustments {
    /// Brightness (50 to 150)
    pub brightness: f32,
    /// Contrast (50 to 150)
    pub contrast: f32,
    /// Saturation (50 to 150)
    pub saturation: f32,
}

impl Default for Adjustments {
    fn default() -> Self {
        Self {
            brightness: 100.0,
            contrast: 100.0,
            saturation: 100.0,
        }
    }
}

impl Adjustments {
    /// Create a new Adjustments with identity values
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if all values are at identity
    pub fn is_identity(&self) -> bool {
        *self == Self::default()
    }

    /// Clamp every value to the slider range. Non-finite values reset to 100.
    pub fn clamped(self) -> Self {
        fn clamp(v: f32) -> f32 {
            if v.is_finite() {
                v.clamp(ADJUSTMENT_MIN, ADJUSTMENT_MAX)
            } else {
                100.0
            }
        }
        Self {
            brightness: clamp(self.brightness),
            contrast: clamp(self.contrast),
            saturation: clamp(self.saturation),
        }
    }
}
