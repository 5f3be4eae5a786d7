//! Photo adjustments WASM bindings.
//!
//! This module provides JavaScript bindings for the brightness, contrast and
//! saturation sliders shown after cropping.

use crate::types::{to_js_error, JsDecodedImage};
use quickpassport_core::adjustments::apply_adjustments_in_place;
use wasm_bindgen::prelude::*;

/// Adjustments wrapper for JavaScript. Values are percentages, 100 = unchanged.
#[wasm_bindgen]
pub struct Adjustments {
    inner: quickpassport_core::Adjustments,
}

#[wasm_bindgen]
impl Adjustments {
    /// Create new adjustments at 100/100/100
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self {
            inner: quickpassport_core::Adjustments::new(),
        }
    }

    /// Get brightness value
    #[wasm_bindgen(getter)]
    pub fn brightness(&self) -> f32 {
        self.inner.brightness
    }

    /// Set brightness value (clamped to 50-150)
    #[wasm_bindgen(setter)]
    pub fn set_brightness(&mut self, value: f32) {
        self.inner.brightness = value;
        self.inner = self.inner.clamped();
    }

    /// Get contrast value
    #[wasm_bindgen(getter)]
    pub fn contrast(&self) -> f32 {
        self.inner.contrast
    }

    /// Set contrast value (clamped to 50-150)
    #[wasm_bindgen(setter)]
    pub fn set_contrast(&mut self, value: f32) {
        self.inner.contrast = value;
        self.inner = self.inner.clamped();
    }

    /// Get saturation value
    #[wasm_bindgen(getter)]
    pub fn saturation(&self) -> f32 {
        self.inner.saturation
    }

    /// Set saturation value (clamped to 50-150)
    #[wasm_bindgen(setter)]
    pub fn set_saturation(&mut self, value: f32) {
        self.inner.saturation = value;
        self.inner = self.inner.clamped();
    }

    /// Check if all adjustments are at identity
    pub fn is_identity(&self) -> bool {
        self.inner.is_identity()
    }

    /// CSS `filter` string for a live preview, e.g. `brightness(110%) contrast(100%) saturate(95%)`
    pub fn css_filter(&self) -> String {
        format!(
            "brightness({}%) contrast({}%) saturate({}%)",
            self.inner.brightness, self.inner.contrast, self.inner.saturation
        )
    }

    /// Serialize to a plain object
    pub fn to_json(&self) -> Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(&self.inner).map_err(to_js_error)
    }

    /// Deserialize from a plain object
    pub fn from_json(value: JsValue) -> Result<Adjustments, JsValue> {
        let inner: quickpassport_core::Adjustments =
            serde_wasm_bindgen::from_value(value).map_err(to_js_error)?;
        Ok(Self {
            inner: inner.clamped(),
        })
    }
}

impl Default for Adjustments {
    fn default() -> Self {
        Self::new()
    }
}

impl Adjustments {
    pub(crate) fn inner(&self) -> &quickpassport_core::Adjustments {
        &self.inner
    }
}

/// Apply adjustments to a cropped photo, returning a new image.
///
/// # Example (TypeScript)
/// ```typescript
/// const adj = new Adjustments();
/// adj.brightness = 110;
/// const finalPhoto = apply_adjustments(croppedPhoto, adj);
/// ```
#[wasm_bindgen]
pub fn apply_adjustments(image: &JsDecodedImage, adjustments: &Adjustments) -> JsDecodedImage {
    // Clone the pixel data so we don't modify the original
    let mut pixels = image.pixels();
    apply_adjustments_in_place(&mut pixels, adjustments.inner());
    JsDecodedImage::new(image.width(), image.height(), pixels)
}
