//! WASM bindings for the pan/zoom cropper.
//!
//! The front end forwards pointer events and zoom slider input to a
//! [`JsCropper`], asks it for preview frames at the container width, and
//! exports the tile at print resolution when the user confirms.

use std::sync::Arc;

use crate::types::{size_by_id, to_js_error, JsDecodedImage};
use quickpassport_core::encode::{encode_jpeg, CROP_JPEG_QUALITY};
use quickpassport_core::raster::Canvas;
use quickpassport_core::transform::{clamp_zoom, CropTransform, Cropper, MAX_ZOOM, MIN_ZOOM};
use wasm_bindgen::prelude::*;

/// Interactive cropper for one photo and one target size.
///
/// # Example (TypeScript)
///
/// ```typescript
/// const cropper = new JsCropper('passport_in_std');
/// cropper.set_source(photo, container.clientWidth, container.clientHeight);
/// canvas.onpointerdown = (e) => cropper.pointer_down(e.clientX, e.clientY);
/// canvas.onpointermove = (e) => cropper.pointer_move(e.clientX, e.clientY);
/// canvas.onpointerup = () => cropper.pointer_up();
///
/// const frame = cropper.render_preview(container.clientWidth);
/// const jpeg = cropper.export_jpeg(container.clientWidth);
/// ```
#[wasm_bindgen]
pub struct JsCropper {
    inner: Cropper,
}

#[wasm_bindgen]
impl JsCropper {
    /// Create a cropper for a catalog size id.
    #[wasm_bindgen(constructor)]
    pub fn new(size_id: &str) -> Result<JsCropper, JsValue> {
        Ok(Self {
            inner: Cropper::new(size_by_id(size_id)?),
        })
    }

    /// Load the photo and fit the zoom to the container.
    pub fn set_source(&mut self, image: &JsDecodedImage, container_width: f64, container_height: f64) {
        self.inner
            .set_source(Arc::new(image.to_decoded()), container_width, container_height);
    }

    pub fn pointer_down(&mut self, x: f64, y: f64) {
        self.inner.pointer_down(x, y);
    }

    pub fn pointer_move(&mut self, x: f64, y: f64) {
        self.inner.pointer_move(x, y);
    }

    /// Pointer released or left the viewport.
    pub fn pointer_up(&mut self) {
        self.inner.pointer_up();
    }

    #[wasm_bindgen(getter)]
    pub fn dragging(&self) -> bool {
        self.inner.is_dragging()
    }

    /// Current zoom.
    #[wasm_bindgen(getter)]
    pub fn zoom(&self) -> f64 {
        self.inner.transform().scale
    }

    /// Set zoom from the slider. Values are clamped to the slider range.
    #[wasm_bindgen(setter)]
    pub fn set_zoom(&mut self, value: f64) {
        self.inner.set_scale(clamp_zoom(value));
    }

    #[wasm_bindgen(getter)]
    pub fn offset_x(&self) -> f64 {
        self.inner.transform().offset_x
    }

    #[wasm_bindgen(getter)]
    pub fn offset_y(&self) -> f64 {
        self.inner.transform().offset_y
    }

    /// Current transform as `{ offset_x, offset_y, scale }`.
    pub fn transform(&self) -> Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(&self.inner.transform()).map_err(to_js_error)
    }

    /// Restore a transform saved with [`JsCropper::transform`].
    pub fn set_transform(&mut self, value: JsValue) -> Result<(), JsValue> {
        let transform: CropTransform = serde_wasm_bindgen::from_value(value).map_err(to_js_error)?;
        self.inner.set_transform(transform);
        Ok(())
    }

    /// Viewport height for a container width.
    pub fn preview_height(&self, container_width: u32) -> u32 {
        self.inner.preview_size(container_width).1
    }

    /// Render a preview frame, or `undefined` if no photo is loaded yet.
    pub fn render_preview(&self, container_width: u32) -> Option<JsDecodedImage> {
        let (width, height) = self.inner.preview_size(container_width);
        let mut canvas = Canvas::new(width, height);
        self.inner
            .render_preview(&mut canvas)
            .then(|| JsDecodedImage::from_decoded(canvas.into_image()))
    }

    /// Export the tile at print resolution, or `undefined` if no photo is loaded.
    pub fn export(&self, preview_width: u32) -> Option<JsDecodedImage> {
        self.inner
            .export(preview_width)
            .map(JsDecodedImage::from_decoded)
    }

    /// Export the tile as JPEG at crop quality.
    pub fn export_jpeg(&self, preview_width: u32) -> Result<Vec<u8>, JsValue> {
        let tile = self
            .inner
            .export(preview_width)
            .ok_or_else(|| JsValue::from_str("No photo loaded"))?;
        encode_jpeg(&tile, CROP_JPEG_QUALITY).map_err(to_js_error)
    }
}

/// Smallest zoom offered by the slider.
#[wasm_bindgen]
pub fn min_zoom() -> f64 {
    MIN_ZOOM
}

/// Largest zoom offered by the slider.
#[wasm_bindgen]
pub fn max_zoom() -> f64 {
    MAX_ZOOM
}
