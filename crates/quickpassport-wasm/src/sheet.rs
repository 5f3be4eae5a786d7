//! WASM bindings for the A4 sheet.
//!
//! [`JsSheet`] owns the slot grid. The front end adds finished photos, lets
//! the user drag tiles between slots, and exports or prints the page.

use std::sync::Arc;

use crate::types::{size_by_id, to_js_error, JsDecodedImage};
use quickpassport_core::raster::Canvas;
use quickpassport_core::sheet::{
    clamp_quantity, content_height, export_sheet_blocking, pack, render_sheet_blocking,
    sheet_file_name, ExportSettings, LayoutError, PageLayout, Placement, SheetSpec, SlotGrid,
    TileImage,
};
use serde::Serialize;
use wasm_bindgen::prelude::*;

/// Packed page geometry handed to a print view.
#[derive(Serialize)]
struct SheetLayoutJs {
    page: PageLayout,
    /// Taller than `page.page_height` when tiles run off the page.
    content_height: u32,
    tiles: Vec<TileJs>,
}

#[derive(Serialize)]
struct TileJs {
    #[serde(flatten)]
    placement: Placement,
    id: String,
    size_id: &'static str,
}

/// A finished sheet export.
#[wasm_bindgen]
pub struct JsSheetExport {
    bytes: Vec<u8>,
    file_name: String,
    width: u32,
    height: u32,
}

#[wasm_bindgen]
impl JsSheetExport {
    /// JPEG bytes, ready for a download link.
    pub fn bytes(&self) -> Vec<u8> {
        self.bytes.clone()
    }

    #[wasm_bindgen(getter)]
    pub fn file_name(&self) -> String {
        self.file_name.clone()
    }

    #[wasm_bindgen(getter)]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[wasm_bindgen(getter)]
    pub fn height(&self) -> u32 {
        self.height
    }
}

/// The 30-slot A4 sheet.
#[wasm_bindgen]
pub struct JsSheet {
    grid: SlotGrid,
    settings: ExportSettings,
}

#[wasm_bindgen]
impl JsSheet {
    #[wasm_bindgen(constructor)]
    pub fn new() -> JsSheet {
        Self {
            grid: SlotGrid::new(),
            settings: ExportSettings::default(),
        }
    }

    /// Add up to `count` copies of a photo cropped to `size_id`.
    ///
    /// Returns how many copies fit.
    pub fn add_many(&mut self, image: &JsDecodedImage, size_id: &str, count: usize) -> Result<usize, JsValue> {
        let size = size_by_id(size_id)?;
        let tile = TileImage::Decoded(Arc::new(image.to_decoded()));
        let placed = self.grid.add_many(tile, &size, count);
        if placed < count {
            console_warn(&format!("Sheet is full: placed {placed} of {count} copies"));
        }
        Ok(placed)
    }

    /// Empty a slot.
    pub fn remove(&mut self, index: usize) -> Result<(), JsValue> {
        self.grid.remove(index).map(|_| ()).map_err(to_js_error)
    }

    /// Exchange two slots (drag-to-reorder).
    pub fn swap(&mut self, from: usize, to: usize) -> Result<(), JsValue> {
        self.grid.swap(from, to).map_err(to_js_error)
    }

    pub fn clear(&mut self) {
        self.grid.clear();
    }

    #[wasm_bindgen(getter)]
    pub fn occupied_count(&self) -> usize {
        self.grid.occupied_count()
    }

    #[wasm_bindgen(getter)]
    pub fn capacity(&self) -> usize {
        self.grid.capacity()
    }

    /// Copies the quantity picker may offer (at least 1).
    pub fn clamp_quantity(&self, requested: usize) -> usize {
        clamp_quantity(requested, self.grid.occupied_count())
    }

    /// Whether a slot holds a photo.
    pub fn is_occupied(&self, index: usize) -> bool {
        matches!(self.grid.get(index), Ok(Some(_)))
    }

    /// Thumbnail for a slot, or `undefined` if empty or out of range.
    pub fn slot_image(&self, index: usize) -> Option<JsDecodedImage> {
        let entry = self.grid.get(index).ok().flatten()?;
        let image = entry.image.decode().ok()?;
        Some(JsDecodedImage::from_decoded(Arc::unwrap_or_clone(image)))
    }

    /// Packed layout at `dpi` as
    /// `{ page, content_height, tiles: [{ slot_index, x, y, width, height, id, size_id }] }`.
    pub fn layout(&self, dpi: f64) -> Result<JsValue, JsValue> {
        let layout = self.sheet_layout(dpi).map_err(to_js_error)?;
        serde_wasm_bindgen::to_value(&layout).map_err(to_js_error)
    }

    /// Render the page at `dpi` (96 for on-screen preview).
    pub fn render(&self, dpi: f64) -> Result<JsDecodedImage, JsValue> {
        let layout = PageLayout::checked_a4(dpi).map_err(to_js_error)?;
        let mut canvas = Canvas::new(layout.page_width, layout.page_height);
        render_sheet_blocking(&self.grid, &layout, &mut canvas).map_err(to_js_error)?;
        Ok(JsDecodedImage::from_decoded(canvas.into_image()))
    }

    /// Export the page as a 300 DPI JPEG named after the current time.
    pub fn export_jpeg(&self) -> Result<JsSheetExport, JsValue> {
        self.export_jpeg_at(now_millis())
    }

    /// Export the page with an explicit timestamp for the file name.
    pub fn export_jpeg_at(&self, timestamp_millis: f64) -> Result<JsSheetExport, JsValue> {
        let export = export_sheet_blocking(
            &self.grid,
            &SheetSpec::default(),
            &self.settings,
            timestamp_millis as i64,
        )
        .map_err(to_js_error)?;
        Ok(JsSheetExport {
            bytes: export.bytes,
            file_name: export.file_name,
            width: export.width,
            height: export.height,
        })
    }
}

impl JsSheet {
    fn sheet_layout(&self, dpi: f64) -> Result<SheetLayoutJs, LayoutError> {
        let page = PageLayout::checked_a4(dpi)?;
        let placements = pack(&self.grid, &page);
        let tiles = placements
            .iter()
            .filter_map(|&placement| {
                let entry = self.grid.get(placement.slot_index).ok().flatten()?;
                Some(TileJs {
                    placement,
                    id: entry.id.to_string(),
                    size_id: entry.size.id,
                })
            })
            .collect();
        Ok(SheetLayoutJs {
            page,
            content_height: content_height(&placements, &page),
            tiles,
        })
    }
}

impl Default for JsSheet {
    fn default() -> Self {
        Self::new()
    }
}

/// File name an export made at `timestamp_millis` would get.
#[wasm_bindgen]
pub fn export_file_name(timestamp_millis: f64) -> String {
    sheet_file_name(&ExportSettings::default().product, timestamp_millis as i64)
}

#[cfg(target_arch = "wasm32")]
fn now_millis() -> f64 {
    js_sys::Date::now()
}

#[cfg(not(target_arch = "wasm32"))]
fn now_millis() -> f64 {
    0.0
}

#[cfg(target_arch = "wasm32")]
fn console_warn(message: &str) {
    web_sys::console::warn_1(&JsValue::from_str(message));
}

#[cfg(not(target_arch = "wasm32"))]
fn console_warn(_message: &str) {}
