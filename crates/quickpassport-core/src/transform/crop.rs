//! Interactive pan/zoom cropping into a fixed-aspect viewport.
//!
//! The user drags and zooms a source photo behind a viewport whose aspect
//! matches the selected [`PhotoSize`]. The same transform is then replayed
//! at print resolution to produce the cropped tile.
//!
//! # Coordinate System
//!
//! - Offsets are in preview pixels, relative to the viewport center
//! - `scale` multiplies source pixels into preview pixels, about the image center
//! - Image-local point `(x, y)` (origin at the image center) lands at
//!   `(W/2 + offset_x + x*scale, H/2 + offset_y + y*scale)`
//!
//! # Export
//!
//! With `k = export_width / preview_width`, the export transform is the
//! preview transform scaled uniformly by `k`. The fraction of the source that
//! is visible therefore depends only on the transform relative to the
//! viewport width, never on the absolute preview size.
//!
//! # Example
//!
//! ```ignore
//! let mut cropper = Cropper::new(*PhotoSize::default_size());
//! cropper.set_source(Arc::new(photo), 400.0, 400.0);
//! cropper.pointer_down(100.0, 100.0);
//! cropper.pointer_move(120.0, 90.0);
//! cropper.pointer_up();
//! let tile = cropper.export(400).unwrap();
//! ```

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::catalog::PhotoSize;
use crate::decode::DecodedImage;
use crate::raster::{Canvas, RasterSurface, Rect, WHITE};
use crate::units::PRINT_DPI;

/// Smallest zoom the zoom control offers.
pub const MIN_ZOOM: f64 = 0.1;

/// Largest zoom the zoom control offers.
pub const MAX_ZOOM: f64 = 3.0;

/// Step of the zoom control.
pub const ZOOM_STEP: f64 = 0.01;

/// Extra zoom applied on top of the fit-to-container scale when a photo loads.
pub const INITIAL_ZOOM_FACTOR: f64 = 1.5;

/// Opacity of the composition guide lines.
pub const GUIDE_OPACITY: f32 = 0.4;

/// Clamp a zoom control value into [`MIN_ZOOM`, `MAX_ZOOM`].
///
/// Non-finite input falls back to 1.0.
pub fn clamp_zoom(value: f64) -> f64 {
    if value.is_finite() {
        value.clamp(MIN_ZOOM, MAX_ZOOM)
    } else {
        1.0
    }
}

/// Scale used when a photo first appears in a container of the given size.
///
/// Returns 1.0 when any dimension is zero or not finite.
pub fn initial_scale(image_width: u32, image_height: u32, container_width: f64, container_height: f64) -> f64 {
    if image_width == 0 || image_height == 0 {
        return 1.0;
    }
    let fit = (container_width / image_width as f64).min(container_height / image_height as f64);
    let scale = fit * INITIAL_ZOOM_FACTOR;
    if scale.is_finite() && scale > 0.0 {
        scale
    } else {
        1.0
    }
}

/// Pan and zoom applied to the source photo.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CropTransform {
    /// Horizontal pan in viewport pixels.
    pub offset_x: f64,
    /// Vertical pan in viewport pixels.
    pub offset_y: f64,
    /// Zoom multiplier, always positive.
    pub scale: f64,
}

impl Default for CropTransform {
    fn default() -> Self {
        Self {
            offset_x: 0.0,
            offset_y: 0.0,
            scale: 1.0,
        }
    }
}

impl CropTransform {
    /// The same framing expressed for a viewport `factor` times wider.
    pub fn scaled(&self, factor: f64) -> Self {
        Self {
            offset_x: self.offset_x * factor,
            offset_y: self.offset_y * factor,
            scale: self.scale * factor,
        }
    }

    /// Where the whole source image lands in a viewport of the given size.
    pub fn image_rect(&self, image_width: u32, image_height: u32, viewport_width: f64, viewport_height: f64) -> Rect {
        let width = image_width as f64 * self.scale;
        let height = image_height as f64 * self.scale;
        Rect::new(
            viewport_width / 2.0 + self.offset_x - width / 2.0,
            viewport_height / 2.0 + self.offset_y - height / 2.0,
            width,
            height,
        )
    }

    /// Part of the source visible through the viewport, normalized to 0.0..1.0
    /// of the source dimensions.
    ///
    /// Returns `None` when the image is entirely outside the viewport.
    pub fn visible_region(
        &self,
        image_width: u32,
        image_height: u32,
        viewport_width: f64,
        viewport_height: f64,
    ) -> Option<Rect> {
        if image_width == 0 || image_height == 0 {
            return None;
        }
        let placed = self.image_rect(image_width, image_height, viewport_width, viewport_height);
        let viewport = Rect::new(0.0, 0.0, viewport_width, viewport_height);
        if !placed.intersects(&viewport) {
            return None;
        }

        let left = ((0.0 - placed.x) / placed.width).clamp(0.0, 1.0);
        let right = ((viewport_width - placed.x) / placed.width).clamp(0.0, 1.0);
        let top = ((0.0 - placed.y) / placed.height).clamp(0.0, 1.0);
        let bottom = ((viewport_height - placed.y) / placed.height).clamp(0.0, 1.0);

        Some(Rect::new(left, top, right - left, bottom - top))
    }
}

/// Pointer interaction state.
///
/// Zooming is a direct value set and has no state of its own.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum CropState {
    #[default]
    Idle,
    /// Pointer is held down; `anchor` is the pointer position minus the
    /// offset at press time.
    Dragging { anchor_x: f64, anchor_y: f64 },
}

/// Crop engine for one photo and one target size.
#[derive(Debug, Clone)]
pub struct Cropper {
    size: PhotoSize,
    source: Option<Arc<DecodedImage>>,
    transform: CropTransform,
    state: CropState,
}

impl Cropper {
    pub fn new(size: PhotoSize) -> Self {
        Self {
            size,
            source: None,
            transform: CropTransform::default(),
            state: CropState::Idle,
        }
    }

    pub fn size(&self) -> &PhotoSize {
        &self.size
    }

    /// Change the target size. The current transform is kept.
    pub fn set_size(&mut self, size: PhotoSize) {
        self.size = size;
    }

    pub fn source(&self) -> Option<&Arc<DecodedImage>> {
        self.source.as_ref()
    }

    /// Load a photo, resetting pan and fitting the zoom to the container.
    pub fn set_source(&mut self, image: Arc<DecodedImage>, container_width: f64, container_height: f64) {
        self.transform = CropTransform {
            offset_x: 0.0,
            offset_y: 0.0,
            scale: initial_scale(image.width, image.height, container_width, container_height),
        };
        self.state = CropState::Idle;
        tracing::debug!(
            width = image.width,
            height = image.height,
            scale = self.transform.scale,
            "crop source loaded"
        );
        self.source = Some(image);
    }

    pub fn clear_source(&mut self) {
        self.source = None;
        self.state = CropState::Idle;
    }

    pub fn transform(&self) -> CropTransform {
        self.transform
    }

    /// Replace the whole transform. A non-positive or non-finite scale is ignored.
    pub fn set_transform(&mut self, transform: CropTransform) {
        if transform.offset_x.is_finite() && transform.offset_y.is_finite() {
            self.transform.offset_x = transform.offset_x;
            self.transform.offset_y = transform.offset_y;
        }
        self.set_scale(transform.scale);
    }

    pub fn state(&self) -> CropState {
        self.state
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, CropState::Dragging { .. })
    }

    /// Zoom control input. Allowed in any state; only positive finite values are taken.
    pub fn set_scale(&mut self, scale: f64) {
        if scale.is_finite() && scale > 0.0 {
            self.transform.scale = scale;
        }
    }

    pub fn pointer_down(&mut self, x: f64, y: f64) {
        self.state = CropState::Dragging {
            anchor_x: x - self.transform.offset_x,
            anchor_y: y - self.transform.offset_y,
        };
    }

    /// Pan while dragging. Ignored when idle.
    pub fn pointer_move(&mut self, x: f64, y: f64) {
        if let CropState::Dragging { anchor_x, anchor_y } = self.state {
            self.transform.offset_x = x - anchor_x;
            self.transform.offset_y = y - anchor_y;
        }
    }

    /// Pointer released or left the viewport.
    pub fn pointer_up(&mut self) {
        self.state = CropState::Idle;
    }

    /// Viewport size for a container of the given width.
    ///
    /// Height is `width * height_mm / width_mm`, truncated to whole pixels as a canvas would.
    pub fn preview_size(&self, container_width: u32) -> (u32, u32) {
        let height = (container_width as f64 * self.size.height_mm / self.size.width_mm) as u32;
        (container_width, height)
    }

    /// Output size of [`Cropper::export`] at print resolution.
    pub fn export_size(&self) -> (u32, u32) {
        self.size.pixel_size(PRINT_DPI)
    }

    /// Draw the preview into `surface`, whose size is the viewport size.
    ///
    /// Returns `false` without drawing if no photo is loaded yet.
    pub fn render_preview<S: RasterSurface>(&self, surface: &mut S) -> bool {
        let Some(source) = self.source.as_deref() else {
            return false;
        };
        let (width, height) = surface.size();
        surface.fill_background(WHITE);
        draw_transformed(surface, source, &self.transform);

        let (w, h) = (width as f64, height as f64);
        surface.blend_rect(Rect::new(0.0, (h / 3.0).floor(), w, 1.0), WHITE, GUIDE_OPACITY);
        surface.blend_rect(Rect::new((w / 2.0).floor(), 0.0, 1.0, h), WHITE, GUIDE_OPACITY);
        true
    }

    /// Replay the current framing at print resolution on a white background.
    ///
    /// `preview_width` is the viewport width the user framed the photo in.
    /// Returns `None` if no photo is loaded or the width is zero.
    pub fn export(&self, preview_width: u32) -> Option<DecodedImage> {
        let source = self.source.as_deref()?;
        if preview_width == 0 {
            return None;
        }
        let (export_width, export_height) = self.export_size();
        let factor = export_width as f64 / preview_width as f64;

        let mut canvas = Canvas::new(export_width, export_height);
        canvas.fill_background(WHITE);
        draw_transformed(&mut canvas, source, &self.transform.scaled(factor));

        tracing::debug!(
            size = self.size.id,
            export_width,
            export_height,
            factor,
            "crop exported"
        );
        Some(canvas.into_image())
    }
}

fn draw_transformed<S: RasterSurface>(surface: &mut S, image: &DecodedImage, transform: &CropTransform) {
    let (width, height) = surface.size();
    let dest = transform.image_rect(image.width, image.height, width as f64, height as f64);
    surface.draw_image_scaled_at(image, dest);
}


// ============================================================================
// Property-Based Tests
// ============================================================================
