//! Raster drawing surfaces.
//!
//! The cropper and the sheet rasterizer never talk to a concrete display.
//! They draw through [`RasterSurface`], which has exactly the capabilities
//! they need: fill, draw a scaled image into a rectangle, blend a flat
//! overlay and encode. [`Canvas`] is the in-memory implementation used for
//! export and in tests; front ends can implement the trait over their own
//! display surface.
//!
//! # Coordinate System
//!
//! - Origin is the top-left corner, x grows right, y grows down
//! - Units are surface pixels; rectangles may be fractional and may extend
//!   past the surface edges (the part outside is clipped)

mod canvas;

use serde::Serialize;

use crate::decode::DecodedImage;
use crate::encode::{EncodeError, OutputFormat};

pub use canvas::Canvas;

/// An RGB color.
pub type Rgb = [u8; 3];

/// Sheet and crop background.
pub const WHITE: Rgb = [255, 255, 255];

/// An axis-aligned rectangle in surface pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Right edge (exclusive).
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    /// Bottom edge (exclusive).
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// True when the rectangle has positive, finite extent.
    pub fn is_drawable(&self) -> bool {
        self.x.is_finite()
            && self.y.is_finite()
            && self.width.is_finite()
            && self.height.is_finite()
            && self.width > 0.0
            && self.height > 0.0
    }

    /// True if the two rectangles share any area.
    pub fn intersects(&self, other: &Rect) -> bool {
        self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }
}

/// A drawable raster surface.
pub trait RasterSurface {
    /// Surface size in pixels as `(width, height)`.
    fn size(&self) -> (u32, u32);

    /// Fill the whole surface with one color.
    fn fill_background(&mut self, color: Rgb);

    /// Draw `image` stretched to exactly fill `dest`.
    ///
    /// Non-drawable rectangles and empty images are ignored.
    fn draw_image_scaled_at(&mut self, image: &DecodedImage, dest: Rect);

    /// Blend a flat color over `area` at the given opacity (0.0 to 1.0).
    fn blend_rect(&mut self, area: Rect, color: Rgb, opacity: f32);

    /// Encode the current surface contents.
    fn encode(&self, format: OutputFormat) -> Result<Vec<u8>, EncodeError>;
}
