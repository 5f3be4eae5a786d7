//! Image decoding for QuickPassport.
//!
//! This module provides functionality for:
//! - Decoding uploaded JPEG/PNG photos with EXIF orientation applied
//! - Flattening transparent pixels onto the white print background
//! - Resizing rasters with the `image` crate's filters
//!
//! Every raster in the pipeline is a [`DecodedImage`]: tightly packed RGB8,
//! row-major, no alpha.
//!
//! # Examples
//!
//! ```ignore
//! use quickpassport_core::decode::decode_image;
//!
//! let bytes = std::fs::read("photo.jpg").unwrap();
//! let image = decode_image(&bytes).unwrap();
//! println!("Decoded {}x{} image", image.width, image.height);
//! ```

mod photo;
mod resize;
mod types;

pub use photo::{decode_image, decode_image_no_orientation, get_orientation};
pub use resize::resize;
pub use types::{DecodeError, DecodedImage, FilterType, Orientation};
