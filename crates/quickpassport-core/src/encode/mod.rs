//! Image encoding for QuickPassport.
//!
//! This module provides functionality for:
//! - Encoding crops and finished sheets to JPEG with configurable quality
//! - Encoding lossless PNG for the background-removal round trip
//!
//! # Examples
//!
//! ```ignore
//! use quickpassport_core::encode::{encode_image, OutputFormat};
//!
//! let bytes = encode_image(&sheet, OutputFormat::Jpeg { quality: 90 }).unwrap();
//! ```

mod jpeg;
mod png;

use thiserror::Error;

use crate::decode::DecodedImage;

pub use jpeg::{encode_jpeg, quality_from_fraction, CROP_JPEG_QUALITY, SHEET_JPEG_QUALITY};
pub use png::encode_png;

/// Errors that can occur during encoding.
#[derive(Debug, Error)]
pub enum EncodeError {
    /// Pixel data length doesn't match expected dimensions
    #[error("Invalid pixel data: expected {expected} bytes (width * height * 3), got {actual}")]
    InvalidPixelData { expected: usize, actual: usize },

    /// Width or height is zero
    #[error("Invalid dimensions: width ({width}) and height ({height}) must be non-zero")]
    InvalidDimensions { width: u32, height: u32 },

    /// The codec rejected the image
    #[error("Encoding failed: {0}")]
    EncodingFailed(String),
}

/// Target format for [`encode_image`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Lossy JPEG at the given quality (1-100).
    Jpeg { quality: u8 },
    /// Lossless PNG.
    Png,
}

impl OutputFormat {
    /// File extension without the dot.
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Jpeg { .. } => "jpg",
            OutputFormat::Png => "png",
        }
    }

    /// MIME type for uploads and downloads.
    pub fn mime_type(self) -> &'static str {
        match self {
            OutputFormat::Jpeg { .. } => "image/jpeg",
            OutputFormat::Png => "image/png",
        }
    }
}

/// Encode an image in the requested format.
pub fn encode_image(image: &DecodedImage, format: OutputFormat) -> Result<Vec<u8>, EncodeError> {
    match format {
        OutputFormat::Jpeg { quality } => encode_jpeg(image, quality),
        OutputFormat::Png => encode_png(image),
    }
}

pub(crate) fn validate(image: &DecodedImage) -> Result<(), EncodeError> {
    if image.width == 0 || image.height == 0 {
        return Err(EncodeError::InvalidDimensions {
            width: image.width,
            height: image.height,
        });
    }

    let expected = (image.width as usize) * (image.height as usize) * 3;
    if image.pixels.len() != expected {
        return Err(EncodeError::InvalidPixelData {
            expected,
            actual: image.pixels.len(),
        });
    }
    Ok(())
}
