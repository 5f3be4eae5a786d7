//! Background removal seam.
//!
//! The actual removal runs in an external service. The core only defines the
//! call shape and what to do with the answer: take the returned image as the
//! new crop source, or hand the failure back so the user can continue with
//! the original photo.

use std::future::Future;

use thiserror::Error;

use crate::decode::{resize, DecodedImage, FilterType};

/// Instruction sent along with the photo.
pub const WHITE_BACKGROUND_PROMPT: &str = "Remove the background from this image and replace it \
with a solid, professional plain white background (#FFFFFF). Keep the person's face and \
shoulders perfectly. The output should be only the modified image.";

/// Failure reported by a background remover.
#[derive(Debug, Error)]
pub enum ProcessingError {
    /// The service failed or rejected the request.
    #[error("Background removal failed: {0}")]
    Service(String),

    /// The service answered without an image.
    #[error("Background removal returned no image")]
    NoImageReturned,
}

/// Replaces the background of a portrait with plain white.
pub trait BackgroundRemover {
    fn remove_background(
        &self,
        image: &DecodedImage,
    ) -> impl Future<Output = Result<DecodedImage, ProcessingError>>;
}

/// Bring a removal result back to the source dimensions.
///
/// Services are expected to keep the size. When one doesn't, the result is
/// stretched back so the crop framing stays the same.
pub fn match_source_size(source: &DecodedImage, result: DecodedImage) -> Result<DecodedImage, ProcessingError> {
    if result.is_empty() {
        return Err(ProcessingError::NoImageReturned);
    }
    if result.width == source.width && result.height == source.height {
        return Ok(result);
    }

    tracing::warn!(
        expected_width = source.width,
        expected_height = source.height,
        width = result.width,
        height = result.height,
        "background removal changed image size, resizing"
    );
    resize(&result, source.width, source.height, FilterType::Lanczos3)
        .map_err(|e| ProcessingError::Service(e.to_string()))
}
