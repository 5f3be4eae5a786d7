//! Session state for one sitting at the photo booth.
//!
//! A [`Session`] owns everything that carries across steps: the images at
//! each stage, the chosen size, adjustments, the copy count and the sheet.
//! Operations move the session between [`Step`]s the same way the screens
//! of the app do.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::adjustments::apply_adjustments;
use crate::background::{match_source_size, BackgroundRemover, ProcessingError};
use crate::catalog::PhotoSize;
use crate::decode::{decode_image, DecodeError, DecodedImage};
use crate::sheet::{clamp_quantity, SlotGrid, TileImage};
use crate::transform::Cropper;
use crate::Adjustments;

/// Errors from session operations.
#[derive(Debug, Error)]
pub enum SessionError {
    /// No photo has been uploaded.
    #[error("No photo uploaded")]
    NoSourceImage,

    /// The photo has not been cropped yet.
    #[error("No cropped photo to add")]
    NoCroppedImage,

    /// Background removal failed; the original photo is still usable.
    #[error(transparent)]
    Processing(#[from] ProcessingError),

    /// The uploaded file is not a readable image.
    #[error(transparent)]
    Decode(#[from] DecodeError),
}

/// Screens of the app, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Step {
    Upload = 1,
    SizeSelect = 2,
    RemoveBackground = 3,
    Crop = 4,
    Adjust = 5,
    Download = 6,
}

impl Step {
    pub const ALL: [Step; 6] = [
        Step::Upload,
        Step::SizeSelect,
        Step::RemoveBackground,
        Step::Crop,
        Step::Adjust,
        Step::Download,
    ];

    /// 1-based position for a step indicator.
    pub fn number(self) -> u8 {
        self as u8
    }

    pub fn label(self) -> &'static str {
        match self {
            Step::Upload => "Upload",
            Step::SizeSelect => "Size",
            Step::RemoveBackground => "Background",
            Step::Crop => "Crop",
            Step::Adjust => "Adjust",
            Step::Download => "Download",
        }
    }

    /// The step before this one. `Upload` has none.
    pub fn previous(self) -> Option<Step> {
        match self {
            Step::Upload => None,
            Step::SizeSelect => Some(Step::Upload),
            Step::RemoveBackground => Some(Step::SizeSelect),
            Step::Crop => Some(Step::RemoveBackground),
            Step::Adjust => Some(Step::Crop),
            Step::Download => Some(Step::Adjust),
        }
    }
}

/// The photo at each stage of processing.
#[derive(Debug, Clone, Default)]
pub struct SessionImages {
    pub original: Option<Arc<DecodedImage>>,
    pub no_background: Option<Arc<DecodedImage>>,
    pub cropped: Option<Arc<DecodedImage>>,
    pub adjusted: Option<Arc<DecodedImage>>,
}

/// In-memory state of one session.
#[derive(Debug, Clone)]
pub struct Session {
    step: Step,
    images: SessionImages,
    size: PhotoSize,
    adjustments: Adjustments,
    quantity: usize,
    grid: SlotGrid,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        Self {
            step: Step::Upload,
            images: SessionImages::default(),
            size: *PhotoSize::default_size(),
            adjustments: Adjustments::default(),
            quantity: 1,
            grid: SlotGrid::new(),
        }
    }

    pub fn step(&self) -> Step {
        self.step
    }

    pub fn images(&self) -> &SessionImages {
        &self.images
    }

    pub fn size(&self) -> &PhotoSize {
        &self.size
    }

    pub fn adjustments(&self) -> Adjustments {
        self.adjustments
    }

    pub fn quantity(&self) -> usize {
        self.quantity
    }

    pub fn grid(&self) -> &SlotGrid {
        &self.grid
    }

    /// Mutable access for reordering and removing tiles on the sheet.
    pub fn grid_mut(&mut self) -> &mut SlotGrid {
        &mut self.grid
    }

    /// Start over with a new photo. The sheet is kept.
    pub fn upload(&mut self, image: DecodedImage) {
        tracing::debug!(width = image.width, height = image.height, "photo uploaded");
        self.images = SessionImages {
            original: Some(Arc::new(image)),
            ..SessionImages::default()
        };
        self.quantity = 1;
        self.step = Step::SizeSelect;
    }

    /// Decode an uploaded file and start over with it.
    pub fn upload_bytes(&mut self, bytes: &[u8]) -> Result<(), SessionError> {
        let image = decode_image(bytes)?;
        self.upload(image);
        Ok(())
    }

    pub fn select_size(&mut self, size: PhotoSize) {
        self.size = size;
        self.step = Step::RemoveBackground;
    }

    /// Run background removal on the original photo.
    ///
    /// On failure the session stays on [`Step::RemoveBackground`] and the
    /// caller may retry or call [`Session::skip_background_removal`].
    pub async fn remove_background<R: BackgroundRemover>(&mut self, remover: &R) -> Result<(), SessionError> {
        let original = self.images.original.clone().ok_or(SessionError::NoSourceImage)?;

        let result = remover
            .remove_background(&original)
            .await
            .and_then(|result| match_source_size(&original, result));

        match result {
            Ok(image) => {
                self.images.no_background = Some(Arc::new(image));
                self.step = Step::Crop;
                Ok(())
            }
            Err(e) => {
                tracing::warn!(error = %e, "background removal failed");
                Err(e.into())
            }
        }
    }

    /// Continue to cropping with the current background.
    pub fn skip_background_removal(&mut self) -> Result<(), SessionError> {
        if self.images.original.is_none() {
            return Err(SessionError::NoSourceImage);
        }
        self.step = Step::Crop;
        Ok(())
    }

    /// The image the cropper works on: background-free if available.
    pub fn crop_source(&self) -> Option<Arc<DecodedImage>> {
        self.images
            .no_background
            .clone()
            .or_else(|| self.images.original.clone())
    }

    /// A cropper for the selected size, loaded with the crop source.
    pub fn cropper(&self, container_width: f64, container_height: f64) -> Result<Cropper, SessionError> {
        let source = self.crop_source().ok_or(SessionError::NoSourceImage)?;
        let mut cropper = Cropper::new(self.size);
        cropper.set_source(source, container_width, container_height);
        Ok(cropper)
    }

    /// Accept a cropped tile and move on to adjustments.
    pub fn complete_crop(&mut self, cropped: DecodedImage) {
        let cropped = Arc::new(cropped);
        self.images.adjusted = Some(Arc::new(apply_adjustments(&cropped, &self.adjustments)));
        self.images.cropped = Some(cropped);
        self.step = Step::Adjust;
    }

    /// Change adjustments, re-rendering the adjusted photo from the crop.
    pub fn set_adjustments(&mut self, adjustments: Adjustments) {
        self.adjustments = adjustments.clamped();
        if let Some(cropped) = &self.images.cropped {
            self.images.adjusted = Some(Arc::new(apply_adjustments(cropped, &self.adjustments)));
        }
    }

    /// The photo that goes on the sheet: adjusted, or the plain crop.
    pub fn final_image(&self) -> Option<Arc<DecodedImage>> {
        self.images
            .adjusted
            .clone()
            .or_else(|| self.images.cropped.clone())
    }

    /// Set the copy count, clamped to what fits on the sheet (at least 1).
    pub fn set_quantity(&mut self, quantity: usize) {
        self.quantity = clamp_quantity(quantity, self.grid.occupied_count());
    }

    /// Place the final photo on the sheet `quantity` times.
    ///
    /// Returns how many copies were placed.
    pub fn add_to_sheet(&mut self) -> Result<usize, SessionError> {
        let image = self.final_image().ok_or(SessionError::NoCroppedImage)?;
        let placed = self
            .grid
            .add_many(TileImage::Decoded(image), &self.size, self.quantity);
        self.step = Step::Download;
        Ok(placed)
    }

    /// Begin another person's photo on the same sheet.
    pub fn start_new_person(&mut self) {
        self.images = SessionImages::default();
        self.step = Step::Upload;
    }

    /// Remove every tile from the sheet.
    pub fn reset_sheet(&mut self) {
        self.grid.clear();
    }

    /// Go back one screen. Images are kept.
    pub fn go_back(&mut self) {
        if let Some(previous) = self.step.previous() {
            self.step = previous;
        }
    }
}
