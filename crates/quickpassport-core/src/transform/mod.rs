//! Crop transform engine.
//!
//! Turns the pan/zoom a user applies in the on-screen cropper into a tile at
//! print resolution. See [`Cropper`] for the interaction model.

mod crop;

pub use crop::{
    clamp_zoom, initial_scale, CropState, CropTransform, Cropper, GUIDE_OPACITY,
    INITIAL_ZOOM_FACTOR, MAX_ZOOM, MIN_ZOOM, ZOOM_STEP,
};
