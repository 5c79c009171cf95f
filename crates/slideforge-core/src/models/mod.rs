//! Data models shared across the workspace
//!
//! Each sub-module represents a specific feature area.

mod crop_params;
mod filter_spec;
mod geometry;
mod quality;
mod strategy;

// Re-export all models for convenient imports
pub use crop_params::{
    SmartCropParams, DEFAULT_ANALYSIS_MAX_DIMENSION, DEFAULT_BLUR_SIGMA, DEFAULT_CANNY_HIGH,
    DEFAULT_CANNY_LOW, DEFAULT_FACE_CONFIDENCE_RATIO, DEFAULT_FACE_MARGIN, DEFAULT_FACE_MIN_SIZE,
    DEFAULT_FACE_PYRAMID_SCALE, DEFAULT_FACE_SCORE_THRESHOLD, DEFAULT_FACE_WINDOW_STEP,
    DEFAULT_MIN_CONTOUR_FRACTION, DEFAULT_MIN_SUBJECT_FRACTION, MIN_FACE_SIZE,
};
pub use filter_spec::{FilterSpec, POSITIONAL_PARAM};
pub use geometry::{thirds_points, BoundingBox, CropWindow};
pub use quality::QualityPreset;
pub use strategy::{DetectionMethod, DetectionStrategy};
