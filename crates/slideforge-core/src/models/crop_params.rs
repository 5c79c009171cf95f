use serde::{Deserialize, Serialize};

use crate::error::{ImagingError, ImagingResult};
use crate::validation::{validate_fraction, validate_non_negative};

pub const DEFAULT_BLUR_SIGMA: f32 = 1.4;
pub const DEFAULT_CANNY_LOW: f32 = 50.0;
pub const DEFAULT_CANNY_HIGH: f32 = 150.0;
pub const DEFAULT_MIN_SUBJECT_FRACTION: f64 = 0.1;
pub const DEFAULT_MIN_CONTOUR_FRACTION: f64 = 0.001;
pub const DEFAULT_FACE_MARGIN: f64 = 0.2;
pub const DEFAULT_FACE_CONFIDENCE_RATIO: f64 = 0.8;
pub const DEFAULT_ANALYSIS_MAX_DIMENSION: u32 = 512;
pub const DEFAULT_FACE_MIN_SIZE: u32 = 20;
pub const DEFAULT_FACE_SCORE_THRESHOLD: f64 = 2.0;
pub const DEFAULT_FACE_PYRAMID_SCALE: f32 = 0.8;
pub const DEFAULT_FACE_WINDOW_STEP: u32 = 4;

/// Smallest face window the SeetaFace cascade accepts
pub const MIN_FACE_SIZE: u32 = 20;

/// Tunable constants of the smart crop pipeline
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SmartCropParams {
    /// Gaussian sigma of the noise reduction stage
    pub blur_sigma: f32,
    /// Canny low threshold
    pub canny_low: f32,
    /// Canny high threshold
    pub canny_high: f32,
    /// Minimum subject box size as a fraction of each source dimension
    pub min_subject_fraction: f64,
    /// Contours whose bounding box covers less of the analysis image are noise
    pub min_contour_fraction: f64,
    /// Growth applied to each side of the face union (head and shoulders)
    pub face_margin: f64,
    /// Faces scoring below this fraction of the best score are ignored
    pub face_confidence_ratio: f64,
    /// Longest side of the downscaled analysis image
    pub analysis_max_dimension: u32,
    /// Smallest face, in source pixels, the face detector searches for
    pub face_min_size: u32,
    /// Detector score below which a candidate face is discarded
    pub face_score_threshold: f64,
    /// Shrink factor between image pyramid levels, in (0, 1)
    pub face_pyramid_scale: f32,
    /// Sliding-window step in pixels, both axes
    pub face_window_step: u32,
}

impl Default for SmartCropParams {
    fn default() -> Self {
        Self {
            blur_sigma: DEFAULT_BLUR_SIGMA,
            canny_low: DEFAULT_CANNY_LOW,
            canny_high: DEFAULT_CANNY_HIGH,
            min_subject_fraction: DEFAULT_MIN_SUBJECT_FRACTION,
            min_contour_fraction: DEFAULT_MIN_CONTOUR_FRACTION,
            face_margin: DEFAULT_FACE_MARGIN,
            face_confidence_ratio: DEFAULT_FACE_CONFIDENCE_RATIO,
            analysis_max_dimension: DEFAULT_ANALYSIS_MAX_DIMENSION,
            face_min_size: DEFAULT_FACE_MIN_SIZE,
            face_score_threshold: DEFAULT_FACE_SCORE_THRESHOLD,
            face_pyramid_scale: DEFAULT_FACE_PYRAMID_SCALE,
            face_window_step: DEFAULT_FACE_WINDOW_STEP,
        }
    }
}

impl SmartCropParams {
    pub fn validate(&self) -> ImagingResult<()> {
        if !(self.blur_sigma.is_finite() && self.blur_sigma > 0.0) {
            return Err(ImagingError::InvalidParameter(format!(
                "blur_sigma must be positive, got {}",
                self.blur_sigma
            )));
        }
        validate_non_negative("canny_low", self.canny_low as f64)?;
        validate_non_negative("canny_high", self.canny_high as f64)?;
        if self.canny_low > self.canny_high {
            return Err(ImagingError::InvalidParameter(format!(
                "canny_low ({}) must not exceed canny_high ({})",
                self.canny_low, self.canny_high
            )));
        }
        validate_fraction("min_subject_fraction", self.min_subject_fraction)?;
        validate_fraction("min_contour_fraction", self.min_contour_fraction)?;
        validate_non_negative("face_margin", self.face_margin)?;
        validate_fraction("face_confidence_ratio", self.face_confidence_ratio)?;
        if self.analysis_max_dimension < 16 {
            return Err(ImagingError::InvalidParameter(format!(
                "analysis_max_dimension must be at least 16, got {}",
                self.analysis_max_dimension
            )));
        }
        if self.face_min_size < MIN_FACE_SIZE {
            return Err(ImagingError::InvalidParameter(format!(
                "face_min_size must be at least {}, got {}",
                MIN_FACE_SIZE, self.face_min_size
            )));
        }
        if !self.face_score_threshold.is_finite() {
            return Err(ImagingError::InvalidParameter(format!(
                "face_score_threshold must be finite, got {}",
                self.face_score_threshold
            )));
        }
        if !(self.face_pyramid_scale > 0.0 && self.face_pyramid_scale < 1.0) {
            return Err(ImagingError::InvalidParameter(format!(
                "face_pyramid_scale must lie in (0, 1), got {}",
                self.face_pyramid_scale
            )));
        }
        if self.face_window_step == 0 {
            return Err(ImagingError::InvalidParameter(
                "face_window_step must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
