use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use slideforge_core::{ImagingError, ImagingResult, SmartCropParams};

use super::detection::{FaceBounds, FaceDetector};

/// Face detector backed by the `rustface` crate (SeetaFace engine).
///
/// The frontal-face model is read once from disk; every call to `detect`
/// builds a fresh detector from a clone of it, configured from the `face_*`
/// tunables of [`SmartCropParams`].
pub struct RustfaceDetector {
    model: rustface::Model,
    min_face_size: u32,
    score_threshold: f64,
    pyramid_scale: f32,
    window_step: u32,
}

impl RustfaceDetector {
    /// Load a SeetaFace model file (e.g. `seeta_fd_frontal_v1.0.bin`).
    ///
    /// `params` is validated first: the cascade panics on out-of-range settings.
    pub fn from_path(path: &Path, params: &SmartCropParams) -> ImagingResult<Self> {
        params.validate()?;
        let display = path.display().to_string();
        let file = File::open(path).map_err(|e| ImagingError::load(&display, e))?;
        let model = rustface::read_model(BufReader::new(file))
            .map_err(|e| ImagingError::load(&display, e))?;
        tracing::info!(
            model = %display,
            min_face_size = params.face_min_size,
            "Loaded face detection model"
        );
        Ok(Self {
            model,
            min_face_size: params.face_min_size,
            score_threshold: params.face_score_threshold,
            pyramid_scale: params.face_pyramid_scale,
            window_step: params.face_window_step,
        })
    }
}

impl FaceDetector for RustfaceDetector {
    fn detect(&self, gray: &[u8], width: u32, height: u32) -> Vec<FaceBounds> {
        let mut detector = rustface::create_detector_with_model(self.model.clone());
        detector.set_min_face_size(self.min_face_size);
        detector.set_score_thresh(self.score_threshold);
        detector.set_pyramid_scale_factor(self.pyramid_scale);
        detector.set_slide_window_step(self.window_step, self.window_step);

        let image = rustface::ImageData::new(gray, width, height);
        let faces: Vec<FaceBounds> = detector
            .detect(&image)
            .into_iter()
            .map(|face| {
                let rect = face.bbox();
                FaceBounds {
                    x: rect.x() as f64,
                    y: rect.y() as f64,
                    width: rect.width() as f64,
                    height: rect.height() as f64,
                    confidence: face.score(),
                }
            })
            .collect();
        tracing::debug!(faces = faces.len(), "SeetaFace detection done");
        faces
    }
}
