//! Subject detection for the smart-crop engine
//!
//! Detection never fails: each detector returns `None` when it has nothing to
//! offer and the engine substitutes a full-frame subject explicitly.

use image::{DynamicImage, GrayImage};
use imageproc::contours::{find_contours, BorderType, Contour};
use imageproc::distance_transform::Norm;
use imageproc::morphology::dilate;
use slideforge_core::{BoundingBox, DetectionMethod, DetectionStrategy, SmartCropParams};

use super::pixels::luma_image;

/// Bounding box of a detected face within an image.
#[derive(Debug, Clone, PartialEq)]
pub struct FaceBounds {
    /// X coordinate of the top-left corner (pixels).
    pub x: f64,
    /// Y coordinate of the top-left corner (pixels).
    pub y: f64,
    /// Width of the bounding box (pixels).
    pub width: f64,
    /// Height of the bounding box (pixels).
    pub height: f64,
    /// Detection confidence score.
    pub confidence: f64,
}

impl FaceBounds {
    pub fn bounding_box(&self) -> BoundingBox {
        BoundingBox::new(self.x, self.y, self.width, self.height)
    }
}

/// Pluggable face detection backend.
///
/// Implement this trait to provide a custom face detector and hand it to
/// [`crate::SmartCropEngine::with_face_detector`].
pub trait FaceDetector: Send + Sync {
    /// Detect faces in a row-major grayscale buffer of `width` × `height` bytes.
    fn detect(&self, gray: &[u8], width: u32, height: u32) -> Vec<FaceBounds>;
}

/// Subject located by one of the detectors, in source coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DetectionResult {
    pub subject: BoundingBox,
    pub method: DetectionMethod,
}

impl DetectionResult {
    /// Degraded result used when no detector found anything
    pub fn full_frame(width: u32, height: u32) -> Self {
        Self {
            subject: BoundingBox::full_frame(width, height),
            method: DetectionMethod::None,
        }
    }
}

/// Inputs shared by both detection paths.
///
/// Faces are searched in the full-resolution `source`; contours in `edges`,
/// the binary edge map of the downscaled analysis image.
pub struct DetectionInput<'a> {
    pub source: &'a DynamicImage,
    pub edges: &'a GrayImage,
    /// Source width / analysis width (and likewise for height)
    pub scale_x: f64,
    pub scale_y: f64,
}

/// Run the strategy-selected detectors in order.
///
/// `haar-face` tries the face detector first and falls through to contours
/// when it is missing or finds nothing.
pub fn detect_subject(
    strategy: DetectionStrategy,
    face_detector: Option<&dyn FaceDetector>,
    input: &DetectionInput<'_>,
    params: &SmartCropParams,
) -> Option<DetectionResult> {
    if strategy == DetectionStrategy::HaarFace {
        match face_detector {
            Some(detector) => {
                let luma = luma_image(input.source);
                if let Some(subject) = detect_faces(detector, &luma, params) {
                    return Some(DetectionResult {
                        subject,
                        method: DetectionMethod::Face,
                    });
                }
                tracing::debug!("No face found, falling back to contour detection");
            }
            None => {
                tracing::debug!("No face detector configured, using contour detection");
            }
        }
    }

    let subject = detect_largest_contour(input.edges, params)?;
    Some(DetectionResult {
        subject: subject.scale_xy(input.scale_x, input.scale_y),
        method: DetectionMethod::Contour,
    })
}

/// Union of the confident faces, expanded by the configured margin
pub fn detect_faces(
    detector: &dyn FaceDetector,
    luma: &GrayImage,
    params: &SmartCropParams,
) -> Option<BoundingBox> {
    let (width, height) = luma.dimensions();
    let faces: Vec<FaceBounds> = detector
        .detect(luma.as_raw(), width, height)
        .into_iter()
        .filter(|f| f.width > 0.0 && f.height > 0.0)
        .collect();

    let best = faces
        .iter()
        .map(|f| f.confidence)
        .fold(f64::NEG_INFINITY, f64::max);
    if faces.is_empty() {
        return None;
    }

    // Scores from some backends are unbounded below; only scale positive ones
    let threshold = if best > 0.0 {
        best * params.face_confidence_ratio
    } else {
        best
    };

    let subject = faces
        .iter()
        .filter(|f| f.confidence >= threshold)
        .map(FaceBounds::bounding_box)
        .reduce(|acc, b| acc.union(&b))?;

    tracing::debug!(
        faces = faces.len(),
        best_confidence = best,
        "Face detection complete"
    );

    let subject = subject.expand(params.face_margin).clip(width, height);
    (subject.area() > 0.0).then_some(subject)
}

/// Bounding box of the largest outer contour of the dilated edge map.
///
/// Contours whose bounding box covers less than `min_contour_fraction` of the
/// map are ignored. Ranking: polygon area, then bounding-box area, then the
/// order in which contours were found.
pub fn detect_largest_contour(edges: &GrayImage, params: &SmartCropParams) -> Option<BoundingBox> {
    let (width, height) = edges.dimensions();
    let min_area = params.min_contour_fraction * width as f64 * height as f64;

    let dilated = dilate(edges, Norm::LInf, 1);
    let contours = find_contours::<i32>(&dilated);

    let mut best: Option<(f64, BoundingBox)> = None;
    let mut kept = 0usize;
    for contour in contours
        .iter()
        .filter(|c| c.border_type == BorderType::Outer)
    {
        let Some(bbox) = contour_bounds(contour) else {
            continue;
        };
        if bbox.area() < min_area {
            continue;
        }
        kept += 1;

        let area = polygon_area(contour);
        let better = match &best {
            None => true,
            Some((best_area, best_box)) => {
                area > *best_area || (area == *best_area && bbox.area() > best_box.area())
            }
        };
        if better {
            best = Some((area, bbox));
        }
    }

    tracing::debug!(
        contours = contours.len(),
        kept,
        "Contour detection complete"
    );
    best.map(|(_, bbox)| bbox)
}

/// Pixel-inclusive bounding box of a contour
fn contour_bounds(contour: &Contour<i32>) -> Option<BoundingBox> {
    let first = contour.points.first()?;
    let (mut x0, mut y0, mut x1, mut y1) = (first.x, first.y, first.x, first.y);
    for p in &contour.points {
        x0 = x0.min(p.x);
        y0 = y0.min(p.y);
        x1 = x1.max(p.x);
        y1 = y1.max(p.y);
    }
    Some(BoundingBox::new(
        x0 as f64,
        y0 as f64,
        (x1 - x0 + 1) as f64,
        (y1 - y0 + 1) as f64,
    ))
}

/// Shoelace area of the contour polygon
fn polygon_area(contour: &Contour<i32>) -> f64 {
    let points = &contour.points;
    if points.len() < 3 {
        return 0.0;
    }
    let mut twice_area = 0i64;
    for (i, p) in points.iter().enumerate() {
        let q = &points[(i + 1) % points.len()];
        twice_area += p.x as i64 * q.y as i64 - q.x as i64 * p.y as i64;
    }
    twice_area.abs() as f64 / 2.0
}
