//! Subject-aware cropping to an exact target size
//!
//! The engine runs nine deterministic stages: validate the source, build a
//! grayscale analysis copy, denoise it, extract Canny edges, locate the subject,
//! normalise its box, pick a rule-of-thirds aligned window, clamp that window
//! into the source and finally extract and resample it.

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView, GrayImage, Rgb, RgbImage};
use imageproc::drawing::{draw_hollow_rect_mut, draw_line_segment_mut};
use imageproc::edges::canny;
use imageproc::filter::gaussian_blur_f32;
use imageproc::rect::Rect;
use slideforge_core::models::thirds_points;
use slideforge_core::validation::validate_dimensions;
use slideforge_core::{
    BoundingBox, Config, CropWindow, DetectionStrategy, ImagingError, ImagingResult,
    SmartCropParams,
};

use super::detection::{detect_subject, DetectionInput, DetectionResult, FaceDetector};
use super::pixels::luma_image;
use super::resize::ImageResize;

/// Scores closer than this are treated as equal when ranking candidates
const SCORE_EPSILON: f64 = 1e-6;

const DETECTION_COLOR: Rgb<u8> = Rgb([255, 0, 0]);
const SUBJECT_COLOR: Rgb<u8> = Rgb([0, 255, 0]);
const WINDOW_COLOR: Rgb<u8> = Rgb([0, 128, 255]);
const THIRDS_COLOR: Rgb<u8> = Rgb([255, 220, 0]);

/// Where diagnostic stage images are written
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepOutput {
    pub folder: PathBuf,
    pub prefix: String,
}

impl StepOutput {
    pub fn new(folder: impl Into<PathBuf>, prefix: impl Into<String>) -> Self {
        Self {
            folder: folder.into(),
            prefix: prefix.into(),
        }
    }

    /// `{prefix}_{NN}_{stage}.png` inside the folder
    pub fn path_for(&self, index: u8, name: &str) -> PathBuf {
        self.folder
            .join(format!("{}_{:02}_{}.png", self.prefix, index, name))
    }
}

/// Snapshot of one pipeline stage
#[derive(Debug, Clone)]
pub struct ProcessingStep {
    pub index: u8,
    pub name: &'static str,
    pub image: DynamicImage,
}

/// Result of stages 1-8
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CropAnalysis {
    pub window: CropWindow,
    pub detection: DetectionResult,
    /// Subject box after normalisation, in source coordinates
    pub subject: BoundingBox,
}

/// Result of a full smart crop
#[derive(Debug, Clone)]
pub struct SmartCropOutcome {
    pub image: DynamicImage,
    pub window: CropWindow,
    pub detection: DetectionResult,
}

/// Writes stage snapshots when diagnostics were requested, otherwise a no-op
struct StepRecorder<'a> {
    output: Option<&'a StepOutput>,
}

impl StepRecorder<'_> {
    fn enabled(&self) -> bool {
        self.output.is_some()
    }

    fn record<F>(&self, index: u8, name: &'static str, render: F)
    where
        F: FnOnce() -> DynamicImage,
    {
        let Some(output) = self.output else {
            return;
        };
        let step = ProcessingStep {
            index,
            name,
            image: render(),
        };
        let path = output.path_for(step.index, step.name);
        let result = std::fs::create_dir_all(&output.folder)
            .map_err(|e| e.to_string())
            .and_then(|_| step.image.save(&path).map_err(|e| e.to_string()));
        match result {
            Ok(()) => tracing::debug!(step = step.name, path = %path.display(), "Saved crop step"),
            Err(e) => tracing::warn!(
                step = step.name,
                path = %path.display(),
                error = %e,
                "Failed to save crop step"
            ),
        }
    }
}

/// Nine-stage smart-crop pipeline
#[derive(Clone, Default)]
pub struct SmartCropEngine {
    params: SmartCropParams,
    face_detector: Option<Arc<dyn FaceDetector>>,
}

impl fmt::Debug for SmartCropEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SmartCropEngine")
            .field("params", &self.params)
            .field("face_detector", &self.face_detector.is_some())
            .finish()
    }
}

impl SmartCropEngine {
    pub fn new(params: SmartCropParams) -> ImagingResult<Self> {
        params.validate()?;
        Ok(Self {
            params,
            face_detector: None,
        })
    }

    /// Engine with the configured tunables and, when the `rustface` feature is
    /// enabled, the face model from `face_model_path`
    pub fn from_config(config: &Config) -> ImagingResult<Self> {
        let engine = Self::new(config.crop)?;
        #[cfg(feature = "rustface")]
        let engine = match &config.face_model_path {
            Some(path) => engine.with_face_detector(Arc::new(
                super::rustface_backend::RustfaceDetector::from_path(path, &config.crop)?,
            )),
            None => engine,
        };
        #[cfg(not(feature = "rustface"))]
        let engine = {
            if config.face_model_path.is_some() {
                tracing::warn!("Face model configured but the rustface feature is disabled");
            }
            engine
        };
        Ok(engine)
    }

    pub fn with_face_detector(mut self, detector: Arc<dyn FaceDetector>) -> Self {
        self.face_detector = Some(detector);
        self
    }

    pub fn params(&self) -> &SmartCropParams {
        &self.params
    }

    pub fn has_face_detector(&self) -> bool {
        self.face_detector.is_some()
    }

    /// Stages 1-8: the crop window for a `target_width` x `target_height` output
    pub fn compute_window(
        &self,
        img: &DynamicImage,
        target_width: u32,
        target_height: u32,
        strategy: DetectionStrategy,
    ) -> ImagingResult<CropAnalysis> {
        self.analyze(
            img,
            target_width,
            target_height,
            strategy,
            &StepRecorder { output: None },
        )
    }

    /// Run all nine stages and return the exactly sized result
    pub fn crop(
        &self,
        img: &DynamicImage,
        target_width: u32,
        target_height: u32,
        strategy: DetectionStrategy,
        steps: Option<&StepOutput>,
    ) -> ImagingResult<SmartCropOutcome> {
        let recorder = StepRecorder { output: steps };
        let analysis = self.analyze(img, target_width, target_height, strategy, &recorder)?;
        let window = analysis.window;

        // Stage 9: extraction & resize
        let extracted = img.crop_imm(window.x, window.y, window.width, window.height);
        let image = ImageResize::resize_high_quality(&extracted, target_width, target_height);
        recorder.record(9, "result", || image.clone());

        tracing::debug!(
            x = window.x,
            y = window.y,
            width = window.width,
            height = window.height,
            target_width,
            target_height,
            method = analysis.detection.method.as_str(),
            "Smart crop complete"
        );

        Ok(SmartCropOutcome {
            image,
            window,
            detection: analysis.detection,
        })
    }

    fn analyze(
        &self,
        img: &DynamicImage,
        target_width: u32,
        target_height: u32,
        strategy: DetectionStrategy,
        steps: &StepRecorder<'_>,
    ) -> ImagingResult<CropAnalysis> {
        validate_dimensions(target_width, Some(target_height))?;

        // Stage 1: original
        let (src_width, src_height) = img.dimensions();
        if src_width == 0 || src_height == 0 {
            return Err(ImagingError::load("buffer", "image has zero size"));
        }
        steps.record(1, "original", || img.clone());

        // Stage 2: grayscale analysis copy
        let analysis = downscale_for_analysis(img, self.params.analysis_max_dimension);
        let (analysis_width, analysis_height) = analysis.dimensions();
        let scale_x = src_width as f64 / analysis_width as f64;
        let scale_y = src_height as f64 / analysis_height as f64;
        let gray = luma_image(&analysis);
        steps.record(2, "grayscale", || DynamicImage::ImageLuma8(gray.clone()));
        tracing::debug!(analysis_width, analysis_height, "Built analysis image");

        // Stage 3: noise reduction
        let blurred = gaussian_blur_f32(&gray, self.params.blur_sigma);
        steps.record(3, "blurred", || DynamicImage::ImageLuma8(blurred.clone()));

        // Stage 4: edge detection
        let edges: GrayImage = canny(&blurred, self.params.canny_low, self.params.canny_high);
        steps.record(4, "edges", || DynamicImage::ImageLuma8(edges.clone()));

        // Stage 5: subject detection, degrading to the full frame
        let input = DetectionInput {
            source: img,
            edges: &edges,
            scale_x,
            scale_y,
        };
        let detection = detect_subject(
            strategy,
            self.face_detector.as_deref(),
            &input,
            &self.params,
        )
        .unwrap_or_else(|| {
            tracing::debug!("No subject detected, using full frame");
            DetectionResult::full_frame(src_width, src_height)
        });
        tracing::debug!(
            method = detection.method.as_str(),
            x = detection.subject.x,
            y = detection.subject.y,
            width = detection.subject.width,
            height = detection.subject.height,
            "Subject detected"
        );

        let overlay_base = steps.enabled().then(|| analysis.to_rgb8());
        let to_analysis = |b: &BoundingBox| b.scale_xy(1.0 / scale_x, 1.0 / scale_y);
        steps.record(5, "detection", || {
            overlay(&overlay_base, |canvas| {
                outline(canvas, &to_analysis(&detection.subject), DETECTION_COLOR)
            })
        });

        // Stage 6: bounding-box normalisation
        let subject = normalize_subject(
            &detection.subject,
            src_width,
            src_height,
            self.params.min_subject_fraction,
        );
        steps.record(6, "normalized", || {
            overlay(&overlay_base, |canvas| {
                outline(canvas, &to_analysis(&subject), SUBJECT_COLOR)
            })
        });

        // Stage 7: rule-of-thirds alignment
        let target_aspect = target_width as f64 / target_height as f64;
        let (window_width, window_height) = window_size(src_width, src_height, target_aspect);
        let (x, y) = choose_position(
            src_width,
            src_height,
            window_width,
            window_height,
            subject.center(),
        );
        let candidate = BoundingBox::new(x as f64, y as f64, window_width as f64, window_height as f64);
        steps.record(7, "thirds", || {
            overlay(&overlay_base, |canvas| {
                let window = to_analysis(&candidate);
                draw_thirds(canvas, &window);
                outline(canvas, &window, WINDOW_COLOR);
            })
        });

        // Stage 8: crop finalisation
        let window = finalize_window(
            x,
            y,
            window_width,
            window_height,
            src_width,
            src_height,
            target_aspect,
        );
        steps.record(8, "crop", || {
            let mut canvas = img.to_rgb8();
            outline(
                &mut canvas,
                &BoundingBox::new(
                    window.x as f64,
                    window.y as f64,
                    window.width as f64,
                    window.height as f64,
                ),
                WINDOW_COLOR,
            );
            DynamicImage::ImageRgb8(canvas)
        });

        Ok(CropAnalysis {
            window,
            detection,
            subject,
        })
    }
}

/// Copy whose longest side is at most `max_dimension`; never upscales
fn downscale_for_analysis(img: &DynamicImage, max_dimension: u32) -> DynamicImage {
    let (width, height) = img.dimensions();
    let longest = width.max(height);
    if longest <= max_dimension {
        return img.clone();
    }
    let factor = max_dimension as f64 / longest as f64;
    let small_width = ((width as f64 * factor).round() as u32).max(1);
    let small_height = ((height as f64 * factor).round() as u32).max(1);
    img.resize_exact(small_width, small_height, FilterType::Triangle)
}

/// Clip to the source and grow to the minimum subject size, shifting back
/// inside the frame where growth overflows it
fn normalize_subject(
    subject: &BoundingBox,
    src_width: u32,
    src_height: u32,
    min_fraction: f64,
) -> BoundingBox {
    let clipped = subject.clip(src_width, src_height);
    let clipped = if clipped.area() > 0.0 {
        clipped
    } else {
        BoundingBox::full_frame(src_width, src_height)
    };

    let (w, h) = (src_width as f64, src_height as f64);
    let width = clipped.width.max(w * min_fraction).min(w);
    let height = clipped.height.max(h * min_fraction).min(h);
    let (cx, cy) = clipped.center();
    BoundingBox::new(
        (cx - width / 2.0).clamp(0.0, w - width),
        (cy - height / 2.0).clamp(0.0, h - height),
        width,
        height,
    )
}

/// Largest window of `aspect` that fits in the source
fn window_size(src_width: u32, src_height: u32, aspect: f64) -> (u32, u32) {
    let source_aspect = src_width as f64 / src_height as f64;
    if source_aspect >= aspect {
        let width = (src_height as f64 * aspect).round() as u32;
        (width.clamp(1, src_width), src_height)
    } else {
        let height = (src_width as f64 / aspect).round() as u32;
        (src_width, height.clamp(1, src_height))
    }
}

fn clamp_offset(value: f64, max: u32) -> u32 {
    value.round().clamp(0.0, max as f64) as u32
}

/// Candidate origins: the centred window first, then one per thirds
/// intersection placed on the subject centroid, all clamped to the source
fn candidate_positions(
    src_width: u32,
    src_height: u32,
    window_width: u32,
    window_height: u32,
    centroid: (f64, f64),
) -> Vec<(u32, u32)> {
    let max_x = src_width - window_width;
    let max_y = src_height - window_height;
    let (cx, cy) = centroid;

    let mut candidates = vec![(max_x / 2, max_y / 2)];
    for (tx, ty) in thirds_points(0.0, 0.0, window_width as f64, window_height as f64) {
        candidates.push((clamp_offset(cx - tx, max_x), clamp_offset(cy - ty, max_y)));
    }
    candidates
}

/// Distance from `point` to the nearest thirds intersection of the window
fn thirds_distance(x: u32, y: u32, width: u32, height: u32, point: (f64, f64)) -> f64 {
    thirds_points(x as f64, y as f64, width as f64, height as f64)
        .iter()
        .map(|(tx, ty)| (tx - point.0).hypot(ty - point.1))
        .fold(f64::INFINITY, f64::min)
}

/// Lowest thirds distance wins; ties go to the window closest to the image
/// centre, then to candidate order
fn choose_position(
    src_width: u32,
    src_height: u32,
    window_width: u32,
    window_height: u32,
    centroid: (f64, f64),
) -> (u32, u32) {
    let image_center = (src_width as f64 / 2.0, src_height as f64 / 2.0);
    let rank = |&(x, y): &(u32, u32)| {
        let score = thirds_distance(x, y, window_width, window_height, centroid);
        let center_x = x as f64 + window_width as f64 / 2.0;
        let center_y = y as f64 + window_height as f64 / 2.0;
        let center_distance = (center_x - image_center.0).hypot(center_y - image_center.1);
        (score, center_distance)
    };

    let candidates =
        candidate_positions(src_width, src_height, window_width, window_height, centroid);
    let mut best = candidates[0];
    let mut best_rank = rank(&best);
    for candidate in candidates.iter().skip(1) {
        let (score, center_distance) = rank(candidate);
        let better = score < best_rank.0 - SCORE_EPSILON
            || ((score - best_rank.0).abs() <= SCORE_EPSILON
                && center_distance < best_rank.1 - SCORE_EPSILON);
        if better {
            best = *candidate;
            best_rank = (score, center_distance);
        }
    }
    best
}

/// Shift-only clamp into the source; the window size is never changed
fn finalize_window(
    x: u32,
    y: u32,
    width: u32,
    height: u32,
    src_width: u32,
    src_height: u32,
    target_aspect: f64,
) -> CropWindow {
    let width = width.min(src_width);
    let height = height.min(src_height);
    CropWindow {
        x: x.min(src_width - width),
        y: y.min(src_height - height),
        width,
        height,
        target_aspect,
    }
}

fn overlay<F>(base: &Option<RgbImage>, draw: F) -> DynamicImage
where
    F: FnOnce(&mut RgbImage),
{
    let mut canvas = base.clone().unwrap_or_default();
    draw(&mut canvas);
    DynamicImage::ImageRgb8(canvas)
}

fn outline(canvas: &mut RgbImage, b: &BoundingBox, color: Rgb<u8>) {
    let rect = Rect::at(b.x.round() as i32, b.y.round() as i32)
        .of_size((b.width.round() as u32).max(1), (b.height.round() as u32).max(1));
    draw_hollow_rect_mut(canvas, rect, color);
}

fn draw_thirds(canvas: &mut RgbImage, window: &BoundingBox) {
    let (left, top) = (window.x as f32, window.y as f32);
    let (right, bottom) = (window.right() as f32, window.bottom() as f32);
    for i in 1..=2 {
        let x = left + (right - left) * i as f32 / 3.0;
        let y = top + (bottom - top) * i as f32 / 3.0;
        draw_line_segment_mut(canvas, (x, top), (x, bottom), THIRDS_COLOR);
        draw_line_segment_mut(canvas, (left, y), (right, y), THIRDS_COLOR);
    }
}
