//! Image processor - owned buffer with chainable operations

use std::io::Cursor;
use std::path::Path;
use std::sync::Arc;

use image::{DynamicImage, GenericImageView, ImageReader};
use slideforge_core::{
    CropWindow, DetectionStrategy, FilterSpec, ImagingError, ImagingResult, QualityPreset,
};

use super::filters::FilterRegistry;
use super::pixels::{channel_count, normalize_layout};
use super::resize::ImageResize;
use super::smart_crop::{SmartCropEngine, StepOutput};
use crate::compression::{ImageCompressor, OutputFormat};

/// Mutable single-buffer pipeline.
///
/// Every operation replaces the buffer only on success, so a failed call
/// leaves the processor exactly as it was.
#[derive(Debug)]
pub struct ImageProcessor {
    image: DynamicImage,
    registry: Arc<FilterRegistry>,
    engine: Arc<SmartCropEngine>,
    last_crop: Option<CropWindow>,
}

impl ImageProcessor {
    /// Decode an image file
    pub fn open(path: impl AsRef<Path>) -> ImagingResult<Self> {
        let path = path.as_ref();
        let source_name = path.display().to_string();
        let reader = ImageReader::open(path)
            .map_err(|e| ImagingError::load(&source_name, e))?
            .with_guessed_format()
            .map_err(|e| ImagingError::load(&source_name, e))?;
        let img = reader
            .decode()
            .map_err(|e| ImagingError::load(&source_name, e))?;
        tracing::debug!(path = %source_name, "Loaded image");
        Self::validated(img, &source_name)
    }

    /// Decode an in-memory image
    pub fn from_bytes(data: &[u8]) -> ImagingResult<Self> {
        let reader = ImageReader::new(Cursor::new(data))
            .with_guessed_format()
            .map_err(|e| ImagingError::load("bytes", e))?;
        let img = reader.decode().map_err(|e| ImagingError::load("bytes", e))?;
        Self::validated(img, "bytes")
    }

    pub fn from_image(img: DynamicImage) -> ImagingResult<Self> {
        Self::validated(img, "buffer")
    }

    fn validated(img: DynamicImage, source_name: &str) -> ImagingResult<Self> {
        let (width, height) = img.dimensions();
        if width == 0 || height == 0 {
            return Err(ImagingError::load(source_name, "image has zero size"));
        }
        Ok(Self {
            image: normalize_layout(img),
            registry: FilterRegistry::shared(),
            engine: Arc::new(SmartCropEngine::default()),
            last_crop: None,
        })
    }

    pub fn with_registry(mut self, registry: Arc<FilterRegistry>) -> Self {
        self.registry = registry;
        self
    }

    pub fn with_engine(mut self, engine: Arc<SmartCropEngine>) -> Self {
        self.engine = engine;
        self
    }

    /// Resize to `width`, deriving the height from the aspect ratio when omitted
    pub fn resize(&mut self, width: u32, height: Option<u32>) -> ImagingResult<&mut Self> {
        let (orig_width, orig_height) = self.image.dimensions();
        let (new_width, new_height) =
            ImageResize::calculate_dimensions(orig_width, orig_height, Some(width), height)?;
        self.image = ImageResize::resize_image(&self.image, new_width, new_height);
        tracing::debug!(
            from_width = orig_width,
            from_height = orig_height,
            width = new_width,
            height = new_height,
            "Resized image"
        );
        Ok(self)
    }

    /// Apply a named filter with optional numeric parameters
    pub fn apply_filter(&mut self, name: &str, params: &[(&str, f64)]) -> ImagingResult<&mut Self> {
        self.image = self.registry.apply_named(&self.image, name, params)?;
        Ok(self)
    }

    pub fn apply_filter_spec(&mut self, spec: &FilterSpec) -> ImagingResult<&mut Self> {
        self.image = self.registry.apply(&self.image, spec)?;
        Ok(self)
    }

    /// Crop around the detected subject to exactly `width` x `height`.
    ///
    /// Without a height the source aspect ratio is kept.
    pub fn smart_crop(
        &mut self,
        width: u32,
        height: Option<u32>,
        strategy: DetectionStrategy,
        steps: Option<&StepOutput>,
    ) -> ImagingResult<&mut Self> {
        let (orig_width, orig_height) = self.image.dimensions();
        let (target_width, target_height) =
            ImageResize::calculate_dimensions(orig_width, orig_height, Some(width), height)?;
        let outcome = self
            .engine
            .crop(&self.image, target_width, target_height, strategy, steps)?;
        self.image = outcome.image;
        self.last_crop = Some(outcome.window);
        Ok(self)
    }

    /// Size the buffer from optional target dimensions.
    ///
    /// Neither: unchanged. One: plain resize keeping the aspect ratio. Both:
    /// smart crop to the exact size.
    pub fn fit(
        &mut self,
        width: Option<u32>,
        height: Option<u32>,
        strategy: DetectionStrategy,
    ) -> ImagingResult<&mut Self> {
        match (width, height) {
            (None, None) => Ok(self),
            (Some(w), Some(h)) => self.smart_crop(w, Some(h), strategy, None),
            (Some(w), None) => self.resize(w, None),
            (None, Some(h)) => {
                let (orig_width, orig_height) = self.image.dimensions();
                let (w, h) =
                    ImageResize::calculate_dimensions(orig_width, orig_height, None, Some(h))?;
                self.resize(w, Some(h))
            }
        }
    }

    /// Encode to `path` with the format chosen by its extension.
    ///
    /// `quality` only sets the JPEG encoder quality. It never changes the
    /// pixels: resampling always uses the filters chosen by `resize` and
    /// `smart_crop`, and lossless formats ignore it.
    pub fn save(&self, path: impl AsRef<Path>, quality: QualityPreset) -> ImagingResult<OutputFormat> {
        ImageCompressor::save(&self.image, path.as_ref(), quality)
    }

    /// Window used by the most recent successful `smart_crop`
    pub fn last_crop(&self) -> Option<CropWindow> {
        self.last_crop
    }

    pub fn image(&self) -> &DynamicImage {
        &self.image
    }

    pub fn into_image(self) -> DynamicImage {
        self.image
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    pub fn channel_count(&self) -> u8 {
        channel_count(&self.image)
    }
}
