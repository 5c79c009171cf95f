//! Slideforge Image Processing Library
//!
//! This crate provides the filter registry, the chainable image processor, the
//! smart-crop engine and the curated image collection used to illustrate slides.

pub mod collection;
pub mod compression;
pub mod image;
pub mod pipeline;

// Re-export commonly used types
pub use collection::{GenerateRequest, ImageCollection};
pub use compression::{ImageCompressor, OutputFormat};
pub use image::{
    CustomFilter, DetectionResult, FaceBounds, FaceDetector, Filter, FilterRegistry,
    ImageProcessor, ImageResize, ResizeDimensions, SmartCropEngine, SmartCropOutcome, StepOutput,
};
#[cfg(feature = "rustface")]
pub use image::RustfaceDetector;
pub use pipeline::{batch_process, BatchConfig, BatchOutcome, BatchSource};
