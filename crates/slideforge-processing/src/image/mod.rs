//! Image processing module
//!
//! This module provides the image pipeline:
//! - Owned, chainable buffer operations (processor)
//! - Pixel filters and the name-keyed registry (filters, pixels)
//! - Resizing helpers (resize)
//! - Subject detection and rule-of-thirds cropping (detection, smart_crop)

pub mod detection;
pub mod filters;
pub mod pixels;
pub mod processor;
pub mod resize;
#[cfg(feature = "rustface")]
pub mod rustface_backend;
pub mod smart_crop;

pub use processor::ImageProcessor;

// Re-export commonly used types
pub use detection::{DetectionResult, FaceBounds, FaceDetector};
pub use filters::{CustomFilter, Filter, FilterRegistry};
pub use resize::{ImageResize, ResizeDimensions};
#[cfg(feature = "rustface")]
pub use rustface_backend::RustfaceDetector;
pub use smart_crop::{CropAnalysis, ProcessingStep, SmartCropEngine, SmartCropOutcome, StepOutput};
