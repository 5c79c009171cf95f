//! Slideforge Core Library
//!
//! This crate provides the error taxonomy, configuration, shared value types and
//! validation used by the image pipeline and its command-line front end.

pub mod config;
pub mod error;
pub mod models;
pub mod validation;

// Re-export commonly used types
pub use config::Config;
pub use error::{ImagingError, ImagingResult, LogLevel};
pub use models::{
    BoundingBox, CropWindow, DetectionMethod, DetectionStrategy, FilterSpec, QualityPreset,
    SmartCropParams,
};
