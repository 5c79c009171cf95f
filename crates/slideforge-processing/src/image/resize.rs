use std::str::FromStr;

use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView};
use slideforge_core::validation::validate_dimensions;
use slideforge_core::ImagingResult;

/// Resize dimensions specification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResizeDimensions {
    pub width: Option<u32>,
    pub height: Option<u32>,
}

impl ResizeDimensions {
    /// Parse dimensions from string format: "WxH", "Wx", or "xH"
    pub fn parse(s: &str) -> Result<Self, String> {
        let parts: Vec<&str> = s.trim().split('x').collect();

        if parts.len() != 2 {
            return Err("Invalid dimensions format. Expected: WxH, Wx, or xH".to_string());
        }

        let parse_part = |part: &str, label: &str| -> Result<Option<u32>, String> {
            if part.is_empty() {
                return Ok(None);
            }
            match part.parse::<u32>() {
                Ok(0) => Err(format!("{} must be greater than zero", label)),
                Ok(v) => Ok(Some(v)),
                Err(_) => Err(format!("Invalid {}: {}", label, part)),
            }
        };

        let width = parse_part(parts[0], "width")?;
        let height = parse_part(parts[1], "height")?;

        if width.is_none() && height.is_none() {
            return Err("At least one dimension must be specified".to_string());
        }

        Ok(ResizeDimensions { width, height })
    }
}

impl FromStr for ResizeDimensions {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ResizeDimensions::parse(s)
    }
}

/// Image resize operations
pub struct ImageResize;

impl ImageResize {
    /// Resolve requested dimensions against the native size.
    ///
    /// Both given: used as-is. One given: the other keeps the native aspect
    /// ratio (rounded, at least 1). None: native size.
    pub fn calculate_dimensions(
        orig_width: u32,
        orig_height: u32,
        width: Option<u32>,
        height: Option<u32>,
    ) -> ImagingResult<(u32, u32)> {
        match (width, height) {
            (Some(w), h) => validate_dimensions(w, h)?,
            (None, Some(h)) => validate_dimensions(h, None)?,
            (None, None) => {}
        }

        Ok(match (width, height) {
            (Some(w), Some(h)) => (w, h),
            (Some(w), None) => {
                let aspect_ratio = orig_height as f64 / orig_width as f64;
                let h = (w as f64 * aspect_ratio).round() as u32;
                (w, h.max(1))
            }
            (None, Some(h)) => {
                let aspect_ratio = orig_width as f64 / orig_height as f64;
                let w = (h as f64 * aspect_ratio).round() as u32;
                (w.max(1), h)
            }
            (None, None) => (orig_width, orig_height),
        })
    }

    /// Select appropriate filter type based on resize ratio
    pub fn select_filter(
        orig_width: u32,
        orig_height: u32,
        new_width: u32,
        new_height: u32,
    ) -> FilterType {
        let width_ratio = orig_width as f32 / new_width as f32;
        let height_ratio = orig_height as f32 / new_height as f32;
        let max_ratio = width_ratio.max(height_ratio);

        if max_ratio > 2.0 {
            FilterType::Triangle
        } else if max_ratio > 1.5 {
            FilterType::CatmullRom
        } else {
            FilterType::Lanczos3
        }
    }

    /// Resize image to exact dimensions, picking the filter from the scale ratio
    pub fn resize_image(img: &DynamicImage, width: u32, height: u32) -> DynamicImage {
        let (orig_width, orig_height) = img.dimensions();
        if (orig_width, orig_height) == (width, height) {
            return img.clone();
        }
        let filter = Self::select_filter(orig_width, orig_height, width, height);
        img.resize_exact(width, height, filter)
    }

    /// Resize image to exact dimensions with Lanczos3 regardless of ratio
    pub fn resize_high_quality(img: &DynamicImage, width: u32, height: u32) -> DynamicImage {
        if img.dimensions() == (width, height) {
            return img.clone();
        }
        img.resize_exact(width, height, FilterType::Lanczos3)
    }
}
