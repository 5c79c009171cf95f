//! Input validation helpers

use crate::error::{ImagingError, ImagingResult};

/// Reject zero-sized targets.
///
/// `height` is optional because several operations derive it from the aspect
/// ratio; an omitted height is reported as 0 only when the width is invalid too.
pub fn validate_dimensions(width: u32, height: Option<u32>) -> ImagingResult<()> {
    if width == 0 || height == Some(0) {
        return Err(ImagingError::InvalidDimension {
            width,
            height: height.unwrap_or(0),
        });
    }
    Ok(())
}

/// Require `value` to lie in the open-closed interval (0, 1]
pub fn validate_fraction(name: &str, value: f64) -> ImagingResult<()> {
    if !(value > 0.0 && value <= 1.0) {
        return Err(ImagingError::InvalidParameter(format!(
            "{} must be in (0, 1], got {}",
            name, value
        )));
    }
    Ok(())
}

/// Require a finite, non-negative value
pub fn validate_non_negative(name: &str, value: f64) -> ImagingResult<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(ImagingError::InvalidParameter(format!(
            "{} must be a non-negative number, got {}",
            name, value
        )));
    }
    Ok(())
}
