//! Error types module
//!
//! All failures of the image pipeline are unified under [`ImagingError`]. These
//! are configuration or programmer errors and are always returned to the caller.
//! "No subject detected" is deliberately absent: the crop engine degrades to a
//! full-frame crop instead.

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Debug level - for expected errors like validation failures
    Debug,
    /// Warning level - for bad input that the caller can fix
    Warn,
    /// Error level - for unexpected failures
    Error,
}

#[derive(Debug, thiserror::Error)]
pub enum ImagingError {
    #[error("Failed to load image from {source_name}: {reason}")]
    Load { source_name: String, reason: String },

    #[error("Invalid dimensions {width}x{height}: width and height must be greater than zero")]
    InvalidDimension { width: u32, height: u32 },

    #[error("Unknown filter: {0}")]
    UnknownFilter(String),

    #[error("Unknown detection strategy: {0}")]
    UnknownStrategy(String),

    #[error("Failed to save image to {path}: {reason}")]
    Save { path: String, reason: String },

    #[error("Invalid parameter '{param}' for filter '{filter}': {reason}")]
    InvalidFilterParameter {
        filter: String,
        param: String,
        reason: String,
    },

    #[error("Invalid filter spec '{spec}': {reason}")]
    InvalidFilterSpec { spec: String, reason: String },

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
}

pub type ImagingResult<T> = Result<T, ImagingError>;

impl ImagingError {
    pub fn load(source_name: impl Into<String>, reason: impl ToString) -> Self {
        ImagingError::Load {
            source_name: source_name.into(),
            reason: reason.to_string(),
        }
    }

    pub fn save(path: impl Into<String>, reason: impl ToString) -> Self {
        ImagingError::Save {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    /// Machine-readable error code (e.g., "UNKNOWN_FILTER")
    pub fn error_code(&self) -> &'static str {
        match self {
            ImagingError::Load { .. } => "LOAD_ERROR",
            ImagingError::InvalidDimension { .. } => "INVALID_DIMENSION",
            ImagingError::UnknownFilter(_) => "UNKNOWN_FILTER",
            ImagingError::UnknownStrategy(_) => "UNKNOWN_STRATEGY",
            ImagingError::Save { .. } => "SAVE_ERROR",
            ImagingError::InvalidFilterParameter { .. } => "INVALID_FILTER_PARAMETER",
            ImagingError::InvalidFilterSpec { .. } => "INVALID_FILTER_SPEC",
            ImagingError::InvalidParameter(_) => "INVALID_PARAMETER",
        }
    }

    /// Log level for this error
    pub fn log_level(&self) -> LogLevel {
        match self {
            ImagingError::Load { .. } | ImagingError::Save { .. } => LogLevel::Error,
            ImagingError::InvalidDimension { .. }
            | ImagingError::UnknownFilter(_)
            | ImagingError::UnknownStrategy(_)
            | ImagingError::InvalidFilterParameter { .. }
            | ImagingError::InvalidFilterSpec { .. } => LogLevel::Warn,
            ImagingError::InvalidParameter(_) => LogLevel::Debug,
        }
    }
}

impl From<serde_json::Error> for ImagingError {
    fn from(err: serde_json::Error) -> Self {
        ImagingError::InvalidParameter(format!("JSON parsing error: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(
            ImagingError::UnknownFilter("x".into()).error_code(),
            "UNKNOWN_FILTER"
        );
        assert_eq!(
            ImagingError::InvalidDimension {
                width: 0,
                height: 10
            }
            .error_code(),
            "INVALID_DIMENSION"
        );
        assert_eq!(ImagingError::load("a.png", "missing").error_code(), "LOAD_ERROR");
    }

    #[test]
    fn test_display_names_input() {
        let err = ImagingError::UnknownStrategy("saliency".into());
        assert_eq!(err.to_string(), "Unknown detection strategy: saliency");

        let err = ImagingError::save("/tmp/out.tiff", "unsupported extension");
        assert!(err.to_string().contains("/tmp/out.tiff"));
    }

    #[test]
    fn test_log_levels() {
        assert_eq!(ImagingError::load("a", "b").log_level(), LogLevel::Error);
        assert_eq!(
            ImagingError::UnknownFilter("x".into()).log_level(),
            LogLevel::Warn
        );
    }
}
