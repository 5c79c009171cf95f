use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ImagingError;

/// Subject detection strategy used by the smart crop engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum DetectionStrategy {
    /// Face detector first, falling back to the largest contour
    #[default]
    #[serde(rename = "haar-face")]
    HaarFace,
    /// Largest contour of the edge map only
    #[serde(rename = "contour")]
    Contour,
}

impl DetectionStrategy {
    pub fn as_str(self) -> &'static str {
        match self {
            DetectionStrategy::HaarFace => "haar-face",
            DetectionStrategy::Contour => "contour",
        }
    }
}

impl FromStr for DetectionStrategy {
    type Err = ImagingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "haar-face" | "haar_face" | "face" => Ok(DetectionStrategy::HaarFace),
            "contour" => Ok(DetectionStrategy::Contour),
            other => Err(ImagingError::UnknownStrategy(other.to_string())),
        }
    }
}

impl fmt::Display for DetectionStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How the subject box of a crop was obtained
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DetectionMethod {
    Face,
    Contour,
    /// Nothing found; the whole frame is the subject
    None,
}

impl DetectionMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            DetectionMethod::Face => "face",
            DetectionMethod::Contour => "contour",
            DetectionMethod::None => "none",
        }
    }
}
