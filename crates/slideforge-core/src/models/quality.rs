use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ImagingError;

/// Quality presets for image output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QualityPreset {
    #[default]
    Normal, // Default quality, balanced size and quality
    Better,   // Higher quality, ≈125% file size
    Best,     // Near pristine quality, ≈170% file size
    Lighter,  // Smaller files, ≈80% file size
    Lightest, // Maximum compression, ≈50% file size
}

impl QualityPreset {
    pub fn parse(s: &str) -> Result<Self, ImagingError> {
        match s.to_lowercase().as_str() {
            "normal" | "medium" => Ok(QualityPreset::Normal),
            "better" => Ok(QualityPreset::Better),
            "best" | "high" => Ok(QualityPreset::Best),
            "lighter" | "low" => Ok(QualityPreset::Lighter),
            "lightest" => Ok(QualityPreset::Lightest),
            _ => Err(ImagingError::InvalidParameter(format!(
                "Invalid quality preset: {}",
                s
            ))),
        }
    }

    /// Get quality value for JPEG (0-100)
    pub fn jpeg_quality(self) -> u8 {
        match self {
            QualityPreset::Normal => 75,
            QualityPreset::Better => 85,
            QualityPreset::Best => 95,
            QualityPreset::Lighter => 65,
            QualityPreset::Lightest => 50,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            QualityPreset::Normal => "normal",
            QualityPreset::Better => "better",
            QualityPreset::Best => "best",
            QualityPreset::Lighter => "lighter",
            QualityPreset::Lightest => "lightest",
        }
    }
}

impl FromStr for QualityPreset {
    type Err = ImagingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        QualityPreset::parse(s)
    }
}

impl fmt::Display for QualityPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
