//! Configuration module
//!
//! Settings are read from the environment (and a `.env` file when present).
//! Every variable is optional; the constants below are the defaults.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use crate::models::{DetectionStrategy, QualityPreset, SmartCropParams};

const IMAGES_FOLDER: &str = "images";
const OUTPUT_FOLDER: &str = "output";
const CACHE_CAPACITY: usize = 32;

/// Image pipeline configuration
#[derive(Clone, Debug)]
pub struct Config {
    /// Folder holding the curated source images
    pub images_folder: PathBuf,
    /// Folder receiving generated, fallback and diagnostic images
    pub output_folder: PathBuf,
    /// Entries kept by the generation cache (0 disables caching)
    pub cache_capacity: usize,
    pub default_quality: QualityPreset,
    pub default_strategy: DetectionStrategy,
    /// Process batch entries on the rayon thread pool
    pub batch_parallel: bool,
    /// SeetaFace model used by the optional face detector backend
    pub face_model_path: Option<PathBuf>,
    pub crop: SmartCropParams,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            images_folder: PathBuf::from(IMAGES_FOLDER),
            output_folder: PathBuf::from(OUTPUT_FOLDER),
            cache_capacity: CACHE_CAPACITY,
            default_quality: QualityPreset::default(),
            default_strategy: DetectionStrategy::default(),
            batch_parallel: true,
            face_model_path: None,
            crop: SmartCropParams::default(),
        }
    }
}

/// Parse an optional variable, falling back to `default` when unset.
///
/// A variable that is set but malformed is an error rather than silently ignored.
fn env_or<T>(key: &str, default: T) -> Result<T, anyhow::Error>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse::<T>()
            .map_err(|e| anyhow::anyhow!("Invalid value for {}: {} ({})", key, raw, e)),
        _ => Ok(default),
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

impl Config {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        let defaults = Config::default();
        let crop_defaults = defaults.crop;

        let batch_parallel = match env::var("SLIDEFORGE_BATCH_PARALLEL") {
            Ok(raw) => parse_bool(&raw).ok_or_else(|| {
                anyhow::anyhow!("Invalid value for SLIDEFORGE_BATCH_PARALLEL: {}", raw)
            })?,
            Err(_) => defaults.batch_parallel,
        };

        let crop = SmartCropParams {
            blur_sigma: env_or("SLIDEFORGE_BLUR_SIGMA", crop_defaults.blur_sigma)?,
            canny_low: env_or("SLIDEFORGE_CANNY_LOW", crop_defaults.canny_low)?,
            canny_high: env_or("SLIDEFORGE_CANNY_HIGH", crop_defaults.canny_high)?,
            min_subject_fraction: env_or(
                "SLIDEFORGE_MIN_SUBJECT_FRACTION",
                crop_defaults.min_subject_fraction,
            )?,
            min_contour_fraction: env_or(
                "SLIDEFORGE_MIN_CONTOUR_FRACTION",
                crop_defaults.min_contour_fraction,
            )?,
            face_margin: env_or("SLIDEFORGE_FACE_MARGIN", crop_defaults.face_margin)?,
            face_confidence_ratio: env_or(
                "SLIDEFORGE_FACE_CONFIDENCE_RATIO",
                crop_defaults.face_confidence_ratio,
            )?,
            analysis_max_dimension: env_or(
                "SLIDEFORGE_ANALYSIS_MAX_DIMENSION",
                crop_defaults.analysis_max_dimension,
            )?,
            face_min_size: env_or("SLIDEFORGE_FACE_MIN_SIZE", crop_defaults.face_min_size)?,
            face_score_threshold: env_or(
                "SLIDEFORGE_FACE_SCORE_THRESHOLD",
                crop_defaults.face_score_threshold,
            )?,
            face_pyramid_scale: env_or(
                "SLIDEFORGE_FACE_PYRAMID_SCALE",
                crop_defaults.face_pyramid_scale,
            )?,
            face_window_step: env_or(
                "SLIDEFORGE_FACE_WINDOW_STEP",
                crop_defaults.face_window_step,
            )?,
        };

        let config = Config {
            images_folder: env_or("SLIDEFORGE_IMAGES_FOLDER", defaults.images_folder)?,
            output_folder: env_or("SLIDEFORGE_OUTPUT_FOLDER", defaults.output_folder)?,
            cache_capacity: env_or("SLIDEFORGE_CACHE_CAPACITY", defaults.cache_capacity)?,
            default_quality: env_or("SLIDEFORGE_QUALITY", defaults.default_quality)?,
            default_strategy: env_or("SLIDEFORGE_STRATEGY", defaults.default_strategy)?,
            batch_parallel,
            face_model_path: env::var("SLIDEFORGE_FACE_MODEL")
                .ok()
                .filter(|s| !s.trim().is_empty())
                .map(PathBuf::from),
            crop,
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        self.crop.validate()?;
        if let Some(model) = &self.face_model_path {
            if !model.is_file() {
                return Err(anyhow::anyhow!(
                    "SLIDEFORGE_FACE_MODEL does not point to a file: {}",
                    model.display()
                ));
            }
        }
        Ok(())
    }
}
