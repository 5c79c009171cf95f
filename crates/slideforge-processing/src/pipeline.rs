//! Batch processing of independent image requests

use std::path::{Path, PathBuf};

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use slideforge_core::{
    DetectionStrategy, FilterSpec, ImagingError, ImagingResult, LogLevel, QualityPreset,
};

use crate::collection::ImageCollection;
use crate::image::ImageProcessor;

/// Where a batch item reads its pixels from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BatchSource {
    /// Image file on disk
    Path(PathBuf),
    /// 1-based id in the collection
    ImageId(usize),
}

impl BatchSource {
    pub fn describe(&self) -> String {
        match self {
            BatchSource::Path(path) => path.display().to_string(),
            BatchSource::ImageId(id) => format!("image {}", id),
        }
    }
}

/// One item of a batch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchConfig {
    pub source: BatchSource,
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
    #[serde(default)]
    pub filters: Vec<FilterSpec>,
    #[serde(default)]
    pub strategy: Option<DetectionStrategy>,
    #[serde(default)]
    pub output: Option<PathBuf>,
    #[serde(default)]
    pub quality: QualityPreset,
}

impl BatchConfig {
    pub fn new(source: BatchSource) -> Self {
        Self {
            source,
            width: None,
            height: None,
            filters: Vec::new(),
            strategy: None,
            output: None,
            quality: QualityPreset::default(),
        }
    }
}

/// Result of one batch item, reported at the item's input position
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchOutcome {
    /// 0-based position of the config in the batch
    pub index: usize,
    pub source: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl BatchOutcome {
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

/// Read a JSON array of [`BatchConfig`]s
pub fn load_batch_file(path: &Path) -> ImagingResult<Vec<BatchConfig>> {
    let file = std::fs::File::open(path)
        .map_err(|e| ImagingError::load(path.display().to_string(), e))?;
    let configs = serde_json::from_reader(std::io::BufReader::new(file))?;
    Ok(configs)
}

/// Run every config with its own processor.
///
/// Outcomes are returned in input order whether or not `parallel` is set. A
/// failing item records its error and never aborts the rest.
pub fn batch_process(
    collection: &ImageCollection,
    configs: &[BatchConfig],
    parallel: bool,
) -> Vec<BatchOutcome> {
    tracing::debug!(count = configs.len(), parallel, "Starting batch");

    let run = |(index, config): (usize, &BatchConfig)| run_one(collection, index, config);
    let outcomes: Vec<BatchOutcome> = if parallel {
        configs.par_iter().enumerate().map(run).collect()
    } else {
        configs.iter().enumerate().map(run).collect()
    };

    let failed = outcomes.iter().filter(|o| !o.is_success()).count();
    tracing::info!(
        total = outcomes.len(),
        succeeded = outcomes.len() - failed,
        failed,
        "Batch complete"
    );
    outcomes
}

fn run_one(collection: &ImageCollection, index: usize, config: &BatchConfig) -> BatchOutcome {
    let source = config.source.describe();
    match process_config(collection, config) {
        Ok(((width, height), output)) => BatchOutcome {
            index,
            source,
            width: Some(width),
            height: Some(height),
            output,
            error: None,
        },
        Err(e) => {
            match e.log_level() {
                LogLevel::Debug => tracing::debug!(
                    index,
                    source = %source,
                    error_code = e.error_code(),
                    error = %e,
                    "Batch item rejected"
                ),
                LogLevel::Warn => tracing::warn!(
                    index,
                    source = %source,
                    error_code = e.error_code(),
                    error = %e,
                    "Batch item failed"
                ),
                LogLevel::Error => tracing::error!(
                    index,
                    source = %source,
                    error_code = e.error_code(),
                    error = %e,
                    "Batch item failed"
                ),
            }
            BatchOutcome {
                index,
                source,
                width: None,
                height: None,
                output: None,
                error: Some(e.to_string()),
            }
        }
    }
}

fn process_config(
    collection: &ImageCollection,
    config: &BatchConfig,
) -> ImagingResult<((u32, u32), Option<PathBuf>)> {
    let mut processor = match &config.source {
        BatchSource::Path(path) => ImageProcessor::open(path)?
            .with_registry(collection.registry().clone())
            .with_engine(collection.engine().clone()),
        BatchSource::ImageId(id) => collection.open_image(*id)?,
    };

    let strategy = config.strategy.unwrap_or(collection.strategy());
    processor.fit(config.width, config.height, strategy)?;
    for spec in &config.filters {
        processor.apply_filter_spec(spec)?;
    }

    if let Some(output) = &config.output {
        processor.save(output, config.quality)?;
    }
    Ok((processor.dimensions(), config.output.clone()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_from_json_defaults() {
        let json = r#"[
            {"source": {"image_id": 2}, "width": 300},
            {"source": {"path": "slides/a.png"}, "filters": [{"name": "blur", "params": {"strength": 3}}],
             "strategy": "contour", "output": "out/a.jpg", "quality": "best"}
        ]"#;
        let configs: Vec<BatchConfig> = serde_json::from_str(json).unwrap();

        assert_eq!(configs[0].source, BatchSource::ImageId(2));
        assert_eq!(configs[0].width, Some(300));
        assert_eq!(configs[0].height, None);
        assert!(configs[0].filters.is_empty());
        assert_eq!(configs[0].quality, QualityPreset::Normal);

        assert_eq!(configs[1].source, BatchSource::Path(PathBuf::from("slides/a.png")));
        assert_eq!(configs[1].filters[0], FilterSpec::new("blur").with_param("strength", 3.0));
        assert_eq!(configs[1].strategy, Some(DetectionStrategy::Contour));
        assert_eq!(configs[1].quality, QualityPreset::Best);
    }

    #[test]
    fn test_outcome_serialization_skips_empty_fields() {
        let outcome = BatchOutcome {
            index: 2,
            source: "image 1".to_string(),
            width: None,
            height: None,
            output: None,
            error: Some("Unknown filter: nope".to_string()),
        };
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["index"], 2);
        assert!(json.get("width").is_none());
        assert_eq!(json["error"], "Unknown filter: nope");
    }

    #[test]
    fn test_load_batch_file_errors() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            load_batch_file(&dir.path().join("missing.json")),
            Err(ImagingError::Load { .. })
        ));

        let bad = dir.path().join("bad.json");
        std::fs::write(&bad, "{not json").unwrap();
        assert!(matches!(
            load_batch_file(&bad),
            Err(ImagingError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_failed_items_carry_their_log_level() {
        let dir = tempfile::tempdir().unwrap();
        let slide = dir.path().join("slide.png");
        image::RgbImage::from_pixel(40, 30, image::Rgb([90, 120, 150]))
            .save(&slide)
            .unwrap();
        let collection = ImageCollection::from_paths(vec![slide]).unwrap();

        let mut unknown_filter = BatchConfig::new(BatchSource::ImageId(1));
        unknown_filter.filters.push(FilterSpec::new("nope"));
        let err = process_config(&collection, &unknown_filter).unwrap_err();
        assert!(matches!(err, ImagingError::UnknownFilter(_)));
        assert_eq!(err.log_level(), LogLevel::Warn);

        let missing = BatchConfig::new(BatchSource::Path(dir.path().join("missing.png")));
        let err = process_config(&collection, &missing).unwrap_err();
        assert!(matches!(err, ImagingError::Load { .. }));
        assert_eq!(err.log_level(), LogLevel::Error);

        let outcome = run_one(&collection, 4, &missing);
        assert_eq!(outcome.index, 4);
        assert!(!outcome.is_success());
        assert!(outcome.width.is_none());
    }
}
