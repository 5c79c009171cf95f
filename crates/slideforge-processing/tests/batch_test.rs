mod helpers;

use helpers::fixtures::{six_image_collection, write_slide};
use slideforge_core::{DetectionStrategy, FilterSpec, ImagingError};
use slideforge_processing::pipeline::load_batch_file;
use slideforge_processing::{batch_process, BatchConfig, BatchSource};

fn five_configs(out: &std::path::Path) -> Vec<BatchConfig> {
    let mut configs: Vec<BatchConfig> = (1..=5)
        .map(|id| {
            let mut config = BatchConfig::new(BatchSource::ImageId(id));
            config.width = Some(100);
            config.height = Some(60);
            config.strategy = Some(DetectionStrategy::Contour);
            config.filters = vec![FilterSpec::new("sepia")];
            config.output = Some(out.join(format!("batch_{}.png", id)));
            config
        })
        .collect();
    configs[2].filters = vec![FilterSpec::new("does_not_exist")];
    configs
}

fn assert_one_failure_at_third(outcomes: &[slideforge_processing::BatchOutcome]) {
    assert_eq!(outcomes.len(), 5);
    for (position, outcome) in outcomes.iter().enumerate() {
        assert_eq!(outcome.index, position);
    }
    assert_eq!(outcomes.iter().filter(|o| o.is_success()).count(), 4);

    let failed = &outcomes[2];
    assert!(!failed.is_success());
    assert!(failed.error.as_deref().unwrap().contains("does_not_exist"));
    assert!(failed.output.is_none());

    for outcome in &outcomes[3..] {
        assert!(outcome.is_success());
        assert_eq!((outcome.width, outcome.height), (Some(100), Some(60)));
        assert!(outcome.output.as_ref().unwrap().is_file());
    }
}

#[test]
fn test_batch_failure_is_isolated_sequential() {
    let (dir, collection) = six_image_collection();
    let out = dir.path().join("seq");
    let outcomes = batch_process(&collection, &five_configs(&out), false);
    assert_one_failure_at_third(&outcomes);
    assert!(!out.join("batch_3.png").exists());
}

#[test]
fn test_batch_failure_is_isolated_parallel() {
    let (dir, collection) = six_image_collection();
    let out = dir.path().join("par");
    let outcomes = collection
        .with_batch_parallel(true)
        .batch_process(&five_configs(&out));
    assert_one_failure_at_third(&outcomes);
}

#[test]
fn test_batch_path_sources_and_missing_file() {
    let (dir, collection) = six_image_collection();
    let extra = write_slide(dir.path(), "extra.bmp", 90, 45);

    let mut resized = BatchConfig::new(BatchSource::Path(extra));
    resized.width = Some(30);
    let missing = BatchConfig::new(BatchSource::Path(dir.path().join("gone.png")));

    let outcomes = batch_process(&collection, &[resized, missing], false);
    assert!(outcomes[0].is_success());
    assert_eq!((outcomes[0].width, outcomes[0].height), (Some(30), Some(15)));
    assert!(outcomes[0].output.is_none());
    assert!(!outcomes[1].is_success());
    assert!(outcomes[1].source.ends_with("gone.png"));
}

#[test]
fn test_empty_batch() {
    let (_dir, collection) = six_image_collection();
    assert!(collection.batch_process(&[]).is_empty());
}

#[test]
fn test_batch_file_round_trip_through_processing() {
    let (dir, collection) = six_image_collection();
    let file = dir.path().join("batch.json");
    std::fs::write(
        &file,
        r#"[
            {"source": {"image_id": 4}, "height": 150, "filters": [{"name": "brightness", "params": {"percent": 120}}]},
            {"source": {"image_id": 5}, "width": 64, "height": 64, "strategy": "contour"}
        ]"#,
    )
    .unwrap();

    let configs = load_batch_file(&file).unwrap();
    let outcomes = collection.batch_process(&configs);
    assert_eq!((outcomes[0].width, outcomes[0].height), (Some(100), Some(150)));
    assert_eq!((outcomes[1].width, outcomes[1].height), (Some(64), Some(64)));

    std::fs::write(&file, r#"[{"width": 10}]"#).unwrap();
    assert!(matches!(
        load_batch_file(&file),
        Err(ImagingError::InvalidParameter(_))
    ));
}
