//! Curated image collection and the `generate` facade
//!
//! Images are addressed by 1-based id in file-name order. Non-random requests
//! are memoised in an LRU cache keyed on the request values.

use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use image::DynamicImage;
use lru::LruCache;
use rand::Rng;
use serde::{Deserialize, Serialize};
use slideforge_core::{
    Config, DetectionStrategy, FilterSpec, ImagingError, ImagingResult, QualityPreset,
};

use crate::compression::ImageCompressor;
use crate::image::{FilterRegistry, ImageProcessor, SmartCropEngine};
use crate::pipeline::{self, BatchConfig, BatchOutcome};

/// File extensions picked up when scanning a folder
pub const SUPPORTED_EXTENSIONS: [&str; 6] = ["jpg", "jpeg", "png", "webp", "bmp", "gif"];

/// Id served when none (or an out-of-range one) is requested
pub const DEFAULT_IMAGE_ID: usize = 1;

/// Parameters of a `generate` call
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerateRequest {
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub filter: Option<FilterSpec>,
    pub image_id: Option<usize>,
    pub random_selection: bool,
}

impl GenerateRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn size(mut self, width: Option<u32>, height: Option<u32>) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn image_id(mut self, id: usize) -> Self {
        self.image_id = Some(id);
        self
    }

    pub fn filter(mut self, spec: FilterSpec) -> Self {
        self.filter = Some(spec);
        self
    }

    pub fn random(mut self) -> Self {
        self.random_selection = true;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CacheKey {
    width: Option<u32>,
    height: Option<u32>,
    image_id: usize,
    filter: Option<String>,
}

/// A small, ordered set of source images with shared processing settings
#[derive(Debug)]
pub struct ImageCollection {
    images: Vec<PathBuf>,
    output_folder: PathBuf,
    strategy: DetectionStrategy,
    batch_parallel: bool,
    registry: Arc<FilterRegistry>,
    engine: Arc<SmartCropEngine>,
    cache: Option<Mutex<LruCache<CacheKey, DynamicImage>>>,
}

impl ImageCollection {
    /// Collect every supported image in `folder`, sorted by file name
    pub fn from_folder(folder: impl AsRef<Path>) -> ImagingResult<Self> {
        let folder = folder.as_ref();
        let folder_name = folder.display().to_string();
        let entries =
            std::fs::read_dir(folder).map_err(|e| ImagingError::load(&folder_name, e))?;

        let mut images = Vec::new();
        for entry in entries {
            let path = entry.map_err(|e| ImagingError::load(&folder_name, e))?.path();
            if path.is_file() && is_supported(&path) {
                images.push(path);
            }
        }
        images.sort_by(|a, b| a.file_name().cmp(&b.file_name()));

        tracing::debug!(folder = %folder_name, images = images.len(), "Scanned image folder");
        Self::from_paths(images)
    }

    /// Use an explicit, already ordered list of sources
    pub fn from_paths(images: Vec<PathBuf>) -> ImagingResult<Self> {
        if images.is_empty() {
            return Err(ImagingError::load("collection", "no source images found"));
        }
        Ok(Self {
            images,
            output_folder: PathBuf::from("output"),
            strategy: DetectionStrategy::default(),
            batch_parallel: true,
            registry: FilterRegistry::shared(),
            engine: Arc::new(SmartCropEngine::default()),
            cache: None,
        })
    }

    /// Collection over `config.images_folder` with every setting taken from `config`
    pub fn from_config(config: &Config) -> ImagingResult<Self> {
        let engine = SmartCropEngine::from_config(config)?;
        Ok(Self::from_folder(&config.images_folder)?
            .with_output_folder(&config.output_folder)
            .with_strategy(config.default_strategy)
            .with_batch_parallel(config.batch_parallel)
            .with_engine(Arc::new(engine))
            .with_cache_capacity(config.cache_capacity))
    }

    pub fn with_output_folder(mut self, folder: impl Into<PathBuf>) -> Self {
        self.output_folder = folder.into();
        self
    }

    pub fn with_strategy(mut self, strategy: DetectionStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn with_batch_parallel(mut self, parallel: bool) -> Self {
        self.batch_parallel = parallel;
        self
    }

    pub fn with_registry(mut self, registry: Arc<FilterRegistry>) -> Self {
        self.registry = registry;
        self
    }

    pub fn with_engine(mut self, engine: Arc<SmartCropEngine>) -> Self {
        self.engine = engine;
        self
    }

    /// Cache up to `capacity` generated images; 0 disables caching
    pub fn with_cache_capacity(mut self, capacity: usize) -> Self {
        self.cache = NonZeroUsize::new(capacity).map(|cap| Mutex::new(LruCache::new(cap)));
        self
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    pub fn paths(&self) -> &[PathBuf] {
        &self.images
    }

    pub fn output_folder(&self) -> &Path {
        &self.output_folder
    }

    pub fn strategy(&self) -> DetectionStrategy {
        self.strategy
    }

    pub fn registry(&self) -> &Arc<FilterRegistry> {
        &self.registry
    }

    pub fn engine(&self) -> &Arc<SmartCropEngine> {
        &self.engine
    }

    /// Path of the 1-based `image_id`, if it exists
    pub fn image_path(&self, image_id: usize) -> Option<&Path> {
        image_id
            .checked_sub(1)
            .and_then(|i| self.images.get(i))
            .map(PathBuf::as_path)
    }

    /// Pick the id to serve: random, requested, or the default
    pub fn resolve_id(&self, image_id: Option<usize>, random_selection: bool) -> usize {
        if random_selection {
            return rand::rng().random_range(1..=self.images.len());
        }
        match image_id {
            Some(id) if self.image_path(id).is_some() => id,
            Some(id) => {
                tracing::debug!(
                    image_id = id,
                    available = self.images.len(),
                    "Image id out of range, using default"
                );
                DEFAULT_IMAGE_ID
            }
            None => DEFAULT_IMAGE_ID,
        }
    }

    /// Load image `image_id` into a processor sharing this collection's settings
    pub fn open_image(&self, image_id: usize) -> ImagingResult<ImageProcessor> {
        let path = self.image_path(image_id).ok_or_else(|| {
            ImagingError::load(
                format!("image {}", image_id),
                format!("collection holds {} images", self.images.len()),
            )
        })?;
        Ok(ImageProcessor::open(path)?
            .with_registry(self.registry.clone())
            .with_engine(self.engine.clone()))
    }

    /// Produce an image for `request`, from the cache when possible
    pub fn generate(&self, request: &GenerateRequest) -> ImagingResult<DynamicImage> {
        let image_id = self.resolve_id(request.image_id, request.random_selection);
        let key = CacheKey {
            width: request.width,
            height: request.height,
            image_id,
            filter: request.filter.as_ref().map(FilterSpec::to_string),
        };

        let cache = self.cache.as_ref().filter(|_| !request.random_selection);
        if let Some(cache) = cache {
            let mut cache = cache.lock().unwrap_or_else(PoisonError::into_inner);
            if let Some(img) = cache.get(&key) {
                tracing::debug!(image_id, "Serving generated image from cache");
                return Ok(img.clone());
            }
        }

        let mut processor = self.open_image(image_id)?;
        processor.fit(request.width, request.height, self.strategy)?;
        if let Some(spec) = &request.filter {
            processor.apply_filter_spec(spec)?;
        }
        let img = processor.into_image();

        if let Some(cache) = cache {
            cache
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .put(key, img.clone());
        }
        Ok(img)
    }

    /// Generate and write the result to `path`
    pub fn generate_to_file(
        &self,
        request: &GenerateRequest,
        path: impl AsRef<Path>,
        quality: QualityPreset,
    ) -> ImagingResult<PathBuf> {
        let path = path.as_ref();
        let img = self.generate(request)?;
        ImageCompressor::save(&img, path, quality)?;
        Ok(path.to_path_buf())
    }

    /// Deterministic stand-in image for a missing or invalid slide image.
    ///
    /// Written once to `fallback_{width}x{height}.png` in the output folder and
    /// reused by later calls.
    pub fn generate_fallback_image(&self, width: u32, height: u32) -> ImagingResult<PathBuf> {
        let path = self
            .output_folder
            .join(format!("fallback_{}x{}.png", width, height));
        if path.is_file() {
            tracing::debug!(path = %path.display(), "Reusing fallback image");
            return Ok(path);
        }

        let request = GenerateRequest::new()
            .size(Some(width), Some(height))
            .image_id(DEFAULT_IMAGE_ID);
        self.generate_to_file(&request, &path, QualityPreset::Normal)
    }

    /// Process many independent configs; see [`pipeline::batch_process`]
    pub fn batch_process(&self, configs: &[BatchConfig]) -> Vec<BatchOutcome> {
        pipeline::batch_process(self, configs, self.batch_parallel)
    }

    #[cfg(test)]
    fn cached_len(&self) -> usize {
        self.cache
            .as_ref()
            .map(|c| c.lock().unwrap_or_else(PoisonError::into_inner).len())
            .unwrap_or(0)
    }
}

fn is_supported(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| SUPPORTED_EXTENSIONS.contains(&e.to_lowercase().as_str()))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GenericImageView, Rgb, RgbImage};
    use tempfile::TempDir;

    fn write_image(dir: &Path, name: &str, width: u32, height: u32, shade: u8) -> PathBuf {
        let path = dir.join(name);
        DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, Rgb([shade, shade, 90])))
            .save(&path)
            .unwrap();
        path
    }

    fn collection() -> (TempDir, ImageCollection) {
        let dir = tempfile::tempdir().unwrap();
        write_image(dir.path(), "b.png", 60, 40, 20);
        write_image(dir.path(), "a.png", 30, 60, 10);
        write_image(dir.path(), "c.jpg", 50, 50, 30);
        std::fs::write(dir.path().join("notes.txt"), b"not an image").unwrap();
        let collection = ImageCollection::from_folder(dir.path())
            .unwrap()
            .with_output_folder(dir.path().join("out"));
        (dir, collection)
    }

    #[test]
    fn test_scan_sorted_and_filtered() {
        let (_dir, collection) = collection();
        assert_eq!(collection.len(), 3);
        let names: Vec<_> = collection
            .paths()
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, ["a.png", "b.png", "c.jpg"]);
    }

    #[test]
    fn test_empty_folder_is_load_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            ImageCollection::from_folder(dir.path()),
            Err(ImagingError::Load { .. })
        ));
        assert!(ImageCollection::from_folder(dir.path().join("missing")).is_err());
    }

    #[test]
    fn test_resolve_id() {
        let (_dir, collection) = collection();
        assert_eq!(collection.resolve_id(Some(2), false), 2);
        assert_eq!(collection.resolve_id(Some(0), false), DEFAULT_IMAGE_ID);
        assert_eq!(collection.resolve_id(Some(99), false), DEFAULT_IMAGE_ID);
        assert_eq!(collection.resolve_id(None, false), DEFAULT_IMAGE_ID);
        for _ in 0..20 {
            let id = collection.resolve_id(Some(2), true);
            assert!((1..=3).contains(&id));
        }
    }

    #[test]
    fn test_generate_native_and_single_dimension() {
        let (_dir, collection) = collection();

        let native = collection.generate(&GenerateRequest::new().image_id(2)).unwrap();
        assert_eq!(native.dimensions(), (60, 40));

        let by_width = collection
            .generate(&GenerateRequest::new().image_id(2).size(Some(30), None))
            .unwrap();
        assert_eq!(by_width.dimensions(), (30, 20));

        let by_height = collection
            .generate(&GenerateRequest::new().image_id(1).size(None, Some(30)))
            .unwrap();
        assert_eq!(by_height.dimensions(), (15, 30));
    }

    #[test]
    fn test_generate_both_dimensions_smart_crops() {
        let (_dir, collection) = collection();
        let img = collection
            .generate(&GenerateRequest::new().image_id(3).size(Some(40), Some(10)))
            .unwrap();
        assert_eq!(img.dimensions(), (40, 10));
    }

    #[test]
    fn test_generate_applies_filter() {
        let (_dir, collection) = collection();
        let img = collection
            .generate(&GenerateRequest::new().image_id(1).filter(FilterSpec::new("invert")))
            .unwrap();
        assert_eq!(img.to_rgb8().get_pixel(0, 0), &Rgb([245, 245, 165]));

        let err = collection
            .generate(&GenerateRequest::new().filter(FilterSpec::new("nope")))
            .unwrap_err();
        assert!(matches!(err, ImagingError::UnknownFilter(_)));
    }

    #[test]
    fn test_cache_serves_repeated_requests() {
        let (dir, collection) = collection();
        let collection = collection.with_cache_capacity(4);
        let request = GenerateRequest::new().image_id(2).size(Some(30), None);

        let first = collection.generate(&request).unwrap();
        assert_eq!(collection.cached_len(), 1);

        // Served from cache even once the source is gone
        std::fs::remove_file(dir.path().join("b.png")).unwrap();
        let second = collection.generate(&request).unwrap();
        assert_eq!(first.as_bytes(), second.as_bytes());

        // Random requests bypass the cache entirely
        let _ = collection.generate(&GenerateRequest::new().random().image_id(1));
        assert_eq!(collection.cached_len(), 1);
    }

    #[test]
    fn test_cache_disabled_by_zero_capacity() {
        let (_dir, collection) = collection();
        let collection = collection.with_cache_capacity(0);
        collection.generate(&GenerateRequest::new()).unwrap();
        assert_eq!(collection.cached_len(), 0);
    }

    #[test]
    fn test_fallback_image_is_written_once() {
        let (dir, collection) = collection();
        let path = collection.generate_fallback_image(64, 36).unwrap();
        assert_eq!(path, dir.path().join("out").join("fallback_64x36.png"));
        assert_eq!(image::open(&path).unwrap().dimensions(), (64, 36));

        let modified = std::fs::metadata(&path).unwrap().modified().unwrap();
        let again = collection.generate_fallback_image(64, 36).unwrap();
        assert_eq!(again, path);
        assert_eq!(std::fs::metadata(&path).unwrap().modified().unwrap(), modified);
    }

    #[test]
    fn test_fallback_rejects_zero_size() {
        let (_dir, collection) = collection();
        assert!(matches!(
            collection.generate_fallback_image(0, 10),
            Err(ImagingError::InvalidDimension { .. })
        ));
    }

    #[test]
    fn test_from_config() {
        let (dir, _) = collection();
        let config = Config {
            images_folder: dir.path().to_path_buf(),
            output_folder: dir.path().join("generated"),
            cache_capacity: 2,
            default_strategy: DetectionStrategy::Contour,
            ..Config::default()
        };
        let collection = ImageCollection::from_config(&config).unwrap();
        assert_eq!(collection.len(), 3);
        assert_eq!(collection.strategy(), DetectionStrategy::Contour);
        assert_eq!(collection.output_folder(), dir.path().join("generated"));
    }
}
