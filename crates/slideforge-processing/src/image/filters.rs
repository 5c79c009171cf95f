//! Pure pixel filters and the name-based registry in front of them
//!
//! Built-in filters form the closed [`Filter`] enum. Anything else plugs in
//! through the [`CustomFilter`] trait and is looked up by name in a
//! [`FilterRegistry`]. Every filter returns a new buffer and leaves its input
//! untouched.

use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

use image::{DynamicImage, GenericImageView, ImageBuffer, Pixel};
use slideforge_core::models::POSITIONAL_PARAM;
use slideforge_core::{FilterSpec, ImagingError, ImagingResult};

use crate::image::pixels::{
    blend, clamp_u8, convolve3x3, luma, map_rgb, match_layout, normalize_layout,
};

const DEFAULT_BLUR_STRENGTH: f32 = 2.0;
const DEFAULT_BRIGHTNESS: f32 = 120.0;
const DEFAULT_CONTRAST: f32 = 120.0;
const DEFAULT_SATURATION: f32 = 130.0;
const DEFAULT_SHARPNESS: f32 = 200.0;
const DEFAULT_PIXELATE_BLOCK: u32 = 10;

const SMOOTH_KERNEL: [f32; 9] = [1.0, 1.0, 1.0, 1.0, 5.0, 1.0, 1.0, 1.0, 1.0];
const EDGE_ENHANCE_KERNEL: [f32; 9] = [-1.0, -1.0, -1.0, -1.0, 10.0, -1.0, -1.0, -1.0, -1.0];
const EDGE_ENHANCE_MORE_KERNEL: [f32; 9] = [-1.0, -1.0, -1.0, -1.0, 9.0, -1.0, -1.0, -1.0, -1.0];

/// Built-in filters with their resolved parameters.
///
/// Percent parameters treat 100 as "unchanged".
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Filter {
    Grayscale,
    Sepia,
    Invert,
    Blur { strength: f32 },
    Brightness { percent: f32 },
    Contrast { percent: f32 },
    Saturation { percent: f32 },
    Sharpness { percent: f32 },
    Pixelate { block_size: u32 },
    EdgeEnhance,
    EdgeEnhanceMore,
}

impl Filter {
    pub const BUILTIN_NAMES: [&'static str; 11] = [
        "grayscale",
        "sepia",
        "invert",
        "blur",
        "brightness",
        "contrast",
        "saturation",
        "sharpness",
        "pixelate",
        "edge_enhance",
        "edge_enhance_more",
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Filter::Grayscale => "grayscale",
            Filter::Sepia => "sepia",
            Filter::Invert => "invert",
            Filter::Blur { .. } => "blur",
            Filter::Brightness { .. } => "brightness",
            Filter::Contrast { .. } => "contrast",
            Filter::Saturation { .. } => "saturation",
            Filter::Sharpness { .. } => "sharpness",
            Filter::Pixelate { .. } => "pixelate",
            Filter::EdgeEnhance => "edge_enhance",
            Filter::EdgeEnhanceMore => "edge_enhance_more",
        }
    }

    /// Resolve a built-in filter from its spec.
    ///
    /// Fails with `UnknownFilter` when the name is not a built-in and with
    /// `InvalidFilterParameter` for out-of-range values.
    pub fn from_spec(spec: &FilterSpec) -> ImagingResult<Filter> {
        let name = spec.name.to_lowercase().replace('-', "_");
        let filter = match name.as_str() {
            "grayscale" | "greyscale" => Filter::Grayscale,
            "sepia" => Filter::Sepia,
            "invert" => Filter::Invert,
            "blur" => Filter::Blur {
                strength: non_negative(spec, &["strength", "radius"], DEFAULT_BLUR_STRENGTH)?,
            },
            "brightness" => Filter::Brightness {
                percent: non_negative(spec, &["percent"], DEFAULT_BRIGHTNESS)?,
            },
            "contrast" => Filter::Contrast {
                percent: non_negative(spec, &["percent"], DEFAULT_CONTRAST)?,
            },
            "saturation" => Filter::Saturation {
                percent: non_negative(spec, &["percent"], DEFAULT_SATURATION)?,
            },
            "sharpness" => Filter::Sharpness {
                percent: non_negative(spec, &["percent"], DEFAULT_SHARPNESS)?,
            },
            "pixelate" => {
                let size = non_negative(
                    spec,
                    &["block_size", "size"],
                    DEFAULT_PIXELATE_BLOCK as f32,
                )?;
                if size < 1.0 {
                    return Err(ImagingError::InvalidFilterParameter {
                        filter: spec.name.clone(),
                        param: "block_size".to_string(),
                        reason: "must be at least 1".to_string(),
                    });
                }
                Filter::Pixelate {
                    block_size: size.round() as u32,
                }
            }
            "edge_enhance" => Filter::EdgeEnhance,
            "edge_enhance_more" => Filter::EdgeEnhanceMore,
            _ => return Err(ImagingError::UnknownFilter(spec.name.clone())),
        };
        Ok(filter)
    }

    /// Apply the filter, returning a new buffer with the same layout
    pub fn apply(&self, img: &DynamicImage) -> DynamicImage {
        match *self {
            Filter::Grayscale => map_rgb(img, |[r, g, b]| {
                let l = luma(r, g, b);
                [l, l, l]
            }),
            Filter::Sepia => map_rgb(img, |[r, g, b]| {
                let (r, g, b) = (r as f32, g as f32, b as f32);
                [
                    clamp_u8(0.393 * r + 0.769 * g + 0.189 * b),
                    clamp_u8(0.349 * r + 0.686 * g + 0.168 * b),
                    clamp_u8(0.272 * r + 0.534 * g + 0.131 * b),
                ]
            }),
            Filter::Invert => map_rgb(img, |[r, g, b]| [255 - r, 255 - g, 255 - b]),
            Filter::Blur { strength } => {
                if strength <= f32::EPSILON {
                    img.clone()
                } else {
                    match_layout(img.blur(strength), img)
                }
            }
            Filter::Brightness { percent } => {
                let factor = percent / 100.0;
                map_rgb(img, |[r, g, b]| {
                    [
                        clamp_u8(r as f32 * factor),
                        clamp_u8(g as f32 * factor),
                        clamp_u8(b as f32 * factor),
                    ]
                })
            }
            Filter::Contrast { percent } => {
                let factor = percent / 100.0;
                let mean = mean_luma(img) as f32;
                let adjust = |c: u8| clamp_u8(mean + factor * (c as f32 - mean));
                map_rgb(img, |[r, g, b]| [adjust(r), adjust(g), adjust(b)])
            }
            Filter::Saturation { percent } => {
                let factor = percent / 100.0;
                map_rgb(img, |[r, g, b]| {
                    let gray = luma(r, g, b) as f32;
                    let adjust = |c: u8| clamp_u8(gray + factor * (c as f32 - gray));
                    [adjust(r), adjust(g), adjust(b)]
                })
            }
            Filter::Sharpness { percent } => {
                let smoothed = convolve3x3(img, &SMOOTH_KERNEL, 13.0);
                blend(img, &smoothed, percent / 100.0)
            }
            Filter::Pixelate { block_size } => pixelate(img, block_size),
            Filter::EdgeEnhance => convolve3x3(img, &EDGE_ENHANCE_KERNEL, 2.0),
            Filter::EdgeEnhanceMore => convolve3x3(img, &EDGE_ENHANCE_MORE_KERNEL, 1.0),
        }
    }
}

/// Read the first of `keys` (or the positional value) and require it to be >= 0
fn non_negative(spec: &FilterSpec, keys: &[&str], default: f32) -> ImagingResult<f32> {
    for key in spec.params.keys() {
        if key != POSITIONAL_PARAM && !keys.contains(&key.as_str()) {
            tracing::debug!(filter = %spec.name, param = %key, "Ignoring unknown filter parameter");
        }
    }

    let value = spec
        .param(keys)
        .or_else(|| spec.param(&[POSITIONAL_PARAM]))
        .map(|v| v as f32)
        .unwrap_or(default);

    if !value.is_finite() || value < 0.0 {
        return Err(ImagingError::InvalidFilterParameter {
            filter: spec.name.clone(),
            param: keys.first().copied().unwrap_or(POSITIONAL_PARAM).to_string(),
            reason: format!("must be a non-negative number, got {}", value),
        });
    }
    Ok(value)
}

fn mean_luma(img: &DynamicImage) -> u8 {
    let rgb = img.to_rgb8();
    let count = rgb.pixels().len() as u64;
    if count == 0 {
        return 0;
    }
    let total: u64 = rgb
        .pixels()
        .map(|p| luma(p[0], p[1], p[2]) as u64)
        .sum();
    ((total + count / 2) / count) as u8
}

/// Replace every `block_size` square with its average colour
fn pixelate(img: &DynamicImage, block_size: u32) -> DynamicImage {
    fn run<P>(buf: &ImageBuffer<P, Vec<u8>>, block: u32) -> ImageBuffer<P, Vec<u8>>
    where
        P: Pixel<Subpixel = u8>,
    {
        let (width, height) = buf.dimensions();
        let channels = P::CHANNEL_COUNT as usize;
        let mut out = buf.clone();
        for by in (0..height).step_by(block as usize) {
            for bx in (0..width).step_by(block as usize) {
                let x_end = (bx + block).min(width);
                let y_end = (by + block).min(height);
                let mut sums = [0u64; 4];
                let mut count = 0u64;
                for y in by..y_end {
                    for x in bx..x_end {
                        for (c, s) in buf.get_pixel(x, y).channels().iter().enumerate() {
                            sums[c] += *s as u64;
                        }
                        count += 1;
                    }
                }
                for y in by..y_end {
                    for x in bx..x_end {
                        let px = out.get_pixel_mut(x, y);
                        for (c, s) in px.channels_mut().iter_mut().enumerate().take(channels) {
                            *s = ((sums[c] + count / 2) / count) as u8;
                        }
                    }
                }
            }
        }
        out
    }

    if block_size <= 1 {
        return img.clone();
    }
    match img {
        DynamicImage::ImageRgba8(buf) => DynamicImage::ImageRgba8(run(buf, block_size)),
        DynamicImage::ImageRgb8(buf) => DynamicImage::ImageRgb8(run(buf, block_size)),
        other => pixelate(&normalize_layout(other.clone()), block_size),
    }
}

/// Extension point for filters outside the built-in set.
///
/// Implementations must be pure: same input and spec, same output.
pub trait CustomFilter: Send + Sync {
    fn apply(&self, img: &DynamicImage, spec: &FilterSpec) -> ImagingResult<DynamicImage>;
}

impl<F> CustomFilter for F
where
    F: Fn(&DynamicImage, &FilterSpec) -> ImagingResult<DynamicImage> + Send + Sync,
{
    fn apply(&self, img: &DynamicImage, spec: &FilterSpec) -> ImagingResult<DynamicImage> {
        self(img, spec)
    }
}

/// Name → filter lookup used at the configuration boundary.
///
/// Registration needs `&mut self`, so it can only happen while the registry is
/// still exclusively owned, before it is wrapped in an `Arc` and shared with
/// processors. Custom registrations shadow built-ins of the same name and the
/// last registration for a name wins.
#[derive(Clone, Default)]
pub struct FilterRegistry {
    custom: HashMap<String, Arc<dyn CustomFilter>>,
}

static SHARED_REGISTRY: OnceLock<Arc<FilterRegistry>> = OnceLock::new();

impl FilterRegistry {
    /// Registry holding only the built-in filters
    pub fn new() -> Self {
        Self::default()
    }

    /// Process-wide built-in registry, created on first use
    pub fn shared() -> Arc<FilterRegistry> {
        SHARED_REGISTRY
            .get_or_init(|| Arc::new(FilterRegistry::new()))
            .clone()
    }

    /// Add or replace the filter registered under `name`
    pub fn register(&mut self, name: impl Into<String>, filter: impl CustomFilter + 'static) {
        let name = name.into().to_lowercase();
        if self.custom.insert(name.clone(), Arc::new(filter)).is_some() {
            tracing::debug!(filter = %name, "Replacing previously registered filter");
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        let name = name.to_lowercase();
        self.custom.contains_key(&name)
            || Filter::from_spec(&FilterSpec::new(name)).is_ok()
    }

    /// Apply the filter named by `spec` and return the new buffer
    pub fn apply(&self, img: &DynamicImage, spec: &FilterSpec) -> ImagingResult<DynamicImage> {
        let name = spec.name.to_lowercase();
        tracing::debug!(filter = %spec, "Applying image filter");

        if let Some(custom) = self.custom.get(&name) {
            let output = custom.apply(img, spec)?;
            let (width, height) = output.dimensions();
            if width == 0 || height == 0 {
                return Err(ImagingError::InvalidDimension { width, height });
            }
            return Ok(match_layout(output, img));
        }

        Ok(Filter::from_spec(spec)?.apply(img))
    }

    /// Convenience form of [`FilterRegistry::apply`] taking a name and parameters
    pub fn apply_named(
        &self,
        img: &DynamicImage,
        name: &str,
        params: &[(&str, f64)],
    ) -> ImagingResult<DynamicImage> {
        let spec = params
            .iter()
            .fold(FilterSpec::new(name), |spec, (k, v)| spec.with_param(*k, *v));
        self.apply(img, &spec)
    }

    /// Sorted names of every available filter
    pub fn list_filters(&self) -> Vec<String> {
        let mut names: Vec<String> = Filter::BUILTIN_NAMES
            .iter()
            .map(|s| s.to_string())
            .chain(self.custom.keys().cloned())
            .collect();
        names.sort();
        names.dedup();
        names
    }
}

impl std::fmt::Debug for FilterRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FilterRegistry")
            .field("custom", &self.custom.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage, Rgba, RgbaImage};

    fn solid(rgb: [u8; 3]) -> DynamicImage {
        DynamicImage::ImageRgb8(RgbImage::from_pixel(10, 10, Rgb(rgb)))
    }

    fn apply(filter: Filter, img: &DynamicImage) -> [u8; 3] {
        filter.apply(img).to_rgb8().get_pixel(5, 5).0
    }

    /// Grey 64 left of column 10 and 192 from it on
    fn step_edge() -> DynamicImage {
        let buf = RgbImage::from_fn(20, 9, |x, _| if x < 10 { Rgb([64; 3]) } else { Rgb([192; 3]) });
        DynamicImage::ImageRgb8(buf)
    }

    /// Difference across the step, 128 before filtering
    fn edge_contrast(img: &DynamicImage) -> i32 {
        let buf = img.to_rgb8();
        buf.get_pixel(10, 4)[0] as i32 - buf.get_pixel(9, 4)[0] as i32
    }

    #[test]
    fn test_grayscale() {
        let out = apply(Filter::Grayscale, &solid([255, 0, 0]));
        assert_eq!(out, [76, 76, 76]);
    }

    #[test]
    fn test_grayscale_is_fixed_point_on_grey() {
        let mut buf = RgbImage::new(16, 16);
        for (x, y, p) in buf.enumerate_pixels_mut() {
            let v = ((x * 16 + y) % 256) as u8;
            *p = Rgb([v, v, v]);
        }
        let img = DynamicImage::ImageRgb8(buf);
        let once = Filter::Grayscale.apply(&img);
        assert_eq!(once.to_rgb8(), img.to_rgb8());
        let twice = Filter::Grayscale.apply(&once);
        assert_eq!(twice.to_rgb8(), once.to_rgb8());
    }

    #[test]
    fn test_invert() {
        let out = apply(Filter::Invert, &solid([255, 100, 50]));
        assert_eq!(out, [0, 155, 205]);
    }

    #[test]
    fn test_invert_roundtrip_keeps_alpha() {
        let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(4, 4, Rgba([1, 2, 3, 128])));
        let twice = Filter::Invert.apply(&Filter::Invert.apply(&img));
        assert_eq!(twice.to_rgba8(), img.to_rgba8());
        assert_eq!(Filter::Invert.apply(&img).to_rgba8().get_pixel(0, 0)[3], 128);
    }

    #[test]
    fn test_sepia_warm_tone() {
        let out = apply(Filter::Sepia, &solid([255, 255, 255]));
        assert!(out[0] >= out[1] && out[1] > out[2]);
    }

    #[test]
    fn test_brightness() {
        assert_eq!(
            apply(Filter::Brightness { percent: 150.0 }, &solid([100, 100, 100])),
            [150, 150, 150]
        );
        assert_eq!(
            apply(Filter::Brightness { percent: 50.0 }, &solid([100, 100, 100])),
            [50, 50, 50]
        );
        assert_eq!(
            apply(Filter::Brightness { percent: 100.0 }, &solid([12, 34, 56])),
            [12, 34, 56]
        );
    }

    #[test]
    fn test_contrast_moves_away_from_mean() {
        let mut buf = RgbImage::from_pixel(10, 10, Rgb([100, 100, 100]));
        for x in 0..10 {
            buf.put_pixel(x, 0, Rgb([200, 200, 200]));
        }
        let img = DynamicImage::ImageRgb8(buf);
        let out = Filter::Contrast { percent: 200.0 }.apply(&img).to_rgb8();
        // mean = 110
        assert_eq!(out.get_pixel(0, 0).0, [255, 255, 255]);
        assert_eq!(out.get_pixel(0, 5).0, [90, 90, 90]);

        let flat = Filter::Contrast { percent: 0.0 }.apply(&img).to_rgb8();
        assert_eq!(flat.get_pixel(0, 0).0, flat.get_pixel(0, 5).0);
    }

    #[test]
    fn test_saturation_zero_is_grey() {
        let out = apply(Filter::Saturation { percent: 0.0 }, &solid([100, 150, 200]));
        assert_eq!(out[0], out[1]);
        assert_eq!(out[1], out[2]);
    }

    #[test]
    fn test_sharpness_identity_on_flat_image() {
        let img = solid([80, 90, 100]);
        assert_eq!(apply(Filter::Sharpness { percent: 300.0 }, &img), [80, 90, 100]);
    }

    #[test]
    fn test_edge_enhance_flat_image_unchanged() {
        let img = solid([80, 90, 100]);
        assert_eq!(apply(Filter::EdgeEnhance, &img), [80, 90, 100]);
        assert_eq!(apply(Filter::EdgeEnhanceMore, &img), [80, 90, 100]);
    }

    #[test]
    fn test_blur_softens_edges() {
        let img = step_edge();
        assert_eq!(edge_contrast(&img), 128);
        let contrast = edge_contrast(&Filter::Blur { strength: 2.0 }.apply(&img));
        assert!(contrast > 0 && contrast < 128, "contrast {}", contrast);
    }

    #[test]
    fn test_sharpness_above_100_steepens_edges() {
        let img = step_edge();
        let contrast = edge_contrast(&Filter::Sharpness { percent: 300.0 }.apply(&img));
        assert!(contrast > 200, "contrast {}", contrast);
        assert_eq!(edge_contrast(&Filter::Sharpness { percent: 100.0 }.apply(&img)), 128);
    }

    #[test]
    fn test_edge_enhance_steepens_edges() {
        let img = step_edge();
        assert_eq!(edge_contrast(&Filter::EdgeEnhance.apply(&img)), 255);
        assert_eq!(edge_contrast(&Filter::EdgeEnhanceMore.apply(&img)), 255);
        // Away from the step nothing changes
        let out = Filter::EdgeEnhance.apply(&img).to_rgb8();
        assert_eq!(out.get_pixel(2, 4).0, [64; 3]);
        assert_eq!(out.get_pixel(17, 4).0, [192; 3]);
    }

    #[test]
    fn test_pixelate_averages_blocks() {
        let mut buf = RgbImage::new(4, 4);
        buf.put_pixel(0, 0, Rgb([200, 200, 200]));
        let img = DynamicImage::ImageRgb8(buf);
        let out = Filter::Pixelate { block_size: 2 }.apply(&img).to_rgb8();
        assert_eq!(out.get_pixel(1, 1).0, [50, 50, 50]);
        assert_eq!(out.get_pixel(3, 3).0, [0, 0, 0]);
    }

    #[test]
    fn test_blur_preserves_size_and_layout() {
        let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(10, 10, Rgba([255, 0, 0, 255])));
        let out = Filter::Blur { strength: 2.0 }.apply(&img);
        assert_eq!(out.dimensions(), (10, 10));
        assert_eq!(out.color().channel_count(), 4);
    }

    #[test]
    fn test_from_spec_defaults_and_params() {
        let f = Filter::from_spec(&FilterSpec::parse("blur(strength=5)").unwrap()).unwrap();
        assert_eq!(f, Filter::Blur { strength: 5.0 });

        let f = Filter::from_spec(&FilterSpec::parse("pixelate(4)").unwrap()).unwrap();
        assert_eq!(f, Filter::Pixelate { block_size: 4 });

        let f = Filter::from_spec(&FilterSpec::new("brightness")).unwrap();
        assert_eq!(f, Filter::Brightness { percent: DEFAULT_BRIGHTNESS });

        let f = Filter::from_spec(&FilterSpec::new("edge-enhance")).unwrap();
        assert_eq!(f, Filter::EdgeEnhance);
    }

    #[test]
    fn test_from_spec_rejects_bad_values() {
        let err = Filter::from_spec(&FilterSpec::parse("blur(-1)").unwrap()).unwrap_err();
        assert!(matches!(err, ImagingError::InvalidFilterParameter { .. }));

        let err = Filter::from_spec(&FilterSpec::parse("pixelate(0)").unwrap()).unwrap_err();
        assert!(matches!(err, ImagingError::InvalidFilterParameter { .. }));
    }

    #[test]
    fn test_registry_unknown_filter() {
        let registry = FilterRegistry::new();
        let err = registry
            .apply(&solid([1, 2, 3]), &FilterSpec::new("vignette"))
            .unwrap_err();
        assert!(matches!(err, ImagingError::UnknownFilter(ref n) if n == "vignette"));
    }

    #[test]
    fn test_registry_does_not_mutate_input() {
        let registry = FilterRegistry::new();
        let img = solid([10, 20, 30]);
        let before = img.to_rgb8();
        let _ = registry.apply_named(&img, "invert", &[]).unwrap();
        assert_eq!(img.to_rgb8(), before);
    }

    #[test]
    fn test_register_custom_last_wins() {
        let mut registry = FilterRegistry::new();
        registry.register("tint", |img: &DynamicImage, _: &FilterSpec| -> ImagingResult<DynamicImage> {
            Ok(map_rgb(img, |[_, g, b]| [255, g, b]))
        });
        registry.register("tint", |img: &DynamicImage, _: &FilterSpec| -> ImagingResult<DynamicImage> {
            Ok(map_rgb(img, |[r, _, b]| [r, 255, b]))
        });
        let out = registry.apply_named(&solid([0, 0, 0]), "tint", &[]).unwrap();
        assert_eq!(out.to_rgb8().get_pixel(0, 0).0, [0, 255, 0]);
    }

    #[test]
    fn test_register_overrides_builtin() {
        let mut registry = FilterRegistry::new();
        registry.register("invert", |img: &DynamicImage, _: &FilterSpec| -> ImagingResult<DynamicImage> {
            Ok(img.clone())
        });
        let img = solid([10, 20, 30]);
        let out = registry.apply_named(&img, "invert", &[]).unwrap();
        assert_eq!(out.to_rgb8(), img.to_rgb8());
    }

    #[test]
    fn test_custom_filter_output_keeps_layout() {
        let mut registry = FilterRegistry::new();
        registry.register("to_luma", |img: &DynamicImage, _: &FilterSpec| -> ImagingResult<DynamicImage> {
            Ok(DynamicImage::ImageLuma8(img.to_luma8()))
        });
        let out = registry.apply_named(&solid([9, 9, 9]), "to_luma", &[]).unwrap();
        assert_eq!(out.color().channel_count(), 3);
    }

    #[test]
    fn test_list_filters() {
        let mut registry = FilterRegistry::new();
        registry.register("zoom_blur", |img: &DynamicImage, _: &FilterSpec| -> ImagingResult<DynamicImage> {
            Ok(img.clone())
        });
        let names = registry.list_filters();
        assert_eq!(names.len(), Filter::BUILTIN_NAMES.len() + 1);
        assert!(names.contains(&"zoom_blur".to_string()));
        assert!(names.windows(2).all(|w| w[0] <= w[1]));
        assert!(registry.contains("sepia"));
        assert!(!registry.contains("nope"));
    }

    #[test]
    fn test_shared_registry_is_singleton() {
        let a = FilterRegistry::shared();
        let b = FilterRegistry::shared();
        assert!(Arc::ptr_eq(&a, &b));
    }
}
