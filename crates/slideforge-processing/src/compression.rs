use std::io::{Cursor, Write};
use std::path::Path;

use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ImageFormat};
use slideforge_core::{ImagingError, ImagingResult, QualityPreset};
use tempfile::NamedTempFile;

/// Output format for encoded images
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Jpeg,
    Png,
    WebP,
    Bmp,
    Gif,
}

impl OutputFormat {
    pub fn parse(s: &str) -> ImagingResult<Self> {
        match s.to_lowercase().as_str() {
            "jpeg" | "jpg" => Ok(OutputFormat::Jpeg),
            "png" => Ok(OutputFormat::Png),
            "webp" => Ok(OutputFormat::WebP),
            "bmp" => Ok(OutputFormat::Bmp),
            "gif" => Ok(OutputFormat::Gif),
            _ => Err(ImagingError::InvalidParameter(format!(
                "Invalid format: {}",
                s
            ))),
        }
    }

    /// Format implied by the file extension of `path`
    pub fn from_path(path: &Path) -> ImagingResult<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .ok_or_else(|| ImagingError::save(path.display().to_string(), "missing file extension"))?;
        Self::parse(ext).map_err(|_| {
            ImagingError::save(
                path.display().to_string(),
                format!("unsupported output format '{}'", ext),
            )
        })
    }

    pub fn to_mime_type(self) -> &'static str {
        match self {
            OutputFormat::Jpeg => "image/jpeg",
            OutputFormat::Png => "image/png",
            OutputFormat::WebP => "image/webp",
            OutputFormat::Bmp => "image/bmp",
            OutputFormat::Gif => "image/gif",
        }
    }

    pub fn to_image_format(self) -> ImageFormat {
        match self {
            OutputFormat::Jpeg => ImageFormat::Jpeg,
            OutputFormat::Png => ImageFormat::Png,
            OutputFormat::WebP => ImageFormat::WebP,
            OutputFormat::Bmp => ImageFormat::Bmp,
            OutputFormat::Gif => ImageFormat::Gif,
        }
    }
}

/// Encoding and atomic file output
pub struct ImageCompressor;

impl ImageCompressor {
    /// Encode image with the specified format and quality.
    ///
    /// Quality only affects JPEG; the other formats are lossless here.
    pub fn compress(
        img: &DynamicImage,
        format: OutputFormat,
        quality: QualityPreset,
    ) -> ImagingResult<Vec<u8>> {
        let result = match format {
            OutputFormat::Jpeg => Self::compress_jpeg(img, quality),
            OutputFormat::Gif => {
                Self::write_with_format(&DynamicImage::ImageRgba8(img.to_rgba8()), format)
            }
            _ => Self::write_with_format(img, format),
        };
        result.map_err(|e| ImagingError::save(format.to_mime_type(), e))
    }

    /// Encode to a temporary file beside `path`, then atomically move it into place.
    ///
    /// Missing parent directories are created. On any failure nothing is left at
    /// `path` (an existing file there is untouched).
    pub fn save(img: &DynamicImage, path: &Path, quality: QualityPreset) -> ImagingResult<OutputFormat> {
        let format = OutputFormat::from_path(path)?;
        let data = Self::compress(img, format, quality)?;
        let display_path = path.display().to_string();

        let parent = match path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        std::fs::create_dir_all(parent).map_err(|e| ImagingError::save(&display_path, e))?;

        let mut tmp = NamedTempFile::new_in(parent).map_err(|e| ImagingError::save(&display_path, e))?;
        tmp.write_all(&data)
            .and_then(|_| tmp.flush())
            .map_err(|e| ImagingError::save(&display_path, e))?;
        tmp.persist(path)
            .map_err(|e| ImagingError::save(&display_path, e.error))?;

        tracing::info!(
            path = %display_path,
            format = format.to_mime_type(),
            quality = quality.as_str(),
            size_bytes = data.len(),
            "Saved image"
        );
        Ok(format)
    }

    fn compress_jpeg(img: &DynamicImage, quality: QualityPreset) -> image::ImageResult<Vec<u8>> {
        let rgb_img = DynamicImage::ImageRgb8(img.to_rgb8());
        let mut buffer = Vec::new();
        let encoder = JpegEncoder::new_with_quality(&mut buffer, quality.jpeg_quality());
        rgb_img.write_with_encoder(encoder)?;
        Ok(buffer)
    }

    fn write_with_format(img: &DynamicImage, format: OutputFormat) -> image::ImageResult<Vec<u8>> {
        let mut buffer = Vec::new();
        img.write_to(&mut Cursor::new(&mut buffer), format.to_image_format())?;
        Ok(buffer)
    }
}
