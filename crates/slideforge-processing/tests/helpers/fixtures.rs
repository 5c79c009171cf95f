use std::path::{Path, PathBuf};

use image::{DynamicImage, Rgb, RgbImage};
use slideforge_processing::ImageCollection;
use tempfile::TempDir;

/// Native sizes of the six slide images, in id order
pub const SLIDE_SIZES: [(u32, u32); 6] = [
    (320, 240),
    (300, 200),
    (333, 187),
    (200, 300),
    (256, 256),
    (480, 270),
];

/// Gradient with a bright block off-centre so contour detection has a subject
pub fn slide(width: u32, height: u32) -> DynamicImage {
    let mut buf = RgbImage::new(width, height);
    for (x, y, p) in buf.enumerate_pixels_mut() {
        *p = Rgb([(x * 255 / width) as u8, (y * 255 / height) as u8, 60]);
    }
    let (bx, by) = (width * 3 / 5, height / 4);
    for y in by..(by + height / 4).min(height) {
        for x in bx..(bx + width / 5).min(width) {
            buf.put_pixel(x, y, Rgb([250, 250, 250]));
        }
    }
    DynamicImage::ImageRgb8(buf)
}

pub fn write_slide(dir: &Path, name: &str, width: u32, height: u32) -> PathBuf {
    let path = dir.join(name);
    slide(width, height).save(&path).unwrap();
    path
}

/// A collection of six PNG slides named so that file order matches id order
pub fn six_image_collection() -> (TempDir, ImageCollection) {
    let dir = tempfile::tempdir().unwrap();
    for (i, (w, h)) in SLIDE_SIZES.iter().enumerate() {
        write_slide(dir.path(), &format!("slide_{:02}.png", i + 1), *w, *h);
    }
    let collection = ImageCollection::from_folder(dir.path())
        .unwrap()
        .with_output_folder(dir.path().join("out"));
    (dir, collection)
}
