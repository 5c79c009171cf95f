//! Pixel-level helpers shared by the filters and the crop engine
//!
//! Every buffer handled by the pipeline is 8-bit RGB or 8-bit RGBA. Helpers here
//! keep that layout intact and never touch the alpha channel unless stated.

use image::{DynamicImage, GenericImageView, GrayImage, Luma, RgbImage, RgbaImage};

/// Convert any decoded image to RGB8, or RGBA8 when it carries alpha
pub fn normalize_layout(img: DynamicImage) -> DynamicImage {
    match img {
        DynamicImage::ImageRgb8(_) | DynamicImage::ImageRgba8(_) => img,
        other if other.color().has_alpha() => DynamicImage::ImageRgba8(other.to_rgba8()),
        other => DynamicImage::ImageRgb8(other.to_rgb8()),
    }
}

/// Convert `img` to the channel layout of `like`
pub fn match_layout(img: DynamicImage, like: &DynamicImage) -> DynamicImage {
    match (like, img) {
        (DynamicImage::ImageRgba8(_), img @ DynamicImage::ImageRgba8(_)) => img,
        (DynamicImage::ImageRgba8(_), img) => DynamicImage::ImageRgba8(img.to_rgba8()),
        (_, img @ DynamicImage::ImageRgb8(_)) => img,
        (_, img) => DynamicImage::ImageRgb8(img.to_rgb8()),
    }
}

pub fn channel_count(img: &DynamicImage) -> u8 {
    img.color().channel_count()
}

/// ITU-R BT.601 luma in integer arithmetic, so grey pixels map to themselves
#[inline]
pub fn luma(r: u8, g: u8, b: u8) -> u8 {
    ((299 * r as u32 + 587 * g as u32 + 114 * b as u32 + 500) / 1000) as u8
}

/// Single-channel luma plane of `img`, alpha ignored
pub fn luma_image(img: &DynamicImage) -> GrayImage {
    let rgb = img.to_rgb8();
    let mut gray = GrayImage::new(rgb.width(), rgb.height());
    for (src, dst) in rgb.pixels().zip(gray.pixels_mut()) {
        *dst = Luma([luma(src[0], src[1], src[2])]);
    }
    gray
}

#[inline]
pub fn clamp_u8(value: f32) -> u8 {
    value.round().clamp(0.0, 255.0) as u8
}

/// Apply `f` to the colour channels of every pixel, keeping alpha
pub fn map_rgb<F>(img: &DynamicImage, f: F) -> DynamicImage
where
    F: Fn([u8; 3]) -> [u8; 3],
{
    match img {
        DynamicImage::ImageRgba8(buf) => {
            let mut out = buf.clone();
            for p in out.pixels_mut() {
                let [r, g, b] = f([p[0], p[1], p[2]]);
                p[0] = r;
                p[1] = g;
                p[2] = b;
            }
            DynamicImage::ImageRgba8(out)
        }
        DynamicImage::ImageRgb8(buf) => {
            let mut out = buf.clone();
            for p in out.pixels_mut() {
                p.0 = f(p.0);
            }
            DynamicImage::ImageRgb8(out)
        }
        other => map_rgb(&normalize_layout(other.clone()), f),
    }
}

/// Per-channel blend `degenerate + factor * (img - degenerate)`, alpha from `img`.
///
/// `factor` 0 yields the degenerate image and 1 the original; values above 1
/// extrapolate away from the degenerate image.
pub fn blend(img: &DynamicImage, degenerate: &DynamicImage, factor: f32) -> DynamicImage {
    let mix = |orig: u8, base: u8| clamp_u8(base as f32 + factor * (orig as f32 - base as f32));
    match (img, degenerate) {
        (DynamicImage::ImageRgba8(a), DynamicImage::ImageRgba8(b)) => {
            let mut out = a.clone();
            for (p, q) in out.pixels_mut().zip(b.pixels()) {
                for c in 0..3 {
                    p[c] = mix(p[c], q[c]);
                }
            }
            DynamicImage::ImageRgba8(out)
        }
        (DynamicImage::ImageRgb8(a), DynamicImage::ImageRgb8(b)) => {
            let mut out = a.clone();
            for (p, q) in out.pixels_mut().zip(b.pixels()) {
                for c in 0..3 {
                    p[c] = mix(p[c], q[c]);
                }
            }
            DynamicImage::ImageRgb8(out)
        }
        (a, b) => {
            let a = normalize_layout(a.clone());
            let b = match_layout(b.clone(), &a);
            blend(&a, &b, factor)
        }
    }
}

/// 3x3 convolution of the colour channels with edge clamping, alpha kept.
///
/// The kernel is divided by `divisor` (usually the kernel sum).
pub fn convolve3x3(img: &DynamicImage, kernel: &[f32; 9], divisor: f32) -> DynamicImage {
    let (width, height) = img.dimensions();
    let divisor = if divisor == 0.0 { 1.0 } else { divisor };

    let sample = |get: &dyn Fn(u32, u32, usize) -> u8, x: u32, y: u32, c: usize| -> u8 {
        let mut acc = 0.0f32;
        for dy in -1i32..=1 {
            for dx in -1i32..=1 {
                let nx = (x as i32 + dx).clamp(0, width as i32 - 1) as u32;
                let ny = (y as i32 + dy).clamp(0, height as i32 - 1) as u32;
                let weight = kernel[((dy + 1) * 3 + (dx + 1)) as usize];
                acc += get(nx, ny, c) as f32 * weight;
            }
        }
        clamp_u8(acc / divisor)
    };

    match img {
        DynamicImage::ImageRgba8(buf) => {
            let get = |x: u32, y: u32, c: usize| buf.get_pixel(x, y)[c];
            let mut out = RgbaImage::new(width, height);
            for (x, y, p) in out.enumerate_pixels_mut() {
                for c in 0..3 {
                    p[c] = sample(&get, x, y, c);
                }
                p[3] = buf.get_pixel(x, y)[3];
            }
            DynamicImage::ImageRgba8(out)
        }
        DynamicImage::ImageRgb8(buf) => {
            let get = |x: u32, y: u32, c: usize| buf.get_pixel(x, y)[c];
            let mut out = RgbImage::new(width, height);
            for (x, y, p) in out.enumerate_pixels_mut() {
                for c in 0..3 {
                    p[c] = sample(&get, x, y, c);
                }
            }
            DynamicImage::ImageRgb8(out)
        }
        other => convolve3x3(&normalize_layout(other.clone()), kernel, divisor),
    }
}
