//! Geometry models shared by the crop engine and its callers

use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle in source pixel coordinates.
///
/// Kept in `f64` so that detection boxes can be scaled between the analysis
/// image and the source without accumulating integer rounding.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl BoundingBox {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Box covering a whole `width` x `height` image
    pub fn full_frame(width: u32, height: u32) -> Self {
        Self::new(0.0, 0.0, width as f64, height as f64)
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn area(&self) -> f64 {
        self.width.max(0.0) * self.height.max(0.0)
    }

    pub fn center(&self) -> (f64, f64) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Smallest box containing both `self` and `other`
    pub fn union(&self, other: &BoundingBox) -> BoundingBox {
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        BoundingBox::new(
            x,
            y,
            self.right().max(other.right()) - x,
            self.bottom().max(other.bottom()) - y,
        )
    }

    /// Grow the box on every side by `fraction` of its own size
    pub fn expand(&self, fraction: f64) -> BoundingBox {
        let dx = self.width * fraction;
        let dy = self.height * fraction;
        BoundingBox::new(
            self.x - dx,
            self.y - dy,
            self.width + 2.0 * dx,
            self.height + 2.0 * dy,
        )
    }

    /// Map into another image's coordinates: horizontal values by `sx`,
    /// vertical ones by `sy`
    pub fn scale_xy(&self, sx: f64, sy: f64) -> BoundingBox {
        BoundingBox::new(self.x * sx, self.y * sy, self.width * sx, self.height * sy)
    }

    /// Intersection with the `[0, width] x [0, height]` frame.
    ///
    /// A box lying completely outside the frame collapses to zero size.
    pub fn clip(&self, width: u32, height: u32) -> BoundingBox {
        let (w, h) = (width as f64, height as f64);
        let x0 = self.x.clamp(0.0, w);
        let y0 = self.y.clamp(0.0, h);
        let x1 = self.right().clamp(0.0, w);
        let y1 = self.bottom().clamp(0.0, h);
        BoundingBox::new(x0, y0, (x1 - x0).max(0.0), (y1 - y0).max(0.0))
    }
}

/// Rectangular region of the source selected for extraction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CropWindow {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
    /// Requested width / height ratio the window was sized for
    pub target_aspect: f64,
}

impl CropWindow {
    pub fn aspect_ratio(&self) -> f64 {
        self.width as f64 / self.height as f64
    }

    /// Whether the window lies entirely inside a `width` x `height` image
    pub fn fits_within(&self, width: u32, height: u32) -> bool {
        self.width > 0
            && self.height > 0
            && self.x as u64 + self.width as u64 <= width as u64
            && self.y as u64 + self.height as u64 <= height as u64
    }
}

/// Rule-of-thirds intersections of the rectangle at (`x`, `y`) sized `width` x `height`
pub fn thirds_points(x: f64, y: f64, width: f64, height: f64) -> [(f64, f64); 4] {
    let (x1, x2) = (x + width / 3.0, x + width * 2.0 / 3.0);
    let (y1, y2) = (y + height / 3.0, y + height * 2.0 / 3.0);
    [(x1, y1), (x2, y1), (x1, y2), (x2, y2)]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_union_and_center() {
        let a = BoundingBox::new(10.0, 10.0, 10.0, 10.0);
        let b = BoundingBox::new(30.0, 0.0, 10.0, 5.0);
        let u = a.union(&b);
        assert_eq!(u, BoundingBox::new(10.0, 0.0, 30.0, 20.0));
        assert_eq!(u.center(), (25.0, 10.0));
    }

    #[test]
    fn test_expand_keeps_center() {
        let b = BoundingBox::new(100.0, 100.0, 50.0, 40.0);
        let e = b.expand(0.2);
        assert_eq!(e.center(), b.center());
        assert_eq!(e.width, 70.0);
        assert_eq!(e.height, 56.0);
    }

    #[test]
    fn test_clip() {
        let b = BoundingBox::new(-10.0, 80.0, 50.0, 50.0);
        assert_eq!(b.clip(100, 100), BoundingBox::new(0.0, 80.0, 40.0, 20.0));

        let outside = BoundingBox::new(200.0, 200.0, 10.0, 10.0);
        assert_eq!(outside.clip(100, 100).area(), 0.0);
    }

    #[test]
    fn test_crop_window_fits_within() {
        let w = CropWindow {
            x: 10,
            y: 0,
            width: 90,
            height: 50,
            target_aspect: 1.8,
        };
        assert!(w.fits_within(100, 50));
        assert!(!w.fits_within(99, 50));
        assert!(!w.fits_within(100, 49));
    }

    #[test]
    fn test_thirds_points() {
        let points = thirds_points(0.0, 0.0, 300.0, 150.0);
        assert_eq!(points[0], (100.0, 50.0));
        assert_eq!(points[3], (200.0, 100.0));

        let shifted = thirds_points(30.0, 15.0, 300.0, 150.0);
        assert_eq!(shifted[1], (230.0, 65.0));
    }

    #[test]
    fn test_scale_xy_maps_between_resolutions() {
        let analysis = BoundingBox::new(10.0, 20.0, 40.0, 30.0);
        let source = analysis.scale_xy(4.0, 2.0);
        assert_eq!(source, BoundingBox::new(40.0, 40.0, 160.0, 60.0));
        assert_eq!(source.scale_xy(0.25, 0.5), analysis);
    }
}
