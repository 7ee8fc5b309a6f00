use glam::{I16Vec2, IVec2};
use std::ops::Sub;

/// Planar point in projected meters
pub type Point32 = IVec2;

/// Block-local or screen point
pub type Point16 = I16Vec2;

/// Axis-aligned bounding box. Callers keep `min <= max` on both axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BBox {
    pub min: Point32,
    pub max: Point32,
}

impl BBox {
    pub const fn new(min: Point32, max: Point32) -> Self {
        Self { min, max }
    }

    /// Closed-interval containment: points on the border are inside
    #[inline(always)]
    pub fn contains_point(&self, p: Point32) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }

    /// Touching edges count as intersecting
    #[inline(always)]
    pub fn intersects(&self, other: &BBox) -> bool {
        !(other.min.x > self.max.x
            || other.max.x < self.min.x
            || other.min.y > self.max.y
            || other.max.y < self.min.y)
    }

    /// The four corners: min, max, then the two mixed ones
    pub fn corners(&self) -> [Point32; 4] {
        [
            self.min,
            self.max,
            Point32::new(self.min.x, self.max.y),
            Point32::new(self.max.x, self.min.y),
        ]
    }
}

impl Sub<Point32> for BBox {
    type Output = BBox;

    fn sub(self, offset: Point32) -> BBox {
        BBox::new(self.min - offset, self.max - offset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bbox(x0: i32, y0: i32, x1: i32, y1: i32) -> BBox {
        BBox::new(Point32::new(x0, y0), Point32::new(x1, y1))
    }

    #[test]
    fn test_contains_point_is_closed() {
        let b = bbox(0, 0, 10, 10);
        assert!(b.contains_point(Point32::new(0, 0)));
        assert!(b.contains_point(Point32::new(10, 10)));
        assert!(b.contains_point(Point32::new(5, 7)));
        assert!(!b.contains_point(Point32::new(11, 5)));
        assert!(!b.contains_point(Point32::new(5, -1)));
    }

    #[test]
    fn test_intersects() {
        let b = bbox(0, 0, 10, 10);
        assert!(b.intersects(&bbox(5, 5, 20, 20)));
        assert!(b.intersects(&bbox(-5, -5, 0, 0)));
        assert!(b.intersects(&bbox(10, 0, 12, 3)));
        assert!(b.intersects(&bbox(2, 2, 3, 3)));
        assert!(bbox(2, 2, 3, 3).intersects(&b));
        assert!(!b.intersects(&bbox(11, 0, 12, 10)));
        assert!(!b.intersects(&bbox(0, -3, 10, -1)));
    }

    #[test]
    fn test_translate() {
        let b = bbox(100, 200, 300, 400) - Point32::new(100, 100);
        assert_eq!(b, bbox(0, 100, 200, 300));
    }

    #[test]
    fn test_point_arithmetic() {
        let a = Point32::new(4096, -20);
        let b = Point32::new(1, 2);
        assert_eq!(a + b, Point32::new(4097, -18));
        assert_eq!(a - b, Point32::new(4095, -22));
    }
}
