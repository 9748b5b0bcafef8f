//! Canvas-space geometry primitives.

use serde::{Deserialize, Serialize};

/// A coordinate in canvas pixel space.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// X position (pixels from left).
    pub x: f32,
    /// Y position (pixels from top).
    pub y: f32,
}

impl Point {
    /// Create a new point.
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point.
    #[must_use]
    pub fn distance_to(self, other: Self) -> f32 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    /// Vector from `origin` to this point.
    #[must_use]
    pub fn offset_from(self, origin: Self) -> Self {
        Self::new(self.x - origin.x, self.y - origin.y)
    }

    /// This point translated by `-offset`.
    #[must_use]
    pub fn minus(self, offset: Self) -> Self {
        Self::new(self.x - offset.x, self.y - offset.y)
    }
}

/// Width and height in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Size {
    /// Width in pixels.
    pub width: f32,
    /// Height in pixels.
    pub height: f32,
}

impl Size {
    /// Create a new size.
    #[must_use]
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

/// An axis-aligned rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    /// Top-left corner.
    pub origin: Point,
    /// Extent.
    pub size: Size,
}

impl Rect {
    /// Create a rectangle from its top-left corner and size.
    #[must_use]
    pub const fn new(origin: Point, size: Size) -> Self {
        Self { origin, size }
    }

    /// Bounding box spanned by two corner points, in any order.
    #[must_use]
    pub fn from_corners(a: Point, b: Point) -> Self {
        let origin = Point::new(a.x.min(b.x), a.y.min(b.y));
        let size = Size::new((a.x - b.x).abs(), (a.y - b.y).abs());
        Self { origin, size }
    }

    /// Geometric center.
    #[must_use]
    pub fn center(&self) -> Point {
        Point::new(
            self.origin.x + self.size.width / 2.0,
            self.origin.y + self.size.height / 2.0,
        )
    }

    /// Right edge X.
    #[must_use]
    pub fn right(&self) -> f32 {
        self.origin.x + self.size.width
    }

    /// Bottom edge Y.
    #[must_use]
    pub fn bottom(&self) -> f32 {
        self.origin.y + self.size.height
    }

    /// Inclusive point-in-rectangle test (edges count as inside).
    #[must_use]
    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.origin.x && p.x <= self.right() && p.y >= self.origin.y && p.y <= self.bottom()
    }

    /// Smallest rectangle covering both.
    #[must_use]
    pub fn union(&self, other: &Self) -> Self {
        Self::from_corners(
            Point::new(self.origin.x.min(other.origin.x), self.origin.y.min(other.origin.y)),
            Point::new(self.right().max(other.right()), self.bottom().max(other.bottom())),
        )
    }

    /// Grow the rectangle by `amount` on every side.
    #[must_use]
    pub fn inflate(&self, amount: f32) -> Self {
        Self {
            origin: Point::new(self.origin.x - amount, self.origin.y - amount),
            size: Size::new(
                self.size.width + amount * 2.0,
                self.size.height + amount * 2.0,
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn union_covers_both() {
        let a = Rect::new(Point::new(0.0, 0.0), Size::new(10.0, 10.0));
        let b = Rect::new(Point::new(20.0, -5.0), Size::new(5.0, 5.0));
        let u = a.union(&b);
        assert_eq!(u.origin, Point::new(0.0, -5.0));
        assert_eq!(u.size, Size::new(25.0, 15.0));
    }

    #[test]
    fn distance_is_euclidean() {
        let d = Point::new(0.0, 0.0).distance_to(Point::new(3.0, 4.0));
        assert!((d - 5.0).abs() < f32::EPSILON);
    }

    #[test]
    fn rect_contains_edges() {
        let r = Rect::new(Point::new(10.0, 10.0), Size::new(20.0, 10.0));
        assert!(r.contains(Point::new(10.0, 10.0)));
        assert!(r.contains(Point::new(30.0, 20.0)));
        assert!(r.contains(Point::new(15.0, 15.0)));
        assert!(!r.contains(Point::new(30.1, 15.0)));
        assert!(!r.contains(Point::new(9.9, 15.0)));
    }

    #[test]
    fn rect_from_corners_normalizes() {
        let r = Rect::from_corners(Point::new(50.0, 40.0), Point::new(10.0, 60.0));
        assert_eq!(r.origin, Point::new(10.0, 40.0));
        assert_eq!(r.size, Size::new(40.0, 20.0));
        assert_eq!(r.center(), Point::new(30.0, 50.0));
    }

    #[test]
    fn inflate_grows_each_side() {
        let r = Rect::new(Point::new(0.0, 0.0), Size::new(10.0, 10.0)).inflate(7.0);
        assert_eq!(r.origin, Point::new(-7.0, -7.0));
        assert_eq!(r.size, Size::new(24.0, 24.0));
    }
}
