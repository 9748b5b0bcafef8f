//! Freehand strokes and two-point shapes.

use serde::{Deserialize, Serialize};

use crate::element::ElementId;
use crate::geometry::{Point, Rect};

/// Brush style for pen strokes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BrushType {
    /// Thin solid line.
    #[default]
    Pencil,
    /// Wide, opaque.
    Marker,
    /// Wide, translucent.
    Highlighter,
    /// Angled nib.
    Calligraphy,
}

/// Shape a stroke's first two points describe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeKind {
    /// Rectangle spanning the two points.
    Rectangle,
    /// Circle inscribed in the diagonal of the two points.
    Circle,
    /// Isoceles triangle with its apex at the top-middle.
    Triangle,
    /// Straight segment.
    Line,
    /// Straight segment with an arrowhead at the end point.
    Arrow,
}

/// A freehand polyline or a two-point shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FreehandStroke {
    /// Unique identifier.
    pub id: ElementId,
    /// Samples in input order.
    pub points: Vec<Point>,
    /// Stroke color as hex.
    pub color: String,
    /// Line width in pixels.
    pub stroke_width: f32,
    /// Opacity 0..1 (absent means opaque).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f32>,
    /// Brush style.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brush: Option<BrushType>,
    /// When set, `points[0]` and `points[1]` are the shape's bounding corners.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shape: Option<ShapeKind>,
}

impl FreehandStroke {
    /// Create a polyline stroke.
    #[must_use]
    pub fn polyline(points: Vec<Point>, color: impl Into<String>, stroke_width: f32) -> Self {
        Self {
            id: ElementId::new(),
            points,
            color: color.into(),
            stroke_width,
            opacity: None,
            brush: None,
            shape: None,
        }
    }

    /// Create a two-point shape stroke.
    #[must_use]
    pub fn shape(
        kind: ShapeKind,
        start: Point,
        end: Point,
        color: impl Into<String>,
        stroke_width: f32,
    ) -> Self {
        Self {
            shape: Some(kind),
            ..Self::polyline(vec![start, end], color, stroke_width)
        }
    }

    /// Shape corners, if this stroke is a shape with at least two points.
    #[must_use]
    pub fn shape_corners(&self) -> Option<(ShapeKind, Point, Point)> {
        match (self.shape, self.points.as_slice()) {
            (Some(kind), [start, end, ..]) => Some((kind, *start, *end)),
            _ => None,
        }
    }

    /// Bounding box of all samples.
    #[must_use]
    pub fn bounds(&self) -> Option<Rect> {
        let first = *self.points.first()?;
        let (min, max) = self.points.iter().fold((first, first), |(lo, hi), p| {
            (
                Point::new(lo.x.min(p.x), lo.y.min(p.y)),
                Point::new(hi.x.max(p.x), hi.y.max(p.y)),
            )
        });
        Some(Rect::from_corners(min, max))
    }

    /// Whether any sample lies strictly closer than `radius` to `point`.
    #[must_use]
    pub fn touches(&self, point: Point, radius: f32) -> bool {
        self.points.iter().any(|p| p.distance_to(point) < radius)
    }

    /// Effective opacity.
    #[must_use]
    pub fn alpha(&self) -> f32 {
        self.opacity.unwrap_or(1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shape_corners_need_two_points() {
        let mut stroke = FreehandStroke::shape(
            ShapeKind::Rectangle,
            Point::new(0.0, 0.0),
            Point::new(10.0, 10.0),
            "#fff",
            2.0,
        );
        assert!(stroke.shape_corners().is_some());
        stroke.points.truncate(1);
        assert!(stroke.shape_corners().is_none());
    }

    #[test]
    fn touches_uses_strict_radius() {
        let stroke = FreehandStroke::polyline(vec![Point::new(0.0, 0.0)], "#fff", 2.0);
        assert!(stroke.touches(Point::new(1.0, 1.0), 2.0));
        assert!(!stroke.touches(Point::new(2.0, 0.0), 2.0));
    }

    #[test]
    fn bounds_cover_all_points() {
        let stroke = FreehandStroke::polyline(
            vec![Point::new(5.0, 9.0), Point::new(-1.0, 3.0), Point::new(2.0, 12.0)],
            "#fff",
            1.0,
        );
        let b = stroke.bounds().expect("bounds");
        assert_eq!(b.origin, Point::new(-1.0, 3.0));
        assert!((b.right() - 5.0).abs() < f32::EPSILON);
        assert!((b.bottom() - 12.0).abs() < f32::EPSILON);
    }
}
