//! Primitive draw calls shared by every backend.

use sketch_core::{Point, Rect};

/// How paths and outlines are stroked.
#[derive(Debug, Clone, PartialEq)]
pub struct StrokeStyle {
    /// Stroke color as any CSS color string.
    pub color: String,
    /// Line width in pixels.
    pub width: f32,
    /// Dash pattern; empty means solid.
    pub dash: Vec<f32>,
    /// Round caps and joins.
    pub round: bool,
}

impl StrokeStyle {
    /// Solid stroke with butt caps.
    #[must_use]
    pub fn solid(color: impl Into<String>, width: f32) -> Self {
        Self {
            color: color.into(),
            width,
            dash: Vec::new(),
            round: false,
        }
    }

    /// Set the dash pattern.
    #[must_use]
    pub fn dashed(mut self, pattern: &[f32]) -> Self {
        self.dash = pattern.to_vec();
        self
    }

    /// Use round caps and joins.
    #[must_use]
    pub fn rounded(mut self) -> Self {
        self.round = true;
        self
    }
}

/// Horizontal text anchor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextAlign {
    /// Anchor at the left edge.
    Left,
    /// Anchor at the center.
    Center,
}

/// Vertical text anchor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextBaseline {
    /// Anchor at the top of the em box.
    Top,
    /// Anchor at the middle of the em box.
    Middle,
}

/// Font and placement for a text run.
#[derive(Debug, Clone, PartialEq)]
pub struct TextStyle {
    /// Fill color.
    pub color: String,
    /// Font size in pixels.
    pub font_size: f32,
    /// CSS font family.
    pub font_family: String,
    /// Horizontal anchor.
    pub align: TextAlign,
    /// Vertical anchor.
    pub baseline: TextBaseline,
}

/// Soft shadow drawn behind subsequent shapes.
#[derive(Debug, Clone, PartialEq)]
pub struct Glow {
    /// Shadow color.
    pub color: String,
    /// Blur radius in pixels.
    pub blur: f32,
}

/// One path instruction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PathSegment {
    /// Start a new subpath.
    MoveTo(Point),
    /// Straight line.
    LineTo(Point),
    /// Quadratic Bezier.
    QuadTo {
        /// Control point.
        ctrl: Point,
        /// End point.
        to: Point,
    },
    /// Cubic Bezier.
    CubicTo {
        /// First control point.
        ctrl1: Point,
        /// Second control point.
        ctrl2: Point,
        /// End point.
        to: Point,
    },
    /// Close the current subpath.
    Close,
}

/// Cubic Bezier handle length for a quarter ellipse, as a fraction of the radius.
const KAPPA: f32 = 0.552_284_8;

/// A sequence of path segments.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Path {
    segments: Vec<PathSegment>,
}

impl Path {
    /// Empty path.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Open polyline through `points`.
    #[must_use]
    pub fn polyline(points: &[Point]) -> Self {
        let mut path = Self::new();
        let mut iter = points.iter();
        if let Some(first) = iter.next() {
            path = path.move_to(*first);
        }
        for p in iter {
            path = path.line_to(*p);
        }
        path
    }

    /// Half of an axis-aligned ellipse, as two cubic arcs.
    ///
    /// The lower half runs from the right extreme through the bottom to the
    /// left extreme; the upper half runs from the left through the top to the
    /// right.
    #[must_use]
    pub fn half_ellipse(center: Point, rx: f32, ry: f32, lower: bool) -> Self {
        let (cx, cy) = (center.x, center.y);
        let (kx, ky) = (rx * KAPPA, ry * KAPPA);
        let dy = if lower { ry } else { -ry };
        let dky = if lower { ky } else { -ky };
        let (start, end) = if lower {
            (Point::new(cx + rx, cy), Point::new(cx - rx, cy))
        } else {
            (Point::new(cx - rx, cy), Point::new(cx + rx, cy))
        };
        let sx = if lower { -1.0 } else { 1.0 };
        let extreme = Point::new(cx, cy + dy);
        Self::new()
            .move_to(start)
            .cubic_to(
                Point::new(start.x, cy + dky),
                Point::new(cx - sx * kx, extreme.y),
                extreme,
            )
            .cubic_to(
                Point::new(cx + sx * kx, extreme.y),
                Point::new(end.x, cy + dky),
                end,
            )
    }

    /// Append a move.
    #[must_use]
    pub fn move_to(mut self, p: Point) -> Self {
        self.segments.push(PathSegment::MoveTo(p));
        self
    }

    /// Append a line.
    #[must_use]
    pub fn line_to(mut self, p: Point) -> Self {
        self.segments.push(PathSegment::LineTo(p));
        self
    }

    /// Append a quadratic curve.
    #[must_use]
    pub fn quad_to(mut self, ctrl: Point, to: Point) -> Self {
        self.segments.push(PathSegment::QuadTo { ctrl, to });
        self
    }

    /// Append a cubic curve.
    #[must_use]
    pub fn cubic_to(mut self, ctrl1: Point, ctrl2: Point, to: Point) -> Self {
        self.segments.push(PathSegment::CubicTo { ctrl1, ctrl2, to });
        self
    }

    /// Close the current subpath.
    #[must_use]
    pub fn close(mut self) -> Self {
        self.segments.push(PathSegment::Close);
        self
    }

    /// Segments in order.
    #[must_use]
    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    /// Whether the path has no segments.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}

/// Rendering pass a group of draw calls belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Layer {
    /// Solid background fill.
    Background,
    /// Dot grid.
    Grid,
    /// Element-to-element connections.
    Connections,
    /// Committed strokes and shapes.
    Strokes,
    /// The stroke or shape being drawn.
    Preview,
    /// Text annotations.
    Texts,
    /// Architecture elements.
    Elements,
}

/// Immediate-mode 2D drawing surface.
///
/// Coordinates are canvas pixels before [`scale`](Self::scale). State set by
/// `scale`, `set_alpha` and `set_glow` lasts until the matching `restore`.
pub trait Painter {
    /// Mark the start of a rendering pass.
    fn begin_layer(&mut self, _layer: Layer) {}

    /// Push the drawing state.
    fn save(&mut self);

    /// Pop the drawing state.
    fn restore(&mut self);

    /// Scale subsequent drawing uniformly.
    fn scale(&mut self, factor: f32);

    /// Set global opacity 0..1.
    fn set_alpha(&mut self, alpha: f32);

    /// Set or clear the glow behind subsequent shapes.
    fn set_glow(&mut self, glow: Option<Glow>);

    /// Fill an axis-aligned rectangle.
    fn fill_rect(&mut self, rect: Rect, color: &str);

    /// Outline an axis-aligned rectangle.
    fn stroke_rect(&mut self, rect: Rect, stroke: &StrokeStyle);

    /// Fill an axis-aligned ellipse.
    fn fill_ellipse(&mut self, center: Point, rx: f32, ry: f32, color: &str);

    /// Outline an axis-aligned ellipse.
    fn stroke_ellipse(&mut self, center: Point, rx: f32, ry: f32, stroke: &StrokeStyle);

    /// Fill a closed path.
    fn fill_path(&mut self, path: &Path, color: &str);

    /// Stroke a path.
    fn stroke_path(&mut self, path: &Path, stroke: &StrokeStyle);

    /// Draw one line of text.
    fn fill_text(&mut self, text: &str, at: Point, style: &TextStyle);

    /// Fill a circle.
    fn fill_circle(&mut self, center: Point, radius: f32, color: &str) {
        self.fill_ellipse(center, radius, radius, color);
    }

    /// Outline a circle.
    fn stroke_circle(&mut self, center: Point, radius: f32, stroke: &StrokeStyle) {
        self.stroke_ellipse(center, radius, radius, stroke);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn polyline_starts_with_move() {
        let path = Path::polyline(&[Point::new(0.0, 0.0), Point::new(1.0, 1.0)]);
        assert_eq!(
            path.segments(),
            &[
                PathSegment::MoveTo(Point::new(0.0, 0.0)),
                PathSegment::LineTo(Point::new(1.0, 1.0)),
            ]
        );
        assert!(Path::polyline(&[]).is_empty());
    }

    #[test]
    fn half_ellipse_passes_through_extremes() {
        let lower = Path::half_ellipse(Point::new(10.0, 10.0), 5.0, 2.0, true);
        let ends: Vec<Point> = lower
            .segments()
            .iter()
            .filter_map(|s| match s {
                PathSegment::MoveTo(p) | PathSegment::CubicTo { to: p, .. } => Some(*p),
                _ => None,
            })
            .collect();
        assert_eq!(
            ends,
            vec![
                Point::new(15.0, 10.0),
                Point::new(10.0, 12.0),
                Point::new(5.0, 10.0)
            ]
        );

        let upper = Path::half_ellipse(Point::new(0.0, 0.0), 4.0, 4.0, false);
        assert!(matches!(
            upper.segments()[1],
            PathSegment::CubicTo { to, .. } if to == Point::new(0.0, -4.0)
        ));
    }
}
