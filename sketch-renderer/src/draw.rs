//! # Frame Drawing
//!
//! Turns a document into painter calls. Every frame is drawn from scratch in
//! a fixed order:
//!
//! ```text
//! background → grid → connections → strokes → preview → texts → elements
//! ```
//!
//! Elements come last so icons sit on top of the lines that join them.

use std::f32::consts::PI;

use sketch_core::text::{APPROX_GLYPH_ADVANCE, LINE_HEIGHT_FACTOR};
use sketch_core::{
    CanvasDocument, Connection, ConnectionType, ElementId, ElementType, FreehandStroke, Point,
    Rect, ShapeKind, Size, SketchController, SystemElement, TextAnnotation,
};

use crate::painter::{Glow, Layer, Painter, Path, StrokeStyle, TextAlign, TextBaseline, TextStyle};
use crate::viewport::Viewport;
use crate::RendererConfig;

/// Bezier handle offset as a fraction of the horizontal distance.
const CONNECTION_CURVE: f32 = 0.22;

/// Connection arrowhead side length.
const CONNECTION_ARROW_LENGTH: f32 = 13.0;

/// Connection arrowhead half-angle.
const CONNECTION_ARROW_ANGLE: f32 = PI / 7.0;

/// Shape-tool arrowhead side length.
const SHAPE_ARROW_LENGTH: f32 = 15.0;

/// Shape-tool arrowhead half-angle.
const SHAPE_ARROW_ANGLE: f32 = PI / 6.0;

/// Dash pattern for dashed connections and highlight outlines.
const DASH: [f32; 2] = [8.0, 6.0];

/// Gap between an element and its highlight outline.
const HIGHLIGHT_PADDING: f32 = 7.0;

/// Everything needed to draw one frame.
#[derive(Debug, Clone)]
pub struct Frame<'a> {
    /// Committed contents.
    pub document: &'a CanvasDocument,
    /// Stroke or shape being drawn.
    pub preview: Option<FreehandStroke>,
    /// Fill for closed preview shapes.
    pub preview_fill: Option<String>,
    /// Element drawn highlighted regardless of selection (connector source).
    pub highlighted: Option<ElementId>,
    /// Annotation being typed into and the caret position in characters.
    pub caret: Option<(ElementId, usize)>,
    /// Canvas area to fill, in document coordinates.
    pub area: Rect,
    /// Scale applied to everything (1.0 = 100%).
    pub zoom: f32,
}

impl<'a> Frame<'a> {
    /// A frame showing only committed contents.
    #[must_use]
    pub fn new(document: &'a CanvasDocument, area: Rect) -> Self {
        Self {
            document,
            preview: None,
            preview_fill: None,
            highlighted: None,
            caret: None,
            area,
            zoom: 1.0,
        }
    }

    /// A frame of the controller's live state.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn from_controller(controller: &'a SketchController, viewport: &Viewport) -> Self {
        let zoom = controller.zoom() as f32 / 100.0;
        Self {
            document: controller.document(),
            preview: controller.preview(),
            preview_fill: controller.style().fill_color.clone(),
            highlighted: controller.connecting_from(),
            caret: controller.text_edit().map(|e| (e.annotation, e.cursor)),
            area: viewport.visible_area(zoom),
            zoom,
        }
    }
}

/// Counts from one [`render_frame`] call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    /// Connections drawn.
    pub connections_drawn: usize,
    /// Connections skipped for a missing endpoint.
    pub connections_skipped: usize,
    /// Elements drawn.
    pub elements_drawn: usize,
}

/// Draw a complete frame.
pub fn render_frame(painter: &mut dyn Painter, frame: &Frame<'_>, config: &RendererConfig) -> FrameStats {
    let document = frame.document;
    let mut stats = FrameStats::default();

    painter.save();
    painter.scale(frame.zoom);

    painter.begin_layer(Layer::Background);
    draw_background(painter, frame.area, config);

    painter.begin_layer(Layer::Grid);
    if config.show_grid {
        draw_grid(painter, frame.area, config);
    }

    painter.begin_layer(Layer::Connections);
    for connection in document.connections() {
        if draw_connection(painter, connection, document, config) {
            stats.connections_drawn += 1;
        } else {
            stats.connections_skipped += 1;
        }
    }

    painter.begin_layer(Layer::Strokes);
    for stroke in document.strokes() {
        draw_stroke(painter, stroke, None);
    }

    painter.begin_layer(Layer::Preview);
    if let Some(preview) = &frame.preview {
        draw_stroke(painter, preview, frame.preview_fill.as_deref());
    }

    painter.begin_layer(Layer::Texts);
    for annotation in document.texts() {
        let caret = frame
            .caret
            .and_then(|(id, cursor)| (id == annotation.id).then_some(cursor));
        draw_text_annotation(painter, annotation, caret);
    }

    painter.begin_layer(Layer::Elements);
    for element in document.elements() {
        let highlighted = element.selected || frame.highlighted == Some(element.id);
        draw_element(painter, element, highlighted, config);
        stats.elements_drawn += 1;
    }

    painter.restore();

    if stats.connections_skipped > 0 {
        tracing::trace!(
            "Skipped {} connection(s) with missing endpoints",
            stats.connections_skipped
        );
    }
    stats
}

/// Fill the canvas area with the background color.
pub fn draw_background(painter: &mut dyn Painter, area: Rect, config: &RendererConfig) {
    painter.fill_rect(area, &config.background);
}

/// Dot grid at every multiple of the grid size strictly inside `area`.
pub fn draw_grid(painter: &mut dyn Painter, area: Rect, config: &RendererConfig) {
    let step = config.grid_size;
    if step <= 0.0 {
        return;
    }
    let first = |origin: f32| ((origin / step).floor() + 1.0) * step;
    let mut x = first(area.origin.x);
    while x < area.right() {
        let mut y = first(area.origin.y);
        while y < area.bottom() {
            painter.fill_circle(Point::new(x, y), 1.0, &config.grid_color);
            y += step;
        }
        x += step;
    }
}

/// Draw a connection between its endpoints' centers.
///
/// Returns `false`, drawing nothing, when either endpoint is missing.
pub fn draw_connection(
    painter: &mut dyn Painter,
    connection: &Connection,
    document: &CanvasDocument,
    config: &RendererConfig,
) -> bool {
    let Some((from, to)) = document.resolve_connection(connection) else {
        return false;
    };
    let (start, end) = (from.center(), to.center());
    let dx = end.x - start.x;
    let ctrl1 = Point::new(start.x + CONNECTION_CURVE * dx, start.y);
    let ctrl2 = Point::new(end.x - CONNECTION_CURVE * dx, end.y);

    let mut stroke = StrokeStyle::solid(config.connection_color.clone(), config.connection_width);
    if connection.connection_type == ConnectionType::Dashed {
        stroke = stroke.dashed(&DASH);
    }
    painter.stroke_path(&Path::new().move_to(start).cubic_to(ctrl1, ctrl2, end), &stroke);

    if connection.connection_type.has_arrowhead() {
        let solid = StrokeStyle::solid(config.connection_color.clone(), config.connection_width);
        let angle = (end.y - start.y).atan2(dx);
        painter.stroke_path(
            &arrowhead(end, angle, CONNECTION_ARROW_LENGTH, CONNECTION_ARROW_ANGLE),
            &solid,
        );
    }

    if let Some(label) = connection.label.as_deref().filter(|l| !l.is_empty()) {
        // Curve midpoint (t = 0.5).
        let mid = Point::new(
            (start.x + 3.0 * ctrl1.x + 3.0 * ctrl2.x + end.x) / 8.0,
            (start.y + 3.0 * ctrl1.y + 3.0 * ctrl2.y + end.y) / 8.0,
        );
        painter.fill_text(
            label,
            mid,
            &TextStyle {
                color: config.connection_color.clone(),
                font_size: config.connection_label_size,
                font_family: config.font_family.clone(),
                align: TextAlign::Center,
                baseline: TextBaseline::Middle,
            },
        );
    }
    true
}

fn arrowhead(tip: Point, angle: f32, length: f32, spread: f32) -> Path {
    let wing = |a: f32| Point::new(tip.x - length * a.cos(), tip.y - length * a.sin());
    Path::new()
        .move_to(tip)
        .line_to(wing(angle - spread))
        .move_to(tip)
        .line_to(wing(angle + spread))
}

/// Draw a committed or in-progress stroke.
///
/// Shape strokes dispatch to [`draw_shape`]; polylines need two samples.
pub fn draw_stroke(painter: &mut dyn Painter, stroke: &FreehandStroke, fill: Option<&str>) {
    let style = StrokeStyle::solid(stroke.color.clone(), stroke.stroke_width).rounded();
    painter.save();
    painter.set_alpha(stroke.alpha());
    if let Some((kind, start, end)) = stroke.shape_corners() {
        draw_shape(painter, kind, start, end, &style, fill);
    } else if stroke.points.len() >= 2 {
        painter.stroke_path(&Path::polyline(&stroke.points), &style);
    }
    painter.restore();
}

/// Draw a two-point shape.
pub fn draw_shape(
    painter: &mut dyn Painter,
    kind: ShapeKind,
    start: Point,
    end: Point,
    stroke: &StrokeStyle,
    fill: Option<&str>,
) {
    let (w, h) = (end.x - start.x, end.y - start.y);
    match kind {
        ShapeKind::Rectangle => {
            let rect = Rect::from_corners(start, end);
            if let Some(fill) = fill {
                painter.fill_rect(rect, fill);
            }
            painter.stroke_rect(rect, stroke);
        }
        ShapeKind::Circle => {
            let center = Point::new(start.x + w / 2.0, start.y + h / 2.0);
            let radius = w.hypot(h) / 2.0;
            if let Some(fill) = fill {
                painter.fill_circle(center, radius, fill);
            }
            painter.stroke_circle(center, radius, stroke);
        }
        ShapeKind::Triangle => {
            let path = Path::new()
                .move_to(Point::new(start.x + w / 2.0, start.y))
                .line_to(Point::new(start.x, end.y))
                .line_to(end)
                .close();
            if let Some(fill) = fill {
                painter.fill_path(&path, fill);
            }
            painter.stroke_path(&path, stroke);
        }
        ShapeKind::Line => painter.stroke_path(&Path::polyline(&[start, end]), stroke),
        ShapeKind::Arrow => {
            painter.stroke_path(&Path::polyline(&[start, end]), stroke);
            let angle = h.atan2(w);
            painter.stroke_path(
                &arrowhead(end, angle, SHAPE_ARROW_LENGTH, SHAPE_ARROW_ANGLE),
                stroke,
            );
        }
    }
}

/// Draw a text annotation and, when editing, its caret.
#[allow(clippy::cast_precision_loss)]
pub fn draw_text_annotation(painter: &mut dyn Painter, annotation: &TextAnnotation, caret: Option<usize>) {
    let line_height = annotation.font_size * LINE_HEIGHT_FACTOR;
    let style = TextStyle {
        color: annotation.color.clone(),
        font_size: annotation.font_size,
        font_family: annotation.font_family.clone(),
        align: TextAlign::Left,
        baseline: TextBaseline::Top,
    };
    let origin = annotation.position;

    if !annotation.is_blank() {
        for (i, line) in annotation.lines().enumerate() {
            let y = origin.y + i as f32 * line_height;
            painter.fill_text(line, Point::new(origin.x, y), &style);
        }
    }

    if let Some(cursor) = caret {
        let (line, column) = caret_line_column(&annotation.text, cursor);
        let x = origin.x + column as f32 * annotation.font_size * APPROX_GLYPH_ADVANCE;
        let y = origin.y + line as f32 * line_height;
        painter.stroke_path(
            &Path::polyline(&[Point::new(x, y), Point::new(x, y + annotation.font_size)]),
            &StrokeStyle::solid(annotation.color.clone(), 2.0),
        );
    }
}

/// Line and column of a character offset.
fn caret_line_column(text: &str, cursor: usize) -> (usize, usize) {
    let mut line = 0;
    let mut column = 0;
    for c in text.chars().take(cursor) {
        if c == '\n' {
            line += 1;
            column = 0;
        } else {
            column += 1;
        }
    }
    (line, column)
}

/// Draw an element icon, its label, and the highlight outline when set.
pub fn draw_element(
    painter: &mut dyn Painter,
    element: &SystemElement,
    highlighted: bool,
    config: &RendererConfig,
) {
    let bounds = element.bounds();
    let (x, y) = (bounds.origin.x, bounds.origin.y);
    let (w, h) = (bounds.size.width, bounds.size.height);
    let outline = StrokeStyle::solid(element.color.clone(), 2.0);
    let fill = element.fill_color.as_str();

    painter.save();
    if highlighted {
        painter.set_glow(Some(Glow {
            color: config.highlight_color.clone(),
            blur: config.highlight_blur,
        }));
    }

    match element.element_type {
        ElementType::Box | ElementType::Server => {
            painter.fill_rect(bounds, fill);
            painter.stroke_rect(bounds, &outline);
        }
        ElementType::Database => {
            let body = Rect::new(
                Point::new(x, y + 10.0),
                Size::new(w, (h - 20.0).max(0.0)),
            );
            painter.fill_rect(body, fill);
            painter.stroke_rect(body, &outline);
            let top = Point::new(x + w / 2.0, y + 10.0);
            painter.fill_ellipse(top, w / 2.0, 8.0, fill);
            painter.stroke_ellipse(top, w / 2.0, 8.0, &outline);
            painter.stroke_path(
                &Path::half_ellipse(Point::new(x + w / 2.0, y + h - 10.0), w / 2.0, 8.0, true),
                &outline,
            );
        }
        ElementType::Cloud => {
            let puffs = [
                (0.3, 0.62, 0.28),
                (0.5, 0.42, 0.36),
                (0.7, 0.62, 0.28),
                (0.5, 0.72, 0.3),
            ];
            for (fx, fy, fr) in puffs {
                painter.fill_circle(Point::new(x + w * fx, y + h * fy), h * fr, fill);
            }
            for (fx, fy, fr) in puffs {
                painter.stroke_circle(Point::new(x + w * fx, y + h * fy), h * fr, &outline);
            }
        }
        ElementType::User => {
            let cx = x + w / 2.0;
            let figure = StrokeStyle::solid(element.color.clone(), 3.0).rounded();
            painter.fill_circle(Point::new(cx, y + h * 0.5), w.min(h) * 0.44, fill);
            painter.stroke_circle(Point::new(cx, y + h * 0.3125), h * 0.15, &figure);
            painter.stroke_path(
                &Path::half_ellipse(Point::new(cx, y + h * 0.6875), h * 0.275, h * 0.275, false),
                &figure,
            );
        }
        ElementType::Api => {
            painter.fill_rect(bounds, fill);
            painter.stroke_rect(bounds, &outline);
            let brackets = Path::new()
                .move_to(Point::new(x + 15.0, y + 15.0))
                .line_to(Point::new(x + 10.0, y + 15.0))
                .line_to(Point::new(x + 10.0, y + h - 15.0))
                .line_to(Point::new(x + 15.0, y + h - 15.0))
                .move_to(Point::new(x + w - 15.0, y + 15.0))
                .line_to(Point::new(x + w - 10.0, y + 15.0))
                .line_to(Point::new(x + w - 10.0, y + h - 15.0))
                .line_to(Point::new(x + w - 15.0, y + h - 15.0));
            painter.stroke_path(&brackets, &outline);
        }
    }
    painter.set_glow(None);

    if !element.text.is_empty() {
        painter.fill_text(
            &element.text,
            element.center(),
            &TextStyle {
                color: element.color.clone(),
                font_size: element.font_size,
                font_family: config.font_family.clone(),
                align: TextAlign::Center,
                baseline: TextBaseline::Middle,
            },
        );
    }

    if highlighted {
        painter.stroke_rect(
            bounds.inflate(HIGHLIGHT_PADDING),
            &StrokeStyle::solid(element.color.clone(), 1.0).dashed(&DASH),
        );
    }
    painter.restore();
}
