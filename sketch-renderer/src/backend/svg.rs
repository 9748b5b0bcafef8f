//! SVG backend.
//!
//! Painter calls become SVG markup. `save`/`restore` pairs map onto nested
//! `<g>` groups so scale and opacity nest the same way they do on a 2D
//! canvas context. Glows become `feDropShadow` filters collected in `<defs>`.

use std::fmt::Write;

use sketch_core::{Point, Rect, Size};

use crate::draw::{render_frame, Frame, FrameStats};
use crate::painter::{
    Glow, Painter, Path, PathSegment, StrokeStyle, TextAlign, TextBaseline, TextStyle,
};
use crate::viewport::Viewport;
use crate::{BackendType, RenderResult, RendererConfig};

use super::RenderBackend;

#[derive(Debug, Clone, Default)]
struct GroupState {
    /// `<g>` elements opened since the matching `save`.
    open_groups: usize,
    /// Filter id applied to shapes.
    glow: Option<String>,
}

/// A [`Painter`] that writes SVG markup.
#[derive(Debug, Clone)]
pub struct SvgPainter {
    view: Rect,
    width: u32,
    height: u32,
    body: String,
    defs: String,
    filters: Vec<Glow>,
    state: GroupState,
    stack: Vec<GroupState>,
}

impl SvgPainter {
    /// Painter for the `view` area, output at `width` x `height` pixels.
    #[must_use]
    pub fn new(view: Rect, width: u32, height: u32) -> Self {
        Self {
            view,
            width: width.max(1),
            height: height.max(1),
            body: String::with_capacity(4096),
            defs: String::new(),
            filters: Vec::new(),
            state: GroupState::default(),
            stack: Vec::new(),
        }
    }

    /// Close any open groups and return the document.
    #[must_use]
    pub fn finish(mut self) -> String {
        self.close_groups();
        while let Some(state) = self.stack.pop() {
            self.state = state;
            self.close_groups();
        }

        let mut svg = String::with_capacity(self.body.len() + self.defs.len() + 256);
        let _ = write!(
            svg,
            "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{}\" height=\"{}\" viewBox=\"{} {} {} {}\">",
            self.width,
            self.height,
            self.view.origin.x,
            self.view.origin.y,
            self.view.size.width,
            self.view.size.height,
        );
        if !self.defs.is_empty() {
            let _ = write!(svg, "<defs>{}</defs>", self.defs);
        }
        svg.push_str(&self.body);
        svg.push_str("</svg>");
        svg
    }

    fn close_groups(&mut self) {
        for _ in 0..self.state.open_groups {
            self.body.push_str("</g>");
        }
        self.state.open_groups = 0;
    }

    fn open_group(&mut self, attrs: &str) {
        let _ = write!(self.body, "<g {attrs}>");
        self.state.open_groups += 1;
    }

    fn filter_attr(&self) -> String {
        self.state
            .glow
            .as_ref()
            .map(|id| format!(" filter=\"url(#{id})\""))
            .unwrap_or_default()
    }

    fn filter_id(&mut self, glow: &Glow) -> String {
        let index = match self.filters.iter().position(|g| g == glow) {
            Some(i) => i,
            None => {
                let i = self.filters.len();
                let _ = write!(
                    self.defs,
                    "<filter id=\"glow{i}\" x=\"-50%\" y=\"-50%\" width=\"200%\" height=\"200%\"><feDropShadow dx=\"0\" dy=\"0\" stdDeviation=\"{}\" flood-color=\"{}\"/></filter>",
                    glow.blur / 2.0,
                    escape_xml(&glow.color),
                );
                self.filters.push(glow.clone());
                i
            }
        };
        format!("glow{index}")
    }
}

fn stroke_attrs(stroke: &StrokeStyle) -> String {
    let mut attrs = format!(
        "fill=\"none\" stroke=\"{}\" stroke-width=\"{}\"",
        escape_xml(&stroke.color),
        stroke.width
    );
    if !stroke.dash.is_empty() {
        let dash: Vec<String> = stroke.dash.iter().map(ToString::to_string).collect();
        let _ = write!(attrs, " stroke-dasharray=\"{}\"", dash.join(" "));
    }
    if stroke.round {
        attrs.push_str(" stroke-linecap=\"round\" stroke-linejoin=\"round\"");
    }
    attrs
}

fn path_data(path: &Path) -> String {
    let mut d = String::new();
    for segment in path.segments() {
        if !d.is_empty() {
            d.push(' ');
        }
        let _ = match *segment {
            PathSegment::MoveTo(p) => write!(d, "M{} {}", p.x, p.y),
            PathSegment::LineTo(p) => write!(d, "L{} {}", p.x, p.y),
            PathSegment::QuadTo { ctrl, to } => {
                write!(d, "Q{} {} {} {}", ctrl.x, ctrl.y, to.x, to.y)
            }
            PathSegment::CubicTo { ctrl1, ctrl2, to } => write!(
                d,
                "C{} {} {} {} {} {}",
                ctrl1.x, ctrl1.y, ctrl2.x, ctrl2.y, to.x, to.y
            ),
            PathSegment::Close => write!(d, "Z"),
        };
    }
    d
}

impl Painter for SvgPainter {
    fn save(&mut self) {
        self.stack.push(self.state.clone());
        self.state.open_groups = 0;
    }

    fn restore(&mut self) {
        self.close_groups();
        if let Some(state) = self.stack.pop() {
            self.state = state;
        }
    }

    fn scale(&mut self, factor: f32) {
        if (factor - 1.0).abs() > f32::EPSILON {
            self.open_group(&format!("transform=\"scale({factor})\""));
        }
    }

    fn set_alpha(&mut self, alpha: f32) {
        if alpha < 1.0 {
            self.open_group(&format!("opacity=\"{}\"", alpha.clamp(0.0, 1.0)));
        }
    }

    fn set_glow(&mut self, glow: Option<Glow>) {
        let id = glow.map(|g| self.filter_id(&g));
        self.state.glow = id;
    }

    fn fill_rect(&mut self, rect: Rect, color: &str) {
        let filter = self.filter_attr();
        let _ = write!(
            self.body,
            "<rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" fill=\"{}\"{filter}/>",
            rect.origin.x,
            rect.origin.y,
            rect.size.width,
            rect.size.height,
            escape_xml(color),
        );
    }

    fn stroke_rect(&mut self, rect: Rect, stroke: &StrokeStyle) {
        let filter = self.filter_attr();
        let _ = write!(
            self.body,
            "<rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" {}{filter}/>",
            rect.origin.x,
            rect.origin.y,
            rect.size.width,
            rect.size.height,
            stroke_attrs(stroke),
        );
    }

    fn fill_ellipse(&mut self, center: Point, rx: f32, ry: f32, color: &str) {
        let filter = self.filter_attr();
        let _ = write!(
            self.body,
            "<ellipse cx=\"{}\" cy=\"{}\" rx=\"{rx}\" ry=\"{ry}\" fill=\"{}\"{filter}/>",
            center.x,
            center.y,
            escape_xml(color),
        );
    }

    fn stroke_ellipse(&mut self, center: Point, rx: f32, ry: f32, stroke: &StrokeStyle) {
        let filter = self.filter_attr();
        let _ = write!(
            self.body,
            "<ellipse cx=\"{}\" cy=\"{}\" rx=\"{rx}\" ry=\"{ry}\" {}{filter}/>",
            center.x,
            center.y,
            stroke_attrs(stroke),
        );
    }

    fn fill_path(&mut self, path: &Path, color: &str) {
        if path.is_empty() {
            return;
        }
        let filter = self.filter_attr();
        let _ = write!(
            self.body,
            "<path d=\"{}\" fill=\"{}\"{filter}/>",
            path_data(path),
            escape_xml(color),
        );
    }

    fn stroke_path(&mut self, path: &Path, stroke: &StrokeStyle) {
        if path.is_empty() {
            return;
        }
        let filter = self.filter_attr();
        let _ = write!(
            self.body,
            "<path d=\"{}\" {}{filter}/>",
            path_data(path),
            stroke_attrs(stroke),
        );
    }

    fn fill_text(&mut self, text: &str, at: Point, style: &TextStyle) {
        let anchor = match style.align {
            TextAlign::Left => "start",
            TextAlign::Center => "middle",
        };
        let baseline = match style.baseline {
            TextBaseline::Top => "hanging",
            TextBaseline::Middle => "middle",
        };
        let _ = write!(
            self.body,
            "<text x=\"{}\" y=\"{}\" font-size=\"{}\" font-family=\"{}\" fill=\"{}\" text-anchor=\"{anchor}\" dominant-baseline=\"{baseline}\">{}</text>",
            at.x,
            at.y,
            style.font_size,
            escape_xml(&style.font_family),
            escape_xml(&style.color),
            escape_xml(text),
        );
    }
}

/// Escape special XML characters.
#[must_use]
pub fn escape_xml(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

/// Renders frames to an SVG string sized to the viewport.
#[derive(Debug, Clone, Default)]
pub struct SvgBackend {
    viewport: Viewport,
    last_svg: String,
}

impl SvgBackend {
    /// Create a new SVG backend.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Markup of the last rendered frame.
    #[must_use]
    pub fn svg(&self) -> &str {
        &self.last_svg
    }
}

impl RenderBackend for SvgBackend {
    fn backend_type(&self) -> BackendType {
        BackendType::Svg
    }

    fn render(&mut self, frame: &Frame<'_>, config: &RendererConfig) -> RenderResult<FrameStats> {
        // Frame coordinates are scaled by zoom inside the document, so the
        // view box is always the unscaled canvas.
        let view = Rect::new(
            Point::new(0.0, 0.0),
            Size::new(self.viewport.css_width, self.viewport.css_height),
        );
        let (width, height) = self.viewport.backing_size();
        let mut painter = SvgPainter::new(view, width, height);
        let stats = render_frame(&mut painter, frame, config);
        self.last_svg = painter.finish();
        Ok(stats)
    }

    fn resize(&mut self, viewport: Viewport) -> RenderResult<()> {
        self.viewport = viewport;
        Ok(())
    }
}
