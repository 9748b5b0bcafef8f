//! `CanvasRenderingContext2d` painter and backend.

use sketch_core::{Point, Rect};
use sketch_renderer::{
    render_frame, BackendType, Frame, FrameStats, Glow, Painter, Path, PathSegment,
    RenderBackend, RenderError, RenderResult, RendererConfig, StrokeStyle, TextAlign,
    TextBaseline, TextStyle, Viewport,
};
use wasm_bindgen::JsValue;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

/// Draws straight into a browser 2D context.
pub struct Canvas2dPainter<'a> {
    ctx: &'a CanvasRenderingContext2d,
}

impl<'a> Canvas2dPainter<'a> {
    /// Wrap a context. The caller sets the base transform.
    #[must_use]
    pub fn new(ctx: &'a CanvasRenderingContext2d) -> Self {
        Self { ctx }
    }

    fn trace_path(&self, path: &Path) {
        self.ctx.begin_path();
        for segment in path.segments() {
            match *segment {
                PathSegment::MoveTo(p) => self.ctx.move_to(f64::from(p.x), f64::from(p.y)),
                PathSegment::LineTo(p) => self.ctx.line_to(f64::from(p.x), f64::from(p.y)),
                PathSegment::QuadTo { ctrl, to } => self.ctx.quadratic_curve_to(
                    f64::from(ctrl.x),
                    f64::from(ctrl.y),
                    f64::from(to.x),
                    f64::from(to.y),
                ),
                PathSegment::CubicTo { ctrl1, ctrl2, to } => self.ctx.bezier_curve_to(
                    f64::from(ctrl1.x),
                    f64::from(ctrl1.y),
                    f64::from(ctrl2.x),
                    f64::from(ctrl2.y),
                    f64::from(to.x),
                    f64::from(to.y),
                ),
                PathSegment::Close => self.ctx.close_path(),
            }
        }
    }

    fn trace_ellipse(&self, center: Point, rx: f32, ry: f32) {
        self.ctx.begin_path();
        let _ = self.ctx.ellipse(
            f64::from(center.x),
            f64::from(center.y),
            f64::from(rx.max(0.0)),
            f64::from(ry.max(0.0)),
            0.0,
            0.0,
            std::f64::consts::TAU,
        );
    }

    fn apply_stroke(&self, stroke: &StrokeStyle) {
        self.ctx.set_stroke_style_str(&stroke.color);
        self.ctx.set_line_width(f64::from(stroke.width));
        let (cap, join) = if stroke.round {
            ("round", "round")
        } else {
            ("butt", "miter")
        };
        self.ctx.set_line_cap(cap);
        self.ctx.set_line_join(join);

        let dash = js_sys::Array::new();
        for d in &stroke.dash {
            dash.push(&JsValue::from_f64(f64::from(*d)));
        }
        let _ = self.ctx.set_line_dash(&dash);
    }
}

impl Painter for Canvas2dPainter<'_> {
    fn save(&mut self) {
        self.ctx.save();
    }

    fn restore(&mut self) {
        self.ctx.restore();
    }

    fn scale(&mut self, factor: f32) {
        let _ = self.ctx.scale(f64::from(factor), f64::from(factor));
    }

    fn set_alpha(&mut self, alpha: f32) {
        self.ctx.set_global_alpha(f64::from(alpha.clamp(0.0, 1.0)));
    }

    fn set_glow(&mut self, glow: Option<Glow>) {
        match glow {
            Some(glow) => {
                self.ctx.set_shadow_color(&glow.color);
                self.ctx.set_shadow_blur(f64::from(glow.blur));
            }
            None => {
                self.ctx.set_shadow_color("transparent");
                self.ctx.set_shadow_blur(0.0);
            }
        }
    }

    fn fill_rect(&mut self, rect: Rect, color: &str) {
        self.ctx.set_fill_style_str(color);
        self.ctx.fill_rect(
            f64::from(rect.origin.x),
            f64::from(rect.origin.y),
            f64::from(rect.size.width),
            f64::from(rect.size.height),
        );
    }

    fn stroke_rect(&mut self, rect: Rect, stroke: &StrokeStyle) {
        self.apply_stroke(stroke);
        self.ctx.stroke_rect(
            f64::from(rect.origin.x),
            f64::from(rect.origin.y),
            f64::from(rect.size.width),
            f64::from(rect.size.height),
        );
    }

    fn fill_ellipse(&mut self, center: Point, rx: f32, ry: f32, color: &str) {
        self.trace_ellipse(center, rx, ry);
        self.ctx.set_fill_style_str(color);
        self.ctx.fill();
    }

    fn stroke_ellipse(&mut self, center: Point, rx: f32, ry: f32, stroke: &StrokeStyle) {
        self.trace_ellipse(center, rx, ry);
        self.apply_stroke(stroke);
        self.ctx.stroke();
    }

    fn fill_path(&mut self, path: &Path, color: &str) {
        self.trace_path(path);
        self.ctx.set_fill_style_str(color);
        self.ctx.fill();
    }

    fn stroke_path(&mut self, path: &Path, stroke: &StrokeStyle) {
        self.trace_path(path);
        self.apply_stroke(stroke);
        self.ctx.stroke();
    }

    fn fill_text(&mut self, text: &str, at: Point, style: &TextStyle) {
        self.ctx.set_fill_style_str(&style.color);
        self.ctx
            .set_font(&format!("{}px {}", style.font_size, style.font_family));
        self.ctx.set_text_align(match style.align {
            TextAlign::Left => "left",
            TextAlign::Center => "center",
        });
        self.ctx.set_text_baseline(match style.baseline {
            TextBaseline::Top => "top",
            TextBaseline::Middle => "middle",
        });
        let _ = self.ctx.fill_text(text, f64::from(at.x), f64::from(at.y));
    }
}

/// Render backend that owns a `<canvas>` and its 2D context.
pub struct Canvas2dBackend {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
    device_pixel_ratio: f32,
}

impl Canvas2dBackend {
    /// Wrap a canvas and its context.
    #[must_use]
    pub fn new(canvas: HtmlCanvasElement, ctx: CanvasRenderingContext2d) -> Self {
        Self {
            canvas,
            ctx,
            device_pixel_ratio: 1.0,
        }
    }
}

impl RenderBackend for Canvas2dBackend {
    fn backend_type(&self) -> BackendType {
        BackendType::Canvas2D
    }

    fn render(&mut self, frame: &Frame<'_>, config: &RendererConfig) -> RenderResult<FrameStats> {
        let dpr = f64::from(self.device_pixel_ratio);
        // Drawing happens in CSS pixels; the backing store is dpr times larger.
        self.ctx
            .set_transform(dpr, 0.0, 0.0, dpr, 0.0, 0.0)
            .map_err(|e| RenderError::Frame(format!("{e:?}")))?;
        let mut painter = Canvas2dPainter::new(&self.ctx);
        Ok(render_frame(&mut painter, frame, config))
    }

    fn resize(&mut self, viewport: Viewport) -> RenderResult<()> {
        let (width, height) = viewport.backing_size();
        if width == 0 || height == 0 {
            return Err(RenderError::Surface(format!(
                "zero-sized backing store {width}x{height}"
            )));
        }
        self.canvas.set_width(width);
        self.canvas.set_height(height);
        self.device_pixel_ratio = viewport.device_pixel_ratio;
        tracing::debug!(
            "Canvas resized to {}x{} (dpr {})",
            width,
            height,
            viewport.device_pixel_ratio
        );
        Ok(())
    }
}
