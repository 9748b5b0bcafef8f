//! Backend that records draw calls instead of producing pixels.
//!
//! Used headless and in tests to inspect exactly what a frame would draw.

use sketch_core::{Point, Rect};

use crate::draw::{render_frame, Frame, FrameStats};
use crate::painter::{Glow, Layer, Painter, Path, StrokeStyle, TextStyle};
use crate::viewport::Viewport;
use crate::{BackendType, RenderResult, RendererConfig};

use super::RenderBackend;

/// One recorded painter call.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    /// Start of a rendering pass.
    Layer(Layer),
    /// State push.
    Save,
    /// State pop.
    Restore,
    /// Uniform scale.
    Scale(f32),
    /// Global opacity.
    Alpha(f32),
    /// Glow on or off.
    Glow(Option<Glow>),
    /// Filled rectangle.
    FillRect {
        /// Rectangle.
        rect: Rect,
        /// Fill color.
        color: String,
    },
    /// Outlined rectangle.
    StrokeRect {
        /// Rectangle.
        rect: Rect,
        /// Stroke.
        stroke: StrokeStyle,
    },
    /// Filled ellipse.
    FillEllipse {
        /// Center.
        center: Point,
        /// Horizontal radius.
        rx: f32,
        /// Vertical radius.
        ry: f32,
        /// Fill color.
        color: String,
    },
    /// Outlined ellipse.
    StrokeEllipse {
        /// Center.
        center: Point,
        /// Horizontal radius.
        rx: f32,
        /// Vertical radius.
        ry: f32,
        /// Stroke.
        stroke: StrokeStyle,
    },
    /// Filled path.
    FillPath {
        /// Path.
        path: Path,
        /// Fill color.
        color: String,
    },
    /// Stroked path.
    StrokePath {
        /// Path.
        path: Path,
        /// Stroke.
        stroke: StrokeStyle,
    },
    /// Text run.
    Text {
        /// Content.
        text: String,
        /// Anchor point.
        at: Point,
        /// Font and alignment.
        style: TextStyle,
    },
}

/// A [`Painter`] that appends every call to a list.
#[derive(Debug, Clone, Default)]
pub struct RecordingPainter {
    commands: Vec<DrawCommand>,
}

impl RecordingPainter {
    /// Empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Recorded calls in order.
    #[must_use]
    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    /// Take the recorded calls, leaving the recorder empty.
    pub fn take(&mut self) -> Vec<DrawCommand> {
        std::mem::take(&mut self.commands)
    }
}

impl Painter for RecordingPainter {
    fn begin_layer(&mut self, layer: Layer) {
        self.commands.push(DrawCommand::Layer(layer));
    }

    fn save(&mut self) {
        self.commands.push(DrawCommand::Save);
    }

    fn restore(&mut self) {
        self.commands.push(DrawCommand::Restore);
    }

    fn scale(&mut self, factor: f32) {
        self.commands.push(DrawCommand::Scale(factor));
    }

    fn set_alpha(&mut self, alpha: f32) {
        self.commands.push(DrawCommand::Alpha(alpha));
    }

    fn set_glow(&mut self, glow: Option<Glow>) {
        self.commands.push(DrawCommand::Glow(glow));
    }

    fn fill_rect(&mut self, rect: Rect, color: &str) {
        self.commands.push(DrawCommand::FillRect {
            rect,
            color: color.to_string(),
        });
    }

    fn stroke_rect(&mut self, rect: Rect, stroke: &StrokeStyle) {
        self.commands.push(DrawCommand::StrokeRect {
            rect,
            stroke: stroke.clone(),
        });
    }

    fn fill_ellipse(&mut self, center: Point, rx: f32, ry: f32, color: &str) {
        self.commands.push(DrawCommand::FillEllipse {
            center,
            rx,
            ry,
            color: color.to_string(),
        });
    }

    fn stroke_ellipse(&mut self, center: Point, rx: f32, ry: f32, stroke: &StrokeStyle) {
        self.commands.push(DrawCommand::StrokeEllipse {
            center,
            rx,
            ry,
            stroke: stroke.clone(),
        });
    }

    fn fill_path(&mut self, path: &Path, color: &str) {
        self.commands.push(DrawCommand::FillPath {
            path: path.clone(),
            color: color.to_string(),
        });
    }

    fn stroke_path(&mut self, path: &Path, stroke: &StrokeStyle) {
        self.commands.push(DrawCommand::StrokePath {
            path: path.clone(),
            stroke: stroke.clone(),
        });
    }

    fn fill_text(&mut self, text: &str, at: Point, style: &TextStyle) {
        self.commands.push(DrawCommand::Text {
            text: text.to_string(),
            at,
            style: style.clone(),
        });
    }
}

/// Keeps the draw calls of the most recent frame.
#[derive(Debug, Clone, Default)]
pub struct RecordingBackend {
    painter: RecordingPainter,
    viewport: Viewport,
}

impl RecordingBackend {
    /// Create a new recording backend.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Draw calls of the last rendered frame.
    #[must_use]
    pub fn commands(&self) -> &[DrawCommand] {
        self.painter.commands()
    }

    /// Current viewport.
    #[must_use]
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }
}

impl RenderBackend for RecordingBackend {
    fn backend_type(&self) -> BackendType {
        BackendType::Recording
    }

    fn render(&mut self, frame: &Frame<'_>, config: &RendererConfig) -> RenderResult<FrameStats> {
        self.painter.take();
        let stats = render_frame(&mut self.painter, frame, config);
        tracing::trace!(
            "Recorded frame: {} commands, {} elements",
            self.painter.commands().len(),
            stats.elements_drawn
        );
        Ok(stats)
    }

    fn resize(&mut self, viewport: Viewport) -> RenderResult<()> {
        self.viewport = viewport;
        let (w, h) = viewport.backing_size();
        tracing::debug!("Recording backend resized to {}x{}", w, h);
        Ok(())
    }
}
