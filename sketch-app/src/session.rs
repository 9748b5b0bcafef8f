//! Host-independent glue between DOM input and the sketch controller.
//!
//! [`SketchSession`] takes explicit timestamps and a boxed render backend,
//! so everything except the DOM bindings runs under native tests.

use sketch_core::{
    AiResponse, CanvasDocument, HistoryConfig, InputEvent, KeyEvent, KeyModifiers,
    LabelResolution, Outcome, PointerEvent, SketchController, Tool,
};
use sketch_renderer::{ExportConfig, Frame, FrameStats, Renderer, SceneExporter};

use crate::error::AppResult;

/// Which pointer callback fired.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerAction {
    /// `pointerdown`
    Down,
    /// `pointermove`
    Move,
    /// `pointerup`
    Up,
    /// `pointerleave`
    Leave,
    /// `dblclick`
    DoubleClick,
}

/// A controller plus the renderer that draws it.
pub struct SketchSession {
    controller: SketchController,
    renderer: Renderer,
    resolution: LabelResolution,
}

impl SketchSession {
    /// Start with an empty document.
    #[must_use]
    pub fn new(renderer: Renderer) -> Self {
        Self {
            controller: SketchController::new(),
            renderer,
            resolution: LabelResolution::default(),
        }
    }

    /// Replace the document with a saved one, resetting history.
    ///
    /// # Errors
    ///
    /// Returns an error if `json` is not a valid document; the current
    /// document is kept.
    pub fn load_document(&mut self, json: &str) -> AppResult<()> {
        let document = CanvasDocument::from_json(json)?;
        let mut controller = SketchController::with_document(document, HistoryConfig::default());
        *controller.style_mut() = self.controller.style().clone();
        controller.set_tool(self.controller.tool());
        self.controller = controller;
        Ok(())
    }

    /// The controller.
    #[must_use]
    pub fn controller(&self) -> &SketchController {
        &self.controller
    }

    /// The renderer.
    #[must_use]
    pub fn renderer(&self) -> &Renderer {
        &self.renderer
    }

    /// How generated connections with unknown labels are treated.
    pub fn set_label_resolution(&mut self, resolution: LabelResolution) {
        self.resolution = resolution;
    }

    /// Switch tools by name ("select", "pen", "server", ...).
    ///
    /// # Errors
    ///
    /// Returns an error for an unknown tool name.
    pub fn set_tool(&mut self, name: &str) -> AppResult<Outcome> {
        let tool: Tool = name.parse()?;
        Ok(self.controller.set_tool(tool))
    }

    /// Stroke color for new strokes and elements.
    pub fn set_stroke_color(&mut self, color: &str) {
        self.controller.style_mut().stroke_color = color.to_string();
    }

    /// Stroke width for new strokes; also the eraser radius.
    ///
    /// Non-positive or non-finite widths are ignored.
    pub fn set_stroke_width(&mut self, width: f32) {
        if width.is_finite() && width > 0.0 {
            self.controller.style_mut().stroke_width = width;
        } else {
            tracing::warn!(width, "Ignoring invalid stroke width");
        }
    }

    /// Fill for closed shapes; an empty string clears it.
    pub fn set_fill_color(&mut self, color: &str) {
        let color = color.trim();
        self.controller.style_mut().fill_color = (!color.is_empty()).then(|| color.to_string());
    }

    /// Feed a pointer event given in CSS pixels relative to the canvas.
    pub fn pointer(&mut self, action: PointerAction, css_x: f32, css_y: f32, now_ms: u64) -> Outcome {
        let zoom = self.zoom_factor();
        let sample = PointerEvent::new(css_x / zoom, css_y / zoom, now_ms);
        let event = match action {
            PointerAction::Down => InputEvent::PointerDown(sample),
            PointerAction::Move => InputEvent::PointerMove(sample),
            PointerAction::Up => InputEvent::PointerUp(sample),
            PointerAction::Leave => InputEvent::PointerLeave(sample),
            PointerAction::DoubleClick => InputEvent::DoubleClick(sample),
        };
        self.controller.handle(&event)
    }

    /// Feed a key press named like DOM `KeyboardEvent.key`.
    pub fn key_down(&mut self, key: &str, modifiers: KeyModifiers, now_ms: u64) -> Outcome {
        self.controller
            .handle(&InputEvent::Key(KeyEvent::with_modifiers(key, modifiers, now_ms)))
    }

    /// Replace the open label editor's text.
    pub fn set_label_buffer(&mut self, text: &str) -> Outcome {
        self.controller.set_label_buffer(text)
    }

    /// Step back in history.
    pub fn undo(&mut self) -> Outcome {
        self.controller.undo()
    }

    /// Step forward in history.
    pub fn redo(&mut self) -> Outcome {
        self.controller.redo()
    }

    /// Empty the document.
    pub fn clear(&mut self, now_ms: u64) -> Outcome {
        self.controller.clear(now_ms)
    }

    /// Run the autosave debounce; `true` when a snapshot was recorded.
    pub fn tick(&mut self, now_ms: u64) -> bool {
        self.controller.tick(now_ms)
    }

    /// Replace the document with a generated diagram.
    ///
    /// `json` is the `data` payload of the generate endpoint (or any model
    /// output containing one JSON object).
    ///
    /// # Errors
    ///
    /// Returns an error if the payload fails validation, or if a connection
    /// names an unknown label under strict resolution.
    pub fn apply_generated(&mut self, json: &str, prompt: &str, now_ms: u64) -> AppResult<Outcome> {
        let response = AiResponse::parse(json)?;
        let title = response.title.clone();
        let diagram = response.into_diagram(prompt, self.controller.style(), self.resolution, now_ms)?;
        tracing::info!(
            %title,
            elements = diagram.elements.len(),
            connections = diagram.connections.len(),
            "Applying generated diagram"
        );
        Ok(self.controller.apply_diagram(diagram, now_ms))
    }

    /// Resize the canvas.
    ///
    /// # Errors
    ///
    /// Returns an error for an unusable size or pixel ratio.
    pub fn resize(&mut self, css_width: f32, css_height: f32, device_pixel_ratio: f32) -> AppResult<()> {
        self.renderer.resize(css_width, css_height, device_pixel_ratio)?;
        Ok(())
    }

    /// Draw the current state.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails.
    pub fn render(&mut self) -> AppResult<FrameStats> {
        let viewport = self.renderer.viewport();
        let frame = Frame::from_controller(&self.controller, &viewport);
        Ok(self.renderer.render(&frame)?)
    }

    /// The document as JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn document_json(&self) -> AppResult<String> {
        Ok(self.controller.document().to_json()?)
    }

    /// The document as a standalone SVG, using the live colors.
    #[must_use]
    pub fn export_svg(&self) -> String {
        let exporter = SceneExporter::new(ExportConfig {
            renderer: self.renderer.config().clone(),
            ..ExportConfig::default()
        });
        exporter.render_to_svg(self.controller.document())
    }

    /// CSS cursor for the current tool and interaction.
    #[must_use]
    pub fn cursor(&self) -> &'static str {
        self.controller.cursor()
    }

    #[allow(clippy::cast_precision_loss)]
    fn zoom_factor(&self) -> f32 {
        self.controller.zoom() as f32 / 100.0
    }
}
