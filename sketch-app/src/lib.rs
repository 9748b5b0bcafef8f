//! # System Sketch WASM Application
//!
//! Browser bindings for the sketch canvas: DOM events go to the core
//! controller, frames are drawn through a 2D canvas context.
//!
//! ## Usage
//!
//! Build for WASM:
//! ```bash
//! wasm-pack build --target web sketch-app
//! ```
//!
//! Then import in JavaScript:
//! ```javascript
//! import init, { SketchApp } from './pkg/sketch_app.js';
//!
//! await init();
//! const app = new SketchApp('sketch-canvas');
//! app.resize(canvas.clientWidth, canvas.clientHeight, devicePixelRatio);
//!
//! canvas.onpointerdown = (e) => app.pointerDown(e.offsetX, e.offsetY);
//! setInterval(() => app.tick(Date.now()), 250);
//!
//! function frame() {
//!     app.render();
//!     requestAnimationFrame(frame);
//! }
//! frame();
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod canvas2d;
pub mod error;
pub mod session;

pub use canvas2d::{Canvas2dBackend, Canvas2dPainter};
pub use error::{AppError, AppResult};
pub use session::{PointerAction, SketchSession};

use sketch_core::KeyModifiers;
use sketch_renderer::{BackendType, Renderer, RendererConfig};
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

/// Initialize the WASM module.
#[wasm_bindgen(start)]
pub fn init_wasm() {
    console_error_panic_hook::set_once();
    tracing::info!("System Sketch WASM initialized");
}

/// Host clock in milliseconds.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn now_ms() -> u64 {
    js_sys::Date::now().max(0.0) as u64
}

fn attach(canvas_id: &str) -> AppResult<(HtmlCanvasElement, CanvasRenderingContext2d)> {
    let window = web_sys::window().ok_or(AppError::Environment("no window"))?;
    let document = window
        .document()
        .ok_or(AppError::Environment("no document"))?;

    let canvas = document
        .get_element_by_id(canvas_id)
        .ok_or_else(|| AppError::CanvasNotFound(canvas_id.to_string()))?
        .dyn_into::<HtmlCanvasElement>()
        .map_err(|_| AppError::NotACanvas(canvas_id.to_string()))?;

    let ctx = canvas
        .get_context("2d")
        .map_err(|_| AppError::NoContext)?
        .ok_or(AppError::NoContext)?
        .dyn_into::<CanvasRenderingContext2d>()
        .map_err(|_| AppError::NoContext)?;

    Ok((canvas, ctx))
}

/// The sketch canvas application for WASM.
#[wasm_bindgen]
pub struct SketchApp {
    session: SketchSession,
}

#[wasm_bindgen]
impl SketchApp {
    /// Attach to the `<canvas>` with the given element ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the canvas element is not found or 2D context fails.
    #[wasm_bindgen(constructor)]
    pub fn new(canvas_id: &str) -> Result<SketchApp, JsValue> {
        let (canvas, ctx) = attach(canvas_id)?;
        #[allow(clippy::cast_precision_loss)]
        let (css_width, css_height) = (canvas.width() as f32, canvas.height() as f32);

        let backend = Box::new(Canvas2dBackend::new(canvas, ctx));
        let mut renderer = Renderer::with_backend(
            RendererConfig {
                preferred_backend: BackendType::Canvas2D,
                ..RendererConfig::default()
            },
            backend,
        );
        if css_width > 0.0 && css_height > 0.0 {
            renderer
                .resize(css_width, css_height, 1.0)
                .map_err(AppError::from)?;
        }

        tracing::info!("Attached to canvas '{}'", canvas_id);
        Ok(Self {
            session: SketchSession::new(renderer),
        })
    }

    /// Switch tools by name.
    ///
    /// # Errors
    ///
    /// Returns an error for an unknown tool name.
    #[wasm_bindgen(js_name = setTool)]
    pub fn set_tool(&mut self, name: &str) -> Result<bool, JsValue> {
        Ok(self.session.set_tool(name)?.redraw)
    }

    /// Set the stroke color for new strokes and elements.
    #[wasm_bindgen(js_name = setStrokeColor)]
    pub fn set_stroke_color(&mut self, color: &str) {
        self.session.set_stroke_color(color);
    }

    /// Set the stroke width (also the eraser radius).
    #[wasm_bindgen(js_name = setStrokeWidth)]
    pub fn set_stroke_width(&mut self, width: f32) {
        self.session.set_stroke_width(width);
    }

    /// Set the shape fill; an empty string clears it.
    #[wasm_bindgen(js_name = setFillColor)]
    pub fn set_fill_color(&mut self, color: &str) {
        self.session.set_fill_color(color);
    }

    /// Pointer pressed at CSS coordinates. Returns whether to redraw.
    #[wasm_bindgen(js_name = pointerDown)]
    pub fn pointer_down(&mut self, x: f32, y: f32) -> bool {
        self.session.pointer(PointerAction::Down, x, y, now_ms()).redraw
    }

    /// Pointer moved.
    #[wasm_bindgen(js_name = pointerMove)]
    pub fn pointer_move(&mut self, x: f32, y: f32) -> bool {
        self.session.pointer(PointerAction::Move, x, y, now_ms()).redraw
    }

    /// Pointer released.
    #[wasm_bindgen(js_name = pointerUp)]
    pub fn pointer_up(&mut self, x: f32, y: f32) -> bool {
        self.session.pointer(PointerAction::Up, x, y, now_ms()).redraw
    }

    /// Pointer left the canvas.
    #[wasm_bindgen(js_name = pointerLeave)]
    pub fn pointer_leave(&mut self, x: f32, y: f32) -> bool {
        self.session.pointer(PointerAction::Leave, x, y, now_ms()).redraw
    }

    /// Double click.
    #[wasm_bindgen(js_name = doubleClick)]
    pub fn double_click(&mut self, x: f32, y: f32) -> bool {
        self.session
            .pointer(PointerAction::DoubleClick, x, y, now_ms())
            .redraw
    }

    /// Key pressed. Returns whether the key was consumed, so the page can
    /// call `preventDefault`.
    #[wasm_bindgen(js_name = keyDown)]
    #[allow(clippy::fn_params_excessive_bools)]
    pub fn key_down(&mut self, key: &str, shift: bool, ctrl: bool, alt: bool, meta: bool) -> bool {
        let modifiers = KeyModifiers {
            shift,
            ctrl,
            alt,
            meta,
        };
        self.session.key_down(key, modifiers, now_ms()).redraw
    }

    /// Mirror the label input box into the open label editor.
    #[wasm_bindgen(js_name = setLabelBuffer)]
    pub fn set_label_buffer(&mut self, text: &str) -> bool {
        self.session.set_label_buffer(text).redraw
    }

    /// Undo the last change.
    pub fn undo(&mut self) -> bool {
        self.session.undo().redraw
    }

    /// Redo the last undone change.
    pub fn redo(&mut self) -> bool {
        self.session.redo().redraw
    }

    /// Whether undo is possible.
    #[wasm_bindgen(js_name = canUndo)]
    #[must_use]
    pub fn can_undo(&self) -> bool {
        self.session.controller().history().can_undo()
    }

    /// Whether redo is possible.
    #[wasm_bindgen(js_name = canRedo)]
    #[must_use]
    pub fn can_redo(&self) -> bool {
        self.session.controller().history().can_redo()
    }

    /// Empty the canvas.
    pub fn clear(&mut self) -> bool {
        self.session.clear(now_ms()).redraw
    }

    /// Drive the autosave debounce with the host clock.
    pub fn tick(&mut self, now_ms: f64) -> bool {
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let now = now_ms.max(0.0) as u64;
        self.session.tick(now)
    }

    /// Replace the canvas with a generated diagram.
    ///
    /// # Errors
    ///
    /// Returns an error if the diagram JSON fails validation.
    #[wasm_bindgen(js_name = applyGenerated)]
    pub fn apply_generated(&mut self, json: &str, prompt: &str) -> Result<(), JsValue> {
        self.session.apply_generated(json, prompt, now_ms())?;
        Ok(())
    }

    /// Replace the canvas with a saved document.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is not a document.
    #[wasm_bindgen(js_name = loadDocument)]
    pub fn load_document(&mut self, json: &str) -> Result<(), JsValue> {
        self.session.load_document(json)?;
        Ok(())
    }

    /// Resize to a CSS box at the given device pixel ratio.
    ///
    /// # Errors
    ///
    /// Returns an error for a non-positive size or ratio.
    pub fn resize(&mut self, css_width: f32, css_height: f32, device_pixel_ratio: f32) -> Result<(), JsValue> {
        self.session
            .resize(css_width, css_height, device_pixel_ratio)?;
        Ok(())
    }

    /// Draw the current state.
    pub fn render(&mut self) {
        if let Err(err) = self.session.render() {
            tracing::error!("Renderer error: {}", err);
        }
    }

    /// The document as JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    #[wasm_bindgen(js_name = documentJson)]
    pub fn document_json(&self) -> Result<String, JsValue> {
        Ok(self.session.document_json()?)
    }

    /// The document as SVG markup.
    #[wasm_bindgen(js_name = exportSvg)]
    #[must_use]
    pub fn export_svg(&self) -> String {
        self.session.export_svg()
    }

    /// CSS cursor for the current tool.
    #[must_use]
    pub fn cursor(&self) -> String {
        self.session.cursor().to_string()
    }

    /// Current zoom in percent.
    #[must_use]
    pub fn zoom(&self) -> u32 {
        self.session.controller().zoom()
    }

    /// Frames rendered so far.
    #[wasm_bindgen(js_name = frameCount)]
    #[must_use]
    pub fn frame_count(&self) -> u64 {
        self.session.renderer().frame_count()
    }
}
