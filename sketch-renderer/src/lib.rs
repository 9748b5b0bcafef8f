//! # System Sketch Renderer
//!
//! Immediate-mode drawing of a sketch document. The renderer owns no state
//! between frames: every frame is rebuilt from the document and the
//! controller's transient interaction state.
//!
//! ## Rendering Backends
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │           render_frame (draw order)          │
//! ├──────────────────────────────────────────────┤
//! │                Painter trait                 │
//! ├──────────────┬──────────────┬────────────────┤
//! │ Canvas 2D    │ SVG          │ Recording      │
//! │ (wasm host)  │ (export)     │ (headless)     │
//! └──────────────┴──────────────┴────────────────┘
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod backend;
pub mod draw;
pub mod error;
pub mod export;
pub mod painter;
pub mod viewport;

pub use backend::recording::{DrawCommand, RecordingBackend, RecordingPainter};
pub use backend::svg::{SvgBackend, SvgPainter};
pub use backend::RenderBackend;
pub use draw::{render_frame, Frame, FrameStats};
pub use error::{RenderError, RenderResult};
pub use export::{ExportConfig, ExportFormat, SceneExporter};
pub use painter::{Glow, Layer, Painter, Path, PathSegment, StrokeStyle, TextAlign, TextBaseline, TextStyle};
pub use viewport::Viewport;

use serde::{Deserialize, Serialize};

/// Configuration for the renderer.
///
/// Deserializes from partial JSON; missing fields take their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RendererConfig {
    /// Preferred backend (will fall back if unavailable).
    pub preferred_backend: BackendType,
    /// Canvas background color.
    pub background: String,
    /// Draw the dot grid.
    pub show_grid: bool,
    /// Grid spacing in pixels.
    pub grid_size: f32,
    /// Grid dot color.
    pub grid_color: String,
    /// Connection line and label color.
    pub connection_color: String,
    /// Connection line width.
    pub connection_width: f32,
    /// Connection label font size.
    pub connection_label_size: f32,
    /// Font family for element and connection labels.
    pub font_family: String,
    /// Glow color behind highlighted elements.
    pub highlight_color: String,
    /// Glow blur radius.
    pub highlight_blur: f32,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            preferred_backend: BackendType::Svg,
            background: "#000000".to_string(),
            show_grid: true,
            grid_size: 20.0,
            grid_color: "rgba(255, 255, 255, 0.1)".to_string(),
            connection_color: "#ffffff".to_string(),
            connection_width: 2.0,
            connection_label_size: 12.0,
            font_family: "Arial, sans-serif".to_string(),
            highlight_color: "#4a90e2".to_string(),
            highlight_blur: 18.0,
        }
    }
}

/// Available rendering backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendType {
    /// Browser canvas 2D context, provided by the wasm host.
    #[serde(rename = "canvas2d")]
    Canvas2D,
    /// SVG markup.
    Svg,
    /// Draw-call recorder (no output surface).
    Recording,
}

/// The main renderer interface.
pub struct Renderer {
    config: RendererConfig,
    backend: Box<dyn RenderBackend>,
    viewport: Viewport,
    frame_count: u64,
}

impl Renderer {
    /// Create a new renderer with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if no suitable backend is available.
    pub fn new(config: RendererConfig) -> RenderResult<Self> {
        let backend = Self::create_backend(&config)?;
        Ok(Self::with_backend(config, backend))
    }

    /// Create a renderer around an existing backend.
    #[must_use]
    pub fn with_backend(config: RendererConfig, backend: Box<dyn RenderBackend>) -> Self {
        Self {
            config,
            backend,
            viewport: Viewport::default(),
            frame_count: 0,
        }
    }

    /// Create the appropriate backend based on config and availability.
    fn create_backend(config: &RendererConfig) -> RenderResult<Box<dyn RenderBackend>> {
        match config.preferred_backend {
            BackendType::Canvas2D => {
                // The canvas context lives in the wasm host, which supplies
                // its own backend through `with_backend`.
                tracing::warn!("Canvas 2D backend needs a browser context, falling back to SVG");
                Self::create_backend(&RendererConfig {
                    preferred_backend: BackendType::Svg,
                    ..config.clone()
                })
            }
            BackendType::Svg => Ok(Box::new(backend::svg::SvgBackend::new())),
            BackendType::Recording => Ok(Box::new(backend::recording::RecordingBackend::new())),
        }
    }

    /// Render a frame.
    ///
    /// # Errors
    ///
    /// Returns an error if rendering fails.
    pub fn render(&mut self, frame: &Frame<'_>) -> RenderResult<FrameStats> {
        let stats = self.backend.render(frame, &self.config)?;
        self.frame_count += 1;
        Ok(stats)
    }

    /// Get the current frame count.
    #[must_use]
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Get the active backend type.
    #[must_use]
    pub fn active_backend(&self) -> BackendType {
        self.backend.backend_type()
    }

    /// Get the renderer configuration.
    #[must_use]
    pub fn config(&self) -> &RendererConfig {
        &self.config
    }

    /// Mutable access to the configuration.
    pub fn config_mut(&mut self) -> &mut RendererConfig {
        &mut self.config
    }

    /// Current viewport.
    #[must_use]
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Resize the rendering surface.
    ///
    /// # Errors
    ///
    /// Returns an error if the viewport is invalid or the backend rejects it.
    pub fn resize(&mut self, css_width: f32, css_height: f32, device_pixel_ratio: f32) -> RenderResult<()> {
        let viewport = Viewport::new(css_width, css_height, device_pixel_ratio)?;
        self.backend.resize(viewport)?;
        self.viewport = viewport;
        Ok(())
    }
}
