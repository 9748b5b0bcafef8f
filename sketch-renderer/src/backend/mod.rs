//! Rendering backend implementations.

pub mod recording;
pub mod svg;

use crate::draw::{Frame, FrameStats};
use crate::viewport::Viewport;
use crate::{BackendType, RenderResult, RendererConfig};

/// Trait for rendering backends.
pub trait RenderBackend {
    /// Get the backend type.
    fn backend_type(&self) -> BackendType;

    /// Render a frame.
    ///
    /// # Errors
    ///
    /// Returns an error if rendering fails.
    fn render(&mut self, frame: &Frame<'_>, config: &RendererConfig) -> RenderResult<FrameStats>;

    /// Resize the rendering surface.
    ///
    /// # Errors
    ///
    /// Returns an error if resizing fails.
    fn resize(&mut self, viewport: Viewport) -> RenderResult<()>;
}
