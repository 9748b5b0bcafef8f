//! Document export to image formats.
//!
//! Renders a [`CanvasDocument`] to SVG through the normal frame pipeline, and
//! to PNG by rasterizing that SVG with resvg/tiny-skia (`export` feature).

use sketch_core::{CanvasDocument, Point, Rect, Size};

use crate::backend::svg::SvgPainter;
use crate::draw::{render_frame, Frame};
use crate::error::{RenderError, RenderResult};
use crate::RendererConfig;

/// Export output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    /// SVG vector graphics (returns the SVG XML string as UTF-8 bytes).
    Svg,
    /// PNG image.
    Png,
}

impl std::str::FromStr for ExportFormat {
    type Err = RenderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "svg" => Ok(Self::Svg),
            "png" => Ok(Self::Png),
            other => Err(RenderError::Export(format!("unknown format: {other}"))),
        }
    }
}

/// Configuration for document export.
#[derive(Debug, Clone)]
pub struct ExportConfig {
    /// Output width in pixels (default: content width).
    pub width: Option<u32>,
    /// Output height in pixels (default: content height).
    pub height: Option<u32>,
    /// Scale factor (e.g. 2.0 for retina).
    pub scale: f32,
    /// Margin around the content, in canvas pixels.
    pub padding: f32,
    /// Drawing colors and grid.
    pub renderer: RendererConfig,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            width: None,
            height: None,
            scale: 1.0,
            padding: 40.0,
            renderer: RendererConfig::default(),
        }
    }
}

/// Size of the exported area when the document is empty.
const EMPTY_EXPORT_SIZE: Size = Size::new(800.0, 600.0);

/// Exports a [`CanvasDocument`] to image formats.
pub struct SceneExporter {
    config: ExportConfig,
}

impl SceneExporter {
    /// Create a new exporter with the given configuration.
    #[must_use]
    pub fn new(config: ExportConfig) -> Self {
        Self { config }
    }

    /// Create an exporter with default configuration.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new(ExportConfig::default())
    }

    /// Export a document to the specified format.
    ///
    /// # Errors
    ///
    /// Returns an error if the document cannot be rendered or encoded.
    pub fn export(&self, document: &CanvasDocument, format: ExportFormat) -> RenderResult<Vec<u8>> {
        match format {
            ExportFormat::Svg => Ok(self.render_to_svg(document).into_bytes()),
            ExportFormat::Png => self.render_to_png(document),
        }
    }

    /// Canvas area that gets exported: the content bounds plus padding.
    #[must_use]
    pub fn export_area(&self, document: &CanvasDocument) -> Rect {
        document.content_bounds().map_or(
            Rect::new(Point::new(0.0, 0.0), EMPTY_EXPORT_SIZE),
            |bounds| bounds.inflate(self.config.padding.max(0.0)),
        )
    }

    /// Export the document to an SVG string.
    #[must_use]
    pub fn render_to_svg(&self, document: &CanvasDocument) -> String {
        let area = self.export_area(document);
        let (width, height) = self.output_dimensions(area);
        let mut painter = SvgPainter::new(area, width, height);
        let stats = render_frame(&mut painter, &Frame::new(document, area), &self.config.renderer);
        tracing::debug!(
            "Exported {} elements to {}x{} SVG",
            stats.elements_drawn,
            width,
            height
        );
        painter.finish()
    }

    /// Export the document to PNG bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if rasterization or encoding fails, or if the crate
    /// was built without the `export` feature.
    pub fn render_to_png(&self, document: &CanvasDocument) -> RenderResult<Vec<u8>> {
        let svg_string = self.render_to_svg(document);
        rasterize_png(&svg_string)
    }

    /// Get output dimensions (width, height) in pixels.
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    fn output_dimensions(&self, area: Rect) -> (u32, u32) {
        let base_w = self
            .config
            .width
            .unwrap_or_else(|| area.size.width.max(1.0).ceil() as u32);
        let base_h = self
            .config
            .height
            .unwrap_or_else(|| area.size.height.max(1.0).ceil() as u32);

        let out_w = (base_w as f32 * self.config.scale).round() as u32;
        let out_h = (base_h as f32 * self.config.scale).round() as u32;
        (out_w.max(1), out_h.max(1))
    }
}

/// Rasterize an SVG string and encode it as PNG.
#[cfg(feature = "export")]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn rasterize_png(svg_string: &str) -> RenderResult<Vec<u8>> {
    let opt = usvg::Options::default();
    let tree = usvg::Tree::from_str(svg_string, &opt)
        .map_err(|e| RenderError::Export(format!("SVG parsing failed: {e}")))?;

    let px_w = tree.size().width().ceil() as u32;
    let px_h = tree.size().height().ceil() as u32;

    let mut pixmap = tiny_skia::Pixmap::new(px_w.max(1), px_h.max(1))
        .ok_or_else(|| RenderError::Export("Failed to create pixmap".to_string()))?;

    resvg::render(&tree, tiny_skia::Transform::default(), &mut pixmap.as_mut());

    pixmap
        .encode_png()
        .map_err(|e| RenderError::Export(format!("PNG encoding failed: {e}")))
}

#[cfg(not(feature = "export"))]
fn rasterize_png(_svg_string: &str) -> RenderResult<Vec<u8>> {
    Err(RenderError::Export(
        "PNG export requires the `export` feature".to_string(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use sketch_core::{ElementType, SystemElement};

    fn document_with_server() -> CanvasDocument {
        let mut doc = CanvasDocument::new();
        doc.add_element(SystemElement::new(
            ElementType::Server,
            Point::new(100.0, 100.0),
            "Web & API",
        ));
        doc
    }

    #[test]
    fn empty_document_uses_default_area() {
        let svg = SceneExporter::with_defaults().render_to_svg(&CanvasDocument::new());
        assert!(svg.starts_with("<svg"));
        assert!(svg.ends_with("</svg>"));
        assert!(svg.contains("width=\"800\""));
        assert!(svg.contains("height=\"600\""));
    }

    #[test]
    fn area_is_content_plus_padding() {
        let exporter = SceneExporter::with_defaults();
        let area = exporter.export_area(&document_with_server());
        assert_eq!(area.origin, Point::new(60.0, 60.0));
        assert_eq!(area.size, Size::new(200.0, 160.0));
        let svg = exporter.render_to_svg(&document_with_server());
        assert!(svg.contains("viewBox=\"60 60 200 160\""));
    }

    #[test]
    fn labels_are_escaped() {
        let svg = SceneExporter::with_defaults().render_to_svg(&document_with_server());
        assert!(svg.contains("Web &amp; API"));
    }

    #[test]
    fn scale_factor_multiplies_output_size() {
        let exporter = SceneExporter::new(ExportConfig {
            width: Some(100),
            height: Some(50),
            scale: 2.0,
            ..Default::default()
        });
        let svg = exporter.render_to_svg(&CanvasDocument::new());
        assert!(svg.contains("width=\"200\""));
        assert!(svg.contains("height=\"100\""));
        assert!(svg.contains("viewBox=\"0 0 800 600\""));
    }

    #[test]
    fn format_parses_case_insensitively() {
        assert_eq!("SVG".parse::<ExportFormat>().expect("svg"), ExportFormat::Svg);
        assert_eq!("png".parse::<ExportFormat>().expect("png"), ExportFormat::Png);
        assert!("pdf".parse::<ExportFormat>().is_err());
    }

    #[cfg(feature = "export")]
    #[test]
    fn png_export_produces_valid_bytes() {
        let png = SceneExporter::with_defaults()
            .render_to_png(&document_with_server())
            .expect("png export");
        assert!(png.len() > 8);
        assert_eq!(&png[0..4], &[137, 80, 78, 71]);
    }

    #[cfg(not(feature = "export"))]
    #[test]
    fn png_export_needs_feature() {
        let result = SceneExporter::with_defaults().export(&CanvasDocument::new(), ExportFormat::Png);
        assert!(matches!(result, Err(RenderError::Export(_))));
    }
}
