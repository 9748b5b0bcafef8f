//! Integration tests for document export (sketch-renderer).
//!
//! Exports full documents (elements, connections, strokes, annotations) and
//! writes the results to disk.

use std::io::Write;

use sketch_core::{
    CanvasDocument, ConnectionType, ElementType, FreehandStroke, Point, ShapeKind, SystemElement,
    TextAnnotation,
};
use sketch_renderer::{ExportConfig, ExportFormat, RendererConfig, SceneExporter};

fn sample_document() -> CanvasDocument {
    let mut doc = CanvasDocument::new();
    let user = doc.add_element(SystemElement::new(ElementType::User, Point::new(0.0, 0.0), "User"));
    let api = doc.add_element(SystemElement::new(ElementType::Api, Point::new(200.0, 0.0), "Gateway"));
    let db = doc.add_element(SystemElement::new(
        ElementType::Database,
        Point::new(400.0, 0.0),
        "Orders DB",
    ));
    doc.add_connection(user, api, ConnectionType::Arrow);
    doc.push_connection(
        sketch_core::Connection::new(api, db, ConnectionType::Dashed).with_label("SQL"),
    );
    doc.add_stroke(FreehandStroke::polyline(
        vec![Point::new(0.0, 200.0), Point::new(50.0, 220.0), Point::new(90.0, 210.0)],
        "#ff0000",
        3.0,
    ));
    doc.add_stroke(FreehandStroke::shape(
        ShapeKind::Triangle,
        Point::new(300.0, 200.0),
        Point::new(360.0, 260.0),
        "#00ff00",
        2.0,
    ));
    let note = doc.add_text(TextAnnotation::new(Point::new(0.0, 300.0), "#ffffff"));
    doc.update_text(note, "Read path\ncached").expect("update");
    doc
}

// ==========================================================================
// SVG
// ==========================================================================

#[test]
fn test_svg_contains_every_layer() {
    let svg_bytes = SceneExporter::with_defaults()
        .export(&sample_document(), ExportFormat::Svg)
        .expect("svg");
    let svg = String::from_utf8(svg_bytes).expect("utf8");

    assert!(svg.starts_with("<svg"));
    assert!(svg.ends_with("</svg>"));
    for label in ["User", "Gateway", "Orders DB", "SQL", "Read path", "cached"] {
        assert!(svg.contains(label), "missing {label}");
    }
    assert!(svg.contains("stroke=\"#ff0000\""));
    assert!(svg.contains("stroke-dasharray=\"8 6\""));
}

#[test]
fn test_connections_precede_elements() {
    let svg = SceneExporter::with_defaults().render_to_svg(&sample_document());
    let label = svg.find(">SQL<").expect("connection label");
    let element = svg.find(">Gateway<").expect("element label");
    assert!(label < element);
}

#[test]
fn test_white_theme_without_grid() {
    let exporter = SceneExporter::new(ExportConfig {
        renderer: RendererConfig {
            background: "#ffffff".to_string(),
            show_grid: false,
            ..RendererConfig::default()
        },
        ..ExportConfig::default()
    });
    let svg = exporter.render_to_svg(&CanvasDocument::new());
    assert!(svg.contains("fill=\"#ffffff\""));
    assert!(!svg.contains("<ellipse"));
}

#[test]
fn test_svg_written_to_disk() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("diagram.svg");
    let bytes = SceneExporter::with_defaults()
        .export(&sample_document(), ExportFormat::Svg)
        .expect("svg");
    let mut file = std::fs::File::create(&path).expect("create");
    file.write_all(&bytes).expect("write");

    let read_back = std::fs::read_to_string(&path).expect("read");
    assert!(read_back.contains("Orders DB"));
}

// ==========================================================================
// PNG
// ==========================================================================

#[cfg(feature = "export")]
#[test]
fn test_png_written_to_disk() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("diagram.png");
    let exporter = SceneExporter::new(ExportConfig {
        scale: 2.0,
        ..ExportConfig::default()
    });
    let png = exporter
        .export(&sample_document(), ExportFormat::Png)
        .expect("png");
    std::fs::write(&path, &png).expect("write");

    let read_back = std::fs::read(&path).expect("read");
    assert_eq!(&read_back[0..4], &[137, 80, 78, 71]);
    assert!(read_back.len() > 1000, "Expected > 1KB, got {} bytes", read_back.len());
}
