//! Integration tests for frame drawing.
//!
//! Renders documents and live controller state through the recording
//! backend and inspects the draw calls:
//! - Fixed layer order
//! - Dangling connections
//! - Highlight glow for selection and connector source
//! - In-progress previews and zoom

use sketch_core::{
    CanvasDocument, ConnectionType, ElementId, ElementType, InputEvent, KeyEvent, KeyModifiers,
    Point, PointerEvent, Rect, Size, SketchController, SystemElement, Tool,
};
use sketch_renderer::{
    BackendType, DrawCommand, Frame, Layer, RecordingBackend, RenderBackend, Renderer,
    RendererConfig, Viewport,
};

fn area() -> Rect {
    Rect::new(Point::new(0.0, 0.0), Size::new(400.0, 300.0))
}

fn record(frame: &Frame<'_>, config: &RendererConfig) -> (Vec<DrawCommand>, sketch_renderer::FrameStats) {
    let mut backend = RecordingBackend::new();
    let stats = backend.render(frame, config).expect("render");
    (backend.commands().to_vec(), stats)
}

/// Commands issued between the start of `layer` and the next layer marker.
fn layer_commands(commands: &[DrawCommand], layer: Layer) -> Vec<DrawCommand> {
    commands
        .iter()
        .skip_while(|c| **c != DrawCommand::Layer(layer))
        .skip(1)
        .take_while(|c| !matches!(c, DrawCommand::Layer(_)))
        .cloned()
        .collect()
}

fn two_connected_boxes() -> (CanvasDocument, ElementId, ElementId) {
    let mut doc = CanvasDocument::new();
    let a = doc.add_element(SystemElement::new(ElementType::Box, Point::new(0.0, 0.0), "A"));
    let b = doc.add_element(SystemElement::new(ElementType::Box, Point::new(200.0, 0.0), "B"));
    (doc, a, b)
}

// ============================================================================
// Draw order
// ============================================================================

#[test]
fn test_layers_follow_fixed_order() {
    let (mut doc, a, b) = two_connected_boxes();
    doc.add_connection(a, b, ConnectionType::Arrow);
    let (commands, _) = record(&Frame::new(&doc, area()), &RendererConfig::default());

    let layers: Vec<Layer> = commands
        .iter()
        .filter_map(|c| match c {
            DrawCommand::Layer(layer) => Some(*layer),
            _ => None,
        })
        .collect();
    assert_eq!(
        layers,
        vec![
            Layer::Background,
            Layer::Grid,
            Layer::Connections,
            Layer::Strokes,
            Layer::Preview,
            Layer::Texts,
            Layer::Elements,
        ]
    );
}

#[test]
fn test_frame_state_is_balanced() {
    let (doc, _, _) = two_connected_boxes();
    let (commands, _) = record(&Frame::new(&doc, area()), &RendererConfig::default());
    let saves = commands.iter().filter(|c| **c == DrawCommand::Save).count();
    let restores = commands.iter().filter(|c| **c == DrawCommand::Restore).count();
    assert_eq!(saves, restores);
    assert_eq!(commands.first(), Some(&DrawCommand::Save));
    assert_eq!(commands.last(), Some(&DrawCommand::Restore));
}

#[test]
fn test_grid_can_be_disabled() {
    let doc = CanvasDocument::new();
    let config = RendererConfig {
        show_grid: false,
        ..RendererConfig::default()
    };
    let (commands, _) = record(&Frame::new(&doc, area()), &config);
    assert!(layer_commands(&commands, Layer::Grid).is_empty());

    let (commands, _) = record(&Frame::new(&doc, area()), &RendererConfig::default());
    // 400x300 at 20px spacing, strictly inside: 19 columns x 14 rows.
    assert_eq!(layer_commands(&commands, Layer::Grid).len(), 19 * 14);
}

// ============================================================================
// Connections
// ============================================================================

#[test]
fn test_dangling_connection_draws_nothing() {
    let (mut doc, a, _) = two_connected_boxes();
    doc.add_connection(a, ElementId::nil(), ConnectionType::Arrow);
    doc.add_connection(ElementId::new(), a, ConnectionType::Line);

    let (commands, stats) = record(&Frame::new(&doc, area()), &RendererConfig::default());
    assert_eq!(stats.connections_drawn, 0);
    assert_eq!(stats.connections_skipped, 2);
    assert_eq!(stats.elements_drawn, 2);
    assert!(layer_commands(&commands, Layer::Connections).is_empty());
}

#[test]
fn test_arrow_connection_has_curve_and_head() {
    let (mut doc, a, b) = two_connected_boxes();
    doc.add_connection(a, b, ConnectionType::Arrow);
    let (commands, stats) = record(&Frame::new(&doc, area()), &RendererConfig::default());
    assert_eq!(stats.connections_drawn, 1);
    let drawn = layer_commands(&commands, Layer::Connections);
    assert_eq!(drawn.len(), 2);
    assert!(matches!(&drawn[0], DrawCommand::StrokePath { stroke, .. } if stroke.dash.is_empty()));
}

#[test]
fn test_dashed_and_plain_connections() {
    let (mut doc, a, b) = two_connected_boxes();
    doc.add_connection(a, b, ConnectionType::Dashed);
    doc.add_connection(b, a, ConnectionType::Line);
    let (commands, _) = record(&Frame::new(&doc, area()), &RendererConfig::default());
    let drawn = layer_commands(&commands, Layer::Connections);
    // Neither type has an arrowhead.
    assert_eq!(drawn.len(), 2);
    assert!(matches!(&drawn[0], DrawCommand::StrokePath { stroke, .. } if stroke.dash == vec![8.0, 6.0]));
    assert!(matches!(&drawn[1], DrawCommand::StrokePath { stroke, .. } if stroke.dash.is_empty()));
}

// ============================================================================
// Highlighting
// ============================================================================

fn has_glow(commands: &[DrawCommand]) -> bool {
    commands
        .iter()
        .any(|c| matches!(c, DrawCommand::Glow(Some(glow)) if glow.color == "#4a90e2"))
}

#[test]
fn test_selected_element_glows() {
    let mut controller = SketchController::new();
    controller.set_tool(Tool::Server);
    controller.handle(&InputEvent::PointerDown(PointerEvent::new(100.0, 100.0, 0)));
    controller.handle(&InputEvent::PointerUp(PointerEvent::new(100.0, 100.0, 0)));

    let frame = Frame::from_controller(&controller, &Viewport::default());
    let (commands, _) = record(&frame, &RendererConfig::default());
    assert!(has_glow(&layer_commands(&commands, Layer::Elements)));
}

#[test]
fn test_connector_source_glows_without_selection() {
    let (doc, _, _) = two_connected_boxes();
    let mut controller = SketchController::with_document(doc, sketch_core::HistoryConfig::default());
    controller.set_tool(Tool::Connector);
    controller.handle(&InputEvent::PointerDown(PointerEvent::new(10.0, 10.0, 0)));
    assert!(controller.connecting_from().is_some());
    assert!(controller.document().elements().iter().all(|e| !e.selected));

    let frame = Frame::from_controller(&controller, &Viewport::default());
    let (commands, _) = record(&frame, &RendererConfig::default());
    assert!(has_glow(&layer_commands(&commands, Layer::Elements)));
}

#[test]
fn test_unhighlighted_elements_have_no_glow() {
    let (doc, _, _) = two_connected_boxes();
    let (commands, _) = record(&Frame::new(&doc, area()), &RendererConfig::default());
    assert!(!has_glow(&commands));
}

// ============================================================================
// Preview and zoom
// ============================================================================

#[test]
fn test_pen_preview_drawn_before_commit() {
    let mut controller = SketchController::new();
    controller.set_tool(Tool::Pen);
    controller.handle(&InputEvent::PointerDown(PointerEvent::new(10.0, 10.0, 0)));
    controller.handle(&InputEvent::PointerMove(PointerEvent::new(20.0, 25.0, 5)));

    let frame = Frame::from_controller(&controller, &Viewport::default());
    let (commands, _) = record(&frame, &RendererConfig::default());
    let preview = layer_commands(&commands, Layer::Preview);
    assert!(preview
        .iter()
        .any(|c| matches!(c, DrawCommand::StrokePath { .. })));
    assert!(layer_commands(&commands, Layer::Strokes).is_empty());
}

#[test]
fn test_rectangle_preview_uses_fill() {
    let mut controller = SketchController::new();
    controller.style_mut().fill_color = Some("#223344".to_string());
    controller.set_tool(Tool::Rectangle);
    controller.handle(&InputEvent::PointerDown(PointerEvent::new(10.0, 10.0, 0)));
    controller.handle(&InputEvent::PointerMove(PointerEvent::new(60.0, 40.0, 5)));

    let frame = Frame::from_controller(&controller, &Viewport::default());
    let (commands, _) = record(&frame, &RendererConfig::default());
    let preview = layer_commands(&commands, Layer::Preview);
    assert!(preview.iter().any(
        |c| matches!(c, DrawCommand::FillRect { color, .. } if color == "#223344")
    ));
}

#[test]
fn test_zoom_scales_the_frame() {
    let mut controller = SketchController::new();
    let zoom_in = KeyEvent::with_modifiers(
        "=",
        KeyModifiers {
            ctrl: true,
            ..KeyModifiers::default()
        },
        0,
    );
    controller.handle(&InputEvent::Key(zoom_in));
    assert_eq!(controller.zoom(), 110);

    let frame = Frame::from_controller(&controller, &Viewport::default());
    let (commands, _) = record(&frame, &RendererConfig::default());
    assert!(matches!(commands[1], DrawCommand::Scale(z) if (z - 1.1).abs() < 1e-6));
    let visible = frame.area;
    assert!((visible.size.width - 800.0 / 1.1).abs() < 1e-3);
}

// ============================================================================
// Renderer front-end
// ============================================================================

#[test]
fn test_renderer_svg_backend_end_to_end() {
    let (mut doc, a, b) = two_connected_boxes();
    doc.add_connection(a, b, ConnectionType::Bidirectional);
    let mut renderer = Renderer::new(RendererConfig::default()).expect("renderer");
    renderer.resize(400.0, 300.0, 2.0).expect("resize");
    assert_eq!(renderer.active_backend(), BackendType::Svg);

    let stats = renderer.render(&Frame::new(&doc, area())).expect("render");
    assert_eq!(stats.connections_drawn, 1);
    assert_eq!(renderer.frame_count(), 1);
}
