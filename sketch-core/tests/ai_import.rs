//! Generated Diagram Import Tests
//!
//! Tests the path from model output to canvas contents:
//! - Unresolved connection labels
//! - Fallback substitution
//! - Applying a diagram to a live controller

use async_trait::async_trait;
use sketch_core::{
    generate_or_fallback, AiResponse, DiagramGenerator, ElementId, GenerateError,
    LabelResolution, ParseError, SketchController, Tool, ToolStyle,
};

const MISSING_LABEL: &str = r#"{
  "title": "Broken",
  "description": "References a component it never defines",
  "elements": [
    {"type": "server", "label": "API"},
    {"type": "database", "label": "DB"}
  ],
  "connections": [
    {"from": "API", "to": "DB", "label": "SQL"},
    {"from": "API", "to": "Cache", "label": "GET"}
  ]
}"#;

struct Fixed(Result<&'static str, u16>);

#[async_trait]
impl DiagramGenerator for Fixed {
    async fn generate(&self, _prompt: &str) -> Result<AiResponse, GenerateError> {
        match self.0 {
            Ok(body) => Ok(AiResponse::parse(body)?),
            Err(status) => Err(GenerateError::Status(status)),
        }
    }
}

// ============================================================================
// Label Resolution
// ============================================================================

#[test]
fn test_missing_label_resolves_to_nil_endpoint() {
    let diagram = AiResponse::parse(MISSING_LABEL)
        .expect("parse")
        .into_diagram("p", &ToolStyle::default(), LabelResolution::default(), 0)
        .expect("lenient");

    assert_eq!(diagram.connections.len(), 2);
    assert!(!diagram.connections[0].has_unresolved_endpoint());
    assert_eq!(diagram.connections[1].to, ElementId::nil());
    assert!(diagram.connections[1].has_unresolved_endpoint());
}

#[test]
fn test_missing_label_is_rejected_in_strict_mode() {
    let result = AiResponse::parse(MISSING_LABEL).expect("parse").into_diagram(
        "p",
        &ToolStyle::default(),
        LabelResolution::Strict,
        0,
    );
    assert!(matches!(result, Err(ParseError::UnresolvedLabel(label)) if label == "Cache"));
}

#[test]
fn test_dangling_connection_does_not_resolve_in_document() {
    let diagram = AiResponse::parse(MISSING_LABEL)
        .expect("parse")
        .into_diagram("p", &ToolStyle::default(), LabelResolution::Lenient, 0)
        .expect("lenient");

    let mut controller = SketchController::new();
    controller.apply_diagram(diagram, 0);
    let document = controller.document();
    let resolved = document
        .connections()
        .iter()
        .filter(|c| document.resolve_connection(c).is_some())
        .count();
    assert_eq!(resolved, 1);
}

// ============================================================================
// Fallback
// ============================================================================

#[tokio::test]
async fn test_upstream_failure_yields_fallback() {
    let generation = generate_or_fallback(&Fixed(Err(503)), "chat app").await;
    assert!(generation.fallback);
    assert_eq!(generation.response, AiResponse::fallback());
}

#[tokio::test]
async fn test_malformed_response_yields_fallback() {
    let generation = generate_or_fallback(&Fixed(Ok("sorry, I cannot help")), "chat app").await;
    assert!(generation.fallback);
    assert_eq!(generation.response.title, "System Design");
}

#[tokio::test]
async fn test_valid_response_is_passed_through() {
    let generation = generate_or_fallback(&Fixed(Ok(MISSING_LABEL)), "chat app").await;
    assert!(!generation.fallback);
    assert_eq!(generation.response.title, "Broken");
}

// ============================================================================
// Applying to the Canvas
// ============================================================================

#[test]
fn test_apply_replaces_elements_but_keeps_strokes() {
    let mut controller = SketchController::new();
    controller.set_tool(Tool::Cloud);
    controller.handle(&sketch_core::InputEvent::PointerDown(
        sketch_core::PointerEvent::new(50.0, 50.0, 0),
    ));
    controller.set_tool(Tool::Pen);
    for event in [
        sketch_core::InputEvent::PointerDown(sketch_core::PointerEvent::new(0.0, 0.0, 0)),
        sketch_core::InputEvent::PointerMove(sketch_core::PointerEvent::new(9.0, 9.0, 0)),
        sketch_core::InputEvent::PointerUp(sketch_core::PointerEvent::new(9.0, 9.0, 0)),
    ] {
        controller.handle(&event);
    }
    assert!(controller.tick(5_000));

    let diagram = AiResponse::fallback()
        .into_diagram("todo app", controller.style(), LabelResolution::Lenient, 7)
        .expect("fallback resolves");
    controller.apply_diagram(diagram, 7);

    let document = controller.document();
    let labels: Vec<_> = document.elements().iter().map(|e| e.text.as_str()).collect();
    assert_eq!(labels, ["User", "Application Server", "Database"]);
    assert_eq!(document.connections().len(), 2);
    assert_eq!(document.strokes().len(), 1);
    assert_eq!(document.metadata().map(|m| m.prompt.as_str()), Some("todo app"));

    // The import is undoable once autosaved.
    assert!(controller.tick(10_000));
    controller.undo();
    assert_eq!(controller.document().elements()[0].text, "Cloud 1");
}
