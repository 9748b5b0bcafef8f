//! The canvas document: every element, connection, stroke and annotation.

use serde::{Deserialize, Serialize};

use crate::connection::{Connection, ConnectionType};
use crate::element::{ElementId, ElementType, SystemElement, DEFAULT_FILL_COLOR, DEFAULT_FONT_SIZE};
use crate::error::{SketchError, SketchResult};
use crate::geometry::{Point, Rect, Size};
use crate::history::HistorySnapshot;
use crate::stroke::{FreehandStroke, ShapeKind};
use crate::text::TextAnnotation;
use crate::tool::ToolStyle;

/// Provenance of a generated diagram.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiagramMetadata {
    /// Diagram title.
    pub title: String,
    /// One-paragraph description.
    pub description: String,
    /// Prompt that produced the diagram.
    pub prompt: String,
    /// Creation time in milliseconds since the Unix epoch.
    pub created_at_ms: u64,
}

/// A batch of elements and connections produced outside the canvas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagram {
    /// New elements.
    pub elements: Vec<SystemElement>,
    /// New connections between them.
    pub connections: Vec<Connection>,
    /// Where the diagram came from.
    pub metadata: DiagramMetadata,
}

/// The complete canvas contents, owned by one controller.
///
/// Element iteration order is insertion order; hit testing returns the first
/// match in that order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CanvasDocument {
    elements: Vec<SystemElement>,
    connections: Vec<Connection>,
    strokes: Vec<FreehandStroke>,
    #[serde(default)]
    texts: Vec<TextAnnotation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    metadata: Option<DiagramMetadata>,
}

impl CanvasDocument {
    /// Create an empty document.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // -----------------------------------------------------------------------
    // Elements
    // -----------------------------------------------------------------------

    /// All elements in iteration order.
    #[must_use]
    pub fn elements(&self) -> &[SystemElement] {
        &self.elements
    }

    /// Get an element by ID.
    #[must_use]
    pub fn element(&self, id: ElementId) -> Option<&SystemElement> {
        self.elements.iter().find(|e| e.id == id)
    }

    /// Number of elements.
    #[must_use]
    pub fn element_count(&self) -> usize {
        self.elements.len()
    }

    /// Append an element.
    pub fn add_element(&mut self, element: SystemElement) -> ElementId {
        let id = element.id;
        self.elements.push(element);
        id
    }

    /// Create an element of `element_type` centered on `click`.
    ///
    /// The label is `"<Type> <N>"` where N is the element count plus one;
    /// labels are not deduplicated. The new element becomes the only
    /// selected element.
    pub fn create_element(
        &mut self,
        element_type: ElementType,
        click: Point,
        style: &ToolStyle,
    ) -> ElementId {
        let label = format!(
            "{} {}",
            element_type.display_name(),
            self.elements.len() + 1
        );
        let mut element = SystemElement::new(element_type, Point::new(0.0, 0.0), label)
            .with_colors(style.stroke_color.clone(), DEFAULT_FILL_COLOR);
        element.position = Point::new(
            click.x - element.size.width / 2.0,
            click.y - element.size.height / 2.0,
        );
        element.font_size = DEFAULT_FONT_SIZE;
        element.selected = true;

        self.clear_selection();
        tracing::debug!("Created {} '{}' at {:?}", element_type, element.text, element.position);
        self.add_element(element)
    }

    /// First element whose bounding box contains `point`.
    #[must_use]
    pub fn element_at(&self, point: Point) -> Option<&SystemElement> {
        self.elements.iter().find(|e| e.contains_point(point))
    }

    /// Mark `id` selected and every other element unselected.
    ///
    /// # Errors
    ///
    /// Returns an error if the element is not found.
    pub fn select_only(&mut self, id: ElementId) -> SketchResult<()> {
        if self.element(id).is_none() {
            return Err(SketchError::ElementNotFound(id.to_string()));
        }
        for element in &mut self.elements {
            element.selected = element.id == id;
        }
        Ok(())
    }

    /// Unselect every element.
    pub fn clear_selection(&mut self) {
        for element in &mut self.elements {
            element.selected = false;
        }
    }

    /// The selected element, if any.
    #[must_use]
    pub fn selected(&self) -> Option<&SystemElement> {
        self.elements.iter().find(|e| e.selected)
    }

    /// Move an element's top-left corner. Positions are not clamped.
    ///
    /// # Errors
    ///
    /// Returns an error if the element is not found.
    pub fn move_element(&mut self, id: ElementId, position: Point) -> SketchResult<()> {
        let element = self.element_mut(id)?;
        element.position = position;
        Ok(())
    }

    /// Replace an element's label. Empty labels are accepted.
    ///
    /// # Errors
    ///
    /// Returns an error if the element is not found.
    pub fn set_label(&mut self, id: ElementId, text: impl Into<String>) -> SketchResult<()> {
        let element = self.element_mut(id)?;
        element.text = text.into();
        Ok(())
    }

    fn element_mut(&mut self, id: ElementId) -> SketchResult<&mut SystemElement> {
        self.elements
            .iter_mut()
            .find(|e| e.id == id)
            .ok_or_else(|| SketchError::ElementNotFound(id.to_string()))
    }

    // -----------------------------------------------------------------------
    // Connections
    // -----------------------------------------------------------------------

    /// All connections.
    #[must_use]
    pub fn connections(&self) -> &[Connection] {
        &self.connections
    }

    /// Append a connection between two element IDs.
    ///
    /// Endpoints are recorded on both elements' informational `connections`
    /// lists when they exist; missing endpoints are not an error.
    pub fn add_connection(
        &mut self,
        from: ElementId,
        to: ElementId,
        connection_type: ConnectionType,
    ) -> ElementId {
        self.push_connection(Connection::new(from, to, connection_type))
    }

    /// Append a prepared connection.
    pub fn push_connection(&mut self, connection: Connection) -> ElementId {
        let id = connection.id;
        for element in &mut self.elements {
            if element.id == connection.from || element.id == connection.to {
                element.connections.push(id);
            }
        }
        self.connections.push(connection);
        id
    }

    /// Both endpoint elements of a connection, or `None` if either is missing.
    #[must_use]
    pub fn resolve_connection(
        &self,
        connection: &Connection,
    ) -> Option<(&SystemElement, &SystemElement)> {
        Some((self.element(connection.from)?, self.element(connection.to)?))
    }

    // -----------------------------------------------------------------------
    // Strokes
    // -----------------------------------------------------------------------

    /// All committed strokes.
    #[must_use]
    pub fn strokes(&self) -> &[FreehandStroke] {
        &self.strokes
    }

    /// Append a stroke.
    pub fn add_stroke(&mut self, stroke: FreehandStroke) -> ElementId {
        let id = stroke.id;
        self.strokes.push(stroke);
        id
    }

    /// Remove every stroke with a sample strictly within `radius` of `point`.
    ///
    /// Returns the number of strokes removed.
    pub fn erase_at(&mut self, point: Point, radius: f32) -> usize {
        let before = self.strokes.len();
        self.strokes.retain(|s| !s.touches(point, radius));
        before - self.strokes.len()
    }

    // -----------------------------------------------------------------------
    // Text annotations
    // -----------------------------------------------------------------------

    /// All text annotations.
    #[must_use]
    pub fn texts(&self) -> &[TextAnnotation] {
        &self.texts
    }

    /// Get an annotation by ID.
    #[must_use]
    pub fn text(&self, id: ElementId) -> Option<&TextAnnotation> {
        self.texts.iter().find(|t| t.id == id)
    }

    /// Append an annotation.
    pub fn add_text(&mut self, annotation: TextAnnotation) -> ElementId {
        let id = annotation.id;
        self.texts.push(annotation);
        id
    }

    /// Replace an annotation's content.
    ///
    /// # Errors
    ///
    /// Returns an error if the annotation is not found.
    pub fn update_text(&mut self, id: ElementId, text: impl Into<String>) -> SketchResult<()> {
        let annotation = self
            .texts
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| SketchError::TextNotFound(id.to_string()))?;
        annotation.text = text.into();
        Ok(())
    }

    /// Remove an annotation.
    ///
    /// # Errors
    ///
    /// Returns an error if the annotation is not found.
    pub fn remove_text(&mut self, id: ElementId) -> SketchResult<TextAnnotation> {
        let index = self
            .texts
            .iter()
            .position(|t| t.id == id)
            .ok_or_else(|| SketchError::TextNotFound(id.to_string()))?;
        Ok(self.texts.remove(index))
    }

    /// First annotation whose approximate bounds contain `point`.
    #[must_use]
    pub fn text_at(&self, point: Point) -> Option<&TextAnnotation> {
        self.texts
            .iter()
            .find(|t| t.approximate_bounds().contains(point))
    }

    // -----------------------------------------------------------------------
    // Whole-document operations
    // -----------------------------------------------------------------------

    /// Metadata of the last applied diagram.
    #[must_use]
    pub fn metadata(&self) -> Option<&DiagramMetadata> {
        self.metadata.as_ref()
    }

    /// Remove all elements, connections, strokes and annotations.
    pub fn clear(&mut self) {
        self.elements.clear();
        self.connections.clear();
        self.strokes.clear();
        self.texts.clear();
        self.metadata = None;
    }

    /// Check if the document is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
            && self.connections.is_empty()
            && self.strokes.is_empty()
            && self.texts.is_empty()
    }

    /// Bounding box of everything drawn, or `None` when empty.
    ///
    /// Strokes grow by their width; circle shapes use their drawn radius.
    #[must_use]
    pub fn content_bounds(&self) -> Option<Rect> {
        let elements = self.elements.iter().map(SystemElement::bounds);
        let strokes = self.strokes.iter().filter_map(|stroke| {
            let bounds = match stroke.shape_corners() {
                Some((ShapeKind::Circle, a, b)) => {
                    let radius = a.distance_to(b) / 2.0;
                    let center = Point::new((a.x + b.x) / 2.0, (a.y + b.y) / 2.0);
                    Rect::new(center, Size::new(0.0, 0.0)).inflate(radius)
                }
                _ => stroke.bounds()?,
            };
            Some(bounds.inflate(stroke.stroke_width / 2.0))
        });
        let texts = self
            .texts
            .iter()
            .filter(|t| !t.is_blank())
            .map(TextAnnotation::approximate_bounds);
        elements
            .chain(strokes)
            .chain(texts)
            .reduce(|acc, r| acc.union(&r))
    }

    /// Replace elements and connections with a generated diagram.
    ///
    /// Strokes and annotations are kept.
    pub fn apply_diagram(&mut self, diagram: Diagram) {
        tracing::info!(
            "Applying diagram '{}': {} elements, {} connections",
            diagram.metadata.title,
            diagram.elements.len(),
            diagram.connections.len()
        );
        self.elements = diagram.elements;
        self.connections = Vec::new();
        for connection in diagram.connections {
            self.push_connection(connection);
        }
        self.metadata = Some(diagram.metadata);
    }

    /// Deep copy of the contents for the history buffer.
    #[must_use]
    pub fn snapshot(&self) -> HistorySnapshot {
        HistorySnapshot {
            elements: self.elements.clone(),
            connections: self.connections.clone(),
            strokes: self.strokes.clone(),
            texts: self.texts.clone(),
        }
    }

    /// Replace the contents with a snapshot.
    pub fn restore(&mut self, snapshot: HistorySnapshot) {
        self.elements = snapshot.elements;
        self.connections = snapshot.connections;
        self.strokes = snapshot.strokes;
        self.texts = snapshot.texts;
    }

    /// Serialize the document to JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> SketchResult<String> {
        serde_json::to_string(self).map_err(SketchError::Serialization)
    }

    /// Deserialize a document from JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if deserialization fails.
    pub fn from_json(json: &str) -> SketchResult<Self> {
        serde_json::from_str(json).map_err(SketchError::Serialization)
    }
}
