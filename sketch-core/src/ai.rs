//! # Generated Diagrams
//!
//! Turns the JSON a text-to-diagram model returns into canvas elements.
//!
//! ```text
//! raw model text ──► AiResponse::parse ──► AiResponse ──► into_diagram ──► Diagram
//!                        │ ParseError                          │
//!                        ▼                                     ▼
//!              generate_or_fallback                CanvasDocument::apply_diagram
//! ```
//!
//! Parsing fails closed: anything that is not a well-formed response becomes a
//! [`ParseError`]. Callers going through [`generate_or_fallback`] never see
//! the error; they get the fixed three-node fallback diagram instead.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::connection::{Connection, ConnectionType};
use crate::document::{Diagram, DiagramMetadata};
use crate::element::{ElementId, ElementType, SystemElement, DEFAULT_FILL_COLOR};
use crate::geometry::{Point, Size};
use crate::tool::ToolStyle;

/// Columns of the layout grid used for elements without a position.
const GRID_COLUMNS: usize = 3;

/// Top-left of the layout grid.
const GRID_ORIGIN: Point = Point::new(100.0, 100.0);

/// Horizontal distance between grid cells.
const GRID_STEP_X: f32 = 200.0;

/// Vertical distance between grid cells.
const GRID_STEP_Y: f32 = 160.0;

/// Why a model response was rejected.
#[derive(Debug, Error)]
pub enum ParseError {
    /// No `{ ... }` span in the text.
    #[error("No JSON object found in response")]
    NoJsonObject,

    /// The object is not valid JSON or has the wrong shape.
    #[error("Invalid response JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// A required top-level field is absent or empty.
    #[error("Missing field: {0}")]
    MissingField(&'static str),

    /// An element has no label.
    #[error("Element {index} has an empty label")]
    EmptyLabel {
        /// Position of the element in the response.
        index: usize,
    },

    /// A connection names a label no element carries.
    #[error("Connection references unknown label: {0}")]
    UnresolvedLabel(String),
}

/// Why a generation request produced no response.
#[derive(Debug, Error)]
pub enum GenerateError {
    /// No generator is configured.
    #[error("Diagram generation is not configured")]
    Unavailable,

    /// The request could not be completed.
    #[error("Transport error: {0}")]
    Transport(String),

    /// The upstream answered with a non-success status.
    #[error("Upstream returned status {0}")]
    Status(u16),

    /// The upstream answered with an unusable body.
    #[error(transparent)]
    Parse(#[from] ParseError),
}

/// One element of a model response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AiElement {
    /// Icon type.
    #[serde(rename = "type")]
    pub element_type: ElementType,
    /// Label; connections refer to elements by it.
    pub label: String,
    /// Explicit top-left position.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<Point>,
    /// Explicit size.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<Size>,
    /// One-line purpose or technology.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl AiElement {
    fn new(element_type: ElementType, label: &str) -> Self {
        Self {
            element_type,
            label: label.to_string(),
            position: None,
            size: None,
            details: None,
        }
    }
}

/// One connection of a model response, by label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AiConnection {
    /// Source element label.
    pub from: String,
    /// Target element label.
    pub to: String,
    /// Optional flow description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Line style.
    #[serde(rename = "type", default)]
    pub connection_type: ConnectionType,
}

impl AiConnection {
    fn new(from: &str, to: &str, label: &str) -> Self {
        Self {
            from: from.to_string(),
            to: to.to_string(),
            label: Some(label.to_string()),
            connection_type: ConnectionType::Arrow,
        }
    }
}

/// A validated model response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AiResponse {
    /// Diagram title.
    pub title: String,
    /// Diagram description.
    #[serde(default)]
    pub description: String,
    /// Elements in response order.
    pub elements: Vec<AiElement>,
    /// Connections by label.
    pub connections: Vec<AiConnection>,
}

// Loosely-typed mirror of the response, validated into `AiResponse`.
#[derive(Deserialize)]
struct RawResponse {
    title: Option<String>,
    description: Option<String>,
    elements: Option<Vec<RawElement>>,
    connections: Option<Vec<RawConnection>>,
}

#[derive(Deserialize)]
struct RawElement {
    #[serde(rename = "type", default)]
    element_type: String,
    label: Option<String>,
    position: Option<Point>,
    size: Option<Size>,
    details: Option<String>,
}

#[derive(Deserialize)]
struct RawConnection {
    from: String,
    to: String,
    label: Option<String>,
    #[serde(rename = "type")]
    connection_type: Option<String>,
}

/// How connection labels missing from the element list are handled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LabelResolution {
    /// Use [`ElementId::nil`]; the renderer skips such connections.
    #[default]
    Lenient,
    /// Reject the response with [`ParseError::UnresolvedLabel`].
    Strict,
}

impl AiResponse {
    /// Parse model output, which may wrap the JSON object in prose or fences.
    ///
    /// # Errors
    ///
    /// Returns an error if no object is found, it is not valid JSON, or a
    /// required field is missing or empty.
    pub fn parse(raw: &str) -> Result<Self, ParseError> {
        let json = extract_json_object(raw).ok_or(ParseError::NoJsonObject)?;
        let parsed: RawResponse = serde_json::from_str(json)?;

        let title = parsed
            .title
            .filter(|t| !t.trim().is_empty())
            .ok_or(ParseError::MissingField("title"))?;
        let raw_elements = parsed.elements.ok_or(ParseError::MissingField("elements"))?;
        let raw_connections = parsed
            .connections
            .ok_or(ParseError::MissingField("connections"))?;

        let elements = raw_elements
            .into_iter()
            .enumerate()
            .map(|(index, el)| {
                let label = el
                    .label
                    .filter(|l| !l.trim().is_empty())
                    .ok_or(ParseError::EmptyLabel { index })?;
                let element_type = el.element_type.parse().unwrap_or_else(|_| {
                    tracing::debug!("Unknown element type '{}', using box", el.element_type);
                    ElementType::Box
                });
                Ok(AiElement {
                    element_type,
                    label,
                    position: el.position,
                    size: el.size,
                    details: el.details,
                })
            })
            .collect::<Result<Vec<_>, ParseError>>()?;

        let connections = raw_connections
            .into_iter()
            .map(|c| AiConnection {
                connection_type: c
                    .connection_type
                    .and_then(|t| t.parse().ok())
                    .unwrap_or_default(),
                from: c.from,
                to: c.to,
                label: c.label,
            })
            .collect();

        Ok(Self {
            title,
            description: parsed.description.unwrap_or_default(),
            elements,
            connections,
        })
    }

    /// The diagram substituted when generation fails.
    #[must_use]
    pub fn fallback() -> Self {
        Self {
            title: "System Design".to_string(),
            description: "Generated system design based on your requirements".to_string(),
            elements: vec![
                AiElement::new(ElementType::User, "User"),
                AiElement::new(ElementType::Server, "Application Server"),
                AiElement::new(ElementType::Database, "Database"),
            ],
            connections: vec![
                AiConnection::new("User", "Application Server", "Request"),
                AiConnection::new("Application Server", "Database", "Query"),
            ],
        }
    }

    /// Build canvas elements and connections with fresh IDs.
    ///
    /// Elements without a position are laid out on a grid in response order.
    /// Connection endpoints are matched by exact label; when several elements
    /// share a label the first one wins.
    ///
    /// # Errors
    ///
    /// With [`LabelResolution::Strict`], returns an error if a connection
    /// names a label no element carries.
    pub fn into_diagram(
        self,
        prompt: &str,
        style: &ToolStyle,
        resolution: LabelResolution,
        created_at_ms: u64,
    ) -> Result<Diagram, ParseError> {
        let fill = style
            .fill_color
            .clone()
            .unwrap_or_else(|| DEFAULT_FILL_COLOR.to_string());

        let elements: Vec<SystemElement> = self
            .elements
            .into_iter()
            .enumerate()
            .map(|(i, el)| {
                let position = el.position.unwrap_or_else(|| grid_position(i));
                let mut element = SystemElement::new(el.element_type, position, el.label)
                    .with_colors(style.stroke_color.clone(), fill.clone());
                if let Some(size) = el.size {
                    element.size = size;
                }
                element
            })
            .collect();

        let resolve = |label: &str| -> Result<ElementId, ParseError> {
            match elements.iter().find(|e| e.text == label) {
                Some(e) => Ok(e.id),
                None if resolution == LabelResolution::Strict => {
                    Err(ParseError::UnresolvedLabel(label.to_string()))
                }
                None => {
                    tracing::warn!("Connection endpoint '{label}' matches no element");
                    Ok(ElementId::nil())
                }
            }
        };

        let connections = self
            .connections
            .iter()
            .map(|c| {
                let mut connection =
                    Connection::new(resolve(&c.from)?, resolve(&c.to)?, c.connection_type);
                connection.label.clone_from(&c.label);
                Ok(connection)
            })
            .collect::<Result<Vec<_>, ParseError>>()?;

        Ok(Diagram {
            elements,
            connections,
            metadata: DiagramMetadata {
                title: self.title,
                description: self.description,
                prompt: prompt.to_string(),
                created_at_ms,
            },
        })
    }
}

#[allow(clippy::cast_precision_loss)]
fn grid_position(index: usize) -> Point {
    let column = (index % GRID_COLUMNS) as f32;
    let row = (index / GRID_COLUMNS) as f32;
    Point::new(
        GRID_ORIGIN.x + column * GRID_STEP_X,
        GRID_ORIGIN.y + row * GRID_STEP_Y,
    )
}

/// The outermost `{ ... }` span of `raw`.
fn extract_json_object(raw: &str) -> Option<&str> {
    let start = raw.find('{')?;
    let end = raw.rfind('}')?;
    if end <= start {
        return None;
    }
    Some(&raw[start..=end])
}

/// A source of diagrams for a text prompt.
#[async_trait]
pub trait DiagramGenerator: Send + Sync {
    /// Produce a diagram for `prompt`.
    ///
    /// # Errors
    ///
    /// Returns an error if the upstream is unreachable or its answer is unusable.
    async fn generate(&self, prompt: &str) -> Result<AiResponse, GenerateError>;
}

/// Result of [`generate_or_fallback`].
#[derive(Debug, Clone, PartialEq)]
pub struct Generation {
    /// The diagram to show.
    pub response: AiResponse,
    /// Whether `response` is the fallback diagram.
    pub fallback: bool,
}

/// Ask `generator` for a diagram, substituting the fallback on any failure.
///
/// There is no retry.
pub async fn generate_or_fallback(generator: &dyn DiagramGenerator, prompt: &str) -> Generation {
    match generator.generate(prompt).await {
        Ok(response) => {
            tracing::info!(
                "Generated diagram '{}' with {} elements",
                response.title,
                response.elements.len()
            );
            Generation {
                response,
                fallback: false,
            }
        }
        Err(e) => {
            tracing::warn!("Diagram generation failed, using fallback: {e}");
            Generation {
                response: AiResponse::fallback(),
                fallback: true,
            }
        }
    }
}
