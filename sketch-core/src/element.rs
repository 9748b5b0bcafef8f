//! System elements - the architecture icons placed on the canvas.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::geometry::{Point, Rect, Size};

/// Default element width for tool-created and generated elements.
pub const DEFAULT_ELEMENT_WIDTH: f32 = 120.0;

/// Default element height for tool-created and generated elements.
pub const DEFAULT_ELEMENT_HEIGHT: f32 = 80.0;

/// Default element fill color.
pub const DEFAULT_FILL_COLOR: &str = "#374151";

/// Default label font size in pixels.
pub const DEFAULT_FONT_SIZE: f32 = 14.0;

/// Unique identifier for an element, connection or stroke.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ElementId(Uuid);

impl ElementId {
    /// Create a new unique ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create from an existing UUID.
    #[must_use]
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// The ID that never refers to an element.
    ///
    /// Connection endpoints that could not be resolved carry this value.
    #[must_use]
    pub const fn nil() -> Self {
        Self(Uuid::nil())
    }

    /// Whether this is the unresolved (nil) ID.
    #[must_use]
    pub fn is_nil(&self) -> bool {
        self.0.is_nil()
    }

    /// Parse an ID from its string form.
    ///
    /// # Errors
    ///
    /// Returns an error if the string is not a valid UUID.
    pub fn parse(s: &str) -> Result<Self, uuid::Error> {
        Uuid::parse_str(s).map(Self)
    }
}

impl Default for ElementId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ElementId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The architecture icon an element represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementType {
    /// Data store cylinder.
    Database,
    /// Compute node.
    Server,
    /// Cloud / external network.
    Cloud,
    /// Human actor.
    User,
    /// API boundary.
    Api,
    /// Generic box.
    Box,
}

impl ElementType {
    /// Lowercase identifier, as serialized.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Database => "database",
            Self::Server => "server",
            Self::Cloud => "cloud",
            Self::User => "user",
            Self::Api => "api",
            Self::Box => "box",
        }
    }

    /// Capitalized name used for default labels ("Server 3").
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Database => "Database",
            Self::Server => "Server",
            Self::Cloud => "Cloud",
            Self::User => "User",
            Self::Api => "Api",
            Self::Box => "Box",
        }
    }
}

impl FromStr for ElementType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "database" => Ok(Self::Database),
            "server" => Ok(Self::Server),
            "cloud" => Ok(Self::Cloud),
            "user" => Ok(Self::User),
            "api" => Ok(Self::Api),
            "box" => Ok(Self::Box),
            _ => Err(format!("Unknown element type: {s}")),
        }
    }
}

impl std::fmt::Display for ElementType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A placed architecture icon.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemElement {
    /// Unique identifier.
    pub id: ElementId,
    /// Icon type.
    #[serde(rename = "type")]
    pub element_type: ElementType,
    /// Top-left corner.
    pub position: Point,
    /// Width and height.
    pub size: Size,
    /// Label.
    pub text: String,
    /// Stroke color as hex.
    pub color: String,
    /// Fill color as hex.
    pub fill_color: String,
    /// Label font size in pixels.
    pub font_size: f32,
    /// Whether this element is selected.
    #[serde(default)]
    pub selected: bool,
    /// Connection IDs touching this element. Informational only.
    #[serde(default)]
    pub connections: Vec<ElementId>,
}

impl SystemElement {
    /// Create a new element of the given type at `position` with default size and styling.
    #[must_use]
    pub fn new(element_type: ElementType, position: Point, text: impl Into<String>) -> Self {
        Self {
            id: ElementId::new(),
            element_type,
            position,
            size: Size::new(DEFAULT_ELEMENT_WIDTH, DEFAULT_ELEMENT_HEIGHT),
            text: text.into(),
            color: "#ffffff".to_string(),
            fill_color: DEFAULT_FILL_COLOR.to_string(),
            font_size: DEFAULT_FONT_SIZE,
            selected: false,
            connections: Vec::new(),
        }
    }

    /// Set the size.
    #[must_use]
    pub fn with_size(mut self, size: Size) -> Self {
        self.size = size;
        self
    }

    /// Set stroke and fill colors.
    #[must_use]
    pub fn with_colors(mut self, color: impl Into<String>, fill_color: impl Into<String>) -> Self {
        self.color = color.into();
        self.fill_color = fill_color.into();
        self
    }

    /// Axis-aligned bounding box.
    #[must_use]
    pub fn bounds(&self) -> Rect {
        Rect::new(self.position, self.size)
    }

    /// Geometric center, the anchor for connections.
    #[must_use]
    pub fn center(&self) -> Point {
        self.bounds().center()
    }

    /// Check if a point (in canvas coordinates) is within this element.
    #[must_use]
    pub fn contains_point(&self, point: Point) -> bool {
        self.bounds().contains(point)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn element_type_parses_case_insensitively() {
        assert_eq!("Server".parse::<ElementType>(), Ok(ElementType::Server));
        assert_eq!(" api ".parse::<ElementType>(), Ok(ElementType::Api));
        assert!("load balancer".parse::<ElementType>().is_err());
    }

    #[test]
    fn element_serializes_type_field() {
        let el = SystemElement::new(ElementType::Database, Point::new(0.0, 0.0), "DB");
        let json = serde_json::to_value(&el).expect("serialize");
        assert_eq!(json["type"], "database");
        assert_eq!(json["text"], "DB");
    }

    #[test]
    fn center_is_middle_of_bounds() {
        let el = SystemElement::new(ElementType::Server, Point::new(40.0, 60.0), "S");
        assert_eq!(el.center(), Point::new(100.0, 100.0));
        assert!(el.contains_point(Point::new(160.0, 140.0)));
        assert!(!el.contains_point(Point::new(161.0, 140.0)));
    }

    #[test]
    fn nil_id_is_distinct_from_fresh_ids() {
        assert!(ElementId::nil().is_nil());
        assert!(!ElementId::new().is_nil());
        let id = ElementId::new();
        assert_eq!(ElementId::parse(&id.to_string()).expect("parse"), id);
    }
}
