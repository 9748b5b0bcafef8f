//! Tools and the drawing style they apply.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::element::ElementType;
use crate::error::SketchError;
use crate::stroke::{BrushType, ShapeKind};

/// The active input-interpretation mode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tool {
    /// Select and drag elements.
    #[default]
    Select,
    /// Two-click connection between elements.
    Connector,
    /// Freehand pen.
    Pen,
    /// Rectangle shape.
    Rectangle,
    /// Circle shape.
    Circle,
    /// Triangle shape.
    Triangle,
    /// Straight line shape.
    Line,
    /// Straight arrow shape.
    Arrow,
    /// Remove strokes under the pointer.
    Eraser,
    /// Place and edit text annotations.
    Text,
    /// Pan placeholder; pointer input is ignored.
    Hand,
    /// Place a database element.
    Database,
    /// Place a server element.
    Server,
    /// Place a cloud element.
    Cloud,
    /// Place a user element.
    User,
    /// Place an API element.
    Api,
}

impl Tool {
    /// Every tool, in toolbar order.
    pub const ALL: [Self; 16] = [
        Self::Select,
        Self::Connector,
        Self::Pen,
        Self::Rectangle,
        Self::Circle,
        Self::Triangle,
        Self::Line,
        Self::Arrow,
        Self::Eraser,
        Self::Text,
        Self::Hand,
        Self::Database,
        Self::Server,
        Self::Cloud,
        Self::User,
        Self::Api,
    ];

    /// Lowercase identifier, as serialized.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Select => "select",
            Self::Connector => "connector",
            Self::Pen => "pen",
            Self::Rectangle => "rectangle",
            Self::Circle => "circle",
            Self::Triangle => "triangle",
            Self::Line => "line",
            Self::Arrow => "arrow",
            Self::Eraser => "eraser",
            Self::Text => "text",
            Self::Hand => "hand",
            Self::Database => "database",
            Self::Server => "server",
            Self::Cloud => "cloud",
            Self::User => "user",
            Self::Api => "api",
        }
    }

    /// The element this tool places on click, if it is a creation tool.
    #[must_use]
    pub const fn element_type(self) -> Option<ElementType> {
        match self {
            Self::Database => Some(ElementType::Database),
            Self::Server => Some(ElementType::Server),
            Self::Cloud => Some(ElementType::Cloud),
            Self::User => Some(ElementType::User),
            Self::Api => Some(ElementType::Api),
            _ => None,
        }
    }

    /// The shape this tool drags out, if it is a shape tool.
    #[must_use]
    pub const fn shape(self) -> Option<ShapeKind> {
        match self {
            Self::Rectangle => Some(ShapeKind::Rectangle),
            Self::Circle => Some(ShapeKind::Circle),
            Self::Triangle => Some(ShapeKind::Triangle),
            Self::Line => Some(ShapeKind::Line),
            Self::Arrow => Some(ShapeKind::Arrow),
            _ => None,
        }
    }

    /// Whether double-clicking an element opens its label editor.
    #[must_use]
    pub const fn allows_label_edit(self) -> bool {
        matches!(self, Self::Select | Self::Connector)
    }
}

impl FromStr for Tool {
    type Err = SketchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_lowercase();
        // The pen is also exposed as "freehand" in some toolbars.
        if needle == "freehand" {
            return Ok(Self::Pen);
        }
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == needle)
            .ok_or_else(|| SketchError::UnknownTool(s.to_string()))
    }
}

impl std::fmt::Display for Tool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Style applied to newly created strokes and elements.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolStyle {
    /// Stroke color as hex.
    pub stroke_color: String,
    /// Stroke width in pixels; also the eraser radius.
    pub stroke_width: f32,
    /// Optional fill for shape previews and generated elements.
    pub fill_color: Option<String>,
    /// Opacity for new strokes.
    pub opacity: f32,
    /// Brush for pen strokes.
    pub brush: BrushType,
}

impl Default for ToolStyle {
    fn default() -> Self {
        Self {
            stroke_color: "#ffffff".to_string(),
            stroke_width: 2.0,
            fill_color: None,
            opacity: 1.0,
            brush: BrushType::Pencil,
        }
    }
}
