//! Connections between elements.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::element::ElementId;
use crate::geometry::Point;

/// How a connection line is drawn.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionType {
    /// Solid line with an arrowhead at the target.
    #[default]
    Arrow,
    /// Solid line, no arrowhead.
    Line,
    /// Dashed line, no arrowhead.
    Dashed,
    /// Solid line with an arrowhead.
    Bidirectional,
}

impl ConnectionType {
    /// Whether an arrowhead is drawn at the target end.
    #[must_use]
    pub const fn has_arrowhead(self) -> bool {
        matches!(self, Self::Arrow | Self::Bidirectional)
    }
}

impl FromStr for ConnectionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "arrow" => Ok(Self::Arrow),
            "line" => Ok(Self::Line),
            "dashed" => Ok(Self::Dashed),
            "bidirectional" => Ok(Self::Bidirectional),
            _ => Err(format!("Unknown connection type: {s}")),
        }
    }
}

/// A line between two elements' centers.
///
/// Endpoints are not validated: a connection may reference an element that
/// no longer exists, or the same element twice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Connection {
    /// Unique identifier.
    pub id: ElementId,
    /// Source element.
    pub from: ElementId,
    /// Target element.
    pub to: ElementId,
    /// Optional label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Line style.
    #[serde(rename = "type", default)]
    pub connection_type: ConnectionType,
    /// Custom routing points. Not used by default rendering.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub points: Option<Vec<Point>>,
}

impl Connection {
    /// Create a new connection.
    #[must_use]
    pub fn new(from: ElementId, to: ElementId, connection_type: ConnectionType) -> Self {
        Self {
            id: ElementId::new(),
            from,
            to,
            label: None,
            connection_type,
            points: None,
        }
    }

    /// Set the label.
    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Whether either endpoint is the unresolved ID.
    #[must_use]
    pub fn has_unresolved_endpoint(&self) -> bool {
        self.from.is_nil() || self.to.is_nil()
    }
}
