//! Free-standing text annotations placed with the text tool.

use serde::{Deserialize, Serialize};

use crate::element::ElementId;
use crate::geometry::{Point, Rect, Size};

/// Font size for new annotations.
pub const DEFAULT_ANNOTATION_FONT_SIZE: f32 = 42.0;

/// Line height as a multiple of font size.
pub const LINE_HEIGHT_FACTOR: f32 = 1.2;

/// Average glyph advance as a multiple of font size, used where no text
/// measurement is available.
pub const APPROX_GLYPH_ADVANCE: f32 = 0.55;

/// A block of text anchored at its top-left.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextAnnotation {
    /// Unique identifier.
    pub id: ElementId,
    /// Top-left of the first line.
    pub position: Point,
    /// Content; `\n` separates lines.
    pub text: String,
    /// Fill color as hex.
    pub color: String,
    /// Font size in pixels.
    pub font_size: f32,
    /// CSS font family.
    pub font_family: String,
}

impl TextAnnotation {
    /// Create an empty annotation at `position`.
    #[must_use]
    pub fn new(position: Point, color: impl Into<String>) -> Self {
        Self {
            id: ElementId::new(),
            position,
            text: String::new(),
            color: color.into(),
            font_size: DEFAULT_ANNOTATION_FONT_SIZE,
            font_family: "Arial, sans-serif".to_string(),
        }
    }

    /// Lines of the annotation.
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.text.split('\n')
    }

    /// Whether the annotation has no visible characters.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }

    /// Approximate bounds without a text shaper.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn approximate_bounds(&self) -> Rect {
        let longest = self.lines().map(|l| l.chars().count()).max().unwrap_or(0);
        let line_count = self.lines().count().max(1);
        let width = longest as f32 * self.font_size * APPROX_GLYPH_ADVANCE;
        let height = line_count as f32 * self.font_size * LINE_HEIGHT_FACTOR;
        Rect::new(self.position, Size::new(width, height))
    }
}
