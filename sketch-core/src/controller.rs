//! # Tool Dispatch
//!
//! [`SketchController`] is the single owner of a [`CanvasDocument`]. The host
//! forwards pointer and keyboard input as [`InputEvent`]s; the controller
//! interprets them according to the active [`Tool`] and reports whether the
//! canvas needs a redraw.
//!
//! ```text
//! InputEvent ──► label edit open? ──► edit buffer
//!            ──► text edit open?  ──► edit annotation
//!            ──► active tool      ──► document mutation
//!                                         │
//!                                         ▼
//!                              AutoSave::note_change
//! ```
//!
//! History snapshots are recorded by [`SketchController::tick`] once edits
//! have been quiet for the configured debounce window.

use crate::connection::ConnectionType;
use crate::document::{CanvasDocument, Diagram};
use crate::element::ElementId;
use crate::event::{InputEvent, KeyEvent, PointerEvent};
use crate::geometry::Point;
use crate::history::{AutoSave, HistoryBuffer, HistoryConfig, HistorySnapshot};
use crate::stroke::{FreehandStroke, ShapeKind};
use crate::text::TextAnnotation;
use crate::tool::{Tool, ToolStyle};

/// Default zoom level in percent.
pub const DEFAULT_ZOOM: u32 = 100;

/// Zoom change per shortcut press, in percent.
pub const ZOOM_STEP: u32 = 10;

/// Smallest zoom level in percent.
pub const MIN_ZOOM: u32 = 10;

/// Largest zoom level in percent.
pub const MAX_ZOOM: u32 = 500;

/// What an input did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Outcome {
    /// The canvas should be redrawn.
    pub redraw: bool,
    /// Document contents changed.
    pub document_changed: bool,
}

impl Outcome {
    /// Nothing happened.
    pub const NONE: Self = Self {
        redraw: false,
        document_changed: false,
    };

    /// Only transient state (preview, selection highlight) changed.
    pub const REDRAW: Self = Self {
        redraw: true,
        document_changed: false,
    };

    /// The document changed.
    pub const CHANGED: Self = Self {
        redraw: true,
        document_changed: true,
    };
}

/// Pointer gesture in progress.
#[derive(Debug, Clone, PartialEq)]
enum Interaction {
    Idle,
    Dragging { id: ElementId, offset: Point },
    Drawing { points: Vec<Point> },
    Shaping { kind: ShapeKind, start: Point, current: Point },
    Erasing,
}

/// An open inline label editor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelEdit {
    /// Element being relabelled.
    pub element: ElementId,
    /// Pending label text.
    pub buffer: String,
}

/// An annotation being typed into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextEdit {
    /// Annotation being edited.
    pub annotation: ElementId,
    /// Caret position in characters.
    pub cursor: usize,
}

/// Owns the document and interprets input against the active tool.
#[derive(Debug)]
pub struct SketchController {
    document: CanvasDocument,
    tool: Tool,
    style: ToolStyle,
    interaction: Interaction,
    connecting_from: Option<ElementId>,
    label_edit: Option<LabelEdit>,
    text_edit: Option<TextEdit>,
    history: HistoryBuffer<HistorySnapshot>,
    autosave: AutoSave,
    zoom: u32,
}

impl Default for SketchController {
    fn default() -> Self {
        Self::new()
    }
}

impl SketchController {
    /// Create a controller over an empty document with default history settings.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(HistoryConfig::default())
    }

    /// Create a controller over an empty document.
    #[must_use]
    pub fn with_config(config: HistoryConfig) -> Self {
        Self::with_document(CanvasDocument::new(), config)
    }

    /// Create a controller over an existing document.
    ///
    /// The document's current contents become the first history entry.
    #[must_use]
    pub fn with_document(document: CanvasDocument, config: HistoryConfig) -> Self {
        let history = HistoryBuffer::with_initial(config.capacity, document.snapshot());
        Self {
            document,
            tool: Tool::default(),
            style: ToolStyle::default(),
            interaction: Interaction::Idle,
            connecting_from: None,
            label_edit: None,
            text_edit: None,
            history,
            autosave: AutoSave::new(config.debounce_ms),
            zoom: DEFAULT_ZOOM,
        }
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    /// The document.
    #[must_use]
    pub fn document(&self) -> &CanvasDocument {
        &self.document
    }

    /// The active tool.
    #[must_use]
    pub fn tool(&self) -> Tool {
        self.tool
    }

    /// The drawing style.
    #[must_use]
    pub fn style(&self) -> &ToolStyle {
        &self.style
    }

    /// Mutable drawing style.
    pub fn style_mut(&mut self) -> &mut ToolStyle {
        &mut self.style
    }

    /// Source element of a pending connection.
    #[must_use]
    pub fn connecting_from(&self) -> Option<ElementId> {
        self.connecting_from
    }

    /// The open label editor.
    #[must_use]
    pub fn label_edit(&self) -> Option<&LabelEdit> {
        self.label_edit.as_ref()
    }

    /// The annotation being typed into.
    #[must_use]
    pub fn text_edit(&self) -> Option<TextEdit> {
        self.text_edit
    }

    /// Undo history.
    #[must_use]
    pub fn history(&self) -> &HistoryBuffer<HistorySnapshot> {
        &self.history
    }

    /// Zoom level in percent.
    #[must_use]
    pub fn zoom(&self) -> u32 {
        self.zoom
    }

    /// Whether an element drag is in progress.
    #[must_use]
    pub fn is_dragging(&self) -> bool {
        matches!(self.interaction, Interaction::Dragging { .. })
    }

    /// The uncommitted stroke or shape, styled as it would be committed.
    #[must_use]
    pub fn preview(&self) -> Option<FreehandStroke> {
        match &self.interaction {
            Interaction::Drawing { points } => Some(self.styled(FreehandStroke::polyline(
                points.clone(),
                self.style.stroke_color.clone(),
                self.style.stroke_width,
            ))),
            Interaction::Shaping {
                kind,
                start,
                current,
            } => Some(self.styled(FreehandStroke::shape(
                *kind,
                *start,
                *current,
                self.style.stroke_color.clone(),
                self.style.stroke_width,
            ))),
            _ => None,
        }
    }

    /// CSS cursor name for the active tool and state.
    #[must_use]
    pub fn cursor(&self) -> &'static str {
        match self.tool {
            Tool::Select => "default",
            Tool::Connector if self.connecting_from.is_some() => "crosshair",
            Tool::Connector => "pointer",
            _ => "crosshair",
        }
    }

    // -----------------------------------------------------------------------
    // Commands
    // -----------------------------------------------------------------------

    /// Switch tools.
    ///
    /// Any gesture, pending connection or text edit is ended first. An open
    /// label editor is cancelled as if Escape were pressed.
    pub fn set_tool(&mut self, tool: Tool) -> Outcome {
        if tool == self.tool {
            return Outcome::NONE;
        }
        tracing::debug!("Tool changed: {} -> {}", self.tool, tool);
        let changed = self.finish_text_edit();
        self.interaction = Interaction::Idle;
        self.connecting_from = None;
        self.label_edit = None;
        self.tool = tool;
        if changed {
            Outcome::CHANGED
        } else {
            Outcome::REDRAW
        }
    }

    /// Replace the label editor's buffer (host-side text input).
    pub fn set_label_buffer(&mut self, text: impl Into<String>) -> Outcome {
        match self.label_edit.as_mut() {
            Some(edit) => {
                edit.buffer = text.into();
                Outcome::REDRAW
            }
            None => Outcome::NONE,
        }
    }

    /// Commit the label editor. Empty labels are accepted.
    pub fn commit_label_edit(&mut self, now_ms: u64) -> Outcome {
        let Some(edit) = self.label_edit.take() else {
            return Outcome::NONE;
        };
        match self.document.set_label(edit.element, edit.buffer) {
            Ok(()) => self.changed(now_ms),
            Err(e) => {
                tracing::warn!("Label edit dropped: {e}");
                Outcome::REDRAW
            }
        }
    }

    /// Close the label editor without changing the label.
    pub fn cancel_label_edit(&mut self) -> Outcome {
        if self.label_edit.take().is_some() {
            Outcome::REDRAW
        } else {
            Outcome::NONE
        }
    }

    /// Step back one history entry.
    ///
    /// Edits still inside the autosave window are recorded first, so they
    /// stay reachable through redo.
    pub fn undo(&mut self) -> Outcome {
        self.flush_pending();
        match self.history.undo() {
            Some(snapshot) => {
                self.restore(snapshot);
                tracing::debug!("Undo to history entry {:?}", self.history.index());
                Outcome::CHANGED
            }
            None => Outcome::NONE,
        }
    }

    /// Step forward one history entry.
    ///
    /// An unsaved edit is a new branch point and ends the redo chain.
    pub fn redo(&mut self) -> Outcome {
        self.flush_pending();
        match self.history.redo() {
            Some(snapshot) => {
                self.restore(snapshot);
                tracing::debug!("Redo to history entry {:?}", self.history.index());
                Outcome::CHANGED
            }
            None => Outcome::NONE,
        }
    }

    /// Remove everything from the document.
    pub fn clear(&mut self, now_ms: u64) -> Outcome {
        self.reset_transient();
        self.document.clear();
        tracing::info!("Canvas cleared");
        self.changed(now_ms)
    }

    /// Replace elements and connections with a generated diagram.
    pub fn apply_diagram(&mut self, diagram: Diagram, now_ms: u64) -> Outcome {
        self.reset_transient();
        self.document.apply_diagram(diagram);
        self.changed(now_ms)
    }

    /// Record a history snapshot if the debounce window has elapsed.
    ///
    /// Returns whether a snapshot was recorded.
    pub fn tick(&mut self, now_ms: u64) -> bool {
        let document = &self.document;
        self.autosave
            .poll(now_ms, &mut self.history, || document.snapshot())
    }

    /// Interpret one input event.
    pub fn handle(&mut self, event: &InputEvent) -> Outcome {
        let now = event.timestamp_ms();
        match event {
            InputEvent::Key(key) => self.key_down(key),
            // The label editor is modal for pointer input.
            _ if self.label_edit.is_some() => Outcome::NONE,
            InputEvent::PointerDown(p) => self.pointer_down(p.point, now),
            InputEvent::PointerMove(p) => self.pointer_move(p.point, now),
            InputEvent::PointerUp(p) | InputEvent::PointerLeave(p) => self.pointer_up(p, now),
            InputEvent::DoubleClick(p) => self.double_click(p.point),
        }
    }

    // -----------------------------------------------------------------------
    // Pointer handling
    // -----------------------------------------------------------------------

    fn pointer_down(&mut self, point: Point, now: u64) -> Outcome {
        if let Some(element_type) = self.tool.element_type() {
            self.document.create_element(element_type, point, &self.style);
            return self.changed(now);
        }
        if let Some(kind) = self.tool.shape() {
            self.interaction = Interaction::Shaping {
                kind,
                start: point,
                current: point,
            };
            return Outcome::REDRAW;
        }
        match self.tool {
            Tool::Select => self.select_at(point),
            Tool::Connector => self.connect_at(point, now),
            Tool::Pen => {
                self.interaction = Interaction::Drawing {
                    points: vec![point],
                };
                Outcome::REDRAW
            }
            Tool::Eraser => {
                self.interaction = Interaction::Erasing;
                self.erase(point, now)
            }
            Tool::Text => self.text_click(point, now),
            _ => Outcome::NONE,
        }
    }

    fn pointer_move(&mut self, point: Point, now: u64) -> Outcome {
        match &mut self.interaction {
            Interaction::Idle => Outcome::NONE,
            Interaction::Dragging { id, offset } => {
                let (id, target) = (*id, point.minus(*offset));
                match self.document.move_element(id, target) {
                    Ok(()) => self.changed(now),
                    Err(_) => {
                        self.interaction = Interaction::Idle;
                        Outcome::NONE
                    }
                }
            }
            Interaction::Drawing { points } => {
                points.push(point);
                Outcome::REDRAW
            }
            Interaction::Shaping { current, .. } => {
                *current = point;
                Outcome::REDRAW
            }
            Interaction::Erasing => self.erase(point, now),
        }
    }

    fn pointer_up(&mut self, event: &PointerEvent, now: u64) -> Outcome {
        match std::mem::replace(&mut self.interaction, Interaction::Idle) {
            Interaction::Idle | Interaction::Erasing | Interaction::Dragging { .. } => {
                Outcome::NONE
            }
            Interaction::Drawing { points } => {
                if points.len() < 2 {
                    return Outcome::REDRAW;
                }
                let stroke = self.styled(FreehandStroke::polyline(
                    points,
                    self.style.stroke_color.clone(),
                    self.style.stroke_width,
                ));
                self.document.add_stroke(stroke);
                self.changed(now)
            }
            Interaction::Shaping { kind, start, .. } => {
                let stroke = self.styled(FreehandStroke::shape(
                    kind,
                    start,
                    event.point,
                    self.style.stroke_color.clone(),
                    self.style.stroke_width,
                ));
                self.document.add_stroke(stroke);
                self.changed(now)
            }
        }
    }

    fn double_click(&mut self, point: Point) -> Outcome {
        if !self.tool.allows_label_edit() {
            return Outcome::NONE;
        }
        let Some(element) = self.document.element_at(point) else {
            return Outcome::NONE;
        };
        tracing::debug!("Editing label of {}", element.id);
        self.label_edit = Some(LabelEdit {
            element: element.id,
            buffer: element.text.clone(),
        });
        self.interaction = Interaction::Idle;
        Outcome::REDRAW
    }

    fn select_at(&mut self, point: Point) -> Outcome {
        let hit = self
            .document
            .element_at(point)
            .map(|e| (e.id, point.offset_from(e.position)));
        match hit {
            Some((id, offset)) => match self.document.select_only(id) {
                Ok(()) => self.interaction = Interaction::Dragging { id, offset },
                Err(e) => tracing::warn!("Selection dropped: {e}"),
            },
            None => self.document.clear_selection(),
        }
        Outcome::REDRAW
    }

    fn connect_at(&mut self, point: Point, now: u64) -> Outcome {
        let hit = self.document.element_at(point).map(|e| e.id);
        match (self.connecting_from.take(), hit) {
            (None, Some(id)) => {
                tracing::debug!("Connection started from {id}");
                self.connecting_from = Some(id);
                Outcome::REDRAW
            }
            (None, None) => Outcome::NONE,
            (Some(from), Some(to)) if from != to => {
                self.document.add_connection(from, to, ConnectionType::Arrow);
                tracing::debug!("Connected {from} -> {to}");
                self.changed(now)
            }
            (Some(_), _) => {
                tracing::debug!("Pending connection cancelled");
                Outcome::REDRAW
            }
        }
    }

    fn erase(&mut self, point: Point, now: u64) -> Outcome {
        let removed = self.document.erase_at(point, self.style.stroke_width);
        if removed == 0 {
            return Outcome::NONE;
        }
        tracing::debug!("Erased {removed} stroke(s)");
        self.changed(now)
    }

    fn text_click(&mut self, point: Point, now: u64) -> Outcome {
        let mut changed = self.finish_text_edit();
        let existing = self.document.text_at(point).map(|t| (t.id, t.text.chars().count()));
        let (annotation, cursor) = match existing {
            Some(hit) => hit,
            None => {
                let id = self
                    .document
                    .add_text(TextAnnotation::new(point, self.style.stroke_color.clone()));
                changed = true;
                (id, 0)
            }
        };
        self.text_edit = Some(TextEdit { annotation, cursor });
        if changed {
            self.changed(now)
        } else {
            Outcome::REDRAW
        }
    }

    // -----------------------------------------------------------------------
    // Keyboard handling
    // -----------------------------------------------------------------------

    fn key_down(&mut self, key: &KeyEvent) -> Outcome {
        let now = key.timestamp_ms;
        if self.label_edit.is_some() {
            return self.label_key(key, now);
        }
        if self.text_edit.is_some() {
            return self.text_key(key, now);
        }
        if key.modifiers.command() {
            return self.shortcut(key);
        }
        if key.key == "Escape" && self.connecting_from.take().is_some() {
            tracing::debug!("Pending connection cancelled");
            return Outcome::REDRAW;
        }
        Outcome::NONE
    }

    fn shortcut(&mut self, key: &KeyEvent) -> Outcome {
        match key.key.as_str() {
            "z" | "Z" if key.modifiers.shift => self.redo(),
            "z" | "Z" => self.undo(),
            "y" | "Y" => self.redo(),
            "=" | "+" => self.set_zoom((self.zoom + ZOOM_STEP).min(MAX_ZOOM)),
            "-" => self.set_zoom(self.zoom.saturating_sub(ZOOM_STEP).max(MIN_ZOOM)),
            "0" => self.set_zoom(DEFAULT_ZOOM),
            _ => Outcome::NONE,
        }
    }

    fn set_zoom(&mut self, zoom: u32) -> Outcome {
        if zoom == self.zoom {
            return Outcome::NONE;
        }
        self.zoom = zoom;
        Outcome::REDRAW
    }

    fn label_key(&mut self, key: &KeyEvent, now: u64) -> Outcome {
        match key.key.as_str() {
            "Enter" => self.commit_label_edit(now),
            "Escape" => self.cancel_label_edit(),
            "Backspace" => {
                if let Some(edit) = self.label_edit.as_mut() {
                    edit.buffer.pop();
                }
                Outcome::REDRAW
            }
            _ => match (key.printable(), self.label_edit.as_mut()) {
                (Some(c), Some(edit)) => {
                    edit.buffer.push(c);
                    Outcome::REDRAW
                }
                _ => Outcome::NONE,
            },
        }
    }

    fn text_key(&mut self, key: &KeyEvent, now: u64) -> Outcome {
        let Some(TextEdit { annotation, cursor }) = self.text_edit else {
            return Outcome::NONE;
        };
        let Some(current) = self.document.text(annotation).map(|t| t.text.clone()) else {
            self.text_edit = None;
            return Outcome::REDRAW;
        };
        let len = current.chars().count();
        let cursor = cursor.min(len);

        let (text, cursor) = match key.key.as_str() {
            "Enter" if key.modifiers.shift => (insert_at(&current, cursor, '\n'), cursor + 1),
            "Enter" | "Escape" => {
                let changed = self.finish_text_edit();
                return if changed {
                    self.changed(now)
                } else {
                    Outcome::REDRAW
                };
            }
            "Backspace" if cursor > 0 => (remove_at(&current, cursor - 1), cursor - 1),
            "Delete" if cursor < len => (remove_at(&current, cursor), cursor),
            "ArrowLeft" => (current, cursor.saturating_sub(1)),
            "ArrowRight" => (current, (cursor + 1).min(len)),
            _ => match key.printable() {
                Some(c) => (insert_at(&current, cursor, c), cursor + 1),
                None => return Outcome::NONE,
            },
        };

        self.text_edit = Some(TextEdit { annotation, cursor });
        if self.document.text(annotation).is_some_and(|t| t.text == text) {
            return Outcome::REDRAW;
        }
        match self.document.update_text(annotation, text) {
            Ok(()) => self.changed(now),
            Err(_) => Outcome::NONE,
        }
    }

    /// Close the text editor, dropping the annotation if it is blank.
    ///
    /// Returns whether the document changed.
    fn finish_text_edit(&mut self) -> bool {
        let Some(edit) = self.text_edit.take() else {
            return false;
        };
        let blank = self
            .document
            .text(edit.annotation)
            .is_some_and(TextAnnotation::is_blank);
        blank && self.document.remove_text(edit.annotation).is_ok()
    }

    // -----------------------------------------------------------------------
    // Helpers
    // -----------------------------------------------------------------------

    fn changed(&mut self, now: u64) -> Outcome {
        self.autosave.note_change(now);
        Outcome::CHANGED
    }

    fn flush_pending(&mut self) {
        if self.autosave.is_pending() {
            self.autosave.cancel();
            if self.history.push_if_changed(self.document.snapshot()) {
                tracing::debug!("Recorded pending edit before history step");
            }
        }
    }

    fn restore(&mut self, snapshot: HistorySnapshot) {
        self.reset_transient();
        self.document.restore(snapshot);
        // Restoring is not an edit.
        self.autosave.cancel();
    }

    fn reset_transient(&mut self) {
        self.interaction = Interaction::Idle;
        self.connecting_from = None;
        self.label_edit = None;
        self.text_edit = None;
    }

    fn styled(&self, mut stroke: FreehandStroke) -> FreehandStroke {
        if self.style.opacity < 1.0 {
            stroke.opacity = Some(self.style.opacity);
        }
        if stroke.shape.is_none() {
            stroke.brush = Some(self.style.brush);
        }
        stroke
    }
}

fn byte_index(text: &str, char_index: usize) -> usize {
    text.char_indices()
        .nth(char_index)
        .map_or(text.len(), |(i, _)| i)
}

fn insert_at(text: &str, char_index: usize, c: char) -> String {
    let mut out = text.to_string();
    out.insert(byte_index(text, char_index), c);
    out
}

fn remove_at(text: &str, char_index: usize) -> String {
    let mut out = text.to_string();
    let at = byte_index(text, char_index);
    if at < out.len() {
        out.remove(at);
    }
    out
}
