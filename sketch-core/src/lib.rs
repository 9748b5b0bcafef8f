//! # System Sketch Core
//!
//! Element model and interaction logic for a system-design whiteboard.
//! Pure logic with no rendering or I/O, so it compiles to native and WASM.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │                sketch-core                  │
//! ├─────────────────────────────────────────────┤
//! │  Document         │  Controller             │
//! │  - Elements       │  - Tool dispatch        │
//! │  - Connections    │  - Connector / drag     │
//! │  - Strokes, text  │  - Label & text editing │
//! ├─────────────────────────────────────────────┤
//! │  History          │  Generated diagrams     │
//! │  - Undo/redo      │  - Response parsing     │
//! │  - Debounced save │  - Fallback diagram     │
//! └─────────────────────────────────────────────┘
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod ai;
pub mod connection;
pub mod controller;
pub mod document;
pub mod element;
pub mod error;
pub mod event;
pub mod geometry;
pub mod history;
pub mod stroke;
pub mod text;
pub mod tool;

pub use ai::{
    generate_or_fallback, AiConnection, AiElement, AiResponse, DiagramGenerator, GenerateError,
    Generation, LabelResolution, ParseError,
};
pub use connection::{Connection, ConnectionType};
pub use controller::{LabelEdit, Outcome, SketchController, TextEdit};
pub use document::{CanvasDocument, Diagram, DiagramMetadata};
pub use element::{ElementId, ElementType, SystemElement};
pub use error::{SketchError, SketchResult};
pub use event::{InputEvent, KeyEvent, KeyModifiers, PointerEvent};
pub use geometry::{Point, Rect, Size};
pub use history::{AutoSave, HistoryBuffer, HistoryConfig, HistorySnapshot};
pub use stroke::{BrushType, FreehandStroke, ShapeKind};
pub use text::TextAnnotation;
pub use tool::{Tool, ToolStyle};

/// Sketch core version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
