//! Corkboard Core Library
//!
//! Platform-agnostic canvas engine for the Corkboard whiteboard: boards of
//! sticky notes, freehand strokes and text on an infinite, pannable and
//! zoomable surface.

pub mod capture;
pub mod clock;
pub mod config;
pub mod geometry;
pub mod input;
pub mod model;
pub mod selection;
pub mod session;
pub mod storage;
pub mod tools;
pub mod viewport;

pub use capture::{CaptureState, PenSettings, StrokeCapture};
pub use config::{ConfigError, SessionConfig};
pub use input::PointerEvent;
pub use model::{Board, BoardError, BoardTemplate, DrawingStroke, Element, ElementId, ElementPatch, StickyNote, TextElement};
pub use selection::{Corner, Manipulation, ManipulationKind, NodeTransform, SelectionSet};
pub use session::Session;
pub use storage::{FlushReport, MemoryStorage, PendingWrite, Storage, StorageError, StorageResult};
pub use tools::ToolKind;
pub use viewport::Viewport;

#[cfg(not(target_arch = "wasm32"))]
pub use storage::FileStorage;
