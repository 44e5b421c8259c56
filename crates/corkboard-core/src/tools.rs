//! Editing tools.

use serde::{Deserialize, Serialize};

/// Available tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum ToolKind {
    #[default]
    Select,
    Pan,
    StickyNote,
    Pen,
}

impl ToolKind {
    /// All tools in toolbar order.
    pub const ALL: [ToolKind; 4] = [ToolKind::Select, ToolKind::Pan, ToolKind::StickyNote, ToolKind::Pen];

    /// Whether this tool captures freehand strokes.
    pub fn is_drawing(self) -> bool {
        matches!(self, ToolKind::Pen)
    }

    /// Whether every press on the canvas pans, even over elements.
    pub fn always_pans(self) -> bool {
        matches!(self, ToolKind::Pan)
    }

    /// Toolbar label.
    pub fn label(self) -> &'static str {
        match self {
            ToolKind::Select => "Select",
            ToolKind::Pan => "Pan",
            ToolKind::StickyNote => "Sticky Note",
            ToolKind::Pen => "Pen",
        }
    }
}
