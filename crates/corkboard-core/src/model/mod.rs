//! Boards and the elements placed on them.

mod board;
mod element;
mod template;

pub use board::{Board, BoardError};
pub use element::{
    DrawingStroke, DrawingTool, Element, ElementId, ElementPatch, StickyNote, TextElement,
    MAX_STROKE_WIDTH, MIN_STICKY_HEIGHT, MIN_STICKY_WIDTH, MIN_STROKE_VALUES, MIN_STROKE_WIDTH,
    clamp_sticky_size, clamp_stroke_width, is_valid_sticky_size, is_valid_stroke_points,
};
pub use template::{
    Background, BackgroundKind, BoardTemplate, DEFAULT_GRID_SIZE, builtin_templates,
    default_template, template_by_id,
};
