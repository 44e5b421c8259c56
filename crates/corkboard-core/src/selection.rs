//! Selection set, resize handles and direct manipulation.

use crate::model::{
    Element, ElementId, ElementPatch, MIN_STICKY_HEIGHT, MIN_STICKY_WIDTH, clamp_sticky_size,
    is_valid_sticky_size,
};
use kurbo::{Point, Rect, Size, Vec2};
use serde::{Deserialize, Serialize};

/// Handle size in screen pixels.
pub const HANDLE_SIZE: f64 = 8.0;
/// Handle hit tolerance in screen pixels.
pub const HANDLE_HIT_TOLERANCE: f64 = 10.0;

/// Ordered set of selected element ids.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionSet {
    ids: Vec<ElementId>,
}

impl SelectionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Selected ids in the order they were selected.
    pub fn ids(&self) -> &[ElementId] {
        &self.ids
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.iter().any(|s| s == id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Add an id. Returns false if it was already selected.
    pub fn insert(&mut self, id: &str) -> bool {
        if self.contains(id) {
            return false;
        }
        self.ids.push(id.to_string());
        true
    }

    /// Remove an id. Returns true if it was selected.
    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.ids.len();
        self.ids.retain(|s| s != id);
        self.ids.len() != before
    }

    /// Flip membership of an id. Returns true if it is selected afterwards.
    pub fn toggle(&mut self, id: &str) -> bool {
        if self.remove(id) {
            false
        } else {
            self.ids.push(id.to_string());
            true
        }
    }

    /// Clear the selection. Returns true if anything was selected.
    pub fn clear(&mut self) -> bool {
        let had_any = !self.ids.is_empty();
        self.ids.clear();
        had_any
    }

    /// Keep only ids accepted by `keep`.
    pub fn retain(&mut self, mut keep: impl FnMut(&str) -> bool) {
        self.ids.retain(|id| keep(id));
    }
}

/// Corner positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Corner {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

impl Corner {
    pub const ALL: [Corner; 4] = [Corner::TopLeft, Corner::TopRight, Corner::BottomLeft, Corner::BottomRight];

    /// Location of this corner on a rectangle.
    pub fn point_on(self, bounds: Rect) -> Point {
        match self {
            Corner::TopLeft => Point::new(bounds.x0, bounds.y0),
            Corner::TopRight => Point::new(bounds.x1, bounds.y0),
            Corner::BottomLeft => Point::new(bounds.x0, bounds.y1),
            Corner::BottomRight => Point::new(bounds.x1, bounds.y1),
        }
    }
}

/// A resize handle with its world position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Handle {
    pub position: Point,
    pub corner: Corner,
}

impl Handle {
    /// Check if a world point hits this handle.
    /// `tolerance` should already be divided by the viewport scale.
    pub fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        self.position.distance_squared(point) <= tolerance * tolerance
    }
}

/// Corner handles of an element. Only resizable elements have any;
/// rotation is never offered.
pub fn handles_for(element: &Element) -> Vec<Handle> {
    if !element.is_resizable() {
        return Vec::new();
    }
    let bounds = element.bounds();
    Corner::ALL
        .iter()
        .map(|&corner| Handle {
            position: corner.point_on(bounds),
            corner,
        })
        .collect()
}

/// Find which corner handle (if any) is hit at the given world point.
pub fn hit_test_handles(element: &Element, point: Point, tolerance: f64) -> Option<Corner> {
    handles_for(element)
        .into_iter()
        .find(|h| h.hit_test(point, tolerance))
        .map(|h| h.corner)
}

/// Box produced by dragging `corner` of `bounds` by `delta`.
///
/// The opposite corner stays fixed; a box dragged past its anchor is
/// normalized rather than inverted.
pub fn resize_box(bounds: Rect, corner: Corner, delta: Vec2) -> Rect {
    let (x0, y0, x1, y1) = match corner {
        Corner::TopLeft => (bounds.x0 + delta.x, bounds.y0 + delta.y, bounds.x1, bounds.y1),
        Corner::TopRight => (bounds.x0, bounds.y0 + delta.y, bounds.x1 + delta.x, bounds.y1),
        Corner::BottomLeft => (bounds.x0 + delta.x, bounds.y0, bounds.x1, bounds.y1 + delta.y),
        Corner::BottomRight => (bounds.x0, bounds.y0, bounds.x1 + delta.x, bounds.y1 + delta.y),
    };
    Rect::new(x0, y0, x1, y1).abs()
}

/// Accept a proposed sticky note box only if it respects the minimum size;
/// otherwise keep the previous box.
pub fn constrain_sticky_box(previous: Rect, proposed: Rect) -> Rect {
    if is_valid_sticky_size(proposed.size()) {
        proposed
    } else {
        previous
    }
}

/// What a manipulation gesture does to its element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManipulationKind {
    /// Drag the whole element.
    Move,
    /// Drag one corner handle.
    Resize(Corner),
}

/// State of an active drag or resize on a single element.
///
/// The model is untouched while the gesture runs; [`Manipulation::preview`]
/// holds the live state for rendering and [`Manipulation::patch`] yields the
/// single update to commit when the gesture ends.
#[derive(Debug, Clone)]
pub struct Manipulation {
    kind: ManipulationKind,
    start_point: Point,
    current_point: Point,
    original: Element,
    preview: Element,
    /// Sticky: set once the pointer leaves the start point.
    moved: bool,
}

impl Manipulation {
    /// Begin dragging an element from a world point.
    pub fn start_move(original: Element, start_point: Point) -> Self {
        Self {
            kind: ManipulationKind::Move,
            start_point,
            current_point: start_point,
            preview: original.clone(),
            original,
            moved: false,
        }
    }

    /// Begin resizing an element from one of its corners.
    /// Returns `None` for elements without resize handles.
    pub fn start_resize(original: Element, corner: Corner, start_point: Point) -> Option<Self> {
        if !original.is_resizable() {
            return None;
        }
        Some(Self {
            kind: ManipulationKind::Resize(corner),
            start_point,
            current_point: start_point,
            preview: original.clone(),
            original,
            moved: false,
        })
    }

    pub fn kind(&self) -> ManipulationKind {
        self.kind
    }

    pub fn element_id(&self) -> &str {
        self.original.id()
    }

    /// The element as it was when the gesture started.
    pub fn original(&self) -> &Element {
        &self.original
    }

    /// Live state of the element for rendering.
    pub fn preview(&self) -> &Element {
        &self.preview
    }

    /// Get the drag delta in world units.
    pub fn delta(&self) -> Vec2 {
        self.current_point - self.start_point
    }

    /// Whether the pointer has left the start point at any time during
    /// the gesture, even if it has since returned.
    pub fn has_moved(&self) -> bool {
        self.moved
    }

    /// Feed the current world-space pointer position.
    pub fn update(&mut self, point: Point) {
        self.current_point = point;
        self.moved |= point != self.start_point;
        let delta = self.delta();
        match self.kind {
            ManipulationKind::Move => {
                let mut moved = self.original.clone();
                moved.translate(delta);
                self.preview = moved;
            }
            ManipulationKind::Resize(corner) => {
                let Element::StickyNote(note) = &mut self.preview else {
                    return;
                };
                let proposed = resize_box(self.original.bounds(), corner, delta);
                let accepted = constrain_sticky_box(note.bounds(), proposed);
                note.position = accepted.origin();
                note.size = accepted.size();
            }
        }
    }

    /// Update to commit, or `None` when the gesture changed nothing.
    pub fn patch(&self) -> Option<ElementPatch> {
        let patch = diff_patch(&self.original, &self.preview);
        (!patch.is_empty()).then_some(patch)
    }
}

/// Geometry fields that differ between two states of the same element.
fn diff_patch(before: &Element, after: &Element) -> ElementPatch {
    let mut patch = ElementPatch::new();
    match (before, after) {
        (Element::StickyNote(a), Element::StickyNote(b)) => {
            if a.position != b.position {
                patch.position = Some(b.position);
            }
            if a.size != b.size {
                patch.size = Some(b.size);
            }
        }
        (Element::Text(a), Element::Text(b)) => {
            if a.position != b.position {
                patch.position = Some(b.position);
            }
            if a.font_size != b.font_size {
                patch.font_size = Some(b.font_size);
            }
        }
        (Element::Drawing(a), Element::Drawing(b)) => {
            if a.points != b.points {
                patch.points = Some(b.points.clone());
            }
        }
        _ => {}
    }
    patch
}

/// Transform reported by a rendering node at the end of a native transform.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NodeTransform {
    /// Node origin in world coordinates.
    pub position: Point,
    pub scale_x: f64,
    pub scale_y: f64,
}

impl NodeTransform {
    /// Unscaled node at `position`.
    pub fn at(position: Point) -> Self {
        Self {
            position,
            scale_x: 1.0,
            scale_y: 1.0,
        }
    }

    pub fn is_identity_scale(&self) -> bool {
        self.scale_x == 1.0 && self.scale_y == 1.0
    }
}

/// Fold a node's scale into the element's own geometry.
///
/// Returns the update to commit and the node transform to apply afterwards,
/// whose scale is reset to 1 so later transforms do not compound.
pub fn bake_transform(element: &Element, node: NodeTransform) -> (ElementPatch, NodeTransform) {
    let scale_x = sanitize_scale(node.scale_x);
    let scale_y = sanitize_scale(node.scale_y);
    let mut baked = element.clone();
    let reset = match &mut baked {
        Element::StickyNote(note) => {
            let scaled = Size::new(note.size.width * scale_x, note.size.height * scale_y);
            note.position = node.position;
            note.size = clamp_sticky_size(scaled);
            NodeTransform::at(node.position)
        }
        Element::Text(text) => {
            text.position = node.position;
            text.font_size *= scale_y;
            NodeTransform::at(node.position)
        }
        Element::Drawing(stroke) => {
            for pair in stroke.points.chunks_exact_mut(2) {
                pair[0] = pair[0] * scale_x + node.position.x;
                pair[1] = pair[1] * scale_y + node.position.y;
            }
            NodeTransform::at(Point::ZERO)
        }
    };
    (diff_patch(element, &baked), reset)
}

fn sanitize_scale(scale: f64) -> f64 {
    if scale.is_finite() && scale > 0.0 { scale } else { 1.0 }
}

/// The sticky note floor as a size.
pub fn min_sticky_size() -> Size {
    Size::new(MIN_STICKY_WIDTH, MIN_STICKY_HEIGHT)
}
