//! Board elements: sticky notes, freehand strokes and text.

use crate::clock;
use crate::geometry;
use kurbo::{Point, Rect, Size, Vec2};
use serde::{Deserialize, Serialize};

/// Identifier of an element, unique within its board.
pub type ElementId = String;

/// Minimum sticky note width in world units.
pub const MIN_STICKY_WIDTH: f64 = 100.0;
/// Minimum sticky note height in world units.
pub const MIN_STICKY_HEIGHT: f64 = 80.0;

/// Allowed stroke width range.
pub const MIN_STROKE_WIDTH: f64 = 1.0;
pub const MAX_STROKE_WIDTH: f64 = 20.0;

/// Minimum number of scalar values in a persisted stroke (two points).
pub const MIN_STROKE_VALUES: usize = 4;

/// Clamp a proposed sticky note size to the minimum.
pub fn clamp_sticky_size(size: Size) -> Size {
    Size::new(
        size.width.max(MIN_STICKY_WIDTH),
        size.height.max(MIN_STICKY_HEIGHT),
    )
}

/// Whether a size satisfies the sticky note minimum.
pub fn is_valid_sticky_size(size: Size) -> bool {
    size.width >= MIN_STICKY_WIDTH && size.height >= MIN_STICKY_HEIGHT
}

/// Clamp a stroke width into the allowed range.
pub fn clamp_stroke_width(width: f64) -> f64 {
    if width.is_nan() {
        return MIN_STROKE_WIDTH;
    }
    width.clamp(MIN_STROKE_WIDTH, MAX_STROKE_WIDTH)
}

/// Whether a flat point sequence can be persisted as a stroke.
pub fn is_valid_stroke_points(points: &[f64]) -> bool {
    points.len() % 2 == 0 && points.len() >= MIN_STROKE_VALUES
}

/// Pen-family tool that produced a stroke.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DrawingTool {
    #[default]
    Pen,
    Line,
    Arrow,
    Rectangle,
    Ellipse,
}

/// A sticky note.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StickyNote {
    pub id: ElementId,
    pub content: String,
    /// Top-left corner in world space.
    pub position: Point,
    pub size: Size,
    pub color: String,
    pub z_index: i64,
}

impl StickyNote {
    /// Create a sticky note with a fresh id. The size is clamped to the minimum.
    pub fn new(position: Point, content: impl Into<String>, size: Size, color: impl Into<String>) -> Self {
        Self {
            id: clock::new_id(),
            content: content.into(),
            position,
            size: clamp_sticky_size(size),
            color: color.into(),
            z_index: clock::now_millis(),
        }
    }

    /// Bounding box in world coordinates.
    pub fn bounds(&self) -> Rect {
        Rect::from_origin_size(self.position, self.size)
    }
}

/// A persisted freehand stroke.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DrawingStroke {
    pub id: ElementId,
    pub tool: DrawingTool,
    /// World-space coordinates, flattened as `[x0, y0, x1, y1, ...]`.
    pub points: Vec<f64>,
    pub stroke_width: f64,
    pub stroke: String,
    pub z_index: i64,
}

impl DrawingStroke {
    /// Create a stroke with a fresh id.
    ///
    /// Returns `None` when `points` is odd-length or holds fewer than two points.
    pub fn new(tool: DrawingTool, points: Vec<f64>, stroke_width: f64, stroke: impl Into<String>) -> Option<Self> {
        if !is_valid_stroke_points(&points) {
            return None;
        }
        Some(Self {
            id: clock::new_id(),
            tool,
            points,
            stroke_width: clamp_stroke_width(stroke_width),
            stroke: stroke.into(),
            z_index: clock::now_millis(),
        })
    }

    /// Number of points in the stroke.
    pub fn len(&self) -> usize {
        geometry::point_count(&self.points)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Bounding box of the polyline, ignoring stroke width.
    pub fn bounds(&self) -> Rect {
        geometry::bounds(&self.points).unwrap_or(Rect::ZERO)
    }

    fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        let polyline = geometry::to_points(&self.points);
        geometry::point_to_polyline_dist(point, &polyline) <= tolerance + self.stroke_width / 2.0
    }
}

/// A free-standing text label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextElement {
    pub id: ElementId,
    pub content: String,
    pub position: Point,
    pub font_size: f64,
    pub font_family: String,
    pub fill: String,
    pub z_index: i64,
}

impl TextElement {
    /// Create a text element with a fresh id.
    pub fn new(
        position: Point,
        content: impl Into<String>,
        font_size: f64,
        font_family: impl Into<String>,
        fill: impl Into<String>,
    ) -> Self {
        Self {
            id: clock::new_id(),
            content: content.into(),
            position,
            font_size,
            font_family: font_family.into(),
            fill: fill.into(),
            z_index: clock::now_millis(),
        }
    }

    /// Approximate bounds; exact metrics belong to the renderer.
    pub fn bounds(&self) -> Rect {
        let widest = self
            .content
            .lines()
            .map(|line| line.chars().count())
            .max()
            .unwrap_or(0);
        let mut line_count = self.content.lines().count().max(1);
        if self.content.ends_with('\n') {
            line_count += 1;
        }
        let width = (widest as f64 * self.font_size * 0.55).max(20.0);
        let height = line_count as f64 * self.font_size * 1.2;
        Rect::from_origin_size(self.position, Size::new(width, height))
    }
}

/// Every kind of element a board can hold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Element {
    StickyNote(StickyNote),
    Drawing(DrawingStroke),
    Text(TextElement),
}

impl Element {
    pub fn id(&self) -> &str {
        match self {
            Element::StickyNote(e) => &e.id,
            Element::Drawing(e) => &e.id,
            Element::Text(e) => &e.id,
        }
    }

    /// The persisted `type` tag.
    pub fn type_name(&self) -> &'static str {
        match self {
            Element::StickyNote(_) => "sticky-note",
            Element::Drawing(_) => "drawing",
            Element::Text(_) => "text",
        }
    }

    pub fn z_index(&self) -> i64 {
        match self {
            Element::StickyNote(e) => e.z_index,
            Element::Drawing(e) => e.z_index,
            Element::Text(e) => e.z_index,
        }
    }

    /// Top-left anchor for positioned elements. Strokes have none.
    pub fn position(&self) -> Option<Point> {
        match self {
            Element::StickyNote(e) => Some(e.position),
            Element::Text(e) => Some(e.position),
            Element::Drawing(_) => None,
        }
    }

    /// Bounding box in world coordinates.
    pub fn bounds(&self) -> Rect {
        match self {
            Element::StickyNote(e) => e.bounds(),
            Element::Drawing(e) => e.bounds(),
            Element::Text(e) => e.bounds(),
        }
    }

    /// Check if a world-space point hits this element.
    pub fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        match self {
            Element::StickyNote(_) | Element::Text(_) => {
                self.bounds().inflate(tolerance, tolerance).contains(point)
            }
            Element::Drawing(e) => e.hit_test(point, tolerance),
        }
    }

    /// Move the element by a world-space delta.
    pub fn translate(&mut self, delta: Vec2) {
        match self {
            Element::StickyNote(e) => e.position += delta,
            Element::Text(e) => e.position += delta,
            Element::Drawing(e) => geometry::translate(&mut e.points, delta),
        }
    }

    /// Whether the element has resize handles.
    pub fn is_resizable(&self) -> bool {
        matches!(self, Element::StickyNote(_))
    }

    pub fn as_sticky_note(&self) -> Option<&StickyNote> {
        match self {
            Element::StickyNote(note) => Some(note),
            _ => None,
        }
    }

    pub fn as_drawing(&self) -> Option<&DrawingStroke> {
        match self {
            Element::Drawing(stroke) => Some(stroke),
            _ => None,
        }
    }

    /// Apply a partial update. Returns true if anything changed.
    ///
    /// Fields that do not exist on this variant are ignored, and values that
    /// would break an element invariant are clamped or dropped.
    pub fn apply_patch(&mut self, patch: &ElementPatch) -> bool {
        let before = self.clone();
        match self {
            Element::StickyNote(note) => {
                if let Some(content) = &patch.content {
                    note.content.clone_from(content);
                }
                if let Some(position) = patch.position {
                    note.position = position;
                }
                if let Some(size) = patch.size {
                    note.size = clamp_sticky_size(size);
                }
                if let Some(color) = &patch.color {
                    note.color.clone_from(color);
                }
            }
            Element::Drawing(stroke) => {
                if let Some(points) = &patch.points {
                    if is_valid_stroke_points(points) {
                        stroke.points.clone_from(points);
                    } else {
                        log::debug!("Ignoring malformed point patch for stroke {}", stroke.id);
                    }
                }
                if let Some(width) = patch.stroke_width {
                    stroke.stroke_width = clamp_stroke_width(width);
                }
                if let Some(color) = &patch.stroke {
                    stroke.stroke.clone_from(color);
                }
            }
            Element::Text(text) => {
                if let Some(content) = &patch.content {
                    text.content.clone_from(content);
                }
                if let Some(position) = patch.position {
                    text.position = position;
                }
                if let Some(font_size) = patch.font_size {
                    text.font_size = font_size;
                }
                if let Some(font_family) = &patch.font_family {
                    text.font_family.clone_from(font_family);
                }
                if let Some(fill) = &patch.fill {
                    text.fill.clone_from(fill);
                }
            }
        }
        if let Some(z_index) = patch.z_index {
            match self {
                Element::StickyNote(e) => e.z_index = z_index,
                Element::Drawing(e) => e.z_index = z_index,
                Element::Text(e) => e.z_index = z_index,
            }
        }
        *self != before
    }
}

/// Partial update of an element, keyed by id at the call site.
///
/// This is the only way elements are updated after creation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ElementPatch {
    pub content: Option<String>,
    pub position: Option<Point>,
    pub size: Option<Size>,
    pub color: Option<String>,
    pub points: Option<Vec<f64>>,
    pub stroke_width: Option<f64>,
    pub stroke: Option<String>,
    pub font_size: Option<f64>,
    pub font_family: Option<String>,
    pub fill: Option<String>,
    pub z_index: Option<i64>,
}

impl ElementPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    pub fn with_position(mut self, position: Point) -> Self {
        self.position = Some(position);
        self
    }

    pub fn with_size(mut self, size: Size) -> Self {
        self.size = Some(size);
        self
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    pub fn with_points(mut self, points: Vec<f64>) -> Self {
        self.points = Some(points);
        self
    }

    pub fn with_stroke_width(mut self, width: f64) -> Self {
        self.stroke_width = Some(width);
        self
    }

    pub fn with_z_index(mut self, z_index: i64) -> Self {
        self.z_index = Some(z_index);
        self
    }

    /// True when the patch carries no changes at all.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn note() -> StickyNote {
        StickyNote::new(Point::new(40.0, 40.0), "Kickoff", Size::new(200.0, 150.0), "#fef08a")
    }

    #[test]
    fn test_sticky_note_size_floor_at_creation() {
        let small = StickyNote::new(Point::ZERO, "", Size::new(10.0, 10.0), "#fff");
        assert_eq!(small.size, Size::new(MIN_STICKY_WIDTH, MIN_STICKY_HEIGHT));
    }

    #[test]
    fn test_stroke_requires_two_points() {
        assert!(DrawingStroke::new(DrawingTool::Pen, vec![1.0, 2.0], 2.0, "#000").is_none());
        assert!(DrawingStroke::new(DrawingTool::Pen, vec![1.0, 2.0, 3.0], 2.0, "#000").is_none());
        let stroke = DrawingStroke::new(DrawingTool::Pen, vec![0.0, 0.0, 5.0, 5.0], 50.0, "#000").unwrap();
        assert_eq!(stroke.len(), 2);
        assert!((stroke.stroke_width - MAX_STROKE_WIDTH).abs() < f64::EPSILON);
    }

    #[test]
    fn test_json_shape() {
        let element = Element::StickyNote(note());
        let value = serde_json::to_value(&element).unwrap();
        assert_eq!(value["type"], "sticky-note");
        assert_eq!(value["position"]["x"], 40.0);
        assert_eq!(value["size"]["width"], 200.0);
        assert!(value.get("zIndex").is_some());

        let stroke = DrawingStroke::new(DrawingTool::Pen, vec![0.0, 0.0, 1.0, 1.0], 3.0, "#111").unwrap();
        let value = serde_json::to_value(Element::Drawing(stroke)).unwrap();
        assert_eq!(value["type"], "drawing");
        assert_eq!(value["tool"], "pen");
        assert_eq!(value["strokeWidth"], 3.0);
    }

    #[test]
    fn test_parse_stored_text_element() {
        let json = r##"{
            "id": "1700000000000",
            "type": "text",
            "content": "Hello",
            "position": {"x": 1.5, "y": -2},
            "fontSize": 18,
            "fontFamily": "Arial",
            "fill": "#333",
            "zIndex": 3
        }"##;
        let element: Element = serde_json::from_str(json).unwrap();
        assert_eq!(element.id(), "1700000000000");
        assert_eq!(element.type_name(), "text");
        assert_eq!(element.position(), Some(Point::new(1.5, -2.0)));
        assert_eq!(element.z_index(), 3);
    }

    #[test]
    fn test_patch_ignores_foreign_fields() {
        let mut element = Element::StickyNote(note());
        let changed = element.apply_patch(&ElementPatch::new().with_stroke_width(5.0));
        assert!(!changed);
    }

    #[test]
    fn test_patch_clamps_sticky_size() {
        let mut element = Element::StickyNote(note());
        assert!(element.apply_patch(&ElementPatch::new().with_size(Size::new(20.0, 500.0))));
        let note = element.as_sticky_note().unwrap();
        assert_eq!(note.size, Size::new(MIN_STICKY_WIDTH, 500.0));
    }

    #[test]
    fn test_patch_rejects_malformed_points() {
        let stroke = DrawingStroke::new(DrawingTool::Pen, vec![0.0, 0.0, 1.0, 1.0], 3.0, "#111").unwrap();
        let mut element = Element::Drawing(stroke);
        assert!(!element.apply_patch(&ElementPatch::new().with_points(vec![1.0, 2.0, 3.0])));
        assert!(element.apply_patch(&ElementPatch::new().with_points(vec![1.0, 2.0, 3.0, 4.0])));
        assert_eq!(element.as_drawing().unwrap().points, vec![1.0, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn test_translate_stroke() {
        let stroke = DrawingStroke::new(DrawingTool::Pen, vec![0.0, 0.0, 10.0, 0.0], 2.0, "#000").unwrap();
        let mut element = Element::Drawing(stroke);
        element.translate(Vec2::new(5.0, 5.0));
        assert_eq!(element.bounds(), Rect::new(5.0, 5.0, 15.0, 5.0));
    }

    #[test]
    fn test_hit_test() {
        let element = Element::StickyNote(note());
        assert!(element.hit_test(Point::new(100.0, 100.0), 0.0));
        assert!(!element.hit_test(Point::new(300.0, 100.0), 0.0));

        let stroke = DrawingStroke::new(DrawingTool::Pen, vec![0.0, 0.0, 100.0, 0.0], 4.0, "#000").unwrap();
        let element = Element::Drawing(stroke);
        assert!(element.hit_test(Point::new(50.0, 3.0), 1.0));
        assert!(!element.hit_test(Point::new(50.0, 20.0), 1.0));
    }
}
