//! Board documents.

use super::element::{Element, ElementId, ElementPatch};
use super::template::BoardTemplate;
use crate::clock;
use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from element mutations on a board.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BoardError {
    #[error("Element already exists: {0}")]
    DuplicateElement(ElementId),
    #[error("Element not found: {0}")]
    ElementNotFound(ElementId),
}

/// A board and the elements on it.
///
/// Render order is array order. Every structural mutation refreshes
/// `updated_at`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Board {
    id: String,
    name: String,
    elements: Vec<Element>,
    #[serde(default)]
    template: BoardTemplate,
    created_at: i64,
    updated_at: i64,
}

impl Board {
    /// Create an empty board with a fresh id and the default template.
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_id(clock::new_id(), name, BoardTemplate::default())
    }

    /// Create an empty board with an externally assigned id.
    pub fn with_id(id: impl Into<String>, name: impl Into<String>, template: BoardTemplate) -> Self {
        let now = clock::now_millis();
        Self {
            id: id.into(),
            name: name.into(),
            elements: Vec::new(),
            template,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn template(&self) -> &BoardTemplate {
        &self.template
    }

    pub fn created_at(&self) -> i64 {
        self.created_at
    }

    pub fn updated_at(&self) -> i64 {
        self.updated_at
    }

    /// Elements in render order (back to front).
    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    pub fn element(&self, id: &str) -> Option<&Element> {
        self.elements.iter().find(|e| e.id() == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index_of(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    fn index_of(&self, id: &str) -> Option<usize> {
        self.elements.iter().position(|e| e.id() == id)
    }

    fn touch(&mut self) {
        self.updated_at = clock::now_millis().max(self.updated_at);
    }

    /// Rename the board.
    pub fn rename(&mut self, name: impl Into<String>) {
        self.name = name.into();
        self.touch();
    }

    /// Replace the board's background template.
    pub fn set_template(&mut self, template: BoardTemplate) {
        self.template = template;
        self.touch();
    }

    /// Append an element on top of the others.
    pub fn add_element(&mut self, element: Element) -> Result<(), BoardError> {
        if self.contains(element.id()) {
            return Err(BoardError::DuplicateElement(element.id().to_string()));
        }
        self.elements.push(element);
        self.touch();
        Ok(())
    }

    /// Apply a partial update to one element. Returns whether it changed.
    pub fn update_element(&mut self, id: &str, patch: &ElementPatch) -> Result<bool, BoardError> {
        let index = self
            .index_of(id)
            .ok_or_else(|| BoardError::ElementNotFound(id.to_string()))?;
        let changed = self.elements[index].apply_patch(patch);
        if changed {
            self.touch();
        }
        Ok(changed)
    }

    /// Remove an element.
    pub fn remove_element(&mut self, id: &str) -> Option<Element> {
        let index = self.index_of(id)?;
        let removed = self.elements.remove(index);
        self.touch();
        Some(removed)
    }

    /// Move an element to the end of the render order.
    /// Returns true if the order changed.
    pub fn bring_to_front(&mut self, id: &str) -> bool {
        match self.index_of(id) {
            Some(index) if index + 1 < self.elements.len() => {
                let element = self.elements.remove(index);
                self.elements.push(element);
                self.touch();
                true
            }
            _ => false,
        }
    }

    /// Move an element to the start of the render order.
    /// Returns true if the order changed.
    pub fn send_to_back(&mut self, id: &str) -> bool {
        match self.index_of(id) {
            Some(index) if index > 0 => {
                let element = self.elements.remove(index);
                self.elements.insert(0, element);
                self.touch();
                true
            }
            _ => false,
        }
    }

    /// Re-sort elements by `z_index`, keeping array order among equal values.
    pub fn sort_by_z_index(&mut self) {
        self.elements.sort_by_key(Element::z_index);
        self.touch();
    }

    /// Front-most element under a world-space point.
    pub fn element_at(&self, point: Point, tolerance: f64) -> Option<&Element> {
        self.elements
            .iter()
            .rev()
            .find(|e| e.hit_test(point, tolerance))
    }

    /// Bounding box of all elements.
    pub fn bounds(&self) -> Option<Rect> {
        self.elements
            .iter()
            .map(Element::bounds)
            .reduce(|acc, b| acc.union(b))
    }

    /// Serialize the board to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserialize a board from JSON.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
