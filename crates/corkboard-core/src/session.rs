//! Editing session state.
//!
//! [`Session`] is the one place that owns the boards, the current board id,
//! the selection, the active tool, the viewport and the pen. Hosts feed it
//! [`PointerEvent`]s and UI actions, render from its read accessors, and
//! drain [`Session::take_pending_writes`] into a [`Storage`] backend.

use crate::capture::{PenSettings, StrokeCapture};
use crate::clock;
use crate::config::SessionConfig;
use crate::input::PointerEvent;
use crate::model::{Board, BoardTemplate, Element, ElementId, ElementPatch, StickyNote, TextElement};
use crate::selection::{
    HANDLE_HIT_TOLERANCE, Manipulation, ManipulationKind, NodeTransform, SelectionSet, bake_transform,
    hit_test_handles,
};
use crate::storage::{Outbox, PendingWrite, Storage};
use crate::tools::ToolKind;
use crate::viewport::Viewport;
use kurbo::{Point, Size, Vec2};
use std::collections::HashSet;

/// Picking tolerance in screen pixels.
pub const PICK_TOLERANCE: f64 = 4.0;
/// Screen padding used by [`Session::fit_to_content`].
pub const FIT_PADDING: f64 = 50.0;

/// Pointer gesture in progress for the non-drawing tools.
#[derive(Debug, Clone, Default)]
enum Gesture {
    #[default]
    Idle,
    /// Background drag. Becomes a click if released without moving.
    Pan {
        start_screen: Point,
        start_translation: Vec2,
        target: Option<ElementId>,
        moved: bool,
    },
    /// Element drag or resize.
    Manipulate(Manipulation),
}

/// The editing session.
#[derive(Debug)]
pub struct Session {
    config: SessionConfig,
    boards: Vec<Board>,
    current_board_id: Option<String>,
    selection: SelectionSet,
    tool: ToolKind,
    viewport: Viewport,
    pen: PenSettings,
    capture: StrokeCapture,
    gesture: Gesture,
    outbox: Outbox,
    /// Ids of elements deleted during this session. Never handed out again.
    retired: HashSet<ElementId>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new(SessionConfig::default())
    }
}

impl Session {
    /// Create an empty session.
    pub fn new(config: SessionConfig) -> Self {
        Self {
            pen: config.pen.clone(),
            config,
            boards: Vec::new(),
            current_board_id: None,
            selection: SelectionSet::new(),
            tool: ToolKind::default(),
            viewport: Viewport::new(),
            capture: StrokeCapture::new(),
            gesture: Gesture::Idle,
            outbox: Outbox::new(),
            retired: HashSet::new(),
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    // --- Read access ---

    pub fn boards(&self) -> &[Board] {
        &self.boards
    }

    pub fn board(&self, id: &str) -> Option<&Board> {
        self.boards.iter().find(|b| b.id() == id)
    }

    pub fn current_board_id(&self) -> Option<&str> {
        self.current_board_id.as_deref()
    }

    pub fn current_board(&self) -> Option<&Board> {
        self.board(self.current_board_id.as_deref()?)
    }

    /// Selected element ids, in selection order.
    pub fn selected_elements(&self) -> &[ElementId] {
        self.selection.ids()
    }

    pub fn current_tool(&self) -> ToolKind {
        self.tool
    }

    /// Current viewport scale.
    pub fn zoom_level(&self) -> f64 {
        self.viewport.scale()
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn pen(&self) -> &PenSettings {
        &self.pen
    }

    pub fn is_capturing(&self) -> bool {
        self.capture.is_capturing()
    }

    /// Raw points of the stroke being drawn.
    pub fn stroke_preview(&self) -> Option<&[f64]> {
        self.capture.preview()
    }

    /// Drag or resize in progress.
    pub fn manipulation(&self) -> Option<&Manipulation> {
        match &self.gesture {
            Gesture::Manipulate(m) => Some(m),
            _ => None,
        }
    }

    /// Elements of the current board in render order, with the live state of
    /// an element being dragged or resized in place of its stored state.
    pub fn display_elements(&self) -> Vec<&Element> {
        let Some(board) = self.current_board() else {
            return Vec::new();
        };
        let preview = self.manipulation().map(Manipulation::preview);
        board
            .elements()
            .iter()
            .map(|e| match preview {
                Some(p) if p.id() == e.id() => p,
                _ => e,
            })
            .collect()
    }

    pub fn pending_writes(&self) -> &[PendingWrite] {
        self.outbox.pending()
    }

    /// Drain queued writes for [`storage::dispatch`](crate::storage::dispatch).
    pub fn take_pending_writes(&mut self) -> Vec<PendingWrite> {
        self.outbox.drain()
    }

    // --- Boards ---

    /// Replace the in-memory boards with everything in `storage`.
    ///
    /// Boards are ordered by creation time since storage order is not
    /// guaranteed. On error the session is left as it was. Returns the
    /// number of boards loaded.
    pub async fn load<S: Storage + ?Sized>(&mut self, storage: &S) -> usize {
        let mut boards = match storage.get_all_boards().await {
            Ok(boards) => boards,
            Err(e) => {
                log::error!("Failed to load boards: {}", e);
                return 0;
            }
        };
        boards.sort_by(|a, b| {
            a.created_at()
                .cmp(&b.created_at())
                .then_with(|| a.id().cmp(b.id()))
        });

        self.abort_gestures();
        self.selection.clear();
        self.boards = boards;
        let keep_current = self
            .current_board_id
            .as_deref()
            .is_some_and(|id| self.boards.iter().any(|b| b.id() == id));
        if !keep_current {
            self.current_board_id = self.boards.first().map(|b| b.id().to_string());
        }
        log::info!("Loaded {} board(s)", self.boards.len());
        self.boards.len()
    }

    /// Create a board with a fresh id and make it current.
    pub fn create_board(&mut self, name: impl Into<String>) -> String {
        let board = Board::with_id(clock::new_id(), name, self.config.template());
        let id = board.id().to_string();
        self.insert_board(board);
        id
    }

    /// Create a board with an externally assigned id and make it current.
    /// Returns `None` if the id is taken.
    pub fn create_board_with(
        &mut self,
        id: impl Into<String>,
        name: impl Into<String>,
        template: BoardTemplate,
    ) -> Option<String> {
        let id = id.into();
        if self.board(&id).is_some() {
            log::warn!("Board {} already exists", id);
            return None;
        }
        self.insert_board(Board::with_id(id.clone(), name, template));
        Some(id)
    }

    fn insert_board(&mut self, board: Board) {
        log::info!("Created board {} ({})", board.name(), board.id());
        let id = board.id().to_string();
        self.outbox.save(&board);
        self.boards.push(board);
        self.set_current_board(&id);
    }

    /// Rename a board. Blank names are ignored.
    pub fn rename_board(&mut self, id: &str, name: &str) -> bool {
        let name = name.trim();
        if name.is_empty() {
            return false;
        }
        self.edit_board(id, |board| {
            board.rename(name);
            Some(())
        })
        .is_some()
    }

    /// Replace a board's background template.
    pub fn set_board_template(&mut self, id: &str, template: BoardTemplate) -> bool {
        self.edit_board(id, |board| {
            board.set_template(template);
            Some(())
        })
        .is_some()
    }

    /// Delete a board. If it was current, the first remaining board takes over.
    pub fn delete_board(&mut self, id: &str) -> bool {
        let Some(index) = self.boards.iter().position(|b| b.id() == id) else {
            return false;
        };
        let removed = self.boards.remove(index);
        self.outbox.delete(removed.id());
        self.retired
            .extend(removed.elements().iter().map(|e| e.id().to_string()));
        log::info!("Deleted board {} ({})", removed.name(), removed.id());

        if self.current_board_id.as_deref() == Some(id) {
            self.abort_gestures();
            self.selection.clear();
            self.current_board_id = self.boards.first().map(|b| b.id().to_string());
        }
        true
    }

    /// Switch the current board. In-flight gestures are abandoned and the
    /// selection is cleared.
    pub fn set_current_board(&mut self, id: &str) -> bool {
        if self.board(id).is_none() {
            return false;
        }
        if self.current_board_id.as_deref() != Some(id) {
            self.abort_gestures();
            self.selection.clear();
            self.current_board_id = Some(id.to_string());
        }
        true
    }

    fn edit_board<T>(&mut self, board_id: &str, edit: impl FnOnce(&mut Board) -> Option<T>) -> Option<T> {
        let board = self.boards.iter_mut().find(|b| b.id() == board_id)?;
        let result = edit(&mut *board)?;
        self.outbox.save(board);
        Some(result)
    }

    fn edit_current_board<T>(&mut self, edit: impl FnOnce(&mut Board) -> Option<T>) -> Option<T> {
        let id = self.current_board_id.clone()?;
        self.edit_board(&id, edit)
    }

    // --- Elements ---

    /// Add an element to the current board.
    ///
    /// Rejects ids already on the board and ids deleted earlier in the session.
    pub fn add_element(&mut self, element: Element) -> Option<ElementId> {
        let id = element.id().to_string();
        if self.retired.contains(&id) {
            log::warn!("Element id {} was deleted and cannot be reused", id);
            return None;
        }
        self.edit_current_board(|board| match board.add_element(element) {
            Ok(()) => Some(()),
            Err(e) => {
                log::warn!("{}", e);
                None
            }
        })?;
        Some(id)
    }

    /// Place a sticky note with the configured color and size.
    pub fn add_sticky_note(&mut self, position: Point, content: impl Into<String>) -> Option<ElementId> {
        let note = StickyNote::new(position, content, self.config.sticky_size, self.config.sticky_color.clone());
        self.add_element(Element::StickyNote(note))
    }

    /// Place a text element with the configured font.
    pub fn add_text(&mut self, position: Point, content: impl Into<String>) -> Option<ElementId> {
        let text = TextElement::new(
            position,
            content,
            self.config.text_font_size,
            self.config.text_font_family.clone(),
            self.config.text_fill.clone(),
        );
        self.add_element(Element::Text(text))
    }

    /// Apply a partial update to an element on the current board.
    /// Returns true if the element changed.
    pub fn update_element(&mut self, id: &str, patch: &ElementPatch) -> bool {
        self.edit_current_board(|board| match board.update_element(id, patch) {
            Ok(changed) => changed.then_some(()),
            Err(e) => {
                log::debug!("{}", e);
                None
            }
        })
        .is_some()
    }

    /// Delete an element from the current board.
    pub fn delete_element(&mut self, id: &str) -> bool {
        let removed = self.edit_current_board(|board| board.remove_element(id)).is_some();
        if removed {
            self.retired.insert(id.to_string());
        }
        self.forget_element(id);
        removed
    }

    /// Delete every selected element. Returns how many were removed.
    pub fn delete_selected(&mut self) -> usize {
        let ids = self.selection.ids().to_vec();
        let removed = self
            .edit_current_board(|board| {
                let mut gone = Vec::new();
                for id in &ids {
                    if board.remove_element(id).is_some() {
                        gone.push(id.clone());
                    }
                }
                (!gone.is_empty()).then_some(gone)
            })
            .unwrap_or_default();
        let count = removed.len();
        self.retired.extend(removed);
        for id in &ids {
            self.forget_element(id);
        }
        count
    }

    fn forget_element(&mut self, id: &str) {
        self.selection.remove(id);
        if self.manipulation().is_some_and(|m| m.element_id() == id) {
            self.gesture = Gesture::Idle;
        }
    }

    pub fn bring_to_front(&mut self, id: &str) -> bool {
        self.edit_current_board(|board| board.bring_to_front(id).then_some(()))
            .is_some()
    }

    pub fn send_to_back(&mut self, id: &str) -> bool {
        self.edit_current_board(|board| board.send_to_back(id).then_some(()))
            .is_some()
    }

    /// Re-sort the current board's elements by `z_index`.
    pub fn sort_by_z_index(&mut self) -> bool {
        self.edit_current_board(|board| {
            board.sort_by_z_index();
            Some(())
        })
        .is_some()
    }

    /// Commit a transform performed by the host's own transform node.
    ///
    /// The node's scale is baked into the element. Returns the transform the
    /// node should be reset to, or `None` for an unknown element.
    pub fn finish_transform(&mut self, id: &str, node: NodeTransform) -> Option<NodeTransform> {
        let element = self.current_board()?.element(id)?.clone();
        let (patch, reset) = bake_transform(&element, node);
        if !patch.is_empty() {
            self.update_element(id, &patch);
        }
        Some(reset)
    }

    // --- Selection ---

    /// Toggle an element in or out of the selection.
    /// Returns true if it is selected afterwards.
    pub fn toggle_selection(&mut self, id: &str) -> bool {
        if self.current_board().is_some_and(|b| b.contains(id)) {
            self.selection.toggle(id)
        } else {
            false
        }
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    // --- Tools and pen ---

    /// Switch tools. Clears the selection and abandons any gesture.
    pub fn set_tool(&mut self, tool: ToolKind) {
        if tool == self.tool {
            return;
        }
        self.abort_gestures();
        self.selection.clear();
        log::debug!("Tool changed: {:?} -> {:?}", self.tool, tool);
        self.tool = tool;
    }

    pub fn set_pen_color(&mut self, color: impl Into<String>) {
        self.pen.color = color.into();
    }

    /// Set the pen width, clamped to 1..=20.
    pub fn set_pen_width(&mut self, width: f64) {
        self.pen.set_width(width);
    }

    /// Set the smoothing window; values below 1 mean no smoothing.
    pub fn set_smoothing_window(&mut self, window: usize) {
        self.pen.smoothing_window = window.max(1);
    }

    pub fn set_simplify(&mut self, enabled: bool) {
        self.pen.simplify = enabled;
    }

    pub fn set_simplify_tolerance(&mut self, tolerance: f64) {
        self.pen.simplify_tolerance = if tolerance.is_nan() { 0.0 } else { tolerance.max(0.0) };
    }

    // --- Viewport ---

    pub fn set_viewport_size(&mut self, size: Size) {
        self.viewport.set_size(size);
    }

    /// Set the zoom level around the viewport center. Clamped, never rejected.
    pub fn set_zoom(&mut self, level: f64) {
        self.viewport.set_scale(level);
    }

    pub fn zoom_in(&mut self) {
        self.viewport.zoom_in(self.config.zoom_step);
    }

    pub fn zoom_out(&mut self) {
        self.viewport.zoom_out(self.config.zoom_step);
    }

    pub fn reset_zoom(&mut self) {
        self.viewport.reset();
    }

    pub fn pan_by(&mut self, delta: Vec2) {
        self.viewport.pan_by(delta);
    }

    /// Fit the viewport to the current board's elements.
    /// Returns false when there is nothing to fit.
    pub fn fit_to_content(&mut self) -> bool {
        let Some(bounds) = self.current_board().and_then(Board::bounds) else {
            return false;
        };
        self.viewport.fit_to_bounds(bounds, FIT_PADDING);
        true
    }

    // --- Pointer input ---

    /// Route a pointer event according to the active tool.
    pub fn handle_pointer(&mut self, event: PointerEvent) {
        match event {
            PointerEvent::Down { position, target } => self.pointer_down(position, target),
            PointerEvent::Move { position } => self.pointer_move(position),
            PointerEvent::Up { position } => self.pointer_up(position),
            PointerEvent::Wheel { position, delta_y } => self.wheel(position, delta_y),
        }
    }

    fn pointer_down(&mut self, screen: Point, target: Option<ElementId>) {
        let world = self.viewport.screen_to_world(screen);
        self.gesture = Gesture::Idle;

        if self.tool.is_drawing() {
            if let Some(board_id) = self.current_board_id.clone() {
                self.capture.begin(board_id, world);
            }
            return;
        }

        if !self.tool.always_pans() {
            if let Some(resize) = self.resize_at(world) {
                self.gesture = Gesture::Manipulate(resize);
                return;
            }
        }

        let target = self.pick(world, target);
        if !self.tool.always_pans() {
            let drag = target
                .as_deref()
                .and_then(|id| self.current_board()?.element(id))
                .map(|element| Manipulation::start_move(element.clone(), world));
            if let Some(drag) = drag {
                self.gesture = Gesture::Manipulate(drag);
                return;
            }
        }

        self.gesture = Gesture::Pan {
            start_screen: screen,
            start_translation: self.viewport.translation(),
            target,
            moved: false,
        };
    }

    fn pointer_move(&mut self, screen: Point) {
        let world = self.viewport.screen_to_world(screen);
        if self.capture.is_capturing() {
            self.capture.extend(world);
            return;
        }
        match &mut self.gesture {
            Gesture::Idle => {}
            Gesture::Pan {
                start_screen,
                start_translation,
                moved,
                ..
            } => {
                let delta = screen - *start_screen;
                *moved |= delta != Vec2::ZERO;
                self.viewport.pan_to(*start_translation + delta);
            }
            Gesture::Manipulate(manipulation) => manipulation.update(world),
        }
    }

    fn pointer_up(&mut self, screen: Point) {
        let world = self.viewport.screen_to_world(screen);
        if self.capture.is_capturing() {
            self.capture.extend(world);
            self.commit_stroke();
            return;
        }
        match std::mem::take(&mut self.gesture) {
            Gesture::Idle => {}
            Gesture::Pan {
                start_screen,
                start_translation,
                target,
                moved,
            } => {
                let delta = screen - start_screen;
                if moved || delta != Vec2::ZERO {
                    self.viewport.pan_to(start_translation + delta);
                } else {
                    self.click(world, target);
                }
            }
            Gesture::Manipulate(mut manipulation) => {
                manipulation.update(world);
                if manipulation.kind() == ManipulationKind::Move && !manipulation.has_moved() {
                    self.click(world, Some(manipulation.element_id().to_string()));
                } else if let Some(patch) = manipulation.patch() {
                    self.update_element(manipulation.element_id(), &patch);
                }
            }
        }
    }

    fn wheel(&mut self, screen: Point, delta_y: f64) {
        if delta_y == 0.0 || !delta_y.is_finite() {
            return;
        }
        // A background drag owns the translation until release.
        if matches!(self.gesture, Gesture::Pan { .. }) {
            return;
        }
        let step = self.config.zoom_step;
        let factor = if delta_y < 0.0 { step } else { 1.0 / step };
        self.viewport.zoom_at(screen, factor);
    }

    fn click(&mut self, world: Point, target: Option<ElementId>) {
        match target {
            Some(id) => {
                self.selection.toggle(&id);
            }
            None => {
                self.selection.clear();
                if self.tool == ToolKind::StickyNote {
                    self.add_sticky_note(world, "");
                }
            }
        }
    }

    /// Corner handle of a selected element under `world`.
    fn resize_at(&self, world: Point) -> Option<Manipulation> {
        let board = self.current_board()?;
        let tolerance = HANDLE_HIT_TOLERANCE / self.viewport.scale();
        self.selection
            .ids()
            .iter()
            .rev()
            .filter_map(|id| board.element(id))
            .find_map(|element| {
                let corner = hit_test_handles(element, world, tolerance)?;
                Manipulation::start_resize(element.clone(), corner, world)
            })
    }

    /// Element hit by a press: the host's answer if it names a live element,
    /// otherwise our own picking.
    fn pick(&self, world: Point, target: Option<ElementId>) -> Option<ElementId> {
        let board = self.current_board()?;
        match target {
            Some(id) if board.contains(&id) => Some(id),
            Some(id) => {
                log::debug!("Ignoring press on unknown element {}", id);
                None
            }
            None => board
                .element_at(world, PICK_TOLERANCE / self.viewport.scale())
                .map(|e| e.id().to_string()),
        }
    }

    fn commit_stroke(&mut self) {
        let Some((board_id, stroke)) = self.capture.finish(&self.pen) else {
            return;
        };
        if self.current_board_id.as_deref() != Some(board_id.as_str()) {
            log::debug!("Dropped stroke for inactive board {}", board_id);
            return;
        }
        self.add_element(Element::Drawing(stroke));
    }

    fn abort_gestures(&mut self) {
        if self.capture.cancel() {
            log::debug!("Abandoned stroke in progress");
        }
        self.gesture = Gesture::Idle;
    }
}
