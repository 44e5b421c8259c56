//! End-to-end editing scenarios driven through the public API.

use corkboard_core::geometry;
use corkboard_core::storage::dispatch;
use corkboard_core::{
    Board, Element, ElementPatch, MemoryStorage, PointerEvent, Session, SessionConfig, Storage, ToolKind,
};
use kurbo::{Point, Size};
use std::future::Future;

fn block_on<F: Future>(f: F) -> F::Output {
    use std::task::{Context, Poll, RawWaker, RawWakerVTable, Waker};

    fn dummy_raw_waker() -> RawWaker {
        fn no_op(_: *const ()) {}
        fn clone(_: *const ()) -> RawWaker {
            dummy_raw_waker()
        }
        static VTABLE: RawWakerVTable = RawWakerVTable::new(clone, no_op, no_op, no_op);
        RawWaker::new(std::ptr::null(), &VTABLE)
    }

    let waker = unsafe { Waker::from_raw(dummy_raw_waker()) };
    let mut cx = Context::from_waker(&waker);
    let mut f = std::pin::pin!(f);

    loop {
        if let Poll::Ready(result) = f.as_mut().poll(&mut cx) {
            return result;
        }
    }
}

fn raw_pen_config() -> SessionConfig {
    let mut config = SessionConfig::default();
    config.pen.smoothing_window = 1;
    config.pen.simplify = true;
    config.pen.simplify_tolerance = 5.0;
    config
}

#[test]
fn sprint_planning_board_gets_a_kickoff_note() {
    let mut session = Session::default();
    session.create_board("Sprint Planning");
    session.add_sticky_note(Point::new(40.0, 40.0), "Kickoff").unwrap();

    let board = session.current_board().unwrap();
    assert_eq!(board.name(), "Sprint Planning");
    assert_eq!(board.len(), 1);

    let json = serde_json::to_value(&board.elements()[0]).unwrap();
    assert_eq!(json["type"], "sticky-note");
    assert_eq!(json["position"]["x"], 40.0);
    assert_eq!(json["position"]["y"], 40.0);
    assert_eq!(json["content"], "Kickoff");
}

#[test]
fn drawn_stroke_is_simplified_on_commit() {
    let mut session = Session::new(raw_pen_config());
    session.create_board("Sketches");
    session.set_tool(ToolKind::Pen);

    session.handle_pointer(PointerEvent::down(0.0, 0.0));
    session.handle_pointer(PointerEvent::moved(1.0, 1.0));
    session.handle_pointer(PointerEvent::moved(2.0, 0.0));
    session.handle_pointer(PointerEvent::moved(50.0, 50.0));
    assert_eq!(session.stroke_preview().unwrap().len(), 8);
    session.handle_pointer(PointerEvent::up(50.0, 50.0));

    let board = session.current_board().unwrap();
    let stroke = board.elements()[0].as_drawing().unwrap();
    assert_eq!(stroke.points, vec![0.0, 0.0, 50.0, 50.0]);
    assert_eq!(stroke.points, geometry::simplify(&[0.0, 0.0, 1.0, 1.0, 2.0, 0.0, 50.0, 50.0], 5.0));
}

#[test]
fn single_point_stroke_is_discarded() {
    let mut session = Session::default();
    session.create_board("Taps");
    session.set_tool(ToolKind::Pen);
    session.take_pending_writes();

    session.handle_pointer(PointerEvent::down(10.0, 10.0));
    session.handle_pointer(PointerEvent::up(10.0, 10.0));

    assert!(session.current_board().unwrap().is_empty());
    assert!(session.take_pending_writes().is_empty());
}

#[test]
fn switching_from_pen_to_select_mid_stroke_adds_nothing() {
    let mut session = Session::default();
    session.create_board("Interrupted");
    session.set_tool(ToolKind::Pen);

    session.handle_pointer(PointerEvent::down(0.0, 0.0));
    for i in 1..20 {
        session.handle_pointer(PointerEvent::moved(i as f64 * 5.0, i as f64 * 3.0));
    }
    session.set_tool(ToolKind::Select);
    session.handle_pointer(PointerEvent::up(100.0, 60.0));

    assert_eq!(session.current_tool(), ToolKind::Select);
    assert!(session.current_board().unwrap().is_empty());
    assert!(session.stroke_preview().is_none());
}

#[test]
fn deleting_an_element_removes_it_from_the_selection() {
    let mut session = Session::default();
    session.create_board("Cleanup");
    let keep = session.add_sticky_note(Point::new(0.0, 0.0), "keep").unwrap();
    let gone = session.add_sticky_note(Point::new(300.0, 0.0), "gone").unwrap();

    session.handle_pointer(PointerEvent::down_on(10.0, 10.0, keep.clone()));
    session.handle_pointer(PointerEvent::up(10.0, 10.0));
    session.handle_pointer(PointerEvent::down_on(310.0, 10.0, gone.clone()));
    session.handle_pointer(PointerEvent::up(310.0, 10.0));
    assert_eq!(session.selected_elements(), [keep.clone(), gone.clone()]);

    assert!(session.delete_element(&gone));
    assert_eq!(session.selected_elements(), [keep]);
}

#[test]
fn resize_below_floor_never_persists() {
    let mut session = Session::default();
    session.create_board("Resize");
    let id = session.add_sticky_note(Point::new(0.0, 0.0), "").unwrap();
    session.toggle_selection(&id);

    // Drag the bottom-right handle far past the top-left corner.
    session.handle_pointer(PointerEvent::down(200.0, 200.0));
    for step in 1..=30 {
        let p = 200.0 - step as f64 * 10.0;
        session.handle_pointer(PointerEvent::moved(p, p));
        let live = session.display_elements()[0].as_sticky_note().unwrap().size;
        assert!(live.width >= 100.0 && live.height >= 80.0);
    }
    session.handle_pointer(PointerEvent::up(-100.0, -100.0));

    let note = session.current_board().unwrap().element(&id).unwrap().as_sticky_note().unwrap().clone();
    assert!(note.size.width >= 100.0 && note.size.height >= 80.0);

    // Patches are clamped too.
    session.update_element(&id, &ElementPatch::new().with_size(Size::new(10.0, 10.0)));
    let note = session.current_board().unwrap().element(&id).unwrap().as_sticky_note().unwrap().clone();
    assert_eq!(note.size, Size::new(100.0, 80.0));
}

#[test]
fn boards_survive_save_and_reload() {
    let storage = MemoryStorage::new();

    let mut session = Session::new(raw_pen_config());
    let board_id = session.create_board("Round Trip");
    session.add_sticky_note(Point::new(40.0, 40.0), "Kickoff").unwrap();
    session.add_text(Point::new(10.0, 300.0), "Notes\nline two").unwrap();
    session.set_tool(ToolKind::Pen);
    session.handle_pointer(PointerEvent::down(0.0, 0.0));
    session.handle_pointer(PointerEvent::moved(30.0, 60.0));
    session.handle_pointer(PointerEvent::up(90.0, 10.0));

    let report = block_on(dispatch(&storage, session.take_pending_writes()));
    assert!(report.is_clean());
    assert_eq!(report.saved, 1);

    let mut reloaded = Session::default();
    assert_eq!(block_on(reloaded.load(&storage)), 1);
    assert_eq!(reloaded.current_board_id(), Some(board_id.as_str()));
    assert_eq!(reloaded.current_board(), session.current_board());

    let kinds: Vec<_> = reloaded
        .current_board()
        .unwrap()
        .elements()
        .iter()
        .map(Element::type_name)
        .collect();
    assert_eq!(kinds, ["sticky-note", "text", "drawing"]);
}

#[test]
fn deleted_board_is_removed_from_storage() {
    let storage = MemoryStorage::new();
    let mut session = Session::default();
    let first = session.create_board("First");
    let second = session.create_board("Second");
    block_on(dispatch(&storage, session.take_pending_writes()));

    session.delete_board(&second);
    let report = block_on(dispatch(&storage, session.take_pending_writes()));
    assert_eq!(report.deleted, 1);

    let stored: Vec<Board> = block_on(storage.get_all_boards()).unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].id(), first);
    assert_eq!(session.current_board_id(), Some(first.as_str()));
}

#[test]
fn zoom_keeps_the_cursor_anchored() {
    let mut session = Session::default();
    session.create_board("Zoom");
    let cursor = Point::new(321.0, 123.0);

    for delta in [-1.0, -1.0, 1.0, -1.0, 1.0, 1.0, 1.0] {
        let before = session.viewport().screen_to_world(cursor);
        session.handle_pointer(PointerEvent::wheel(cursor.x, cursor.y, delta));
        let after = session.viewport().screen_to_world(cursor);
        assert!((before - after).hypot() < 1e-9);
    }
    assert!(session.zoom_level() >= 0.1 && session.zoom_level() <= 5.0);
}

#[test]
fn board_json_round_trips_through_files() {
    let dir = tempfile::tempdir().unwrap();
    let storage = corkboard_core::FileStorage::new(dir.path().to_path_buf()).unwrap();

    let mut session = Session::new(raw_pen_config());
    session.create_board("On Disk");
    session.add_sticky_note(Point::new(12.5, -3.25), "Persist me").unwrap();
    session.add_text(Point::new(0.0, 0.0), "label").unwrap();
    session.set_tool(ToolKind::Pen);
    session.handle_pointer(PointerEvent::down(0.0, 0.0));
    session.handle_pointer(PointerEvent::moved(17.0, 41.0));
    session.handle_pointer(PointerEvent::moved(33.0, 12.0));
    session.handle_pointer(PointerEvent::up(80.0, 80.0));
    block_on(dispatch(&storage, session.take_pending_writes()));

    let mut reloaded = Session::default();
    block_on(reloaded.load(&storage));
    assert_eq!(reloaded.boards(), session.boards());
}
