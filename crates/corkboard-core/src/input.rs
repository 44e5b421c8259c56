//! Pointer input delivered to the session.

use crate::model::ElementId;
use kurbo::Point;
use serde::{Deserialize, Serialize};

/// Pointer event type for unified mouse/touch handling.
///
/// Positions are in screen coordinates. `Down::target` is the renderer's
/// picking answer for the press; the session also falls back to its own
/// geometric picking when the host leaves it empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PointerEvent {
    Down {
        position: Point,
        target: Option<ElementId>,
    },
    Move {
        position: Point,
    },
    Up {
        position: Point,
    },
    /// Mouse wheel; negative `delta_y` zooms in.
    Wheel {
        position: Point,
        delta_y: f64,
    },
}

impl PointerEvent {
    /// Press on empty canvas.
    pub fn down(x: f64, y: f64) -> Self {
        PointerEvent::Down {
            position: Point::new(x, y),
            target: None,
        }
    }

    /// Press on a picked element.
    pub fn down_on(x: f64, y: f64, target: impl Into<ElementId>) -> Self {
        PointerEvent::Down {
            position: Point::new(x, y),
            target: Some(target.into()),
        }
    }

    pub fn moved(x: f64, y: f64) -> Self {
        PointerEvent::Move {
            position: Point::new(x, y),
        }
    }

    pub fn up(x: f64, y: f64) -> Self {
        PointerEvent::Up {
            position: Point::new(x, y),
        }
    }

    pub fn wheel(x: f64, y: f64, delta_y: f64) -> Self {
        PointerEvent::Wheel {
            position: Point::new(x, y),
            delta_y,
        }
    }

    /// Screen position of the event.
    pub fn position(&self) -> Point {
        match self {
            PointerEvent::Down { position, .. }
            | PointerEvent::Move { position }
            | PointerEvent::Up { position }
            | PointerEvent::Wheel { position, .. } => *position,
        }
    }
}
