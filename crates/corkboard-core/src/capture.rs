//! Freehand stroke capture.
//!
//! A capture lives for exactly one pointer-down to pointer-up span:
//! `Idle -> Capturing -> Idle`. Leaving `Capturing` happens only through
//! [`StrokeCapture::finish`] (commit) or [`StrokeCapture::cancel`] (abort).

use crate::geometry::{self, DEFAULT_SIMPLIFY_TOLERANCE, DEFAULT_SMOOTHING_WINDOW};
use crate::model::{DrawingStroke, DrawingTool, clamp_stroke_width, is_valid_stroke_points};
use kurbo::Point;
use serde::{Deserialize, Serialize};

/// Pen configuration applied to newly captured strokes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PenSettings {
    /// Stroke color.
    pub color: String,
    /// Stroke width, kept within 1..=20.
    pub width: f64,
    /// Moving-average window; 1 or less disables smoothing.
    pub smoothing_window: usize,
    /// Whether RDP simplification runs on commit.
    pub simplify: bool,
    /// RDP tolerance in world units.
    pub simplify_tolerance: f64,
}

impl Default for PenSettings {
    fn default() -> Self {
        Self {
            color: "#000000".to_string(),
            width: 2.0,
            smoothing_window: DEFAULT_SMOOTHING_WINDOW,
            simplify: true,
            simplify_tolerance: DEFAULT_SIMPLIFY_TOLERANCE,
        }
    }
}

impl PenSettings {
    /// Set the width, clamped into the allowed range.
    pub fn set_width(&mut self, width: f64) {
        self.width = clamp_stroke_width(width);
    }

    /// Run the configured smoothing and simplification over raw points.
    pub fn process(&self, raw: &[f64]) -> Vec<f64> {
        let smoothed = if self.smoothing_window > 1 {
            geometry::smooth(raw, self.smoothing_window)
        } else {
            raw.to_vec()
        };
        if self.simplify {
            geometry::simplify(&smoothed, self.simplify_tolerance)
        } else {
            smoothed
        }
    }
}

/// State of the capture pipeline.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum CaptureState {
    /// No stroke in progress.
    #[default]
    Idle,
    /// A stroke is being drawn on `board_id`.
    Capturing {
        board_id: String,
        /// Raw world-space points, flattened.
        points: Vec<f64>,
    },
}

/// Accumulates pointer samples into a stroke.
#[derive(Debug, Clone, Default)]
pub struct StrokeCapture {
    state: CaptureState,
}

impl StrokeCapture {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &CaptureState {
        &self.state
    }

    pub fn is_capturing(&self) -> bool {
        matches!(self.state, CaptureState::Capturing { .. })
    }

    /// Board the in-progress stroke belongs to.
    pub fn board_id(&self) -> Option<&str> {
        match &self.state {
            CaptureState::Capturing { board_id, .. } => Some(board_id),
            CaptureState::Idle => None,
        }
    }

    /// Raw, unsmoothed points of the in-progress stroke for live preview.
    pub fn preview(&self) -> Option<&[f64]> {
        match &self.state {
            CaptureState::Capturing { points, .. } => Some(points),
            CaptureState::Idle => None,
        }
    }

    /// Start a stroke at a world-space point.
    ///
    /// Any stroke already in progress is abandoned.
    pub fn begin(&mut self, board_id: impl Into<String>, world: Point) {
        if self.cancel() {
            log::debug!("Abandoned unfinished stroke on new pointer-down");
        }
        let mut points = Vec::new();
        if is_finite(world) {
            points.extend([world.x, world.y]);
        }
        self.state = CaptureState::Capturing {
            board_id: board_id.into(),
            points,
        };
    }

    /// Append a world-space point. Returns true if the point was recorded.
    ///
    /// Non-finite points and exact repeats of the previous point are skipped.
    pub fn extend(&mut self, world: Point) -> bool {
        let CaptureState::Capturing { points, .. } = &mut self.state else {
            return false;
        };
        if !is_finite(world) {
            return false;
        }
        if let [.., x, y] = points.as_slice() {
            if *x == world.x && *y == world.y {
                return false;
            }
        }
        points.extend([world.x, world.y]);
        true
    }

    /// Finish the stroke and build the element to commit.
    ///
    /// Returns `None` (and creates nothing) when fewer than two distinct points
    /// were captured or no capture was active. Always returns to `Idle`.
    pub fn finish(&mut self, pen: &PenSettings) -> Option<(String, DrawingStroke)> {
        let CaptureState::Capturing { board_id, points } = std::mem::take(&mut self.state) else {
            return None;
        };
        if !is_valid_stroke_points(&points) {
            log::debug!("Discarded stroke with {} point(s)", geometry::point_count(&points));
            return None;
        }

        let processed = pen.process(&points);
        let stroke = DrawingStroke::new(DrawingTool::Pen, processed, pen.width, pen.color.clone())?;
        log::debug!(
            "Committed stroke {} ({} raw points, {} kept)",
            stroke.id,
            geometry::point_count(&points),
            stroke.len()
        );
        Some((board_id, stroke))
    }

    /// Abandon the stroke in progress. Returns true if one was active.
    pub fn cancel(&mut self) -> bool {
        let was_capturing = self.is_capturing();
        self.state = CaptureState::Idle;
        was_capturing
    }
}

fn is_finite(point: Point) -> bool {
    point.x.is_finite() && point.y.is_finite()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw_pen() -> PenSettings {
        PenSettings {
            smoothing_window: 1,
            simplify: false,
            ..PenSettings::default()
        }
    }

    #[test]
    fn test_capture_lifecycle() {
        let mut capture = StrokeCapture::new();
        assert!(!capture.is_capturing());

        capture.begin("board", Point::new(0.0, 0.0));
        assert!(capture.is_capturing());
        assert_eq!(capture.preview(), Some(&[0.0, 0.0][..]));

        assert!(capture.extend(Point::new(10.0, 5.0)));
        assert_eq!(capture.preview().unwrap().len(), 4);

        let (board_id, stroke) = capture.finish(&raw_pen()).unwrap();
        assert_eq!(board_id, "board");
        assert_eq!(stroke.points, vec![0.0, 0.0, 10.0, 5.0]);
        assert_eq!(stroke.tool, DrawingTool::Pen);
        assert!(!capture.is_capturing());
    }

    #[test]
    fn test_single_point_is_discarded() {
        let mut capture = StrokeCapture::new();
        capture.begin("board", Point::new(3.0, 3.0));
        assert!(capture.finish(&PenSettings::default()).is_none());
        assert_eq!(capture.state(), &CaptureState::Idle);
    }

    #[test]
    fn test_repeated_points_are_not_distinct() {
        let mut capture = StrokeCapture::new();
        capture.begin("board", Point::new(3.0, 3.0));
        assert!(!capture.extend(Point::new(3.0, 3.0)));
        assert!(!capture.extend(Point::new(f64::NAN, 3.0)));
        assert!(capture.finish(&PenSettings::default()).is_none());
    }

    #[test]
    fn test_extend_without_begin() {
        let mut capture = StrokeCapture::new();
        assert!(!capture.extend(Point::new(1.0, 1.0)));
        assert!(capture.finish(&PenSettings::default()).is_none());
    }

    #[test]
    fn test_cancel_drops_points() {
        let mut capture = StrokeCapture::new();
        capture.begin("board", Point::ZERO);
        capture.extend(Point::new(5.0, 5.0));
        assert!(capture.cancel());
        assert!(!capture.cancel());
        assert!(capture.finish(&PenSettings::default()).is_none());
    }

    #[test]
    fn test_commit_simplifies() {
        let mut capture = StrokeCapture::new();
        capture.begin("board", Point::new(0.0, 0.0));
        for (x, y) in [(1.0, 1.0), (2.0, 0.0), (50.0, 50.0)] {
            capture.extend(Point::new(x, y));
        }
        let pen = PenSettings {
            smoothing_window: 1,
            simplify: true,
            simplify_tolerance: 5.0,
            ..PenSettings::default()
        };
        let (_, stroke) = capture.finish(&pen).unwrap();
        assert_eq!(stroke.points, vec![0.0, 0.0, 50.0, 50.0]);
    }

    #[test]
    fn test_process_smooths_then_simplifies() {
        let pen = PenSettings::default();
        let raw = vec![0.0, 0.0, 10.0, 0.5, 20.0, 0.0, 30.0, 0.5, 40.0, 0.0];
        let out = pen.process(&raw);
        assert!(out.len() >= 4);
        assert!(out.len() <= raw.len());
        assert_eq!(out.len() % 2, 0);
    }

    #[test]
    fn test_pen_width_clamped() {
        let mut pen = PenSettings::default();
        pen.set_width(99.0);
        assert!((pen.width - 20.0).abs() < f64::EPSILON);
        pen.set_width(0.0);
        assert!((pen.width - 1.0).abs() < f64::EPSILON);
    }
}
