//! Polyline utilities for freehand strokes.
//!
//! Strokes are persisted as flat coordinate sequences (`[x0, y0, x1, y1, ...]`).
//! The functions here take and return that layout so callers never have to
//! convert back and forth themselves. A trailing odd value is ignored.

use kurbo::{Point, Rect, Vec2};

/// Default tolerance for Ramer-Douglas-Peucker simplification, in world units.
pub const DEFAULT_SIMPLIFY_TOLERANCE: f64 = 2.0;

/// Default moving-average window for stroke smoothing.
pub const DEFAULT_SMOOTHING_WINDOW: usize = 3;

/// Convert a flat coordinate sequence into points.
pub fn to_points(flat: &[f64]) -> Vec<Point> {
    flat.chunks_exact(2)
        .map(|pair| Point::new(pair[0], pair[1]))
        .collect()
}

/// Convert points back into a flat coordinate sequence.
pub fn to_flat(points: &[Point]) -> Vec<f64> {
    let mut flat = Vec::with_capacity(points.len() * 2);
    for point in points {
        flat.push(point.x);
        flat.push(point.y);
    }
    flat
}

/// Number of complete points in a flat coordinate sequence.
pub fn point_count(flat: &[f64]) -> usize {
    flat.len() / 2
}

/// Simplify a polyline with the Ramer-Douglas-Peucker algorithm.
///
/// The first and last points are always kept. An interior point survives when
/// its perpendicular distance to the chord of the segment being examined is
/// strictly greater than `tolerance`. Input with two points or fewer is
/// returned unchanged. A negative or NaN tolerance behaves like `0.0`.
pub fn simplify(flat: &[f64], tolerance: f64) -> Vec<f64> {
    let points = to_points(flat);
    if points.len() <= 2 {
        return flat.to_vec();
    }

    let tolerance = tolerance.max(0.0);
    let mut keep = vec![false; points.len()];
    keep[0] = true;
    keep[points.len() - 1] = true;
    mark_retained(&points, 0, points.len() - 1, tolerance, &mut keep);

    let retained: Vec<Point> = points
        .iter()
        .zip(&keep)
        .filter_map(|(point, &kept)| kept.then_some(*point))
        .collect();
    to_flat(&retained)
}

/// Recursive step of RDP over `points[first..=last]`.
fn mark_retained(points: &[Point], first: usize, last: usize, tolerance: f64, keep: &mut [bool]) {
    if last <= first + 1 {
        return;
    }

    let mut max_dist = 0.0;
    let mut max_index = None;
    for (i, point) in points.iter().enumerate().take(last).skip(first + 1) {
        let dist = perpendicular_distance(*point, points[first], points[last]);
        if dist > max_dist {
            max_dist = dist;
            max_index = Some(i);
        }
    }

    if let Some(index) = max_index {
        if max_dist > tolerance {
            keep[index] = true;
            mark_retained(points, first, index, tolerance, keep);
            mark_retained(points, index, last, tolerance, keep);
        }
    }
}

/// Smooth a polyline with a centered moving average.
///
/// Each output point is the mean of its neighbours `i - half ..= i + half`
/// where `half = max(1, window / 2)`. Neighbour indices are clamped to the
/// ends of the polyline, so the endpoints are averaged over a window that is
/// padded with themselves rather than dropped. Input with two points or
/// fewer, or a window of one or less, is returned unchanged.
pub fn smooth(flat: &[f64], window: usize) -> Vec<f64> {
    let points = to_points(flat);
    if points.len() <= 2 || window <= 1 {
        return flat.to_vec();
    }

    let half = (window / 2).max(1) as isize;
    let last = points.len() as isize - 1;
    let samples = (2 * half + 1) as f64;

    let smoothed: Vec<Point> = (0..points.len() as isize)
        .map(|i| {
            let mut sum = Vec2::ZERO;
            for j in i - half..=i + half {
                let p = points[j.clamp(0, last) as usize];
                sum += p.to_vec2();
            }
            (sum / samples).to_point()
        })
        .collect();
    to_flat(&smoothed)
}

/// Distance from `point` to the infinite line through `line_start` and `line_end`.
///
/// Falls back to the point-to-point distance when the line is degenerate.
pub fn perpendicular_distance(point: Point, line_start: Point, line_end: Point) -> f64 {
    let dx = line_end.x - line_start.x;
    let dy = line_end.y - line_start.y;

    let line_len_sq = dx * dx + dy * dy;
    if line_len_sq < f64::EPSILON {
        return point.distance(line_start);
    }

    // Twice the triangle area divided by the base.
    let area2 = ((point.x - line_start.x) * dy - (point.y - line_start.y) * dx).abs();
    area2 / line_len_sq.sqrt()
}

/// Distance from a point to a line segment (a to b).
pub fn point_to_segment_dist(point: Point, a: Point, b: Point) -> f64 {
    let seg = b - a;
    let pv = point - a;
    let len_sq = seg.hypot2();
    if len_sq < f64::EPSILON {
        return pv.hypot();
    }
    let t = (pv.dot(seg) / len_sq).clamp(0.0, 1.0);
    point.distance(a + seg * t)
}

/// Minimum distance from a point to a polyline.
pub fn point_to_polyline_dist(point: Point, points: &[Point]) -> f64 {
    match points {
        [] => f64::INFINITY,
        [only] => point.distance(*only),
        _ => points
            .windows(2)
            .map(|w| point_to_segment_dist(point, w[0], w[1]))
            .fold(f64::INFINITY, f64::min),
    }
}

/// Bounding box of a flat coordinate sequence, or `None` when it has no points.
pub fn bounds(flat: &[f64]) -> Option<Rect> {
    let mut pairs = flat.chunks_exact(2);
    let first = pairs.next()?;
    let mut rect = Rect::new(first[0], first[1], first[0], first[1]);
    for pair in pairs {
        rect = rect.union_pt(Point::new(pair[0], pair[1]));
    }
    Some(rect)
}

/// Translate every point of a flat coordinate sequence in place.
pub fn translate(flat: &mut [f64], delta: Vec2) {
    for pair in flat.chunks_exact_mut(2) {
        pair[0] += delta.x;
        pair[1] += delta.y;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn zigzag() -> Vec<f64> {
        vec![
            0.0, 0.0, 1.0, 0.1, 2.0, 0.0, 3.0, 0.1, 4.0, 0.0, 5.0, 8.0, 6.0, 0.0, 20.0, 3.0,
        ]
    }

    #[test]
    fn test_simplify_keeps_endpoints() {
        let input = zigzag();
        for tolerance in [0.0, 0.05, 0.5, 2.0, 10.0, 100.0] {
            let out = simplify(&input, tolerance);
            assert_eq!(&out[..2], &input[..2]);
            assert_eq!(&out[out.len() - 2..], &input[input.len() - 2..]);
            assert!(out.len() <= input.len());
            assert_eq!(out.len() % 2, 0);
        }
    }

    #[test]
    fn test_simplify_drops_near_collinear_points() {
        let out = simplify(&[0.0, 0.0, 1.0, 1.0, 2.0, 0.0, 50.0, 50.0], 5.0);
        assert_eq!(out, vec![0.0, 0.0, 50.0, 50.0]);
    }

    #[test]
    fn test_simplify_keeps_outlier() {
        let out = simplify(&[0.0, 0.0, 5.0, 10.0, 10.0, 0.0], 1.0);
        assert_eq!(out, vec![0.0, 0.0, 5.0, 10.0, 10.0, 0.0]);
    }

    #[test]
    fn test_simplify_is_idempotent() {
        let input = zigzag();
        for tolerance in [0.0, 0.05, 0.5, 2.0, 10.0] {
            let once = simplify(&input, tolerance);
            let twice = simplify(&once, tolerance);
            assert_eq!(once, twice, "tolerance {tolerance}");
        }
    }

    #[test]
    fn test_simplify_negative_tolerance_terminates() {
        let input = vec![0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 1.0, 1.0];
        let out = simplify(&input, -3.0);
        assert_eq!(&out[..2], &[0.0, 0.0]);
        assert_eq!(&out[out.len() - 2..], &[1.0, 1.0]);
    }

    #[test]
    fn test_degenerate_input_unchanged() {
        for input in [vec![], vec![3.0, 4.0], vec![0.0, 0.0, 9.0, 9.0]] {
            assert_eq!(simplify(&input, 1.0), input);
            assert_eq!(smooth(&input, 5), input);
        }
    }

    #[test]
    fn test_smooth_window_one_is_identity() {
        let input = zigzag();
        assert_eq!(smooth(&input, 1), input);
        assert_eq!(smooth(&input, 0), input);
    }

    #[test]
    fn test_smooth_moving_average() {
        let out = smooth(&[0.0, 0.0, 3.0, 3.0, 6.0, 0.0], 3);
        // Endpoints are padded with themselves: (0 + 0 + 3) / 3.
        assert_eq!(out.len(), 6);
        assert!((out[0] - 1.0).abs() < 1e-12);
        assert!((out[1] - 1.0).abs() < 1e-12);
        assert!((out[2] - 3.0).abs() < 1e-12);
        assert!((out[3] - 1.0).abs() < 1e-12);
        assert!((out[4] - 5.0).abs() < 1e-12);
        assert!((out[5] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_smooth_preserves_point_count() {
        let input = zigzag();
        assert_eq!(smooth(&input, 5).len(), input.len());
    }

    #[test]
    fn test_perpendicular_distance() {
        let d = perpendicular_distance(Point::new(2.0, 0.0), Point::ZERO, Point::new(50.0, 50.0));
        assert!((d - 2.0_f64.sqrt()).abs() < 1e-12);

        let degenerate = perpendicular_distance(Point::new(3.0, 4.0), Point::ZERO, Point::ZERO);
        assert!((degenerate - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_polyline_distance() {
        let line = [Point::ZERO, Point::new(100.0, 0.0)];
        assert!(point_to_polyline_dist(Point::new(50.0, 3.0), &line) < 3.0 + 1e-12);
        assert!((point_to_polyline_dist(Point::new(110.0, 0.0), &line) - 10.0).abs() < 1e-12);
        assert!(point_to_polyline_dist(Point::ZERO, &[]).is_infinite());
    }

    #[test]
    fn test_bounds_and_translate() {
        let mut flat = vec![0.0, 10.0, 20.0, -5.0];
        let rect = bounds(&flat).unwrap();
        assert_eq!(rect, Rect::new(0.0, -5.0, 20.0, 10.0));

        translate(&mut flat, Vec2::new(1.0, 2.0));
        assert_eq!(flat, vec![1.0, 12.0, 21.0, -3.0]);
        assert!(bounds(&[]).is_none());
    }
}
