//! Viewport pan/zoom transform.

use kurbo::{Affine, Point, Rect, Size, Vec2};
use serde::{Deserialize, Serialize};

/// Smallest allowed scale.
pub const MIN_SCALE: f64 = 0.1;
/// Largest allowed scale.
pub const MAX_SCALE: f64 = 5.0;
/// Default multiplicative zoom step for increments and wheel notches.
pub const ZOOM_STEP: f64 = 1.1;

/// Clamp a requested scale into the allowed range. NaN maps to 1.0.
pub fn clamp_scale(scale: f64) -> f64 {
    if scale.is_nan() {
        return 1.0;
    }
    scale.clamp(MIN_SCALE, MAX_SCALE)
}

/// The view transform of the canvas.
///
/// `screen = world * scale + translation`. The canvas is infinite, so the
/// translation is never clamped; the scale always stays within
/// [`MIN_SCALE`, `MAX_SCALE`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    scale: f64,
    translation: Vec2,
    /// Size of the visible area in screen pixels.
    size: Size,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            scale: 1.0,
            translation: Vec2::ZERO,
            size: Size::new(800.0, 600.0),
        }
    }
}

impl Viewport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn translation(&self) -> Vec2 {
        self.translation
    }

    pub fn size(&self) -> Size {
        self.size
    }

    /// Set the size of the visible area in screen pixels.
    pub fn set_size(&mut self, size: Size) {
        self.size = size;
    }

    /// Center of the visible area in screen coordinates.
    pub fn center(&self) -> Point {
        Point::new(self.size.width / 2.0, self.size.height / 2.0)
    }

    /// World-to-screen transform for rendering.
    pub fn transform(&self) -> Affine {
        Affine::translate(self.translation) * Affine::scale(self.scale)
    }

    /// Screen-to-world transform for input handling.
    pub fn inverse_transform(&self) -> Affine {
        Affine::scale(1.0 / self.scale) * Affine::translate(-self.translation)
    }

    /// Convert a screen point to world coordinates.
    pub fn screen_to_world(&self, screen_point: Point) -> Point {
        self.inverse_transform() * screen_point
    }

    /// Convert a world point to screen coordinates.
    pub fn world_to_screen(&self, world_point: Point) -> Point {
        self.transform() * world_point
    }

    /// Visible region in world coordinates.
    pub fn visible_world_rect(&self) -> Rect {
        let top_left = self.screen_to_world(Point::ZERO);
        let bottom_right = self.screen_to_world(Point::new(self.size.width, self.size.height));
        Rect::from_points(top_left, bottom_right)
    }

    /// Replace the translation, e.g. at the end of a background drag.
    pub fn pan_to(&mut self, translation: Vec2) {
        self.translation = translation;
    }

    /// Pan by a delta in screen coordinates.
    pub fn pan_by(&mut self, delta: Vec2) {
        self.translation += delta;
    }

    /// Zoom by `factor`, keeping the world point under `screen_anchor` fixed.
    ///
    /// The resulting scale is clamped, never rejected.
    pub fn zoom_at(&mut self, screen_anchor: Point, factor: f64) {
        self.set_scale_at(screen_anchor, self.scale * factor);
    }

    /// Set an absolute scale, keeping the world point under `screen_anchor` fixed.
    pub fn set_scale_at(&mut self, screen_anchor: Point, scale: f64) {
        let new_scale = clamp_scale(scale);
        if (new_scale - self.scale).abs() < f64::EPSILON {
            return;
        }

        let world_point = self.screen_to_world(screen_anchor);
        self.scale = new_scale;

        // Solve screen_anchor = world_point * scale + translation.
        self.translation = screen_anchor.to_vec2() - world_point.to_vec2() * new_scale;
    }

    /// Set an absolute scale anchored at the viewport center.
    pub fn set_scale(&mut self, scale: f64) {
        self.set_scale_at(self.center(), scale);
    }

    /// Zoom in one step around the viewport center.
    pub fn zoom_in(&mut self, step: f64) {
        self.zoom_at(self.center(), step);
    }

    /// Zoom out one step around the viewport center.
    pub fn zoom_out(&mut self, step: f64) {
        self.zoom_at(self.center(), 1.0 / step);
    }

    /// Reset to scale 1 with no translation.
    pub fn reset(&mut self) {
        self.scale = 1.0;
        self.translation = Vec2::ZERO;
    }

    /// Fit the viewport to show the given world-space bounding box.
    pub fn fit_to_bounds(&mut self, bounds: Rect, padding: f64) {
        if bounds.is_zero_area() {
            self.reset();
            self.translation = self.center().to_vec2() - bounds.center().to_vec2();
            return;
        }

        let padded = Size::new(
            (self.size.width - padding * 2.0).max(1.0),
            (self.size.height - padding * 2.0).max(1.0),
        );

        let scale_x = padded.width / bounds.width();
        let scale_y = padded.height / bounds.height();
        self.scale = clamp_scale(scale_x.min(scale_y));

        // Center the bounds in the viewport
        self.translation = self.center().to_vec2() - bounds.center().to_vec2() * self.scale;
    }
}
