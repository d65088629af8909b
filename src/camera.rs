#[cfg(test)]
#[path = "camera_test.rs"]
mod camera_test;

use serde::{Deserialize, Serialize};

use crate::consts::{FIT_MARGIN, MAX_SCALE, MIN_SCALE};

/// A point in either screen or world space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to `other`.
    #[must_use]
    pub fn distance(self, other: Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    /// Midpoint between `self` and `other`.
    #[must_use]
    pub fn midpoint(self, other: Point) -> Point {
        Point::new((self.x + other.x) * 0.5, (self.y + other.y) * 0.5)
    }

    #[must_use]
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// Clamp `candidate` into `[min, max]`, keeping `prior` when the candidate is
/// NaN or infinite.
#[must_use]
pub fn clamp_finite(candidate: f64, prior: f64, min: f64, max: f64) -> f64 {
    if candidate.is_finite() {
        candidate.clamp(min, max)
    } else {
        prior
    }
}

/// Camera state mapping screen space onto the world layer.
///
/// `offset_x` / `offset_y` are the screen position of world origin in CSS
/// pixels. `scale` is the world-to-screen factor, always within
/// [`MIN_SCALE`, `MAX_SCALE`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewTransform {
    pub offset_x: f64,
    pub offset_y: f64,
    pub scale: f64,
}

impl Default for ViewTransform {
    fn default() -> Self {
        Self { offset_x: 0.0, offset_y: 0.0, scale: 1.0 }
    }
}

impl ViewTransform {
    /// Convert a screen-space point (CSS pixels, relative to the viewport) to world coordinates.
    #[must_use]
    pub fn screen_to_world(&self, screen: Point) -> Point {
        Point {
            x: (screen.x - self.offset_x) / self.scale,
            y: (screen.y - self.offset_y) / self.scale,
        }
    }

    /// Convert a world-space point to screen coordinates (CSS pixels).
    #[must_use]
    pub fn world_to_screen(&self, world: Point) -> Point {
        Point {
            x: world.x * self.scale + self.offset_x,
            y: world.y * self.scale + self.offset_y,
        }
    }

    /// Convert a screen-space distance (pixels) to world-space distance.
    #[must_use]
    pub fn screen_dist_to_world(&self, screen_dist: f64) -> f64 {
        screen_dist / self.scale
    }

    /// Move the camera so world origin sits at `(x, y)` on screen.
    ///
    /// Returns `false` and leaves the camera untouched if either value is not finite.
    pub fn set_offset(&mut self, x: f64, y: f64) -> bool {
        if !x.is_finite() || !y.is_finite() {
            return false;
        }
        self.offset_x = x;
        self.offset_y = y;
        true
    }

    /// Set the scale, clamped to the allowed range. Non-finite input keeps the current scale.
    pub fn set_scale(&mut self, scale: f64) {
        self.scale = clamp_finite(scale, self.scale, MIN_SCALE, MAX_SCALE);
    }

    /// Zoom about a screen anchor.
    ///
    /// `start` is the camera when the gesture began. The world point that was
    /// under `anchor_start` in `start` ends up under `anchor_now` with the new
    /// scale `start.scale * factor`.
    #[must_use]
    pub fn zoomed(start: &ViewTransform, factor: f64, anchor_start: Point, anchor_now: Point) -> ViewTransform {
        let factor = if factor.is_finite() { factor } else { 1.0 };
        let scale = clamp_finite(start.scale * factor, start.scale, MIN_SCALE, MAX_SCALE);
        let world = start.screen_to_world(anchor_start);
        let candidate = ViewTransform {
            offset_x: anchor_now.x - world.x * scale,
            offset_y: anchor_now.y - world.y * scale,
            scale,
        };
        if candidate.offset_x.is_finite() && candidate.offset_y.is_finite() {
            candidate
        } else {
            *start
        }
    }

    /// Camera that shows a `world_w` x `world_h` map centered in a
    /// `viewport_w` x `viewport_h` viewport, never magnified past 1:1.
    #[must_use]
    pub fn fit(viewport_w: f64, viewport_h: f64, world_w: f64, world_h: f64) -> ViewTransform {
        let raw = (viewport_w / world_w).min(viewport_h / world_h).min(1.0) * FIT_MARGIN;
        let scale = if raw.is_finite() && raw > 0.0 { raw.clamp(MIN_SCALE, MAX_SCALE) } else { 1.0 };
        let offset_x = (viewport_w - world_w * scale) / 2.0;
        let offset_y = (viewport_h - world_h * scale) / 2.0;
        ViewTransform {
            offset_x: if offset_x.is_finite() { offset_x } else { 0.0 },
            offset_y: if offset_y.is_finite() { offset_y } else { 0.0 },
            scale,
        }
    }
}
