//! World/screen coordinate transforms.
//!
//! The drawing is Y-up (CAD convention) while the canvas is Y-down, so every
//! conversion negates Y. All geometry tests run in world space; pixel
//! thresholds are converted through [`Camera::screen_dist_to_world`].

#[cfg(test)]
#[path = "camera_test.rs"]
mod camera_test;

use serde::{Deserialize, Serialize};

use crate::consts::{FIT_FILL_RATIO, FIT_MIN_RATIO, MAX_SCALE, MIN_SCALE};
use crate::geometry::Bounds;

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

    /// Whether both coordinates are finite.
    #[must_use]
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// Camera state for zoom/pan over the drawing.
///
/// `offset_x` / `offset_y` are in CSS pixels and locate the world origin on
/// screen. `scale` is pixels per world unit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub scale: f64,
    pub offset_x: f64,
    pub offset_y: f64,
}

impl Default for Camera {
    fn default() -> Self {
        Self { scale: 1.0, offset_x: 0.0, offset_y: 0.0 }
    }
}

impl Camera {
    #[must_use]
    pub fn new(scale: f64, offset_x: f64, offset_y: f64) -> Self {
        Self { scale, offset_x, offset_y }
    }

    /// Convert a world-space point to screen coordinates (CSS pixels).
    #[must_use]
    pub fn world_to_screen(&self, world: Point) -> Point {
        Point {
            x: world.x * self.scale + self.offset_x,
            y: -world.y * self.scale + self.offset_y,
        }
    }

    /// Convert a screen-space point (CSS pixels) to world coordinates.
    #[must_use]
    pub fn screen_to_world(&self, screen: Point) -> Point {
        Point {
            x: (screen.x - self.offset_x) / self.scale,
            y: -((screen.y - self.offset_y) / self.scale),
        }
    }

    /// Convert a screen-space distance (pixels) to world-space distance.
    #[must_use]
    pub fn screen_dist_to_world(&self, screen_dist: f64) -> f64 {
        screen_dist / self.scale
    }

    /// Convert a world-space distance to screen pixels.
    #[must_use]
    pub fn world_dist_to_screen(&self, world_dist: f64) -> f64 {
        world_dist * self.scale
    }

    /// Multiply the scale by `factor`, keeping the world point under
    /// `screen_pt` where it is.
    pub fn zoom_at(&mut self, screen_pt: Point, factor: f64) {
        let new_scale = (self.scale * factor).clamp(MIN_SCALE, MAX_SCALE);
        let applied = new_scale / self.scale;
        self.offset_x = screen_pt.x - (screen_pt.x - self.offset_x) * applied;
        self.offset_y = screen_pt.y - (screen_pt.y - self.offset_y) * applied;
        self.scale = new_scale;
    }

    /// Shift the view by a screen-space delta.
    pub fn pan_by(&mut self, dx: f64, dy: f64) {
        self.offset_x += dx;
        self.offset_y += dy;
    }

    /// Camera that centers `bounds` in a `viewport_w` x `viewport_h` viewport,
    /// filling roughly 60% of the smaller fitting dimension.
    #[must_use]
    pub fn fit(bounds: &Bounds, viewport_w: f64, viewport_h: f64) -> Self {
        let bw = bounds.width();
        let bh = bounds.height();

        let scale = if bw > 0.0 && bh > 0.0 {
            let fitted = ((viewport_w * FIT_FILL_RATIO) / bw).min((viewport_h * FIT_FILL_RATIO) / bh);
            let floor = (viewport_w.min(viewport_h) / bw.max(bh)) * FIT_MIN_RATIO;
            fitted.max(floor).clamp(MIN_SCALE, MAX_SCALE)
        } else {
            1.0
        };

        Self {
            scale,
            offset_x: (viewport_w - bw * scale) / 2.0 - bounds.min_x * scale,
            offset_y: viewport_h - (viewport_h - bh * scale) / 2.0 + bounds.min_y * scale,
        }
    }
}
