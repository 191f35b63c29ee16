//! Rendering: paints the drawing, the committed areas and the draft polygon.
//!
//! [`redraw`] owns the layer order and converts every area/draft point to
//! screen space through the camera. It talks to a [`Surface`], so the order
//! and styling can be tested without a browser. [`CanvasSurface`] is the only
//! place that touches [`web_sys::CanvasRenderingContext2d`]; all of its
//! fallible calls propagate `JsValue` errors to [`crate::engine::Engine::render`].

#[cfg(test)]
#[path = "render_test.rs"]
mod render_test;

use std::f64::consts::TAU;

use wasm_bindgen::JsValue;
use web_sys::CanvasRenderingContext2d;

use crate::areas::{AreaId, AreaStore};
use crate::camera::{Camera, Point};
use crate::consts::{
    AREA_FILL_ALPHA, AREA_STROKE_PX, BACKGROUND_COLOR, DASH_PX, DEGREE_MAGNITUDE_FLOOR, DRAFT_COLOR,
    DRAFT_POINT_RADIUS_PX, DRAFT_STROKE_PX, FIRST_POINT_RING_PX, HIGHLIGHT_COLOR, HIGHLIGHT_STROKE_PX,
    MIN_AREA_POINTS, PRIMITIVE_COLOR, SNAPPED_POINT_COLOR,
};
use crate::primitive::{Primitive, Shape};
use crate::session::DraftPoint;

/// Stroke styling for screen-space paths.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stroke<'a> {
    pub color: &'a str,
    /// Width in screen pixels.
    pub width: f64,
    pub dashed: bool,
}

/// Drawing target. Every coordinate passed in is in screen space except the
/// primitives handed to `repaint_base`, which are world space.
pub trait Surface {
    type Error;

    /// Clear the surface and paint the drawing's primitives under `camera`.
    ///
    /// # Errors
    ///
    /// Implementation-defined drawing failures.
    fn repaint_base(&mut self, camera: &Camera, primitives: &[Primitive]) -> Result<(), Self::Error>;

    /// Fill a closed polygon with `color` at opacity `alpha`.
    ///
    /// # Errors
    ///
    /// Implementation-defined drawing failures.
    fn fill_polygon(&mut self, points: &[Point], color: &str, alpha: f64) -> Result<(), Self::Error>;

    /// Stroke a path through `points`, closing it when `closed` is set.
    ///
    /// # Errors
    ///
    /// Implementation-defined drawing failures.
    fn stroke_path(&mut self, points: &[Point], closed: bool, stroke: Stroke<'_>) -> Result<(), Self::Error>;

    /// Fill a dot of `radius` pixels.
    ///
    /// # Errors
    ///
    /// Implementation-defined drawing failures.
    fn fill_dot(&mut self, center: Point, radius: f64, color: &str) -> Result<(), Self::Error>;

    /// Stroke a circle of `radius` pixels.
    ///
    /// # Errors
    ///
    /// Implementation-defined drawing failures.
    fn stroke_ring(&mut self, center: Point, radius: f64, stroke: Stroke<'_>) -> Result<(), Self::Error>;
}

/// Read-only view of everything a frame shows.
#[derive(Debug, Clone, Copy)]
pub struct Scene<'a> {
    pub camera: &'a Camera,
    pub primitives: &'a [Primitive],
    pub areas: &'a AreaStore,
    pub draft: &'a [DraftPoint],
    pub selected: Option<AreaId>,
}

/// Paint a full frame: base drawing, areas, then the draft polygon.
///
/// # Errors
///
/// Stops at the first surface error and returns it.
pub fn redraw<S: Surface>(surface: &mut S, scene: &Scene<'_>) -> Result<(), S::Error> {
    surface.repaint_base(scene.camera, scene.primitives)?;

    let open_editors = scene.areas.open_editor_ids();
    for area in scene.areas.active_areas() {
        let outline = to_screen(scene.camera, area.coordinates.iter().copied());
        surface.fill_polygon(&outline, &area.color, AREA_FILL_ALPHA)?;
        surface.stroke_path(&outline, true, Stroke { color: &area.color, width: AREA_STROKE_PX, dashed: false })?;

        if scene.selected == Some(area.id) || open_editors.contains(&area.id) {
            let highlight = Stroke { color: HIGHLIGHT_COLOR, width: HIGHLIGHT_STROKE_PX, dashed: true };
            surface.stroke_path(&outline, true, highlight)?;
        }
    }

    draw_draft(surface, scene.camera, scene.draft)
}

fn draw_draft<S: Surface>(surface: &mut S, camera: &Camera, draft: &[DraftPoint]) -> Result<(), S::Error> {
    let points = to_screen(camera, draft.iter().map(|d| d.point));

    if points.len() > 1 {
        surface.stroke_path(&points, false, Stroke { color: DRAFT_COLOR, width: DRAFT_STROKE_PX, dashed: true })?;
    }

    for (d, p) in draft.iter().zip(&points) {
        let color = if d.on_boundary { SNAPPED_POINT_COLOR } else { DRAFT_COLOR };
        surface.fill_dot(*p, DRAFT_POINT_RADIUS_PX, color)?;
    }

    if points.len() >= MIN_AREA_POINTS {
        if let Some(first) = points.first() {
            let ring = Stroke { color: DRAFT_COLOR, width: DRAFT_STROKE_PX, dashed: false };
            surface.stroke_ring(*first, FIRST_POINT_RING_PX, ring)?;
        }
    }
    Ok(())
}

fn to_screen(camera: &Camera, world: impl Iterator<Item = Point>) -> Vec<Point> {
    world.map(|p| camera.world_to_screen(p)).collect()
}

// =============================================================
// Canvas2D surface
// =============================================================

/// [`Surface`] over a browser 2D context.
pub struct CanvasSurface<'a> {
    ctx: &'a CanvasRenderingContext2d,
    viewport_w: f64,
    viewport_h: f64,
    dpr: f64,
}

impl<'a> CanvasSurface<'a> {
    /// Wrap a context. Viewport size is in CSS pixels.
    #[must_use]
    pub fn new(ctx: &'a CanvasRenderingContext2d, viewport_w: f64, viewport_h: f64, dpr: f64) -> Self {
        Self { ctx, viewport_w, viewport_h, dpr }
    }

    fn trace(&self, points: &[Point], closed: bool) {
        self.ctx.begin_path();
        for (i, p) in points.iter().enumerate() {
            if i == 0 {
                self.ctx.move_to(p.x, p.y);
            } else {
                self.ctx.line_to(p.x, p.y);
            }
        }
        if closed {
            self.ctx.close_path();
        }
    }

    fn set_dash(&self, dashed: bool) -> Result<(), JsValue> {
        let dash_array = js_sys::Array::new();
        if dashed {
            dash_array.push(&JsValue::from_f64(DASH_PX));
            dash_array.push(&JsValue::from_f64(DASH_PX));
        }
        self.ctx.set_line_dash(&dash_array)
    }
}

impl Surface for CanvasSurface<'_> {
    type Error = JsValue;

    fn repaint_base(&mut self, camera: &Camera, primitives: &[Primitive]) -> Result<(), JsValue> {
        let ctx = self.ctx;
        ctx.set_transform(self.dpr, 0.0, 0.0, self.dpr, 0.0, 0.0)?;
        ctx.clear_rect(0.0, 0.0, self.viewport_w, self.viewport_h);
        ctx.set_fill_style_str(BACKGROUND_COLOR);
        ctx.fill_rect(0.0, 0.0, self.viewport_w, self.viewport_h);

        ctx.save();
        ctx.translate(camera.offset_x, camera.offset_y)?;
        ctx.scale(camera.scale, camera.scale)?;
        ctx.set_stroke_style_str(PRIMITIVE_COLOR);
        ctx.set_fill_style_str(PRIMITIVE_COLOR);
        ctx.set_line_width(1.0 / camera.scale);
        for primitive in primitives {
            draw_primitive(ctx, primitive.shape())?;
        }
        ctx.restore();
        Ok(())
    }

    fn fill_polygon(&mut self, points: &[Point], color: &str, alpha: f64) -> Result<(), JsValue> {
        self.trace(points, true);
        self.ctx.set_global_alpha(alpha);
        self.ctx.set_fill_style_str(color);
        self.ctx.fill();
        self.ctx.set_global_alpha(1.0);
        Ok(())
    }

    fn stroke_path(&mut self, points: &[Point], closed: bool, stroke: Stroke<'_>) -> Result<(), JsValue> {
        self.trace(points, closed);
        self.set_dash(stroke.dashed)?;
        self.ctx.set_stroke_style_str(stroke.color);
        self.ctx.set_line_width(stroke.width);
        self.ctx.stroke();
        self.set_dash(false)
    }

    fn fill_dot(&mut self, center: Point, radius: f64, color: &str) -> Result<(), JsValue> {
        self.ctx.begin_path();
        self.ctx.arc(center.x, center.y, radius, 0.0, TAU)?;
        self.ctx.set_fill_style_str(color);
        self.ctx.fill();
        Ok(())
    }

    fn stroke_ring(&mut self, center: Point, radius: f64, stroke: Stroke<'_>) -> Result<(), JsValue> {
        self.ctx.begin_path();
        self.ctx.arc(center.x, center.y, radius, 0.0, TAU)?;
        self.set_dash(stroke.dashed)?;
        self.ctx.set_stroke_style_str(stroke.color);
        self.ctx.set_line_width(stroke.width);
        self.ctx.stroke();
        self.set_dash(false)
    }
}

/// Draw one primitive in world space. The context is already scaled; Y is
/// negated here.
fn draw_primitive(ctx: &CanvasRenderingContext2d, shape: Shape<'_>) -> Result<(), JsValue> {
    match shape {
        Shape::Line { a, b } => {
            ctx.begin_path();
            ctx.move_to(a.x, -a.y);
            ctx.line_to(b.x, -b.y);
            ctx.stroke();
        }
        Shape::Circle { center, radius } => {
            ctx.begin_path();
            ctx.arc(center.x, -center.y, radius, 0.0, TAU)?;
            ctx.stroke();
        }
        Shape::Ellipse { center, major_radius, minor_radius, rotation_deg, filled } => {
            ctx.begin_path();
            ctx.ellipse(center.x, -center.y, major_radius, minor_radius, -rotation_deg.to_radians(), 0.0, TAU)?;
            if filled {
                ctx.fill();
            } else {
                ctx.stroke();
            }
        }
        Shape::Arc { center, radius, start_angle, end_angle } => {
            // Angles in the band `classify_arc` rejects as ambiguous are still drawn, as radians.
            let (start, end) = if start_angle.abs().max(end_angle.abs()) > DEGREE_MAGNITUDE_FLOOR {
                (start_angle.to_radians(), end_angle.to_radians())
            } else {
                (start_angle, end_angle)
            };
            // Mirroring Y turns counter-clockwise sweeps clockwise.
            ctx.begin_path();
            ctx.arc_with_anticlockwise(center.x, -center.y, radius, -start, -end, true)?;
            ctx.stroke();
        }
        Shape::Polyline { points, closed } => {
            let Some((first, rest)) = points.split_first() else {
                return Ok(());
            };
            ctx.begin_path();
            ctx.move_to(first.x, -first.y);
            for p in rest {
                ctx.line_to(p.x, -p.y);
            }
            if closed {
                ctx.close_path();
            }
            ctx.stroke();
        }
        Shape::Text { anchor, text, height } => {
            if text.is_empty() {
                return Ok(());
            }
            ctx.save();
            ctx.set_font(&format!("{height}px Arial"));
            ctx.fill_text(text, anchor.x, -anchor.y)?;
            ctx.restore();
        }
        Shape::None => {}
    }
    Ok(())
}
