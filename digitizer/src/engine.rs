use tracing::{debug, info, warn};
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

use crate::areas::{Area, AreaError, AreaField, AreaId, AreaStore, EditBuffer, PersistedArea};
use crate::camera::{Camera, Point};
use crate::consts::{DEFAULT_VIEWPORT_H, DEFAULT_VIEWPORT_W, ZOOM_IN_FACTOR, ZOOM_OUT_FACTOR};
use crate::input::{Button, InputState, Key, Tool, UiState, WheelDelta};
use crate::primitive::{Primitive, drawing_bounds};
use crate::regions::{ClosedRegion, extract_regions};
use crate::render::{CanvasSurface, Scene, redraw};
use crate::session::{ClickOutcome, DrawingSession, RejectReason};

#[cfg(test)]
#[path = "engine_test.rs"]
mod engine_test;

/// Actions returned from handlers for the host to process.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// A completed polygon became a draft area.
    AreaCreated { id: AreaId },
    /// An area's metadata changed.
    AreaUpdated { id: AreaId },
    /// An area was deleted (removed, or tombstoned until saved).
    AreaDeleted { id: AreaId },
    /// A store operation failed; the host may show the message.
    StoreError(AreaError),
    /// A drawing click was refused; nothing changed.
    ClickRejected(RejectReason),
    /// A polygon closed with zero area and was dropped.
    DraftDiscarded,
    SelectionChanged(Option<AreaId>),
    EditorOpened { id: AreaId },
    EditorClosed { id: AreaId },
    SetCursor(String),
    RenderNeeded,
}

/// Core engine state: everything that doesn't depend on the canvas element.
///
/// Separated from `Engine` so it can be tested without a browser.
pub struct EngineCore {
    pub primitives: Vec<Primitive>,
    /// Derived from `primitives`; rebuilt on every load.
    pub regions: Vec<ClosedRegion>,
    pub camera: Camera,
    pub session: DrawingSession,
    pub areas: AreaStore,
    pub ui: UiState,
    pub input: InputState,
    pub viewport_width: f64,
    pub viewport_height: f64,
    pub dpr: f64,
}

impl Default for EngineCore {
    fn default() -> Self {
        Self {
            primitives: Vec::new(),
            regions: Vec::new(),
            camera: Camera::default(),
            session: DrawingSession::new(),
            areas: AreaStore::new(),
            ui: UiState::default(),
            input: InputState::default(),
            viewport_width: DEFAULT_VIEWPORT_W,
            viewport_height: DEFAULT_VIEWPORT_H,
            dpr: 1.0,
        }
    }
}

impl EngineCore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // --- Data inputs ---

    /// Replace the drawing and recompute its closed regions.
    pub fn load_primitives(&mut self, primitives: Vec<Primitive>) -> Vec<Action> {
        self.regions = extract_regions(&primitives);
        self.primitives = primitives;
        info!(primitives = self.primitives.len(), regions = self.regions.len(), "drawing loaded");
        vec![Action::RenderNeeded]
    }

    /// Hydrate saved areas. Areas the store refuses are skipped and logged.
    pub fn load_areas(&mut self, areas: Vec<PersistedArea>) -> Vec<Action> {
        for area in areas {
            let id = area.id;
            if let Err(e) = self.areas.load_persisted(area) {
                warn!(area_id = id, error = %e, "skipping persisted area");
            }
        }
        vec![Action::RenderNeeded]
    }

    // --- Tools / modes ---

    /// Switch tools. Entering `Draw` starts a drawing session; leaving it
    /// discards any unfinished draft.
    pub fn set_tool(&mut self, tool: Tool) -> Vec<Action> {
        if tool == Tool::Draw {
            self.session.activate();
        } else {
            self.session.deactivate();
        }
        self.ui.tool = tool;
        self.input = InputState::Idle;
        vec![Action::SetCursor(tool.cursor().to_owned()), Action::RenderNeeded]
    }

    pub fn activate_drawing(&mut self) -> Vec<Action> {
        self.set_tool(Tool::Draw)
    }

    /// Leave drawing mode for the pan tool.
    pub fn deactivate_drawing(&mut self) -> Vec<Action> {
        self.set_tool(Tool::Pan)
    }

    /// Whether the drawing session holds an unfinished polygon.
    #[must_use]
    pub fn has_incomplete_draft(&self) -> bool {
        self.session.has_incomplete()
    }

    /// Drop the unfinished polygon, staying in drawing mode.
    pub fn clear_draft(&mut self) -> Vec<Action> {
        self.session.clear();
        vec![Action::RenderNeeded]
    }

    // --- Input events ---

    /// A click (pointer released without dragging), dispatched by tool.
    pub fn on_click(&mut self, screen_pt: Point) -> Vec<Action> {
        match self.ui.tool {
            Tool::Draw => self.draw_click(screen_pt),
            Tool::Erase => {
                let world = self.camera.screen_to_world(screen_pt);
                match self.areas.area_at(world).map(|a| a.id) {
                    Some(id) => self.delete_area(id),
                    None => Vec::new(),
                }
            }
            Tool::Pan => {
                let world = self.camera.screen_to_world(screen_pt);
                match self.areas.area_at(world).map(|a| a.id) {
                    Some(id) => self.on_area_clicked(id),
                    None => self.clear_selection(),
                }
            }
        }
    }

    fn draw_click(&mut self, screen_pt: Point) -> Vec<Action> {
        let outlines = self.areas.active_areas().map(|a| a.coordinates.as_slice());
        match self.session.click(screen_pt, &self.camera, &self.regions, outlines) {
            ClickOutcome::Ignored => Vec::new(),
            ClickOutcome::Rejected(reason) => {
                debug!(?reason, "click rejected");
                vec![Action::ClickRejected(reason)]
            }
            ClickOutcome::Added(_) => vec![Action::RenderNeeded],
            ClickOutcome::Completed { points, .. } => self.on_area_completed(points),
            ClickOutcome::Discarded => vec![Action::DraftDiscarded, Action::RenderNeeded],
        }
    }

    /// `Escape` removes the last draft point.
    pub fn on_key_down(&mut self, key: &Key) -> Vec<Action> {
        if key.is_escape() && self.session.undo_last() {
            return vec![Action::RenderNeeded];
        }
        Vec::new()
    }

    /// Start panning when the pan tool is active.
    pub fn on_pointer_down(&mut self, screen_pt: Point, button: Button) -> Vec<Action> {
        if self.ui.tool.pans() && button == Button::Primary {
            self.input = InputState::Panning { last_screen: screen_pt };
            return vec![Action::SetCursor("grabbing".to_owned())];
        }
        Vec::new()
    }

    pub fn on_pointer_move(&mut self, screen_pt: Point) -> Vec<Action> {
        let InputState::Panning { last_screen } = &mut self.input else {
            return Vec::new();
        };
        let (dx, dy) = (screen_pt.x - last_screen.x, screen_pt.y - last_screen.y);
        *last_screen = screen_pt;
        self.camera.pan_by(dx, dy);
        vec![Action::RenderNeeded]
    }

    pub fn on_pointer_up(&mut self, _screen_pt: Point, _button: Button) -> Vec<Action> {
        if matches!(self.input, InputState::Panning { .. }) {
            self.input = InputState::Idle;
            return vec![Action::SetCursor(self.ui.tool.cursor().to_owned())];
        }
        Vec::new()
    }

    /// Zoom around the cursor: wheel down zooms out, wheel up zooms in.
    pub fn on_wheel(&mut self, screen_pt: Point, delta: WheelDelta) -> Vec<Action> {
        let factor = if delta.dy > 0.0 {
            ZOOM_OUT_FACTOR
        } else if delta.dy < 0.0 {
            ZOOM_IN_FACTOR
        } else {
            return Vec::new();
        };
        self.camera.zoom_at(screen_pt, factor);
        vec![Action::RenderNeeded]
    }

    // --- Viewport ---

    /// Update viewport dimensions (CSS pixels) and device pixel ratio.
    pub fn set_viewport(&mut self, width_css: f64, height_css: f64, dpr: f64) -> Vec<Action> {
        self.viewport_width = width_css;
        self.viewport_height = height_css;
        self.dpr = dpr;
        vec![Action::RenderNeeded]
    }

    /// Fit the drawing into the viewport. No-op for an empty drawing.
    pub fn fit_to_view(&mut self) -> Vec<Action> {
        let Some(bounds) = drawing_bounds(&self.primitives) else {
            return Vec::new();
        };
        self.camera = Camera::fit(&bounds, self.viewport_width, self.viewport_height);
        debug!(scale = self.camera.scale, "fit to view");
        vec![Action::RenderNeeded]
    }

    // --- Areas ---

    /// Turn a completed polygon into a draft area.
    pub fn on_area_completed(&mut self, coordinates: Vec<Point>) -> Vec<Action> {
        match self.areas.create_draft(coordinates) {
            Ok(id) => vec![Action::AreaCreated { id }, Action::RenderNeeded],
            Err(e) => vec![Action::StoreError(e)],
        }
    }

    /// Select an area and open its editor.
    pub fn on_area_clicked(&mut self, id: AreaId) -> Vec<Action> {
        let mut actions = match self.areas.open_editor(id) {
            Ok(true) => vec![Action::EditorOpened { id }],
            Ok(false) => Vec::new(),
            Err(e) => return vec![Action::StoreError(e)],
        };
        self.ui.selected_id = Some(id);
        actions.push(Action::SelectionChanged(Some(id)));
        actions.push(Action::RenderNeeded);
        actions
    }

    fn clear_selection(&mut self) -> Vec<Action> {
        if self.ui.selected_id.take().is_none() {
            return Vec::new();
        }
        vec![Action::SelectionChanged(None), Action::RenderNeeded]
    }

    pub fn delete_area(&mut self, id: AreaId) -> Vec<Action> {
        let had_editor = self.areas.editor(id).is_some();
        if let Err(e) = self.areas.delete(id) {
            return vec![Action::StoreError(e)];
        }

        let mut actions = vec![Action::AreaDeleted { id }];
        if had_editor {
            actions.push(Action::EditorClosed { id });
        }
        if self.ui.selected_id == Some(id) {
            self.ui.selected_id = None;
            actions.push(Action::SelectionChanged(None));
        }
        actions.push(Action::RenderNeeded);
        actions
    }

    /// Set one metadata field directly, bypassing any editor.
    pub fn edit_area(&mut self, id: AreaId, field: AreaField, value: &str) -> Vec<Action> {
        match self.areas.edit(id, field, value) {
            Ok(()) => vec![Action::AreaUpdated { id }, Action::RenderNeeded],
            Err(e) => vec![Action::StoreError(e)],
        }
    }

    // --- Editors ---

    pub fn open_editor(&mut self, id: AreaId) -> Vec<Action> {
        match self.areas.open_editor(id) {
            Ok(true) => vec![Action::EditorOpened { id }, Action::RenderNeeded],
            Ok(false) => Vec::new(),
            Err(e) => vec![Action::StoreError(e)],
        }
    }

    pub fn close_editor(&mut self, id: AreaId) -> Vec<Action> {
        if self.areas.close_editor(id) {
            vec![Action::EditorClosed { id }, Action::RenderNeeded]
        } else {
            Vec::new()
        }
    }

    pub fn close_all_editors(&mut self) -> Vec<Action> {
        let ids = self.areas.open_editor_ids();
        if ids.is_empty() {
            return Vec::new();
        }
        self.areas.close_all_editors();
        let mut actions: Vec<Action> = ids.into_iter().map(|id| Action::EditorClosed { id }).collect();
        actions.push(Action::RenderNeeded);
        actions
    }

    pub fn update_editor(&mut self, id: AreaId, field: AreaField, value: &str) -> Vec<Action> {
        match self.areas.update_editor(id, field, value) {
            Ok(()) => vec![Action::RenderNeeded],
            Err(e) => vec![Action::StoreError(e)],
        }
    }

    /// Apply an editor's buffer to its area and close it.
    pub fn commit_editor(&mut self, id: AreaId) -> Vec<Action> {
        match self.areas.commit_editor(id) {
            Ok(()) => vec![Action::AreaUpdated { id }, Action::EditorClosed { id }, Action::RenderNeeded],
            Err(e) => vec![Action::StoreError(e)],
        }
    }

    // --- Queries ---

    #[must_use]
    pub fn active_areas(&self) -> Vec<&Area> {
        self.areas.active_areas().collect()
    }

    #[must_use]
    pub fn editor(&self, id: AreaId) -> Option<&EditBuffer> {
        self.areas.editor(id)
    }

    #[must_use]
    pub fn open_editor_ids(&self) -> Vec<AreaId> {
        self.areas.open_editor_ids()
    }

    #[must_use]
    pub fn selection(&self) -> Option<AreaId> {
        self.ui.selected_id
    }

    #[must_use]
    pub fn camera(&self) -> Camera {
        self.camera
    }

    /// Everything the renderer needs for one frame.
    #[must_use]
    pub fn scene(&self) -> Scene<'_> {
        Scene {
            camera: &self.camera,
            primitives: &self.primitives,
            areas: &self.areas,
            draft: self.session.points(),
            selected: self.ui.selected_id,
        }
    }
}

/// The full engine. Wraps `EngineCore` and owns the browser canvas element.
pub struct Engine {
    canvas: HtmlCanvasElement,
    pub core: EngineCore,
}

impl Engine {
    /// Create a new engine bound to the given canvas element.
    #[must_use]
    pub fn new(canvas: HtmlCanvasElement) -> Self {
        Self { canvas, core: EngineCore::new() }
    }

    // --- Delegated handlers ---

    pub fn load_primitives(&mut self, primitives: Vec<Primitive>) -> Vec<Action> {
        self.core.load_primitives(primitives)
    }

    pub fn load_areas(&mut self, areas: Vec<PersistedArea>) -> Vec<Action> {
        self.core.load_areas(areas)
    }

    pub fn set_tool(&mut self, tool: Tool) -> Vec<Action> {
        self.core.set_tool(tool)
    }

    pub fn on_click(&mut self, screen_pt: Point) -> Vec<Action> {
        self.core.on_click(screen_pt)
    }

    pub fn on_key_down(&mut self, key: &Key) -> Vec<Action> {
        self.core.on_key_down(key)
    }

    pub fn on_pointer_down(&mut self, screen_pt: Point, button: Button) -> Vec<Action> {
        self.core.on_pointer_down(screen_pt, button)
    }

    pub fn on_pointer_move(&mut self, screen_pt: Point) -> Vec<Action> {
        self.core.on_pointer_move(screen_pt)
    }

    pub fn on_pointer_up(&mut self, screen_pt: Point, button: Button) -> Vec<Action> {
        self.core.on_pointer_up(screen_pt, button)
    }

    pub fn on_wheel(&mut self, screen_pt: Point, delta: WheelDelta) -> Vec<Action> {
        self.core.on_wheel(screen_pt, delta)
    }

    pub fn set_viewport(&mut self, width_css: f64, height_css: f64, dpr: f64) -> Vec<Action> {
        self.core.set_viewport(width_css, height_css, dpr)
    }

    pub fn fit_to_view(&mut self) -> Vec<Action> {
        self.core.fit_to_view()
    }

    // --- Render ---

    /// Draw the current state to the canvas.
    ///
    /// # Errors
    ///
    /// Returns `Err` if the 2D context is unavailable or any `Canvas2D` call
    /// fails.
    pub fn render(&self) -> Result<(), JsValue> {
        let ctx = self
            .canvas
            .get_context("2d")?
            .ok_or_else(|| JsValue::from_str("2d context unavailable"))?
            .dyn_into::<CanvasRenderingContext2d>()?;

        let core = &self.core;
        let mut surface = CanvasSurface::new(&ctx, core.viewport_width, core.viewport_height, core.dpr);
        redraw(&mut surface, &core.scene())
    }
}
