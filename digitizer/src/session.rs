//! Drawing session: the click-by-click polygon builder.
//!
//! A session is either inactive or collecting draft points. Each click is
//! validated against committed areas and closed regions, then either closes
//! the polygon (near the first point, or after two boundary snaps) or
//! becomes a new draft point. Clicks are processed strictly in arrival
//! order: the first point anchors proximity closure.

#[cfg(test)]
#[path = "session_test.rs"]
mod session_test;

use tracing::debug;

use crate::camera::{Camera, Point};
use crate::consts::{CLOSE_DISTANCE_PX, MIN_AREA_POINTS, SNAP_DISTANCE_PX, SNAP_POINTS_TO_CLOSE};
use crate::geometry::{point_in_polygon, polygon_area};
use crate::regions::{ClosedRegion, any_contains, nearest_boundary_distance};

/// A provisionally clicked vertex.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DraftPoint {
    /// World-space position.
    pub point: Point,
    /// Whether the click landed within snapping distance of a region edge.
    pub on_boundary: bool,
}

/// Session state.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum SessionState {
    /// Drawing mode is off.
    #[default]
    Inactive,
    /// Drawing mode is on; holds the draft points in click order.
    Collecting(Vec<DraftPoint>),
}

/// Why a click was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// The point falls inside an existing area; areas never overlap.
    InsideArea,
    /// No closed region contains the point.
    OutsideRegions,
}

/// How a polygon was closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Closure {
    /// The click came back near the first point.
    FirstPoint,
    /// Enough points were snapped onto region edges.
    BoundarySnap,
}

/// Result of feeding one click to the session.
#[derive(Debug, Clone, PartialEq)]
pub enum ClickOutcome {
    /// The session is inactive; nothing happened.
    Ignored,
    /// The click was refused; the draft is unchanged.
    Rejected(RejectReason),
    /// The click became a new draft point.
    Added(DraftPoint),
    /// The polygon closed. The first point is not repeated at the end.
    Completed { points: Vec<Point>, closure: Closure },
    /// The polygon closed with zero area and was dropped.
    Discarded,
}

/// Click-driven polygon builder.
#[derive(Debug, Clone, Default)]
pub struct DrawingSession {
    state: SessionState,
}

impl DrawingSession {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Enter drawing mode. Keeps the current draft if already collecting.
    pub fn activate(&mut self) {
        if matches!(self.state, SessionState::Inactive) {
            self.state = SessionState::Collecting(Vec::new());
        }
    }

    /// Leave drawing mode, discarding any unfinished draft.
    pub fn deactivate(&mut self) {
        self.state = SessionState::Inactive;
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        matches!(self.state, SessionState::Collecting(_))
    }

    #[must_use]
    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Draft points in click order (empty when inactive).
    #[must_use]
    pub fn points(&self) -> &[DraftPoint] {
        match &self.state {
            SessionState::Inactive => &[],
            SessionState::Collecting(points) => points,
        }
    }

    /// Whether an unfinished draft exists.
    #[must_use]
    pub fn has_incomplete(&self) -> bool {
        !self.points().is_empty()
    }

    /// Drop the most recent draft point. Returns `false` if there was none.
    pub fn undo_last(&mut self) -> bool {
        match &mut self.state {
            SessionState::Collecting(points) => points.pop().is_some(),
            SessionState::Inactive => false,
        }
    }

    /// Drop every draft point but stay in drawing mode.
    pub fn clear(&mut self) {
        if let SessionState::Collecting(points) = &mut self.state {
            points.clear();
        }
    }

    /// Process a click at `screen_pt`.
    ///
    /// `areas` are the outlines of committed, non-deleted areas; clicks
    /// inside any of them are refused.
    pub fn click<'a, I>(&mut self, screen_pt: Point, camera: &Camera, regions: &[ClosedRegion], areas: I) -> ClickOutcome
    where
        I: IntoIterator<Item = &'a [Point]>,
    {
        let SessionState::Collecting(points) = &mut self.state else {
            return ClickOutcome::Ignored;
        };

        let world = camera.screen_to_world(screen_pt);

        if areas.into_iter().any(|outline| point_in_polygon(world, outline)) {
            return ClickOutcome::Rejected(RejectReason::InsideArea);
        }
        if !any_contains(regions, world) {
            return ClickOutcome::Rejected(RejectReason::OutsideRegions);
        }

        if points.len() >= MIN_AREA_POINTS {
            if let Some(first) = points.first() {
                if camera.world_dist_to_screen(world.distance(first.point)) <= CLOSE_DISTANCE_PX {
                    let finished = std::mem::take(points);
                    return complete(&finished, Closure::FirstPoint);
                }
            }
        }

        let on_boundary = nearest_boundary_distance(regions, world)
            .is_some_and(|d| camera.world_dist_to_screen(d) <= SNAP_DISTANCE_PX);
        let draft = DraftPoint { point: world, on_boundary };
        points.push(draft);

        let snapped = points.iter().filter(|p| p.on_boundary).count();
        if snapped >= SNAP_POINTS_TO_CLOSE && points.len() >= MIN_AREA_POINTS {
            let finished = std::mem::take(points);
            return complete(&finished, Closure::BoundarySnap);
        }

        ClickOutcome::Added(draft)
    }
}

fn complete(draft: &[DraftPoint], closure: Closure) -> ClickOutcome {
    let points: Vec<Point> = draft.iter().map(|p| p.point).collect();
    let area = polygon_area(&points);
    if area <= 0.0 {
        debug!(points = points.len(), "discarding zero-area polygon");
        return ClickOutcome::Discarded;
    }
    debug!(points = points.len(), area, ?closure, "polygon completed");
    ClickOutcome::Completed { points, closure }
}
