//! Closed-region extraction: which parts of the drawing bound an interior.
//!
//! Areas may only be drawn inside a closed region. The extractor reduces
//! the heterogeneous primitive list to circles and polygons; anything that
//! cannot be shown to be closed is left out, since a false region would let
//! users digitize zones that match no real boundary.

#[cfg(test)]
#[path = "regions_test.rs"]
mod regions_test;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::camera::Point;
use crate::consts::{
    DEGREE_MAGNITUDE_FLOOR, ENDPOINT_MERGE_TOLERANCE, FULL_TURN_TOLERANCE_DEG, MIN_FALLBACK_LINES,
    RADIAN_MAGNITUDE_LIMIT,
};
use crate::geometry::{canonical_ring, is_closed_polyline, point_in_circle, point_in_polygon, point_to_segment_distance};
use crate::primitive::{Primitive, Shape};

/// A closed shape derived from the drawing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ClosedRegion {
    Circle { center: Point, radius: f64 },
    Polygon { vertices: Vec<Point> },
}

impl ClosedRegion {
    /// Whether `p` lies in the region's interior (or on a circle's rim).
    #[must_use]
    pub fn contains(&self, p: Point) -> bool {
        match self {
            Self::Circle { center, radius } => point_in_circle(p, *center, *radius),
            Self::Polygon { vertices } => point_in_polygon(p, vertices),
        }
    }

    /// World-space distance from `p` to the region's outline.
    #[must_use]
    pub fn boundary_distance(&self, p: Point) -> f64 {
        match self {
            Self::Circle { center, radius } => (p.distance(*center) - radius).abs(),
            Self::Polygon { vertices } => ring_edges(vertices)
                .map(|(a, b)| point_to_segment_distance(p, a, b))
                .fold(f64::INFINITY, f64::min),
        }
    }
}

/// Consecutive vertex pairs of a ring, including the closing edge.
fn ring_edges(vertices: &[Point]) -> impl Iterator<Item = (Point, Point)> + '_ {
    let n = vertices.len();
    (0..n).map(move |i| (vertices[i], vertices[(i + 1) % n]))
}

/// How an arc's angular span reads once its units are resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArcSpan {
    FullTurn,
    Partial,
    /// Angle magnitudes fit neither radians nor degrees.
    Ambiguous,
}

/// Classify an arc span. Magnitudes up to 2π are radians, above 7 are
/// degrees; a span of exactly zero or within 1° of 360° is a full turn.
#[must_use]
pub fn classify_arc(start_angle: f64, end_angle: f64) -> ArcSpan {
    let magnitude = start_angle.abs().max(end_angle.abs());
    let (start_deg, end_deg) = if magnitude <= RADIAN_MAGNITUDE_LIMIT {
        (start_angle.to_degrees(), end_angle.to_degrees())
    } else if magnitude > DEGREE_MAGNITUDE_FLOOR {
        (start_angle, end_angle)
    } else {
        return ArcSpan::Ambiguous;
    };

    let span = (end_deg - start_deg).abs();
    if span == 0.0 || (span - 360.0).abs() <= FULL_TURN_TOLERANCE_DEG {
        ArcSpan::FullTurn
    } else {
        ArcSpan::Partial
    }
}

/// Reduce a primitive list to the closed regions it bounds.
///
/// Pure and order-insensitive in meaning; the output order follows the
/// input, with the line-segment fallback region (if any) last.
#[must_use]
pub fn extract_regions(primitives: &[Primitive]) -> Vec<ClosedRegion> {
    let mut regions = Vec::new();
    let mut line_endpoints = Vec::new();

    for primitive in primitives {
        match primitive.shape() {
            Shape::Circle { center, radius } => regions.push(ClosedRegion::Circle { center, radius }),
            Shape::Ellipse { center, major_radius, minor_radius, .. } => {
                regions.push(ClosedRegion::Circle { center, radius: major_radius.max(minor_radius) });
            }
            Shape::Arc { center, radius, start_angle, end_angle } => {
                if classify_arc(start_angle, end_angle) == ArcSpan::FullTurn {
                    regions.push(ClosedRegion::Circle { center, radius });
                }
            }
            Shape::Polyline { points, closed } => {
                if points.len() >= 3 && is_closed_polyline(points, closed) {
                    regions.push(ClosedRegion::Polygon { vertices: canonical_ring(points) });
                }
            }
            Shape::Line { a, b } => {
                line_endpoints.push(a);
                line_endpoints.push(b);
            }
            Shape::Text { .. } | Shape::None => {}
        }
    }

    if let Some(region) = polygon_from_segments(&line_endpoints) {
        regions.push(region);
    }

    debug!(primitives = primitives.len(), regions = regions.len(), "extracted closed regions");
    regions
}

/// Best-effort region from loose line segments: every distinct endpoint, in
/// first-seen order. Needs at least [`MIN_FALLBACK_LINES`] segments.
/// Connectivity is not checked, so open or crossing segment sets also
/// produce a polygon.
fn polygon_from_segments(endpoints: &[Point]) -> Option<ClosedRegion> {
    if endpoints.len() / 2 < MIN_FALLBACK_LINES {
        return None;
    }
    let mut unique: Vec<Point> = Vec::new();
    for p in endpoints {
        let duplicate = unique.iter().any(|u| {
            (u.x - p.x).abs() < ENDPOINT_MERGE_TOLERANCE && (u.y - p.y).abs() < ENDPOINT_MERGE_TOLERANCE
        });
        if !duplicate {
            unique.push(*p);
        }
    }

    (unique.len() >= 3).then_some(ClosedRegion::Polygon { vertices: unique })
}

/// Whether any region contains `p`.
#[must_use]
pub fn any_contains(regions: &[ClosedRegion], p: Point) -> bool {
    regions.iter().any(|r| r.contains(p))
}

/// Smallest distance from `p` to any region outline, if there are regions.
#[must_use]
pub fn nearest_boundary_distance(regions: &[ClosedRegion], p: Point) -> Option<f64> {
    regions.iter().map(|r| r.boundary_distance(p)).reduce(f64::min)
}
