//! Vector primitives produced by the external CAD parser.
//!
//! The parser speaks several dialects (Aspose-style `Cad*` entities, DWF
//! whip entities, and dxf-parser's upper-case entities). They all decode
//! into [`Primitive`] through the internal `type` tag. A single malformed
//! entity never poisons the whole drawing: [`decode_primitives`] skips it
//! and logs a warning.

#[cfg(test)]
#[path = "primitive_test.rs"]
mod primitive_test;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::camera::Point;
use crate::consts::DEFAULT_TEXT_HEIGHT;
use crate::geometry::Bounds;

/// A single drawing entity in world coordinates (Y-up).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all_fields = "camelCase")]
pub enum Primitive {
    /// Straight segment with flat endpoint fields.
    CadLine { start_x: f64, start_y: f64, end_x: f64, end_y: f64 },
    /// Straight segment given as a vertex list (first two vertices are used).
    #[serde(rename = "LINE")]
    DxfLine { vertices: Vec<Point> },
    /// Circle with flat center fields.
    CadCircle { center_x: f64, center_y: f64, radius: f64 },
    /// Circle with a nested center point.
    #[serde(rename = "CIRCLE")]
    DxfCircle { center: Point, radius: f64 },
    /// Circular arc with flat center fields. Angles may be degrees or radians.
    CadArc {
        center_x: f64,
        center_y: f64,
        radius: f64,
        #[serde(default)]
        start_angle: Option<f64>,
        #[serde(default)]
        end_angle: Option<f64>,
    },
    /// Circular arc with a nested center point.
    #[serde(rename = "ARC")]
    DxfArc {
        center: Point,
        radius: f64,
        #[serde(default)]
        start_angle: Option<f64>,
        #[serde(default)]
        end_angle: Option<f64>,
    },
    /// Ellipse, outlined or filled.
    #[serde(alias = "DwfWhipFilledEllipse")]
    DwfWhipOutlineEllipse {
        center_x: f64,
        center_y: f64,
        major_radius: f64,
        minor_radius: f64,
        /// Rotation of the major axis in degrees.
        #[serde(default)]
        rotation: f64,
        #[serde(default)]
        filled: bool,
    },
    /// Lightweight polyline; `closed` marks an explicit closing segment.
    CadLwPolyline {
        points: Vec<Point>,
        #[serde(default)]
        closed: bool,
    },
    /// Open DWF polyline.
    DwfWhipPolyline { points: Vec<Point> },
    /// DWF polygon.
    DwfWhipPolygon {
        points: Vec<Point>,
        #[serde(default)]
        closed: bool,
    },
    /// dxf-parser polyline; `shape` is the closed flag.
    #[serde(rename = "LWPOLYLINE", alias = "POLYLINE")]
    DxfPolyline {
        vertices: Vec<Point>,
        #[serde(default)]
        shape: bool,
    },
    /// Single or multi-line text anchored at `(x, y)`.
    #[serde(alias = "CadMText", alias = "TEXT", alias = "MTEXT")]
    CadText {
        x: f64,
        y: f64,
        text: String,
        #[serde(default)]
        height: Option<f64>,
    },
    /// Any entity type this crate does not understand.
    #[serde(other)]
    Unknown,
}

/// Canonical view of a primitive, independent of its source dialect.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Shape<'a> {
    Line { a: Point, b: Point },
    Circle { center: Point, radius: f64 },
    Ellipse { center: Point, major_radius: f64, minor_radius: f64, rotation_deg: f64, filled: bool },
    Arc { center: Point, radius: f64, start_angle: f64, end_angle: f64 },
    Polyline { points: &'a [Point], closed: bool },
    Text { anchor: Point, text: &'a str, height: f64 },
    None,
}

impl Primitive {
    /// The dialect-independent shape of this primitive.
    #[must_use]
    pub fn shape(&self) -> Shape<'_> {
        match self {
            Self::CadLine { start_x, start_y, end_x, end_y } => {
                Shape::Line { a: Point::new(*start_x, *start_y), b: Point::new(*end_x, *end_y) }
            }
            Self::DxfLine { vertices } => match vertices.as_slice() {
                [a, b, ..] => Shape::Line { a: *a, b: *b },
                _ => Shape::None,
            },
            Self::CadCircle { center_x, center_y, radius } => {
                Shape::Circle { center: Point::new(*center_x, *center_y), radius: *radius }
            }
            Self::DxfCircle { center, radius } => Shape::Circle { center: *center, radius: *radius },
            Self::CadArc { center_x, center_y, radius, start_angle, end_angle } => Shape::Arc {
                center: Point::new(*center_x, *center_y),
                radius: *radius,
                start_angle: start_angle.unwrap_or(0.0),
                end_angle: end_angle.unwrap_or(360.0),
            },
            Self::DxfArc { center, radius, start_angle, end_angle } => Shape::Arc {
                center: *center,
                radius: *radius,
                start_angle: start_angle.unwrap_or(0.0),
                end_angle: end_angle.unwrap_or(360.0),
            },
            Self::DwfWhipOutlineEllipse { center_x, center_y, major_radius, minor_radius, rotation, filled } => {
                Shape::Ellipse {
                    center: Point::new(*center_x, *center_y),
                    major_radius: *major_radius,
                    minor_radius: *minor_radius,
                    rotation_deg: *rotation,
                    filled: *filled,
                }
            }
            Self::CadLwPolyline { points, closed } | Self::DwfWhipPolygon { points, closed } => {
                Shape::Polyline { points, closed: *closed }
            }
            Self::DwfWhipPolyline { points } => Shape::Polyline { points, closed: false },
            Self::DxfPolyline { vertices, shape } => Shape::Polyline { points: vertices, closed: *shape },
            Self::CadText { x, y, text, height } => Shape::Text {
                anchor: Point::new(*x, *y),
                text,
                height: height.unwrap_or(DEFAULT_TEXT_HEIGHT),
            },
            Self::Unknown => Shape::None,
        }
    }

    /// World-space points that bound this primitive, for fit-to-view.
    ///
    /// Circles, arcs and ellipses contribute their full bounding square using
    /// the larger radius.
    #[must_use]
    pub fn extent_points(&self) -> Vec<Point> {
        match self.shape() {
            Shape::Line { a, b } => vec![a, b],
            Shape::Circle { center, radius } | Shape::Arc { center, radius, .. } => square_around(center, radius),
            Shape::Ellipse { center, major_radius, minor_radius, .. } => {
                square_around(center, major_radius.max(minor_radius))
            }
            Shape::Polyline { points, .. } => points.to_vec(),
            Shape::Text { anchor, .. } => vec![anchor],
            Shape::None => Vec::new(),
        }
    }
}

fn square_around(center: Point, radius: f64) -> Vec<Point> {
    vec![
        Point::new(center.x - radius, center.y - radius),
        Point::new(center.x + radius, center.y + radius),
    ]
}

/// Bounding box of every primitive, or `None` for an empty drawing.
#[must_use]
pub fn drawing_bounds(primitives: &[Primitive]) -> Option<Bounds> {
    Bounds::from_points(primitives.iter().flat_map(Primitive::extent_points))
}

/// Errors from decoding a primitive payload.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("invalid primitive payload: {0}")]
    Json(#[from] serde_json::Error),
    #[error("expected an array of entities or an object with an `entities` array")]
    NotAList,
}

/// Decode a parser payload: either a bare array of entities or an object
/// with an `entities` array. Entities that fail to decode are skipped.
///
/// # Errors
///
/// Returns an error if the payload is not JSON or has no entity list.
pub fn decode_primitives(payload: &str) -> Result<Vec<Primitive>, DecodeError> {
    let value: serde_json::Value = serde_json::from_str(payload)?;
    let entities = match value {
        serde_json::Value::Array(items) => items,
        serde_json::Value::Object(mut map) => match map.remove("entities") {
            Some(serde_json::Value::Array(items)) => items,
            _ => return Err(DecodeError::NotAList),
        },
        _ => return Err(DecodeError::NotAList),
    };

    let total = entities.len();
    let mut primitives = Vec::with_capacity(total);
    for (index, entity) in entities.into_iter().enumerate() {
        match serde_json::from_value::<Primitive>(entity) {
            Ok(primitive) => primitives.push(primitive),
            Err(e) => warn!(index, error = %e, "skipping malformed primitive"),
        }
    }
    debug!(total, decoded = primitives.len(), "decoded primitives");
    Ok(primitives)
}
