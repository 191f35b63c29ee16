//! Planar geometry helpers used by region extraction, hit-testing and the
//! drawing session. Everything here is pure and operates in world space.

#[cfg(test)]
#[path = "geometry_test.rs"]
mod geometry_test;

use crate::camera::Point;
use crate::consts::CLOSURE_TOLERANCE;

/// Ray-casting parity test. Fewer than three vertices is never "inside".
#[must_use]
pub fn point_in_polygon(p: Point, vertices: &[Point]) -> bool {
    if vertices.len() < 3 {
        return false;
    }

    let mut inside = false;
    let mut j = vertices.len() - 1;
    for i in 0..vertices.len() {
        let vi = vertices[i];
        let vj = vertices[j];
        if (vi.y > p.y) != (vj.y > p.y) {
            let x_cross = (vj.x - vi.x) * (p.y - vi.y) / (vj.y - vi.y) + vi.x;
            if p.x < x_cross {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}

/// Whether `p` lies inside or on the circle.
#[must_use]
pub fn point_in_circle(p: Point, center: Point, radius: f64) -> bool {
    p.distance(center) <= radius
}

/// Shortest distance from `p` to the segment `a`–`b`.
#[must_use]
pub fn point_to_segment_distance(p: Point, a: Point, b: Point) -> f64 {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    let len_sq = dx * dx + dy * dy;
    if len_sq == 0.0 {
        return p.distance(a);
    }

    let t = (((p.x - a.x) * dx + (p.y - a.y) * dy) / len_sq).clamp(0.0, 1.0);
    p.distance(Point::new(a.x + t * dx, a.y + t * dy))
}

/// Shoelace sum halved. Positive for counter-clockwise rings (Y-up).
#[must_use]
pub fn signed_polygon_area(vertices: &[Point]) -> f64 {
    if vertices.len() < 3 {
        return 0.0;
    }

    let n = vertices.len();
    let sum: f64 = (0..n)
        .map(|i| {
            let a = vertices[i];
            let b = vertices[(i + 1) % n];
            a.x * b.y - b.x * a.y
        })
        .sum();
    sum / 2.0
}

/// Unsigned polygon area (Shoelace). Fewer than three vertices is zero.
#[must_use]
pub fn polygon_area(vertices: &[Point]) -> f64 {
    signed_polygon_area(vertices).abs()
}

/// Whether a polyline bounds a closed ring: either the source flagged it
/// closed, or it has more than three vertices and its ends coincide.
#[must_use]
pub fn is_closed_polyline(vertices: &[Point], explicit_flag: bool) -> bool {
    explicit_flag || ends_coincide(vertices)
}

/// The ring with its duplicated closing vertex dropped, if it has one.
#[must_use]
pub fn canonical_ring(vertices: &[Point]) -> Vec<Point> {
    if ends_coincide(vertices) {
        vertices[..vertices.len() - 1].to_vec()
    } else {
        vertices.to_vec()
    }
}

fn ends_coincide(vertices: &[Point]) -> bool {
    if vertices.len() <= 3 {
        return false;
    }
    let (Some(first), Some(last)) = (vertices.first(), vertices.last()) else {
        return false;
    };
    (first.x - last.x).abs() < CLOSURE_TOLERANCE && (first.y - last.y).abs() < CLOSURE_TOLERANCE
}

/// Axis-aligned bounding box in world space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Bounds {
    /// Bounding box of a single point.
    #[must_use]
    pub fn at(p: Point) -> Self {
        Self { min_x: p.x, min_y: p.y, max_x: p.x, max_y: p.y }
    }

    /// Bounding box of all finite points, or `None` if there are none.
    #[must_use]
    pub fn from_points<I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = Point>,
    {
        let mut bounds: Option<Self> = None;
        for p in points.into_iter().filter(|p| p.is_finite()) {
            match bounds.as_mut() {
                Some(b) => b.extend(p),
                None => bounds = Some(Self::at(p)),
            }
        }
        bounds
    }

    /// Grow the box to include `p`.
    pub fn extend(&mut self, p: Point) {
        self.min_x = self.min_x.min(p.x);
        self.min_y = self.min_y.min(p.y);
        self.max_x = self.max_x.max(p.x);
        self.max_y = self.max_y.max(p.y);
    }

    #[must_use]
    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    #[must_use]
    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    /// Whether `p` lies inside or on the box.
    #[must_use]
    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.min_x && p.x <= self.max_x && p.y >= self.min_y && p.y <= self.max_y
    }
}
