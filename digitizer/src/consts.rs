//! Shared numeric constants for the digitizer crate.

// ── Drawing session ─────────────────────────────────────────────

/// Screen-space distance in pixels within which a click closes the polygon
/// onto its first point.
pub const CLOSE_DISTANCE_PX: f64 = 15.0;

/// Screen-space distance in pixels within which a click counts as landing on
/// a closed region's edge.
pub const SNAP_DISTANCE_PX: f64 = 10.0;

/// Number of boundary-tagged draft points that triggers auto-completion.
pub const SNAP_POINTS_TO_CLOSE: usize = 2;

/// Minimum number of vertices for a committed area.
pub const MIN_AREA_POINTS: usize = 3;

// ── Region extraction ───────────────────────────────────────────

/// Absolute world-space tolerance for "first vertex equals last vertex".
pub const CLOSURE_TOLERANCE: f64 = 1e-2;

/// Per-axis world-space tolerance for merging line endpoints.
pub const ENDPOINT_MERGE_TOLERANCE: f64 = 0.01;

/// Fewest loose line segments that may form a fallback polygon.
pub const MIN_FALLBACK_LINES: usize = 3;

/// Arc angles whose magnitude stays at or below this are radians (2π plus slack).
pub const RADIAN_MAGNITUDE_LIMIT: f64 = std::f64::consts::TAU + 0.02;

/// Arc angles whose magnitude exceeds this are degrees.
pub const DEGREE_MAGNITUDE_FLOOR: f64 = 7.0;

/// An arc span within this many degrees of 360 is a full circle.
pub const FULL_TURN_TOLERANCE_DEG: f64 = 1.0;

// ── Camera ──────────────────────────────────────────────────────

/// Scale multiplier for one wheel notch towards the user (zoom in).
pub const ZOOM_IN_FACTOR: f64 = 1.1;

/// Scale multiplier for one wheel notch away from the user (zoom out).
pub const ZOOM_OUT_FACTOR: f64 = 0.9;

/// Smallest allowed camera scale.
pub const MIN_SCALE: f64 = 1e-6;

/// Largest allowed camera scale.
pub const MAX_SCALE: f64 = 1e6;

/// Fraction of the viewport the drawing occupies after fit-to-view.
pub const FIT_FILL_RATIO: f64 = 0.6;

/// Lower bound for fit-to-view scale, as a fraction of the naive fit.
pub const FIT_MIN_RATIO: f64 = 0.1;

// ── Areas ───────────────────────────────────────────────────────

/// Fill/stroke color of a freshly drawn or uncolored area.
pub const DEFAULT_AREA_COLOR: &str = "#CCCCCC";

// ── Rendering ───────────────────────────────────────────────────

/// Canvas background behind the drawing.
pub const BACKGROUND_COLOR: &str = "#e6f3ff";

/// Stroke/fill color for drawing primitives.
pub const PRIMITIVE_COLOR: &str = "#333333";

/// Default text height in world units when a text primitive omits one.
pub const DEFAULT_TEXT_HEIGHT: f64 = 10.0;

/// Opacity of an area's fill.
pub const AREA_FILL_ALPHA: f64 = 0.3;

/// Area outline width in screen pixels.
pub const AREA_STROKE_PX: f64 = 2.0;

/// Outline color for selected or open-for-edit areas.
pub const HIGHLIGHT_COLOR: &str = "#FF0000";

/// Highlight outline width in screen pixels.
pub const HIGHLIGHT_STROKE_PX: f64 = 3.0;

/// Dash and gap length in screen pixels for dashed strokes.
pub const DASH_PX: f64 = 5.0;

/// Color of draft segments and ordinary draft points.
pub const DRAFT_COLOR: &str = "#00AA00";

/// Color of draft points snapped onto a region edge.
pub const SNAPPED_POINT_COLOR: &str = "#FF8C00";

/// Draft segment width in screen pixels.
pub const DRAFT_STROKE_PX: f64 = 2.0;

/// Radius of a draft point dot in screen pixels.
pub const DRAFT_POINT_RADIUS_PX: f64 = 4.0;

/// Radius of the ring around the first draft point once it can close.
pub const FIRST_POINT_RING_PX: f64 = 8.0;

// ── Viewport ────────────────────────────────────────────────────

/// Viewport width assumed until the host reports one, in CSS pixels.
pub const DEFAULT_VIEWPORT_W: f64 = 900.0;

/// Viewport height assumed until the host reports one, in CSS pixels.
pub const DEFAULT_VIEWPORT_H: f64 = 400.0;
