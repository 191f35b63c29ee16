#![allow(clippy::float_cmp)]

use serde_json::json;

use super::*;

fn pt(x: f64, y: f64) -> Point {
    Point::new(x, y)
}

fn circle(cx: f64, cy: f64, r: f64) -> Primitive {
    Primitive::CadCircle { center_x: cx, center_y: cy, radius: r }
}

fn arc(start: f64, end: f64) -> Primitive {
    Primitive::CadArc { center_x: 0.0, center_y: 0.0, radius: 5.0, start_angle: Some(start), end_angle: Some(end) }
}

fn line(ax: f64, ay: f64, bx: f64, by: f64) -> Primitive {
    Primitive::CadLine { start_x: ax, start_y: ay, end_x: bx, end_y: by }
}

fn lw(points: Vec<Point>, closed: bool) -> Primitive {
    Primitive::CadLwPolyline { points, closed }
}

// =============================================================
// classify_arc
// =============================================================

#[test]
fn arc_full_turn_in_degrees() {
    assert_eq!(classify_arc(0.0, 360.0), ArcSpan::FullTurn);
    assert_eq!(classify_arc(90.0, 450.0), ArcSpan::FullTurn);
    assert_eq!(classify_arc(0.0, 359.5), ArcSpan::FullTurn);
}

#[test]
fn arc_full_turn_in_radians() {
    assert_eq!(classify_arc(0.0, std::f64::consts::TAU), ArcSpan::FullTurn);
}

#[test]
fn arc_zero_span_is_full_turn() {
    assert_eq!(classify_arc(0.0, 0.0), ArcSpan::FullTurn);
    assert_eq!(classify_arc(45.0, 45.0), ArcSpan::FullTurn);
}

#[test]
fn arc_partial_spans() {
    assert_eq!(classify_arc(0.0, 90.0), ArcSpan::Partial);
    assert_eq!(classify_arc(0.0, std::f64::consts::PI), ArcSpan::Partial);
    assert_eq!(classify_arc(10.0, 357.0), ArcSpan::Partial);
}

#[test]
fn arc_between_unit_scales_is_ambiguous() {
    assert_eq!(classify_arc(0.0, 6.5), ArcSpan::Ambiguous);
    assert_eq!(classify_arc(-6.9, 0.0), ArcSpan::Ambiguous);
}

// =============================================================
// extract_regions
// =============================================================

#[test]
fn circle_becomes_circle_region() {
    let regions = extract_regions(&[circle(1.0, 2.0, 3.0)]);
    assert_eq!(regions, vec![ClosedRegion::Circle { center: pt(1.0, 2.0), radius: 3.0 }]);
}

#[test]
fn ellipse_becomes_circle_with_larger_radius() {
    let e = Primitive::DwfWhipOutlineEllipse {
        center_x: 0.0,
        center_y: 0.0,
        major_radius: 2.0,
        minor_radius: 7.0,
        rotation: 30.0,
        filled: false,
    };
    assert_eq!(extract_regions(&[e]), vec![ClosedRegion::Circle { center: pt(0.0, 0.0), radius: 7.0 }]);
}

#[test]
fn only_full_turn_arcs_become_regions() {
    let regions = extract_regions(&[arc(0.0, 360.0), arc(0.0, 180.0), arc(0.0, 6.6)]);
    assert_eq!(regions.len(), 1);
}

#[test]
fn closed_polyline_becomes_polygon() {
    let square = vec![pt(0.0, 0.0), pt(4.0, 0.0), pt(4.0, 4.0), pt(0.0, 4.0)];
    let regions = extract_regions(&[lw(square.clone(), true)]);
    assert_eq!(regions, vec![ClosedRegion::Polygon { vertices: square }]);
}

#[test]
fn implicitly_closed_polyline_drops_closing_vertex() {
    let ring = vec![pt(0.0, 0.0), pt(4.0, 0.0), pt(4.0, 4.0), pt(0.0, 4.0), pt(0.0, 0.0)];
    let regions = extract_regions(&[lw(ring, false)]);
    let [ClosedRegion::Polygon { vertices }] = regions.as_slice() else {
        panic!("expected one polygon, got {regions:?}");
    };
    assert_eq!(vertices.len(), 4);
}

#[test]
fn open_polyline_is_discarded() {
    let open = vec![pt(0.0, 0.0), pt(4.0, 0.0), pt(4.0, 4.0), pt(0.0, 4.0)];
    assert!(extract_regions(&[lw(open, false)]).is_empty());
}

#[test]
fn short_polyline_is_discarded_even_if_flagged() {
    assert!(extract_regions(&[lw(vec![pt(0.0, 0.0), pt(1.0, 1.0)], true)]).is_empty());
}

#[test]
fn loose_lines_form_fallback_polygon() {
    let prims = [
        line(0.0, 0.0, 10.0, 0.0),
        line(10.0, 0.0, 10.0, 10.0),
        line(10.0, 10.0, 0.0, 10.0),
        line(0.0, 10.0, 0.0, 0.0),
    ];
    let regions = extract_regions(&prims);
    assert_eq!(
        regions,
        vec![ClosedRegion::Polygon { vertices: vec![pt(0.0, 0.0), pt(10.0, 0.0), pt(10.0, 10.0), pt(0.0, 10.0)] }]
    );
}

#[test]
fn fallback_merges_endpoints_within_tolerance() {
    let prims = [line(0.0, 0.0, 10.0, 0.0), line(10.005, 0.004, 5.0, 8.0), line(5.0, 8.0, 0.003, 0.0)];
    let regions = extract_regions(&prims);
    let [ClosedRegion::Polygon { vertices }] = regions.as_slice() else {
        panic!("expected one polygon, got {regions:?}");
    };
    assert_eq!(vertices, &vec![pt(0.0, 0.0), pt(10.0, 0.0), pt(5.0, 8.0)]);
}

#[test]
fn fallback_accepts_unconnected_segments() {
    // Connectivity is not checked once there are enough segments.
    let prims = [line(0.0, 0.0, 10.0, 0.0), line(20.0, 20.0, 30.0, 25.0), line(-5.0, 40.0, -5.0, 50.0)];
    let regions = extract_regions(&prims);
    let [ClosedRegion::Polygon { vertices }] = regions.as_slice() else {
        panic!("expected one polygon, got {regions:?}");
    };
    assert_eq!(vertices.len(), 6);
}

#[test]
fn two_lines_yield_nothing() {
    let prims = [line(0.0, 0.0, 10.0, 0.0), line(10.0, 0.0, 10.0, 10.0)];
    assert!(extract_regions(&prims).is_empty());
}

#[test]
fn single_line_yields_nothing() {
    assert!(extract_regions(&[line(0.0, 0.0, 10.0, 0.0)]).is_empty());
}

#[test]
fn text_and_unknown_yield_nothing() {
    let text = Primitive::CadText { x: 0.0, y: 0.0, text: "A-101".into(), height: None };
    assert!(extract_regions(&[text, Primitive::Unknown]).is_empty());
}

#[test]
fn extraction_is_idempotent() {
    let prims = [
        circle(0.0, 0.0, 1.0),
        lw(vec![pt(0.0, 0.0), pt(4.0, 0.0), pt(4.0, 4.0), pt(0.0, 4.0), pt(0.0, 0.0)], false),
        line(0.0, 0.0, 1.0, 0.0),
        line(1.0, 0.0, 1.0, 1.0),
        line(1.0, 1.0, 0.0, 0.0),
    ];
    assert_eq!(extract_regions(&prims), extract_regions(&prims));
}

// =============================================================
// ClosedRegion queries
// =============================================================

#[test]
fn circle_contains_and_boundary_distance() {
    let r = ClosedRegion::Circle { center: pt(0.0, 0.0), radius: 10.0 };
    assert!(r.contains(pt(3.0, 4.0)));
    assert!(!r.contains(pt(9.0, 9.0)));
    assert!((r.boundary_distance(pt(3.0, 4.0)) - 5.0).abs() < 1e-12);
    assert!((r.boundary_distance(pt(0.0, 13.0)) - 3.0).abs() < 1e-12);
}

#[test]
fn polygon_boundary_distance_includes_closing_edge() {
    let r = ClosedRegion::Polygon { vertices: vec![pt(0.0, 0.0), pt(10.0, 0.0), pt(10.0, 10.0), pt(0.0, 10.0)] };
    // Closest edge is (0,10)->(0,0), the closing edge.
    assert!((r.boundary_distance(pt(1.0, 5.0)) - 1.0).abs() < 1e-12);
}

#[test]
fn nearest_boundary_distance_over_regions() {
    let regions = vec![
        ClosedRegion::Circle { center: pt(0.0, 0.0), radius: 10.0 },
        ClosedRegion::Circle { center: pt(0.0, 0.0), radius: 4.0 },
    ];
    assert_eq!(nearest_boundary_distance(&regions, pt(5.0, 0.0)), Some(1.0));
    assert_eq!(nearest_boundary_distance(&[], pt(5.0, 0.0)), None);
    assert!(any_contains(&regions, pt(5.0, 0.0)));
    assert!(!any_contains(&regions, pt(50.0, 0.0)));
}

#[test]
fn region_serde_shape() {
    let r = ClosedRegion::Circle { center: pt(1.0, 2.0), radius: 3.0 };
    assert_eq!(
        serde_json::to_value(&r).unwrap(),
        json!({ "kind": "circle", "center": { "x": 1.0, "y": 2.0 }, "radius": 3.0 })
    );
}
