#![allow(clippy::float_cmp)]

use serde_json::json;

use super::*;

fn decode_one(value: serde_json::Value) -> Primitive {
    serde_json::from_value(value).unwrap()
}

// =============================================================
// Dialect decoding
// =============================================================

#[test]
fn decodes_cad_line() {
    let p = decode_one(json!({ "type": "CadLine", "startX": 1.0, "startY": 2.0, "endX": 3.0, "endY": 4.0 }));
    assert_eq!(p.shape(), Shape::Line { a: Point::new(1.0, 2.0), b: Point::new(3.0, 4.0) });
}

#[test]
fn decodes_dxf_line_ignoring_z() {
    let p = decode_one(json!({
        "type": "LINE",
        "vertices": [{ "x": 0.0, "y": 0.0, "z": 0.0 }, { "x": 5.0, "y": 0.0, "z": 0.0 }]
    }));
    assert_eq!(p.shape(), Shape::Line { a: Point::new(0.0, 0.0), b: Point::new(5.0, 0.0) });
}

#[test]
fn dxf_line_with_one_vertex_has_no_shape() {
    let p = decode_one(json!({ "type": "LINE", "vertices": [{ "x": 0.0, "y": 0.0 }] }));
    assert_eq!(p.shape(), Shape::None);
}

#[test]
fn decodes_both_circle_dialects() {
    let a = decode_one(json!({ "type": "CadCircle", "centerX": 1.0, "centerY": 1.0, "radius": 2.0 }));
    let b = decode_one(json!({ "type": "CIRCLE", "center": { "x": 1.0, "y": 1.0 }, "radius": 2.0 }));
    assert_eq!(a.shape(), b.shape());
}

#[test]
fn arc_defaults_to_full_turn_angles() {
    let p = decode_one(json!({ "type": "CadArc", "centerX": 0.0, "centerY": 0.0, "radius": 3.0 }));
    assert_eq!(
        p.shape(),
        Shape::Arc { center: Point::new(0.0, 0.0), radius: 3.0, start_angle: 0.0, end_angle: 360.0 }
    );
}

#[test]
fn decodes_dxf_arc_angles() {
    let p = decode_one(json!({
        "type": "ARC",
        "center": { "x": 0.0, "y": 0.0 },
        "radius": 3.0,
        "startAngle": 0.0,
        "endAngle": 1.57
    }));
    let Shape::Arc { end_angle, .. } = p.shape() else {
        panic!("expected arc");
    };
    assert_eq!(end_angle, 1.57);
}

#[test]
fn filled_ellipse_alias_decodes() {
    let p = decode_one(json!({
        "type": "DwfWhipFilledEllipse",
        "centerX": 0.0,
        "centerY": 0.0,
        "majorRadius": 4.0,
        "minorRadius": 2.0,
        "filled": true
    }));
    let Shape::Ellipse { major_radius, filled, rotation_deg, .. } = p.shape() else {
        panic!("expected ellipse");
    };
    assert_eq!(major_radius, 4.0);
    assert_eq!(rotation_deg, 0.0);
    assert!(filled);
}

#[test]
fn polyline_closed_flags_per_dialect() {
    let lw = decode_one(json!({ "type": "CadLwPolyline", "points": [], "closed": true }));
    let whip = decode_one(json!({ "type": "DwfWhipPolyline", "points": [] }));
    let dxf = decode_one(json!({ "type": "POLYLINE", "vertices": [], "shape": true }));
    assert!(matches!(lw.shape(), Shape::Polyline { closed: true, .. }));
    assert!(matches!(whip.shape(), Shape::Polyline { closed: false, .. }));
    assert!(matches!(dxf.shape(), Shape::Polyline { closed: true, .. }));
}

#[test]
fn text_aliases_decode() {
    for tag in ["CadText", "CadMText", "TEXT", "MTEXT"] {
        let p = decode_one(json!({ "type": tag, "x": 1.0, "y": 2.0, "text": "ROOM" }));
        assert_eq!(p.shape(), Shape::Text { anchor: Point::new(1.0, 2.0), text: "ROOM", height: 10.0 });
    }
}

#[test]
fn unknown_type_decodes_to_unknown() {
    let p = decode_one(json!({ "type": "HATCH", "pattern": "ANSI31", "scale": 2 }));
    assert_eq!(p, Primitive::Unknown);
    assert_eq!(p.shape(), Shape::None);
}

// =============================================================
// Extents
// =============================================================

#[test]
fn ellipse_extent_uses_larger_radius() {
    let p = decode_one(json!({
        "type": "DwfWhipOutlineEllipse",
        "centerX": 10.0,
        "centerY": 10.0,
        "majorRadius": 2.0,
        "minorRadius": 5.0
    }));
    assert_eq!(p.extent_points(), vec![Point::new(5.0, 5.0), Point::new(15.0, 15.0)]);
}

#[test]
fn drawing_bounds_covers_all_primitives() {
    let prims = vec![
        decode_one(json!({ "type": "CadLine", "startX": -5.0, "startY": 0.0, "endX": 5.0, "endY": 1.0 })),
        decode_one(json!({ "type": "CadCircle", "centerX": 0.0, "centerY": 10.0, "radius": 2.0 })),
        Primitive::Unknown,
    ];
    let b = drawing_bounds(&prims).unwrap();
    assert_eq!(b, Bounds { min_x: -5.0, min_y: 0.0, max_x: 5.0, max_y: 12.0 });
}

#[test]
fn drawing_bounds_empty_is_none() {
    assert!(drawing_bounds(&[]).is_none());
    assert!(drawing_bounds(&[Primitive::Unknown]).is_none());
}

// =============================================================
// decode_primitives
// =============================================================

#[test]
fn decode_bare_array() {
    let payload = r#"[{"type":"CadCircle","centerX":0,"centerY":0,"radius":1}]"#;
    assert_eq!(decode_primitives(payload).unwrap().len(), 1);
}

#[test]
fn decode_entities_object() {
    let payload = r#"{"entities":[{"type":"CadCircle","centerX":0,"centerY":0,"radius":1}],"layers":[]}"#;
    assert_eq!(decode_primitives(payload).unwrap().len(), 1);
}

#[test]
fn decode_skips_malformed_entities() {
    let payload = r#"[
        {"type":"CadCircle","centerX":0,"centerY":0,"radius":1},
        {"type":"CadCircle","centerX":0},
        {"type":"CadLine","startX":0,"startY":0,"endX":1,"endY":1}
    ]"#;
    let prims = decode_primitives(payload).unwrap();
    assert_eq!(prims.len(), 2);
}

#[test]
fn decode_rejects_scalar_payload() {
    assert!(matches!(decode_primitives("42"), Err(DecodeError::NotAList)));
    assert!(matches!(decode_primitives(r#"{"entities":3}"#), Err(DecodeError::NotAList)));
    assert!(matches!(decode_primitives("not json"), Err(DecodeError::Json(_))));
}
