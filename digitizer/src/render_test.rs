#![allow(clippy::float_cmp)]

use super::*;
use crate::areas::{AreaField, PersistedArea};

// =============================================================
// Recording surface
// =============================================================

#[derive(Debug, Clone, PartialEq)]
enum Op {
    Base { primitives: usize },
    Fill { points: Vec<Point>, color: String, alpha: f64 },
    Path { points: Vec<Point>, closed: bool, color: String, width: f64, dashed: bool },
    Dot { center: Point, color: String },
    Ring { center: Point, radius: f64 },
}

#[derive(Default)]
struct Recorder {
    ops: Vec<Op>,
    fail_on_fill: bool,
}

impl Surface for Recorder {
    type Error = String;

    fn repaint_base(&mut self, _camera: &Camera, primitives: &[Primitive]) -> Result<(), String> {
        self.ops.push(Op::Base { primitives: primitives.len() });
        Ok(())
    }

    fn fill_polygon(&mut self, points: &[Point], color: &str, alpha: f64) -> Result<(), String> {
        if self.fail_on_fill {
            return Err("fill failed".into());
        }
        self.ops.push(Op::Fill { points: points.to_vec(), color: color.into(), alpha });
        Ok(())
    }

    fn stroke_path(&mut self, points: &[Point], closed: bool, stroke: Stroke<'_>) -> Result<(), String> {
        self.ops.push(Op::Path {
            points: points.to_vec(),
            closed,
            color: stroke.color.into(),
            width: stroke.width,
            dashed: stroke.dashed,
        });
        Ok(())
    }

    fn fill_dot(&mut self, center: Point, _radius: f64, color: &str) -> Result<(), String> {
        self.ops.push(Op::Dot { center, color: color.into() });
        Ok(())
    }

    fn stroke_ring(&mut self, center: Point, radius: f64, _stroke: Stroke<'_>) -> Result<(), String> {
        self.ops.push(Op::Ring { center, radius });
        Ok(())
    }
}

// =============================================================
// Helpers
// =============================================================

fn pt(x: f64, y: f64) -> Point {
    Point::new(x, y)
}

fn unit_square() -> Vec<Point> {
    vec![pt(0.0, 0.0), pt(1.0, 0.0), pt(1.0, 1.0), pt(0.0, 1.0)]
}

fn draft(points: &[(f64, f64, bool)]) -> Vec<DraftPoint> {
    points.iter().map(|&(x, y, on_boundary)| DraftPoint { point: pt(x, y), on_boundary }).collect()
}

fn scene<'a>(camera: &'a Camera, areas: &'a AreaStore, draft: &'a [DraftPoint]) -> Scene<'a> {
    Scene { camera, primitives: &[], areas, draft, selected: None }
}

fn record(scene: &Scene<'_>) -> Vec<Op> {
    let mut recorder = Recorder::default();
    redraw(&mut recorder, scene).unwrap();
    recorder.ops
}

// =============================================================
// Layer order
// =============================================================

#[test]
fn empty_scene_paints_only_base() {
    let camera = Camera::default();
    let areas = AreaStore::new();
    assert_eq!(record(&scene(&camera, &areas, &[])), vec![Op::Base { primitives: 0 }]);
}

#[test]
fn base_receives_primitives() {
    let camera = Camera::default();
    let areas = AreaStore::new();
    let primitives = vec![Primitive::Unknown, Primitive::Unknown];
    let s = Scene { primitives: &primitives, ..scene(&camera, &areas, &[]) };
    assert_eq!(record(&s)[0], Op::Base { primitives: 2 });
}

#[test]
fn area_is_filled_then_stroked_in_screen_space() {
    let camera = Camera::new(10.0, 100.0, 200.0);
    let mut areas = AreaStore::new();
    areas.create_draft(unit_square()).unwrap();

    let ops = record(&scene(&camera, &areas, &[]));

    let expected: Vec<Point> = vec![pt(100.0, 200.0), pt(110.0, 200.0), pt(110.0, 190.0), pt(100.0, 190.0)];
    assert_eq!(ops.len(), 3);
    assert_eq!(ops[1], Op::Fill { points: expected.clone(), color: "#CCCCCC".into(), alpha: 0.3 });
    assert_eq!(
        ops[2],
        Op::Path { points: expected, closed: true, color: "#CCCCCC".into(), width: 2.0, dashed: false }
    );
}

#[test]
fn areas_use_their_own_color() {
    let camera = Camera::default();
    let mut areas = AreaStore::new();
    let id = areas.create_draft(unit_square()).unwrap();
    areas.edit(id, AreaField::Color, "#123456").unwrap();

    let ops = record(&scene(&camera, &areas, &[]));
    assert!(matches!(&ops[1], Op::Fill { color, .. } if color == "#123456"));
}

#[test]
fn deleted_areas_are_not_drawn() {
    let camera = Camera::default();
    let mut areas = AreaStore::new();
    areas
        .load_persisted(PersistedArea {
            id: 1,
            coordinates: unit_square(),
            name: "a".into(),
            description: String::new(),
            color: "#CCCCCC".into(),
        })
        .unwrap();
    areas.delete(AreaId::Persistent(1)).unwrap();

    assert_eq!(record(&scene(&camera, &areas, &[])).len(), 1);
}

#[test]
fn selected_area_gets_dashed_red_highlight() {
    let camera = Camera::default();
    let mut areas = AreaStore::new();
    let id = areas.create_draft(unit_square()).unwrap();
    let s = Scene { selected: Some(id), ..scene(&camera, &areas, &[]) };

    let ops = record(&s);

    assert_eq!(ops.len(), 4);
    assert!(matches!(&ops[3], Op::Path { color, width, dashed: true, closed: true, .. }
        if color == "#FF0000" && *width == 3.0));
}

#[test]
fn open_editor_area_is_highlighted() {
    let camera = Camera::default();
    let mut areas = AreaStore::new();
    let id = areas.create_draft(unit_square()).unwrap();
    areas.create_draft(vec![pt(5.0, 5.0), pt(6.0, 5.0), pt(6.0, 6.0)]).unwrap();
    areas.open_editor(id).unwrap();

    let ops = record(&scene(&camera, &areas, &[]));

    // base + (fill, stroke, highlight) + (fill, stroke)
    assert_eq!(ops.len(), 6);
    assert!(matches!(&ops[3], Op::Path { dashed: true, .. }));
}

#[test]
fn draft_draws_after_areas() {
    let camera = Camera::default();
    let mut areas = AreaStore::new();
    areas.create_draft(unit_square()).unwrap();
    let d = draft(&[(10.0, 10.0, false), (20.0, 10.0, false)]);

    let ops = record(&scene(&camera, &areas, &d));

    assert!(matches!(ops[1], Op::Fill { .. }));
    assert!(matches!(&ops[3], Op::Path { dashed: true, closed: false, color, .. } if color == "#00AA00"));
    assert!(matches!(ops[4], Op::Dot { .. }));
}

// =============================================================
// Draft styling
// =============================================================

#[test]
fn single_draft_point_has_no_segments() {
    let camera = Camera::default();
    let areas = AreaStore::new();
    let d = draft(&[(1.0, 1.0, false)]);

    let ops = record(&scene(&camera, &areas, &d));

    assert_eq!(ops, vec![Op::Base { primitives: 0 }, Op::Dot { center: pt(1.0, -1.0), color: "#00AA00".into() }]);
}

#[test]
fn snapped_points_use_distinct_color() {
    let camera = Camera::default();
    let areas = AreaStore::new();
    let d = draft(&[(0.0, 0.0, false), (5.0, 0.0, true)]);

    let ops = record(&scene(&camera, &areas, &d));

    let colors: Vec<&str> = ops
        .iter()
        .filter_map(|op| match op {
            Op::Dot { color, .. } => Some(color.as_str()),
            _ => None,
        })
        .collect();
    assert_eq!(colors, vec!["#00AA00", "#FF8C00"]);
}

#[test]
fn first_point_ringed_from_three_points() {
    let camera = Camera::default();
    let areas = AreaStore::new();

    let two = draft(&[(0.0, 0.0, false), (5.0, 0.0, false)]);
    assert!(!record(&scene(&camera, &areas, &two)).iter().any(|op| matches!(op, Op::Ring { .. })));

    let three = draft(&[(0.0, 0.0, false), (5.0, 0.0, false), (5.0, 5.0, false)]);
    let ops = record(&scene(&camera, &areas, &three));
    assert_eq!(ops.last(), Some(&Op::Ring { center: pt(0.0, 0.0), radius: 8.0 }));
}

// =============================================================
// Errors
// =============================================================

#[test]
fn surface_error_stops_redraw() {
    let camera = Camera::default();
    let mut areas = AreaStore::new();
    areas.create_draft(unit_square()).unwrap();
    let d = draft(&[(10.0, 10.0, false)]);

    let mut recorder = Recorder { fail_on_fill: true, ..Recorder::default() };
    let err = redraw(&mut recorder, &scene(&camera, &areas, &d)).unwrap_err();

    assert_eq!(err, "fill failed");
    assert_eq!(recorder.ops, vec![Op::Base { primitives: 0 }]);
}
