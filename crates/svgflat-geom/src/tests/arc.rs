use super::assert_close;
use crate::geom::{Point, point};
use crate::*;

fn cubic_point(from: Point, c: &CubicSegment, t: f64) -> Point {
    let mt = 1.0 - t;
    let (w0, w1, w2, w3) = (mt * mt * mt, 3.0 * mt * mt * t, 3.0 * mt * t * t, t * t * t);
    point(
        w0 * from.x + w1 * c.ctrl1.x + w2 * c.ctrl2.x + w3 * c.to.x,
        w0 * from.y + w1 * c.ctrl1.y + w2 * c.ctrl2.y + w3 * c.to.y,
    )
}

fn samples(start: Point, cubics: &[CubicSegment]) -> Vec<Point> {
    let mut from = start;
    let mut out = Vec::new();
    for c in cubics {
        for i in 0..=16 {
            out.push(cubic_point(from, c, f64::from(i) / 16.0));
        }
        from = c.to;
    }
    out
}

#[test]
fn quarter_circle_stays_on_the_circle() {
    let start = point(1.0, 0.0);
    let end = point(0.0, 1.0);
    let mut cubics: Vec<CubicSegment> = Vec::new();
    arc_to_cubics(start, end, 1.0, 1.0, 0.0, false, true, &mut cubics);

    assert!(!cubics.is_empty());
    assert_eq!(cubics.last().map(|c| c.to), Some(end));
    for p in samples(start, &cubics) {
        assert_close(p.to_vector().length(), 1.0, 1e-3);
    }
    // Sweep flag 1 runs through the positive quadrant.
    let mid = samples(start, &cubics)
        .into_iter()
        .min_by(|a, b| {
            let da = (a.x - a.y).abs();
            let db = (b.x - b.y).abs();
            da.total_cmp(&db)
        })
        .unwrap();
    assert_close(mid.x, std::f64::consts::FRAC_1_SQRT_2, 1e-3);
    assert_close(mid.y, std::f64::consts::FRAC_1_SQRT_2, 1e-3);
}

#[test]
fn opposite_sweep_takes_the_long_way_when_large() {
    let start = point(1.0, 0.0);
    let end = point(0.0, 1.0);
    let mut cubics: Vec<CubicSegment> = Vec::new();
    arc_to_cubics(start, end, 1.0, 1.0, 0.0, true, false, &mut cubics);
    let points = samples(start, &cubics);
    assert!(points.iter().any(|p| p.x < -0.9));
    assert!(points.iter().any(|p| p.y < -0.9));
    assert_eq!(cubics.last().map(|c| c.to), Some(end));
}

#[test]
fn coincident_endpoints_emit_nothing() {
    let mut cubics: Vec<CubicSegment> = Vec::new();
    arc_to_cubics(point(2.0, 2.0), point(2.0, 2.0), 5.0, 5.0, 0.0, true, true, &mut cubics);
    assert!(cubics.is_empty());
}

#[test]
fn zero_radius_is_a_straight_cubic() {
    let mut cubics: Vec<CubicSegment> = Vec::new();
    arc_to_cubics(point(0.0, 0.0), point(3.0, 6.0), 0.0, 4.0, 0.0, false, true, &mut cubics);
    assert_eq!(
        cubics,
        vec![CubicSegment {
            ctrl1: point(1.0, 2.0),
            ctrl2: point(2.0, 4.0),
            to: point(3.0, 6.0),
        }]
    );
}

#[test]
fn radii_too_small_are_scaled_up() {
    let start = point(0.0, 0.0);
    let end = point(10.0, 0.0);
    let mut cubics: Vec<CubicSegment> = Vec::new();
    arc_to_cubics(start, end, 1.0, 1.0, 0.0, false, true, &mut cubics);

    assert_eq!(cubics.last().map(|c| c.to), Some(end));
    let reach = samples(start, &cubics)
        .iter()
        .map(|p| p.y.abs())
        .fold(0.0, f64::max);
    assert_close(reach, 5.0, 1e-2);
}

#[test]
fn each_cubic_spans_at_most_an_eighth_of_a_turn() {
    let start = point(1.0, 0.0);
    let angle = 100f64.to_radians();
    let end = point(angle.cos(), angle.sin());
    let mut cubics: Vec<CubicSegment> = Vec::new();
    arc_to_cubics(start, end, 1.0, 1.0, 0.0, false, true, &mut cubics);

    assert_eq!(cubics.len(), 3);
    let mut from = start;
    for c in &cubics {
        let turn = from.to_vector().angle_to(c.to.to_vector()).radians.abs();
        assert!(turn <= std::f64::consts::FRAC_PI_4 + 1e-9, "{turn}");
        from = c.to;
    }
}

#[test]
fn rotated_ellipse_ends_at_the_endpoint() {
    let start = point(0.0, 0.0);
    let end = point(3.0, 1.0);
    let mut cubics: Vec<CubicSegment> = Vec::new();
    arc_to_cubics(start, end, 4.0, 2.0, 30.0, true, true, &mut cubics);
    assert!(cubics.len() >= 2);
    assert_eq!(cubics.last().map(|c| c.to), Some(end));
}

#[test]
fn arc_commands_become_absolute_cubics() {
    let commands = parse_path("M0 0 a5 5 0 0 1 10 0 l1 1").unwrap();
    let out = arcs_to_cubics(&commands).unwrap();
    assert_eq!(out.len(), 3);
    assert_eq!(out[0], commands[0]);
    assert_eq!(out[1].kind, PathKind::CubicTo);
    let params = &out[1].params;
    assert_eq!(params.len() % 6, 0);
    assert_eq!(&params[params.len() - 2..], &[10.0, 0.0]);
    assert_eq!(out[2], commands[2]);
}

#[test]
fn collapsed_arc_is_dropped() {
    let commands = parse_path("M1 1 A2 2 0 0 1 1 1 L4 4").unwrap();
    let out = arcs_to_cubics(&commands).unwrap();
    assert_eq!(out.len(), 2);
    assert_eq!(out[1].kind, PathKind::LineTo);
}
