use std::f64::consts::FRAC_PI_6;

use super::assert_close;
use crate::geom::point;
use crate::*;

fn arc(rx: f64, ry: f64, rotation: f64) -> ArcParams {
    ArcParams {
        rx,
        ry,
        x_axis_rotation_deg: rotation,
        large_arc: false,
        sweep: true,
    }
}

#[test]
fn identity_preserves_axis_aligned_arc() {
    let solved = EllipseSolver::solve(
        &AffineTransform::identity(),
        point(0.0, 0.0),
        arc(2.0, 1.0, 0.0),
        point(4.0, 0.0),
    )
    .unwrap();
    assert_close(solved.rx, 2.0, 1e-9);
    assert_close(solved.ry, 1.0, 1e-9);
    assert_close(solved.rotation_deg, 0.0, 1e-9);
    assert!(!solved.direction_changed);
}

#[test]
fn uniform_scale_scales_both_radii() {
    let mut t = AffineTransform::from_scale(2.0, 2.0);
    t.translate(5.0, 7.0);
    let solved =
        EllipseSolver::solve(&t, point(0.0, 0.0), arc(2.0, 1.0, 0.0), point(4.0, 0.0)).unwrap();
    assert_close(solved.rx, 4.0, 1e-9);
    assert_close(solved.ry, 2.0, 1e-9);
    assert_close(solved.rotation_deg, 0.0, 1e-9);
    assert!(!solved.direction_changed);
}

#[test]
fn non_uniform_scale_turns_a_circle_into_an_ellipse() {
    let t = AffineTransform::from_scale(3.0, 1.0);
    let solved =
        EllipseSolver::solve(&t, point(0.0, 0.0), arc(1.0, 1.0, 0.0), point(1.0, 1.0)).unwrap();
    assert_close(solved.rx, 3.0, 1e-9);
    assert_close(solved.ry, 1.0, 1e-9);
    assert_close(solved.rotation_deg, 0.0, 1e-9);
}

#[test]
fn flip_reports_direction_change() {
    let t = AffineTransform::from_scale(-1.0, 1.0);
    let solved =
        EllipseSolver::solve(&t, point(0.0, 0.0), arc(2.0, 1.0, 0.0), point(4.0, 0.0)).unwrap();
    assert_close(solved.rx, 2.0, 1e-9);
    assert_close(solved.ry, 1.0, 1e-9);
    assert!(solved.direction_changed);
}

/// `(major, minor, major axis angle in [0, 180))`, so either parameterization of one ellipse
/// compares equal.
fn major_axis(solved: &SolvedArc) -> (f64, f64, f64) {
    let (major, minor) = (solved.rx.max(solved.ry), solved.rx.min(solved.ry));
    let angle = if solved.rx >= solved.ry {
        solved.rotation_deg
    } else {
        solved.rotation_deg - 90.0
    };
    (major, minor, angle.rem_euclid(180.0))
}

#[test]
fn rotation_yields_an_equivalent_ellipse() {
    let t = AffineTransform::from_rotation(FRAC_PI_6);
    let solved =
        EllipseSolver::solve(&t, point(0.0, 0.0), arc(2.0, 1.0, 0.0), point(4.0, 0.0)).unwrap();

    // Either (2, 1) at 30° or the swapped parameterization (1, 2) at 120°.
    let (major, minor, angle) = major_axis(&solved);
    assert_close(major, 2.0, 1e-9);
    assert_close(minor, 1.0, 1e-9);
    assert_close(angle, 30.0, 1e-6);
    assert!(!solved.direction_changed);
}

#[test]
fn diagonal_ellipse_is_not_mistaken_for_a_circle() {
    let solve = |t: &AffineTransform| {
        EllipseSolver::solve(t, point(0.0, 0.0), arc(4.0, 2.0, 45.0), point(3.0, 3.0)).unwrap()
    };

    let (major, minor, angle) = major_axis(&solve(&AffineTransform::identity()));
    assert_close(major, 4.0, 1e-9);
    assert_close(minor, 2.0, 1e-9);
    assert_close(angle, 45.0, 1e-6);

    let (major, minor, angle) = major_axis(&solve(&AffineTransform::from_scale(2.0, 2.0)));
    assert_close(major, 8.0, 1e-9);
    assert_close(minor, 4.0, 1e-9);
    assert_close(angle, 45.0, 1e-6);

    let mirrored = solve(&AffineTransform::from_scale(-1.0, 1.0));
    let (major, minor, angle) = major_axis(&mirrored);
    assert_close(major, 4.0, 1e-9);
    assert_close(minor, 2.0, 1e-9);
    assert_close(angle, 135.0, 1e-6);
    assert!(mirrored.direction_changed);
}

#[test]
fn true_circle_keeps_its_radius() {
    let solved = EllipseSolver::solve(
        &AffineTransform::from_rotation(FRAC_PI_6),
        point(0.0, 0.0),
        arc(3.0, 3.0, 45.0),
        point(3.0, 3.0),
    )
    .unwrap();
    assert_close(solved.rx, 3.0, 1e-9);
    assert_close(solved.ry, 3.0, 1e-9);
}

#[test]
fn rotation_input_is_in_degrees() {
    let solved = EllipseSolver::solve(
        &AffineTransform::identity(),
        point(0.0, 0.0),
        arc(2.0, 1.0, 30.0),
        point(3.0, 1.0),
    )
    .unwrap();
    let (major, minor) = (solved.rx.max(solved.ry), solved.rx.min(solved.ry));
    assert_close(major, 2.0, 1e-9);
    assert_close(minor, 1.0, 1e-9);
}

#[test]
fn zero_radius_is_degenerate() {
    let err = EllipseSolver::solve(
        &AffineTransform::from_scale(2.0, 2.0),
        point(0.0, 0.0),
        arc(0.0, 1.0, 0.0),
        point(4.0, 0.0),
    )
    .unwrap_err();
    assert!(matches!(err, Error::DegenerateEllipseSolve { .. }));
}

#[test]
fn coincident_endpoints_are_degenerate() {
    let err = EllipseSolver::solve(
        &AffineTransform::from_scale(2.0, 2.0),
        point(1.0, 1.0),
        arc(2.0, 1.0, 0.0),
        point(1.0, 1.0),
    )
    .unwrap_err();
    assert!(matches!(err, Error::DegenerateEllipseSolve { .. }));
}
