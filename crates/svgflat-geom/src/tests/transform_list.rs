use super::assert_close;
use crate::geom::point;
use crate::*;

#[test]
fn empty_list_is_identity() {
    assert!(parse_transform_list("").unwrap().is_identity());
    assert!(parse_transform_list("  ").unwrap().is_identity());
}

#[test]
fn entries_apply_right_to_left() {
    let t = parse_transform_list("translate(10) scale(2)").unwrap();
    assert_eq!(t.transform_point(point(1.0, 1.0)), point(12.0, 2.0));

    let t = parse_transform_list("scale(2),translate(10, 5)").unwrap();
    assert_eq!(t.transform_point(point(1.0, 1.0)), point(22.0, 12.0));
}

#[test]
fn every_entry_kind_parses() {
    let m = parse_transform_list("matrix(1 0 0 1 5 6)").unwrap();
    assert_eq!(m, AffineTransform::from_translation(5.0, 6.0));

    let r = parse_transform_list("rotate(90)").unwrap();
    let p = r.transform_point(point(1.0, 0.0));
    assert_close(p.x, 0.0, 1e-12);
    assert_close(p.y, 1.0, 1e-12);

    let about = parse_transform_list("rotate(45, 10, 10)").unwrap();
    let fixed = about.transform_point(point(10.0, 10.0));
    assert_close(fixed.x, 10.0, 1e-12);
    assert_close(fixed.y, 10.0, 1e-12);

    let skew_x = parse_transform_list("skewX(45)").unwrap();
    let p = skew_x.transform_point(point(0.0, 1.0));
    assert_close(p.x, 1.0, 1e-12);
    assert_close(p.y, 1.0, 1e-12);

    let skew_y = parse_transform_list("skewY(45)").unwrap();
    let p = skew_y.transform_point(point(1.0, 0.0));
    assert_close(p.x, 1.0, 1e-12);
    assert_close(p.y, 1.0, 1e-12);

    let s = parse_transform_list("scale(2 3)").unwrap();
    assert_eq!(s, AffineTransform::from_scale(2.0, 3.0));
}

#[test]
fn malformed_lists_are_rejected() {
    for value in [
        "scale(1,2,3)",
        "rotate(1,2)",
        "matrix(1 2 3)",
        "warp(1)",
        "translate(1",
        "translate(a)",
        "translate 5",
    ] {
        let err = parse_transform_list(value).unwrap_err();
        assert!(matches!(err, Error::InvalidTransformList { .. }), "{value}");
    }
}
