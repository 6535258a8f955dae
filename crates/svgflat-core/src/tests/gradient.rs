use super::{assert_close, convert, messages};
use crate::gradient::apply_alpha;
use crate::*;

fn svg_with(defs: &str, body: &str) -> String {
    format!(r#"<svg viewBox="0 0 100 100"><defs>{defs}</defs>{body}</svg>"#)
}

const STOPS: &str = r#"<stop offset="0" stop-color="red"/><stop offset="1" stop-color="blue" stop-opacity="0.5"/>"#;

fn fill_placement(conversion: &Conversion) -> &GradientPlacement {
    match &conversion.drawable.paths[0].fill {
        Paint::Gradient(placement) => placement,
        other => panic!("expected a gradient fill, got {other:?}"),
    }
}

fn linear(placement: &GradientPlacement) -> (f64, f64, f64, f64) {
    match placement.geometry {
        GradientGeometry::Linear {
            start_x,
            start_y,
            end_x,
            end_y,
        } => (start_x, start_y, end_x, end_y),
        other => panic!("expected a linear gradient, got {other:?}"),
    }
}

#[test]
fn linear_defaults_span_the_bounding_box() {
    let svg = svg_with(
        &format!(r#"<linearGradient id="g">{STOPS}</linearGradient>"#),
        r#"<path d="M10 20H30V60H10Z" fill="url(#g)"/>"#,
    );
    let conversion = convert(&svg);
    assert!(conversion.diagnostics.is_empty(), "{:?}", conversion.diagnostics);
    let placement = fill_placement(&conversion);
    assert_eq!(linear(placement), (10.0, 20.0, 30.0, 20.0));
    assert_eq!(placement.tile_mode, TileMode::Clamp);
    assert_eq!(
        placement.stops,
        vec![
            PlacedStop {
                offset: 0.0,
                color: "#FFFF0000".to_string()
            },
            PlacedStop {
                offset: 1.0,
                color: "#800000FF".to_string()
            },
        ]
    );
}

#[test]
fn percentages_are_fractions_of_the_box() {
    let svg = svg_with(
        &format!(r#"<linearGradient id="g" x2="50%" y1="25%">{STOPS}</linearGradient>"#),
        r#"<path d="M10 20H30V60H10Z" fill="url(#g)"/>"#,
    );
    let conversion = convert(&svg);
    assert_eq!(linear(fill_placement(&conversion)), (10.0, 30.0, 20.0, 20.0));
}

#[test]
fn gradient_transform_acts_in_unit_space() {
    let svg = svg_with(
        &format!(r#"<linearGradient id="g" gradientTransform="scale(0.5)">{STOPS}</linearGradient>"#),
        r#"<path d="M10 20H30V60H10Z" fill="url(#g)"/>"#,
    );
    let conversion = convert(&svg);
    let (x1, y1, x2, y2) = linear(fill_placement(&conversion));
    assert_close(x1, 10.0, 1e-9);
    assert_close(y1, 20.0, 1e-9);
    assert_close(x2, 20.0, 1e-9);
    assert_close(y2, 20.0, 1e-9);
}

#[test]
fn user_space_coordinates_follow_the_path_transform() {
    let svg = svg_with(
        &format!(
            r#"<linearGradient id="g" gradientUnits="userSpaceOnUse" x1="0" x2="100">{STOPS}</linearGradient>"#
        ),
        r#"<g transform="translate(5 0)"><path d="M0 0H10V10H0Z" fill="url(#g)"/></g>"#,
    );
    let conversion = convert(&svg);
    assert_eq!(linear(fill_placement(&conversion)), (5.0, 0.0, 105.0, 0.0));
}

#[test]
fn radial_defaults_center_on_the_box() {
    let svg = svg_with(
        &format!(r#"<radialGradient id="g" spreadMethod="reflect">{STOPS}</radialGradient>"#),
        r#"<path d="M0 0H10V20H0Z" fill="url(#g)"/>"#,
    );
    let conversion = convert(&svg);
    let placement = fill_placement(&conversion);
    assert_eq!(
        placement.geometry,
        GradientGeometry::Radial {
            center_x: 5.0,
            center_y: 10.0,
            radius: 10.0
        }
    );
    assert_eq!(placement.tile_mode, TileMode::Mirror);
}

#[test]
fn unknown_spread_method_falls_back_to_clamp() {
    let svg = svg_with(
        &format!(r#"<linearGradient id="g" spreadMethod="bogus">{STOPS}</linearGradient>"#),
        r#"<path d="M0 0H10V20H0Z" fill="url(#g)"/>"#,
    );
    let conversion = convert(&svg);
    assert_eq!(fill_placement(&conversion).tile_mode, TileMode::Clamp);
    assert_eq!(
        messages(&conversion.diagnostics),
        vec!["Unsupported spreadMethod bogus"]
    );
}

#[test]
fn single_stop_is_duplicated() {
    let svg = svg_with(
        r#"<linearGradient id="g"><stop offset="0.3" stop-color="lime"/></linearGradient>"#,
        r#"<path d="M0 0H10V20H0Z" fill="url(#g)"/>"#,
    );
    let conversion = convert(&svg);
    let offsets: Vec<f64> = fill_placement(&conversion)
        .stops
        .iter()
        .map(|s| s.offset)
        .collect();
    assert_eq!(offsets, vec![0.3, 1.0]);
    assert_eq!(
        messages(&conversion.diagnostics),
        vec!["Gradient has only one color stop"]
    );
    assert!(!conversion.diagnostics.has_errors());
}

#[test]
fn gradients_without_stops_paint_nothing() {
    let svg = svg_with(
        r#"<linearGradient id="g"/>"#,
        r#"<path d="M0 0H10V20H0Z" fill="url(#g)"/>"#,
    );
    let conversion = convert(&svg);
    assert!(conversion.drawable.paths.is_empty());
    assert_eq!(messages(&conversion.diagnostics), vec!["Gradient has no stop info"]);
}

#[test]
fn bad_coordinates_and_references_are_reported() {
    let svg = svg_with(
        &format!(r#"<linearGradient id="g" x1="wide">{STOPS}</linearGradient>"#),
        r#"<path d="M0 0H10V20H0Z" fill="url(#g)"/><path d="M0 0H1V1Z" fill="url(#nope)"/>"#,
    );
    let conversion = convert(&svg);
    assert_eq!(conversion.drawable.paths.len(), 1);
    assert_eq!(
        messages(&conversion.diagnostics),
        vec![
            "Unsupported coordinate value: x1=\"wide\"",
            "Referenced id not found: \"nope\"",
        ]
    );
}

#[test]
fn inherited_gradients_are_placed_like_their_source() {
    let svg = svg_with(
        &format!(
            r##"<linearGradient id="base" x2="0" y2="1">{STOPS}</linearGradient><linearGradient id="g" href="#base"/>"##
        ),
        r#"<path d="M10 20H30V60H10Z" fill="url(#g)"/>"#,
    );
    let conversion = convert(&svg);
    assert_eq!(linear(fill_placement(&conversion)), (10.0, 20.0, 10.0, 60.0));
}

#[test]
fn alpha_is_multiplied_in() {
    assert_eq!(apply_alpha("#FF0000", 1.0), "#FFFF0000");
    assert_eq!(apply_alpha("#FF0000", 0.5), "#80FF0000");
    assert_eq!(apply_alpha("#80FF0000", 0.5), "#40FF0000");
    assert_eq!(apply_alpha("#00FF00", 0.0), "#0000FF00");
}
