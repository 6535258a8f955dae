use serde_json::json;

use super::{convert, messages};
use crate::*;

fn stroked(transform: &str, extra: &str) -> Conversion {
    convert(&format!(
        r##"<svg viewBox="0 0 100 100"><g transform="{transform}"><path d="M0 0L10 0" stroke="#f00" stroke-width="3" fill="none" {extra}/></g></svg>"##
    ))
}

#[test]
fn uniform_scale_scales_the_stroke_exactly() {
    let conversion = stroked("scale(2)", "");
    assert!(conversion.diagnostics.is_empty(), "{:?}", conversion.diagnostics);
    let path = &conversion.drawable.paths[0];
    assert_eq!(path.path_data, "M0,0L20,0");
    assert_eq!(path.fill, Paint::None);
    assert_eq!(path.stroke, Paint::Color("#FF0000".to_string()));
    assert_eq!(path.stroke_width, Some(6.0));
}

#[test]
fn non_uniform_scale_warns() {
    let conversion = stroked("scale(2 1)", "");
    let path = &conversion.drawable.paths[0];
    super::assert_close(path.stroke_width.unwrap(), 3.0 * 2f64.sqrt(), 1e-9);
    assert_eq!(
        messages(&conversion.diagnostics),
        vec!["Scaling of the stroke width is approximate"]
    );
    assert!(!conversion.diagnostics.has_errors());
}

#[test]
fn non_scaling_stroke_keeps_its_width() {
    let conversion = stroked("scale(2)", r#"vector-effect="non-scaling-stroke""#);
    assert_eq!(conversion.drawable.paths[0].stroke_width, Some(3.0));

    let converter = Converter::new(ConvertConfig::from_value(
        json!({"stroke": {"scaleWidth": false}}),
    ));
    let conversion = converter
        .convert(
            r##"<svg viewBox="0 0 100 100"><path transform="scale(4)" d="M0 0L1 0" stroke="#000"/></svg>"##,
        )
        .unwrap();
    assert_eq!(conversion.drawable.paths[0].stroke_width, Some(1.0));
}

#[test]
fn translation_leaves_the_stroke_alone() {
    let conversion = stroked("translate(3 4)", "");
    let path = &conversion.drawable.paths[0];
    assert_eq!(path.path_data, "M3,4L13,4");
    assert_eq!(path.stroke_width, Some(3.0));
}

#[test]
fn view_box_origin_moves_to_zero() {
    let conversion = convert(
        r#"<svg viewBox="10 10 100 100" width="200" height="200"><path d="M10 10L20 20" fill="red"/></svg>"#,
    );
    let drawable = &conversion.drawable;
    assert_eq!((drawable.width, drawable.height), (200.0, 200.0));
    assert_eq!((drawable.viewport_width, drawable.viewport_height), (100.0, 100.0));
    assert_eq!(drawable.paths[0].path_data, "M0,0L10,10");
}

#[test]
fn nested_transforms_compose_outside_in() {
    let conversion = convert(
        r#"<svg viewBox="0 0 100 100"><g transform="translate(10 0)"><g transform="scale(2)"><path d="M1 1L2 1"/></g></g></svg>"#,
    );
    assert_eq!(conversion.drawable.paths[0].path_data, "M12,2L14,2");
}

#[test]
fn default_paint_and_opacity() {
    let conversion = convert(
        r#"<svg viewBox="0 0 100 100"><g opacity="0.5"><path id="p" d="M0 0L1 1" fill-opacity="50%" fill-rule="evenodd" stroke-linecap="round"/></g></svg>"#,
    );
    let path = &conversion.drawable.paths[0];
    assert_eq!(path.id.as_deref(), Some("p"));
    assert_eq!(path.fill, Paint::Color("#000000".to_string()));
    assert_eq!(path.stroke, Paint::None);
    assert_eq!(path.stroke_width, None);
    assert_eq!(path.fill_opacity, 0.25);
    assert_eq!(path.stroke_opacity, 0.5);
    let attrs: Vec<(&str, &str)> = path
        .attrs
        .iter()
        .map(|(k, v)| (k.as_str(), v.as_str()))
        .collect();
    assert_eq!(attrs, vec![("fill-rule", "evenOdd"), ("stroke-linecap", "round")]);
}

#[test]
fn unpainted_paths_are_dropped_but_count_as_content() {
    let conversion = convert(r#"<svg viewBox="0 0 100 100"><path d="M0 0L1 1" fill="none"/></svg>"#);
    assert!(conversion.drawable.paths.is_empty());
    assert!(conversion.diagnostics.is_empty());
}

#[test]
fn empty_documents_report_missing_content() {
    let conversion = convert(r#"<svg viewBox="0 0 100 100"><g/></svg>"#);
    assert!(conversion.drawable.paths.is_empty());
    assert_eq!(
        conversion.diagnostics.combined_message(),
        "ERROR: No vector content found"
    );
}

#[test]
fn unsupported_colors_are_reported() {
    let conversion = convert(r#"<svg viewBox="0 0 100 100"><path d="M0 0L1 1" fill="sparkly"/></svg>"#);
    assert!(conversion.drawable.paths.is_empty());
    assert_eq!(
        messages(&conversion.diagnostics),
        vec!["Unsupported color format \"sparkly\""]
    );
}

#[test]
fn malformed_path_data_is_reported() {
    let conversion = convert("<svg viewBox=\"0 0 100 100\">\n<path d=\"M0 0 L\"/></svg>");
    assert!(conversion.drawable.paths.is_empty());
    let diagnostic = conversion.diagnostics.iter().next().unwrap();
    assert_eq!(diagnostic.line, 2);
    assert!(
        diagnostic.message.starts_with("Malformed path data"),
        "{}",
        diagnostic.message
    );
}

#[test]
fn fraction_digits_come_from_config() {
    let converter = Converter::new(ConvertConfig::from_value(
        json!({"output": {"fractionDigits": 0}}),
    ));
    let conversion = converter
        .convert(r#"<svg viewBox="0 0 100 100"><path d="M0.4 0.6L10.5 2.49"/></svg>"#)
        .unwrap();
    assert_eq!(conversion.drawable.paths[0].path_data, "M0,1L11,2");
}

#[test]
fn arcs_can_be_replaced_by_cubics() {
    let svg = r#"<svg viewBox="0 0 100 100"><circle cx="50" cy="50" r="10"/></svg>"#;
    let with_arcs = convert(svg);
    assert!(with_arcs.drawable.paths[0].path_data.contains('a'));

    let converter = Converter::new(ConvertConfig::from_value(json!({"arcs": {"toCubics": true}})));
    let conversion = converter.convert(svg).unwrap();
    let data = &conversion.drawable.paths[0].path_data;
    assert!(!data.contains(['a', 'A']), "{data}");
    assert!(data.contains(['c', 'C']), "{data}");
}

#[test]
fn stroke_first_paint_order_splits_the_path() {
    let conversion = convert(
        r##"<svg viewBox="0 0 100 100"><path d="M0 0L1 1" fill="#00f" stroke="#f00" paint-order="stroke"/></svg>"##,
    );
    let paths = &conversion.drawable.paths;
    assert_eq!(paths.len(), 2);
    assert_eq!(paths[0].fill, Paint::None);
    assert_eq!(paths[0].stroke, Paint::Color("#FF0000".to_string()));
    assert_eq!(paths[0].stroke_width, Some(1.0));
    assert_eq!(paths[1].fill, Paint::Color("#0000FF".to_string()));
    assert_eq!(paths[1].stroke, Paint::None);
    assert_eq!(paths[1].stroke_width, None);

    let default_order = convert(
        r##"<svg viewBox="0 0 100 100"><path d="M0 0L1 1" fill="#00f" stroke="#f00" paint-order="markers fill"/></svg>"##,
    );
    assert_eq!(default_order.drawable.paths.len(), 1);
}

#[test]
fn expanded_uses_are_drawn_with_their_offset() {
    let conversion = convert(
        r##"<svg viewBox="0 0 100 100">
            <defs><path id="p" d="M0 0L1 0"/></defs>
            <use href="#p" x="5" y="6" fill="red"/>
            <use href="#p" transform="scale(2)" x="1"/>
        </svg>"##,
    );
    let drawn: Vec<(&str, &Paint)> = conversion
        .drawable
        .paths
        .iter()
        .map(|p| (p.path_data.as_str(), &p.fill))
        .collect();
    assert_eq!(
        drawn,
        vec![
            ("M5,6L6,6", &Paint::Color("#FF0000".to_string())),
            ("M2,0L4,0", &Paint::Color("#000000".to_string())),
        ]
    );
}

#[test]
fn empty_clip_path_hides_its_content() {
    let conversion = convert(
        r##"<svg viewBox="0 0 10 10"><clipPath id="c"/><path d="M0 0L1 1" clip-path="url(#c)"/></svg>"##,
    );
    assert!(conversion.diagnostics.is_empty(), "{:?}", conversion.diagnostics);
    let drawable = &conversion.drawable;
    assert_eq!(
        drawable.clip_paths,
        vec![FlatClipPath {
            id: Some("c".to_string()),
            path_data: String::new(),
            fill_rule: FillRule::NonZero,
        }]
    );
    assert_eq!(drawable.paths[0].clips, vec![0]);
}

#[test]
fn clip_pieces_are_joined_from_the_origin() {
    let conversion = convert(
        r##"<svg viewBox="0 0 10 10">
            <clipPath id="c"><path d="M0 0L1 0"/><path d="m5 5l1 0"/></clipPath>
            <path d="M0 0L1 1" clip-path="url(#c)"/>
        </svg>"##,
    );
    assert_eq!(
        conversion.drawable.clip_paths[0].path_data,
        "M0,0L1,0M0,0m5,5l1,0"
    );
}

#[test]
fn clip_reference_must_name_a_clip_path() {
    let conversion = convert(
        "<svg viewBox=\"0 0 10 10\">\n<linearGradient id=\"g\"/>\n<path d=\"M0 0L1 1\" clip-path=\"url(#g)\"/></svg>",
    );
    let diagnostic = conversion
        .diagnostics
        .iter()
        .find(|d| d.message == "Referenced element is not a clip path")
        .unwrap();
    assert_eq!(diagnostic.line, 3);
    assert!(conversion.drawable.paths[0].clips.is_empty());
    assert!(conversion.drawable.clip_paths.is_empty());
}

#[test]
fn clips_serialize_only_when_present() {
    let conversion = convert(
        r##"<svg viewBox="0 0 10 10"><clipPath id="c"><rect width="5" height="5"/></clipPath>
            <path d="M0 0L1 1" clip-path="url(#c)"/><path d="M2 2L3 3"/></svg>"##,
    );
    let value = serde_json::to_value(&conversion.drawable).unwrap();
    assert_eq!(
        value["clip_paths"],
        json!([{"id": "c", "path_data": "M0,0h5v5h-5z", "fill_rule": "nonzero"}])
    );
    assert_eq!(value["paths"][0]["clips"], json!([0]));
    assert!(value["paths"][1].get("clips").is_none());
}
