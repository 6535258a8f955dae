use svgflat_core::{
    ConvertOptions, Converter, Diagnostics, FillRule, GradientGeometry, Paint, TileMode,
    parse_document, resolve_references,
};

const USE_CHAIN: &str = include_str!("../../../fixtures/use_chain.svg");
const GRADIENTS: &str = include_str!("../../../fixtures/gradients.svg");
const UNSUPPORTED: &str = include_str!("../../../fixtures/unsupported.svg");
const ICON: &str = include_str!("../../../fixtures/icon.svg");
const CLIP: &str = include_str!("../../../fixtures/clip.svg");

#[test]
fn use_chain_expands_nested_definitions() {
    let mut diagnostics = Diagnostics::new();
    let mut doc = parse_document(USE_CHAIN, &mut diagnostics).unwrap();
    let report = resolve_references(&mut doc, &mut diagnostics);
    let order: Vec<String> = report
        .use_order
        .iter()
        .map(|&id| doc.node(id).label())
        .collect();
    assert_eq!(order, vec!["(line 5)", "(line 6)", "top", "bottom"]);

    let conversion = Converter::default()
        .convert_with(USE_CHAIN, ConvertOptions::strict())
        .unwrap();
    assert!(conversion.diagnostics.is_empty());
    let drawn: Vec<(&str, Option<f64>)> = conversion
        .drawable
        .paths
        .iter()
        .map(|p| (p.path_data.as_str(), p.stroke_width))
        .collect();
    assert_eq!(
        drawn,
        vec![
            ("M8,8L12,8", Some(2.0)),
            ("M8,12L12,12", Some(2.0)),
            ("M8,24L16,24", Some(4.0)),
            ("M8,32L16,32", Some(4.0)),
        ]
    );
    for path in &conversion.drawable.paths {
        assert_eq!(path.fill, Paint::None);
        assert_eq!(path.stroke, Paint::Color("#333333".to_string()));
    }
}

#[test]
fn gradients_are_placed_per_path() {
    let conversion = Converter::default().convert(GRADIENTS).unwrap();
    assert!(conversion.diagnostics.is_empty(), "{:?}", conversion.diagnostics);
    let paths = &conversion.drawable.paths;
    assert_eq!(paths.len(), 2);

    let Paint::Gradient(vertical) = &paths[0].fill else {
        panic!("expected a gradient, got {:?}", paths[0].fill);
    };
    assert_eq!(
        vertical.geometry,
        GradientGeometry::Linear {
            start_x: 10.0,
            start_y: 10.0,
            end_x: 10.0,
            end_y: 30.0
        }
    );
    let colors: Vec<&str> = vertical.stops.iter().map(|s| s.color.as_str()).collect();
    assert_eq!(colors, vec!["#FFFFFFFF", "#40000000"]);

    let Paint::Gradient(glow) = &paths[1].fill else {
        panic!("expected a gradient, got {:?}", paths[1].fill);
    };
    assert_eq!(
        glow.geometry,
        GradientGeometry::Radial {
            center_x: 50.0,
            center_y: 100.0,
            radius: 25.0
        }
    );
    assert_eq!(glow.tile_mode, TileMode::Repeat);
    let colors: Vec<&str> = glow.stops.iter().map(|s| s.color.as_str()).collect();
    assert_eq!(colors, vec!["#FFFFFF00", "#FFFFA500"]);
    assert_eq!(paths[1].stroke, Paint::Color("#000000".to_string()));
    assert_eq!(paths[1].stroke_width, Some(1.0));
}

#[test]
fn unsupported_content_is_reported_in_line_order() {
    let conversion = Converter::default().convert(UNSUPPORTED).unwrap();
    assert_eq!(conversion.drawable.paths.len(), 1);
    assert_eq!(
        conversion.diagnostics.combined_message(),
        [
            "ERROR @ line 2: <text> is not supported",
            "ERROR @ line 3: <mask> is not supported",
            "ERROR @ line 4: Circular dependency of <use> nodes: loop-a -> loop-b -> loop-a",
            "ERROR @ line 8: Referenced id not found: \"missing\"",
        ]
        .join("\n")
    );

    let err = Converter::default()
        .convert_with(UNSUPPORTED, ConvertOptions::strict())
        .unwrap_err();
    assert!(err.to_string().starts_with("Conversion failed:\nERROR @ line 2"));
}

#[test]
fn icon_without_view_box_uses_its_size() {
    let conversion = Converter::default().convert(ICON).unwrap();
    let drawable = &conversion.drawable;
    assert_eq!((drawable.width, drawable.height), (24.0, 24.0));
    assert_eq!((drawable.viewport_width, drawable.viewport_height), (24.0, 24.0));
    assert_eq!(drawable.paths.len(), 2);

    let rect = &drawable.paths[0];
    assert_eq!(rect.fill, Paint::Color("#E91E63".to_string()));

    let line = &drawable.paths[1];
    assert!(line.path_data.starts_with("M18,4"), "{}", line.path_data);
    assert_eq!(line.stroke, Paint::Color("#FFFFFF".to_string()));
    assert!((line.stroke_width.unwrap() - 2.0).abs() < 1e-9);
    assert_eq!(
        line.attrs.get("stroke-linejoin").map(String::as_str),
        Some("round")
    );
}

#[test]
fn clip_paths_are_flattened_in_the_clipped_element_space() {
    let conversion = Converter::default().convert(CLIP).unwrap();
    assert_eq!(
        conversion.diagnostics.combined_message(),
        "ERROR @ line 13: Referenced id not found: \"nowhere\""
    );

    let drawable = &conversion.drawable;
    let clips: Vec<(&str, FillRule)> = drawable
        .clip_paths
        .iter()
        .map(|c| (c.path_data.as_str(), c.fill_rule))
        .collect();
    assert_eq!(
        clips,
        vec![
            ("M2,0l20,0l0,20l-20,0z", FillRule::NonZero),
            ("M2,40L12,40 12,50z", FillRule::EvenOdd),
            ("M1,0h10v10h-10z", FillRule::NonZero),
            ("M1,20L6,20 6,25z", FillRule::EvenOdd),
        ]
    );
    assert!(
        drawable
            .clip_paths
            .iter()
            .all(|c| c.id.as_deref() == Some("window"))
    );

    let drawn: Vec<(&str, &[usize])> = drawable
        .paths
        .iter()
        .map(|p| (p.path_data.as_str(), p.clips.as_slice()))
        .collect();
    assert_eq!(
        drawn,
        vec![
            ("M0,0L8,8", &[0, 1][..]),
            ("M2,2L4,4", &[0, 1][..]),
            ("M50,50L60,60", &[2, 3][..]),
            ("M0,0L1,1", &[][..]),
        ]
    );
    assert_eq!(drawable.paths[0].stroke_width, Some(2.0));
}
