use crate::style::{Stylesheet, is_display_none, style_declarations};

#[test]
fn declarations_are_trimmed_and_empty_entries_skipped() {
    let pairs: Vec<(&str, &str)> =
        style_declarations(" fill : red ;; stroke:#00f; bogus; opacity: ").collect();
    assert_eq!(pairs, vec![("fill", "red"), ("stroke", "#00f")]);
}

#[test]
fn display_none_is_detected_in_style() {
    assert!(is_display_none("fill:red; display : none"));
    assert!(!is_display_none("display:inline"));
}

#[test]
fn class_rules_match_by_class_and_optional_tag() {
    let sheet = Stylesheet::parse(
        ".a { fill: red } path.b, .c { stroke: blue; stroke-width: 2 }\n#id { fill: green }",
    );
    assert!(!sheet.is_empty());

    let a: Vec<_> = sheet.declarations_for("rect", "x a").collect();
    assert_eq!(a, vec![("fill", "red")]);

    let b_on_path: Vec<_> = sheet.declarations_for("path", "b").collect();
    assert_eq!(b_on_path, vec![("stroke", "blue"), ("stroke-width", "2")]);
    assert_eq!(sheet.declarations_for("rect", "b").count(), 0);

    let both: Vec<_> = sheet.declarations_for("circle", "c a").collect();
    assert_eq!(
        both,
        vec![("fill", "red"), ("stroke", "blue"), ("stroke-width", "2")]
    );
}

#[test]
fn unsupported_selectors_are_skipped() {
    let sheet = Stylesheet::parse("#only-id { fill: red } g > .x { fill: blue } svg { }");
    assert!(sheet.is_empty());
}
