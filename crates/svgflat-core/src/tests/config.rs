use crate::config::{ARCS_TO_CUBICS, FRACTION_DIGITS, STRICT};
use crate::*;
use serde_json::json;

#[test]
fn defaults_apply_to_an_empty_config() {
    let config = ConvertConfig::default();
    assert_eq!(config.as_value(), &json!({}));
    assert_eq!(config.fraction_digits(), None);
    assert!(config.scale_stroke_width());
    assert!(!config.arcs_to_cubics());
    assert!(!config.strict());
    config.validate().unwrap();
}

#[test]
fn dotted_paths_read_and_write_nested_objects() {
    let mut config = ConvertConfig::default();
    config.set_value(FRACTION_DIGITS, json!(3));
    config.set_value(ARCS_TO_CUBICS, json!(true));
    assert_eq!(
        config.as_value(),
        &json!({"output": {"fractionDigits": 3}, "arcs": {"toCubics": true}})
    );
    assert_eq!(config.get_u64(FRACTION_DIGITS), Some(3));
    assert_eq!(config.fraction_digits(), Some(3));
    assert!(config.arcs_to_cubics());
    assert_eq!(config.get_str("output.missing"), None);
}

#[test]
fn set_value_replaces_non_object_intermediates() {
    let mut config = ConvertConfig::from_value(json!({"stroke": 5}));
    config.set_value("stroke.scaleWidth", json!(false));
    assert_eq!(config.as_value(), &json!({"stroke": {"scaleWidth": false}}));
    assert!(!config.scale_stroke_width());
}

#[test]
fn deep_merge_keeps_sibling_keys() {
    let mut config = ConvertConfig::from_value(json!({
        "output": {"fractionDigits": 2},
        "stroke": {"scaleWidth": false}
    }));
    config.deep_merge(&json!({"output": {"fractionDigits": 4}, "diagnostics": {"strict": true}}));
    assert_eq!(config.fraction_digits(), Some(4));
    assert!(!config.scale_stroke_width());
    assert!(config.strict());
}

#[test]
fn converter_with_config_merges_overrides() {
    let base = ConvertConfig::from_value(json!({"arcs": {"toCubics": true}}));
    let converter = Converter::new(base)
        .with_config(ConvertConfig::from_value(json!({"diagnostics": {"strict": true}})));
    assert!(converter.config().arcs_to_cubics());
    assert!(converter.config().get_bool(STRICT).unwrap());
}

#[test]
fn validate_rejects_mistyped_keys() {
    let err = ConvertConfig::from_value(json!([])).validate().unwrap_err();
    assert!(matches!(err, Error::InvalidConfig { .. }));

    let err = ConvertConfig::from_value(json!({"output": {"fractionDigits": 13}}))
        .validate()
        .unwrap_err();
    assert!(err.to_string().contains("output.fractionDigits"), "{err}");

    let err = ConvertConfig::from_value(json!({"output": {"fractionDigits": -1}}))
        .validate()
        .unwrap_err();
    assert!(err.to_string().contains("got -1"), "{err}");

    let err = ConvertConfig::from_value(json!({"arcs": {"toCubics": "yes"}}))
        .validate()
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "Invalid config: `arcs.toCubics` must be a boolean, got \"yes\""
    );
}

#[test]
fn out_of_range_fraction_digits_are_ignored_by_the_getter() {
    let config = ConvertConfig::from_value(json!({"output": {"fractionDigits": 40}}));
    assert_eq!(config.fraction_digits(), None);
}

#[test]
fn invalid_config_fails_conversion_before_parsing() {
    let converter = Converter::new(ConvertConfig::from_value(json!({"diagnostics": {"strict": 1}})));
    let err = converter.convert("not even xml").unwrap_err();
    assert!(matches!(err, Error::InvalidConfig { .. }));
}
