//! Wrapping policy configuration tests

use cowcell::*;
use pretty_assertions::assert_eq;
use serde_json::json;

#[test]
fn test_defaults() {
    let options = WrapOptions::default();
    assert_eq!(options.depth, CloneDepth::Unbounded);
    assert!(options.non_mutating_keys.is_empty());
    assert!(options.respect_custom);
}

#[test]
fn test_parse_partial_json_fills_defaults() {
    let options: WrapOptions = serde_json::from_value(json!({
        "depth": 2,
        "nonMutatingKeys": ["double", "toString"],
    }))
    .unwrap();

    assert_eq!(options.depth, CloneDepth::bounded(2));
    assert_eq!(
        options.non_mutating_keys.iter().collect::<Vec<_>>(),
        vec!["double", "toString"]
    );
    assert!(options.respect_custom);
}

#[test]
fn test_depth_accepts_unbounded_marker() {
    let options: WrapOptions =
        serde_json::from_value(json!({ "depth": "unbounded", "respectCustom": false })).unwrap();
    assert_eq!(options.depth, CloneDepth::Unbounded);
    assert!(!options.respect_custom);
}

#[test]
fn test_negative_depth_clamps_to_shallow() {
    let depth: CloneDepth = serde_json::from_value(json!(-3)).unwrap();
    assert_eq!(depth, CloneDepth::SHALLOW);
}

#[test]
fn test_invalid_depth_marker_is_rejected() {
    let result: std::result::Result<CloneDepth, _> = serde_json::from_value(json!("forever"));
    assert!(result.is_err());
}

#[test]
fn test_serialize_shape() {
    let options = WrapOptions::new()
        .with_depth(1_usize)
        .with_non_mutating_key("double");
    assert_eq!(
        serde_json::to_value(&options).unwrap(),
        json!({ "depth": 1, "nonMutatingKeys": ["double"], "respectCustom": true })
    );
    assert_eq!(
        serde_json::to_value(CloneDepth::Unbounded).unwrap(),
        json!("unbounded")
    );
}

#[test]
fn test_cell_reports_live_policy() {
    let object = Object::new("Counter").with_field("number", 0);
    let cell = wrap(object, WrapOptions::new().with_non_mutating_key("double")).unwrap();

    cell.set_depth(CloneDepth::bounded(4));
    cell.set_respect_custom(false);
    cell.add_non_mutating_key("triple");

    assert_eq!(
        cell.options(),
        WrapOptions::new()
            .with_depth(4_usize)
            .with_non_mutating_keys(["double", "triple"])
            .with_respect_custom(false)
    );
}

#[test]
fn test_depth_display() {
    assert_eq!(CloneDepth::bounded(3).to_string(), "3");
    assert_eq!(CloneDepth::Unbounded.to_string(), "unbounded");
}
