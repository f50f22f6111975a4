use super::*;

#[test]
fn empty_object_is_the_default_config() {
    let cfg = EditorConfig::from_json_str("{}").unwrap();
    assert_eq!(cfg, EditorConfig::default());
    assert_eq!(cfg.display.width(), 700);
    assert_eq!(cfg.display.height, 500);
    assert_eq!(cfg.initial_mode, InteractionMode::Resize);
}

#[test]
fn narrow_viewport_narrows_the_box() {
    let cfg = EditorConfig::from_json_str(r#"{"display": {"viewport_width": 360}}"#).unwrap();
    assert_eq!(cfg.display.width(), 360);
    assert_eq!(cfg.display.max_width, 700);
}

#[test]
fn nested_overrides_and_modes_parse() {
    let cfg = EditorConfig::from_json_str(
        r##"{
            "placement": {"fallback_scale": 0.75},
            "initial_mode": "move",
            "min_keypoint_score": 0.3,
            "brand_color": "#000"
        }"##,
    )
    .unwrap();
    assert_eq!(cfg.placement.fallback_scale, 0.75);
    assert_eq!(cfg.placement.torso_width_factor, 1.3);
    assert_eq!(cfg.initial_mode, InteractionMode::Move);
    assert_eq!(cfg.min_keypoint_score, 0.3);
}

#[test]
fn invalid_configs_are_rejected() {
    for bad in [
        r#"{"display": {"height": 0}}"#,
        r#"{"placement": {"fallback_scale": 0}}"#,
        r#"{"placement": {"torso_width_factor": -1}}"#,
        r#"{"brand_color": "pink"}"#,
        r#"{"upload": {"max_width": 0}}"#,
        r#"{"unknown": true}"#,
    ] {
        assert!(EditorConfig::from_json_str(bad).is_err(), "{bad} should fail");
    }
}

#[test]
fn config_serializes_back_to_equal_value() {
    let cfg = EditorConfig::default();
    let s = serde_json::to_string(&cfg).unwrap();
    assert_eq!(EditorConfig::from_json_str(&s).unwrap(), cfg);
}
