use super::*;
use crate::encode::EncodeStrategy;
use crate::text::VerticalAnchor;

#[test]
fn empty_json_gives_defaults() {
    let cfg = PipelineConfig::from_json_str("{}").unwrap();
    assert_eq!(cfg, PipelineConfig::default());
    assert_eq!(cfg.duration, DurationPolicy::Uniform { seconds: 3.0 });
    assert_eq!(cfg.encode.fps.num, 24);
}

#[test]
fn partial_sections_merge_with_defaults() {
    let cfg = PipelineConfig::from_json_str(
        r#"{
            "layout": { "vertical_anchor": "bottom" },
            "encode": { "strategy": "clip-concat", "fps": { "num": 30, "den": 1 } },
            "duration": { "mode": "uniform", "seconds": 2.5 },
            "output_dir": "out"
        }"#,
    )
    .unwrap();
    assert_eq!(cfg.layout.vertical_anchor, VerticalAnchor::Bottom);
    assert_eq!(cfg.layout.min_font_px, LayoutConfig::default().min_font_px);
    assert_eq!(cfg.encode.strategy, EncodeStrategy::ClipConcat);
    assert_eq!(cfg.encode.fps.num, 30);
    assert_eq!(cfg.duration.seconds_for("anything"), 2.5);
    assert_eq!(cfg.output_root(), PathBuf::from("out"));
    assert_eq!(cfg.font_cache_dir(), PathBuf::from("out").join("fonts"));
}

#[test]
fn malformed_json_is_a_serde_error() {
    let err = PipelineConfig::from_json_str("{ nope").unwrap_err();
    assert!(matches!(err, ReelError::Serde(_)));
}

#[test]
fn out_of_range_values_fail_validation() {
    for json in [
        r#"{ "encode": { "fps": { "num": 0, "den": 1 } } }"#,
        r#"{ "layout": { "shrink_factor": 1.5 } }"#,
        r#"{ "duration": { "mode": "uniform", "seconds": 0 } }"#,
    ] {
        let err = PipelineConfig::from_json_str(json).unwrap_err();
        assert!(matches!(err, ReelError::Validation(_)), "{json}: {err}");
    }
}

#[test]
fn by_text_length_is_clamped() {
    let policy = DurationPolicy::ByTextLength {
        base_seconds: 1.0,
        per_char_seconds: 0.1,
        min_seconds: 2.0,
        max_seconds: 4.0,
    };
    policy.validate().unwrap();
    assert_eq!(policy.seconds_for("hi"), 2.0);
    assert!((policy.seconds_for("abcdefghijklmnopqrst") - 3.0).abs() < 1e-9);
    assert_eq!(policy.seconds_for(&"x".repeat(500)), 4.0);

    let inverted = DurationPolicy::ByTextLength {
        base_seconds: 1.0,
        per_char_seconds: 0.1,
        min_seconds: 5.0,
        max_seconds: 4.0,
    };
    assert!(inverted.validate().is_err());
}

#[test]
fn missing_config_file_names_the_path() {
    let err = PipelineConfig::from_path("target/does-not-exist/config.json").unwrap_err();
    assert!(err.to_string().contains("config.json"));
}
