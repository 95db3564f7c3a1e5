use super::*;

fn builtin_engine(cfg: LayoutConfig) -> TextLayoutEngine {
    TextLayoutEngine::new(TextFace::builtin(), cfg)
}

const LONG: &str = "Rust makes it possible to build reliable and efficient software \
    without a garbage collector while keeping memory safety guarantees that catch whole \
    classes of bugs at compile time instead of in production where they are costly and \
    hard to reproduce for anyone on call during the night shift";

#[test]
fn layout_is_deterministic() {
    let mut engine = builtin_engine(LayoutConfig::default());
    let a = engine.layout(LONG, 800, 600).unwrap();
    let b = engine.layout(LONG, 800, 600).unwrap();
    assert_eq!(a, b);

    let mut fresh = builtin_engine(LayoutConfig::default());
    assert_eq!(fresh.layout(LONG, 800, 600).unwrap(), a);
}

#[test]
fn empty_text_has_no_lines_and_no_panel() {
    let mut engine = builtin_engine(LayoutConfig::default());
    for text in ["", "   ", "\n\n"] {
        let out = engine.layout(text, 640, 480).unwrap();
        assert!(out.is_empty());
        assert!(out.panel.is_none());
        assert!(!out.overflow);
    }
}

#[test]
fn zero_sized_frame_is_rejected() {
    let mut engine = builtin_engine(LayoutConfig::default());
    assert!(engine.layout("hi", 0, 480).is_err());
}

#[test]
fn short_text_keeps_the_starting_size_and_is_centered() {
    let mut engine = builtin_engine(LayoutConfig::default());
    let out = engine.layout("Hola mundo", 800, 600).unwrap();

    assert_eq!(out.font_size_px, 48.0);
    assert_eq!(out.line_texts(), vec!["Hola mundo"]);
    let line = &out.lines[0];
    assert!((line.origin.x + line.width / 2.0 - 400.0).abs() < 1e-3);
    assert!(((out.block.y0 + out.block.y1) / 2.0 - 300.0).abs() < 1e-3);
    assert!(out.panel.unwrap().contains(out.block.center()));
}

#[test]
fn long_text_wraps_within_width_and_shrinks_to_fit_height() {
    let cfg = LayoutConfig::default();
    let mut engine = builtin_engine(cfg);
    let out = engine.layout(LONG, 800, 600).unwrap();

    assert!(!out.overflow);
    assert!(out.font_size_px < 48.0);
    assert!(out.lines.len() > 1);
    for line in &out.lines {
        assert!(line.width <= 800.0 * f64::from(cfg.max_width_ratio) + 1e-6);
    }
    assert!(out.block.height() <= 600.0 * f64::from(cfg.max_height_ratio) + 1e-6);

    let rejoined = out.line_texts().join(" ");
    let original: Vec<&str> = LONG.split_whitespace().collect();
    assert_eq!(rejoined, original.join(" "));
}

#[test]
fn tiny_frame_overflows_at_the_floor_instead_of_looping() {
    let cfg = LayoutConfig::default();
    let mut engine = builtin_engine(cfg);
    let out = engine.layout(LONG, 40, 40).unwrap();
    assert!(out.overflow);
    assert_eq!(out.font_size_px, cfg.min_font_px);
    assert!(!out.lines.is_empty());
}

#[test]
fn explicit_newlines_start_new_lines() {
    let mut engine = builtin_engine(LayoutConfig::default());
    let out = engine.layout("Uno\n\nDos", 800, 600).unwrap();
    assert_eq!(out.line_texts(), vec!["Uno", "Dos"]);
}

#[test]
fn top_and_bottom_anchors_respect_the_margin() {
    let top_cfg = LayoutConfig {
        vertical_anchor: VerticalAnchor::Top,
        ..LayoutConfig::default()
    };
    let out = builtin_engine(top_cfg).layout("Arriba", 800, 600).unwrap();
    assert!((out.block.y0 - 36.0).abs() < 1e-3);

    let bottom_cfg = LayoutConfig {
        vertical_anchor: VerticalAnchor::Bottom,
        ..LayoutConfig::default()
    };
    let out = builtin_engine(bottom_cfg).layout("Abajo", 800, 600).unwrap();
    assert!((out.block.y1 - 564.0).abs() < 1e-3);
}

#[test]
fn panel_is_clipped_to_the_frame() {
    let mut engine = builtin_engine(LayoutConfig::default());
    let out = engine.layout(LONG, 40, 40).unwrap();
    let panel = out.panel.unwrap();
    assert!(panel.x0 >= 0.0 && panel.y0 >= 0.0);
    assert!(panel.x1 <= 40.0 && panel.y1 <= 40.0);
}

#[test]
fn config_validation_catches_bad_values() {
    assert!(LayoutConfig::default().validate().is_ok());
    for bad in [
        LayoutConfig {
            max_width_ratio: 0.0,
            ..LayoutConfig::default()
        },
        LayoutConfig {
            shrink_factor: 1.0,
            ..LayoutConfig::default()
        },
        LayoutConfig {
            min_font_px: 0.5,
            ..LayoutConfig::default()
        },
        LayoutConfig {
            margin_ratio: 0.7,
            ..LayoutConfig::default()
        },
    ] {
        assert!(bad.validate().is_err());
    }
}
