use super::*;

#[test]
fn fps_rejects_zero_parts() {
    assert!(Fps::new(0, 1).is_err());
    assert!(Fps::new(24, 0).is_err());
    assert_eq!(Fps::new(30, 1).unwrap().as_f64(), 30.0);
}

#[test]
fn hold_frames_rounds_and_never_drops_a_still() {
    let fps = Fps::new(24, 1).unwrap();
    assert_eq!(fps.hold_frames(3.0), 72);
    assert_eq!(fps.hold_frames(0.01), 1);
    assert_eq!(fps.hold_frames(-2.0), 1);
    assert!((fps.frames_to_secs(72) - 3.0).abs() < 1e-9);
}

#[test]
fn frame_size_even_rounds_down() {
    assert_eq!(FrameSize::new(641, 481).even(), FrameSize::new(640, 480));
    assert_eq!(FrameSize::new(640, 480).even(), FrameSize::new(640, 480));
    assert_eq!(FrameSize::new(800, 600).min_side(), 600);
    assert!(FrameSize::new(0, 10).is_empty());
}

#[test]
fn rgba_serde_array_form() {
    let json = serde_json::to_string(&Rgba8::new(1, 2, 3, 4)).unwrap();
    assert_eq!(json, "[1,2,3,4]");
    let back: Rgba8 = serde_json::from_str("[0,0,0,160]").unwrap();
    assert_eq!(back, Rgba8::new(0, 0, 0, 160));
}
