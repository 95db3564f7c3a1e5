use super::*;

fn scratch(name: &str) -> PathBuf {
    let dir = PathBuf::from("target").join("unit-scratch").join("encoder").join(name);
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

fn frame_at(path: PathBuf, w: u32, h: u32) -> ComposedFrame {
    image::RgbaImage::from_pixel(w, h, image::Rgba([10, 200, 30, 255]))
        .save(&path)
        .unwrap();
    ComposedFrame {
        item: 0,
        source: path.clone(),
        path,
        size: FrameSize::new(w, h),
        duration_s: 1.0,
    }
}

#[test]
fn strategy_parses_and_displays() {
    for s in [
        EncodeStrategy::Auto,
        EncodeStrategy::Sequence,
        EncodeStrategy::ClipConcat,
    ] {
        assert_eq!(s.to_string().parse::<EncodeStrategy>().unwrap(), s);
    }
    assert!("gif".parse::<EncodeStrategy>().is_err());
    assert_eq!(
        serde_json::to_string(&EncodeStrategy::ClipConcat).unwrap(),
        "\"clip-concat\""
    );
}

#[test]
fn settings_reject_zero_fps() {
    assert!(EncodeSettings::default().validate().is_ok());
    let bad = EncodeSettings {
        fps: Fps { num: 0, den: 1 },
        ..EncodeSettings::default()
    };
    assert!(bad.validate().is_err());
}

#[test]
fn missing_backend_selects_an_encoder_that_always_fails() {
    let mut enc = select_encoder(&EncodeSettings::default(), &BackendCaps::default());
    assert_eq!(enc.strategy(), EncodeStrategy::Auto);
    let err = enc
        .encode(&[], Path::new("target/never.mp4"), &mut |_| {})
        .unwrap_err();
    assert_eq!(err.kind(), crate::foundation::error::EncodeFailureKind::BackendMissing);
}

#[test]
fn available_backend_honors_the_strategy_preference() {
    let caps = BackendCaps {
        ffmpeg: true,
        libx264: true,
        version: Some("ffmpeg version test".into()),
    };
    let auto = select_encoder(&EncodeSettings::default(), &caps);
    assert_eq!(auto.strategy(), EncodeStrategy::Sequence);

    let concat = select_encoder(
        &EncodeSettings {
            strategy: EncodeStrategy::ClipConcat,
            ..EncodeSettings::default()
        },
        &caps,
    );
    assert_eq!(concat.strategy(), EncodeStrategy::ClipConcat);
}

#[test]
fn canonical_size_rounds_the_first_frame_down_to_even() {
    let dir = scratch("canonical");
    let frames = vec![
        frame_at(dir.join("a.png"), 101, 75),
        frame_at(dir.join("b.png"), 40, 40),
    ];
    assert_eq!(canonical_size(&frames).unwrap(), FrameSize::new(100, 74));
}

#[test]
fn canonical_size_needs_frames() {
    assert_eq!(canonical_size(&[]).unwrap_err(), EncodeError::NoFrames);
}

#[test]
fn unreadable_frame_is_a_bad_frame() {
    let dir = scratch("bad");
    let path = dir.join("broken.png");
    std::fs::write(&path, b"xx").unwrap();
    let frames = vec![ComposedFrame {
        item: 0,
        path: path.clone(),
        source: path.clone(),
        size: FrameSize::new(2, 2),
        duration_s: 1.0,
    }];
    assert!(matches!(
        canonical_size(&frames).unwrap_err(),
        EncodeError::BadFrame { .. }
    ));
    assert!(matches!(
        load_canonical(&path, FrameSize::new(2, 2)).unwrap_err(),
        EncodeError::BadFrame { .. }
    ));
}

#[test]
fn mismatched_frames_are_resized_to_fill() {
    let dir = scratch("resize");
    let f = frame_at(dir.join("wide.png"), 64, 20);
    let img = load_canonical(&f.path, FrameSize::new(32, 32)).unwrap();
    assert_eq!(img.dimensions(), (32, 32));
}

#[test]
fn existing_output_is_kept_without_overwrite() {
    let dir = scratch("overwrite");
    let out = dir.join("out.mp4");
    std::fs::write(&out, b"old").unwrap();
    assert!(check_overwrite(&out, true).is_ok());
    assert!(matches!(
        check_overwrite(&out, false).unwrap_err(),
        EncodeError::Backend(_)
    ));
}
