use super::*;

#[test]
fn flatten_premul_alpha_0_returns_bg() {
    let src = vec![0u8, 0, 0, 0];
    let mut dst = vec![0u8; 4];
    flatten_premul_over_bg_to_opaque_rgba8(&mut dst, &src, Rgba8::new(10, 20, 30, 255)).unwrap();
    assert_eq!(dst, vec![10, 20, 30, 255]);
}

#[test]
fn flatten_premul_alpha_255_is_identity() {
    let src = vec![1u8, 2, 3, 255];
    let mut dst = vec![0u8; 4];
    flatten_premul_over_bg_to_opaque_rgba8(&mut dst, &src, Rgba8::BLACK).unwrap();
    assert_eq!(dst, src);
}

#[test]
fn flatten_rejects_mismatched_buffers() {
    let mut dst = vec![0u8; 8];
    assert!(flatten_premul_over_bg_to_opaque_rgba8(&mut dst, &[0; 4], Rgba8::BLACK).is_err());
}

#[test]
fn codec_prefers_h264() {
    let mut caps = BackendCaps {
        ffmpeg: true,
        libx264: true,
        version: None,
    };
    assert_eq!(caps.video_codec(), "libx264");
    caps.libx264 = false;
    assert_eq!(caps.video_codec(), "mpeg4");
}

#[test]
fn probe_agrees_with_path_lookup() {
    let caps = probe_backend();
    assert_eq!(caps.ffmpeg, is_ffmpeg_on_path());
    if !caps.ffmpeg {
        assert!(!caps.libx264);
        assert!(caps.version.is_none());
    }
}

#[test]
fn ensure_parent_dir_creates_nested_dirs() {
    let path = std::path::PathBuf::from("target")
        .join("unit-scratch")
        .join("encode-parent")
        .join("a")
        .join("b")
        .join("out.mp4");
    ensure_parent_dir(&path).unwrap();
    assert!(path.parent().unwrap().is_dir());
    ensure_parent_dir(Path::new("bare.mp4")).unwrap();
}
