use std::path::PathBuf;

use super::*;

fn scratch(name: &str) -> PathBuf {
    let dir = PathBuf::from("target").join("unit-scratch").join("assets-image");
    std::fs::create_dir_all(&dir).unwrap();
    dir.join(name)
}

#[test]
fn dimensions_are_read_lazily_from_the_header() {
    let path = scratch("dims.png");
    image::RgbaImage::from_pixel(12, 7, image::Rgba([1, 2, 3, 255]))
        .save(&path)
        .unwrap();

    let asset = ImageAsset::fetched(&path);
    assert_eq!(asset.dimensions().unwrap(), FrameSize::new(12, 7));
    assert_eq!(asset.origin(), ImageOrigin::Fetched);
    assert_eq!(asset.format(), Some(image::ImageFormat::Png));
}

#[test]
fn known_dimensions_skip_the_file() {
    let asset = ImageAsset::uploaded("does/not/exist.jpg").with_dimensions(FrameSize::new(4, 2));
    assert_eq!(asset.dimensions().unwrap(), FrameSize::new(4, 2));
    assert_eq!(asset.origin(), ImageOrigin::Uploaded);
}

#[test]
fn undecodable_image_is_an_asset_error_naming_the_path() {
    let path = scratch("garbage.png");
    std::fs::write(&path, b"definitely not a png").unwrap();

    let err = ImageAsset::fetched(&path).decode_rgba8().unwrap_err();
    assert!(matches!(err, ReelError::Asset { .. }));
    assert!(err.to_string().contains("garbage.png"));
}

#[test]
fn decode_returns_a_copy_and_leaves_the_file_alone() {
    let path = scratch("copy.png");
    image::RgbaImage::from_pixel(3, 3, image::Rgba([9, 8, 7, 255]))
        .save(&path)
        .unwrap();
    let before = std::fs::read(&path).unwrap();

    let mut decoded = ImageAsset::fetched(&path).decode_rgba8().unwrap();
    decoded.put_pixel(0, 0, image::Rgba([0, 0, 0, 0]));

    assert_eq!(std::fs::read(&path).unwrap(), before);
}

fn png_bytes(w: u32, h: u32) -> Vec<u8> {
    let mut buf = std::io::Cursor::new(Vec::new());
    image::RgbaImage::from_pixel(w, h, image::Rgba([10, 20, 30, 255]))
        .write_to(&mut buf, image::ImageFormat::Png)
        .unwrap();
    buf.into_inner()
}

#[test]
fn extensionless_image_is_sniffed_from_its_content() {
    let path = scratch("cached_0");
    std::fs::write(&path, png_bytes(9, 5)).unwrap();

    let asset = ImageAsset::fetched(&path);
    assert_eq!(asset.dimensions().unwrap(), FrameSize::new(9, 5));
    assert_eq!(asset.format(), Some(image::ImageFormat::Png));
    assert_eq!(asset.decode_rgba8().unwrap().dimensions(), (9, 5));
}

#[test]
fn misnamed_image_uses_its_real_format() {
    let path = scratch("really-a-png.jpg");
    std::fs::write(&path, png_bytes(6, 4)).unwrap();

    let asset = ImageAsset::uploaded(&path);
    assert_eq!(asset.dimensions().unwrap(), FrameSize::new(6, 4));
    assert_eq!(asset.format(), Some(image::ImageFormat::Png));
}
