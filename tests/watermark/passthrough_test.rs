// Files that must come out byte-identical

use super::common::{bitmap_only_processor, gradient, image_config, text_config, write_image};
use bena_watermark::watermark::codec::probe;
use bena_watermark::watermark::{
    ImageInfo, SkipReason, SourceFormat, WatermarkConfig, WatermarkMode, WatermarkOutcome,
    WatermarkPosition,
};
use std::fs;
use tempfile::TempDir;

#[test]
fn test_mode_none_is_byte_identical() {
    let dir = TempDir::new().unwrap();
    let jpeg = write_image(dir.path(), "a.jpg", &gradient(300, 200), SourceFormat::Jpeg);
    let png = write_image(dir.path(), "b.png", &gradient(300, 200), SourceFormat::Png);
    let processor = bitmap_only_processor();

    for path in [&jpeg, &png] {
        let before = fs::read(path).unwrap();
        let info = probe(path).unwrap();
        let config = WatermarkConfig {
            mode: WatermarkMode::None,
            text: "ignored".to_string(),
            ..Default::default()
        };

        let outcome = processor.apply_to_file(path, &info, &config);

        assert!(matches!(outcome, WatermarkOutcome::Skipped(SkipReason::Disabled)));
        assert_eq!(fs::read(path).unwrap(), before);
    }
}

#[test]
fn test_unsupported_format_is_untouched() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("image.webp");
    let payload = b"RIFF\x1a\x00\x00\x00WEBPVP8 fake".to_vec();
    fs::write(&path, &payload).unwrap();

    let outcome = bitmap_only_processor().apply_to_file(
        &path,
        &ImageInfo::new("image/webp", 16, 16),
        &text_config("bena", WatermarkPosition::Center),
    );

    assert!(matches!(
        outcome,
        WatermarkOutcome::Skipped(SkipReason::UnsupportedFormat(_))
    ));
    assert_eq!(fs::read(&path).unwrap(), payload);
}

#[test]
fn test_missing_overlay_is_untouched() {
    let dir = TempDir::new().unwrap();
    let path = write_image(dir.path(), "photo.jpg", &gradient(120, 80), SourceFormat::Jpeg);
    let before = fs::read(&path).unwrap();

    let outcome = bitmap_only_processor().apply_to_file(
        &path,
        &ImageInfo::new("image/jpeg", 120, 80),
        &image_config(dir.path().join("nope.png"), 50, WatermarkPosition::Center),
    );

    assert!(matches!(
        outcome,
        WatermarkOutcome::Skipped(SkipReason::OverlayMissing)
    ));
    assert_eq!(fs::read(&path).unwrap(), before);
}

#[test]
fn test_image_mode_without_overlay_is_untouched() {
    let dir = TempDir::new().unwrap();
    let path = write_image(dir.path(), "photo.png", &gradient(60, 60), SourceFormat::Png);
    let before = fs::read(&path).unwrap();

    let config = WatermarkConfig {
        mode: WatermarkMode::Image,
        ..Default::default()
    };
    let outcome =
        bitmap_only_processor().apply_to_file(&path, &ImageInfo::new("image/png", 60, 60), &config);

    assert!(matches!(
        outcome,
        WatermarkOutcome::Skipped(SkipReason::NoOverlayConfigured)
    ));
    assert_eq!(fs::read(&path).unwrap(), before);
}

#[test]
fn test_corrupt_overlay_is_untouched() {
    let dir = TempDir::new().unwrap();
    let path = write_image(dir.path(), "photo.png", &gradient(80, 80), SourceFormat::Png);
    let before = fs::read(&path).unwrap();
    let overlay = dir.path().join("logo.png");
    fs::write(&overlay, b"\x89PNG\r\n\x1a\n\x00\x00garbage").unwrap();

    let outcome = bitmap_only_processor().apply_to_file(
        &path,
        &ImageInfo::new("image/png", 80, 80),
        &image_config(overlay, 50, WatermarkPosition::Center),
    );

    assert!(outcome.is_failed());
    assert_eq!(fs::read(&path).unwrap(), before);
    // No temp file left behind
    assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 2);
}

#[test]
fn test_mime_claims_jpeg_but_bytes_are_not() {
    let dir = TempDir::new().unwrap();
    let path = write_image(dir.path(), "liar.jpg", &gradient(40, 40), SourceFormat::Png);
    let before = fs::read(&path).unwrap();

    let outcome = bitmap_only_processor().apply_to_file(
        &path,
        &ImageInfo::new("image/jpeg", 40, 40),
        &text_config("x", WatermarkPosition::Center),
    );

    assert!(outcome.is_failed());
    assert_eq!(fs::read(&path).unwrap(), before);
}
