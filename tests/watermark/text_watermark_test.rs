// Text watermarking through WatermarkProcessor

use super::common::{bitmap_only_processor, gradient, solid, text_config, write_image};
use bena_watermark::watermark::codec::{decode_base, probe};
use bena_watermark::watermark::text_renderer::TextStrategy;
use bena_watermark::watermark::{
    AppliedKind, FontLocator, ImageInfo, PlacementPosition, SourceFormat, WatermarkOutcome,
    WatermarkPosition, WatermarkProcessor,
};
use std::fs;
use std::sync::Arc;
use tempfile::TempDir;

#[test]
fn test_text_without_font_falls_back_to_bitmap_on_jpeg() {
    let dir = TempDir::new().unwrap();
    let path = write_image(dir.path(), "photo.jpg", &gradient(640, 480), SourceFormat::Jpeg);
    let before = fs::read(&path).unwrap();

    let outcome = bitmap_only_processor().apply_to_file(
        &path,
        &ImageInfo::new("image/jpeg", 640, 480),
        &text_config("© bena.vn", WatermarkPosition::Center),
    );

    let WatermarkOutcome::Applied(applied) = outcome else {
        panic!("expected watermark to be applied, got {:?}", outcome);
    };
    assert_eq!(applied.kind, AppliedKind::Text(TextStrategy::Bitmap));
    // 9 cells of 9x15 centered
    assert_eq!((applied.placed.width, applied.placed.height), (81, 15));
    assert_eq!(applied.placed.position, PlacementPosition::new(280, 233));

    let after = fs::read(&path).unwrap();
    assert_ne!(after, before);
    assert_eq!(probe(&path).unwrap(), ImageInfo::new("image/jpeg", 640, 480));
}

#[test]
fn test_text_without_font_on_png_keeps_format() {
    let dir = TempDir::new().unwrap();
    let path = write_image(
        dir.path(),
        "photo.png",
        &solid(320, 240, [20, 20, 20, 255]),
        SourceFormat::Png,
    );

    let outcome = bitmap_only_processor().apply_to_file(
        &path,
        &ImageInfo::new("image/png", 320, 240),
        &text_config("© bena.vn", WatermarkPosition::BottomRight),
    );
    assert!(outcome.is_applied());

    let data = fs::read(&path).unwrap();
    assert_eq!(&data[0..4], &[0x89, 0x50, 0x4E, 0x47]);
    let result = decode_base(&data, SourceFormat::Png).unwrap();
    assert_eq!(result.dimensions(), (320, 240));

    // Text box is 81x15 at (320-81-24, 240-15-24)
    let (x0, y0) = (215, 201);
    let white = result
        .enumerate_pixels()
        .filter(|(_, _, p)| p[0] == 255)
        .collect::<Vec<_>>();
    assert!(!white.is_empty());
    for (x, y, _) in white {
        assert!(x >= x0 && x < x0 + 81 && y >= y0 && y < y0 + 15, "ink at ({}, {})", x, y);
    }
}

#[test]
fn test_whitespace_text_is_a_noop() {
    let dir = TempDir::new().unwrap();
    let path = write_image(
        dir.path(),
        "photo.png",
        &solid(50, 50, [1, 2, 3, 255]),
        SourceFormat::Png,
    );
    let before = fs::read(&path).unwrap();

    let outcome = bitmap_only_processor().apply_to_file(
        &path,
        &ImageInfo::new("image/png", 50, 50),
        &text_config("  \t ", WatermarkPosition::Center),
    );

    assert!(outcome.is_skipped());
    assert_eq!(fs::read(&path).unwrap(), before);
}

#[test]
fn test_unreadable_font_still_renders() {
    let dir = TempDir::new().unwrap();
    let font = dir.path().join("broken.ttf");
    fs::write(&font, b"not a font").unwrap();
    let processor = WatermarkProcessor::new(Arc::new(FontLocator::new(vec![font])));

    let path = write_image(
        dir.path(),
        "photo.png",
        &solid(200, 100, [0, 0, 0, 255]),
        SourceFormat::Png,
    );
    let outcome = processor.apply_to_file(
        &path,
        &ImageInfo::new("image/png", 200, 100),
        &text_config("bena", WatermarkPosition::TopLeft),
    );

    let WatermarkOutcome::Applied(applied) = outcome else {
        panic!("expected watermark to be applied, got {:?}", outcome);
    };
    assert_eq!(applied.kind, AppliedKind::Text(TextStrategy::Bitmap));
    assert_eq!(applied.placed.position, PlacementPosition::new(24, 24));
}
