// Upload hook: prefix rename followed by watermarking

use super::common::{bitmap_only_processor, gradient, solid, text_config, write_image};
use bena_watermark::config::Config;
use bena_watermark::upload::{process_upload, UploadConfig};
use bena_watermark::watermark::codec::probe;
use bena_watermark::watermark::{SourceFormat, WatermarkConfig, WatermarkPosition};
use std::fs;
use tempfile::TempDir;

fn prefix(raw: &str) -> UploadConfig {
    UploadConfig {
        enable_filename_prefix: true,
        filename_prefix: raw.to_string(),
    }
}

#[test]
fn test_upload_is_renamed_then_watermarked() {
    let dir = TempDir::new().unwrap();
    let path = write_image(
        dir.path(),
        "Holiday Photo.png",
        &solid(200, 100, [0, 0, 0, 255]),
        SourceFormat::Png,
    );
    let before = fs::read(&path).unwrap();

    let final_path = process_upload(
        &path,
        &prefix("Bena Shop"),
        &bitmap_only_processor(),
        &text_config("bena", WatermarkPosition::Center),
    );

    assert_eq!(final_path, dir.path().join("bena-shop-Holiday Photo.png"));
    assert!(!path.exists());
    assert_ne!(fs::read(&final_path).unwrap(), before);
    assert_eq!(probe(&final_path).unwrap().mime, "image/png");
}

#[test]
fn test_already_prefixed_upload_keeps_name() {
    let dir = TempDir::new().unwrap();
    let path = write_image(dir.path(), "bena_logo.jpg", &gradient(50, 50), SourceFormat::Jpeg);

    let final_path = process_upload(
        &path,
        &prefix("bena"),
        &bitmap_only_processor(),
        &WatermarkConfig::default(),
    );

    assert_eq!(final_path, path);
    assert!(path.exists());
}

#[test]
fn test_prefix_collision_gets_counter() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("bena-photo.jpg"), b"taken").unwrap();
    let path = write_image(dir.path(), "photo.jpg", &gradient(50, 50), SourceFormat::Jpeg);

    let final_path = process_upload(
        &path,
        &prefix("bena"),
        &bitmap_only_processor(),
        &WatermarkConfig::default(),
    );

    assert_eq!(final_path, dir.path().join("bena-photo-1.jpg"));
    assert_eq!(fs::read(dir.path().join("bena-photo.jpg")).unwrap(), b"taken");
}

#[test]
fn test_non_image_upload_is_renamed_but_untouched() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("manual.pdf");
    fs::write(&path, b"%PDF-1.7").unwrap();

    let final_path = process_upload(
        &path,
        &prefix("bena"),
        &bitmap_only_processor(),
        &text_config("bena", WatermarkPosition::Center),
    );

    assert_eq!(final_path, dir.path().join("bena-manual.pdf"));
    assert_eq!(fs::read(&final_path).unwrap(), b"%PDF-1.7");
}

#[test]
fn test_config_file_drives_upload() {
    let dir = TempDir::new().unwrap();
    let overlay = write_image(
        dir.path(),
        "logo.png",
        &solid(30, 30, [255, 0, 0, 255]),
        SourceFormat::Png,
    );
    let path = write_image(
        dir.path(),
        "photo.png",
        &solid(300, 300, [0, 0, 0, 255]),
        SourceFormat::Png,
    );

    let yaml = format!(
        r#"
watermark:
  mode: image
  overlay_path: "{}"
  scale_percent: 20
  position: top-left
upload:
  enable_filename_prefix: true
  filename_prefix: "site"
"#,
        overlay.display()
    );
    let config = Config::from_yaml_with_env(&yaml).unwrap();
    assert!(config.validate().is_ok());

    let final_path = process_upload(
        &path,
        &config.upload,
        &bitmap_only_processor(),
        &config.watermark.sanitized(),
    );

    assert_eq!(final_path, dir.path().join("site-photo.png"));
    let result = image::open(&final_path).unwrap().to_rgba8();
    // Default opacity 80 -> partially red
    let px = result.get_pixel(30, 30);
    assert!(px[0] > 150 && px[1] == 0, "{:?}", px);
    assert_eq!(*result.get_pixel(5, 5), image::Rgba([0, 0, 0, 255]));
}
