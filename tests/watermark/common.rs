// Shared fixtures for the integration tests

use bena_watermark::watermark::codec::encode;
use bena_watermark::watermark::{
    FontLocator, SourceFormat, WatermarkConfig, WatermarkMode, WatermarkPosition,
    WatermarkProcessor,
};
use image::{Rgba, RgbaImage};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Processor that never finds a vector font.
pub fn bitmap_only_processor() -> WatermarkProcessor {
    WatermarkProcessor::new(Arc::new(FontLocator::new(Vec::new())))
}

pub fn solid(width: u32, height: u32, color: [u8; 4]) -> RgbaImage {
    RgbaImage::from_pixel(width, height, Rgba(color))
}

/// Gradient so JPEG output is not trivially compressible.
pub fn gradient(width: u32, height: u32) -> RgbaImage {
    RgbaImage::from_fn(width, height, |x, y| {
        Rgba([(x % 200) as u8, (y % 200) as u8, 60, 255])
    })
}

pub fn write_image(dir: &Path, name: &str, img: &RgbaImage, format: SourceFormat) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, encode(img, format).expect("encode fixture")).expect("write fixture");
    path
}

pub fn image_config(overlay: PathBuf, scale: i32, position: WatermarkPosition) -> WatermarkConfig {
    WatermarkConfig {
        mode: WatermarkMode::Image,
        scale_percent: scale,
        opacity_percent: 100,
        position,
        overlay_path: Some(overlay),
        ..Default::default()
    }
}

pub fn text_config(text: &str, position: WatermarkPosition) -> WatermarkConfig {
    WatermarkConfig {
        mode: WatermarkMode::Text,
        text: text.to_string(),
        text_color: "#ffffff".to_string(),
        text_size_pt: 24,
        opacity_percent: 100,
        position,
        ..Default::default()
    }
}

/// Largest per-channel difference, for lossy comparisons.
pub fn channel_distance(a: Rgba<u8>, b: Rgba<u8>) -> u8 {
    a.0.iter()
        .zip(b.0.iter())
        .take(3)
        .map(|(x, y)| x.abs_diff(*y))
        .max()
        .unwrap_or(0)
}
