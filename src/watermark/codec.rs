//! Image probing, decoding and re-encoding.
//!
//! Only JPEG and PNG bases are watermarked. Output always keeps the source
//! format: JPEG is written at quality 90, PNG at zlib level 6 with alpha.
//! Write-back goes through a sibling temp file so the original is either
//! fully replaced or left untouched.

use super::WatermarkError;
use image::codecs::png::{CompressionType, FilterType};
use image::io::Reader as ImageReader;
use image::{ImageFormat, RgbaImage};
use std::fs;
use std::path::{Path, PathBuf};

/// JPEG quality used when re-encoding a watermarked JPEG.
pub const JPEG_QUALITY: u8 = 90;

/// zlib level used when re-encoding a watermarked PNG.
pub const PNG_COMPRESSION_LEVEL: u8 = 6;

/// Base image formats the engine can watermark.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Jpeg,
    Png,
}

impl SourceFormat {
    pub fn from_mime(mime: &str) -> Option<Self> {
        match mime.trim().to_ascii_lowercase().as_str() {
            "image/jpeg" | "image/jpg" | "image/pjpeg" => Some(Self::Jpeg),
            "image/png" => Some(Self::Png),
            _ => None,
        }
    }

    pub fn mime(&self) -> &'static str {
        match self {
            Self::Jpeg => "image/jpeg",
            Self::Png => "image/png",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Jpeg => "jpeg",
            Self::Png => "png",
        }
    }

    fn image_format(&self) -> ImageFormat {
        match self {
            Self::Jpeg => ImageFormat::Jpeg,
            Self::Png => ImageFormat::Png,
        }
    }
}

/// Decoded metadata of an uploaded file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageInfo {
    pub mime: String,
    pub width: u32,
    pub height: u32,
}

impl ImageInfo {
    pub fn new(mime: impl Into<String>, width: u32, height: u32) -> Self {
        Self {
            mime: mime.into(),
            width,
            height,
        }
    }

    /// `None` for anything other than JPEG or PNG.
    pub fn format(&self) -> Option<SourceFormat> {
        SourceFormat::from_mime(&self.mime)
    }
}

fn mime_for(format: ImageFormat) -> &'static str {
    match format {
        ImageFormat::Jpeg => "image/jpeg",
        ImageFormat::Png => "image/png",
        ImageFormat::Gif => "image/gif",
        ImageFormat::WebP => "image/webp",
        ImageFormat::Bmp => "image/bmp",
        ImageFormat::Tiff => "image/tiff",
        ImageFormat::Avif => "image/avif",
        ImageFormat::Ico => "image/x-icon",
        _ => "application/octet-stream",
    }
}

/// Read mime type and pixel size from the file header.
///
/// Returns `None` for missing files, unknown formats, or headers the
/// decoder cannot read.
pub fn probe(path: &Path) -> Option<ImageInfo> {
    let reader = ImageReader::open(path).ok()?.with_guessed_format().ok()?;
    let format = reader.format()?;
    let (width, height) = reader.into_dimensions().ok()?;
    Some(ImageInfo::new(mime_for(format), width, height))
}

/// Decode a base image of a known format into RGBA.
pub fn decode_base(data: &[u8], format: SourceFormat) -> Result<RgbaImage, WatermarkError> {
    image::load_from_memory_with_format(data, format.image_format())
        .map(|img| img.to_rgba8())
        .map_err(|e| WatermarkError::decode(format!("{} base: {}", format.name(), e)))
}

/// Decode the overlay asset. Overlays must be PNG; alpha is preserved.
pub fn decode_overlay(path: &Path) -> Result<RgbaImage, WatermarkError> {
    if !path.is_file() {
        return Err(WatermarkError::MissingAsset(path.to_path_buf()));
    }
    let data = fs::read(path)?;
    image::load_from_memory_with_format(&data, ImageFormat::Png)
        .map(|img| img.to_rgba8())
        .map_err(|e| WatermarkError::decode(format!("overlay {}: {}", path.display(), e)))
}

/// Trait for the format-specific re-encoders.
pub trait ImageEncoder: Send + Sync {
    fn format(&self) -> SourceFormat;

    /// Encode an RGBA buffer to the target format in memory.
    fn encode(&self, image: &RgbaImage) -> Result<Vec<u8>, WatermarkError>;
}

/// JPEG encoder; alpha is dropped.
pub struct JpegEncoder {
    pub quality: u8,
}

impl Default for JpegEncoder {
    fn default() -> Self {
        Self {
            quality: JPEG_QUALITY,
        }
    }
}

impl ImageEncoder for JpegEncoder {
    fn format(&self) -> SourceFormat {
        SourceFormat::Jpeg
    }

    fn encode(&self, image: &RgbaImage) -> Result<Vec<u8>, WatermarkError> {
        use image::codecs::jpeg::JpegEncoder as ImageJpegEncoder;
        use image::ImageEncoder as _;
        use std::io::Cursor;

        let rgb_data = rgba_to_rgb(image.as_raw());

        let mut output = Cursor::new(Vec::new());
        let encoder = ImageJpegEncoder::new_with_quality(&mut output, self.quality.clamp(1, 100));

        encoder
            .write_image(
                &rgb_data,
                image.width(),
                image.height(),
                image::ColorType::Rgb8,
            )
            .map_err(|e| WatermarkError::encode("jpeg", e.to_string()))?;

        Ok(output.into_inner())
    }
}

/// PNG encoder; always writes RGBA.
pub struct PngEncoder {
    /// zlib level, 0-9
    pub compression_level: u8,
}

impl Default for PngEncoder {
    fn default() -> Self {
        Self {
            compression_level: PNG_COMPRESSION_LEVEL,
        }
    }
}

impl PngEncoder {
    fn compression(&self) -> CompressionType {
        match self.compression_level {
            0..=3 => CompressionType::Fast,
            4..=6 => CompressionType::Default,
            _ => CompressionType::Best,
        }
    }
}

impl ImageEncoder for PngEncoder {
    fn format(&self) -> SourceFormat {
        SourceFormat::Png
    }

    fn encode(&self, image: &RgbaImage) -> Result<Vec<u8>, WatermarkError> {
        use image::codecs::png::PngEncoder as ImagePngEncoder;
        use image::ImageEncoder as _;
        use std::io::Cursor;

        let mut output = Cursor::new(Vec::new());
        let encoder = ImagePngEncoder::new_with_quality(
            &mut output,
            self.compression(),
            FilterType::Adaptive,
        );

        encoder
            .write_image(
                image.as_raw(),
                image.width(),
                image.height(),
                image::ColorType::Rgba8,
            )
            .map_err(|e| WatermarkError::encode("png", e.to_string()))?;

        Ok(output.into_inner())
    }
}

/// Factory for creating encoders based on source format
pub struct EncoderFactory;

impl EncoderFactory {
    pub fn create(format: SourceFormat) -> Box<dyn ImageEncoder> {
        match format {
            SourceFormat::Jpeg => Box::<JpegEncoder>::default(),
            SourceFormat::Png => Box::<PngEncoder>::default(),
        }
    }
}

/// Encode with the re-encode policy for `format`.
pub fn encode(image: &RgbaImage, format: SourceFormat) -> Result<Vec<u8>, WatermarkError> {
    EncoderFactory::create(format).encode(image)
}

/// Convert RGBA to RGB by discarding alpha channel
fn rgba_to_rgb(rgba: &[u8]) -> Vec<u8> {
    let mut rgb = Vec::with_capacity(rgba.len() / 4 * 3);
    for chunk in rgba.chunks_exact(4) {
        rgb.extend_from_slice(&chunk[..3]);
    }
    rgb
}

fn temp_path_for(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!(".{}.bena-tmp", name))
}

/// Replace `path` with `data` via a sibling temp file and a rename.
///
/// The original keeps its permissions. On failure the temp file is removed
/// and the original is untouched.
pub fn write_atomically(path: &Path, data: &[u8]) -> Result<(), WatermarkError> {
    let tmp = temp_path_for(path);

    let result = fs::write(&tmp, data).and_then(|_| {
        if let Ok(meta) = fs::metadata(path) {
            fs::set_permissions(&tmp, meta.permissions())?;
        }
        fs::rename(&tmp, path)
    });

    if let Err(e) = result {
        let _ = fs::remove_file(&tmp);
        return Err(e.into());
    }
    Ok(())
}
