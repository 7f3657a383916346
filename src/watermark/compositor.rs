//! Image watermark compositing.
//!
//! Steps for an overlay asset:
//!
//! 1. Decode the PNG overlay with its alpha channel
//! 2. Fit it inside `base size * scale%`, downscaling only
//! 3. Fade it by the configured opacity
//! 4. Place it on the anchor with a 20px margin
//! 5. Blend it onto the base, clipping at the canvas edge

use super::codec::decode_overlay;
use super::opacity::{alpha_delta, apply_alpha_delta, blend_over};
use super::position::{
    calculate_position, ImageDimensions, PlacementPosition, WatermarkDimensions, IMAGE_MARGIN,
};
use super::{WatermarkConfig, WatermarkError};
use fast_image_resize::{FilterType, Image, MulDiv, PixelType, ResizeAlg, Resizer};
use image::RgbaImage;
use std::num::NonZeroU32;
use std::path::Path;

/// Lower bound of the downscale factor.
pub const MIN_SCALE_FACTOR: f64 = 0.1;

/// Where and how large a watermark ended up on the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlacedWatermark {
    pub position: PlacementPosition,
    pub width: u32,
    pub height: u32,
}

/// Bounding box for the overlay: `scale_percent` of each base dimension,
/// never smaller than one pixel.
pub fn bounding_box(base_width: u32, base_height: u32, scale_percent: u32) -> (u32, u32) {
    let factor = f64::from(scale_percent) / 100.0;
    let w = (f64::from(base_width) * factor).round().max(1.0) as u32;
    let h = (f64::from(base_height) * factor).round().max(1.0) as u32;
    (w, h)
}

/// Size of the overlay after fitting it into `box_w` x `box_h`.
///
/// An overlay that already fits is returned unchanged; overlays are never
/// enlarged. Otherwise both sides shrink by the smaller fit ratio, clamped to
/// [`MIN_SCALE_FACTOR`, 1].
pub fn fit_within_box(width: u32, height: u32, box_w: u32, box_h: u32) -> (u32, u32) {
    if width <= box_w && height <= box_h {
        return (width, height);
    }

    let ratio_w = f64::from(box_w) / f64::from(width.max(1));
    let ratio_h = f64::from(box_h) / f64::from(height.max(1));
    let scale = ratio_w.min(ratio_h).clamp(MIN_SCALE_FACTOR, 1.0);

    let w = (f64::from(width) * scale).round().max(1.0) as u32;
    let h = (f64::from(height) * scale).round().max(1.0) as u32;
    (w, h)
}

/// Resample an RGBA buffer to the target size.
///
/// Alpha is premultiplied for the convolution so transparent pixels do not
/// bleed their color into the edges.
pub fn resize_overlay(
    overlay: &RgbaImage,
    target_w: u32,
    target_h: u32,
) -> Result<RgbaImage, WatermarkError> {
    if overlay.width() == target_w && overlay.height() == target_h {
        return Ok(overlay.clone());
    }

    let src_width = NonZeroU32::new(overlay.width())
        .ok_or_else(|| WatermarkError::Resize("Source width is 0".to_string()))?;
    let src_height = NonZeroU32::new(overlay.height())
        .ok_or_else(|| WatermarkError::Resize("Source height is 0".to_string()))?;
    let dst_width = NonZeroU32::new(target_w)
        .ok_or_else(|| WatermarkError::Resize("Target width is 0".to_string()))?;
    let dst_height = NonZeroU32::new(target_h)
        .ok_or_else(|| WatermarkError::Resize("Target height is 0".to_string()))?;

    let mut src_image = Image::from_vec_u8(
        src_width,
        src_height,
        overlay.as_raw().clone(),
        PixelType::U8x4,
    )
    .map_err(|e| WatermarkError::Resize(format!("Failed to create source image: {:?}", e)))?;

    let mul_div = MulDiv::default();
    mul_div
        .multiply_alpha_inplace(&mut src_image.view_mut())
        .map_err(|e| WatermarkError::Resize(format!("Failed to premultiply alpha: {:?}", e)))?;

    let mut dst_image = Image::new(dst_width, dst_height, PixelType::U8x4);
    let mut resizer = Resizer::new(ResizeAlg::Convolution(FilterType::Bilinear));
    resizer
        .resize(&src_image.view(), &mut dst_image.view_mut())
        .map_err(|e| WatermarkError::Resize(format!("Resize operation failed: {:?}", e)))?;

    mul_div
        .divide_alpha_inplace(&mut dst_image.view_mut())
        .map_err(|e| WatermarkError::Resize(format!("Failed to unpremultiply alpha: {:?}", e)))?;

    RgbaImage::from_raw(target_w, target_h, dst_image.into_vec())
        .ok_or_else(|| WatermarkError::Resize("Failed to create output image buffer".to_string()))
}

/// Blend `overlay` onto `canvas` with its top-left corner at `position`.
/// Pixels falling outside the canvas are skipped.
pub fn composite(canvas: &mut RgbaImage, overlay: &RgbaImage, position: PlacementPosition) {
    let x_end = position
        .x
        .saturating_add(overlay.width())
        .min(canvas.width());
    let y_end = position
        .y
        .saturating_add(overlay.height())
        .min(canvas.height());

    for ty in position.y..y_end {
        for tx in position.x..x_end {
            let fg = *overlay.get_pixel(tx - position.x, ty - position.y);
            if fg[3] == 0 {
                continue;
            }
            let bg = *canvas.get_pixel(tx, ty);
            canvas.put_pixel(tx, ty, blend_over(bg, fg));
        }
    }
}

/// Stamp an already decoded overlay onto `canvas` using `config`'s scale,
/// opacity and anchor.
pub fn apply_overlay(
    canvas: &mut RgbaImage,
    overlay: RgbaImage,
    config: &WatermarkConfig,
) -> Result<PlacedWatermark, WatermarkError> {
    let (box_w, box_h) = bounding_box(canvas.width(), canvas.height(), config.effective_scale());
    let (width, height) = fit_within_box(overlay.width(), overlay.height(), box_w, box_h);

    let mut overlay = if (width, height) == overlay.dimensions() {
        overlay
    } else {
        resize_overlay(&overlay, width, height)?
    };

    apply_alpha_delta(&mut overlay, alpha_delta(config.effective_opacity()));

    let position = calculate_position(
        config.position,
        &ImageDimensions {
            width: canvas.width(),
            height: canvas.height(),
        },
        &WatermarkDimensions { width, height },
        IMAGE_MARGIN,
    );

    composite(canvas, &overlay, position);

    Ok(PlacedWatermark {
        position,
        width,
        height,
    })
}

/// Decode the overlay at `overlay_path` and stamp it onto `canvas`.
///
/// On error `canvas` has not been modified.
pub fn apply_image_watermark(
    canvas: &mut RgbaImage,
    overlay_path: &Path,
    config: &WatermarkConfig,
) -> Result<PlacedWatermark, WatermarkError> {
    let overlay = decode_overlay(overlay_path)?;
    apply_overlay(canvas, overlay, config)
}
