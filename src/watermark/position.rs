//! Position calculation for watermark placement.
//!
//! Maps an anchor on the 3x3 grid to the top-left pixel offset of the
//! watermark. Centered axes are computed in floating point and rounded to the
//! nearest pixel. Offsets are floored at 0, so an oversized watermark is
//! clipped at the right/bottom edge instead of being rejected, and capped at
//! `image - watermark` so a large margin never pushes a watermark that fits
//! off the canvas.
//!
//! # Example
//!
//! ```
//! use bena_watermark::watermark::position::{
//!     calculate_position, ImageDimensions, WatermarkDimensions,
//! };
//! use bena_watermark::watermark::WatermarkPosition;
//!
//! let image = ImageDimensions { width: 1000, height: 800 };
//! let watermark = WatermarkDimensions { width: 400, height: 400 };
//!
//! let pos = calculate_position(WatermarkPosition::BottomRight, &image, &watermark, 20);
//! assert_eq!((pos.x, pos.y), (580, 380));
//! ```

use super::WatermarkPosition;

/// Margin kept between an image overlay and the edges it is anchored to.
pub const IMAGE_MARGIN: u32 = 20;

/// Margin kept between a text watermark and the edges it is anchored to.
pub const TEXT_MARGIN: u32 = 24;

/// Dimensions of the target image.
#[derive(Debug, Clone, Copy)]
pub struct ImageDimensions {
    pub width: u32,
    pub height: u32,
}

/// Dimensions of the watermark to be placed.
#[derive(Debug, Clone, Copy)]
pub struct WatermarkDimensions {
    pub width: u32,
    pub height: u32,
}

/// Top-left corner where the watermark is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlacementPosition {
    pub x: u32,
    pub y: u32,
}

impl PlacementPosition {
    pub fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }
}

/// Calculate where a watermark goes for the given anchor.
///
/// # Arguments
///
/// * `position` - The configured anchor
/// * `image` - Dimensions of the target image
/// * `watermark` - Dimensions of the watermark
/// * `margin` - Distance from the anchored edges in pixels
pub fn calculate_position(
    position: WatermarkPosition,
    image: &ImageDimensions,
    watermark: &WatermarkDimensions,
    margin: u32,
) -> PlacementPosition {
    let img_w = f64::from(image.width);
    let img_h = f64::from(image.height);
    let wm_w = f64::from(watermark.width);
    let wm_h = f64::from(watermark.height);
    let m = f64::from(margin);

    let left = m;
    let center_x = (img_w - wm_w) / 2.0;
    let right = img_w - wm_w - m;
    let top = m;
    let center_y = (img_h - wm_h) / 2.0;
    let bottom = img_h - wm_h - m;

    let (x, y) = match position {
        // Top row
        WatermarkPosition::TopLeft => (left, top),
        WatermarkPosition::TopCenter => (center_x, top),
        WatermarkPosition::TopRight => (right, top),

        // Center row
        WatermarkPosition::CenterLeft => (left, center_y),
        WatermarkPosition::Center => (center_x, center_y),
        WatermarkPosition::CenterRight => (right, center_y),

        // Bottom row
        WatermarkPosition::BottomLeft => (left, bottom),
        WatermarkPosition::BottomCenter => (center_x, bottom),
        WatermarkPosition::BottomRight => (right, bottom),
    };

    PlacementPosition::new(
        to_pixel(x, image.width.saturating_sub(watermark.width)),
        to_pixel(y, image.height.saturating_sub(watermark.height)),
    )
}

/// Round half away from zero, then keep the watermark's origin inside
/// `0..=max`.
fn to_pixel(value: f64, max: u32) -> u32 {
    (value.max(0.0).round() as u32).min(max)
}
