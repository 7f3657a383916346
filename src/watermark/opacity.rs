//! Opacity handling for watermark layers.
//!
//! Opacity is expressed as an alpha *delta* in the 7-bit inverted alpha
//! model (0 = opaque, 127 = fully transparent) that is added to every pixel
//! of an overlay. Decoded buffers carry regular 8-bit straight alpha, so the
//! delta is applied through the classic 7-bit/8-bit mapping:
//!
//! ```text
//! a7 = 127 - (a8 >> 1)
//! a8 = 255 - ((a7 << 1) + (a7 >> 6))
//! ```

use image::{Rgba, RgbaImage};

/// Largest value in the 7-bit alpha model (fully transparent).
pub const MAX_ALPHA_DELTA: u8 = 127;

/// Convert a visibility percentage (100 = fully visible) to a 7-bit delta.
///
/// ```
/// use bena_watermark::watermark::opacity::alpha_delta;
///
/// assert_eq!(alpha_delta(100), 0);
/// assert_eq!(alpha_delta(50), 64);
/// assert_eq!(alpha_delta(0), 127);
/// ```
pub fn alpha_delta(opacity_percent: u32) -> u8 {
    let hidden = 100 - opacity_percent.min(100);
    let delta = (f64::from(hidden) * 1.27).round();
    delta.clamp(0.0, f64::from(MAX_ALPHA_DELTA)) as u8
}

/// 8-bit straight alpha to the 7-bit inverted model.
pub fn to_gd_alpha(a8: u8) -> u8 {
    MAX_ALPHA_DELTA - (a8 >> 1)
}

/// 7-bit inverted alpha back to 8-bit straight alpha.
pub fn from_gd_alpha(a7: u8) -> u8 {
    let a7 = a7.min(MAX_ALPHA_DELTA);
    255 - ((a7 << 1) + (a7 >> 6))
}

/// Lookup table mapping every 8-bit alpha to its value after adding `delta`.
fn delta_table(delta: u8) -> [u8; 256] {
    let mut table = [0u8; 256];
    for (a8, slot) in table.iter_mut().enumerate() {
        let a7 = to_gd_alpha(a8 as u8).saturating_add(delta).min(MAX_ALPHA_DELTA);
        *slot = from_gd_alpha(a7);
    }
    table
}

/// Add `delta` to the alpha of every pixel, leaving RGB untouched.
///
/// A delta of 0 leaves the buffer exactly as it was.
pub fn apply_alpha_delta(image: &mut RgbaImage, delta: u8) {
    if delta == 0 {
        return;
    }

    let table = delta_table(delta.min(MAX_ALPHA_DELTA));
    for px in image.as_mut().chunks_exact_mut(4) {
        px[3] = table[px[3] as usize];
    }
}

/// Straight-alpha "over": composite `foreground` onto `background`.
///
/// result = fg * fg.alpha + bg * bg.alpha * (1 - fg.alpha), divided by the
/// resulting alpha.
pub fn blend_over(background: Rgba<u8>, foreground: Rgba<u8>) -> Rgba<u8> {
    let fg_alpha = f32::from(foreground[3]) / 255.0;
    if foreground[3] == 0 {
        return background;
    }
    if foreground[3] == 255 {
        return foreground;
    }

    let bg_alpha = f32::from(background[3]) / 255.0;
    let out_alpha = fg_alpha + bg_alpha * (1.0 - fg_alpha);

    let blend_channel = |fg: u8, bg: u8| -> u8 {
        let fg_f = f32::from(fg);
        let bg_f = f32::from(bg);
        let result = (fg_f * fg_alpha + bg_f * bg_alpha * (1.0 - fg_alpha)) / out_alpha;
        result.round().clamp(0.0, 255.0) as u8
    };

    Rgba([
        blend_channel(foreground[0], background[0]),
        blend_channel(foreground[1], background[1]),
        blend_channel(foreground[2], background[2]),
        (out_alpha * 255.0).round().clamp(0.0, 255.0) as u8,
    ])
}
