//! Text watermark rendering.
//!
//! Text is drawn straight onto the base image. Two strategies exist:
//!
//! - **Vector**: a TrueType font from the [`FontLocator`] rendered with
//!   `ab_glyph`. The ink bounding box positions the text, and the baseline
//!   sits at `top + text height`.
//! - **Bitmap**: a fixed 9x15 cell per character using the `font8x8`
//!   glyphs. Used whenever no font resolves, the font fails to parse, or the
//!   measured ink box is empty.
//!
//! # Example
//!
//! ```
//! use bena_watermark::watermark::text_renderer::{parse_hex_color, Color};
//!
//! assert_eq!(parse_hex_color("#fff").unwrap(), Color::new(255, 255, 255));
//! assert_eq!(parse_hex_color("#FF0000").unwrap(), Color::new(255, 0, 0));
//! ```

use super::compositor::PlacedWatermark;
use super::font::FontLocator;
use super::opacity::{alpha_delta, blend_over, from_gd_alpha};
use super::position::{calculate_position, ImageDimensions, WatermarkDimensions, TEXT_MARGIN};
use super::{WatermarkConfig, WatermarkError};
use ab_glyph::{point, Font, GlyphId, PxScale, Rect, ScaleFont};
use font8x8::{UnicodeFonts, BASIC_FONTS, LATIN_FONTS};
use image::{Rgba, RgbaImage};

/// Width of one bitmap fallback cell.
pub const BITMAP_CELL_WIDTH: u32 = 9;

/// Height of one bitmap fallback cell.
pub const BITMAP_CELL_HEIGHT: u32 = 15;

/// Top padding of the 8x8 glyph inside its cell.
const BITMAP_GLYPH_TOP: u32 = 3;

/// Pixels per inch used to turn point sizes into pixels.
const DPI: f32 = 96.0;

/// RGB color parsed from hex.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub fn white() -> Self {
        Self::new(255, 255, 255)
    }

    fn with_alpha(self, alpha: u8) -> Rgba<u8> {
        Rgba([self.r, self.g, self.b, alpha])
    }
}

/// Which strategy drew the text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextStrategy {
    Vector,
    Bitmap,
}

/// Result of a successful text render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderedText {
    pub placed: PlacedWatermark,
    pub strategy: TextStrategy,
}

/// Parse a hex color string into RGB components.
///
/// Supports `#RGB` (each nibble doubled) and `#RRGGBB`.
pub fn parse_hex_color(hex: &str) -> Result<Color, WatermarkError> {
    let hex = hex
        .trim()
        .strip_prefix('#')
        .ok_or_else(|| WatermarkError::Render("Color must start with '#'".to_string()))?;

    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(WatermarkError::Render(format!("Invalid hex color: #{}", hex)));
    }

    let channel = |digits: &str| -> Result<u8, WatermarkError> {
        u8::from_str_radix(digits, 16)
            .map_err(|_| WatermarkError::Render(format!("Invalid hex digit in #{}", hex)))
    };

    match hex.len() {
        // 0xF -> 0xFF, 0xA -> 0xAA
        3 => Ok(Color::new(
            channel(&hex[0..1])? * 17,
            channel(&hex[1..2])? * 17,
            channel(&hex[2..3])? * 17,
        )),
        6 => Ok(Color::new(
            channel(&hex[0..2])?,
            channel(&hex[2..4])?,
            channel(&hex[4..6])?,
        )),
        n => Err(WatermarkError::Render(format!(
            "Color must be #RGB or #RRGGBB format, got {} characters",
            n
        ))),
    }
}

/// Point size to an `ab_glyph` scale, treating the size as the em height.
fn scale_for_points<F: Font>(font: &F, size_pt: f32) -> PxScale {
    let px_per_em = size_pt * DPI / 72.0;
    match font.units_per_em() {
        Some(upem) if upem > 0.0 => PxScale::from(px_per_em * font.height_unscaled() / upem),
        _ => PxScale::from(px_per_em),
    }
}

/// Ink bounds of `text` laid out from the origin on a baseline at y = 0.
fn ink_bounds<F: Font>(font: &F, scale: PxScale, text: &str) -> Option<Rect> {
    let scaled = font.as_scaled(scale);
    let mut caret = 0.0f32;
    let mut prev: Option<GlyphId> = None;
    let mut bounds: Option<Rect> = None;

    for c in text.chars() {
        let id = scaled.glyph_id(c);
        if let Some(prev) = prev {
            caret += scaled.kern(prev, id);
        }
        let glyph = id.with_scale_and_position(scale, point(caret, 0.0));
        if let Some(outlined) = font.outline_glyph(glyph) {
            let b = outlined.px_bounds();
            bounds = Some(match bounds {
                None => b,
                Some(acc) => Rect {
                    min: point(acc.min.x.min(b.min.x), acc.min.y.min(b.min.y)),
                    max: point(acc.max.x.max(b.max.x), acc.max.y.max(b.max.y)),
                },
            });
        }
        caret += scaled.h_advance(id);
        prev = Some(id);
    }

    bounds
}

/// Width and height of the ink box, or `None` when nothing would be drawn.
pub fn measure_vector<F: Font>(font: &F, text: &str, size_pt: u32) -> Option<(u32, u32)> {
    let scale = scale_for_points(font, size_pt as f32);
    let bounds = ink_bounds(font, scale, text)?;
    let width = (bounds.max.x - bounds.min.x).ceil();
    let height = (bounds.max.y - bounds.min.y).ceil();
    if width < 1.0 || height < 1.0 {
        return None;
    }
    Some((width as u32, height as u32))
}

/// Draw `text` with the caret starting at `x` and the baseline at `baseline`.
fn draw_vector<F: Font>(
    canvas: &mut RgbaImage,
    font: &F,
    text: &str,
    size_pt: u32,
    x: f32,
    baseline: f32,
    ink: Rgba<u8>,
) {
    let scale = scale_for_points(font, size_pt as f32);
    let scaled = font.as_scaled(scale);
    let (canvas_w, canvas_h) = (i64::from(canvas.width()), i64::from(canvas.height()));

    let mut caret = x;
    let mut prev: Option<GlyphId> = None;

    for c in text.chars() {
        let id = scaled.glyph_id(c);
        if let Some(prev) = prev {
            caret += scaled.kern(prev, id);
        }

        let glyph = id.with_scale_and_position(scale, point(caret, baseline));
        if let Some(outlined) = font.outline_glyph(glyph) {
            let bounds = outlined.px_bounds();
            outlined.draw(|gx, gy, coverage| {
                let px = i64::from(gx) + bounds.min.x as i64;
                let py = i64::from(gy) + bounds.min.y as i64;
                if px < 0 || py < 0 || px >= canvas_w || py >= canvas_h {
                    return;
                }
                let a = (coverage.clamp(0.0, 1.0) * f32::from(ink[3])).round() as u8;
                if a == 0 {
                    return;
                }
                let (px, py) = (px as u32, py as u32);
                let bg = *canvas.get_pixel(px, py);
                canvas.put_pixel(px, py, blend_over(bg, Rgba([ink[0], ink[1], ink[2], a])));
            });
        }

        caret += scaled.h_advance(id);
        prev = Some(id);
    }
}

/// Bitmap text size: one fixed cell per character.
pub fn measure_bitmap(text: &str) -> (u32, u32) {
    let chars = text.chars().count() as u32;
    (BITMAP_CELL_WIDTH.saturating_mul(chars), BITMAP_CELL_HEIGHT)
}

fn bitmap_glyph(c: char) -> Option<[u8; 8]> {
    BASIC_FONTS.get(c).or_else(|| LATIN_FONTS.get(c))
}

fn draw_bitmap(canvas: &mut RgbaImage, text: &str, x: u32, y: u32, color: Rgba<u8>) {
    for (index, c) in text.chars().enumerate() {
        // Unknown characters still take up their cell.
        let Some(glyph) = bitmap_glyph(c) else {
            continue;
        };
        let cell_x = u64::from(x) + index as u64 * u64::from(BITMAP_CELL_WIDTH);
        let cell_y = u64::from(y) + u64::from(BITMAP_GLYPH_TOP);

        for (row, bits) in glyph.iter().enumerate() {
            for col in 0..8u64 {
                if (bits >> col) & 1 == 0 {
                    continue;
                }
                let px = cell_x + col;
                let py = cell_y + row as u64;
                if px >= u64::from(canvas.width()) || py >= u64::from(canvas.height()) {
                    continue;
                }
                let (px, py) = (px as u32, py as u32);
                let bg = *canvas.get_pixel(px, py);
                canvas.put_pixel(px, py, blend_over(bg, color));
            }
        }
    }
}

fn place(canvas: &RgbaImage, config: &WatermarkConfig, width: u32, height: u32) -> PlacedWatermark {
    let position = calculate_position(
        config.position,
        &ImageDimensions {
            width: canvas.width(),
            height: canvas.height(),
        },
        &WatermarkDimensions { width, height },
        TEXT_MARGIN,
    );
    PlacedWatermark {
        position,
        width,
        height,
    }
}

/// Draw the configured text onto `canvas`.
///
/// Uses the vector font when one resolves and measures to a non-empty box,
/// otherwise the bitmap font. Fails only for empty text.
pub fn render_text_watermark(
    canvas: &mut RgbaImage,
    text: &str,
    config: &WatermarkConfig,
    fonts: &FontLocator,
) -> Result<RenderedText, WatermarkError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(WatermarkError::Render("Cannot render empty text".to_string()));
    }

    let color = parse_hex_color(&config.text_color).unwrap_or_else(|_| Color::white());
    let alpha = from_gd_alpha(alpha_delta(config.effective_opacity()));
    let size_pt = config.effective_text_size();

    if let Some(font) = fonts.load() {
        if let Some((width, height)) = measure_vector(&font, text, size_pt) {
            let placed = place(canvas, config, width, height);
            let baseline = (placed.position.y + height) as f32;
            draw_vector(
                canvas,
                &font,
                text,
                size_pt,
                placed.position.x as f32,
                baseline,
                color.with_alpha(alpha),
            );
            return Ok(RenderedText {
                placed,
                strategy: TextStrategy::Vector,
            });
        }
        tracing::debug!(text = %text, "Vector font produced no ink, using bitmap font");
    }

    let (width, height) = measure_bitmap(text);
    let placed = place(canvas, config, width, height);
    draw_bitmap(
        canvas,
        text,
        placed.position.x,
        placed.position.y,
        color.with_alpha(alpha),
    );

    Ok(RenderedText {
        placed,
        strategy: TextStrategy::Bitmap,
    })
}
