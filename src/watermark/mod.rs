//! Watermark engine for uploaded images.
//!
//! Stamps either an image overlay or a line of text onto a JPEG or PNG file
//! and writes it back in the same format. Watermarking is fail-soft: if
//! anything goes wrong the file stays exactly as it was uploaded.
//!
//! # Features
//!
//! - **Image watermarks**: PNG overlay fitted to a percentage of the base
//!   image, faded by an opacity setting
//! - **Text watermarks**: TrueType rendering when a font can be found, a
//!   built-in bitmap font otherwise
//! - **9 anchors** on a 3x3 grid with a fixed edge margin
//!
//! # Configuration Example
//!
//! ```yaml
//! watermark:
//!   mode: image
//!   overlay_path: /srv/assets/logo.png
//!   scale_percent: 30
//!   opacity_percent: 70
//!   position: bottom-right
//! ```

pub mod codec;
pub mod compositor;
pub mod config;
pub mod error;
pub mod font;
pub mod opacity;
pub mod position;
pub mod processor;
pub mod text_renderer;

// Re-export main types for convenience
pub use codec::{probe, ImageInfo, SourceFormat};
pub use compositor::{apply_image_watermark, PlacedWatermark};
pub use config::{preview_text, WatermarkConfig, WatermarkMode, WatermarkPosition};
pub use error::WatermarkError;
pub use font::FontLocator;
pub use opacity::{alpha_delta, apply_alpha_delta};
pub use position::{calculate_position, ImageDimensions, PlacementPosition, WatermarkDimensions};
pub use processor::{
    AppliedKind, AppliedWatermark, SkipReason, WatermarkOutcome, WatermarkProcessor,
};
pub use text_renderer::{parse_hex_color, render_text_watermark, Color, TextStrategy};
