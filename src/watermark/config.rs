//! Watermark configuration types.
//!
//! The configuration arrives from whatever stores the site settings, so none
//! of the numeric fields are trusted: every consumer goes through the clamp
//! helpers below before using a value.
//!
//! ```yaml
//! watermark:
//!   mode: text
//!   text: "© bena.vn"
//!   text_color: "#ffffff"
//!   text_size_pt: 24
//!   opacity_percent: 80
//!   position: bottom-right
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const SCALE_RANGE: (i32, i32) = (10, 100);
pub const OPACITY_RANGE: (i32, i32) = (0, 100);
pub const TEXT_SIZE_RANGE: (i32, i32) = (8, 120);

/// Characters kept by [`preview_text`].
pub const PREVIEW_TEXT_LIMIT: usize = 24;

pub const DEFAULT_TEXT_COLOR: &str = "#ffffff";

fn default_scale() -> i32 {
    80
}

fn default_opacity() -> i32 {
    80
}

fn default_text_size() -> i32 {
    24
}

fn default_text_color() -> String {
    DEFAULT_TEXT_COLOR.to_string()
}

/// Which watermark, if any, is stamped on uploads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WatermarkMode {
    #[default]
    None,
    Image,
    Text,
}

impl WatermarkMode {
    /// Resolve the legacy pair of toggles into a single mode.
    ///
    /// Both toggles were driven by one radio control, so at most one should be
    /// set; if storage says otherwise the image watermark wins.
    pub fn from_toggles(image_enabled: bool, text_enabled: bool) -> Self {
        match (image_enabled, text_enabled) {
            (true, _) => Self::Image,
            (false, true) => Self::Text,
            (false, false) => Self::None,
        }
    }
}

/// Anchor for the watermark on the 3x3 grid.
///
/// Parsing never fails: anything unrecognized lands on `BottomRight`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum WatermarkPosition {
    TopLeft,
    TopCenter,
    TopRight,
    CenterLeft,
    Center,
    CenterRight,
    BottomLeft,
    BottomCenter,
    #[default]
    BottomRight,
}

impl WatermarkPosition {
    pub const ALL: [WatermarkPosition; 9] = [
        Self::TopLeft,
        Self::TopCenter,
        Self::TopRight,
        Self::CenterLeft,
        Self::Center,
        Self::CenterRight,
        Self::BottomLeft,
        Self::BottomCenter,
        Self::BottomRight,
    ];

    pub fn parse(value: &str) -> Self {
        match value.trim() {
            "top-left" => Self::TopLeft,
            "top-center" => Self::TopCenter,
            "top-right" => Self::TopRight,
            "center-left" => Self::CenterLeft,
            "center" => Self::Center,
            "center-right" => Self::CenterRight,
            "bottom-left" => Self::BottomLeft,
            "bottom-center" => Self::BottomCenter,
            _ => Self::BottomRight,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TopLeft => "top-left",
            Self::TopCenter => "top-center",
            Self::TopRight => "top-right",
            Self::CenterLeft => "center-left",
            Self::Center => "center",
            Self::CenterRight => "center-right",
            Self::BottomLeft => "bottom-left",
            Self::BottomCenter => "bottom-center",
            Self::BottomRight => "bottom-right",
        }
    }
}

impl From<String> for WatermarkPosition {
    fn from(value: String) -> Self {
        Self::parse(&value)
    }
}

impl From<WatermarkPosition> for String {
    fn from(position: WatermarkPosition) -> Self {
        position.as_str().to_string()
    }
}

/// Resolved watermark settings handed to the engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatermarkConfig {
    #[serde(default)]
    pub mode: WatermarkMode,

    /// Overlay bounding box as a percentage of the base image (10-100)
    #[serde(default = "default_scale")]
    pub scale_percent: i32,

    /// 100 is fully visible, 0 is invisible
    #[serde(default = "default_opacity")]
    pub opacity_percent: i32,

    #[serde(default)]
    pub position: WatermarkPosition,

    /// Overlay asset for image mode
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overlay_path: Option<PathBuf>,

    /// Text for text mode; trimmed before use
    #[serde(default)]
    pub text: String,

    /// `#RRGGBB` or `#RGB`
    #[serde(default = "default_text_color")]
    pub text_color: String,

    /// Font size in points (8-120)
    #[serde(default = "default_text_size")]
    pub text_size_pt: i32,
}

impl Default for WatermarkConfig {
    fn default() -> Self {
        Self {
            mode: WatermarkMode::None,
            scale_percent: default_scale(),
            opacity_percent: default_opacity(),
            position: WatermarkPosition::BottomRight,
            overlay_path: None,
            text: String::new(),
            text_color: default_text_color(),
            text_size_pt: default_text_size(),
        }
    }
}

impl WatermarkConfig {
    pub fn effective_scale(&self) -> u32 {
        clamp_scale(self.scale_percent)
    }

    pub fn effective_opacity(&self) -> u32 {
        clamp_opacity(self.opacity_percent)
    }

    pub fn effective_text_size(&self) -> u32 {
        clamp_text_size(self.text_size_pt)
    }

    /// Text as it will be drawn; `None` when nothing is left after trimming.
    pub fn trimmed_text(&self) -> Option<&str> {
        let text = self.text.trim();
        (!text.is_empty()).then_some(text)
    }

    /// Copy with every field forced into its valid range.
    ///
    /// Sanitizing an already sanitized config returns an identical config.
    pub fn sanitized(&self) -> Self {
        Self {
            mode: self.mode,
            scale_percent: self.effective_scale() as i32,
            opacity_percent: self.effective_opacity() as i32,
            position: self.position,
            overlay_path: self.overlay_path.clone(),
            text: self.text.trim().to_string(),
            text_color: sanitize_hex_color(&self.text_color),
            text_size_pt: self.effective_text_size() as i32,
        }
    }

    /// Report settings that will silently turn watermarking into a no-op.
    pub fn warnings(&self) -> Vec<String> {
        let mut warnings = Vec::new();
        match self.mode {
            WatermarkMode::Image if self.overlay_path.is_none() => {
                warnings.push("image watermark enabled but no overlay_path is set".to_string());
            }
            WatermarkMode::Text if self.trimmed_text().is_none() => {
                warnings.push("text watermark enabled but text is empty".to_string());
            }
            _ => {}
        }
        if !is_hex_color(&self.text_color) {
            warnings.push(format!(
                "text_color '{}' is not #RGB or #RRGGBB, {} will be used",
                self.text_color, DEFAULT_TEXT_COLOR
            ));
        }
        warnings
    }
}

fn clamp_range(value: i32, (min, max): (i32, i32)) -> u32 {
    value.clamp(min, max) as u32
}

pub fn clamp_scale(value: i32) -> u32 {
    clamp_range(value, SCALE_RANGE)
}

pub fn clamp_opacity(value: i32) -> u32 {
    clamp_range(value, OPACITY_RANGE)
}

pub fn clamp_text_size(value: i32) -> u32 {
    clamp_range(value, TEXT_SIZE_RANGE)
}

fn is_hex_color(value: &str) -> bool {
    match value.strip_prefix('#') {
        Some(hex) => {
            (hex.len() == 3 || hex.len() == 6) && hex.chars().all(|c| c.is_ascii_hexdigit())
        }
        None => false,
    }
}

/// Lowercased color if valid, otherwise the default white.
pub fn sanitize_hex_color(value: &str) -> String {
    let value = value.trim();
    if is_hex_color(value) {
        value.to_ascii_lowercase()
    } else {
        default_text_color()
    }
}

/// Text shortened for layout previews. Rendering always uses the full string.
pub fn preview_text(text: &str) -> String {
    text.trim().chars().take(PREVIEW_TEXT_LIMIT).collect()
}
