//! Watermark processor: the entry point used by the upload pipeline.
//!
//! Every call is independent. The configured mode picks one of three paths:
//!
//! - `none`: nothing happens
//! - `image`: overlay asset composited (skipped if no asset or asset missing)
//! - `text`: text stamped (skipped if the trimmed text is empty)
//!
//! Nothing here returns `Err`. Failures come back as
//! [`WatermarkOutcome::Failed`] and the file on disk keeps its original bytes.
//! Running the processor twice on the same file stamps it twice.

use super::codec::{decode_base, encode, write_atomically, ImageInfo, SourceFormat};
use super::compositor::{apply_image_watermark, PlacedWatermark};
use super::font::FontLocator;
use super::text_renderer::{render_text_watermark, TextStrategy};
use super::{WatermarkConfig, WatermarkError, WatermarkMode};
use std::fmt;
use std::path::Path;
use std::sync::Arc;

/// Why a file was left alone without anything going wrong.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    Disabled,
    NoOverlayConfigured,
    OverlayMissing,
    EmptyText,
    UnsupportedFormat(String),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Disabled => write!(f, "watermarking disabled"),
            Self::NoOverlayConfigured => write!(f, "no overlay asset configured"),
            Self::OverlayMissing => write!(f, "overlay asset missing"),
            Self::EmptyText => write!(f, "watermark text is empty"),
            Self::UnsupportedFormat(mime) => write!(f, "unsupported format '{}'", mime),
        }
    }
}

/// Which watermark was drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppliedKind {
    Image,
    Text(TextStrategy),
}

/// Details of a successful write-back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AppliedWatermark {
    pub kind: AppliedKind,
    pub format: SourceFormat,
    pub placed: PlacedWatermark,
}

/// Result of watermarking one file.
#[derive(Debug)]
pub enum WatermarkOutcome {
    Applied(AppliedWatermark),
    Skipped(SkipReason),
    Failed(WatermarkError),
}

impl WatermarkOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, Self::Applied(_))
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, Self::Skipped(_))
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }
}

/// Resolved work for one call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WatermarkJob<'a> {
    Image(&'a Path),
    Text(&'a str),
}

fn plan(config: &WatermarkConfig) -> Result<WatermarkJob<'_>, SkipReason> {
    match config.mode {
        WatermarkMode::None => Err(SkipReason::Disabled),
        WatermarkMode::Image => {
            let path = config
                .overlay_path
                .as_deref()
                .filter(|p| !p.as_os_str().is_empty())
                .ok_or(SkipReason::NoOverlayConfigured)?;
            if !path.is_file() {
                return Err(SkipReason::OverlayMissing);
            }
            Ok(WatermarkJob::Image(path))
        }
        WatermarkMode::Text => config
            .trimmed_text()
            .map(WatermarkJob::Text)
            .ok_or(SkipReason::EmptyText),
    }
}

/// Applies the configured watermark to image files.
#[derive(Debug, Clone)]
pub struct WatermarkProcessor {
    fonts: Arc<FontLocator>,
}

impl Default for WatermarkProcessor {
    fn default() -> Self {
        Self::new(FontLocator::shared())
    }
}

impl WatermarkProcessor {
    pub fn new(fonts: Arc<FontLocator>) -> Self {
        Self { fonts }
    }

    pub fn fonts(&self) -> &FontLocator {
        &self.fonts
    }

    /// Watermark the image at `path` in place.
    ///
    /// `info` is the already decoded metadata of the file. On anything other
    /// than [`WatermarkOutcome::Applied`] the file is byte-identical to
    /// before the call.
    pub fn apply_to_file(
        &self,
        path: &Path,
        info: &ImageInfo,
        config: &WatermarkConfig,
    ) -> WatermarkOutcome {
        let outcome = self.run(path, info, config);

        match &outcome {
            WatermarkOutcome::Applied(applied) => tracing::info!(
                path = %path.display(),
                kind = ?applied.kind,
                x = applied.placed.position.x,
                y = applied.placed.position.y,
                width = applied.placed.width,
                height = applied.placed.height,
                "Watermark applied"
            ),
            WatermarkOutcome::Skipped(SkipReason::OverlayMissing) => tracing::warn!(
                path = %path.display(),
                overlay = ?config.overlay_path,
                "Watermark overlay asset not found, skipping"
            ),
            WatermarkOutcome::Skipped(reason) => tracing::debug!(
                path = %path.display(),
                reason = %reason,
                "Watermark skipped"
            ),
            WatermarkOutcome::Failed(error) => tracing::warn!(
                path = %path.display(),
                mime = %info.mime,
                error = %error,
                "Watermark failed, original file left untouched"
            ),
        }

        outcome
    }

    fn run(&self, path: &Path, info: &ImageInfo, config: &WatermarkConfig) -> WatermarkOutcome {
        let job = match plan(config) {
            Ok(job) => job,
            Err(reason) => return WatermarkOutcome::Skipped(reason),
        };

        let Some(format) = info.format() else {
            return WatermarkOutcome::Skipped(SkipReason::UnsupportedFormat(info.mime.clone()));
        };

        match self.watermark(path, format, job, config) {
            Ok(applied) => WatermarkOutcome::Applied(applied),
            // The asset vanished between planning and decoding
            Err(WatermarkError::MissingAsset(_)) => {
                WatermarkOutcome::Skipped(SkipReason::OverlayMissing)
            }
            Err(e) => WatermarkOutcome::Failed(e),
        }
    }

    fn watermark(
        &self,
        path: &Path,
        format: SourceFormat,
        job: WatermarkJob<'_>,
        config: &WatermarkConfig,
    ) -> Result<AppliedWatermark, WatermarkError> {
        let data = std::fs::read(path)?;
        let mut canvas = decode_base(&data, format)?;
        drop(data);

        let (kind, placed) = match job {
            WatermarkJob::Image(overlay) => {
                let placed = apply_image_watermark(&mut canvas, overlay, config)?;
                (AppliedKind::Image, placed)
            }
            WatermarkJob::Text(text) => {
                let rendered = render_text_watermark(&mut canvas, text, config, &self.fonts)?;
                (AppliedKind::Text(rendered.strategy), rendered.placed)
            }
        };

        let encoded = encode(&canvas, format)?;
        drop(canvas);
        write_atomically(path, &encoded)?;

        Ok(AppliedWatermark {
            kind,
            format,
            placed,
        })
    }
}
