//! Watermark error types.
//!
//! These never cross the orchestrator boundary as `Err`: the processor turns
//! every one of them into a [`WatermarkOutcome`](super::WatermarkOutcome) and
//! leaves the file on disk as it was.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while watermarking a single image.
#[derive(Error, Debug)]
pub enum WatermarkError {
    /// Overlay asset does not exist on disk
    #[error("Watermark asset not found: {}", .0.display())]
    MissingAsset(PathBuf),

    /// Base image or overlay could not be decoded
    #[error("Failed to decode image: {0}")]
    Decode(String),

    /// Overlay could not be rescaled to its bounding box
    #[error("Failed to resize watermark: {0}")]
    Resize(String),

    /// Text could not be measured or drawn
    #[error("Failed to render text watermark: {0}")]
    Render(String),

    /// Re-encoding the watermarked image failed
    #[error("Failed to encode to {format}: {message}")]
    Encode {
        format: &'static str,
        message: String,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl WatermarkError {
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode(message.into())
    }

    pub fn encode(format: &'static str, message: impl Into<String>) -> Self {
        Self::Encode {
            format,
            message: message.into(),
        }
    }
}
