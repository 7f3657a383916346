//! Upload hook: optional filename prefix, then watermarking.
//!
//! Called once per freshly uploaded file. The prefix rename happens first so
//! the watermark is written to the final path.

use crate::watermark::{probe, WatermarkConfig, WatermarkOutcome, WatermarkProcessor};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Upper bound on `-N` suffixes tried when looking for a free file name.
const MAX_UNIQUE_ATTEMPTS: u32 = 10_000;

/// Filename handling for uploads.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UploadConfig {
    #[serde(default)]
    pub enable_filename_prefix: bool,

    /// Raw prefix; slugified before use
    #[serde(default)]
    pub filename_prefix: String,
}

impl UploadConfig {
    /// Slugified prefix, or `None` when prefixing is off or the slug is empty.
    pub fn effective_prefix(&self) -> Option<String> {
        if !self.enable_filename_prefix {
            return None;
        }
        let slug = slugify(&self.filename_prefix);
        (!slug.is_empty()).then_some(slug)
    }
}

/// Lowercase slug of ASCII letters, digits, `_` and `-`.
///
/// Whitespace and `.` become `-`, everything else is dropped, runs of `-` collapse
/// and leading/trailing `-` are removed.
pub fn slugify(raw: &str) -> String {
    let mut slug = String::with_capacity(raw.len());
    for c in raw.trim().chars() {
        let mapped = match c {
            c if c.is_ascii_alphanumeric() => c.to_ascii_lowercase(),
            '_' => '_',
            '-' | '.' => '-',
            c if c.is_whitespace() => '-',
            _ => continue,
        };
        if mapped == '-' && slug.ends_with('-') {
            continue;
        }
        slug.push(mapped);
    }
    slug.trim_matches('-').to_string()
}

/// File name with `prefix` applied, or `None` if it already carries it.
///
/// ```
/// use bena_watermark::upload::prefixed_file_name;
///
/// assert_eq!(prefixed_file_name("photo.jpg", "bena").as_deref(), Some("bena-photo.jpg"));
/// assert_eq!(prefixed_file_name("Bena_photo.jpg", "bena"), None);
/// ```
pub fn prefixed_file_name(file_name: &str, prefix: &str) -> Option<String> {
    let (stem, ext) = split_extension(file_name);

    let lower = stem.to_lowercase();
    if lower.starts_with(&format!("{}-", prefix)) || lower.starts_with(&format!("{}_", prefix)) {
        return None;
    }

    let stem = stem.trim_start_matches(['-', '_']);
    Some(format!("{}-{}{}", prefix, stem, ext))
}

/// `("photo", ".jpg")`; dotfiles and extension-less names keep an empty
/// extension.
fn split_extension(file_name: &str) -> (&str, &str) {
    match file_name.rfind('.') {
        Some(idx) if idx > 0 => file_name.split_at(idx),
        _ => (file_name, ""),
    }
}

/// First name in `dir` that is not taken, appending `-1`, `-2`, ... before
/// the extension.
pub fn unique_path(dir: &Path, file_name: &str) -> PathBuf {
    let candidate = dir.join(file_name);
    if !candidate.exists() {
        return candidate;
    }

    let (stem, ext) = split_extension(file_name);
    for n in 1..=MAX_UNIQUE_ATTEMPTS {
        let candidate = dir.join(format!("{}-{}{}", stem, n, ext));
        if !candidate.exists() {
            return candidate;
        }
    }
    candidate
}

/// Rename `path` to carry the configured prefix. Returns the path the file
/// now lives at; any failure keeps the original path.
pub fn apply_prefix(path: &Path, upload: &UploadConfig) -> PathBuf {
    let Some(prefix) = upload.effective_prefix() else {
        return path.to_path_buf();
    };
    let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
        return path.to_path_buf();
    };
    let Some(new_name) = prefixed_file_name(file_name, &prefix) else {
        return path.to_path_buf();
    };

    let dir = path.parent().unwrap_or_else(|| Path::new(""));
    let target = unique_path(dir, &new_name);
    if target.exists() {
        tracing::warn!(path = %path.display(), "No free file name for prefixed upload");
        return path.to_path_buf();
    }

    match std::fs::rename(path, &target) {
        Ok(()) => {
            tracing::debug!(
                from = %path.display(),
                to = %target.display(),
                "Applied filename prefix"
            );
            target
        }
        Err(e) => {
            tracing::warn!(
                path = %path.display(),
                error = %e,
                "Failed to rename upload, keeping original name"
            );
            path.to_path_buf()
        }
    }
}

/// Watermark a file already on disk. Files that cannot be probed as images
/// are left alone.
pub fn process_file(
    path: &Path,
    processor: &WatermarkProcessor,
    config: &WatermarkConfig,
) -> Option<WatermarkOutcome> {
    let Some(info) = probe(path) else {
        tracing::debug!(path = %path.display(), "Not a readable image, skipping watermark");
        return None;
    };
    Some(processor.apply_to_file(path, &info, config))
}

/// Full upload hook: prefix rename, then watermark. Returns the final path.
pub fn process_upload(
    path: &Path,
    upload: &UploadConfig,
    processor: &WatermarkProcessor,
    config: &WatermarkConfig,
) -> PathBuf {
    if !path.is_file() {
        return path.to_path_buf();
    }

    let path = apply_prefix(path, upload);
    process_file(&path, processor, config);
    path
}
