//! Font discovery for text watermarks.
//!
//! A [`FontLocator`] walks an ordered list of candidate TrueType paths and
//! remembers the first readable one for the rest of the process. Not finding
//! any font is a normal outcome: the text renderer falls back to its bitmap
//! font.

use ab_glyph::FontVec;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};

/// Fonts shipped next to the binary, then common system locations.
pub const DEFAULT_FONT_CANDIDATES: &[&str] = &[
    "fonts/bena-watermark.ttf",
    "fonts/Inter-Regular.ttf",
    "fonts/Roboto-Regular.ttf",
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/usr/share/fonts/truetype/freefont/FreeSans.ttf",
    "/Library/Fonts/Arial.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
    "C:\\Windows\\Fonts\\segoeui.ttf",
    "C:\\Windows\\Fonts\\tahoma.ttf",
];

static SHARED_LOCATOR: OnceLock<Arc<FontLocator>> = OnceLock::new();

/// Resolves and caches the watermark font path.
#[derive(Debug)]
pub struct FontLocator {
    candidates: Vec<PathBuf>,
    resolved: OnceLock<Option<PathBuf>>,
}

impl FontLocator {
    pub fn new(candidates: Vec<PathBuf>) -> Self {
        Self {
            candidates,
            resolved: OnceLock::new(),
        }
    }

    pub fn with_default_candidates() -> Self {
        Self::new(DEFAULT_FONT_CANDIDATES.iter().map(PathBuf::from).collect())
    }

    /// Default candidates preceded by `extra`, which are tried first.
    pub fn with_extra_candidates(extra: &[PathBuf]) -> Self {
        let candidates = extra
            .iter()
            .cloned()
            .chain(DEFAULT_FONT_CANDIDATES.iter().map(PathBuf::from))
            .collect();
        Self::new(candidates)
    }

    /// Process-wide locator over the default candidates.
    pub fn shared() -> Arc<FontLocator> {
        Arc::clone(SHARED_LOCATOR.get_or_init(|| Arc::new(Self::with_default_candidates())))
    }

    pub fn candidates(&self) -> &[PathBuf] {
        &self.candidates
    }

    /// First readable candidate. The filesystem is scanned once; later calls
    /// return the cached answer, including a cached `None`.
    pub fn resolve(&self) -> Option<&Path> {
        self.resolved
            .get_or_init(|| {
                let found = self.candidates.iter().find(|path| is_readable_file(path)).cloned();
                match &found {
                    Some(path) => {
                        tracing::debug!(font = %path.display(), "Resolved watermark font")
                    }
                    None => tracing::debug!(
                        candidates = self.candidates.len(),
                        "No watermark font found, bitmap fallback will be used"
                    ),
                }
                found
            })
            .as_deref()
    }

    /// Load the resolved font. `None` when nothing resolved or the file does
    /// not parse as a font.
    pub fn load(&self) -> Option<FontVec> {
        let path = self.resolve()?;
        let data = match std::fs::read(path) {
            Ok(data) => data,
            Err(e) => {
                tracing::warn!(font = %path.display(), error = %e, "Failed to read watermark font");
                return None;
            }
        };
        match FontVec::try_from_vec(data) {
            Ok(font) => Some(font),
            Err(e) => {
                tracing::warn!(font = %path.display(), error = %e, "Invalid watermark font");
                None
            }
        }
    }
}

impl Default for FontLocator {
    fn default() -> Self {
        Self::with_default_candidates()
    }
}

fn is_readable_file(path: &Path) -> bool {
    path.is_file() && File::open(path).is_ok()
}
