// Configuration module

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::upload::UploadConfig;
use crate::watermark::{WatermarkConfig, WatermarkMode};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub watermark: WatermarkConfig,
    #[serde(default)]
    pub upload: UploadConfig,
    /// Legacy pair of on/off switches; overrides `watermark.mode` when set
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub toggles: Option<WatermarkToggles>,
    /// Fonts tried before the built-in candidate list
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub font_candidates: Vec<PathBuf>,
}

/// Separate image/text switches as stored by older settings pages.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct WatermarkToggles {
    #[serde(default)]
    pub enable_watermark: bool,
    #[serde(default)]
    pub enable_watermark_text: bool,
}

impl WatermarkToggles {
    pub fn mode(&self) -> WatermarkMode {
        WatermarkMode::from_toggles(self.enable_watermark, self.enable_watermark_text)
    }
}

impl Config {
    pub fn from_yaml_with_env(yaml: &str) -> Result<Self, String> {
        // Replace ${VAR_NAME} with environment variable values
        let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}").map_err(|e| e.to_string())?;

        let mut missing = Vec::new();
        let substituted = re.replace_all(yaml, |caps: &regex::Captures| {
            let var_name = &caps[1];
            match std::env::var(var_name) {
                Ok(value) => value,
                Err(_) => {
                    missing.push(var_name.to_string());
                    String::new()
                }
            }
        });

        if let Some(var_name) = missing.first() {
            return Err(format!(
                "Environment variable '{}' is referenced but not set",
                var_name
            ));
        }

        let mut config: Config = serde_yaml::from_str(&substituted).map_err(|e| e.to_string())?;

        if let Some(toggles) = config.toggles {
            config.watermark.mode = toggles.mode();
        }

        Ok(config)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, String> {
        let yaml = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config file: {}", e))?;
        Self::from_yaml_with_env(&yaml)
    }

    pub fn validate(&self) -> Result<(), String> {
        if self
            .font_candidates
            .iter()
            .any(|p| p.as_os_str().is_empty())
        {
            return Err("font_candidates contains an empty path".to_string());
        }

        if let Some(overlay) = &self.watermark.overlay_path {
            if overlay.as_os_str().is_empty() {
                return Err("watermark.overlay_path is empty".to_string());
            }
        }

        Ok(())
    }

    /// Settings that are valid but turn part of the pipeline into a no-op.
    pub fn warnings(&self) -> Vec<String> {
        let mut warnings = self.watermark.warnings();
        if self.upload.enable_filename_prefix && self.upload.effective_prefix().is_none() {
            warnings.push(format!(
                "filename prefix enabled but '{}' has no usable characters",
                self.upload.filename_prefix
            ));
        }
        warnings
    }
}
