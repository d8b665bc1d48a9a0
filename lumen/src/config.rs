use anyhow::{Context, Result};

use std::fs;
use std::path::{Path, PathBuf};

use crate::downsample::Downsampler;
use crate::encode::ImageFormat;

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct DecodeConfig {
    pub width: u32,
    pub height: u32,
    pub downsampler: Downsampler,
    // Used when decoded bitmaps are written back out
    pub image_format: ImageFormat,
}

impl Default for DecodeConfig {
    fn default() -> Self {
        Self {
            width: 1236,
            height: 1648,
            downsampler: Downsampler::AtMost,
            image_format: ImageFormat::Jpeg { quality: 85 },
        }
    }
}

impl DecodeConfig {
    pub fn load() -> Option<Self> {
        let config_path = Self::config_path()?;
        Self::load_from(&config_path)
            .map_err(|e| log::debug!("No usable config at {}: {e:#}", config_path.display()))
            .ok()
    }

    pub fn save(&self) -> Option<()> {
        let config_path = Self::config_path()?;
        self.save_to(&config_path)
            .map_err(|e| log::warn!("Failed to save config: {e:#}"))
            .ok()
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        serde_json::from_str(&contents).with_context(|| format!("Invalid config {}", path.display()))
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Create config directory if it doesn't exist
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))
    }

    pub fn config_path() -> Option<PathBuf> {
        #[allow(deprecated)]
        let home = std::env::home_dir()?;
        Some(home.join(".config").join("lumen").join("config.json"))
    }
}
