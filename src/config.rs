// SPDX-License-Identifier: GPL-3.0-only

use crate::constants::{
    CONFIG_DIR_NAME, CONFIG_FILE_NAME, DEFAULT_JPEG_QUALITY, DEFAULT_SAVE_FOLDER,
};
use crate::errors::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::sync::Semaphore;
use tracing::{debug, info};

/// Archiver configuration
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory receiving archived originals
    pub save_dir: PathBuf,
    /// Directory receiving edited images (usually the system temp dir)
    pub temp_dir: PathBuf,
    /// JPEG quality for archived images (1-100)
    pub jpeg_quality: u8,
    /// Upper bound on saves in flight per batch (None = unbounded)
    pub max_concurrent_saves: Option<usize>,
    /// Create missing directories when the archiver is built
    pub create_dirs: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            save_dir: default_save_dir(),
            temp_dir: std::env::temp_dir(),
            jpeg_quality: DEFAULT_JPEG_QUALITY,
            max_concurrent_saves: None,
            create_dirs: true,
        }
    }
}

impl Config {
    /// Default location of the configuration file, if the platform has a config dir
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
    }

    /// Load configuration from a JSON file
    ///
    /// Missing fields fall back to their defaults.
    pub fn load(path: &Path) -> AppResult<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| AppError::Config(format!("{}: {}", path.display(), e)))?;
        let config: Config = serde_json::from_str(&contents)?;
        config.validate()?;

        info!(path = %path.display(), "Loaded configuration");
        Ok(config)
    }

    /// Load from `path` if given, else from the default location if it exists,
    /// else use defaults
    pub fn load_or_default(path: Option<&Path>) -> AppResult<Self> {
        if let Some(path) = path {
            return Self::load(path);
        }

        match Self::default_path() {
            Some(path) if path.exists() => Self::load(&path),
            _ => {
                debug!("No configuration file, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Write configuration as pretty JSON, creating parent directories
    pub fn save(&self, path: &Path) -> AppResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    pub fn validate(&self) -> AppResult<()> {
        if !(1..=100).contains(&self.jpeg_quality) {
            return Err(AppError::Config(format!(
                "jpeg_quality must be between 1 and 100, got {}",
                self.jpeg_quality
            )));
        }
        if self.max_concurrent_saves == Some(0) {
            return Err(AppError::Config(
                "max_concurrent_saves must be greater than 0".to_string(),
            ));
        }
        if let Some(limit) = self.max_concurrent_saves
            && limit > Semaphore::MAX_PERMITS
        {
            return Err(AppError::Config(format!(
                "max_concurrent_saves must be at most {}, got {}",
                Semaphore::MAX_PERMITS,
                limit
            )));
        }
        Ok(())
    }
}

/// `<Pictures>/Camera`, falling back to the home directory
pub fn default_save_dir() -> PathBuf {
    dirs::picture_dir()
        .unwrap_or_else(|| dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")))
        .join(DEFAULT_SAVE_FOLDER)
}
