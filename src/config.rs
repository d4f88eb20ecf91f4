// SPDX-License-Identifier: GPL-3.0-only

use crate::app::CaptureMode;
use crate::backends::camera::types::{FacingMode, Resolution};
use crate::constants;
use crate::errors::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, warn};

/// File name inside `<config_dir>/ikdao-camera/`
pub const CONFIG_FILE: &str = "config.json";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Camera used at startup
    pub facing_mode: FacingMode,
    /// Resolution used at startup and as the fallback after a failed change
    pub resolution: Resolution,
    /// Capture mode selected at startup
    pub capture_mode: CaptureMode,
    /// JPEG quality for stills (1-100)
    pub jpeg_quality: u8,
    /// Output directory; `None` means the default download directory
    pub output_dir: Option<PathBuf>,
    /// How long a toast stays visible, in milliseconds
    pub toast_duration_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            facing_mode: FacingMode::default(),
            resolution: constants::DEFAULT_RESOLUTION,
            capture_mode: CaptureMode::default(),
            jpeg_quality: constants::capture::DEFAULT_JPEG_QUALITY,
            output_dir: None,
            toast_duration_ms: constants::ui::TOAST_DURATION.as_millis() as u64,
        }
    }
}

impl Config {
    /// `<config_dir>/ikdao-camera/config.json`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(crate::storage::APP_DIR_NAME).join(CONFIG_FILE))
    }

    /// Load from the default location, falling back to defaults
    pub fn load() -> Self {
        match Self::default_path() {
            Some(path) => Self::load_from(&path),
            None => {
                warn!("No config directory available, using defaults");
                Self::default()
            }
        }
    }

    /// Load from `path`; a missing or unreadable file yields the defaults
    pub fn load_from(path: &Path) -> Self {
        match Self::try_load_from(path) {
            Ok(Some(config)) => {
                debug!(path = %path.display(), "Loaded config");
                config
            }
            Ok(None) => {
                debug!(path = %path.display(), "No config file, using defaults");
                Self::default()
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Invalid config, using defaults");
                Self::default()
            }
        }
    }

    fn try_load_from(path: &Path) -> AppResult<Option<Self>> {
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(AppError::Config(e.to_string())),
        };
        let config: Config = serde_json::from_str(&text)?;
        Ok(Some(config.sanitized()))
    }

    /// Persist to the default location
    pub fn save(&self) -> AppResult<()> {
        let path = Self::default_path()
            .ok_or_else(|| AppError::Config("no config directory available".to_string()))?;
        self.save_to(&path)
    }

    pub fn save_to(&self, path: &Path) -> AppResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let text = serde_json::to_string_pretty(self)?;
        std::fs::write(path, text)?;
        info!(path = %path.display(), "Config saved");
        Ok(())
    }

    /// Clamp values a hand-edited file may have put out of range
    fn sanitized(mut self) -> Self {
        self.jpeg_quality = self.jpeg_quality.clamp(1, 100);
        if self.resolution.width == 0 || self.resolution.height == 0 {
            self.resolution = constants::DEFAULT_RESOLUTION;
        }
        self
    }

    pub fn toast_duration(&self) -> Duration {
        Duration::from_millis(self.toast_duration_ms)
    }

    /// Effective output directory
    pub fn output_dir(&self) -> PathBuf {
        self.output_dir
            .clone()
            .unwrap_or_else(crate::storage::default_output_dir)
    }
}
