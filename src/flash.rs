// SPDX-License-Identifier: GPL-3.0-only

//! Torch mode and hardware flash LED control
//!
//! [`TorchMode`] is the user-facing three-state toggle. [`FlashDevice`] drives
//! flash LEDs exposed at `/sys/class/leds/*:flash` through their brightness
//! file, which the virtual camera uses as its torch when one is present.

use std::io;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Default sysfs LED class directory
pub const LEDS_DIR: &str = "/sys/class/leds";

/// Torch operating mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TorchMode {
    /// Torch is off
    #[default]
    Off,
    /// Torch stays lit continuously (and acts as the video flash)
    On,
    /// Torch lights only around a photo exposure
    Auto,
}

impl TorchMode {
    /// Cycle to the next mode: Off -> On -> Auto -> Off
    pub fn next(self) -> Self {
        match self {
            TorchMode::Off => TorchMode::On,
            TorchMode::On => TorchMode::Auto,
            TorchMode::Auto => TorchMode::Off,
        }
    }

    /// Hardware torch state to apply when entering this mode
    pub fn hardware_enabled(self) -> bool {
        matches!(self, TorchMode::On)
    }

    /// Icon shown on the torch button
    pub fn icon_name(self) -> &'static str {
        match self {
            TorchMode::Off => "flash_off",
            TorchMode::On => "flash_on",
            TorchMode::Auto => "flash_auto",
        }
    }

    /// Whether the torch button is drawn highlighted
    pub fn is_active(self) -> bool {
        !matches!(self, TorchMode::Off)
    }

    /// Toast shown after switching to this mode
    pub fn announcement(self) -> &'static str {
        match self {
            TorchMode::Off => "Torch Off",
            TorchMode::On => "Torch On",
            TorchMode::Auto => "Torch Auto (Flash on capture)",
        }
    }
}

impl std::str::FromStr for TorchMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "off" => Ok(TorchMode::Off),
            "on" => Ok(TorchMode::On),
            "auto" => Ok(TorchMode::Auto),
            other => Err(format!("unknown torch mode: {}", other)),
        }
    }
}

/// A flash LED device discovered via sysfs
#[derive(Debug, Clone)]
pub struct FlashDevice {
    /// Sysfs path, e.g. `/sys/class/leds/white:flash`
    path: PathBuf,
    /// Maximum brightness value (from `max_brightness` file)
    max_brightness: u32,
    /// Directory basename
    name: String,
}

impl FlashDevice {
    /// Get the device name (e.g. "white:flash")
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Set raw brightness value (0 = off, max_brightness = full)
    pub fn set_brightness(&self, value: u32) -> io::Result<()> {
        let clamped = value.min(self.max_brightness);
        std::fs::write(self.path.join("brightness"), clamped.to_string())
    }

    /// Turn off the LED
    pub fn off(&self) -> io::Result<()> {
        self.set_brightness(0)
    }

    /// Turn on at a fraction of max brightness (0.0 = off, 1.0 = full)
    pub fn torch(&self, intensity: f32) -> io::Result<()> {
        let clamped = intensity.clamp(0.0, 1.0);
        let value = (clamped * self.max_brightness as f32).round() as u32;
        self.set_brightness(value)
    }
}

/// Result of hardware flash detection.
///
/// Separates "hardware exists" from "we can control it" so the host can
/// explain a permission problem instead of silently reporting no torch.
#[derive(Debug, Default)]
pub struct FlashHardware {
    /// Devices we can actually control (writable)
    pub devices: Vec<FlashDevice>,
    /// User-facing error if hardware was found but not writable
    pub permission_error: Option<String>,
}

impl FlashHardware {
    /// Scan [`LEDS_DIR`] for `*:flash` entries
    pub fn detect() -> FlashHardware {
        Self::detect_in(Path::new(LEDS_DIR))
    }

    /// Scan `leds_dir` for `*:flash` entries
    pub fn detect_in(leds_dir: &Path) -> FlashHardware {
        let Ok(entries) = std::fs::read_dir(leds_dir) else {
            warn!(path = %leds_dir.display(), "Cannot read LED class directory, flash discovery skipped");
            return FlashHardware::default();
        };

        let mut devices = Vec::new();
        let mut unwritable = Vec::new();

        for entry in entries.flatten() {
            let name = entry.file_name();
            let Some(name_str) = name.to_str() else {
                continue;
            };
            if !name_str.ends_with(":flash") {
                continue;
            }

            let led_path = entry.path();
            let max_brightness_path = led_path.join("max_brightness");
            let max_brightness = match std::fs::read_to_string(&max_brightness_path) {
                Ok(s) => match s.trim().parse::<u32>() {
                    Ok(v) if v > 0 => v,
                    _ => {
                        warn!(path = %max_brightness_path.display(), "Invalid max_brightness value");
                        continue;
                    }
                },
                Err(e) => {
                    warn!(path = %max_brightness_path.display(), error = %e, "Cannot read max_brightness");
                    continue;
                }
            };

            let brightness_path = led_path.join("brightness");
            match std::fs::OpenOptions::new()
                .write(true)
                .open(&brightness_path)
            {
                Ok(_) => {
                    info!(name = name_str, max_brightness, "Discovered flash LED");
                    devices.push(FlashDevice {
                        path: led_path,
                        max_brightness,
                        name: name_str.to_string(),
                    });
                }
                Err(e) => {
                    warn!(path = %brightness_path.display(), error = %e, "Flash LED found but not writable");
                    unwritable.push(name_str.to_string());
                }
            }
        }

        // Deterministic ordering (white before yellow)
        devices.sort_by(|a, b| a.name.cmp(&b.name));

        let permission_error = (devices.is_empty() && !unwritable.is_empty()).then(|| {
            let user = std::env::var("USER").unwrap_or_else(|_| "user".to_string());
            format!(
                "Flash LEDs detected ({}) but cannot be controlled. \
                 Add {} to the group owning their brightness files (usually feedbackd).",
                unwritable.join(", "),
                user
            )
        });

        FlashHardware {
            devices,
            permission_error,
        }
    }

    /// Whether any controllable flash devices were found
    pub fn has_devices(&self) -> bool {
        !self.devices.is_empty()
    }
}

/// Turn all flash devices on at full brightness, or all off
pub fn set_all(devices: &[FlashDevice], enabled: bool) -> io::Result<()> {
    let mut first_error = None;
    for dev in devices {
        let result = if enabled { dev.torch(1.0) } else { dev.off() };
        if let Err(e) = result {
            warn!(device = %dev.name, enabled, error = %e, "Failed to switch flash LED");
            first_error.get_or_insert(e);
        }
    }
    first_error.map_or(Ok(()), Err)
}
