// SPDX-License-Identifier: GPL-3.0-only
// Shared types for camera backend abstraction

//! Shared types for camera backends

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;

/// Which physical camera is active
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FacingMode {
    /// Front camera (selfie)
    #[default]
    User,
    /// Rear camera
    Environment,
}

impl FacingMode {
    /// The other camera
    pub fn toggled(self) -> Self {
        match self {
            FacingMode::User => FacingMode::Environment,
            FacingMode::Environment => FacingMode::User,
        }
    }

    /// Constraint value as understood by media capture hosts
    pub fn as_str(&self) -> &'static str {
        match self {
            FacingMode::User => "user",
            FacingMode::Environment => "environment",
        }
    }

    /// Front cameras are previewed and captured mirrored
    pub fn is_front(&self) -> bool {
        matches!(self, FacingMode::User)
    }
}

impl std::fmt::Display for FacingMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for FacingMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "user" | "front" => Ok(FacingMode::User),
            "environment" | "rear" | "back" => Ok(FacingMode::Environment),
            other => Err(format!("unknown facing mode: {}", other)),
        }
    }
}

/// Requested capture resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

impl Resolution {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Selector value, e.g. `1920x1080`
    pub fn value(&self) -> String {
        format!("{}x{}", self.width, self.height)
    }
}

impl Default for Resolution {
    fn default() -> Self {
        crate::constants::DEFAULT_RESOLUTION
    }
}

impl std::fmt::Display for Resolution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

impl std::str::FromStr for Resolution {
    type Err = String;

    /// Parse a `WxH` selector value
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (w, h) = s
            .trim()
            .split_once(['x', 'X'])
            .ok_or_else(|| format!("expected WIDTHxHEIGHT, got {:?}", s))?;
        let width: u32 = w.parse().map_err(|_| format!("invalid width in {:?}", s))?;
        let height: u32 = h.parse().map_err(|_| format!("invalid height in {:?}", s))?;
        if width == 0 || height == 0 {
            return Err(format!("zero dimension in {:?}", s));
        }
        Ok(Resolution { width, height })
    }
}

/// Constraints passed to [`MediaCapture::acquire`](super::MediaCapture::acquire)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamConstraints {
    pub facing_mode: FacingMode,
    /// Ideal resolution; the host may deliver something else
    pub resolution: Resolution,
    /// Request a microphone track alongside the video track
    pub audio: bool,
}

impl StreamConstraints {
    pub fn new(facing_mode: FacingMode, resolution: Resolution) -> Self {
        Self {
            facing_mode,
            resolution,
            audio: true,
        }
    }
}

/// Opaque identifier of a video input device
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DeviceId {
    pub id: String,
    /// Human-readable label (may be empty before permission is granted)
    pub label: String,
}

/// Handle to an active audio+video capture stream
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamHandle {
    /// Backend-assigned identifier
    pub id: u64,
    pub facing_mode: FacingMode,
    /// Resolution that was requested
    pub requested: Resolution,
    /// Native size of delivered video frames
    pub native: Resolution,
}

/// A single RGBA video frame
#[derive(Debug, Clone)]
pub struct CameraFrame {
    pub width: u32,
    pub height: u32,
    /// Tightly packed RGBA pixels (`width * height * 4` bytes)
    pub data: Arc<[u8]>,
    /// Timestamp when frame was captured
    pub captured_at: Instant,
}

impl CameraFrame {
    /// Create a frame, checking the buffer length against the dimensions
    pub fn from_rgba(width: u32, height: u32, data: Vec<u8>) -> BackendResult<Self> {
        let expected = width as usize * height as usize * 4;
        if data.len() != expected {
            return Err(BackendError::Other(format!(
                "frame buffer is {} bytes, expected {} for {}x{}",
                data.len(),
                expected,
                width,
                height
            )));
        }
        Ok(Self {
            width,
            height,
            data: Arc::from(data),
            captured_at: Instant::now(),
        })
    }

    /// RGBA value at (x, y), clamped to the frame bounds
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        let x = x.min(self.width.saturating_sub(1)) as usize;
        let y = y.min(self.height.saturating_sub(1)) as usize;
        let idx = (y * self.width as usize + x) * 4;
        match self.data.get(idx..idx + 4) {
            Some(px) => [px[0], px[1], px[2], px[3]],
            None => [0, 0, 0, 255],
        }
    }
}

/// Result type for backend operations
pub type BackendResult<T> = Result<T, BackendError>;

/// Error types for backend operations
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendError {
    /// Camera/microphone permission refused
    PermissionDenied,
    /// Device missing, busy or unable to satisfy the constraints
    DeviceUnavailable(String),
    /// Capability not available on this track/device
    Unsupported(String),
    /// Unknown stream handle
    StreamNotFound(u64),
    /// No recording in progress for the given session
    NoRecordingInProgress,
    /// General I/O error
    IoError(String),
    /// Other errors
    Other(String),
}

impl std::fmt::Display for BackendError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BackendError::PermissionDenied => write!(f, "Permission denied"),
            BackendError::DeviceUnavailable(msg) => write!(f, "Device unavailable: {}", msg),
            BackendError::Unsupported(msg) => write!(f, "Unsupported: {}", msg),
            BackendError::StreamNotFound(id) => write!(f, "Stream {} not found", id),
            BackendError::NoRecordingInProgress => write!(f, "No recording in progress"),
            BackendError::IoError(msg) => write!(f, "I/O error: {}", msg),
            BackendError::Other(msg) => write!(f, "Error: {}", msg),
        }
    }
}

impl std::error::Error for BackendError {}

impl From<std::io::Error> for BackendError {
    fn from(err: std::io::Error) -> Self {
        BackendError::IoError(err.to_string())
    }
}
