// SPDX-License-Identifier: GPL-3.0-only

//! Virtual camera backend
//!
//! A synthetic [`MediaCapture`] implementation that serves test-pattern
//! frames, plus an [`MjpegRecorder`] that records them. Used by the
//! terminal host and the CLI when no platform media stack is wired in.
//!
//! # Devices
//!
//! The virtual camera exposes a front (`user`) and a rear (`environment`)
//! device. Torch control is reported on the rear device only, backed by
//! sysfs flash LEDs when any are writable, otherwise simulated.

mod pattern;
mod recorder;

pub use pattern::PatternParams;
pub use recorder::MjpegRecorder;

use crate::backends::camera::types::{
    BackendError, BackendResult, CameraFrame, DeviceId, FacingMode, Resolution, StreamConstraints,
    StreamHandle,
};
use crate::backends::camera::MediaCapture;
use crate::flash::FlashDevice;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Largest frame the virtual sensor delivers
const MAX_NATIVE: Resolution = Resolution::new(1920, 1080);

/// How the rear camera's torch is realised
#[derive(Debug, Clone, Default)]
pub enum TorchBackend {
    /// No torch at all
    None,
    /// Torch state is tracked and brightens the pattern
    #[default]
    Simulated,
    /// Drive real flash LEDs as well as brightening the pattern
    Sysfs(Vec<FlashDevice>),
}

impl TorchBackend {
    /// Real flash LEDs when writable ones exist, otherwise simulated
    pub fn detect() -> Self {
        let hardware = crate::flash::FlashHardware::detect();
        if let Some(err) = &hardware.permission_error {
            warn!(error = %err, "Flash LEDs present but not writable");
        }
        if hardware.has_devices() {
            info!(count = hardware.devices.len(), "Using sysfs flash LEDs for torch");
            TorchBackend::Sysfs(hardware.devices)
        } else {
            TorchBackend::Simulated
        }
    }
}

/// Virtual camera configuration
#[derive(Debug, Clone, Default)]
pub struct VirtualCameraOptions {
    pub torch: TorchBackend,
    /// Refuse every acquisition as if the user denied permission
    pub deny_permission: bool,
}

#[derive(Debug)]
struct ActiveStream {
    handle: StreamHandle,
    started: Instant,
    torch: bool,
}

/// Synthetic camera serving test-pattern frames
pub struct VirtualCamera {
    options: VirtualCameraOptions,
    next_id: AtomicU64,
    streams: Mutex<HashMap<u64, ActiveStream>>,
}

impl VirtualCamera {
    pub fn new(options: VirtualCameraOptions) -> Self {
        Self {
            options,
            next_id: AtomicU64::new(1),
            streams: Mutex::new(HashMap::new()),
        }
    }

    /// Render the stream's current picture at an arbitrary size
    ///
    /// Used for live preview, where the host scales to its own surface
    /// instead of paying for a full native-resolution frame.
    pub fn render_preview(
        &self,
        stream: &StreamHandle,
        width: u32,
        height: u32,
    ) -> BackendResult<CameraFrame> {
        let params = self.pattern_params(stream)?;
        CameraFrame::from_rgba(width, height, pattern::render(width, height, params))
    }

    /// Whether the torch is currently lit on `stream`
    pub fn torch_lit(&self, stream: &StreamHandle) -> bool {
        self.lock_streams()
            .get(&stream.id)
            .is_some_and(|active| active.torch)
    }

    fn pattern_params(&self, stream: &StreamHandle) -> BackendResult<PatternParams> {
        let streams = self.lock_streams();
        let active = streams
            .get(&stream.id)
            .ok_or(BackendError::StreamNotFound(stream.id))?;
        Ok(PatternParams {
            elapsed: active.started.elapsed(),
            reversed: active.handle.facing_mode == FacingMode::Environment,
            torch: active.torch,
        })
    }

    fn lock_streams(&self) -> std::sync::MutexGuard<'_, HashMap<u64, ActiveStream>> {
        // A panic while holding the lock leaves plain data behind; keep serving it
        self.streams
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn has_torch(&self, facing_mode: FacingMode) -> bool {
        facing_mode == FacingMode::Environment
            && !matches!(self.options.torch, TorchBackend::None)
    }
}

impl Default for VirtualCamera {
    fn default() -> Self {
        Self::new(VirtualCameraOptions::default())
    }
}

#[async_trait]
impl MediaCapture for VirtualCamera {
    async fn enumerate_video_inputs(&self) -> BackendResult<Vec<DeviceId>> {
        Ok(vec![
            DeviceId {
                id: "virtual-front".to_string(),
                label: "Virtual Camera (front)".to_string(),
            },
            DeviceId {
                id: "virtual-rear".to_string(),
                label: "Virtual Camera (rear)".to_string(),
            },
        ])
    }

    async fn acquire(&self, constraints: StreamConstraints) -> BackendResult<StreamHandle> {
        if self.options.deny_permission {
            warn!("Virtual camera configured to deny access");
            return Err(BackendError::PermissionDenied);
        }

        // Ideal constraints: deliver the request, capped at the sensor size
        let native = Resolution::new(
            constraints.resolution.width.min(MAX_NATIVE.width),
            constraints.resolution.height.min(MAX_NATIVE.height),
        );
        let handle = StreamHandle {
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
            facing_mode: constraints.facing_mode,
            requested: constraints.resolution,
            native,
        };

        info!(
            id = handle.id,
            facing = %handle.facing_mode,
            requested = %handle.requested,
            native = %handle.native,
            audio = constraints.audio,
            "Virtual camera stream acquired"
        );

        self.lock_streams().insert(
            handle.id,
            ActiveStream {
                handle: handle.clone(),
                started: Instant::now(),
                torch: false,
            },
        );
        Ok(handle)
    }

    fn query_torch_capability(&self, stream: &StreamHandle) -> bool {
        self.has_torch(stream.facing_mode)
    }

    async fn set_torch(&self, stream: &StreamHandle, enabled: bool) -> BackendResult<()> {
        if !self.has_torch(stream.facing_mode) {
            return Err(BackendError::Unsupported("torch".to_string()));
        }

        if let TorchBackend::Sysfs(devices) = &self.options.torch {
            crate::flash::set_all(devices, enabled)?;
        }

        let mut streams = self.lock_streams();
        let active = streams
            .get_mut(&stream.id)
            .ok_or(BackendError::StreamNotFound(stream.id))?;
        active.torch = enabled;
        debug!(id = stream.id, enabled, "Torch constraint applied");
        Ok(())
    }

    async fn grab_frame(&self, stream: &StreamHandle) -> BackendResult<CameraFrame> {
        let params = self.pattern_params(stream)?;
        let (width, height) = (stream.native.width, stream.native.height);
        tokio::task::spawn_blocking(move || {
            CameraFrame::from_rgba(width, height, pattern::render(width, height, params))
        })
        .await
        .map_err(|e| BackendError::Other(format!("frame render task failed: {}", e)))?
    }

    fn stop(&self, stream: &StreamHandle) {
        let Some(active) = self.lock_streams().remove(&stream.id) else {
            return;
        };
        if active.torch
            && let TorchBackend::Sysfs(devices) = &self.options.torch
            && let Err(e) = crate::flash::set_all(devices, false)
        {
            warn!(id = stream.id, error = %e, "Flash LEDs left on after stream stop");
        }
        info!(id = stream.id, "Virtual camera stream stopped");
    }
}
