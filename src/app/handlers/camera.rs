// SPDX-License-Identifier: GPL-3.0-only

//! Camera lifecycle handlers
//!
//! Handles device enumeration, stream acquisition, camera switching,
//! resolution changes and torch capability detection.

use crate::app::state::{CameraController, Message, StreamPurpose};
use crate::app::task::Task;
use crate::backends::camera::types::{
    DeviceId, FacingMode, Resolution, StreamConstraints, StreamHandle,
};
use crate::backends::BackendResult;
use crate::constants::RESOLUTION_PRESETS;
use crate::errors::CameraError;
use crate::flash::TorchMode;
use tracing::{debug, error, info, warn};

impl CameraController {
    // =========================================================================
    // Initialization
    // =========================================================================

    pub(crate) fn handle_init(&mut self) -> Task {
        info!("Initializing camera");
        let capture = self.capture.clone();
        Task::perform(
            async move { capture.enumerate_video_inputs().await },
            Message::DevicesEnumerated,
        )
    }

    pub(crate) fn handle_devices_enumerated(
        &mut self,
        result: BackendResult<Vec<DeviceId>>,
    ) -> Task {
        let camera = match result {
            Ok(devices) => {
                info!(count = devices.len(), "Found video inputs");
                for device in &devices {
                    debug!(id = %device.id, label = %device.label, "Video input");
                }
                self.devices = devices;
                self.start_camera(self.facing_mode, self.resolution)
            }
            Err(err) => {
                error!(error = %CameraError::from(err), "Camera initialization failed");
                self.show_toast("Camera access denied or not available")
            }
        };
        self.populate_resolution_options();
        camera
    }

    fn populate_resolution_options(&mut self) {
        self.resolution_options = RESOLUTION_PRESETS.to_vec();
    }

    // =========================================================================
    // Stream acquisition
    // =========================================================================

    /// Replace the active stream with one for `facing` at `resolution`
    pub(crate) fn start_camera(&mut self, facing: FacingMode, resolution: Resolution) -> Task {
        self.facing_mode = facing;
        self.resolution = resolution;
        self.acquire_stream(StreamPurpose::Start)
    }

    /// Stop the current stream and request a new one
    ///
    /// An active recording is bound to the old stream and is stopped first.
    fn acquire_stream(&mut self, purpose: StreamPurpose) -> Task {
        let stop_recording = if self.recording.is_idle() {
            Task::none()
        } else {
            info!("Stream is being replaced, stopping recording");
            self.handle_stop_recording()
        };

        if let Some(old) = self.stream.take() {
            debug!(stream = old.id, "Stopping stream");
            self.capture.stop(&old);
        }
        self.torch_supported = false;

        let resolution = match purpose {
            StreamPurpose::Start => self.resolution,
            StreamPurpose::ChangeResolution(resolution) => resolution,
        };
        let constraints = StreamConstraints::new(self.facing_mode, resolution);
        self.stream_request += 1;
        let request = self.stream_request;
        info!(
            request,
            facing = %constraints.facing_mode,
            resolution = %constraints.resolution,
            "Acquiring stream"
        );

        let capture = self.capture.clone();
        let acquire = Task::perform(
            async move { capture.acquire(constraints).await },
            move |result| Message::CameraStarted {
                request,
                purpose,
                result,
            },
        );
        Task::batch([stop_recording, acquire])
    }

    pub(crate) fn handle_camera_started(
        &mut self,
        request: u64,
        purpose: StreamPurpose,
        result: BackendResult<StreamHandle>,
    ) -> Task {
        if request != self.stream_request {
            debug!(request, current = self.stream_request, "Discarding stale stream");
            if let Ok(stale) = result {
                self.capture.stop(&stale);
            }
            return Task::none();
        }

        match (result, purpose) {
            (Ok(handle), purpose) => {
                info!(
                    stream = handle.id,
                    native = %handle.native,
                    "Stream started"
                );
                self.stream = Some(handle);
                let toast = match purpose {
                    StreamPurpose::ChangeResolution(resolution) => {
                        self.resolution = resolution;
                        self.config.resolution = resolution;
                        self.show_toast(format!("Resolution changed to {}", resolution))
                    }
                    StreamPurpose::Start => Task::none(),
                };
                Task::batch([self.detect_torch_support(), toast])
            }
            (Err(err), StreamPurpose::Start) => {
                error!(error = %CameraError::from(err), "Error accessing camera");
                self.show_toast("Failed to access camera")
            }
            (Err(err), StreamPurpose::ChangeResolution(resolution)) => {
                error!(error = %CameraError::from(err), %resolution, "Error changing resolution");
                let toast = self.show_toast("Failed to change resolution");
                let fallback = self.start_camera(self.facing_mode, self.default_resolution);
                Task::batch([toast, fallback])
            }
        }
    }

    /// Torch is supported iff the rear camera's track reports it
    fn detect_torch_support(&mut self) -> Task {
        let supported = self.stream.as_ref().is_some_and(|stream| {
            stream.facing_mode == FacingMode::Environment
                && self.capture.query_torch_capability(stream)
        });
        self.torch_supported = supported;
        debug!(supported, "Torch capability detected");

        if !supported {
            if self.torch_mode != TorchMode::Off {
                debug!(mode = ?self.torch_mode, "Torch unavailable, resetting mode");
                self.torch_mode = TorchMode::Off;
            }
            return Task::none();
        }

        // A fresh track starts unlit
        if self.torch_mode.hardware_enabled() {
            return self.set_torch_task(true);
        }
        Task::none()
    }

    // =========================================================================
    // Camera selection
    // =========================================================================

    pub(crate) fn handle_switch_camera(&mut self) -> Task {
        let facing = self.facing_mode.toggled();
        info!(%facing, "Switching camera");
        self.start_camera(facing, self.resolution)
    }

    pub(crate) fn handle_select_resolution(&mut self, value: String) -> Task {
        match value.parse::<Resolution>() {
            Ok(resolution) => {
                info!(%resolution, "Changing resolution");
                self.acquire_stream(StreamPurpose::ChangeResolution(resolution))
            }
            Err(reason) => {
                warn!(error = %CameraError::InvalidResolution(value), reason = %reason, "Invalid resolution selection");
                self.show_toast("Failed to change resolution")
            }
        }
    }
}
