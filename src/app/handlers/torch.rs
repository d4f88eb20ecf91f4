// SPDX-License-Identifier: GPL-3.0-only

//! Torch handlers

use crate::app::state::{CameraController, Message};
use crate::app::task::Task;
use crate::backends::BackendResult;
use crate::errors::CameraError;
use tracing::{debug, info, warn};

impl CameraController {
    /// Cycle off -> on -> auto -> off
    pub(crate) fn handle_toggle_torch(&mut self) -> Task {
        if !self.torch_supported {
            debug!(error = %CameraError::TorchUnsupported, "Torch toggle rejected");
            return self.show_toast("Torch is not supported on this camera.");
        }

        let next = self.torch_mode.next();
        info!(from = ?self.torch_mode, to = ?next, "Torch mode changed");
        self.torch_mode = next;

        Task::batch([
            self.set_torch_task(next.hardware_enabled()),
            self.show_toast(next.announcement()),
        ])
    }

    /// Apply the torch constraint to the active stream
    pub(crate) fn set_torch_task(&self, enabled: bool) -> Task {
        let Some(stream) = self.stream.clone() else {
            debug!(enabled, "No active stream, torch constraint skipped");
            return Task::none();
        };
        let capture = self.capture.clone();
        Task::perform(
            async move { capture.set_torch(&stream, enabled).await },
            move |result| Message::TorchApplied { enabled, result },
        )
    }

    pub(crate) fn handle_torch_applied(&mut self, enabled: bool, result: BackendResult<()>) -> Task {
        match result {
            Ok(()) => debug!(enabled, "Torch constraint applied"),
            Err(err) => warn!(enabled, error = %err, "Failed to set torch state"),
        }
        Task::none()
    }
}
