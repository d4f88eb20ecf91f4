// SPDX-License-Identifier: GPL-3.0-only

//! UI handlers
//!
//! Handles the mode toggle, capture-mode selector, filters, the menu and
//! toasts.

use crate::app::state::{
    CameraController, CameraMode, CaptureMode, ClickTarget, FilterType, Message, Toast,
};
use crate::app::task::Task;
use crate::flash::TorchMode;
use tracing::{debug, info};

impl CameraController {
    // =========================================================================
    // Modes
    // =========================================================================

    pub(crate) fn handle_toggle_mode(&mut self) -> Task {
        if let Some(sequence) = &self.sequence {
            debug!(mode = %sequence.mode, remaining = sequence.remaining, "Mode toggle ignored, sequence running");
            return Task::none();
        }
        match self.mode {
            CameraMode::Photo => {
                self.mode = CameraMode::Video;
                info!("Switched to video mode");
                // Auto flash has no meaning while recording
                if self.torch_mode == TorchMode::Auto {
                    self.torch_mode = TorchMode::Off;
                }
                Task::none()
            }
            CameraMode::Video => {
                self.mode = CameraMode::Photo;
                info!("Switched to photo mode");
                if self.recording.is_idle() {
                    Task::none()
                } else {
                    self.handle_stop_recording()
                }
            }
        }
    }

    pub(crate) fn handle_set_capture_mode(&mut self, mode: CaptureMode) -> Task {
        info!(%mode, "Capture mode selected");
        self.capture_mode = mode;
        self.config.capture_mode = mode;
        Task::none()
    }

    pub(crate) fn handle_select_filter(&mut self, filter: FilterType) -> Task {
        debug!(%filter, css = filter.css(), "Filter selected");
        self.filter = filter;
        Task::none()
    }

    // =========================================================================
    // Menu
    // =========================================================================

    pub(crate) fn handle_toggle_menu(&mut self) -> Task {
        self.menu_open = !self.menu_open;
        debug!(open = self.menu_open, "Menu toggled");
        Task::none()
    }

    /// Clicks outside the menu close it
    pub(crate) fn handle_document_click(&mut self, target: ClickTarget) -> Task {
        match target {
            ClickTarget::Menu | ClickTarget::MenuButton | ClickTarget::TorchButton => {}
            ClickTarget::Elsewhere => self.menu_open = false,
        }
        Task::none()
    }

    // =========================================================================
    // Toasts
    // =========================================================================

    /// Show `message`, replacing any visible toast
    pub(crate) fn show_toast(&mut self, message: impl Into<String>) -> Task {
        let message = message.into();
        self.toast_generation += 1;
        let generation = self.toast_generation;
        debug!(message = %message, "Toast");
        self.toast = Some(Toast {
            message,
            generation,
        });
        Task::delay(self.config.toast_duration(), Message::DismissToast(generation))
    }

    pub(crate) fn handle_dismiss_toast(&mut self, generation: u64) -> Task {
        if self
            .toast
            .as_ref()
            .is_some_and(|toast| toast.generation == generation)
        {
            self.toast = None;
        }
        Task::none()
    }
}
