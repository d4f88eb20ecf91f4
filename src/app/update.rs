// SPDX-License-Identifier: GPL-3.0-only

//! Message update handling
//!
//! The `update()` function is the dispatch table: every message is routed to
//! one handler method in the `handlers` submodules.
//!
//! # Handler Modules
//!
//! - `handlers::camera`: enumeration, stream acquisition, camera switch, resolution
//! - `handlers::torch`: the 3-state torch toggle
//! - `handlers::capture`: instant, delayed and continuous photo sequences
//! - `handlers::recording`: recorder state machine and elapsed timer
//! - `handlers::ui`: mode toggle, filters, menu, toasts

use crate::app::state::{CameraController, Message};
use crate::app::task::Task;

impl CameraController {
    /// Main message handler - routes messages to appropriate handler methods.
    pub fn update(&mut self, message: Message) -> Task {
        match message {
            // ===== Lifecycle =====
            Message::Init => self.handle_init(),
            Message::DevicesEnumerated(result) => self.handle_devices_enumerated(result),
            Message::CameraStarted {
                request,
                purpose,
                result,
            } => self.handle_camera_started(request, purpose, result),
            Message::SwitchCamera => self.handle_switch_camera(),
            Message::SelectResolution(value) => self.handle_select_resolution(value),

            // ===== Torch =====
            Message::ToggleTorch => self.handle_toggle_torch(),
            Message::TorchApplied { enabled, result } => self.handle_torch_applied(enabled, result),

            // ===== UI =====
            Message::ToggleMode => self.handle_toggle_mode(),
            Message::SetCaptureMode(mode) => self.handle_set_capture_mode(mode),
            Message::SelectFilter(filter) => self.handle_select_filter(filter),
            Message::ToggleMenu => self.handle_toggle_menu(),
            Message::DocumentClick(target) => self.handle_document_click(target),
            Message::DismissToast(generation) => self.handle_dismiss_toast(generation),

            // ===== Capture =====
            Message::Capture => self.handle_capture(),
            Message::SequenceTorchReady(result) => self.handle_sequence_torch_ready(result),
            Message::CountdownTick => self.handle_countdown_tick(),
            Message::Shoot => self.handle_shoot(),
            Message::FrameGrabbed(result) => self.handle_frame_grabbed(result),
            Message::PhotoSaved(result) => self.handle_photo_saved(result),

            // ===== Recording =====
            Message::TogglePause => self.handle_toggle_pause(),
            Message::StopRecording => self.handle_stop_recording(),
            Message::RecordingStarted(result) => self.handle_recording_started(result),
            Message::RecorderCommand { action, result } => {
                self.handle_recorder_command(action, result)
            }
            Message::RecordingStopped { session, result } => {
                self.handle_recording_stopped(session, result)
            }
            Message::TimerTick(generation) => self.handle_timer_tick(generation),
        }
    }
}
