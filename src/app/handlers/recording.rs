// SPDX-License-Identifier: GPL-3.0-only

//! Video recording handlers
//!
//! Idle -> Recording <-> Paused -> Idle, plus the 1 s elapsed timer.

use crate::app::state::{CameraController, Message, RecordingSession, RecordingState};
use crate::app::task::Task;
use crate::backends::{BackendResult, RecordedMedia, SessionId};
use crate::constants::recording::{PREFERRED_MIME, TIMER_TICK};
use crate::constants::format_elapsed;
use crate::errors::{CameraError, RecordingError};
use crate::flash::TorchMode;
use crate::pipelines::video;
use crate::storage;
use std::mem;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, error, info, warn};

impl CameraController {
    /// Capture button in video mode
    pub(crate) fn handle_toggle_recording(&mut self) -> Task {
        match &self.recording {
            RecordingState::Idle => self.start_recording(),
            RecordingState::Starting { .. } => {
                debug!(error = %RecordingError::AlreadyRecording, "Recorder is starting, click ignored");
                Task::none()
            }
            RecordingState::Active(_) => self.handle_stop_recording(),
        }
    }

    fn start_recording(&mut self) -> Task {
        let Some(stream) = self.stream.clone() else {
            warn!(error = %CameraError::NoActiveStream, "Cannot start recording");
            return self.show_toast("Failed to start recording");
        };

        // Only a steady torch acts as a video light
        let torch_enabled = self.torch_supported && self.torch_mode == TorchMode::On;
        self.recording = RecordingState::Starting {
            torch_enabled,
            stop_requested: false,
        };
        info!(stream = stream.id, torch_enabled, "Starting recording");

        let capture = self.capture.clone();
        let recorder = self.recorder.clone();
        Task::perform(
            async move {
                if torch_enabled
                    && let Err(err) = capture.set_torch(&stream, true).await
                {
                    warn!(error = %err, "Failed to enable torch for recording");
                }
                recorder.start(&stream, PREFERRED_MIME).await
            },
            Message::RecordingStarted,
        )
    }

    pub(crate) fn handle_recording_started(&mut self, result: BackendResult<SessionId>) -> Task {
        let RecordingState::Starting {
            torch_enabled,
            stop_requested,
        } = self.recording
        else {
            warn!("Recorder start confirmed with no pending start");
            return Task::none();
        };

        match result {
            Ok(id) => {
                info!(session = %id, "Recording started");
                self.recording =
                    RecordingState::Active(RecordingSession::new(id, Instant::now(), torch_enabled));
                self.timer_text = format_elapsed(Duration::ZERO);
                let timer = self.restart_timer();
                let toast = self.show_toast("Recording started");
                if stop_requested {
                    debug!("Stop was requested while starting");
                    return Task::batch([timer, toast, self.handle_stop_recording()]);
                }
                Task::batch([timer, toast])
            }
            Err(err) => {
                error!(error = %RecordingError::StartFailed(err.to_string()), "Error starting recording");
                self.recording = RecordingState::Idle;
                let torch = if torch_enabled {
                    self.set_torch_task(false)
                } else {
                    Task::none()
                };
                Task::batch([torch, self.show_toast("Failed to start recording")])
            }
        }
    }

    /// Pause button: pause while recording, resume while paused
    pub(crate) fn handle_toggle_pause(&mut self) -> Task {
        let RecordingState::Active(session) = &mut self.recording else {
            debug!(error = %RecordingError::NotRecording, "Pause ignored");
            return Task::none();
        };
        let id = session.id;
        let recorder = self.recorder.clone();

        if session.is_paused() {
            session.resume(Instant::now());
            info!(session = %id, "Recording resumed");
            let command = Task::perform(
                async move { recorder.resume(id).await },
                |result| Message::RecorderCommand {
                    action: "resume",
                    result,
                },
            );
            let timer = self.restart_timer();
            Task::batch([command, timer, self.show_toast("Recording resumed")])
        } else {
            session.pause(Instant::now());
            info!(session = %id, "Recording paused");
            self.cancel_timer();
            let command = Task::perform(
                async move { recorder.pause(id).await },
                |result| Message::RecorderCommand {
                    action: "pause",
                    result,
                },
            );
            Task::batch([command, self.show_toast("Recording paused")])
        }
    }

    pub(crate) fn handle_recorder_command(
        &mut self,
        action: &'static str,
        result: BackendResult<()>,
    ) -> Task {
        match result {
            Ok(()) => debug!(action, "Recorder command applied"),
            Err(err) => warn!(action, error = %err, "Recorder command failed"),
        }
        Task::none()
    }

    /// Stop from Recording or Paused; no-op from Idle
    pub(crate) fn handle_stop_recording(&mut self) -> Task {
        match &mut self.recording {
            RecordingState::Idle => {
                debug!(error = %RecordingError::NotRecording, "Stop ignored");
                return Task::none();
            }
            RecordingState::Starting { stop_requested, .. } => {
                *stop_requested = true;
                return Task::none();
            }
            RecordingState::Active(_) => {}
        }

        let RecordingState::Active(session) = mem::take(&mut self.recording) else {
            return Task::none();
        };
        self.cancel_timer();
        self.timer_text = format_elapsed(Duration::ZERO);
        info!(
            session = %session.id,
            elapsed = ?session.elapsed(Instant::now()),
            "Stopping recording"
        );

        // A steady torch is the video light, even when turned on mid-recording
        let torch = if session.torch_enabled || self.torch_mode == TorchMode::On {
            self.set_torch_task(false)
        } else {
            Task::none()
        };

        let recorder = self.recorder.clone();
        let id = session.id;
        self.outstanding_saves += 1;
        let stop = Task::perform(
            async move { recorder.stop(id).await },
            move |result| Message::RecordingStopped { session, result },
        );
        Task::batch([torch, stop])
    }

    pub(crate) fn handle_recording_stopped(
        &mut self,
        mut session: RecordingSession,
        result: BackendResult<RecordedMedia>,
    ) -> Task {
        self.outstanding_saves = self.outstanding_saves.saturating_sub(1);
        match result {
            Ok(mut media) => {
                session.chunks.append(&mut media.chunks);
                let output = video::finalize(mem::take(&mut session.chunks), &media);
                let filename = storage::video_filename(storage::unix_millis(), &output.extension);
                info!(
                    filename = %filename,
                    size = output.data.len(),
                    mime_type = %output.mime_type,
                    "Recording finalized"
                );
                self.sink.save(output.data, &filename, &output.mime_type);
                self.show_toast("Video saved!")
            }
            Err(err) => {
                error!(
                    session = %session.id,
                    error = %RecordingError::StopFailed(err.to_string()),
                    "Failed to stop recording"
                );
                self.show_toast("Failed to save video")
            }
        }
    }

    // =========================================================================
    // Elapsed timer
    // =========================================================================

    /// Start a fresh tick chain; older ticks become stale
    fn restart_timer(&mut self) -> Task {
        self.timer_generation += 1;
        Task::delay(TIMER_TICK, Message::TimerTick(self.timer_generation))
    }

    fn cancel_timer(&mut self) {
        self.timer_generation += 1;
    }

    pub(crate) fn handle_timer_tick(&mut self, generation: u64) -> Task {
        if generation != self.timer_generation {
            return Task::none();
        }
        let RecordingState::Active(session) = &self.recording else {
            return Task::none();
        };
        if session.is_paused() {
            return Task::none();
        }
        self.timer_text = format_elapsed(session.elapsed(Instant::now()));
        Task::delay(TIMER_TICK, Message::TimerTick(generation))
    }
}
