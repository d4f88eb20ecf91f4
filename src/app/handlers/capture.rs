// SPDX-License-Identifier: GPL-3.0-only

//! Capture operations handlers
//!
//! Sequences instant, delayed and continuous photo capture, including the
//! auto torch, and turns grabbed frames into saved photos.

use crate::app::state::{CameraController, CameraMode, CaptureMode, Message, PhotoSequence};
use crate::app::task::Task;
use crate::backends::camera::types::CameraFrame;
use crate::backends::BackendResult;
use crate::constants::capture::{
    BURST_COUNT, BURST_INTERVAL, COUNTDOWN_START, COUNTDOWN_TICK, FLASH_SETTLE,
};
use crate::errors::{CameraError, PhotoError};
use crate::flash::TorchMode;
use crate::pipelines::photo::{
    EncodingFormat, EncodingQuality, PhotoEncoder, PhotoPipeline, PostProcessingConfig,
};
use crate::storage;
use tracing::{debug, error, info, warn};

impl CameraController {
    // =========================================================================
    // Capture Operations Handlers
    // =========================================================================

    /// Capture button: photo sequence in photo mode, record toggle in video mode
    pub(crate) fn handle_capture(&mut self) -> Task {
        if self.mode == CameraMode::Video {
            return self.handle_toggle_recording();
        }

        if let Some(sequence) = &self.sequence {
            debug!(mode = %sequence.mode, remaining = sequence.remaining, "Capture ignored, sequence running");
            return Task::none();
        }

        let mode = self.capture_mode;
        let torch_enabled = self.torch_mode == TorchMode::Auto && self.stream.is_some();
        let shots = match mode {
            CaptureMode::Continuous => BURST_COUNT,
            CaptureMode::Instant | CaptureMode::Delayed => 1,
        };
        info!(%mode, torch_enabled, shots, "Starting photo sequence");
        self.sequence = Some(PhotoSequence {
            mode,
            torch_enabled,
            remaining: shots,
        });

        if torch_enabled {
            let Some(stream) = self.stream.clone() else {
                return self.begin_sequence();
            };
            let capture = self.capture.clone();
            return Task::perform(
                async move { capture.set_torch(&stream, true).await },
                Message::SequenceTorchReady,
            );
        }
        self.begin_sequence()
    }

    pub(crate) fn handle_sequence_torch_ready(&mut self, result: BackendResult<()>) -> Task {
        if let Err(err) = result {
            warn!(error = %err, "Failed to enable torch for capture");
        }
        self.begin_sequence()
    }

    /// First step once the torch (if any) is lit
    fn begin_sequence(&mut self) -> Task {
        let Some(sequence) = self.sequence else {
            return Task::none();
        };
        match sequence.mode {
            CaptureMode::Instant if sequence.torch_enabled => Task::delay(FLASH_SETTLE, Message::Shoot),
            CaptureMode::Instant | CaptureMode::Continuous => self.handle_shoot(),
            CaptureMode::Delayed => {
                self.countdown = Some(COUNTDOWN_START);
                debug!(value = COUNTDOWN_START, "Countdown");
                Task::delay(COUNTDOWN_TICK, Message::CountdownTick)
            }
        }
    }

    pub(crate) fn handle_countdown_tick(&mut self) -> Task {
        match self.countdown {
            Some(value) if value > 1 => {
                self.countdown = Some(value - 1);
                debug!(value = value - 1, "Countdown");
                Task::delay(COUNTDOWN_TICK, Message::CountdownTick)
            }
            Some(_) => {
                self.countdown = None;
                self.handle_shoot()
            }
            None => Task::none(),
        }
    }

    /// Grab the live frame
    pub(crate) fn handle_shoot(&mut self) -> Task {
        let Some(stream) = self.stream.clone() else {
            warn!(error = %CameraError::NoActiveStream, "Cannot capture photo");
            let toast = self.show_toast("Failed to capture photo");
            return Task::batch([toast, self.advance_sequence()]);
        };
        let capture = self.capture.clone();
        Task::perform(
            async move { capture.grab_frame(&stream).await },
            Message::FrameGrabbed,
        )
    }

    pub(crate) fn handle_frame_grabbed(&mut self, result: BackendResult<CameraFrame>) -> Task {
        let photo = match result {
            Ok(frame) => {
                debug!(width = frame.width, height = frame.height, "Frame grabbed");
                let save = self.save_photo(frame);
                Task::batch([save, self.show_toast("Photo captured!")])
            }
            Err(err) => {
                error!(error = %err, "Failed to grab frame");
                self.show_toast("Failed to capture photo")
            }
        };
        Task::batch([photo, self.advance_sequence()])
    }

    /// Schedule the next shot, or finish the sequence
    fn advance_sequence(&mut self) -> Task {
        let Some(sequence) = self.sequence.as_mut() else {
            return Task::none();
        };
        sequence.remaining = sequence.remaining.saturating_sub(1);
        if sequence.remaining > 0 {
            return Task::delay(BURST_INTERVAL, Message::Shoot);
        }

        let Some(finished) = self.sequence.take() else {
            return Task::none();
        };
        info!(mode = %finished.mode, "Photo sequence complete");

        // The user may have switched to a steady torch mid-sequence
        let torch = if finished.torch_enabled && !self.torch_mode.hardware_enabled() {
            self.set_torch_task(false)
        } else {
            Task::none()
        };
        let toast = if finished.mode == CaptureMode::Continuous {
            self.show_toast(format!("Captured {} photos", BURST_COUNT))
        } else {
            Task::none()
        };
        Task::batch([torch, toast])
    }

    /// Mirror, filter, encode and hand the photo to the sink
    fn save_photo(&mut self, frame: CameraFrame) -> Task {
        let pipeline = PhotoPipeline::new(
            PostProcessingConfig {
                mirror: self.facing_mode.is_front(),
                filter_type: self.filter,
            },
            PhotoEncoder::new(
                EncodingFormat::Jpeg,
                EncodingQuality::Custom(self.config.jpeg_quality),
            ),
        );
        let sink = self.sink.clone();
        let millis = storage::unix_millis();
        self.outstanding_saves += 1;

        Task::perform(
            async move {
                let encoded = pipeline.process(frame).await?;
                let filename = storage::photo_filename(millis, encoded.format.extension());
                sink.save(encoded.data, &filename, encoded.format.mime_type());
                Ok::<_, PhotoError>(filename)
            },
            Message::PhotoSaved,
        )
    }

    pub(crate) fn handle_photo_saved(&mut self, result: Result<String, PhotoError>) -> Task {
        self.outstanding_saves = self.outstanding_saves.saturating_sub(1);
        match result {
            Ok(filename) => {
                info!(filename = %filename, "Photo saved");
                Task::none()
            }
            Err(err) => {
                error!(error = %err, "Failed to save photo");
                self.show_toast("Failed to capture photo")
            }
        }
    }
}
