// SPDX-License-Identifier: GPL-3.0-only

//! Motion-JPEG recorder for the virtual camera
//!
//! Each recorded frame becomes one chunk; the finished file is the plain
//! concatenation of the JPEG frames, which common players open as MJPEG.

use super::VirtualCamera;
use crate::backends::camera::types::{BackendError, BackendResult, StreamHandle};
use crate::backends::recorder::{RecordedMedia, Recorder, SessionId};
use crate::constants::recording::{MJPEG_FRAME_INTERVAL, MJPEG_FRAME_SIZE};
use crate::pipelines::photo::encoding::{EncodingQuality, encode_jpeg_rgba};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

const MJPEG_MIME: &str = "video/x-motion-jpeg";
const MJPEG_EXTENSION: &str = "mjpeg";

struct ActiveSession {
    chunks: Arc<Mutex<Vec<Vec<u8>>>>,
    paused: Arc<AtomicBool>,
    stop_tx: oneshot::Sender<()>,
    task: JoinHandle<()>,
}

/// Records a virtual camera stream as motion JPEG
pub struct MjpegRecorder {
    camera: Arc<VirtualCamera>,
    sessions: Mutex<HashMap<SessionId, ActiveSession>>,
}

impl MjpegRecorder {
    pub fn new(camera: Arc<VirtualCamera>) -> Self {
        Self {
            camera,
            sessions: Mutex::new(HashMap::new()),
        }
    }

    fn lock_sessions(&self) -> std::sync::MutexGuard<'_, HashMap<SessionId, ActiveSession>> {
        self.sessions
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn with_session<T>(
        &self,
        session: SessionId,
        f: impl FnOnce(&ActiveSession) -> T,
    ) -> BackendResult<T> {
        self.lock_sessions()
            .get(&session)
            .map(f)
            .ok_or(BackendError::NoRecordingInProgress)
    }
}

#[async_trait]
impl Recorder for MjpegRecorder {
    async fn start(&self, stream: &StreamHandle, mime_type: &str) -> BackendResult<SessionId> {
        if !mime_type.starts_with(MJPEG_MIME) {
            debug!(requested = mime_type, actual = MJPEG_MIME, "Preferred container unsupported, recording MJPEG");
        }

        // Fail early if the stream is gone
        self.camera.pattern_params(stream)?;

        let session = SessionId::new();
        let chunks = Arc::new(Mutex::new(Vec::new()));
        let paused = Arc::new(AtomicBool::new(false));
        let (stop_tx, mut stop_rx) = oneshot::channel();

        let task = {
            let camera = Arc::clone(&self.camera);
            let stream = stream.clone();
            let chunks = Arc::clone(&chunks);
            let paused = Arc::clone(&paused);
            tokio::spawn(async move {
                let mut interval = tokio::time::interval(MJPEG_FRAME_INTERVAL);
                loop {
                    tokio::select! {
                        _ = &mut stop_rx => break,
                        _ = interval.tick() => {
                            if paused.load(Ordering::Acquire) {
                                continue;
                            }
                            let frame = match camera.render_preview(
                                &stream,
                                MJPEG_FRAME_SIZE.width,
                                MJPEG_FRAME_SIZE.height,
                            ) {
                                Ok(frame) => frame,
                                Err(e) => {
                                    warn!(error = %e, "Recording source lost");
                                    break;
                                }
                            };
                            match encode_jpeg_rgba(&frame.data, frame.width, frame.height, EncodingQuality::Medium) {
                                Ok(jpeg) => chunks
                                    .lock()
                                    .unwrap_or_else(|poisoned| poisoned.into_inner())
                                    .push(jpeg),
                                Err(e) => warn!(error = %e, "Dropping unencodable frame"),
                            }
                        }
                    }
                }
            })
        };

        info!(%session, stream = stream.id, "MJPEG recording started");
        self.lock_sessions().insert(
            session,
            ActiveSession {
                chunks,
                paused,
                stop_tx,
                task,
            },
        );
        Ok(session)
    }

    async fn pause(&self, session: SessionId) -> BackendResult<()> {
        self.with_session(session, |s| s.paused.store(true, Ordering::Release))
    }

    async fn resume(&self, session: SessionId) -> BackendResult<()> {
        self.with_session(session, |s| s.paused.store(false, Ordering::Release))
    }

    async fn stop(&self, session: SessionId) -> BackendResult<RecordedMedia> {
        let active = self
            .lock_sessions()
            .remove(&session)
            .ok_or(BackendError::NoRecordingInProgress)?;

        // The task may already have exited if its source stream went away
        let _ = active.stop_tx.send(());
        if let Err(e) = active.task.await {
            warn!(error = %e, "Recording task ended abnormally");
        }

        let chunks = std::mem::take(
            &mut *active
                .chunks
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner()),
        );
        info!(%session, frames = chunks.len(), "MJPEG recording stopped");

        Ok(RecordedMedia {
            chunks,
            mime_type: MJPEG_MIME.to_string(),
            extension: MJPEG_EXTENSION.to_string(),
        })
    }
}
