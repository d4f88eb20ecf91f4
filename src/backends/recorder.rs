// SPDX-License-Identifier: GPL-3.0-only

//! Media recording capability

use super::camera::{BackendResult, StreamHandle};
use async_trait::async_trait;

/// Identifier of a recorder-side session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(pub uuid::Uuid);

impl SessionId {
    pub fn new() -> Self {
        SessionId(uuid::Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Everything the recorder produced for one session
#[derive(Debug, Clone, Default)]
pub struct RecordedMedia {
    /// Data chunks in delivery order
    pub chunks: Vec<Vec<u8>>,
    /// Container MIME type, e.g. `video/webm`
    pub mime_type: String,
    /// File extension without the dot
    pub extension: String,
}

/// Host media recording capability
///
/// Recording is treated as a black box: start it on a stream, pause/resume,
/// and collect the chunks on stop.
#[async_trait]
pub trait Recorder: Send + Sync {
    /// Begin recording `stream`, preferring `mime_type` when supported
    async fn start(&self, stream: &StreamHandle, mime_type: &str) -> BackendResult<SessionId>;

    /// Stop appending chunks until resumed
    async fn pause(&self, session: SessionId) -> BackendResult<()>;

    /// Continue appending chunks
    async fn resume(&self, session: SessionId) -> BackendResult<()>;

    /// Finish the session and hand back the recorded chunks
    async fn stop(&self, session: SessionId) -> BackendResult<RecordedMedia>;
}
