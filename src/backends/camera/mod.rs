// SPDX-License-Identifier: MPL-2.0

//! Camera capture abstraction
//!
//! The controller never talks to a device directly. Everything it needs from
//! the host's media stack goes through [`MediaCapture`]:
//!
//! ```text
//! ┌─────────────────────┐
//! │  CameraController   │
//! └──────────┬──────────┘
//!            │
//!            ▼
//! ┌─────────────────────┐
//! │ MediaCapture trait  │  ← acquire / torch / frame grab
//! └──────────┬──────────┘
//!            │
//!            ▼
//!    ┌───────────────┐
//!    │ VirtualCamera │  ← bundled test-pattern implementation
//!    └───────────────┘
//! ```

pub mod types;

pub use types::*;

use async_trait::async_trait;

/// Host media capture capability
///
/// Implementations own the devices; the controller only holds
/// [`StreamHandle`]s and must call [`MediaCapture::stop`] before dropping one.
#[async_trait]
pub trait MediaCapture: Send + Sync {
    /// List the video input devices
    async fn enumerate_video_inputs(&self) -> BackendResult<Vec<DeviceId>>;

    /// Acquire an audio+video stream
    ///
    /// # Returns
    /// * `Ok(StreamHandle)` - Stream is live
    /// * `Err(BackendError::PermissionDenied)` - Access refused
    /// * `Err(BackendError::DeviceUnavailable)` - No matching device or it is busy
    async fn acquire(&self, constraints: StreamConstraints) -> BackendResult<StreamHandle>;

    /// Whether the stream's video track exposes torch control
    fn query_torch_capability(&self, stream: &StreamHandle) -> bool;

    /// Enable or disable the torch on the stream's video track
    ///
    /// Fails with `BackendError::Unsupported` when the track has no torch.
    async fn set_torch(&self, stream: &StreamHandle, enabled: bool) -> BackendResult<()>;

    /// Grab the current live frame at the stream's native resolution
    async fn grab_frame(&self, stream: &StreamHandle) -> BackendResult<CameraFrame>;

    /// Stop all tracks of the stream. Stopping an unknown stream is a no-op.
    fn stop(&self, stream: &StreamHandle);
}
