// SPDX-License-Identifier: MPL-2.0

//! Backend abstraction layer for capture, recording and output
//!
//! The controller is written against three host capabilities:
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │               CameraController               │
//! └──────┬──────────────┬───────────────┬───────┘
//!        │              │               │
//! ┌──────┴──────┐ ┌─────┴──────┐ ┌──────┴──────┐
//! │MediaCapture │ │  Recorder  │ │  FileSink   │
//! └─────────────┘ └────────────┘ └─────────────┘
//! ```
//!
//! # Modules
//!
//! - [`camera`]: Stream acquisition, torch control and frame grabbing
//! - [`recorder`]: Start/pause/resume/stop recording sessions
//! - [`sink`]: Fire-and-forget output of finished files
//! - [`virtual_camera`]: Bundled synthetic implementations of the above

pub mod camera;
pub mod recorder;
pub mod sink;
pub mod virtual_camera;

pub use camera::{BackendError, BackendResult, MediaCapture};
pub use recorder::{RecordedMedia, Recorder, SessionId};
pub use sink::FileSink;
