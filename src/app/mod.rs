// SPDX-License-Identifier: MPL-2.0

//! Camera controller
//!
//! # Architecture
//!
//! - `state`: controller state, the [`Message`] enum and the [`UiState`] view model
//! - `task`: deferred work returned by handlers
//! - `update`: the message dispatch table
//! - `handlers`: handler methods grouped by domain
//! - `runtime`: the cooperative loop driving tasks
//!
//! # Main Types
//!
//! - `CameraController`: owns the stream, the recording session and the
//!   UI affordances
//! - `Message`: all user interactions, timer ticks and capability results
//! - `Runtime`: feeds task results back into the controller

mod handlers;
pub mod runtime;
mod state;
pub mod task;
mod update;

pub use runtime::Runtime;
pub use state::{
    CameraController, CameraMode, CaptureButton, CaptureMode, ClickTarget, FilterButton,
    FilterType, Message, ModeButton, PauseButton, PhotoSequence, RecordingSession,
    RecordingState, ResolutionOption, StreamPurpose, Toast, TorchButton, UiState,
};
pub use task::Task;
