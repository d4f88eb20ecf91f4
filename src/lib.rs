// SPDX-License-Identifier: MPL-2.0

//! IKDAO Camera - camera controller with torch, capture sequencing and
//! recording controls
//!
//! The controller owns one capture stream and at most one recording session,
//! and drives them from UI events. Media capture, recording and file output
//! are capabilities behind traits so hosts can plug in their own.
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - [`app`]: Controller state, message dispatch and the cooperative runtime
//! - [`backends`]: Capability traits and the bundled virtual camera
//! - [`pipelines`]: Photo post-processing/encoding and video finalization
//! - [`flash`]: Torch modes and sysfs flash LEDs
//! - [`config`]: User configuration handling
//! - [`storage`]: Output naming and the directory file sink
//! - [`terminal`]: Terminal front end
//!
//! # Example
//!
//! ```ignore
//! let camera = Arc::new(VirtualCamera::new(VirtualCameraOptions::default()));
//! let recorder = Arc::new(MjpegRecorder::new(camera.clone()));
//! let sink = Arc::new(DirectorySink::new(config.output_dir()));
//! let mut runtime = Runtime::new(CameraController::new(camera, recorder, sink, config));
//! runtime.dispatch(Message::Init);
//! runtime.settle().await;
//! ```

pub mod app;
pub mod backends;
pub mod config;
pub mod constants;
pub mod errors;
pub mod flash;
pub mod pipelines;
pub mod storage;
pub mod terminal;

// Re-export commonly used types
pub use app::{CameraController, CameraMode, CaptureMode, FilterType, Message, Runtime, UiState};
pub use config::Config;
pub use flash::TorchMode;
