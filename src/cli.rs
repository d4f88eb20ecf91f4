// SPDX-License-Identifier: GPL-3.0-only

//! CLI commands for camera operations
//!
//! This module provides command-line functionality for:
//! - Listing available cameras
//! - Taking photos
//! - Recording videos
//!
//! Every command drives the same controller and runtime as the terminal
//! front end, with artifacts collected in memory and written at the end.

use ikdao_camera::app::{CameraController, CaptureMode, FilterType, Message, Runtime};
use ikdao_camera::backends::camera::types::{FacingMode, Resolution};
use ikdao_camera::backends::virtual_camera::{
    MjpegRecorder, TorchBackend, VirtualCamera, VirtualCameraOptions,
};
use ikdao_camera::backends::{FileSink, MediaCapture};
use ikdao_camera::config::Config;
use ikdao_camera::constants::RESOLUTION_PRESETS;
use ikdao_camera::flash::{FlashHardware, TorchMode};
use ikdao_camera::storage::DirectorySink;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::{info, warn};

/// Settings shared by the capture commands
pub struct CaptureOptions {
    pub facing: Option<FacingMode>,
    pub resolution: Option<Resolution>,
    pub torch: TorchMode,
    pub output: Option<PathBuf>,
}

/// A finished artifact held until the command completes
struct Artifact {
    filename: String,
    bytes: Vec<u8>,
}

/// [`FileSink`] collecting artifacts in memory
#[derive(Default)]
struct CollectingSink {
    artifacts: Mutex<Vec<Artifact>>,
}

impl CollectingSink {
    fn take(&self) -> Vec<Artifact> {
        match self.artifacts.lock() {
            Ok(mut artifacts) => std::mem::take(&mut *artifacts),
            Err(poisoned) => std::mem::take(&mut *poisoned.into_inner()),
        }
    }
}

impl FileSink for CollectingSink {
    fn save(&self, bytes: Vec<u8>, filename: &str, mime_type: &str) {
        info!(filename, mime_type, size = bytes.len(), "Artifact ready");
        let artifact = Artifact {
            filename: filename.to_string(),
            bytes,
        };
        match self.artifacts.lock() {
            Ok(mut artifacts) => artifacts.push(artifact),
            Err(poisoned) => poisoned.into_inner().push(artifact),
        }
    }
}

/// List all available cameras
pub async fn list_cameras() -> Result<(), Box<dyn std::error::Error>> {
    let flash = FlashHardware::detect();
    let camera = VirtualCamera::new(VirtualCameraOptions::default());
    let devices = camera.enumerate_video_inputs().await?;

    if devices.is_empty() {
        println!("No cameras found.");
        return Ok(());
    }

    println!("Available cameras:");
    println!();
    for (index, device) in devices.iter().enumerate() {
        println!("  [{}] {} ({})", index, device.label, device.id);
    }
    println!();

    let resolutions: Vec<&str> = RESOLUTION_PRESETS.iter().map(|preset| preset.label).collect();
    println!("Resolutions: {}", resolutions.join(", "));

    if flash.has_devices() {
        let names: Vec<&str> = flash.devices.iter().map(|device| device.name()).collect();
        println!("Flash LEDs: {}", names.join(", "));
    } else if let Some(err) = &flash.permission_error {
        println!("Flash LEDs: {}", err);
    } else {
        println!("Flash LEDs: none (torch is simulated)");
    }

    Ok(())
}

/// Take one photo sequence (instant, delayed or a burst)
pub async fn take_photo(
    mut config: Config,
    options: CaptureOptions,
    filter: FilterType,
    mode: CaptureMode,
) -> Result<(), Box<dyn std::error::Error>> {
    config.capture_mode = mode;
    let output = output_dir(&config, &options);
    let (mut runtime, sink) = start_controller(config, &options).await?;

    runtime.dispatch(Message::SelectFilter(filter));
    runtime.dispatch(Message::Capture);
    runtime.settle().await;

    let paths = write_artifacts(&output, sink.take()).await?;
    if paths.is_empty() {
        return Err("Failed to capture photo".into());
    }
    for path in paths {
        println!("Photo saved: {}", path.display());
    }
    Ok(())
}

/// Record a video for `duration`
pub async fn record_video(
    config: Config,
    options: CaptureOptions,
    duration: Duration,
) -> Result<(), Box<dyn std::error::Error>> {
    let output = output_dir(&config, &options);
    let (mut runtime, sink) = start_controller(config, &options).await?;

    runtime.dispatch(Message::ToggleMode);
    runtime.dispatch(Message::Capture);
    println!("Recording for {} seconds...", duration.as_secs());
    runtime.run_for(duration).await;
    if !runtime.controller().recording().is_recording() {
        return Err("Failed to start recording".into());
    }

    runtime.dispatch(Message::StopRecording);
    // Timer ticks still queued are stale and resolve to nothing
    runtime.settle().await;

    let paths = write_artifacts(&output, sink.take()).await?;
    match paths.first() {
        Some(path) => {
            println!("Video saved: {}", path.display());
            Ok(())
        }
        None => Err("Recording produced no output".into()),
    }
}

fn output_dir(config: &Config, options: &CaptureOptions) -> PathBuf {
    options.output.clone().unwrap_or_else(|| config.output_dir())
}

/// Build the controller on the virtual camera and bring the stream up
async fn start_controller(
    mut config: Config,
    options: &CaptureOptions,
) -> Result<(Runtime, Arc<CollectingSink>), Box<dyn std::error::Error>> {
    if let Some(facing) = options.facing {
        config.facing_mode = facing;
    }
    if let Some(resolution) = options.resolution {
        config.resolution = resolution;
    }

    let camera = Arc::new(VirtualCamera::new(VirtualCameraOptions {
        torch: TorchBackend::detect(),
        deny_permission: false,
    }));
    let recorder = Arc::new(MjpegRecorder::new(camera.clone()));
    let sink = Arc::new(CollectingSink::default());

    let controller = CameraController::new(camera, recorder, sink.clone(), config);
    let mut runtime = Runtime::new(controller);
    runtime.dispatch(Message::Init);
    runtime.settle().await;

    let Some(stream) = runtime.controller().stream() else {
        return Err("Failed to access camera".into());
    };
    info!(stream = stream.id, native = %stream.native, "Camera ready");

    if options.torch != TorchMode::Off {
        if runtime.controller().torch_supported() {
            while runtime.controller().torch_mode() != options.torch {
                runtime.dispatch(Message::ToggleTorch);
            }
        } else {
            warn!(facing = %runtime.controller().facing_mode(), "Torch is not supported on this camera");
        }
    }

    Ok((runtime, sink))
}

async fn write_artifacts(
    dir: &Path,
    artifacts: Vec<Artifact>,
) -> Result<Vec<PathBuf>, Box<dyn std::error::Error>> {
    let mut paths = Vec::with_capacity(artifacts.len());
    for artifact in artifacts {
        let path = DirectorySink::write(dir, &artifact.filename, &artifact.bytes).await?;
        paths.push(path);
    }
    Ok(paths)
}
