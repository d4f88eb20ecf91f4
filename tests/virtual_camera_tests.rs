// SPDX-License-Identifier: MPL-2.0

//! End-to-end tests on the bundled virtual camera, writing into a temp dir

use ikdao_camera::app::{CameraController, Message, Runtime};
use ikdao_camera::backends::camera::types::Resolution;
use ikdao_camera::backends::virtual_camera::{MjpegRecorder, VirtualCamera, VirtualCameraOptions};
use ikdao_camera::config::Config;
use ikdao_camera::storage::DirectorySink;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

fn small_config() -> Config {
    Config {
        resolution: Resolution::new(320, 180),
        toast_duration_ms: 10,
        ..Config::default()
    }
}

fn runtime_in(dir: &Path) -> Runtime {
    runtime_with_sink(DirectorySink::new(dir))
}

fn runtime_with_sink(sink: DirectorySink) -> Runtime {
    let camera = Arc::new(VirtualCamera::new(VirtualCameraOptions::default()));
    let recorder = Arc::new(MjpegRecorder::new(camera.clone()));
    Runtime::new(CameraController::new(camera, recorder, Arc::new(sink), small_config()))
}

fn files_in(dir: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = std::fs::read_dir(dir)
        .map(|entries| entries.flatten().map(|e| e.path()).collect())
        .unwrap_or_default();
    files.sort();
    files
}

/// The sink writes in the background; poll until `count` files show up
async fn wait_for_files(dir: &Path, count: usize) -> Vec<PathBuf> {
    for _ in 0..100 {
        if let Ok(entries) = std::fs::read_dir(dir) {
            let mut files: Vec<PathBuf> = entries.flatten().map(|e| e.path()).collect();
            if files.len() >= count {
                files.sort();
                return files;
            }
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    panic!("timed out waiting for {} files in {}", count, dir.display());
}

#[tokio::test]
async fn photo_lands_in_output_directory() {
    let dir = tempfile::tempdir().unwrap();
    let mut runtime = runtime_in(dir.path());
    runtime.dispatch(Message::Init);
    runtime.settle().await;
    assert!(runtime.controller().stream().is_some());

    runtime.dispatch(Message::Capture);
    runtime.settle().await;

    let files = wait_for_files(dir.path(), 1).await;
    let name = files[0].file_name().unwrap().to_string_lossy().into_owned();
    assert!(name.starts_with("photo_") && name.ends_with(".jpg"), "{}", name);

    // Give the writer a moment to finish the file
    tokio::time::sleep(Duration::from_millis(50)).await;
    let photo = image::open(&files[0]).unwrap();
    assert_eq!((photo.width(), photo.height()), (320, 180));
}

#[tokio::test]
async fn recording_produces_motion_jpeg() {
    let dir = tempfile::tempdir().unwrap();
    let mut runtime = runtime_in(dir.path());
    runtime.dispatch(Message::Init);
    runtime.settle().await;

    runtime.dispatch(Message::ToggleMode);
    runtime.dispatch(Message::Capture);
    runtime.run_for(Duration::from_millis(700)).await;
    assert!(runtime.controller().recording().is_recording());

    runtime.dispatch(Message::StopRecording);
    runtime.run_for(Duration::from_millis(100)).await;

    let files = wait_for_files(dir.path(), 1).await;
    let name = files[0].file_name().unwrap().to_string_lossy().into_owned();
    assert!(name.starts_with("video_") && name.ends_with(".mjpeg"), "{}", name);

    tokio::time::sleep(Duration::from_millis(50)).await;
    let bytes = std::fs::read(&files[0]).unwrap();
    // Concatenated JPEG frames start with an SOI marker
    assert_eq!(&bytes[..2], &[0xFF, 0xD8]);
}

#[tokio::test]
async fn quitting_mid_capture_keeps_the_photo() {
    let dir = tempfile::tempdir().unwrap();
    let sink = DirectorySink::new(dir.path());
    let mut runtime = runtime_with_sink(sink.clone());
    runtime.dispatch(Message::Init);
    runtime.settle().await;

    // Quit right after the click, before the grab or encode has run
    runtime.dispatch(Message::Capture);
    assert!(runtime.controller().has_unsaved_work());
    assert!(runtime.shutdown(Duration::from_secs(5)).await);
    sink.flush().await;

    let files = files_in(dir.path());
    assert_eq!(files.len(), 1);
    let photo = image::open(&files[0]).unwrap();
    assert_eq!((photo.width(), photo.height()), (320, 180));
}

#[tokio::test]
async fn quitting_while_recording_keeps_the_video() {
    let dir = tempfile::tempdir().unwrap();
    let sink = DirectorySink::new(dir.path());
    let mut runtime = runtime_with_sink(sink.clone());
    runtime.dispatch(Message::Init);
    runtime.settle().await;

    runtime.dispatch(Message::ToggleMode);
    runtime.dispatch(Message::Capture);
    runtime.run_for(Duration::from_millis(700)).await;
    assert!(runtime.controller().recording().is_recording());

    assert!(runtime.shutdown(Duration::from_secs(5)).await);
    sink.flush().await;

    assert!(runtime.controller().recording().is_idle());
    let files = files_in(dir.path());
    assert_eq!(files.len(), 1);
    let bytes = std::fs::read(&files[0]).unwrap();
    assert_eq!(&bytes[..2], &[0xFF, 0xD8]);
}
