// SPDX-License-Identifier: MPL-2.0

//! In-memory capabilities recording a timestamped event log

#![allow(dead_code)]

use async_trait::async_trait;
use ikdao_camera::app::{CameraController, Message, Runtime};
use ikdao_camera::backends::camera::types::{
    CameraFrame, DeviceId, FacingMode, Resolution, StreamConstraints, StreamHandle,
};
use ikdao_camera::backends::{
    BackendError, BackendResult, FileSink, MediaCapture, RecordedMedia, Recorder, SessionId,
};
use ikdao_camera::config::Config;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::Instant;

/// Something a capability was asked to do
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Enumerate,
    Acquire(StreamConstraints),
    StopStream(u64),
    SetTorch(bool),
    GrabFrame,
    RecorderStart(String),
    RecorderPause,
    RecorderResume,
    RecorderStop,
    Save {
        filename: String,
        mime_type: String,
        bytes: Vec<u8>,
    },
}

#[derive(Default)]
pub struct EventLog {
    events: Mutex<Vec<(Instant, Event)>>,
}

impl EventLog {
    pub fn push(&self, event: Event) {
        self.events.lock().unwrap().push((Instant::now(), event));
    }

    pub fn all(&self) -> Vec<(Instant, Event)> {
        self.events.lock().unwrap().clone()
    }

    pub fn events(&self) -> Vec<Event> {
        self.all().into_iter().map(|(_, e)| e).collect()
    }

    pub fn clear(&self) {
        self.events.lock().unwrap().clear();
    }

    /// Timestamps of the events matching `pred`
    pub fn times(&self, pred: impl Fn(&Event) -> bool) -> Vec<Instant> {
        self.all()
            .into_iter()
            .filter(|(_, e)| pred(e))
            .map(|(t, _)| t)
            .collect()
    }

    pub fn count(&self, pred: impl Fn(&Event) -> bool) -> usize {
        self.times(pred).len()
    }

    pub fn torch_changes(&self) -> Vec<bool> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                Event::SetTorch(on) => Some(on),
                _ => None,
            })
            .collect()
    }

    pub fn saves(&self) -> Vec<(String, String, Vec<u8>)> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                Event::Save {
                    filename,
                    mime_type,
                    bytes,
                } => Some((filename, mime_type, bytes)),
                _ => None,
            })
            .collect()
    }
}

pub fn is_grab(event: &Event) -> bool {
    matches!(event, Event::GrabFrame)
}

pub fn is_acquire(event: &Event) -> bool {
    matches!(event, Event::Acquire(_))
}

pub fn is_torch(on: bool) -> impl Fn(&Event) -> bool {
    move |event| *event == Event::SetTorch(on)
}

/// Scripted [`MediaCapture`]
pub struct MockCapture {
    log: Arc<EventLog>,
    next_id: AtomicU64,
    /// Rear camera reports a torch
    pub torch_capable: bool,
    /// Torch constraints are logged, then rejected
    pub fail_torch: bool,
    pub fail_enumerate: bool,
    /// Every acquisition fails
    pub deny: bool,
    /// Acquisitions at these resolutions fail
    pub failing_resolutions: Vec<Resolution>,
    /// Frame served by `grab_frame`
    pub frame: Mutex<Option<CameraFrame>>,
}

impl MockCapture {
    pub fn new(log: Arc<EventLog>) -> Self {
        Self {
            log,
            next_id: AtomicU64::new(1),
            torch_capable: true,
            fail_torch: false,
            fail_enumerate: false,
            deny: false,
            failing_resolutions: Vec::new(),
            frame: Mutex::new(None),
        }
    }

    pub fn set_frame(&self, frame: CameraFrame) {
        *self.frame.lock().unwrap() = Some(frame);
    }
}

#[async_trait]
impl MediaCapture for MockCapture {
    async fn enumerate_video_inputs(&self) -> BackendResult<Vec<DeviceId>> {
        self.log.push(Event::Enumerate);
        if self.fail_enumerate {
            return Err(BackendError::PermissionDenied);
        }
        Ok(vec![
            DeviceId {
                id: "front".to_string(),
                label: "Front".to_string(),
            },
            DeviceId {
                id: "rear".to_string(),
                label: "Rear".to_string(),
            },
        ])
    }

    async fn acquire(&self, constraints: StreamConstraints) -> BackendResult<StreamHandle> {
        self.log.push(Event::Acquire(constraints));
        if self.deny {
            return Err(BackendError::PermissionDenied);
        }
        if self.failing_resolutions.contains(&constraints.resolution) {
            return Err(BackendError::DeviceUnavailable(format!(
                "{} not supported",
                constraints.resolution
            )));
        }
        Ok(StreamHandle {
            id: self.next_id.fetch_add(1, Ordering::SeqCst),
            facing_mode: constraints.facing_mode,
            requested: constraints.resolution,
            native: constraints.resolution,
        })
    }

    fn query_torch_capability(&self, stream: &StreamHandle) -> bool {
        self.torch_capable && stream.facing_mode == FacingMode::Environment
    }

    async fn set_torch(&self, _stream: &StreamHandle, enabled: bool) -> BackendResult<()> {
        self.log.push(Event::SetTorch(enabled));
        if self.fail_torch {
            return Err(BackendError::Unsupported("torch".to_string()));
        }
        Ok(())
    }

    async fn grab_frame(&self, _stream: &StreamHandle) -> BackendResult<CameraFrame> {
        self.log.push(Event::GrabFrame);
        match self.frame.lock().unwrap().clone() {
            Some(frame) => Ok(frame),
            None => CameraFrame::from_rgba(4, 2, vec![128; 4 * 2 * 4]),
        }
    }

    fn stop(&self, stream: &StreamHandle) {
        self.log.push(Event::StopStream(stream.id));
    }
}

/// Scripted [`Recorder`] producing webm chunks
pub struct MockRecorder {
    log: Arc<EventLog>,
    pub fail_start: bool,
    pub chunks: Vec<Vec<u8>>,
}

impl MockRecorder {
    pub fn new(log: Arc<EventLog>) -> Self {
        Self {
            log,
            fail_start: false,
            chunks: vec![vec![1, 2, 3], vec![4, 5]],
        }
    }
}

#[async_trait]
impl Recorder for MockRecorder {
    async fn start(&self, _stream: &StreamHandle, mime_type: &str) -> BackendResult<SessionId> {
        self.log.push(Event::RecorderStart(mime_type.to_string()));
        if self.fail_start {
            return Err(BackendError::Unsupported("no encoder".to_string()));
        }
        Ok(SessionId::new())
    }

    async fn pause(&self, _session: SessionId) -> BackendResult<()> {
        self.log.push(Event::RecorderPause);
        Ok(())
    }

    async fn resume(&self, _session: SessionId) -> BackendResult<()> {
        self.log.push(Event::RecorderResume);
        Ok(())
    }

    async fn stop(&self, _session: SessionId) -> BackendResult<RecordedMedia> {
        self.log.push(Event::RecorderStop);
        Ok(RecordedMedia {
            chunks: self.chunks.clone(),
            mime_type: "video/webm;codecs=vp9,opus".to_string(),
            extension: "webm".to_string(),
        })
    }
}

pub struct MockSink {
    log: Arc<EventLog>,
}

impl FileSink for MockSink {
    fn save(&self, bytes: Vec<u8>, filename: &str, mime_type: &str) {
        self.log.push(Event::Save {
            filename: filename.to_string(),
            mime_type: mime_type.to_string(),
            bytes,
        });
    }
}

pub struct Harness {
    pub runtime: Runtime,
    pub log: Arc<EventLog>,
    pub capture: Arc<MockCapture>,
}

impl Harness {
    pub fn controller(&self) -> &CameraController {
        self.runtime.controller()
    }

    pub fn dispatch(&mut self, message: Message) {
        self.runtime.dispatch(message);
    }

    pub async fn run_for_millis(&mut self, millis: u64) {
        self.runtime.run_for(Duration::from_millis(millis)).await;
    }

    pub fn toast(&self) -> Option<String> {
        self.controller().ui().toast
    }

    /// Switch to the rear camera and wait for the stream
    pub async fn use_rear_camera(&mut self) {
        self.dispatch(Message::SwitchCamera);
        self.run_for_millis(10).await;
        assert_eq!(self.controller().facing_mode(), FacingMode::Environment);
    }
}

/// Build a harness; `setup` tweaks the mocks before they are shared
pub fn harness_with(
    setup: impl FnOnce(&mut MockCapture, &mut MockRecorder),
    config: Config,
) -> Harness {
    let log = Arc::new(EventLog::default());
    let mut capture = MockCapture::new(log.clone());
    let mut recorder = MockRecorder::new(log.clone());
    setup(&mut capture, &mut recorder);

    let capture = Arc::new(capture);
    let sink = Arc::new(MockSink { log: log.clone() });
    let controller = CameraController::new(capture.clone(), Arc::new(recorder), sink, config);
    Harness {
        runtime: Runtime::new(controller),
        log,
        capture,
    }
}

/// Harness with default mocks, initialized and streaming
pub async fn started_harness() -> Harness {
    let mut harness = harness_with(|_, _| {}, Config::default());
    harness.dispatch(Message::Init);
    harness.run_for_millis(10).await;
    assert!(harness.controller().stream().is_some());
    harness.log.clear();
    harness
}
