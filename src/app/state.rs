// SPDX-License-Identifier: GPL-3.0-only

//! Application state management

use crate::backends::camera::types::{
    CameraFrame, DeviceId, FacingMode, Resolution, StreamHandle,
};
use crate::backends::{BackendResult, FileSink, MediaCapture, RecordedMedia, Recorder, SessionId};
use crate::config::Config;
use crate::constants::{self, ResolutionPreset};
use crate::errors::PhotoError;
use crate::flash::TorchMode;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

/// Camera modes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CameraMode {
    #[default]
    Photo,
    Video,
}

/// How a photo-mode capture click is sequenced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaptureMode {
    /// One frame right away
    #[default]
    Instant,
    /// 3, 2, 1 countdown, then one frame
    Delayed,
    /// Burst of frames
    Continuous,
}

impl CaptureMode {
    pub const ALL: [CaptureMode; 3] = [
        CaptureMode::Instant,
        CaptureMode::Delayed,
        CaptureMode::Continuous,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CaptureMode::Instant => "instant",
            CaptureMode::Delayed => "delayed",
            CaptureMode::Continuous => "continuous",
        }
    }

    /// Next entry of the capture-mode selector (wraps)
    pub fn next(self) -> Self {
        match self {
            CaptureMode::Instant => CaptureMode::Delayed,
            CaptureMode::Delayed => CaptureMode::Continuous,
            CaptureMode::Continuous => CaptureMode::Instant,
        }
    }
}

impl std::fmt::Display for CaptureMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for CaptureMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CaptureMode::ALL
            .into_iter()
            .find(|mode| mode.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown capture mode: {}", s))
    }
}

/// Filter types for camera preview and captured photos
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FilterType {
    /// No filter applied
    #[default]
    None,
    Sepia,
    Grayscale,
    Blur,
    Brightness,
    Contrast,
    Saturate,
    HueRotate,
    Invert,
}

impl FilterType {
    /// Filter buttons, in menu order
    pub const ALL: [FilterType; 9] = [
        FilterType::None,
        FilterType::Sepia,
        FilterType::Grayscale,
        FilterType::Blur,
        FilterType::Brightness,
        FilterType::Contrast,
        FilterType::Saturate,
        FilterType::HueRotate,
        FilterType::Invert,
    ];

    /// Button data name, e.g. `hue-rotate`
    pub fn name(&self) -> &'static str {
        match self {
            FilterType::None => "none",
            FilterType::Sepia => "sepia",
            FilterType::Grayscale => "grayscale",
            FilterType::Blur => "blur",
            FilterType::Brightness => "brightness",
            FilterType::Contrast => "contrast",
            FilterType::Saturate => "saturate",
            FilterType::HueRotate => "hue-rotate",
            FilterType::Invert => "invert",
        }
    }

    /// CSS filter function applied to the preview
    pub fn css(&self) -> &'static str {
        match self {
            FilterType::None => "none",
            FilterType::Sepia => "sepia(100%)",
            FilterType::Grayscale => "grayscale(100%)",
            FilterType::Blur => "blur(2px)",
            FilterType::Brightness => "brightness(1.3)",
            FilterType::Contrast => "contrast(1.3)",
            FilterType::Saturate => "saturate(1.5)",
            FilterType::HueRotate => "hue-rotate(90deg)",
            FilterType::Invert => "invert(100%)",
        }
    }

    /// Preview element class, `None` for the unfiltered preview
    pub fn preview_class(&self) -> Option<String> {
        match self {
            FilterType::None => None,
            other => Some(format!("filter-{}", other.name())),
        }
    }
}

impl std::fmt::Display for FilterType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for FilterType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FilterType::ALL
            .into_iter()
            .find(|filter| filter.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown filter: {}", s))
    }
}

/// An active recording
#[derive(Debug, Clone)]
pub struct RecordingSession {
    pub id: SessionId,
    /// Container chunks in delivery order
    pub chunks: Vec<Vec<u8>>,
    pub started_at: Instant,
    /// Set while paused
    pub paused_at: Option<Instant>,
    /// Time spent paused before the current pause
    pub paused_total: Duration,
    /// Torch was switched on for this session and must be switched off on stop
    pub torch_enabled: bool,
}

impl RecordingSession {
    pub fn new(id: SessionId, started_at: Instant, torch_enabled: bool) -> Self {
        Self {
            id,
            chunks: Vec::new(),
            started_at,
            paused_at: None,
            paused_total: Duration::ZERO,
            torch_enabled,
        }
    }

    pub fn is_paused(&self) -> bool {
        self.paused_at.is_some()
    }

    pub fn pause(&mut self, now: Instant) {
        if self.paused_at.is_none() {
            self.paused_at = Some(now);
        }
    }

    pub fn resume(&mut self, now: Instant) {
        if let Some(paused_at) = self.paused_at.take() {
            self.paused_total += now.saturating_duration_since(paused_at);
        }
    }

    /// Recorded time at `now`, excluding pauses
    pub fn elapsed(&self, now: Instant) -> Duration {
        let end = self.paused_at.unwrap_or(now);
        end.saturating_duration_since(self.started_at)
            .saturating_sub(self.paused_total)
    }
}

/// Recording state machine
///
/// `Starting` covers the window between the click and the recorder
/// confirming; a stop requested in that window is applied on confirmation.
#[derive(Debug, Default)]
pub enum RecordingState {
    /// Not recording
    #[default]
    Idle,
    /// Recorder start requested
    Starting {
        torch_enabled: bool,
        stop_requested: bool,
    },
    /// Recording or paused
    Active(RecordingSession),
}

impl RecordingState {
    /// Check if currently recording (paused counts)
    pub fn is_recording(&self) -> bool {
        matches!(self, RecordingState::Active(_))
    }

    pub fn is_paused(&self) -> bool {
        matches!(self, RecordingState::Active(session) if session.is_paused())
    }

    pub fn is_idle(&self) -> bool {
        matches!(self, RecordingState::Idle)
    }

    pub fn session(&self) -> Option<&RecordingSession> {
        match self {
            RecordingState::Active(session) => Some(session),
            _ => None,
        }
    }
}

/// Photo sequence in progress
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhotoSequence {
    pub mode: CaptureMode,
    /// Torch was switched on for this sequence (auto torch)
    pub torch_enabled: bool,
    /// Frames still to capture
    pub remaining: u32,
}

/// A transient notification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub message: String,
    pub generation: u64,
}

/// What a document-level click landed on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickTarget {
    Menu,
    MenuButton,
    TorchButton,
    Elsewhere,
}

/// Why a stream is being acquired
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamPurpose {
    /// Startup, camera switch or fallback
    Start,
    /// Resolution selector change
    ChangeResolution(Resolution),
}

/// Messages emitted by the hosts, timers and capability calls
///
/// - **Lifecycle**: device enumeration and stream acquisition
/// - **Torch**: the 3-state torch toggle
/// - **UI**: mode toggle, menu, filters, toasts
/// - **Capture**: photo sequences
/// - **Recording**: recorder state machine and elapsed timer
#[derive(Debug, Clone)]
pub enum Message {
    // ===== Lifecycle =====
    /// Enumerate devices and start the default camera
    Init,
    DevicesEnumerated(BackendResult<Vec<DeviceId>>),
    CameraStarted {
        request: u64,
        purpose: StreamPurpose,
        result: BackendResult<StreamHandle>,
    },
    SwitchCamera,
    /// Resolution selector value (`WxH`)
    SelectResolution(String),

    // ===== Torch =====
    ToggleTorch,
    TorchApplied {
        enabled: bool,
        result: BackendResult<()>,
    },

    // ===== UI =====
    ToggleMode,
    SetCaptureMode(CaptureMode),
    SelectFilter(FilterType),
    ToggleMenu,
    DocumentClick(ClickTarget),
    DismissToast(u64),

    // ===== Capture =====
    /// Capture button
    Capture,
    SequenceTorchReady(BackendResult<()>),
    CountdownTick,
    Shoot,
    FrameGrabbed(BackendResult<CameraFrame>),
    PhotoSaved(Result<String, PhotoError>),

    // ===== Recording =====
    /// Pause button (pause or resume)
    TogglePause,
    StopRecording,
    RecordingStarted(BackendResult<SessionId>),
    RecorderCommand {
        action: &'static str,
        result: BackendResult<()>,
    },
    RecordingStopped {
        session: RecordingSession,
        result: BackendResult<RecordedMedia>,
    },
    TimerTick(u64),
}

/// The camera controller
///
/// Owns the stream, the recording session and every UI affordance. All
/// mutation goes through [`update`](Self::update).
pub struct CameraController {
    pub(crate) capture: Arc<dyn MediaCapture>,
    pub(crate) recorder: Arc<dyn Recorder>,
    pub(crate) sink: Arc<dyn FileSink>,
    /// Startup settings, updated with confirmed selector changes
    pub(crate) config: Config,
    /// Fallback after a failed resolution change
    pub(crate) default_resolution: Resolution,

    // Camera
    pub(crate) devices: Vec<DeviceId>,
    pub(crate) stream: Option<StreamHandle>,
    /// Bumped per acquisition; results for older requests are discarded
    pub(crate) stream_request: u64,
    pub(crate) facing_mode: FacingMode,
    pub(crate) resolution: Resolution,
    pub(crate) torch_supported: bool,
    pub(crate) torch_mode: TorchMode,

    // Modes
    pub(crate) mode: CameraMode,
    pub(crate) capture_mode: CaptureMode,
    pub(crate) filter: FilterType,

    // Capture
    pub(crate) sequence: Option<PhotoSequence>,
    pub(crate) countdown: Option<u32>,
    /// Photos and videos handed to encoding or the recorder but not yet saved
    pub(crate) outstanding_saves: u32,

    // Recording
    pub(crate) recording: RecordingState,
    /// Bumped whenever the elapsed timer is cancelled or restarted
    pub(crate) timer_generation: u64,
    pub(crate) timer_text: String,

    // UI
    pub(crate) toast: Option<Toast>,
    pub(crate) toast_generation: u64,
    pub(crate) menu_open: bool,
    pub(crate) resolution_options: Vec<ResolutionPreset>,
}

impl CameraController {
    pub fn new(
        capture: Arc<dyn MediaCapture>,
        recorder: Arc<dyn Recorder>,
        sink: Arc<dyn FileSink>,
        config: Config,
    ) -> Self {
        Self {
            capture,
            recorder,
            sink,
            facing_mode: config.facing_mode,
            resolution: config.resolution,
            default_resolution: config.resolution,
            capture_mode: config.capture_mode,
            config,
            devices: Vec::new(),
            stream: None,
            stream_request: 0,
            torch_supported: false,
            torch_mode: TorchMode::Off,
            mode: CameraMode::Photo,
            filter: FilterType::None,
            sequence: None,
            countdown: None,
            outstanding_saves: 0,
            recording: RecordingState::Idle,
            timer_generation: 0,
            timer_text: constants::format_elapsed(Duration::ZERO),
            toast: None,
            toast_generation: 0,
            menu_open: false,
            resolution_options: Vec::new(),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn devices(&self) -> &[DeviceId] {
        &self.devices
    }

    pub fn stream(&self) -> Option<&StreamHandle> {
        self.stream.as_ref()
    }

    pub fn facing_mode(&self) -> FacingMode {
        self.facing_mode
    }

    pub fn resolution(&self) -> Resolution {
        self.resolution
    }

    pub fn torch_supported(&self) -> bool {
        self.torch_supported
    }

    pub fn torch_mode(&self) -> TorchMode {
        self.torch_mode
    }

    pub fn mode(&self) -> CameraMode {
        self.mode
    }

    pub fn capture_mode(&self) -> CaptureMode {
        self.capture_mode
    }

    pub fn filter(&self) -> FilterType {
        self.filter
    }

    pub fn recording(&self) -> &RecordingState {
        &self.recording
    }

    /// A photo sequence is running
    pub fn is_busy(&self) -> bool {
        self.sequence.is_some()
    }

    /// Something captured may still be lost if the host exits now
    pub fn has_unsaved_work(&self) -> bool {
        self.is_busy() || self.outstanding_saves > 0 || !self.recording.is_idle()
    }

    /// Snapshot of every UI affordance
    pub fn ui(&self) -> UiState {
        let recording = self.recording.is_recording();
        let paused = self.recording.is_paused();
        let video = self.mode == CameraMode::Video;

        UiState {
            torch_button: self.torch_supported.then(|| TorchButton {
                icon: self.torch_mode.icon_name(),
                active: self.torch_mode.is_active(),
            }),
            mode_button: if video {
                ModeButton {
                    icon: "videocam",
                    title: "Photo Mode",
                }
            } else {
                ModeButton {
                    icon: "photo_camera",
                    title: "Video Mode",
                }
            },
            capture_button: CaptureButton {
                background: if video {
                    "red"
                } else {
                    "rgba(255, 255, 255, 0.9)"
                },
                recording,
            },
            video_controls_visible: recording,
            pause_button: if paused {
                PauseButton {
                    icon: "play_arrow",
                    title: "Resume",
                }
            } else {
                PauseButton {
                    icon: "pause",
                    title: "Pause",
                }
            },
            timer: recording.then(|| self.timer_text.clone()),
            recording_indicator: recording,
            countdown: self.countdown,
            toast: self.toast.as_ref().map(|t| t.message.clone()),
            menu_open: self.menu_open,
            resolution_options: self
                .resolution_options
                .iter()
                .map(|preset| ResolutionOption {
                    value: preset.resolution.value(),
                    label: preset.label,
                    selected: preset.resolution == self.resolution,
                })
                .collect(),
            capture_mode: self.capture_mode,
            filters: FilterType::ALL
                .into_iter()
                .map(|filter| FilterButton {
                    filter,
                    active: filter == self.filter,
                })
                .collect(),
            preview_class: self.filter.preview_class(),
            preview_mirrored: self.facing_mode.is_front(),
        }
    }
}

/// View model rendered by the hosts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UiState {
    /// `None` while hidden
    pub torch_button: Option<TorchButton>,
    pub mode_button: ModeButton,
    pub capture_button: CaptureButton,
    pub video_controls_visible: bool,
    pub pause_button: PauseButton,
    /// Elapsed `MM:SS`, `None` while hidden
    pub timer: Option<String>,
    pub recording_indicator: bool,
    /// Countdown overlay value, `None` while hidden
    pub countdown: Option<u32>,
    pub toast: Option<String>,
    pub menu_open: bool,
    pub resolution_options: Vec<ResolutionOption>,
    pub capture_mode: CaptureMode,
    pub filters: Vec<FilterButton>,
    pub preview_class: Option<String>,
    pub preview_mirrored: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TorchButton {
    pub icon: &'static str,
    pub active: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModeButton {
    pub icon: &'static str,
    pub title: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaptureButton {
    pub background: &'static str,
    /// Recording style
    pub recording: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PauseButton {
    pub icon: &'static str,
    pub title: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolutionOption {
    pub value: String,
    pub label: &'static str,
    pub selected: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterButton {
    pub filter: FilterType,
    pub active: bool,
}
