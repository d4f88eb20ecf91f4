// SPDX-License-Identifier: GPL-3.0-only

//! Application-wide constants

use crate::backends::camera::types::Resolution;
use std::time::Duration;

/// Constraints used at startup and as the resolution-change fallback
pub const DEFAULT_RESOLUTION: Resolution = Resolution::new(1920, 1080);

/// A resolution selector entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolutionPreset {
    pub resolution: Resolution,
    pub label: &'static str,
}

/// Resolutions offered by the resolution selector, highest first
pub const RESOLUTION_PRESETS: [ResolutionPreset; 4] = [
    ResolutionPreset {
        resolution: Resolution::new(1920, 1080),
        label: "1080p (1920x1080)",
    },
    ResolutionPreset {
        resolution: Resolution::new(1280, 720),
        label: "720p (1280x720)",
    },
    ResolutionPreset {
        resolution: Resolution::new(854, 480),
        label: "480p (854x480)",
    },
    ResolutionPreset {
        resolution: Resolution::new(640, 360),
        label: "360p (640x360)",
    },
];

/// Photo capture timing
pub mod capture {
    use super::Duration;

    /// Torch settle time before an instant auto-flash exposure
    pub const FLASH_SETTLE: Duration = Duration::from_millis(100);

    /// Delayed capture counts down from this value
    pub const COUNTDOWN_START: u32 = 3;

    /// How long each countdown value stays on screen
    pub const COUNTDOWN_TICK: Duration = Duration::from_secs(1);

    /// Frames taken by one continuous (burst) capture
    pub const BURST_COUNT: u32 = 5;

    /// Gap between successive burst frames
    pub const BURST_INTERVAL: Duration = Duration::from_millis(200);

    /// Default JPEG quality (0-100)
    pub const DEFAULT_JPEG_QUALITY: u8 = 90;
}

/// Video recording constants
pub mod recording {
    use super::{Duration, Resolution};

    /// Container preference handed to the recorder
    pub const PREFERRED_MIME: &str = "video/webm;codecs=vp9,opus";

    /// Elapsed-time display refresh period
    pub const TIMER_TICK: Duration = Duration::from_secs(1);

    /// Frame period of the bundled MJPEG recorder (5 fps)
    pub const MJPEG_FRAME_INTERVAL: Duration = Duration::from_millis(200);

    /// Frame size of the bundled MJPEG recorder
    pub const MJPEG_FRAME_SIZE: Resolution = Resolution::new(640, 360);
}

/// UI constants
pub mod ui {
    use super::Duration;

    /// Toast auto-dismiss delay
    pub const TOAST_DURATION: Duration = Duration::from_secs(2);

    /// Terminal host redraw period
    pub const TERMINAL_FRAME: Duration = Duration::from_millis(33);

    /// How long quitting waits for captures still being encoded or written
    pub const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);
}

/// Format an elapsed duration as `MM:SS`
///
/// Minutes keep counting past 59 (`75:03`), matching the recording timer.
pub fn format_elapsed(elapsed: Duration) -> String {
    let total = elapsed.as_secs();
    format!("{:02}:{:02}", total / 60, total % 60)
}
