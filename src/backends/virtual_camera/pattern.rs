// SPDX-License-Identifier: GPL-3.0-only

//! Test pattern generator for the virtual camera
//!
//! Colour bars over the top two thirds, a grey ramp below, and a moving
//! marker so consecutive frames differ.

use std::time::Duration;

/// 75% colour bars: white, yellow, cyan, green, magenta, red, blue
const BARS: [[u8; 3]; 7] = [
    [191, 191, 191],
    [191, 191, 0],
    [0, 191, 191],
    [0, 191, 0],
    [191, 0, 191],
    [191, 0, 0],
    [0, 0, 191],
];

/// Marker sweeps the frame width once per period
const MARKER_PERIOD: Duration = Duration::from_secs(4);

/// Rendering parameters for one frame
#[derive(Debug, Clone, Copy)]
pub struct PatternParams {
    /// Time since the stream started, drives the marker position
    pub elapsed: Duration,
    /// Rear cameras draw the bars in reverse order so switching is visible
    pub reversed: bool,
    /// Torch lit: scene brightness is boosted
    pub torch: bool,
}

/// Render an RGBA test pattern
pub fn render(width: u32, height: u32, params: PatternParams) -> Vec<u8> {
    let width = width.max(1) as usize;
    let height = height.max(1) as usize;
    let mut data = vec![0u8; width * height * 4];

    let bars_end = height * 2 / 3;
    let phase = (params.elapsed.as_millis() % MARKER_PERIOD.as_millis()) as f32
        / MARKER_PERIOD.as_millis() as f32;
    let marker_x = (phase * width as f32) as usize;
    let marker_half = (width / 40).max(1);
    let gain = if params.torch { 1.3 } else { 1.0 };

    for y in 0..height {
        for x in 0..width {
            let mut rgb = if y < bars_end {
                let mut bar = x * BARS.len() / width;
                if params.reversed {
                    bar = BARS.len() - 1 - bar;
                }
                BARS[bar]
            } else {
                let v = (x * 255 / width.max(2).saturating_sub(1).max(1)) as u8;
                [v, v, v]
            };

            if x.abs_diff(marker_x) <= marker_half && y >= bars_end {
                rgb = [255, 255, 255];
            }

            let idx = (y * width + x) * 4;
            for c in 0..3 {
                data[idx + c] = (rgb[c] as f32 * gain).min(255.0) as u8;
            }
            data[idx + 3] = 255;
        }
    }

    data
}
