// SPDX-License-Identifier: GPL-3.0-only

//! Capture pipelines
//!
//! - [`photo`]: frame → mirror/filter → JPEG
//! - [`video`]: recorder chunks → one output container

pub mod photo;
pub mod video;
