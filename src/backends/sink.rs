// SPDX-License-Identifier: GPL-3.0-only

//! Output sink for captured photos and videos

/// Client-side "download" of a finished artifact
///
/// Fire-and-forget: implementations report their own failures through
/// logging, the controller never waits on or inspects the outcome.
pub trait FileSink: Send + Sync {
    fn save(&self, bytes: Vec<u8>, filename: &str, mime_type: &str);
}
