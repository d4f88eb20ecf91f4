// SPDX-License-Identifier: GPL-3.0-only

//! Video output assembly
//!
//! The recorder delivers the container in chunks; finalizing a recording is
//! joining them in delivery order into one blob.

use crate::backends::recorder::RecordedMedia;

/// A finished recording ready for the file sink
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoOutput {
    pub data: Vec<u8>,
    pub mime_type: String,
    pub extension: String,
}

/// Join `chunks` (delivery order) into one container blob
pub fn finalize(chunks: Vec<Vec<u8>>, media: &RecordedMedia) -> VideoOutput {
    let total: usize = chunks.iter().map(Vec::len).sum();
    let mut data = Vec::with_capacity(total);
    for chunk in chunks.into_iter().filter(|c| !c.is_empty()) {
        data.extend_from_slice(&chunk);
    }

    // Recorders usually append codec parameters to the MIME type
    let mime_type = media
        .mime_type
        .split(';')
        .next()
        .unwrap_or(&media.mime_type)
        .trim()
        .to_string();

    VideoOutput {
        data,
        mime_type,
        extension: media.extension.clone(),
    }
}
