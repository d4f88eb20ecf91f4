// SPDX-License-Identifier: MPL-2.0

//! Photo capture pipeline
//!
//! ```text
//! Live frame → Post-Processing (mirror + filter) → Encoding → FileSink
//! ```
//!
//! Processing and encoding are CPU-bound and run on the blocking pool so the
//! controller loop keeps handling events while a photo is produced.

pub mod encoding;
pub mod processing;

pub use encoding::{EncodedImage, EncodingFormat, EncodingQuality, PhotoEncoder};
pub use processing::{PostProcessingConfig, PostProcessor};

use crate::backends::camera::types::CameraFrame;
use crate::errors::PhotoError;
use tracing::info;

/// Complete photo pipeline
pub struct PhotoPipeline {
    post_processor: PostProcessor,
    encoder: PhotoEncoder,
}

impl PhotoPipeline {
    pub fn new(processing: PostProcessingConfig, encoder: PhotoEncoder) -> Self {
        Self {
            post_processor: PostProcessor::new(processing),
            encoder,
        }
    }

    /// Mirror, filter and encode a frame
    pub fn process_blocking(&self, frame: &CameraFrame) -> Result<EncodedImage, PhotoError> {
        let image = self.post_processor.process(frame)?;
        self.encoder.encode(image)
    }

    /// Run [`process_blocking`](Self::process_blocking) on the blocking pool
    pub async fn process(self, frame: CameraFrame) -> Result<EncodedImage, PhotoError> {
        let (width, height) = (frame.width, frame.height);
        let filter = self.post_processor.config().filter_type;
        let encoded = tokio::task::spawn_blocking(move || self.process_blocking(&frame))
            .await
            .map_err(|e| PhotoError::EncodingFailed(format!("encoding task failed: {}", e)))??;
        info!(width, height, ?filter, size = encoded.data.len(), "Photo encoded");
        Ok(encoded)
    }
}
