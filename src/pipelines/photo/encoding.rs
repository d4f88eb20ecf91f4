// SPDX-License-Identifier: GPL-3.0-only

//! Photo encoding
//!
//! Stills are saved as JPEG (lossy). Alpha is dropped before encoding since
//! JPEG has no alpha channel and camera frames are opaque anyway.

use crate::errors::PhotoError;
use image::{DynamicImage, RgbaImage};
use tracing::debug;

/// Supported encoding formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EncodingFormat {
    /// JPEG format (lossy compression)
    #[default]
    Jpeg,
}

impl EncodingFormat {
    /// Get file extension for this format
    pub fn extension(&self) -> &'static str {
        match self {
            EncodingFormat::Jpeg => "jpg",
        }
    }

    /// MIME type handed to the file sink
    pub fn mime_type(&self) -> &'static str {
        match self {
            EncodingFormat::Jpeg => "image/jpeg",
        }
    }
}

/// Encoding quality settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncodingQuality {
    /// Low quality (high compression)
    Low,
    /// Medium quality (balanced)
    Medium,
    /// High quality (low compression)
    High,
    /// Explicit JPEG quality, clamped to 1-100
    Custom(u8),
}

impl EncodingQuality {
    /// Get JPEG quality value (1-100)
    pub fn jpeg_quality(&self) -> u8 {
        match self {
            EncodingQuality::Low => 60,
            EncodingQuality::Medium => 80,
            EncodingQuality::High => 92,
            EncodingQuality::Custom(q) => (*q).clamp(1, 100),
        }
    }
}

impl Default for EncodingQuality {
    fn default() -> Self {
        EncodingQuality::Custom(crate::constants::capture::DEFAULT_JPEG_QUALITY)
    }
}

/// Encoded image data ready for saving
#[derive(Debug, Clone)]
pub struct EncodedImage {
    pub data: Vec<u8>,
    pub format: EncodingFormat,
    pub width: u32,
    pub height: u32,
}

/// Photo encoder
#[derive(Debug, Clone, Copy, Default)]
pub struct PhotoEncoder {
    format: EncodingFormat,
    quality: EncodingQuality,
}

impl PhotoEncoder {
    pub fn new(format: EncodingFormat, quality: EncodingQuality) -> Self {
        Self { format, quality }
    }

    pub fn format(&self) -> EncodingFormat {
        self.format
    }

    /// Encode an RGBA image (CPU-bound, call from a blocking context)
    pub fn encode(&self, image: RgbaImage) -> Result<EncodedImage, PhotoError> {
        let (width, height) = image.dimensions();
        let data = match self.format {
            EncodingFormat::Jpeg => encode_jpeg_rgba(image.as_raw(), width, height, self.quality)?,
        };
        debug!(size = data.len(), width, height, format = ?self.format, "Encoding complete");
        Ok(EncodedImage {
            data,
            format: self.format,
            width,
            height,
        })
    }
}

/// Encode tightly packed RGBA pixels as JPEG
pub fn encode_jpeg_rgba(
    rgba: &[u8],
    width: u32,
    height: u32,
    quality: EncodingQuality,
) -> Result<Vec<u8>, PhotoError> {
    let image = RgbaImage::from_raw(width, height, rgba.to_vec()).ok_or_else(|| {
        PhotoError::InvalidFrame(format!("{} bytes do not fill {}x{}", rgba.len(), width, height))
    })?;
    let rgb = DynamicImage::ImageRgba8(image).into_rgb8();

    let mut buffer = Vec::new();
    let mut encoder =
        image::codecs::jpeg::JpegEncoder::new_with_quality(&mut buffer, quality.jpeg_quality());
    encoder.encode(
        rgb.as_raw(),
        width,
        height,
        image::ExtendedColorType::Rgb8,
    )?;

    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn jpeg_output_decodes_to_same_size() {
        let img = RgbaImage::from_pixel(8, 6, Rgba([200, 10, 10, 255]));
        let encoded = PhotoEncoder::default().encode(img).unwrap();
        assert_eq!(encoded.format.extension(), "jpg");
        assert_eq!(encoded.format.mime_type(), "image/jpeg");

        let decoded = image::load_from_memory(&encoded.data).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (8, 6));
    }

    #[test]
    fn quality_is_clamped() {
        assert_eq!(EncodingQuality::Custom(0).jpeg_quality(), 1);
        assert_eq!(EncodingQuality::Custom(250).jpeg_quality(), 100);
        assert_eq!(EncodingQuality::default().jpeg_quality(), 90);
    }

    #[test]
    fn short_buffer_is_rejected() {
        assert!(matches!(
            encode_jpeg_rgba(&[0; 10], 4, 4, EncodingQuality::High),
            Err(PhotoError::InvalidFrame(_))
        ));
    }
}
