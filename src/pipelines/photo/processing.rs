// SPDX-License-Identifier: MPL-2.0

//! Post-processing for captured photos
//!
//! Turns a live frame into the image the user saw in the preview:
//! - horizontal mirroring for front cameras
//! - the raster equivalent of the active CSS preview filter
//!
//! The colour filters follow the Filter Effects matrices so a saved photo
//! matches the filtered preview.

use crate::app::FilterType;
use crate::backends::camera::types::CameraFrame;
use crate::errors::PhotoError;
use image::RgbaImage;
use tracing::debug;

type Matrix = [[f32; 3]; 3];

/// Post-processing configuration
#[derive(Debug, Clone, Copy, Default)]
pub struct PostProcessingConfig {
    /// Flip horizontally (front camera)
    pub mirror: bool,
    /// Filter type to apply
    pub filter_type: FilterType,
}

/// Post-processor for captured frames
pub struct PostProcessor {
    config: PostProcessingConfig,
}

impl PostProcessor {
    pub fn new(config: PostProcessingConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PostProcessingConfig {
        &self.config
    }

    /// Render the frame to an RGBA surface, mirrored and filtered
    pub fn process(&self, frame: &CameraFrame) -> Result<RgbaImage, PhotoError> {
        let mut image = RgbaImage::from_raw(frame.width, frame.height, frame.data.to_vec())
            .ok_or_else(|| {
                PhotoError::InvalidFrame(format!(
                    "{} bytes do not fill {}x{}",
                    frame.data.len(),
                    frame.width,
                    frame.height
                ))
            })?;

        if self.config.mirror {
            image::imageops::flip_horizontal_in_place(&mut image);
        }

        debug!(filter = ?self.config.filter_type, mirror = self.config.mirror, "Post-processing frame");
        Ok(apply_filter(image, self.config.filter_type))
    }
}

/// Apply the raster equivalent of `filter`'s CSS preview filter
pub fn apply_filter(image: RgbaImage, filter: FilterType) -> RgbaImage {
    match filter {
        FilterType::None => image,
        FilterType::Sepia => map_matrix(image, &SEPIA),
        FilterType::Grayscale => map_matrix(image, &GRAYSCALE),
        FilterType::Blur => image::imageops::blur(&image, BLUR_SIGMA),
        FilterType::Brightness => map_channels(image, |c| c * BRIGHTNESS),
        FilterType::Contrast => map_channels(image, |c| (c - 127.5) * CONTRAST + 127.5),
        FilterType::Saturate => map_matrix(image, &saturate_matrix(SATURATION)),
        FilterType::HueRotate => map_matrix(image, &hue_rotate_matrix(HUE_ROTATION_DEG)),
        FilterType::Invert => map_channels(image, |c| 255.0 - c),
    }
}

/// `blur(2px)`: the CSS length is the gaussian standard deviation
const BLUR_SIGMA: f32 = 2.0;
/// `brightness(1.3)`
const BRIGHTNESS: f32 = 1.3;
/// `contrast(1.3)`
const CONTRAST: f32 = 1.3;
/// `saturate(1.5)`
const SATURATION: f32 = 1.5;
/// `hue-rotate(90deg)`
const HUE_ROTATION_DEG: f32 = 90.0;

/// `sepia(100%)`
const SEPIA: Matrix = [
    [0.393, 0.769, 0.189],
    [0.349, 0.686, 0.168],
    [0.272, 0.534, 0.131],
];

/// `grayscale(100%)`
const GRAYSCALE: Matrix = [
    [0.2126, 0.7152, 0.0722],
    [0.2126, 0.7152, 0.0722],
    [0.2126, 0.7152, 0.0722],
];

fn saturate_matrix(s: f32) -> Matrix {
    [
        [0.213 + 0.787 * s, 0.715 - 0.715 * s, 0.072 - 0.072 * s],
        [0.213 - 0.213 * s, 0.715 + 0.285 * s, 0.072 - 0.072 * s],
        [0.213 - 0.213 * s, 0.715 - 0.715 * s, 0.072 + 0.928 * s],
    ]
}

fn hue_rotate_matrix(degrees: f32) -> Matrix {
    let (sin, cos) = degrees.to_radians().sin_cos();
    [
        [
            0.213 + cos * 0.787 - sin * 0.213,
            0.715 - cos * 0.715 - sin * 0.715,
            0.072 - cos * 0.072 + sin * 0.928,
        ],
        [
            0.213 - cos * 0.213 + sin * 0.143,
            0.715 + cos * 0.285 + sin * 0.140,
            0.072 - cos * 0.072 - sin * 0.283,
        ],
        [
            0.213 - cos * 0.213 - sin * 0.787,
            0.715 - cos * 0.715 + sin * 0.715,
            0.072 + cos * 0.928 + sin * 0.072,
        ],
    ]
}

fn map_matrix(mut image: RgbaImage, m: &Matrix) -> RgbaImage {
    for px in image.pixels_mut() {
        let [r, g, b, _] = px.0.map(f32::from);
        for (row, out) in m.iter().zip(px.0.iter_mut()) {
            *out = clamp_u8(row[0] * r + row[1] * g + row[2] * b);
        }
    }
    image
}

/// Apply `f` to R, G and B independently; alpha is left alone
fn map_channels(mut image: RgbaImage, f: impl Fn(f32) -> f32) -> RgbaImage {
    for px in image.pixels_mut() {
        for c in px.0.iter_mut().take(3) {
            *c = clamp_u8(f(f32::from(*c)));
        }
    }
    image
}

fn clamp_u8(v: f32) -> u8 {
    v.round().clamp(0.0, 255.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn solid(rgba: [u8; 4]) -> RgbaImage {
        RgbaImage::from_pixel(4, 4, Rgba(rgba))
    }

    fn first(image: &RgbaImage) -> [u8; 4] {
        image.get_pixel(0, 0).0
    }

    #[test]
    fn none_is_identity() {
        let img = solid([10, 20, 30, 255]);
        assert_eq!(apply_filter(img.clone(), FilterType::None), img);
    }

    #[test]
    fn grayscale_equalises_channels() {
        let out = apply_filter(solid([200, 100, 50, 255]), FilterType::Grayscale);
        let [r, g, b, a] = first(&out);
        assert_eq!(r, g);
        assert_eq!(g, b);
        assert_eq!(a, 255);
        // 0.2126*200 + 0.7152*100 + 0.0722*50
        assert_eq!(r, 118);
    }

    #[test]
    fn sepia_of_white_is_warm_and_clamped() {
        let [r, g, b, _] = first(&apply_filter(solid([255; 4]), FilterType::Sepia));
        assert_eq!(r, 255);
        assert_eq!(g, 255);
        assert!(b < g);
    }

    #[test]
    fn invert_flips_channels_keeps_alpha() {
        let out = apply_filter(solid([0, 100, 255, 128]), FilterType::Invert);
        assert_eq!(first(&out), [255, 155, 0, 128]);
    }

    #[test]
    fn brightness_and_contrast() {
        assert_eq!(
            first(&apply_filter(solid([100, 200, 0, 255]), FilterType::Brightness)),
            [130, 255, 0, 255]
        );
        let [lo, hi, mid, _] = first(&apply_filter(solid([50, 200, 128, 255]), FilterType::Contrast));
        assert!(lo < 50);
        assert!(hi > 200);
        assert!((127..=129).contains(&mid));
    }

    #[test]
    fn saturate_leaves_grey_unchanged() {
        let out = apply_filter(solid([90, 90, 90, 255]), FilterType::Saturate);
        assert_eq!(first(&out), [90, 90, 90, 255]);
        let out = apply_filter(solid([90, 90, 90, 255]), FilterType::HueRotate);
        assert_eq!(first(&out), [90, 90, 90, 255]);
    }

    #[test]
    fn hue_rotate_moves_red_towards_green() {
        let [r, g, _, _] = first(&apply_filter(solid([255, 0, 0, 255]), FilterType::HueRotate));
        assert!(g > r);
    }

    #[test]
    fn blur_smooths_an_edge() {
        let mut img = RgbaImage::from_pixel(16, 1, Rgba([0, 0, 0, 255]));
        for x in 8..16 {
            img.put_pixel(x, 0, Rgba([255, 255, 255, 255]));
        }
        let out = apply_filter(img, FilterType::Blur);
        let left = out.get_pixel(7, 0).0[0];
        let right = out.get_pixel(8, 0).0[0];
        assert!(left > 0 && right < 255);
    }

    #[test]
    fn processor_mirrors_front_camera() {
        let frame = CameraFrame::from_rgba(2, 1, vec![255, 0, 0, 255, 0, 0, 255, 255]).unwrap();
        let processor = PostProcessor::new(PostProcessingConfig {
            mirror: true,
            filter_type: FilterType::None,
        });
        let out = processor.process(&frame).unwrap();
        assert_eq!(out.get_pixel(0, 0).0, [0, 0, 255, 255]);
        assert_eq!(out.get_pixel(1, 0).0, [255, 0, 0, 255]);
    }
}
