//! Image loading and model input preparation via the `image` crate.
//!
//! Available when the `image-io` feature is enabled.

use crate::tensor::InputTensor;
use crate::util::{DetPipeError, DetPipeResult};
use image::imageops::FilterType;
use std::path::Path;

const RGB_CHANNELS: u32 = 3;

/// Loads an image from disk.
pub fn load_image<P: AsRef<Path>>(path: P) -> DetPipeResult<image::DynamicImage> {
    image::open(path).map_err(|err| DetPipeError::ImageIo {
        reason: err.to_string(),
    })
}

/// Reads only the image header to get `(width, height)`.
pub fn image_dimensions<P: AsRef<Path>>(path: P) -> DetPipeResult<(u32, u32)> {
    image::image_dimensions(path).map_err(|err| DetPipeError::ImageIo {
        reason: err.to_string(),
    })
}

/// Converts to RGB, resizes to `width x height`, and packs an NCHW blob
/// scaled to `[0, 1]`.
pub fn prepare_input(
    image: &image::DynamicImage,
    width: u32,
    height: u32,
) -> DetPipeResult<InputTensor> {
    if width == 0 || height == 0 {
        return Err(DetPipeError::InvalidDimensions { width, height });
    }
    if image.width() == 0 || image.height() == 0 {
        return Err(DetPipeError::InvalidDimensions {
            width: image.width(),
            height: image.height(),
        });
    }

    let rgb = image.to_rgb8();
    let resized = image::imageops::resize(&rgb, width, height, FilterType::Triangle);

    let plane = width as usize * height as usize;
    let mut data = vec![0.0f32; plane * RGB_CHANNELS as usize];
    for (idx, pixel) in resized.pixels().enumerate() {
        for c in 0..RGB_CHANNELS as usize {
            data[c * plane + idx] = pixel.0[c] as f32 / 255.0;
        }
    }

    InputTensor::new(data, width, height, RGB_CHANNELS)
}
