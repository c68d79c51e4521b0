use std::io::Cursor;

use image::{imageops, DynamicImage, GenericImageView, ImageFormat, RgbImage};
use ndarray::prelude::*;
use nshare::AsNdarray3;

use crate::errors::{LunarSegError, Result};

/// Side length of the model input; uploads are hard-cropped to this.
pub const IMAGE_SIZE: u32 = 480;

/// Decode uploaded bytes into a pixel grid, sniffing the format from content.
pub fn decode_image(bytes: &[u8]) -> Result<DynamicImage> {
    let img = image::load_from_memory(bytes)?;
    Ok(img)
}

/// Validate and transform an upload into the model's input tensor.
///
/// Checks run in a fixed order so error messages are reproducible: dimensions
/// first, channel count second. A passing image is cropped to its top-left
/// 480x480 region (no resampling) and normalized to `[0.0, 1.0]` f32 in
/// (height, width, channel) layout.
pub fn preprocess(bytes: &[u8]) -> Result<Array3<f32>> {
    let img = decode_image(bytes)?;
    let (width, height) = img.dimensions();
    let channels = img.color().channel_count();

    if height < IMAGE_SIZE || width < IMAGE_SIZE {
        return Err(LunarSegError::Validation {
            reason: format!(
                "image must be at least 480x480 pixels, provided image dimensions are too small: ({}, {}, {})",
                height, width, channels
            ),
        });
    }
    if channels != 3 {
        return Err(LunarSegError::Validation {
            reason: format!(
                "input image must have 3 channels, you have provided {} channels",
                channels
            ),
        });
    }

    let rgb = img.to_rgb8();
    let crop = imageops::crop_imm(&rgb, 0, 0, IMAGE_SIZE, IMAGE_SIZE).to_image();

    // (channel, height, width) view from nshare, permuted to channels-last
    // for the model. `map` yields an owned standard-layout array.
    let tensor = crop
        .as_ndarray3()
        .permuted_axes([1, 2, 0])
        .map(|&v| f32::from(v) / 255.0);
    Ok(tensor)
}

/// Scale a normalized tensor back to byte range as an RGB image.
pub fn tensor_to_image(tensor: ArrayView3<f32>) -> Result<RgbImage> {
    let (height, width, channels) = tensor.dim();
    if channels != 3 {
        return Err(LunarSegError::ImageProcessing {
            operation: "tensor to image conversion".to_string(),
            source: Box::new(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("expected 3 channels, got {}", channels),
            )),
        });
    }

    // Logical iteration order is (h, w, c), which matches the packed RGB
    // layout RgbImage expects.
    let bytes: Vec<u8> = tensor
        .iter()
        .map(|&v| (v * 255.0).round().clamp(0.0, 255.0) as u8)
        .collect();

    RgbImage::from_raw(width as u32, height as u32, bytes).ok_or_else(|| {
        LunarSegError::ImageProcessing {
            operation: "tensor to image conversion".to_string(),
            source: Box::new(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                "pixel buffer length does not match dimensions",
            )),
        }
    })
}

/// Encode an RGB image as PNG. Lossless, so the response round-trips the
/// pixel values exactly.
pub fn encode_png(img: &RgbImage) -> Result<Vec<u8>> {
    let mut buf = Cursor::new(Vec::new());
    img.write_to(&mut buf, ImageFormat::Png)
        .map_err(|e| LunarSegError::ImageProcessing {
            operation: "PNG encoding".to_string(),
            source: Box::new(e),
        })?;
    Ok(buf.into_inner())
}
