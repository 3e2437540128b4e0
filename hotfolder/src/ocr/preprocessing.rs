use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView, ImageFormat};

use crate::error::{HotFolderError, Result};

/// Prepare an image for Tesseract
///
/// Applies the following transformations:
/// 1. Converts to grayscale
/// 2. Upscales by `factor` with a bicubic (Catmull-Rom) filter, which helps
///    Tesseract with small fonts on screenshots and phone photos
///
/// A factor of 0 or 1 leaves the size unchanged.
pub fn prepare_for_recognition(img: &DynamicImage, factor: u32) -> DynamicImage {
    let gray = img.grayscale();
    upscale(gray, factor)
}

fn upscale(img: DynamicImage, factor: u32) -> DynamicImage {
    if factor <= 1 {
        return img;
    }

    let (width, height) = img.dimensions();
    let new_width = width.saturating_mul(factor);
    let new_height = height.saturating_mul(factor);

    img.resize_exact(new_width, new_height, FilterType::CatmullRom)
}

/// Encode an image as PNG bytes
pub fn encode_png(img: &DynamicImage) -> Result<Vec<u8>> {
    let mut output = Vec::new();
    img.write_to(&mut std::io::Cursor::new(&mut output), ImageFormat::Png)
        .map_err(|e| HotFolderError::Image(format!("Failed to encode PNG: {e}")))?;
    Ok(output)
}

/// Encode an image as JPEG bytes
///
/// JPEG has no alpha channel, so the image is flattened to RGB first.
pub fn encode_jpeg(img: &DynamicImage) -> Result<Vec<u8>> {
    let rgb = DynamicImage::ImageRgb8(img.to_rgb8());
    let mut output = Vec::new();
    rgb.write_to(&mut std::io::Cursor::new(&mut output), ImageFormat::Jpeg)
        .map_err(|e| HotFolderError::Image(format!("Failed to encode JPEG: {e}")))?;
    Ok(output)
}
