//! Resize transform applied after the watermark is drawn.
//!
//! All resampling goes through fast_image_resize with a Lanczos3 filter.
//! RGBA images are premultiplied before filtering so that transparent
//! pixels do not bleed their color into the visible edge of the watermark.

use fast_image_resize::{FilterType, Image, MulDiv, PixelType, ResizeAlg, Resizer};
use image::{DynamicImage, RgbImage, RgbaImage};
use std::num::NonZeroU32;

use super::error::OutputError;

/// How the output image is resized
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum ResizeMode {
    #[default]
    None,
    /// Fixed width, height follows the aspect ratio
    Width(u32),
    /// Fixed height, width follows the aspect ratio
    Height(u32),
    /// Scale both sides by a factor (1.0 = unchanged)
    Percent(f32),
}

impl ResizeMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResizeMode::None => "none",
            ResizeMode::Width(_) => "width",
            ResizeMode::Height(_) => "height",
            ResizeMode::Percent(_) => "percent",
        }
    }

    /// Target size for a source of `width` x `height`, `None` when unchanged.
    pub fn target_size(&self, width: u32, height: u32) -> Option<(u32, u32)> {
        let scaled = |side: u32, factor: f64| ((side as f64 * factor).round() as u32).max(1);

        let size = match *self {
            ResizeMode::None => return None,
            ResizeMode::Width(target) => {
                if width == 0 {
                    return None;
                }
                (target, scaled(height, target as f64 / width as f64))
            }
            ResizeMode::Height(target) => {
                if height == 0 {
                    return None;
                }
                (scaled(width, target as f64 / height as f64), target)
            }
            ResizeMode::Percent(factor) => {
                let factor = factor as f64;
                (scaled(width, factor), scaled(height, factor))
            }
        };

        if size == (width, height) {
            None
        } else {
            Some(size)
        }
    }
}

/// Apply `mode` to an image, keeping its color mode.
pub fn resize(image: DynamicImage, mode: ResizeMode) -> Result<DynamicImage, OutputError> {
    match mode.target_size(image.width(), image.height()) {
        Some((width, height)) => {
            tracing::debug!(
                mode = mode.as_str(),
                from = ?(image.width(), image.height()),
                to = ?(width, height),
                "Resizing output image"
            );
            resize_exact(&image, width, height)
        }
        None => Ok(image),
    }
}

/// Resample to exactly `target_w` x `target_h` with Lanczos3.
///
/// Images with alpha come back as RGBA, everything else as RGB.
pub fn resize_exact(
    image: &DynamicImage,
    target_w: u32,
    target_h: u32,
) -> Result<DynamicImage, OutputError> {
    let src_width = NonZeroU32::new(image.width())
        .ok_or_else(|| OutputError::resize_failed("Source width is 0"))?;
    let src_height = NonZeroU32::new(image.height())
        .ok_or_else(|| OutputError::resize_failed("Source height is 0"))?;
    let dst_width =
        NonZeroU32::new(target_w).ok_or_else(|| OutputError::resize_failed("Target width is 0"))?;
    let dst_height = NonZeroU32::new(target_h)
        .ok_or_else(|| OutputError::resize_failed("Target height is 0"))?;

    let has_alpha = image.color().has_alpha();
    let (buffer, pixel_type) = if has_alpha {
        (image.to_rgba8().into_raw(), PixelType::U8x4)
    } else {
        (image.to_rgb8().into_raw(), PixelType::U8x3)
    };

    let mut src_image = Image::from_vec_u8(src_width, src_height, buffer, pixel_type)
        .map_err(|e| OutputError::resize_failed(format!("Failed to create source image: {:?}", e)))?;
    let mut dst_image = Image::new(dst_width, dst_height, pixel_type);

    let alpha_mul_div = MulDiv::default();
    if has_alpha {
        alpha_mul_div
            .multiply_alpha_inplace(&mut src_image.view_mut())
            .map_err(|e| OutputError::resize_failed(format!("Failed to premultiply: {:?}", e)))?;
    }

    let mut resizer = Resizer::new(ResizeAlg::Convolution(FilterType::Lanczos3));
    resizer
        .resize(&src_image.view(), &mut dst_image.view_mut())
        .map_err(|e| OutputError::resize_failed(format!("Resize operation failed: {:?}", e)))?;

    if has_alpha {
        alpha_mul_div
            .divide_alpha_inplace(&mut dst_image.view_mut())
            .map_err(|e| OutputError::resize_failed(format!("Failed to unpremultiply: {:?}", e)))?;
    }

    let result_buf = dst_image.into_vec();
    let output = if has_alpha {
        RgbaImage::from_raw(target_w, target_h, result_buf).map(DynamicImage::ImageRgba8)
    } else {
        RgbImage::from_raw(target_w, target_h, result_buf).map(DynamicImage::ImageRgb8)
    };

    output.ok_or_else(|| OutputError::resize_failed("Failed to create output image buffer"))
}
