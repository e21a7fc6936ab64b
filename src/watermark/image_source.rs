//! Loading of base images and image watermarks.
//!
//! Base images are normalized to RGB or RGBA before anything is drawn on
//! them; palette, grayscale and 16-bit sources are converted, and any
//! transparency the source carried is kept.

use super::compositor::{blend_layer, WatermarkLayer};
use super::position::{ImageDimensions, PlacementPosition};
use super::text_renderer::{draw_text_direct, stamp_mask, Color, TextMask};
use super::WatermarkError;
use crate::output::resize::resize_exact;
use image::io::Reader as ImageReader;
use image::{DynamicImage, RgbaImage};
use std::path::Path;

/// A base image normalized to 8-bit RGB or RGBA.
#[derive(Debug, Clone)]
pub struct BaseImage {
    image: DynamicImage,
    preserve_alpha: bool,
}

impl BaseImage {
    /// Normalize a decoded image.
    pub fn new(image: DynamicImage) -> Self {
        let preserve_alpha = image.color().has_alpha();
        let image = if preserve_alpha {
            match image {
                DynamicImage::ImageRgba8(_) => image,
                other => DynamicImage::ImageRgba8(other.to_rgba8()),
            }
        } else {
            match image {
                DynamicImage::ImageRgb8(_) => image,
                other => DynamicImage::ImageRgb8(other.to_rgb8()),
            }
        };

        Self {
            image,
            preserve_alpha,
        }
    }

    /// Whether the source had an alpha channel.
    pub fn preserve_alpha(&self) -> bool {
        self.preserve_alpha
    }

    pub fn dimensions(&self) -> ImageDimensions {
        ImageDimensions {
            width: self.image.width(),
            height: self.image.height(),
        }
    }

    pub fn as_dynamic(&self) -> &DynamicImage {
        &self.image
    }

    pub fn into_dynamic(self) -> DynamicImage {
        self.image
    }

    /// Draw opaque text without an intermediate layer.
    pub(crate) fn draw_text(self, mask: &TextMask, at: PlacementPosition, color: Color) -> DynamicImage {
        if self.preserve_alpha {
            let mut rgba = self.image.into_rgba8();
            stamp_mask(&mut rgba, mask, at, color, 255);
            DynamicImage::ImageRgba8(rgba)
        } else {
            let mut rgb = self.image.into_rgb8();
            draw_text_direct(&mut rgb, mask, at, color);
            DynamicImage::ImageRgb8(rgb)
        }
    }

    /// Composite a layer and return the image in its original mode.
    pub(crate) fn composite(self, layer: &WatermarkLayer) -> DynamicImage {
        let mut rgba = self.image.into_rgba8();
        blend_layer(&mut rgba, layer);

        if self.preserve_alpha {
            DynamicImage::ImageRgba8(rgba)
        } else {
            DynamicImage::ImageRgb8(DynamicImage::ImageRgba8(rgba).into_rgb8())
        }
    }
}

fn decode(path: &Path) -> Result<DynamicImage, String> {
    ImageReader::open(path)
        .map_err(|e| e.to_string())?
        .with_guessed_format()
        .map_err(|e| e.to_string())?
        .decode()
        .map_err(|e| e.to_string())
}

/// Open and normalize a base image.
pub fn load_base_image(path: &Path) -> Result<BaseImage, WatermarkError> {
    let image = decode(path).map_err(|e| WatermarkError::image_load(path, e))?;
    Ok(BaseImage::new(image))
}

/// Open an image watermark, scale it and fold `opacity` into its alpha.
pub fn load_image_watermark(
    path: &Path,
    scale: f32,
    opacity: f32,
) -> Result<RgbaImage, WatermarkError> {
    let unavailable = |message: String| WatermarkError::ImageWatermarkUnavailable {
        path: path.to_path_buf(),
        message,
    };

    if !path.is_file() {
        return Err(unavailable("file not found".to_string()));
    }

    let image = decode(path).map_err(unavailable)?;
    let mut watermark = image.to_rgba8();

    if scale != 1.0 {
        let width = ((watermark.width() as f32 * scale).round() as u32).max(1);
        let height = ((watermark.height() as f32 * scale).round() as u32).max(1);
        watermark = resize_exact(&DynamicImage::ImageRgba8(watermark), width, height)
            .map_err(|e| unavailable(e.to_string()))?
            .into_rgba8();
    }

    if opacity < 1.0 {
        apply_opacity(&mut watermark, opacity);
    }

    Ok(watermark)
}

/// Multiply every alpha value by `opacity`.
pub fn apply_opacity(image: &mut RgbaImage, opacity: f32) {
    let opacity = opacity.clamp(0.0, 1.0);
    for pixel in image.pixels_mut() {
        pixel[3] = (pixel[3] as f32 * opacity).round() as u8;
    }
}
