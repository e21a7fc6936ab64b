//! Image encoder abstraction
//!
//! One encoder per target format, each owning its alpha rule:
//! - JPEG and BMP are always opaque; transparent pixels are flattened onto white
//! - PNG and TIFF are written in whatever mode the image has (RGB or RGBA)
//! - WebP keeps alpha and is encoded lossily at the configured quality

use image::{ColorType, DynamicImage, ImageEncoder as _};
use std::io::Cursor;

use super::error::OutputError;
use super::format::TargetFormat;
use crate::watermark::flatten_onto_white;

/// Trait for image encoders
///
/// The trait is object-safe so the serializer can pick an encoder at runtime.
pub trait ImageEncoder: Send + Sync {
    /// The format this encoder produces
    fn format(&self) -> TargetFormat;

    /// Encode an image; `quality` (1-100) is ignored by lossless formats.
    fn encode(&self, image: &DynamicImage, quality: u8) -> Result<Vec<u8>, OutputError>;

    /// Check if this encoder keeps transparency
    fn supports_transparency(&self) -> bool {
        self.format().supports_transparency()
    }
}

/// Pixel buffer in one of the two modes every encoder understands.
enum Pixels {
    Rgb(Vec<u8>),
    Rgba(Vec<u8>),
}

impl Pixels {
    /// Pixels as `encoder` writes them: flattened onto white when the format
    /// has no alpha, otherwise in the image's own mode.
    fn for_encoder(encoder: &dyn ImageEncoder, image: &DynamicImage) -> Self {
        if encoder.supports_transparency() {
            Self::keep_mode(image)
        } else {
            Self::opaque(image)
        }
    }

    fn keep_mode(image: &DynamicImage) -> Self {
        if image.color().has_alpha() {
            Pixels::Rgba(image.to_rgba8().into_raw())
        } else {
            Pixels::Rgb(image.to_rgb8().into_raw())
        }
    }

    fn opaque(image: &DynamicImage) -> Self {
        Pixels::Rgb(flatten_onto_white(image).into_raw())
    }

    fn data(&self) -> &[u8] {
        match self {
            Pixels::Rgb(data) | Pixels::Rgba(data) => data,
        }
    }

    fn color_type(&self) -> ColorType {
        match self {
            Pixels::Rgb(_) => ColorType::Rgb8,
            Pixels::Rgba(_) => ColorType::Rgba8,
        }
    }
}

/// JPEG encoder using the image crate
pub struct JpegEncoder;

impl ImageEncoder for JpegEncoder {
    fn format(&self) -> TargetFormat {
        TargetFormat::Jpeg
    }

    fn encode(&self, image: &DynamicImage, quality: u8) -> Result<Vec<u8>, OutputError> {
        use image::codecs::jpeg::JpegEncoder as ImageJpegEncoder;

        let pixels = Pixels::for_encoder(self, image);
        let mut output = Cursor::new(Vec::new());
        let encoder = ImageJpegEncoder::new_with_quality(&mut output, quality.clamp(1, 100));

        encoder
            .write_image(
                pixels.data(),
                image.width(),
                image.height(),
                pixels.color_type(),
            )
            .map_err(|e| OutputError::encode_failed("jpeg", e.to_string()))?;

        Ok(output.into_inner())
    }
}

/// PNG encoder using the image crate
pub struct PngEncoder;

impl ImageEncoder for PngEncoder {
    fn format(&self) -> TargetFormat {
        TargetFormat::Png
    }

    fn encode(&self, image: &DynamicImage, _quality: u8) -> Result<Vec<u8>, OutputError> {
        use image::codecs::png::PngEncoder as ImagePngEncoder;

        let pixels = Pixels::for_encoder(self, image);
        let mut output = Cursor::new(Vec::new());
        let encoder = ImagePngEncoder::new(&mut output);

        encoder
            .write_image(
                pixels.data(),
                image.width(),
                image.height(),
                pixels.color_type(),
            )
            .map_err(|e| OutputError::encode_failed("png", e.to_string()))?;

        Ok(output.into_inner())
    }
}

/// TIFF encoder using the image crate
pub struct TiffEncoder;

impl ImageEncoder for TiffEncoder {
    fn format(&self) -> TargetFormat {
        TargetFormat::Tiff
    }

    fn encode(&self, image: &DynamicImage, _quality: u8) -> Result<Vec<u8>, OutputError> {
        use image::codecs::tiff::TiffEncoder as ImageTiffEncoder;

        let pixels = Pixels::for_encoder(self, image);
        let mut output = Cursor::new(Vec::new());
        let encoder = ImageTiffEncoder::new(&mut output);

        encoder
            .write_image(
                pixels.data(),
                image.width(),
                image.height(),
                pixels.color_type(),
            )
            .map_err(|e| OutputError::encode_failed("tiff", e.to_string()))?;

        Ok(output.into_inner())
    }
}

/// BMP encoder using the image crate
pub struct BmpEncoder;

impl ImageEncoder for BmpEncoder {
    fn format(&self) -> TargetFormat {
        TargetFormat::Bmp
    }

    fn encode(&self, image: &DynamicImage, _quality: u8) -> Result<Vec<u8>, OutputError> {
        use image::codecs::bmp::BmpEncoder as ImageBmpEncoder;

        let pixels = Pixels::for_encoder(self, image);
        let mut output = Cursor::new(Vec::new());
        let encoder = ImageBmpEncoder::new(&mut output);

        encoder
            .write_image(
                pixels.data(),
                image.width(),
                image.height(),
                pixels.color_type(),
            )
            .map_err(|e| OutputError::encode_failed("bmp", e.to_string()))?;

        Ok(output.into_inner())
    }
}

/// Lossy WebP encoder backed by libwebp
///
/// The image crate only writes lossless WebP, so the `webp` crate is used to
/// honour the quality setting.
pub struct WebPEncoder;

impl ImageEncoder for WebPEncoder {
    fn format(&self) -> TargetFormat {
        TargetFormat::WebP
    }

    fn encode(&self, image: &DynamicImage, quality: u8) -> Result<Vec<u8>, OutputError> {
        if image.width() == 0 || image.height() == 0 {
            return Err(OutputError::encode_failed("webp", "image has no pixels"));
        }

        let pixels = Pixels::for_encoder(self, image);
        let encoder = match &pixels {
            Pixels::Rgba(data) => webp::Encoder::from_rgba(data, image.width(), image.height()),
            Pixels::Rgb(data) => webp::Encoder::from_rgb(data, image.width(), image.height()),
        };
        let encoded = encoder.encode(quality.clamp(1, 100) as f32);

        Ok(encoded.to_vec())
    }
}

/// Factory for creating encoders based on target format
pub struct EncoderFactory;

impl EncoderFactory {
    pub fn create(format: TargetFormat) -> Box<dyn ImageEncoder> {
        match format {
            TargetFormat::Jpeg => Box::new(JpegEncoder),
            TargetFormat::Png => Box::new(PngEncoder),
            TargetFormat::Tiff => Box::new(TiffEncoder),
            TargetFormat::Bmp => Box::new(BmpEncoder),
            TargetFormat::WebP => Box::new(WebPEncoder),
        }
    }
}
