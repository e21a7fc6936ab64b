//! Watermark processor.
//!
//! Ties the pieces together for one image:
//!
//! 1. Load the base image and normalize it to RGB or RGBA.
//! 2. Use the image watermark when one is configured and loads, otherwise
//!    render text (the custom text, or the supplied date).
//! 3. Place the content with [`compute_position`], rotate it about its own
//!    center and alpha-composite it onto the base.
//! 4. Optionally resize and save according to an [`OutputPolicy`].
//!
//! Opaque text without effects or rotation is drawn straight onto the base;
//! everything else goes through a transparent layer. Both paths produce the
//! same pixels for opaque, unrotated, effect-free text.
//!
//! # Example
//!
//! ```no_run
//! use photomark::watermark::{WatermarkProcessor, WatermarkSpec};
//! use photomark::output::OutputPolicy;
//! use std::path::Path;
//!
//! let processor = WatermarkProcessor::new();
//! let spec = WatermarkSpec::builder().opacity(0.7).shadow(true).build()?;
//!
//! let saved = processor.process_single_image(
//!     Path::new("photos/IMG_0001.jpg"),
//!     "2025-04-05",
//!     Path::new("photos/photos_watermark"),
//!     &spec,
//!     &OutputPolicy::default(),
//! )?;
//! println!("{}", saved.display());
//! # Ok::<(), photomark::PhotomarkError>(())
//! ```

use super::compositor::WatermarkLayer;
use super::font::FontResolver;
use super::image_source::{load_base_image, load_image_watermark, BaseImage};
use super::position::{compute_position, PlacementPosition, WatermarkDimensions, MARGIN};
use super::text_renderer::{rasterize_text, render_text, TextRenderOptions};
use super::{WatermarkError, WatermarkSpec};
use crate::error::PhotomarkError;
use crate::output::{resize, save, OutputPolicy};
use image::{DynamicImage, RgbaImage};
use std::path::{Path, PathBuf};

/// Renders watermarks. Holds no per-image state, so one processor can serve
/// a whole batch.
#[derive(Debug, Default)]
pub struct WatermarkProcessor {
    fonts: FontResolver,
}

impl WatermarkProcessor {
    /// A processor using the platform font chain.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_font_resolver(fonts: FontResolver) -> Self {
        Self { fonts }
    }

    pub fn fonts(&self) -> &FontResolver {
        &self.fonts
    }

    /// Watermark the image at `image_path`.
    ///
    /// Fails only when the base image cannot be loaded.
    pub fn add_watermark(
        &self,
        image_path: &Path,
        spec: &WatermarkSpec,
        date_text: &str,
    ) -> Result<DynamicImage, WatermarkError> {
        let base = load_base_image(image_path)?;
        Ok(self.apply(base, spec, date_text))
    }

    /// Watermark an already loaded image.
    pub fn apply(&self, base: BaseImage, spec: &WatermarkSpec, date_text: &str) -> DynamicImage {
        if let Some(path) = spec.image_watermark_path() {
            match load_image_watermark(path, spec.image_watermark_scale(), spec.opacity()) {
                Ok(watermark) => return self.apply_image_watermark(base, watermark, spec),
                Err(e) => tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "Image watermark unavailable, using text watermark"
                ),
            }
        }

        self.apply_text_watermark(base, spec, date_text)
    }

    fn apply_image_watermark(
        &self,
        base: BaseImage,
        watermark: RgbaImage,
        spec: &WatermarkSpec,
    ) -> DynamicImage {
        let dims = WatermarkDimensions {
            width: watermark.width(),
            height: watermark.height(),
        };
        let position = compute_position(&base.dimensions(), &dims, spec.position(), MARGIN);

        tracing::debug!(
            x = position.x,
            y = position.y,
            width = dims.width,
            height = dims.height,
            rotation = spec.rotation(),
            "Placing image watermark"
        );

        let layer = WatermarkLayer::new(watermark, position).rotated(spec.rotation());
        base.composite(&layer)
    }

    fn apply_text_watermark(
        &self,
        base: BaseImage,
        spec: &WatermarkSpec,
        date_text: &str,
    ) -> DynamicImage {
        let font = self.fonts.resolve(
            spec.font_path(),
            spec.font_size() as f32,
            spec.font_style(),
        );
        let text = spec.resolve_text(date_text);
        let mask = rasterize_text(text, &font);
        let position = compute_position(
            &base.dimensions(),
            &mask.dimensions(),
            spec.position(),
            MARGIN,
        );
        let options = TextRenderOptions::from_spec(spec);

        tracing::debug!(
            text,
            x = position.x,
            y = position.y,
            width = mask.width(),
            height = mask.height(),
            "Placing text watermark"
        );

        if !options.needs_layer() && !spec.is_rotated() {
            return base.draw_text(&mask, position, options.color);
        }

        let pad = options.padding() as i32;
        let layer = WatermarkLayer::new(
            render_text(&mask, &options),
            PlacementPosition::new(
                position.x.saturating_sub(pad),
                position.y.saturating_sub(pad),
            ),
        )
        .rotated(spec.rotation());

        base.composite(&layer)
    }

    /// Watermark, resize and save one image. Returns the written path.
    pub fn process_single_image(
        &self,
        image_path: &Path,
        date_text: &str,
        output_dir: &Path,
        spec: &WatermarkSpec,
        policy: &OutputPolicy,
    ) -> Result<PathBuf, PhotomarkError> {
        let watermarked = self.add_watermark(image_path, spec, date_text)?;
        let resized = resize(watermarked, policy.resize)?;
        let output_path = save(&resized, image_path, output_dir, policy)?;

        tracing::info!(
            input = %image_path.display(),
            output = %output_path.display(),
            "Saved watermarked image"
        );

        Ok(output_path)
    }
}
