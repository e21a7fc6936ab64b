//! Watermark rendering for photographs.
//!
//! Draws one watermark per image: a text watermark (custom text or the
//! photo's capture date) or an image watermark such as a logo.
//!
//! # Features
//!
//! - **Text watermarks** with any TrueType/OpenType font, bold/italic, drop
//!   shadow and outline
//! - **Image watermarks** with scaling, falling back to text when the image
//!   cannot be loaded
//! - **9-grid positioning** with a fixed 20px margin, plus custom coordinates
//! - **Rotation** about the watermark's own center
//! - **Opacity** via alpha compositing that leaves the base image's mode intact

pub mod compositor;
pub mod config;
pub mod error;
pub mod font;
pub mod image_source;
pub mod position;
pub mod processor;
pub mod text_renderer;

// Re-export main types for convenience
pub use compositor::{blend_layer, flatten_onto_white, rotate_about_center, WatermarkLayer};
pub use config::{FontStyle, WatermarkPosition, WatermarkSpec, WatermarkSpecBuilder};
pub use error::WatermarkError;
pub use font::{FontFamily, FontHandle, FontResolver, FontSource};
pub use image_source::{load_base_image, load_image_watermark, BaseImage};
pub use position::{
    compute_position, ImageDimensions, PlacementPosition, WatermarkDimensions, MARGIN,
};
pub use processor::WatermarkProcessor;
pub use text_renderer::{measure_text, parse_hex_color, rasterize_text, Color, TextMask};
