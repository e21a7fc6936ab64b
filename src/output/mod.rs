//! Output stage for watermarked images.
//!
//! Resizes the rendered image, picks a file name and encoder from the
//! [`OutputPolicy`], and writes the result.
//!
//! | Target | Alpha handling |
//! |--------|----------------|
//! | JPEG   | flattened onto white, quality from the policy |
//! | PNG    | kept |
//! | TIFF   | written in the image's current mode |
//! | BMP    | flattened onto white |
//! | WebP   | kept, lossy at the policy quality |

pub mod encoder;
pub mod error;
pub mod format;
pub mod naming;
pub mod resize;
pub mod serializer;

pub use encoder::{EncoderFactory, ImageEncoder};
pub use error::OutputError;
pub use format::{OutputFormat, TargetFormat};
pub use naming::{
    default_output_dir, output_filename, validate_output_dir, NamingRule, OutputPolicy,
    MAX_RESIZE_PERCENT, MIN_RESIZE_PERCENT,
};
pub use resize::{resize, resize_exact, ResizeMode};
pub use serializer::save;
