//! Watermark error types.
//!
//! Only `ImageLoad` and `InvalidSpec` ever leave the renderer. The other
//! variants describe conditions the renderer recovers from on its own; they
//! are still surfaced by the lower-level helpers so callers such as the CLI
//! can decide to be stricter.

use std::fmt;
use std::path::PathBuf;

/// Errors that can occur while rendering a watermark.
#[derive(Debug)]
pub enum WatermarkError {
    /// The base image could not be opened or decoded
    ImageLoad { path: PathBuf, message: String },

    /// A color string is not `#RRGGBB`
    InvalidColorFormat(String),

    /// The image watermark could not be opened or decoded
    ImageWatermarkUnavailable { path: PathBuf, message: String },

    /// A watermark setting is outside its allowed range
    InvalidSpec { field: &'static str, message: String },
}

impl WatermarkError {
    pub fn image_load(path: impl Into<PathBuf>, message: impl fmt::Display) -> Self {
        Self::ImageLoad {
            path: path.into(),
            message: message.to_string(),
        }
    }

    pub fn invalid_spec(field: &'static str, message: impl Into<String>) -> Self {
        Self::InvalidSpec {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for WatermarkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ImageLoad { path, message } => {
                write!(f, "Failed to load image {}: {}", path.display(), message)
            }
            Self::InvalidColorFormat(color) => {
                write!(f, "Invalid color format '{}', expected #RRGGBB", color)
            }
            Self::ImageWatermarkUnavailable { path, message } => write!(
                f,
                "Image watermark {} unavailable: {}",
                path.display(),
                message
            ),
            Self::InvalidSpec { field, message } => {
                write!(f, "Invalid watermark setting '{}': {}", field, message)
            }
        }
    }
}

impl std::error::Error for WatermarkError {}
