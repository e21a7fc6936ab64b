//! Output error types
//!
//! Errors raised while resizing, encoding and writing watermarked images.

use std::fmt;
use std::path::PathBuf;

/// Errors that can occur while producing an output file
#[derive(Debug)]
pub enum OutputError {
    /// Writing the output file or creating its directory failed
    Save { path: PathBuf, message: String },

    /// Encoding to the target format failed
    Encode {
        format: &'static str,
        message: String,
    },

    /// Resize operation failed
    Resize { message: String },

    /// An output policy value is outside its allowed range
    InvalidPolicy { field: &'static str, message: String },
}

impl fmt::Display for OutputError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputError::Save { path, message } => {
                write!(f, "Failed to save {}: {}", path.display(), message)
            }
            OutputError::Encode { format, message } => {
                write!(f, "Failed to encode to {}: {}", format, message)
            }
            OutputError::Resize { message } => write!(f, "Resize failed: {}", message),
            OutputError::InvalidPolicy { field, message } => {
                write!(f, "Invalid output setting '{}': {}", field, message)
            }
        }
    }
}

impl std::error::Error for OutputError {}

impl OutputError {
    pub fn save(path: impl Into<PathBuf>, message: impl fmt::Display) -> Self {
        OutputError::Save {
            path: path.into(),
            message: message.to_string(),
        }
    }

    pub fn encode_failed(format: &'static str, message: impl Into<String>) -> Self {
        OutputError::Encode {
            format,
            message: message.into(),
        }
    }

    pub fn resize_failed(message: impl Into<String>) -> Self {
        OutputError::Resize {
            message: message.into(),
        }
    }

    pub fn invalid_policy(field: &'static str, message: impl Into<String>) -> Self {
        OutputError::InvalidPolicy {
            field,
            message: message.into(),
        }
    }
}
