//! Output format selection
//!
//! `OutputFormat` is what the user asks for; `TargetFormat` is the encoder
//! actually used once the request has been resolved against the source
//! file's extension.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use super::error::OutputError;

/// Requested output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Keep the source file's format
    #[default]
    Auto,
    Jpeg,
    Png,
}

impl OutputFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Auto => "auto",
            Self::Jpeg => "jpeg",
            Self::Png => "png",
        }
    }

    /// Extension forced onto the output name, `None` for `Auto`.
    pub fn extension(&self) -> Option<&'static str> {
        match self {
            Self::Auto => None,
            Self::Jpeg => Some("jpg"),
            Self::Png => Some("png"),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OutputFormat {
    type Err = OutputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "auto" => Ok(OutputFormat::Auto),
            "jpeg" | "jpg" => Ok(OutputFormat::Jpeg),
            "png" => Ok(OutputFormat::Png),
            _ => Err(OutputError::invalid_policy(
                "output_format",
                format!("unknown format: {}", s),
            )),
        }
    }
}

/// Encoder chosen for an output file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetFormat {
    Jpeg,
    Png,
    Tiff,
    Bmp,
    WebP,
}

impl TargetFormat {
    /// Map a file extension (without the dot) to an encoder.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "jpg" | "jpeg" => Some(Self::Jpeg),
            "png" => Some(Self::Png),
            "tif" | "tiff" => Some(Self::Tiff),
            "bmp" => Some(Self::Bmp),
            "webp" => Some(Self::WebP),
            _ => None,
        }
    }

    /// Resolve the encoder for an output path, `None` when its extension is unknown.
    pub fn for_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::from_extension)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Jpeg => "jpeg",
            Self::Png => "png",
            Self::Tiff => "tiff",
            Self::Bmp => "bmp",
            Self::WebP => "webp",
        }
    }

    pub fn supports_transparency(&self) -> bool {
        matches!(self, Self::Png | Self::Tiff | Self::WebP)
    }
}
