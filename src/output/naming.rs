//! Output naming policy
//!
//! Decides where a watermarked copy goes and what it is called, and guards
//! against writing copies next to the originals.

use std::fmt;
use std::path::{Component, Path, PathBuf};
use std::str::FromStr;

use super::error::OutputError;
use super::format::{OutputFormat, TargetFormat};
use super::resize::ResizeMode;

pub const DEFAULT_PREFIX: &str = "wm_";
pub const DEFAULT_SUFFIX: &str = "_watermarked";
pub const DEFAULT_JPEG_QUALITY: u8 = 95;
pub const MIN_RESIZE_PERCENT: f32 = 0.1;
pub const MAX_RESIZE_PERCENT: f32 = 3.0;

/// How the output file name is derived from the input name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NamingRule {
    /// Keep the original name
    Original,
    /// Prepend the custom prefix
    Prefix,
    /// Append the custom suffix to the stem
    #[default]
    Suffix,
}

impl NamingRule {
    pub fn as_str(&self) -> &'static str {
        match self {
            NamingRule::Original => "original",
            NamingRule::Prefix => "prefix",
            NamingRule::Suffix => "suffix",
        }
    }
}

impl fmt::Display for NamingRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NamingRule {
    type Err = OutputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "original" => Ok(NamingRule::Original),
            "prefix" => Ok(NamingRule::Prefix),
            "suffix" => Ok(NamingRule::Suffix),
            _ => Err(OutputError::invalid_policy(
                "naming_rule",
                format!("unknown naming rule: {}", s),
            )),
        }
    }
}

/// Everything that decides how a watermarked image is written
#[derive(Debug, Clone, PartialEq)]
pub struct OutputPolicy {
    pub naming_rule: NamingRule,
    pub custom_prefix: String,
    pub custom_suffix: String,
    pub output_format: OutputFormat,
    /// 1-100, used by JPEG and WebP
    pub jpeg_quality: u8,
    pub resize: ResizeMode,
}

impl Default for OutputPolicy {
    fn default() -> Self {
        Self {
            naming_rule: NamingRule::Suffix,
            custom_prefix: DEFAULT_PREFIX.to_string(),
            custom_suffix: DEFAULT_SUFFIX.to_string(),
            output_format: OutputFormat::Auto,
            jpeg_quality: DEFAULT_JPEG_QUALITY,
            resize: ResizeMode::None,
        }
    }
}

impl OutputPolicy {
    /// Check value ranges; returns the first offending field.
    pub fn validate(&self) -> Result<(), OutputError> {
        if !(1..=100).contains(&self.jpeg_quality) {
            return Err(OutputError::invalid_policy(
                "jpeg_quality",
                format!("must be 1-100, got {}", self.jpeg_quality),
            ));
        }

        match self.resize {
            ResizeMode::Width(0) => Err(OutputError::invalid_policy(
                "resize_width",
                "must be greater than 0",
            )),
            ResizeMode::Height(0) => Err(OutputError::invalid_policy(
                "resize_height",
                "must be greater than 0",
            )),
            ResizeMode::Percent(p)
                if !p.is_finite() || !(MIN_RESIZE_PERCENT..=MAX_RESIZE_PERCENT).contains(&p) =>
            {
                Err(OutputError::invalid_policy(
                    "resize_percent",
                    format!(
                        "must be between {} and {}, got {}",
                        MIN_RESIZE_PERCENT, MAX_RESIZE_PERCENT, p
                    ),
                ))
            }
            _ => Ok(()),
        }
    }

    /// Encoder for an output path produced by [`output_filename`].
    pub fn target_format(&self, output_path: &Path) -> TargetFormat {
        TargetFormat::for_path(output_path).unwrap_or(TargetFormat::Jpeg)
    }
}

/// File name for the watermarked copy of `input`.
///
/// Under `OutputFormat::Auto` the source extension is kept when it names a
/// format the serializer can write; any other extension becomes `jpg`.
pub fn output_filename(input: &Path, policy: &OutputPolicy) -> String {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let source_ext = input.extension().and_then(|e| e.to_str());

    let ext = match policy.output_format.extension() {
        Some(forced) => forced.to_string(),
        None => match source_ext {
            Some(ext) if TargetFormat::from_extension(ext).is_some() => ext.to_string(),
            _ => "jpg".to_string(),
        },
    };

    let name = match policy.naming_rule {
        NamingRule::Original => stem,
        NamingRule::Prefix => format!("{}{}", policy.custom_prefix, stem),
        NamingRule::Suffix => format!("{}{}", stem, policy.custom_suffix),
    };

    format!("{}.{}", name, ext)
}

/// `<dir>/<dir name>_watermark`, where `dir` is `input` itself or, for a
/// file, the directory containing it.
pub fn default_output_dir(input: &Path) -> PathBuf {
    let dir = if input.is_file() {
        parent_or_current(input)
    } else {
        input.to_path_buf()
    };

    let name = normalize(&dir)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output".to_string());

    dir.join(format!("{}_watermark", name))
}

/// False when `output_dir` is the directory that holds `input_path`.
pub fn validate_output_dir(input_path: &Path, output_dir: &Path) -> bool {
    let input_dir = if input_path.is_dir() {
        input_path.to_path_buf()
    } else {
        parent_or_current(input_path)
    };

    normalize(&input_dir) != normalize(output_dir)
}

fn parent_or_current(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// Absolute form of `path`, resolving symlinks when it exists.
fn normalize(path: &Path) -> PathBuf {
    if let Ok(canonical) = path.canonicalize() {
        return canonical;
    }

    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .map(|cwd| cwd.join(path))
            .unwrap_or_else(|_| path.to_path_buf())
    };

    let mut cleaned = PathBuf::new();
    for component in absolute.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                cleaned.pop();
            }
            other => cleaned.push(other.as_os_str()),
        }
    }
    cleaned
}
