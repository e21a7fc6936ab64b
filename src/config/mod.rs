//! Watermark templates.
//!
//! A [`WatermarkTemplate`] is the flat, serializable form of a
//! [`WatermarkSpec`] plus an [`OutputPolicy`]. Templates are what the
//! [`TemplateStore`] persists and what `--config` files contain; the
//! renderer only ever sees the validated spec and policy built from them.
//!
//! Optional paths are stored as empty strings so files written by older
//! tools load unchanged.

mod store;

pub use store::{TemplateStore, LAST_SESSION_FILE, TEMPLATES_FILE};

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::warn;

use crate::error::PhotomarkError;
use crate::output::naming::{DEFAULT_JPEG_QUALITY, DEFAULT_PREFIX, DEFAULT_SUFFIX};
use crate::output::{NamingRule, OutputError, OutputFormat, OutputPolicy, ResizeMode};
use crate::watermark::{WatermarkError, WatermarkPosition, WatermarkSpec};

pub const DEFAULT_TEMPLATE_NAME: &str = "默认模板";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WatermarkTemplate {
    #[serde(default = "default_name")]
    pub name: String,
    #[serde(default = "default_font_size")]
    pub font_size: u32,
    #[serde(default = "default_color")]
    pub color: String,
    #[serde(default = "default_position")]
    pub position: String,
    #[serde(default)]
    pub custom_x: i32,
    #[serde(default)]
    pub custom_y: i32,
    #[serde(default)]
    pub font_path: String,
    #[serde(default = "default_one")]
    pub opacity: f32,
    #[serde(default = "default_output_format")]
    pub output_format: String,
    #[serde(default)]
    pub output_dir: String,
    #[serde(default = "default_jpeg_quality")]
    pub jpeg_quality: u8,
    #[serde(default = "default_naming_rule")]
    pub naming_rule: String,
    #[serde(default = "default_prefix")]
    pub custom_prefix: String,
    #[serde(default = "default_suffix")]
    pub custom_suffix: String,
    #[serde(default = "default_resize_mode")]
    pub resize_mode: String,
    #[serde(default = "default_resize_width")]
    pub resize_width: u32,
    #[serde(default = "default_resize_height")]
    pub resize_height: u32,
    #[serde(default = "default_one")]
    pub resize_percent: f32,
    #[serde(default)]
    pub custom_text: String,
    #[serde(default)]
    pub font_style_bold: bool,
    #[serde(default)]
    pub font_style_italic: bool,
    #[serde(default)]
    pub shadow: bool,
    #[serde(default)]
    pub stroke: bool,
    #[serde(default)]
    pub image_watermark_path: String,
    #[serde(default = "default_one")]
    pub image_watermark_scale: f32,
    #[serde(default)]
    pub rotation: f32,
}

fn default_name() -> String {
    DEFAULT_TEMPLATE_NAME.to_string()
}

fn default_font_size() -> u32 {
    36
}

fn default_color() -> String {
    "#FFFFFF".to_string()
}

fn default_position() -> String {
    WatermarkPosition::BottomRight.as_str().to_string()
}

fn default_one() -> f32 {
    1.0
}

fn default_output_format() -> String {
    OutputFormat::Auto.as_str().to_string()
}

fn default_jpeg_quality() -> u8 {
    DEFAULT_JPEG_QUALITY
}

fn default_naming_rule() -> String {
    NamingRule::Suffix.as_str().to_string()
}

fn default_prefix() -> String {
    DEFAULT_PREFIX.to_string()
}

fn default_suffix() -> String {
    DEFAULT_SUFFIX.to_string()
}

fn default_resize_mode() -> String {
    "none".to_string()
}

fn default_resize_width() -> u32 {
    800
}

fn default_resize_height() -> u32 {
    600
}

impl Default for WatermarkTemplate {
    fn default() -> Self {
        Self {
            name: default_name(),
            font_size: default_font_size(),
            color: default_color(),
            position: default_position(),
            custom_x: 0,
            custom_y: 0,
            font_path: String::new(),
            opacity: 1.0,
            output_format: default_output_format(),
            output_dir: String::new(),
            jpeg_quality: default_jpeg_quality(),
            naming_rule: default_naming_rule(),
            custom_prefix: default_prefix(),
            custom_suffix: default_suffix(),
            resize_mode: default_resize_mode(),
            resize_width: default_resize_width(),
            resize_height: default_resize_height(),
            resize_percent: 1.0,
            custom_text: String::new(),
            font_style_bold: false,
            font_style_italic: false,
            shadow: false,
            stroke: false,
            image_watermark_path: String::new(),
            image_watermark_scale: 1.0,
            rotation: 0.0,
        }
    }
}

fn non_empty(value: &str) -> Option<&str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed)
    }
}

impl WatermarkTemplate {
    /// Template with default values under another name.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Position from the stored name; unknown names fall back to bottom-right.
    pub fn watermark_position(&self) -> WatermarkPosition {
        match self.position.parse::<WatermarkPosition>() {
            Ok(WatermarkPosition::Custom { .. }) => WatermarkPosition::Custom {
                x: self.custom_x,
                y: self.custom_y,
            },
            Ok(position) => position,
            Err(_) => {
                warn!(
                    position = %self.position,
                    "Unknown watermark position, using bottom_right"
                );
                WatermarkPosition::BottomRight
            }
        }
    }

    pub fn output_dir(&self) -> Option<PathBuf> {
        non_empty(&self.output_dir).map(PathBuf::from)
    }

    /// Validated watermark settings.
    pub fn to_spec(&self) -> Result<WatermarkSpec, WatermarkError> {
        let mut builder = WatermarkSpec::builder()
            .font_size(self.font_size)
            .color(&self.color)
            .position(self.watermark_position())
            .bold(self.font_style_bold)
            .italic(self.font_style_italic)
            .opacity(self.opacity)
            .shadow(self.shadow)
            .stroke(self.stroke)
            .rotation(self.rotation)
            .image_watermark_scale(self.image_watermark_scale);

        if !self.custom_text.trim().is_empty() {
            builder = builder.text(self.custom_text.clone());
        }
        if let Some(path) = non_empty(&self.font_path) {
            builder = builder.font_path(path);
        }
        if let Some(path) = non_empty(&self.image_watermark_path) {
            builder = builder.image_watermark(path);
        }

        builder.build()
    }

    /// Validated output settings.
    pub fn to_policy(&self) -> Result<OutputPolicy, OutputError> {
        let resize = match self.resize_mode.trim().to_lowercase().as_str() {
            "" | "none" => ResizeMode::None,
            "width" => ResizeMode::Width(self.resize_width),
            "height" => ResizeMode::Height(self.resize_height),
            "percent" => ResizeMode::Percent(self.resize_percent),
            other => {
                return Err(OutputError::invalid_policy(
                    "resize_mode",
                    format!("unknown resize mode: {}", other),
                ))
            }
        };

        let policy = OutputPolicy {
            naming_rule: self.naming_rule.parse()?,
            custom_prefix: self.custom_prefix.clone(),
            custom_suffix: self.custom_suffix.clone(),
            output_format: self.output_format.parse()?,
            jpeg_quality: self.jpeg_quality,
            resize,
        };
        policy.validate()?;
        Ok(policy)
    }

    /// Flatten a spec and policy back into a template.
    pub fn from_parts(name: impl Into<String>, spec: &WatermarkSpec, policy: &OutputPolicy) -> Self {
        let path_string =
            |path: Option<&Path>| path.map(|p| p.display().to_string()).unwrap_or_default();
        let (custom_x, custom_y) = match spec.position() {
            WatermarkPosition::Custom { x, y } => (x, y),
            _ => (0, 0),
        };

        let mut template = Self {
            name: name.into(),
            font_size: spec.font_size(),
            color: spec.color().to_hex(),
            position: spec.position().as_str().to_string(),
            custom_x,
            custom_y,
            font_path: path_string(spec.font_path()),
            opacity: spec.opacity(),
            output_format: policy.output_format.as_str().to_string(),
            jpeg_quality: policy.jpeg_quality,
            naming_rule: policy.naming_rule.as_str().to_string(),
            custom_prefix: policy.custom_prefix.clone(),
            custom_suffix: policy.custom_suffix.clone(),
            resize_mode: policy.resize.as_str().to_string(),
            custom_text: spec.text().unwrap_or_default().to_string(),
            font_style_bold: spec.font_style().bold,
            font_style_italic: spec.font_style().italic,
            shadow: spec.shadow(),
            stroke: spec.stroke(),
            image_watermark_path: path_string(spec.image_watermark_path()),
            image_watermark_scale: spec.image_watermark_scale(),
            rotation: spec.rotation(),
            ..Self::default()
        };

        match policy.resize {
            ResizeMode::Width(width) => template.resize_width = width,
            ResizeMode::Height(height) => template.resize_height = height,
            ResizeMode::Percent(percent) => template.resize_percent = percent,
            ResizeMode::None => {}
        }

        template
    }

    /// Parse a template from YAML (or JSON), replacing `${VAR}` with
    /// environment variables first.
    pub fn from_yaml_with_env(yaml: &str) -> Result<Self, PhotomarkError> {
        let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}")
            .map_err(|e| PhotomarkError::Config(e.to_string()))?;

        let mut missing = None;
        let substituted = re.replace_all(yaml, |caps: &regex::Captures| {
            let var_name = &caps[1];
            match std::env::var(var_name) {
                Ok(value) => value,
                Err(_) => {
                    missing.get_or_insert_with(|| var_name.to_string());
                    String::new()
                }
            }
        });

        if let Some(var_name) = missing {
            return Err(PhotomarkError::Config(format!(
                "Environment variable '{}' is referenced but not set",
                var_name
            )));
        }

        serde_yaml::from_str(&substituted).map_err(|e| PhotomarkError::Config(e.to_string()))
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, PhotomarkError> {
        let yaml = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            PhotomarkError::Config(format!(
                "Failed to read config file {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;
        Self::from_yaml_with_env(&yaml)
    }
}
