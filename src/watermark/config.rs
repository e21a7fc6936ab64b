//! Watermark settings.
//!
//! A [`WatermarkSpec`] describes one watermark: what to draw, where, and how.
//! It is built through [`WatermarkSpecBuilder`], which validates ranges once so
//! the renderer never has to re-check them.
//!
//! # Example
//!
//! ```
//! use photomark::watermark::{WatermarkPosition, WatermarkSpec};
//!
//! let spec = WatermarkSpec::builder()
//!     .text("2025-04-05")
//!     .font_size(48)
//!     .color("#FFCC00")
//!     .position(WatermarkPosition::BottomRight)
//!     .opacity(0.8)
//!     .shadow(true)
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(spec.font_size(), 48);
//! ```

use super::text_renderer::{parse_hex_color, Color};
use super::WatermarkError;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

const DEFAULT_FONT_SIZE: u32 = 36;

/// Where the watermark is anchored on the image.
///
/// The nine presets are inset by a fixed margin from the matching edges.
/// `Custom` places the watermark's top-left corner at an explicit pixel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WatermarkPosition {
    TopLeft,
    TopCenter,
    TopRight,
    CenterLeft,
    Center,
    CenterRight,
    BottomLeft,
    BottomCenter,
    #[default]
    BottomRight,
    Custom {
        x: i32,
        y: i32,
    },
}

impl WatermarkPosition {
    pub const PRESETS: [WatermarkPosition; 9] = [
        Self::TopLeft,
        Self::TopCenter,
        Self::TopRight,
        Self::CenterLeft,
        Self::Center,
        Self::CenterRight,
        Self::BottomLeft,
        Self::BottomCenter,
        Self::BottomRight,
    ];

    /// Stable snake_case name used by templates and the CLI.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TopLeft => "top_left",
            Self::TopCenter => "top_center",
            Self::TopRight => "top_right",
            Self::CenterLeft => "center_left",
            Self::Center => "center",
            Self::CenterRight => "center_right",
            Self::BottomLeft => "bottom_left",
            Self::BottomCenter => "bottom_center",
            Self::BottomRight => "bottom_right",
            Self::Custom { .. } => "custom",
        }
    }
}

impl fmt::Display for WatermarkPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Custom { x, y } => write!(f, "custom({}, {})", x, y),
            other => f.write_str(other.as_str()),
        }
    }
}

/// Parses preset names.
///
/// Accepts snake_case, kebab-case and the Chinese preset labels. `custom`
/// parses to `Custom { x: 0, y: 0 }`; callers supply the coordinates.
impl FromStr for WatermarkPosition {
    type Err = WatermarkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
        let position = match normalized.as_str() {
            "top_left" | "左上" => Self::TopLeft,
            "top_center" | "上中" => Self::TopCenter,
            "top_right" | "右上" => Self::TopRight,
            "center_left" | "左中" => Self::CenterLeft,
            "center" | "居中" => Self::Center,
            "center_right" | "右中" => Self::CenterRight,
            "bottom_left" | "左下" => Self::BottomLeft,
            "bottom_center" | "下中" => Self::BottomCenter,
            "bottom_right" | "右下" => Self::BottomRight,
            "custom" => Self::Custom { x: 0, y: 0 },
            _ => {
                return Err(WatermarkError::invalid_spec(
                    "position",
                    format!("unknown position '{}'", s),
                ))
            }
        };
        Ok(position)
    }
}

/// Requested font style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FontStyle {
    pub bold: bool,
    pub italic: bool,
}

impl FontStyle {
    pub fn new(bold: bool, italic: bool) -> Self {
        Self { bold, italic }
    }

    pub fn is_regular(&self) -> bool {
        !self.bold && !self.italic
    }
}

/// A fully validated watermark description.
#[derive(Debug, Clone, PartialEq)]
pub struct WatermarkSpec {
    text: Option<String>,
    font_size: u32,
    color: Color,
    position: WatermarkPosition,
    font_path: Option<PathBuf>,
    font_style: FontStyle,
    opacity: f32,
    shadow: bool,
    stroke: bool,
    rotation: f32,
    image_watermark_path: Option<PathBuf>,
    image_watermark_scale: f32,
}

impl Default for WatermarkSpec {
    fn default() -> Self {
        Self {
            text: None,
            font_size: DEFAULT_FONT_SIZE,
            color: Color::white(),
            position: WatermarkPosition::BottomRight,
            font_path: None,
            font_style: FontStyle::default(),
            opacity: 1.0,
            shadow: false,
            stroke: false,
            rotation: 0.0,
            image_watermark_path: None,
            image_watermark_scale: 1.0,
        }
    }
}

impl WatermarkSpec {
    pub fn builder() -> WatermarkSpecBuilder {
        WatermarkSpecBuilder::default()
    }

    /// Start a builder pre-filled with this spec's values.
    pub fn to_builder(&self) -> WatermarkSpecBuilder {
        WatermarkSpecBuilder { spec: self.clone() }
    }

    /// Custom text, if any. Blank text counts as absent.
    pub fn text(&self) -> Option<&str> {
        self.text.as_deref().filter(|t| !t.trim().is_empty())
    }

    /// The string to draw: custom text, or the supplied date.
    pub fn resolve_text<'a>(&'a self, date_text: &'a str) -> &'a str {
        self.text().unwrap_or(date_text)
    }

    pub fn font_size(&self) -> u32 {
        self.font_size
    }

    pub fn color(&self) -> Color {
        self.color
    }

    pub fn position(&self) -> WatermarkPosition {
        self.position
    }

    pub fn font_path(&self) -> Option<&Path> {
        self.font_path.as_deref()
    }

    pub fn font_style(&self) -> FontStyle {
        self.font_style
    }

    pub fn opacity(&self) -> f32 {
        self.opacity
    }

    pub fn shadow(&self) -> bool {
        self.shadow
    }

    pub fn stroke(&self) -> bool {
        self.stroke
    }

    /// Rotation in degrees, counter-clockwise.
    pub fn rotation(&self) -> f32 {
        self.rotation
    }

    pub fn is_rotated(&self) -> bool {
        self.rotation != 0.0
    }

    pub fn image_watermark_path(&self) -> Option<&Path> {
        self.image_watermark_path.as_deref()
    }

    pub fn image_watermark_scale(&self) -> f32 {
        self.image_watermark_scale
    }

    fn validate(&self) -> Result<(), WatermarkError> {
        if self.font_size == 0 {
            return Err(WatermarkError::invalid_spec(
                "font_size",
                "must be greater than 0",
            ));
        }

        if !self.opacity.is_finite() || !(0.0..=1.0).contains(&self.opacity) {
            return Err(WatermarkError::invalid_spec(
                "opacity",
                format!("must be within 0.0..=1.0, got {}", self.opacity),
            ));
        }

        if !self.rotation.is_finite() || !(-180.0..=180.0).contains(&self.rotation) {
            return Err(WatermarkError::invalid_spec(
                "rotation",
                format!("must be within -180..=180 degrees, got {}", self.rotation),
            ));
        }

        if !self.image_watermark_scale.is_finite() || self.image_watermark_scale <= 0.0 {
            return Err(WatermarkError::invalid_spec(
                "image_watermark_scale",
                format!("must be greater than 0, got {}", self.image_watermark_scale),
            ));
        }

        Ok(())
    }
}

/// Builder for [`WatermarkSpec`].
#[derive(Debug, Clone, Default)]
pub struct WatermarkSpecBuilder {
    spec: WatermarkSpec,
}

impl WatermarkSpecBuilder {
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.spec.text = Some(text.into());
        self
    }

    pub fn font_size(mut self, size: u32) -> Self {
        self.spec.font_size = size;
        self
    }

    /// Set the color from a `#RRGGBB` string.
    ///
    /// Malformed input is logged and replaced with white.
    pub fn color(mut self, hex: &str) -> Self {
        self.spec.color = match parse_hex_color(hex) {
            Ok(color) => color,
            Err(e) => {
                tracing::warn!(color = hex, error = %e, "Invalid watermark color, using white");
                Color::white()
            }
        };
        self
    }

    pub fn color_rgb(mut self, color: Color) -> Self {
        self.spec.color = color;
        self
    }

    pub fn position(mut self, position: WatermarkPosition) -> Self {
        self.spec.position = position;
        self
    }

    pub fn font_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.spec.font_path = Some(path.into());
        self
    }

    pub fn font_style(mut self, style: FontStyle) -> Self {
        self.spec.font_style = style;
        self
    }

    pub fn bold(mut self, bold: bool) -> Self {
        self.spec.font_style.bold = bold;
        self
    }

    pub fn italic(mut self, italic: bool) -> Self {
        self.spec.font_style.italic = italic;
        self
    }

    pub fn opacity(mut self, opacity: f32) -> Self {
        self.spec.opacity = opacity;
        self
    }

    pub fn shadow(mut self, shadow: bool) -> Self {
        self.spec.shadow = shadow;
        self
    }

    pub fn stroke(mut self, stroke: bool) -> Self {
        self.spec.stroke = stroke;
        self
    }

    pub fn rotation(mut self, degrees: f32) -> Self {
        self.spec.rotation = degrees;
        self
    }

    pub fn image_watermark(mut self, path: impl Into<PathBuf>) -> Self {
        self.spec.image_watermark_path = Some(path.into());
        self
    }

    pub fn image_watermark_scale(mut self, scale: f32) -> Self {
        self.spec.image_watermark_scale = scale;
        self
    }

    pub fn build(self) -> Result<WatermarkSpec, WatermarkError> {
        self.spec.validate()?;
        Ok(self.spec)
    }
}
