//! Position calculation for watermark placement.
//!
//! Placement is a pure function of the image size, the watermark size and the
//! requested position. The nine presets are inset by [`MARGIN`] pixels from
//! the matching edges; centered axes use floor division of the free space.
//!
//! # Example
//!
//! ```
//! use photomark::watermark::position::{compute_position, ImageDimensions, WatermarkDimensions, MARGIN};
//! use photomark::watermark::WatermarkPosition;
//!
//! let image = ImageDimensions { width: 800, height: 600 };
//! let watermark = WatermarkDimensions { width: 100, height: 50 };
//!
//! let pos = compute_position(&image, &watermark, WatermarkPosition::BottomRight, MARGIN);
//! assert_eq!((pos.x, pos.y), (680, 530)); // 800 - 100 - 20, 600 - 50 - 20
//! ```

use super::WatermarkPosition;

/// Inset from the image edges for preset positions, in pixels.
pub const MARGIN: u32 = 20;

/// Dimensions of the target image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageDimensions {
    pub width: u32,
    pub height: u32,
}

/// Dimensions of the watermark to be placed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WatermarkDimensions {
    pub width: u32,
    pub height: u32,
}

/// Top-left corner of a placed watermark. May be negative.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlacementPosition {
    pub x: i32,
    pub y: i32,
}

impl PlacementPosition {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Calculate the top-left corner of the watermark.
///
/// Coordinates may be negative if the watermark is larger than the image.
pub fn compute_position(
    image: &ImageDimensions,
    watermark: &WatermarkDimensions,
    position: WatermarkPosition,
    margin: u32,
) -> PlacementPosition {
    let img_w = image.width as i32;
    let img_h = image.height as i32;
    let wm_w = watermark.width as i32;
    let wm_h = watermark.height as i32;
    let m = margin as i32;

    let mid_x = (img_w - wm_w).div_euclid(2);
    let mid_y = (img_h - wm_h).div_euclid(2);
    let right = img_w - wm_w - m;
    let bottom = img_h - wm_h - m;

    match position {
        WatermarkPosition::TopLeft => PlacementPosition::new(m, m),
        WatermarkPosition::TopCenter => PlacementPosition::new(mid_x, m),
        WatermarkPosition::TopRight => PlacementPosition::new(right, m),

        WatermarkPosition::CenterLeft => PlacementPosition::new(m, mid_y),
        WatermarkPosition::Center => PlacementPosition::new(mid_x, mid_y),
        WatermarkPosition::CenterRight => PlacementPosition::new(right, mid_y),

        WatermarkPosition::BottomLeft => PlacementPosition::new(m, bottom),
        WatermarkPosition::BottomCenter => PlacementPosition::new(mid_x, bottom),
        WatermarkPosition::BottomRight => PlacementPosition::new(right, bottom),

        WatermarkPosition::Custom { x, y } => PlacementPosition::new(x, y),
    }
}

/// Move a placement so a resized box keeps the same center.
///
/// Used after rotation: the rotated canvas is larger than the original, and
/// shifting by half the growth keeps the rotation anchored on the content.
pub fn recenter(
    origin: PlacementPosition,
    before: &WatermarkDimensions,
    after: &WatermarkDimensions,
) -> PlacementPosition {
    let dx = (before.width as i32 - after.width as i32).div_euclid(2);
    let dy = (before.height as i32 - after.height as i32).div_euclid(2);
    PlacementPosition::new(origin.x.saturating_add(dx), origin.y.saturating_add(dy))
}
