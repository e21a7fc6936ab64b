//! Watermark compositor for blending watermarks onto images.
//!
//! Blending is integer Porter-Duff "over". When the background is opaque it
//! reduces to [`blend_channel`], so drawing opaque text straight onto an RGB
//! image and compositing it through a transparent layer give the same bytes.
//!
//! # Example
//!
//! ```
//! use image::{Rgba, RgbaImage};
//! use photomark::watermark::compositor::{blend_layer, WatermarkLayer};
//! use photomark::watermark::position::PlacementPosition;
//!
//! let mut target = RgbaImage::from_pixel(100, 100, Rgba([255, 255, 255, 255]));
//! let layer = WatermarkLayer {
//!     image: RgbaImage::from_pixel(10, 10, Rgba([255, 0, 0, 255])),
//!     position: PlacementPosition::new(80, 80),
//! };
//!
//! blend_layer(&mut target, &layer);
//! assert_eq!(target.get_pixel(85, 85), &Rgba([255, 0, 0, 255]));
//! ```

use super::position::{recenter, PlacementPosition, WatermarkDimensions};
use image::{DynamicImage, Rgb, RgbImage, Rgba, RgbaImage};

/// A watermark image placed on the target.
#[derive(Clone)]
pub struct WatermarkLayer {
    /// The watermark image (RGBA), opacity already applied to its alpha.
    pub image: RgbaImage,
    /// Top-left corner on the target image.
    pub position: PlacementPosition,
}

impl std::fmt::Debug for WatermarkLayer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WatermarkLayer")
            .field("dimensions", &(self.image.width(), self.image.height()))
            .field("position", &self.position)
            .finish()
    }
}

impl WatermarkLayer {
    pub fn new(image: RgbaImage, position: PlacementPosition) -> Self {
        Self { image, position }
    }

    pub fn dimensions(&self) -> WatermarkDimensions {
        WatermarkDimensions {
            width: self.image.width(),
            height: self.image.height(),
        }
    }

    /// Rotate the layer about its own center.
    ///
    /// The canvas grows to fit the rotated corners and the position moves so
    /// the center stays where it was. Zero degrees leaves the layer untouched.
    pub fn rotated(self, degrees: f32) -> Self {
        if degrees == 0.0 {
            return self;
        }

        let before = self.dimensions();
        let image = rotate_about_center(&self.image, degrees);
        let after = WatermarkDimensions {
            width: image.width(),
            height: image.height(),
        };

        Self {
            position: recenter(self.position, &before, &after),
            image,
        }
    }
}

/// Blend a single watermark layer onto the target image.
///
/// Parts of the layer outside the target are clipped.
pub fn blend_layer(target: &mut RgbaImage, layer: &WatermarkLayer) {
    let target_width = target.width() as i32;
    let target_height = target.height() as i32;

    let wm_width = layer.image.width() as i32;
    let wm_height = layer.image.height() as i32;

    let x_start = layer.position.x.max(0);
    let y_start = layer.position.y.max(0);
    let x_end = layer.position.x.saturating_add(wm_width).min(target_width);
    let y_end = layer.position.y.saturating_add(wm_height).min(target_height);

    for ty in y_start..y_end {
        for tx in x_start..x_end {
            let wx = (tx - layer.position.x) as u32;
            let wy = (ty - layer.position.y) as u32;

            let wm_pixel = layer.image.get_pixel(wx, wy);
            let target_pixel = target.get_pixel_mut(tx as u32, ty as u32);
            *target_pixel = blend_pixels(*target_pixel, *wm_pixel);
        }
    }
}

/// `(src * alpha + dst * (255 - alpha)) / 255`, rounded.
#[inline]
pub fn blend_channel(dst: u8, src: u8, alpha: u8) -> u8 {
    let a = alpha as u32;
    ((src as u32 * a + dst as u32 * (255 - a) + 127) / 255) as u8
}

/// `coverage * alpha / 255`, rounded.
#[inline]
pub fn multiply_alpha(coverage: u8, alpha: u8) -> u8 {
    ((coverage as u32 * alpha as u32 + 127) / 255) as u8
}

/// Porter-Duff "over": `foreground` composited onto `background`.
pub fn blend_pixels(background: Rgba<u8>, foreground: Rgba<u8>) -> Rgba<u8> {
    let fg_alpha = foreground[3];
    let bg_alpha = background[3];

    if fg_alpha == 0 {
        return background;
    }
    if fg_alpha == 255 || bg_alpha == 0 {
        return foreground;
    }
    if bg_alpha == 255 {
        return Rgba([
            blend_channel(background[0], foreground[0], fg_alpha),
            blend_channel(background[1], foreground[1], fg_alpha),
            blend_channel(background[2], foreground[2], fg_alpha),
            255,
        ]);
    }

    let fa = fg_alpha as f32 / 255.0;
    let ba = bg_alpha as f32 / 255.0;
    let out_alpha = fa + ba * (1.0 - fa);

    let blend = |f: u8, b: u8| -> u8 {
        let value = (f as f32 * fa + b as f32 * ba * (1.0 - fa)) / out_alpha;
        value.round().clamp(0.0, 255.0) as u8
    };

    Rgba([
        blend(foreground[0], background[0]),
        blend(foreground[1], background[1]),
        blend(foreground[2], background[2]),
        (out_alpha * 255.0).round() as u8,
    ])
}

/// Rotate an image counter-clockwise about its center.
///
/// The output is just large enough for the rotated corners; uncovered pixels
/// are transparent. Sampling is bilinear on premultiplied alpha.
pub fn rotate_about_center(image: &RgbaImage, degrees: f32) -> RgbaImage {
    if degrees == 0.0 || image.width() == 0 || image.height() == 0 {
        return image.clone();
    }

    let radians = degrees.to_radians();
    let cos = radians.cos();
    let sin = radians.sin();

    let src_w = image.width() as f32;
    let src_h = image.height() as f32;
    let cx = src_w / 2.0;
    let cy = src_h / 2.0;

    // Counter-clockwise on screen with y pointing down
    let corners = [
        (-cx, -cy),
        (src_w - cx, -cy),
        (-cx, src_h - cy),
        (src_w - cx, src_h - cy),
    ];
    let rotated_corners: Vec<(f32, f32)> = corners
        .iter()
        .map(|(x, y)| (x * cos + y * sin, -x * sin + y * cos))
        .collect();

    let min_x = rotated_corners
        .iter()
        .map(|(x, _)| *x)
        .fold(f32::INFINITY, f32::min);
    let max_x = rotated_corners
        .iter()
        .map(|(x, _)| *x)
        .fold(f32::NEG_INFINITY, f32::max);
    let min_y = rotated_corners
        .iter()
        .map(|(_, y)| *y)
        .fold(f32::INFINITY, f32::min);
    let max_y = rotated_corners
        .iter()
        .map(|(_, y)| *y)
        .fold(f32::NEG_INFINITY, f32::max);

    // Shave float noise so right angles do not grow by a pixel
    let dst_w = ((max_x - min_x) - 1e-3).ceil().max(1.0) as u32;
    let dst_h = ((max_y - min_y) - 1e-3).ceil().max(1.0) as u32;
    let dst_cx = dst_w as f32 / 2.0;
    let dst_cy = dst_h as f32 / 2.0;

    RgbaImage::from_fn(dst_w, dst_h, |dx, dy| {
        let rx = dx as f32 + 0.5 - dst_cx;
        let ry = dy as f32 + 0.5 - dst_cy;

        let sx = rx * cos - ry * sin + cx;
        let sy = rx * sin + ry * cos + cy;

        sample_bilinear(image, sx - 0.5, sy - 0.5)
    })
}

/// Bilinear sample at continuous pixel coordinates; outside is transparent.
fn sample_bilinear(image: &RgbaImage, x: f32, y: f32) -> Rgba<u8> {
    let x0 = x.floor();
    let y0 = y.floor();
    let fx = x - x0;
    let fy = y - y0;

    let taps = [
        (x0, y0, (1.0 - fx) * (1.0 - fy)),
        (x0 + 1.0, y0, fx * (1.0 - fy)),
        (x0, y0 + 1.0, (1.0 - fx) * fy),
        (x0 + 1.0, y0 + 1.0, fx * fy),
    ];

    let (w, h) = (image.width() as f32, image.height() as f32);
    let mut premultiplied = [0.0f32; 3];
    let mut alpha = 0.0f32;

    for (tx, ty, weight) in taps {
        if weight <= 0.0 || tx < 0.0 || ty < 0.0 || tx >= w || ty >= h {
            continue;
        }
        let p = image.get_pixel(tx as u32, ty as u32);
        let a = p[3] as f32 * weight;
        alpha += a;
        for (c, acc) in premultiplied.iter_mut().enumerate() {
            *acc += p[c] as f32 * a;
        }
    }

    if alpha <= 0.0 {
        return Rgba([0, 0, 0, 0]);
    }

    let unpremultiply = |v: f32| (v / alpha).round().clamp(0.0, 255.0) as u8;
    Rgba([
        unpremultiply(premultiplied[0]),
        unpremultiply(premultiplied[1]),
        unpremultiply(premultiplied[2]),
        alpha.round().clamp(0.0, 255.0) as u8,
    ])
}

/// Composite an image onto an opaque white background.
pub fn flatten_onto_white(image: &DynamicImage) -> RgbImage {
    match image {
        DynamicImage::ImageRgb8(rgb) => rgb.clone(),
        other if !other.color().has_alpha() => other.to_rgb8(),
        other => {
            let rgba = other.to_rgba8();
            RgbImage::from_fn(rgba.width(), rgba.height(), |x, y| {
                let Rgba([r, g, b, a]) = *rgba.get_pixel(x, y);
                Rgb([
                    blend_channel(255, r, a),
                    blend_channel(255, g, a),
                    blend_channel(255, b, a),
                ])
            })
        }
    }
}
