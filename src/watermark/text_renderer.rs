//! Text watermark rendering.
//!
//! Text is rasterized once into a [`TextMask`]: an 8-bit coverage map cropped
//! to the tight ink bounding box of the string. Measurement and drawing both
//! use that mask, so placement math and pixels can never disagree.
//!
//! # Features
//!
//! - Hex color parsing (`#RRGGBB`)
//! - Synthetic bold and italic when the font file has no such variant
//! - Drop shadow and stamped outline on a transparent layer
//! - A direct drawing path for opaque text without effects
//!
//! # Example
//!
//! ```
//! use photomark::watermark::font::FontResolver;
//! use photomark::watermark::text_renderer::{measure_text, rasterize_text};
//! use photomark::watermark::FontStyle;
//!
//! let font = FontResolver::builtin_only().resolve(None, 36.0, FontStyle::default());
//! let mask = rasterize_text("2025-04-05", &font);
//! assert_eq!(measure_text("2025-04-05", &font), (mask.width(), mask.height()));
//! ```

use super::compositor::{blend_channel, blend_pixels, multiply_alpha};
use super::font::FontHandle;
use super::position::{PlacementPosition, WatermarkDimensions};
use super::{WatermarkError, WatermarkSpec};
use ab_glyph::{point, Font, PxScale, ScaleFont};
use image::{Rgb, RgbImage, Rgba, RgbaImage};

/// Horizontal shear applied for synthetic italics.
const ITALIC_SHEAR: f32 = 0.2;

/// RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// White color.
    pub fn white() -> Self {
        Self::new(255, 255, 255)
    }

    /// Black color.
    pub fn black() -> Self {
        Self::new(0, 0, 0)
    }

    /// `#RRGGBB` form.
    pub fn to_hex(&self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

/// Parse a hex color string into RGB components.
///
/// Leading `#` characters are optional; exactly six hex digits must remain.
///
/// ```
/// use photomark::watermark::text_renderer::{parse_hex_color, Color};
///
/// assert_eq!(parse_hex_color("#FF0000").unwrap(), Color::new(255, 0, 0));
/// assert!(parse_hex_color("#FFF").is_err());
/// ```
pub fn parse_hex_color(hex: &str) -> Result<Color, WatermarkError> {
    let digits = hex.trim().trim_start_matches('#');
    let invalid = || WatermarkError::InvalidColorFormat(hex.to_string());

    if digits.len() != 6 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(invalid());
    }

    let channel = |range: std::ops::Range<usize>| {
        u8::from_str_radix(&digits[range], 16).map_err(|_| invalid())
    };

    Ok(Color::new(channel(0..2)?, channel(2..4)?, channel(4..6)?))
}

/// Coverage of a rasterized string, cropped to its ink bounds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextMask {
    width: u32,
    height: u32,
    coverage: Vec<u8>,
}

impl TextMask {
    fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            coverage: vec![0; width as usize * height as usize],
        }
    }

    /// A mask with no ink.
    pub fn empty() -> Self {
        Self::new(0, 0)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn dimensions(&self) -> WatermarkDimensions {
        WatermarkDimensions {
            width: self.width,
            height: self.height,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Coverage at `(x, y)`, 0 to 255.
    pub fn get(&self, x: u32, y: u32) -> u8 {
        self.coverage[(y * self.width + x) as usize]
    }

    fn put_max(&mut self, x: u32, y: u32, value: u8) {
        let idx = (y * self.width + x) as usize;
        self.coverage[idx] = self.coverage[idx].max(value);
    }

    /// Iterate over pixels with non-zero coverage.
    fn inked(&self) -> impl Iterator<Item = (u32, u32, u8)> + '_ {
        self.coverage
            .iter()
            .enumerate()
            .filter(|(_, c)| **c > 0)
            .map(move |(i, c)| (i as u32 % self.width, i as u32 / self.width, *c))
    }
}

/// Rasterize `text` into a tight coverage mask.
///
/// Control characters are skipped. Styles the font cannot provide are
/// synthesised here, so the mask already has its final size.
pub fn rasterize_text(text: &str, font: &FontHandle) -> TextMask {
    let face = font.font();
    let scale = PxScale::from(font.size());
    let scaled_font = face.as_scaled(scale);
    let baseline_y = scaled_font.ascent();

    let mut glyphs = Vec::new();
    let mut cursor_x = 0.0f32;
    let mut prev_glyph: Option<ab_glyph::GlyphId> = None;

    for c in text.chars().filter(|c| !c.is_control()) {
        let glyph_id = scaled_font.glyph_id(c);

        if let Some(prev) = prev_glyph {
            cursor_x += scaled_font.kern(prev, glyph_id);
        }

        let glyph = glyph_id.with_scale_and_position(scale, point(cursor_x, baseline_y));
        if let Some(outlined) = face.outline_glyph(glyph) {
            glyphs.push(outlined);
        }

        cursor_x += scaled_font.h_advance(glyph_id);
        prev_glyph = Some(glyph_id);
    }

    if glyphs.is_empty() {
        return TextMask::empty();
    }

    let (mut min_x, mut min_y) = (i32::MAX, i32::MAX);
    let (mut max_x, mut max_y) = (i32::MIN, i32::MIN);
    for glyph in &glyphs {
        let bounds = glyph.px_bounds();
        min_x = min_x.min(bounds.min.x.floor() as i32);
        min_y = min_y.min(bounds.min.y.floor() as i32);
        max_x = max_x.max(bounds.max.x.ceil() as i32);
        max_y = max_y.max(bounds.max.y.ceil() as i32);
    }

    let width = (max_x - min_x).max(0) as u32;
    let height = (max_y - min_y).max(0) as u32;
    let mut mask = TextMask::new(width, height);

    for glyph in &glyphs {
        let bounds = glyph.px_bounds();
        let left = bounds.min.x.floor() as i32 - min_x;
        let top = bounds.min.y.floor() as i32 - min_y;

        glyph.draw(|px, py, coverage| {
            let x = left + px as i32;
            let y = top + py as i32;
            if x >= 0 && y >= 0 && (x as u32) < width && (y as u32) < height {
                let value = (coverage.clamp(0.0, 1.0) * 255.0).round() as u8;
                mask.put_max(x as u32, y as u32, value);
            }
        });
    }

    // Drop rows and columns that ended up without ink (zero-coverage edges)
    let mut mask = crop_to_ink(mask);

    let synthetic = font.synthetic();
    if synthetic.bold {
        let radius = ((font.size() / 24.0).round() as u32).max(1);
        mask = embolden(&mask, radius);
    }
    if synthetic.italic {
        mask = shear(&mask, ITALIC_SHEAR);
    }

    mask
}

/// Size of the tight ink bounding box of `text`, as drawn.
pub fn measure_text(text: &str, font: &FontHandle) -> (u32, u32) {
    let mask = rasterize_text(text, font);
    (mask.width(), mask.height())
}

fn crop_to_ink(mask: TextMask) -> TextMask {
    let (mut min_x, mut min_y) = (u32::MAX, u32::MAX);
    let (mut max_x, mut max_y) = (0u32, 0u32);
    let mut any = false;

    for (x, y, _) in mask.inked() {
        any = true;
        min_x = min_x.min(x);
        min_y = min_y.min(y);
        max_x = max_x.max(x);
        max_y = max_y.max(y);
    }

    if !any {
        return TextMask::empty();
    }
    if min_x == 0 && min_y == 0 && max_x + 1 == mask.width && max_y + 1 == mask.height {
        return mask;
    }

    let mut cropped = TextMask::new(max_x - min_x + 1, max_y - min_y + 1);
    for (x, y, c) in mask.inked() {
        cropped.put_max(x - min_x, y - min_y, c);
    }
    cropped
}

/// Widen strokes horizontally by `radius` pixels.
fn embolden(mask: &TextMask, radius: u32) -> TextMask {
    if mask.is_empty() {
        return mask.clone();
    }

    let mut out = TextMask::new(mask.width + radius, mask.height);
    for (x, y, c) in mask.inked() {
        for k in 0..=radius {
            out.put_max(x + k, y, c);
        }
    }
    out
}

/// Slant the mask to the right, bottom row fixed.
fn shear(mask: &TextMask, factor: f32) -> TextMask {
    if mask.is_empty() {
        return mask.clone();
    }

    let last_row = mask.height - 1;
    let offset = |y: u32| ((last_row - y) as f32 * factor).round() as u32;

    let mut out = TextMask::new(mask.width + offset(0), mask.height);
    for (x, y, c) in mask.inked() {
        out.put_max(x + offset(y), y, c);
    }
    out
}

/// Shadow offset for a font size, in pixels along both axes.
pub fn shadow_offset(font_size: u32) -> u32 {
    (font_size / 20).max(1)
}

/// Outline radius for a font size, in pixels.
pub fn stroke_radius(font_size: u32) -> u32 {
    (font_size / 30).max(1)
}

/// Options for text layer rendering.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextRenderOptions {
    /// Text color (RGB).
    pub color: Color,
    /// Opacity (0.0 to 1.0).
    pub opacity: f32,
    /// Font size in pixels, drives effect sizes.
    pub font_size: u32,
    /// Draw a drop shadow.
    pub shadow: bool,
    /// Draw a stamped outline.
    pub stroke: bool,
}

impl TextRenderOptions {
    pub fn from_spec(spec: &WatermarkSpec) -> Self {
        Self {
            color: spec.color(),
            opacity: spec.opacity(),
            font_size: spec.font_size(),
            shadow: spec.shadow(),
            stroke: spec.stroke(),
        }
    }

    /// Alpha of the main text, `round(255 * opacity)`.
    pub fn alpha(&self) -> u8 {
        (255.0 * self.opacity.clamp(0.0, 1.0)).round() as u8
    }

    /// Whether the text has to go through a transparent layer.
    pub fn needs_layer(&self) -> bool {
        self.opacity < 1.0 || self.shadow || self.stroke
    }

    /// Transparent border around the text, wide enough for every effect.
    ///
    /// The border is the same on all sides so the layer center is the text
    /// center.
    pub fn padding(&self) -> u32 {
        let shadow = if self.shadow {
            shadow_offset(self.font_size)
        } else {
            0
        };
        let stroke = if self.stroke {
            stroke_radius(self.font_size)
        } else {
            0
        };
        shadow.max(stroke)
    }
}

/// Render a text mask onto a transparent layer with effects.
///
/// The text's top-left sits at `(padding, padding)` in the returned layer,
/// where `padding` is [`TextRenderOptions::padding`]. Shadow and outline are
/// drawn first, the main text last. Each pass paints over the layer
/// rather than compositing, so overlapping outline stamps never exceed the
/// requested alpha and the main text keeps exactly `round(255 * opacity)`.
pub fn render_text(mask: &TextMask, options: &TextRenderOptions) -> RgbaImage {
    let pad = options.padding();
    let mut layer = RgbaImage::new(mask.width() + 2 * pad, mask.height() + 2 * pad);
    let alpha = options.alpha();
    let origin = pad as i32;

    if options.shadow {
        let offset = shadow_offset(options.font_size) as i32;
        paint_mask(
            &mut layer,
            mask,
            PlacementPosition::new(origin + offset, origin + offset),
            Color::black(),
            alpha / 2,
        );
    }

    if options.stroke {
        let radius = stroke_radius(options.font_size) as i32;
        for dy in -radius..=radius {
            for dx in -radius..=radius {
                if dx == 0 && dy == 0 {
                    continue;
                }
                paint_mask(
                    &mut layer,
                    mask,
                    PlacementPosition::new(origin + dx, origin + dy),
                    Color::black(),
                    alpha,
                );
            }
        }
    }

    paint_mask(
        &mut layer,
        mask,
        PlacementPosition::new(origin, origin),
        options.color,
        alpha,
    );

    layer
}

/// Alpha-composite a mask in a solid color onto an RGBA image.
pub fn stamp_mask(
    target: &mut RgbaImage,
    mask: &TextMask,
    at: PlacementPosition,
    color: Color,
    alpha: u8,
) {
    if alpha == 0 {
        return;
    }

    let (tw, th) = (target.width() as i32, target.height() as i32);
    for (mx, my, coverage) in mask.inked() {
        let x = at.x.saturating_add(mx as i32);
        let y = at.y.saturating_add(my as i32);
        if x < 0 || y < 0 || x >= tw || y >= th {
            continue;
        }

        let a = multiply_alpha(coverage, alpha);
        if a == 0 {
            continue;
        }

        let pixel = target.get_pixel_mut(x as u32, y as u32);
        *pixel = blend_pixels(*pixel, Rgba([color.r, color.g, color.b, a]));
    }
}

/// Paint a mask in a solid color into an RGBA layer.
///
/// The pixel moves toward `(color, alpha)` by coverage in premultiplied
/// space, so a fully covered pixel ends up exactly `(color, alpha)` whatever
/// was under it, and partial coverage on a clear layer keeps the pure color.
pub fn paint_mask(
    target: &mut RgbaImage,
    mask: &TextMask,
    at: PlacementPosition,
    color: Color,
    alpha: u8,
) {
    let (tw, th) = (target.width() as i32, target.height() as i32);
    for (mx, my, coverage) in mask.inked() {
        let x = at.x.saturating_add(mx as i32);
        let y = at.y.saturating_add(my as i32);
        if x < 0 || y < 0 || x >= tw || y >= th {
            continue;
        }

        let pixel = target.get_pixel_mut(x as u32, y as u32);
        *pixel = paint_pixel(*pixel, color, alpha, coverage);
    }
}

fn paint_pixel(under: Rgba<u8>, color: Color, alpha: u8, coverage: u8) -> Rgba<u8> {
    let keep = (255 - coverage as u32) * under[3] as u32;
    let put = coverage as u32 * alpha as u32;
    let weight = keep + put;
    if weight == 0 {
        return Rgba([0, 0, 0, 0]);
    }

    let channel = |old: u8, new: u8| {
        ((old as u32 * keep + new as u32 * put + weight / 2) / weight) as u8
    };
    Rgba([
        channel(under[0], color.r),
        channel(under[1], color.g),
        channel(under[2], color.b),
        ((weight + 127) / 255) as u8,
    ])
}

/// Draw an opaque mask straight onto an RGB image.
///
/// Produces the same pixels as stamping onto a transparent layer at full
/// alpha and compositing that layer.
pub fn draw_text_direct(target: &mut RgbImage, mask: &TextMask, at: PlacementPosition, color: Color) {
    let (tw, th) = (target.width() as i32, target.height() as i32);
    for (mx, my, coverage) in mask.inked() {
        let x = at.x.saturating_add(mx as i32);
        let y = at.y.saturating_add(my as i32);
        if x < 0 || y < 0 || x >= tw || y >= th {
            continue;
        }

        let pixel = target.get_pixel_mut(x as u32, y as u32);
        let Rgb([r, g, b]) = *pixel;
        *pixel = Rgb([
            blend_channel(r, color.r, coverage),
            blend_channel(g, color.g, coverage),
            blend_channel(b, color.b, coverage),
        ]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::watermark::font::FontResolver;
    use crate::watermark::FontStyle;
    use rstest::rstest;

    fn font(size: f32) -> FontHandle {
        FontResolver::builtin_only().resolve(None, size, FontStyle::default())
    }

    fn options(opacity: f32, shadow: bool, stroke: bool) -> TextRenderOptions {
        TextRenderOptions {
            color: Color::white(),
            opacity,
            font_size: 36,
            shadow,
            stroke,
        }
    }

    #[rstest]
    #[case("#FFFFFF", Color::new(255, 255, 255))]
    #[case("#ff8000", Color::new(255, 128, 0))]
    #[case("00FF7f", Color::new(0, 255, 127))]
    #[case(" #123456 ", Color::new(0x12, 0x34, 0x56))]
    fn test_parse_hex_color_valid(#[case] input: &str, #[case] expected: Color) {
        assert_eq!(parse_hex_color(input).unwrap(), expected);
    }

    #[rstest]
    #[case("#ZZZZZZ")]
    #[case("#FFF")]
    #[case("#1234567")]
    #[case("")]
    #[case("#")]
    #[case("#12345G")]
    fn test_parse_hex_color_invalid(#[case] input: &str) {
        assert!(matches!(
            parse_hex_color(input),
            Err(WatermarkError::InvalidColorFormat(_))
        ));
    }

    #[test]
    fn test_color_to_hex() {
        assert_eq!(Color::new(255, 128, 0).to_hex(), "#FF8000");
        assert_eq!(parse_hex_color(&Color::black().to_hex()).unwrap(), Color::black());
    }

    #[test]
    fn test_measure_matches_mask() {
        let font = font(36.0);
        let mask = rasterize_text("2025-04-05", &font);
        assert!(!mask.is_empty());
        assert_eq!(measure_text("2025-04-05", &font), (mask.width(), mask.height()));
    }

    #[test]
    fn test_mask_is_tight() {
        let mask = rasterize_text("Hg", &font(40.0));
        let top_row = (0..mask.width()).any(|x| mask.get(x, 0) > 0);
        let bottom_row = (0..mask.width()).any(|x| mask.get(x, mask.height() - 1) > 0);
        let left_col = (0..mask.height()).any(|y| mask.get(0, y) > 0);
        let right_col = (0..mask.height()).any(|y| mask.get(mask.width() - 1, y) > 0);
        assert!(top_row && bottom_row && left_col && right_col);
    }

    #[test]
    fn test_longer_text_is_wider() {
        let font = font(24.0);
        let (short, _) = measure_text("2025", &font);
        let (long, _) = measure_text("2025-04-05", &font);
        assert!(long > short);
    }

    #[test]
    fn test_empty_and_blank_text() {
        let font = font(24.0);
        assert_eq!(measure_text("", &font), (0, 0));
        assert_eq!(measure_text("   ", &font), (0, 0));
    }

    #[test]
    fn test_synthetic_styles_widen_mask() {
        let resolver = FontResolver::builtin_only();
        let regular = rasterize_text("Date", &resolver.resolve(None, 36.0, FontStyle::default()));
        let bold = rasterize_text("Date", &resolver.resolve(None, 36.0, FontStyle::new(true, false)));
        let italic = rasterize_text("Date", &resolver.resolve(None, 36.0, FontStyle::new(false, true)));

        assert!(bold.width() > regular.width());
        assert_eq!(bold.height(), regular.height());
        assert!(italic.width() > regular.width());
        assert_eq!(italic.height(), regular.height());
    }

    #[test]
    fn test_effect_sizes() {
        assert_eq!(shadow_offset(10), 1);
        assert_eq!(shadow_offset(36), 1);
        assert_eq!(shadow_offset(60), 3);
        assert_eq!(stroke_radius(29), 1);
        assert_eq!(stroke_radius(90), 3);
    }

    #[test]
    fn test_alpha_rounds() {
        assert_eq!(options(1.0, false, false).alpha(), 255);
        assert_eq!(options(0.5, false, false).alpha(), 128);
        assert_eq!(options(0.0, false, false).alpha(), 0);
    }

    #[test]
    fn test_needs_layer() {
        assert!(!options(1.0, false, false).needs_layer());
        assert!(options(0.99, false, false).needs_layer());
        assert!(options(1.0, true, false).needs_layer());
        assert!(options(1.0, false, true).needs_layer());
    }

    #[test]
    fn test_render_text_plain_layer_matches_coverage() {
        let mask = rasterize_text("42", &font(30.0));
        let layer = render_text(&mask, &options(1.0, false, false));

        assert_eq!(layer.dimensions(), (mask.width(), mask.height()));
        for y in 0..mask.height() {
            for x in 0..mask.width() {
                let pixel = layer.get_pixel(x, y);
                assert_eq!(pixel[3], mask.get(x, y));
                if pixel[3] > 0 {
                    assert_eq!(&pixel.0[..3], &[255, 255, 255]);
                }
            }
        }
    }

    #[test]
    fn test_render_text_applies_opacity() {
        let mask = rasterize_text("8", &font(40.0));
        let layer = render_text(&mask, &options(0.5, false, false));
        let max_alpha = layer.pixels().map(|p| p[3]).max().unwrap();
        assert_eq!(max_alpha, 128);
    }

    #[rstest]
    #[case(0.5, false, true)]
    #[case(0.5, true, false)]
    #[case(0.5, true, true)]
    #[case(0.3, false, true)]
    fn test_effects_keep_main_text_opacity(
        #[case] opacity: f32,
        #[case] shadow: bool,
        #[case] stroke: bool,
    ) {
        let mask = rasterize_text("I", &font(60.0));
        let opts = TextRenderOptions {
            font_size: 60,
            ..options(opacity, shadow, stroke)
        };
        let alpha = opts.alpha();
        let pad = opts.padding();
        let layer = render_text(&mask, &opts);

        let (mx, my) = (0..mask.height())
            .flat_map(|y| (0..mask.width()).map(move |x| (x, y)))
            .find(|&(x, y)| mask.get(x, y) == 255)
            .unwrap();
        assert_eq!(
            *layer.get_pixel(mx + pad, my + pad),
            Rgba([255, 255, 255, alpha])
        );
        assert!(layer.pixels().all(|p| p[3] <= alpha));
    }

    #[test]
    fn test_paint_replaces_instead_of_accumulating() {
        let mask = rasterize_text("O", &font(30.0));
        let mut layer = RgbaImage::new(mask.width(), mask.height());
        for _ in 0..8 {
            paint_mask(&mut layer, &mask, PlacementPosition::new(0, 0), Color::black(), 100);
        }
        assert!(layer.pixels().all(|p| p[3] <= 100));
        assert!(layer.pixels().any(|p| p[3] == 100));
    }

    #[test]
    fn test_paint_on_clear_layer_keeps_pure_color() {
        let mask = rasterize_text("S", &font(30.0));
        let mut layer = RgbaImage::new(mask.width(), mask.height());
        paint_mask(
            &mut layer,
            &mask,
            PlacementPosition::new(0, 0),
            Color::new(200, 40, 10),
            255,
        );
        for (x, y, p) in layer.enumerate_pixels() {
            assert_eq!(p[3], mask.get(x, y));
            if p[3] > 0 {
                assert_eq!(&p.0[..3], &[200, 40, 10]);
            }
        }
    }

    #[test]
    fn test_shadow_is_drawn_below_and_right() {
        let mask = rasterize_text("I", &font(40.0));
        let opts = options(1.0, true, false);
        let pad = opts.padding();
        let layer = render_text(&mask, &opts);

        assert_eq!(pad, 1);
        assert_eq!(layer.width(), mask.width() + 2);
        // Bottom-right corner region only has shadow
        let shadow_pixels = layer
            .enumerate_pixels()
            .filter(|(x, y, p)| {
                p[3] > 0 && (*x >= pad + mask.width() || *y >= pad + mask.height())
            })
            .count();
        assert!(shadow_pixels > 0);
        for (x, y, p) in layer.enumerate_pixels() {
            if p[3] > 0 && (x >= pad + mask.width() || y >= pad + mask.height()) {
                assert_eq!(&p.0[..3], &[0, 0, 0]);
                assert!(p[3] <= 127);
            }
        }
    }

    #[test]
    fn test_stroke_surrounds_text() {
        let mask = rasterize_text("O", &font(36.0));
        let opts = TextRenderOptions {
            color: Color::new(255, 0, 0),
            ..options(1.0, false, true)
        };
        let layer = render_text(&mask, &opts);

        assert_eq!(opts.padding(), 1);
        // Column 0 is only reachable by the outline
        let left_edge: Vec<_> = (0..layer.height())
            .map(|y| layer.get_pixel(0, y))
            .filter(|p| p[3] > 0)
            .collect();
        assert!(!left_edge.is_empty());
        assert!(left_edge.iter().all(|p| p[0] == 0 && p[1] == 0 && p[2] == 0));
        // Main text still on top
        assert!(layer.pixels().any(|p| p[0] == 255 && p[3] == 255));
    }

    #[test]
    fn test_direct_draw_equals_layer_composite() {
        let mask = rasterize_text("2025-04-05", &font(36.0));
        let base = RgbImage::from_pixel(400, 100, Rgb([30, 90, 160]));
        let at = PlacementPosition::new(12, 20);

        let mut direct = base.clone();
        draw_text_direct(&mut direct, &mask, at, Color::white());

        let mut layered = image::DynamicImage::ImageRgb8(base).to_rgba8();
        stamp_mask(&mut layered, &mask, at, Color::white(), 255);
        let layered = image::DynamicImage::ImageRgba8(layered).to_rgb8();

        assert_eq!(direct, layered);
    }

    #[test]
    fn test_stamp_clips_at_edges() {
        let mask = rasterize_text("W", &font(30.0));
        let mut target = RgbaImage::new(10, 10);
        stamp_mask(
            &mut target,
            &mask,
            PlacementPosition::new(-5, -5),
            Color::white(),
            255,
        );
        stamp_mask(
            &mut target,
            &mask,
            PlacementPosition::new(100, 100),
            Color::white(),
            255,
        );
        paint_mask(
            &mut target,
            &mask,
            PlacementPosition::new(i32::MAX - 3, i32::MIN),
            Color::white(),
            255,
        );
        assert_eq!(target.dimensions(), (10, 10));
    }
}
