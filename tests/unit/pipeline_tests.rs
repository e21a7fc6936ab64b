// End-to-end watermarking: load, render, resize, save, decode back

use image::{DynamicImage, Rgb, RgbImage, Rgba, RgbaImage};
use photomark::output::{NamingRule, OutputFormat, OutputPolicy, ResizeMode};
use photomark::watermark::{
    measure_text, FontResolver, FontStyle, WatermarkPosition, WatermarkProcessor, WatermarkSpec,
};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const BASE: Rgb<u8> = Rgb([20, 40, 60]);

fn processor() -> WatermarkProcessor {
    WatermarkProcessor::with_font_resolver(FontResolver::builtin_only())
}

fn create_test_image(dir: &Path, name: &str, width: u32, height: u32) -> PathBuf {
    let path = dir.join(name);
    RgbImage::from_pixel(width, height, BASE).save(&path).unwrap();
    path
}

fn png_policy() -> OutputPolicy {
    OutputPolicy {
        naming_rule: NamingRule::Original,
        output_format: OutputFormat::Png,
        ..OutputPolicy::default()
    }
}

fn changed_bounds(image: &RgbImage) -> Option<(u32, u32, u32, u32)> {
    image
        .enumerate_pixels()
        .filter(|(_, _, p)| **p != BASE)
        .fold(None, |bounds, (x, y, _)| {
            Some(match bounds {
                None => (x, y, x, y),
                Some((x0, y0, x1, y1)) => (x0.min(x), y0.min(y), x1.max(x), y1.max(y)),
            })
        })
}

#[test]
fn test_date_watermark_bottom_right() {
    let dir = TempDir::new().unwrap();
    let input = create_test_image(dir.path(), "photo.png", 800, 600);
    let spec = WatermarkSpec::builder()
        .font_size(36)
        .color("#FFFFFF")
        .position(WatermarkPosition::BottomRight)
        .build()
        .unwrap();

    let saved = processor()
        .process_single_image(&input, "2025-04-05", &dir.path().join("out"), &spec, &png_policy())
        .unwrap();
    assert_eq!(saved, dir.path().join("out").join("photo.png"));

    let output = image::open(&saved).unwrap();
    assert!(!output.color().has_alpha());
    let rgb = output.to_rgb8();
    assert_eq!(rgb.dimensions(), (800, 600));

    let font = FontResolver::builtin_only().resolve(None, 36.0, FontStyle::default());
    let (w, h) = measure_text("2025-04-05", &font);
    let (x0, y0, x1, y1) = changed_bounds(&rgb).unwrap();
    assert_eq!((x0, y0), (800 - w - 20, 600 - h - 20));
    assert_eq!((x1, y1), (779, 579));
}

#[test]
fn test_every_preset_stays_inside_margin() {
    let processor = processor();
    let base = DynamicImage::ImageRgb8(RgbImage::from_pixel(640, 480, BASE));

    for position in WatermarkPosition::PRESETS {
        let spec = WatermarkSpec::builder()
            .text("Sample")
            .position(position)
            .build()
            .unwrap();
        let out = processor.apply(photomark::watermark::BaseImage::new(base.clone()), &spec, "");
        let (x0, y0, x1, y1) = changed_bounds(out.as_rgb8().unwrap()).unwrap();

        assert!(x0 >= 20 && y0 >= 20, "{}: starts at ({}, {})", position, x0, y0);
        assert!(x1 < 620 && y1 < 460, "{}: ends at ({}, {})", position, x1, y1);
    }
}

#[test]
fn test_rgba_source_keeps_transparency_in_png() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("sticker.png");
    RgbaImage::from_pixel(300, 200, Rgba([0, 0, 0, 0]))
        .save(&input)
        .unwrap();

    let spec = WatermarkSpec::builder()
        .text("Soft")
        .opacity(0.5)
        .shadow(true)
        .build()
        .unwrap();
    let saved = processor()
        .process_single_image(&input, "", &dir.path().join("out"), &spec, &png_policy())
        .unwrap();

    let output = image::open(&saved).unwrap();
    assert!(output.color().has_alpha());
    let rgba = output.to_rgba8();
    assert_eq!(rgba.get_pixel(0, 0)[3], 0);
    assert!(rgba.pixels().any(|p| p[3] > 0 && p[3] < 255));
}

#[test]
fn test_rgba_source_saved_as_jpeg_is_opaque_white() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("sticker.png");
    RgbaImage::from_pixel(120, 80, Rgba([0, 0, 0, 0]))
        .save(&input)
        .unwrap();

    let policy = OutputPolicy {
        output_format: OutputFormat::Jpeg,
        jpeg_quality: 100,
        ..OutputPolicy::default()
    };
    let saved = processor()
        .process_single_image(&input, "2025-01-01", dir.path(), &WatermarkSpec::default(), &policy)
        .unwrap();
    assert_eq!(saved.file_name().unwrap(), "sticker_watermarked.jpg");

    let output = image::open(&saved).unwrap();
    assert!(!output.color().has_alpha());
    assert!(output.to_rgb8().get_pixel(2, 2).0.iter().all(|&c| c > 240));
}

#[test]
fn test_missing_image_watermark_falls_back_to_text() {
    let dir = TempDir::new().unwrap();
    let input = create_test_image(dir.path(), "photo.png", 300, 200);
    let spec = WatermarkSpec::builder()
        .image_watermark(dir.path().join("no_such_logo.png"))
        .build()
        .unwrap();

    let saved = processor()
        .process_single_image(&input, "2025-04-05", &dir.path().join("out"), &spec, &png_policy())
        .unwrap();

    let text_only = processor()
        .apply(
            photomark::watermark::BaseImage::new(DynamicImage::ImageRgb8(RgbImage::from_pixel(
                300, 200, BASE,
            ))),
            &WatermarkSpec::default(),
            "2025-04-05",
        )
        .to_rgb8();
    assert_eq!(image::open(&saved).unwrap().to_rgb8(), text_only);
}

#[test]
fn test_image_watermark_top_left() {
    let dir = TempDir::new().unwrap();
    let input = create_test_image(dir.path(), "photo.png", 200, 150);
    let logo = dir.path().join("logo.png");
    RgbaImage::from_pixel(30, 10, Rgba([255, 0, 0, 255]))
        .save(&logo)
        .unwrap();

    let spec = WatermarkSpec::builder()
        .text("ignored when the logo loads")
        .image_watermark(&logo)
        .position(WatermarkPosition::TopLeft)
        .build()
        .unwrap();
    let saved = processor()
        .process_single_image(&input, "", &dir.path().join("out"), &spec, &png_policy())
        .unwrap();

    let rgb = image::open(&saved).unwrap().to_rgb8();
    assert_eq!(changed_bounds(&rgb), Some((20, 20, 49, 29)));
    assert_eq!(rgb.get_pixel(30, 25), &Rgb([255, 0, 0]));
}

#[test]
fn test_resize_after_watermark() {
    let dir = TempDir::new().unwrap();
    let input = create_test_image(dir.path(), "big.png", 800, 600);
    let policy = OutputPolicy {
        resize: ResizeMode::Width(400),
        ..png_policy()
    };

    let saved = processor()
        .process_single_image(&input, "2025-04-05", &dir.path().join("out"), &WatermarkSpec::default(), &policy)
        .unwrap();
    let output = image::open(&saved).unwrap();
    assert_eq!((output.width(), output.height()), (400, 300));
}

#[test]
fn test_rotated_image_watermark_keeps_base_size() {
    let dir = TempDir::new().unwrap();
    let input = create_test_image(dir.path(), "photo.png", 240, 160);
    let logo = dir.path().join("logo.png");
    RgbaImage::from_pixel(40, 12, Rgba([0, 255, 0, 255]))
        .save(&logo)
        .unwrap();

    let spec = WatermarkSpec::builder()
        .image_watermark(&logo)
        .position(WatermarkPosition::Center)
        .rotation(45.0)
        .build()
        .unwrap();
    let saved = processor()
        .process_single_image(&input, "", &dir.path().join("out"), &spec, &png_policy())
        .unwrap();

    let rgb = image::open(&saved).unwrap().to_rgb8();
    assert_eq!(rgb.dimensions(), (240, 160));
    assert_eq!(rgb.get_pixel(120, 80), &Rgb([0, 255, 0]));
    // A 45 degree turn makes the ink taller than the unrotated 12px logo
    let (_, y0, _, y1) = changed_bounds(&rgb).unwrap();
    assert!(y1 - y0 > 20);
}

#[test]
fn test_corrupt_input_is_an_error() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("broken.jpg");
    std::fs::write(&input, b"not a jpeg").unwrap();

    let err = processor()
        .process_single_image(&input, "", dir.path(), &WatermarkSpec::default(), &png_policy())
        .unwrap_err();
    assert!(err.to_string().contains("broken.jpg"));
}
