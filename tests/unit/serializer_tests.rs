// Output naming, format dispatch and directory validation through the public API

use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
use photomark::output::{
    default_output_dir, output_filename, save, validate_output_dir, NamingRule, OutputFormat,
    OutputPolicy,
};
use rstest::rstest;
use std::path::Path;
use tempfile::TempDir;

fn half_transparent() -> DynamicImage {
    DynamicImage::ImageRgba8(RgbaImage::from_fn(16, 8, |x, _| {
        if x < 8 {
            Rgba([0, 0, 255, 255])
        } else {
            Rgba([0, 0, 255, 0])
        }
    }))
}

#[rstest]
#[case("a.jpg", ImageFormat::Jpeg, false)]
#[case("a.jpeg", ImageFormat::Jpeg, false)]
#[case("a.png", ImageFormat::Png, true)]
#[case("a.tif", ImageFormat::Tiff, true)]
#[case("a.bmp", ImageFormat::Bmp, false)]
#[case("a.webp", ImageFormat::WebP, true)]
#[case("a.gif", ImageFormat::Jpeg, false)]
fn test_auto_format_dispatch(
    #[case] source: &str,
    #[case] expected: ImageFormat,
    #[case] keeps_alpha: bool,
) {
    let dir = TempDir::new().unwrap();
    let saved = save(
        &half_transparent(),
        Path::new(source),
        dir.path(),
        &OutputPolicy::default(),
    )
    .unwrap();

    let bytes = std::fs::read(&saved).unwrap();
    assert_eq!(image::guess_format(&bytes).unwrap(), expected);

    let decoded = image::load_from_memory(&bytes).unwrap();
    assert_eq!(decoded.color().has_alpha(), keeps_alpha, "{}", source);
    if !keeps_alpha {
        let right = decoded.to_rgb8().get_pixel(14, 4).0;
        assert!(right.iter().all(|&c| c > 240), "{}: {:?}", source, right);
    }
}

#[test]
fn test_png_round_trip_preserves_alpha_exactly() {
    let dir = TempDir::new().unwrap();
    let image = DynamicImage::ImageRgba8(RgbaImage::from_fn(8, 8, |x, y| {
        Rgba([x as u8 * 30, y as u8 * 30, 90, (x * 32 + y) as u8])
    }));
    let policy = OutputPolicy {
        output_format: OutputFormat::Png,
        ..OutputPolicy::default()
    };

    let saved = save(&image, Path::new("in.jpg"), dir.path(), &policy).unwrap();
    assert_eq!(image::open(saved).unwrap().to_rgba8(), image.to_rgba8());
}

#[rstest]
#[case(NamingRule::Original, "holiday.jpg")]
#[case(NamingRule::Prefix, "wm_holiday.jpg")]
#[case(NamingRule::Suffix, "holiday_watermarked.jpg")]
fn test_naming_rules(#[case] rule: NamingRule, #[case] expected: &str) {
    let policy = OutputPolicy {
        naming_rule: rule,
        ..OutputPolicy::default()
    };
    assert_eq!(output_filename(Path::new("dir/holiday.jpg"), &policy), expected);
}

#[test]
fn test_output_dir_must_differ_from_input_dir() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("photo.jpg");
    std::fs::write(&input, b"x").unwrap();

    assert!(!validate_output_dir(&input, dir.path()));
    assert!(validate_output_dir(&input, &default_output_dir(&input)));
}
