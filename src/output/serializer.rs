//! Format-aware writer for watermarked images.

use image::DynamicImage;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use super::encoder::EncoderFactory;
use super::error::OutputError;
use super::format::{OutputFormat, TargetFormat};
use super::naming::{output_filename, OutputPolicy};

/// Encode `image` and write it into `output_dir`, returning the written path.
///
/// The directory is created when missing. The encoder follows the output
/// file's extension; an extension no encoder handles is written as JPEG.
pub fn save(
    image: &DynamicImage,
    original_path: &Path,
    output_dir: &Path,
    policy: &OutputPolicy,
) -> Result<PathBuf, OutputError> {
    fs::create_dir_all(output_dir).map_err(|e| OutputError::save(output_dir, e))?;

    if policy.output_format == OutputFormat::Auto {
        let source_ext = original_path.extension().and_then(|e| e.to_str());
        if source_ext.and_then(TargetFormat::from_extension).is_none() {
            warn!(
                path = %original_path.display(),
                extension = source_ext.unwrap_or(""),
                "Unsupported output extension, writing JPEG"
            );
        }
    }

    let output_path = output_dir.join(output_filename(original_path, policy));
    let format = policy.target_format(&output_path);
    let encoder = EncoderFactory::create(format);

    debug!(
        path = %output_path.display(),
        format = format.name(),
        quality = policy.jpeg_quality,
        "Encoding output image"
    );

    let data = encoder.encode(image, policy.jpeg_quality)?;
    fs::write(&output_path, data).map_err(|e| OutputError::save(&output_path, e))?;

    Ok(output_path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::NamingRule;
    use image::{Rgba, RgbaImage};
    use tempfile::TempDir;

    fn create_test_image() -> DynamicImage {
        DynamicImage::ImageRgba8(RgbaImage::from_fn(6, 6, |x, _| {
            if x < 3 {
                Rgba([10, 200, 10, 255])
            } else {
                Rgba([10, 200, 10, 0])
            }
        }))
    }

    #[test]
    fn test_save_creates_directory() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("nested").join("out");

        let path = save(
            &create_test_image(),
            Path::new("/photos/a.png"),
            &out,
            &OutputPolicy::default(),
        )
        .unwrap();

        assert_eq!(path, out.join("a_watermarked.png"));
        assert!(path.is_file());
    }

    #[test]
    fn test_save_is_idempotent_on_existing_directory() {
        let dir = TempDir::new().unwrap();
        let policy = OutputPolicy {
            naming_rule: NamingRule::Original,
            ..OutputPolicy::default()
        };

        save(&create_test_image(), Path::new("a.png"), dir.path(), &policy).unwrap();
        let second = save(&create_test_image(), Path::new("a.png"), dir.path(), &policy).unwrap();
        assert_eq!(second, dir.path().join("a.png"));
    }

    #[test]
    fn test_save_unknown_extension_writes_jpeg() {
        let dir = TempDir::new().unwrap();
        let path = save(
            &create_test_image(),
            Path::new("clip.gif"),
            dir.path(),
            &OutputPolicy::default(),
        )
        .unwrap();

        assert_eq!(path.extension().unwrap(), "jpg");
        let bytes = fs::read(&path).unwrap();
        assert!(bytes.starts_with(&[0xFF, 0xD8, 0xFF]));
    }

    #[test]
    fn test_save_forced_png_keeps_alpha() {
        let dir = TempDir::new().unwrap();
        let policy = OutputPolicy {
            output_format: OutputFormat::Png,
            ..OutputPolicy::default()
        };
        let path = save(&create_test_image(), Path::new("a.jpg"), dir.path(), &policy).unwrap();

        let decoded = image::open(&path).unwrap().to_rgba8();
        assert_eq!(decoded.get_pixel(0, 0)[3], 255);
        assert_eq!(decoded.get_pixel(5, 0)[3], 0);
    }

    #[test]
    fn test_save_reports_unwritable_directory() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("file");
        fs::write(&blocker, b"x").unwrap();

        let err = save(
            &create_test_image(),
            Path::new("a.png"),
            &blocker.join("out"),
            &OutputPolicy::default(),
        )
        .unwrap_err();
        assert!(matches!(err, OutputError::Save { .. }));
    }
}
