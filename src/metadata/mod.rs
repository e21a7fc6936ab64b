//! Capture dates and input discovery.
//!
//! The date printed by a text watermark comes from the photo's EXIF data
//! when it has any, otherwise from the file's modification time.

use chrono::{DateTime, Local, NaiveDate};
use std::fs::{self, File};
use std::io::BufReader;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::error::PhotomarkError;

/// Extensions that can carry EXIF capture dates
pub const EXIF_EXTENSIONS: &[&str] = &["jpg", "jpeg", "tiff", "tif"];

/// Extensions picked up when scanning an input directory
pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "tiff", "tif", "png", "bmp", "webp"];

const DATE_FORMAT: &str = "%Y-%m-%d";

fn has_extension(path: &Path, allowed: &[&str]) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| allowed.iter().any(|a| a.eq_ignore_ascii_case(e)))
        .unwrap_or(false)
}

/// Whether `path` has an extension the collector accepts.
pub fn is_supported_image(path: &Path) -> bool {
    has_extension(path, IMAGE_EXTENSIONS)
}

/// Convert an EXIF `YYYY:MM:DD HH:MM:SS` value to `YYYY-MM-DD`.
///
/// Returns `None` for values that are not a real calendar date, such as the
/// all-zero placeholder some cameras write.
pub fn parse_exif_datetime(value: &str) -> Option<String> {
    let date_part = value.trim().split_whitespace().next()?;
    NaiveDate::parse_from_str(date_part, "%Y:%m:%d")
        .ok()
        .map(|date| date.format(DATE_FORMAT).to_string())
}

/// Date stored in the image's EXIF block, preferring `DateTimeOriginal`.
pub fn exif_date(path: &Path) -> Option<String> {
    if !has_extension(path, EXIF_EXTENSIONS) {
        return None;
    }

    let file = File::open(path).ok()?;
    let mut reader = BufReader::new(file);
    let exif = match exif::Reader::new().read_from_container(&mut reader) {
        Ok(exif) => exif,
        Err(e) => {
            debug!(path = %path.display(), error = %e, "No readable EXIF data");
            return None;
        }
    };

    [exif::Tag::DateTimeOriginal, exif::Tag::DateTime]
        .into_iter()
        .filter_map(|tag| exif.get_field(tag, exif::In::PRIMARY))
        .find_map(|field| match &field.value {
            exif::Value::Ascii(parts) => parts
                .first()
                .and_then(|raw| std::str::from_utf8(raw).ok())
                .and_then(parse_exif_datetime),
            _ => None,
        })
}

/// Local modification date of the file.
pub fn modification_date(path: &Path) -> Option<String> {
    let modified = fs::metadata(path).and_then(|m| m.modified()).ok()?;
    Some(DateTime::<Local>::from(modified).format(DATE_FORMAT).to_string())
}

/// Date used when a text watermark has no custom text.
///
/// EXIF capture date, then file modification date, then today.
pub fn capture_date(path: &Path) -> String {
    if let Some(date) = exif_date(path) {
        return date;
    }

    warn!(
        path = %path.display(),
        "No EXIF capture date, using file modification date"
    );

    modification_date(path).unwrap_or_else(|| Local::now().format(DATE_FORMAT).to_string())
}

/// Supported images at `input`: the file itself, or the supported files
/// directly inside a directory, sorted by path.
pub fn collect_images(input: &Path) -> Result<Vec<PathBuf>, PhotomarkError> {
    if !input.exists() {
        return Err(PhotomarkError::InputNotFound(input.to_path_buf()));
    }

    let mut images = if input.is_file() {
        if is_supported_image(input) {
            vec![input.to_path_buf()]
        } else {
            Vec::new()
        }
    } else {
        let mut found = Vec::new();
        for entry in fs::read_dir(input)? {
            let path = entry?.path();
            if path.is_file() && is_supported_image(&path) {
                found.push(path);
            }
        }
        found
    };

    if images.is_empty() {
        return Err(PhotomarkError::NoImages(input.to_path_buf()));
    }

    images.sort();
    Ok(images)
}

/// `(path, date)` pairs for every supported image at `input`.
pub fn dated_images(input: &Path) -> Result<Vec<(PathBuf, String)>, PhotomarkError> {
    let images = collect_images(input)?;
    Ok(images
        .into_iter()
        .map(|path| {
            let date = capture_date(&path);
            (path, date)
        })
        .collect())
}
