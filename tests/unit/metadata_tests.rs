// Input discovery and date fallback

use photomark::metadata::{capture_date, collect_images, dated_images, parse_exif_datetime};
use photomark::PhotomarkError;
use tempfile::TempDir;

#[test]
fn test_directory_scan_is_sorted_and_filtered() {
    let dir = TempDir::new().unwrap();
    for name in ["c.webp", "a.TIF", "b.bmp", "skip.gif", "skip.txt"] {
        std::fs::write(dir.path().join(name), b"x").unwrap();
    }

    let images = collect_images(dir.path()).unwrap();
    let names: Vec<_> = images
        .iter()
        .map(|p| p.file_name().unwrap().to_str().unwrap())
        .collect();
    assert_eq!(names, vec!["a.TIF", "b.bmp", "c.webp"]);
}

#[test]
fn test_unsupported_single_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("clip.gif");
    std::fs::write(&path, b"x").unwrap();

    assert!(matches!(collect_images(&path), Err(PhotomarkError::NoImages(_))));
}

#[test]
fn test_dates_are_iso_formatted() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("no_exif.jpg");
    std::fs::write(&path, b"x").unwrap();

    let date = capture_date(&path);
    assert!(chrono::NaiveDate::parse_from_str(&date, "%Y-%m-%d").is_ok(), "{}", date);

    let pairs = dated_images(dir.path()).unwrap();
    assert_eq!(pairs, vec![(path, date)]);
}

#[test]
fn test_exif_value_conversion() {
    assert_eq!(
        parse_exif_datetime("1999:12:31 23:59:59").as_deref(),
        Some("1999-12-31")
    );
    assert_eq!(parse_exif_datetime("1999:13:01 00:00:00"), None);
}
