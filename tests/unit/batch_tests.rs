// Batch processing over a directory of images

use image::{Rgb, RgbImage};
use photomark::batch::{BatchRunner, ItemOutcome};
use photomark::metadata::dated_images;
use photomark::output::{default_output_dir, OutputPolicy};
use photomark::watermark::{FontResolver, WatermarkProcessor, WatermarkSpec};
use tempfile::TempDir;

#[test]
fn test_directory_batch_writes_every_image() {
    let dir = TempDir::new().unwrap();
    for name in ["one.png", "two.jpg", "three.bmp"] {
        RgbImage::from_pixel(160, 90, Rgb([200, 200, 200]))
            .save(dir.path().join(name))
            .unwrap();
    }
    std::fs::write(dir.path().join("four.jpg"), b"corrupt").unwrap();

    let items = dated_images(dir.path()).unwrap();
    assert_eq!(items.len(), 4);

    let processor = WatermarkProcessor::with_font_resolver(FontResolver::builtin_only());
    let spec = WatermarkSpec::builder()
        .text("© photomark")
        .stroke(true)
        .build()
        .unwrap();
    let policy = OutputPolicy::default();
    let output_dir = default_output_dir(dir.path());

    let report = BatchRunner::new(&processor, &spec, &policy, &output_dir).run(&items);

    assert_eq!(report.success_count(), 3);
    assert_eq!(report.failure_count(), 1);
    match &report.failed[0] {
        ItemOutcome::Failed { input, message } => {
            assert!(input.ends_with("four.jpg"));
            assert!(message.contains("four.jpg"));
        }
        other => panic!("unexpected outcome {:?}", other),
    }

    for name in [
        "one_watermarked.png",
        "two_watermarked.jpg",
        "three_watermarked.bmp",
    ] {
        assert!(output_dir.join(name).is_file(), "{} missing", name);
    }
}
