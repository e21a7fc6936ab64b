// Template files and the template store

use photomark::config::{TemplateStore, WatermarkTemplate, TEMPLATES_FILE};
use photomark::output::{NamingRule, OutputFormat, ResizeMode};
use photomark::watermark::{Color, WatermarkPosition};
use std::io::Write;
use tempfile::{NamedTempFile, TempDir};

#[test]
fn test_config_file_to_settings() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(
        file,
        r##"
name: evening
font_size: 28
color: "#FF8800"
position: top-left
opacity: 0.75
shadow: true
output_format: png
naming_rule: prefix
custom_prefix: "eve_"
resize_mode: height
resize_height: 720
"##
    )
    .unwrap();

    let template = WatermarkTemplate::from_file(file.path()).unwrap();
    let spec = template.to_spec().unwrap();
    let policy = template.to_policy().unwrap();

    assert_eq!(template.name, "evening");
    assert_eq!(spec.font_size(), 28);
    assert_eq!(spec.color(), Color::new(0xFF, 0x88, 0x00));
    assert_eq!(spec.position(), WatermarkPosition::TopLeft);
    assert!(spec.shadow());
    assert_eq!(policy.output_format, OutputFormat::Png);
    assert_eq!(policy.naming_rule, NamingRule::Prefix);
    assert_eq!(policy.custom_prefix, "eve_");
    assert_eq!(policy.resize, ResizeMode::Height(720));
}

#[test]
fn test_json_config_is_accepted() {
    let template = WatermarkTemplate::from_yaml_with_env(
        r#"{"name": "json", "position": "居中", "rotation": -15.5}"#,
    )
    .unwrap();
    let spec = template.to_spec().unwrap();
    assert_eq!(spec.position(), WatermarkPosition::Center);
    assert_eq!(spec.rotation(), -15.5);
}

#[test]
fn test_missing_config_file() {
    let err = WatermarkTemplate::from_file("/nonexistent/photomark.yaml").unwrap_err();
    assert!(err.to_string().contains("Failed to read config file"));
}

#[test]
fn test_store_reads_existing_template_file() {
    let dir = TempDir::new().unwrap();
    std::fs::write(
        dir.path().join(TEMPLATES_FILE),
        r##"{"templates": [{"name": "默认模板"}, {"name": "logo", "image_watermark_path": "/tmp/logo.png", "image_watermark_scale": 0.5, "font_path": ""}]}"##,
    )
    .unwrap();

    let store = TemplateStore::new(dir.path());
    let logo = store.get("logo").unwrap();
    let spec = logo.to_spec().unwrap();
    assert_eq!(
        spec.image_watermark_path(),
        Some(std::path::Path::new("/tmp/logo.png"))
    );
    assert_eq!(spec.image_watermark_scale(), 0.5);
    assert_eq!(spec.font_path(), None);
}

#[test]
fn test_store_round_trips_settings() {
    let dir = TempDir::new().unwrap();
    let store = TemplateStore::new(dir.path().join("nested"));

    let mut template = WatermarkTemplate::named("bold");
    template.font_style_bold = true;
    template.stroke = true;
    template.jpeg_quality = 80;
    store.save(&template).unwrap();

    let loaded = store.get("bold").unwrap();
    assert_eq!(loaded, template);
    assert_eq!(loaded.to_policy().unwrap().jpeg_quality, 80);
}
