use anyhow::{bail, Context};
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use photomark::batch::{BatchRunner, ItemOutcome};
use photomark::config::{TemplateStore, WatermarkTemplate};
use photomark::logging::{init_subscriber, LogFormat};
use photomark::metadata::dated_images;
use photomark::output::{
    default_output_dir, validate_output_dir, MAX_RESIZE_PERCENT, MIN_RESIZE_PERCENT,
};
use photomark::watermark::{parse_hex_color, WatermarkProcessor};

/// Photomark - add capture-date, text or logo watermarks to photos
#[derive(Parser, Debug)]
#[command(name = "photomark")]
#[command(version, about, long_about = None)]
struct Args {
    /// Image file or directory of images
    input: PathBuf,

    /// Font size in pixels
    #[arg(short = 's', long)]
    font_size: Option<u32>,

    /// Text color as #RRGGBB
    #[arg(short, long)]
    color: Option<String>,

    /// Preset position, e.g. bottom_right, top-left or 右下
    #[arg(short, long)]
    position: Option<String>,

    /// TrueType/OpenType font file
    #[arg(short, long)]
    font_path: Option<PathBuf>,

    /// Watermark opacity between 0.0 and 1.0
    #[arg(short, long)]
    opacity: Option<f32>,

    /// Output format: auto, jpeg or png
    #[arg(long)]
    output_format: Option<String>,

    /// Custom text instead of the capture date
    #[arg(long)]
    text: Option<String>,

    #[arg(long)]
    bold: bool,

    #[arg(long)]
    italic: bool,

    /// Draw a drop shadow behind the text
    #[arg(long)]
    shadow: bool,

    /// Outline the text
    #[arg(long)]
    stroke: bool,

    /// Rotation in degrees, counter-clockwise
    #[arg(long, allow_hyphen_values = true)]
    rotation: Option<f32>,

    /// X coordinate of a custom position
    #[arg(long, allow_hyphen_values = true)]
    custom_x: Option<i32>,

    /// Y coordinate of a custom position
    #[arg(long, allow_hyphen_values = true)]
    custom_y: Option<i32>,

    /// Image to use as the watermark instead of text
    #[arg(long)]
    image_watermark: Option<PathBuf>,

    /// Scale factor for the image watermark
    #[arg(long)]
    image_scale: Option<f32>,

    /// Output directory (default: <input dir>/<input dir name>_watermark)
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// File naming rule: original, prefix or suffix
    #[arg(long)]
    naming: Option<String>,

    #[arg(long)]
    prefix: Option<String>,

    #[arg(long)]
    suffix: Option<String>,

    /// JPEG/WebP quality (1-100)
    #[arg(short, long)]
    quality: Option<u8>,

    /// Resize output to this width
    #[arg(long, conflicts_with_all = ["resize_height", "resize_percent"])]
    resize_width: Option<u32>,

    /// Resize output to this height
    #[arg(long, conflicts_with = "resize_percent")]
    resize_height: Option<u32>,

    /// Resize output by a factor (0.1-3.0)
    #[arg(long)]
    resize_percent: Option<f32>,

    /// Start from a saved template
    #[arg(long, conflicts_with = "config")]
    template: Option<String>,

    /// Start from a YAML/JSON template file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Save the resulting settings as a named template
    #[arg(long)]
    save_template: Option<String>,

    #[arg(long, value_enum, default_value_t = LogFormat::Pretty)]
    log_format: LogFormat,
}

impl Args {
    /// Apply command-line values on top of a template.
    fn apply_to(&self, template: &mut WatermarkTemplate) {
        if let Some(size) = self.font_size {
            template.font_size = size;
        }
        if let Some(color) = &self.color {
            template.color = color.clone();
        }
        if let Some(position) = &self.position {
            template.position = position.clone();
        }
        if let Some(path) = &self.font_path {
            template.font_path = path.display().to_string();
        }
        if let Some(opacity) = self.opacity {
            template.opacity = opacity;
        }
        if let Some(format) = &self.output_format {
            template.output_format = format.clone();
        }
        if let Some(text) = &self.text {
            template.custom_text = text.clone();
        }
        template.font_style_bold |= self.bold;
        template.font_style_italic |= self.italic;
        template.shadow |= self.shadow;
        template.stroke |= self.stroke;
        if let Some(rotation) = self.rotation {
            template.rotation = rotation;
        }
        if self.custom_x.is_some() || self.custom_y.is_some() {
            template.position = "custom".to_string();
            template.custom_x = self.custom_x.unwrap_or(0);
            template.custom_y = self.custom_y.unwrap_or(0);
        }
        if let Some(path) = &self.image_watermark {
            template.image_watermark_path = path.display().to_string();
        }
        if let Some(scale) = self.image_scale {
            template.image_watermark_scale = scale;
        }
        if let Some(dir) = &self.output_dir {
            template.output_dir = dir.display().to_string();
        }
        if let Some(naming) = &self.naming {
            template.naming_rule = naming.clone();
        }
        if let Some(prefix) = &self.prefix {
            template.custom_prefix = prefix.clone();
        }
        if let Some(suffix) = &self.suffix {
            template.custom_suffix = suffix.clone();
        }
        if let Some(quality) = self.quality {
            template.jpeg_quality = quality;
        }
        if let Some(width) = self.resize_width {
            template.resize_mode = "width".to_string();
            template.resize_width = width;
        }
        if let Some(height) = self.resize_height {
            template.resize_mode = "height".to_string();
            template.resize_height = height;
        }
        if let Some(percent) = self.resize_percent {
            template.resize_mode = "percent".to_string();
            template.resize_percent = percent;
        }
    }
}

/// Checks the CLI is stricter about than the renderer.
fn validate_template(template: &WatermarkTemplate) -> anyhow::Result<()> {
    if !(0.0..=1.0).contains(&template.opacity) {
        bail!("Opacity must be between 0.0 and 1.0, got {}", template.opacity);
    }
    if template.font_size == 0 {
        bail!("Font size must be greater than 0");
    }
    parse_hex_color(&template.color).context("Invalid --color")?;

    if !template.font_path.trim().is_empty() {
        let font_path = PathBuf::from(template.font_path.trim());
        if !font_path.is_file() {
            bail!("Font file not found: {}", font_path.display());
        }
    }

    if template.resize_mode == "percent"
        && !(MIN_RESIZE_PERCENT..=MAX_RESIZE_PERCENT).contains(&template.resize_percent)
    {
        bail!(
            "Resize percent must be between {} and {}, got {}",
            MIN_RESIZE_PERCENT,
            MAX_RESIZE_PERCENT,
            template.resize_percent
        );
    }

    Ok(())
}

fn load_template(args: &Args, store: &TemplateStore) -> anyhow::Result<WatermarkTemplate> {
    if let Some(path) = &args.config {
        return WatermarkTemplate::from_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()));
    }

    if let Some(name) = &args.template {
        return store
            .get(name)
            .with_context(|| format!("Template '{}' not found in {}", name, store.dir().display()));
    }

    Ok(WatermarkTemplate::default())
}

fn main() -> anyhow::Result<ExitCode> {
    let args = Args::parse();

    if let Err(e) = init_subscriber(args.log_format) {
        eprintln!("Failed to initialize logging: {}", e);
    }

    let store = TemplateStore::default_location();
    let mut template = load_template(&args, &store)?;
    args.apply_to(&mut template);
    validate_template(&template)?;

    let spec = template.to_spec().context("Invalid watermark settings")?;
    let policy = template.to_policy().context("Invalid output settings")?;

    if let Some(name) = &args.save_template {
        let mut named = template.clone();
        named.name = name.clone();
        store
            .save(&named)
            .with_context(|| format!("Failed to save template '{}'", name))?;
        tracing::info!(template = %name, "Template saved");
    }

    let items = dated_images(&args.input)?;

    let output_dir = template
        .output_dir()
        .unwrap_or_else(|| default_output_dir(&args.input));
    if !validate_output_dir(&args.input, &output_dir) {
        bail!(
            "Output directory {} is the input directory; choose another one",
            output_dir.display()
        );
    }

    tracing::info!(
        input = %args.input.display(),
        output_dir = %output_dir.display(),
        images = items.len(),
        position = %spec.position(),
        format = %policy.output_format,
        "Starting watermark batch"
    );

    let cancel = Arc::new(AtomicBool::new(false));
    #[cfg(unix)]
    {
        use signal_hook::consts::SIGINT;
        if let Err(e) = signal_hook::flag::register(SIGINT, Arc::clone(&cancel)) {
            tracing::warn!(error = %e, "Failed to register SIGINT handler");
        }
    }

    let processor = WatermarkProcessor::new();
    let report = BatchRunner::new(&processor, &spec, &policy, &output_dir)
        .with_cancel_flag(cancel)
        .on_progress(|index, total, outcome| match outcome {
            ItemOutcome::Saved { input, output } => println!(
                "[{}/{}] {} -> {}",
                index,
                total,
                input.display(),
                output.display()
            ),
            ItemOutcome::Failed { input, message } => {
                println!("[{}/{}] {} failed: {}", index, total, input.display(), message)
            }
        })
        .run(&items);

    if let Err(e) = store.save_last_session(&template) {
        tracing::warn!(error = %e, "Failed to save last session");
    }

    println!(
        "Done: {} succeeded, {} failed{}",
        report.success_count(),
        report.failure_count(),
        if report.cancelled { " (cancelled)" } else { "" }
    );

    if report.failure_count() > 0 || report.cancelled {
        Ok(ExitCode::FAILURE)
    } else {
        Ok(ExitCode::SUCCESS)
    }
}
