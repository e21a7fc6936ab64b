//! Font resolution.
//!
//! Fonts are looked up through an ordered list of [`FontFamily`] entries and a
//! list of search directories, both injected at construction. An explicit font
//! file always wins. When nothing on the host can be loaded the embedded
//! DejaVu Sans Mono face is used, so resolution never fails.
//!
//! Bold and italic are requested per family through file variants. A style
//! that no variant provides is synthesised by the text rasterizer instead.

use super::FontStyle;
use ab_glyph::{FontArc, FontRef, FontVec};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

static BUILTIN_FONT: OnceLock<FontArc> = OnceLock::new();

const EMBEDDED_FONT_DATA: &[u8] = include_bytes!("fonts/DejaVuSansMono.ttf");

fn builtin_font() -> FontArc {
    BUILTIN_FONT
        .get_or_init(|| {
            let font = FontRef::try_from_slice(EMBEDDED_FONT_DATA)
                .expect("Failed to load embedded font - this is a bug");
            FontArc::new(font)
        })
        .clone()
}

/// Raw bytes of the embedded fallback font.
pub fn embedded_font_data() -> &'static [u8] {
    EMBEDDED_FONT_DATA
}

/// One font family and the file names of its style variants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FontFamily {
    pub name: String,
    pub regular: String,
    pub bold: Option<String>,
    pub italic: Option<String>,
    pub bold_italic: Option<String>,
}

impl FontFamily {
    pub fn new(name: impl Into<String>, regular: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            regular: regular.into(),
            bold: None,
            italic: None,
            bold_italic: None,
        }
    }

    pub fn with_bold(mut self, file: impl Into<String>) -> Self {
        self.bold = Some(file.into());
        self
    }

    pub fn with_italic(mut self, file: impl Into<String>) -> Self {
        self.italic = Some(file.into());
        self
    }

    pub fn with_bold_italic(mut self, file: impl Into<String>) -> Self {
        self.bold_italic = Some(file.into());
        self
    }

    /// Files to try for `style`, best match first, each with the style it
    /// actually provides.
    fn candidates(&self, style: FontStyle) -> Vec<(&str, FontStyle)> {
        let variant = match (style.bold, style.italic) {
            (true, true) => self.bold_italic.as_deref(),
            (true, false) => self.bold.as_deref(),
            (false, true) => self.italic.as_deref(),
            (false, false) => None,
        };

        let mut files = Vec::with_capacity(2);
        if let Some(file) = variant {
            files.push((file, style));
        }
        files.push((self.regular.as_str(), FontStyle::default()));
        files
    }
}

/// The default family chain: CJK-capable fonts first, then Latin fonts.
pub fn default_families() -> Vec<FontFamily> {
    vec![
        FontFamily::new("Microsoft YaHei", "msyh.ttc").with_bold("msyhbd.ttc"),
        FontFamily::new("Noto Sans CJK", "NotoSansCJK-Regular.ttc").with_bold("NotoSansCJK-Bold.ttc"),
        FontFamily::new("PingFang", "PingFang.ttc"),
        FontFamily::new("Arial", "arial.ttf")
            .with_bold("arialbd.ttf")
            .with_italic("ariali.ttf")
            .with_bold_italic("arialbi.ttf"),
        FontFamily::new("DejaVu Sans", "DejaVuSans.ttf")
            .with_bold("DejaVuSans-Bold.ttf")
            .with_italic("DejaVuSans-Oblique.ttf")
            .with_bold_italic("DejaVuSans-BoldOblique.ttf"),
    ]
}

/// Font directories of the host platform.
pub fn platform_font_dirs() -> Vec<PathBuf> {
    let mut dirs = Vec::new();

    if cfg!(target_os = "windows") {
        let windir = std::env::var("WINDIR").unwrap_or_else(|_| "C:\\Windows".to_string());
        dirs.push(Path::new(&windir).join("Fonts"));
    } else if cfg!(target_os = "macos") {
        dirs.push(PathBuf::from("/System/Library/Fonts"));
        dirs.push(PathBuf::from("/System/Library/Fonts/Supplemental"));
        dirs.push(PathBuf::from("/Library/Fonts"));
        if let Ok(home) = std::env::var("HOME") {
            dirs.push(Path::new(&home).join("Library/Fonts"));
        }
    } else {
        for dir in [
            "/usr/share/fonts/truetype/msttcorefonts",
            "/usr/share/fonts/opentype/noto",
            "/usr/share/fonts/noto-cjk",
            "/usr/share/fonts/truetype/dejavu",
            "/usr/share/fonts/TTF",
        ] {
            dirs.push(PathBuf::from(dir));
        }
        if let Ok(home) = std::env::var("HOME") {
            dirs.push(Path::new(&home).join(".fonts"));
            dirs.push(Path::new(&home).join(".local/share/fonts"));
        }
    }

    dirs
}

/// Where a resolved font came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FontSource {
    /// The caller's explicit font file
    Explicit(PathBuf),
    /// A file from the family chain
    Family { family: String, path: PathBuf },
    /// The embedded fallback face
    Builtin,
}

/// A loaded font at a pixel size, plus the styles left to synthesise.
#[derive(Clone)]
pub struct FontHandle {
    font: FontArc,
    size: f32,
    source: FontSource,
    synthetic: FontStyle,
}

impl fmt::Debug for FontHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FontHandle")
            .field("size", &self.size)
            .field("source", &self.source)
            .field("synthetic", &self.synthetic)
            .finish()
    }
}

impl FontHandle {
    /// The embedded face at `size`, synthesising any requested style.
    pub fn builtin(size: f32, style: FontStyle) -> Self {
        Self {
            font: builtin_font(),
            size,
            source: FontSource::Builtin,
            synthetic: style,
        }
    }

    pub fn font(&self) -> &FontArc {
        &self.font
    }

    pub fn size(&self) -> f32 {
        self.size
    }

    pub fn source(&self) -> &FontSource {
        &self.source
    }

    /// Styles the font file does not provide.
    pub fn synthetic(&self) -> FontStyle {
        self.synthetic
    }
}

/// Resolves font requests against a family chain and search directories.
///
/// Loaded faces are cached by path, so a batch reads each font file once.
pub struct FontResolver {
    families: Vec<FontFamily>,
    search_dirs: Vec<PathBuf>,
    cache: RwLock<HashMap<PathBuf, FontArc>>,
}

impl fmt::Debug for FontResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FontResolver")
            .field("families", &self.families.len())
            .field("search_dirs", &self.search_dirs)
            .field("cached", &self.cache.read().len())
            .finish()
    }
}

impl Default for FontResolver {
    fn default() -> Self {
        Self::system_default()
    }
}

impl FontResolver {
    pub fn new(families: Vec<FontFamily>, search_dirs: Vec<PathBuf>) -> Self {
        Self {
            families,
            search_dirs,
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// The default family chain over the platform font directories.
    pub fn system_default() -> Self {
        Self::new(default_families(), platform_font_dirs())
    }

    /// A resolver that only knows explicit paths and the embedded face.
    pub fn builtin_only() -> Self {
        Self::new(Vec::new(), Vec::new())
    }

    pub fn families(&self) -> &[FontFamily] {
        &self.families
    }

    /// Resolve a font. Never fails.
    pub fn resolve(&self, path: Option<&Path>, size: f32, style: FontStyle) -> FontHandle {
        if let Some(path) = path {
            if path.is_file() {
                match self.load(path) {
                    Ok(font) => {
                        tracing::debug!(path = %path.display(), "Using explicit font");
                        return FontHandle {
                            font,
                            size,
                            source: FontSource::Explicit(path.to_path_buf()),
                            synthetic: FontStyle::default(),
                        };
                    }
                    Err(e) => {
                        tracing::warn!(path = %path.display(), error = %e, "Failed to load font file")
                    }
                }
            } else {
                tracing::warn!(path = %path.display(), "Font file not found, using fallback chain");
            }
        }

        for family in &self.families {
            for (file, provided) in family.candidates(style) {
                let Some(found) = self.locate(file) else {
                    continue;
                };
                match self.load(&found) {
                    Ok(font) => {
                        tracing::debug!(
                            family = %family.name,
                            path = %found.display(),
                            "Resolved font from family chain"
                        );
                        return FontHandle {
                            font,
                            size,
                            source: FontSource::Family {
                                family: family.name.clone(),
                                path: found,
                            },
                            synthetic: FontStyle::new(
                                style.bold && !provided.bold,
                                style.italic && !provided.italic,
                            ),
                        };
                    }
                    Err(e) => {
                        tracing::debug!(path = %found.display(), error = %e, "Skipping unreadable font")
                    }
                }
            }
        }

        tracing::debug!("No host font available, using embedded font");
        FontHandle::builtin(size, style)
    }

    fn locate(&self, file: &str) -> Option<PathBuf> {
        let direct = Path::new(file);
        if direct.is_absolute() {
            return direct.is_file().then(|| direct.to_path_buf());
        }

        self.search_dirs
            .iter()
            .map(|dir| dir.join(file))
            .find(|candidate| candidate.is_file())
    }

    fn load(&self, path: &Path) -> Result<FontArc, String> {
        if let Some(font) = self.cache.read().get(path) {
            return Ok(font.clone());
        }

        let data = std::fs::read(path).map_err(|e| e.to_string())?;
        let is_collection = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.eq_ignore_ascii_case("ttc") || ext.eq_ignore_ascii_case("otc"))
            .unwrap_or(false);

        let font = if is_collection {
            FontVec::try_from_vec_and_index(data, 0)
        } else {
            FontVec::try_from_vec(data)
        }
        .map_err(|e| e.to_string())?;

        let font = FontArc::new(font);
        self.cache.write().insert(path.to_path_buf(), font.clone());
        Ok(font)
    }
}
