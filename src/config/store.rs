//! JSON persistence for templates and the last session.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use super::{WatermarkTemplate, DEFAULT_TEMPLATE_NAME};
use crate::error::PhotomarkError;

pub const TEMPLATES_FILE: &str = "templates.json";
pub const LAST_SESSION_FILE: &str = "last_session.json";
const STORE_DIR_NAME: &str = ".photo_watermark";

#[derive(Debug, Default, Serialize, Deserialize)]
struct TemplateFile {
    #[serde(default)]
    templates: Vec<WatermarkTemplate>,
}

/// Named templates plus the settings of the last run, kept in one directory.
#[derive(Debug, Clone)]
pub struct TemplateStore {
    dir: PathBuf,
}

impl TemplateStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Store under `~/.photo_watermark`, or `./.photo_watermark` when no home
    /// directory is known.
    pub fn default_location() -> Self {
        let home = std::env::var_os("HOME")
            .or_else(|| std::env::var_os("USERPROFILE"))
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("."));
        Self::new(home.join(STORE_DIR_NAME))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn templates_path(&self) -> PathBuf {
        self.dir.join(TEMPLATES_FILE)
    }

    fn last_session_path(&self) -> PathBuf {
        self.dir.join(LAST_SESSION_FILE)
    }

    fn write_json<T: Serialize>(&self, path: &Path, value: &T) -> Result<(), PhotomarkError> {
        fs::create_dir_all(&self.dir)?;
        let json = serde_json::to_string_pretty(value)
            .map_err(|e| PhotomarkError::Config(format!("Failed to serialize: {}", e)))?;
        fs::write(path, json)?;
        Ok(())
    }

    /// All stored templates, or the default template when nothing usable is stored.
    pub fn templates(&self) -> Vec<WatermarkTemplate> {
        let path = self.templates_path();
        let contents = match fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(_) => return vec![WatermarkTemplate::default()],
        };

        match serde_json::from_str::<TemplateFile>(&contents) {
            Ok(file) if !file.templates.is_empty() => file.templates,
            Ok(_) => vec![WatermarkTemplate::default()],
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Template file unreadable, using default");
                vec![WatermarkTemplate::default()]
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<WatermarkTemplate> {
        self.templates().into_iter().find(|t| t.name == name)
    }

    /// Insert `template`, replacing a stored one with the same name.
    pub fn save(&self, template: &WatermarkTemplate) -> Result<(), PhotomarkError> {
        let mut templates = self.templates();
        match templates.iter_mut().find(|t| t.name == template.name) {
            Some(existing) => *existing = template.clone(),
            None => templates.push(template.clone()),
        }

        self.write_json(&self.templates_path(), &TemplateFile { templates })?;
        debug!(name = %template.name, "Template saved");
        Ok(())
    }

    /// Remove a template by name. The default template is never removed.
    pub fn delete(&self, name: &str) -> Result<bool, PhotomarkError> {
        if name == DEFAULT_TEMPLATE_NAME {
            return Ok(false);
        }

        let templates = self.templates();
        let before = templates.len();
        let remaining: Vec<_> = templates.into_iter().filter(|t| t.name != name).collect();
        if remaining.len() == before || remaining.is_empty() {
            return Ok(false);
        }

        self.write_json(&self.templates_path(), &TemplateFile { templates: remaining })?;
        debug!(name, "Template deleted");
        Ok(true)
    }

    /// Rename a stored template in place, keeping its position in the list.
    ///
    /// Returns `Ok(false)` when there is nothing to rename: the default
    /// template, an unknown name, or a blank or unchanged new name. Taking a
    /// name that is already used is an error.
    pub fn rename(&self, old_name: &str, new_name: &str) -> Result<bool, PhotomarkError> {
        let new_name = new_name.trim();
        if old_name == DEFAULT_TEMPLATE_NAME || new_name.is_empty() || new_name == old_name {
            return Ok(false);
        }

        let mut templates = self.templates();
        if new_name == DEFAULT_TEMPLATE_NAME || templates.iter().any(|t| t.name == new_name) {
            return Err(PhotomarkError::Config(format!(
                "Template '{}' already exists",
                new_name
            )));
        }

        let Some(template) = templates.iter_mut().find(|t| t.name == old_name) else {
            return Ok(false);
        };
        template.name = new_name.to_string();

        self.write_json(&self.templates_path(), &TemplateFile { templates })?;
        debug!(old_name, new_name, "Template renamed");
        Ok(true)
    }

    pub fn load_last_session(&self) -> Option<WatermarkTemplate> {
        let path = self.last_session_path();
        let contents = fs::read_to_string(&path).ok()?;
        match serde_json::from_str(&contents) {
            Ok(template) => Some(template),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Last session unreadable");
                None
            }
        }
    }

    pub fn save_last_session(&self, template: &WatermarkTemplate) -> Result<(), PhotomarkError> {
        self.write_json(&self.last_session_path(), template)
    }
}
