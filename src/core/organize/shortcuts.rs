//! Shortcut keys that send a file to a folder, persisted as JSON.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

/// Config folder under the home directory
const CONFIG_DIR: &str = ".media-tidy";
const CONFIG_FILE: &str = "shortcuts.json";

/// One key binding
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShortcutConfig {
    /// A single letter or digit
    pub key: char,
    /// Absolute, or relative to the moved file's folder. Empty means the
    /// key is not set up yet.
    pub target_dir: String,
    #[serde(default)]
    pub label: String,
}

impl ShortcutConfig {
    pub fn new(key: char, target_dir: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            key,
            target_dir: target_dir.into(),
            label: label.into(),
        }
    }

    pub fn is_configured(&self) -> bool {
        !self.target_dir.trim().is_empty()
    }

    pub fn matches(&self, key: char) -> bool {
        self.key.to_lowercase().eq(key.to_lowercase())
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct ShortcutsFile {
    shortcuts: Vec<ShortcutConfig>,
}

/// Bindings used until the user saves their own
pub fn default_shortcuts() -> Vec<ShortcutConfig> {
    vec![
        ShortcutConfig::new('1', "", "Category 1"),
        ShortcutConfig::new('2', "", "Category 2"),
        ShortcutConfig::new('3', "", "Category 3"),
        ShortcutConfig::new('d', ".delete", "To delete"),
        ShortcutConfig::new('s', ".star", "Favorites"),
    ]
}

/// Where the target folder of a binding points for a given file.
///
/// Relative folders are taken from the file's own folder.
pub fn resolve_target_dir(source_file: &Path, target_dir: &str) -> PathBuf {
    let target = Path::new(target_dir);
    if target.is_absolute() {
        return target.to_path_buf();
    }
    source_file
        .parent()
        .unwrap_or_else(|| Path::new("."))
        .join(target)
}

/// Reads and writes the shortcut file
#[derive(Debug, Clone)]
pub struct ShortcutStore {
    path: PathBuf,
}

impl ShortcutStore {
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `~/.media-tidy/shortcuts.json`
    pub fn default_location() -> Result<Self, ConfigError> {
        let home = dirs::home_dir().ok_or(ConfigError::NoHomeDirectory)?;
        Ok(Self::open(home.join(CONFIG_DIR).join(CONFIG_FILE)))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Current bindings, or the defaults if the file is missing or broken
    pub fn load(&self) -> Vec<ShortcutConfig> {
        let data = match fs::read_to_string(&self.path) {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return default_shortcuts(),
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "cannot read shortcuts, using defaults");
                return default_shortcuts();
            }
        };

        match serde_json::from_str::<ShortcutsFile>(&data) {
            Ok(file) => file.shortcuts,
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "cannot parse shortcuts, using defaults");
                default_shortcuts()
            }
        }
    }

    /// Binding for `key`, ignoring case
    pub fn find(&self, key: char) -> Option<ShortcutConfig> {
        self.load().into_iter().find(|s| s.matches(key))
    }

    /// Validate and write `shortcuts` as pretty-printed JSON.
    pub fn save(&self, shortcuts: &[ShortcutConfig]) -> Result<(), ConfigError> {
        validate(shortcuts)?;

        if let Some(dir) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(dir).map_err(|source| ConfigError::Write {
                path: dir.to_path_buf(),
                source,
            })?;
        }

        let json = serde_json::to_string_pretty(&ShortcutsFile {
            shortcuts: shortcuts.to_vec(),
        })?;
        fs::write(&self.path, json).map_err(|source| ConfigError::Write {
            path: self.path.clone(),
            source,
        })?;

        tracing::info!(path = %self.path.display(), count = shortcuts.len(), "shortcuts saved");
        Ok(())
    }

    /// Add or replace the binding for one key and save.
    pub fn set(&self, shortcut: ShortcutConfig) -> Result<Vec<ShortcutConfig>, ConfigError> {
        let mut shortcuts = self.load();
        match shortcuts.iter_mut().find(|s| s.matches(shortcut.key)) {
            Some(existing) => *existing = shortcut,
            None => shortcuts.push(shortcut),
        }
        self.save(&shortcuts)?;
        Ok(shortcuts)
    }
}

fn validate(shortcuts: &[ShortcutConfig]) -> Result<(), ConfigError> {
    let mut seen = HashSet::new();
    for shortcut in shortcuts {
        if !shortcut.key.is_ascii_alphanumeric() {
            return Err(ConfigError::InvalidKey { key: shortcut.key });
        }
        if !seen.insert(shortcut.key.to_ascii_lowercase()) {
            return Err(ConfigError::DuplicateKey { key: shortcut.key });
        }
    }
    Ok(())
}
