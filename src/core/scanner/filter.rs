//! Entry filtering shared by every scan.

use std::collections::HashSet;
use std::path::Path;

/// Suffix of the rename engine's temporary files
pub const TEMP_SUFFIX: &str = "reorder-tmp";

/// Names the OS or other tools leave lying around
const SYSTEM_NAMES: &[&str] = &[".DS_Store", ".Trash", "Thumbs.db", "desktop.ini", ".deleted"];

/// Decides which directory entries are user files
pub struct EntryFilter {
    system_names: HashSet<&'static str>,
    include_hidden: bool,
}

impl EntryFilter {
    pub fn new() -> Self {
        Self {
            system_names: SYSTEM_NAMES.iter().copied().collect(),
            include_hidden: false,
        }
    }

    /// Include entries whose name starts with `.`
    pub fn with_hidden(mut self, include: bool) -> Self {
        self.include_hidden = include;
        self
    }

    /// Whether an entry with this name should be listed
    pub fn accepts_name(&self, name: &str) -> bool {
        if self.system_names.contains(name) {
            return false;
        }
        if !self.include_hidden && name.starts_with('.') {
            return false;
        }
        // Leftovers from an interrupted reorder are never picked up again
        !name.ends_with(&format!(".{TEMP_SUFFIX}"))
    }

    /// Whether the entry at `path` should be listed
    pub fn accepts(&self, path: &Path) -> bool {
        match path.file_name().and_then(|n| n.to_str()) {
            Some(name) => self.accepts_name(name),
            None => false,
        }
    }
}

impl Default for EntryFilter {
    fn default() -> Self {
        Self::new()
    }
}
