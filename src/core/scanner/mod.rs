//! # Scanner Module
//!
//! Lists the files that the other components work on.
//!
//! - [`scan_directory`] lists the direct children of one folder and is what
//!   the rename engine consumes.
//! - [`collect_hash_candidates`] walks a folder for images the hasher can
//!   decode (JPEG only).
//!
//! Hidden entries (leading `.`), OS litter such as `Thumbs.db`, and the
//! rename engine's own temporary files are never listed.
//!
//! ## Example
//! ```rust,ignore
//! use media_tidy::core::scanner::scan_directory;
//!
//! let files = scan_directory(Path::new("/Users/me/Pictures/2024"))?;
//! ```

mod filter;
mod walker;

pub use filter::{EntryFilter, TEMP_SUFFIX};
pub use walker::{
    collect_hash_candidates, list_subdirectories, scan_directory, ScanConfig, ScanResult,
};

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// Metadata for one file, captured at scan time
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileMeta {
    /// Absolute or caller-relative path to the file
    pub full_path: PathBuf,
    /// Final path component
    pub file_name: String,
    /// Lowercased extension with its leading dot (`".jpg"`), or empty
    pub ext: String,
    /// Last modified time
    pub modified: SystemTime,
    /// File size in bytes
    pub size: u64,
}

impl FileMeta {
    pub(crate) fn with_metadata(path: &Path, metadata: &fs::Metadata) -> Self {
        Self {
            full_path: path.to_path_buf(),
            file_name: path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default(),
            ext: extension_of(path),
            modified: metadata.modified().unwrap_or(SystemTime::UNIX_EPOCH),
            size: metadata.len(),
        }
    }

    /// Coarse media category of this file
    pub fn media_type(&self) -> MediaType {
        MediaType::from_extension(&self.ext)
    }
}

/// Lowercased extension with a leading dot, or an empty string
pub fn extension_of(path: &Path) -> String {
    path.extension()
        .map(|e| format!(".{}", e.to_string_lossy().to_lowercase()))
        .unwrap_or_default()
}

/// Coarse media category derived from the file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaType {
    Image,
    Video,
    Document,
    Audio,
    Unknown,
}

impl MediaType {
    /// Classify an extension; accepts `"jpg"`, `".jpg"` or `".JPG"`.
    pub fn from_extension(ext: &str) -> Self {
        match ext.trim_start_matches('.').to_lowercase().as_str() {
            "jpg" | "jpeg" | "png" | "gif" | "bmp" | "webp" | "tiff" => MediaType::Image,
            "mp4" | "mov" | "avi" | "mkv" | "flv" | "wmv" | "webm" => MediaType::Video,
            "txt" | "pdf" | "docx" | "xlsx" | "pptx" => MediaType::Document,
            "mp3" | "wav" | "flac" | "aac" => MediaType::Audio,
            _ => MediaType::Unknown,
        }
    }

    /// Whether the media browser shows this kind of file
    pub fn is_media(&self) -> bool {
        matches!(self, MediaType::Image | MediaType::Video)
    }
}

/// Whether the hasher can fingerprint a file with this extension.
///
/// Only JPEG is decoded for hashing; other images and videos still take
/// part in renaming and moving.
pub fn is_hash_eligible(ext: &str) -> bool {
    matches!(
        ext.trim_start_matches('.').to_lowercase().as_str(),
        "jpg" | "jpeg"
    )
}
