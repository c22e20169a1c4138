//! Directory listing built on walkdir.

use super::{is_hash_eligible, EntryFilter, FileMeta};
use crate::error::ScanError;
use crate::events::{Event, EventSender, ScanEvent};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Configuration for collecting hash candidates
#[derive(Debug, Clone, Default)]
pub struct ScanConfig {
    /// Whether to follow symbolic links
    pub follow_symlinks: bool,
    /// Whether to include hidden files and directories
    pub include_hidden: bool,
    /// Maximum directory depth below the root (None = unlimited)
    pub max_depth: Option<usize>,
}

/// Result of collecting hash candidates
#[derive(Debug)]
pub struct ScanResult {
    /// Eligible images, sorted by path
    pub files: Vec<FileMeta>,
    /// Entries that could not be read (non-fatal)
    pub errors: Vec<ScanError>,
}

/// Check that `dir` names an existing directory.
fn validate_dir(dir: &Path) -> Result<(), ScanError> {
    if dir.as_os_str().is_empty() {
        return Err(ScanError::EmptyPath);
    }

    let metadata = fs::metadata(dir).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => ScanError::DirectoryNotFound {
            path: dir.to_path_buf(),
        },
        std::io::ErrorKind::PermissionDenied => ScanError::PermissionDenied {
            path: dir.to_path_buf(),
        },
        _ => ScanError::ReadDirectory {
            path: dir.to_path_buf(),
            source: e,
        },
    })?;

    if !metadata.is_dir() {
        return Err(ScanError::NotADirectory {
            path: dir.to_path_buf(),
        });
    }

    Ok(())
}

fn walk_error(error: walkdir::Error, fallback: &Path) -> ScanError {
    let path = error
        .path()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| fallback.to_path_buf());

    if error.io_error().map(|e| e.kind()) == Some(std::io::ErrorKind::PermissionDenied) {
        ScanError::PermissionDenied { path }
    } else {
        ScanError::ReadDirectory {
            path,
            source: std::io::Error::other(error.to_string()),
        }
    }
}

/// List the files directly inside `dir`, without recursing.
///
/// Directories, hidden entries and system litter are skipped. Any entry
/// that cannot be stat'ed fails the whole listing: callers about to rename
/// files need the complete picture.
pub fn scan_directory(dir: &Path) -> Result<Vec<FileMeta>, ScanError> {
    validate_dir(dir)?;

    let filter = EntryFilter::new();
    let mut files = Vec::new();

    let walker = WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name();

    for entry in walker {
        let entry = entry.map_err(|e| walk_error(e, dir))?;
        let path = entry.path();

        if !filter.accepts(path) {
            continue;
        }

        // Follow symlinks so a link to a folder counts as a folder
        let metadata = fs::metadata(path).map_err(|e| ScanError::ReadDirectory {
            path: path.to_path_buf(),
            source: e,
        })?;
        if metadata.is_dir() {
            continue;
        }

        files.push(FileMeta::with_metadata(path, &metadata));
    }

    tracing::debug!(dir = %dir.display(), count = files.len(), "directory scanned");
    Ok(files)
}

/// List the non-hidden directories directly inside `root`, sorted.
pub fn list_subdirectories(root: &Path) -> Result<Vec<PathBuf>, ScanError> {
    validate_dir(root)?;

    let filter = EntryFilter::new();
    let mut dirs = Vec::new();
    for entry in WalkDir::new(root).min_depth(1).max_depth(1).sort_by_file_name() {
        let entry = entry.map_err(|e| walk_error(e, root))?;
        if entry.file_type().is_dir() && filter.accepts(entry.path()) {
            dirs.push(entry.into_path());
        }
    }
    Ok(dirs)
}

/// Walk `root` for images the hasher can decode.
///
/// Unreadable entries are reported in [`ScanResult::errors`] and the walk
/// continues. Hidden directories (including the `.delete` soft-delete
/// folder) are not descended into.
pub fn collect_hash_candidates(
    root: &Path,
    config: &ScanConfig,
    events: &EventSender,
) -> Result<ScanResult, ScanError> {
    validate_dir(root)?;

    events.send(Event::Scan(ScanEvent::Started {
        root: root.to_path_buf(),
    }));

    let filter = EntryFilter::new().with_hidden(config.include_hidden);
    let mut walker = WalkDir::new(root)
        .follow_links(config.follow_symlinks)
        .sort_by_file_name();
    if let Some(depth) = config.max_depth {
        walker = walker.max_depth(depth);
    }

    let mut files = Vec::new();
    let mut errors = Vec::new();

    let entries = walker
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || filter.accepts(e.path()));

    for entry_result in entries {
        let entry = match entry_result {
            Ok(entry) => entry,
            Err(e) => {
                let error = walk_error(e, root);
                events.send(Event::Scan(ScanEvent::Error {
                    path: error_path(&error, root),
                    message: error.to_string(),
                }));
                errors.push(error);
                continue;
            }
        };

        if entry.file_type().is_dir() {
            continue;
        }

        let path = entry.path();
        if !is_hash_eligible(&super::extension_of(path)) {
            continue;
        }

        match entry.metadata() {
            Ok(metadata) => {
                events.send(Event::Scan(ScanEvent::ImageFound {
                    path: path.to_path_buf(),
                }));
                files.push(FileMeta::with_metadata(path, &metadata));
            }
            Err(e) => {
                let error = walk_error(e, path);
                events.send(Event::Scan(ScanEvent::Error {
                    path: path.to_path_buf(),
                    message: error.to_string(),
                }));
                errors.push(error);
            }
        }
    }

    events.send(Event::Scan(ScanEvent::Completed {
        total_images: files.len(),
    }));
    tracing::info!(
        root = %root.display(),
        images = files.len(),
        errors = errors.len(),
        "collected hash candidates"
    );

    Ok(ScanResult { files, errors })
}

fn error_path(error: &ScanError, fallback: &Path) -> PathBuf {
    match error {
        ScanError::DirectoryNotFound { path }
        | ScanError::NotADirectory { path }
        | ScanError::PermissionDenied { path }
        | ScanError::ReadDirectory { path, .. } => path.clone(),
        ScanError::EmptyPath => fallback.to_path_buf(),
    }
}
