//! # Error Module
//!
//! Error types for scanning, hashing, reordering and moving media files.
//!
//! ## Design Principles
//! - **Never panic** on user data - return errors instead
//! - **Include context** - every variant names the path it is about
//! - **Say what was left behind** - rename failures report the path that
//!   stopped the batch so the folder can be inspected

use std::path::PathBuf;
use thiserror::Error;

/// Top-level application error
#[derive(Error, Debug)]
pub enum MediaTidyError {
    #[error("Scanning error: {0}")]
    Scan(#[from] ScanError),

    #[error("Hashing error: {0}")]
    Hash(#[from] HashError),

    #[error("Reorder error: {0}")]
    Reorder(#[from] ReorderError),

    #[error("Move error: {0}")]
    Move(#[from] MoveError),

    #[error("Undo error: {0}")]
    Undo(#[from] UndoError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Terminal error: {0}")]
    Terminal(#[from] std::io::Error),
}

/// Errors that occur while listing a directory
#[derive(Error, Debug)]
pub enum ScanError {
    #[error("No directory given")]
    EmptyPath,

    #[error("Directory not found: {path}")]
    DirectoryNotFound { path: PathBuf },

    #[error("Not a directory: {path}")]
    NotADirectory { path: PathBuf },

    #[error("Permission denied accessing: {path}")]
    PermissionDenied { path: PathBuf },

    #[error("Failed to read {path}: {source}")]
    ReadDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors that occur while fingerprinting a single image
#[derive(Error, Debug)]
pub enum HashError {
    #[error("No open handle for {path}")]
    MissingHandle { path: PathBuf },

    #[error("Failed to decode image {path}: {reason}")]
    DecodeError { path: PathBuf, reason: String },

    #[error("Image is empty or corrupted: {path}")]
    EmptyImage { path: PathBuf },

    #[error("Failed to resize image {path}: {reason}")]
    ResizeFailed { path: PathBuf, reason: String },

    #[error("Failed to read image file {path}: {source}")]
    IoError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors from renaming a directory into a numbered sequence
#[derive(Error, Debug)]
pub enum ReorderError {
    #[error(transparent)]
    Scan(#[from] ScanError),

    #[error("Sequence width must be greater than 0")]
    ZeroWidth,

    #[error("Nothing to reorder in {path}: no eligible files")]
    NothingToReorder { path: PathBuf },

    #[error("Sequence width {width} is too small for {count} files ({needed} digits needed)")]
    WidthTooSmall {
        count: usize,
        needed: usize,
        width: usize,
    },

    #[error("Refusing to overwrite existing path {path}")]
    PathOccupied { path: PathBuf },

    #[error("Temporary rename failed {from} -> {to}: {source}")]
    TempRename {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Final rename failed {from} -> {to}: {source}")]
    FinalRename {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to build worker pool: {0}")]
    WorkerPool(String),
}

/// Errors from moving a file to a new location
#[derive(Error, Debug)]
pub enum MoveError {
    #[error("Source file not found: {path}")]
    SourceMissing { path: PathBuf },

    #[error("Source is a directory, only files can be moved: {path}")]
    SourceIsDirectory { path: PathBuf },

    #[error("Destination already exists: {path}")]
    TargetExists { path: PathBuf },

    #[error("Destination has no file name: {path}")]
    InvalidTarget { path: PathBuf },

    #[error("No free name found for {path} after {attempts} attempts")]
    ConflictExhausted { path: PathBuf, attempts: u32 },

    #[error("Failed to create directory {path}: {source}")]
    CreateDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to check {path}: {source}")]
    Probe {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to move {from} -> {to}: {source}")]
    Rename {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("No shortcut configured for key '{key}'")]
    UnknownShortcut { key: char },

    #[error("Shortcut '{key}' has no target folder")]
    UnconfiguredShortcut { key: char },
}

/// Errors from reversing a recorded move
#[derive(Error, Debug)]
pub enum UndoError {
    #[error("Nothing to undo")]
    NothingToUndo,

    #[error("File was deleted or moved since it was recorded: {path}")]
    TargetMissing { path: PathBuf },

    #[error("Failed to recreate original folder {path}: {source}")]
    RestoreDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to move file back: {0}")]
    Move(#[from] MoveError),
}

/// Errors with the shortcut configuration file
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Could not determine the home directory")]
    NoHomeDirectory,

    #[error("Invalid shortcut key '{key}': keys must be a single letter or digit")]
    InvalidKey { key: char },

    #[error("Shortcut key '{key}' is used more than once")]
    DuplicateKey { key: char },

    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize shortcuts: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Convenience Result type alias
pub type Result<T> = std::result::Result<T, MediaTidyError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scan_error_includes_path() {
        let error = ScanError::DirectoryNotFound {
            path: PathBuf::from("/photos/vacation"),
        };
        assert!(error.to_string().contains("/photos/vacation"));
    }

    #[test]
    fn width_error_explains_sizing() {
        let error = ReorderError::WidthTooSmall {
            count: 150,
            needed: 3,
            width: 2,
        };
        let message = error.to_string();
        assert!(message.contains("150"));
        assert!(message.contains("3 digits"));
    }

    #[test]
    fn rename_error_names_offending_path() {
        let error = ReorderError::FinalRename {
            from: PathBuf::from("/photos/a.jpg.tmp"),
            to: PathBuf::from("/photos/0001.jpg"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        let message = error.to_string();
        assert!(message.contains("/photos/a.jpg.tmp"));
        assert!(message.contains("/photos/0001.jpg"));
    }

    #[test]
    fn undo_error_wraps_move_error() {
        let error: UndoError = MoveError::SourceMissing {
            path: PathBuf::from("/sorted/a.jpg"),
        }
        .into();
        assert!(error.to_string().contains("/sorted/a.jpg"));
    }
}
