//! Free destination names for moves.
//!
//! `photo.jpg` taken? Try `photo_1.jpg`, `photo_2.jpg`, ... The answer is
//! only true at the moment of the check; a concurrent writer can still
//! take the name first.

use crate::error::MoveError;
use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Attempts used for undo and soft delete
pub const DEFAULT_MAX_ATTEMPTS: u32 = 100;

/// What to do when the desired destination already exists
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ConflictPolicy {
    /// An occupied destination is an error
    Fail,
    /// Probe numbered suffixes; running out is an error
    Suffix { max_attempts: u32 },
    /// Probe numbered suffixes, then fall back to a nanosecond timestamp
    /// that is not checked
    SuffixOrTimestamp { max_attempts: u32 },
}

impl Default for ConflictPolicy {
    fn default() -> Self {
        ConflictPolicy::Suffix {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }
}

/// Whether anything, file or directory, sits at `path`.
pub(crate) fn exists(path: &Path) -> Result<bool, MoveError> {
    match fs::symlink_metadata(path) {
        Ok(_) => Ok(true),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
        Err(source) => Err(MoveError::Probe {
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// `dir/stem_<tag>.ext`, or `dir/stem_<tag>` when there is no extension
fn tagged(desired: &Path, tag: &str) -> Result<PathBuf, MoveError> {
    let stem = desired.file_stem().ok_or_else(|| MoveError::InvalidTarget {
        path: desired.to_path_buf(),
    })?;

    let mut name = OsString::from(stem);
    name.push("_");
    name.push(tag);
    if let Some(ext) = desired.extension() {
        name.push(".");
        name.push(ext);
    }
    Ok(desired.with_file_name(name))
}

/// Return a destination that does not exist right now.
///
/// A free `desired` comes back unchanged.
pub fn resolve(desired: &Path, policy: ConflictPolicy) -> Result<PathBuf, MoveError> {
    if desired.file_name().is_none() {
        return Err(MoveError::InvalidTarget {
            path: desired.to_path_buf(),
        });
    }
    if !exists(desired)? {
        return Ok(desired.to_path_buf());
    }

    let (max_attempts, timestamp_fallback) = match policy {
        ConflictPolicy::Fail => {
            return Err(MoveError::TargetExists {
                path: desired.to_path_buf(),
            })
        }
        ConflictPolicy::Suffix { max_attempts } => (max_attempts, false),
        ConflictPolicy::SuffixOrTimestamp { max_attempts } => (max_attempts, true),
    };

    for attempt in 1..=max_attempts {
        let candidate = tagged(desired, &attempt.to_string())?;
        if !exists(&candidate)? {
            tracing::debug!(
                desired = %desired.display(),
                resolved = %candidate.display(),
                "name conflict resolved"
            );
            return Ok(candidate);
        }
    }

    if timestamp_fallback {
        let nanos = chrono::Utc::now()
            .timestamp_nanos_opt()
            .unwrap_or_default();
        tracing::warn!(desired = %desired.display(), max_attempts, "suffixes exhausted, using timestamp");
        return tagged(desired, &nanos.to_string());
    }

    Err(MoveError::ConflictExhausted {
        path: desired.to_path_buf(),
        attempts: max_attempts,
    })
}
