//! Moving single files with conflict resolution.

use super::conflict::{resolve, ConflictPolicy};
use crate::error::MoveError;
use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};

/// Soft-delete folder created next to the removed file
pub const DELETE_DIR: &str = ".delete";

fn check_source(source: &Path) -> Result<(), MoveError> {
    match fs::metadata(source) {
        Ok(meta) if meta.is_dir() => Err(MoveError::SourceIsDirectory {
            path: source.to_path_buf(),
        }),
        Ok(_) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Err(MoveError::SourceMissing {
            path: source.to_path_buf(),
        }),
        Err(source_err) => Err(MoveError::Probe {
            path: source.to_path_buf(),
            source: source_err,
        }),
    }
}

/// Copy, check the size matches, then remove the original.
///
/// Used when `rename` fails, typically across filesystems. The copy never
/// replaces an existing `dest`, and is removed again if the original
/// cannot be.
fn copy_then_remove(source: &Path, dest: &Path) -> io::Result<()> {
    copy_then_remove_with(source, dest, |path| fs::remove_file(path))
}

fn copy_then_remove_with(
    source: &Path,
    dest: &Path,
    remove_source: impl FnOnce(&Path) -> io::Result<()>,
) -> io::Result<()> {
    let mut reader = File::open(source)?;
    let source_size = reader.metadata()?.len();
    let mut writer = OpenOptions::new().write(true).create_new(true).open(dest)?;

    let copied = io::copy(&mut reader, &mut writer).and_then(|n| writer.sync_all().map(|_| n));
    drop(writer);
    let copied = match copied {
        Ok(n) => n,
        Err(e) => {
            let _ = fs::remove_file(dest);
            return Err(e);
        }
    };

    if copied != source_size {
        let _ = fs::remove_file(dest);
        return Err(io::Error::other(format!(
            "copy verification failed: source {source_size} bytes, destination {copied} bytes"
        )));
    }

    if let Err(e) = remove_source(source) {
        let _ = fs::remove_file(dest);
        return Err(e);
    }
    Ok(())
}

/// Move `source` to `desired`, or to a free variant of it.
///
/// The destination folder is created if needed. Returns the path the file
/// ended up at.
pub fn relocate(source: &Path, desired: &Path, policy: ConflictPolicy) -> Result<PathBuf, MoveError> {
    check_source(source)?;

    if let Some(parent) = desired.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| MoveError::CreateDirectory {
            path: parent.to_path_buf(),
            source: e,
        })?;
    }

    let target = resolve(desired, policy)?;

    if let Err(rename_err) = fs::rename(source, &target) {
        tracing::debug!(
            from = %source.display(),
            to = %target.display(),
            error = %rename_err,
            "rename failed, copying instead"
        );
        copy_then_remove(source, &target).map_err(|e| MoveError::Rename {
            from: source.to_path_buf(),
            to: target.clone(),
            source: e,
        })?;
    }

    tracing::debug!(from = %source.display(), to = %target.display(), "file moved");
    Ok(target)
}

/// Move `source` into `destination_dir`, keeping its file name.
pub fn move_file(
    source: &Path,
    destination_dir: &Path,
    policy: ConflictPolicy,
) -> Result<PathBuf, MoveError> {
    let name = source.file_name().ok_or_else(|| MoveError::InvalidTarget {
        path: source.to_path_buf(),
    })?;
    relocate(source, &destination_dir.join(name), policy)
}

/// Move `path` into a `.delete` folder beside it.
///
/// Soft deletes are not recorded for undo; the file can be recovered from
/// the folder by hand.
pub fn soft_delete(path: &Path) -> Result<PathBuf, MoveError> {
    let parent = path.parent().unwrap_or_else(|| Path::new("."));
    let target = move_file(path, &parent.join(DELETE_DIR), ConflictPolicy::default())?;
    tracing::info!(path = %path.display(), to = %target.display(), "moved to trash folder");
    Ok(target)
}
