//! Two-phase renumbering of a single directory.

use super::ReorderReport;
use crate::core::scanner::{scan_directory, FileMeta, TEMP_SUFFIX};
use crate::error::ReorderError;
use crate::events::{null_sender, Event, EventSender, ReorderEvent};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// One planned rename
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenameStep {
    pub source: PathBuf,
    pub target: PathBuf,
}

impl RenameStep {
    fn is_noop(&self) -> bool {
        self.source == self.target
    }
}

/// Number of decimal digits in `count`
fn digits(count: usize) -> usize {
    count.to_string().len()
}

fn occupied(path: &Path) -> bool {
    fs::symlink_metadata(path).is_ok()
}

/// Work out the final name of every file without touching the disk.
///
/// Files are numbered from 1 in ascending modification time; ties go to
/// the file name. Fails before any mutation if the directory is invalid,
/// empty, too large for `width`, or a target is blocked by something
/// outside the set being renamed.
pub fn plan_directory(dir: &Path, width: usize) -> Result<Vec<RenameStep>, ReorderError> {
    let mut files = scan_directory(dir)?;

    if width == 0 {
        return Err(ReorderError::ZeroWidth);
    }
    if files.is_empty() {
        return Err(ReorderError::NothingToReorder {
            path: dir.to_path_buf(),
        });
    }
    let needed = digits(files.len());
    if needed > width {
        return Err(ReorderError::WidthTooSmall {
            count: files.len(),
            needed,
            width,
        });
    }

    files.sort_by(|a, b| {
        a.modified
            .cmp(&b.modified)
            .then_with(|| a.file_name.cmp(&b.file_name))
    });

    let steps: Vec<RenameStep> = files
        .iter()
        .enumerate()
        .map(|(i, file)| RenameStep {
            source: file.full_path.clone(),
            target: target_path(dir, file, i + 1, width),
        })
        .collect();

    // A target is fine if it is free or is one of the files being moved away
    let sources: HashSet<&Path> = steps.iter().map(|s| s.source.as_path()).collect();
    if let Some(blocked) = steps
        .iter()
        .find(|s| !sources.contains(s.target.as_path()) && occupied(&s.target))
    {
        return Err(ReorderError::PathOccupied {
            path: blocked.target.clone(),
        });
    }

    Ok(steps)
}

fn target_path(dir: &Path, file: &FileMeta, sequence: usize, width: usize) -> PathBuf {
    dir.join(format!("{:0width$}{}", sequence, file.ext, width = width))
}

fn temp_path(source: &Path, token: &str) -> PathBuf {
    let mut name = source.as_os_str().to_owned();
    name.push(format!(".{token}.{TEMP_SUFFIX}"));
    PathBuf::from(name)
}

/// Rename every file in `dir` to a zero-padded sequence number.
///
/// Files already carrying their final name are left alone and counted as
/// unchanged, so a second run is a no-op.
pub fn reorder_directory(dir: &Path, width: usize) -> Result<ReorderReport, ReorderError> {
    reorder_directory_with_events(dir, width, &null_sender())
}

/// Like [`reorder_directory`], reporting each rename as an event.
pub fn reorder_directory_with_events(
    dir: &Path,
    width: usize,
    events: &EventSender,
) -> Result<ReorderReport, ReorderError> {
    match run(dir, width, events) {
        Ok(report) => Ok(report),
        Err(e) => {
            tracing::warn!(dir = %dir.display(), error = %e, "reorder failed");
            events.send(Event::Reorder(ReorderEvent::Failed {
                dir: dir.to_path_buf(),
                message: e.to_string(),
            }));
            Err(e)
        }
    }
}

fn run(dir: &Path, width: usize, events: &EventSender) -> Result<ReorderReport, ReorderError> {
    let steps = plan_directory(dir, width)?;
    events.send(Event::Reorder(ReorderEvent::Started {
        dir: dir.to_path_buf(),
        total_files: steps.len(),
    }));

    let (unchanged, pending): (Vec<RenameStep>, Vec<RenameStep>) =
        steps.into_iter().partition(RenameStep::is_noop);
    for step in &unchanged {
        events.send(Event::Reorder(ReorderEvent::Unchanged {
            path: step.source.clone(),
        }));
    }

    // Phase 1: everything moves out of the way before anything is final
    let token = Uuid::new_v4().simple().to_string();
    let mut staged = Vec::with_capacity(pending.len());
    for step in pending {
        let temp = temp_path(&step.source, &token);
        if occupied(&temp) {
            return Err(ReorderError::PathOccupied { path: temp });
        }
        fs::rename(&step.source, &temp).map_err(|source| ReorderError::TempRename {
            from: step.source.clone(),
            to: temp.clone(),
            source,
        })?;
        tracing::debug!(from = %step.source.display(), to = %temp.display(), "staged");
        staged.push((step, temp));
    }

    // Phase 2
    for (step, temp) in &staged {
        if occupied(&step.target) {
            return Err(ReorderError::PathOccupied {
                path: step.target.clone(),
            });
        }
        fs::rename(temp, &step.target).map_err(|source| ReorderError::FinalRename {
            from: temp.clone(),
            to: step.target.clone(),
            source,
        })?;
        events.send(Event::Reorder(ReorderEvent::Renamed {
            from: step.source.clone(),
            to: step.target.clone(),
        }));
    }

    let report = ReorderReport {
        total: staged.len() + unchanged.len(),
        renamed: staged.len(),
        unchanged: unchanged.len(),
    };
    events.send(Event::Reorder(ReorderEvent::Completed {
        dir: dir.to_path_buf(),
        renamed: report.renamed,
        unchanged: report.unchanged,
    }));
    tracing::info!(
        dir = %dir.display(),
        renamed = report.renamed,
        unchanged = report.unchanged,
        "directory reordered"
    );

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ScanError;
    use filetime::FileTime;
    use regex::Regex;
    use std::io::Write;
    use tempfile::TempDir;

    fn write(dir: &Path, name: &str, contents: &str, mtime: i64) -> PathBuf {
        let path = dir.join(name);
        fs::File::create(&path)
            .unwrap()
            .write_all(contents.as_bytes())
            .unwrap();
        filetime::set_file_mtime(&path, FileTime::from_unix_time(mtime, 0)).unwrap();
        path
    }

    fn names(dir: &Path) -> Vec<String> {
        let mut names: Vec<String> = fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    #[test]
    fn files_are_numbered_by_modification_time() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "c.jpg", "oldest", 1_000);
        write(temp.path(), "a.jpg", "newest", 3_000);
        write(temp.path(), "b.mp4", "middle", 2_000);

        let report = reorder_directory(temp.path(), 4).unwrap();

        assert_eq!(report.total, 3);
        assert_eq!(report.renamed, 3);
        assert_eq!(names(temp.path()), vec!["0001.jpg", "0002.mp4", "0003.jpg"]);
        assert_eq!(
            fs::read_to_string(temp.path().join("0001.jpg")).unwrap(),
            "oldest"
        );
        assert_eq!(
            fs::read_to_string(temp.path().join("0003.jpg")).unwrap(),
            "newest"
        );
    }

    #[test]
    fn every_file_ends_up_with_a_sequence_name() {
        let temp = TempDir::new().unwrap();
        for i in 0..12 {
            write(temp.path(), &format!("IMG_{i}.JPG"), "x", 1_000 + i);
        }

        reorder_directory(temp.path(), 3).unwrap();

        let pattern = Regex::new(r"^\d{3}\.jpg$").unwrap();
        let names = names(temp.path());
        assert_eq!(names.len(), 12);
        assert!(names.iter().all(|n| pattern.is_match(n)), "{names:?}");
    }

    #[test]
    fn width_too_small_leaves_directory_untouched() {
        let temp = TempDir::new().unwrap();
        for i in 0..150 {
            write(temp.path(), &format!("f{i:03}.jpg"), "x", 1_000 + i);
        }
        let before = names(temp.path());

        let result = reorder_directory(temp.path(), 2);

        assert!(matches!(
            result,
            Err(ReorderError::WidthTooSmall {
                count: 150,
                needed: 3,
                width: 2
            })
        ));
        assert_eq!(names(temp.path()), before);
    }

    #[test]
    fn renumbering_in_place_does_not_collide() {
        let temp = TempDir::new().unwrap();
        // Oldest is currently named 02, newest 01
        write(temp.path(), "02.jpg", "first", 1_000);
        write(temp.path(), "01.jpg", "second", 2_000);

        let report = reorder_directory(temp.path(), 2).unwrap();

        assert_eq!(report.renamed, 2);
        assert_eq!(fs::read_to_string(temp.path().join("01.jpg")).unwrap(), "first");
        assert_eq!(fs::read_to_string(temp.path().join("02.jpg")).unwrap(), "second");
    }

    #[test]
    fn second_run_changes_nothing() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "b.jpg", "1", 1_000);
        write(temp.path(), "a.png", "2", 2_000);

        reorder_directory(temp.path(), 4).unwrap();
        let first = names(temp.path());
        let report = reorder_directory(temp.path(), 4).unwrap();

        assert_eq!(report.renamed, 0);
        assert_eq!(report.unchanged, 2);
        assert_eq!(names(temp.path()), first);
    }

    #[test]
    fn equal_mtimes_fall_back_to_name_order() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "b.jpg", "b", 5_000);
        write(temp.path(), "a.jpg", "a", 5_000);

        reorder_directory(temp.path(), 1).unwrap();

        assert_eq!(fs::read_to_string(temp.path().join("1.jpg")).unwrap(), "a");
        assert_eq!(fs::read_to_string(temp.path().join("2.jpg")).unwrap(), "b");
    }

    #[test]
    fn hidden_files_and_subdirectories_are_ignored() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "photo.jpg", "x", 1_000);
        write(temp.path(), ".hidden.jpg", "x", 500);
        fs::create_dir(temp.path().join("album")).unwrap();

        let report = reorder_directory(temp.path(), 2).unwrap();

        assert_eq!(report.total, 1);
        assert_eq!(names(temp.path()), vec![".hidden.jpg", "01.jpg", "album"]);
    }

    #[test]
    fn blocked_target_fails_before_renaming() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "a.jpg", "x", 1_000);
        write(temp.path(), "b.jpg", "x", 2_000);
        // A directory named like a target is not part of the set
        fs::create_dir(temp.path().join("2.jpg")).unwrap();

        let result = reorder_directory(temp.path(), 1);

        match result {
            Err(ReorderError::PathOccupied { path }) => {
                assert_eq!(path, temp.path().join("2.jpg"))
            }
            other => panic!("expected PathOccupied, got {other:?}"),
        }
        assert!(temp.path().join("a.jpg").exists());
        assert!(temp.path().join("b.jpg").exists());
    }

    #[test]
    fn empty_directory_is_an_error() {
        let temp = TempDir::new().unwrap();
        assert!(matches!(
            reorder_directory(temp.path(), 4),
            Err(ReorderError::NothingToReorder { .. })
        ));
    }

    #[test]
    fn invalid_arguments_are_rejected() {
        let temp = TempDir::new().unwrap();
        let file = write(temp.path(), "a.jpg", "x", 1_000);

        assert!(matches!(
            reorder_directory(Path::new(""), 4),
            Err(ReorderError::Scan(ScanError::EmptyPath))
        ));
        assert!(matches!(
            reorder_directory(&temp.path().join("missing"), 4),
            Err(ReorderError::Scan(ScanError::DirectoryNotFound { .. }))
        ));
        assert!(matches!(
            reorder_directory(&file, 4),
            Err(ReorderError::Scan(ScanError::NotADirectory { .. }))
        ));
        assert!(matches!(
            reorder_directory(temp.path(), 0),
            Err(ReorderError::ZeroWidth)
        ));
    }

    #[test]
    fn temp_names_carry_the_run_token() {
        let temp = temp_path(Path::new("/photos/a.jpg"), "abc123");
        assert_eq!(temp, PathBuf::from("/photos/a.jpg.abc123.reorder-tmp"));
    }

    #[test]
    fn failure_emits_event() {
        let temp = TempDir::new().unwrap();
        let (sender, receiver) = crate::events::EventChannel::new();

        let _ = reorder_directory_with_events(temp.path(), 4, &sender);
        drop(sender);

        assert!(receiver
            .iter()
            .any(|e| matches!(e, Event::Reorder(ReorderEvent::Failed { .. }))));
    }
}
