//! Bounded history of moves that can be reversed.

use super::conflict::{ConflictPolicy, DEFAULT_MAX_ATTEMPTS};
use super::mover::relocate;
use crate::error::UndoError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fs;
use std::path::PathBuf;

/// Number of moves remembered by default
pub const DEFAULT_CAPACITY: usize = 50;

/// A completed move
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveRecord {
    pub source_path: PathBuf,
    pub target_path: PathBuf,
    pub timestamp: DateTime<Utc>,
}

impl MoveRecord {
    pub fn new(source_path: PathBuf, target_path: PathBuf) -> Self {
        Self {
            source_path,
            target_path,
            timestamp: Utc::now(),
        }
    }
}

/// Stack of recent moves.
///
/// Recording past capacity forgets the oldest move; undo always takes the
/// newest.
#[derive(Debug, Clone)]
pub struct UndoLedger {
    records: VecDeque<MoveRecord>,
    capacity: usize,
}

impl UndoLedger {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            records: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn record(&mut self, record: MoveRecord) {
        self.records.push_back(record);
        while self.records.len() > self.capacity {
            if let Some(evicted) = self.records.pop_front() {
                tracing::debug!(source = %evicted.source_path.display(), "undo history full, oldest move forgotten");
            }
        }
    }

    /// Move the most recent file back where it came from.
    ///
    /// The record is consumed even when the undo fails. Returns the path
    /// the file was restored to, which differs from the recorded source if
    /// that name has been taken since.
    pub fn undo(&mut self) -> Result<PathBuf, UndoError> {
        let record = self.records.pop_back().ok_or(UndoError::NothingToUndo)?;

        if !record.target_path.exists() {
            tracing::warn!(path = %record.target_path.display(), "undo target is gone");
            return Err(UndoError::TargetMissing {
                path: record.target_path,
            });
        }

        if let Some(dir) = record
            .source_path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
        {
            fs::create_dir_all(dir).map_err(|source| UndoError::RestoreDirectory {
                path: dir.to_path_buf(),
                source,
            })?;
        }

        let restored = relocate(
            &record.target_path,
            &record.source_path,
            ConflictPolicy::Suffix {
                max_attempts: DEFAULT_MAX_ATTEMPTS,
            },
        )?;

        tracing::info!(
            from = %record.target_path.display(),
            to = %restored.display(),
            "move undone"
        );
        Ok(restored)
    }

    pub fn count(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Most recent move, without consuming it
    pub fn last(&self) -> Option<&MoveRecord> {
        self.records.back()
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for UndoLedger {
    fn default() -> Self {
        Self::new()
    }
}
