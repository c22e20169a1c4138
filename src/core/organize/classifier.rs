//! Sorting files into folders one key press at a time.

use super::conflict::ConflictPolicy;
use super::ledger::{MoveRecord, UndoLedger, DEFAULT_CAPACITY};
use super::mover::{move_file, soft_delete};
use super::shortcuts::{resolve_target_dir, ShortcutConfig, ShortcutStore};
use crate::error::{MoveError, UndoError};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

/// Settings for a [`Classifier`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClassifierConfig {
    history: usize,
    policy: ConflictPolicy,
}

impl ClassifierConfig {
    pub fn new() -> Self {
        Self {
            history: DEFAULT_CAPACITY,
            policy: ConflictPolicy::SuffixOrTimestamp { max_attempts: 999 },
        }
    }

    /// Number of moves that can be undone
    pub fn history(mut self, history: usize) -> Self {
        self.history = history;
        self
    }

    /// Naming policy for occupied destinations
    pub fn policy(mut self, policy: ConflictPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn build(self, store: ShortcutStore) -> Classifier {
        Classifier {
            store,
            ledger: Mutex::new(UndoLedger::with_capacity(self.history)),
            policy: self.policy,
        }
    }
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Moves files by shortcut and remembers the moves for undo.
///
/// Safe to share between threads; the history sits behind a mutex.
pub struct Classifier {
    store: ShortcutStore,
    ledger: Mutex<UndoLedger>,
    policy: ConflictPolicy,
}

impl Classifier {
    pub fn new(store: ShortcutStore) -> Self {
        ClassifierConfig::new().build(store)
    }

    pub fn store(&self) -> &ShortcutStore {
        &self.store
    }

    pub fn shortcuts(&self) -> Vec<ShortcutConfig> {
        self.store.load()
    }

    fn ledger(&self) -> MutexGuard<'_, UndoLedger> {
        // A panic mid-update cannot leave the deque half-written
        self.ledger.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Move `file` to the folder bound to `key` and record the move.
    pub fn move_by_shortcut(&self, file: &Path, key: char) -> Result<PathBuf, MoveError> {
        let shortcut = self
            .store
            .find(key)
            .ok_or(MoveError::UnknownShortcut { key })?;
        if !shortcut.is_configured() {
            return Err(MoveError::UnconfiguredShortcut { key });
        }

        let target_dir = resolve_target_dir(file, &shortcut.target_dir);
        let moved = self.move_to(file, &target_dir)?;
        tracing::info!(
            file = %file.display(),
            to = %moved.display(),
            key = %key,
            label = %shortcut.label,
            "moved by shortcut"
        );
        Ok(moved)
    }

    /// Move `file` into `target_dir` and record the move.
    pub fn move_to(&self, file: &Path, target_dir: &Path) -> Result<PathBuf, MoveError> {
        let moved = move_file(file, target_dir, self.policy)?;
        self.ledger()
            .record(MoveRecord::new(file.to_path_buf(), moved.clone()));
        Ok(moved)
    }

    /// Reverse the most recent recorded move
    pub fn undo_last_move(&self) -> Result<PathBuf, UndoError> {
        self.ledger().undo()
    }

    pub fn undo_count(&self) -> usize {
        self.ledger().count()
    }

    pub fn last_move(&self) -> Option<MoveRecord> {
        self.ledger().last().cloned()
    }

    pub fn clear_history(&self) {
        self.ledger().clear();
        tracing::info!("undo history cleared");
    }

    /// Move `file` to the `.delete` folder beside it; not undoable
    pub fn soft_delete(&self, file: &Path) -> Result<PathBuf, MoveError> {
        soft_delete(file)
    }
}
