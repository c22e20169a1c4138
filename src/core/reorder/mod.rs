//! # Reorder Module
//!
//! Renames the files of a directory to `0001.jpg`, `0002.mp4`, ... in order
//! of modification time.
//!
//! ## How It Works
//! 1. List the directory and validate the request before touching anything
//! 2. Move every file that needs a new name to a unique temporary name
//! 3. Move every temporary file to its final name
//!
//! No rename ever replaces an existing file. A failure part-way leaves the
//! directory with some files at temporary names; the error names the path
//! where it stopped and nothing is rolled back.
//!
//! ## Example
//! ```rust,ignore
//! use media_tidy::core::reorder::reorder_directory;
//!
//! let report = reorder_directory(Path::new("/Users/me/Pictures/trip"), 4)?;
//! println!("{} renamed", report.renamed);
//! ```

mod batch;
mod engine;

pub use batch::{reorder_subdirectories, reorder_subdirectories_with_events, DirectoryOutcome};
pub use engine::{plan_directory, reorder_directory, reorder_directory_with_events, RenameStep};

use crate::error::ReorderError;
use crate::events::EventSender;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default sequence width for a single directory
pub const DEFAULT_WIDTH: usize = 4;
/// Default sequence width for a batch over subdirectories
pub const DEFAULT_BATCH_WIDTH: usize = 5;
/// Default number of directories renumbered at once
pub const DEFAULT_JOBS: usize = 5;

/// Outcome of renumbering one directory
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ReorderReport {
    /// Files considered
    pub total: usize,
    /// Files that got a new name
    pub renamed: usize,
    /// Files that already had their final name
    pub unchanged: usize,
}

/// Configuration for reorder runs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReorderConfig {
    width: usize,
    jobs: usize,
}

impl ReorderConfig {
    pub fn new() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            jobs: DEFAULT_JOBS,
        }
    }

    /// Digits in each sequence number
    pub fn width(mut self, width: usize) -> Self {
        self.width = width;
        self
    }

    /// Directories renumbered at once in a batch
    pub fn jobs(mut self, jobs: usize) -> Self {
        self.jobs = jobs.max(1);
        self
    }

    pub fn width_value(&self) -> usize {
        self.width
    }

    pub fn jobs_value(&self) -> usize {
        self.jobs
    }

    /// Renumber one directory
    pub fn run(&self, dir: &Path, events: &EventSender) -> Result<ReorderReport, ReorderError> {
        reorder_directory_with_events(dir, self.width, events)
    }

    /// Renumber every subdirectory of `root`
    pub fn run_batch(
        &self,
        root: &Path,
        events: &EventSender,
    ) -> Result<Vec<DirectoryOutcome>, ReorderError> {
        reorder_subdirectories_with_events(root, self.width, self.jobs, events)
    }
}

impl Default for ReorderConfig {
    fn default() -> Self {
        Self::new()
    }
}
