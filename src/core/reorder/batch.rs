//! Renumber many directories concurrently.

use super::engine::reorder_directory_with_events;
use super::ReorderReport;
use crate::core::scanner::list_subdirectories;
use crate::error::ReorderError;
use crate::events::{null_sender, EventSender};
use rayon::prelude::*;
use std::path::{Path, PathBuf};

/// Result for one subdirectory of a batch
#[derive(Debug)]
pub struct DirectoryOutcome {
    pub dir: PathBuf,
    pub result: Result<ReorderReport, ReorderError>,
}

impl DirectoryOutcome {
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

/// Renumber every non-hidden subdirectory of `root`.
///
/// At most `jobs` directories are processed at once. Blocks until all are
/// done; a failing directory does not stop the others. Outcomes are in
/// directory name order.
pub fn reorder_subdirectories(
    root: &Path,
    width: usize,
    jobs: usize,
) -> Result<Vec<DirectoryOutcome>, ReorderError> {
    reorder_subdirectories_with_events(root, width, jobs, &null_sender())
}

pub fn reorder_subdirectories_with_events(
    root: &Path,
    width: usize,
    jobs: usize,
    events: &EventSender,
) -> Result<Vec<DirectoryOutcome>, ReorderError> {
    let dirs = list_subdirectories(root)?;

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(jobs.max(1))
        .build()
        .map_err(|e| ReorderError::WorkerPool(e.to_string()))?;

    let outcomes: Vec<DirectoryOutcome> = pool.install(|| {
        dirs.into_par_iter()
            .map(|dir| {
                let result = reorder_directory_with_events(&dir, width, events);
                DirectoryOutcome { dir, result }
            })
            .collect()
    });

    let failed = outcomes.iter().filter(|o| !o.is_ok()).count();
    tracing::info!(
        root = %root.display(),
        directories = outcomes.len(),
        failed,
        jobs,
        "batch reorder finished"
    );

    Ok(outcomes)
}
