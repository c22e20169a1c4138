//! Event type definitions for progress reporting.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// All events emitted by long-running operations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    /// Candidate collection events
    Scan(ScanEvent),
    /// Fingerprinting events
    Hash(HashEvent),
    /// Grouping events
    Group(GroupEvent),
    /// Directory renumbering events
    Reorder(ReorderEvent),
    /// Duplicate pipeline events
    Pipeline(PipelineEvent),
}

/// Events while collecting files
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ScanEvent {
    /// Collection has started
    Started { root: PathBuf },
    /// An eligible image was found
    ImageFound { path: PathBuf },
    /// An entry could not be read; collection continues
    Error { path: PathBuf, message: String },
    /// Collection finished
    Completed { total_images: usize },
}

/// Events while fingerprinting images
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum HashEvent {
    /// Hashing has started
    Started { total_images: usize, chunks: usize },
    /// One image finished, successfully or not
    Progress(HashProgress),
    /// An image could not be fingerprinted; the batch continues
    Error { path: PathBuf, message: String },
    /// Every image has an outcome
    Completed { hashed: usize, failed: usize },
}

/// Progress information during hashing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HashProgress {
    /// Images with an outcome so far
    pub completed: usize,
    /// Total images submitted
    pub total: usize,
    /// Image that just finished
    pub current_path: PathBuf,
}

/// Events while grouping fingerprints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum GroupEvent {
    Started { total_fingerprints: usize },
    /// Two images were found to share a fingerprint
    MatchFound { first: PathBuf, second: PathBuf },
    Completed { groups: usize, grouped_images: usize },
}

/// Events while renumbering a directory
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ReorderEvent {
    Started { dir: PathBuf, total_files: usize },
    /// A file reached its final name
    Renamed { from: PathBuf, to: PathBuf },
    /// A file already had its final name and was left alone
    Unchanged { path: PathBuf },
    Completed { dir: PathBuf, renamed: usize, unchanged: usize },
    /// The directory could not be renumbered
    Failed { dir: PathBuf, message: String },
}

/// Duplicate pipeline events
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum PipelineEvent {
    Started,
    PhaseChanged { phase: PipelinePhase },
    Completed { summary: PipelineSummary },
}

/// Phases of the duplicate pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PipelinePhase {
    Scanning,
    Hashing,
    Grouping,
}

/// Summary of a duplicate pipeline run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineSummary {
    /// Eligible images found
    pub total_images: usize,
    /// Images that produced a fingerprint
    pub hashed: usize,
    /// Number of duplicate groups
    pub groups: usize,
    /// Duration in milliseconds
    pub duration_ms: u64,
}

impl std::fmt::Display for PipelinePhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PipelinePhase::Scanning => write!(f, "Scanning"),
            PipelinePhase::Hashing => write!(f, "Hashing"),
            PipelinePhase::Grouping => write!(f, "Grouping"),
        }
    }
}
