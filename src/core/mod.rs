//! # Core Module
//!
//! The front-end agnostic engine.
//!
//! ## Modules
//! - `scanner` - Lists files and collects hash candidates
//! - `hasher` - Fingerprints JPEGs on a fixed worker pool
//! - `comparator` - Groups identical fingerprints
//! - `pipeline` - Runs scan, hash and group end to end
//! - `reorder` - Renumbers directories by modification time
//! - `organize` - Moves files with conflict handling and undo

pub mod comparator;
pub mod hasher;
pub mod organize;
pub mod pipeline;
pub mod reorder;
pub mod scanner;

// Re-export commonly used types
pub use comparator::{GroupingStrategy, SimilarityGroup, SimilarityGrouper};
pub use hasher::{Fingerprint, HashComputer, HasherConfig};
pub use organize::{Classifier, ConflictPolicy, MoveRecord, UndoLedger};
pub use pipeline::{DuplicatePipeline, DuplicateReport};
pub use reorder::{reorder_directory, ReorderReport};
pub use scanner::{scan_directory, FileMeta};
