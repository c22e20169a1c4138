//! # Comparator Module
//!
//! Finds duplicates by comparing fingerprints.
//!
//! ## How It Works
//! 1. Sort fingerprinted paths and give each a dense index
//! 2. Union every pair whose fingerprints are identical
//! 3. Read the disjoint sets back as groups, dropping singletons
//!
//! Only Hamming distance 0 counts as a match.

mod grouper;
mod union_find;

pub use grouper::SimilarityGrouper;
pub use union_find::DisjointSet;

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// A set of two or more files with identical fingerprints
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimilarityGroup {
    /// 1-based, in order of each group's smallest member
    pub id: usize,
    /// Sorted member paths
    pub members: Vec<PathBuf>,
}

impl SimilarityGroup {
    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.members.binary_search_by(|m| m.as_path().cmp(path)).is_ok()
    }
}

/// How candidate pairs are found
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupingStrategy {
    /// Compare every unordered pair, O(n^2)
    #[default]
    PairwiseScan,
    /// Bucket by fingerprint value, union within buckets
    ExactBuckets,
}
