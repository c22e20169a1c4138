//! # Pipeline Module
//!
//! Runs the duplicate search end to end.
//!
//! ## Pipeline Stages
//! 1. **Scan** - Collect JPEG files under the root
//! 2. **Hash** - Open every file and fingerprint it on the worker pool
//! 3. **Group** - Cluster identical fingerprints and attach file details
//!
//! Files that cannot be opened or decoded are listed in the report and
//! left out of grouping; they never stop the run.

mod executor;

pub use executor::{DuplicatePipeline, DuplicateReport, GroupReport, PipelineBuilder, PipelineConfig};
