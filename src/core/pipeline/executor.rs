//! Pipeline execution implementation.

use crate::core::comparator::{GroupingStrategy, SimilarityGroup, SimilarityGrouper};
use crate::core::hasher::{Fingerprint, HasherConfig};
use crate::core::scanner::{collect_hash_candidates, FileMeta, ScanConfig};
use crate::error::Result;
use crate::events::{null_sender, Event, EventSender, PipelineEvent, PipelinePhase, PipelineSummary};
use serde::Serialize;
use std::collections::HashMap;
use std::fs::File;
use std::path::PathBuf;
use std::time::Instant;

/// One group of duplicates with file details
#[derive(Debug, Clone, Serialize)]
pub struct GroupReport {
    pub id: usize,
    /// Fingerprint shared by every member
    pub fingerprint: Fingerprint,
    /// Members in path order
    pub files: Vec<FileMeta>,
}

impl GroupReport {
    pub fn total_size(&self) -> u64 {
        self.files.iter().map(|f| f.size).sum()
    }

    /// Bytes freed by keeping only the first file
    pub fn reclaimable_bytes(&self) -> u64 {
        self.files.iter().skip(1).map(|f| f.size).sum()
    }
}

/// Result of a duplicate scan
#[derive(Debug, Clone, Serialize)]
pub struct DuplicateReport {
    pub groups: Vec<GroupReport>,
    /// Eligible images found
    pub total_images: usize,
    /// Images that produced a fingerprint
    pub hashed: usize,
    /// Images that could not be opened or decoded, sorted
    pub failed: Vec<PathBuf>,
    /// Non-fatal problems, one line each
    pub errors: Vec<String>,
    pub duration_ms: u64,
}

impl DuplicateReport {
    pub fn duplicate_count(&self) -> usize {
        self.groups.iter().map(|g| g.files.len().saturating_sub(1)).sum()
    }

    pub fn reclaimable_bytes(&self) -> u64 {
        self.groups.iter().map(GroupReport::reclaimable_bytes).sum()
    }
}

/// Configuration for the pipeline
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Folder to search
    pub root: PathBuf,
    pub hasher: HasherConfig,
    pub strategy: GroupingStrategy,
    pub scan_config: ScanConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::new(),
            hasher: HasherConfig::default(),
            strategy: GroupingStrategy::default(),
            scan_config: ScanConfig::default(),
        }
    }
}

/// Builder for pipeline configuration
#[derive(Default)]
pub struct PipelineBuilder {
    config: PipelineConfig,
}

impl PipelineBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Folder to search
    pub fn root(mut self, root: impl Into<PathBuf>) -> Self {
        self.config.root = root.into();
        self
    }

    /// Paths per hashing chunk
    pub fn chunk_size(mut self, size: usize) -> Self {
        self.config.hasher = self.config.hasher.chunk_size(size);
        self
    }

    /// Hashing worker threads
    pub fn workers(mut self, workers: usize) -> Self {
        self.config.hasher = self.config.hasher.workers(workers);
        self
    }

    pub fn strategy(mut self, strategy: GroupingStrategy) -> Self {
        self.config.strategy = strategy;
        self
    }

    pub fn scan_config(mut self, config: ScanConfig) -> Self {
        self.config.scan_config = config;
        self
    }

    pub fn build(self) -> DuplicatePipeline {
        DuplicatePipeline {
            config: self.config,
        }
    }
}

/// Scan, hash, group
pub struct DuplicatePipeline {
    config: PipelineConfig,
}

impl DuplicatePipeline {
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::new()
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Run the pipeline without events
    pub fn run(&self) -> Result<DuplicateReport> {
        self.run_with_events(&null_sender())
    }

    /// Run the pipeline with event reporting
    pub fn run_with_events(&self, events: &EventSender) -> Result<DuplicateReport> {
        let start_time = Instant::now();
        let mut errors = Vec::new();

        events.send(Event::Pipeline(PipelineEvent::Started));

        // Phase 1: Scanning
        events.send(Event::Pipeline(PipelineEvent::PhaseChanged {
            phase: PipelinePhase::Scanning,
        }));
        let scan = collect_hash_candidates(&self.config.root, &self.config.scan_config, events)?;
        errors.extend(scan.errors.iter().map(ToString::to_string));

        let metas: HashMap<PathBuf, FileMeta> = scan
            .files
            .into_iter()
            .map(|meta| (meta.full_path.clone(), meta))
            .collect();
        let mut paths: Vec<PathBuf> = metas.keys().cloned().collect();
        paths.sort();

        // Phase 2: Hashing
        events.send(Event::Pipeline(PipelineEvent::PhaseChanged {
            phase: PipelinePhase::Hashing,
        }));
        let results = {
            // Handles live only for this block and are closed on every path
            let mut handles: HashMap<PathBuf, File> = HashMap::with_capacity(paths.len());
            for path in &paths {
                match File::open(path) {
                    Ok(file) => {
                        handles.insert(path.clone(), file);
                    }
                    Err(e) => {
                        tracing::warn!(path = %path.display(), error = %e, "cannot open image");
                        errors.push(format!("Failed to open {}: {}", path.display(), e));
                    }
                }
            }

            self.config
                .hasher
                .clone()
                .build()
                .compute_with_events(&paths, &handles, events)
        };

        for (path, reason) in results.failure_reasons() {
            errors.push(format!("{}: {}", path.display(), reason));
        }
        let fingerprints = results.fingerprints();

        // Phase 3: Grouping
        events.send(Event::Pipeline(PipelineEvent::PhaseChanged {
            phase: PipelinePhase::Grouping,
        }));
        let groups = SimilarityGrouper::new(self.config.strategy).group_with_events(&fingerprints, events);
        let groups: Vec<GroupReport> = groups
            .into_iter()
            .filter_map(|group| attach_metadata(group, &metas, &fingerprints))
            .collect();

        let duration_ms = start_time.elapsed().as_millis() as u64;
        let report = DuplicateReport {
            groups,
            total_images: paths.len(),
            hashed: results.hashed_count(),
            failed: results.failed(),
            errors,
            duration_ms,
        };

        events.send(Event::Pipeline(PipelineEvent::Completed {
            summary: PipelineSummary {
                total_images: report.total_images,
                hashed: report.hashed,
                groups: report.groups.len(),
                duration_ms,
            },
        }));
        tracing::info!(
            root = %self.config.root.display(),
            images = report.total_images,
            hashed = report.hashed,
            groups = report.groups.len(),
            duration_ms,
            "duplicate scan finished"
        );

        Ok(report)
    }
}

fn attach_metadata(
    group: SimilarityGroup,
    metas: &HashMap<PathBuf, FileMeta>,
    fingerprints: &HashMap<PathBuf, Fingerprint>,
) -> Option<GroupReport> {
    let fingerprint = *fingerprints.get(group.members.first()?)?;
    let files = group
        .members
        .iter()
        .filter_map(|path| metas.get(path).cloned())
        .collect();
    Some(GroupReport {
        id: group.id,
        fingerprint,
        files,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{MediaTidyError, ScanError};
    use image::{Rgb, RgbImage};
    use std::path::Path;
    use tempfile::TempDir;

    fn write_jpeg(path: &Path, split_vertical: bool) {
        RgbImage::from_fn(64, 64, |x, y| {
            let bright = if split_vertical { x < 32 } else { y < 32 };
            if bright {
                Rgb([240, 240, 240])
            } else {
                Rgb([10, 10, 10])
            }
        })
        .save(path)
        .unwrap();
    }

    #[test]
    fn builder_sets_config() {
        let pipeline = DuplicatePipeline::builder()
            .root("/photos")
            .chunk_size(50)
            .workers(2)
            .strategy(GroupingStrategy::ExactBuckets)
            .build();

        assert_eq!(pipeline.config().root, PathBuf::from("/photos"));
        assert_eq!(pipeline.config().strategy, GroupingStrategy::ExactBuckets);
    }

    #[test]
    fn empty_directory_has_no_groups() {
        let temp = TempDir::new().unwrap();
        let report = DuplicatePipeline::builder().root(temp.path()).build().run().unwrap();

        assert_eq!(report.total_images, 0);
        assert!(report.groups.is_empty());
    }

    #[test]
    fn missing_root_is_an_error() {
        let temp = TempDir::new().unwrap();
        let result = DuplicatePipeline::builder()
            .root(temp.path().join("nope"))
            .build()
            .run();

        assert!(matches!(
            result,
            Err(MediaTidyError::Scan(ScanError::DirectoryNotFound { .. }))
        ));
    }

    #[test]
    fn copies_are_grouped_with_metadata() {
        let temp = TempDir::new().unwrap();
        write_jpeg(&temp.path().join("a.jpg"), true);
        write_jpeg(&temp.path().join("b.jpg"), true);
        write_jpeg(&temp.path().join("c.jpg"), false);

        let report = DuplicatePipeline::builder()
            .root(temp.path())
            .chunk_size(1)
            .build()
            .run()
            .unwrap();

        assert_eq!(report.total_images, 3);
        assert_eq!(report.hashed, 3);
        assert_eq!(report.groups.len(), 1);
        let names: Vec<_> = report.groups[0].files.iter().map(|f| f.file_name.as_str()).collect();
        assert_eq!(names, vec!["a.jpg", "b.jpg"]);
        assert_eq!(report.duplicate_count(), 1);
        assert_eq!(report.reclaimable_bytes(), report.groups[0].files[1].size);
    }

    #[test]
    fn phases_are_announced_in_order() {
        let temp = TempDir::new().unwrap();
        write_jpeg(&temp.path().join("a.jpg"), true);
        let (sender, receiver) = crate::events::EventChannel::new();

        DuplicatePipeline::builder()
            .root(temp.path())
            .build()
            .run_with_events(&sender)
            .unwrap();
        drop(sender);

        let phases: Vec<PipelinePhase> = receiver
            .iter()
            .filter_map(|e| match e {
                Event::Pipeline(PipelineEvent::PhaseChanged { phase }) => Some(phase),
                _ => None,
            })
            .collect();
        assert_eq!(
            phases,
            vec![PipelinePhase::Scanning, PipelinePhase::Hashing, PipelinePhase::Grouping]
        );
    }
}
