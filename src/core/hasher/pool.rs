//! Fixed-size worker pool that fingerprints images in chunks.
//!
//! Chunks of paths go through a bounded task queue to `workers` long-lived
//! threads. Each worker hashes its chunk sequentially and pushes one
//! outcome per path to a shared result channel, which the calling thread
//! drains. Arrival order is unspecified; results are keyed by path.
//! Repeated paths are hashed once, so no handle is read by two workers.

use super::traits::{Fingerprint, HashAlgorithm};
use super::HasherConfig;
use crate::error::HashError;
use crate::events::{null_sender, Event, EventSender, HashEvent, HashProgress};
use crossbeam_channel::{bounded, unbounded};
use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::path::{Path, PathBuf};
use std::thread;

/// Per-path fingerprinting outcomes.
///
/// Every submitted path is present: `Some` for a fingerprint, `None` when
/// the file could not be decoded or hashed.
#[derive(Debug, Default)]
pub struct HashResults {
    outcomes: HashMap<PathBuf, Option<Fingerprint>>,
    failures: Vec<(PathBuf, String)>,
}

impl HashResults {
    /// Outcome for one path; `None` if the path was never submitted
    pub fn get(&self, path: &Path) -> Option<Option<Fingerprint>> {
        self.outcomes.get(path).copied()
    }

    /// Only the successfully fingerprinted files
    pub fn fingerprints(&self) -> HashMap<PathBuf, Fingerprint> {
        self.outcomes
            .iter()
            .filter_map(|(path, hash)| hash.map(|h| (path.clone(), h)))
            .collect()
    }

    /// Paths that produced no fingerprint, sorted
    pub fn failed(&self) -> Vec<PathBuf> {
        let mut failed: Vec<PathBuf> = self
            .outcomes
            .iter()
            .filter(|(_, hash)| hash.is_none())
            .map(|(path, _)| path.clone())
            .collect();
        failed.sort();
        failed
    }

    /// Why each failed path failed
    pub fn failure_reasons(&self) -> &[(PathBuf, String)] {
        &self.failures
    }

    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    pub fn hashed_count(&self) -> usize {
        self.outcomes.values().filter(|h| h.is_some()).count()
    }

    pub fn failed_count(&self) -> usize {
        self.outcomes.values().filter(|h| h.is_none()).count()
    }

}

/// Fingerprints batches of images over open file handles
pub struct HashComputer {
    config: HasherConfig,
    algorithm: Box<dyn HashAlgorithm>,
}

impl HashComputer {
    pub fn new(config: HasherConfig, algorithm: Box<dyn HashAlgorithm>) -> Self {
        Self { config, algorithm }
    }

    pub fn config(&self) -> &HasherConfig {
        &self.config
    }

    /// Fingerprint every path using the caller's open handles.
    ///
    /// The caller owns the handles and closes them; a path without a handle
    /// is reported as failed. A path listed more than once is hashed once
    /// and has a single outcome.
    pub fn compute(&self, paths: &[PathBuf], handles: &HashMap<PathBuf, File>) -> HashResults {
        self.compute_with_events(paths, handles, &null_sender())
    }

    /// Like [`compute`](Self::compute), reporting progress via events
    pub fn compute_with_events(
        &self,
        paths: &[PathBuf],
        handles: &HashMap<PathBuf, File>,
        events: &EventSender,
    ) -> HashResults {
        let mut results = HashResults::default();
        if paths.is_empty() {
            return results;
        }

        let mut seen = HashSet::with_capacity(paths.len());
        let unique: Vec<&PathBuf> = paths.iter().filter(|p| seen.insert(*p)).collect();
        if unique.len() < paths.len() {
            tracing::debug!(skipped = paths.len() - unique.len(), "duplicate paths ignored");
        }

        let chunks: Vec<&[&PathBuf]> = unique.chunks(self.config.chunk_size_value()).collect();
        let workers = self.config.workers_value().min(chunks.len());
        let total = unique.len();

        events.send(Event::Hash(HashEvent::Started {
            total_images: total,
            chunks: chunks.len(),
        }));
        tracing::info!(
            images = total,
            chunks = chunks.len(),
            workers,
            algorithm = self.algorithm.name(),
            "hashing started"
        );

        let (task_tx, task_rx) = bounded::<&[&PathBuf]>(workers);
        let (result_tx, result_rx) = unbounded::<(PathBuf, Result<Fingerprint, HashError>)>();

        thread::scope(|scope| {
            for _ in 0..workers {
                let task_rx = task_rx.clone();
                let result_tx = result_tx.clone();
                scope.spawn(move || {
                    for chunk in task_rx.iter() {
                        for &path in chunk {
                            let outcome = self.hash_one(path, handles);
                            if result_tx.send((path.clone(), outcome)).is_err() {
                                return;
                            }
                        }
                    }
                });
            }
            // Workers hold the only remaining copies
            drop(task_rx);
            drop(result_tx);

            for chunk in chunks {
                if task_tx.send(chunk).is_err() {
                    break;
                }
            }
            drop(task_tx);

            let mut completed = 0;
            for (path, outcome) in result_rx.iter() {
                completed += 1;
                let fingerprint = match outcome {
                    Ok(hash) => {
                        tracing::debug!(path = %path.display(), hash = %hash, "hashed");
                        Some(hash)
                    }
                    Err(e) => {
                        tracing::warn!(path = %path.display(), error = %e, "no fingerprint");
                        events.send(Event::Hash(HashEvent::Error {
                            path: path.clone(),
                            message: e.to_string(),
                        }));
                        results.failures.push((path.clone(), e.to_string()));
                        None
                    }
                };
                events.send(Event::Hash(HashEvent::Progress(HashProgress {
                    completed,
                    total,
                    current_path: path.clone(),
                })));
                results.outcomes.insert(path, fingerprint);
            }
        });

        events.send(Event::Hash(HashEvent::Completed {
            hashed: results.hashed_count(),
            failed: results.failed_count(),
        }));
        tracing::info!(
            hashed = results.hashed_count(),
            failed = results.failed_count(),
            "hashing finished"
        );

        results
    }

    fn hash_one(&self, path: &Path, handles: &HashMap<PathBuf, File>) -> Result<Fingerprint, HashError> {
        let file = handles.get(path).ok_or_else(|| HashError::MissingHandle {
            path: path.to_path_buf(),
        })?;
        self.algorithm.hash_handle(path, file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::hasher::AverageHasher;
    use crate::events::EventChannel;
    use image::{Rgb, RgbImage};
    use std::io::Write;
    use tempfile::TempDir;

    fn write_jpeg(dir: &Path, name: &str, bright_left: bool) -> PathBuf {
        let path = dir.join(name);
        RgbImage::from_fn(64, 64, |x, _| {
            if (x < 32) == bright_left {
                Rgb([250, 250, 250])
            } else {
                Rgb([5, 5, 5])
            }
        })
        .save(&path)
        .unwrap();
        path
    }

    fn open_all(paths: &[PathBuf]) -> HashMap<PathBuf, File> {
        paths
            .iter()
            .map(|p| (p.clone(), File::open(p).unwrap()))
            .collect()
    }

    fn computer(chunk_size: usize, workers: usize) -> HashComputer {
        HashComputer::new(
            HasherConfig::new().chunk_size(chunk_size).workers(workers),
            Box::new(AverageHasher::new()),
        )
    }

    #[test]
    fn empty_input_returns_empty_results() {
        let results = computer(200, 4).compute(&[], &HashMap::new());
        assert!(results.is_empty());
    }

    #[test]
    fn every_path_gets_an_outcome_across_chunks() {
        let temp = TempDir::new().unwrap();
        let paths: Vec<PathBuf> = (0..7)
            .map(|i| write_jpeg(temp.path(), &format!("{i}.jpg"), i % 2 == 0))
            .collect();
        let handles = open_all(&paths);

        // 7 paths in chunks of 2 over 2 workers
        let results = computer(2, 2).compute(&paths, &handles);

        assert_eq!(results.len(), 7);
        assert_eq!(results.hashed_count(), 7);
        for path in &paths {
            assert!(matches!(results.get(path), Some(Some(_))));
        }
    }

    #[test]
    fn missing_handle_is_reported_as_failed() {
        let temp = TempDir::new().unwrap();
        let opened = write_jpeg(temp.path(), "a.jpg", true);
        let unopened = temp.path().join("b.jpg");
        let handles = open_all(std::slice::from_ref(&opened));

        let results = computer(200, 2).compute(&[opened.clone(), unopened.clone()], &handles);

        assert!(results.get(&opened).flatten().is_some());
        assert_eq!(results.get(&unopened), Some(None));
        assert_eq!(results.failed(), vec![unopened]);
    }

    #[test]
    fn corrupt_file_does_not_abort_batch() {
        let temp = TempDir::new().unwrap();
        let good = write_jpeg(temp.path(), "good.jpg", true);
        let bad = temp.path().join("bad.jpg");
        File::create(&bad).unwrap().write_all(b"not a jpeg at all").unwrap();
        let paths = vec![good.clone(), bad.clone()];
        let handles = open_all(&paths);

        let results = computer(1, 2).compute(&paths, &handles);

        assert_eq!(results.hashed_count(), 1);
        assert_eq!(results.failed(), vec![bad.clone()]);
        assert_eq!(results.failure_reasons().len(), 1);
        assert_eq!(results.failure_reasons()[0].0, bad);
    }

    #[test]
    fn progress_events_cover_every_path() {
        let temp = TempDir::new().unwrap();
        let paths: Vec<PathBuf> = (0..3)
            .map(|i| write_jpeg(temp.path(), &format!("{i}.jpg"), true))
            .collect();
        let handles = open_all(&paths);
        let (sender, receiver) = EventChannel::new();

        computer(1, 3).compute_with_events(&paths, &handles, &sender);
        drop(sender);

        let progress = receiver
            .iter()
            .filter(|e| matches!(e, Event::Hash(HashEvent::Progress(_))))
            .count();
        assert_eq!(progress, 3);
    }

    #[test]
    fn repeated_paths_are_hashed_once() {
        let temp = TempDir::new().unwrap();
        let a = write_jpeg(temp.path(), "a.jpg", true);
        let b = write_jpeg(temp.path(), "b.jpg", false);
        let paths = vec![a.clone(), a.clone(), b.clone(), a.clone()];
        let handles = open_all(&[a.clone(), b.clone()]);
        let (sender, receiver) = EventChannel::new();

        // One path per chunk so the copies would land on different workers
        let results = computer(1, 4).compute_with_events(&paths, &handles, &sender);
        drop(sender);

        assert_eq!(results.len(), 2);
        assert_eq!(results.hashed_count(), 2);
        assert_ne!(results.get(&a).flatten(), results.get(&b).flatten());
        let progress = receiver
            .iter()
            .filter(|e| matches!(e, Event::Hash(HashEvent::Progress(_))))
            .count();
        assert_eq!(progress, 2);
    }
}
