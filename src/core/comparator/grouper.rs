//! Clusters identical fingerprints into duplicate groups.
//!
//! If A matches B and B matches C, then {A, B, C} forms a single group.

use super::union_find::DisjointSet;
use super::{GroupingStrategy, SimilarityGroup};
use crate::core::hasher::Fingerprint;
use crate::events::{null_sender, Event, EventSender, GroupEvent};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Groups paths whose fingerprints are identical
#[derive(Debug, Clone, Copy, Default)]
pub struct SimilarityGrouper {
    strategy: GroupingStrategy,
}

impl SimilarityGrouper {
    pub fn new(strategy: GroupingStrategy) -> Self {
        Self { strategy }
    }

    pub fn strategy(&self) -> GroupingStrategy {
        self.strategy
    }

    /// Partition fingerprinted paths into groups of two or more.
    ///
    /// Output is deterministic: members are sorted, groups are ordered by
    /// their smallest member and numbered from 1.
    pub fn group(&self, fingerprints: &HashMap<PathBuf, Fingerprint>) -> Vec<SimilarityGroup> {
        self.group_with_events(fingerprints, &null_sender())
    }

    pub fn group_with_events(
        &self,
        fingerprints: &HashMap<PathBuf, Fingerprint>,
        events: &EventSender,
    ) -> Vec<SimilarityGroup> {
        events.send(Event::Group(GroupEvent::Started {
            total_fingerprints: fingerprints.len(),
        }));

        // Dense indices in path order keep the result independent of map order
        let mut entries: Vec<(&PathBuf, Fingerprint)> =
            fingerprints.iter().map(|(path, hash)| (path, *hash)).collect();
        entries.sort_by(|a, b| a.0.cmp(b.0));

        let mut set = DisjointSet::new(entries.len());
        match self.strategy {
            GroupingStrategy::PairwiseScan => pairwise(&entries, &mut set, events),
            GroupingStrategy::ExactBuckets => buckets(&entries, &mut set, events),
        }

        let groups: Vec<SimilarityGroup> = set
            .sets()
            .into_iter()
            .filter(|members| members.len() >= 2)
            .enumerate()
            .map(|(i, members)| SimilarityGroup {
                id: i + 1,
                members: members.into_iter().map(|idx| entries[idx].0.clone()).collect(),
            })
            .collect();

        let grouped_images = groups.iter().map(|g| g.members.len()).sum();
        events.send(Event::Group(GroupEvent::Completed {
            groups: groups.len(),
            grouped_images,
        }));
        tracing::info!(
            fingerprints = entries.len(),
            groups = groups.len(),
            grouped_images,
            strategy = ?self.strategy,
            "grouping finished"
        );

        groups
    }
}

fn found(events: &EventSender, first: &Path, second: &Path) {
    tracing::debug!(first = %first.display(), second = %second.display(), "identical fingerprints");
    events.send(Event::Group(GroupEvent::MatchFound {
        first: first.to_path_buf(),
        second: second.to_path_buf(),
    }));
}

fn pairwise(entries: &[(&PathBuf, Fingerprint)], set: &mut DisjointSet, events: &EventSender) {
    for i in 0..entries.len() {
        for j in (i + 1)..entries.len() {
            if entries[i].1.distance(&entries[j].1) == 0 && set.union(i, j) {
                found(events, entries[i].0, entries[j].0);
            }
        }
    }
}

fn buckets(entries: &[(&PathBuf, Fingerprint)], set: &mut DisjointSet, events: &EventSender) {
    let mut first_seen: HashMap<Fingerprint, usize> = HashMap::with_capacity(entries.len());
    for (index, (path, hash)) in entries.iter().enumerate() {
        match first_seen.get(hash) {
            Some(&head) => {
                if set.union(head, index) {
                    found(events, entries[head].0, path);
                }
            }
            None => {
                first_seen.insert(*hash, index);
            }
        }
    }
}
