use crate::classifiers::attribute_class_observers::AttributeObserver;
use crate::classifiers::bayes::partitioned::StatSnapshot;
use std::collections::BTreeMap;
use std::sync::mpsc::Receiver;

/// Latest snapshot per attribute range, as seen by a model consumer.
///
/// A newly arrived snapshot replaces the previous one for the same
/// `[i_min, i_max]`; snapshots themselves are never modified.
#[derive(Debug, Default)]
pub struct SnapshotBoard {
    by_range: BTreeMap<(usize, usize), StatSnapshot>,
    received: u64,
}

impl SnapshotBoard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update(&mut self, snapshot: StatSnapshot) {
        self.received += 1;
        self.by_range
            .insert((snapshot.i_min, snapshot.i_max), snapshot);
    }

    /// Blocks until every sender of `rx` has gone away.
    pub fn collect_from(&mut self, rx: &Receiver<StatSnapshot>) {
        for snapshot in rx.iter() {
            self.update(snapshot);
        }
    }

    pub fn received(&self) -> u64 {
        self.received
    }

    pub fn snapshots(&self) -> impl Iterator<Item = &StatSnapshot> {
        self.by_range.values()
    }

    pub fn snapshot_covering(&self, attribute_index: usize) -> Option<&StatSnapshot> {
        self.by_range
            .range(..=(attribute_index, usize::MAX))
            .next_back()
            .map(|(_, s)| s)
            .filter(|s| s.covers(attribute_index))
    }

    pub fn observer_at(&self, attribute_index: usize) -> Option<&AttributeObserver> {
        self.snapshot_covering(attribute_index)?
            .observer_at(attribute_index)
    }

    /// True once `[0, number_of_attributes - 1]` is covered without gaps.
    pub fn covers_all(&self, number_of_attributes: usize) -> bool {
        let mut next = 0;
        for &(i_min, i_max) in self.by_range.keys() {
            if i_min != next {
                return false;
            }
            next = i_max + 1;
        }
        next == number_of_attributes
    }

    /// True when every held snapshot is the last one of its processor.
    pub fn is_final(&self) -> bool {
        !self.by_range.is_empty() && self.by_range.values().all(|s| s.is_last)
    }

    /// Class-prior weights kept in the class-index slot, one entry per class.
    pub fn class_prior_weights(
        &self,
        class_index: usize,
        number_of_classes: usize,
    ) -> Option<Vec<f64>> {
        let prior = self.observer_at(class_index)?.as_nominal()?;
        Some((0..number_of_classes).map(|j| prior.weight_of(0, j)).collect())
    }
}
