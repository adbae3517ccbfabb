use crate::classifiers::attribute_class_observers::{AttributeClassObserver, AttributeObserver};
use crate::classifiers::bayes::partitioned::{AttributePartition, ConfigError, StatSnapshot};
use crate::core::attributes::Attribute;
use crate::core::events::{InstanceBatch, InstanceEvent};
use crate::core::instance_header::InstanceHeader;
use crate::core::instances::Instance;
use log::{debug, error, info, warn};
use std::num::NonZeroUsize;
use std::sync::Arc;
use std::sync::mpsc::Sender;

/// Events an [`AttributeStatProcessor`] accepts.
#[derive(Debug, Clone, Copy)]
pub enum ProcessorEvent<'a> {
    Instance(&'a InstanceEvent),
    Batch(&'a InstanceBatch),
}

impl ProcessorEvent<'_> {
    pub fn is_last(&self) -> bool {
        match self {
            ProcessorEvent::Instance(ev) => ev.is_last,
            ProcessorEvent::Batch(batch) => batch.is_last(),
        }
    }
}

/// What happened to one training instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrainOutcome {
    /// Every owned attribute was observed.
    Trained,
    /// A nominal value out of its domain was met at `attribute_index`; the
    /// attributes before it were observed, the rest of the instance skipped.
    Truncated { attribute_index: usize },
    /// Missing or unknown class label; nothing was counted.
    Rejected,
    /// The processor owns no attributes.
    Inert,
}

/// Counters of one processor, reported when it stops.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartitionSummary {
    pub partition: AttributePartition,
    pub n_train: u64,
    pub n_train_per_class: Vec<u64>,
    pub snapshots_emitted: u64,
}

/// Keeps P(Xi|Cj) statistics for the attribute range it owns.
///
/// Every processor of a topology sees every training instance but only
/// updates the observers of its own range, so processors never touch each
/// other's state. After every `update_frequency` trained instances the
/// observers are copied into a [`StatSnapshot`] and sent to the model.
///
/// When the owned range contains the class index, that slot does not model a
/// feature: it accumulates class-prior counts, keyed by class value, under
/// class slot 0.
pub struct AttributeStatProcessor {
    partition: AttributePartition,
    header: Arc<InstanceHeader>,
    number_of_classes: usize,

    attribute_observers: Vec<AttributeObserver>,
    n_train_per_class: Vec<u64>,
    n_train: u64,

    update_frequency: usize,
    n_trained_instances_before_update: usize,
    snapshots_emitted: u64,

    snapshot_tx: Sender<StatSnapshot>,
    receiver_gone: bool,
}

impl AttributeStatProcessor {
    pub fn new(
        header: Arc<InstanceHeader>,
        processor_id: usize,
        parallelism: usize,
        update_frequency: NonZeroUsize,
        snapshot_tx: Sender<StatSnapshot>,
    ) -> Result<Self, ConfigError> {
        header
            .check_classification()
            .map_err(ConfigError::InvalidHeader)?;
        let partition =
            AttributePartition::assign(processor_id, parallelism, header.number_of_attributes())?;

        let (attribute_observers, n_train_per_class) = if partition.is_degenerate() {
            info!(
                "AttributeStatProcessor(id={processor_id}) owns nothing, M={}, P={parallelism}",
                header.number_of_attributes()
            );
            (Vec::new(), Vec::new())
        } else {
            let observers = partition
                .indices()
                .map(|i| AttributeObserver::for_attribute(&header.attributes[i]))
                .collect();
            info!(
                "AttributeStatProcessor created, id={processor_id}, i_min={}, i_max={}",
                partition.i_min(),
                partition.i_min() + partition.i_range() - 1
            );
            (observers, vec![0; header.number_of_classes()])
        };

        Ok(Self {
            partition,
            number_of_classes: header.number_of_classes(),
            header,
            attribute_observers,
            n_train_per_class,
            n_train: 0,
            update_frequency: update_frequency.get(),
            n_trained_instances_before_update: 0,
            snapshots_emitted: 0,
            snapshot_tx,
            receiver_gone: false,
        })
    }

    /// Handles one event. Returns `false` when the event does not apply to
    /// this processor, which is always the case for a degenerate partition.
    ///
    /// Testing instances are acknowledged and ignored. A last event logs the
    /// final counters and publishes a final snapshot.
    pub fn process(&mut self, event: ProcessorEvent<'_>) -> bool {
        if self.partition.is_degenerate() {
            debug!(
                "AttributeStatProcessor(id={}) owns no attributes, event ignored",
                self.partition.owner_id()
            );
            return false;
        }

        // the final record leaves its cadence snapshot to the final one
        match event {
            ProcessorEvent::Instance(ev) if ev.is_training() => {
                self.train(&ev.instance, !ev.is_last);
            }
            ProcessorEvent::Batch(batch) if batch.is_training() => {
                let final_record = batch.is_last().then(|| batch.len().saturating_sub(1));
                for (k, instance) in batch.instances().iter().enumerate() {
                    self.train(instance, final_record != Some(k));
                }
            }
            _ => {}
        }

        if event.is_last() {
            self.show_final_stat();
            self.publish(true);
        }
        true
    }

    pub fn train_on_batch(&mut self, batch: &InstanceBatch) {
        for instance in batch.instances() {
            self.train_on_instance(instance);
        }
    }

    pub fn train_on_instance(&mut self, instance: &dyn Instance) -> TrainOutcome {
        self.train(instance, true)
    }

    fn train(&mut self, instance: &dyn Instance, publish_on_cadence: bool) -> TrainOutcome {
        if self.partition.is_degenerate() {
            return TrainOutcome::Inert;
        }

        let outcome = self.observe_instance(instance);
        if publish_on_cadence
            && outcome != TrainOutcome::Rejected
            && self.n_trained_instances_before_update >= self.update_frequency
        {
            self.publish(false);
        }
        outcome
    }

    fn observe_instance(&mut self, instance: &dyn Instance) -> TrainOutcome {
        let Some(class_val) = self.class_of(instance) else {
            error!(
                "AttributeStatProcessor(id={}): invalid class value {:?}, record skipped: {:?}",
                self.partition.owner_id(),
                instance.class_value(),
                instance.to_vec()
            );
            return TrainOutcome::Rejected;
        };

        self.n_train_per_class[class_val] += 1;
        self.n_train += 1;
        self.n_trained_instances_before_update += 1;

        let class_index = self.header.class_index();
        let weight = instance.weight();

        for (k, i) in self.partition.indices().enumerate() {
            let observer = &mut self.attribute_observers[k];

            if i == class_index {
                observer.observe_attribute_class(class_val as f64, 0, weight);
                continue;
            }

            let value = instance.value_at_index(i).unwrap_or(f64::NAN);
            if let Attribute::Nominal(attribute) = &self.header.attributes[i] {
                if !value.is_nan() && !attribute.is_valid_value(value) {
                    error!(
                        "invalid data [{value}] at attribute [{i}], rest of record skipped: {:?}",
                        instance.to_vec()
                    );
                    return TrainOutcome::Truncated { attribute_index: i };
                }
            }
            observer.observe_attribute_class(value, class_val, weight);
        }

        TrainOutcome::Trained
    }

    fn class_of(&self, instance: &dyn Instance) -> Option<usize> {
        let value = instance.class_value()?;
        (value >= 0.0 && value < self.number_of_classes as f64).then_some(value as usize)
    }

    fn publish(&mut self, is_last: bool) {
        let snapshot = StatSnapshot {
            processor_id: self.partition.owner_id(),
            i_min: self.partition.i_min(),
            i_max: self.partition.i_min() + self.partition.i_range() - 1,
            observers: Arc::new(self.attribute_observers.clone()),
            n_train: self.n_train,
            n_train_per_class: Arc::new(self.n_train_per_class.clone()),
            is_last,
        };
        debug!("publishing snapshot {snapshot}");

        if self.snapshot_tx.send(snapshot).is_err() && !self.receiver_gone {
            warn!(
                "AttributeStatProcessor(id={}): snapshot receiver disconnected, training continues",
                self.partition.owner_id()
            );
            self.receiver_gone = true;
        }
        self.snapshots_emitted += 1;
        self.n_trained_instances_before_update = 0;
    }

    fn show_final_stat(&self) {
        info!(
            " ------- AttributeStatProcessor(id={}) finished training",
            self.partition.owner_id()
        );
        info!(
            "K={}, i_min={}, i_max={}",
            self.number_of_classes,
            self.partition.i_min(),
            self.partition.i_min() + self.partition.i_range() - 1
        );
        info!("n_train={}", self.n_train);
        let per_class: String = self
            .n_train_per_class
            .iter()
            .map(|n| format!("|{n}"))
            .collect();
        info!("n_train[0~{}]={per_class}", self.number_of_classes);
    }

    pub fn partition(&self) -> AttributePartition {
        self.partition
    }

    pub fn attribute_observers(&self) -> &[AttributeObserver] {
        &self.attribute_observers
    }

    pub fn n_train(&self) -> u64 {
        self.n_train
    }

    pub fn n_train_per_class(&self) -> &[u64] {
        &self.n_train_per_class
    }

    pub fn summary(&self) -> PartitionSummary {
        PartitionSummary {
            partition: self.partition,
            n_train: self.n_train,
            n_train_per_class: self.n_train_per_class.clone(),
            snapshots_emitted: self.snapshots_emitted,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::events::Phase;
    use crate::core::instances::DenseInstance;
    use crate::testing::dummies::header_mixed;
    use std::sync::mpsc::{Receiver, channel};

    fn freq(n: usize) -> NonZeroUsize {
        NonZeroUsize::new(n).unwrap()
    }

    fn processor(
        id: usize,
        parallelism: usize,
        update_frequency: usize,
    ) -> (AttributeStatProcessor, Receiver<StatSnapshot>) {
        let (tx, rx) = channel();
        let p = AttributeStatProcessor::new(
            header_mixed(),
            id,
            parallelism,
            freq(update_frequency),
            tx,
        )
        .unwrap();
        (p, rx)
    }

    // color{red,green,blue}, size, shape{square,circle}, mass, class{a,b}
    fn row(values: [f64; 5]) -> DenseInstance {
        DenseInstance::with_default_weight(header_mixed(), values.to_vec())
    }

    fn batch(rows: Vec<DenseInstance>, phase: Phase, is_last: bool) -> InstanceBatch {
        let mut b = InstanceBatch::with_capacity(phase, rows.len());
        for r in rows {
            b.add(r);
        }
        b.set_last(is_last);
        b
    }

    #[test]
    fn ranges_follow_partition_rule() {
        let (p0, _rx0) = processor(0, 2, 10);
        let (p1, _rx1) = processor(1, 2, 10);
        assert_eq!(p0.partition().indices(), 0..2);
        assert_eq!(p1.partition().indices(), 2..5);
        assert_eq!(p0.attribute_observers().len(), 2);
        assert_eq!(p1.attribute_observers().len(), 3);
    }

    #[test]
    fn observer_variant_follows_owned_attribute_type() {
        let (p1, _rx) = processor(1, 2, 10);
        let obs = p1.attribute_observers();
        assert!(obs[0].as_nominal().is_some());
        assert!(obs[1].as_numeric().is_some());
        assert!(obs[2].as_nominal().is_some());
    }

    #[test]
    fn class_slot_accumulates_class_prior_counts() {
        let (mut p1, _rx) = processor(1, 2, 10);
        for class in [0.0, 1.0, 0.0] {
            assert_eq!(
                p1.train_on_instance(&row([0.0, 1.0, 1.0, 2.0, class])),
                TrainOutcome::Trained
            );
        }
        let prior = p1.attribute_observers()[2].as_nominal().unwrap();
        assert_eq!(prior.weight_of(0, 0), 2.0);
        assert_eq!(prior.weight_of(0, 1), 1.0);
        assert_eq!(prior.number_of_observed_classes(), 1);
        assert_eq!(p1.n_train_per_class(), &[2, 1]);
        assert_eq!(p1.n_train(), 3);
    }

    #[test]
    fn updates_only_owned_attributes() {
        let (mut p0, _rx) = processor(0, 2, 10);
        p0.train_on_instance(&row([2.0, 5.0, 1.0, 9.0, 1.0]));

        let color = p0.attribute_observers()[0].as_nominal().unwrap();
        assert_eq!(color.weight_of(1, 2), 1.0);
        let size = p0.attribute_observers()[1].as_numeric().unwrap();
        assert_eq!(size.estimator(1).unwrap().mean(), 5.0);
    }

    #[test]
    fn weights_scale_observer_updates_not_counters() {
        let (mut p0, _rx) = processor(0, 1, 10);
        let inst = DenseInstance::new(header_mixed(), vec![0.0, 1.0, 0.0, 1.0, 1.0], 2.5);
        p0.train_on_instance(&inst);

        assert_eq!(p0.n_train(), 1);
        let color = p0.attribute_observers()[0].as_nominal().unwrap();
        assert_eq!(color.weight_of(1, 0), 2.5);
        let prior = p0.attribute_observers()[4].as_nominal().unwrap();
        assert_eq!(prior.weight_of(0, 1), 2.5);
    }

    #[test]
    fn out_of_domain_nominal_value_truncates_the_record() {
        let (mut p, _rx) = processor(0, 1, 10);
        // shape (index 2) only has two categories
        let outcome = p.train_on_instance(&row([1.0, 4.0, 7.0, 3.0, 0.0]));
        assert_eq!(outcome, TrainOutcome::Truncated { attribute_index: 2 });

        let obs = p.attribute_observers();
        assert_eq!(obs[0].total_weight_observed(), 1.0);
        assert_eq!(obs[1].total_weight_observed(), 1.0);
        assert_eq!(obs[2].total_weight_observed(), 0.0);
        assert_eq!(obs[3].total_weight_observed(), 0.0);
        assert_eq!(obs[4].total_weight_observed(), 0.0);
        assert_eq!(p.n_train(), 1);
        assert_eq!(p.n_train_per_class(), &[1, 0]);

        assert_eq!(
            p.train_on_instance(&row([1.0, 4.0, 1.0, 3.0, 0.0])),
            TrainOutcome::Trained
        );
        assert_eq!(p.attribute_observers()[2].total_weight_observed(), 1.0);
    }

    #[test]
    fn negative_nominal_value_is_malformed() {
        let (mut p, _rx) = processor(0, 1, 10);
        let outcome = p.train_on_instance(&row([-1.0, 4.0, 0.0, 3.0, 0.0]));
        assert_eq!(outcome, TrainOutcome::Truncated { attribute_index: 0 });
        assert!(
            p.attribute_observers()
                .iter()
                .all(|o| o.total_weight_observed() == 0.0)
        );
    }

    #[test]
    fn missing_values_are_not_malformed() {
        let (mut p, _rx) = processor(0, 1, 10);
        let outcome = p.train_on_instance(&row([f64::NAN, f64::NAN, 1.0, 3.0, 0.0]));
        assert_eq!(outcome, TrainOutcome::Trained);
        let color = p.attribute_observers()[0].as_nominal().unwrap();
        assert_eq!(color.missing_weight_observed(), 1.0);
        assert!(p.attribute_observers()[1].as_numeric().unwrap().estimator(0).is_none());
        assert_eq!(p.attribute_observers()[2].total_weight_observed(), 1.0);
    }

    #[test]
    fn bad_class_label_is_rejected_without_counting() {
        let (mut p, rx) = processor(0, 1, 1);
        assert_eq!(
            p.train_on_instance(&row([0.0, 1.0, 0.0, 1.0, 2.0])),
            TrainOutcome::Rejected
        );
        assert_eq!(
            p.train_on_instance(&row([0.0, 1.0, 0.0, 1.0, f64::NAN])),
            TrainOutcome::Rejected
        );
        assert_eq!(p.n_train(), 0);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn degenerate_processor_is_inert() {
        let (tx, rx) = channel();
        let mut p = AttributeStatProcessor::new(header_mixed(), 2, 8, freq(1), tx).unwrap();
        assert!(p.partition().is_degenerate());
        assert!(p.attribute_observers().is_empty());

        let ev = InstanceEvent::training(row([0.0, 1.0, 0.0, 1.0, 0.0])).last();
        assert!(!p.process(ProcessorEvent::Instance(&ev)));
        assert_eq!(
            p.train_on_instance(&row([0.0, 1.0, 0.0, 1.0, 0.0])),
            TrainOutcome::Inert
        );
        assert_eq!(p.n_train(), 0);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn publishes_every_update_frequency_instances() {
        let (mut p, rx) = processor(0, 1, 2);
        for i in 0..5 {
            p.train_on_instance(&row([0.0, i as f64, 0.0, 1.0, 0.0]));
        }
        let snaps: Vec<StatSnapshot> = rx.try_iter().collect();
        assert_eq!(snaps.len(), 2);
        assert_eq!(snaps[0].n_train, 2);
        assert_eq!(snaps[1].n_train, 4);
        assert!(snaps.iter().all(|s| !s.is_last));
        assert_eq!((snaps[0].i_min, snaps[0].i_max), (0, 4));
    }

    #[test]
    fn snapshot_is_detached_from_live_observers() {
        let (mut p, rx) = processor(0, 1, 1);
        p.train_on_instance(&row([0.0, 1.0, 0.0, 1.0, 0.0]));
        let first = rx.try_recv().unwrap();

        p.train_on_instance(&row([0.0, 3.0, 0.0, 1.0, 0.0]));
        assert_eq!(first.observers[0].total_weight_observed(), 1.0);
        assert_eq!(first.n_train, 1);
        assert_eq!(p.attribute_observers()[0].total_weight_observed(), 2.0);
    }

    #[test]
    fn batch_training_matches_single_instance_training() {
        let rows: Vec<DenseInstance> = (0..7)
            .map(|i| row([(i % 3) as f64, i as f64 * 0.5, (i % 2) as f64, 1.0, (i % 2) as f64]))
            .collect();

        let (mut single, single_rx) = processor(0, 1, 3);
        for r in &rows {
            single.train_on_instance(r);
        }

        let (mut batched, batched_rx) = processor(0, 1, 3);
        assert!(batched.process(ProcessorEvent::Batch(&batch(
            rows.clone(),
            Phase::Training,
            false
        ))));

        assert_eq!(single.attribute_observers(), batched.attribute_observers());
        assert_eq!(single.summary(), batched.summary());
        assert_eq!(single_rx.try_iter().count(), batched_rx.try_iter().count());
    }

    #[test]
    fn testing_events_are_acknowledged_but_ignored() {
        let (mut p, rx) = processor(0, 1, 1);
        let ev = InstanceEvent::testing(row([0.0, 1.0, 0.0, 1.0, 0.0]));
        assert!(p.process(ProcessorEvent::Instance(&ev)));
        let b = batch(vec![row([0.0, 1.0, 0.0, 1.0, 1.0])], Phase::Testing, false);
        assert!(p.process(ProcessorEvent::Batch(&b)));
        assert_eq!(p.n_train(), 0);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn last_batch_publishes_final_snapshot() {
        let (mut p, rx) = processor(1, 2, 100);
        let rows = vec![
            row([0.0, 1.0, 0.0, 1.0, 0.0]),
            row([0.0, 1.0, 1.0, 1.0, 1.0]),
        ];
        assert!(p.process(ProcessorEvent::Batch(&batch(rows, Phase::Training, true))));

        let snaps: Vec<StatSnapshot> = rx.try_iter().collect();
        assert_eq!(snaps.len(), 1);
        assert!(snaps[0].is_last);
        assert_eq!(snaps[0].n_train, 2);
        assert_eq!(snaps[0].n_train_per_class.as_slice(), &[1, 1]);
        assert_eq!(p.summary().snapshots_emitted, 1);
    }

    #[test]
    fn final_record_on_cadence_publishes_once() {
        let rows: Vec<DenseInstance> = (0..4)
            .map(|i| row([0.0, i as f64, 0.0, 1.0, (i % 2) as f64]))
            .collect();
        let (mut p, rx) = processor(0, 1, 2);
        assert!(p.process(ProcessorEvent::Batch(&batch(rows, Phase::Training, true))));

        let seen: Vec<(u64, bool)> = rx.try_iter().map(|s| (s.n_train, s.is_last)).collect();
        assert_eq!(seen, vec![(2, false), (4, true)]);
        assert_eq!(p.summary().snapshots_emitted, 2);

        let (mut q, rx) = processor(0, 1, 1);
        let ev = InstanceEvent::training(row([0.0, 1.0, 0.0, 1.0, 0.0])).last();
        assert!(q.process(ProcessorEvent::Instance(&ev)));
        let seen: Vec<(u64, bool)> = rx.try_iter().map(|s| (s.n_train, s.is_last)).collect();
        assert_eq!(seen, vec![(1, true)]);
    }

    #[test]
    fn training_survives_dropped_receiver() {
        let (mut p, rx) = processor(0, 1, 1);
        drop(rx);
        p.train_on_instance(&row([0.0, 1.0, 0.0, 1.0, 0.0]));
        p.train_on_instance(&row([0.0, 1.0, 0.0, 1.0, 1.0]));
        assert_eq!(p.n_train(), 2);
    }

    #[test]
    fn numeric_class_header_is_rejected() {
        let mut header = (*header_mixed()).clone();
        header.class_index = 1;
        let (tx, _rx) = channel();
        let err = AttributeStatProcessor::new(Arc::new(header), 0, 1, freq(1), tx)
            .err()
            .unwrap();
        assert!(matches!(err, ConfigError::InvalidHeader(_)));
    }
}
