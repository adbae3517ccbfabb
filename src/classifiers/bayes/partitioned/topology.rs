use crate::classifiers::bayes::partitioned::{
    AttributeStatProcessor, BatchSink, Distributor, DistributorError, Interrupter, PartitionSummary,
    PartitionedNaiveBayesConfig, ProcessorEvent, StatSnapshot, TopologyError,
};
use crate::core::events::{InstanceBatch, InstanceEvent, Phase};
use crate::core::instance_header::InstanceHeader;
use log::{info, warn};
use std::sync::Arc;
use std::sync::mpsc::{Receiver, SyncSender, channel, sync_channel};
use std::thread::{self, JoinHandle};
use strum::IntoEnumIterator;

/// Batches that may wait on one distributor link before `submit` blocks.
/// A stalled consumer holds back at most this many batches of `batch_size`
/// instances.
pub const LINK_CAPACITY: usize = 2;

/// Sends every batch to all downstream processors, waiting on any of them
/// whose link is full.
pub struct BroadcastSink {
    senders: Vec<SyncSender<Arc<InstanceBatch>>>,
}

impl BroadcastSink {
    pub fn new(senders: Vec<SyncSender<Arc<InstanceBatch>>>) -> Self {
        Self { senders }
    }
}

impl BatchSink for BroadcastSink {
    fn put(&mut self, batch: Arc<InstanceBatch>) -> Result<(), DistributorError> {
        let phase = batch.phase();
        for tx in &self.senders {
            tx.send(Arc::clone(&batch))
                .map_err(|_| DistributorError::Disconnected(phase))?;
        }
        Ok(())
    }
}

/// Sends each batch to one downstream consumer, rotating round-robin.
pub struct ShuffleSink {
    senders: Vec<SyncSender<Arc<InstanceBatch>>>,
    next: usize,
}

impl ShuffleSink {
    pub fn new(senders: Vec<SyncSender<Arc<InstanceBatch>>>) -> Self {
        Self { senders, next: 0 }
    }
}

impl BatchSink for ShuffleSink {
    fn put(&mut self, batch: Arc<InstanceBatch>) -> Result<(), DistributorError> {
        let phase = batch.phase();
        let Some(tx) = self.senders.get(self.next) else {
            return Err(DistributorError::Disconnected(phase));
        };
        self.next = (self.next + 1) % self.senders.len();
        tx.send(batch)
            .map_err(|_| DistributorError::Disconnected(phase))
    }
}

/// Running distributor plus one thread per attribute stat processor.
///
/// ```text
///                 |-------------- test (shuffle) ------------------------> model x p2
/// input --> [Distributor] -- train (all) --> [AttributeStatProcessor x p1] -- snapshots --> model
/// ```
pub struct PartitionedNaiveBayes;

impl PartitionedNaiveBayes {
    pub fn start(
        header: Arc<InstanceHeader>,
        config: &PartitionedNaiveBayesConfig,
    ) -> Result<TopologyHandle, TopologyError> {
        let config = config.validate()?;
        let parallelism = config.parallel_attribute_stat.get();
        info!("================================================");
        info!(
            "starting partitioned naive bayes on '{}': {} attributes, {} processors",
            header.relation_name(),
            header.number_of_attributes(),
            parallelism
        );

        let (snapshot_tx, snapshot_rx) = channel();
        let processors = (0..parallelism)
            .map(|id| {
                AttributeStatProcessor::new(
                    Arc::clone(&header),
                    id,
                    parallelism,
                    config.update_frequency,
                    snapshot_tx.clone(),
                )
            })
            .collect::<Result<Vec<_>, _>>()?;
        drop(snapshot_tx);

        let mut train_senders = Vec::with_capacity(parallelism);
        let mut workers = Vec::with_capacity(parallelism);
        for (id, processor) in processors.into_iter().enumerate() {
            let (tx, rx) = sync_channel(LINK_CAPACITY);
            train_senders.push(tx);
            workers.push(spawn_processor(id, processor, rx)?);
        }

        let (test_senders, test_batches): (Vec<_>, Vec<_>) =
            (0..config.parallel_model.get()).map(|_| sync_channel(LINK_CAPACITY)).unzip();

        let distributor = Distributor::new(
            &config,
            BroadcastSink::new(train_senders),
            ShuffleSink::new(test_senders),
        );
        info!("partitioned naive bayes topology started");

        Ok(TopologyHandle {
            distributor,
            workers,
            snapshots: Some(snapshot_rx),
            test_batches: Some(test_batches),
        })
    }
}

fn spawn_processor(
    id: usize,
    mut processor: AttributeStatProcessor,
    rx: Receiver<Arc<InstanceBatch>>,
) -> Result<JoinHandle<PartitionSummary>, TopologyError> {
    thread::Builder::new()
        .name(format!("attribute-stat-{id}"))
        .spawn(move || {
            for batch in rx.iter() {
                processor.process(ProcessorEvent::Batch(&batch));
                if batch.is_last() {
                    break;
                }
            }
            processor.summary()
        })
        .map_err(TopologyError::Spawn)
}

pub struct TopologyHandle {
    distributor: Distributor<BroadcastSink, ShuffleSink>,
    workers: Vec<JoinHandle<PartitionSummary>>,
    snapshots: Option<Receiver<StatSnapshot>>,
    test_batches: Option<Vec<Receiver<Arc<InstanceBatch>>>>,
}

impl TopologyHandle {
    pub fn submit(&mut self, event: InstanceEvent) -> Result<(), TopologyError> {
        Ok(self.distributor.submit(event)?)
    }

    /// Receiving end of the snapshot stream. Available once.
    pub fn take_snapshots(&mut self) -> Option<Receiver<StatSnapshot>> {
        self.snapshots.take()
    }

    /// One receiver per model consumer for testing batches. Available once.
    ///
    /// Testing batches that nobody reads fill their link and block `submit`.
    pub fn take_test_batches(&mut self) -> Option<Vec<Receiver<Arc<InstanceBatch>>>> {
        self.test_batches.take()
    }

    pub fn interrupter(&self) -> Interrupter {
        self.distributor.interrupter()
    }

    /// Stops accepting input and waits for every processor to drain its
    /// queue. Returns their summaries ordered by processor id.
    ///
    /// A stream that never saw its last instance is ended here: whatever is
    /// still buffered goes out as its terminal batch. The training stream is
    /// always ended so every processor publishes a final snapshot.
    pub fn finish(mut self) -> Result<Vec<PartitionSummary>, TopologyError> {
        for phase in Phase::iter() {
            if self.distributor.is_finished(phase) {
                continue;
            }
            if phase == Phase::Testing && self.distributor.submitted(phase) == 0 {
                continue;
            }
            warn!(
                "{phase} stream ended without a last instance, flushing {} waiting",
                self.distributor.waiting(phase)
            );
            self.distributor.flush_last(phase)?;
        }
        drop(self.distributor);

        let mut summaries = Vec::with_capacity(self.workers.len());
        for (id, worker) in self.workers.into_iter().enumerate() {
            let summary = worker
                .join()
                .map_err(|_| TopologyError::ProcessorPanicked(id))?;
            summaries.push(summary);
        }
        info!("partitioned naive bayes topology stopped");
        Ok(summaries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifiers::attribute_class_observers::AttributeClassObserver;
    use crate::classifiers::bayes::partitioned::{ConfigError, SnapshotBoard};
    use crate::core::instances::DenseInstance;
    use crate::testing::dummies::header_mixed;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    fn init_logs() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn config(
        p1: usize,
        p2: usize,
        batch_size: usize,
        update_frequency: Option<usize>,
    ) -> PartitionedNaiveBayesConfig {
        PartitionedNaiveBayesConfig {
            parallel_attribute_stat: p1,
            parallel_model: p2,
            batch_size,
            update_frequency,
        }
    }

    fn rows(n: usize) -> Vec<DenseInstance> {
        (0..n)
            .map(|i| {
                DenseInstance::with_default_weight(
                    header_mixed(),
                    vec![
                        (i % 3) as f64,
                        i as f64 * 0.25,
                        ((i / 2) % 2) as f64,
                        (i % 7) as f64,
                        (i % 2) as f64,
                    ],
                )
            })
            .collect()
    }

    fn run_training(
        p1: usize,
        batch_size: usize,
        n: usize,
    ) -> (Vec<PartitionSummary>, SnapshotBoard) {
        let mut handle = PartitionedNaiveBayes::start(
            header_mixed(),
            &config(p1, 1, batch_size, None),
        )
        .unwrap();
        let snapshots = handle.take_snapshots().unwrap();

        let data = rows(n);
        let count = data.len();
        for (i, row) in data.into_iter().enumerate() {
            let mut ev = InstanceEvent::training(row);
            ev.is_last = i + 1 == count;
            handle.submit(ev).unwrap();
        }
        let summaries = handle.finish().unwrap();

        let mut board = SnapshotBoard::new();
        board.collect_from(&snapshots);
        (summaries, board)
    }

    #[test]
    fn every_processor_counts_every_instance() {
        init_logs();
        let (summaries, board) = run_training(2, 3, 7);

        assert_eq!(summaries.len(), 2);
        for s in &summaries {
            assert_eq!(s.n_train, 7);
            assert_eq!(s.n_train_per_class, vec![4, 3]);
            assert_eq!(s.n_train_per_class.iter().sum::<u64>(), s.n_train);
        }
        assert_eq!(summaries[0].partition.indices(), 0..2);
        assert_eq!(summaries[1].partition.indices(), 2..5);

        assert!(board.covers_all(5));
        assert!(board.is_final());
        assert_eq!(board.class_prior_weights(4, 2), Some(vec![4.0, 3.0]));
    }

    #[test]
    fn partitioned_statistics_equal_single_processor_statistics() {
        init_logs();
        let (_, single) = run_training(1, 4, 50);
        for p1 in [2, 3, 5] {
            let (_, split) = run_training(p1, 4, 50);
            assert!(split.covers_all(5), "P={p1}");
            for i in 0..5 {
                assert_eq!(split.observer_at(i), single.observer_at(i), "P={p1} attribute {i}");
            }
        }
    }

    #[test]
    fn surplus_processors_stay_inert() {
        init_logs();
        let (summaries, board) = run_training(7, 2, 9);
        let active: Vec<&PartitionSummary> = summaries
            .iter()
            .filter(|s| !s.partition.is_degenerate())
            .collect();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].partition.owner_id(), 6);
        assert_eq!(active[0].n_train, 9);
        assert!(
            summaries
                .iter()
                .filter(|s| s.partition.is_degenerate())
                .all(|s| s.n_train == 0 && s.snapshots_emitted == 0)
        );
        assert_eq!(board.snapshots().count(), 1);
        let numeric = board.observer_at(3).unwrap();
        assert_eq!(numeric.total_weight_observed(), 9.0);
    }

    #[test]
    fn test_batches_are_shuffled_across_model_consumers() {
        init_logs();
        let mut handle =
            PartitionedNaiveBayes::start(header_mixed(), &config(2, 3, 1, None)).unwrap();
        let consumers = handle.take_test_batches().unwrap();
        assert!(handle.take_test_batches().is_none());

        let data = rows(7);
        for (i, row) in data.into_iter().enumerate() {
            let mut ev = InstanceEvent::testing(row);
            ev.is_last = i == 6;
            handle.submit(ev).unwrap();
        }
        handle.finish().unwrap();

        // test batch size is 2: batches of 2, 2, 2, 1
        let per_consumer: Vec<Vec<usize>> = consumers
            .iter()
            .map(|rx| rx.try_iter().map(|b| b.len()).collect())
            .collect();
        assert_eq!(per_consumer, vec![vec![2, 1], vec![2], vec![2]]);
    }

    #[test]
    fn invalid_config_fails_before_start() {
        let err = PartitionedNaiveBayes::start(header_mixed(), &config(0, 1, 3, None))
            .err()
            .unwrap();
        assert!(matches!(
            err,
            TopologyError::Config(ConfigError::InvalidParameter(_))
        ));
    }

    #[test]
    fn snapshots_follow_update_frequency() {
        init_logs();
        let mut handle =
            PartitionedNaiveBayes::start(header_mixed(), &config(1, 1, 5, Some(4))).unwrap();
        let snapshots = handle.take_snapshots().unwrap();
        for (i, row) in rows(10).into_iter().enumerate() {
            let mut ev = InstanceEvent::training(row);
            ev.is_last = i == 9;
            handle.submit(ev).unwrap();
        }
        let summaries = handle.finish().unwrap();

        let seen: Vec<(u64, bool)> = snapshots.iter().map(|s| (s.n_train, s.is_last)).collect();
        assert_eq!(seen, vec![(4, false), (8, false), (10, true)]);
        assert_eq!(summaries[0].snapshots_emitted, 3);
    }

    #[test]
    fn stalled_consumer_blocks_submit_until_drained() {
        let (tx, rx) = sync_channel(1);
        let (test_tx, _test_rx) = sync_channel(1);
        let validated = config(1, 1, 1, None).validate().unwrap();
        let accepted = Arc::new(AtomicUsize::new(0));

        let producer = {
            let accepted = Arc::clone(&accepted);
            thread::spawn(move || {
                let mut distributor = Distributor::new(
                    &validated,
                    BroadcastSink::new(vec![tx]),
                    ShuffleSink::new(vec![test_tx]),
                );
                for (i, row) in rows(5).into_iter().enumerate() {
                    let mut ev = InstanceEvent::training(row);
                    ev.is_last = i == 4;
                    distributor.submit(ev)?;
                    accepted.fetch_add(1, Ordering::SeqCst);
                }
                Ok::<(), DistributorError>(())
            })
        };

        // one batch fills the link, the second send waits for the consumer
        thread::sleep(Duration::from_millis(100));
        assert_eq!(accepted.load(Ordering::SeqCst), 1);

        let sizes: Vec<usize> = rx.iter().map(|b| b.len()).collect();
        producer.join().unwrap().unwrap();
        assert_eq!(sizes, vec![1; 5]);
        assert_eq!(accepted.load(Ordering::SeqCst), 5);
    }

    #[test]
    fn finish_flushes_instances_without_last_marker() {
        init_logs();
        let mut handle =
            PartitionedNaiveBayes::start(header_mixed(), &config(2, 1, 3, None)).unwrap();
        let snapshots = handle.take_snapshots().unwrap();
        for row in rows(5) {
            handle.submit(InstanceEvent::training(row)).unwrap();
        }
        let summaries = handle.finish().unwrap();

        assert!(summaries.iter().all(|s| s.n_train == 5));
        let finals: Vec<StatSnapshot> = snapshots.try_iter().filter(|s| s.is_last).collect();
        assert_eq!(finals.len(), 2);
        assert!(finals.iter().all(|s| s.n_train == 5));
    }
}
