use crate::classifiers::bayes::partitioned::{
    PartitionSummary, PartitionedNaiveBayes, PartitionedNaiveBayesConfig, SnapshotBoard,
};
use crate::core::events::InstanceEvent;
use crate::core::instances::DenseInstance;
use crate::streams::Stream;
use anyhow::{Context, Result, anyhow};
use log::info;
use std::fmt::{Display, Formatter};
use std::sync::Arc;
use std::thread;
use std::time::Instant;

/// Outcome of a [`PartitionedTrainingTask`] run.
#[derive(Debug)]
pub struct TrainingSummary {
    pub instances_seen: u64,
    pub partitions: Vec<PartitionSummary>,
    pub board: SnapshotBoard,
    pub seconds: f64,
}

impl Display for TrainingSummary {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "seen={}, processors={}, snapshots={}, t={:.3}s",
            self.instances_seen,
            self.partitions.len(),
            self.board.received(),
            self.seconds
        )
    }
}

/// Streams every instance of a source through a partitioned topology as
/// training data, while a consumer thread folds the published snapshots into
/// a [`SnapshotBoard`].
pub struct PartitionedTrainingTask {
    stream: Box<dyn Stream>,
    config: PartitionedNaiveBayesConfig,
    max_instances: Option<u64>,
    read: u64,
}

impl PartitionedTrainingTask {
    pub fn new(
        stream: Box<dyn Stream>,
        config: PartitionedNaiveBayesConfig,
        max_instances: Option<u64>,
    ) -> Result<Self> {
        config
            .validate()
            .context("invalid partitioned naive bayes configuration")?;
        Ok(Self {
            stream,
            config,
            max_instances,
            read: 0,
        })
    }

    pub fn run(&mut self) -> Result<TrainingSummary> {
        let start = Instant::now();
        let header = Arc::new(self.stream.header().clone());

        let mut handle = PartitionedNaiveBayes::start(Arc::clone(&header), &self.config)
            .with_context(|| format!("cannot start topology for '{}'", header.relation_name()))?;
        let snapshots = handle
            .take_snapshots()
            .context("snapshot stream already taken")?;
        let collector = thread::Builder::new()
            .name("snapshot-collector".into())
            .spawn(move || {
                let mut board = SnapshotBoard::new();
                board.collect_from(&snapshots);
                board
            })
            .context("cannot spawn snapshot collector")?;

        self.read = 0;
        let mut instances_seen = 0u64;
        let mut pending = self.next_instance();
        while let Some(instance) = pending {
            pending = self.next_instance();
            let mut event = InstanceEvent::training(instance);
            event.is_last = pending.is_none();
            handle
                .submit(event)
                .with_context(|| format!("submitting instance #{}", instances_seen + 1))?;
            instances_seen += 1;
        }

        let partitions = handle.finish().context("topology did not shut down cleanly")?;
        let board = collector
            .join()
            .map_err(|_| anyhow!("snapshot collector panicked"))?;

        let summary = TrainingSummary {
            instances_seen,
            partitions,
            board,
            seconds: start.elapsed().as_secs_f64(),
        };
        info!("training finished: {summary}");
        Ok(summary)
    }

    fn next_instance(&mut self) -> Option<DenseInstance> {
        if self.max_instances.is_some_and(|n| self.read >= n) || !self.stream.has_more_instances() {
            return None;
        }
        let instance = self.stream.next_instance()?;
        self.read += 1;
        Some(instance)
    }
}
