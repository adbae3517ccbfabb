//! Vertically partitioned Naive Bayes statistics.
//!
//! Training instances enter a [`Distributor`], are grouped into batches and
//! broadcast to every [`AttributeStatProcessor`]. Each processor owns a
//! contiguous range of attribute indices (see [`AttributePartition`]) and
//! periodically publishes a [`StatSnapshot`] of its observers. Processors
//! never share mutable state, so they run on their own threads without locks.

mod attribute_partition;
mod attribute_stat_processor;
mod config;
mod distributor;
mod error;
mod snapshot_board;
mod stat_snapshot;
mod topology;

pub use attribute_partition::AttributePartition;
pub use attribute_stat_processor::{
    AttributeStatProcessor, PartitionSummary, ProcessorEvent, TrainOutcome,
};
pub use config::{PartitionedNaiveBayesConfig, ValidatedConfig};
pub use distributor::{BatchSink, Distributor, Interrupter};
pub use error::{ConfigError, DistributorError, TopologyError};
pub use snapshot_board::SnapshotBoard;
pub use stat_snapshot::StatSnapshot;
pub use topology::{
    BroadcastSink, LINK_CAPACITY, PartitionedNaiveBayes, ShuffleSink, TopologyHandle,
};
