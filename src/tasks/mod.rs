mod partitioned_training;

pub use partitioned_training::{PartitionedTrainingTask, TrainingSummary};
