use crate::classifiers::bayes::partitioned::ConfigError;
use schemars::{JsonSchema, Schema, schema_for};
use serde::{Deserialize, Serialize};
use std::num::NonZeroUsize;
use std::path::Path;

const DEFAULT_BATCH_SIZE: usize = 200;
fn default_parallelism() -> usize {
    1
}
fn default_batch_size() -> usize {
    DEFAULT_BATCH_SIZE
}

/// Test batches may be larger than training ones; they need less reactivity.
pub const TEST_BATCH_RATIO: usize = 2;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct PartitionedNaiveBayesConfig {
    #[serde(default = "default_parallelism")]
    #[schemars(
        title = "Attribute Stat Processors",
        description = "Number of processors the attribute space is split across",
        range(min = 1),
        default = "default_parallelism"
    )]
    pub parallel_attribute_stat: usize,

    #[serde(default = "default_parallelism")]
    #[schemars(
        title = "Model Processors",
        description = "Number of model consumers testing batches are shuffled to",
        range(min = 1),
        default = "default_parallelism"
    )]
    pub parallel_model: usize,

    #[serde(default = "default_batch_size")]
    #[schemars(
        title = "Batch Size",
        description = "Number of training instances grouped in one batch",
        range(min = 1),
        default = "default_batch_size"
    )]
    pub batch_size: usize,

    #[serde(default)]
    #[schemars(
        title = "Update Frequency",
        description = "Trained instances between two snapshots; empty = batch size"
    )]
    pub update_frequency: Option<usize>,
}

impl Default for PartitionedNaiveBayesConfig {
    fn default() -> Self {
        Self {
            parallel_attribute_stat: default_parallelism(),
            parallel_model: default_parallelism(),
            batch_size: default_batch_size(),
            update_frequency: None,
        }
    }
}

/// Configuration whose values have all been checked to be positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidatedConfig {
    pub parallel_attribute_stat: NonZeroUsize,
    pub parallel_model: NonZeroUsize,
    pub batch_size: NonZeroUsize,
    pub test_batch_size: NonZeroUsize,
    pub update_frequency: NonZeroUsize,
}

fn positive(name: &str, value: usize) -> Result<NonZeroUsize, ConfigError> {
    NonZeroUsize::new(value)
        .ok_or_else(|| ConfigError::InvalidParameter(format!("{name} must be > 0")))
}

impl PartitionedNaiveBayesConfig {
    pub fn schema() -> Schema {
        schema_for!(PartitionedNaiveBayesConfig)
    }

    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    pub fn validate(&self) -> Result<ValidatedConfig, ConfigError> {
        let batch_size = positive("batch-size", self.batch_size)?;
        let test_batch_size = batch_size
            .get()
            .checked_mul(TEST_BATCH_RATIO)
            .and_then(NonZeroUsize::new)
            .ok_or_else(|| ConfigError::InvalidParameter("batch-size too large".into()))?;
        Ok(ValidatedConfig {
            parallel_attribute_stat: positive(
                "parallel-attribute-stat",
                self.parallel_attribute_stat,
            )?,
            parallel_model: positive("parallel-model", self.parallel_model)?,
            batch_size,
            test_batch_size,
            update_frequency: match self.update_frequency {
                Some(f) => positive("update-frequency", f)?,
                None => batch_size,
            },
        })
    }
}
