use crate::classifiers::bayes::partitioned::ConfigError;
use serde::{Deserialize, Serialize};
use std::ops::Range;

/// Contiguous range of attribute indices owned by one processor.
///
/// With `width = floor(M / P)`, processor `id` owns `[id * width, id * width +
/// width - 1]`, except the last one which always ends at `M - 1`. A processor
/// whose range is empty (more processors than attributes) is degenerate and
/// stays inert for its whole life.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AttributePartition {
    owner_id: usize,
    i_min: usize,
    i_range: usize,
}

impl AttributePartition {
    pub fn assign(
        processor_id: usize,
        parallelism: usize,
        number_of_attributes: usize,
    ) -> Result<Self, ConfigError> {
        if parallelism == 0 {
            return Err(ConfigError::InvalidParameter(
                "parallelism must be > 0".into(),
            ));
        }
        if processor_id >= parallelism {
            return Err(ConfigError::InvalidParameter(format!(
                "processor id {processor_id} out of range for parallelism {parallelism}"
            )));
        }

        let width = number_of_attributes / parallelism;
        let i_min = processor_id * width;
        let i_range = if processor_id == parallelism - 1 {
            number_of_attributes - i_min
        } else {
            width
        };

        Ok(Self {
            owner_id: processor_id,
            i_min,
            i_range,
        })
    }

    pub fn owner_id(&self) -> usize {
        self.owner_id
    }

    pub fn i_min(&self) -> usize {
        self.i_min
    }

    /// Last owned index, `None` for a degenerate partition.
    pub fn i_max(&self) -> Option<usize> {
        (self.i_range > 0).then(|| self.i_min + self.i_range - 1)
    }

    pub fn i_range(&self) -> usize {
        self.i_range
    }

    pub fn is_degenerate(&self) -> bool {
        self.i_range == 0
    }

    pub fn indices(&self) -> Range<usize> {
        self.i_min..self.i_min + self.i_range
    }

    pub fn contains(&self, attribute_index: usize) -> bool {
        self.indices().contains(&attribute_index)
    }
}
