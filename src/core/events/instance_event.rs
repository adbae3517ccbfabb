use crate::core::instances::DenseInstance;
use strum_macros::{Display, EnumIter, IntoStaticStr};

/// Whether an instance is meant to update the model or to be scored by it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, IntoStaticStr)]
#[strum(serialize_all = "kebab-case")]
pub enum Phase {
    Training,
    Testing,
}

/// A single instance travelling through the topology, tagged with its phase
/// and with the end-of-stream marker.
#[derive(Debug, Clone)]
pub struct InstanceEvent {
    pub instance: DenseInstance,
    pub phase: Phase,
    pub is_last: bool,
}

impl InstanceEvent {
    pub fn training(instance: DenseInstance) -> Self {
        Self {
            instance,
            phase: Phase::Training,
            is_last: false,
        }
    }

    pub fn testing(instance: DenseInstance) -> Self {
        Self {
            instance,
            phase: Phase::Testing,
            is_last: false,
        }
    }

    pub fn last(mut self) -> Self {
        self.is_last = true;
        self
    }

    pub fn is_training(&self) -> bool {
        self.phase == Phase::Training
    }

    pub fn is_testing(&self) -> bool {
        self.phase == Phase::Testing
    }
}
