use crate::core::events::Phase;
use crate::core::instances::DenseInstance;

/// Ordered group of instances of one phase, forwarded as a unit.
///
/// Instances keep their arrival order. `is_last` is set on the final batch of
/// a stream only.
#[derive(Debug, Clone)]
pub struct InstanceBatch {
    phase: Phase,
    instances: Vec<DenseInstance>,
    is_last: bool,
}

impl InstanceBatch {
    pub fn with_capacity(phase: Phase, capacity: usize) -> Self {
        Self {
            phase,
            instances: Vec::with_capacity(capacity),
            is_last: false,
        }
    }

    pub fn add(&mut self, instance: DenseInstance) {
        self.instances.push(instance);
    }

    pub fn set_last(&mut self, is_last: bool) {
        self.is_last = is_last;
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_training(&self) -> bool {
        self.phase == Phase::Training
    }

    pub fn is_last(&self) -> bool {
        self.is_last
    }

    pub fn instances(&self) -> &[DenseInstance] {
        &self.instances
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }
}
