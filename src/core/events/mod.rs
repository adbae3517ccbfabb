mod instance_batch;
mod instance_event;

pub use instance_batch::InstanceBatch;
pub use instance_event::{InstanceEvent, Phase};
