pub mod attributes;
pub mod buffers;
pub mod estimators;
pub mod events;
pub mod instance_header;
pub mod instances;
