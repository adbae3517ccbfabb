use crate::core::buffers::BufferError;
use crate::core::events::Phase;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("invalid header: {0}")]
    InvalidHeader(String),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Error)]
pub enum DistributorError {
    #[error("{phase} buffer wait interrupted")]
    Interrupted {
        phase: Phase,
        #[source]
        source: BufferError,
    },

    #[error("{0} stream already emitted its last batch")]
    StreamFinished(Phase),

    #[error("downstream of the {0} stream disconnected")]
    Disconnected(Phase),
}

#[derive(Debug, Error)]
pub enum TopologyError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Distributor(#[from] DistributorError),

    #[error("attribute stat processor {0} panicked")]
    ProcessorPanicked(usize),

    #[error("failed to spawn processor thread: {0}")]
    Spawn(#[source] std::io::Error),
}
