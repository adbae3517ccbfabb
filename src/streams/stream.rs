use crate::core::instance_header::InstanceHeader;
use crate::core::instances::DenseInstance;
use std::io::Error;

/// Pull-based interface for data streams that produce labeled instances.
///
/// Implementations may represent finite datasets (e.g., files) or unbounded
/// generators. All returned instances must conform to the same, immutable
/// [`InstanceHeader`] for the lifetime of the stream.
pub trait Stream {
    /// Returns the stream header (relation name, attributes, class index).
    ///
    /// The header must remain valid and immutable for the entire lifetime of
    /// the stream.
    fn header(&self) -> &InstanceHeader;

    /// Indicates whether the stream *may* produce more instances.
    ///
    /// Finite streams should return `false` once exhausted. If it returns
    /// `false`, a subsequent call to [`Stream::next_instance`] must return
    /// `None`.
    fn has_more_instances(&self) -> bool;

    /// Produces the next instance, or `None` if the stream is exhausted.
    fn next_instance(&mut self) -> Option<DenseInstance>;

    /// Resets the stream to its initial state. The header must remain
    /// unchanged.
    fn restart(&mut self) -> Result<(), Error>;
}
