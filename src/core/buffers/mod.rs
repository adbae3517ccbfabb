mod bounded_buffer;

pub use bounded_buffer::{BoundedBuffer, BufferError};
