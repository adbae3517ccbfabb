pub mod random_stream;
pub mod vec_stream;

pub use random_stream::RandomStream;
pub use vec_stream::VecStream;
