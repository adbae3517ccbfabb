pub mod dummies;
pub mod stubs;

pub use stubs::{RandomStream, VecStream};
