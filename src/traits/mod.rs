//! Core traits for the container.

mod dispose;
mod upcast;

pub use dispose::Dispose;
pub use upcast::Upcast;
