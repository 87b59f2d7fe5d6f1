#![warn(clippy::pedantic)]

pub mod error;
pub mod pool;

pub use error::PoolError;
pub use pool::{TaskHandle, WorkerPool};
