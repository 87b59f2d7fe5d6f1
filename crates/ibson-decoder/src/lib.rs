#![warn(clippy::pedantic)]

pub mod config;
pub mod decoder;
pub mod error;
pub mod observer;
pub mod parallel;
pub mod queue;
pub mod streaming;
pub mod traverse;

mod element;
mod layout;
mod tree;

#[cfg(test)]
mod fixtures;

pub use config::{DecoderConfig, Utf8Mode};
pub use decoder::{DecodeStats, Decoded, IterDecoder};
pub use error::DecodeError;
pub use observer::{ElementEvent, ElementObserver, NoopObserver, TracingObserver};
pub use parallel::ParallelDecoder;
pub use queue::{ContainerKind, TraversalOrder};
pub use streaming::DocumentStream;
pub use traverse::{TraversalStats, traverse};
pub use tree::NodeId;
