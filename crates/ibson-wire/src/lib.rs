#![warn(clippy::pedantic)]

pub mod bytes;
pub mod element;
pub mod error;
pub mod header;

pub use element::{Elements, RawElement};
pub use error::WireError;
pub use header::{DocumentHeader, split_documents};
