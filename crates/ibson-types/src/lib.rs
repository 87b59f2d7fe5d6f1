#![warn(clippy::pedantic)]

pub mod document;
pub mod element_type;
pub mod error;
pub mod object_id;
pub mod value;

mod deep;

pub use document::Document;
pub use element_type::ElementType;
pub use error::TypeError;
pub use object_id::ObjectId;
pub use value::{Decimal128, Value};
