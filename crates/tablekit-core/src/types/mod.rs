//! Shared value types for filter and data maps.

pub mod value;

pub use value::{FieldMap, FieldValue};
