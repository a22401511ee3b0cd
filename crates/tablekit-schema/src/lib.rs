//! # tablekit-schema
//!
//! Static table/column introspection for Tablekit. Entities declare their
//! persisted shape by implementing [`Table`]; the [`catalog`] memoizes one
//! resolved column map per table type for the process lifetime.

pub mod catalog;
pub mod column;
pub mod table;

pub use catalog::{ColumnMap, descriptors};
pub use column::{ColumnDef, ColumnKind};
pub use table::Table;
