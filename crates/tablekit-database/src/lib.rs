//! # tablekit-database
//!
//! PostgreSQL connection management and the generic filtered repository
//! engine. Callers describe queries as plain key/value maps using the
//! filter mini-language (`"field"`, `"field__lookup"`,
//! `"field__subfield__lookup"`); the engine validates every key and value
//! against the table's column metadata before any statement reaches the
//! store.

pub mod connection;
pub mod filter_key;
pub mod lookup;
pub mod query;
pub mod record;
pub mod repository;
pub mod sql;
pub mod validate;

pub use connection::DatabasePool;
pub use record::Record;
pub use repository::Repository;
