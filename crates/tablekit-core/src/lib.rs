//! # tablekit-core
//!
//! Core crate for Tablekit. Contains configuration schemas, the dynamic
//! field value type used by filter and data maps, and the unified error
//! system.
//!
//! This crate has **no** internal dependencies on other Tablekit crates.

pub mod config;
pub mod error;
pub mod logging;
pub mod result;
pub mod types;

pub use error::AppError;
pub use result::AppResult;
