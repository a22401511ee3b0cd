//! Filter key parsing.
//!
//! A filter key encodes `(field, optional sub-field, lookup)` in one
//! string: `"age"`, `"age__gte"`, `"meta__first_name__jsonb_like"`. The
//! parser is pure; resolving the field against real columns is the query
//! builder's job.

use tablekit_core::{AppError, AppResult};

/// Separator between key segments.
pub const SEPARATOR: &str = "__";

/// Lookup applied when a key names only a field.
pub const DEFAULT_LOOKUP: &str = "eq";

/// A parsed filter key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterKey<'a> {
    /// The column name.
    pub field: &'a str,
    /// Sub-field inside a structured column; empty when not addressed.
    pub nested: &'a str,
    /// The lookup operator name.
    pub lookup: &'a str,
}

/// Split a filter key into field, optional nested sub-field, and lookup.
///
/// One segment defaults the lookup to equality; two segments are
/// `field__lookup`; three segments are `field__subfield__lookup` and exist
/// specifically to address a sub-key of a structured (JSON) column.
pub fn parse_filter_key(key: &str) -> AppResult<FilterKey<'_>> {
    let segments: Vec<&str> = key.split(SEPARATOR).collect();
    match segments.as_slice() {
        [field] => Ok(FilterKey {
            field,
            nested: "",
            lookup: DEFAULT_LOOKUP,
        }),
        [field, lookup] => Ok(FilterKey {
            field,
            nested: "",
            lookup,
        }),
        [field, nested, lookup] => Ok(FilterKey {
            field,
            nested,
            lookup,
        }),
        _ => Err(AppError::validation(format!(
            "malformed filter key '{key}': expected 'field', 'field{SEPARATOR}lookup', \
             or 'field{SEPARATOR}subfield{SEPARATOR}lookup'"
        ))),
    }
}
