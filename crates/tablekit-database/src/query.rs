//! Query building stages: WHERE, ORDER BY, and LIMIT/OFFSET.
//!
//! The three stages are independent and compose in a fixed order. Every
//! referenced field is resolved against the table's column map and every
//! value validated before a single byte reaches the store.

use tablekit_core::types::{FieldMap, FieldValue};
use tablekit_core::{AppError, AppResult};
use tablekit_schema::ColumnMap;

use crate::filter_key::parse_filter_key;
use crate::lookup;
use crate::sql::SqlWriter;
use crate::validate::validate_filter_value;

/// Map keys that configure pagination instead of filtering.
pub const RESERVED_KEYS: &[&str] = &["limit", "offset"];

/// Fold every filter entry into the statement as one conjunct.
///
/// Reserved pagination keys are skipped. Predicates accumulate with logical
/// AND; there is no OR at this layer.
pub fn apply_where(writer: &mut SqlWriter, filters: &FieldMap, columns: &ColumnMap) -> AppResult<()> {
    for (key, value) in filters {
        if RESERVED_KEYS.contains(&key.as_str()) {
            continue;
        }
        let parsed = parse_filter_key(key)?;
        let column = columns.require(parsed.field)?;
        validate_filter_value(column, key, parsed.lookup, value)?;
        lookup::apply(parsed.lookup, writer, column, parsed.nested, value)?;
    }
    Ok(())
}

/// Append ORDER BY clauses in caller order. A leading `-` on a field name
/// means descending; every field must resolve to a column.
pub fn apply_order(writer: &mut SqlWriter, order: &[&str], columns: &ColumnMap) -> AppResult<()> {
    if order.is_empty() {
        return Ok(());
    }
    writer.push(" ORDER BY ");
    for (i, entry) in order.iter().enumerate() {
        let (field, direction) = match entry.strip_prefix('-') {
            Some(field) => (field, "DESC"),
            None => (*entry, "ASC"),
        };
        let column = columns.require(field)?;
        if i > 0 {
            writer.push(", ");
        }
        writer.push(&format!("\"{}\" {direction}", column.name));
    }
    Ok(())
}

/// Append LIMIT/OFFSET from the reserved pagination keys.
///
/// A non-positive limit or negative offset is rejected, never clamped. An
/// offset of zero emits no OFFSET clause.
pub fn apply_pagination(writer: &mut SqlWriter, filters: &FieldMap) -> AppResult<()> {
    if let Some(limit) = filters.get("limit") {
        let FieldValue::Integer(n) = limit else {
            return Err(AppError::invalid_pagination(format!(
                "limit must be an integer, got {}",
                limit.kind_name()
            )));
        };
        if *n <= 0 {
            return Err(AppError::invalid_pagination(format!(
                "limit must be a positive integer, got {n}"
            )));
        }
        writer.push(&format!(" LIMIT {n}"));
    }

    if let Some(offset) = filters.get("offset") {
        let FieldValue::Integer(n) = offset else {
            return Err(AppError::invalid_pagination(format!(
                "offset must be an integer, got {}",
                offset.kind_name()
            )));
        };
        if *n < 0 {
            return Err(AppError::invalid_pagination(format!(
                "offset must be a non-negative integer, got {n}"
            )));
        }
        if *n > 0 {
            writer.push(&format!(" OFFSET {n}"));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_fixtures::People;
    use std::sync::Arc;
    use tablekit_core::error::ErrorKind;
    use tablekit_core::fields;
    use tablekit_schema::descriptors;

    fn columns() -> Arc<ColumnMap> {
        descriptors::<People>().expect("catalog")
    }

    fn writer() -> SqlWriter {
        SqlWriter::new("SELECT * FROM \"people\"")
    }

    #[test]
    fn test_apply_where_composes_conjunctively() {
        let mut w = writer();
        let filters = fields! {
            "age__gte" => 21,
            "email__ilike" => "@x.com",
        };
        apply_where(&mut w, &filters, &columns()).expect("where");
        // BTreeMap iterates keys in sorted order.
        assert_eq!(
            w.sql(),
            "SELECT * FROM \"people\" WHERE \"age\" >= $1 \
             AND CAST(\"email\" AS TEXT) ILIKE $2"
        );
        assert_eq!(w.args().len(), 2);
    }

    #[test]
    fn test_apply_where_skips_reserved_keys() {
        let mut w = writer();
        let filters = fields! {
            "limit" => 10,
            "offset" => 3,
            "email" => "a@x.com",
        };
        apply_where(&mut w, &filters, &columns()).expect("where");
        assert_eq!(w.sql(), "SELECT * FROM \"people\" WHERE \"email\" = $1");
    }

    #[test]
    fn test_apply_where_empty_filters_is_identity() {
        let mut w = writer();
        apply_where(&mut w, &fields! {}, &columns()).expect("where");
        assert_eq!(w.sql(), "SELECT * FROM \"people\"");
    }

    #[test]
    fn test_unknown_column_fails_before_building() {
        let mut w = writer();
        let err = apply_where(&mut w, &fields! { "nope" => 1 }, &columns()).expect_err("column");
        assert_eq!(err.kind, ErrorKind::UnknownColumn);
    }

    #[test]
    fn test_unknown_lookup_fails() {
        let mut w = writer();
        let err =
            apply_where(&mut w, &fields! { "age__between" => 1 }, &columns()).expect_err("lookup");
        assert_eq!(err.kind, ErrorKind::UnknownLookup);
    }

    #[test]
    fn test_nested_jsonb_filter_through_where() {
        let mut w = writer();
        let filters = fields! { "meta__first_name__jsonb_like" => "Jo" };
        apply_where(&mut w, &filters, &columns()).expect("where");
        assert_eq!(
            w.sql(),
            "SELECT * FROM \"people\" WHERE \"meta\"->>CAST($1 AS TEXT) LIKE $2"
        );
    }

    #[test]
    fn test_apply_order_directions() {
        let mut w = writer();
        apply_order(&mut w, &["-created_at", "id"], &columns()).expect("order");
        assert_eq!(
            w.sql(),
            "SELECT * FROM \"people\" ORDER BY \"created_at\" DESC, \"id\" ASC"
        );
    }

    #[test]
    fn test_apply_order_unknown_field() {
        let mut w = writer();
        let err = apply_order(&mut w, &["-bogus"], &columns()).expect_err("order");
        assert_eq!(err.kind, ErrorKind::UnknownColumn);
    }

    #[test]
    fn test_pagination_limit_and_offset() {
        let mut w = writer();
        apply_pagination(&mut w, &fields! { "limit" => 10, "offset" => 3 }).expect("pagination");
        assert_eq!(w.sql(), "SELECT * FROM \"people\" LIMIT 10 OFFSET 3");
    }

    #[test]
    fn test_pagination_zero_offset_elided() {
        let mut w = writer();
        apply_pagination(&mut w, &fields! { "limit" => 5, "offset" => 0 }).expect("pagination");
        assert_eq!(w.sql(), "SELECT * FROM \"people\" LIMIT 5");
    }

    #[test]
    fn test_pagination_rejects_bad_bounds() {
        for filters in [
            fields! { "limit" => 0 },
            fields! { "limit" => -1 },
            fields! { "limit" => "ten" },
            fields! { "offset" => -3 },
            fields! { "offset" => 1.5 },
        ] {
            let mut w = writer();
            let err = apply_pagination(&mut w, &filters).expect_err("bounds");
            assert_eq!(err.kind, ErrorKind::InvalidPagination);
        }
    }
}
