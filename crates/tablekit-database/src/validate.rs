//! Filter and data value validation against column descriptors.
//!
//! All checks run before any statement is sent to the store; a failure here
//! is a caller-programming error and is never retried.

use tablekit_core::types::FieldValue;
use tablekit_core::{AppError, AppResult};
use tablekit_schema::{ColumnDef, ColumnKind};

use crate::lookup;

/// Validate one filter value against its column and lookup.
///
/// Rules, in order: nullability; sequence shape for set lookups;
/// text-coercing lookups take any scalar (only `not_like_all` takes a
/// sequence, and only of scalars); exact type match for everything else.
pub fn validate_filter_value(
    column: &ColumnDef,
    key: &str,
    lookup_name: &str,
    value: &FieldValue,
) -> AppResult<()> {
    if value.is_null() {
        if column.nullable {
            return Ok(());
        }
        return Err(AppError::null_violation(format!(
            "column '{}' is not nullable (filter key '{key}')",
            column.name
        )));
    }

    if lookup::is_sequence_lookup(lookup_name) {
        let FieldValue::List(items) = value else {
            return Err(AppError::invalid_value(format!(
                "lookup '{lookup_name}' on column '{}' requires a sequence value, got {}",
                column.name,
                value.kind_name()
            )));
        };
        if items.is_empty() {
            return Err(AppError::invalid_value(format!(
                "lookup '{lookup_name}' on column '{}' requires a non-empty sequence",
                column.name
            )));
        }
        for item in items {
            if item.is_list() {
                return Err(AppError::invalid_value(format!(
                    "lookup '{lookup_name}' on column '{}' must not contain nested sequences",
                    column.name
                )));
            }
            if !item.is_null() {
                check_scalar(column, key, item)?;
            }
        }
        return Ok(());
    }

    if lookup::is_text_lookup(lookup_name) {
        if lookup_name == "not_like_all" {
            let FieldValue::List(items) = value else {
                return Err(AppError::invalid_value(format!(
                    "lookup 'not_like_all' on column '{}' requires a sequence value, got {}",
                    column.name,
                    value.kind_name()
                )));
            };
            for item in items {
                if item.is_list() {
                    return Err(AppError::invalid_value(format!(
                        "lookup 'not_like_all' on column '{}' must not contain nested sequences",
                        column.name
                    )));
                }
            }
            return Ok(());
        }
        // The remaining text-coercing lookups accept any scalar, but a
        // sequence has no text form and would turn the pattern into `%%`.
        if value.is_list() {
            return Err(AppError::invalid_value(format!(
                "lookup '{lookup_name}' on column '{}' expects a scalar value, got a sequence",
                column.name
            )));
        }
        return Ok(());
    }

    if value.is_list() {
        return Err(AppError::invalid_value(format!(
            "lookup '{lookup_name}' on column '{}' expects a scalar value, got a sequence",
            column.name
        )));
    }

    check_scalar(column, key, value)
}

/// Validate one scalar value against the column's declared semantic type.
/// Float columns accept integer-valued input; JSON columns accept any
/// scalar payload.
pub fn check_scalar(column: &ColumnDef, key: &str, value: &FieldValue) -> AppResult<()> {
    let matches = match column.kind {
        ColumnKind::Boolean => matches!(value, FieldValue::Boolean(_)),
        ColumnKind::Integer => matches!(value, FieldValue::Integer(_)),
        ColumnKind::Float => matches!(value, FieldValue::Float(_) | FieldValue::Integer(_)),
        ColumnKind::Text => matches!(value, FieldValue::String(_)),
        ColumnKind::Uuid => matches!(value, FieldValue::Uuid(_)),
        ColumnKind::Timestamp => matches!(value, FieldValue::Timestamp(_)),
        ColumnKind::Json => !value.is_list(),
    };

    if matches {
        Ok(())
    } else {
        Err(AppError::invalid_value(format!(
            "column '{}' expects {} value, got {} (key '{key}')",
            column.name,
            column.kind.describe(),
            value.kind_name()
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use tablekit_core::error::ErrorKind;
    use uuid::Uuid;

    const EMAIL: ColumnDef = ColumnDef::new("email", ColumnKind::Text);
    const AGE: ColumnDef = ColumnDef::new("age", ColumnKind::Integer).nullable();
    const SCORE: ColumnDef = ColumnDef::new("score", ColumnKind::Float).nullable();
    const ACTIVE: ColumnDef = ColumnDef::new("active", ColumnKind::Boolean);
    const UUID_COL: ColumnDef = ColumnDef::new("uuid", ColumnKind::Uuid);
    const AT: ColumnDef = ColumnDef::new("created_at", ColumnKind::Timestamp).nullable();
    const META: ColumnDef = ColumnDef::new("meta", ColumnKind::Json).nullable();

    #[test]
    fn test_null_on_non_nullable_column() {
        let err = validate_filter_value(&EMAIL, "email", "eq", &FieldValue::Null)
            .expect_err("null violation");
        assert_eq!(err.kind, ErrorKind::NullViolation);
        assert!(err.message.contains("email"));
    }

    #[test]
    fn test_null_on_nullable_column_skips_type_checks() {
        validate_filter_value(&AGE, "age", "eq", &FieldValue::Null).expect("nullable");
        validate_filter_value(&AGE, "age__in", "in", &FieldValue::Null).expect("nullable");
    }

    #[test]
    fn test_sequence_lookup_requires_sequence() {
        let err = validate_filter_value(&AGE, "age__in", "in", &FieldValue::Integer(1))
            .expect_err("scalar");
        assert_eq!(err.kind, ErrorKind::InvalidValue);
    }

    #[test]
    fn test_sequence_lookup_rejects_empty() {
        let err = validate_filter_value(&AGE, "age__in", "in", &FieldValue::List(vec![]))
            .expect_err("empty");
        assert_eq!(err.kind, ErrorKind::InvalidValue);
    }

    #[test]
    fn test_sequence_elements_checked_against_scalar_type() {
        let good = FieldValue::from(vec![1i64, 2]);
        validate_filter_value(&AGE, "age__in", "in", &good).expect("ok");

        let mixed = FieldValue::List(vec![FieldValue::Integer(1), FieldValue::from("two")]);
        let err = validate_filter_value(&AGE, "age__in", "in", &mixed).expect_err("mixed");
        assert_eq!(err.kind, ErrorKind::InvalidValue);

        // Null elements are allowed; only non-null elements are typed.
        let with_null = FieldValue::List(vec![FieldValue::Integer(1), FieldValue::Null]);
        validate_filter_value(&AGE, "age__in", "in", &with_null).expect("null element ok");
    }

    #[test]
    fn test_nested_sequences_rejected() {
        let nested = FieldValue::List(vec![FieldValue::List(vec![FieldValue::Integer(1)])]);
        let err = validate_filter_value(&AGE, "age__in", "in", &nested).expect_err("nested");
        assert_eq!(err.kind, ErrorKind::InvalidValue);
    }

    #[test]
    fn test_text_lookups_are_lenient() {
        validate_filter_value(&AGE, "age__like", "like", &FieldValue::Integer(4)).expect("ok");
        validate_filter_value(&META, "meta__jsonb_like", "jsonb_like", &FieldValue::from("Jo"))
            .expect("ok");
    }

    #[test]
    fn test_text_lookups_reject_sequences() {
        for name in ["like", "ilike", "jsonb_like", "jsonb_not_like"] {
            let key = format!("email__{name}");
            let err = validate_filter_value(&EMAIL, &key, name, &FieldValue::from(vec!["a"]))
                .expect_err("sequence");
            assert_eq!(err.kind, ErrorKind::InvalidValue);
        }
    }

    #[test]
    fn test_not_like_all_rejects_nested_sequences() {
        let nested = FieldValue::List(vec![FieldValue::from(vec!["a"])]);
        let err = validate_filter_value(&EMAIL, "email__not_like_all", "not_like_all", &nested)
            .expect_err("nested");
        assert_eq!(err.kind, ErrorKind::InvalidValue);
    }

    #[test]
    fn test_not_like_all_demands_sequence() {
        let err = validate_filter_value(&EMAIL, "email__not_like_all", "not_like_all", &FieldValue::from("x"))
            .expect_err("scalar");
        assert_eq!(err.kind, ErrorKind::InvalidValue);

        validate_filter_value(
            &EMAIL,
            "email__not_like_all",
            "not_like_all",
            &FieldValue::from(vec!["x"]),
        )
        .expect("sequence ok");
    }

    #[test]
    fn test_scalar_lookup_rejects_sequence() {
        let err = validate_filter_value(&AGE, "age", "eq", &FieldValue::from(vec![1i64]))
            .expect_err("sequence");
        assert_eq!(err.kind, ErrorKind::InvalidValue);
    }

    #[test]
    fn test_exact_type_matching() {
        validate_filter_value(&EMAIL, "email", "eq", &FieldValue::from("a@x.com")).expect("ok");
        validate_filter_value(&ACTIVE, "active", "eq", &FieldValue::Boolean(true)).expect("ok");
        validate_filter_value(&UUID_COL, "uuid", "eq", &FieldValue::Uuid(Uuid::new_v4()))
            .expect("ok");
        validate_filter_value(&AT, "created_at", "gte", &FieldValue::Timestamp(Utc::now()))
            .expect("ok");

        let err = validate_filter_value(&EMAIL, "email", "eq", &FieldValue::Integer(5))
            .expect_err("type mismatch");
        assert_eq!(err.kind, ErrorKind::InvalidValue);
        assert!(err.message.contains("string"));
        assert!(err.message.contains("integer"));
    }

    #[test]
    fn test_float_accepts_integer() {
        validate_filter_value(&SCORE, "score", "eq", &FieldValue::Integer(3)).expect("ok");
        validate_filter_value(&SCORE, "score", "eq", &FieldValue::Float(3.5)).expect("ok");
    }

    #[test]
    fn test_json_accepts_any_scalar() {
        validate_filter_value(&META, "meta", "eq", &FieldValue::Json(serde_json::json!({"a": 1})))
            .expect("ok");
        validate_filter_value(&META, "meta", "eq", &FieldValue::from("raw")).expect("ok");
    }
}
