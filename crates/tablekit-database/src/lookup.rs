//! Lookup operator registry.
//!
//! Maps operator names (`eq`, `gt`, `in`, `jsonb_like`, ...) to predicate
//! builders. The registry is an explicit strategy table built once at
//! startup and looked up by name at call time; each entry is a pure
//! function that appends one conjunct to the accumulating statement.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use tablekit_core::types::FieldValue;
use tablekit_core::{AppError, AppResult};
use tablekit_schema::ColumnDef;

use crate::sql::SqlWriter;

/// A predicate builder: appends `column <semantics> value` to the writer.
pub type LookupFn = fn(&mut SqlWriter, &ColumnDef, &str, &FieldValue) -> AppResult<()>;

/// Lookups that require a sequence value.
pub const SEQUENCE_LOOKUPS: &[&str] = &["in", "not_in"];

/// Lookups that coerce the value to text before matching.
pub const TEXT_LOOKUPS: &[&str] = &[
    "like",
    "ilike",
    "not_like_all",
    "jsonb_like",
    "jsonb_not_like",
];

static REGISTRY: LazyLock<BTreeMap<&'static str, LookupFn>> = LazyLock::new(|| {
    BTreeMap::from([
        ("eq", eq as LookupFn),
        ("ne", ne as LookupFn),
        ("gt", gt as LookupFn),
        ("gte", gte as LookupFn),
        ("lt", lt as LookupFn),
        ("lte", lte as LookupFn),
        ("in", is_in as LookupFn),
        ("not_in", not_in as LookupFn),
        ("like", like as LookupFn),
        ("ilike", ilike as LookupFn),
        ("not_like_all", not_like_all as LookupFn),
        ("jsonb_like", jsonb_like as LookupFn),
        ("jsonb_not_like", jsonb_not_like as LookupFn),
    ])
});

/// Whether the lookup expects a sequence value.
pub fn is_sequence_lookup(name: &str) -> bool {
    SEQUENCE_LOOKUPS.contains(&name)
}

/// Whether the lookup coerces its value to text.
pub fn is_text_lookup(name: &str) -> bool {
    TEXT_LOOKUPS.contains(&name)
}

/// Resolve a lookup by name.
pub fn resolve(name: &str) -> AppResult<LookupFn> {
    REGISTRY.get(name).copied().ok_or_else(|| {
        let known: Vec<&str> = REGISTRY.keys().copied().collect();
        AppError::unknown_lookup(format!(
            "unknown lookup operation '{name}'; available: {}",
            known.join(", ")
        ))
    })
}

/// Resolve and apply a lookup in one step.
pub fn apply(
    name: &str,
    writer: &mut SqlWriter,
    column: &ColumnDef,
    nested: &str,
    value: &FieldValue,
) -> AppResult<()> {
    resolve(name)?(writer, column, nested, value)
}

fn comparison(writer: &mut SqlWriter, column: &ColumnDef, op: &str, value: &FieldValue) {
    writer.start_conjunct();
    writer.push(&format!("\"{}\" {op} ", column.name));
    writer.push_bind(value.clone());
}

fn eq(writer: &mut SqlWriter, column: &ColumnDef, _nested: &str, value: &FieldValue) -> AppResult<()> {
    if value.is_null() {
        writer.start_conjunct();
        writer.push(&format!("\"{}\" IS NULL", column.name));
    } else {
        comparison(writer, column, "=", value);
    }
    Ok(())
}

fn ne(writer: &mut SqlWriter, column: &ColumnDef, _nested: &str, value: &FieldValue) -> AppResult<()> {
    if value.is_null() {
        writer.start_conjunct();
        writer.push(&format!("\"{}\" IS NOT NULL", column.name));
    } else {
        comparison(writer, column, "<>", value);
    }
    Ok(())
}

fn gt(writer: &mut SqlWriter, column: &ColumnDef, _nested: &str, value: &FieldValue) -> AppResult<()> {
    comparison(writer, column, ">", value);
    Ok(())
}

fn gte(writer: &mut SqlWriter, column: &ColumnDef, _nested: &str, value: &FieldValue) -> AppResult<()> {
    comparison(writer, column, ">=", value);
    Ok(())
}

fn lt(writer: &mut SqlWriter, column: &ColumnDef, _nested: &str, value: &FieldValue) -> AppResult<()> {
    comparison(writer, column, "<", value);
    Ok(())
}

fn lte(writer: &mut SqlWriter, column: &ColumnDef, _nested: &str, value: &FieldValue) -> AppResult<()> {
    comparison(writer, column, "<=", value);
    Ok(())
}

fn membership(
    writer: &mut SqlWriter,
    column: &ColumnDef,
    value: &FieldValue,
    negate: bool,
) -> AppResult<()> {
    let FieldValue::List(items) = value else {
        return Err(AppError::invalid_value(format!(
            "{} lookup on column '{}' requires a sequence value",
            if negate { "not_in" } else { "in" },
            column.name
        )));
    };
    if items.is_empty() {
        return Err(AppError::invalid_value(format!(
            "{} lookup on column '{}' requires a non-empty sequence",
            if negate { "not_in" } else { "in" },
            column.name
        )));
    }

    writer.start_conjunct();
    writer.push(&format!(
        "\"{}\" {} (",
        column.name,
        if negate { "NOT IN" } else { "IN" }
    ));
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            writer.push(", ");
        }
        writer.push_bind(item.clone());
    }
    writer.push(")");
    Ok(())
}

fn is_in(writer: &mut SqlWriter, column: &ColumnDef, _nested: &str, value: &FieldValue) -> AppResult<()> {
    membership(writer, column, value, false)
}

fn not_in(writer: &mut SqlWriter, column: &ColumnDef, _nested: &str, value: &FieldValue) -> AppResult<()> {
    membership(writer, column, value, true)
}

fn substring_pattern(value: &FieldValue) -> FieldValue {
    FieldValue::String(format!("%{}%", value.coerce_text()))
}

fn pattern_match(writer: &mut SqlWriter, column: &ColumnDef, op: &str, value: &FieldValue) {
    writer.start_conjunct();
    writer.push(&format!("CAST(\"{}\" AS TEXT) {op} ", column.name));
    writer.push_bind(substring_pattern(value));
}

fn like(writer: &mut SqlWriter, column: &ColumnDef, _nested: &str, value: &FieldValue) -> AppResult<()> {
    pattern_match(writer, column, "LIKE", value);
    Ok(())
}

fn ilike(writer: &mut SqlWriter, column: &ColumnDef, _nested: &str, value: &FieldValue) -> AppResult<()> {
    pattern_match(writer, column, "ILIKE", value);
    Ok(())
}

/// The value must not substring-match any item of the sequence. An empty
/// sequence adds no predicate and therefore matches everything.
fn not_like_all(
    writer: &mut SqlWriter,
    column: &ColumnDef,
    _nested: &str,
    value: &FieldValue,
) -> AppResult<()> {
    let FieldValue::List(items) = value else {
        return Err(AppError::invalid_value(format!(
            "not_like_all lookup on column '{}' requires a sequence value",
            column.name
        )));
    };
    for item in items {
        pattern_match(writer, column, "NOT LIKE", item);
    }
    Ok(())
}

fn jsonb_pattern(
    writer: &mut SqlWriter,
    column: &ColumnDef,
    nested: &str,
    value: &FieldValue,
    negate: bool,
) {
    let op = if negate { "NOT LIKE" } else { "LIKE" };
    if nested.is_empty() {
        // No sub-key: match against the whole structured column as text.
        pattern_match(writer, column, op, value);
    } else {
        writer.start_conjunct();
        writer.push(&format!("\"{}\"->>CAST(", column.name));
        writer.push_bind(FieldValue::String(nested.to_string()));
        writer.push(&format!(" AS TEXT) {op} "));
        writer.push_bind(substring_pattern(value));
    }
}

fn jsonb_like(writer: &mut SqlWriter, column: &ColumnDef, nested: &str, value: &FieldValue) -> AppResult<()> {
    jsonb_pattern(writer, column, nested, value, false);
    Ok(())
}

fn jsonb_not_like(
    writer: &mut SqlWriter,
    column: &ColumnDef,
    nested: &str,
    value: &FieldValue,
) -> AppResult<()> {
    jsonb_pattern(writer, column, nested, value, true);
    Ok(())
}
