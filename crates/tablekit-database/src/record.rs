//! Dynamic output records.
//!
//! When a caller does not supply its own row type, query results are
//! projected into a [`Record`]: a map of column name to [`FieldValue`]
//! mirroring every column of the returned row. Callers with a static shape
//! use any type deriving `sqlx::FromRow` instead; both travel through the
//! same generic repository methods.

use std::collections::BTreeMap;

use serde::Serialize;
use sqlx::postgres::{PgColumn, PgRow};
use sqlx::{Column, Row, TypeInfo};
use uuid::Uuid;

use chrono::{DateTime, NaiveDateTime, Utc};
use tablekit_core::types::FieldValue;

/// One result row, keyed by column name.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Record {
    fields: BTreeMap<String, FieldValue>,
}

impl Record {
    /// Get a field by column name.
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    /// Whether the record carries the named field.
    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    /// The integer payload of a field, if present and of that type.
    pub fn integer(&self, name: &str) -> Option<i64> {
        self.get(name).and_then(FieldValue::as_integer)
    }

    /// The string payload of a field, if present and of that type.
    pub fn text(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(FieldValue::as_str)
    }

    /// The UUID payload of a field, if present and of that type.
    pub fn uuid(&self, name: &str) -> Option<Uuid> {
        match self.get(name) {
            Some(FieldValue::Uuid(u)) => Some(*u),
            _ => None,
        }
    }

    /// The timestamp payload of a field, if present and of that type.
    pub fn timestamp(&self, name: &str) -> Option<DateTime<Utc>> {
        match self.get(name) {
            Some(FieldValue::Timestamp(t)) => Some(*t),
            _ => None,
        }
    }

    /// Iterate fields in column-name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether the record has no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Consume the record, yielding the underlying map.
    pub fn into_inner(self) -> BTreeMap<String, FieldValue> {
        self.fields
    }
}

impl FromIterator<(String, FieldValue)> for Record {
    fn from_iter<I: IntoIterator<Item = (String, FieldValue)>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().collect(),
        }
    }
}

impl sqlx::FromRow<'_, PgRow> for Record {
    fn from_row(row: &PgRow) -> Result<Self, sqlx::Error> {
        let mut fields = BTreeMap::new();
        for column in row.columns() {
            fields.insert(column.name().to_string(), decode_column(row, column)?);
        }
        Ok(Self { fields })
    }
}

/// Decode one column of a row into a [`FieldValue`] based on its Postgres
/// wire type.
fn decode_column(row: &PgRow, column: &PgColumn) -> Result<FieldValue, sqlx::Error> {
    let index = column.ordinal();
    let type_name = column.type_info().name();

    let value = match type_name {
        "BOOL" => row
            .try_get::<Option<bool>, _>(index)?
            .map_or(FieldValue::Null, FieldValue::Boolean),
        "INT2" => row
            .try_get::<Option<i16>, _>(index)?
            .map_or(FieldValue::Null, |v| FieldValue::Integer(v.into())),
        "INT4" => row
            .try_get::<Option<i32>, _>(index)?
            .map_or(FieldValue::Null, |v| FieldValue::Integer(v.into())),
        "INT8" => row
            .try_get::<Option<i64>, _>(index)?
            .map_or(FieldValue::Null, FieldValue::Integer),
        "FLOAT4" => row
            .try_get::<Option<f32>, _>(index)?
            .map_or(FieldValue::Null, |v| FieldValue::Float(v.into())),
        "FLOAT8" => row
            .try_get::<Option<f64>, _>(index)?
            .map_or(FieldValue::Null, FieldValue::Float),
        "TEXT" | "VARCHAR" | "CHAR" | "BPCHAR" | "NAME" => row
            .try_get::<Option<String>, _>(index)?
            .map_or(FieldValue::Null, FieldValue::String),
        "UUID" => row
            .try_get::<Option<Uuid>, _>(index)?
            .map_or(FieldValue::Null, FieldValue::Uuid),
        "TIMESTAMPTZ" => row
            .try_get::<Option<DateTime<Utc>>, _>(index)?
            .map_or(FieldValue::Null, FieldValue::Timestamp),
        "TIMESTAMP" => row
            .try_get::<Option<NaiveDateTime>, _>(index)?
            .map_or(FieldValue::Null, |v| FieldValue::Timestamp(v.and_utc())),
        "JSON" | "JSONB" => row
            .try_get::<Option<serde_json::Value>, _>(index)?
            .map_or(FieldValue::Null, FieldValue::Json),
        other => {
            return Err(sqlx::Error::ColumnDecode {
                index: column.name().to_string(),
                source: format!("unsupported column type '{other}'").into(),
            });
        }
    };

    Ok(value)
}
