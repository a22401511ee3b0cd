//! The generic filtered repository engine.
//!
//! [`Repository<T>`] is the CRUD/bulk facade over one table. Callers pass
//! filter and data maps; every key and value is validated against the
//! table's column metadata before a statement is issued, and mutating
//! operations run inside one transaction that either fully commits or
//! fully rolls back.

use std::fmt;
use std::marker::PhantomData;

use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::{FromRow, PgPool, Row};
use tracing::debug;

use tablekit_core::error::{AppError, ErrorKind};
use tablekit_core::types::{FieldMap, FieldValue};
use tablekit_core::AppResult;
use tablekit_schema::{descriptors, ColumnMap, Table};

use crate::query::{apply_order, apply_pagination, apply_where};
use crate::sql::{bind_query, bind_query_as, SqlWriter};
use crate::validate::check_scalar;

/// Generic repository over the table type `T`.
///
/// Row-returning operations are generic over the output shape `O`: any
/// `sqlx::FromRow` type, including the dynamic [`Record`](crate::Record)
/// for callers without a static shape. Narrow structs simply decode the
/// columns they declare.
pub struct Repository<T: Table> {
    pool: PgPool,
    _table: PhantomData<fn() -> T>,
}

impl<T: Table> Clone for Repository<T> {
    fn clone(&self) -> Self {
        Self {
            pool: self.pool.clone(),
            _table: PhantomData,
        }
    }
}

impl<T: Table> fmt::Debug for Repository<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Repository")
            .field("table", &T::table_name())
            .finish()
    }
}

impl<T: Table> Repository<T> {
    /// Create a repository bound to the given pool.
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            _table: PhantomData,
        }
    }

    /// Count rows matching the filter criteria. Pagination keys in the
    /// filter map are ignored.
    pub async fn count(&self, filters: &FieldMap) -> AppResult<u64> {
        let columns = descriptors::<T>()?;
        let mut writer = SqlWriter::new(format!("SELECT COUNT(*) FROM \"{}\"", columns.table()));
        apply_where(&mut writer, filters, &columns)?;

        let (sql, args) = writer.into_parts();
        debug!(table = columns.table(), sql = %sql, "counting rows");
        let row = bind_query(&sql, &args)?
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to count rows", e))?;
        let count: i64 = row
            .try_get(0)
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to count rows", e))?;
        Ok(count as u64)
    }

    /// Check whether any row matches the filter criteria.
    pub async fn exists(&self, filters: &FieldMap) -> AppResult<bool> {
        let columns = descriptors::<T>()?;
        let mut writer = SqlWriter::new(format!(
            "SELECT EXISTS (SELECT 1 FROM \"{}\"",
            columns.table()
        ));
        apply_where(&mut writer, filters, &columns)?;
        writer.push(")");

        let (sql, args) = writer.into_parts();
        debug!(table = columns.table(), sql = %sql, "checking existence");
        let row = bind_query(&sql, &args)?
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to check existence", e)
            })?;
        row.try_get(0)
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to check existence", e))
    }

    /// Get the first row matching the filter criteria, or `None`. Absence
    /// is a normal result, not an error.
    pub async fn get_first<O>(&self, filters: &FieldMap) -> AppResult<Option<O>>
    where
        O: for<'r> FromRow<'r, PgRow> + Send + Unpin,
    {
        let columns = descriptors::<T>()?;
        let mut writer = SqlWriter::new(format!("SELECT * FROM \"{}\"", columns.table()));
        apply_where(&mut writer, filters, &columns)?;
        writer.push(" LIMIT 1");

        let (sql, args) = writer.into_parts();
        debug!(table = columns.table(), sql = %sql, "fetching first row");
        bind_query_as::<O>(&sql, &args)?
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to fetch row", e))
    }

    /// Get all rows matching the filter criteria, ordered and paginated.
    ///
    /// An empty `order` slice sorts by the identity column ascending. A
    /// leading `-` on an order field means descending. Pagination is read
    /// from the reserved `limit`/`offset` keys of the filter map.
    pub async fn get_list<O>(&self, filters: &FieldMap, order: &[&str]) -> AppResult<Vec<O>>
    where
        O: for<'r> FromRow<'r, PgRow> + Send + Unpin,
    {
        let columns = descriptors::<T>()?;
        let mut writer = SqlWriter::new(format!("SELECT * FROM \"{}\"", columns.table()));
        apply_where(&mut writer, filters, &columns)?;
        if order.is_empty() {
            apply_order(&mut writer, &[columns.id_column()], &columns)?;
        } else {
            apply_order(&mut writer, order, &columns)?;
        }
        apply_pagination(&mut writer, filters)?;

        let (sql, args) = writer.into_parts();
        debug!(table = columns.table(), sql = %sql, "fetching rows");
        bind_query_as::<O>(&sql, &args)?
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to fetch rows", e))
    }

    /// Insert one row and return it, read back through a `RETURNING`
    /// clause in the same round trip.
    ///
    /// An explicit identity value in `data` is inserted as-is; a conflict
    /// is a store-level error and propagates. Creation/update timestamps
    /// are auto-populated when the table defines them and the caller
    /// omitted them.
    pub async fn create<O>(&self, data: &FieldMap) -> AppResult<O>
    where
        O: for<'r> FromRow<'r, PgRow> + Send + Unpin,
    {
        let columns = descriptors::<T>()?;
        let mut data = data.clone();
        stamp_on_create(&columns, &mut data, Utc::now());
        let writer = insert_writer(&columns, &data, true)?;

        let (sql, args) = writer.into_parts();
        debug!(table = columns.table(), sql = %sql, "inserting row");
        let mut tx = self.begin().await?;
        let row = bind_query_as::<O>(&sql, &args)?
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to insert row", e))?;
        self.commit(tx).await?;
        Ok(row)
    }

    /// Insert one row without reading it back.
    pub async fn create_untracked(&self, data: &FieldMap) -> AppResult<()> {
        let columns = descriptors::<T>()?;
        let mut data = data.clone();
        stamp_on_create(&columns, &mut data, Utc::now());
        let writer = insert_writer(&columns, &data, false)?;

        let (sql, args) = writer.into_parts();
        debug!(table = columns.table(), sql = %sql, "inserting row");
        let mut tx = self.begin().await?;
        bind_query(&sql, &args)?
            .execute(&mut *tx)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to insert row", e))?;
        self.commit(tx).await
    }

    /// Insert a batch of rows in one statement and return them.
    ///
    /// Every item must carry the same column set; the per-item timestamp
    /// and identity policy of [`create`](Self::create) applies uniformly.
    /// The returned rows are the same set as the input, but their order is
    /// whatever the store yields.
    pub async fn create_bulk<O>(&self, items: &[FieldMap]) -> AppResult<Vec<O>>
    where
        O: for<'r> FromRow<'r, PgRow> + Send + Unpin,
    {
        if items.is_empty() {
            return Ok(Vec::new());
        }
        let columns = descriptors::<T>()?;
        let items = stamp_items_on_create(&columns, items);
        let writer = insert_bulk_writer(&columns, &items, true)?;

        let (sql, args) = writer.into_parts();
        debug!(table = columns.table(), rows = items.len(), "inserting batch");
        let mut tx = self.begin().await?;
        let rows = bind_query_as::<O>(&sql, &args)?
            .fetch_all(&mut *tx)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to insert batch", e))?;
        self.commit(tx).await?;
        Ok(rows)
    }

    /// Insert a batch of rows without reading them back.
    pub async fn create_bulk_untracked(&self, items: &[FieldMap]) -> AppResult<()> {
        if items.is_empty() {
            return Ok(());
        }
        let columns = descriptors::<T>()?;
        let items = stamp_items_on_create(&columns, items);
        let writer = insert_bulk_writer(&columns, &items, false)?;

        let (sql, args) = writer.into_parts();
        debug!(table = columns.table(), rows = items.len(), "inserting batch");
        let mut tx = self.begin().await?;
        bind_query(&sql, &args)?
            .execute(&mut *tx)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to insert batch", e))?;
        self.commit(tx).await
    }

    /// Update all rows matching the filter criteria, then read the first
    /// match back through the same filters. An update that falsifies its
    /// own filter (rewriting the very column it matched on) therefore
    /// returns `None` even though rows were modified.
    pub async fn update<O>(&self, filters: &FieldMap, data: &FieldMap) -> AppResult<Option<O>>
    where
        O: for<'r> FromRow<'r, PgRow> + Send + Unpin,
    {
        self.update_untracked(filters, data).await?;
        self.get_first::<O>(filters).await
    }

    /// Update all rows matching the filter criteria. The update timestamp
    /// is auto-populated when the table defines one and the caller omitted
    /// it.
    pub async fn update_untracked(&self, filters: &FieldMap, data: &FieldMap) -> AppResult<()> {
        let columns = descriptors::<T>()?;
        let mut data = data.clone();
        stamp_on_update(&columns, &mut data, Utc::now());
        let writer = update_writer(&columns, filters, &data)?;

        let (sql, args) = writer.into_parts();
        debug!(table = columns.table(), sql = %sql, "updating rows");
        let mut tx = self.begin().await?;
        let result = bind_query(&sql, &args)?
            .execute(&mut *tx)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to update rows", e))?;
        self.commit(tx).await?;
        debug!(
            table = columns.table(),
            rows = result.rows_affected(),
            "updated rows"
        );
        Ok(())
    }

    /// Update a batch of rows, one statement per item keyed on the
    /// identity column, inside a single transaction, then read the touched
    /// rows back with one membership select.
    ///
    /// Items without an identity key are skipped, not erroneous. Returned
    /// row order is not guaranteed to match input order.
    pub async fn update_bulk<O>(&self, items: &[FieldMap]) -> AppResult<Vec<O>>
    where
        O: for<'r> FromRow<'r, PgRow> + Send + Unpin,
    {
        let columns = descriptors::<T>()?;
        let ids = self.update_bulk_inner(&columns, items).await?;
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let mut filters = FieldMap::new();
        filters.insert(
            format!("{}__in", columns.id_column()),
            FieldValue::List(ids),
        );
        self.get_list::<O>(&filters, &[]).await
    }

    /// Update a batch of rows without reading them back.
    pub async fn update_bulk_untracked(&self, items: &[FieldMap]) -> AppResult<()> {
        let columns = descriptors::<T>()?;
        self.update_bulk_inner(&columns, items).await.map(|_| ())
    }

    /// Update the first match, or create a new row when nothing matches.
    /// On the update path the identity fields are stripped from `data`.
    pub async fn update_or_create<O>(
        &self,
        filters: &FieldMap,
        data: &FieldMap,
    ) -> AppResult<Option<O>>
    where
        O: for<'r> FromRow<'r, PgRow> + Send + Unpin,
    {
        let columns = descriptors::<T>()?;
        if self.exists(filters).await? {
            let data = strip_identity(&columns, data);
            self.update::<O>(filters, &data).await
        } else {
            self.create::<O>(data).await.map(Some)
        }
    }

    /// [`update_or_create`](Self::update_or_create) without reading the
    /// affected row back.
    pub async fn update_or_create_untracked(
        &self,
        filters: &FieldMap,
        data: &FieldMap,
    ) -> AppResult<()> {
        let columns = descriptors::<T>()?;
        if self.exists(filters).await? {
            let data = strip_identity(&columns, data);
            self.update_untracked(filters, &data).await
        } else {
            self.create_untracked(data).await
        }
    }

    /// Delete all rows matching the filter criteria.
    ///
    /// An empty filter map matches, and deletes, every row; callers rely
    /// on this for full-table resets.
    pub async fn remove(&self, filters: &FieldMap) -> AppResult<()> {
        let columns = descriptors::<T>()?;
        let mut writer = SqlWriter::new(format!("DELETE FROM \"{}\"", columns.table()));
        apply_where(&mut writer, filters, &columns)?;

        let (sql, args) = writer.into_parts();
        debug!(table = columns.table(), sql = %sql, "deleting rows");
        let mut tx = self.begin().await?;
        let result = bind_query(&sql, &args)?
            .execute(&mut *tx)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to delete rows", e))?;
        self.commit(tx).await?;
        debug!(
            table = columns.table(),
            rows = result.rows_affected(),
            "deleted rows"
        );
        Ok(())
    }

    /// Build and run the per-item bulk update statements. All statements
    /// are validated and assembled before the first one executes, so a bad
    /// item fails the call with zero side effects.
    async fn update_bulk_inner(
        &self,
        columns: &ColumnMap,
        items: &[FieldMap],
    ) -> AppResult<Vec<FieldValue>> {
        if items.is_empty() {
            return Ok(Vec::new());
        }

        let now = Utc::now();
        let mut statements = Vec::new();
        let mut ids = Vec::new();
        for item in items {
            let mut item = item.clone();
            stamp_on_update(columns, &mut item, now);
            if let Some((writer, id)) = update_by_id_writer(columns, &item)? {
                statements.push(writer.into_parts());
                ids.push(id);
            }
        }
        if statements.is_empty() {
            return Ok(Vec::new());
        }

        debug!(
            table = columns.table(),
            rows = statements.len(),
            "updating batch"
        );
        let mut tx = self.begin().await?;
        for (sql, args) in &statements {
            bind_query(sql, args)?
                .execute(&mut *tx)
                .await
                .map_err(|e| {
                    AppError::with_source(ErrorKind::Database, "Failed to update batch", e)
                })?;
        }
        self.commit(tx).await?;
        Ok(ids)
    }

    async fn begin(&self) -> AppResult<sqlx::Transaction<'static, sqlx::Postgres>> {
        self.pool.begin().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to begin transaction", e)
        })
    }

    async fn commit(&self, tx: sqlx::Transaction<'static, sqlx::Postgres>) -> AppResult<()> {
        tx.commit().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to commit transaction", e)
        })
    }
}

/// Validate a create/update data map: every key must name a column, null
/// is only legal on nullable columns, and values must be scalars of the
/// column's semantic type.
fn validate_data(columns: &ColumnMap, data: &FieldMap) -> AppResult<()> {
    for (key, value) in data {
        let column = columns.require(key)?;
        if value.is_null() {
            if !column.nullable {
                return Err(AppError::null_violation(format!(
                    "column '{}' is not nullable",
                    column.name
                )));
            }
            continue;
        }
        if value.is_list() {
            return Err(AppError::invalid_value(format!(
                "column '{}' cannot be bound to a sequence",
                column.name
            )));
        }
        check_scalar(column, key, value)?;
    }
    Ok(())
}

fn stamp_on_create(columns: &ColumnMap, data: &mut FieldMap, now: DateTime<Utc>) {
    if let Some(name) = columns.created_at() {
        data.entry(name.to_string())
            .or_insert(FieldValue::Timestamp(now));
    }
    if let Some(name) = columns.updated_at() {
        data.entry(name.to_string())
            .or_insert(FieldValue::Timestamp(now));
    }
}

fn stamp_on_update(columns: &ColumnMap, data: &mut FieldMap, now: DateTime<Utc>) {
    if let Some(name) = columns.updated_at() {
        data.entry(name.to_string())
            .or_insert(FieldValue::Timestamp(now));
    }
}

/// Stamp every item of a batch with the same creation instant.
fn stamp_items_on_create(columns: &ColumnMap, items: &[FieldMap]) -> Vec<FieldMap> {
    let now = Utc::now();
    items
        .iter()
        .map(|item| {
            let mut item = item.clone();
            stamp_on_create(columns, &mut item, now);
            item
        })
        .collect()
}

fn strip_identity(columns: &ColumnMap, data: &FieldMap) -> FieldMap {
    let mut data = data.clone();
    data.remove(columns.id_column());
    data.remove("uuid");
    data
}

fn insert_writer(columns: &ColumnMap, data: &FieldMap, returning: bool) -> AppResult<SqlWriter> {
    validate_data(columns, data)?;

    let mut writer = SqlWriter::new(format!("INSERT INTO \"{}\"", columns.table()));
    if data.is_empty() {
        writer.push(" DEFAULT VALUES");
    } else {
        writer.push(" (");
        for (i, key) in data.keys().enumerate() {
            if i > 0 {
                writer.push(", ");
            }
            writer.push(&format!("\"{key}\""));
        }
        writer.push(") VALUES (");
        for (i, value) in data.values().enumerate() {
            if i > 0 {
                writer.push(", ");
            }
            writer.push_bind(value.clone());
        }
        writer.push(")");
    }
    if returning {
        writer.push(" RETURNING *");
    }
    Ok(writer)
}

fn insert_bulk_writer(
    columns: &ColumnMap,
    items: &[FieldMap],
    returning: bool,
) -> AppResult<SqlWriter> {
    let keys: Vec<&String> = items[0].keys().collect();
    for item in items {
        if item.len() != keys.len() || !keys.iter().all(|key| item.contains_key(*key)) {
            return Err(AppError::invalid_value(
                "bulk create items must share the same column set",
            ));
        }
        validate_data(columns, item)?;
    }

    let mut writer = SqlWriter::new(format!("INSERT INTO \"{}\" (", columns.table()));
    for (i, key) in keys.iter().enumerate() {
        if i > 0 {
            writer.push(", ");
        }
        writer.push(&format!("\"{key}\""));
    }
    writer.push(") VALUES ");
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            writer.push(", ");
        }
        writer.push("(");
        for (j, key) in keys.iter().enumerate() {
            if j > 0 {
                writer.push(", ");
            }
            writer.push_bind(item[*key].clone());
        }
        writer.push(")");
    }
    if returning {
        writer.push(" RETURNING *");
    }
    Ok(writer)
}

fn update_writer(columns: &ColumnMap, filters: &FieldMap, data: &FieldMap) -> AppResult<SqlWriter> {
    validate_data(columns, data)?;
    if data.is_empty() {
        return Err(AppError::validation(
            "update requires at least one column to set",
        ));
    }

    let mut writer = SqlWriter::new(format!("UPDATE \"{}\" SET ", columns.table()));
    for (i, (key, value)) in data.iter().enumerate() {
        if i > 0 {
            writer.push(", ");
        }
        writer.push(&format!("\"{key}\" = "));
        writer.push_bind(value.clone());
    }
    apply_where(&mut writer, filters, columns)?;
    Ok(writer)
}

/// Build the update statement for one bulk item, keyed on the identity
/// column. Items without an identity key, or with nothing to set besides
/// it, are skipped.
fn update_by_id_writer(
    columns: &ColumnMap,
    item: &FieldMap,
) -> AppResult<Option<(SqlWriter, FieldValue)>> {
    let id_key = columns.id_column();
    let Some(id) = item.get(id_key) else {
        return Ok(None);
    };
    let id = id.clone();

    let mut data = item.clone();
    data.remove(id_key);
    if data.is_empty() {
        return Ok(None);
    }

    let mut filters = FieldMap::new();
    filters.insert(id_key.to_string(), id.clone());
    let writer = update_writer(columns, &filters, &data)?;
    Ok(Some((writer, id)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_fixtures::People;
    use std::sync::Arc;
    use tablekit_core::error::ErrorKind;
    use tablekit_core::fields;
    use uuid::Uuid;

    fn columns() -> Arc<ColumnMap> {
        descriptors::<People>().expect("catalog")
    }

    #[test]
    fn test_insert_writer_with_returning() {
        let columns = columns();
        let mut data = fields! { "email" => "a@x.com", "age" => 30 };
        stamp_on_create(&columns, &mut data, Utc::now());
        let writer = insert_writer(&columns, &data, true).expect("insert");
        assert_eq!(
            writer.sql(),
            "INSERT INTO \"people\" (\"age\", \"created_at\", \"email\", \"updated_at\") \
             VALUES ($1, $2, $3, $4) RETURNING *"
        );
        assert_eq!(writer.args().len(), 4);
    }

    #[test]
    fn test_insert_writer_without_returning() {
        let writer =
            insert_writer(&columns(), &fields! { "email" => "a@x.com" }, false).expect("insert");
        assert_eq!(
            writer.sql(),
            "INSERT INTO \"people\" (\"email\") VALUES ($1)"
        );
    }

    #[test]
    fn test_insert_writer_respects_explicit_timestamps() {
        let columns = columns();
        let explicit = Utc::now() - chrono::Duration::days(1);
        let mut data = fields! { "email" => "a@x.com", "created_at" => explicit };
        stamp_on_create(&columns, &mut data, Utc::now());
        assert_eq!(data.get("created_at"), Some(&FieldValue::Timestamp(explicit)));
        // updated_at was absent, so it gets stamped.
        assert!(data.contains_key("updated_at"));
    }

    #[test]
    fn test_insert_writer_rejects_unknown_column() {
        let err =
            insert_writer(&columns(), &fields! { "nope" => 1 }, false).expect_err("column");
        assert_eq!(err.kind, ErrorKind::UnknownColumn);
    }

    #[test]
    fn test_insert_writer_rejects_null_on_non_nullable() {
        let err = insert_writer(&columns(), &fields! { "email" => None::<String> }, false)
            .expect_err("null");
        assert_eq!(err.kind, ErrorKind::NullViolation);
    }

    #[test]
    fn test_insert_writer_rejects_type_mismatch() {
        let err =
            insert_writer(&columns(), &fields! { "email" => 42 }, false).expect_err("type");
        assert_eq!(err.kind, ErrorKind::InvalidValue);
    }

    #[test]
    fn test_insert_writer_accepts_explicit_identity() {
        let writer = insert_writer(
            &columns(),
            &fields! { "id" => 99, "email" => "a@x.com" },
            false,
        )
        .expect("insert");
        assert_eq!(
            writer.sql(),
            "INSERT INTO \"people\" (\"email\", \"id\") VALUES ($1, $2)"
        );
    }

    #[test]
    fn test_insert_bulk_writer_multi_row() {
        let items = vec![
            fields! { "email" => "a@x.com", "age" => 1 },
            fields! { "email" => "b@x.com", "age" => 2 },
        ];
        let writer = insert_bulk_writer(&columns(), &items, true).expect("bulk");
        assert_eq!(
            writer.sql(),
            "INSERT INTO \"people\" (\"age\", \"email\") VALUES ($1, $2), ($3, $4) RETURNING *"
        );
        assert_eq!(writer.args().len(), 4);
    }

    #[test]
    fn test_insert_bulk_writer_rejects_heterogeneous_items() {
        let items = vec![
            fields! { "email" => "a@x.com", "age" => 1 },
            fields! { "email" => "b@x.com" },
        ];
        let err = insert_bulk_writer(&columns(), &items, false).expect_err("keys");
        assert_eq!(err.kind, ErrorKind::InvalidValue);
    }

    #[test]
    fn test_update_writer_sets_and_filters() {
        let columns = columns();
        let mut data = fields! { "age" => 31 };
        stamp_on_update(&columns, &mut data, Utc::now());
        let writer =
            update_writer(&columns, &fields! { "email" => "a@x.com" }, &data).expect("update");
        assert_eq!(
            writer.sql(),
            "UPDATE \"people\" SET \"age\" = $1, \"updated_at\" = $2 WHERE \"email\" = $3"
        );
    }

    #[test]
    fn test_update_writer_rejects_empty_data() {
        let err = update_writer(&columns(), &fields! {}, &fields! {}).expect_err("empty");
        assert_eq!(err.kind, ErrorKind::Validation);
    }

    #[test]
    fn test_update_by_id_writer_builds_identity_predicate() {
        let (writer, id) = update_by_id_writer(&columns(), &fields! { "id" => 7, "age" => 40 })
            .expect("writer")
            .expect("some");
        assert_eq!(
            writer.sql(),
            "UPDATE \"people\" SET \"age\" = $1 WHERE \"id\" = $2"
        );
        assert_eq!(id, FieldValue::Integer(7));
    }

    #[test]
    fn test_update_by_id_writer_skips_missing_identity() {
        let skipped = update_by_id_writer(&columns(), &fields! { "age" => 40 }).expect("writer");
        assert!(skipped.is_none());
    }

    #[test]
    fn test_update_by_id_writer_skips_identity_only_item() {
        let skipped = update_by_id_writer(&columns(), &fields! { "id" => 7 }).expect("writer");
        assert!(skipped.is_none());
    }

    #[test]
    fn test_validate_data_accepts_uuid_and_json() {
        validate_data(
            &columns(),
            &fields! {
                "uuid" => Uuid::new_v4(),
                "meta" => serde_json::json!({"first_name": "John"}),
            },
        )
        .expect("valid");
    }

    #[test]
    fn test_validate_data_rejects_sequences() {
        let err =
            validate_data(&columns(), &fields! { "age" => vec![1i64, 2] }).expect_err("list");
        assert_eq!(err.kind, ErrorKind::InvalidValue);
    }

    #[test]
    fn test_strip_identity_removes_id_and_uuid() {
        let data = fields! { "id" => 1, "uuid" => Uuid::new_v4(), "email" => "a@x.com" };
        let stripped = strip_identity(&columns(), &data);
        assert_eq!(stripped.len(), 1);
        assert!(stripped.contains_key("email"));
    }
}
