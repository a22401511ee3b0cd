//! Process-wide field descriptor catalog.
//!
//! The first call to [`descriptors`] for a table type resolves its column
//! metadata; subsequent calls return the cached map. Concurrent first calls
//! may compute the map twice, which is benign: the computation is pure and
//! deterministic, so last-writer-wins leaves an identical value.

use std::any::TypeId;
use std::collections::BTreeMap;
use std::sync::{Arc, LazyLock};

use dashmap::DashMap;

use tablekit_core::{AppError, AppResult};

use crate::column::{ColumnDef, ColumnKind};
use crate::table::Table;

/// Name of the creation timestamp column, when a table defines one.
pub const CREATED_AT: &str = "created_at";
/// Name of the update timestamp column, when a table defines one.
pub const UPDATED_AT: &str = "updated_at";

static CATALOG: LazyLock<DashMap<TypeId, Arc<ColumnMap>>> = LazyLock::new(DashMap::new);

/// Resolved column metadata for one table type.
#[derive(Debug, Clone)]
pub struct ColumnMap {
    table: &'static str,
    id: &'static str,
    columns: BTreeMap<&'static str, ColumnDef>,
    created_at: Option<&'static str>,
    updated_at: Option<&'static str>,
}

impl ColumnMap {
    fn build<T: Table>() -> AppResult<Self> {
        let defs = T::columns();
        if defs.is_empty() {
            return Err(AppError::configuration(format!(
                "table '{}' exposes no introspectable columns",
                T::table_name()
            )));
        }

        let mut columns = BTreeMap::new();
        for def in defs {
            if columns.insert(def.name, *def).is_some() {
                return Err(AppError::configuration(format!(
                    "table '{}' declares column '{}' more than once",
                    T::table_name(),
                    def.name
                )));
            }
        }

        if !columns.contains_key(T::id_column()) {
            return Err(AppError::configuration(format!(
                "table '{}' has no identity column '{}'",
                T::table_name(),
                T::id_column()
            )));
        }

        let timestamp = |name: &'static str| {
            columns
                .get(name)
                .filter(|c| c.kind == ColumnKind::Timestamp)
                .map(|c| c.name)
        };

        Ok(Self {
            table: T::table_name(),
            id: T::id_column(),
            created_at: timestamp(CREATED_AT),
            updated_at: timestamp(UPDATED_AT),
            columns,
        })
    }

    /// The table name.
    pub fn table(&self) -> &'static str {
        self.table
    }

    /// The identity column name.
    pub fn id_column(&self) -> &'static str {
        self.id
    }

    /// Look up a column descriptor by name.
    pub fn get(&self, name: &str) -> Option<&ColumnDef> {
        self.columns.get(name)
    }

    /// Look up a column descriptor, failing with an unknown-column error.
    pub fn require(&self, name: &str) -> AppResult<&ColumnDef> {
        self.columns.get(name).ok_or_else(|| {
            AppError::unknown_column(format!(
                "column '{name}' does not exist on table '{}'",
                self.table
            ))
        })
    }

    /// The creation timestamp column, if the table defines one.
    pub fn created_at(&self) -> Option<&'static str> {
        self.created_at
    }

    /// The update timestamp column, if the table defines one.
    pub fn updated_at(&self) -> Option<&'static str> {
        self.updated_at
    }

    /// All column names, in name order.
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.columns.keys().copied()
    }

    /// Number of columns.
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Whether the table has no columns. Never true for a map obtained
    /// through [`descriptors`].
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

/// Return the cached column map for `T`, computing it on first use.
pub fn descriptors<T: Table>() -> AppResult<Arc<ColumnMap>> {
    let key = TypeId::of::<T>();
    if let Some(cached) = CATALOG.get(&key) {
        return Ok(Arc::clone(&cached));
    }
    let map = Arc::new(ColumnMap::build::<T>()?);
    CATALOG.insert(key, Arc::clone(&map));
    Ok(map)
}
