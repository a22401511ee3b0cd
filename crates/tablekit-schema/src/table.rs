//! The table introspection trait implemented by entity marker types.

use crate::column::ColumnDef;

/// Static description of one relational table.
///
/// Implementors are zero-sized marker types; the repository engine is
/// generic over them. The column set is fixed for the process lifetime,
/// which is what lets the descriptor catalog cache it forever.
///
/// ```
/// use tablekit_schema::{ColumnDef, ColumnKind, Table};
///
/// struct Users;
///
/// impl Table for Users {
///     fn table_name() -> &'static str {
///         "users"
///     }
///
///     fn columns() -> &'static [ColumnDef] {
///         const COLUMNS: &[ColumnDef] = &[
///             ColumnDef::new("id", ColumnKind::Integer),
///             ColumnDef::new("email", ColumnKind::Text),
///             ColumnDef::new("created_at", ColumnKind::Timestamp).nullable(),
///         ];
///         COLUMNS
///     }
/// }
/// ```
pub trait Table: Send + Sync + 'static {
    /// The table name as it appears in the store.
    fn table_name() -> &'static str;

    /// Every column of the table, in declaration order.
    fn columns() -> &'static [ColumnDef];

    /// The stable identity column, used for default ordering and bulk
    /// updates.
    fn id_column() -> &'static str {
        "id"
    }
}
