//! Column descriptors: semantic type and nullability of one table column.

use serde::{Deserialize, Serialize};

/// The semantic type of a column, as seen by value validation and row
/// decoding. Deliberately coarser than the store's own type system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnKind {
    /// Boolean column.
    Boolean,
    /// Integer column of any width.
    Integer,
    /// Floating-point column.
    Float,
    /// Text column.
    Text,
    /// UUID column.
    Uuid,
    /// Timestamp column (UTC).
    Timestamp,
    /// Structured JSON/JSONB column, addressable by sub-key in filters.
    Json,
}

impl ColumnKind {
    /// A lowercase name for error messages.
    pub fn describe(&self) -> &'static str {
        match self {
            Self::Boolean => "boolean",
            Self::Integer => "integer",
            Self::Float => "float",
            Self::Text => "string",
            Self::Uuid => "uuid",
            Self::Timestamp => "timestamp",
            Self::Json => "json",
        }
    }
}

/// Descriptor for one column of a table.
///
/// Built in `const` context so `Table::columns` can return a static slice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDef {
    /// Column name as it appears in the store.
    pub name: &'static str,
    /// Semantic type.
    pub kind: ColumnKind,
    /// Whether the column accepts null.
    pub nullable: bool,
}

impl ColumnDef {
    /// A non-nullable column of the given kind.
    pub const fn new(name: &'static str, kind: ColumnKind) -> Self {
        Self {
            name,
            kind,
            nullable: false,
        }
    }

    /// Mark the column nullable.
    pub const fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_const_builder() {
        const COL: ColumnDef = ColumnDef::new("email", ColumnKind::Text);
        assert_eq!(COL.name, "email");
        assert!(!COL.nullable);

        const OPT: ColumnDef = ColumnDef::new("score", ColumnKind::Float).nullable();
        assert!(OPT.nullable);
    }

    #[test]
    fn test_describe() {
        assert_eq!(ColumnKind::Text.describe(), "string");
        assert_eq!(ColumnKind::Json.describe(), "json");
    }
}
