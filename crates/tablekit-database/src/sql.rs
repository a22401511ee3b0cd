//! Incremental SQL statement writer with `$n` placeholder numbering.
//!
//! Predicate builders append text and bind arguments to a [`SqlWriter`];
//! execution then replays the collected arguments onto an sqlx query. The
//! split keeps statement assembly pure and directly testable.

use sqlx::Postgres;
use sqlx::postgres::{PgArguments, PgRow};
use sqlx::query::{Query, QueryAs};

use tablekit_core::types::FieldValue;
use tablekit_core::{AppError, AppResult};

/// Accumulates SQL text alongside its ordered bind arguments.
#[derive(Debug)]
pub struct SqlWriter {
    sql: String,
    args: Vec<FieldValue>,
    conjuncts: usize,
}

impl SqlWriter {
    /// Start a statement from its base clause (e.g. `SELECT * FROM "t"`).
    pub fn new(base: impl Into<String>) -> Self {
        Self {
            sql: base.into(),
            args: Vec::new(),
            conjuncts: 0,
        }
    }

    /// Append raw SQL text.
    pub fn push(&mut self, sql: &str) {
        self.sql.push_str(sql);
    }

    /// Append the next `$n` placeholder and queue its argument.
    pub fn push_bind(&mut self, value: FieldValue) {
        self.args.push(value);
        self.sql.push('$');
        self.sql.push_str(&self.args.len().to_string());
    }

    /// Begin a WHERE conjunct: writes ` WHERE ` for the first predicate and
    /// ` AND ` for every following one.
    pub fn start_conjunct(&mut self) {
        if self.conjuncts == 0 {
            self.sql.push_str(" WHERE ");
        } else {
            self.sql.push_str(" AND ");
        }
        self.conjuncts += 1;
    }

    /// The SQL text accumulated so far.
    pub fn sql(&self) -> &str {
        &self.sql
    }

    /// The bind arguments accumulated so far.
    pub fn args(&self) -> &[FieldValue] {
        &self.args
    }

    /// Finish, yielding the SQL text and its arguments.
    pub fn into_parts(self) -> (String, Vec<FieldValue>) {
        (self.sql, self.args)
    }
}

macro_rules! bind_field_values {
    ($query:expr, $args:expr) => {{
        let mut query = $query;
        for arg in $args {
            query = match arg {
                FieldValue::Null => query.bind(None::<String>),
                FieldValue::Boolean(v) => query.bind(*v),
                FieldValue::Integer(v) => query.bind(*v),
                FieldValue::Float(v) => query.bind(*v),
                FieldValue::String(v) => query.bind(v.clone()),
                FieldValue::Uuid(v) => query.bind(*v),
                FieldValue::Timestamp(v) => query.bind(*v),
                FieldValue::Json(v) => query.bind(v.clone()),
                FieldValue::List(_) => {
                    return Err(AppError::internal(
                        "sequence argument was not expanded before binding",
                    ));
                }
            };
        }
        Ok(query)
    }};
}

/// Bind collected arguments onto a plain query.
pub fn bind_query<'q>(
    sql: &'q str,
    args: &[FieldValue],
) -> AppResult<Query<'q, Postgres, PgArguments>> {
    bind_field_values!(sqlx::query(sql), args)
}

/// Bind collected arguments onto a row-mapping query.
pub fn bind_query_as<'q, O>(
    sql: &'q str,
    args: &[FieldValue],
) -> AppResult<QueryAs<'q, Postgres, O, PgArguments>>
where
    O: for<'r> sqlx::FromRow<'r, PgRow>,
{
    bind_field_values!(sqlx::query_as::<_, O>(sql), args)
}
