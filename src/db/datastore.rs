//! Generic datastore interface used by the ingestion pipeline.
//!
//! The pipeline only talks to this trait; `DbPool` implements it on top of
//! SQLite. All tables live in the `main` schema namespace.

use crate::errors::AppResult;
use crate::models::ColumnType;

pub use rusqlite::types::Value as SqlValue;

/// Schema namespace every family table lives in.
pub const SCHEMA: &str = "main";

/// Result set of a generic query.
#[derive(Debug, Clone, Default)]
pub struct QueryRows {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<SqlValue>>,
}

impl QueryRows {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

pub trait Datastore {
    /// Run one statement that returns no rows; returns the affected row count.
    fn execute(&self, sql: &str, params: &[SqlValue]) -> AppResult<usize>;

    fn query(&self, sql: &str, params: &[SqlValue]) -> AppResult<QueryRows>;

    /// Insert `rows` into `table` (columns in the given order).
    /// All rows are written or none.
    fn append_rows(&self, table: &str, columns: &[String], rows: &[Vec<SqlValue>])
    -> AppResult<usize>;

    /// `MAX(column)` of a table; `None` when the table has no rows.
    fn max(&self, table: &str, column: &str) -> AppResult<Option<i64>>;

    /// Declared columns of a table, in order.
    fn table_columns(&self, table: &str) -> AppResult<Vec<(String, ColumnType)>>;

    fn begin_transaction(&self) -> AppResult<()>;
    fn commit(&self) -> AppResult<()>;
    fn rollback(&self) -> AppResult<()>;
}

/// Quote an identifier (column names may contain brackets, e.g. `Discharge_Duration[hr]`).
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// `main."table"`
pub fn qualified(table: &str) -> String {
    format!("{}.{}", SCHEMA, quote_ident(table))
}
