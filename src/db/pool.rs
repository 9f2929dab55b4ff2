//! SQLite connection pool wrapper (lightweight for CLI usage).

use crate::db::datastore::{Datastore, QueryRows, SCHEMA, SqlValue, qualified, quote_ident};
use crate::errors::{AppError, AppResult};
use crate::models::ColumnType;
use rusqlite::{Connection, OptionalExtension, Result, params_from_iter};
use std::path::Path;
use std::time::Duration;

/// Default wait on a locked database before giving up.
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

pub struct DbPool {
    pub conn: Connection,
}

impl DbPool {
    pub fn new(path: &str) -> Result<Self> {
        Self::with_busy_timeout(path, DEFAULT_BUSY_TIMEOUT_MS)
    }

    pub fn with_busy_timeout(path: &str, busy_timeout_ms: u64) -> Result<Self> {
        let conn = Connection::open(Path::new(path))?;
        conn.busy_timeout(Duration::from_millis(busy_timeout_ms))?;
        Ok(Self { conn })
    }

    /// Throw-away database, used by tests and dry runs.
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Ok(Self { conn })
    }

    pub fn table_exists(&self, table: &str) -> AppResult<bool> {
        let found: Option<String> = self
            .conn
            .query_row(
                "SELECT name FROM sqlite_master WHERE type='table' AND name = ?1 COLLATE NOCASE",
                [table],
                |row| row.get(0),
            )
            .optional()?;
        Ok(found.is_some())
    }
}

impl Datastore for DbPool {
    fn execute(&self, sql: &str, params: &[SqlValue]) -> AppResult<usize> {
        Ok(self.conn.execute(sql, params_from_iter(params.iter()))?)
    }

    fn query(&self, sql: &str, params: &[SqlValue]) -> AppResult<QueryRows> {
        let mut stmt = self.conn.prepare(sql)?;
        let columns: Vec<String> = stmt.column_names().iter().map(|c| c.to_string()).collect();
        let width = columns.len();

        let mut rows = stmt.query(params_from_iter(params.iter()))?;
        let mut out = Vec::new();
        while let Some(row) = rows.next()? {
            let mut values = Vec::with_capacity(width);
            for i in 0..width {
                values.push(row.get::<_, SqlValue>(i)?);
            }
            out.push(values);
        }

        Ok(QueryRows { columns, rows: out })
    }

    fn append_rows(
        &self,
        table: &str,
        columns: &[String],
        rows: &[Vec<SqlValue>],
    ) -> AppResult<usize> {
        if rows.is_empty() {
            return Ok(0);
        }

        let col_list = columns
            .iter()
            .map(|c| quote_ident(c))
            .collect::<Vec<_>>()
            .join(", ");
        let placeholders = (1..=columns.len())
            .map(|i| format!("?{i}"))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!(
            "INSERT INTO {} ({col_list}) VALUES ({placeholders})",
            qualified(table)
        );

        // SAVEPOINT funziona sia dentro che fuori da una transazione aperta
        self.conn.execute_batch("SAVEPOINT append_rows;")?;

        let result = (|| -> AppResult<usize> {
            let mut stmt = self.conn.prepare_cached(&sql)?;
            let mut written = 0;
            for row in rows {
                written += stmt.execute(params_from_iter(row.iter()))?;
            }
            Ok(written)
        })();

        match result {
            Ok(n) => {
                self.conn.execute_batch("RELEASE append_rows;")?;
                Ok(n)
            }
            Err(e) => {
                self.conn
                    .execute_batch("ROLLBACK TO append_rows; RELEASE append_rows;")?;
                Err(e)
            }
        }
    }

    fn max(&self, table: &str, column: &str) -> AppResult<Option<i64>> {
        let sql = format!("SELECT MAX({}) FROM {}", quote_ident(column), qualified(table));
        let value: Option<i64> = self.conn.query_row(&sql, [], |row| row.get(0))?;
        Ok(value)
    }

    fn table_columns(&self, table: &str) -> AppResult<Vec<(String, ColumnType)>> {
        let sql = format!("PRAGMA {SCHEMA}.table_info({})", quote_ident(table));
        let mut stmt = self.conn.prepare(&sql)?;
        let cols = stmt.query_map([], |row| {
            let name: String = row.get(1)?;
            let decl: String = row.get(2)?;
            Ok((name, ColumnType::from_sql_decl(&decl)))
        })?;

        let mut out = Vec::new();
        for c in cols {
            out.push(c?);
        }

        if out.is_empty() {
            return Err(AppError::UnknownTable(table.to_string()));
        }
        Ok(out)
    }

    fn begin_transaction(&self) -> AppResult<()> {
        // IMMEDIATE: take the write lock now, so concurrent allocators queue up
        self.conn.execute_batch("BEGIN IMMEDIATE;")?;
        Ok(())
    }

    fn commit(&self) -> AppResult<()> {
        self.conn.execute_batch("COMMIT;")?;
        Ok(())
    }

    fn rollback(&self) -> AppResult<()> {
        self.conn.execute_batch("ROLLBACK;")?;
        Ok(())
    }
}
