// src/export/model.rs

use crate::core::schema::ID_COLUMN;
use crate::core::writer::display_value;
use crate::db::datastore::{Datastore, SqlValue, qualified, quote_ident};
use crate::errors::AppResult;
use crate::models::ColumnType;
use serde_json::{Map, Number, Value};

/// Rows of one table, with the declared type of each column.
#[derive(Debug, Clone)]
pub struct TableSnapshot {
    pub table: String,
    pub columns: Vec<(String, ColumnType)>,
    pub rows: Vec<Vec<SqlValue>>,
}

impl TableSnapshot {
    /// Read `table` (optionally only the rows of one `id`), in insertion order.
    pub fn load<D: Datastore + ?Sized>(
        store: &D,
        table: &str,
        id: Option<i64>,
    ) -> AppResult<Self> {
        let columns = store.table_columns(table)?;

        let col_list = columns
            .iter()
            .map(|(c, _)| quote_ident(c))
            .collect::<Vec<_>>()
            .join(", ");

        let rows = match id {
            Some(id) => store.query(
                &format!(
                    "SELECT {col_list} FROM {} WHERE {} = ?1 ORDER BY rowid",
                    qualified(table),
                    quote_ident(ID_COLUMN)
                ),
                &[SqlValue::Integer(id)],
            )?,
            None => store.query(
                &format!("SELECT {col_list} FROM {} ORDER BY rowid", qualified(table)),
                &[],
            )?,
        };

        Ok(Self {
            table: table.to_string(),
            columns,
            rows: rows.rows,
        })
    }

    pub fn headers(&self) -> Vec<&str> {
        self.columns.iter().map(|(c, _)| c.as_str()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Rows rendered as plain strings (CSV).
    pub(crate) fn text_rows(&self) -> impl Iterator<Item = Vec<String>> + '_ {
        self.rows
            .iter()
            .map(|r| r.iter().map(display_value).collect())
    }

    /// Rows as JSON objects keyed by column name, column order preserved.
    pub(crate) fn json_rows(&self) -> Vec<Value> {
        self.rows
            .iter()
            .map(|r| {
                let mut obj = Map::new();
                for ((name, _), v) in self.columns.iter().zip(r) {
                    obj.insert(name.clone(), json_value(v));
                }
                Value::Object(obj)
            })
            .collect()
    }
}

fn json_value(v: &SqlValue) -> Value {
    match v {
        SqlValue::Null => Value::Null,
        SqlValue::Integer(n) => Value::from(*n),
        SqlValue::Real(f) => Number::from_f64(*f).map(Value::Number).unwrap_or(Value::Null),
        SqlValue::Text(s) => Value::String(s.clone()),
        SqlValue::Blob(_) => Value::String(display_value(v)),
    }
}
