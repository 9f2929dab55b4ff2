use clap::ValueEnum;
use serde::Serialize;

/// Declared type of a destination column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ValueEnum)]
pub enum ColumnType {
    Text,
    Integer,
    Real,
    Timestamp,
}

impl ColumnType {
    /// Convert enum → SQL type declaration
    pub fn to_sql_decl(&self) -> &'static str {
        match self {
            ColumnType::Text => "TEXT",
            ColumnType::Integer => "INTEGER",
            ColumnType::Real => "REAL",
            ColumnType::Timestamp => "TIMESTAMP",
        }
    }

    /// Convert a declared SQL type → enum, following SQLite affinity rules.
    /// Timestamps are recognized before the generic fallbacks.
    pub fn from_sql_decl(decl: &str) -> Self {
        let d = decl.to_uppercase();
        if d.contains("INT") {
            ColumnType::Integer
        } else if d.contains("TIMESTAMP") || d.contains("DATE") {
            ColumnType::Timestamp
        } else if d.contains("REAL") || d.contains("FLOA") || d.contains("DOUB") {
            ColumnType::Real
        } else {
            ColumnType::Text
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ColumnType::Text => "text",
            ColumnType::Integer => "integer",
            ColumnType::Real => "real",
            ColumnType::Timestamp => "timestamp",
        }
    }
}
