//! Unified application error type.
//! All modules (db, core, cli, workbook) return AppError to keep the error
//! handling consistent and easy to manage.

use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    // ---------------------------
    // IO
    // ---------------------------
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    // ---------------------------
    // Database-related
    // ---------------------------
    #[error("Database error: {0}")]
    Db(#[from] rusqlite::Error),

    // ---------------------------
    // Workbook / sheet errors
    // ---------------------------
    #[error("Workbook error: {0}")]
    Workbook(#[from] calamine::Error),

    #[error("Sheet '{0}' not found in workbook")]
    MissingSheet(String),

    #[error("Malformed sheet '{sheet}': {block} block is empty (template layout drift?)")]
    MalformedSheet { sheet: String, block: String },

    #[error("Empty key/value block: nothing to pivot")]
    EmptyBlock,

    // ---------------------------
    // Schema / persistence errors
    // ---------------------------
    #[error("Schema mismatch on '{table}': unknown column(s) {}", columns.join(", "))]
    SchemaMismatch { table: String, columns: Vec<String> },

    #[error("Invalid value '{value}' for column '{column}' ({expected})")]
    InvalidValue {
        column: String,
        value: String,
        expected: String,
    },

    #[error("Another upload is allocating identifiers ('{0}' is locked); upload aborted")]
    IdentityRace(String),

    #[error("Project row written with id {id}, but its line items were not: {source}")]
    LineItemsFailed {
        id: i64,
        #[source]
        source: Box<AppError>,
    },

    #[error("Unknown table: {0}")]
    UnknownTable(String),

    // ---------------------------
    // Config errors
    // ---------------------------
    #[error("Configuration error: {0}")]
    Config(String),

    // ---------------------------
    // Export errors
    // ---------------------------
    #[error("Export error: {0}")]
    Export(String),

    // ---------------------------
    // Batch
    // ---------------------------
    #[error("{0} sheet upload(s) failed")]
    BatchFailed(usize),

    // ---------------------------
    // Generic fallback
    // ---------------------------
    #[error("Internal error: {0}")]
    Other(String),
}

pub type AppResult<T> = Result<T, AppError>;
