// src/export/logic.rs

use crate::db::log::audit;
use crate::db::pool::DbPool;
use crate::errors::{AppError, AppResult};
use crate::export::ExportFormat;
use crate::export::TableSnapshot;
use crate::export::fs_utils::ensure_writable;
use crate::export::json_csv::{export_csv, export_json};
use crate::export::xlsx::export_xlsx;
use crate::ui::messages::warning;
use std::path::Path;

/// Logica di alto livello per l'export.
pub struct ExportLogic;

impl ExportLogic {
    /// Dump a table (or only the rows of one `id`) to a file.
    ///
    /// - `format`: csv | json | xlsx
    /// - `file`: path assoluto del file di output
    ///
    /// Returns the number of exported rows.
    pub fn export(
        pool: &DbPool,
        table: &str,
        format: ExportFormat,
        file: &str,
        id: Option<i64>,
        force: bool,
    ) -> AppResult<usize> {
        let path = Path::new(file);

        if !path.is_absolute() {
            return Err(AppError::Export(format!(
                "Output file path must be absolute: {file}"
            )));
        }

        let snapshot = TableSnapshot::load(pool, table, id)?;

        if snapshot.is_empty() {
            match id {
                Some(id) => warning(format!("No rows with id {id} in '{table}'.")),
                None => warning(format!("Table '{table}' is empty.")),
            }
            return Ok(0);
        }

        ensure_writable(path, force)?;

        match format {
            ExportFormat::Csv => export_csv(&snapshot, path)?,
            ExportFormat::Json => export_json(&snapshot, path)?,
            ExportFormat::Xlsx => export_xlsx(&snapshot, path)?,
        }

        let rows = snapshot.rows.len();
        audit(
            &pool.conn,
            "export",
            table,
            &format!("{rows} rows → {} ({})", path.display(), format.as_str()),
        );

        Ok(rows)
    }
}
