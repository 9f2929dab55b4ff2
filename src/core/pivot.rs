use crate::errors::{AppError, AppResult};
use crate::models::{CellValue, Grid, Record};

/// Column name given to values whose label is missing (no label above them).
/// Mirrors how a missing label stringifies, so the mapper can drop it.
pub const MISSING_LABEL: &str = "nan";

pub struct KeyValuePivoter;

impl KeyValuePivoter {
    /// Pivot a vertical (label, value) block into one horizontal record.
    ///
    /// - column 0 is the label, column 1 the value (stringified);
    /// - blank labels inherit the last non-blank label above them;
    /// - per label, the first non-blank value wins;
    /// - labels that never get a value are kept with an empty value.
    pub fn pivot(block: &Grid) -> AppResult<Record> {
        if block.is_empty() {
            return Err(AppError::EmptyBlock);
        }

        let mut record = Record::new();
        let mut current: Option<String> = None;

        for row in 0..block.height() {
            if let Some(label) = block.cell(row, 0).to_text() {
                current = Some(label);
            }
            let label = current.clone().unwrap_or_else(|| MISSING_LABEL.to_string());

            let value = block.cell(row, 1).to_text();

            // già valorizzata: vince il primo valore non vuoto
            let filled = record.get(&label).is_some_and(|v| !v.is_blank());
            let present = record.contains(&label);

            match value {
                Some(v) if !filled => record.set(label, CellValue::Text(v)),
                None if !present => record.set(label, CellValue::Empty),
                _ => {}
            }
        }

        Ok(record)
    }
}
