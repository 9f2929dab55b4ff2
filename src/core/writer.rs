use crate::db::datastore::{Datastore, SqlValue};
use crate::errors::{AppError, AppResult};
use crate::models::cell::{DATETIME_FMT, excel_serial_to_datetime, format_float};
use crate::models::{CellValue, ColumnType, Record};
use chrono::{NaiveDate, NaiveDateTime};

/// Text formats accepted for timestamp columns.
const DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%m/%d/%Y %H:%M",
];
const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%m/%d/%Y", "%d.%m.%Y"];

pub struct TableWriter;

impl TableWriter {
    /// Append records to `table`, coercing every value to the column's declared type.
    ///
    /// The union of the records' columns must exist in the destination;
    /// otherwise nothing is written and `SchemaMismatch` lists the strangers.
    pub fn append<D: Datastore + ?Sized>(
        store: &D,
        table: &str,
        records: &[Record],
    ) -> AppResult<usize> {
        if records.is_empty() {
            return Ok(0);
        }
        let (columns, rows) = Self::coerce_all(store, table, records)?;
        store.append_rows(table, &columns, &rows)
    }

    /// Same checks as `append` (destination columns, value coercion), no write.
    pub fn check<D: Datastore + ?Sized>(
        store: &D,
        table: &str,
        records: &[Record],
    ) -> AppResult<()> {
        if records.is_empty() {
            return Ok(());
        }
        Self::coerce_all(store, table, records).map(|_| ())
    }

    fn coerce_all<D: Datastore + ?Sized>(
        store: &D,
        table: &str,
        records: &[Record],
    ) -> AppResult<(Vec<String>, Vec<Vec<SqlValue>>)> {
        let destination = store.table_columns(table)?;

        // colonne nell'ordine di prima apparizione
        let mut columns: Vec<String> = Vec::new();
        for r in records {
            for c in r.columns() {
                if !columns.iter().any(|x| x == c) {
                    columns.push(c.to_string());
                }
            }
        }

        let missing: Vec<String> = columns
            .iter()
            .filter(|c| !destination.iter().any(|(d, _)| d.eq_ignore_ascii_case(c)))
            .cloned()
            .collect();
        if !missing.is_empty() {
            return Err(AppError::SchemaMismatch {
                table: table.to_string(),
                columns: missing,
            });
        }

        let types: Vec<ColumnType> = columns
            .iter()
            .map(|c| {
                destination
                    .iter()
                    .find(|(d, _)| d.eq_ignore_ascii_case(c))
                    .map(|(_, t)| *t)
                    .unwrap_or(ColumnType::Text)
            })
            .collect();

        let mut rows = Vec::with_capacity(records.len());
        for r in records {
            let mut row = Vec::with_capacity(columns.len());
            for (c, t) in columns.iter().zip(&types) {
                let value = r.get(c).unwrap_or(&CellValue::Empty);
                row.push(coerce(value, *t, c)?);
            }
            rows.push(row);
        }

        Ok((columns, rows))
    }
}

/// Convert a cell into the SQL value for a column of type `kind`.
pub fn coerce(value: &CellValue, kind: ColumnType, column: &str) -> AppResult<SqlValue> {
    if value.is_blank() {
        return Ok(SqlValue::Null);
    }

    let invalid = || AppError::InvalidValue {
        column: column.to_string(),
        value: value.to_text().unwrap_or_default(),
        expected: kind.as_str().to_string(),
    };

    match kind {
        ColumnType::Text => Ok(value
            .to_text()
            .map(SqlValue::Text)
            .unwrap_or(SqlValue::Null)),

        ColumnType::Integer => match value {
            CellValue::Int(n) => Ok(SqlValue::Integer(*n)),
            CellValue::Float(f) if f.fract() == 0.0 => Ok(SqlValue::Integer(*f as i64)),
            CellValue::Bool(b) => Ok(SqlValue::Integer(i64::from(*b))),
            CellValue::Text(s) => parse_integer(s).map(SqlValue::Integer).ok_or_else(invalid),
            _ => Err(invalid()),
        },

        ColumnType::Real => match value {
            CellValue::Int(n) => Ok(SqlValue::Real(*n as f64)),
            CellValue::Float(f) => Ok(SqlValue::Real(*f)),
            CellValue::Text(s) => parse_real(s).map(SqlValue::Real).ok_or_else(invalid),
            _ => Err(invalid()),
        },

        ColumnType::Timestamp => {
            let dt = match value {
                CellValue::DateTime(dt) => Some(*dt),
                CellValue::Float(f) => excel_serial_to_datetime(*f),
                CellValue::Int(n) => excel_serial_to_datetime(*n as f64),
                CellValue::Text(s) => parse_timestamp(s),
                _ => None,
            };
            dt.map(|d| SqlValue::Text(d.format(DATETIME_FMT).to_string()))
                .ok_or_else(invalid)
        }
    }
}

fn parse_integer(s: &str) -> Option<i64> {
    let t = s.trim().replace(',', "");
    if let Ok(n) = t.parse::<i64>() {
        return Some(n);
    }
    match t.parse::<f64>() {
        Ok(f) if f.fract() == 0.0 && f.is_finite() => Some(f as i64),
        _ => None,
    }
}

fn parse_real(s: &str) -> Option<f64> {
    let t = s.trim().replace(',', "");
    let t = t.trim_start_matches('$');
    t.parse::<f64>().ok().filter(|f| f.is_finite())
}

fn parse_timestamp(s: &str) -> Option<NaiveDateTime> {
    let t = s.trim();
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(t, fmt) {
            return Some(dt);
        }
    }
    for fmt in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(t, fmt) {
            return d.and_hms_opt(0, 0, 0);
        }
    }
    // a serial number that lost its cell type during stringification
    t.parse::<f64>().ok().and_then(excel_serial_to_datetime)
}

/// Render a SQL value for terminal / export output.
pub fn display_value(v: &SqlValue) -> String {
    match v {
        SqlValue::Null => String::new(),
        SqlValue::Integer(n) => n.to_string(),
        SqlValue::Real(f) => format_float(*f),
        SqlValue::Text(s) => s.clone(),
        SqlValue::Blob(b) => format!("<{} bytes>", b.len()),
    }
}

/// Read a stored SQL value back as a cell (used when a column is re-typed).
pub fn cell_from_sql(v: &SqlValue) -> CellValue {
    match v {
        SqlValue::Null => CellValue::Empty,
        SqlValue::Integer(n) => CellValue::Int(*n),
        SqlValue::Real(f) => CellValue::Float(*f),
        SqlValue::Text(s) => CellValue::Text(s.clone()),
        SqlValue::Blob(b) => CellValue::Text(String::from_utf8_lossy(b).to_string()),
    }
}
