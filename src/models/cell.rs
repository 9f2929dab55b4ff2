use chrono::{Duration, NaiveDate, NaiveDateTime};
use serde::Serialize;

/// Text used for timestamps everywhere (cells → text, DB storage).
pub const DATETIME_FMT: &str = "%Y-%m-%d %H:%M:%S";

/// One typed worksheet cell.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum CellValue {
    Empty,
    Text(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    DateTime(NaiveDateTime),
}

impl CellValue {
    pub fn text<S: Into<String>>(s: S) -> Self {
        CellValue::Text(s.into())
    }

    /// Empty cells and whitespace-only text are blank.
    pub fn is_blank(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    /// Stringify the cell; `None` for blank cells.
    ///
    /// Whole floats are rendered without a fractional part, so a tracker
    /// number typed as `100` reads back as `"100"` and not `"100.0"`.
    pub fn to_text(&self) -> Option<String> {
        match self {
            CellValue::Empty => None,
            CellValue::Text(s) => {
                let t = s.trim();
                if t.is_empty() {
                    None
                } else {
                    Some(t.to_string())
                }
            }
            CellValue::Int(n) => Some(n.to_string()),
            CellValue::Float(f) => Some(format_float(*f)),
            CellValue::Bool(b) => Some(if *b { "TRUE" } else { "FALSE" }.to_string()),
            CellValue::DateTime(dt) => Some(dt.format(DATETIME_FMT).to_string()),
        }
    }
}

pub fn format_float(f: f64) -> String {
    if f.fract() == 0.0 && f.abs() < 1e15 {
        format!("{}", f as i64)
    } else {
        f.to_string()
    }
}

/// Converte un seriale Excel (sistema 1900) in data/ora.
pub fn excel_serial_to_datetime(serial: f64) -> Option<NaiveDateTime> {
    if !serial.is_finite() || serial < 0.0 {
        return None;
    }

    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?.and_hms_opt(0, 0, 0)?;
    let days = serial.trunc() as i64;
    let secs = ((serial - serial.trunc()) * 86400.0).round() as i64;

    epoch
        .checked_add_signed(Duration::days(days))?
        .checked_add_signed(Duration::seconds(secs))
}
