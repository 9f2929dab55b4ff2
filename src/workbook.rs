//! Workbook loading: turns xlsx / xls / xlsb / ods files into cell grids.
//!
//! Byte-level parsing is delegated to calamine. Only the family sheets are
//! materialized; other sheets are listed but never read.

use crate::errors::{AppError, AppResult};
use crate::models::cell::excel_serial_to_datetime;
use crate::models::{CellValue, Family, Grid};
use calamine::{Data, Range, Reader, Sheets, open_workbook_auto, open_workbook_auto_from_rs};
use chrono::NaiveDateTime;
use std::io::{Cursor, Read, Seek};
use std::path::Path;

#[derive(Debug, Clone)]
pub struct Workbook {
    /// File name (or upload label) used in reports.
    pub name: String,
    sheet_names: Vec<String>,
    sheets: Vec<(Family, Grid)>,
}

impl Workbook {
    /// Open a workbook from disk.
    pub fn open(path: &Path) -> AppResult<Self> {
        let mut sheets = open_workbook_auto(path)?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.display().to_string());
        Self::load(name, &mut sheets)
    }

    /// Open an uploaded workbook held in memory.
    pub fn from_bytes(name: &str, bytes: Vec<u8>) -> AppResult<Self> {
        let mut sheets = open_workbook_auto_from_rs(Cursor::new(bytes))?;
        Self::load(name.to_string(), &mut sheets)
    }

    /// Build a workbook from already-decoded grids (sheet name → grid).
    pub fn from_grids(name: &str, grids: Vec<(String, Grid)>) -> Self {
        let sheet_names = grids.iter().map(|(n, _)| n.clone()).collect();
        let sheets = grids
            .into_iter()
            .filter_map(|(n, g)| family_for_sheet(&n).map(|f| (f, g)))
            .collect();
        Self {
            name: name.to_string(),
            sheet_names,
            sheets,
        }
    }

    fn load<RS: Read + Seek>(name: String, book: &mut Sheets<RS>) -> AppResult<Self> {
        let sheet_names: Vec<String> = book.sheet_names().to_vec();

        let mut sheets = Vec::new();
        for sheet_name in &sheet_names {
            let Some(family) = family_for_sheet(sheet_name) else {
                continue;
            };
            let range = book.worksheet_range(sheet_name)?;
            sheets.push((family, range_to_grid(&range)));
        }

        Ok(Self {
            name,
            sheet_names,
            sheets,
        })
    }

    pub fn sheet_names(&self) -> &[String] {
        &self.sheet_names
    }

    pub fn has_family(&self, family: Family) -> bool {
        self.sheets.iter().any(|(f, _)| *f == family)
    }

    /// Families whose sheet is present, in the fixed processing order.
    pub fn families(&self) -> Vec<Family> {
        Family::ALL
            .into_iter()
            .filter(|f| self.has_family(*f))
            .collect()
    }

    pub fn family_sheet(&self, family: Family) -> AppResult<&Grid> {
        self.sheets
            .iter()
            .find(|(f, _)| *f == family)
            .map(|(_, g)| g)
            .ok_or_else(|| AppError::MissingSheet(family.sheet_name().to_string()))
    }
}

fn family_for_sheet(sheet_name: &str) -> Option<Family> {
    Family::ALL
        .into_iter()
        .find(|f| f.sheet_name().eq_ignore_ascii_case(sheet_name.trim()))
}

/// Dense calamine range → grid with absolute coordinates (data may not begin at A1).
pub fn range_to_grid(range: &Range<Data>) -> Grid {
    let (start_row, start_col) = range
        .start()
        .map(|(r, c)| (r as usize, c as usize))
        .unwrap_or((0, 0));

    let mut rows: Vec<Vec<CellValue>> = vec![Vec::new(); start_row];
    for row in range.rows() {
        let mut cells = vec![CellValue::Empty; start_col];
        cells.extend(row.iter().map(data_to_cell));
        rows.push(cells);
    }

    Grid::new(rows)
}

pub fn data_to_cell(cell: &Data) -> CellValue {
    match cell {
        Data::Empty => CellValue::Empty,
        Data::String(s) => CellValue::Text(s.clone()),
        Data::Float(f) => CellValue::Float(*f),
        Data::Int(n) => CellValue::Int(*n),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::DateTime(dt) => {
            let serial = dt.as_f64();
            excel_serial_to_datetime(serial)
                .map(CellValue::DateTime)
                .unwrap_or(CellValue::Float(serial))
        }
        Data::DateTimeIso(s) => NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S")
            .map(CellValue::DateTime)
            .unwrap_or_else(|_| CellValue::Text(s.clone())),
        Data::DurationIso(s) => CellValue::Text(s.clone()),
        // #REF!, #N/A, ... non portano informazione utile
        Data::Error(_) => CellValue::Empty,
    }
}
