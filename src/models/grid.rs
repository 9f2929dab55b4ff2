use super::cell::CellValue;

/// Rectangular-ish 2-D cell grid indexed by absolute (row, column).
///
/// Rows may have different lengths; reads past the end of a row yield
/// `CellValue::Empty`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Grid {
    rows: Vec<Vec<CellValue>>,
}

static EMPTY: CellValue = CellValue::Empty;

impl Grid {
    pub fn new(rows: Vec<Vec<CellValue>>) -> Self {
        Self { rows }
    }

    pub fn height(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn cell(&self, row: usize, col: usize) -> &CellValue {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .unwrap_or(&EMPTY)
    }

    pub fn rows(&self) -> impl Iterator<Item = &[CellValue]> {
        self.rows.iter().map(Vec::as_slice)
    }
}

impl From<Vec<Vec<CellValue>>> for Grid {
    fn from(rows: Vec<Vec<CellValue>>) -> Self {
        Grid::new(rows)
    }
}
