use crate::errors::{AppError, AppResult};
use crate::models::{CellValue, Grid};
use std::ops::Range;

/// Which block of a family sheet is being sliced (used in error messages).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Block {
    Metadata,
    LineItems,
}

impl Block {
    pub fn as_str(&self) -> &'static str {
        match self {
            Block::Metadata => "metadata",
            Block::LineItems => "line-item",
        }
    }
}

pub struct GridExtractor;

impl GridExtractor {
    /// Keep the rows whose absolute index satisfies `keep_row` and narrow each
    /// of them to `cols`. Short rows are padded with `Empty` so the result is
    /// rectangular.
    pub fn slice<P>(
        grid: &Grid,
        keep_row: P,
        cols: Range<usize>,
        sheet: &str,
        block: Block,
    ) -> AppResult<Grid>
    where
        P: Fn(usize) -> bool,
    {
        let rows: Vec<Vec<CellValue>> = grid
            .rows()
            .enumerate()
            .filter(|(idx, _)| keep_row(*idx))
            .map(|(_, row)| {
                cols.clone()
                    .map(|c| row.get(c).cloned().unwrap_or(CellValue::Empty))
                    .collect()
            })
            .collect();

        if rows.is_empty() {
            return Err(AppError::MalformedSheet {
                sheet: sheet.to_string(),
                block: block.as_str().to_string(),
            });
        }

        Ok(Grid::new(rows))
    }

    /// Metadata block: rows `0..metadata_rows`, columns 1 (label) and 2 (value).
    pub fn metadata(grid: &Grid, metadata_rows: usize, sheet: &str) -> AppResult<Grid> {
        Self::slice(grid, |i| i < metadata_rows, 1..3, sheet, Block::Metadata)
    }

    /// Line-item block: rows from `first_row` on, `width` columns from column 0.
    pub fn line_items(grid: &Grid, first_row: usize, width: usize, sheet: &str) -> AppResult<Grid> {
        Self::slice(grid, |i| i >= first_row, 0..width, sheet, Block::LineItems)
    }
}
