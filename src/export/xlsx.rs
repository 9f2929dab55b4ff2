// src/export/xlsx.rs

use crate::core::writer::display_value;
use crate::db::datastore::SqlValue;
use crate::errors::{AppError, AppResult};
use crate::export::excel_date::parse_to_excel_date;
use crate::export::{TableSnapshot, notify_export_success};
use crate::models::ColumnType;
use crate::ui::messages::info;
use rust_xlsxwriter::{Color, Format, FormatAlign, FormatBorder, FormatPattern, Workbook, Worksheet};
use std::path::Path;
use unicode_width::UnicodeWidthStr;

/// Excel limits sheet names to 31 characters.
const MAX_SHEET_NAME: usize = 31;

/// Export XLSX con styling e auto-larghezza colonne.
pub(crate) fn export_xlsx(snapshot: &TableSnapshot, path: &Path) -> AppResult<()> {
    info(format!("Exporting to XLSX: {}", path.display()));

    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();

    let sheet_name: String = snapshot.table.chars().take(MAX_SHEET_NAME).collect();
    worksheet.set_name(&sheet_name).map_err(to_export_error)?;

    // ---------------------------
    // Header
    // ---------------------------
    let headers = snapshot.headers();

    let header_format = Format::new()
        .set_bold()
        .set_font_color(Color::RGB(0xFFFFFF))
        .set_background_color(Color::RGB(0x2F75B5))
        .set_pattern(FormatPattern::Solid)
        .set_border(FormatBorder::Thin);

    for (col, header) in headers.iter().enumerate() {
        worksheet
            .write_with_format(0, col as u16, *header, &header_format)
            .map_err(to_export_error)?;
    }

    worksheet.set_freeze_panes(1, 0).map_err(to_export_error)?;

    let mut col_widths: Vec<usize> = headers.iter().map(|h| UnicodeWidthStr::width(*h)).collect();

    let band1 = Color::RGB(0xEAF3FB);
    let band2 = Color::RGB(0xFFFFFF);

    // ---------------------------
    // Scrittura righe
    // ---------------------------
    for (row_index, values) in snapshot.rows.iter().enumerate() {
        let row = (row_index + 1) as u32;
        let band_color = if row_index % 2 == 0 { band1 } else { band2 };

        for (col, value) in values.iter().enumerate() {
            let kind = snapshot
                .columns
                .get(col)
                .map(|(_, k)| *k)
                .unwrap_or(ColumnType::Text);

            write_xlsx_cell(worksheet, row, col as u16, value, kind, band_color)?;

            if let Some(w) = col_widths.get_mut(col) {
                *w = (*w).max(UnicodeWidthStr::width(display_value(value).as_str()));
            }
        }
    }

    for (c, w) in col_widths.iter().enumerate() {
        worksheet
            .set_column_width(c as u16, (*w).min(60) as f64 + 2.0)
            .map_err(to_export_error)?;
    }

    workbook.save(path).map_err(to_export_error)?;

    notify_export_success("XLSX", path);
    Ok(())
}

/// Scrive una singola cella secondo il tipo dichiarato della colonna.
/// Il testo resta testo: codici come "T-100" o "00123" non diventano numeri.
fn write_xlsx_cell(
    worksheet: &mut Worksheet,
    row: u32,
    col: u16,
    value: &SqlValue,
    kind: ColumnType,
    bg: Color,
) -> AppResult<()> {
    let base = Format::new()
        .set_background_color(bg)
        .set_pattern(FormatPattern::Solid)
        .set_border(FormatBorder::Thin);

    match value {
        SqlValue::Null => {
            worksheet
                .write_blank(row, col, &base)
                .map_err(to_export_error)?;
        }
        SqlValue::Integer(n) => {
            worksheet
                .write_with_format(row, col, *n as f64, &base.set_align(FormatAlign::Right))
                .map_err(to_export_error)?;
        }
        SqlValue::Real(f) => {
            worksheet
                .write_with_format(row, col, *f, &base.set_align(FormatAlign::Right))
                .map_err(to_export_error)?;
        }
        SqlValue::Text(s) => {
            // Data / Ora in formato Excel
            let date = match kind {
                ColumnType::Timestamp => parse_to_excel_date(s),
                _ => None,
            };
            match date {
                Some((num_format, serial)) => worksheet
                    .write_with_format(row, col, serial, &base.set_num_format(num_format))
                    .map_err(to_export_error)?,
                None => worksheet
                    .write_with_format(row, col, s.as_str(), &base)
                    .map_err(to_export_error)?,
            };
        }
        SqlValue::Blob(_) => {
            worksheet
                .write_with_format(row, col, display_value(value), &base)
                .map_err(to_export_error)?;
        }
    }

    Ok(())
}

fn to_export_error<E: std::fmt::Display>(e: E) -> AppError {
    AppError::Export(e.to_string())
}
