#![allow(dead_code)]
use assert_cmd::{Command, cargo_bin_cmd};
use rust_xlsxwriter::Workbook as XlsxWorkbook;
use sovloader::db::initialize::init_db;
use sovloader::db::pool::DbPool;
use sovloader::models::{CellValue, Family, Grid};
use sovloader::workbook::Workbook;
use std::path::PathBuf;

pub fn sov() -> Command {
    cargo_bin_cmd!("sovloader")
}

/// Fresh scratch directory for one test, left on disk for post-mortem inspection
fn scratch_dir(name: &str) -> PathBuf {
    tempfile::Builder::new()
        .prefix(&format!("{name}_"))
        .tempdir()
        .expect("create temp dir")
        .keep()
}

/// Create a unique test DB path (the file itself does not exist yet)
pub fn setup_test_db(name: &str) -> String {
    scratch_dir(name)
        .join("sovloader.sqlite")
        .to_string_lossy()
        .to_string()
}

/// Create a unique output file path in its own scratch directory
pub fn temp_out(name: &str, ext: &str) -> String {
    scratch_dir(name)
        .join(format!("{name}_out.{ext}"))
        .to_string_lossy()
        .to_string()
}

/// Initialize a DB file through the CLI (`--test`: no config file is written)
pub fn init_cli_db(db_path: &str) {
    sov()
        .args(["--db", db_path, "--test", "init"])
        .assert()
        .success();
}

/// Fresh in-memory database with every family table.
pub fn memory_pool() -> DbPool {
    let pool = DbPool::in_memory().expect("open in-memory db");
    init_db(&pool.conn).expect("init db");
    pool
}

pub fn text(s: &str) -> CellValue {
    CellValue::Text(s.to_string())
}

pub fn num(f: f64) -> CellValue {
    CellValue::Float(f)
}

/// Lay out a family sheet the way the templates do:
/// title in column A, labels in column B and values in column C from row 1,
/// a header row right above the line-item block, line items from the
/// family's first item row.
pub fn family_grid(family: Family, metadata: &[(&str, CellValue)], items: &[Vec<CellValue>]) -> Grid {
    let layout = family.schema().layout;
    let height = layout.line_items_from + items.len();
    let mut rows: Vec<Vec<CellValue>> = vec![Vec::new(); height];

    rows[0] = vec![text(&format!("{} Statement of Value", family.sheet_name()))];
    for (i, (label, value)) in metadata.iter().enumerate() {
        rows[i + 1] = vec![CellValue::Empty, text(label), value.clone()];
    }

    rows[layout.line_items_from - 1] = family
        .schema()
        .line_item_fields
        .iter()
        .map(|f| text(f.label))
        .collect();

    for (i, item) in items.iter().enumerate() {
        rows[layout.line_items_from + i] = item.clone();
    }

    Grid::new(rows)
}

/// Standard metadata for a family sheet with the given tracker number.
pub fn metadata(family: Family, tracker: &str) -> Vec<(&'static str, CellValue)> {
    let mut m = vec![
        ("Project Name", text("Mesa Verde")),
        ("Project Tracker ID", text(tracker)),
        ("Scenario Name", text("Base")),
        ("Contractor", text("ACME Builders")),
        ("Date Submitted", text("2024-01-15")),
    ];
    match family {
        Family::Solar => {
            m.push(("MW DC", num(5.0)));
            m.push(("MW AC", num(4.0)));
        }
        Family::Hv => m.push(("Interconnect Voltage", text("230 kV"))),
        Family::Storage => {
            m.push(("BESS OEM", text("Volt Co")));
            m.push(("Discharge Duration[hr]", num(4.0)));
        }
    }
    m
}

/// One line item row with a cost structure code and an extended price.
pub fn item(code: &str, description: &str, price: f64) -> Vec<CellValue> {
    vec![
        text(code),
        text(description),
        num(1.0),
        text("LS"),
        num(price),
        num(price),
    ]
}

/// The usual three line items, with a blank row in the middle.
pub fn three_items() -> Vec<Vec<CellValue>> {
    vec![
        item("1.01", "Modules", 1000.0),
        vec![CellValue::Empty, text("subtotal"), CellValue::Empty],
        item("1.02", "Racking", 500.0),
        item("1.03", "Inverters", 250.0),
    ]
}

pub fn solar_workbook(tracker: &str) -> Workbook {
    let grid = family_grid(Family::Solar, &metadata(Family::Solar, tracker), &three_items());
    Workbook::from_grids("solar.xlsx", vec![(Family::Solar.sheet_name().to_string(), grid)])
}

/// Write grids to a real .xlsx file, one worksheet per (name, grid).
pub fn write_xlsx(path: &str, sheets: &[(&str, Grid)]) {
    let mut book = XlsxWorkbook::new();
    for (name, grid) in sheets {
        let ws = book.add_worksheet();
        ws.set_name(*name).expect("sheet name");
        for (r, row) in grid.rows().enumerate() {
            for (c, cell) in row.iter().enumerate() {
                let (r, c) = (r as u32, c as u16);
                match cell {
                    CellValue::Empty => {}
                    CellValue::Text(s) => {
                        ws.write_string(r, c, s).expect("write");
                    }
                    CellValue::Int(n) => {
                        ws.write_number(r, c, *n as f64).expect("write");
                    }
                    CellValue::Float(f) => {
                        ws.write_number(r, c, *f).expect("write");
                    }
                    CellValue::Bool(b) => {
                        ws.write_boolean(r, c, *b).expect("write");
                    }
                    CellValue::DateTime(dt) => {
                        ws.write_string(r, c, dt.format("%Y-%m-%d %H:%M:%S").to_string())
                            .expect("write");
                    }
                }
            }
        }
    }
    book.save(path).expect("save workbook");
}

/// A workbook file with every family sheet present.
pub fn write_full_workbook(path: &str, tracker: &str) {
    let sheets: Vec<(&str, Grid)> = Family::ALL
        .into_iter()
        .map(|f| (f.sheet_name(), family_grid(f, &metadata(f, tracker), &three_items())))
        .collect();
    write_xlsx(path, &sheets);
}

pub fn count(pool: &DbPool, sql: &str) -> i64 {
    pool.conn
        .query_row(sql, [], |row| row.get(0))
        .expect("count query")
}
