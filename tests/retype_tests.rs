use sovloader::core::retype::RetypeLogic;
use sovloader::core::upload::{UploadLogic, UploadOptions};
use sovloader::db::Datastore;
use sovloader::errors::AppError;
use sovloader::models::{ColumnType, Family};

mod common;
use common::{count, family_grid, memory_pool, metadata, num, three_items};
use sovloader::workbook::Workbook;

fn upload_with_tracker(pool: &sovloader::db::DbPool, tracker: &str) {
    let grid = family_grid(Family::Solar, &metadata(Family::Solar, tracker), &three_items());
    let wb = Workbook::from_grids("r.xlsx", vec![("Solar SOV".to_string(), grid)]);
    UploadLogic::upload(pool, &wb, Family::Solar, false, &UploadOptions::default())
        .expect("upload");
}

fn declared(pool: &sovloader::db::DbPool, table: &str, column: &str) -> ColumnType {
    pool.table_columns(table)
        .expect("columns")
        .into_iter()
        .find(|(c, _)| c == column)
        .map(|(_, t)| t)
        .expect("column present")
}

#[test]
fn test_retype_tracker_text_to_integer() {
    let pool = memory_pool();
    upload_with_tracker(&pool, "100");
    upload_with_tracker(&pool, "205");

    let report = RetypeLogic::retype(&pool, "solar_projects", "Project_Tracker_ID", ColumnType::Integer)
        .expect("retype");

    assert_eq!(report.from, ColumnType::Text);
    assert_eq!(report.to, ColumnType::Integer);
    assert_eq!(report.converted, 2);
    assert_eq!(
        declared(&pool, "solar_projects", "Project_Tracker_ID"),
        ColumnType::Integer
    );
    assert_eq!(
        count(
            &pool,
            "SELECT COUNT(*) FROM solar_projects WHERE typeof(Project_Tracker_ID) = 'integer'"
        ),
        2
    );

    // the tracker index is rebuilt on the new column
    assert_eq!(
        count(
            &pool,
            "SELECT COUNT(*) FROM sqlite_master
             WHERE type = 'index' AND name = 'idx_solar_projects_tracker'"
        ),
        1
    );
}

#[test]
fn test_retype_keeps_column_position_free_data_intact() {
    let pool = memory_pool();
    upload_with_tracker(&pool, "7");

    RetypeLogic::retype(&pool, "solar_projects", "Project_Tracker_ID", ColumnType::Integer)
        .expect("retype");

    let name: String = pool
        .conn
        .query_row(
            "SELECT Project_Name FROM solar_projects WHERE Project_Tracker_ID = 7",
            [],
            |r| r.get(0),
        )
        .expect("row");
    assert_eq!(name, "Mesa Verde");
}

#[test]
fn test_retype_with_unconvertible_value_changes_nothing() {
    let pool = memory_pool();
    upload_with_tracker(&pool, "100");
    upload_with_tracker(&pool, "T-100");

    let err = RetypeLogic::retype(&pool, "solar_projects", "Project_Tracker_ID", ColumnType::Integer)
        .unwrap_err();

    match err {
        AppError::InvalidValue { column, value, .. } => {
            assert_eq!(column, "Project_Tracker_ID");
            assert_eq!(value, "T-100");
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(
        declared(&pool, "solar_projects", "Project_Tracker_ID"),
        ColumnType::Text
    );
    assert_eq!(count(&pool, "SELECT COUNT(*) FROM solar_projects"), 2);
}

#[test]
fn test_retype_real_to_text() {
    let pool = memory_pool();
    let mut meta = metadata(Family::Solar, "1");
    meta.push(("Module Count", num(12000.0)));
    let grid = family_grid(Family::Solar, &meta, &three_items());
    let wb = Workbook::from_grids("r.xlsx", vec![("Solar SOV".to_string(), grid)]);
    UploadLogic::upload(&pool, &wb, Family::Solar, false, &UploadOptions::default())
        .expect("upload");

    RetypeLogic::retype(&pool, "solar_projects", "Module_Count", ColumnType::Text).expect("retype");

    let v: String = pool
        .conn
        .query_row("SELECT Module_Count FROM solar_projects", [], |r| r.get(0))
        .expect("row");
    assert_eq!(v, "12000");
}

#[test]
fn test_retype_unknown_table_or_column() {
    let pool = memory_pool();

    let err = RetypeLogic::retype(&pool, "wind_projects", "id", ColumnType::Integer).unwrap_err();
    assert!(matches!(err, AppError::UnknownTable(_)));

    let err =
        RetypeLogic::retype(&pool, "solar_projects", "No_Such", ColumnType::Integer).unwrap_err();
    assert!(matches!(err, AppError::SchemaMismatch { .. }));
}
