use sovloader::core::identity::IdentityAllocator;
use sovloader::core::linker::RecordLinker;
use sovloader::db::initialize::init_db;
use sovloader::db::pool::DbPool;
use sovloader::errors::AppError;
use sovloader::models::{CellValue, Family, Record};

mod common;
use common::{count, memory_pool, setup_test_db, text};

fn insert_project(pool: &DbPool, table: &str, id: i64) {
    pool.conn
        .execute(
            &format!("INSERT INTO \"{table}\" (\"Project_Name\", \"id\") VALUES ('seed', ?1)"),
            [id],
        )
        .expect("seed row");
}

fn project(name: &str) -> Record {
    [("Project_Name", text(name)), ("Project_Tracker_ID", text("T-1"))]
        .into_iter()
        .collect()
}

#[test]
fn test_empty_database_starts_at_one() {
    let pool = memory_pool();

    assert_eq!(IdentityAllocator::current_max(&pool).unwrap(), None);
    assert_eq!(IdentityAllocator::next_id(&pool, false).unwrap(), 1);
}

#[test]
fn test_keep_max_on_empty_database_mints_one() {
    let pool = memory_pool();
    assert_eq!(IdentityAllocator::next_id(&pool, true).unwrap(), 1);
}

#[test]
fn test_next_id_is_max_across_all_project_tables_plus_one() {
    let pool = memory_pool();
    insert_project(&pool, "solar_projects", 3);
    insert_project(&pool, "HV_projects", 7);
    insert_project(&pool, "storage_projects", 5);

    assert_eq!(IdentityAllocator::current_max(&pool).unwrap(), Some(7));
    assert_eq!(IdentityAllocator::next_id(&pool, false).unwrap(), 8);
    assert_eq!(IdentityAllocator::next_id(&pool, true).unwrap(), 7);
}

#[test]
fn test_empty_tables_do_not_reset_the_baseline() {
    let pool = memory_pool();
    insert_project(&pool, "storage_projects", 12);

    assert_eq!(IdentityAllocator::next_id(&pool, false).unwrap(), 13);
}

#[test]
fn test_allocate_and_insert_writes_project_row_with_new_id() {
    let pool = memory_pool();
    insert_project(&pool, "solar_projects", 7);

    let mut p = project("Mesa Verde");
    let mut items = vec![Record::new(), Record::new()];

    let allocation =
        IdentityAllocator::allocate_and_insert(&pool, Family::Hv, &mut p, &mut items, false)
            .expect("allocate");

    assert_eq!(allocation.id, 8);
    assert!(!allocation.reused);
    assert_eq!(p.get("id"), Some(&CellValue::Int(8)));
    assert!(items.iter().all(|i| i.get("id") == Some(&CellValue::Int(8))));
    assert_eq!(
        count(&pool, "SELECT COUNT(*) FROM HV_projects WHERE id = 8"),
        1
    );
}

#[test]
fn test_consecutive_allocations_are_strictly_increasing() {
    let pool = memory_pool();
    let mut ids = Vec::new();

    for family in [Family::Solar, Family::Storage, Family::Hv, Family::Solar] {
        let mut p = project("p");
        let a = IdentityAllocator::allocate_and_insert(&pool, family, &mut p, &mut [], false)
            .expect("allocate");
        ids.push(a.id);
    }

    assert_eq!(ids, vec![1, 2, 3, 4]);
}

#[test]
fn test_keep_max_reuses_current_identifier() {
    let pool = memory_pool();
    let mut p = project("solar side");
    let first = IdentityAllocator::allocate_and_insert(&pool, Family::Solar, &mut p, &mut [], false)
        .expect("allocate");

    let mut p = project("storage side");
    let second =
        IdentityAllocator::allocate_and_insert(&pool, Family::Storage, &mut p, &mut [], true)
            .expect("allocate");

    assert_eq!(first.id, second.id);
    assert!(second.reused);
    assert_eq!(
        count(&pool, "SELECT COUNT(*) FROM storage_projects WHERE id = 1"),
        1
    );
}

#[test]
fn test_failed_insert_rolls_back_and_does_not_consume_id() {
    let pool = memory_pool();

    let mut bad: Record = [("Not_A_Column", text("x"))].into_iter().collect();
    let err = IdentityAllocator::allocate_and_insert(&pool, Family::Solar, &mut bad, &mut [], false);
    assert!(err.is_err());
    assert_eq!(count(&pool, "SELECT COUNT(*) FROM solar_projects"), 0);

    // the connection is usable again and the next id is still 1
    let mut p = project("ok");
    let a = IdentityAllocator::allocate_and_insert(&pool, Family::Solar, &mut p, &mut [], false)
        .expect("allocate");
    assert_eq!(a.id, 1);
}

#[test]
fn test_linker_overwrites_previous_id() {
    let mut p: Record = [("id", CellValue::Int(99)), ("Project_Name", text("x"))]
        .into_iter()
        .collect();
    let mut items = vec![[("id", CellValue::Int(1))].into_iter().collect::<Record>()];

    RecordLinker::link(&mut p, &mut items, 42);

    assert_eq!(p.get("id"), Some(&CellValue::Int(42)));
    // position of the existing column is preserved
    assert_eq!(p.columns().next(), Some("id"));
    assert_eq!(items[0].get("id"), Some(&CellValue::Int(42)));
}

#[test]
fn test_allocation_while_another_writer_holds_the_lock_is_identity_race() {
    let db_path = setup_test_db("identity_race");
    let holder = DbPool::new(&db_path).expect("open holder");
    init_db(&holder.conn).expect("init");
    holder.conn.execute_batch("BEGIN IMMEDIATE;").expect("hold lock");

    let contender = DbPool::with_busy_timeout(&db_path, 50).expect("open contender");
    let mut p = project("Mesa Verde");
    let err =
        IdentityAllocator::allocate_and_insert(&contender, Family::Storage, &mut p, &mut [], false)
            .unwrap_err();

    match err {
        AppError::IdentityRace(table) => assert_eq!(table, "storage_projects"),
        other => panic!("unexpected error: {other}"),
    }

    holder.conn.execute_batch("ROLLBACK;").expect("release lock");
    assert_eq!(count(&contender, "SELECT COUNT(*) FROM storage_projects"), 0);

    // lock released: the same allocation now goes through
    let allocation =
        IdentityAllocator::allocate_and_insert(&contender, Family::Storage, &mut p, &mut [], false)
            .expect("allocate");
    assert_eq!(allocation.id, 1);
}
