use crate::core::schema::{FieldDef, ID_COLUMN, TRACKER_COLUMN};
use crate::db::datastore::{qualified, quote_ident};
use crate::models::{ColumnType, Family};
use crate::ui::messages::{success, warning};
use rusqlite::{Connection, OptionalExtension, Result};

/// Ensure that the `log` table exists with the modern schema.
fn ensure_log_table(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS log (
            id        INTEGER PRIMARY KEY AUTOINCREMENT,
            date      TEXT NOT NULL,
            operation TEXT NOT NULL,
            target    TEXT DEFAULT '',
            message   TEXT NOT NULL
        );
        "#,
    )?;
    Ok(())
}

/// Check if a table exists in the main schema.
fn table_exists(conn: &Connection, table: &str) -> Result<bool> {
    let mut stmt = conn.prepare(
        "SELECT name FROM sqlite_master WHERE type='table' AND name = ?1 COLLATE NOCASE",
    )?;
    let exists: Option<String> = stmt.query_row([table], |row| row.get(0)).optional()?;
    Ok(exists.is_some())
}

/// Check if `table` has a column named `column`.
fn table_has_column(conn: &Connection, table: &str, column: &str) -> Result<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA main.table_info({})", quote_ident(table)))?;
    let cols = stmt.query_map([], |row| row.get::<_, String>(1))?;

    for c in cols {
        if c?.eq_ignore_ascii_case(column) {
            return Ok(true);
        }
    }
    Ok(false)
}

fn column_defs(fields: &[FieldDef]) -> String {
    fields
        .iter()
        .map(|f| format!("    {} {}", quote_ident(f.column), f.kind.to_sql_decl()))
        .chain(std::iter::once(format!(
            "    {} {}",
            quote_ident(ID_COLUMN),
            ColumnType::Integer.to_sql_decl()
        )))
        .collect::<Vec<_>>()
        .join(",\n")
}

/// Create the `<family>_projects` and `<family>_sov` tables if missing.
///
/// `id` is indexed but not unique: keep-max uploads legitimately repeat it.
fn create_family_tables(conn: &Connection, family: Family) -> Result<bool> {
    let schema = family.schema();
    let projects = family.project_table();
    let sov = family.sov_table();

    let created = !table_exists(conn, projects)? || !table_exists(conn, sov)?;

    let ddl = format!(
        r#"
        CREATE TABLE IF NOT EXISTS {projects_q} (
{project_cols}
        );
        CREATE INDEX IF NOT EXISTS {idx_proj_id} ON {projects_i}({id});
        CREATE INDEX IF NOT EXISTS {idx_proj_tracker} ON {projects_i}({tracker});

        CREATE TABLE IF NOT EXISTS {sov_q} (
{sov_cols}
        );
        CREATE INDEX IF NOT EXISTS {idx_sov_id} ON {sov_i}({id});
        "#,
        projects_q = qualified(projects),
        projects_i = quote_ident(projects),
        project_cols = column_defs(schema.project_fields),
        sov_q = qualified(sov),
        sov_i = quote_ident(sov),
        sov_cols = column_defs(schema.line_item_fields),
        id = quote_ident(ID_COLUMN),
        tracker = quote_ident(TRACKER_COLUMN),
        idx_proj_id = quote_ident(&format!("idx_{}_id", projects.to_lowercase())),
        idx_proj_tracker = quote_ident(&format!("idx_{}_tracker", projects.to_lowercase())),
        idx_sov_id = quote_ident(&format!("idx_{}_id", sov.to_lowercase())),
    );

    conn.execute_batch(&ddl)?;
    Ok(created)
}

fn migration_applied(conn: &Connection, version: &str) -> Result<bool> {
    let mut chk = conn.prepare(
        "SELECT 1 FROM log
         WHERE operation = 'migration_applied' AND target = ?1
         LIMIT 1",
    )?;
    Ok(chk.query_row([version], |_| Ok(())).optional()?.is_some())
}

fn mark_applied(conn: &Connection, version: &str, message: &str) -> Result<()> {
    conn.execute(
        "INSERT INTO log (date, operation, target, message)
         VALUES (datetime('now'), 'migration_applied', ?1, ?2)",
        [version, message],
    )?;
    Ok(())
}

/// Older solar_sov tables were created before the "Typical Inclusions" column.
fn migrate_add_typical_inclusions(conn: &Connection) -> Result<()> {
    let version = "20230301_0001_add_typical_inclusions";

    // 1) Verifica se già applicata
    if migration_applied(conn, version)? {
        return Ok(());
    }

    // 2) Esegui la migrazione (solo se la colonna manca davvero)
    let table = Family::Solar.sov_table();
    let missing = !table_has_column(conn, table, "Typical_Inclusions")?;
    if missing {
        warning("Adding 'Typical_Inclusions' column to solar_sov...");
        conn.execute(
            &format!(
                "ALTER TABLE {} ADD COLUMN \"Typical_Inclusions\" TEXT",
                qualified(table)
            ),
            [],
        )?;
    }

    // 3) Marca come applicata
    mark_applied(conn, version, "Added Typical_Inclusions to solar_sov")?;

    if missing {
        success(format!(
            "Migration applied: {} → added 'Typical_Inclusions' to solar_sov",
            version
        ));
    }

    Ok(())
}

/// Public entry point: run all pending migrations.
///
/// Invocata da db::init_db().
pub fn run_pending_migrations(conn: &Connection) -> Result<()> {
    // 1) Ensure log table
    ensure_log_table(conn)?;

    // 2) Family tables (projects + sov)
    for family in Family::ALL {
        if create_family_tables(conn, family)? {
            success(format!(
                "Created {} / {} tables.",
                family.project_table(),
                family.sov_table()
            ));
        }
    }

    // 3) Column upgrades on legacy tables
    migrate_add_typical_inclusions(conn)?;

    Ok(())
}
