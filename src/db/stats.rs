use crate::core::identity::IdentityAllocator;
use crate::db::datastore::qualified;
use crate::db::pool::DbPool;
use crate::errors::AppResult;
use crate::models::Family;
use crate::ui::messages::warning;
use crate::utils::colors::{CYAN, GREEN, GREY, RESET, YELLOW};
use rusqlite::OptionalExtension;
use std::fs;

/// Row counts of one family.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FamilyStats {
    pub family: Family,
    pub projects: i64,
    pub line_items: i64,
    /// Line items whose `id` matches no project row of the same family.
    pub orphans: i64,
}

pub fn family_stats(pool: &DbPool, family: Family) -> AppResult<FamilyStats> {
    let count = |table: &str| -> AppResult<i64> {
        let n = pool.conn.query_row(
            &format!("SELECT COUNT(*) FROM {}", qualified(table)),
            [],
            |row| row.get(0),
        )?;
        Ok(n)
    };

    let orphans: i64 = pool.conn.query_row(
        &format!(
            "SELECT COUNT(*) FROM {sov} s
             WHERE NOT EXISTS (SELECT 1 FROM {proj} p WHERE p.\"id\" = s.\"id\")",
            sov = qualified(family.sov_table()),
            proj = qualified(family.project_table()),
        ),
        [],
        |row| row.get(0),
    )?;

    Ok(FamilyStats {
        family,
        projects: count(family.project_table())?,
        line_items: count(family.sov_table())?,
        orphans,
    })
}

pub fn print_db_info(pool: &DbPool, db_path: &str) -> AppResult<()> {
    println!();

    if !pool.table_exists("log")? {
        warning("Database not initialized: run `sovloader init` or `sovloader db --migrate`.");
        return Ok(());
    }

    //
    // 1) FILE SIZE
    //
    let file_size = fs::metadata(db_path).map(|m| m.len()).unwrap_or(0);
    let file_mb = (file_size as f64) / (1024.0 * 1024.0);

    println!("{}• File:{} {}{}{}", CYAN, RESET, YELLOW, db_path, RESET);
    println!("{}• Size:{} {:.2} MB", CYAN, RESET, file_mb);

    //
    // 2) ROWS PER FAMILY
    //
    for family in Family::ALL {
        let s = family_stats(pool, family)?;
        let orphans = if s.orphans > 0 {
            format!("{YELLOW}{}{RESET}", s.orphans)
        } else {
            format!("{GREY}0{RESET}")
        };
        println!(
            "{}• {:<8}{} projects: {}{}{}  line items: {}{}{}  orphans: {}",
            CYAN,
            family.code(),
            RESET,
            GREEN,
            s.projects,
            RESET,
            GREEN,
            s.line_items,
            RESET,
            orphans
        );
    }

    //
    // 3) IDENTIFIER COUNTER
    //
    let max = IdentityAllocator::current_max(pool)?;
    let fmt_max = max
        .map(|m| m.to_string())
        .unwrap_or_else(|| format!("{GREY}--{RESET}"));
    println!("{}• Highest id:{} {}", CYAN, RESET, fmt_max);

    //
    // 4) LAST UPLOAD
    //
    let last_upload: Option<String> = pool
        .conn
        .query_row(
            "SELECT date FROM log WHERE operation = 'upload' ORDER BY id DESC LIMIT 1",
            [],
            |row| row.get(0),
        )
        .optional()?;
    println!(
        "{}• Last upload:{} {}",
        CYAN,
        RESET,
        last_upload.unwrap_or_else(|| format!("{GREY}--{RESET}"))
    );

    println!();
    Ok(())
}
