use crate::core::writer::{cell_from_sql, coerce};
use crate::db::datastore::{Datastore, SCHEMA, SqlValue, qualified, quote_ident};
use crate::errors::{AppError, AppResult};
use crate::models::ColumnType;

/// Result of a column retype.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetypeReport {
    pub table: String,
    pub column: String,
    pub from: ColumnType,
    pub to: ColumnType,
    pub converted: usize,
}

pub struct RetypeLogic;

impl RetypeLogic {
    /// Change the declared type of `table.column`, converting every stored value.
    ///
    /// add temp column → copy converted values → drop old column → rename temp,
    /// inside one transaction. Every value is validated with the same rules
    /// uploads use; one unconvertible value aborts the whole change.
    pub fn retype<D: Datastore + ?Sized>(
        store: &D,
        table: &str,
        column: &str,
        to: ColumnType,
    ) -> AppResult<RetypeReport> {
        let columns = store.table_columns(table)?;
        let (column, from) = columns
            .iter()
            .find(|(c, _)| c.eq_ignore_ascii_case(column))
            .cloned()
            .ok_or_else(|| AppError::SchemaMismatch {
                table: table.to_string(),
                columns: vec![column.to_string()],
            })?;

        store.begin_transaction()?;
        let result = convert_and_swap(store, table, &column, to);
        let converted = match result {
            Ok(n) => {
                store.commit()?;
                n
            }
            Err(e) => {
                store.rollback()?;
                return Err(e);
            }
        };

        Ok(RetypeReport {
            table: table.to_string(),
            column,
            from,
            to,
            converted,
        })
    }
}

/// Returns how many non-null values were converted.
fn convert_and_swap<D: Datastore + ?Sized>(
    store: &D,
    table: &str,
    column: &str,
    to: ColumnType,
) -> AppResult<usize> {
    // 1️⃣ convert every value first: nothing changes if one is invalid
    let rows = store.query(
        &format!(
            "SELECT rowid, {} FROM {}",
            quote_ident(column),
            qualified(table)
        ),
        &[],
    )?;

    let mut converted = Vec::with_capacity(rows.rows.len());
    for r in &rows.rows {
        let (Some(rowid), Some(value)) = (r.first(), r.get(1)) else {
            continue;
        };
        let new_value = coerce(&cell_from_sql(value), to, column)?;
        converted.push((rowid.clone(), new_value));
    }

    // 2️⃣ swap the column
    let tmp = format!("{column}_{}", to.as_str());
    let t = qualified(table);

    // indexes on the old column block DROP COLUMN: drop and rebuild them
    let indexes = store.query(
        &format!(
            "SELECT name, sql FROM {SCHEMA}.sqlite_master
             WHERE type = 'index' AND tbl_name = ?1 COLLATE NOCASE AND sql IS NOT NULL"
        ),
        &[SqlValue::Text(table.to_string())],
    )?;
    let mut rebuild = Vec::new();
    for r in &indexes.rows {
        if let (Some(SqlValue::Text(name)), Some(SqlValue::Text(sql))) = (r.first(), r.get(1))
            && sql.to_lowercase().contains(&column.to_lowercase())
        {
            store.execute(&format!("DROP INDEX {SCHEMA}.{}", quote_ident(name)), &[])?;
            rebuild.push(sql.clone());
        }
    }

    store.execute(
        &format!(
            "ALTER TABLE {t} ADD COLUMN {} {}",
            quote_ident(&tmp),
            to.to_sql_decl()
        ),
        &[],
    )?;

    let update = format!("UPDATE {t} SET {} = ?1 WHERE rowid = ?2", quote_ident(&tmp));
    for (rowid, value) in &converted {
        store.execute(&update, &[value.clone(), rowid.clone()])?;
    }

    store.execute(
        &format!("ALTER TABLE {t} DROP COLUMN {}", quote_ident(column)),
        &[],
    )?;
    store.execute(
        &format!(
            "ALTER TABLE {t} RENAME COLUMN {} TO {}",
            quote_ident(&tmp),
            quote_ident(column)
        ),
        &[],
    )?;

    for sql in rebuild {
        store.execute(&sql, &[])?;
    }

    Ok(converted
        .iter()
        .filter(|(_, v)| *v != SqlValue::Null)
        .count())
}
