//! Synthetic identifier allocation shared by the three family project tables.
//!
//! There is no stored counter: the current value is always `MAX(id)` over
//! `solar_projects`, `HV_projects` and `storage_projects`, recomputed on every
//! call.

use crate::core::linker::RecordLinker;
use crate::core::schema::ID_COLUMN;
use crate::core::writer::TableWriter;
use crate::db::datastore::Datastore;
use crate::errors::{AppError, AppResult};
use crate::models::{Family, Record};
use crate::ui::messages::warning;

pub struct IdentityAllocator;

/// Outcome of `allocate_and_insert`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Allocation {
    pub id: i64,
    /// `true` when keep-max mode attached the row to an existing id.
    pub reused: bool,
}

impl IdentityAllocator {
    /// Highest identifier across every family project table, `None` if all are empty.
    pub fn current_max<D: Datastore + ?Sized>(store: &D) -> AppResult<Option<i64>> {
        let mut overall: Option<i64> = None;
        for family in Family::ALL {
            if let Some(m) = store.max(family.project_table(), ID_COLUMN)? {
                overall = Some(overall.map_or(m, |o| o.max(m)));
            }
        }
        Ok(overall)
    }

    /// Next identifier: `max + 1`, or `max` itself when `keep_max` is set.
    ///
    /// With no identifier assigned yet the baseline is 0, so the first id is 1.
    /// Reusing is impossible in that case and a fresh id is minted instead.
    pub fn next_id<D: Datastore + ?Sized>(store: &D, keep_max: bool) -> AppResult<i64> {
        let max = Self::current_max(store)?;
        Ok(resolve(max, keep_max))
    }

    /// Allocate an identifier, stamp it on the project and its line items, and
    /// write the project row, all under one write lock.
    ///
    /// `BEGIN IMMEDIATE` serializes the read-max/insert sequence between
    /// processes. When another writer still holds the lock after the busy
    /// timeout, the allocation fails with `IdentityRace` and nothing is written.
    pub fn allocate_and_insert<D: Datastore + ?Sized>(
        store: &D,
        family: Family,
        project: &mut Record,
        line_items: &mut [Record],
        keep_max: bool,
    ) -> AppResult<Allocation> {
        store
            .begin_transaction()
            .map_err(|e| lock_contention(e, family))?;

        let result = (|| -> AppResult<Allocation> {
            let max = Self::current_max(store)?;
            let id = resolve(max, keep_max);
            let minted = !(keep_max && max.is_some());

            RecordLinker::link(project, line_items, id);
            TableWriter::append(store, family.project_table(), std::slice::from_ref(project))?;
            Ok(Allocation {
                id,
                reused: !minted,
            })
        })();

        match result {
            Ok(allocation) => {
                store.commit()?;
                Ok(allocation)
            }
            Err(e) => {
                store.rollback()?;
                Err(e)
            }
        }
    }
}

/// `max + 1`, or `max` in keep-max mode; 1 when nothing is allocated yet.
pub fn resolve(max: Option<i64>, keep_max: bool) -> i64 {
    match max {
        Some(max) if keep_max => max,
        Some(max) => max + 1,
        None => {
            if keep_max {
                warning("No identifier to reuse yet: minting a new one.");
            }
            1
        }
    }
}

/// A busy or locked database while taking the allocation lock means another
/// upload is allocating at the same time.
fn lock_contention(e: AppError, family: Family) -> AppError {
    match e {
        AppError::Db(rusqlite::Error::SqliteFailure(f, _))
            if matches!(
                f.code,
                rusqlite::ErrorCode::DatabaseBusy | rusqlite::ErrorCode::DatabaseLocked
            ) =>
        {
            AppError::IdentityRace(family.project_table().to_string())
        }
        other => other,
    }
}
