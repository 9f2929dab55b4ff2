//! Upload orchestration: one family sheet at a time, one workbook at a time.
//!
//! Per sheet:
//!  1. slice + pivot + map the metadata block, slice + map the line items,
//!     then coerce the line items against the destination table
//!     (nothing is written if any of this fails);
//!  2. allocate the id and write the project row (serialized);
//!  3. write the line items stamped with the same id;
//!  4. report the ids already recorded for the sheet's tracker number.
//!
//! A write failure in step 3 leaves the project row in place and comes back
//! as `LineItemsFailed` with the id; nothing reconciles it automatically.

use crate::config::{Config, Layouts};
use crate::core::grid::GridExtractor;
use crate::core::identity::{IdentityAllocator, resolve};
use crate::core::pivot::KeyValuePivoter;
use crate::core::schema::{ExtraColumnPolicy, ID_COLUMN, SchemaMapper, TRACKER_COLUMN};
use crate::core::writer::TableWriter;
use crate::db::datastore::{Datastore, SqlValue, qualified, quote_ident};
use crate::db::log::audit;
use crate::db::pool::DbPool;
use crate::errors::{AppError, AppResult};
use crate::models::{Family, Record};
use crate::ui::messages::{detail, error, header, info, success, warning};
use crate::workbook::Workbook;
use std::path::PathBuf;

/// Knobs shared by every sheet of a run.
#[derive(Debug, Clone, Default)]
pub struct UploadOptions {
    pub policy: ExtraColumnPolicy,
    pub layouts: Layouts,
}

impl From<&Config> for UploadOptions {
    fn from(cfg: &Config) -> Self {
        Self {
            policy: cfg.extra_columns,
            layouts: cfg.layouts.clone(),
        }
    }
}

/// More than one identifier is recorded for the same tracker number.
/// Not an error: an operator has to decide which one is right.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateTrackerAmbiguity {
    pub tracker: String,
    pub candidates: Vec<i64>,
}

/// A family sheet, extracted and mapped, not yet written.
#[derive(Debug, Clone)]
pub struct PreparedSheet {
    pub family: Family,
    pub project: Record,
    pub line_items: Vec<Record>,
    pub skipped_blank: usize,
    pub extra_columns: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct UploadReport {
    pub workbook: String,
    pub family: Family,
    pub id: i64,
    pub reused_id: bool,
    pub line_items: usize,
    pub skipped_blank: usize,
    pub extra_columns: Vec<String>,
    pub tracker: Option<String>,
    /// Every id recorded for `tracker` in the family table, oldest first.
    pub tracker_ids: Vec<i64>,
    pub ambiguity: Option<DuplicateTrackerAmbiguity>,
}

/// Result of a dry run: what would be written.
#[derive(Debug, Clone)]
pub struct Preview {
    pub prepared: PreparedSheet,
    pub next_id: i64,
    /// `true` when keep-max mode would attach the sheet to an existing id.
    pub reused: bool,
}

/// Caller-driven id linkage across a batch.
#[derive(Debug, Clone, Default)]
pub struct BatchPlan {
    /// Families to load; empty = every family sheet present.
    pub families: Vec<Family>,
    /// Reuse the current max id for the first family uploaded from each
    /// workbook; later families mint a new id unless `share_id` is set.
    pub keep_max: bool,
    /// Within a workbook, later sheets reuse the id minted by the first one.
    pub share_id: bool,
    pub dry_run: bool,
}

#[derive(Debug)]
pub struct SheetOutcome {
    pub workbook: String,
    pub family: Option<Family>,
    pub result: AppResult<UploadReport>,
}

#[derive(Debug, Default)]
pub struct BatchOutcome {
    pub outcomes: Vec<SheetOutcome>,
}

impl BatchOutcome {
    pub fn failures(&self) -> usize {
        self.outcomes.iter().filter(|o| o.result.is_err()).count()
    }

    pub fn reports(&self) -> impl Iterator<Item = &UploadReport> {
        self.outcomes.iter().filter_map(|o| o.result.as_ref().ok())
    }
}

pub struct UploadLogic;

impl UploadLogic {
    /// Extract and map one family sheet without touching the database.
    pub fn prepare(
        workbook: &Workbook,
        family: Family,
        opts: &UploadOptions,
    ) -> AppResult<PreparedSheet> {
        let sheet = family.sheet_name();
        let grid = workbook.family_sheet(family)?;
        let layout = opts.layouts.for_family(family);
        let mapper = SchemaMapper::new(family, opts.policy);

        // metadata → record
        let block = GridExtractor::metadata(grid, layout.metadata_rows, sheet)?;
        let pivoted = KeyValuePivoter::pivot(&block)?;
        let project = mapper.map(&pivoted)?;
        let extra_columns = mapper.extra_columns(&project);

        // line items
        let width = mapper.schema().line_item_fields.len();
        let items_block = GridExtractor::line_items(grid, layout.line_items_from, width, sheet)?;
        let items = mapper.map_line_items(&items_block);

        Ok(PreparedSheet {
            family,
            project,
            line_items: items.records,
            skipped_blank: items.skipped_blank,
            extra_columns,
        })
    }

    /// Run the whole pipeline for one family sheet of one workbook.
    pub fn upload<D: Datastore + ?Sized>(
        store: &D,
        workbook: &Workbook,
        family: Family,
        keep_max: bool,
        opts: &UploadOptions,
    ) -> AppResult<UploadReport> {
        // 1️⃣ estrazione e mapping: nessuna scrittura finché non è tutto valido
        let PreparedSheet {
            mut project,
            mut line_items,
            skipped_blank,
            extra_columns,
            ..
        } = Self::prepare(workbook, family, opts)?;
        TableWriter::check(store, family.sov_table(), &line_items)?;

        // 2️⃣ id + riga progetto (serializzati)
        let allocation = IdentityAllocator::allocate_and_insert(
            store,
            family,
            &mut project,
            &mut line_items,
            keep_max,
        )?;

        // 3️⃣ line items con lo stesso id
        let written = TableWriter::append(store, family.sov_table(), &line_items).map_err(|e| {
            AppError::LineItemsFailed {
                id: allocation.id,
                source: Box::new(e),
            }
        })?;

        // 4️⃣ diagnostica tracker: le righe sono già scritte, un errore qui è solo un avviso
        let tracker = project.text(TRACKER_COLUMN);
        let tracker_ids = match &tracker {
            Some(t) => Self::tracker_ids(store, family, t).unwrap_or_else(|e| {
                warning(format!("Tracker lookup for '{t}' failed: {e}"));
                Vec::new()
            }),
            None => Vec::new(),
        };
        let ambiguity = match &tracker {
            Some(t) if tracker_ids.len() > 1 => Some(DuplicateTrackerAmbiguity {
                tracker: t.clone(),
                candidates: tracker_ids.clone(),
            }),
            _ => None,
        };

        Ok(UploadReport {
            workbook: workbook.name.clone(),
            family,
            id: allocation.id,
            reused_id: allocation.reused,
            line_items: written,
            skipped_blank,
            extra_columns,
            tracker,
            tracker_ids,
            ambiguity,
        })
    }

    /// Dry run: prepare the sheet and compute the id it would get.
    pub fn preview<D: Datastore + ?Sized>(
        store: &D,
        workbook: &Workbook,
        family: Family,
        keep_max: bool,
        opts: &UploadOptions,
    ) -> AppResult<Preview> {
        Self::preview_after(store, workbook, family, keep_max, opts, None)
    }

    /// Dry run that also counts ids handed out by earlier previews of the
    /// same batch (`pending_max`), which were never written.
    fn preview_after<D: Datastore + ?Sized>(
        store: &D,
        workbook: &Workbook,
        family: Family,
        keep_max: bool,
        opts: &UploadOptions,
        pending_max: Option<i64>,
    ) -> AppResult<Preview> {
        let prepared = Self::prepare(workbook, family, opts)?;
        let max = IdentityAllocator::current_max(store)?.max(pending_max);
        Ok(Preview {
            prepared,
            next_id: resolve(max, keep_max),
            reused: keep_max && max.is_some(),
        })
    }

    /// Distinct ids recorded for a tracker number in a family table, ascending.
    pub fn tracker_ids<D: Datastore + ?Sized>(
        store: &D,
        family: Family,
        tracker: &str,
    ) -> AppResult<Vec<i64>> {
        let sql = format!(
            "SELECT DISTINCT {id} FROM {table} WHERE {tracker} = ?1 ORDER BY {id}",
            id = quote_ident(ID_COLUMN),
            table = qualified(family.project_table()),
            tracker = quote_ident(TRACKER_COLUMN),
        );
        let rows = store.query(&sql, &[SqlValue::Text(tracker.to_string())])?;

        Ok(rows
            .rows
            .iter()
            .filter_map(|r| match r.first() {
                Some(SqlValue::Integer(n)) => Some(*n),
                _ => None,
            })
            .collect())
    }

    /// Upload a batch of workbooks. Errors are per sheet: they are reported,
    /// logged, and the batch moves on.
    pub fn upload_batch(
        pool: &DbPool,
        files: &[PathBuf],
        plan: &BatchPlan,
        opts: &UploadOptions,
    ) -> BatchOutcome {
        let mut batch = BatchOutcome::default();
        // dry run: ids previewed so far, never written
        let mut pending_max: Option<i64> = None;

        for path in files {
            let name = path.display().to_string();
            header(&name);

            let workbook = match Workbook::open(path) {
                Ok(wb) => wb,
                Err(e) => {
                    error(format!("{name}: {e}"));
                    audit(&pool.conn, "upload_failed", &name, &e.to_string());
                    batch.outcomes.push(SheetOutcome {
                        workbook: name,
                        family: None,
                        result: Err(e),
                    });
                    continue;
                }
            };

            let families = if plan.families.is_empty() {
                workbook.families()
            } else {
                plan.families.clone()
            };

            if families.is_empty() {
                let e = AppError::MissingSheet(
                    Family::ALL
                        .iter()
                        .map(|f| f.sheet_name())
                        .collect::<Vec<_>>()
                        .join(" / "),
                );
                error(format!("{name}: {e}"));
                audit(&pool.conn, "upload_failed", &name, &e.to_string());
                batch.outcomes.push(SheetOutcome {
                    workbook: name,
                    family: None,
                    result: Err(e),
                });
                continue;
            }

            // id della prima riga progetto scritta (o simulata) di questo workbook
            let mut workbook_id: Option<i64> = None;

            for family in families {
                let keep_max = match workbook_id {
                    Some(_) => plan.share_id,
                    None => plan.keep_max,
                };
                let target = format!("{}:{}", workbook.name, family.code());

                if plan.dry_run {
                    let result =
                        Self::preview_after(pool, &workbook, family, keep_max, opts, pending_max);
                    match &result {
                        Ok(p) => {
                            workbook_id.get_or_insert(p.next_id);
                            pending_max = pending_max.max(Some(p.next_id));
                            print_preview(family, p);
                        }
                        Err(e) => error(format!("{target}: {e}")),
                    }
                    batch.outcomes.push(SheetOutcome {
                        workbook: workbook.name.clone(),
                        family: Some(family),
                        result: result.map(|p| preview_report(&workbook, p)),
                    });
                    continue;
                }

                let result = Self::upload(pool, &workbook, family, keep_max, opts);
                match &result {
                    Ok(report) => {
                        workbook_id.get_or_insert(report.id);
                        print_report(report);
                        audit(&pool.conn, "upload", &target, &summary(report));
                    }
                    Err(e) => {
                        // la riga progetto esiste già: l'id resta quello del workbook
                        if let AppError::LineItemsFailed { id, .. } = e {
                            workbook_id.get_or_insert(*id);
                        }
                        error(format!("{target}: {e}"));
                        audit(&pool.conn, "upload_failed", &target, &e.to_string());
                    }
                }

                batch.outcomes.push(SheetOutcome {
                    workbook: workbook.name.clone(),
                    family: Some(family),
                    result,
                });
            }
        }

        batch
    }
}

fn summary(r: &UploadReport) -> String {
    format!(
        "id={}{} line_items={} tracker={}",
        r.id,
        if r.reused_id { " (reused)" } else { "" },
        r.line_items,
        r.tracker.as_deref().unwrap_or("-")
    )
}

fn print_report(r: &UploadReport) {
    info(format!(
        "Upload ID: {}{}, options: {:?}",
        r.id,
        if r.reused_id { " (kept)" } else { "" },
        r.tracker_ids
    ));

    if let Some(a) = &r.ambiguity {
        warning(format!(
            "Tracker '{}' resolves to {} ids: {:?}. Check which one is current.",
            a.tracker,
            a.candidates.len(),
            a.candidates
        ));
    }

    if !r.extra_columns.is_empty() {
        warning(format!(
            "Unmapped labels kept as extra columns: {}",
            r.extra_columns.join(", ")
        ));
    }

    success(format!(
        "{} → {} project row + {} line items ({} blank rows skipped)",
        r.family.sheet_name(),
        r.family.project_table(),
        r.line_items,
        r.skipped_blank
    ));
}

fn print_preview(family: Family, p: &Preview) {
    info(format!(
        "[dry-run] {} would get id {}{}",
        family.sheet_name(),
        p.next_id,
        if p.reused { " (kept)" } else { "" }
    ));
    for (column, value) in p.prepared.project.iter() {
        detail(column, value.to_text().unwrap_or_default());
    }
    info(format!(
        "[dry-run] {} line items ({} blank rows skipped)",
        p.prepared.line_items.len(),
        p.prepared.skipped_blank
    ));
}

fn preview_report(workbook: &Workbook, p: Preview) -> UploadReport {
    let tracker = p.prepared.project.text(TRACKER_COLUMN);
    UploadReport {
        workbook: workbook.name.clone(),
        family: p.prepared.family,
        id: p.next_id,
        reused_id: p.reused,
        line_items: p.prepared.line_items.len(),
        skipped_blank: p.prepared.skipped_blank,
        extra_columns: p.prepared.extra_columns,
        tracker,
        tracker_ids: Vec::new(),
        ambiguity: None,
    }
}
