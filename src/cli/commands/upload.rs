use crate::cli::parser::Commands;
use crate::config::Config;
use crate::core::upload::{BatchPlan, UploadLogic, UploadOptions};
use crate::db::initialize::init_db;
use crate::db::pool::DbPool;
use crate::errors::{AppError, AppResult};
use crate::ui::messages::{info, success, warning};

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Upload {
        files,
        families,
        keep_max,
        share_id,
        dry_run,
    } = cmd
    {
        let pool = DbPool::with_busy_timeout(&cfg.database, cfg.busy_timeout_ms)?;

        // tabelle e migrazioni sempre allineate prima di scrivere
        init_db(&pool.conn)?;

        let plan = BatchPlan {
            families: families.clone(),
            keep_max: *keep_max,
            share_id: *share_id,
            dry_run: *dry_run,
        };
        let opts = UploadOptions::from(cfg);

        let batch = UploadLogic::upload_batch(&pool, files, &plan, &opts);

        let done = batch.reports().count();
        let failed = batch.failures();
        println!();

        if *dry_run {
            info(format!("[dry-run] {done} sheet(s) checked, nothing written"));
        } else if done > 0 {
            success(format!("{done} sheet(s) uploaded"));
        }

        if failed > 0 {
            warning(format!("{failed} sheet(s) failed, see messages above"));
            return Err(AppError::BatchFailed(failed));
        }
    }

    Ok(())
}
