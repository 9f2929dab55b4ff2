use crate::cli::parser::Commands;
use crate::config::Config;
use crate::core::retype::RetypeLogic;
use crate::db::log::audit;
use crate::db::pool::DbPool;
use crate::errors::AppResult;
use crate::ui::messages::success;

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Retype { table, column, to } = cmd {
        let pool = DbPool::with_busy_timeout(&cfg.database, cfg.busy_timeout_ms)?;

        let report = RetypeLogic::retype(&pool, table, column, *to)?;

        let message = format!(
            "{}: {} → {} ({} values converted)",
            report.column,
            report.from.to_sql_decl(),
            report.to.to_sql_decl(),
            report.converted
        );
        audit(&pool.conn, "retype", &report.table, &message);
        success(format!("{}.{message}", report.table));
    }

    Ok(())
}
