use crate::cli::parser::Commands;
use crate::config::Config;
use crate::db::pool::DbPool;
use crate::errors::AppResult;
use crate::export::ExportLogic;
use crate::ui::messages::info;

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Export {
        table,
        format,
        file,
        id,
        force,
    } = cmd
    {
        let pool = DbPool::with_busy_timeout(&cfg.database, cfg.busy_timeout_ms)?;
        let rows = ExportLogic::export(&pool, table, *format, file, *id, *force)?;
        if rows > 0 {
            info(format!("{rows} rows exported from '{table}'"));
        }
    }
    Ok(())
}
