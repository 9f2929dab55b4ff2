use crate::db::pool::DbPool;
use crate::errors::AppResult;
use ansi_term::Colour;
use regex::Regex;
use unicode_width::UnicodeWidthStr;

const MAX_OP_WIDTH: usize = 60;

fn strip_ansi(s: &str) -> String {
    match Regex::new(r"\x1B\[[0-9;]*[mK]") {
        Ok(re) => re.replace_all(s, "").into_owned(),
        Err(_) => s.to_string(),
    }
}

/// Restituisce il colore ANSI in base all'operazione
fn color_for_operation(op: &str) -> Colour {
    match op {
        "upload" => Colour::Green,
        "upload_failed" => Colour::Red,
        "retype" => Colour::Yellow,
        "export" => Colour::Blue,
        "migration_applied" => Colour::Purple,
        "init" => Colour::RGB(255, 153, 51), // arancione
        _ => Colour::White,
    }
}

/// One row of the internal `log` table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub id: i64,
    pub date: String,
    pub operation: String,
    pub target: String,
    pub message: String,
}

pub struct LogLogic;

impl LogLogic {
    /// Log rows, oldest first; `last` keeps only the newest N.
    pub fn entries(pool: &DbPool, last: Option<usize>) -> AppResult<Vec<LogEntry>> {
        let mut stmt = pool.conn.prepare_cached(
            "SELECT id, date, operation, target, message FROM log ORDER BY id ASC",
        )?;

        let rows = stmt.query_map([], |row| {
            let raw_date: String = row.get(1)?;
            let date = chrono::DateTime::parse_from_rfc3339(&raw_date)
                .map(|dt| dt.format("%FT%T%:z").to_string())
                .unwrap_or(raw_date);

            Ok(LogEntry {
                id: row.get(0)?,
                date,
                operation: row.get(2)?,
                target: row.get::<_, Option<String>>(3)?.unwrap_or_default(),
                message: row.get::<_, Option<String>>(4)?.unwrap_or_default(),
            })
        })?;

        let mut entries = Vec::new();
        for r in rows {
            entries.push(r?);
        }

        if let Some(n) = last
            && entries.len() > n
        {
            entries.drain(..entries.len() - n);
        }

        Ok(entries)
    }

    pub fn print_log(pool: &DbPool, last: Option<usize>) -> AppResult<()> {
        let entries = Self::entries(pool, last)?;

        println!("📜 Internal log:\n");

        if entries.is_empty() {
            println!("(empty)");
            return Ok(());
        }

        // colonna unica op+target, larghezza limitata
        let op_target = |e: &LogEntry| {
            if e.target.is_empty() {
                e.operation.clone()
            } else {
                format!("{} ({})", e.operation, e.target)
            }
        };

        let op_w = entries
            .iter()
            .map(|e| UnicodeWidthStr::width(op_target(e).as_str()))
            .max()
            .unwrap_or(10)
            .min(MAX_OP_WIDTH);
        let id_w = entries
            .iter()
            .map(|e| e.id.to_string().len())
            .max()
            .unwrap_or(1);
        let date_w = entries.iter().map(|e| e.date.len()).max().unwrap_or(10);

        for e in &entries {
            let color = color_for_operation(&e.operation);

            let mut visible = op_target(e);
            if UnicodeWidthStr::width(visible.as_str()) > MAX_OP_WIDTH {
                visible = visible.chars().take(MAX_OP_WIDTH - 3).collect::<String>();
                visible.push_str("...");
            }

            // solo la prima parola è colorata
            let colored = match visible.split_once(' ') {
                Some((op, rest)) => format!("{} {}", color.paint(op), rest),
                None => color.paint(visible.as_str()).to_string(),
            };

            // padding calcolato SENZA ANSI
            let width = UnicodeWidthStr::width(strip_ansi(&colored).as_str());
            let padding = " ".repeat(op_w.saturating_sub(width));

            println!(
                "{:>id_w$}: {:<date_w$} | {}{} => {}",
                e.id,
                e.date,
                colored,
                padding,
                e.message,
                id_w = id_w,
                date_w = date_w
            );
        }

        Ok(())
    }
}
