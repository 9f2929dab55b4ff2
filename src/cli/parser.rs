use crate::export::ExportFormat;
use crate::models::{ColumnType, Family};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Command-line interface definition for sovloader
/// CLI application to load SOV workbooks into SQLite
#[derive(Parser)]
#[command(
    name = "sovloader",
    version = env!("CARGO_PKG_VERSION"),
    about = "Load solar, HV and storage Statement of Value workbooks into SQLite",
    long_about = None
)]
pub struct Cli {
    /// Override database path (useful for tests or custom DB)
    #[arg(global = true, long = "db")]
    pub db: Option<String>,

    /// Run in test mode (no config file update)
    #[arg(global = true, long = "test", hide = true)]
    pub test: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize the database and configuration
    Init,

    /// Manage the configuration file (view or edit)
    Config {
        #[arg(long = "print", help = "Print the current configuration file")]
        print_config: bool,

        #[arg(
            long = "edit",
            help = "Edit the configuration file (default editor: $EDITOR, or nano/notepad)"
        )]
        edit_config: bool,

        #[arg(
            long = "editor",
            help = "Specify the editor to use (vim, nano, or custom path)"
        )]
        editor: Option<String>,
    },

    /// Manage the database (migrations, integrity checks, etc.)
    Db {
        #[arg(long = "migrate", help = "Run pending database migrations")]
        migrate: bool,

        #[arg(long = "check", help = "Check database integrity")]
        check: bool,

        #[arg(long = "vacuum", help = "Optimize the database using VACUUM")]
        vacuum: bool,

        #[arg(long = "info", help = "Show database information")]
        info: bool,
    },

    /// Print the internal log table
    Log {
        #[arg(long = "print", help = "Print rows from the internal log table")]
        print: bool,

        #[arg(long = "last", value_name = "N", help = "Only the newest N rows")]
        last: Option<usize>,
    },

    /// Upload one or more SOV workbooks
    Upload {
        /// Workbook files (xlsx, xlsm, xls, xlsb, ods)
        #[arg(required = true, value_name = "FILE")]
        files: Vec<PathBuf>,

        /// Only these family sheets (repeatable); default: every sheet present
        #[arg(long = "family", value_enum)]
        families: Vec<Family>,

        /// First sheet of each workbook reuses the current highest id instead of minting one
        #[arg(long = "keep-max")]
        keep_max: bool,

        /// Within a workbook, later sheets reuse the id of the first one
        #[arg(long = "share-id")]
        share_id: bool,

        /// Extract and map only; print what would be written
        #[arg(long = "dry-run")]
        dry_run: bool,
    },

    /// Change the declared type of a table column, converting stored values
    Retype {
        #[arg(long, value_name = "TABLE")]
        table: String,

        #[arg(long, value_name = "COLUMN")]
        column: String,

        #[arg(long, value_enum)]
        to: ColumnType,
    },

    /// Export a table snapshot
    Export {
        #[arg(long, value_name = "TABLE")]
        table: String,

        #[arg(long, value_enum, default_value = "csv")]
        format: ExportFormat,

        #[arg(long, value_name = "FILE")]
        file: String,

        /// Only the rows of this project id
        #[arg(long)]
        id: Option<i64>,

        #[arg(long, short = 'f')]
        force: bool,
    },
}
