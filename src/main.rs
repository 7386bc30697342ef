//! loadertxt CLI - Query text files with SQL, one row per line

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod commands;

#[derive(Parser)]
#[command(name = "loadertxt")]
#[command(version)]
#[command(about = "Query line-oriented text files with SQL through a SQLite virtual table")]
#[command(long_about = r#"
loadertxt exposes text files to SQLite as read-only tables with one
column, `line`, and one row per line. Files are read lazily while the
query runs.

Example usage:
  loadertxt scan ./access.log --limit 20
  loadertxt query -t access=./access.log "SELECT COUNT(*) FROM access WHERE line LIKE '%404%'"
  loadertxt query "SELECT rowid, line FROM lines" -t lines='C:\logs\app.log'
"#)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a SQL statement with text files attached as tables
    Query {
        /// SQL to run
        sql: String,

        /// Path to the database file (in-memory when omitted)
        #[arg(short, long)]
        database: Option<PathBuf>,

        /// Attach a text file as a table, as NAME=PATH (repeatable)
        #[arg(short, long = "table", value_name = "NAME=PATH")]
        tables: Vec<String>,

        /// Path to the config file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Output format
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputMode,
    },

    /// Print the lines of a file with their rowids
    Scan {
        /// Text file to scan
        file: String,

        /// Maximum number of rows
        #[arg(short, long)]
        limit: Option<usize>,

        /// Output format
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputMode,
    },

    /// Write a starter config file
    Init {
        /// Where to write the config
        #[arg(short, long)]
        path: Option<PathBuf>,

        /// Overwrite an existing config
        #[arg(long)]
        force: bool,

        /// Output format
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputMode,
    },
}

/// How command results are printed
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputMode {
    Text,
    Json,
}

impl OutputMode {
    pub fn is_human(self) -> bool {
        self == OutputMode::Text
    }
}

/// Print a machine-readable success envelope
pub fn emit_success(output_mode: OutputMode, command: &str, data: serde_json::Value) -> anyhow::Result<()> {
    debug_assert!(!output_mode.is_human());
    let envelope = serde_json::json!({
        "ok": true,
        "command": command,
        "data": data,
    });
    println!("{}", serde_json::to_string_pretty(&envelope)?);
    Ok(())
}

fn main() {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let result = match cli.command {
        Commands::Query { sql, database, tables, config, format } => {
            commands::run_query(commands::QueryArgs { sql, database, tables, config }, format)
        }
        Commands::Scan { file, limit, format } => commands::run_scan(&file, limit, format),
        Commands::Init { path, force, format } => commands::run_init(path, force, format),
    };

    if let Err(e) = result {
        tracing::debug!("Command failed: {:?}", e);
        loadertxt::ui::error(&format!("{:#}", e));
        std::process::exit(1);
    }
}
