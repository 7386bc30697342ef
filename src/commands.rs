use crate::{emit_success, OutputMode};
use loadertxt::config::{self, LoaderConfig, TableEntry};
use loadertxt::extension::{schema, QueryOutput};
use loadertxt::ui::{self, Icons};
use loadertxt::Session;
use std::path::PathBuf;
use std::time::{Duration, Instant};

/// Table name `scan` attaches its file under
const SCAN_TABLE: &str = "lines";

pub struct QueryArgs {
    pub sql: String,
    pub database: Option<PathBuf>,
    pub tables: Vec<String>,
    pub config: Option<PathBuf>,
}

pub fn run_query(args: QueryArgs, output_mode: OutputMode) -> anyhow::Result<()> {
    let config = config::load_config(args.config.as_deref())?.unwrap_or_default();

    let database = args
        .database
        .or_else(|| config.database.as_ref().map(PathBuf::from));
    let mut session = match &database {
        Some(path) => {
            config::ensure_db_dir(path)?;
            Session::open(path)?
        }
        None => Session::open_in_memory()?,
    };

    let mut entries = config.tables;
    for pair in &args.tables {
        entries.push(TableEntry::parse(pair)?);
    }

    if output_mode.is_human() {
        let target = database
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| ":memory:".to_string());
        ui::status(Icons::DATABASE, "Database", &target);
    }
    for entry in &entries {
        session.attach_file(&entry.name, &entry.file)?;
        if output_mode.is_human() {
            ui::status(Icons::FILE, &entry.name, &entry.file);
        }
    }

    let started = Instant::now();
    let output = session.query(&args.sql)?;
    let elapsed = started.elapsed();
    session.close();

    print_output(output_mode, "query", &output, elapsed)
}

pub fn run_scan(file: &str, limit: Option<usize>, output_mode: OutputMode) -> anyhow::Result<()> {
    let mut session = Session::open_in_memory()?;
    session.attach_file(SCAN_TABLE, file)?;

    let mut sql = format!("SELECT rowid, line FROM {}", schema::quote_identifier(SCAN_TABLE));
    if let Some(limit) = limit {
        sql.push_str(&format!(" LIMIT {}", limit));
    }

    if output_mode.is_human() {
        ui::header(&format!("Scanning {}", file));
    }

    let started = Instant::now();
    let output = session.query(&sql)?;
    let elapsed = started.elapsed();
    session.close();

    print_output(output_mode, "scan", &output, elapsed)
}

pub fn run_init(path: Option<PathBuf>, force: bool, output_mode: OutputMode) -> anyhow::Result<()> {
    let path = path.unwrap_or_else(config::default_config_path);
    let starter = LoaderConfig {
        database: None,
        tables: vec![TableEntry {
            name: "lines".to_string(),
            file: "data.txt".to_string(),
        }],
    };

    config::write_config(&path, &starter, force)?;

    if output_mode.is_human() {
        ui::success(&format!("Wrote {}", path.display()));
    } else {
        let data = serde_json::json!({
            "path": path.display().to_string(),
        });
        emit_success(output_mode, "init", data)?;
    }
    Ok(())
}

fn print_output(
    output_mode: OutputMode,
    command: &str,
    output: &QueryOutput,
    elapsed: Duration,
) -> anyhow::Result<()> {
    if !output_mode.is_human() {
        let data = serde_json::json!({
            "columns": output.columns,
            "rows": output.to_json_records(),
        });
        return emit_success(output_mode, command, data);
    }

    if output.columns.is_empty() {
        ui::success("Statement executed");
    } else if output.is_empty() {
        ui::empty("No rows.");
    } else {
        println!("{}", ui::result_table(output));
    }
    ui::timing(&format!("{} row(s) in {:.2?}", output.rows.len(), elapsed));
    Ok(())
}
