use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::error;
use tracing_subscriber::EnvFilter;

use tabular_loader::config::LoadOptions;
use tabular_loader::execution::{ConsoleProgress, Loader};
use tabular_loader::store::SqliteStore;

/// Load a spreadsheet, text, JSON, registry export or CSV file (or a directory of them)
/// into a SQLite table.
#[derive(Debug, Parser)]
#[command(name = "tabular-loader", version)]
struct Cli {
    /// File or directory to load.
    #[arg(required_unless_present = "list_databases")]
    path: Option<PathBuf>,

    /// SQLite database file.
    #[arg(long, default_value = "loader.db")]
    db: PathBuf,

    /// JSON settings file; flags below override it.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Database (schema name) holding the table.
    #[arg(long)]
    database: Option<String>,

    /// Target table; defaults to the source file name.
    #[arg(long)]
    table: Option<String>,

    /// Encoding of the table's text columns (WHATWG label).
    #[arg(long)]
    encoding: Option<String>,

    /// Worker threads for directory reads.
    #[arg(long)]
    threads: Option<usize>,

    /// Directory for informations.log / errors.log.
    #[arg(long)]
    log_dir: Option<PathBuf>,

    /// Print the databases reachable from the connection and exit.
    #[arg(long)]
    list_databases: bool,

    /// Do not print the row counter.
    #[arg(long)]
    no_progress: bool,
}

fn main() {
    init_tracing();

    if let Err(err) = run() {
        error!(error = %err, "load failed");
        for cause in err.chain().skip(1) {
            error!(cause = %cause, "caused by");
        }
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    let opts = options_from(&cli)?;

    let store = SqliteStore::open(&cli.db)
        .with_context(|| format!("failed to open {}", cli.db.display()))?
        .with_text_encoding(opts.text_encoding()?);
    let mut loader = Loader::new(store, opts);
    if !cli.no_progress {
        loader = loader.with_observer(Arc::new(ConsoleProgress));
    }

    if cli.list_databases {
        for name in loader.list_databases()? {
            println!("{name}");
        }
    }

    if let Some(path) = &cli.path {
        let report = loader
            .run(path)
            .with_context(|| format!("failed to load {}", path.display()))?;
        if cli.no_progress {
            println!("{report}");
        }
    }

    loader.close()?;
    Ok(())
}

fn options_from(cli: &Cli) -> Result<LoadOptions> {
    let mut opts = match &cli.config {
        Some(path) => LoadOptions::from_json_path(path)
            .with_context(|| format!("failed to read settings {}", path.display()))?,
        None => LoadOptions::default(),
    };
    if let Some(database) = &cli.database {
        opts.database = database.clone();
    }
    if let Some(table) = &cli.table {
        opts.table = Some(table.clone());
    }
    if let Some(encoding) = &cli.encoding {
        opts.target_encoding = encoding.clone();
    }
    if cli.threads.is_some() {
        opts.num_threads = cli.threads;
    }
    if cli.log_dir.is_some() {
        opts.log_dir = cli.log_dir.clone();
    }
    Ok(opts)
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
