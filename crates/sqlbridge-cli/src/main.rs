//! sqlbridge Command-Line Interface
//!
//! An interactive SQL shell over the sqlbridge query client.
//!
//! # Usage
//!
//! ```bash
//! # Start an interactive session over in-memory storage
//! sqlbridge
//!
//! # Execute a batch against a JSON file
//! sqlbridge --storage json --path ./db.json -c "SELECT * FROM users"
//!
//! # Execute a script against a named shared-memory store
//! sqlbridge --storage shared-memory --name scratch -f queries.sql
//!
//! # Output as JSON
//! sqlbridge -o json -c "SELECT 1 AS one"
//! ```

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use tracing::info;
use tracing_subscriber::EnvFilter;

use sqlbridge_client::StorageConfig;

mod commands;
mod config;
mod formatter;
mod repl;

use config::CliConfig;
use formatter::OutputFormat;
use repl::Repl;

/// sqlbridge command-line interface
#[derive(Parser, Debug)]
#[command(
    name = "sqlbridge",
    version,
    about = "Interactive SQL shell for sqlbridge",
    long_about = "Runs SQL against an embedded sqlbridge engine.\n\n\
                  Statements can be given with -c, read from a file with -f,\n\
                  or typed into an interactive session."
)]
struct Args {
    /// Execute a SQL batch and exit
    #[arg(short = 'c', long)]
    command: Option<String>,

    /// Execute the SQL batch in FILE and exit
    #[arg(short = 'f', long, value_name = "FILE")]
    file: Option<PathBuf>,

    /// Output format
    #[arg(short = 'o', long, value_enum)]
    output: Option<OutputFormatArg>,

    /// Storage backend (overrides the config file)
    #[arg(long, value_enum, env = "SQLBRIDGE_STORAGE")]
    storage: Option<StorageArg>,

    /// Path of the JSON storage file
    #[arg(long, value_name = "PATH", env = "SQLBRIDGE_PATH")]
    path: Option<PathBuf>,

    /// Name of the shared-memory store
    #[arg(long, env = "SQLBRIDGE_NAME")]
    name: Option<String>,

    /// Query timeout in milliseconds
    #[arg(long, value_name = "MS", env = "SQLBRIDGE_TIMEOUT_MS")]
    timeout: Option<u64>,

    /// Enable verbose output
    #[arg(short = 'v', long)]
    verbose: bool,

    /// Suppress the banner (for scripting)
    #[arg(short = 'q', long)]
    quiet: bool,

    /// Configuration file path
    #[arg(long, value_name = "FILE", env = "SQLBRIDGE_CONFIG")]
    config: Option<PathBuf>,
}

/// Output format argument
#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormatArg {
    /// Display results in a formatted table
    Table,
    /// Display results as JSON
    Json,
    /// Display results as CSV
    Csv,
    /// Display raw values
    Raw,
}

impl From<OutputFormatArg> for OutputFormat {
    fn from(arg: OutputFormatArg) -> Self {
        match arg {
            OutputFormatArg::Table => OutputFormat::Table,
            OutputFormatArg::Json => OutputFormat::Json,
            OutputFormatArg::Csv => OutputFormat::Csv,
            OutputFormatArg::Raw => OutputFormat::Raw,
        }
    }
}

/// Storage backend argument
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum StorageArg {
    /// Private in-memory tables
    Memory,
    /// Tables persisted to a JSON file
    Json,
    /// In-memory tables shared by name within the process
    SharedMemory,
}

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<()> {
    let args = Args::parse();

    init_logging(args.verbose);

    let config = load_config(&args)?;
    let format = match args.output {
        Some(arg) => arg.into(),
        None => OutputFormat::from_name(&config.output_format).with_context(|| {
            format!("unknown output format '{}' in config", config.output_format)
        })?,
    };

    if let Some(command) = &args.command {
        execute_batch(config, command, format).await
    } else if let Some(file) = &args.file {
        execute_file(config, file, format).await
    } else {
        run_repl(config, format, args.quiet).await
    }
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("sqlbridge_cli=debug,sqlbridge_client=debug,sqlbridge_sql=debug")
    } else {
        EnvFilter::new("sqlbridge_cli=warn")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(args: &Args) -> Result<CliConfig> {
    let mut config = match &args.config {
        Some(path) => CliConfig::from_file(path)?,
        None => CliConfig::load_default()?,
    };

    if let Some(storage) = args.storage {
        config.storage = storage_config(storage, args.path.as_deref(), args.name.as_deref())?;
    }
    if let Some(timeout) = args.timeout {
        config.timeout_ms = Some(timeout);
    }

    Ok(config)
}

fn storage_config(
    storage: StorageArg,
    path: Option<&Path>,
    name: Option<&str>,
) -> Result<StorageConfig> {
    Ok(match storage {
        StorageArg::Memory => StorageConfig::Memory,
        StorageArg::Json => match path {
            Some(path) => StorageConfig::Json {
                path: path.to_path_buf(),
            },
            None => bail!("--storage json requires --path"),
        },
        StorageArg::SharedMemory => match name {
            Some(name) => StorageConfig::SharedMemory {
                name: name.to_string(),
            },
            None => bail!("--storage shared-memory requires --name"),
        },
    })
}

async fn execute_batch(config: CliConfig, sql: &str, format: OutputFormat) -> Result<()> {
    info!("Executing command: {}", sql);

    let mut repl = Repl::new(config, format)?;
    repl.execute_and_print(sql).await
}

async fn execute_file(config: CliConfig, path: &Path, format: OutputFormat) -> Result<()> {
    info!("Executing file: {}", path.display());

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let mut repl = Repl::new(config, format)?;
    repl.execute_and_print(&content).await
}

async fn run_repl(config: CliConfig, format: OutputFormat, quiet: bool) -> Result<()> {
    let mut repl = Repl::new(config, format)?;

    if !quiet {
        repl.print_banner();
    }

    repl.run().await
}
