//! Special backslash commands for the REPL.
//!
//! Provides commands like `\d`, `\dt`, `\q`, etc.

use anyhow::{Context, Result};

use crate::formatter::OutputFormat;
use crate::repl::Repl;

/// Result of executing a command.
#[derive(Debug, PartialEq, Eq)]
pub enum CommandResult {
    /// Continue the REPL.
    Continue,
    /// Exit the REPL.
    Exit,
    /// Output a message.
    Output(String),
    /// Set timing mode.
    SetTiming(bool),
    /// Set output format.
    SetFormat(OutputFormat),
}

/// A parsed command.
#[derive(Debug, PartialEq, Eq)]
pub enum Command {
    /// Quit the REPL.
    Quit,
    /// Show help.
    Help,
    /// Describe a table, or list tables without a name.
    Describe(Option<String>),
    /// List tables.
    ListTables,
    /// Show storage and session info.
    Status,
    /// Toggle timing.
    Timing,
    /// Set output format.
    Format(String),
    /// Show version.
    Version,
    /// Clear screen.
    Clear,
    /// Execute a file.
    Include(String),
    /// Begin a transaction.
    Begin,
    /// Commit transaction.
    Commit,
    /// Rollback transaction.
    Rollback,
    /// Unknown command.
    Unknown(String),
}

impl Command {
    /// Parses a command string.
    pub fn parse(input: &str) -> Self {
        let input = input.trim().trim_end_matches(';');
        let cmd = input.strip_prefix('\\').unwrap_or(input);

        let mut parts = cmd.splitn(2, char::is_whitespace);
        let cmd_name = parts.next().unwrap_or_default().to_lowercase();
        let args = parts
            .next()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());

        match cmd_name.as_str() {
            "q" | "quit" | "exit" => Command::Quit,
            "?" | "h" | "help" => Command::Help,
            "d" => Command::Describe(args),
            "dt" | "tables" => Command::ListTables,
            "conninfo" | "c" | "status" | "s" => Command::Status,
            "timing" | "t" => Command::Timing,
            "format" | "f" => Command::Format(args.unwrap_or_else(|| "table".to_string())),
            "version" | "v" => Command::Version,
            "clear" | "cls" => Command::Clear,
            "i" | "include" => Command::Include(args.unwrap_or_default()),
            "begin" => Command::Begin,
            "commit" => Command::Commit,
            "rollback" => Command::Rollback,
            _ => Command::Unknown(cmd_name),
        }
    }

    /// Executes the command.
    pub async fn execute(&self, repl: &mut Repl) -> Result<CommandResult> {
        match self {
            Command::Quit => Ok(CommandResult::Exit),

            Command::Help => Ok(CommandResult::Output(Self::help_text())),

            Command::Describe(Some(name)) => {
                repl.execute_and_print(&format!("SHOW COLUMNS FROM {}", name))
                    .await?;
                Ok(CommandResult::Continue)
            }

            Command::Describe(None) | Command::ListTables => {
                repl.execute_and_print("SHOW TABLES").await?;
                Ok(CommandResult::Continue)
            }

            Command::Status => Ok(CommandResult::Output(Self::status(repl))),

            Command::Timing => Ok(CommandResult::SetTiming(!repl.timing())),

            Command::Format(format) => match OutputFormat::from_name(format) {
                Some(fmt) => Ok(CommandResult::SetFormat(fmt)),
                None => Ok(CommandResult::Output(format!(
                    "Unknown format '{}'. Available: table, json, csv, raw",
                    format
                ))),
            },

            Command::Version => Ok(CommandResult::Output(format!(
                "sqlbridge CLI v{}",
                env!("CARGO_PKG_VERSION")
            ))),

            Command::Clear => {
                print!("\x1B[2J\x1B[1;1H");
                Ok(CommandResult::Continue)
            }

            Command::Include(path) => {
                if path.is_empty() {
                    return Ok(CommandResult::Output("Usage: \\i <filename>".to_string()));
                }
                let content = std::fs::read_to_string(path)
                    .with_context(|| format!("failed to read {}", path))?;
                repl.execute_and_print(&content).await?;
                Ok(CommandResult::Continue)
            }

            Command::Begin => {
                repl.execute_and_print("BEGIN").await?;
                Ok(CommandResult::Continue)
            }

            Command::Commit => {
                repl.execute_and_print("COMMIT").await?;
                Ok(CommandResult::Continue)
            }

            Command::Rollback => {
                repl.execute_and_print("ROLLBACK").await?;
                Ok(CommandResult::Continue)
            }

            Command::Unknown(cmd) => Ok(CommandResult::Output(format!(
                "Unknown command '\\{}'. Type \\? for help.",
                cmd
            ))),
        }
    }

    /// Returns help text.
    fn help_text() -> String {
        r#"sqlbridge CLI Commands
======================

General:
  \q, \quit       Exit the CLI
  \?, \help       Show this help
  \v, \version    Show version information
  \clear, \cls    Clear screen
  \s, \status     Show storage and session information

Schema:
  \d [TABLE]      Describe a table (lists tables without a name)
  \dt, \tables    List all tables

Transaction:
  \begin          Start a transaction
  \commit         Commit the transaction
  \rollback       Rollback the transaction

Display:
  \t, \timing     Toggle timing display
  \f FORMAT       Set output format (table, json, csv, raw)

Files:
  \i FILE         Execute commands from file

Type SQL statements followed by a semicolon to execute them.
"#
        .to_string()
    }

    fn status(repl: &Repl) -> String {
        let glue = repl.glue();
        let stats = glue.stats();
        let timeout = repl
            .config()
            .timeout()
            .map(|t| format!("{:?}", t))
            .unwrap_or_else(|| "none".to_string());
        format!(
            "Storage: {}\nTransaction: {}\nTimeout: {}\nBatches: {} ({} failed)\nStatements: {}",
            glue.storage_name(),
            if glue.in_transaction() { "open" } else { "none" },
            timeout,
            stats.batches,
            stats.failures,
            stats.statements
        )
    }
}
