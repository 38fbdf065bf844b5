//! Interactive REPL (Read-Eval-Print-Loop) for sqlbridge.
//!
//! Provides an interactive SQL shell with command history, line editing,
//! and multi-line input support.

use std::borrow::Cow;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::{bail, Result};
use rustyline::completion::{Completer, Pair};
use rustyline::error::ReadlineError;
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::history::DefaultHistory;
use rustyline::validate::{ValidationContext, ValidationResult, Validator};
use rustyline::{CompletionType, Config, EditMode, Editor, Helper};
use tracing::{debug, error};

use sqlbridge_client::{ClientError, Glue, QueryResult};

use crate::commands::{Command, CommandResult};
use crate::config::CliConfig;
use crate::formatter::{self, OutputFormat};

/// The REPL prompt shown when waiting for input.
const PROMPT: &str = "sqlbridge> ";

/// The prompt shown inside a transaction.
const TRANSACTION_PROMPT: &str = "sqlbridge*> ";

const KEYWORDS: &[&str] = &[
    "SELECT", "FROM", "WHERE", "INSERT", "INTO", "VALUES", "UPDATE", "SET", "DELETE", "CREATE",
    "TABLE", "DROP", "IF", "EXISTS", "PRIMARY", "KEY", "UNIQUE", "AND", "OR", "NOT", "NULL",
    "IS", "IN", "BETWEEN", "CAST", "AS", "ORDER", "BY", "ASC", "DESC", "LIMIT", "OFFSET",
    "COUNT", "SUM", "AVG", "MIN", "MAX", "UPPER", "LOWER", "LENGTH", "ABS", "COALESCE",
    "BEGIN", "COMMIT", "ROLLBACK", "TRANSACTION", "SHOW", "TABLES", "COLUMNS", "VERSION",
    "BOOLEAN", "INT8", "INT16", "INT32", "INT", "INTEGER", "INT64", "BIGINT", "INT128",
    "UINT8", "UINT16", "UINT32", "UINT64", "UINT128", "FLOAT32", "FLOAT", "DOUBLE", "TEXT",
    "VARCHAR", "BYTEA", "INET", "DATE", "TIME", "TIMESTAMP", "INTERVAL", "UUID", "MAP",
    "LIST", "POINT", "GENERATE_UUID", "NOW",
];

/// REPL helper for rustyline.
struct ReplHelper;

impl Completer for ReplHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &rustyline::Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let start = line[..pos]
            .rfind(|c: char| c.is_whitespace() || c == '(' || c == ',')
            .map(|i| i + 1)
            .unwrap_or(0);

        let word_upper = line[start..pos].to_uppercase();
        if word_upper.is_empty() {
            return Ok((start, Vec::new()));
        }

        let matches = KEYWORDS
            .iter()
            .filter(|kw| kw.starts_with(&word_upper))
            .map(|kw| Pair {
                display: kw.to_string(),
                replacement: kw.to_string(),
            })
            .collect();

        Ok((start, matches))
    }
}

impl Hinter for ReplHelper {
    type Hint = String;

    fn hint(&self, _line: &str, _pos: usize, _ctx: &rustyline::Context<'_>) -> Option<Self::Hint> {
        None
    }
}

impl Highlighter for ReplHelper {
    fn highlight<'l>(&self, line: &'l str, _pos: usize) -> Cow<'l, str> {
        Cow::Borrowed(line)
    }

    fn highlight_char(&self, _line: &str, _pos: usize, _forced: bool) -> bool {
        false
    }
}

impl Validator for ReplHelper {
    fn validate(&self, ctx: &mut ValidationContext) -> rustyline::Result<ValidationResult> {
        let trimmed = ctx.input().trim();

        if trimmed.is_empty() || trimmed.starts_with('\\') || trimmed.ends_with(';') {
            return Ok(ValidationResult::Valid(None));
        }

        Ok(ValidationResult::Incomplete)
    }
}

impl Helper for ReplHelper {}

/// Interactive shell over one query client.
pub struct Repl {
    /// CLI configuration.
    config: CliConfig,
    /// The query client.
    glue: Glue,
    /// The rustyline editor.
    editor: Editor<ReplHelper, DefaultHistory>,
    /// Output format.
    format: OutputFormat,
    /// History file path.
    history_file: Option<PathBuf>,
    /// Timing mode enabled.
    timing: bool,
}

impl Repl {
    /// Opens the configured storage and creates a REPL over it.
    pub fn new(config: CliConfig, format: OutputFormat) -> Result<Self> {
        let glue = Glue::with_config(config.client_config())?;

        let rl_config = Config::builder()
            .history_ignore_space(true)
            .completion_type(CompletionType::List)
            .edit_mode(EditMode::Emacs)
            .max_history_size(config.history_size)?
            .build();

        let mut editor = Editor::with_config(rl_config)?;
        editor.set_helper(Some(ReplHelper));

        let history_file = config.history_file.clone().or_else(default_history_file);
        if let Some(ref path) = history_file {
            if path.exists() {
                if let Err(e) = editor.load_history(path) {
                    debug!("Failed to load history: {}", e);
                }
            }
        }

        Ok(Self {
            timing: config.timing,
            config,
            glue,
            editor,
            format,
            history_file,
        })
    }

    /// Prints the welcome banner.
    pub fn print_banner(&self) {
        println!("sqlbridge CLI v{}", env!("CARGO_PKG_VERSION"));
        println!("Storage: {}", self.glue.storage_name());
        println!("Type \\? for help, \\q to quit.\n");
    }

    /// Runs the main REPL loop.
    pub async fn run(&mut self) -> Result<()> {
        loop {
            let prompt = if self.glue.in_transaction() {
                TRANSACTION_PROMPT
            } else {
                PROMPT
            };

            match self.editor.readline(prompt) {
                Ok(line) => {
                    let line = line.trim();

                    if line.is_empty() {
                        continue;
                    }

                    if let Err(e) = self.editor.add_history_entry(line) {
                        debug!("Failed to add history entry: {}", e);
                    }

                    match self.process_line(line).await {
                        Ok(true) => break,
                        Ok(false) => {}
                        Err(e) => eprintln!("ERROR: {:#}", e),
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    println!("^C");
                    continue;
                }
                Err(ReadlineError::Eof) => {
                    println!("\\q");
                    break;
                }
                Err(e) => {
                    error!("Readline error: {}", e);
                    break;
                }
            }
        }

        self.save_history();
        println!("Goodbye!");
        Ok(())
    }

    /// Processes a single line of input. Returns true to exit.
    async fn process_line(&mut self, line: &str) -> Result<bool> {
        if line.starts_with('\\') {
            return self.process_command(line).await;
        }

        self.execute_and_print(line).await?;
        Ok(false)
    }

    /// Processes a backslash command.
    async fn process_command(&mut self, line: &str) -> Result<bool> {
        let cmd = Command::parse(line);

        match cmd.execute(self).await? {
            CommandResult::Continue => Ok(false),
            CommandResult::Exit => Ok(true),
            CommandResult::Output(msg) => {
                println!("{}", msg);
                Ok(false)
            }
            CommandResult::SetTiming(enabled) => {
                self.timing = enabled;
                println!("Timing is {}.", if enabled { "on" } else { "off" });
                Ok(false)
            }
            CommandResult::SetFormat(format) => {
                self.format = format;
                println!("Output format set to {:?}.", format);
                Ok(false)
            }
        }
    }

    /// Executes SQL and prints one block per statement result.
    ///
    /// On failure the results of statements that completed are printed
    /// before the error is returned.
    pub async fn execute_and_print(&mut self, sql: &str) -> Result<()> {
        let start = Instant::now();
        debug!(sql, "executing");

        match self.glue.execute(sql).await {
            Ok(results) => {
                self.print_results(&results, start.elapsed());
                Ok(())
            }
            Err(ClientError::Execution {
                index,
                source,
                completed,
            }) => {
                self.print_results(&completed, start.elapsed());
                bail!("statement {} failed: {}", index + 1, source)
            }
            Err(ClientError::Conversion {
                index,
                source,
                completed,
            }) => {
                self.print_results(&completed, start.elapsed());
                bail!("statement {} returned an invalid result: {}", index + 1, source)
            }
            Err(err @ ClientError::Timeout(_)) => {
                bail!("{}; the batch keeps running in the background", err)
            }
            Err(err) => Err(err.into()),
        }
    }

    fn print_results(&self, results: &[QueryResult], elapsed: Duration) {
        for result in results {
            println!("{}", formatter::format_result(result, self.format));
            if self.format == OutputFormat::Table {
                if let Some(count) = formatter::row_count(result) {
                    println!("({} row{})", count, if count == 1 { "" } else { "s" });
                }
            }
        }

        if self.timing {
            println!("Time: {:.3}ms", elapsed.as_secs_f64() * 1000.0);
        }
    }

    /// Saves command history.
    fn save_history(&mut self) {
        if let Some(ref path) = self.history_file {
            if let Some(parent) = path.parent() {
                if let Err(e) = std::fs::create_dir_all(parent) {
                    debug!("Failed to create history directory: {}", e);
                }
            }
            if let Err(e) = self.editor.save_history(path) {
                debug!("Failed to save history: {}", e);
            }
        }
    }

    /// Returns the CLI configuration.
    pub fn config(&self) -> &CliConfig {
        &self.config
    }

    /// Returns the query client.
    pub fn glue(&self) -> &Glue {
        &self.glue
    }

    /// Returns whether timing is shown.
    pub fn timing(&self) -> bool {
        self.timing
    }
}

/// Gets the default history file path.
fn default_history_file() -> Option<PathBuf> {
    dirs::data_local_dir().map(|dir| dir.join("sqlbridge").join("history"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_history_file() {
        if let Some(path) = default_history_file() {
            assert!(path.ends_with("sqlbridge/history"));
        }
    }

    #[test]
    fn test_keywords_are_uppercase() {
        assert!(KEYWORDS.iter().all(|kw| kw.to_uppercase() == *kw));
    }

    #[tokio::test]
    async fn test_execute_and_print_reports_failing_statement() {
        let mut repl = Repl::new(CliConfig::default(), OutputFormat::Raw).unwrap();
        repl.execute_and_print("CREATE TABLE t (id INTEGER); INSERT INTO t VALUES (1)")
            .await
            .unwrap();

        let err = repl
            .execute_and_print("SELECT * FROM t; SELECT * FROM missing")
            .await
            .unwrap_err();
        assert!(err.to_string().starts_with("statement 2 failed"));
    }
}
