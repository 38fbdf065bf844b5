//! Statement splitting and parsing.
//!
//! A SQL blob is first split on top-level semicolons, then each piece is
//! parsed on its own. Callers can therefore execute statement `k` before
//! statement `k + 1` has even been parsed, and a syntax error is reported
//! against the statement that contains it.

use sqlparser::dialect::GenericDialect;
use sqlparser::parser::Parser as SqlParser;
use tracing::trace;

use crate::ast::Statement;
use crate::error::{SqlError, SqlResult};

/// Splits SQL text into statements on top-level semicolons.
///
/// Semicolons inside quoted strings, quoted identifiers and comments do not
/// split. Pieces holding nothing but whitespace or comments are dropped.
pub fn split_statements(content: &str) -> Vec<&str> {
    let mut statements = Vec::new();
    let mut start = 0;
    let mut has_content = false;
    let mut quote: Option<char> = None;
    let mut in_line_comment = false;
    let mut in_block_comment = false;

    let mut chars = content.char_indices().peekable();
    while let Some((i, c)) = chars.next() {
        let next = chars.peek().map(|&(_, n)| n);

        if in_block_comment {
            if c == '*' && next == Some('/') {
                chars.next();
                in_block_comment = false;
            }
            continue;
        }
        if in_line_comment {
            if c == '\n' {
                in_line_comment = false;
            }
            continue;
        }

        if let Some(q) = quote {
            if c == q {
                if next == Some(q) {
                    // Doubled quote is an escaped quote.
                    chars.next();
                } else {
                    quote = None;
                }
            }
            continue;
        }

        match c {
            '/' if next == Some('*') => {
                chars.next();
                in_block_comment = true;
            }
            '-' if next == Some('-') => {
                chars.next();
                in_line_comment = true;
            }
            '\'' | '"' | '`' => {
                quote = Some(c);
                has_content = true;
            }
            ';' => {
                if has_content {
                    statements.push(content[start..i].trim());
                }
                start = i + 1;
                has_content = false;
            }
            c if c.is_whitespace() => {}
            _ => has_content = true,
        }
    }

    if has_content {
        statements.push(content[start..].trim());
    }
    statements
}

/// Parses exactly one SQL statement.
pub fn parse_statement(sql: &str) -> SqlResult<Statement> {
    let mut parsed = SqlParser::parse_sql(&GenericDialect {}, sql)?;
    match parsed.len() {
        0 => Err(SqlError::EmptyStatement),
        1 => {
            let stmt = parsed.remove(0);
            trace!(statement = %stmt, "parsed statement");
            Statement::from_sql_ast(stmt)
        }
        n => Err(SqlError::Syntax(format!(
            "expected one statement, found {}",
            n
        ))),
    }
}

/// Splits and parses every statement in `sql`.
pub fn parse_all(sql: &str) -> SqlResult<Vec<Statement>> {
    split_statements(sql)
        .into_iter()
        .map(parse_statement)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_statements_simple() {
        let stmts = split_statements("SELECT 1; SELECT 2; SELECT 3");
        assert_eq!(stmts, vec!["SELECT 1", "SELECT 2", "SELECT 3"]);
    }

    #[test]
    fn test_split_statements_with_strings() {
        let stmts = split_statements("SELECT 'hello; world'; SELECT 'it''s; fine'");
        assert_eq!(stmts.len(), 2);
        assert_eq!(stmts[0], "SELECT 'hello; world'");
        assert_eq!(stmts[1], "SELECT 'it''s; fine'");
    }

    #[test]
    fn test_split_statements_with_comments() {
        let stmts = split_statements("SELECT 1; -- comment with ; semicolon\nSELECT 2");
        assert_eq!(stmts.len(), 2);

        let stmts = split_statements("SELECT 1; /* block ; comment */ SELECT 2");
        assert_eq!(stmts.len(), 2);
    }

    #[test]
    fn test_split_statements_skips_empty_pieces() {
        let stmts = split_statements(";;  SELECT 1;; -- trailing\n ; /* only */ ;");
        assert_eq!(stmts, vec!["SELECT 1"]);
        assert!(split_statements("   ").is_empty());
    }

    #[test]
    fn test_split_statements_multibyte() {
        let stmts = split_statements("INSERT INTO t VALUES ('世界;🌍'); SELECT 'é'");
        assert_eq!(stmts, vec!["INSERT INTO t VALUES ('世界;🌍')", "SELECT 'é'"]);
    }

    #[test]
    fn test_parse_statement() {
        assert!(matches!(
            parse_statement("CREATE TABLE t (id INTEGER)").unwrap(),
            Statement::CreateTable { .. }
        ));
        assert!(matches!(
            parse_statement("SELEC 1"),
            Err(SqlError::Syntax(_))
        ));
        assert!(matches!(
            parse_statement("SELECT 1; SELECT 2"),
            Err(SqlError::Syntax(_))
        ));
    }

    #[test]
    fn test_parse_all() {
        let stmts = parse_all("BEGIN; INSERT INTO t VALUES (1); COMMIT;").unwrap();
        assert_eq!(stmts.len(), 3);
        assert!(matches!(stmts[0], Statement::StartTransaction));
        assert!(matches!(stmts[2], Statement::Commit));
    }
}
