//! SQL text builders
//!
//! Identifiers are always double-quoted, values are always bound as
//! positional parameters. Literal rendering is kept for the history log.

use crate::{
    error::{Error, Result},
    sql::types::Record,
};

/// Leading keywords that produce a result set
const READ_KEYWORDS: [&str; 4] = ["SELECT", "PRAGMA", "EXPLAIN", "VALUES"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementKind {
    /// Materialized into a frame
    Read,
    /// Executed as a script and committed
    Write,
}

impl StatementKind {
    /// Classifies a statement by its leading keyword (case-insensitive)
    ///
    /// A `WITH` clause is skipped and the statement after the common table
    /// expressions decides, so `WITH .. INSERT` is a write.
    pub fn classify(sql: &str) -> Self {
        let mut words = top_level_words(sql);
        let keyword = match words.next() {
            Some(w) if w.eq_ignore_ascii_case("WITH") => words.find(|w| {
                ["SELECT", "VALUES", "INSERT", "REPLACE", "UPDATE", "DELETE"]
                    .iter()
                    .any(|k| k.eq_ignore_ascii_case(w))
            }),
            first => first,
        };
        match keyword {
            Some(k) if READ_KEYWORDS.iter().any(|r| r.eq_ignore_ascii_case(k)) => {
                StatementKind::Read
            }
            _ => StatementKind::Write,
        }
    }
}

/// Bare words outside parentheses and quotes, in order
fn top_level_words(sql: &str) -> impl Iterator<Item = &str> {
    let mut words = Vec::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut start: Option<usize> = None;
    for (i, c) in sql.char_indices() {
        if let Some(q) = quote {
            if c == q {
                quote = None;
            }
            continue;
        }
        if let Some(from) = start {
            if c.is_ascii_alphanumeric() || c == '_' {
                continue;
            }
            words.push(&sql[from..i]);
            start = None;
        }
        match c {
            '\'' | '"' | '`' => quote = Some(c),
            '[' => quote = Some(']'),
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            c if depth == 0 && c.is_ascii_alphabetic() => start = Some(i),
            _ => {}
        }
    }
    if let Some(from) = start {
        words.push(&sql[from..]);
    }
    words.into_iter()
}

/// Checks that a table or column name can be used as an identifier
pub fn validate_identifier(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(Error::Value("expected a non-empty name".to_string()));
    }
    if name.contains('\0') {
        return Err(Error::Type(format!(
            "name {:?} contains a NUL character",
            name
        )));
    }
    Ok(())
}

/// Double-quotes an identifier, doubling embedded quotes
pub fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

pub fn create_table<N, T>(table: &str, columns: &[(N, T)]) -> Result<String>
where
    N: AsRef<str>,
    T: AsRef<str>,
{
    validate_identifier(table)?;
    if columns.is_empty() {
        return Err(Error::Value(format!(
            "table {} needs at least one column",
            table
        )));
    }
    let mut defs = Vec::with_capacity(columns.len());
    for (name, clause) in columns {
        validate_identifier(name.as_ref())?;
        let clause = clause.as_ref().trim();
        if clause.is_empty() {
            defs.push(quote_identifier(name.as_ref()));
        } else {
            defs.push(format!("{} {}", quote_identifier(name.as_ref()), clause));
        }
    }
    Ok(format!(
        "CREATE TABLE {} ({});",
        quote_identifier(table),
        defs.join(", ")
    ))
}

/// Builds a parameterized INSERT for the given columns
///
/// No columns inserts a row of defaults.
pub fn insert<S: AsRef<str>>(table: &str, columns: &[S]) -> String {
    if columns.is_empty() {
        return format!("INSERT INTO {} DEFAULT VALUES;", quote_identifier(table));
    }
    let names: Vec<String> = columns.iter().map(|c| quote_identifier(c.as_ref())).collect();
    let placeholders: Vec<String> = (1..=columns.len()).map(|i| format!("?{}", i)).collect();
    format!(
        "INSERT INTO {} ({}) VALUES ({});",
        quote_identifier(table),
        names.join(", "),
        placeholders.join(", ")
    )
}

pub fn rename_table(from: &str, to: &str) -> String {
    format!(
        "ALTER TABLE {} RENAME TO {};",
        quote_identifier(from),
        quote_identifier(to)
    )
}

pub fn drop_table(table: &str) -> String {
    format!("DROP TABLE {};", quote_identifier(table))
}

pub fn delete_all(table: &str) -> String {
    format!("DELETE FROM {};", quote_identifier(table))
}

pub fn select_all(table: &str) -> String {
    format!("SELECT * FROM {};", quote_identifier(table))
}

pub fn select_range(table: &str) -> String {
    format!("SELECT * FROM {} LIMIT ?1 OFFSET ?2;", quote_identifier(table))
}

/// Renders a record as (column list, value list), both comma-joined in record order
pub fn render_row(record: &Record) -> (String, String) {
    let names: Vec<String> = record.iter().map(|(c, _)| quote_identifier(c)).collect();
    let values: Vec<String> = record.iter().map(|(_, v)| v.to_sql_literal()).collect();
    (names.join(", "), values.join(", "))
}

/// Renders a record as a literal INSERT statement
pub fn insert_literal(table: &str, record: &Record) -> String {
    if record.is_empty() {
        return insert::<&str>(table, &[]);
    }
    let (names, values) = render_row(record);
    format!(
        "INSERT INTO {} ({}) VALUES ({});",
        quote_identifier(table),
        names,
        values
    )
}
