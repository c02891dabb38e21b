//! Session configuration.

use serde::{Deserialize, Serialize};

/// Options for reading delimited files into frames.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CsvOptions {
    /// Field delimiter (default: b',').
    pub delimiter: u8,
    /// Whether the first row holds the column names.
    pub has_headers: bool,
    /// Type columns as integer/float/boolean when every field parses; text otherwise.
    pub infer_types: bool,
}

impl Default for CsvOptions {
    fn default() -> Self {
        Self {
            delimiter: b',',
            has_headers: true,
            infer_types: true,
        }
    }
}

/// Options for a [`Database`](crate::Database) session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseOptions {
    /// Free-text label, no effect on behaviour.
    pub name: Option<String>,
    pub csv: CsvOptions,
    /// Number of executed statements kept in the history; 0 disables it.
    pub history_capacity: usize,
}

impl Default for DatabaseOptions {
    fn default() -> Self {
        Self {
            name: None,
            csv: CsvOptions::default(),
            history_capacity: 100,
        }
    }
}

impl DatabaseOptions {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }
}
