use serde::{Deserialize, Serialize};

use crate::{
    error::Result,
    frame::DataFrame,
    sql::types::Value,
};

/// Column metadata as reported by the engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnInfo {
    pub cid: i64,
    pub name: String,
    /// Declared type clause, empty when the column was declared without one
    pub declared_type: String,
    pub not_null: bool,
    /// Default expression text, if any
    pub default: Option<String>,
    /// Whether this column is part of the primary key
    pub primary_key: bool,
}

/// Header of the frame produced by [`describe`]
pub const DESCRIBE_COLUMNS: [&str; 6] = [
    "Column ID",
    "Name",
    "Type",
    "Not NULL?",
    "Default Value",
    "Primary Key?",
];

/// Turns engine column metadata into a user-facing frame
pub fn describe(columns: &[ColumnInfo]) -> Result<DataFrame> {
    let rows = columns
        .iter()
        .map(|c| {
            vec![
                Value::Integer(c.cid),
                Value::String(c.name.clone()),
                Value::String(c.declared_type.clone()),
                Value::Boolean(c.not_null),
                c.default.clone().into(),
                Value::from(if c.primary_key { "Yes" } else { "No" }),
            ]
        })
        .collect();
    DataFrame::new(DESCRIBE_COLUMNS.iter().map(|c| c.to_string()).collect(), rows)
}
