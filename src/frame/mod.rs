//! In-memory tabular data
//!
//! A `DataFrame` is an ordered list of named columns and an ordered list of
//! rows. Cells are dynamically typed [`Value`]s, so one frame can hold a mix
//! of integer, text and float columns the way a query result does.

use std::fmt::Display;

use serde::{Deserialize, Serialize};

use crate::{
    error::{Error, Result},
    sql::types::{DataType, Record, Row, Value},
};

mod delimited;

/// Tabular data with named, ordered columns
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DataFrame {
    columns: Vec<String>,
    rows: Vec<Row>,
}

impl DataFrame {
    /// Builds a frame from column names and rows; every row must match the column count
    pub fn new(columns: Vec<String>, rows: Vec<Row>) -> Result<Self> {
        if let Some((i, row)) = rows
            .iter()
            .enumerate()
            .find(|(_, r)| r.len() != columns.len())
        {
            return Err(Error::Value(format!(
                "row {} has {} values, expected {}",
                i,
                row.len(),
                columns.len()
            )));
        }
        Ok(Self { columns, rows })
    }

    /// An empty frame with the given header
    pub fn with_columns<S: Into<String>>(columns: impl IntoIterator<Item = S>) -> Self {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    /// Builds a frame from (column name, values) pairs of equal length
    pub fn from_columns(columns: Vec<(String, Vec<Value>)>) -> Result<Self> {
        let height = columns.first().map_or(0, |(_, values)| values.len());
        if let Some((name, values)) = columns.iter().find(|(_, v)| v.len() != height) {
            return Err(Error::Value(format!(
                "column {} has {} values, expected {}",
                name,
                values.len(),
                height
            )));
        }

        let mut names = Vec::with_capacity(columns.len());
        let mut iters = Vec::with_capacity(columns.len());
        for (name, values) in columns {
            names.push(name);
            iters.push(values.into_iter());
        }
        let rows = (0..height)
            .map(|_| iters.iter_mut().filter_map(Iterator::next).collect())
            .collect();
        Ok(Self {
            columns: names,
            rows,
        })
    }

    /// Builds a frame from records; columns are taken in first-seen order
    pub fn from_records(records: &[Record]) -> Self {
        let mut df = Self::default();
        for record in records {
            df.push_record(record.clone());
        }
        df
    }

    /// Returns (row count, column count)
    pub fn shape(&self) -> (usize, usize) {
        (self.rows.len(), self.columns.len())
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Returns the column index for a given column name
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// All values of one column, top to bottom
    pub fn column(&self, name: &str) -> Option<Vec<&Value>> {
        let idx = self.column_index(name)?;
        Some(self.rows.iter().map(|r| &r[idx]).collect())
    }

    pub fn get(&self, row: usize, column: &str) -> Option<&Value> {
        let idx = self.column_index(column)?;
        self.rows.get(row).map(|r| &r[idx])
    }

    /// Converts every row into a record keyed by column name
    pub fn to_records(&self) -> Vec<Record> {
        self.rows
            .iter()
            .map(|row| self.columns.iter().cloned().zip(row.iter().cloned()).collect())
            .collect()
    }

    /// Appends one record, aligning by column name
    ///
    /// Columns unknown to the frame are added and earlier rows are padded with NULL.
    pub fn push_record(&mut self, record: Record) {
        let mut row = vec![Value::Null; self.columns.len()];
        for (name, value) in record {
            let idx = self.ensure_column(&name);
            if idx == row.len() {
                row.push(value);
            } else {
                row[idx] = value;
            }
        }
        self.rows.push(row);
    }

    /// Appends all rows of another frame, aligning by column name
    pub fn append(&mut self, other: DataFrame) {
        let mapping: Vec<usize> = other
            .columns
            .iter()
            .map(|name| self.ensure_column(name))
            .collect();
        let width = self.columns.len();
        for src in other.rows {
            let mut row = vec![Value::Null; width];
            for (value, &idx) in src.into_iter().zip(&mapping) {
                row[idx] = value;
            }
            self.rows.push(row);
        }
    }

    /// Drops all rows, keeping the header
    pub fn clear(&mut self) {
        self.rows.clear();
    }

    /// Infers one storage type per column from its non-null values
    ///
    /// Integer and float mixes widen to float; anything else mixed is text.
    pub fn column_types(&self) -> Vec<DataType> {
        (0..self.columns.len())
            .map(|idx| {
                let mut inferred: Option<DataType> = None;
                for dt in self.rows.iter().filter_map(|r| r[idx].datatype()) {
                    inferred = Some(match (inferred, dt) {
                        (None, dt) => dt,
                        (Some(a), b) if a == b => a,
                        (Some(DataType::Integer), DataType::Float)
                        | (Some(DataType::Float), DataType::Integer) => DataType::Float,
                        _ => return DataType::String,
                    });
                }
                inferred.unwrap_or(DataType::String)
            })
            .collect()
    }

    fn ensure_column(&mut self, name: &str) -> usize {
        if let Some(idx) = self.column_index(name) {
            return idx;
        }
        self.columns.push(name.to_string());
        for row in self.rows.iter_mut() {
            row.push(Value::Null);
        }
        self.columns.len() - 1
    }
}

impl Display for DataFrame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let cells: Vec<Vec<String>> = self
            .rows
            .iter()
            .map(|r| r.iter().map(|v| v.to_string()).collect())
            .collect();
        let widths: Vec<usize> = self
            .columns
            .iter()
            .enumerate()
            .map(|(i, c)| {
                cells
                    .iter()
                    .map(|r| r[i].chars().count())
                    .fold(c.chars().count(), usize::max)
            })
            .collect();

        let header: Vec<String> = self
            .columns
            .iter()
            .zip(&widths)
            .map(|(c, w)| format!("{:<w$}", c, w = *w))
            .collect();
        writeln!(f, "{}", header.join(" | ").trim_end())?;
        let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
        writeln!(f, "{}", rule.join("-+-"))?;
        for row in cells {
            let line: Vec<String> = row
                .iter()
                .zip(&widths)
                .map(|(v, w)| format!("{:<w$}", v, w = *w))
                .collect();
            writeln!(f, "{}", line.join(" | ").trim_end())?;
        }
        write!(f, "({} rows)", self.rows.len())
    }
}
