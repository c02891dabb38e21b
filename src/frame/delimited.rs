//! Delimited file ingest for frames.

use std::{fs::File, io::Read, path::Path};

use csv::{ReaderBuilder, StringRecord};
use tracing::debug;

use super::DataFrame;
use crate::{
    config::CsvOptions,
    error::{Error, Result},
    sql::types::{Row, Value},
};

impl DataFrame {
    /// Reads a delimited file into a frame
    pub fn read_csv(path: impl AsRef<Path>, options: &CsvOptions) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| {
            Error::execution(format!("could not open {}", path.display()), e)
        })?;
        let df = Self::from_csv_reader(file, options).map_err(|e| {
            e.context(format!("could not read delimited file {}", path.display()))
        })?;
        debug!(path = %path.display(), rows = df.shape().0, cols = df.shape().1, "Loaded delimited file");
        Ok(df)
    }

    /// Reads delimited text from any `Read`
    pub fn from_csv_reader<R: Read>(reader: R, options: &CsvOptions) -> Result<Self> {
        let mut rdr = ReaderBuilder::new()
            .has_headers(options.has_headers)
            .delimiter(options.delimiter)
            .from_reader(reader);

        let mut columns: Vec<String> = if options.has_headers {
            rdr.headers()?.iter().map(str::to_string).collect()
        } else {
            Vec::new()
        };

        let records = rdr.records().collect::<std::result::Result<Vec<StringRecord>, _>>()?;
        if !options.has_headers {
            let width = records.first().map_or(0, StringRecord::len);
            columns = (0..width).map(|i| i.to_string()).collect();
        }

        let rows: Vec<Row> = (0..columns.len())
            .map(|idx| parse_column(&records, idx, options.infer_types))
            .fold(vec![Vec::with_capacity(columns.len()); records.len()], |mut rows, column| {
                for (row, value) in rows.iter_mut().zip(column) {
                    row.push(value);
                }
                rows
            });
        DataFrame::new(columns, rows)
    }
}

/// Parses one column, picking the narrowest type every non-empty field fits
fn parse_column(records: &[StringRecord], idx: usize, infer: bool) -> Vec<Value> {
    let fields: Vec<Option<&str>> = records
        .iter()
        .map(|r| r.get(idx).filter(|f| !f.is_empty()))
        .collect();
    let present = || fields.iter().flatten();

    if infer {
        if present().all(|f| f.parse::<i64>().is_ok()) {
            return convert(&fields, |f| f.parse().ok().map(Value::Integer));
        }
        if present().all(|f| f.parse::<f64>().is_ok()) {
            return convert(&fields, |f| f.parse().ok().map(Value::Float));
        }
        if present().all(|f| parse_bool(f).is_some()) {
            return convert(&fields, |f| parse_bool(f).map(Value::Boolean));
        }
    }
    convert(&fields, |f| Some(Value::String(f.to_string())))
}

fn convert(fields: &[Option<&str>], parse: impl Fn(&str) -> Option<Value>) -> Vec<Value> {
    fields
        .iter()
        .map(|f| f.and_then(&parse).unwrap_or(Value::Null))
        .collect()
}

fn parse_bool(field: &str) -> Option<bool> {
    if field.eq_ignore_ascii_case("true") {
        Some(true)
    } else if field.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}
