//! tabledb - named tables on top of an embedded SQL engine
//!
//! This crate provides:
//! - `DataFrame`: an in-memory table, loadable from delimited files
//! - `Database`: a registry of named tables backed by an in-memory SQLite
//!   connection, with SQL execution that returns frames
//! - `TableHandle`: a registry entry holding a table's cached rows

pub mod config;
pub mod database;
pub mod error;
pub mod frame;
pub mod sql;
pub mod table;

pub use config::{CsvOptions, DatabaseOptions};
pub use database::{Database, InsertData, TableData, TableSource};
pub use error::{Error, Result};
pub use frame::DataFrame;
pub use sql::types::{DataType, Record, Row, Value};
pub use table::TableHandle;
