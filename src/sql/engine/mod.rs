use crate::{
    error::Result,
    frame::DataFrame,
    sql::{schema::ColumnInfo, types::Value},
};

mod sqlite;

pub use sqlite::{SqliteEngine, SqliteTransaction};

/// Embedded SQL engine
///
/// Parsing, planning and storage all live behind this trait; the session only
/// hands it SQL text and bound values.
pub trait Engine {
    type Transaction<'a>: Transaction
    where
        Self: 'a;

    /// Starts a transaction, rolled back unless committed
    fn begin(&mut self) -> Result<Self::Transaction<'_>>;

    /// Executes one or more statements and commits them
    fn execute_script(&mut self, sql: &str) -> Result<()>;

    /// Runs a read statement and materializes every row
    fn query(&self, sql: &str, params: &[Value]) -> Result<DataFrame>;

    /// Names of all user tables, in creation order
    fn table_names(&self) -> Result<Vec<String>>;

    /// Column metadata of a table, empty if the table is unknown
    fn table_info(&self, table: &str) -> Result<Vec<ColumnInfo>>;

    /// Releases the connection
    fn close(self) -> Result<()>
    where
        Self: Sized;
}

/// Engine transaction (parameterized DML and DDL)
pub trait Transaction {
    /// Executes a single statement, returns the number of affected rows
    fn execute(&mut self, sql: &str, params: &[&Value]) -> Result<usize>;

    fn commit(self) -> Result<()>;
    fn rollback(self) -> Result<()>;
}
