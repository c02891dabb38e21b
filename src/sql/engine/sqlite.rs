//! SQLite engine backed by an in-memory `rusqlite` connection.

use rusqlite::{Connection, params_from_iter};
use tracing::{debug, info};

use super::{Engine, Transaction};
use crate::{
    error::{Error, Result},
    frame::DataFrame,
    sql::{schema::ColumnInfo, types::Value},
};

const TABLE_NAMES_SQL: &str = "SELECT name FROM sqlite_master \
     WHERE type = 'table' AND name NOT LIKE 'sqlite\\_%' ESCAPE '\\' ORDER BY rowid";

const TABLE_INFO_SQL: &str =
    "SELECT cid, name, type, \"notnull\", dflt_value, pk FROM pragma_table_info(?1) ORDER BY cid";

/// In-memory SQLite database
pub struct SqliteEngine {
    conn: Connection,
}

impl SqliteEngine {
    /// Opens a fresh in-memory database
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(|e| {
            Error::execution("failed to open in-memory SQLite database", e)
        })?;
        info!("SQLite engine initialized (in-memory)");
        Ok(Self { conn })
    }
}

impl Engine for SqliteEngine {
    type Transaction<'a> = SqliteTransaction<'a>;

    fn begin(&mut self) -> Result<Self::Transaction<'_>> {
        Ok(SqliteTransaction {
            txn: self.conn.transaction()?,
        })
    }

    fn execute_script(&mut self, sql: &str) -> Result<()> {
        debug!(sql, "execute script");
        self.conn.execute_batch(sql)?;
        Ok(())
    }

    fn query(&self, sql: &str, params: &[Value]) -> Result<DataFrame> {
        debug!(sql, "query");
        let mut stmt = self.conn.prepare(sql)?;
        let columns: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();
        let width = columns.len();

        let mut rows = Vec::new();
        let mut cursor = stmt.query(params_from_iter(params.iter()))?;
        while let Some(row) = cursor.next()? {
            let mut values = Vec::with_capacity(width);
            for i in 0..width {
                values.push(row.get::<_, Value>(i)?);
            }
            rows.push(values);
        }
        DataFrame::new(columns, rows)
    }

    fn table_names(&self) -> Result<Vec<String>> {
        let mut stmt = self.conn.prepare(TABLE_NAMES_SQL)?;
        let names = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(names)
    }

    fn table_info(&self, table: &str) -> Result<Vec<ColumnInfo>> {
        let mut stmt = self.conn.prepare(TABLE_INFO_SQL)?;
        let columns = stmt
            .query_map([table], |row| {
                Ok(ColumnInfo {
                    cid: row.get(0)?,
                    name: row.get(1)?,
                    declared_type: row.get(2)?,
                    not_null: row.get::<_, i64>(3)? != 0,
                    default: row.get(4)?,
                    primary_key: row.get::<_, i64>(5)? > 0,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(columns)
    }

    fn close(self) -> Result<()> {
        self.conn
            .close()
            .map_err(|(_, e)| Error::execution("failed to close SQLite connection", e))
    }
}

/// SQLite transaction (wrapper around `rusqlite::Transaction`)
pub struct SqliteTransaction<'a> {
    txn: rusqlite::Transaction<'a>,
}

impl Transaction for SqliteTransaction<'_> {
    fn execute(&mut self, sql: &str, params: &[&Value]) -> Result<usize> {
        debug!(sql, "execute");
        let mut stmt = self.txn.prepare_cached(sql)?;
        Ok(stmt.execute(params_from_iter(params.iter()))?)
    }

    fn commit(self) -> Result<()> {
        Ok(self.txn.commit()?)
    }

    fn rollback(self) -> Result<()> {
        Ok(self.txn.rollback()?)
    }
}
