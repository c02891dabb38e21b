//! Database session.
//!
//! A [`Database`] owns one embedded engine connection and a registry of
//! [`TableHandle`]s, one per table in the engine. Each handle caches the
//! table's rows as a [`DataFrame`]. Mutations go to the engine first; the
//! cached frame is only updated once the engine has committed.

use std::{
    collections::VecDeque,
    path::{Path, PathBuf},
};

use tracing::{debug, info, warn};

use crate::{
    config::DatabaseOptions,
    error::{Error, Result},
    frame::DataFrame,
    sql::{
        engine::{Engine, SqliteEngine, Transaction},
        schema,
        statement::{self, StatementKind},
        types::{Record, Value},
    },
    table::TableHandle,
};

/// Where a table's rows come from
#[derive(Debug, Clone, PartialEq)]
pub enum TableSource {
    Frame(DataFrame),
    /// Path to a delimited file, read with the session's CSV options
    Path(PathBuf),
}

impl TableSource {
    pub fn path(path: impl AsRef<Path>) -> Self {
        TableSource::Path(path.as_ref().to_path_buf())
    }
}

impl From<DataFrame> for TableSource {
    fn from(df: DataFrame) -> Self {
        TableSource::Frame(df)
    }
}

impl From<PathBuf> for TableSource {
    fn from(path: PathBuf) -> Self {
        TableSource::Path(path)
    }
}

impl From<&Path> for TableSource {
    fn from(path: &Path) -> Self {
        TableSource::path(path)
    }
}

/// Input of a bulk registration
#[derive(Debug, Clone, Default, PartialEq)]
pub enum TableData {
    #[default]
    Empty,
    /// Table name to source, in order
    Map(Vec<(String, TableSource)>),
    /// Sources paired positionally with a list of names
    List(Vec<TableSource>),
}

impl TableData {
    pub fn map<K, S>(entries: impl IntoIterator<Item = (K, S)>) -> Self
    where
        K: Into<String>,
        S: Into<TableSource>,
    {
        TableData::Map(
            entries
                .into_iter()
                .map(|(k, s)| (k.into(), s.into()))
                .collect(),
        )
    }

    pub fn list<S: Into<TableSource>>(sources: impl IntoIterator<Item = S>) -> Self {
        TableData::List(sources.into_iter().map(Into::into).collect())
    }

    /// Pairs every source with its table name
    ///
    /// A map takes the given names in place of its keys when there are at least
    /// as many names as entries, and keeps its own keys otherwise. A list needs
    /// at least as many names as sources. Extra names are ignored.
    fn resolve(self, names: &[&str]) -> Result<Vec<(String, TableSource)>> {
        match self {
            TableData::Empty => Ok(Vec::new()),
            TableData::Map(entries) if entries.len() <= names.len() => Ok(names
                .iter()
                .zip(entries)
                .map(|(name, (_, source))| (name.to_string(), source))
                .collect()),
            TableData::Map(entries) => {
                if !names.is_empty() {
                    warn!(
                        entries = entries.len(),
                        names = names.len(),
                        "Fewer names than tables, keeping the mapping keys"
                    );
                }
                Ok(entries)
            }
            TableData::List(sources) if sources.len() <= names.len() => Ok(names
                .iter()
                .zip(sources)
                .map(|(name, source)| (name.to_string(), source))
                .collect()),
            TableData::List(sources) => Err(Error::Value(format!(
                "size mismatch - expected {} table names, got {}",
                sources.len(),
                names.len()
            ))),
        }
    }
}

/// Rows to insert into an existing table
#[derive(Debug, Clone, PartialEq)]
pub enum InsertData {
    Row(Record),
    Frame(DataFrame),
}

impl From<Record> for InsertData {
    fn from(record: Record) -> Self {
        InsertData::Row(record)
    }
}

impl From<DataFrame> for InsertData {
    fn from(df: DataFrame) -> Self {
        InsertData::Frame(df)
    }
}

/// A set of named tables held by one embedded engine
pub struct Database<E: Engine = SqliteEngine> {
    engine: E,
    name: Option<String>,
    tables: Vec<TableHandle>,
    options: DatabaseOptions,
    history: VecDeque<String>,
}

impl Database<SqliteEngine> {
    /// Opens an empty in-memory database with default options
    pub fn new() -> Result<Self> {
        Self::with_options(DatabaseOptions::default())
    }

    pub fn with_options(options: DatabaseOptions) -> Result<Self> {
        Ok(Self::with_engine(SqliteEngine::open_in_memory()?, options))
    }

    /// Opens an in-memory database and registers the initial tables
    pub fn with_tables(data: TableData, names: &[&str], options: DatabaseOptions) -> Result<Self> {
        let mut db = Self::with_options(options)?;
        db.add_tables(data, names)?;
        Ok(db)
    }
}

impl<E: Engine> Database<E> {
    pub fn with_engine(engine: E, options: DatabaseOptions) -> Self {
        info!(name = ?options.name, "Database session opened");
        Self {
            engine,
            name: options.name.clone(),
            tables: Vec::new(),
            options,
            history: VecDeque::new(),
        }
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn set_name(&mut self, name: Option<String>) {
        self.name = name;
    }

    pub fn options(&self) -> &DatabaseOptions {
        &self.options
    }

    /// Registered tables in registration order
    pub fn tables(&self) -> &[TableHandle] {
        &self.tables
    }

    pub fn lookup(&self, name: &str) -> Result<&TableHandle> {
        self.tables
            .iter()
            .find(|t| t.name == name)
            .ok_or_else(|| Error::NotFound(name.to_string()))
    }

    fn position(&self, name: &str) -> Result<usize> {
        self.tables
            .iter()
            .position(|t| t.name == name)
            .ok_or_else(|| Error::NotFound(name.to_string()))
    }

    /// Removes a handle from the registry; the engine table is left untouched
    pub fn remove(&mut self, name: &str) -> Result<TableHandle> {
        let idx = self.position(name)?;
        Ok(self.tables.remove(idx))
    }

    /// One row per registered table: name, row count, column count
    pub fn summary(&self) -> Result<DataFrame> {
        let rows = self
            .tables
            .iter()
            .map(|t| -> Result<Vec<Value>> {
                let (rows, cols) = t.shape();
                Ok(vec![
                    Value::from(t.name.as_str()),
                    Value::try_from(rows)?,
                    Value::try_from(cols)?,
                ])
            })
            .collect::<Result<_>>()?;
        DataFrame::new(
            vec!["Table Name".into(), "Rows".into(), "Columns".into()],
            rows,
        )
    }

    /// Column metadata of a table, or the summary when no table is given
    pub fn describe_schema(&self, name: Option<&str>) -> Result<DataFrame> {
        let Some(table) = name else {
            return self.summary();
        };
        let columns = self
            .engine
            .table_info(table)
            .map_err(|e| e.context(format!("could not get table information for {}", table)))?;
        if columns.is_empty() {
            return Err(Error::NotFound(table.to_string()));
        }
        schema::describe(&columns)
    }

    /// Runs any statement
    ///
    /// Reads return their rows. Everything else is executed as a script and
    /// committed, then the registry is synced with the engine's tables. The
    /// sync also runs when the script fails part way.
    pub fn execute(&mut self, sql: &str) -> Result<Option<DataFrame>> {
        match StatementKind::classify(sql) {
            StatementKind::Read => self.query(sql).map(Some),
            StatementKind::Write => {
                if let Err(e) = self.engine.execute_script(sql) {
                    // statements before the failing one are already committed
                    if let Err(sync) = self.refresh() {
                        warn!(error = %sync, "Could not sync tables after a failed script");
                    }
                    return Err(e.context(format!("could not run statement: {}", sql)));
                }
                info!(sql, "Statement executed");
                self.record(sql.to_string());
                self.refresh()?;
                Ok(None)
            }
        }
    }

    /// Runs a read statement and returns every row
    pub fn query(&self, sql: &str) -> Result<DataFrame> {
        self.engine
            .query(sql, &[])
            .map_err(|e| e.context(format!("could not execute query: {}", sql)))
    }

    /// Registers several tables at once, see [`TableData`] for how names are paired
    pub fn add_tables(&mut self, data: TableData, names: &[&str]) -> Result<()> {
        let pairs = data.resolve(names)?;
        for (name, _) in &pairs {
            statement::validate_identifier(name)
                .map_err(|e| Error::Type(format!("invalid table name {:?}: {}", name, e)))?;
        }

        for (name, source) in pairs {
            let dataset = match source {
                TableSource::Frame(df) => df,
                TableSource::Path(path) if path.is_file() => {
                    DataFrame::read_csv(&path, &self.options.csv)?
                }
                TableSource::Path(path) => {
                    return Err(Error::Type(format!(
                        "{} is neither a data frame nor a delimited file",
                        path.display()
                    )));
                }
            };
            self.register(name, dataset)?;
        }
        Ok(())
    }

    pub fn add_table(&mut self, name: &str, source: impl Into<TableSource>) -> Result<()> {
        self.add_tables(TableData::Map(vec![(name.to_string(), source.into())]), &[])
    }

    /// Creates the physical table for a frame and loads its rows in one transaction
    fn register(&mut self, name: String, dataset: DataFrame) -> Result<()> {
        let types = dataset.column_types();
        let columns: Vec<(&str, &str)> = dataset
            .columns()
            .iter()
            .zip(&types)
            .map(|(c, t)| (c.as_str(), t.sql_type()))
            .collect();
        let create = statement::create_table(&name, &columns)?;
        let insert = statement::insert(&name, dataset.columns());

        {
            let mut statements: Vec<(&str, Vec<&Value>)> = vec![(create.as_str(), Vec::new())];
            statements.extend(
                dataset
                    .rows()
                    .iter()
                    .map(|row| (insert.as_str(), row.iter().collect())),
            );
            self.engine
                .begin()
                .and_then(|txn| apply(txn, &statements))
                .map_err(|e| e.context(format!("could not create table {}", name)))?;
        }

        self.record(create);
        for record in dataset.to_records() {
            self.record(statement::insert_literal(&name, &record));
        }
        let stored = self.query(&statement::select_all(&name))?;
        let (rows, cols) = stored.shape();
        info!(table = %name, rows, cols, "Registered table");
        self.tables.push(TableHandle::new(name, stored));
        Ok(())
    }

    pub fn rename_table(&mut self, old: &str, new: &str) -> Result<()> {
        statement::validate_identifier(new)?;
        let idx = self.position(old)?;
        let sql = statement::rename_table(old, new);
        self.engine
            .execute_script(&sql)
            .map_err(|e| e.context(format!("could not rename table {}", old)))?;

        self.record(sql);
        self.tables[idx].name = new.to_string();
        info!(from = old, to = new, "Renamed table");
        Ok(())
    }

    pub fn drop_table(&mut self, name: &str) -> Result<()> {
        let sql = statement::drop_table(name);
        let idx = self
            .position(name)
            .and_then(|idx| self.engine.execute_script(&sql).map(|_| idx))
            .map_err(|e| e.context(format!("could not drop table {}", name)))?;

        self.record(sql);
        self.tables.remove(idx);
        info!(table = name, "Dropped table");
        Ok(())
    }

    /// Creates an empty table from (column name, type clause) pairs
    ///
    /// Type clauses are passed through verbatim, constraints included.
    pub fn create_table<N, T>(&mut self, name: &str, columns: &[(N, T)]) -> Result<()>
    where
        N: AsRef<str>,
        T: AsRef<str>,
    {
        let sql = statement::create_table(name, columns)?;
        self.engine
            .execute_script(&sql)
            .map_err(|e| e.context(format!("could not create table {}", name)))?;

        self.record(sql);
        let dataset = DataFrame::with_columns(columns.iter().map(|(c, _)| c.as_ref()));
        self.tables.push(TableHandle::new(name, dataset));
        info!(table = name, "Created table");
        Ok(())
    }

    /// Inserts one record or every row of a frame
    ///
    /// All rows go in one transaction; the cached rows are reloaded only after it commits.
    pub fn insert_data(&mut self, name: &str, data: impl Into<InsertData>) -> Result<()> {
        let idx = self.position(name)?;
        let frame = match data.into() {
            InsertData::Row(record) => DataFrame::from_records(&[record]),
            InsertData::Frame(df) => df,
        };

        let sql = statement::insert(name, frame.columns());
        {
            let statements: Vec<(&str, Vec<&Value>)> = frame
                .rows()
                .iter()
                .map(|row| (sql.as_str(), row.iter().collect()))
                .collect();
            self.engine
                .begin()
                .and_then(|txn| apply(txn, &statements))
                .map_err(|e| e.context(format!("could not insert values into table {}", name)))?;
        }

        debug!(table = name, rows = frame.shape().0, "Inserted rows");
        for record in frame.to_records() {
            self.record(statement::insert_literal(name, &record));
        }
        // the engine fills defaults and rowids and applies column affinity
        self.tables[idx].dataset = self.query(&statement::select_all(name))?;
        Ok(())
    }

    /// Equivalent to `SELECT * FROM name`
    pub fn show_all(&self, name: &str) -> Result<DataFrame> {
        self.query(&statement::select_all(name))
    }

    /// At most `limit` rows of a table, skipping the first `offset`
    pub fn show_range(&self, name: &str, offset: usize, limit: usize) -> Result<DataFrame> {
        let sql = statement::select_range(name);
        let params = [Value::try_from(limit)?, Value::try_from(offset)?];
        self.engine
            .query(&sql, &params)
            .map_err(|e| e.context(format!("could not execute query: {}", sql)))
    }

    /// Deletes every row of a table, keeping its columns
    pub fn truncate_table(&mut self, name: &str) -> Result<()> {
        let idx = self.position(name)?;
        let sql = statement::delete_all(name);
        self.engine
            .execute_script(&sql)
            .map_err(|e| e.context(format!("could not truncate table {}", name)))?;

        self.record(sql);
        self.tables[idx].dataset.clear();
        info!(table = name, "Truncated table");
        Ok(())
    }

    /// Syncs the registry with the engine's tables
    ///
    /// Handles of vanished tables are dropped, new tables get a handle, and
    /// every cached dataset is reloaded.
    pub fn refresh(&mut self) -> Result<()> {
        let live = self
            .engine
            .table_names()
            .map_err(|e| e.context("could not list tables"))?;
        self.tables.retain(|t| {
            let keep = live.contains(&t.name);
            if !keep {
                debug!(table = %t.name, "Table no longer in engine, unregistering");
            }
            keep
        });

        for name in live {
            let dataset = self.query(&statement::select_all(&name))?;
            match self.tables.iter_mut().find(|t| t.name == name) {
                Some(handle) => handle.dataset = dataset,
                None => {
                    debug!(table = %name, "New table in engine, registering");
                    self.tables.push(TableHandle::new(name, dataset));
                }
            }
        }
        Ok(())
    }

    /// Statements that changed the database, oldest first
    pub fn history(&self) -> impl Iterator<Item = &str> {
        self.history.iter().map(String::as_str)
    }

    fn record(&mut self, sql: String) {
        let capacity = self.options.history_capacity;
        if capacity == 0 {
            return;
        }
        while self.history.len() >= capacity {
            self.history.pop_front();
        }
        self.history.push_back(sql);
    }

    /// Closes the engine connection, reporting any failure
    pub fn close(self) -> Result<()> {
        info!(name = ?self.name, "Database session closed");
        self.engine.close()
    }
}

/// Executes the statements in order and commits; any failure rolls everything back
fn apply<T: Transaction>(mut txn: T, statements: &[(&str, Vec<&Value>)]) -> Result<()> {
    for (sql, params) in statements {
        txn.execute(sql, params)?;
    }
    txn.commit()
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::{Database, InsertData, TableData, TableSource};
    use crate::{
        config::DatabaseOptions,
        error::{Error, Result},
        frame::DataFrame,
        sql::types::Value,
    };

    fn people() -> Result<DataFrame> {
        DataFrame::new(
            vec!["name".into(), "age".into()],
            vec![
                vec!["tom".into(), 10.into()],
                vec!["bob".into(), 15.into()],
                vec!["juli".into(), 14.into()],
            ],
        )
    }

    fn with_people(name: &str) -> Result<Database> {
        Database::with_tables(
            TableData::list([people()?]),
            &[name],
            DatabaseOptions::default(),
        )
    }

    #[test]
    fn test_init_no_parameters() -> Result<()> {
        let db = Database::new()?;
        assert_eq!(db.name(), None);
        assert!(db.tables().is_empty());

        let db = Database::with_options(DatabaseOptions::named("name_of_db"))?;
        assert_eq!(db.name(), Some("name_of_db"));
        assert!(db.tables().is_empty());

        let mut db = db;
        db.set_name(None);
        assert_eq!(db.name(), None);
        db.close()
    }

    #[test]
    fn test_lookup() -> Result<()> {
        let db = with_people("example_table")?;
        assert_eq!(db.lookup("example_table")?.shape(), (3, 2));
        assert!(matches!(db.lookup("missing"), Err(Error::NotFound(_))));
        Ok(())
    }

    #[test]
    fn test_remove() -> Result<()> {
        let mut db = with_people("example_table")?;
        let handle = db.remove("example_table")?;
        assert_eq!(handle.name, "example_table");
        assert!(db.tables().is_empty());
        assert!(matches!(db.lookup("example_table"), Err(Error::NotFound(_))));
        assert!(matches!(db.remove("example_table"), Err(Error::NotFound(_))));

        // the engine still has the table
        assert_eq!(db.show_all("example_table")?.shape(), (3, 2));
        Ok(())
    }

    #[test]
    fn test_summary() -> Result<()> {
        let mut db = with_people("example_table")?;
        db.create_table("empty", &[("id", "INTEGER")])?;
        let df = db.summary()?;
        assert_eq!(df.columns(), &["Table Name", "Rows", "Columns"]);
        assert_eq!(
            df.rows(),
            &[
                vec![Value::from("example_table"), Value::Integer(3), Value::Integer(2)],
                vec![Value::from("empty"), Value::Integer(0), Value::Integer(1)],
            ]
        );
        assert_eq!(db.describe_schema(None)?, df);
        Ok(())
    }

    #[test]
    fn test_describe_schema() -> Result<()> {
        let mut db = with_people("example_table")?;
        let df = db.describe_schema(Some("example_table"))?;
        assert_eq!(
            df.columns(),
            &["Column ID", "Name", "Type", "Not NULL?", "Default Value", "Primary Key?"]
        );
        assert_eq!(df.shape(), (2, 6));
        assert_eq!(df.get(1, "Name"), Some(&Value::from("age")));
        assert_eq!(df.get(1, "Type"), Some(&Value::from("INTEGER")));
        assert_eq!(df.get(0, "Not NULL?"), Some(&Value::Boolean(false)));
        assert_eq!(df.get(0, "Primary Key?"), Some(&Value::from("No")));

        db.create_table("t1", &[("id", "INTEGER PRIMARY KEY"), ("label", "TEXT")])?;
        let df = db.describe_schema(Some("t1"))?;
        assert_eq!(df.get(0, "Primary Key?"), Some(&Value::from("Yes")));
        assert_eq!(df.get(1, "Primary Key?"), Some(&Value::from("No")));

        assert!(matches!(
            db.describe_schema(Some("table_does_not_exist")),
            Err(Error::NotFound(_))
        ));
        Ok(())
    }

    #[test]
    fn test_execute() -> Result<()> {
        let mut db = with_people("example_table")?;
        let df = db.execute("  select * from example_table")?;
        assert_eq!(df.map(|d| d.shape()), Some((3, 2)));

        let df = db.execute("PRAGMA TABLE_INFO('example_table')")?;
        assert!(df.is_some_and(|d| !d.is_empty()));

        assert!(db.execute("CREATE TABLE made (a INTEGER, b TEXT)")?.is_none());
        assert_eq!(db.lookup("made")?.shape(), (0, 2));

        assert!(db.execute("INSERT INTO made VALUES (1, 'x'); INSERT INTO made VALUES (2, 'y');")?.is_none());
        assert_eq!(db.lookup("made")?.shape(), (2, 2));

        db.execute("DROP TABLE made")?;
        assert!(matches!(db.lookup("made"), Err(Error::NotFound(_))));
        assert_eq!(db.tables().len(), 1);
        Ok(())
    }

    #[test]
    fn test_execute_cte_write() -> Result<()> {
        let mut db = Database::new()?;
        db.create_table("made", &[("a", "INTEGER")])?;

        let res = db.execute("WITH x AS (SELECT 1) INSERT INTO made SELECT * FROM x")?;
        assert!(res.is_none());
        assert_eq!(db.show_all("made")?.shape(), (1, 1));
        assert_eq!(db.lookup("made")?.shape(), (1, 1));
        assert_eq!(
            db.history().last(),
            Some("WITH x AS (SELECT 1) INSERT INTO made SELECT * FROM x")
        );

        let df = db.execute("WITH x AS (SELECT a FROM made) SELECT a + 1 AS b FROM x")?;
        assert_eq!(df.and_then(|d| d.get(0, "b").cloned()), Some(Value::Integer(2)));
        Ok(())
    }

    #[test]
    fn test_execute_partial_script_syncs() -> Result<()> {
        let mut db = Database::new()?;
        let res = db.execute("CREATE TABLE z (a INTEGER); INSERT INTO z VALUES (1); SELEC bad;");
        assert!(matches!(res, Err(Error::Execution { source: Some(_), .. })));

        // the statements before the failure are committed and registered
        assert_eq!(db.show_all("z")?.shape(), (1, 1));
        assert_eq!(db.lookup("z")?.shape(), (1, 1));
        Ok(())
    }

    #[test]
    fn test_execute_wrong_syntax() -> Result<()> {
        let mut db = with_people("example_table")?;
        assert!(matches!(
            db.execute("SELECT * FROMMMMM example_table"),
            Err(Error::Execution { .. })
        ));
        assert!(matches!(
            db.execute("DELETE FROMMMMM example_table"),
            Err(Error::Execution { source: Some(_), .. })
        ));
        assert!(db.query("SELECT * FROMMMMM example_table").is_err());
        assert!(!db.query("SELECT * FROM example_table")?.is_empty());
        Ok(())
    }

    #[test]
    fn test_add_tables_list() -> Result<()> {
        let mut db = Database::new()?;
        let other = DataFrame::new(vec!["x".into()], vec![vec![1.5.into()]])?;
        db.add_tables(TableData::list([people()?, other]), &["t1", "t2", "extra"])?;
        assert_eq!(db.lookup("t1")?.shape(), (3, 2));
        assert_eq!(db.lookup("t2")?.shape(), (1, 1));
        assert_eq!(db.tables().len(), 2);

        let rows = db.show_all("t2")?;
        assert_eq!(rows.get(0, "x"), Some(&Value::Float(1.5)));
        Ok(())
    }

    #[test]
    fn test_add_tables_size_mismatch() -> Result<()> {
        let mut db = Database::new()?;
        let res = db.add_tables(TableData::list([people()?]), &[]);
        assert!(matches!(res, Err(Error::Value(_))));
        assert!(db.tables().is_empty());
        Ok(())
    }

    #[test]
    fn test_add_tables_empty() -> Result<()> {
        let mut db = Database::new()?;
        db.add_tables(TableData::Empty, &[])?;
        db.add_tables(TableData::Empty, &["example_table"])?;
        db.add_tables(TableData::list(Vec::<DataFrame>::new()), &[])?;
        assert!(db.tables().is_empty());
        Ok(())
    }

    #[test]
    fn test_add_tables_map() -> Result<()> {
        let mut db = Database::new()?;
        db.add_tables(TableData::map([("example_table", people()?)]), &[])?;
        assert_eq!(db.lookup("example_table")?.shape(), (3, 2));

        // enough names: names replace the keys
        db.add_tables(TableData::map([("ignored", people()?)]), &["renamed", "spare"])?;
        assert!(db.lookup("renamed").is_ok());
        assert!(db.lookup("ignored").is_err());

        // not enough names: keys are kept
        db.add_tables(
            TableData::map([("k1", people()?), ("k2", people()?)]),
            &["only_one"],
        )?;
        assert!(db.lookup("k1").is_ok());
        assert!(db.lookup("k2").is_ok());
        assert!(db.lookup("only_one").is_err());
        Ok(())
    }

    #[test]
    fn test_add_tables_bad_name() -> Result<()> {
        let mut db = Database::new()?;
        let res = db.add_tables(TableData::map([("", people()?)]), &[]);
        assert!(matches!(res, Err(Error::Type(_))));
        Ok(())
    }

    #[test]
    fn test_add_tables_duplicate_name() -> Result<()> {
        let mut db = with_people("example_table")?;
        let res = db.add_table("example_table", people()?);
        assert!(matches!(res, Err(Error::Execution { .. })));
        assert_eq!(db.tables().len(), 1);
        Ok(())
    }

    #[test]
    fn test_add_tables_from_csv() -> Result<()> {
        let mut file = tempfile::NamedTempFile::new()?;
        writeln!(file, "name,age")?;
        writeln!(file, "tom,10")?;
        writeln!(file, "bob,15")?;
        file.flush()?;

        let mut db = Database::new()?;
        db.add_tables(TableData::list([TableSource::path(file.path())]), &["from_csv"])?;
        assert_eq!(db.lookup("from_csv")?.shape(), (2, 2));

        let rows = db.execute("SELECT SUM(age) AS total FROM from_csv")?;
        assert_eq!(
            rows.and_then(|d| d.get(0, "total").cloned()),
            Some(Value::Integer(25))
        );

        let res = db.add_table("nope", TableSource::path("/definitely/not/here.csv"));
        assert!(matches!(res, Err(Error::Type(_))));
        Ok(())
    }

    #[test]
    fn test_rename_table() -> Result<()> {
        let mut db = with_people("table_1")?;
        db.rename_table("table_1", "table_1_new_name")?;
        assert_eq!(db.lookup("table_1_new_name")?.name, "table_1_new_name");
        assert!(matches!(db.lookup("table_1"), Err(Error::NotFound(_))));
        assert_eq!(db.tables().len(), 1);
        assert_eq!(db.show_all("table_1_new_name")?.shape(), (3, 2));
        Ok(())
    }

    #[test]
    fn test_rename_table_invalid() -> Result<()> {
        let mut db = with_people("table_1")?;
        assert!(matches!(db.rename_table("table_1", ""), Err(Error::Value(_))));
        assert!(matches!(db.rename_table("table_1", "a\0b"), Err(Error::Type(_))));
        assert!(matches!(
            db.rename_table("some_table_name_that_doesnt_exist", "new_name"),
            Err(Error::NotFound(_))
        ));
        Ok(())
    }

    #[test]
    fn test_drop_table() -> Result<()> {
        let mut db = with_people("table_1")?;
        db.create_table("table_2", &[("a", "TEXT")])?;
        db.drop_table("table_1")?;
        assert_eq!(db.tables().len(), 1);
        assert!(db.lookup("table_1").is_err());
        assert!(db.show_all("table_1").is_err());

        let err = db.drop_table("table_1").unwrap_err();
        assert!(matches!(err, Error::Execution { .. }));
        assert_eq!(err.to_string(), "could not drop table table_1");
        Ok(())
    }

    #[test]
    fn test_create_insert_show() -> Result<()> {
        let mut db = Database::new()?;
        db.create_table("t1", &[("id", "INTEGER"), ("label", "TEXT")])?;
        assert_eq!(db.lookup("t1")?.shape(), (0, 2));

        db.insert_data(
            "t1",
            vec![("id".to_string(), Value::Integer(1)), ("label".to_string(), Value::from("a"))],
        )?;
        let df = db.show_all("t1")?;
        assert_eq!(df.rows(), &[vec![Value::Integer(1), Value::from("a")]]);
        assert_eq!(db.lookup("t1")?.shape(), (1, 2));
        Ok(())
    }

    #[test]
    fn test_insert_frame() -> Result<()> {
        let mut db = with_people("example_table")?;
        let more = DataFrame::new(
            vec!["age".into(), "name".into()],
            vec![vec![20.into(), "ann".into()], vec![Value::Null, "o'neil".into()]],
        )?;
        db.insert_data("example_table", more)?;
        assert_eq!(db.show_all("example_table")?.shape(), (5, 2));
        assert_eq!(db.lookup("example_table")?.shape(), (5, 2));

        let cached = &db.lookup("example_table")?.dataset;
        assert_eq!(cached.get(4, "name"), Some(&Value::from("o'neil")));
        assert_eq!(cached.get(4, "age"), Some(&Value::Null));
        Ok(())
    }

    #[test]
    fn test_insert_engine_filled_columns() -> Result<()> {
        let mut db = Database::new()?;
        db.create_table(
            "t1",
            &[("id", "INTEGER PRIMARY KEY"), ("label", "TEXT DEFAULT 'x'"), ("n", "TEXT")],
        )?;
        db.insert_data("t1", vec![("n".to_string(), Value::from("a"))])?;

        let expected = vec![vec![Value::Integer(1), Value::from("x"), Value::from("a")]];
        assert_eq!(db.show_all("t1")?.rows(), expected.as_slice());
        assert_eq!(db.lookup("t1")?.dataset.rows(), expected.as_slice());

        db.create_table("flags", &[("on", "INTEGER")])?;
        db.insert_data("flags", vec![("on".to_string(), Value::Boolean(true))])?;
        assert_eq!(db.lookup("flags")?.dataset, db.show_all("flags")?);
        assert_eq!(db.lookup("flags")?.dataset.get(0, "on"), Some(&Value::Integer(1)));
        Ok(())
    }

    #[test]
    fn test_registered_snapshot_matches_engine() -> Result<()> {
        let mut db = Database::new()?;
        let flags = DataFrame::new(
            vec!["name".into(), "on".into()],
            vec![vec!["a".into(), true.into()], vec!["b".into(), Value::Null]],
        )?;
        db.add_table("flags", flags)?;
        assert_eq!(db.lookup("flags")?.dataset, db.show_all("flags")?);
        assert_eq!(db.lookup("flags")?.dataset.get(0, "on"), Some(&Value::Integer(1)));
        Ok(())
    }

    #[test]
    fn test_insert_failure_keeps_snapshot() -> Result<()> {
        let mut db = Database::new()?;
        db.create_table("t1", &[("id", "INTEGER PRIMARY KEY"), ("label", "TEXT NOT NULL")])?;

        let bad = DataFrame::new(
            vec!["id".into(), "label".into()],
            vec![vec![1.into(), "a".into()], vec![2.into(), Value::Null]],
        )?;
        assert!(matches!(db.insert_data("t1", bad), Err(Error::Execution { .. })));
        assert_eq!(db.show_all("t1")?.shape(), (0, 2));
        assert_eq!(db.lookup("t1")?.shape(), (0, 2));

        let unknown_column = vec![("nope".to_string(), Value::Integer(1))];
        assert!(db.insert_data("t1", unknown_column).is_err());
        assert_eq!(db.lookup("t1")?.shape(), (0, 2));

        assert!(matches!(
            db.insert_data("missing", InsertData::Row(Vec::new())),
            Err(Error::NotFound(_))
        ));
        Ok(())
    }

    #[test]
    fn test_show_range_and_truncate() -> Result<()> {
        let mut db = with_people("example_table")?;
        let df = db.show_range("example_table", 1, 5)?;
        assert_eq!(df.shape(), (2, 2));
        assert_eq!(df.get(0, "name"), Some(&Value::from("bob")));
        assert!(matches!(
            db.show_range("example_table", 0, usize::MAX),
            Err(Error::Value(_))
        ));

        db.truncate_table("example_table")?;
        assert_eq!(db.lookup("example_table")?.shape(), (0, 2));
        assert!(db.show_all("example_table")?.is_empty());
        Ok(())
    }

    #[test]
    fn test_history() -> Result<()> {
        let options = DatabaseOptions {
            history_capacity: 2,
            ..DatabaseOptions::default()
        };
        let mut db = Database::with_options(options)?;
        db.create_table("t", &[("a", "TEXT")])?;
        db.insert_data("t", vec![("a".to_string(), Value::from("it's"))])?;
        db.truncate_table("t")?;
        assert_eq!(
            db.history().collect::<Vec<_>>(),
            vec![
                "INSERT INTO \"t\" (\"a\") VALUES ('it''s');",
                "DELETE FROM \"t\";",
            ]
        );

        let mut quiet = Database::with_options(DatabaseOptions {
            history_capacity: 0,
            ..DatabaseOptions::default()
        })?;
        quiet.create_table("t", &[("a", "TEXT")])?;
        assert_eq!(quiet.history().count(), 0);

        // registered rows replay from the history
        let source = with_people("example_table")?;
        let mut replay = Database::new()?;
        for sql in source.history() {
            replay.execute(sql)?;
        }
        assert_eq!(replay.show_all("example_table")?, source.show_all("example_table")?);
        Ok(())
    }
}
