//! Shared harness: a [`SchemaDb`] adapter over an in-memory rusqlite
//! connection plus a few catalog-inspection helpers.

use rusqlite::types::ValueRef;
use rusqlite::Connection;
use sqlite_alter_rs::{Error, SchemaDb};

pub struct TestDb(pub Connection);

impl TestDb {
    pub fn new() -> Self {
        Self(Connection::open_in_memory().expect("open in-memory database"))
    }

    pub fn batch(&self, sql: &str) {
        self.0.execute_batch(sql).expect("execute batch");
    }

    /// Column names of `table` in declaration order.
    pub fn columns(&self, table: &str) -> Vec<String> {
        let mut stmt = self
            .0
            .prepare("SELECT name FROM pragma_table_info(?1) ORDER BY cid")
            .expect("prepare");
        let rows = stmt
            .query_map([table], |row| row.get::<_, String>(0))
            .expect("query");
        rows.collect::<Result<_, _>>().expect("collect")
    }

    pub fn count(&self, table: &str) -> i64 {
        self.0
            .query_row(&format!("SELECT COUNT(*) FROM \"{table}\""), [], |row| {
                row.get(0)
            })
            .expect("count")
    }

    /// Names of the indexes on `table` that have stored SQL.
    pub fn index_names(&self, table: &str) -> Vec<String> {
        let mut stmt = self
            .0
            .prepare(
                "SELECT name FROM sqlite_master \
                 WHERE type = 'index' AND tbl_name = ?1 AND sql IS NOT NULL \
                 ORDER BY name",
            )
            .expect("prepare");
        let rows = stmt
            .query_map([table], |row| row.get::<_, String>(0))
            .expect("query");
        rows.collect::<Result<_, _>>().expect("collect")
    }

    /// `(from_table, from_column, to_column)` rows of `pragma foreign_key_list`.
    pub fn foreign_keys(&self, table: &str) -> Vec<(String, String, String)> {
        let mut stmt = self
            .0
            .prepare("SELECT \"table\", \"from\", \"to\" FROM pragma_foreign_key_list(?1)")
            .expect("prepare");
        let rows = stmt
            .query_map([table], |row| {
                Ok((row.get(0)?, row.get(1)?, row.get(2)?))
            })
            .expect("query");
        rows.collect::<Result<_, _>>().expect("collect")
    }
}

fn db_err(e: rusqlite::Error) -> Error {
    Error::Database(e.to_string())
}

fn value_to_string(value: ValueRef<'_>) -> Option<String> {
    match value {
        ValueRef::Null => None,
        ValueRef::Integer(i) => Some(i.to_string()),
        ValueRef::Real(r) => Some(r.to_string()),
        ValueRef::Text(t) => Some(String::from_utf8_lossy(t).into_owned()),
        ValueRef::Blob(b) => Some(String::from_utf8_lossy(b).into_owned()),
    }
}

impl SchemaDb for TestDb {
    fn query_scalar(&self, sql: &str) -> Result<Option<String>, Error> {
        let mut stmt = self.0.prepare(sql).map_err(db_err)?;
        let mut rows = stmt.query([]).map_err(db_err)?;
        match rows.next().map_err(db_err)? {
            Some(row) => Ok(value_to_string(row.get_ref(0).map_err(db_err)?)),
            None => Ok(None),
        }
    }

    fn query_column(&self, sql: &str) -> Result<Vec<String>, Error> {
        let mut stmt = self.0.prepare(sql).map_err(db_err)?;
        let mut rows = stmt.query([]).map_err(db_err)?;
        let mut values = Vec::new();
        while let Some(row) = rows.next().map_err(db_err)? {
            if let Some(value) = value_to_string(row.get_ref(0).map_err(db_err)?) {
                values.push(value);
            }
        }
        Ok(values)
    }

    fn execute(&self, sql: &str) -> Result<(), Error> {
        self.0.execute_batch(sql).map_err(db_err)
    }
}
