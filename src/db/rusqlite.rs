//! [`SchemaDb`] implementation backed by a live `rusqlite` connection.
//!
//! Gated behind the `rusqlite` feature.

use rusqlite::Connection;
use rusqlite::types::ValueRef;

use super::SchemaDb;
use crate::errors::Error;

fn db_err(err: rusqlite::Error) -> Error {
    Error::Database(err.to_string())
}

fn value_to_string(value: ValueRef<'_>) -> Option<String> {
    match value {
        ValueRef::Null => None,
        ValueRef::Integer(i) => Some(i.to_string()),
        ValueRef::Real(r) => Some(r.to_string()),
        ValueRef::Text(bytes) | ValueRef::Blob(bytes) => {
            Some(String::from_utf8_lossy(bytes).into_owned())
        }
    }
}

impl SchemaDb for Connection {
    fn query_scalar(&self, sql: &str) -> Result<Option<String>, Error> {
        let mut stmt = self.prepare(sql).map_err(db_err)?;
        let mut rows = stmt.query([]).map_err(db_err)?;
        match rows.next().map_err(db_err)? {
            Some(row) => Ok(value_to_string(row.get_ref(0).map_err(db_err)?)),
            None => Ok(None),
        }
    }

    fn query_column(&self, sql: &str) -> Result<Vec<String>, Error> {
        let mut stmt = self.prepare(sql).map_err(db_err)?;
        let mut rows = stmt.query([]).map_err(db_err)?;
        let mut out = Vec::new();
        while let Some(row) = rows.next().map_err(db_err)? {
            if let Some(value) = value_to_string(row.get_ref(0).map_err(db_err)?) {
                out.push(value);
            }
        }
        Ok(out)
    }

    fn execute(&self, sql: &str) -> Result<(), Error> {
        self.execute_batch(sql).map_err(db_err)
    }
}
