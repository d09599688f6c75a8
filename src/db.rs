//! The external interface to a live SQLite connection.
//!
//! The rewriter only ever needs three primitives from the host: run SQL
//! and get a scalar, run SQL and get a column of rows, and execute a
//! statement. Everything else (catalog reads, pragma state, hidden-column
//! metadata) is built on top as provided methods, so any connection or
//! framework handle can back the rewriter by implementing the three.

#[cfg(feature = "rusqlite")]
mod rusqlite;

use indexmap::IndexMap;

use crate::errors::Error;
use crate::sql::{quote_identifier, quote_string, split_schema};

/// Minimal database access needed by the schema rewriter.
pub trait SchemaDb {
    /// Execute `sql` and return the first column of the first row, or
    /// `None` when the result set is empty or the value is NULL.
    fn query_scalar(&self, sql: &str) -> Result<Option<String>, Error>;

    /// Execute `sql` and return the first column of every row.
    fn query_column(&self, sql: &str) -> Result<Vec<String>, Error>;

    /// Execute a statement, discarding any result.
    fn execute(&self, sql: &str) -> Result<(), Error>;

    /// Fetch the stored `CREATE TABLE` text for a (possibly
    /// schema-qualified, unquoted) table name.
    fn create_table_sql(&self, table: &str) -> Result<String, Error> {
        let (schema, name) = split_schema(table);
        let master = master_catalog(schema);
        let sql = format!(
            "SELECT sql FROM {master} WHERE tbl_name = {} AND type = 'table'",
            quote_string(name)
        );
        match self.query_scalar(&sql)? {
            Some(text) if !text.trim().is_empty() => Ok(text.trim().to_string()),
            _ => Err(Error::TableNotFound(table.to_string())),
        }
    }

    /// Fetch the stored `CREATE INDEX` definitions for a table, keyed by
    /// index name in catalog order. Auto-indexes (which have no stored
    /// SQL) are excluded.
    fn index_definitions(&self, table: &str) -> Result<IndexMap<String, String>, Error> {
        let (schema, name) = split_schema(table);
        let master = master_catalog(schema);
        let names = self.query_column(&format!(
            "SELECT name FROM {master} WHERE tbl_name = {} AND type = 'index' \
             AND sql IS NOT NULL ORDER BY rowid",
            quote_string(name)
        ))?;
        let mut defs = IndexMap::with_capacity(names.len());
        for index_name in names {
            let sql = self
                .query_scalar(&format!(
                    "SELECT sql FROM {master} WHERE name = {} AND type = 'index'",
                    quote_string(&index_name)
                ))?
                .ok_or_else(|| Error::IndexParse {
                    index: index_name.clone(),
                })?;
            defs.insert(index_name, sql);
        }
        Ok(defs)
    }

    /// Read the current `foreign_keys` pragma state.
    fn foreign_keys_state(&self) -> Result<bool, Error> {
        Ok(self.query_scalar("PRAGMA foreign_keys")?.as_deref() == Some("1"))
    }

    /// Set the `foreign_keys` pragma. Note that SQLite silently ignores
    /// this inside a transaction; callers verify by reading it back.
    fn set_foreign_keys_state(&self, on: bool) -> Result<(), Error> {
        self.execute(&format!("PRAGMA foreign_keys = {}", i32::from(on)))
    }

    /// Read the schema version counter from the database header of the
    /// given schema (`main` when `None`).
    fn schema_version(&self, schema: Option<&str>) -> Result<i64, Error> {
        let pragma = match schema {
            Some(schema) => format!("PRAGMA {}.schema_version", quote_identifier(schema)),
            None => "PRAGMA schema_version".to_owned(),
        };
        let value = self
            .query_scalar(&pragma)?
            .ok_or_else(|| Error::Database("PRAGMA schema_version returned no rows".into()))?;
        value
            .parse()
            .map_err(|_| Error::Database(format!("Unexpected schema_version value: {value}")))
    }

    /// The visible (non-hidden, non-generated) columns of a table in
    /// declaration order, via `pragma_table_info`.
    fn visible_columns(&self, table: &str) -> Result<Vec<String>, Error> {
        let (_, name) = split_schema(table);
        self.query_column(&format!(
            "SELECT name FROM pragma_table_info({}) ORDER BY cid",
            quote_string(name)
        ))
    }

    /// Column groups usable for upsert conflict detection: the primary
    /// key (if any) followed by every unique index, each as a list of
    /// column names.
    fn unique_constraint_columns(&self, table: &str) -> Result<Vec<Vec<String>>, Error> {
        let (_, name) = split_schema(table);
        let mut constraints = Vec::new();
        let pk = self.query_column(&format!(
            "SELECT name FROM pragma_table_info({}) WHERE pk > 0 ORDER BY pk",
            quote_string(name)
        ))?;
        if !pk.is_empty() {
            constraints.push(pk);
        }
        let unique_indexes = self.query_column(&format!(
            "SELECT name FROM pragma_index_list({}) WHERE \"unique\" = 1 AND origin <> 'pk'",
            quote_string(name)
        ))?;
        for index in unique_indexes {
            let columns = self.query_column(&format!(
                "SELECT name FROM pragma_index_info({}) ORDER BY seqno",
                quote_string(&index)
            ))?;
            if !columns.is_empty() {
                constraints.push(columns);
            }
        }
        Ok(constraints)
    }

    /// The SQLite library version string, e.g. `3.45.0`.
    fn server_version(&self) -> Result<String, Error> {
        self.query_scalar("SELECT sqlite_version()")?
            .ok_or_else(|| Error::Database("sqlite_version() returned no rows".into()))
    }
}

fn master_catalog(schema: Option<&str>) -> String {
    match schema {
        Some(schema) => format!("{}.sqlite_master", quote_identifier(schema)),
        None => "sqlite_master".to_string(),
    }
}

/// Connection-level configuration for the compatibility layer.
#[derive(Debug, Clone)]
pub struct Options {
    /// Whether to enable referential-integrity checks right after a
    /// connection opens. Defaults to `true`.
    pub foreign_key_checks: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            foreign_key_checks: true,
        }
    }
}

impl Options {
    /// Build options from the environment: setting
    /// `SQLITE_ALTER_DISABLE_FOREIGN_CHECKS` (to any value) suppresses
    /// the automatic `PRAGMA foreign_keys = 1` on open.
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            foreign_key_checks: std::env::var_os("SQLITE_ALTER_DISABLE_FOREIGN_CHECKS").is_none(),
        }
    }
}

/// Run the after-open bootstrap on a connection: enables the
/// `foreign_keys` pragma unless the options suppress it.
pub fn bootstrap<D: SchemaDb + ?Sized>(db: &D, options: &Options) -> Result<(), Error> {
    if options.foreign_key_checks {
        db.execute("PRAGMA foreign_keys = 1")?;
    } else {
        tracing::debug!("foreign_keys bootstrap suppressed by configuration");
    }
    Ok(())
}
