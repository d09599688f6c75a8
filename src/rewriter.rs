//! The schema-rewriting engine.
//!
//! SQLite cannot execute most `ALTER TABLE` forms directly, but it stores
//! every table's `CREATE TABLE` text in its own catalog. Each operation
//! here fetches that text, tokenizes it, surgically edits the token
//! stream, and regenerates a full table-replacement script: create a
//! shadow copy, drop the original, recreate it with the edited definition,
//! copy rows back, rebuild the surviving indexes. The script is wrapped in
//! a pragma-toggle/savepoint bracket so a failure inside it cannot corrupt
//! the caller's surrounding transaction.
//!
//! The rewriter never executes DDL itself; it only reads metadata and
//! returns the semicolon-joined script for the caller (typically a
//! migration runner) to execute.

mod alter_column;
mod drop_column;
mod fields;
mod foreign_key;
mod indexes;
mod primary_key;
mod rename_column;
mod script;

pub use foreign_key::ConstraintId;
pub use indexes::rebuild_indexes;

use crate::db::SchemaDb;
use crate::errors::Error;

/// Generates table-replacement scripts for schema edits SQLite cannot
/// express as a single `ALTER TABLE` statement.
///
/// Borrows a [`SchemaDb`] for metadata reads (stored DDL, pragma state,
/// index definitions); the generated scripts are returned as strings and
/// never executed by the rewriter itself.
pub struct SchemaRewriter<'a, D: SchemaDb> {
    db: &'a D,
}

impl<'a, D: SchemaDb> SchemaRewriter<'a, D> {
    /// Create a rewriter over the given connection.
    #[must_use]
    pub fn new(db: &'a D) -> Self {
        Self { db }
    }

    /// Build the script that drops `column` from `table`, rebuilding the
    /// table without it and dropping every index that references it.
    pub fn drop_column(&self, table: &str, column: &str) -> Result<String, Error> {
        drop_column::drop_column(self.db, table, column)
    }

    /// Build the script that renames `old` to `new` in `table` by
    /// rewriting the stored catalog entry in place and bumping the
    /// schema version, then re-creating affected indexes under the new
    /// column name.
    pub fn rename_column(&self, table: &str, old: &str, new: &str) -> Result<String, Error> {
        rename_column::rename_column(self.db, table, old, new)
    }

    /// Build the script that changes the declared type of `column`,
    /// leaving every other field untouched.
    pub fn alter_column(&self, table: &str, column: &str, new_type: &str) -> Result<String, Error> {
        alter_column::alter_column(self.db, table, column, new_type)
    }

    /// Build the script that appends a named foreign-key constraint.
    ///
    /// Cross-schema references return an empty script (with a logged
    /// notice) since SQLite does not support foreign keys across
    /// attached databases.
    #[allow(clippy::too_many_arguments)]
    pub fn add_foreign_key(
        &self,
        name: &str,
        table: &str,
        columns: &[&str],
        ref_table: &str,
        ref_columns: &[&str],
        on_delete: Option<&str>,
        on_update: Option<&str>,
    ) -> Result<String, Error> {
        foreign_key::add_foreign_key(
            self.db,
            name,
            table,
            columns,
            ref_table,
            ref_columns,
            on_delete,
            on_update,
        )
    }

    /// Build the script that drops a foreign-key constraint, identified
    /// by declared name or by ordinal position among the table's
    /// constraints in declaration order.
    pub fn drop_foreign_key(&self, id: ConstraintId<'_>, table: &str) -> Result<String, Error> {
        foreign_key::drop_foreign_key(self.db, id, table)
    }

    /// Build the script that appends a named primary-key constraint to
    /// an existing table.
    pub fn add_primary_key(
        &self,
        name: &str,
        table: &str,
        columns: &[&str],
    ) -> Result<String, Error> {
        primary_key::add_primary_key(self.db, name, table, columns)
    }

    /// SQLite has no emulation path for removing a primary key.
    pub fn drop_primary_key(&self, _name: &str, _table: &str) -> Result<String, Error> {
        Err(Error::Unsupported {
            operation: "drop_primary_key",
        })
    }

    /// SQLite has no emulation path for adding a check constraint.
    pub fn add_check(&self, _name: &str, _table: &str, _expression: &str) -> Result<String, Error> {
        Err(Error::Unsupported {
            operation: "add_check",
        })
    }

    /// SQLite has no emulation path for dropping a check constraint.
    pub fn drop_check(&self, _name: &str, _table: &str) -> Result<String, Error> {
        Err(Error::Unsupported {
            operation: "drop_check",
        })
    }

    /// SQLite has no emulation path for adding a column default.
    pub fn add_default_value(
        &self,
        _name: &str,
        _table: &str,
        _column: &str,
        _value: &str,
    ) -> Result<String, Error> {
        Err(Error::Unsupported {
            operation: "add_default_value",
        })
    }

    /// SQLite has no emulation path for dropping a column default.
    pub fn drop_default_value(&self, _name: &str, _table: &str) -> Result<String, Error> {
        Err(Error::Unsupported {
            operation: "drop_default_value",
        })
    }

    /// SQLite has no column comments.
    pub fn add_comment_on_column(
        &self,
        _table: &str,
        _column: &str,
        _comment: &str,
    ) -> Result<String, Error> {
        Err(Error::Unsupported {
            operation: "add_comment_on_column",
        })
    }

    /// SQLite has no table comments.
    pub fn add_comment_on_table(&self, _table: &str, _comment: &str) -> Result<String, Error> {
        Err(Error::Unsupported {
            operation: "add_comment_on_table",
        })
    }
}
