//! Submodule defining the errors used across the crate.

use crate::sql::ParseError;

/// Errors that can occur while rewriting schema DDL or building queries.
///
/// None of these are caught or retried internally; every failure aborts
/// the whole operation before any destructive statement is emitted.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// The stored definition of the table is missing or unreadable.
    #[error("Table not found: {0}")]
    TableNotFound(String),

    /// The column targeted by an edit was never matched while walking
    /// the field-definition tokens.
    #[error("Column '{column}' not found in table '{table}'")]
    ColumnNotFound {
        /// The table that was walked.
        table: String,
        /// The column that was never matched.
        column: String,
    },

    /// The constraint targeted by a drop was never matched, neither by
    /// name nor by ordinal position.
    #[error("Foreign key constraint '{constraint}' not found in table '{table}'")]
    ConstraintNotFound {
        /// The table that was walked.
        table: String,
        /// The requested constraint name or position.
        constraint: String,
    },

    /// Turning the `foreign_keys` pragma off did not take effect,
    /// which happens when the connection is already inside a
    /// transaction. Detected before any destructive statement is
    /// generated.
    #[error(
        "Unable to disable foreign_keys in {operation}, probably due to being inside a \
         transaction; set SQLITE_ALTER_DISABLE_FOREIGN_CHECKS=1 to run with checks off"
    )]
    ForeignKeyDisableFailed {
        /// The schema-edit operation that required the toggle.
        operation: &'static str,
    },

    /// The operation has no emulation path on SQLite.
    #[error("{operation} is not supported by SQLite")]
    Unsupported {
        /// The unsupported operation.
        operation: &'static str,
    },

    /// The stored `CREATE TABLE` text did not have the expected shape.
    #[error("Unexpected structure in stored CREATE TABLE for '{table}'")]
    SchemaParse {
        /// The table whose definition failed to match.
        table: String,
    },

    /// A stored `CREATE INDEX` statement did not have the expected
    /// `CREATE INDEX ... ON ... (...)` shape.
    #[error("Unexpected structure in index definition '{index}'")]
    IndexParse {
        /// The index whose definition failed to match.
        index: String,
    },

    /// The tokenizer or a token walker rejected the input.
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// The underlying database reported an error on a metadata read.
    #[error("Database error: {0}")]
    Database(String),
}
