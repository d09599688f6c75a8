//! Primary-key constraint emulation.
//!
//! Adding a primary key appends a `CONSTRAINT ... PRIMARY KEY` clause
//! to the stored field block and rebuilds the table. There is no
//! reverse path: a rowid table's primary key cannot be removed without
//! deciding what happens to the rowid mapping, so dropping reports
//! unsupported at the entry point instead.

use crate::db::SchemaDb;
use crate::errors::Error;
use crate::sql::{quote_identifier, unquote_identifier};

use super::fields::{field_definition_tokens, render_field_block};
use super::indexes::rebuild_indexes;
use super::script::{rebuild_script, save_and_verify_foreign_keys};

pub(crate) fn add_primary_key<D: SchemaDb + ?Sized>(
    db: &D,
    name: &str,
    table: &str,
    columns: &[&str],
) -> Result<String, Error> {
    let fields = field_definition_tokens(db, table)?;
    let quoted_columns = columns
        .iter()
        .map(|column| quote_identifier(unquote_identifier(column)))
        .collect::<Vec<_>>()
        .join(", ");
    let mut fields_sql = render_field_block(&fields);
    fields_sql.push_str(&format!(
        ",\nCONSTRAINT {} PRIMARY KEY ({quoted_columns})",
        quote_identifier(name)
    ));
    let saved = save_and_verify_foreign_keys(db, "add_primary_key")?;
    let index_sqls = rebuild_indexes(db, table, None, None)?;
    Ok(rebuild_script(
        "add_primary_key",
        table,
        &fields_sql,
        "*",
        &index_sqls,
        saved,
    ))
}
