//! Script assembly shared by every rewrite operation.

use crate::db::SchemaDb;
use crate::errors::Error;
use crate::sql::quote_table;

/// Savepoint identifier for an operation on a table. Schema dots would
/// break the savepoint name, so they become underscores.
pub(crate) fn savepoint_name(operation: &str, table: &str) -> String {
    format!("{operation}_{}", table.replace('.', "_"))
}

/// Read the current `foreign_keys` pragma and verify it can actually be
/// toggled, returning the saved state for the script to restore.
///
/// The pragma is a no-op inside an open transaction, in which case the
/// rebuild script would run with enforcement still active and fail
/// half-way through dropping the table. Probing here turns that into a
/// clean error before anything destructive runs. The probe restores the
/// saved state, so the connection is unchanged whether or not the
/// caller ever executes the script.
pub(crate) fn save_and_verify_foreign_keys<D: SchemaDb + ?Sized>(
    db: &D,
    operation: &'static str,
) -> Result<bool, Error> {
    let saved = db.foreign_keys_state()?;
    if saved {
        db.set_foreign_keys_state(false)?;
        if db.foreign_keys_state()? {
            return Err(Error::ForeignKeyDisableFailed { operation });
        }
        db.set_foreign_keys_state(true)?;
    }
    Ok(saved)
}

/// Assemble the full-table-rebuild script around an edited field block.
///
/// The rebuild goes through a shadow copy of the table's rows: copy the
/// data out, drop and recreate the table from `fields_sql`, copy the
/// rows back through `copy_columns` (or `*` when the column set is
/// unchanged), then re-issue the index DDL in `index_sqls`. Everything
/// between the savepoint and its release either completes or rolls back
/// as a unit; the `foreign_keys` pragma toggle has to sit outside the
/// savepoint because it is ignored once a transaction is open.
pub(crate) fn rebuild_script(
    operation: &str,
    table: &str,
    fields_sql: &str,
    copy_columns: &str,
    index_sqls: &[String],
    foreign_keys_were_on: bool,
) -> String {
    let quoted = quote_table(table);
    let shadow = quote_table(&format!("{table}_ddl"));
    let savepoint = savepoint_name(operation, table);
    let mut statements = vec![
        "PRAGMA foreign_keys = OFF".to_owned(),
        format!("SAVEPOINT {savepoint}"),
        format!("CREATE TABLE {shadow} AS SELECT * FROM {quoted}"),
        format!("DROP TABLE {quoted}"),
        format!("CREATE TABLE {quoted} (\n{fields_sql}\n)"),
        format!("INSERT INTO {quoted} SELECT {copy_columns} FROM {shadow}"),
        format!("DROP TABLE {shadow}"),
    ];
    statements.extend_from_slice(index_sqls);
    statements.push(format!("RELEASE {savepoint}"));
    statements.push(format!(
        "PRAGMA foreign_keys = {}",
        i32::from(foreign_keys_were_on)
    ));
    statements.join(";\n")
}
