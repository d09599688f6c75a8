//! `ALTER TABLE ... RENAME COLUMN` emulation.
//!
//! Renaming never changes the stored rows, so instead of rebuilding the
//! table this edits the `CREATE TABLE` text stored in the catalog in
//! place: `PRAGMA writable_schema` opens the catalog for updates, the
//! edited DDL replaces the old entry, and bumping `schema_version`
//! forces the connection to reload its cached schema. Indexes are not
//! destroyed by the catalog edit, so only the ones naming the column
//! are dropped and recreated.

use crate::db::SchemaDb;
use crate::errors::Error;
use crate::sql::{
    idents_equal, quote_identifier, quote_string, split_schema, unquote_identifier, Pattern,
    SqlToken, SqlTokenKind,
};

use super::fields::{copy_until_comma, field_definition_tokens, render_field_block};
use super::indexes::{rename_in_group, rename_statements};
use super::script::{save_and_verify_foreign_keys, savepoint_name};

pub(crate) fn rename_column<D: SchemaDb + ?Sized>(
    db: &D,
    table: &str,
    old: &str,
    new: &str,
) -> Result<String, Error> {
    let fields = field_definition_tokens(db, table)?;
    let fk_pattern = Pattern::parse("any FOREIGN any KEY any()")?;
    let mut edited = Vec::new();
    let mut found = false;
    let mut pos = 0;
    while pos < fields.len() {
        let token = &fields[pos];
        match token.kind {
            SqlTokenKind::Identifier => {
                pos += 1;
                if idents_equal(&token.text, old) {
                    found = true;
                    edited.push(SqlToken::identifier(new));
                } else {
                    edited.push(token.clone());
                }
                copy_until_comma(&fields, &mut pos, &mut edited);
            }
            SqlTokenKind::Keyword => {
                // A foreign key declared on the old column has to follow
                // the rename, or the edited DDL would not load back.
                let segment_start = edited.len();
                copy_until_comma(&fields, &mut pos, &mut edited);
                let segment = &mut edited[segment_start..];
                if let Some(m) = fk_pattern.find(segment, 0) {
                    rename_in_group(&mut segment[m.last], old, new);
                }
            }
            _ => {
                return Err(Error::Parse(crate::sql::ParseError::UnexpectedToken {
                    token: token.text.clone(),
                    pos,
                }));
            }
        }
    }
    if !found {
        return Err(Error::ColumnNotFound {
            table: table.to_owned(),
            column: old.to_owned(),
        });
    }

    let (schema, bare_table) = split_schema(table);
    let bare_table = unquote_identifier(bare_table);
    let saved = save_and_verify_foreign_keys(db, "rename_column")?;
    let new_ddl = format!(
        "CREATE TABLE {} (\n{}\n)",
        quote_identifier(bare_table),
        render_field_block(&edited)
    );
    let catalog = match schema {
        Some(schema) => format!("{}.sqlite_master", quote_identifier(schema)),
        None => "sqlite_master".to_owned(),
    };
    let version_pragma = match schema {
        Some(schema) => format!("{}.schema_version", quote_identifier(schema)),
        None => "schema_version".to_owned(),
    };
    let savepoint = savepoint_name("rename_column", table);
    let mut statements = vec![
        "PRAGMA foreign_keys = OFF".to_owned(),
        format!("SAVEPOINT {savepoint}"),
    ];
    // Indexes on the old name have to go before the catalog edit: a
    // stale index definition would make the forced schema reload fail.
    // Their edited replacements come back once the new definition is
    // in place.
    let index_pairs = rename_statements(db, table, old, new)?;
    statements.extend(index_pairs.iter().map(|(drop, _)| drop.clone()));
    // Every preceding DROP INDEX already advanced the schema cookie, so
    // the explicit bump has to land past all of them to force a reload.
    let version = db.schema_version(schema)? + index_pairs.len() as i64 + 1;
    statements.extend([
        "PRAGMA writable_schema = ON".to_owned(),
        format!(
            "UPDATE {catalog} SET sql = {} WHERE type = 'table' AND name = {}",
            quote_string(&new_ddl),
            quote_string(bare_table)
        ),
        format!("PRAGMA {version_pragma} = {version}"),
        "PRAGMA writable_schema = OFF".to_owned(),
    ]);
    statements.extend(index_pairs.into_iter().map(|(_, create)| create));
    statements.push("PRAGMA integrity_check".to_owned());
    statements.push(format!("RELEASE {savepoint}"));
    statements.push(format!("PRAGMA foreign_keys = {}", i32::from(saved)));
    Ok(statements.join(";\n"))
}
