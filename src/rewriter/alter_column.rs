//! `ALTER TABLE ... ALTER COLUMN` emulation.
//!
//! SQLite cannot change a column's declared type, so the table is
//! rebuilt with the column's whole definition replaced by the new one.
//! Values are carried across unchanged and re-interpreted under the new
//! type affinity on the way back in.

use crate::db::SchemaDb;
use crate::errors::Error;
use crate::sql::{
    idents_equal, quote_identifier, unquote_identifier, SqlToken, SqlTokenKind, SqlTokenizer,
};

use super::fields::{copy_until_comma, field_definition_tokens, render_field_block, skip_until_comma};
use super::indexes::rebuild_indexes;
use super::script::{rebuild_script, save_and_verify_foreign_keys};

pub(crate) fn alter_column<D: SchemaDb + ?Sized>(
    db: &D,
    table: &str,
    column: &str,
    new_type: &str,
) -> Result<String, Error> {
    let fields = field_definition_tokens(db, table)?;
    let type_tokens = SqlTokenizer::new(new_type).tokenize()?;
    let mut edited = Vec::new();
    let mut columns = Vec::new();
    let mut found = false;
    let mut pos = 0;
    while pos < fields.len() {
        let token = &fields[pos];
        match token.kind {
            SqlTokenKind::Identifier => {
                columns.push(quote_identifier(unquote_identifier(&token.text)));
                if idents_equal(&token.text, column) {
                    found = true;
                    edited.push(token.clone());
                    edited.extend(type_tokens.iter().cloned());
                    pos += 1;
                    skip_until_comma(&fields, &mut pos);
                    if pos < fields.len() {
                        edited.push(SqlToken::comma());
                    }
                } else {
                    copy_until_comma(&fields, &mut pos, &mut edited);
                }
            }
            SqlTokenKind::Keyword => {
                copy_until_comma(&fields, &mut pos, &mut edited);
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
            column: column.to_owned(),
        });
    }
    let saved = save_and_verify_foreign_keys(db, "alter_column")?;
    let index_sqls = rebuild_indexes(db, table, None, None)?;
    Ok(rebuild_script(
        "alter_column",
        table,
        &render_field_block(&edited),
        &columns.join(", "),
        &index_sqls,
        saved,
    ))
}
