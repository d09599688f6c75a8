//! `ALTER TABLE ... DROP COLUMN` emulation.

use crate::db::SchemaDb;
use crate::errors::Error;
use crate::sql::{
    idents_equal, quote_identifier, split_schema, unquote_identifier, SqlToken, SqlTokenKind,
};

use super::fields::{copy_until_comma, field_definition_tokens, render_field_block, skip_until_comma};
use super::indexes::{group_mentions_column, rebuild_indexes};
use super::script::{rebuild_script, save_and_verify_foreign_keys};

pub(crate) fn drop_column<D: SchemaDb + ?Sized>(
    db: &D,
    table: &str,
    column: &str,
) -> Result<String, Error> {
    let fields = field_definition_tokens(db, table)?;
    let mut kept = Vec::new();
    let mut surviving = Vec::new();
    let mut found = false;
    let mut pos = 0;
    while pos < fields.len() {
        let token = &fields[pos];
        match token.kind {
            SqlTokenKind::Identifier => {
                if idents_equal(&token.text, column) {
                    found = true;
                    skip_until_comma(&fields, &mut pos);
                } else {
                    surviving.push(quote_identifier(unquote_identifier(&token.text)));
                    copy_until_comma(&fields, &mut pos, &mut kept);
                }
            }
            SqlTokenKind::Keyword => {
                // A constraint whose column list names the dropped column
                // cannot survive the rebuild.
                if (token.is_keyword("CONSTRAINT") || token.is_keyword("FOREIGN"))
                    && constraint_targets_column(&fields, pos, table, column)
                {
                    skip_until_comma(&fields, &mut pos);
                } else {
                    copy_until_comma(&fields, &mut pos, &mut kept);
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
            column: column.to_owned(),
        });
    }
    let saved = save_and_verify_foreign_keys(db, "drop_column")?;
    let index_sqls = rebuild_indexes(db, table, Some(column), None)?;
    Ok(rebuild_script(
        "drop_column",
        table,
        &render_field_block(&kept),
        &surviving.join(", "),
        &index_sqls,
        saved,
    ))
}

/// Whether the constraint segment starting at `pos` names `column`,
/// either in its own column list or in a `REFERENCES` list pointing
/// back at `table` itself. Groups referencing other tables are
/// skipped; their column names live in a different namespace.
pub(crate) fn constraint_targets_column(
    tokens: &[SqlToken],
    pos: usize,
    table: &str,
    column: &str,
) -> bool {
    let (_, bare_table) = split_schema(table);
    let mut seen_columns = false;
    let mut self_reference = false;
    let mut i = pos;
    while i < tokens.len() && !tokens[i].is_comma() {
        let token = &tokens[i];
        match token.kind {
            SqlTokenKind::Paren => {
                if (!seen_columns || self_reference) && group_mentions_column(token, column) {
                    return true;
                }
                seen_columns = true;
                self_reference = false;
            }
            SqlTokenKind::Keyword if token.is_keyword("REFERENCES") => {
                self_reference = tokens
                    .get(i + 1)
                    .is_some_and(|t| idents_equal(&t.text, bare_table));
            }
            _ => {}
        }
        i += 1;
    }
    false
}
