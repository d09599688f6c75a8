//! Foreign-key constraint emulation.
//!
//! Both directions go through a full table rebuild: adding appends a
//! `CONSTRAINT ... FOREIGN KEY` clause to the stored field block,
//! dropping walks the block and leaves the matching constraint segment
//! out. SQLite's own schema reader does not expose names for unnamed
//! `FOREIGN KEY` clauses, so dropping also accepts an ordinal position
//! counted over the constraint segments in declaration order.

use tracing::info;

use crate::db::SchemaDb;
use crate::errors::Error;
use crate::sql::{
    idents_equal, quote_identifier, split_schema, unquote_identifier, SqlTokenKind,
};

use super::fields::{copy_until_comma, field_definition_tokens, render_field_block, skip_until_comma};
use super::indexes::rebuild_indexes;
use super::script::{rebuild_script, save_and_verify_foreign_keys};

/// How a foreign-key constraint is identified when dropping it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstraintId<'a> {
    /// The name declared in a `CONSTRAINT <name>` clause.
    Name(&'a str),
    /// Zero-based position among the table's constraint clauses in
    /// declaration order, for constraints declared without a name.
    Position(usize),
}

impl ConstraintId<'_> {
    fn describe(self) -> String {
        match self {
            Self::Name(name) => name.to_owned(),
            Self::Position(pos) => pos.to_string(),
        }
    }
}

#[allow(clippy::too_many_arguments)]
pub(crate) fn add_foreign_key<D: SchemaDb + ?Sized>(
    db: &D,
    name: &str,
    table: &str,
    columns: &[&str],
    ref_table: &str,
    ref_columns: &[&str],
    on_delete: Option<&str>,
    on_update: Option<&str>,
) -> Result<String, Error> {
    let (schema, _) = split_schema(table);
    let (ref_schema, bare_ref) = split_schema(ref_table);
    if schema != ref_schema {
        info!(table, ref_table, "foreign keys across schemas are not supported, skipping");
        return Ok(String::new());
    }

    let fields = field_definition_tokens(db, table)?;
    let mut fields_sql = render_field_block(&fields);
    fields_sql.push_str(&format!(
        ",\nCONSTRAINT {} FOREIGN KEY ({}) REFERENCES {} ({})",
        quote_identifier(name),
        quote_all(columns),
        quote_identifier(unquote_identifier(bare_ref)),
        quote_all(ref_columns),
    ));
    if let Some(action) = on_update {
        fields_sql.push_str(&format!(" ON UPDATE {action}"));
    }
    if let Some(action) = on_delete {
        fields_sql.push_str(&format!(" ON DELETE {action}"));
    }

    let saved = save_and_verify_foreign_keys(db, "add_foreign_key")?;
    // Hidden and generated columns are absent from the shadow copy, so
    // the copy-back names the visible columns explicitly.
    let copy_columns = quote_all(
        &db.visible_columns(table)?
            .iter()
            .map(String::as_str)
            .collect::<Vec<_>>(),
    );
    let index_sqls = rebuild_indexes(db, table, None, None)?;
    Ok(rebuild_script(
        "add_foreign_key",
        table,
        &fields_sql,
        &copy_columns,
        &index_sqls,
        saved,
    ))
}

pub(crate) fn drop_foreign_key<D: SchemaDb + ?Sized>(
    db: &D,
    id: ConstraintId<'_>,
    table: &str,
) -> Result<String, Error> {
    let fields = field_definition_tokens(db, table)?;
    let mut kept = Vec::new();
    let mut columns = Vec::new();
    let mut found = false;
    let mut constraint_pos = 0_usize;
    let mut pos = 0;
    while pos < fields.len() {
        let token = &fields[pos];
        match token.kind {
            SqlTokenKind::Identifier => {
                columns.push(quote_identifier(unquote_identifier(&token.text)));
                copy_until_comma(&fields, &mut pos, &mut kept);
            }
            SqlTokenKind::Keyword => {
                let head = token.is_keyword("CONSTRAINT") || token.is_keyword("FOREIGN");
                let matches = head
                    && match id {
                        ConstraintId::Name(name) => {
                            token.is_keyword("CONSTRAINT")
                                && fields
                                    .get(pos + 1)
                                    .is_some_and(|t| idents_equal(&t.text, name))
                        }
                        ConstraintId::Position(wanted) => constraint_pos == wanted,
                    };
                if head {
                    constraint_pos += 1;
                }
                if matches {
                    found = true;
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
        return Err(Error::ConstraintNotFound {
            table: table.to_owned(),
            constraint: id.describe(),
        });
    }
    let saved = save_and_verify_foreign_keys(db, "drop_foreign_key")?;
    let index_sqls = rebuild_indexes(db, table, None, None)?;
    Ok(rebuild_script(
        "drop_foreign_key",
        table,
        &render_field_block(&kept),
        &columns.join(", "),
        &index_sqls,
        saved,
    ))
}

fn quote_all(names: &[&str]) -> String {
    names
        .iter()
        .map(|name| quote_identifier(unquote_identifier(name)))
        .collect::<Vec<_>>()
        .join(", ")
}
