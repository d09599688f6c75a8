//! Re-creation of a table's indexes after a rewrite.
//!
//! Dropping and recreating a table takes its indexes with it, so every
//! rebuild script has to re-issue the stored `CREATE INDEX` statements
//! afterwards. Along the way the statements are filtered or edited for
//! the operation at hand: an index touching a dropped column cannot be
//! recreated, and an index touching a renamed column needs its column
//! list rewritten.

use crate::db::SchemaDb;
use crate::errors::Error;
use crate::sql::{
    idents_equal, quote_identifier, render_tokens, split_schema, Pattern, SqlToken, SqlTokenKind,
    SqlTokenizer,
};

/// Collect the DDL statements that restore `table`'s indexes.
///
/// With `skip_column` set, indexes referencing that column are left out
/// of the result. With `rename_to` also set, the mode changes: instead
/// of filtering, each index referencing `skip_column` yields a
/// `DROP INDEX` for the original followed by a `CREATE INDEX` with the
/// column renamed, and untouched indexes are omitted entirely (a
/// catalog rewrite does not destroy them).
pub fn rebuild_indexes<D: SchemaDb + ?Sized>(
    db: &D,
    table: &str,
    skip_column: Option<&str>,
    rename_to: Option<&str>,
) -> Result<Vec<String>, Error> {
    match (skip_column, rename_to) {
        (Some(old), Some(new)) => Ok(rename_statements(db, table, old, new)?
            .into_iter()
            .flat_map(|(drop, create)| [drop, create])
            .collect()),
        (skip, None) => surviving_indexes(db, table, skip),
        (None, Some(_)) => Ok(Vec::new()),
    }
}

/// The stored `CREATE INDEX` statements that survive a rebuild, minus
/// any index referencing `skip_column`.
pub(crate) fn surviving_indexes<D: SchemaDb + ?Sized>(
    db: &D,
    table: &str,
    skip_column: Option<&str>,
) -> Result<Vec<String>, Error> {
    let mut statements = Vec::new();
    for (name, sql) in db.index_definitions(table)? {
        let (tokens, group_index) = tokenized_column_group(&name, &sql)?;
        if skip_column.is_none_or(|column| !group_mentions_column(&tokens[group_index], column)) {
            statements.push(sql);
        }
    }
    Ok(statements)
}

/// For each index referencing `old`, the `DROP INDEX` for the original
/// definition paired with the `CREATE INDEX` rewritten against `new`.
pub(crate) fn rename_statements<D: SchemaDb + ?Sized>(
    db: &D,
    table: &str,
    old: &str,
    new: &str,
) -> Result<Vec<(String, String)>, Error> {
    let (schema, _) = split_schema(table);
    let mut pairs = Vec::new();
    for (name, sql) in db.index_definitions(table)? {
        let (tokens, group_index) = tokenized_column_group(&name, &sql)?;
        if !group_mentions_column(&tokens[group_index], old) {
            continue;
        }
        let mut edited = tokens;
        rename_in_group(&mut edited[group_index], old, new);
        pairs.push((
            format!("DROP INDEX {}", quote_index(schema, &name)),
            render_tokens(&edited),
        ));
    }
    Ok(pairs)
}

/// Tokenize a stored `CREATE INDEX` statement and locate its indexed
/// column list.
fn tokenized_column_group(name: &str, sql: &str) -> Result<(Vec<SqlToken>, usize), Error> {
    let tokens = SqlTokenizer::new(sql).tokenize()?;
    let pattern = Pattern::parse("any INDEX any ON any()")?;
    let Some(found) = pattern.find(&tokens, 0) else {
        return Err(Error::IndexParse {
            index: name.to_owned(),
        });
    };
    Ok((tokens, found.last))
}

fn quote_index(schema: Option<&str>, name: &str) -> String {
    match schema {
        Some(schema) => format!("{}.{}", quote_identifier(schema), quote_identifier(name)),
        None => quote_identifier(name),
    }
}

/// Whether any identifier in the group (including nested expression
/// groups) refers to `column`.
pub(crate) fn group_mentions_column(group: &SqlToken, column: &str) -> bool {
    group.children.iter().any(|token| match token.kind {
        SqlTokenKind::Identifier => idents_equal(&token.text, column),
        SqlTokenKind::Paren => group_mentions_column(token, column),
        _ => false,
    })
}

/// Replace every identifier referring to `old` with the quoted form of
/// `new`, recursing into expression groups.
pub(crate) fn rename_in_group(group: &mut SqlToken, old: &str, new: &str) {
    for token in &mut group.children {
        match token.kind {
            SqlTokenKind::Identifier if idents_equal(&token.text, old) => {
                token.text = quote_identifier(new);
            }
            SqlTokenKind::Paren => rename_in_group(token, old, new),
            _ => {}
        }
    }
}
