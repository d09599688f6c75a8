//! Extraction of the column/constraint block from stored `CREATE TABLE`
//! text, plus the comma-walk helpers the rewrite operations share.

use crate::db::SchemaDb;
use crate::errors::Error;
use crate::sql::{Pattern, SqlToken, SqlTokenizer};

/// Fetch `table`'s stored DDL and return the tokens inside the
/// parenthesized field block of its `CREATE TABLE` statement.
pub(crate) fn field_definition_tokens<D: SchemaDb + ?Sized>(
    db: &D,
    table: &str,
) -> Result<Vec<SqlToken>, Error> {
    let ddl = db.create_table_sql(table)?;
    let tokens = SqlTokenizer::new(&ddl).tokenize()?;
    let pattern = Pattern::parse("any CREATE any TABLE any()")?;
    let Some(found) = pattern.find(&tokens, 0) else {
        return Err(Error::SchemaParse {
            table: table.to_owned(),
        });
    };
    Ok(tokens[found.last].children.clone())
}

/// Append tokens from `tokens[*pos]` up to and including the next
/// top-level comma (or the end of the slice) onto `out`, advancing
/// `*pos` past the comma.
pub(crate) fn copy_until_comma(tokens: &[SqlToken], pos: &mut usize, out: &mut Vec<SqlToken>) {
    while *pos < tokens.len() {
        let token = tokens[*pos].clone();
        *pos += 1;
        let comma = token.is_comma();
        out.push(token);
        if comma {
            return;
        }
    }
}

/// Advance `*pos` past the next top-level comma (or to the end of the
/// slice), discarding the skipped tokens.
pub(crate) fn skip_until_comma(tokens: &[SqlToken], pos: &mut usize) {
    while *pos < tokens.len() {
        let comma = tokens[*pos].is_comma();
        *pos += 1;
        if comma {
            return;
        }
    }
}

/// Render a field block back to SQL text, normalizing the separators so
/// each definition sits on its own line, and trimming the stray
/// whitespace and trailing comma a skip pass can leave behind.
pub(crate) fn render_field_block(tokens: &[SqlToken]) -> String {
    let mut sql = String::new();
    for token in tokens {
        if token.is_comma() {
            // Drop the space the plain renderer would put before a comma.
            while sql.ends_with(' ') {
                sql.pop();
            }
            sql.push_str(",\n");
        } else {
            if !sql.is_empty() && !sql.ends_with('\n') {
                sql.push(' ');
            }
            sql.push_str(&token.to_string());
        }
    }
    sql.trim_matches([' ', '\n', '\r', '\t', ',']).to_owned()
}

#[cfg(test)]
mod tests {
    use super::{copy_until_comma, render_field_block, skip_until_comma};
    use crate::sql::SqlTokenizer;

    #[test]
    fn copy_stops_after_comma() {
        let tokens = SqlTokenizer::new("id integer, name text")
            .tokenize()
            .unwrap();
        let mut pos = 0;
        let mut out = Vec::new();
        copy_until_comma(&tokens, &mut pos, &mut out);
        assert_eq!(out.len(), 3);
        assert!(out[2].is_comma());
        assert_eq!(pos, 3);
    }

    #[test]
    fn skip_consumes_through_comma() {
        let tokens = SqlTokenizer::new("id integer, name text")
            .tokenize()
            .unwrap();
        let mut pos = 0;
        skip_until_comma(&tokens, &mut pos);
        assert_eq!(pos, 3);
        assert_eq!(tokens[pos].text, "name");
    }

    #[test]
    fn render_trims_trailing_comma() {
        let tokens = SqlTokenizer::new("id integer, name text,")
            .tokenize()
            .unwrap();
        let sql = render_field_block(&tokens);
        assert_eq!(sql, "id integer,\nname text");
    }
}
