//! Identifier quoting helpers shared by the rewriter and query builder.

/// Quote a SQL identifier (table or column name) with double quotes.
///
/// Escapes any embedded double quotes by doubling them. Already-quoted
/// names are unquoted first so quoting is idempotent.
#[must_use]
pub fn quote_identifier(name: &str) -> String {
    let name = unquote_identifier(name);
    let mut out = String::with_capacity(name.len() + 2);
    out.push('"');
    for c in name.chars() {
        if c == '"' {
            out.push_str("\"\"");
        } else {
            out.push(c);
        }
    }
    out.push('"');
    out
}

/// Quote a string value with single quotes, doubling embedded quotes.
#[must_use]
pub fn quote_string(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('\'');
    for c in value.chars() {
        if c == '\'' {
            out.push_str("''");
        } else {
            out.push(c);
        }
    }
    out.push('\'');
    out
}

/// Strip one layer of identifier quoting: `"x"`, `` `x` `` or `[x]`.
///
/// Unquoted input is returned as-is; embedded escape sequences are left
/// alone since the rewriter only compares names.
#[must_use]
pub fn unquote_identifier(name: &str) -> &str {
    let bytes = name.as_bytes();
    if bytes.len() >= 2 {
        let stripped = match (bytes[0], bytes[bytes.len() - 1]) {
            (b'"', b'"') | (b'`', b'`') => Some(&name[1..name.len() - 1]),
            (b'[', b']') => Some(&name[1..name.len() - 1]),
            _ => None,
        };
        if let Some(inner) = stripped {
            return inner;
        }
    }
    name
}

/// Compare two identifiers after unquoting, the way SQLite does:
/// ASCII-case-insensitively.
#[must_use]
pub fn idents_equal(a: &str, b: &str) -> bool {
    unquote_identifier(a).eq_ignore_ascii_case(unquote_identifier(b))
}

/// Split a possibly schema-qualified table name at its first dot.
#[must_use]
pub fn split_schema(name: &str) -> (Option<&str>, &str) {
    match name.split_once('.') {
        Some((schema, table)) => (Some(schema), table),
        None => (None, name),
    }
}

/// Quote a possibly schema-qualified table name, quoting each part.
#[must_use]
pub fn quote_table(name: &str) -> String {
    match split_schema(name) {
        (Some(schema), table) => format!(
            "{}.{}",
            quote_identifier(schema),
            quote_identifier(table)
        ),
        (None, table) => quote_identifier(table),
    }
}

/// Unquote a possibly schema-qualified table name, preserving the dot.
#[must_use]
pub fn unquote_table(name: &str) -> String {
    match split_schema(name) {
        (Some(schema), table) => format!(
            "{}.{}",
            unquote_identifier(schema),
            unquote_identifier(table)
        ),
        (None, table) => unquote_identifier(table).to_string(),
    }
}
