//! Miniature SQL tokenizer and token-pattern matcher.
//!
//! This module only handles the small slice of SQL needed to rewrite the
//! DDL text SQLite stores in its own catalog: `CREATE TABLE` and
//! `CREATE INDEX` statements. It is intentionally limited compared to a
//! full SQL parser; the rewriter never needs expression semantics, only
//! the token structure of a stored definition.

mod ident;
mod lexer;
mod pattern;

pub use ident::{
    idents_equal, quote_identifier, quote_string, quote_table, split_schema, unquote_identifier,
    unquote_table,
};
pub use lexer::{ParseError, SqlToken, SqlTokenKind, SqlTokenizer, render_tokens};
pub use pattern::{Pattern, TokenMatch};
