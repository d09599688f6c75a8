//! Token-pattern matching for locating structural anchors in DDL.
//!
//! Patterns are written in a small mini-language: literal words match the
//! same keyword/identifier (case-insensitive), `any` skips forward to the
//! next literal (or consumes exactly one token when trailing), and `()`
//! matches and captures the next parenthesis group. Example:
//! `any CREATE any TABLE any()` locates the field-definition block of a
//! stored `CREATE TABLE` statement.

use super::lexer::{ParseError, SqlToken, SqlTokenKind};

/// A single element of a parsed pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
enum PatternElem {
    /// Wildcard: skip to the next literal, or one token when trailing.
    Any,
    /// A literal word, matched case-insensitively against keyword,
    /// identifier, or operator tokens.
    Literal(String),
    /// A parenthesis-group capture.
    Group,
}

/// A parsed matcher pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pattern {
    elems: Vec<PatternElem>,
}

/// The span matched by a [`Pattern`], as token indices into the candidate
/// sequence. When the pattern ends in `()`, `tokens[last]` is the
/// captured parenthesis group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenMatch {
    /// Index of the first matched token.
    pub first: usize,
    /// Index of the last matched token (inclusive).
    pub last: usize,
}

impl Pattern {
    /// Parse a pattern string.
    pub fn parse(text: &str) -> Result<Self, ParseError> {
        let mut elems = Vec::new();
        for word in text.split_whitespace() {
            let (word, group) = match word.strip_suffix("()") {
                Some(prefix) => (prefix, true),
                None => (word, false),
            };
            if !word.is_empty() {
                if word == "any" {
                    elems.push(PatternElem::Any);
                } else if word.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
                    elems.push(PatternElem::Literal(word.to_string()));
                } else {
                    return Err(ParseError::InvalidPattern {
                        element: word.to_string(),
                    });
                }
            }
            if group {
                elems.push(PatternElem::Group);
            }
        }
        if elems.is_empty() {
            return Err(ParseError::InvalidPattern {
                element: text.to_string(),
            });
        }
        Ok(Self { elems })
    }

    /// Match this pattern against `tokens` starting at `start`.
    ///
    /// Returns the matched span, or `None` when no match exists in
    /// bounds. Callers treat `None` as malformed/unexpected schema text.
    #[must_use]
    pub fn find(&self, tokens: &[SqlToken], start: usize) -> Option<TokenMatch> {
        let mut i = start;
        let mut first: Option<usize> = None;
        let mut elems = self.elems.iter().peekable();
        while let Some(elem) = elems.next() {
            match elem {
                PatternElem::Any => match elems.peek() {
                    Some(next) => {
                        while i < tokens.len() && !elem_matches(next, &tokens[i]) {
                            i += 1;
                        }
                        if i >= tokens.len() {
                            return None;
                        }
                    }
                    None => {
                        // Trailing wildcard consumes exactly one token.
                        if i >= tokens.len() {
                            return None;
                        }
                        first.get_or_insert(i);
                        i += 1;
                    }
                },
                PatternElem::Literal(_) | PatternElem::Group => {
                    if i >= tokens.len() || !elem_matches(elem, &tokens[i]) {
                        return None;
                    }
                    first.get_or_insert(i);
                    i += 1;
                }
            }
        }
        Some(TokenMatch {
            first: first?,
            last: i - 1,
        })
    }
}

fn elem_matches(elem: &PatternElem, token: &SqlToken) -> bool {
    match elem {
        PatternElem::Any => true,
        PatternElem::Literal(word) => {
            matches!(
                token.kind,
                SqlTokenKind::Keyword | SqlTokenKind::Identifier | SqlTokenKind::Operator
            ) && token.text.eq_ignore_ascii_case(word)
        }
        PatternElem::Group => token.kind == SqlTokenKind::Paren,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sql::SqlTokenizer;

    fn tokenize(sql: &str) -> Vec<SqlToken> {
        SqlTokenizer::new(sql).tokenize().unwrap()
    }

    #[test]
    fn test_create_table_anchor() {
        let tokens = tokenize("CREATE TABLE \"users\" (id integer, name text)");
        let pattern = Pattern::parse("any CREATE any TABLE any()").unwrap();
        let m = pattern.find(&tokens, 0).expect("pattern should match");
        assert_eq!(m.first, 0);
        assert_eq!(m.last, 3);
        assert_eq!(tokens[m.last].kind, SqlTokenKind::Paren);
    }

    #[test]
    fn test_create_index_anchor_with_unique() {
        let tokens = tokenize("CREATE UNIQUE INDEX \"idx\" ON \"t\" (\"a\", \"b\")");
        let pattern = Pattern::parse("any CREATE any INDEX any ON any()").unwrap();
        let m = pattern.find(&tokens, 0).expect("pattern should match");
        assert_eq!(tokens[m.last].children.len(), 3);
    }

    #[test]
    fn test_foreign_key_anchored_at_offset() {
        let tokens = tokenize("CONSTRAINT fk FOREIGN KEY (a) REFERENCES o (id)");
        let pattern = Pattern::parse("FOREIGN any KEY any ()").unwrap();
        // Anchored match: fails at offset 0 (CONSTRAINT), succeeds at 2.
        assert!(pattern.find(&tokens, 0).is_none() || pattern.find(&tokens, 0).unwrap().first != 0);
        let m = pattern.find(&tokens, 2).expect("pattern should match");
        assert_eq!(m.first, 2);
        assert_eq!(tokens[m.last].children[0].text, "a");
    }

    #[test]
    fn test_no_match_is_explicit() {
        let tokens = tokenize("DROP TABLE t");
        let pattern = Pattern::parse("any CREATE any TABLE any()").unwrap();
        assert!(pattern.find(&tokens, 0).is_none());
    }

    #[test]
    fn test_invalid_pattern_element() {
        assert!(matches!(
            Pattern::parse("any %%"),
            Err(ParseError::InvalidPattern { .. })
        ));
    }
}
