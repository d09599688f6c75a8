//! SQL lexer producing a nested token stream from stored DDL text.

use core::fmt;

/// The different kinds of tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SqlTokenKind {
    /// A reserved word (`CREATE`, `TABLE`, `CONSTRAINT`, ...).
    Keyword,
    /// A bare or quoted identifier (also covers numeric literals, which
    /// are bare words for the rewriter's purposes).
    Identifier,
    /// Punctuation: comma, dot, comparison operators, ...
    Operator,
    /// A single-quoted string literal, stored with its quotes.
    StringLiteral,
    /// A balanced `(...)` group holding child tokens.
    Paren,
}

/// An atomic unit of parsed SQL.
///
/// Tokens are immutable once built; rewrite steps construct new sequences
/// rather than mutating shared tokens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SqlToken {
    /// The kind of token.
    pub kind: SqlTokenKind,
    /// The literal SQL substring, with original quoting preserved.
    /// Empty for [`SqlTokenKind::Paren`] tokens, whose content lives in
    /// `children`.
    pub text: String,
    /// Child tokens of a [`SqlTokenKind::Paren`] group; empty otherwise.
    pub children: Vec<SqlToken>,
}

impl SqlToken {
    fn leaf(kind: SqlTokenKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
            children: Vec::new(),
        }
    }

    fn group(children: Vec<SqlToken>) -> Self {
        Self {
            kind: SqlTokenKind::Paren,
            text: String::new(),
            children,
        }
    }

    /// Build a quoted identifier token for `name`.
    #[must_use]
    pub fn identifier(name: &str) -> Self {
        Self::leaf(SqlTokenKind::Identifier, super::quote_identifier(name))
    }

    /// Build a comma operator token.
    pub(crate) fn comma() -> Self {
        Self::leaf(SqlTokenKind::Operator, ",")
    }

    /// The token text with any identifier quoting (`"x"`, `` `x` ``,
    /// `[x]`) stripped.
    #[must_use]
    pub fn unquoted(&self) -> &str {
        super::unquote_identifier(&self.text)
    }

    /// Whether this token is the comma operator.
    #[must_use]
    pub fn is_comma(&self) -> bool {
        self.kind == SqlTokenKind::Operator && self.text == ","
    }

    /// Whether this token is the given keyword (case-insensitive).
    #[must_use]
    pub fn is_keyword(&self, word: &str) -> bool {
        self.kind == SqlTokenKind::Keyword && self.text.eq_ignore_ascii_case(word)
    }
}

impl fmt::Display for SqlToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.kind == SqlTokenKind::Paren {
            write!(f, "(")?;
            for (i, child) in self.children.iter().enumerate() {
                if i > 0 {
                    write!(f, " ")?;
                }
                write!(f, "{child}")?;
            }
            write!(f, ")")
        } else {
            write!(f, "{}", self.text)
        }
    }
}

/// Render a token sequence back to SQL text, joined by single spaces.
///
/// The result is semantically equivalent to the original input and can be
/// fed back through the tokenizer.
#[must_use]
pub fn render_tokens(tokens: &[SqlToken]) -> String {
    let mut out = String::new();
    for (i, token) in tokens.iter().enumerate() {
        if i > 0 {
            out.push(' ');
        }
        out.push_str(&token.to_string());
    }
    out
}

/// Reserved words the rewriter cares about when walking DDL.
///
/// Deliberately short: type names like `integer` stay identifiers so that
/// column definitions read as identifier-led segments.
const KEYWORDS: &[&str] = &[
    "CREATE",
    "TEMP",
    "TEMPORARY",
    "TABLE",
    "INDEX",
    "IF",
    "EXISTS",
    "CONSTRAINT",
    "FOREIGN",
    "PRIMARY",
    "UNIQUE",
    "CHECK",
    "KEY",
    "REFERENCES",
    "ON",
    "DELETE",
    "UPDATE",
    "INSERT",
    "NOT",
    "NULL",
    "DEFAULT",
    "COLLATE",
    "AUTOINCREMENT",
    "CASCADE",
    "RESTRICT",
    "SET",
    "NO",
    "ACTION",
    "DEFERRABLE",
    "INITIALLY",
    "DEFERRED",
    "IMMEDIATE",
    "WITHOUT",
    "ROWID",
    "STRICT",
    "ASC",
    "DESC",
    "WHERE",
    "AND",
    "OR",
    "IS",
    "IN",
    "LIKE",
    "GENERATED",
    "ALWAYS",
    "AS",
    "STORED",
    "VIRTUAL",
];

/// SQL tokenizer for stored `CREATE TABLE` / `CREATE INDEX` text.
pub struct SqlTokenizer<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> SqlTokenizer<'a> {
    /// Create a new tokenizer for the given input.
    #[must_use]
    pub fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    /// Tokenize the whole input into a flat sequence with nested
    /// [`SqlTokenKind::Paren`] groups for balanced parentheses.
    pub fn tokenize(mut self) -> Result<Vec<SqlToken>, ParseError> {
        self.sequence(false)
    }

    /// Read tokens until end of input (top level) or a closing paren
    /// (inside a group).
    fn sequence(&mut self, in_group: bool) -> Result<Vec<SqlToken>, ParseError> {
        let mut tokens = Vec::new();
        loop {
            self.skip_whitespace();
            let start = self.pos;
            let bytes = self.input.as_bytes();
            if self.pos >= bytes.len() {
                if in_group {
                    return Err(ParseError::UnbalancedParenthesis { pos: start });
                }
                return Ok(tokens);
            }
            let b = bytes[self.pos];
            match b {
                b'(' => {
                    self.pos += 1;
                    let children = self.sequence(true)?;
                    tokens.push(SqlToken::group(children));
                }
                b')' => {
                    self.pos += 1;
                    if !in_group {
                        return Err(ParseError::UnbalancedParenthesis { pos: start });
                    }
                    return Ok(tokens);
                }
                b',' | b'.' | b';' | b'*' | b'+' | b'-' | b'/' | b'%' => {
                    self.pos += 1;
                    tokens.push(SqlToken::leaf(
                        SqlTokenKind::Operator,
                        &self.input[start..self.pos],
                    ));
                }
                b'<' | b'>' | b'=' | b'!' | b'|' | b'&' => {
                    // Comparison and concatenation operators may span two
                    // characters (<=, <>, !=, ||); keep them whole so the
                    // rendered output stays valid SQL.
                    while self.pos < bytes.len()
                        && matches!(bytes[self.pos], b'<' | b'>' | b'=' | b'!' | b'|' | b'&')
                    {
                        self.pos += 1;
                    }
                    tokens.push(SqlToken::leaf(
                        SqlTokenKind::Operator,
                        &self.input[start..self.pos],
                    ));
                }
                b'\'' => tokens.push(self.read_string(start)?),
                b'"' | b'`' => tokens.push(self.read_quoted_identifier(start, b)?),
                b'[' => tokens.push(self.read_bracketed_identifier(start)?),
                _ if b.is_ascii_digit() => tokens.push(self.read_number(start)),
                _ if is_ident_start(b) => tokens.push(self.read_word(start)),
                _ => {
                    return Err(ParseError::UnexpectedChar {
                        char: b as char,
                        pos: start,
                    });
                }
            }
        }
    }

    /// Skip whitespace and SQL comments.
    fn skip_whitespace(&mut self) {
        let bytes = self.input.as_bytes();
        while self.pos < bytes.len() {
            let b = bytes[self.pos];
            if b.is_ascii_whitespace() {
                self.pos += 1;
            } else if b == b'-' && self.pos + 1 < bytes.len() && bytes[self.pos + 1] == b'-' {
                // Line comment
                self.pos += 2;
                while self.pos < bytes.len() && bytes[self.pos] != b'\n' {
                    self.pos += 1;
                }
            } else if b == b'/' && self.pos + 1 < bytes.len() && bytes[self.pos + 1] == b'*' {
                // Block comment
                self.pos += 2;
                while self.pos + 1 < bytes.len()
                    && !(bytes[self.pos] == b'*' && bytes[self.pos + 1] == b'/')
                {
                    self.pos += 1;
                }
                if self.pos + 1 < bytes.len() {
                    self.pos += 2;
                }
            } else {
                break;
            }
        }
    }

    fn read_string(&mut self, start: usize) -> Result<SqlToken, ParseError> {
        let bytes = self.input.as_bytes();
        self.pos += 1;
        while self.pos < bytes.len() {
            if bytes[self.pos] == b'\'' {
                // Doubled quote is an escaped quote, not a terminator.
                if self.pos + 1 < bytes.len() && bytes[self.pos + 1] == b'\'' {
                    self.pos += 2;
                } else {
                    self.pos += 1;
                    return Ok(SqlToken::leaf(
                        SqlTokenKind::StringLiteral,
                        &self.input[start..self.pos],
                    ));
                }
            } else {
                self.pos += 1;
            }
        }
        Err(ParseError::UnterminatedString { pos: start })
    }

    fn read_quoted_identifier(&mut self, start: usize, quote: u8) -> Result<SqlToken, ParseError> {
        let bytes = self.input.as_bytes();
        self.pos += 1;
        while self.pos < bytes.len() {
            if bytes[self.pos] == quote {
                if self.pos + 1 < bytes.len() && bytes[self.pos + 1] == quote {
                    self.pos += 2;
                } else {
                    self.pos += 1;
                    return Ok(SqlToken::leaf(
                        SqlTokenKind::Identifier,
                        &self.input[start..self.pos],
                    ));
                }
            } else {
                self.pos += 1;
            }
        }
        Err(ParseError::UnterminatedString { pos: start })
    }

    fn read_bracketed_identifier(&mut self, start: usize) -> Result<SqlToken, ParseError> {
        let bytes = self.input.as_bytes();
        self.pos += 1;
        while self.pos < bytes.len() && bytes[self.pos] != b']' {
            self.pos += 1;
        }
        if self.pos >= bytes.len() {
            return Err(ParseError::UnterminatedString { pos: start });
        }
        self.pos += 1;
        Ok(SqlToken::leaf(
            SqlTokenKind::Identifier,
            &self.input[start..self.pos],
        ))
    }

    /// Numbers are kept whole (including decimal point and exponent) so
    /// `DEFAULT 0.5` survives re-rendering.
    fn read_number(&mut self, start: usize) -> SqlToken {
        let bytes = self.input.as_bytes();
        while self.pos < bytes.len() && bytes[self.pos].is_ascii_digit() {
            self.pos += 1;
        }
        if self.pos < bytes.len() && bytes[self.pos] == b'.' {
            self.pos += 1;
            while self.pos < bytes.len() && bytes[self.pos].is_ascii_digit() {
                self.pos += 1;
            }
        }
        if self.pos < bytes.len() && (bytes[self.pos] == b'e' || bytes[self.pos] == b'E') {
            self.pos += 1;
            if self.pos < bytes.len() && (bytes[self.pos] == b'+' || bytes[self.pos] == b'-') {
                self.pos += 1;
            }
            while self.pos < bytes.len() && bytes[self.pos].is_ascii_digit() {
                self.pos += 1;
            }
        }
        SqlToken::leaf(SqlTokenKind::Identifier, &self.input[start..self.pos])
    }

    fn read_word(&mut self, start: usize) -> SqlToken {
        let bytes = self.input.as_bytes();
        while self.pos < bytes.len() && is_ident_cont(bytes[self.pos]) {
            self.pos += 1;
        }
        let word = &self.input[start..self.pos];
        let kind = if KEYWORDS.iter().any(|kw| word.eq_ignore_ascii_case(kw)) {
            SqlTokenKind::Keyword
        } else {
            SqlTokenKind::Identifier
        };
        SqlToken::leaf(kind, word)
    }
}

/// Check if a byte can start a bare identifier.
fn is_ident_start(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == b'_'
}

/// Check if a byte can continue a bare identifier.
fn is_ident_cont(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b == b'$'
}

/// Errors that can occur while tokenizing or walking DDL text.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    /// Unexpected character in input.
    #[error("Unexpected character '{char}' at position {pos}")]
    UnexpectedChar {
        /// The unexpected character.
        char: char,
        /// Byte position in input.
        pos: usize,
    },
    /// Unterminated string literal or quoted identifier.
    #[error("Unterminated quoted region starting at position {pos}")]
    UnterminatedString {
        /// Byte position where the quote opened.
        pos: usize,
    },
    /// Opening and closing parentheses do not balance.
    #[error("Unbalanced parenthesis at position {pos}")]
    UnbalancedParenthesis {
        /// Byte position of the offending parenthesis.
        pos: usize,
    },
    /// A token walker met a token it cannot classify.
    #[error("Unexpected token '{token}' at offset {pos}")]
    UnexpectedToken {
        /// Rendered text of the offending token.
        token: String,
        /// Token index within the walked sequence.
        pos: usize,
    },
    /// A pattern string used an element the mini-language does not know.
    #[error("Invalid pattern element '{element}'")]
    InvalidPattern {
        /// The unknown pattern element.
        element: String,
    },
}
