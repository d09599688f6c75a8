//! Translation of common MySQL expression idioms into their SQLite
//! equivalents.
//!
//! Schema definitions and default-value expressions written against
//! MySQL tend to carry a handful of constructs SQLite does not know:
//! `NOW()`, `UNIX_TIMESTAMP()`, variadic `CONCAT`, `GROUP_CONCAT`'s
//! `SEPARATOR` clause, and the `AUTO_INCREMENT`/`UNSIGNED` column
//! attributes. [`translate`] rewrites all of them in one pass over the
//! expression text; input that contains none of them passes through
//! unchanged.

use once_cell::sync::Lazy;
use regex::Regex;

static NOW_BARE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\bNOW\s*\(\s*\)").expect("valid regex"));
static NOW_PRECISION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\bNOW\s*\(\s*(\d+)\s*\)").expect("valid regex"));
static UNIX_TIMESTAMP: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\bUNIX_TIMESTAMP\s*\(\s*\)").expect("valid regex"));
static AUTO_INCREMENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\s*\bAUTO_INCREMENT\b").expect("valid regex"));
static UNSIGNED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\s*\bUNSIGNED\b").expect("valid regex"));
static CONCAT_CALL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\bCONCAT\s*\(").expect("valid regex"));
static GROUP_CONCAT_CALL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\bGROUP_CONCAT\s*\(").expect("valid regex"));

/// Rewrite the MySQL-flavored constructs in `expression` into SQLite
/// SQL. Text without any of them is returned unchanged.
#[must_use]
pub fn translate(expression: &str) -> String {
    let mut out = rewrite_calls(expression, &GROUP_CONCAT_CALL, rewrite_group_concat_args);
    out = rewrite_calls(&out, &CONCAT_CALL, rewrite_concat_args);
    out = NOW_BARE.replace_all(&out, "CURRENT_TIMESTAMP").into_owned();
    out = NOW_PRECISION
        .replace_all(&out, |caps: &regex::Captures<'_>| {
            if &caps[1] == "0" {
                "CURRENT_TIMESTAMP".to_owned()
            } else {
                "strftime('%Y-%m-%d %H:%M:%f', 'now')".to_owned()
            }
        })
        .into_owned();
    out = UNIX_TIMESTAMP
        .replace_all(&out, "CAST(strftime('%s', 'now') AS INT)")
        .into_owned();
    out = AUTO_INCREMENT.replace_all(&out, "").into_owned();
    UNSIGNED.replace_all(&out, "").into_owned()
}

/// Find each `call_open` match (ending at an opening parenthesis), hand
/// its balanced argument text to `transform`, and splice the returned
/// replacement over the whole call. `None` from `transform` leaves the
/// call as written.
fn rewrite_calls(
    input: &str,
    call_open: &Regex,
    transform: fn(&str) -> Option<String>,
) -> String {
    let mut out = input.to_owned();
    let mut from = 0;
    loop {
        let found = call_open.find_at(&out, from).map(|m| (m.start(), m.end() - 1));
        let Some((start, open)) = found else {
            break;
        };
        let Some(close) = matching_paren(&out, open) else {
            break;
        };
        match transform(&out[open + 1..close]) {
            Some(replacement) => {
                out.replace_range(start..=close, &replacement);
                from = start;
            }
            None => from = open + 1,
        }
    }
    out
}

/// `CONCAT(a, b, ...)` has no SQLite counterpart; `||` does the same
/// job except that it propagates NULL, so every argument after the
/// first is wrapped in `COALESCE(..., '')`.
fn rewrite_concat_args(args: &str) -> Option<String> {
    let parts = split_top_level(args, ",");
    let mut joined = String::new();
    for part in &parts {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }
        if joined.is_empty() {
            joined.push_str(part);
        } else {
            joined.push_str("||");
            joined.push_str(&format!("COALESCE({part},'')"));
        }
    }
    if joined.is_empty() {
        joined.push_str("''");
    }
    Some(joined)
}

/// `GROUP_CONCAT(expr SEPARATOR sep)` becomes the two-argument SQLite
/// form. Calls without a `SEPARATOR` clause already work as written.
fn rewrite_group_concat_args(args: &str) -> Option<String> {
    let parts = split_top_level(args, "SEPARATOR");
    if parts.len() != 2 {
        return None;
    }
    Some(format!(
        "GROUP_CONCAT({}, {})",
        parts[0].trim(),
        parts[1].trim()
    ))
}

/// Index of the `)` closing the `(` at `open`, honoring nesting and
/// quoted strings.
fn matching_paren(text: &str, open: usize) -> Option<usize> {
    let bytes = text.as_bytes();
    let mut depth = 0_usize;
    let mut i = open;
    while i < bytes.len() {
        match bytes[i] {
            b'(' => depth += 1,
            b')' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            b'\'' | b'"' => {
                let quote = bytes[i];
                i += 1;
                while i < bytes.len() && bytes[i] != quote {
                    i += 1;
                }
                if i >= bytes.len() {
                    return None;
                }
            }
            _ => {}
        }
        i += 1;
    }
    None
}

/// Split `text` at top-level occurrences of `separator`, ignoring
/// matches inside parentheses or quoted strings. A one-byte separator
/// matches literally; longer separators match as a case-insensitive
/// whitespace-delimited word.
fn split_top_level<'a>(text: &'a str, separator: &str) -> Vec<&'a str> {
    let bytes = text.as_bytes();
    let mut parts = Vec::new();
    let mut depth = 0_usize;
    let mut start = 0;
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'(' => depth += 1,
            b')' => depth = depth.saturating_sub(1),
            b'\'' | b'"' => {
                let quote = bytes[i];
                i += 1;
                while i < bytes.len() && bytes[i] != quote {
                    i += 1;
                }
            }
            _ if depth == 0 => {
                if separator.len() == 1 {
                    if bytes[i] == separator.as_bytes()[0] {
                        parts.push(&text[start..i]);
                        start = i + 1;
                    }
                } else if is_word_at(text, i, separator) {
                    parts.push(&text[start..i]);
                    start = i + separator.len();
                    i = start;
                    continue;
                }
            }
            _ => {}
        }
        i += 1;
    }
    parts.push(&text[start..]);
    parts
}

/// Whether the case-insensitive word `word` starts at byte `i` of
/// `text`, bounded by non-word characters on both sides.
fn is_word_at(text: &str, i: usize, word: &str) -> bool {
    let end = i + word.len();
    if end > text.len() || !text[i..end].eq_ignore_ascii_case(word) {
        return false;
    }
    let before_ok = i == 0
        || !text.as_bytes()[i - 1].is_ascii_alphanumeric() && text.as_bytes()[i - 1] != b'_';
    let after_ok = end == text.len()
        || !text.as_bytes()[end].is_ascii_alphanumeric() && text.as_bytes()[end] != b'_';
    before_ok && after_ok
}

#[cfg(test)]
mod tests {
    use super::translate;

    #[test]
    fn now_variants() {
        assert_eq!(translate("NOW()"), "CURRENT_TIMESTAMP");
        assert_eq!(translate("now()"), "CURRENT_TIMESTAMP");
        assert_eq!(translate("NOW(0)"), "CURRENT_TIMESTAMP");
        assert_eq!(translate("NOW(3)"), "strftime('%Y-%m-%d %H:%M:%f', 'now')");
    }

    #[test]
    fn unix_timestamp() {
        assert_eq!(
            translate("UNIX_TIMESTAMP()"),
            "CAST(strftime('%s', 'now') AS INT)"
        );
    }

    #[test]
    fn concat_coalesces_later_arguments() {
        assert_eq!(
            translate("CONCAT(a, 'x', b)"),
            "a||COALESCE('x','')||COALESCE(b,'')"
        );
        assert_eq!(translate("CONCAT(a)"), "a");
    }

    #[test]
    fn concat_with_nested_calls() {
        assert_eq!(
            translate("CONCAT(lower(a), b)"),
            "lower(a)||COALESCE(b,'')"
        );
        assert_eq!(
            translate("CONCAT(a, CONCAT(b, c))"),
            "a||COALESCE(b||COALESCE(c,''),'')"
        );
    }

    #[test]
    fn concat_honors_commas_inside_strings() {
        assert_eq!(
            translate("CONCAT(a, 'x,y')"),
            "a||COALESCE('x,y','')"
        );
    }

    #[test]
    fn group_concat_separator() {
        assert_eq!(
            translate("GROUP_CONCAT(name SEPARATOR '; ')"),
            "GROUP_CONCAT(name, '; ')"
        );
        assert_eq!(translate("GROUP_CONCAT(name)"), "GROUP_CONCAT(name)");
    }

    #[test]
    fn column_attributes_removed() {
        assert_eq!(translate("int UNSIGNED AUTO_INCREMENT"), "int");
        assert_eq!(translate("bigint unsigned NOT NULL"), "bigint NOT NULL");
    }

    #[test]
    fn plain_text_unchanged() {
        assert_eq!(translate("price * quantity"), "price * quantity");
    }
}
