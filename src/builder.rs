//! SQL generation for the statements SQLite spells differently from
//! other engines.
//!
//! Everything here produces statement text only; the handful of
//! operations that need catalog metadata (upsert conflict targets,
//! server version, sequence values) read it through [`SchemaDb`].

use crate::db::SchemaDb;
use crate::errors::Error;
use crate::sql::{quote_identifier, quote_string, quote_table, split_schema, unquote_identifier};

use core::fmt;

/// `LIMIT` is not optional in SQLite's `OFFSET` syntax, so an
/// offset-only query gets the largest signed 64-bit row count instead.
const LIMIT_SENTINEL: &str = "9223372036854775807";

/// A literal value rendered into generated SQL.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// SQL `NULL`.
    Null,
    /// A boolean, stored as `1` or `0`.
    Bool(bool),
    /// A signed integer.
    Integer(i64),
    /// A float. Rendered with an explicit decimal point so SQLite
    /// assigns it real affinity.
    Real(f64),
    /// A string, rendered single-quoted with embedded quotes doubled.
    Text(String),
    /// A binary blob, rendered as an `X'..'` hex literal.
    Blob(Vec<u8>),
    /// A raw SQL fragment, rendered verbatim. For defaults like
    /// `CURRENT_TIMESTAMP` or computed inserts.
    Expression(String),
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => write!(f, "NULL"),
            Self::Bool(b) => write!(f, "{}", i32::from(*b)),
            Self::Integer(i) => write!(f, "{i}"),
            Self::Real(r) => {
                let rendered = r.to_string();
                if rendered.contains('.') || rendered.contains('e') || rendered.contains("inf") {
                    write!(f, "{rendered}")
                } else {
                    write!(f, "{rendered}.0")
                }
            }
            Self::Text(s) => write!(f, "{}", quote_string(s)),
            Self::Blob(bytes) => {
                write!(f, "X'")?;
                for byte in bytes {
                    write!(f, "{byte:02X}")?;
                }
                write!(f, "'")
            }
            Self::Expression(sql) => write!(f, "{sql}"),
        }
    }
}

/// One arm of a compound `UNION` query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Union {
    /// The arm's `SELECT` statement.
    pub sql: String,
    /// Whether to keep duplicate rows (`UNION ALL`).
    pub all: bool,
}

/// Conflict policy for [`QueryBuilder::upsert`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OnConflict<'a> {
    /// Leave the existing row untouched.
    Ignore,
    /// Overwrite every inserted column that is not part of a unique
    /// constraint.
    UpdateAll,
    /// Overwrite only the named columns.
    Update(&'a [&'a str]),
}

/// Builds the `LIMIT`/`OFFSET` clause, or an empty string when neither
/// is set.
#[must_use]
pub fn build_limit(limit: Option<u64>, offset: Option<u64>) -> String {
    let offset = offset.filter(|o| *o > 0);
    match (limit, offset) {
        (Some(limit), Some(offset)) => format!("LIMIT {limit} OFFSET {offset}"),
        (Some(limit), None) => format!("LIMIT {limit}"),
        (None, Some(offset)) => format!("LIMIT {LIMIT_SENTINEL} OFFSET {offset}"),
        (None, None) => String::new(),
    }
}

/// Assembles the `UNION` tail of a compound query, one arm per entry.
#[must_use]
pub fn build_union(unions: &[Union]) -> String {
    let mut result = String::new();
    for union in unions {
        result.push_str(if union.all { " UNION ALL " } else { " UNION " });
        result.push_str(&union.sql);
    }
    result.trim().to_owned()
}

/// Builds a `CREATE INDEX` statement. SQLite requires the schema
/// qualifier on the index name rather than on the table, so an index
/// on `aux.users` comes out as `CREATE INDEX "aux"."name" ON "users"`.
#[must_use]
pub fn create_index(name: &str, table: &str, columns: &[&str], unique: bool) -> String {
    let (schema, bare_table) = split_schema(table);
    let qualified_name = match schema {
        Some(schema) => format!(
            "{}.{}",
            quote_identifier(unquote_identifier(schema)),
            quote_identifier(unquote_identifier(name))
        ),
        None => quote_identifier(unquote_identifier(name)),
    };
    format!(
        "CREATE {}INDEX {} ON {} ({})",
        if unique { "UNIQUE " } else { "" },
        qualified_name,
        quote_identifier(unquote_identifier(bare_table)),
        build_columns(columns),
    )
}

/// Builds a `DROP INDEX` statement, qualifying the index name with the
/// table's schema.
#[must_use]
pub fn drop_index(name: &str, table: &str) -> String {
    let (schema, _) = split_schema(table);
    match schema {
        Some(schema) => format!(
            "DROP INDEX {}.{}",
            quote_identifier(unquote_identifier(schema)),
            quote_identifier(unquote_identifier(name))
        ),
        None => format!("DROP INDEX {}", quote_identifier(unquote_identifier(name))),
    }
}

/// A unique constraint is emulated with a unique index.
#[must_use]
pub fn add_unique(name: &str, table: &str, columns: &[&str]) -> String {
    create_index(name, table, columns, true)
}

/// Drops the unique index backing an emulated unique constraint.
#[must_use]
pub fn drop_unique(name: &str, table: &str) -> String {
    drop_index(name, table)
}

/// Builds an `ALTER TABLE ... RENAME TO` statement.
#[must_use]
pub fn rename_table(table: &str, new_name: &str) -> String {
    format!(
        "ALTER TABLE {} RENAME TO {}",
        quote_table(table),
        quote_table(new_name)
    )
}

/// SQLite has no `TRUNCATE`; an unqualified `DELETE` is the closest
/// equivalent.
#[must_use]
pub fn truncate_table(table: &str) -> String {
    format!("DELETE FROM {}", quote_table(table))
}

/// Builds the pragma that enables or disables foreign-key enforcement.
#[must_use]
pub fn check_integrity(enable: bool) -> String {
    format!("PRAGMA foreign_keys = {}", i32::from(enable))
}

/// Statement generation that needs catalog metadata.
pub struct QueryBuilder<'a, D: SchemaDb> {
    db: &'a D,
}

impl<'a, D: SchemaDb> QueryBuilder<'a, D> {
    /// Create a builder over the given connection.
    #[must_use]
    pub fn new(db: &'a D) -> Self {
        Self { db }
    }

    /// Builds an upsert as an `INSERT OR IGNORE` paired with a
    /// conditional `UPDATE` driven by a `WITH "EXCLUDED"` CTE, covering
    /// SQLite versions that predate `ON CONFLICT DO UPDATE`.
    ///
    /// Falls back to a plain `INSERT` when the table has no unique
    /// constraint fully covered by the inserted columns.
    pub fn upsert(
        &self,
        table: &str,
        columns: &[&str],
        values: &[Value],
        on_conflict: OnConflict<'_>,
    ) -> Result<String, Error> {
        let quoted_table = quote_table(table);
        let quoted_columns = columns
            .iter()
            .map(|c| quote_identifier(unquote_identifier(c)))
            .collect::<Vec<_>>();
        let rendered_values = values
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ");

        // Only constraints whose columns are all being inserted can
        // actually conflict with this row.
        let covered: Vec<Vec<String>> = self
            .db
            .unique_constraint_columns(table)?
            .into_iter()
            .filter(|constraint| {
                !constraint.is_empty()
                    && constraint
                        .iter()
                        .all(|col| columns.iter().any(|c| crate::sql::idents_equal(c, col)))
            })
            .collect();
        if covered.is_empty() {
            return Ok(format!(
                "INSERT INTO {quoted_table} ({}) VALUES ({rendered_values})",
                quoted_columns.join(", ")
            ));
        }

        let insert_sql = format!(
            "INSERT OR IGNORE INTO {quoted_table} ({}) VALUES ({rendered_values})",
            quoted_columns.join(", ")
        );
        let update_names: Vec<String> = match on_conflict {
            OnConflict::Ignore => return Ok(insert_sql),
            OnConflict::UpdateAll => columns
                .iter()
                .filter(|c| {
                    !covered
                        .iter()
                        .any(|constraint| constraint.iter().any(|k| crate::sql::idents_equal(c, k)))
                })
                .map(|c| quote_identifier(unquote_identifier(c)))
                .collect(),
            OnConflict::Update(names) => names
                .iter()
                .map(|c| quote_identifier(unquote_identifier(c)))
                .collect(),
        };
        if update_names.is_empty() {
            return Ok(insert_sql);
        }

        let condition = covered
            .iter()
            .map(|constraint| {
                constraint
                    .iter()
                    .map(|col| {
                        let quoted = quote_identifier(col);
                        format!("{quoted_table}.{quoted} = (SELECT {quoted} FROM \"EXCLUDED\")")
                    })
                    .collect::<Vec<_>>()
                    .join(" AND ")
            })
            .map(|clause| format!("({clause})"))
            .collect::<Vec<_>>()
            .join(" OR ");
        let assignments = update_names
            .iter()
            .map(|quoted| format!("{quoted} = (SELECT {quoted} FROM \"EXCLUDED\")"))
            .collect::<Vec<_>>()
            .join(", ");
        Ok(format!(
            "WITH \"EXCLUDED\" ({}) AS (VALUES ({rendered_values})) \
             UPDATE {quoted_table} SET {assignments} WHERE {condition}; {insert_sql}",
            quoted_columns.join(", ")
        ))
    }

    /// Builds a multi-row insert. SQLite grew multi-row `VALUES` in
    /// 3.7.11; older servers get the `SELECT ... UNION SELECT` form.
    pub fn batch_insert(
        &self,
        table: &str,
        columns: &[&str],
        rows: &[Vec<Value>],
    ) -> Result<String, Error> {
        if rows.is_empty() {
            return Ok(String::new());
        }
        let quoted_columns = columns
            .iter()
            .map(|c| quote_identifier(unquote_identifier(c)))
            .collect::<Vec<_>>()
            .join(", ");
        let rendered: Vec<String> = rows
            .iter()
            .map(|row| {
                row.iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join(", ")
            })
            .collect();
        let quoted_table = quote_table(table);
        if version_at_least(&self.db.server_version()?, (3, 7, 11)) {
            let tuples = rendered
                .iter()
                .map(|row| format!("({row})"))
                .collect::<Vec<_>>()
                .join(", ");
            Ok(format!(
                "INSERT INTO {quoted_table} ({quoted_columns}) VALUES {tuples}"
            ))
        } else {
            Ok(format!(
                "INSERT INTO {quoted_table} ({quoted_columns}) SELECT {}",
                rendered.join(" UNION SELECT ")
            ))
        }
    }

    /// Builds the `sqlite_sequence` update that makes the next inserted
    /// row's auto-increment key take `value` (or follow the current
    /// maximum when `None`).
    pub fn reset_sequence(&self, table: &str, value: Option<i64>) -> Result<String, Error> {
        let (_, bare_table) = split_schema(table);
        let bare_table = unquote_identifier(bare_table);
        let pk = self
            .db
            .query_column(&format!(
                "SELECT name FROM pragma_table_info({}) WHERE pk = 1",
                quote_string(bare_table)
            ))?
            .into_iter()
            .next();
        let Some(pk) = pk else {
            // No integer primary key means no sequence to reset.
            if self.db.create_table_sql(table).is_err() {
                return Err(Error::TableNotFound(table.to_owned()));
            }
            return Err(Error::Unsupported {
                operation: "reset_sequence",
            });
        };
        let seq = match value {
            Some(value) => value - 1,
            None => {
                let max = self.db.query_scalar(&format!(
                    "SELECT MAX({}) FROM {}",
                    quote_identifier(&pk),
                    quote_table(table)
                ))?;
                max.and_then(|v| v.parse().ok()).unwrap_or(0)
            }
        };
        Ok(format!(
            "UPDATE sqlite_sequence SET seq = {seq} WHERE name = {}",
            quote_string(bare_table)
        ))
    }
}

/// Quote plain column names, passing expressions (anything containing
/// a parenthesis) through untouched.
fn build_columns(columns: &[&str]) -> String {
    columns
        .iter()
        .map(|column| {
            if column.contains('(') {
                (*column).to_owned()
            } else {
                quote_identifier(unquote_identifier(column))
            }
        })
        .collect::<Vec<_>>()
        .join(", ")
}

/// Compare a dotted server version string against a minimum.
fn version_at_least(version: &str, minimum: (u32, u32, u32)) -> bool {
    let mut parts = version.split('.').map(|p| p.parse::<u32>().unwrap_or(0));
    let actual = (
        parts.next().unwrap_or(0),
        parts.next().unwrap_or(0),
        parts.next().unwrap_or(0),
    );
    actual >= minimum
}

#[cfg(test)]
mod tests {
    use super::{
        build_limit, build_union, check_integrity, create_index, drop_index, rename_table,
        truncate_table, version_at_least, Union, Value,
    };

    #[test]
    fn limit_clause_forms() {
        assert_eq!(build_limit(Some(10), Some(5)), "LIMIT 10 OFFSET 5");
        assert_eq!(build_limit(Some(10), Some(0)), "LIMIT 10");
        assert_eq!(build_limit(Some(10), None), "LIMIT 10");
        assert_eq!(
            build_limit(None, Some(5)),
            "LIMIT 9223372036854775807 OFFSET 5"
        );
        assert_eq!(build_limit(None, None), "");
    }

    #[test]
    fn union_assembly() {
        let unions = [
            Union {
                sql: "SELECT 1".to_owned(),
                all: false,
            },
            Union {
                sql: "SELECT 2".to_owned(),
                all: true,
            },
        ];
        assert_eq!(build_union(&unions), "UNION SELECT 1 UNION ALL SELECT 2");
        assert_eq!(build_union(&[]), "");
    }

    #[test]
    fn index_name_takes_the_schema_qualifier() {
        assert_eq!(
            create_index("idx", "aux.users", &["name"], false),
            "CREATE INDEX \"aux\".\"idx\" ON \"users\" (\"name\")"
        );
        assert_eq!(
            create_index("idx", "users", &["lower(name)"], true),
            "CREATE UNIQUE INDEX \"idx\" ON \"users\" (lower(name))"
        );
        assert_eq!(drop_index("idx", "aux.users"), "DROP INDEX \"aux\".\"idx\"");
    }

    #[test]
    fn simple_statements() {
        assert_eq!(truncate_table("users"), "DELETE FROM \"users\"");
        assert_eq!(
            rename_table("users", "people"),
            "ALTER TABLE \"users\" RENAME TO \"people\""
        );
        assert_eq!(check_integrity(false), "PRAGMA foreign_keys = 0");
    }

    #[test]
    fn value_rendering() {
        assert_eq!(Value::Null.to_string(), "NULL");
        assert_eq!(Value::Bool(true).to_string(), "1");
        assert_eq!(Value::Integer(-3).to_string(), "-3");
        assert_eq!(Value::Real(1.0).to_string(), "1.0");
        assert_eq!(Value::Real(2.5).to_string(), "2.5");
        assert_eq!(Value::Text("it's".to_owned()).to_string(), "'it''s'");
        assert_eq!(Value::Blob(vec![0xAB, 0x01]).to_string(), "X'AB01'");
        assert_eq!(
            Value::Expression("CURRENT_TIMESTAMP".to_owned()).to_string(),
            "CURRENT_TIMESTAMP"
        );
    }

    #[test]
    fn version_comparison() {
        assert!(version_at_least("3.7.11", (3, 7, 11)));
        assert!(version_at_least("3.45.1", (3, 7, 11)));
        assert!(!version_at_least("3.6.23", (3, 7, 11)));
    }
}
