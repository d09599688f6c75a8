//! Tests for the remaining table-rebuild operations: column type
//! changes, primary-key addition, and the operations SQLite cannot
//! express at all.

mod common;

use common::TestDb;
use sqlite_alter_rs::{Error, SchemaRewriter};

#[test]
fn alter_column_changes_the_declared_type() {
    let db = TestDb::new();
    db.batch(
        "CREATE TABLE items (id integer PRIMARY KEY, qty text);
         INSERT INTO items (qty) VALUES ('7');",
    );

    let script = SchemaRewriter::new(&db)
        .alter_column("items", "qty", "integer NOT NULL DEFAULT 0")
        .expect("build script");
    db.batch(&script);

    let declared: String = db
        .0
        .query_row(
            "SELECT type FROM pragma_table_info('items') WHERE name = 'qty'",
            [],
            |row| row.get(0),
        )
        .expect("column exists");
    // pragma_table_info normalizes the declared type's case.
    assert!(declared.eq_ignore_ascii_case("integer"), "got {declared}");
    let qty: i64 = db
        .0
        .query_row("SELECT qty FROM items WHERE id = 1", [], |row| row.get(0))
        .expect("value carried over");
    assert_eq!(qty, 7);
}

#[test]
fn alter_column_keeps_indexes() {
    let db = TestDb::new();
    db.batch(
        "CREATE TABLE items (id integer PRIMARY KEY, qty text, label text);
         CREATE INDEX idx_items_label ON items (label);",
    );

    let script = SchemaRewriter::new(&db)
        .alter_column("items", "qty", "real")
        .expect("build script");
    db.batch(&script);

    assert_eq!(db.index_names("items"), ["idx_items_label"]);
}

#[test]
fn alter_unknown_column_is_an_error() {
    let db = TestDb::new();
    db.batch("CREATE TABLE t (id integer)");

    let err = SchemaRewriter::new(&db)
        .alter_column("t", "missing", "text")
        .expect_err("should fail");
    assert!(matches!(err, Error::ColumnNotFound { .. }));
}

#[test]
fn add_primary_key_rebuilds_with_the_constraint() {
    let db = TestDb::new();
    db.batch(
        "CREATE TABLE pairs (a integer, b integer);
         INSERT INTO pairs (a, b) VALUES (1, 1), (1, 2);",
    );

    let script = SchemaRewriter::new(&db)
        .add_primary_key("pk_pairs", "pairs", &["a", "b"])
        .expect("build script");
    db.batch(&script);

    assert_eq!(db.count("pairs"), 2);
    let err = db
        .0
        .execute("INSERT INTO pairs (a, b) VALUES (1, 1)", []);
    assert!(err.is_err(), "primary key should reject duplicates");
}

#[test]
fn unsupported_operations_say_so() {
    let db = TestDb::new();
    let rewriter = SchemaRewriter::new(&db);

    assert!(matches!(
        rewriter.drop_primary_key("pk", "t"),
        Err(Error::Unsupported { .. })
    ));
    assert!(matches!(
        rewriter.add_check("ck", "t", "a > 0"),
        Err(Error::Unsupported { .. })
    ));
    assert!(matches!(
        rewriter.drop_default_value("df", "t"),
        Err(Error::Unsupported { .. })
    ));
    assert!(matches!(
        rewriter.add_comment_on_table("t", "hello"),
        Err(Error::Unsupported { .. })
    ));
}
