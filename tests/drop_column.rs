//! Tests for `DROP COLUMN` emulation.
//!
//! Each generated script is executed against a live in-memory database
//! and the rebuilt schema, surviving rows, and surviving indexes are
//! asserted afterwards.

mod common;

use common::TestDb;
use sqlite_alter_rs::{Error, SchemaRewriter};

#[test]
fn drops_the_column_and_keeps_the_rest() {
    let db = TestDb::new();
    db.batch(
        "CREATE TABLE users (id integer PRIMARY KEY, name text NOT NULL, legacy integer);
         CREATE INDEX idx_users_name ON users (name);
         CREATE INDEX idx_users_legacy ON users (legacy);
         INSERT INTO users (name, legacy) VALUES ('ada', 1), ('bob', 2);",
    );

    let script = SchemaRewriter::new(&db)
        .drop_column("users", "legacy")
        .expect("build script");
    db.batch(&script);

    assert_eq!(db.columns("users"), ["id", "name"]);
    assert_eq!(db.count("users"), 2);
    // The index on the dropped column is gone, the other survives.
    assert_eq!(db.index_names("users"), ["idx_users_name"]);
}

#[test]
fn preserves_remaining_values() {
    let db = TestDb::new();
    db.batch(
        "CREATE TABLE items (id integer PRIMARY KEY, label text, price real);
         INSERT INTO items (label, price) VALUES ('widget', 9.5);",
    );

    let script = SchemaRewriter::new(&db)
        .drop_column("items", "price")
        .expect("build script");
    db.batch(&script);

    let label: String = db
        .0
        .query_row("SELECT label FROM items WHERE id = 1", [], |row| row.get(0))
        .expect("row survives");
    assert_eq!(label, "widget");
}

#[test]
fn removes_constraints_on_the_dropped_column() {
    let db = TestDb::new();
    db.batch(
        "CREATE TABLE parents (id integer PRIMARY KEY);
         CREATE TABLE children (
             id integer PRIMARY KEY,
             parent_id integer,
             CONSTRAINT fk_parent FOREIGN KEY (parent_id) REFERENCES parents (id)
         );",
    );

    let script = SchemaRewriter::new(&db)
        .drop_column("children", "parent_id")
        .expect("build script");
    db.batch(&script);

    assert_eq!(db.columns("children"), ["id"]);
    assert!(db.foreign_keys("children").is_empty());
}

#[test]
fn removes_self_references_to_the_dropped_column() {
    let db = TestDb::new();
    db.batch(
        "CREATE TABLE other (a integer PRIMARY KEY);
         CREATE TABLE tree (
             id integer PRIMARY KEY,
             alt integer UNIQUE,
             parent integer,
             link integer,
             FOREIGN KEY (parent) REFERENCES tree (alt),
             FOREIGN KEY (link) REFERENCES other (a)
         );",
    );

    let script = SchemaRewriter::new(&db)
        .drop_column("tree", "alt")
        .expect("build script");
    db.batch(&script);

    // The constraint referencing tree.alt is gone; the one referencing
    // other.a survives even though the column names collide.
    assert_eq!(db.columns("tree"), ["id", "parent", "link"]);
    assert_eq!(
        db.foreign_keys("tree"),
        vec![("other".to_owned(), "link".to_owned(), "a".to_owned())]
    );
}

#[test]
fn unknown_column_is_an_error() {
    let db = TestDb::new();
    db.batch("CREATE TABLE t (id integer)");

    let err = SchemaRewriter::new(&db)
        .drop_column("t", "missing")
        .expect_err("should fail");
    assert!(matches!(err, Error::ColumnNotFound { .. }));
}

#[test]
fn unknown_table_is_an_error() {
    let db = TestDb::new();
    let err = SchemaRewriter::new(&db)
        .drop_column("nope", "id")
        .expect_err("should fail");
    assert!(matches!(err, Error::TableNotFound(_)));
}
