//! Tests for the in-place column rename.
//!
//! These verify the catalog rewrite end to end: the renamed column in
//! the stored DDL, rewritten index definitions (still enforced after
//! the rename), and foreign-key clauses that follow the column.

mod common;

use common::TestDb;
use sqlite_alter_rs::{Error, SchemaRewriter};

#[test]
fn renames_in_place_and_keeps_rows() {
    let db = TestDb::new();
    db.batch(
        "CREATE TABLE users (id integer PRIMARY KEY, name text);
         INSERT INTO users (name) VALUES ('ada'), ('bob');",
    );

    let script = SchemaRewriter::new(&db)
        .rename_column("users", "name", "full_name")
        .expect("build script");
    db.batch(&script);

    assert_eq!(db.columns("users"), ["id", "full_name"]);
    assert_eq!(db.count("users"), 2);
    let first: String = db
        .0
        .query_row("SELECT full_name FROM users WHERE id = 1", [], |row| {
            row.get(0)
        })
        .expect("renamed column is queryable");
    assert_eq!(first, "ada");
}

#[test]
fn rewrites_indexes_on_the_renamed_column() {
    let db = TestDb::new();
    db.batch(
        "CREATE TABLE users (id integer PRIMARY KEY, email text, city text);
         CREATE UNIQUE INDEX idx_users_email ON users (email);
         CREATE INDEX idx_users_city ON users (city);
         INSERT INTO users (email, city) VALUES ('a@x', 'rome');",
    );

    let script = SchemaRewriter::new(&db)
        .rename_column("users", "email", "mail")
        .expect("build script");
    db.batch(&script);

    assert_eq!(db.columns("users"), ["id", "mail", "city"]);
    assert_eq!(
        db.index_names("users"),
        ["idx_users_city", "idx_users_email"]
    );
    // The unique index carried over to the new column name.
    let err = db
        .0
        .execute("INSERT INTO users (mail, city) VALUES ('a@x', 'oslo')", []);
    assert!(err.is_err(), "unique index should still enforce");
}

#[test]
fn follows_the_column_into_foreign_key_clauses() {
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
        .rename_column("children", "parent_id", "owner_id")
        .expect("build script");
    db.batch(&script);

    assert_eq!(db.columns("children"), ["id", "owner_id"]);
    let fks = db.foreign_keys("children");
    assert_eq!(fks.len(), 1);
    assert_eq!(fks[0].1, "owner_id");
}

#[test]
fn round_trip_restores_the_original_name() {
    let db = TestDb::new();
    db.batch(
        "CREATE TABLE t (id integer PRIMARY KEY, a text);
         INSERT INTO t (a) VALUES ('x');",
    );
    let rewriter = SchemaRewriter::new(&db);

    let there = rewriter.rename_column("t", "a", "b").expect("build script");
    db.batch(&there);
    assert_eq!(db.columns("t"), ["id", "b"]);

    let back = rewriter.rename_column("t", "b", "a").expect("build script");
    db.batch(&back);
    assert_eq!(db.columns("t"), ["id", "a"]);
    assert_eq!(db.count("t"), 1);
}

#[test]
fn unknown_column_is_an_error() {
    let db = TestDb::new();
    db.batch("CREATE TABLE t (id integer)");

    let err = SchemaRewriter::new(&db)
        .rename_column("t", "missing", "other")
        .expect_err("should fail");
    assert!(matches!(err, Error::ColumnNotFound { .. }));
}
