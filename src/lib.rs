#![doc = include_str!("../README.md")]
#![deny(clippy::mod_module_files)]

pub mod builder;
pub mod db;
pub mod errors;
pub mod expr;
pub mod rewriter;
pub mod sql;

pub use builder::{OnConflict, QueryBuilder, Union, Value};
pub use db::{bootstrap, Options, SchemaDb};
pub use errors::Error;
pub use expr::translate;
pub use rewriter::{ConstraintId, SchemaRewriter};
