//! Integration tests: whole statements translated end to end and checked
//! against the generated SQL.

#[path = "../common/mod.rs"]
#[allow(dead_code)]
mod common;

mod bulk_statement_tests;
mod subquery_tests;
