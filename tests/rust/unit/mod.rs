//! Unit tests: resolver behavior one decision at a time, against the
//! shared commerce fixture.

#[path = "../common/mod.rs"]
#[allow(dead_code)]
mod common;

mod path_resolution_tests;
mod projection_tests;
