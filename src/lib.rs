//! hqlc - Semantic resolution and SQL generation for object queries
//!
//! This crate turns an already-parsed HQL syntax tree (queries over
//! entity/association/collection abstractions) into:
//! - an annotated tree where every node carries a resolved relational type
//!   and rendered SQL text,
//! - a FROM-clause plan of table references and joins, including joins
//!   synthesized on demand while navigating associations and collections,
//! - a projection descriptor mapping result columns back to projections,
//! - a parameter-binding plan with inferred expected types.
//!
//! The lexer/parser, statement execution and the persistence metadata model
//! are external collaborators: trees come in pre-built ([`hql`]), metadata
//! is consumed through the [`meta::MetadataOracle`] trait, and the rendered
//! fragments are handed off to whatever assembles and runs the statement.

pub mod config;
pub mod hql;
pub mod meta;
pub mod resolver;
pub mod sqlgen;

pub use config::TranslatorConfig;
pub use resolver::{translate, TranslationOutput};
