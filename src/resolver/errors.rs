use thiserror::Error;

use crate::meta::errors::MetadataError;

/// Malformed operator structure. Reported immediately; aborts compilation
/// of the statement.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum SemanticError {
    #[error("operand of '{operator}' is missing")]
    MissingOperand { operator: String },

    #[error("'{operator}' is not applicable between two datetime operands")]
    DatetimeAddition { operator: String },

    #[error("cannot '{operator}' a datetime operand")]
    DatetimeMultiplication { operator: String },

    #[error("expression expected where a collection path [{0}] was given")]
    UnexpectedCollection(String),
}

/// Terminal for the current statement, but never corrupts shared state.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum QueryError {
    #[error("Duplicate definition of alias '{0}'")]
    DuplicateAlias(String),

    #[error(
        "illegal attempt to dereference collection [{path}] with element property reference [{property}]"
    )]
    IllegalCollectionDereference { path: String, property: String },

    #[error("collection property '{property}' is not applicable to the non-collection path [{path}]")]
    NotACollection { path: String, property: String },

    #[error("cannot compare tuples of different lengths: {lhs} vs {rhs} columns")]
    RowValueColumnMismatch { lhs: usize, rhs: usize },

    #[error(
        "query specified join fetching, but the owner of the fetched association was not present in the select list [{path}]"
    )]
    FetchWithoutSelectOwner { path: String },

    #[error("could not resolve property path [{path}]")]
    UnresolvedPath { path: String },

    #[error("naked property reference [{property}] is ambiguous: more than one FROM element declares it")]
    AmbiguousNakedProperty { property: String },

    #[error("unable to locate an appropriate left-hand side for [{path}]")]
    MissingJoinOrigin { path: String },

    #[error("collection path [{path}] is not indexed and cannot be subscripted")]
    NotIndexed { path: String },

    #[error("compatibility mode '{0}' is not supported by this translator")]
    UnsupportedCompatMode(String),

    #[error("unknown function '{0}'")]
    UnknownFunction(String),

    #[error(transparent)]
    Metadata(#[from] MetadataError),
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum TranslationError {
    #[error(transparent)]
    Semantic(#[from] SemanticError),

    #[error(transparent)]
    Query(#[from] QueryError),
}

impl From<MetadataError> for TranslationError {
    fn from(err: MetadataError) -> Self {
        Self::Query(QueryError::Metadata(err))
    }
}

/// Result of a speculative interpretation: resolving a token one way may
/// simply not apply, in which case the caller tries the next
/// interpretation. Exceptions are reserved for conditions that are errors
/// under every interpretation.
#[derive(Debug, Clone, PartialEq)]
pub enum Attempt<T> {
    Resolved(T),
    NotApplicable,
}

impl<T> Attempt<T> {
    pub fn is_resolved(&self) -> bool {
        matches!(self, Self::Resolved(_))
    }

    pub fn into_option(self) -> Option<T> {
        match self {
            Self::Resolved(value) => Some(value),
            Self::NotApplicable => None,
        }
    }
}
