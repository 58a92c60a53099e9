use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum MetadataError {
    #[error("entity '{0}' is not mapped")]
    UnknownEntity(String),

    #[error("collection role '{0}' is not mapped")]
    UnknownCollectionRole(String),

    #[error("could not resolve property '{property}' of '{owner}'")]
    UnknownProperty { owner: String, property: String },

    #[error("invalid mapping for '{owner}': {detail}")]
    InvalidMapping { owner: String, detail: String },
}
