//! Metadata boundary: the persistence mapping model as seen by the resolver.
//!
//! The resolver never owns mapping information. Everything it needs - "does
//! property P exist on type T, what columns does it map to, is it a
//! collection/entity/component" - is answered through the [`MetadataOracle`]
//! trait. [`MappingCatalog`] is the bundled in-memory implementation,
//! buildable programmatically or deserialized from YAML.

pub mod catalog;
pub mod dialect;
pub mod errors;
pub mod oracle;
pub mod types;

pub use catalog::MappingCatalog;
pub use dialect::DialectCapabilities;
pub use errors::MetadataError;
pub use oracle::{CollectionDescriptor, ConstantValue, MetadataOracle, SqlFunctionDescriptor};
pub use types::{PrimitiveKind, RelationalType, TypeCategory};
