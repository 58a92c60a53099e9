//! The Metadata Oracle trait: the resolver's only window into the mapping
//! model. Queried heavily during resolution, never mutated, all lookups
//! in-memory.

use super::dialect::DialectCapabilities;
use super::errors::MetadataError;
use super::types::RelationalType;

/// Describes one collection role: where its rows live and how they connect
/// owner and element.
#[derive(Clone, Debug, PartialEq)]
pub struct CollectionDescriptor {
    pub role: String,
    /// The collection table. For a one-to-many of entities this is the
    /// element entity's own table; for many-to-many it is the association
    /// table; for value collections it is the dedicated collection table.
    pub table: String,
    /// Columns in `table` referencing the owner's key.
    pub key_columns: Vec<String>,
    /// Columns in `table` carrying the element value (element entity PK
    /// columns for one-to-many, value columns otherwise, element-side FK
    /// columns for many-to-many).
    pub element_columns: Vec<String>,
    pub element_type: RelationalType,
    /// Element entity name when the element is an entity.
    pub element_entity: Option<String>,
    /// Index/key columns for indexed collections and maps; empty otherwise.
    pub index_columns: Vec<String>,
    pub index_type: Option<RelationalType>,
    /// True when the collection routes through an association table that is
    /// distinct from the element entity's table.
    pub many_to_many: bool,
}

impl CollectionDescriptor {
    pub fn is_indexed(&self) -> bool {
        !self.index_columns.is_empty()
    }
}

/// A resolvable constant (the fallback interpretation for a dotted path
/// that is not a property reference at all).
#[derive(Clone, Debug, PartialEq)]
pub enum ConstantValue {
    Integer(i64),
    Float(f64),
    String(String),
    Boolean(bool),
}

impl ConstantValue {
    pub fn sql_literal(&self) -> String {
        match self {
            Self::Integer(i) => i.to_string(),
            Self::Float(f) => f.to_string(),
            Self::String(s) => format!("'{}'", s.replace('\'', "''")),
            Self::Boolean(b) => b.to_string(),
        }
    }
}

/// A registered SQL function known to the dialect.
#[derive(Clone, Debug, PartialEq)]
pub struct SqlFunctionDescriptor {
    pub name: String,
    /// Fixed return type, or None when the function returns its first
    /// argument's type (e.g. upper/lower/trim).
    pub return_type: Option<RelationalType>,
}

/// Read-only mapping metadata interface.
///
/// `property_type` is speculative by design: `None` means "no such
/// property", which callers use to try alternate interpretations (naked
/// property references, constants) without exception-driven control flow.
/// The column lookups are not speculative and fail with [`MetadataError`].
pub trait MetadataOracle {
    /// Type of `property_path` (dotted, may traverse components) on the
    /// given owner type, or None when the owner has no such property.
    fn property_type(&self, owner: &RelationalType, property_path: &str)
        -> Option<RelationalType>;

    /// Columns mapping `property_path` on the owner type, each qualified
    /// with `qualifier` (a table alias, or a table name for unaliased bulk
    /// statements).
    fn columns_for(
        &self,
        owner: &RelationalType,
        qualifier: &str,
        property_path: &str,
    ) -> Result<Vec<String>, MetadataError>;

    fn entity_table(&self, entity: &str) -> Result<String, MetadataError>;

    fn identifier_property(&self, entity: &str) -> Result<String, MetadataError>;

    fn identifier_type(&self, entity: &str) -> Result<RelationalType, MetadataError>;

    fn identifier_columns(
        &self,
        entity: &str,
        qualifier: &str,
    ) -> Result<Vec<String>, MetadataError>;

    /// Whether the entity spans several tables (joined-subclass etc.);
    /// switches column qualification rules in bulk statements.
    fn is_multi_table(&self, entity: &str) -> bool;

    /// True when `property` is declared on a subclass or superclass of
    /// `entity` rather than on `entity` itself. Dereferencing such a
    /// property widens discriminator filtering on the owning table
    /// reference.
    fn is_sub_or_superclass_property(&self, entity: &str, property: &str) -> bool;

    fn collection_descriptor(&self, role: &str) -> Result<CollectionDescriptor, MetadataError>;

    /// Per-subtype join column sets for associations whose target has no
    /// single join-column set. Outer Vec: one entry per subtype.
    fn polymorphic_join_columns(
        &self,
        entity: &str,
        qualifier: &str,
        property_path: &str,
    ) -> Result<Vec<Vec<String>>, MetadataError>;

    /// Constant lookup for paths like `com.acme.Color.RED`.
    fn constant(&self, path: &str) -> Option<ConstantValue>;

    fn sql_function(&self, name: &str) -> Option<SqlFunctionDescriptor>;

    fn dialect(&self) -> &DialectCapabilities;
}
