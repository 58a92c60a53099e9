//! In-memory mapping catalog.
//!
//! The bundled [`MetadataOracle`] implementation. Mappings can be built
//! programmatically (tests, embedders with their own model) or loaded from
//! a YAML document describing entities, collection roles and constants.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use super::dialect::DialectCapabilities;
use super::errors::MetadataError;
use super::oracle::{
    CollectionDescriptor, ConstantValue, MetadataOracle, SqlFunctionDescriptor,
};
use super::types::{PrimitiveKind, RelationalType, TypeCategory};

/// One mapped property of an entity or component.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum PropertySpec {
    Scalar {
        #[serde(rename = "type")]
        ty: PrimitiveKind,
        columns: Vec<String>,
    },
    Component {
        class: String,
        properties: BTreeMap<String, PropertySpec>,
    },
    Association {
        entity: String,
        /// FK columns on the owning table. Empty for associations joined
        /// through per-subtype column sets (see `polymorphic`).
        #[serde(default)]
        columns: Vec<String>,
        #[serde(default)]
        nullable: bool,
    },
    Collection {
        role: String,
    },
}

/// One mapped entity.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EntityMapping {
    pub name: String,
    pub table: String,
    pub id_property: String,
    pub id_columns: Vec<String>,
    #[serde(default = "default_id_kind")]
    pub id_kind: PrimitiveKind,
    #[serde(default)]
    pub properties: BTreeMap<String, PropertySpec>,
    #[serde(default)]
    pub multi_table: bool,
    /// Properties declared on a sub- or superclass of this entity rather
    /// than on the entity itself. Dereferencing one widens discriminator
    /// filtering on the owning table reference.
    #[serde(default)]
    pub subclass_properties: Vec<String>,
    /// Per-subtype join column sets, keyed by association property name,
    /// for targets with no single join-column set.
    #[serde(default)]
    pub polymorphic: BTreeMap<String, Vec<Vec<String>>>,
}

fn default_id_kind() -> PrimitiveKind {
    PrimitiveKind::Long
}

impl EntityMapping {
    pub fn new(
        name: impl Into<String>,
        table: impl Into<String>,
        id_property: impl Into<String>,
        id_columns: Vec<String>,
    ) -> Self {
        Self {
            name: name.into(),
            table: table.into(),
            id_property: id_property.into(),
            id_columns,
            id_kind: PrimitiveKind::Long,
            properties: BTreeMap::new(),
            multi_table: false,
            subclass_properties: Vec::new(),
            polymorphic: BTreeMap::new(),
        }
    }

    pub fn with_scalar(
        mut self,
        name: impl Into<String>,
        ty: PrimitiveKind,
        columns: Vec<String>,
    ) -> Self {
        self.properties
            .insert(name.into(), PropertySpec::Scalar { ty, columns });
        self
    }

    pub fn with_association(
        mut self,
        name: impl Into<String>,
        entity: impl Into<String>,
        columns: Vec<String>,
        nullable: bool,
    ) -> Self {
        self.properties.insert(
            name.into(),
            PropertySpec::Association {
                entity: entity.into(),
                columns,
                nullable,
            },
        );
        self
    }

    pub fn with_collection(mut self, name: impl Into<String>, role: impl Into<String>) -> Self {
        self.properties
            .insert(name.into(), PropertySpec::Collection { role: role.into() });
        self
    }

    pub fn with_component(
        mut self,
        name: impl Into<String>,
        class: impl Into<String>,
        properties: BTreeMap<String, PropertySpec>,
    ) -> Self {
        self.properties.insert(
            name.into(),
            PropertySpec::Component {
                class: class.into(),
                properties,
            },
        );
        self
    }

    fn id_type(&self) -> RelationalType {
        if self.id_columns.len() > 1 {
            RelationalType::component(format!("{}.id", self.name), self.id_columns.len())
        } else {
            RelationalType::primitive(self.id_kind)
        }
    }
}

/// The element side of a collection mapping.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ElementSpec {
    Entity {
        entity: String,
        columns: Vec<String>,
    },
    Value {
        #[serde(rename = "type")]
        ty: PrimitiveKind,
        columns: Vec<String>,
    },
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct IndexSpec {
    #[serde(rename = "type")]
    pub ty: PrimitiveKind,
    pub columns: Vec<String>,
}

/// One mapped collection role.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CollectionMapping {
    pub role: String,
    pub table: String,
    pub key_columns: Vec<String>,
    pub element: ElementSpec,
    #[serde(default)]
    pub index: Option<IndexSpec>,
    #[serde(default)]
    pub many_to_many: bool,
}

impl CollectionMapping {
    fn descriptor(&self) -> CollectionDescriptor {
        let (element_type, element_entity, element_columns) = match &self.element {
            ElementSpec::Entity { entity, columns } => (
                RelationalType::entity(entity.clone(), false, columns.len()),
                Some(entity.clone()),
                columns.clone(),
            ),
            ElementSpec::Value { ty, columns } => (
                RelationalType::primitive(*ty),
                None,
                columns.clone(),
            ),
        };
        CollectionDescriptor {
            role: self.role.clone(),
            table: self.table.clone(),
            key_columns: self.key_columns.clone(),
            element_columns,
            element_type,
            element_entity,
            index_columns: self
                .index
                .as_ref()
                .map(|i| i.columns.clone())
                .unwrap_or_default(),
            index_type: self
                .index
                .as_ref()
                .map(|i| RelationalType::primitive(i.ty)),
            many_to_many: self.many_to_many,
        }
    }
}

/// Serializable body of a catalog.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct CatalogDefinition {
    #[serde(default)]
    pub dialect: Option<DialectCapabilities>,
    #[serde(default)]
    pub entities: Vec<EntityMapping>,
    #[serde(default)]
    pub collections: Vec<CollectionMapping>,
    #[serde(default)]
    pub constants: BTreeMap<String, ConstantDef>,
}

/// Serializable constant values.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConstantDef {
    Boolean(bool),
    Integer(i64),
    Float(f64),
    String(String),
}

impl From<ConstantDef> for ConstantValue {
    fn from(def: ConstantDef) -> Self {
        match def {
            ConstantDef::Boolean(b) => ConstantValue::Boolean(b),
            ConstantDef::Integer(i) => ConstantValue::Integer(i),
            ConstantDef::Float(f) => ConstantValue::Float(f),
            ConstantDef::String(s) => ConstantValue::String(s),
        }
    }
}

/// In-memory [`MetadataOracle`] implementation.
pub struct MappingCatalog {
    dialect: DialectCapabilities,
    entities: HashMap<String, EntityMapping>,
    collections: HashMap<String, CollectionMapping>,
    constants: HashMap<String, ConstantValue>,
    functions: HashMap<String, SqlFunctionDescriptor>,
}

impl MappingCatalog {
    pub fn new() -> Self {
        Self {
            dialect: DialectCapabilities::default(),
            entities: HashMap::new(),
            collections: HashMap::new(),
            constants: HashMap::new(),
            functions: builtin_functions(),
        }
    }

    pub fn with_dialect(mut self, dialect: DialectCapabilities) -> Self {
        self.dialect = dialect;
        self
    }

    pub fn add_entity(&mut self, mapping: EntityMapping) {
        self.entities.insert(mapping.name.clone(), mapping);
    }

    pub fn add_collection(&mut self, mapping: CollectionMapping) {
        self.collections.insert(mapping.role.clone(), mapping);
    }

    pub fn add_constant(&mut self, path: impl Into<String>, value: ConstantValue) {
        self.constants.insert(path.into(), value);
    }

    pub fn add_function(&mut self, descriptor: SqlFunctionDescriptor) {
        self.functions
            .insert(descriptor.name.to_lowercase(), descriptor);
    }

    pub fn from_yaml(yaml: &str) -> Result<Self, MetadataError> {
        let def: CatalogDefinition =
            serde_yaml::from_str(yaml).map_err(|e| MetadataError::InvalidMapping {
                owner: "<catalog>".to_string(),
                detail: e.to_string(),
            })?;
        Ok(Self::from_definition(def))
    }

    pub fn from_definition(def: CatalogDefinition) -> Self {
        let mut catalog = Self::new();
        if let Some(dialect) = def.dialect {
            catalog.dialect = dialect;
        }
        for entity in def.entities {
            catalog.add_entity(entity);
        }
        for collection in def.collections {
            catalog.add_collection(collection);
        }
        for (path, value) in def.constants {
            catalog.add_constant(path, value.into());
        }
        catalog
    }

    fn entity(&self, name: &str) -> Result<&EntityMapping, MetadataError> {
        self.entities
            .get(name)
            .ok_or_else(|| MetadataError::UnknownEntity(name.to_string()))
    }

    /// Walk a dotted property path against an entity, descending through
    /// components, and return the resolved type plus its unqualified
    /// columns. `None` means "no such property" (speculative lookup).
    fn walk(&self, entity: &EntityMapping, path: &str) -> Option<(RelationalType, Vec<String>)> {
        let mut segments = path.split('.');
        let first = segments.next()?;
        let rest: Vec<&str> = segments.collect();

        if first == entity.id_property {
            // Identifier reference; composite ids may be dereferenced one
            // level deeper but component ids keep their full column list.
            if rest.is_empty() {
                return Some((entity.id_type(), entity.id_columns.clone()));
            }
            return None;
        }

        let spec = entity.properties.get(first)?;
        self.walk_spec(spec, &rest)
    }

    fn walk_spec(
        &self,
        spec: &PropertySpec,
        rest: &[&str],
    ) -> Option<(RelationalType, Vec<String>)> {
        match spec {
            PropertySpec::Scalar { ty, columns } => {
                if rest.is_empty() {
                    Some((RelationalType::primitive(*ty), columns.clone()))
                } else {
                    None
                }
            }
            PropertySpec::Association {
                entity,
                columns,
                nullable,
            } => {
                if rest.is_empty() {
                    let span = if columns.is_empty() {
                        self.entities
                            .get(entity)
                            .map(|e| e.id_columns.len())
                            .unwrap_or(0)
                    } else {
                        columns.len()
                    };
                    return Some((
                        RelationalType::entity(entity.clone(), *nullable, span),
                        columns.clone(),
                    ));
                }
                // `customer.id` style paths: the FK embedded in the owning
                // table answers for the target's identifier without a join.
                let target = self.entities.get(entity)?;
                if rest.len() == 1 && rest[0] == target.id_property && !columns.is_empty() {
                    return Some((target.id_type(), columns.clone()));
                }
                None
            }
            PropertySpec::Collection { role } => {
                if rest.is_empty() {
                    Some((RelationalType::collection(role.clone()), Vec::new()))
                } else {
                    None
                }
            }
            PropertySpec::Component { class, properties } => {
                if rest.is_empty() {
                    let columns = component_columns(properties);
                    return Some((
                        RelationalType::component(class.clone(), columns.len()),
                        columns,
                    ));
                }
                let next = properties.get(rest[0])?;
                self.walk_spec(next, &rest[1..])
            }
        }
    }

    fn resolve(&self, owner: &RelationalType, path: &str) -> Option<(RelationalType, Vec<String>)> {
        match owner.category() {
            TypeCategory::Entity { entity, .. } => {
                let mapping = self.entities.get(entity)?;
                self.walk(mapping, path)
            }
            _ => None,
        }
    }
}

impl Default for MappingCatalog {
    fn default() -> Self {
        Self::new()
    }
}

/// Flatten a component's leaf columns in declaration order.
fn component_columns(properties: &BTreeMap<String, PropertySpec>) -> Vec<String> {
    let mut columns = Vec::new();
    for spec in properties.values() {
        match spec {
            PropertySpec::Scalar { columns: cols, .. } => columns.extend(cols.iter().cloned()),
            PropertySpec::Association { columns: cols, .. } => {
                columns.extend(cols.iter().cloned())
            }
            PropertySpec::Component {
                properties: nested, ..
            } => columns.extend(component_columns(nested)),
            PropertySpec::Collection { .. } => {}
        }
    }
    columns
}

// An empty qualifier yields bare column names (single-table bulk
// statements render without aliases).
fn qualify(qualifier: &str, columns: &[String]) -> Vec<String> {
    if qualifier.is_empty() {
        return columns.to_vec();
    }
    columns
        .iter()
        .map(|c| format!("{}.{}", qualifier, c))
        .collect()
}

impl MetadataOracle for MappingCatalog {
    fn property_type(
        &self,
        owner: &RelationalType,
        property_path: &str,
    ) -> Option<RelationalType> {
        self.resolve(owner, property_path).map(|(ty, _)| ty)
    }

    fn columns_for(
        &self,
        owner: &RelationalType,
        qualifier: &str,
        property_path: &str,
    ) -> Result<Vec<String>, MetadataError> {
        let (_, columns) =
            self.resolve(owner, property_path)
                .ok_or_else(|| MetadataError::UnknownProperty {
                    owner: format!("{:?}", owner.category()),
                    property: property_path.to_string(),
                })?;
        Ok(qualify(qualifier, &columns))
    }

    fn entity_table(&self, entity: &str) -> Result<String, MetadataError> {
        Ok(self.entity(entity)?.table.clone())
    }

    fn identifier_property(&self, entity: &str) -> Result<String, MetadataError> {
        Ok(self.entity(entity)?.id_property.clone())
    }

    fn identifier_type(&self, entity: &str) -> Result<RelationalType, MetadataError> {
        Ok(self.entity(entity)?.id_type())
    }

    fn identifier_columns(
        &self,
        entity: &str,
        qualifier: &str,
    ) -> Result<Vec<String>, MetadataError> {
        Ok(qualify(qualifier, &self.entity(entity)?.id_columns))
    }

    fn is_multi_table(&self, entity: &str) -> bool {
        self.entities.get(entity).is_some_and(|e| e.multi_table)
    }

    fn is_sub_or_superclass_property(&self, entity: &str, property: &str) -> bool {
        self.entities
            .get(entity)
            .is_some_and(|e| e.subclass_properties.iter().any(|p| p == property))
    }

    fn collection_descriptor(&self, role: &str) -> Result<CollectionDescriptor, MetadataError> {
        self.collections
            .get(role)
            .map(CollectionMapping::descriptor)
            .ok_or_else(|| MetadataError::UnknownCollectionRole(role.to_string()))
    }

    fn polymorphic_join_columns(
        &self,
        entity: &str,
        qualifier: &str,
        property_path: &str,
    ) -> Result<Vec<Vec<String>>, MetadataError> {
        let mapping = self.entity(entity)?;
        let sets = mapping.polymorphic.get(property_path).ok_or_else(|| {
            MetadataError::InvalidMapping {
                owner: entity.to_string(),
                detail: format!(
                    "association '{}' has no join columns and no polymorphic column sets",
                    property_path
                ),
            }
        })?;
        Ok(sets.iter().map(|set| qualify(qualifier, set)).collect())
    }

    fn constant(&self, path: &str) -> Option<ConstantValue> {
        self.constants.get(path).cloned()
    }

    fn sql_function(&self, name: &str) -> Option<SqlFunctionDescriptor> {
        self.functions.get(&name.to_lowercase()).cloned()
    }

    fn dialect(&self) -> &DialectCapabilities {
        &self.dialect
    }
}

fn builtin_functions() -> HashMap<String, SqlFunctionDescriptor> {
    let mut m = HashMap::new();
    let mut add = |name: &str, return_type: Option<RelationalType>| {
        m.insert(
            name.to_string(),
            SqlFunctionDescriptor {
                name: name.to_string(),
                return_type,
            },
        );
    };
    // Argument-typed functions return None (first argument's type).
    add("upper", None);
    add("lower", None);
    add("trim", None);
    add("abs", None);
    add("coalesce", None);
    add("length", Some(RelationalType::primitive(PrimitiveKind::Integer)));
    add("sqrt", Some(RelationalType::primitive(PrimitiveKind::Double)));
    add("concat", Some(RelationalType::primitive(PrimitiveKind::String)));
    add("substring", Some(RelationalType::primitive(PrimitiveKind::String)));
    add("current_date", Some(RelationalType::primitive(PrimitiveKind::Date)));
    add(
        "current_timestamp",
        Some(RelationalType::primitive(PrimitiveKind::Timestamp)),
    );
    add("count", Some(RelationalType::primitive(PrimitiveKind::Long)));
    add("sum", None);
    add("avg", Some(RelationalType::primitive(PrimitiveKind::Double)));
    add("max", None);
    add("min", None);
    m
}
