//! Collection pseudo-function registry.
//!
//! The only legal ways to dereference a raw collection-valued path:
//! `size`, `elements`, `indices`, the min/max aggregates, and the map
//! accessors. Both spellings are accepted - `c.items.size` and
//! `size(c.items)` - and route through the same descriptors.

use std::collections::HashMap;

use crate::meta::types::{PrimitiveKind, RelationalType};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CollectionProperty {
    Size,
    Elements,
    Indices,
    MaxIndex,
    MinIndex,
    MaxElement,
    MinElement,
    Key,
    Value,
    Entry,
}

impl CollectionProperty {
    /// Properties rendered as a correlated aggregate subquery against the
    /// collection table.
    pub fn is_aggregate(&self) -> bool {
        matches!(
            self,
            Self::Size | Self::MaxIndex | Self::MinIndex | Self::MaxElement | Self::MinElement
        )
    }

    /// Aggregate applied over the collection table, for aggregate
    /// properties.
    pub fn aggregate_sql(&self) -> Option<&'static str> {
        match self {
            Self::Size => Some("count(*)"),
            Self::MaxIndex => Some("max"),
            Self::MinIndex => Some("min"),
            Self::MaxElement => Some("max"),
            Self::MinElement => Some("min"),
            _ => None,
        }
    }

    /// Whether the aggregate ranges over index columns (vs element
    /// columns).
    pub fn over_index(&self) -> bool {
        matches!(self, Self::MaxIndex | Self::MinIndex | Self::Indices | Self::Key)
    }

    /// Result type when it does not depend on the collection mapping.
    pub fn fixed_type(&self) -> Option<RelationalType> {
        match self {
            Self::Size => Some(RelationalType::primitive(PrimitiveKind::Integer)),
            _ => None,
        }
    }
}

lazy_static::lazy_static! {
    static ref COLLECTION_PROPERTIES: HashMap<&'static str, CollectionProperty> = {
        let mut m = HashMap::new();
        m.insert("size", CollectionProperty::Size);
        m.insert("elements", CollectionProperty::Elements);
        m.insert("indices", CollectionProperty::Indices);
        m.insert("index", CollectionProperty::Indices);
        m.insert("maxindex", CollectionProperty::MaxIndex);
        m.insert("minindex", CollectionProperty::MinIndex);
        m.insert("maxelement", CollectionProperty::MaxElement);
        m.insert("minelement", CollectionProperty::MinElement);
        m.insert("key", CollectionProperty::Key);
        m.insert("value", CollectionProperty::Value);
        m.insert("entry", CollectionProperty::Entry);
        m
    };
}

pub fn lookup(name: &str) -> Option<CollectionProperty> {
    COLLECTION_PROPERTIES.get(name.to_lowercase().as_str()).copied()
}

pub fn is_collection_property(name: &str) -> bool {
    lookup(name).is_some()
}
