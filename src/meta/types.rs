//! Relational type handles.
//!
//! A [`RelationalType`] is what the resolver attaches to expression nodes.
//! Only three facts about it matter to the core: its column span, its
//! category (entity / collection / component / primitive), and - for
//! datetime-ish primitives - the special arithmetic rules. Types are looked
//! up from the oracle, compared, and attached; never mutated.

use serde::{Deserialize, Serialize};

/// Scalar SQL-ish type kinds. The exact set is open-ended in a real mapping
/// model; the resolver only branches on numeric-ness and datetime-ness.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrimitiveKind {
    Boolean,
    Integer,
    Long,
    Float,
    Double,
    Decimal,
    String,
    Date,
    Time,
    Timestamp,
    Binary,
}

impl PrimitiveKind {
    pub fn is_datetime(&self) -> bool {
        matches!(self, Self::Date | Self::Time | Self::Timestamp)
    }

    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            Self::Integer | Self::Long | Self::Float | Self::Double | Self::Decimal
        )
    }

    /// Numeric widening rank used when an operator combines two numeric
    /// operands. Higher wins.
    fn numeric_rank(&self) -> u8 {
        match self {
            Self::Integer => 1,
            Self::Long => 2,
            Self::Float => 3,
            Self::Double => 4,
            Self::Decimal => 5,
            _ => 0,
        }
    }
}

/// What shape of thing a type describes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TypeCategory {
    Primitive(PrimitiveKind),
    /// An association to another entity. `nullable` reflects the owning
    /// side's mapping and drives the implicit-join-vs-FK-shortcut decision.
    Entity { entity: String, nullable: bool },
    /// A collection-valued property, identified by its role.
    Collection { role: String },
    /// An embedded component; `class` names the component type.
    Component { class: String },
}

/// Opaque relational type handle.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RelationalType {
    category: TypeCategory,
    span: usize,
}

impl RelationalType {
    pub fn primitive(kind: PrimitiveKind) -> Self {
        Self {
            category: TypeCategory::Primitive(kind),
            span: 1,
        }
    }

    pub fn entity(entity: impl Into<String>, nullable: bool, span: usize) -> Self {
        Self {
            category: TypeCategory::Entity {
                entity: entity.into(),
                nullable,
            },
            span,
        }
    }

    pub fn collection(role: impl Into<String>) -> Self {
        Self {
            category: TypeCategory::Collection { role: role.into() },
            span: 0,
        }
    }

    pub fn component(class: impl Into<String>, span: usize) -> Self {
        Self {
            category: TypeCategory::Component {
                class: class.into(),
            },
            span,
        }
    }

    /// Number of SQL columns this type maps to.
    pub fn span(&self) -> usize {
        self.span
    }

    pub fn category(&self) -> &TypeCategory {
        &self.category
    }

    pub fn is_entity(&self) -> bool {
        matches!(self.category, TypeCategory::Entity { .. })
    }

    pub fn is_collection(&self) -> bool {
        matches!(self.category, TypeCategory::Collection { .. })
    }

    pub fn is_component(&self) -> bool {
        matches!(self.category, TypeCategory::Component { .. })
    }

    pub fn is_primitive(&self) -> bool {
        matches!(self.category, TypeCategory::Primitive(_))
    }

    pub fn primitive_kind(&self) -> Option<PrimitiveKind> {
        match self.category {
            TypeCategory::Primitive(kind) => Some(kind),
            _ => None,
        }
    }

    pub fn is_datetime(&self) -> bool {
        self.primitive_kind().is_some_and(|k| k.is_datetime())
    }

    pub fn entity_name(&self) -> Option<&str> {
        match &self.category {
            TypeCategory::Entity { entity, .. } => Some(entity),
            _ => None,
        }
    }

    pub fn is_nullable_association(&self) -> bool {
        matches!(self.category, TypeCategory::Entity { nullable: true, .. })
    }

    pub fn collection_role(&self) -> Option<&str> {
        match &self.category {
            TypeCategory::Collection { role } => Some(role),
            _ => None,
        }
    }

    /// The wider of two numeric primitive types, when both are numeric.
    pub fn wider_numeric(a: &RelationalType, b: &RelationalType) -> Option<RelationalType> {
        let (ka, kb) = (a.primitive_kind()?, b.primitive_kind()?);
        if !ka.is_numeric() || !kb.is_numeric() {
            return None;
        }
        Some(if ka.numeric_rank() >= kb.numeric_rank() {
            a.clone()
        } else {
            b.clone()
        })
    }
}
