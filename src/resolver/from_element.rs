//! Table references.
//!
//! A [`FromElement`] is one occurrence of a table in the FROM clause: an
//! explicit entity reference, an implicit join destination, a collection or
//! association-table join, or a synthetic polymorphic-key join. Elements
//! live in the scope arena and point at each other through stable handles,
//! so the origin/destination graph needs no lifetimes or interior
//! mutability. Fields are refined monotonically: fragments are set once and
//! later only appended to, never retracted.

use crate::hql::statement::JoinType;

/// Stable handle of a [`FromElement`] in the arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FromElementId(pub(crate) u32);

/// Stable handle of a scope in the arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ScopeId(pub(crate) u32);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FromElementKind {
    /// An entity table (root or entity join target).
    Entity,
    /// A collection or many-to-many association table.
    CollectionTable,
    /// The element entity of a many-to-many collection, joined through its
    /// association table.
    CollectionElement,
}

#[derive(Clone, Debug)]
pub struct FromElement {
    pub id: FromElementId,
    pub scope: ScopeId,
    pub kind: FromElementKind,
    /// Entity name for entity-shaped elements.
    pub entity_name: Option<String>,
    /// Collection role for collection-shaped elements.
    pub collection_role: Option<String>,
    pub table_name: String,
    /// Statement-globally unique SQL alias.
    pub sql_alias: String,
    /// User-declared alias, when any.
    pub class_alias: Option<String>,
    /// The element this one was navigated from; None for roots. Always
    /// points at an element created earlier in the same pass, so the
    /// origin/destination graph is acyclic by construction.
    pub origin: Option<FromElementId>,
    pub destinations: Vec<FromElementId>,
    pub join_type: JoinType,
    pub fetch: bool,
    /// Synthesized by path navigation rather than declared in the FROM
    /// clause.
    pub implied: bool,
    /// Include subtype rows when rendering (toggled when a sub/superclass
    /// property is dereferenced or the entity is selected whole).
    pub include_subclasses: bool,
    /// Suppress the element's where-fragment (collection size and friends
    /// answer through a correlated subquery instead of the join).
    pub use_where_fragment: bool,
    /// LHS columns of the join condition, already qualified.
    pub join_columns: Vec<String>,
    /// RHS columns of the join condition, already qualified.
    pub target_columns: Vec<String>,
    /// Full precomputed ON fragment for joins that are not simple
    /// column-pair equality (polymorphic subtype joins).
    pub custom_on_condition: Option<String>,
    /// Extra `with`-clause condition appended to the ON fragment.
    pub with_fragment: Option<String>,
    /// For many-to-many element entities: the association-table alias,
    /// which is the "used alias" for size/index pseudo-functions.
    pub collection_table_alias: Option<String>,
    /// Dynamic-filter parameters bound inside the join condition, in
    /// occurrence order.
    pub embedded_params: Vec<usize>,
}

impl FromElement {
    pub fn is_root(&self) -> bool {
        self.origin.is_none()
    }

    /// Append a conjunct to the with-fragment.
    pub fn append_with_fragment(&mut self, condition: &str) {
        match &mut self.with_fragment {
            Some(existing) => {
                existing.push_str(" and ");
                existing.push_str(condition);
            }
            None => self.with_fragment = Some(condition.to_string()),
        }
    }
}
