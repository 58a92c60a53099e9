//! Scope table: the per-query-block symbol table of table references.
//!
//! One [`Scope`] per query block, chained to a parent scope iff the block
//! is a subquery. Alias and join-by-path lookups first check the local
//! scope and then escalate to the parent chain, which is what makes
//! correlated subquery references work. The arena owns every scope and
//! every [`FromElement`] of one compilation; records are appended, never
//! removed.

use std::collections::HashMap;

use super::errors::QueryError;
use super::from_element::{FromElement, FromElementId, FromElementKind, ScopeId};
use crate::hql::statement::JoinType;

#[derive(Debug, Default)]
pub struct Scope {
    pub parent: Option<ScopeId>,
    /// Element ids in declaration order (rendering order for FROM).
    pub elements: Vec<FromElementId>,
    by_alias: HashMap<String, FromElementId>,
    by_sql_alias: HashMap<String, FromElementId>,
    joins_by_path: HashMap<String, FromElementId>,
}

/// Arena of scopes and from-elements for one compilation.
#[derive(Debug)]
pub struct ScopeArena {
    scopes: Vec<Scope>,
    elements: Vec<FromElement>,
    /// Match aliases case-insensitively (strict compliance mode).
    case_insensitive: bool,
}

/// Everything needed to create one element; the arena assigns the id and
/// wires origin/destination links.
pub struct ElementSeed {
    pub kind: FromElementKind,
    pub entity_name: Option<String>,
    pub collection_role: Option<String>,
    pub table_name: String,
    pub sql_alias: String,
    pub class_alias: Option<String>,
    pub origin: Option<FromElementId>,
    pub join_type: JoinType,
    pub fetch: bool,
    pub implied: bool,
    pub join_columns: Vec<String>,
    pub target_columns: Vec<String>,
    pub custom_on_condition: Option<String>,
    pub collection_table_alias: Option<String>,
}

impl ScopeArena {
    pub fn new(case_insensitive: bool) -> Self {
        Self {
            scopes: Vec::new(),
            elements: Vec::new(),
            case_insensitive,
        }
    }

    fn alias_key(&self, alias: &str) -> String {
        if self.case_insensitive {
            alias.to_lowercase()
        } else {
            alias.to_string()
        }
    }

    pub fn push_scope(&mut self, parent: Option<ScopeId>) -> ScopeId {
        let id = ScopeId(self.scopes.len() as u32);
        self.scopes.push(Scope {
            parent,
            ..Default::default()
        });
        id
    }

    pub fn scope(&self, id: ScopeId) -> &Scope {
        &self.scopes[id.0 as usize]
    }

    pub fn element(&self, id: FromElementId) -> &FromElement {
        &self.elements[id.0 as usize]
    }

    pub fn element_mut(&mut self, id: FromElementId) -> &mut FromElement {
        &mut self.elements[id.0 as usize]
    }

    pub fn is_subquery_scope(&self, id: ScopeId) -> bool {
        self.scope(id).parent.is_some()
    }

    /// Create and register an element. The user alias, when present, must
    /// not collide with an existing binding in the same scope.
    pub fn create_element(
        &mut self,
        scope: ScopeId,
        seed: ElementSeed,
    ) -> Result<FromElementId, QueryError> {
        if let Some(alias) = &seed.class_alias {
            let key = self.alias_key(alias);
            if self.scopes[scope.0 as usize].by_alias.contains_key(&key) {
                return Err(QueryError::DuplicateAlias(alias.clone()));
            }
        }

        let id = FromElementId(self.elements.len() as u32);
        let element = FromElement {
            id,
            scope,
            kind: seed.kind,
            entity_name: seed.entity_name,
            collection_role: seed.collection_role,
            table_name: seed.table_name,
            sql_alias: seed.sql_alias,
            class_alias: seed.class_alias,
            origin: seed.origin,
            destinations: Vec::new(),
            join_type: seed.join_type,
            fetch: seed.fetch,
            implied: seed.implied,
            include_subclasses: false,
            use_where_fragment: true,
            join_columns: seed.join_columns,
            target_columns: seed.target_columns,
            custom_on_condition: seed.custom_on_condition,
            with_fragment: None,
            collection_table_alias: seed.collection_table_alias,
            embedded_params: Vec::new(),
        };

        if let Some(origin) = element.origin {
            self.elements[origin.0 as usize].destinations.push(id);
        }

        log::debug!(
            "scope {:?}: registered from-element {:?} '{}' as {}",
            scope,
            id,
            element.table_name,
            element.sql_alias
        );

        let alias_key = element.class_alias.as_deref().map(|a| self.alias_key(a));
        let scope_record = &mut self.scopes[scope.0 as usize];
        scope_record.elements.push(id);
        scope_record
            .by_sql_alias
            .insert(element.sql_alias.clone(), id);
        if let Some(key) = alias_key {
            scope_record.by_alias.insert(key, id);
        }

        self.elements.push(element);
        Ok(id)
    }

    /// Look up a user alias, local scope first, then the parent chain.
    pub fn lookup_by_alias(&self, scope: ScopeId, alias: &str) -> Option<FromElementId> {
        let key = self.alias_key(alias);
        let mut current = Some(scope);
        while let Some(id) = current {
            let record = self.scope(id);
            if let Some(found) = record.by_alias.get(&key) {
                return Some(*found);
            }
            current = record.parent;
        }
        None
    }

    pub fn lookup_by_sql_alias(&self, scope: ScopeId, sql_alias: &str) -> Option<FromElementId> {
        let mut current = Some(scope);
        while let Some(id) = current {
            let record = self.scope(id);
            if let Some(found) = record.by_sql_alias.get(sql_alias) {
                return Some(*found);
            }
            current = record.parent;
        }
        None
    }

    /// Find a join previously registered for a navigation path, local scope
    /// first, then the parent chain (correlated subqueries may reuse outer
    /// joins).
    pub fn find_join_by_path(&self, scope: ScopeId, path: &str) -> Option<FromElementId> {
        let mut current = Some(scope);
        while let Some(id) = current {
            let record = self.scope(id);
            if let Some(found) = record.joins_by_path.get(path) {
                return Some(*found);
            }
            current = record.parent;
        }
        None
    }

    pub fn register_join(&mut self, scope: ScopeId, path: &str, id: FromElementId) {
        log::debug!("scope {:?}: join path '{}' -> {:?}", scope, path, id);
        self.scopes[scope.0 as usize]
            .joins_by_path
            .insert(path.to_string(), id);
    }

    /// Register an additional user alias pointing at an existing element
    /// (join reuse). Rebinding an alias to a different element is an error.
    pub fn add_duplicate_alias(
        &mut self,
        scope: ScopeId,
        alias: &str,
        id: FromElementId,
    ) -> Result<(), QueryError> {
        let key = self.alias_key(alias);
        let record = &mut self.scopes[scope.0 as usize];
        match record.by_alias.get(&key) {
            Some(existing) if *existing != id => {
                Err(QueryError::DuplicateAlias(alias.to_string()))
            }
            _ => {
                record.by_alias.insert(key, id);
                Ok(())
            }
        }
    }

    /// All elements of one scope, in declaration order.
    pub fn elements_in(&self, scope: ScopeId) -> &[FromElementId] {
        &self.scope(scope).elements
    }

    /// Number of elements declared in one scope (ignoring parents); used
    /// for the naked-property-reference rule.
    pub fn element_count(&self, scope: ScopeId) -> usize {
        self.scope(scope).elements.len()
    }
}
