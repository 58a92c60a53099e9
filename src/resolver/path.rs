//! Path resolution.
//!
//! A dotted path resolves left to right: the head binds to a declared
//! alias (or, failing that, to a naked property of the sole root, or to a
//! mapped constant), and each further segment is interpreted against the
//! resolved left-hand side. Association segments decide between
//! materializing a join and reading the foreign-key columns in place; that
//! decision depends on what encloses the path, which callers describe with
//! a [`ParentContext`].

use crate::hql::expr::{
    CollectionFnNode, DereferenceKind, DotNode, IdentNode, IndexNode, PathExpr, PathResolution,
    ResolutionState,
};
use crate::hql::statement::JoinType;
use crate::meta::oracle::ConstantValue;
use crate::meta::types::{PrimitiveKind, RelationalType, TypeCategory};

use super::collection_props::{self, CollectionProperty};
use super::errors::{Attempt, QueryError, TranslationError};
use super::from_element::{FromElementId, FromElementKind};
use super::Translator;

/// What syntactically encloses the path being resolved.
#[derive(Clone, Copy, Debug)]
pub(crate) enum ParentContext<'a> {
    None,
    /// The path is the left-hand side of a further dereference; `property`
    /// is the segment about to be applied.
    Dot { property: &'a str },
    /// The path is a direct operand of a predicate.
    Predicate,
}

impl Translator<'_> {
    /// Resolve a path expression in place. Re-resolving an already
    /// resolved node is a no-op.
    pub(crate) fn resolve_path(
        &mut self,
        path: &mut PathExpr,
        generate_join: bool,
        class_alias: Option<&str>,
        parent: ParentContext<'_>,
    ) -> Result<(), TranslationError> {
        if path.res().is_resolved() {
            return Ok(());
        }
        match path {
            PathExpr::Ident(node) => self.resolve_ident(node, generate_join, parent),
            PathExpr::Dot(node) => self.resolve_dot(node, generate_join, class_alias, parent),
            PathExpr::Index(node) => self.resolve_index(node, class_alias),
        }
    }

    fn resolve_ident(
        &mut self,
        node: &mut IdentNode,
        generate_join: bool,
        parent: ParentContext<'_>,
    ) -> Result<(), TranslationError> {
        let scope = self.current_scope();

        if let Some(element) = self.arena.lookup_by_alias(scope, &node.name) {
            return self.resolve_alias_reference(element, &mut node.res);
        }

        match self.attempt_naked_property(node, generate_join, parent)? {
            Attempt::Resolved(()) => return Ok(()),
            Attempt::NotApplicable => {}
        }

        // Possibly the head of a qualified constant; the enclosing dot
        // decides once it has the whole path.
        if matches!(parent, ParentContext::Dot { .. }) {
            return Ok(());
        }
        Err(QueryError::UnresolvedPath {
            path: node.name.clone(),
        }
        .into())
    }

    /// Naked property reference: legal only when a single root makes the
    /// owner unambiguous and that owner actually has the property. With
    /// several FROM elements in scope an identifier that more than one of
    /// them could own is rejected as ambiguous rather than bound
    /// arbitrarily.
    fn attempt_naked_property(
        &mut self,
        node: &mut IdentNode,
        generate_join: bool,
        parent: ParentContext<'_>,
    ) -> Result<Attempt<()>, TranslationError> {
        let scope = self.current_scope();
        if self.arena.element_count(scope) != 1 {
            let owners = self
                .arena
                .elements_in(scope)
                .iter()
                .filter_map(|&e| self.entity_type_of(e))
                .filter(|ty| self.oracle.property_type(ty, &node.name).is_some())
                .count();
            if owners > 1 && !matches!(parent, ParentContext::Dot { .. }) {
                return Err(QueryError::AmbiguousNakedProperty {
                    property: node.name.clone(),
                }
                .into());
            }
            return Ok(Attempt::NotApplicable);
        }
        let owner = self.arena.elements_in(scope)[0];
        let Some(owner_ty) = self.entity_type_of(owner) else {
            return Ok(Attempt::NotApplicable);
        };
        if self.oracle.property_type(&owner_ty, &node.name).is_none() {
            return Ok(Attempt::NotApplicable);
        }
        let property = node.name.clone();
        self.dereference_property(
            owner,
            &property,
            &property,
            generate_join,
            None,
            self.config.implied_join_type,
            false,
            parent,
            &mut node.res,
        )?;
        Ok(Attempt::Resolved(()))
    }

    /// An alias reference stands for the identifier of whatever the alias
    /// is bound to (entity element or collection element).
    fn resolve_alias_reference(
        &mut self,
        element: FromElementId,
        res: &mut PathResolution,
    ) -> Result<(), TranslationError> {
        let record = self.arena.element(element);
        if let Some(entity) = record.entity_name.clone() {
            let qualifier = self.qualifier_for(element);
            let columns = self.oracle.identifier_columns(&entity, &qualifier)?;
            res.ty = self.entity_type_of(element);
            res.text = self.column_text(&columns);
            res.columns = columns;
            res.from_element = Some(element);
            res.state = ResolutionState::Resolved(DereferenceKind::Entity);
            return Ok(());
        }

        // Value-collection element alias: stands for the element columns.
        if let Some(role) = record.collection_role.clone() {
            let alias = record.sql_alias.clone();
            let descriptor = self.oracle.collection_descriptor(&role)?;
            let columns: Vec<String> = descriptor
                .element_columns
                .iter()
                .map(|c| format!("{}.{}", alias, c))
                .collect();
            res.ty = Some(descriptor.element_type);
            res.text = self.column_text(&columns);
            res.columns = columns;
            res.from_element = Some(element);
            res.state = ResolutionState::Resolved(DereferenceKind::Primitive);
            return Ok(());
        }

        Err(QueryError::UnresolvedPath {
            path: record.sql_alias.clone(),
        }
        .into())
    }

    fn resolve_dot(
        &mut self,
        node: &mut DotNode,
        generate_join: bool,
        class_alias: Option<&str>,
        parent: ParentContext<'_>,
    ) -> Result<(), TranslationError> {
        let path_text = format!("{}.{}", node.lhs.path(), node.property);
        // A non-terminal segment always carries join generation: whatever
        // the enclosing context decides about the path as a whole, the
        // remaining segments need a table reference to navigate from. Only
        // the identifier shortcut exempts the left side from this.
        self.resolve_path(
            &mut node.lhs,
            true,
            None,
            ParentContext::Dot {
                property: &node.property,
            },
        )?;
        let lhs_res = node.lhs.res().clone();

        let Some(lhs_kind) = lhs_res.kind() else {
            // The left side bound to nothing in scope: the dotted text may
            // still be a qualified constant.
            if matches!(parent, ParentContext::Dot { .. }) {
                return Ok(());
            }
            if let Some(value) = self.oracle.constant(&path_text) {
                node.res.ty = Some(constant_type(&value));
                node.res.text = value.sql_literal();
                node.res.state = ResolutionState::Resolved(DereferenceKind::Constant);
                return Ok(());
            }
            return Err(QueryError::UnresolvedPath { path: path_text }.into());
        };

        match lhs_kind {
            DereferenceKind::Collection => {
                let Some(property) = collection_props::lookup(&node.property) else {
                    return Err(QueryError::IllegalCollectionDereference {
                        path: node.lhs.path(),
                        property: node.property.clone(),
                    }
                    .into());
                };
                let owner = lhs_res.from_element.ok_or_else(|| QueryError::MissingJoinOrigin {
                    path: path_text.clone(),
                })?;
                let role = lhs_res
                    .ty
                    .as_ref()
                    .and_then(|t| t.collection_role())
                    .ok_or_else(|| QueryError::MissingJoinOrigin {
                        path: path_text.clone(),
                    })?
                    .to_string();
                node.res = self.collection_pseudo(owner, &role, property, &path_text)?;
                Ok(())
            }
            DereferenceKind::Identifier => {
                // The left side resolved straight to foreign-key columns in
                // anticipation of this segment naming the identifier.
                let entity = lhs_res
                    .ty
                    .as_ref()
                    .and_then(|t| t.entity_name())
                    .ok_or_else(|| QueryError::UnresolvedPath {
                        path: path_text.clone(),
                    })?
                    .to_string();
                let id_property = self.oracle.identifier_property(&entity)?;
                if node.property != id_property {
                    return Err(QueryError::UnresolvedPath { path: path_text }.into());
                }
                node.res.ty = Some(self.oracle.identifier_type(&entity)?);
                node.res.text = lhs_res.text;
                node.res.columns = lhs_res.columns;
                node.res.from_element = lhs_res.from_element;
                node.res.state = ResolutionState::Resolved(DereferenceKind::Identifier);
                Ok(())
            }
            DereferenceKind::Component => {
                let owner = lhs_res.from_element.ok_or_else(|| QueryError::MissingJoinOrigin {
                    path: path_text.clone(),
                })?;
                let base = match node.lhs.as_ref() {
                    PathExpr::Dot(lhs) => lhs.property_path.clone(),
                    PathExpr::Ident(lhs) => lhs.name.clone(),
                    PathExpr::Index(_) => {
                        return Err(QueryError::UnresolvedPath { path: path_text }.into())
                    }
                };
                node.property_path = format!("{}.{}", base, node.property);
                let property_path = node.property_path.clone();
                self.dereference_property(
                    owner,
                    &property_path,
                    &path_text,
                    generate_join,
                    class_alias,
                    node.join_type,
                    node.fetch,
                    parent,
                    &mut node.res,
                )
            }
            DereferenceKind::Entity | DereferenceKind::Primitive => {
                let owner = lhs_res.from_element.ok_or_else(|| QueryError::MissingJoinOrigin {
                    path: path_text.clone(),
                })?;
                node.property_path = node.property.clone();
                let property_path = node.property_path.clone();
                self.dereference_property(
                    owner,
                    &property_path,
                    &path_text,
                    generate_join,
                    class_alias,
                    node.join_type,
                    node.fetch,
                    parent,
                    &mut node.res,
                )
            }
            DereferenceKind::Constant => {
                Err(QueryError::UnresolvedPath { path: path_text }.into())
            }
        }
    }

    /// Resolve `property_path` against the entity bound to `owner`,
    /// materializing joins as the enclosing context requires.
    #[allow(clippy::too_many_arguments)]
    fn dereference_property(
        &mut self,
        owner: FromElementId,
        property_path: &str,
        path_text: &str,
        generate_join: bool,
        class_alias: Option<&str>,
        join_type: JoinType,
        fetch: bool,
        parent: ParentContext<'_>,
        res: &mut PathResolution,
    ) -> Result<(), TranslationError> {
        let owner_ty =
            self.entity_type_of(owner)
                .ok_or_else(|| QueryError::UnresolvedPath {
                    path: path_text.to_string(),
                })?;
        let owner_entity = owner_ty
            .entity_name()
            .unwrap_or_default()
            .to_string();

        let Some(ty) = self.oracle.property_type(&owner_ty, property_path) else {
            return Err(QueryError::UnresolvedPath {
                path: path_text.to_string(),
            }
            .into());
        };

        // Properties declared off the queried class widen the owner's
        // table reference to cover subclasses.
        let head = property_path.split('.').next().unwrap_or(property_path);
        if self.oracle.is_sub_or_superclass_property(&owner_entity, head) {
            self.arena.element_mut(owner).include_subclasses = true;
        }

        match ty.category() {
            TypeCategory::Primitive(_) => {
                let qualifier = self.qualifier_for(owner);
                let columns = self.oracle.columns_for(&owner_ty, &qualifier, property_path)?;
                res.text = self.column_text(&columns);
                res.columns = columns;
                res.ty = Some(ty);
                res.from_element = Some(owner);
                res.state = ResolutionState::Resolved(DereferenceKind::Primitive);
                Ok(())
            }
            TypeCategory::Component { .. } => {
                let qualifier = self.qualifier_for(owner);
                let columns = self.oracle.columns_for(&owner_ty, &qualifier, property_path)?;
                res.text = self.column_text(&columns);
                res.columns = columns;
                res.ty = Some(ty);
                res.from_element = Some(owner);
                res.state = ResolutionState::Resolved(DereferenceKind::Component);
                Ok(())
            }
            TypeCategory::Collection { role } => {
                let role = role.clone();
                if self.in_from() {
                    // Explicit collection join declaration.
                    let element = self.create_collection_join(
                        owner,
                        &role,
                        path_text,
                        join_type,
                        fetch,
                        false,
                        class_alias,
                    )?;
                    res.from_element = Some(element);
                } else {
                    res.from_element = Some(owner);
                }
                res.ty = Some(ty);
                res.state = ResolutionState::Resolved(DereferenceKind::Collection);
                Ok(())
            }
            TypeCategory::Entity { entity, nullable } => {
                let entity = entity.clone();
                let nullable = *nullable;
                self.dereference_entity(
                    owner,
                    &owner_ty,
                    &entity,
                    nullable,
                    ty.clone(),
                    property_path,
                    path_text,
                    generate_join,
                    class_alias,
                    join_type,
                    fetch,
                    parent,
                    res,
                )
            }
        }
    }

    /// Association dereference: decide between a join and the in-place
    /// foreign-key columns.
    #[allow(clippy::too_many_arguments)]
    fn dereference_entity(
        &mut self,
        owner: FromElementId,
        owner_ty: &RelationalType,
        entity: &str,
        nullable: bool,
        ty: RelationalType,
        property_path: &str,
        path_text: &str,
        generate_join: bool,
        class_alias: Option<&str>,
        join_type: JoinType,
        fetch: bool,
        parent: ParentContext<'_>,
        res: &mut PathResolution,
    ) -> Result<(), TranslationError> {
        let id_property = self.oracle.identifier_property(entity)?;

        // Identifier shortcut: a non-nullable association about to be
        // dereferenced with its target's id property is answered from the
        // foreign-key columns; the enclosing dot adopts this resolution.
        if let ParentContext::Dot { property } = parent {
            if property == id_property && !nullable {
                let qualifier = self.qualifier_for(owner);
                let columns = self.oracle.columns_for(owner_ty, &qualifier, property_path)?;
                log::debug!("[{}] resolved through foreign key, no join", path_text);
                res.text = self.column_text(&columns);
                res.columns = columns;
                res.ty = Some(ty);
                res.from_element = Some(owner);
                res.state = ResolutionState::Resolved(DereferenceKind::Identifier);
                return Ok(());
            }
        }

        let join_is_needed = if matches!(parent, ParentContext::Dot { .. }) {
            // Being dereferenced further with a non-identifier property.
            generate_join
        } else if !self.is_select_statement() {
            // Bulk statements only join inside a subquery's own FROM.
            self.in_from() && self.is_subquery()
        } else if matches!(parent, ParentContext::Predicate) {
            generate_join
        } else {
            generate_join || self.in_select() || self.in_from()
        };

        if join_is_needed {
            let implied = !self.in_from();
            let element = self.create_entity_join(
                owner,
                entity,
                property_path,
                path_text,
                join_type,
                fetch,
                implied,
                class_alias,
            )?;
            let alias = self.arena.element(element).sql_alias.clone();
            let columns = self.oracle.identifier_columns(entity, &alias)?;
            res.text = self.column_text(&columns);
            res.columns = columns;
            res.ty = Some(ty);
            res.from_element = Some(element);
            res.state = ResolutionState::Resolved(DereferenceKind::Entity);
        } else {
            let qualifier = self.qualifier_for(owner);
            let columns = self.oracle.columns_for(owner_ty, &qualifier, property_path)?;
            res.text = self.column_text(&columns);
            res.columns = columns;
            res.ty = Some(ty);
            res.from_element = Some(owner);
            res.state = ResolutionState::Resolved(DereferenceKind::Entity);
        }
        Ok(())
    }

    fn resolve_index(
        &mut self,
        node: &mut IndexNode,
        class_alias: Option<&str>,
    ) -> Result<(), TranslationError> {
        self.resolve_expr(&mut node.index)?;
        self.resolve_path(&mut node.collection, true, None, ParentContext::None)?;

        let collection_path = node.collection.path();
        let cres = node.collection.res().clone();
        if cres.kind() != Some(DereferenceKind::Collection) {
            return Err(QueryError::NotIndexed {
                path: collection_path,
            }
            .into());
        }
        let owner = cres
            .from_element
            .ok_or_else(|| QueryError::MissingJoinOrigin {
                path: collection_path.clone(),
            })?;
        let role = cres
            .ty
            .as_ref()
            .and_then(|t| t.collection_role())
            .ok_or_else(|| QueryError::MissingJoinOrigin {
                path: collection_path.clone(),
            })?
            .to_string();
        let descriptor = self.oracle.collection_descriptor(&role)?;
        if !descriptor.is_indexed() {
            return Err(QueryError::NotIndexed {
                path: collection_path,
            }
            .into());
        }

        let index_sql = crate::sqlgen::render::render_expr(&self.arena, &node.index);
        let dedup_path = format!("{}[{}]", collection_path, index_sql);
        let element = self.create_collection_join(
            owner,
            &role,
            &dedup_path,
            self.config.implied_join_type,
            false,
            true,
            class_alias,
        )?;

        let record = self.arena.element(element);
        let index_qualifier = record
            .collection_table_alias
            .clone()
            .unwrap_or_else(|| record.sql_alias.clone());
        let element_entity = record.entity_name.clone();
        let element_alias = record.sql_alias.clone();

        let condition = format!(
            "{}.{} = {}",
            index_qualifier, descriptor.index_columns[0], index_sql
        );
        let index_params = super::collect_param_ids(&node.index);
        {
            let record = self.arena.element_mut(element);
            record.append_with_fragment(&condition);
            record.embedded_params.extend(index_params);
        }

        let (columns, kind) = match element_entity {
            Some(entity) => (
                self.oracle.identifier_columns(&entity, &element_alias)?,
                DereferenceKind::Entity,
            ),
            None => (
                descriptor
                    .element_columns
                    .iter()
                    .map(|c| format!("{}.{}", element_alias, c))
                    .collect(),
                DereferenceKind::Primitive,
            ),
        };
        node.res.text = self.column_text(&columns);
        node.res.columns = columns;
        node.res.ty = Some(descriptor.element_type);
        node.res.from_element = Some(element);
        node.res.state = ResolutionState::Resolved(kind);
        Ok(())
    }

    /// `size(...)`, `elements(...)`, `index(...)` and friends. Alias
    /// arguments bound to a joined collection element read the join's own
    /// columns; path arguments are answered with a correlated subquery.
    pub(crate) fn resolve_collection_fn(
        &mut self,
        node: &mut CollectionFnNode,
    ) -> Result<(), TranslationError> {
        let property = collection_props::lookup(&node.name)
            .ok_or_else(|| QueryError::UnknownFunction(node.name.clone()))?;

        if let PathExpr::Ident(ident) = node.path.as_ref() {
            let scope = self.current_scope();
            if let Some(element) = self.arena.lookup_by_alias(scope, &ident.name) {
                let record = self.arena.element(element);
                if matches!(
                    record.kind,
                    FromElementKind::CollectionElement | FromElementKind::CollectionTable
                ) && !property.is_aggregate()
                {
                    return self.collection_fn_on_join(node, property, element);
                }
            }
        }

        let path_text = format!("{}({})", node.name, node.path.path());
        self.resolve_path(
            &mut node.path,
            false,
            None,
            ParentContext::Dot {
                property: &node.name,
            },
        )?;
        let res = node.path.res().clone();
        if res.kind() != Some(DereferenceKind::Collection) {
            return Err(QueryError::NotACollection {
                path: node.path.path(),
                property: node.name.clone(),
            }
            .into());
        }
        let owner = res
            .from_element
            .ok_or_else(|| QueryError::MissingJoinOrigin {
                path: path_text.clone(),
            })?;
        let role = res
            .ty
            .as_ref()
            .and_then(|t| t.collection_role())
            .ok_or_else(|| QueryError::MissingJoinOrigin {
                path: path_text.clone(),
            })?
            .to_string();
        let resolution = self.collection_pseudo(owner, &role, property, &path_text)?;
        node.text = resolution.text;
        node.ty = resolution.ty;
        Ok(())
    }

    /// Non-aggregate collection accessor over an alias that is already a
    /// collection join: read the join's index or element columns directly.
    fn collection_fn_on_join(
        &mut self,
        node: &mut CollectionFnNode,
        property: CollectionProperty,
        element: FromElementId,
    ) -> Result<(), TranslationError> {
        let record = self.arena.element(element);
        let role = record
            .collection_role
            .clone()
            .ok_or_else(|| QueryError::NotACollection {
                path: node.path.path(),
                property: node.name.clone(),
            })?;
        let sql_alias = record.sql_alias.clone();
        let index_qualifier = record
            .collection_table_alias
            .clone()
            .unwrap_or_else(|| sql_alias.clone());
        let entity = record.entity_name.clone();
        let descriptor = self.oracle.collection_descriptor(&role)?;

        let (columns, ty) = if property.over_index() {
            if !descriptor.is_indexed() {
                return Err(QueryError::NotIndexed {
                    path: node.path.path(),
                }
                .into());
            }
            let columns: Vec<String> = descriptor
                .index_columns
                .iter()
                .map(|c| format!("{}.{}", index_qualifier, c))
                .collect();
            (columns, descriptor.index_type.clone())
        } else {
            let columns = match &entity {
                Some(entity) => self.oracle.identifier_columns(entity, &sql_alias)?,
                None => descriptor
                    .element_columns
                    .iter()
                    .map(|c| format!("{}.{}", sql_alias, c))
                    .collect(),
            };
            (columns, Some(descriptor.element_type.clone()))
        };

        node.text = self.column_text(&columns);
        node.ty = ty;
        Ok(())
    }

    /// Answer a collection pseudo-property with a correlated subquery
    /// against the collection table.
    fn collection_pseudo(
        &mut self,
        owner: FromElementId,
        role: &str,
        property: CollectionProperty,
        path_text: &str,
    ) -> Result<PathResolution, TranslationError> {
        let descriptor = self.oracle.collection_descriptor(role)?;
        let owner_entity = self
            .arena
            .element(owner)
            .entity_name
            .clone()
            .ok_or_else(|| QueryError::MissingJoinOrigin {
                path: path_text.to_string(),
            })?;
        let owner_qualifier = self.qualifier_for(owner);
        let owner_keys = self.oracle.identifier_columns(&owner_entity, &owner_qualifier)?;
        let correlation: Vec<String> = descriptor
            .key_columns
            .iter()
            .zip(owner_keys.iter())
            .map(|(key, owner_key)| format!("{}.{} = {}", descriptor.table, key, owner_key))
            .collect();
        let correlation = correlation.join(" and ");

        let mut res = PathResolution::default();
        let over_index = property.over_index();
        if over_index && !descriptor.is_indexed() {
            return Err(QueryError::NotIndexed {
                path: path_text.to_string(),
            }
            .into());
        }

        let projected: Vec<String> = if over_index {
            descriptor
                .index_columns
                .iter()
                .map(|c| format!("{}.{}", descriptor.table, c))
                .collect()
        } else {
            descriptor
                .element_columns
                .iter()
                .map(|c| format!("{}.{}", descriptor.table, c))
                .collect()
        };

        match property {
            CollectionProperty::Size => {
                res.text = format!(
                    "(select count(*) from {} where {})",
                    descriptor.table, correlation
                );
                res.ty = property.fixed_type();
            }
            CollectionProperty::MaxIndex
            | CollectionProperty::MinIndex
            | CollectionProperty::MaxElement
            | CollectionProperty::MinElement => {
                let aggregate = property
                    .aggregate_sql()
                    .unwrap_or("max");
                res.text = format!(
                    "(select {}({}) from {} where {})",
                    aggregate, projected[0], descriptor.table, correlation
                );
                res.ty = if over_index {
                    descriptor.index_type.clone()
                } else {
                    Some(descriptor.element_type.clone())
                };
            }
            CollectionProperty::Elements
            | CollectionProperty::Indices
            | CollectionProperty::Key
            | CollectionProperty::Value => {
                res.text = format!(
                    "(select {} from {} where {})",
                    projected.join(", "),
                    descriptor.table,
                    correlation
                );
                res.ty = if over_index {
                    descriptor.index_type.clone()
                } else {
                    Some(descriptor.element_type.clone())
                };
            }
            CollectionProperty::Entry => {
                return Err(QueryError::UnresolvedPath {
                    path: path_text.to_string(),
                }
                .into());
            }
        }
        res.from_element = Some(owner);
        res.state = ResolutionState::Resolved(DereferenceKind::Primitive);
        Ok(res)
    }

    // --- shared helpers ---

    /// Column qualifier for an element: the SQL alias in select
    /// statements and in subquery scopes; at the root of a bulk statement
    /// the table name for multi-table entities and nothing otherwise.
    pub(crate) fn qualifier_for(&self, element: FromElementId) -> String {
        let record = self.arena.element(element);
        if self.is_select_statement() || record.scope != self.root_scope() {
            return record.sql_alias.clone();
        }
        match &record.entity_name {
            Some(entity) if self.oracle.is_multi_table(entity) => record.table_name.clone(),
            _ => String::new(),
        }
    }

    pub(crate) fn entity_type_of(&self, element: FromElementId) -> Option<RelationalType> {
        let record = self.arena.element(element);
        let entity = record.entity_name.as_deref()?;
        let span = self
            .oracle
            .identifier_type(entity)
            .map(|t| t.span())
            .unwrap_or(1);
        Some(RelationalType::entity(entity, false, span))
    }

    /// Render a column list as expression text. Multi-column values get
    /// tuple parentheses inside comparisons, and inside count(distinct)
    /// when the dialect wants them.
    pub(crate) fn column_text(&self, columns: &[String]) -> String {
        if columns.len() == 1 {
            return columns[0].clone();
        }
        let joined = columns.join(", ");
        let parenthesize = self.in_comparative()
            || (self.in_count_distinct()
                && self
                    .oracle
                    .dialect()
                    .requires_parens_for_tuple_distinct_counts);
        if parenthesize {
            format!("({})", joined)
        } else {
            joined
        }
    }
}

fn constant_type(value: &ConstantValue) -> RelationalType {
    match value {
        ConstantValue::Integer(_) => RelationalType::primitive(PrimitiveKind::Long),
        ConstantValue::Float(_) => RelationalType::primitive(PrimitiveKind::Double),
        ConstantValue::String(_) => RelationalType::primitive(PrimitiveKind::String),
        ConstantValue::Boolean(_) => RelationalType::primitive(PrimitiveKind::Boolean),
    }
}
