//! Join materialization.
//!
//! Joins are created at most once per navigation path and scope: a path
//! already joined is looked up through the scope chain and reused, with
//! the new user alias bound to the existing table reference. A subquery
//! declaring its own FROM never adopts an outer join for that declaration.

use crate::hql::statement::JoinType;
use crate::meta::errors::MetadataError;

use super::errors::{QueryError, TranslationError};
use super::from_element::{FromElementId, FromElementKind};
use super::scope::ElementSeed;
use super::Translator;

impl Translator<'_> {
    /// Join to an associated entity, reusing an existing join for the same
    /// navigation path when allowed.
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn create_entity_join(
        &mut self,
        owner: FromElementId,
        entity: &str,
        property_path: &str,
        dedup_path: &str,
        join_type: JoinType,
        fetch: bool,
        implied: bool,
        class_alias: Option<&str>,
    ) -> Result<FromElementId, TranslationError> {
        let scope = self.current_scope();
        if let Some(existing) = self.arena.find_join_by_path(scope, dedup_path) {
            if self.can_reuse(existing) {
                log::debug!("[{}] reusing existing join {:?}", dedup_path, existing);
                if let Some(alias) = class_alias {
                    self.arena.add_duplicate_alias(scope, alias, existing)?;
                }
                if fetch {
                    self.arena.element_mut(existing).fetch = true;
                }
                return Ok(existing);
            }
        }

        let owner_ty = self
            .entity_type_of(owner)
            .ok_or_else(|| QueryError::MissingJoinOrigin {
                path: dedup_path.to_string(),
            })?;
        let owner_entity = owner_ty.entity_name().unwrap_or_default().to_string();
        let owner_alias = self.arena.element(owner).sql_alias.clone();

        let table = self.oracle.entity_table(entity)?;
        let sql_alias = self.aliases.create(entity);
        let join_columns = self.oracle.columns_for(&owner_ty, &owner_alias, property_path)?;
        let target_columns = self.oracle.identifier_columns(entity, &sql_alias)?;

        // Associations without a single join-column set join on a
        // per-subtype disjunction.
        let custom_on_condition = if join_columns.is_empty() {
            let sets =
                self.oracle
                    .polymorphic_join_columns(&owner_entity, &owner_alias, property_path)?;
            Some(polymorphic_on_condition(&sets, &target_columns))
        } else {
            None
        };

        let id = self.arena.create_element(
            scope,
            ElementSeed {
                kind: FromElementKind::Entity,
                entity_name: Some(entity.to_string()),
                collection_role: None,
                table_name: table,
                sql_alias,
                class_alias: class_alias.map(|a| a.to_string()),
                origin: Some(owner),
                join_type,
                fetch,
                implied,
                join_columns,
                target_columns,
                custom_on_condition,
                collection_table_alias: None,
            },
        )?;
        self.arena.register_join(scope, dedup_path, id);
        Ok(id)
    }

    /// Join to a collection. One-to-many and value collections join their
    /// single table; many-to-many joins the association table first and
    /// the element entity's table through it.
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn create_collection_join(
        &mut self,
        owner: FromElementId,
        role: &str,
        dedup_path: &str,
        join_type: JoinType,
        fetch: bool,
        implied: bool,
        class_alias: Option<&str>,
    ) -> Result<FromElementId, TranslationError> {
        let scope = self.current_scope();
        if let Some(existing) = self.arena.find_join_by_path(scope, dedup_path) {
            if self.can_reuse(existing) {
                log::debug!("[{}] reusing existing join {:?}", dedup_path, existing);
                if let Some(alias) = class_alias {
                    self.arena.add_duplicate_alias(scope, alias, existing)?;
                }
                if fetch {
                    self.arena.element_mut(existing).fetch = true;
                }
                return Ok(existing);
            }
        }

        let descriptor = self.oracle.collection_descriptor(role)?;
        let owner_entity = self
            .arena
            .element(owner)
            .entity_name
            .clone()
            .ok_or_else(|| QueryError::MissingJoinOrigin {
                path: dedup_path.to_string(),
            })?;
        let owner_alias = self.arena.element(owner).sql_alias.clone();
        let owner_keys = self.oracle.identifier_columns(&owner_entity, &owner_alias)?;

        let id = if descriptor.many_to_many {
            let element_entity =
                descriptor
                    .element_entity
                    .clone()
                    .ok_or_else(|| MetadataError::InvalidMapping {
                        owner: role.to_string(),
                        detail: "many-to-many collection without an element entity".to_string(),
                    })?;

            let association_alias = self.aliases.create(role);
            let association = self.arena.create_element(
                scope,
                ElementSeed {
                    kind: FromElementKind::CollectionTable,
                    entity_name: None,
                    collection_role: Some(role.to_string()),
                    table_name: descriptor.table.clone(),
                    sql_alias: association_alias.clone(),
                    class_alias: None,
                    origin: Some(owner),
                    join_type,
                    fetch,
                    implied,
                    join_columns: owner_keys,
                    target_columns: qualify(&association_alias, &descriptor.key_columns),
                    custom_on_condition: None,
                    collection_table_alias: None,
                },
            )?;

            let element_table = self.oracle.entity_table(&element_entity)?;
            let element_alias = self.aliases.create(&element_entity);
            let target_columns = self.oracle.identifier_columns(&element_entity, &element_alias)?;
            self.arena.create_element(
                scope,
                ElementSeed {
                    kind: FromElementKind::CollectionElement,
                    entity_name: Some(element_entity),
                    collection_role: Some(role.to_string()),
                    table_name: element_table,
                    sql_alias: element_alias,
                    class_alias: class_alias.map(|a| a.to_string()),
                    origin: Some(association),
                    join_type,
                    fetch,
                    implied,
                    join_columns: qualify(&association_alias, &descriptor.element_columns),
                    target_columns,
                    custom_on_condition: None,
                    collection_table_alias: Some(association_alias),
                },
            )?
        } else if let Some(element_entity) = descriptor.element_entity.clone() {
            // One-to-many: the collection table is the element entity's own.
            let element_alias = self.aliases.create(&element_entity);
            self.arena.create_element(
                scope,
                ElementSeed {
                    kind: FromElementKind::CollectionElement,
                    entity_name: Some(element_entity),
                    collection_role: Some(role.to_string()),
                    table_name: descriptor.table.clone(),
                    sql_alias: element_alias.clone(),
                    class_alias: class_alias.map(|a| a.to_string()),
                    origin: Some(owner),
                    join_type,
                    fetch,
                    implied,
                    join_columns: owner_keys,
                    target_columns: qualify(&element_alias, &descriptor.key_columns),
                    custom_on_condition: None,
                    collection_table_alias: None,
                },
            )?
        } else {
            // Value collection: a dedicated table with no entity behind it.
            let element_alias = self.aliases.create(role);
            self.arena.create_element(
                scope,
                ElementSeed {
                    kind: FromElementKind::CollectionTable,
                    entity_name: None,
                    collection_role: Some(role.to_string()),
                    table_name: descriptor.table.clone(),
                    sql_alias: element_alias.clone(),
                    class_alias: class_alias.map(|a| a.to_string()),
                    origin: Some(owner),
                    join_type,
                    fetch,
                    implied,
                    join_columns: owner_keys,
                    target_columns: qualify(&element_alias, &descriptor.key_columns),
                    custom_on_condition: None,
                    collection_table_alias: None,
                },
            )?
        };

        self.arena.register_join(scope, dedup_path, id);
        Ok(id)
    }

    /// A join found through the scope chain is reusable unless the current
    /// position is a subquery's own FROM clause and the join belongs to an
    /// enclosing scope.
    fn can_reuse(&self, existing: FromElementId) -> bool {
        self.arena.element(existing).scope == self.current_scope() || !self.in_from()
    }
}

fn qualify(alias: &str, columns: &[String]) -> Vec<String> {
    columns.iter().map(|c| format!("{}.{}", alias, c)).collect()
}

fn polymorphic_on_condition(sets: &[Vec<String>], target_columns: &[String]) -> String {
    let alternatives: Vec<String> = sets
        .iter()
        .map(|set| {
            let pairs: Vec<String> = set
                .iter()
                .zip(target_columns.iter())
                .map(|(lhs, rhs)| format!("{} = {}", lhs, rhs))
                .collect();
            format!("({})", pairs.join(" and "))
        })
        .collect();
    alternatives.join(" or ")
}
