//! Select-list assembly.
//!
//! Runs after the FROM and predicate clauses so every selectable path
//! already has a table reference. Entity references stay returnable at the
//! top level of a full query; everywhere else (subqueries, shallow mode,
//! constructor arguments) they collapse to scalar columns. Scalar columns
//! are named positionally so the result reader can address them without
//! caring what was selected.

use std::collections::HashSet;

use crate::hql::expr::{DereferenceKind, Expr, PathExpr};
use crate::hql::statement::SelectItem;
use crate::meta::types::RelationalType;

use super::errors::{QueryError, TranslationError};
use super::from_element::{FromElementId, ScopeId};
use super::Translator;

/// How the raw result rows are reshaped before reaching the caller.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub enum ResultTransform {
    #[default]
    None,
    /// `select new com.acme.Summary(...)`.
    Constructor { class: String },
    /// `select new map(...)`.
    Map,
    /// `select new list(...)`.
    List,
    /// `select entry(m)`.
    MapEntry,
}

/// One select-list position.
#[derive(Clone, Debug)]
pub struct Projection {
    /// Rendered select-list text, scalar column aliases included.
    pub text: String,
    pub user_alias: Option<String>,
    pub ty: Option<RelationalType>,
    pub from_element: Option<FromElementId>,
    /// Whole-entity projection materialized by the result loader rather
    /// than read column by column.
    pub returnable_entity: bool,
}

#[derive(Clone, Debug, Default)]
pub struct ProjectionDescriptor {
    pub projections: Vec<Projection>,
    pub transform: ResultTransform,
    /// True when no projection is a returnable entity.
    pub scalar: bool,
}

impl ProjectionDescriptor {
    pub fn select_text(&self) -> String {
        self.projections
            .iter()
            .map(|p| p.text.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Positional scalar column alias.
pub fn scalar_name(item: usize, column: usize) -> String {
    format!("col_{}_{}_", item, column)
}

impl Translator<'_> {
    pub(crate) fn assemble_projection(
        &mut self,
        items: &mut [SelectItem],
        scope: ScopeId,
        is_subquery: bool,
    ) -> Result<ProjectionDescriptor, TranslationError> {
        let mut descriptor = ProjectionDescriptor::default();

        if items.is_empty() {
            self.synthesize_root_projections(&mut descriptor, scope, is_subquery)?;
            descriptor.scalar = descriptor.projections.iter().all(|p| !p.returnable_entity);
            return Ok(descriptor);
        }

        for item in items.iter_mut() {
            // Positions are assigned over the flattened projection list so
            // constructor arguments and plain items never share a name.
            let position = descriptor.projections.len();
            match item {
                SelectItem::Expr { expr, alias } => {
                    let projection =
                        self.project_expression(expr, position, alias.clone(), is_subquery)?;
                    descriptor.projections.push(projection);
                }
                SelectItem::Constructor { class, args, alias } => {
                    descriptor.transform = ResultTransform::Constructor {
                        class: class.clone(),
                    };
                    self.project_scalar_args(&mut descriptor, args, alias.clone())?;
                }
                SelectItem::MapConstructor { args, alias } => {
                    descriptor.transform = ResultTransform::Map;
                    self.project_scalar_args(&mut descriptor, args, alias.clone())?;
                }
                SelectItem::ListConstructor { args, alias } => {
                    descriptor.transform = ResultTransform::List;
                    self.project_scalar_args(&mut descriptor, args, alias.clone())?;
                }
                SelectItem::MapEntry { path, alias } => {
                    descriptor.transform = ResultTransform::MapEntry;
                    let projection =
                        self.project_map_entry(path, position, alias.clone(), is_subquery)?;
                    descriptor.projections.push(projection);
                }
            }
        }

        if !is_subquery {
            self.check_fetch_owners(&descriptor, scope)?;
        }
        descriptor.scalar = descriptor.projections.iter().all(|p| !p.returnable_entity);
        Ok(descriptor)
    }

    /// `select` clause omitted: every root (and every fetched join) is
    /// projected.
    fn synthesize_root_projections(
        &mut self,
        descriptor: &mut ProjectionDescriptor,
        scope: ScopeId,
        is_subquery: bool,
    ) -> Result<(), TranslationError> {
        let ids: Vec<FromElementId> = self.arena.elements_in(scope).to_vec();
        let mut position = 0;
        for id in ids {
            let record = self.arena.element(id);
            if !(record.is_root() || record.fetch) {
                continue;
            }
            let Some(entity) = record.entity_name.clone() else {
                continue;
            };
            let alias = record.class_alias.clone();
            let projection =
                self.project_entity(id, &entity, position, alias, is_subquery)?;
            descriptor.projections.push(projection);
            position += 1;
        }
        Ok(())
    }

    fn project_expression(
        &mut self,
        expr: &mut Expr,
        index: usize,
        user_alias: Option<String>,
        is_subquery: bool,
    ) -> Result<Projection, TranslationError> {
        self.resolve_expr(expr)?;

        if let Expr::Path(path) = expr {
            let res = path.res();
            if res.kind() == Some(DereferenceKind::Collection) {
                return Err(QueryError::IllegalCollectionDereference {
                    path: path.path(),
                    property: "select".to_string(),
                }
                .into());
            }
            if res.kind() == Some(DereferenceKind::Entity) {
                if let (Some(element), Some(ty)) = (res.from_element, res.ty.clone()) {
                    if let Some(entity) = ty.entity_name() {
                        let entity = entity.to_string();
                        return self.project_entity(element, &entity, index, user_alias, is_subquery);
                    }
                }
            }
        }

        // Scalar projection; multi-column values expand into one named
        // column each.
        let columns = match &*expr {
            Expr::Path(path) if !path.res().columns.is_empty() => path.res().columns.clone(),
            other => vec![crate::sqlgen::render::render_expr(&self.arena, other)],
        };
        let text = self.scalar_text(&columns, index, is_subquery);
        Ok(Projection {
            text,
            user_alias,
            ty: expr.effective_ty(),
            from_element: projected_element(expr),
            returnable_entity: false,
        })
    }

    fn project_entity(
        &mut self,
        element: FromElementId,
        entity: &str,
        index: usize,
        user_alias: Option<String>,
        is_subquery: bool,
    ) -> Result<Projection, TranslationError> {
        let sql_alias = self.arena.element(element).sql_alias.clone();
        let id_span = self.oracle.identifier_type(entity).map(|t| t.span()).unwrap_or(1);
        let ty = Some(RelationalType::entity(entity, false, id_span));

        if is_subquery || self.config.shallow_query {
            let columns = self.oracle.identifier_columns(entity, &sql_alias)?;
            let text = self.scalar_text(&columns, index, is_subquery);
            return Ok(Projection {
                text,
                user_alias,
                ty,
                from_element: Some(element),
                returnable_entity: false,
            });
        }

        // Selecting the whole entity widens its table reference to cover
        // subtype rows.
        self.arena.element_mut(element).include_subclasses = true;
        Ok(Projection {
            text: format!("{}.*", sql_alias),
            user_alias,
            ty,
            from_element: Some(element),
            returnable_entity: true,
        })
    }

    fn project_scalar_args(
        &mut self,
        descriptor: &mut ProjectionDescriptor,
        args: &mut [Expr],
        user_alias: Option<String>,
    ) -> Result<(), TranslationError> {
        for arg in args.iter_mut() {
            self.resolve_expr(arg)?;
            let position = descriptor.projections.len();
            let columns = match &*arg {
                Expr::Path(path) if !path.res().columns.is_empty() => path.res().columns.clone(),
                other => vec![crate::sqlgen::render::render_expr(&self.arena, other)],
            };
            let text = self.scalar_text(&columns, position, false);
            descriptor.projections.push(Projection {
                text,
                user_alias: user_alias.clone(),
                ty: arg.effective_ty(),
                from_element: projected_element(arg),
                returnable_entity: false,
            });
        }
        Ok(())
    }

    /// `entry(m)` projects the map's key and value columns side by side.
    fn project_map_entry(
        &mut self,
        path: &mut PathExpr,
        index: usize,
        user_alias: Option<String>,
        is_subquery: bool,
    ) -> Result<Projection, TranslationError> {
        self.resolve_path(path, true, None, super::path::ParentContext::None)?;
        let res = path.res().clone();
        let element = res
            .from_element
            .ok_or_else(|| QueryError::MissingJoinOrigin { path: path.path() })?;

        let record = self.arena.element(element);
        let role = record
            .collection_role
            .clone()
            .ok_or_else(|| QueryError::NotACollection {
                path: path.path(),
                property: "entry".to_string(),
            })?;
        let sql_alias = record.sql_alias.clone();
        let index_qualifier = record
            .collection_table_alias
            .clone()
            .unwrap_or_else(|| sql_alias.clone());
        let descriptor = self.oracle.collection_descriptor(&role)?;
        if !descriptor.is_indexed() {
            return Err(QueryError::NotIndexed { path: path.path() }.into());
        }

        let mut columns: Vec<String> = descriptor
            .index_columns
            .iter()
            .map(|c| format!("{}.{}", index_qualifier, c))
            .collect();
        columns.extend(
            descriptor
                .element_columns
                .iter()
                .map(|c| format!("{}.{}", sql_alias, c)),
        );
        let text = self.scalar_text(&columns, index, is_subquery);
        Ok(Projection {
            text,
            user_alias,
            ty: Some(descriptor.element_type),
            from_element: Some(element),
            returnable_entity: false,
        })
    }

    /// Render scalar columns with positional aliases. Subquery select
    /// lists carry no aliases.
    fn scalar_text(&self, columns: &[String], index: usize, is_subquery: bool) -> String {
        if is_subquery {
            return columns.join(", ");
        }
        columns
            .iter()
            .enumerate()
            .map(|(j, c)| format!("{} as {}", c, scalar_name(index, j)))
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// A fetched join requires its owner in the select list; fetching
    /// builds the association as part of the owner's result graph.
    fn check_fetch_owners(
        &self,
        descriptor: &ProjectionDescriptor,
        scope: ScopeId,
    ) -> Result<(), TranslationError> {
        let selected: HashSet<FromElementId> = descriptor
            .projections
            .iter()
            .filter(|p| p.returnable_entity)
            .filter_map(|p| p.from_element)
            .collect();

        for &id in self.arena.elements_in(scope) {
            let record = self.arena.element(id);
            if !record.fetch {
                continue;
            }
            let mut owner = record.origin;
            while let Some(current) = owner {
                let current_record = self.arena.element(current);
                if selected.contains(&current) || current_record.fetch {
                    break;
                }
                if current_record.is_root() {
                    let path = record
                        .class_alias
                        .clone()
                        .or_else(|| record.entity_name.clone())
                        .unwrap_or_else(|| record.table_name.clone());
                    return Err(QueryError::FetchWithoutSelectOwner { path }.into());
                }
                owner = current_record.origin;
            }
        }
        Ok(())
    }
}

fn projected_element(expr: &Expr) -> Option<FromElementId> {
    match expr {
        Expr::Path(path) => path.res().from_element,
        _ => None,
    }
}
