//! The semantic core: resolves a raw HQL tree against the metadata oracle,
//! materializing implied joins, typing every expression, rewriting
//! dialect-unsupported constructs, and assembling the projection and
//! parameter plans.
//!
//! One [`Translator`] per compilation. The walk is a synchronous
//! depth-first pass over the statement; resolution of one node may
//! recursively resolve siblings before returning (ordinary call-stack
//! recursion). Nothing here blocks or shares mutable state, so independent
//! compilations parallelize trivially.

use crate::config::TranslatorConfig;
use crate::hql::expr::{Expr, PathExpr};
use crate::hql::statement::{
    FromDeclaration, QueryBlock, Statement, StatementKind,
};
use crate::meta::oracle::MetadataOracle;

pub mod alias;
pub mod collection_props;
pub mod errors;
pub mod from_element;
pub mod join_builder;
pub mod operators;
pub mod params;
pub mod path;
pub mod projection;
pub mod scope;

pub use errors::{Attempt, QueryError, SemanticError, TranslationError};
pub use from_element::{FromElement, FromElementId, FromElementKind, ScopeId};
pub use params::ParameterSpec;
pub use projection::{Projection, ProjectionDescriptor, ResultTransform};

use alias::SqlAliasGenerator;
use params::ParameterRegistry;
use path::ParentContext;
use scope::ScopeArena;

/// Which clause the walk is currently inside; several join-necessity and
/// rendering decisions branch on it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Clause {
    From,
    Select,
    Where,
    GroupBy,
    Having,
    OrderBy,
    Set,
}

/// FROM-clause output for the statement assembler: one entry per table
/// reference, in rendering order.
#[derive(Clone, Debug)]
pub struct FromFragment {
    pub sql_alias: String,
    pub class_alias: Option<String>,
    pub is_root: bool,
    /// `"table alias"` for roots, empty for joined elements.
    pub from_text: String,
    /// Rendered join clause for joined elements, empty for roots.
    pub join_text: String,
    /// Conditions destined for the WHERE clause (suppressed fragments of
    /// size-style pseudo-functions stay empty).
    pub where_text: String,
}

/// Everything the (out-of-scope) statement assembler consumes.
#[derive(Clone, Debug)]
pub struct TranslationOutput {
    /// Convenience whole-statement rendering.
    pub sql: String,
    pub from_fragments: Vec<FromFragment>,
    pub projection: ProjectionDescriptor,
    pub parameters: Vec<ParameterSpec>,
}

/// Translate one statement. The tree is annotated in place; the returned
/// output carries the assembled fragments and plans.
pub fn translate(
    statement: &mut Statement,
    oracle: &dyn MetadataOracle,
    config: &TranslatorConfig,
) -> Result<TranslationOutput, TranslationError> {
    if config.compat.regression_join_suppression {
        return Err(QueryError::UnsupportedCompatMode(
            "regression-style join suppression".to_string(),
        )
        .into());
    }
    if config.compat.theta_style_implicit_joins {
        return Err(QueryError::UnsupportedCompatMode(
            "theta-style implicit joins".to_string(),
        )
        .into());
    }

    let mut translator = Translator::new(oracle, config, statement.kind);
    let projection = translator.resolve_statement(statement)?;
    let from_fragments = crate::sqlgen::render::from_fragments(&translator.arena, translator.root_scope());
    let sql = crate::sqlgen::render::render_statement(statement, &translator.arena, &projection);

    Ok(TranslationOutput {
        sql,
        from_fragments,
        projection,
        parameters: translator.params.into_specs(),
    })
}

pub struct Translator<'a> {
    pub(crate) oracle: &'a dyn MetadataOracle,
    pub(crate) config: &'a TranslatorConfig,
    pub(crate) arena: ScopeArena,
    pub(crate) aliases: SqlAliasGenerator,
    pub(crate) params: ParameterRegistry,
    pub(crate) statement_kind: StatementKind,
    scope_stack: Vec<ScopeId>,
    clause_stack: Vec<Clause>,
    /// Depth of comparison operators currently being resolved; multi-column
    /// path texts get tuple parentheses inside comparisons.
    pub(crate) comparative_depth: u32,
    /// Depth of count(distinct ...) argument resolution.
    pub(crate) count_distinct_depth: u32,
}

impl<'a> Translator<'a> {
    pub fn new(
        oracle: &'a dyn MetadataOracle,
        config: &'a TranslatorConfig,
        kind: StatementKind,
    ) -> Self {
        Self {
            oracle,
            config,
            arena: ScopeArena::new(config.strict_compliance),
            aliases: SqlAliasGenerator::new(),
            params: ParameterRegistry::new(),
            statement_kind: kind,
            scope_stack: Vec::new(),
            clause_stack: Vec::new(),
            comparative_depth: 0,
            count_distinct_depth: 0,
        }
    }

    // --- walk context ---

    pub(crate) fn current_scope(&self) -> ScopeId {
        *self
            .scope_stack
            .last()
            .expect("resolution entered without a scope")
    }

    pub(crate) fn root_scope(&self) -> ScopeId {
        ScopeId(0)
    }

    pub(crate) fn is_subquery(&self) -> bool {
        self.scope_stack.len() > 1
    }

    pub(crate) fn is_select_statement(&self) -> bool {
        self.statement_kind == StatementKind::Select
    }

    pub(crate) fn current_clause(&self) -> Option<Clause> {
        self.clause_stack.last().copied()
    }

    pub(crate) fn in_from(&self) -> bool {
        self.current_clause() == Some(Clause::From)
    }

    pub(crate) fn in_select(&self) -> bool {
        self.current_clause() == Some(Clause::Select)
    }

    pub(crate) fn in_comparative(&self) -> bool {
        self.comparative_depth > 0
    }

    pub(crate) fn in_count_distinct(&self) -> bool {
        self.count_distinct_depth > 0
    }

    fn push_clause(&mut self, clause: Clause) {
        self.clause_stack.push(clause);
    }

    fn pop_clause(&mut self) {
        self.clause_stack.pop();
    }

    // --- statement walk ---

    pub fn resolve_statement(
        &mut self,
        statement: &mut Statement,
    ) -> Result<ProjectionDescriptor, TranslationError> {
        let projection = self.resolve_query_block(&mut statement.query, None)?;

        if statement.kind == StatementKind::Update {
            self.scope_stack.push(self.root_scope());
            self.push_clause(Clause::Set);
            // Split assignments off the statement so path resolution can
            // borrow the translator mutably.
            let mut assignments = std::mem::take(&mut statement.assignments);
            for assignment in &mut assignments {
                self.resolve_path(&mut assignment.path, false, None, ParentContext::None)?;
                self.resolve_expr(&mut assignment.value)?;
                if let (Some(ty), Expr::Param(param)) =
                    (assignment.path.res().ty.clone(), &mut assignment.value)
                {
                    if let Some(id) = param.id {
                        self.params.infer(id, &ty);
                        param.expected = Some(ty);
                    }
                }
            }
            statement.assignments = assignments;
            self.pop_clause();
            self.scope_stack.pop();
        }

        Ok(projection)
    }

    /// Resolve one query block: FROM first (declaring the scope), then the
    /// predicate clauses, then the select list (which depends on resolved
    /// from-elements), then ORDER BY.
    pub(crate) fn resolve_query_block(
        &mut self,
        block: &mut QueryBlock,
        parent_scope: Option<ScopeId>,
    ) -> Result<ProjectionDescriptor, TranslationError> {
        let scope = self.arena.push_scope(parent_scope);
        self.scope_stack.push(scope);
        block.resolved_scope = Some(scope);

        self.push_clause(Clause::From);
        let mut from = std::mem::take(&mut block.from);
        for declaration in &mut from {
            self.resolve_from_declaration(declaration, scope)?;
        }
        block.from = from;
        self.pop_clause();

        if let Some(where_clause) = &mut block.where_clause {
            self.push_clause(Clause::Where);
            self.resolve_expr(where_clause)?;
            self.pop_clause();
        }

        self.push_clause(Clause::GroupBy);
        for expr in &mut block.group_by {
            self.resolve_expr(expr)?;
        }
        self.pop_clause();

        if let Some(having) = &mut block.having {
            self.push_clause(Clause::Having);
            self.resolve_expr(having)?;
            self.pop_clause();
        }

        self.push_clause(Clause::Select);
        let is_subquery = parent_scope.is_some();
        let mut select = std::mem::take(&mut block.select);
        let projection = self.assemble_projection(&mut select, scope, is_subquery)?;
        block.select = select;
        block.select_text = Some(projection.select_text());
        self.pop_clause();

        self.push_clause(Clause::OrderBy);
        for item in &mut block.order_by {
            self.resolve_expr(&mut item.expr)?;
        }
        self.pop_clause();

        self.scope_stack.pop();
        Ok(projection)
    }

    fn resolve_from_declaration(
        &mut self,
        declaration: &mut FromDeclaration,
        scope: ScopeId,
    ) -> Result<(), TranslationError> {
        match declaration {
            FromDeclaration::Root { entity, alias } => {
                self.declare_root(scope, entity, alias.as_deref())?;
                Ok(())
            }
            FromDeclaration::Join {
                path,
                alias,
                join_type,
                fetch,
                with,
            } => {
                if let PathExpr::Dot(dot) = path {
                    dot.join_type = *join_type;
                    dot.fetch = *fetch;
                }
                self.resolve_path(path, true, alias.as_deref(), ParentContext::None)?;

                if let Some(with_expr) = with {
                    self.resolve_expr(with_expr)?;
                    let condition = crate::sqlgen::render::render_expr(&self.arena, with_expr);
                    let param_ids = collect_param_ids(with_expr);
                    if let Some(element) = path.res().from_element {
                        let element = self.arena.element_mut(element);
                        element.append_with_fragment(&condition);
                        element.embedded_params.extend(param_ids);
                    }
                }
                Ok(())
            }
        }
    }

    pub(crate) fn declare_root(
        &mut self,
        scope: ScopeId,
        entity: &str,
        alias: Option<&str>,
    ) -> Result<FromElementId, TranslationError> {
        let table = self.oracle.entity_table(entity)?;
        let sql_alias = self.aliases.create(entity);
        let id = self.arena.create_element(
            scope,
            scope::ElementSeed {
                kind: FromElementKind::Entity,
                entity_name: Some(entity.to_string()),
                collection_role: None,
                table_name: table,
                sql_alias,
                class_alias: alias.map(|a| a.to_string()),
                origin: None,
                join_type: crate::hql::statement::JoinType::Inner,
                fetch: false,
                implied: false,
                join_columns: Vec::new(),
                target_columns: Vec::new(),
                custom_on_condition: None,
                collection_table_alias: None,
            },
        )?;
        Ok(id)
    }

    // --- expression walk ---

    pub(crate) fn resolve_expr(&mut self, expr: &mut Expr) -> Result<(), TranslationError> {
        match expr {
            Expr::Binary(_) => return self.resolve_binary(expr),
            Expr::Path(path) => {
                // Endpoint resolution never forces a join on its own; the
                // clause context and any further dereference decide that.
                return self.resolve_path(path, false, None, ParentContext::None);
            }
            _ => {}
        }
        match expr {
            Expr::Literal(_) | Expr::Fragment(_) => Ok(()),
            Expr::Param(param) => {
                if param.id.is_none() {
                    param.id = Some(self.params.register(param.name.clone()));
                }
                Ok(())
            }
            Expr::Unary(node) => self.resolve_unary(node),
            Expr::Between(node) => self.resolve_between(node),
            Expr::InList(node) => self.resolve_in_list(node),
            Expr::IsNull(node) => self.resolve_is_null(node),
            Expr::Case(node) => self.resolve_case(node),
            Expr::Function(node) => self.resolve_function(node),
            Expr::CollectionFn(node) => self.resolve_collection_fn(node),
            Expr::Subquery(query) => {
                let parent = self.current_scope();
                self.resolve_query_block(query, Some(parent))?;
                Ok(())
            }
            Expr::Exists(node) => {
                let parent = self.current_scope();
                self.resolve_query_block(&mut node.query, Some(parent))?;
                Ok(())
            }
            // Dispatched above.
            Expr::Binary(_) | Expr::Path(_) => unreachable!(),
        }
    }
}

/// Collect parameter ids out of an already-resolved expression subtree.
pub(crate) fn collect_param_ids(expr: &Expr) -> Vec<usize> {
    fn walk(expr: &Expr, out: &mut Vec<usize>) {
        match expr {
            Expr::Param(p) => {
                if let Some(id) = p.id {
                    out.push(id);
                }
            }
            Expr::Unary(n) => walk(&n.operand, out),
            Expr::Binary(n) => {
                walk(&n.lhs, out);
                walk(&n.rhs, out);
            }
            Expr::Between(n) => {
                walk(&n.expr, out);
                walk(&n.low, out);
                walk(&n.high, out);
            }
            Expr::InList(n) => {
                walk(&n.expr, out);
                for item in &n.list {
                    walk(item, out);
                }
            }
            Expr::IsNull(n) => walk(&n.expr, out),
            Expr::Case(n) => {
                if let Some(operand) = &n.operand {
                    walk(operand, out);
                }
                for (when, then) in &n.when_then {
                    walk(when, out);
                    walk(then, out);
                }
                if let Some(else_expr) = &n.else_expr {
                    walk(else_expr, out);
                }
            }
            Expr::Function(n) => {
                for arg in &n.args {
                    walk(arg, out);
                }
            }
            Expr::Fragment(n) => out.extend(&n.embedded_params),
            Expr::Path(_)
            | Expr::Literal(_)
            | Expr::CollectionFn(_)
            | Expr::Subquery(_)
            | Expr::Exists(_) => {}
        }
    }
    let mut out = Vec::new();
    walk(expr, &mut out);
    out
}
