//! Renderers for expressions, FROM clauses and whole statements.

use crate::hql::expr::{BinaryOp, Expr, Literal, UnaryOp};
use crate::hql::statement::{QueryBlock, Statement, StatementKind};
use crate::resolver::from_element::{FromElement, FromElementId, ScopeId};
use crate::resolver::scope::ScopeArena;
use crate::resolver::{FromFragment, ProjectionDescriptor};

pub fn render_expr(arena: &ScopeArena, expr: &Expr) -> String {
    match expr {
        Expr::Path(path) => {
            let res = path.res();
            if res.text.is_empty() {
                path.path()
            } else {
                res.text.clone()
            }
        }
        Expr::Literal(lit) => render_literal(lit),
        Expr::Param(_) => "?".to_string(),
        Expr::Unary(node) => match node.op {
            UnaryOp::Negate => format!("-{}", render_operand(arena, &node.operand)),
            UnaryOp::Not => format!("not ({})", render_expr(arena, &node.operand)),
        },
        Expr::Binary(node) => {
            let lhs = render_logical_operand(arena, &node.lhs, node.op);
            let rhs = render_logical_operand(arena, &node.rhs, node.op);
            format!("{} {} {}", lhs, node.op.sql(), rhs)
        }
        Expr::Between(node) => format!(
            "{} {}between {} and {}",
            render_expr(arena, &node.expr),
            if node.negated { "not " } else { "" },
            render_expr(arena, &node.low),
            render_expr(arena, &node.high)
        ),
        Expr::InList(node) => {
            let items: Vec<String> = node
                .list
                .iter()
                .map(|item| render_expr(arena, item))
                .collect();
            format!(
                "{} {}in ({})",
                render_expr(arena, &node.expr),
                if node.negated { "not " } else { "" },
                items.join(", ")
            )
        }
        Expr::IsNull(node) => format!(
            "{} is {}null",
            render_expr(arena, &node.expr),
            if node.negated { "not " } else { "" }
        ),
        Expr::Case(node) => {
            let mut sql = String::from("case");
            if let Some(operand) = &node.operand {
                sql.push(' ');
                sql.push_str(&render_expr(arena, operand));
            }
            for (when, then) in &node.when_then {
                sql.push_str(" when ");
                sql.push_str(&render_expr(arena, when));
                sql.push_str(" then ");
                sql.push_str(&render_expr(arena, then));
            }
            if let Some(else_expr) = &node.else_expr {
                sql.push_str(" else ");
                sql.push_str(&render_expr(arena, else_expr));
            }
            sql.push_str(" end");
            sql
        }
        Expr::Function(node) => {
            let args: Vec<String> = node.args.iter().map(|a| render_expr(arena, a)).collect();
            format!(
                "{}({}{})",
                node.name,
                if node.distinct { "distinct " } else { "" },
                args.join(", ")
            )
        }
        Expr::CollectionFn(node) => node.text.clone(),
        Expr::Subquery(block) => format!("({})", render_query_block(arena, block)),
        Expr::Exists(node) => format!(
            "{}exists ({})",
            if node.negated { "not " } else { "" },
            render_query_block(arena, &node.query)
        ),
        Expr::Fragment(node) => node.sql.clone(),
    }
}

fn render_operand(arena: &ScopeArena, expr: &Expr) -> String {
    match expr {
        Expr::Binary(_) => format!("({})", render_expr(arena, expr)),
        _ => render_expr(arena, expr),
    }
}

/// Parenthesize a logical operand when its operator binds looser than the
/// enclosing one (`or` under `and`).
fn render_logical_operand(arena: &ScopeArena, expr: &Expr, outer: BinaryOp) -> String {
    if let Expr::Binary(inner) = expr {
        let needs_parens = (outer == BinaryOp::And && inner.op == BinaryOp::Or)
            || (outer.is_arithmetic() && inner.op.is_arithmetic() && outer != inner.op);
        if needs_parens {
            return format!("({})", render_expr(arena, expr));
        }
    }
    render_expr(arena, expr)
}

fn render_literal(lit: &Literal) -> String {
    match lit {
        Literal::Integer(value) => value.to_string(),
        Literal::Float(value) => value.to_string(),
        Literal::String(value) => format!("'{}'", value.replace('\'', "''")),
        Literal::Boolean(value) => value.to_string(),
        Literal::Null => "null".to_string(),
    }
}

/// One ON condition for a joined element: the column pairing (or a custom
/// condition for polymorphic targets), plus any `with` restriction.
fn on_condition(element: &FromElement) -> String {
    let base = match &element.custom_on_condition {
        Some(custom) => custom.clone(),
        None => element
            .join_columns
            .iter()
            .zip(element.target_columns.iter())
            .map(|(lhs, rhs)| format!("{} = {}", lhs, rhs))
            .collect::<Vec<_>>()
            .join(" and "),
    };
    match &element.with_fragment {
        Some(with) if base.is_empty() => with.clone(),
        Some(with) => format!("{} and {}", base, with),
        None => base,
    }
}

fn join_text(element: &FromElement) -> String {
    format!(
        "{} {} {} on ({})",
        element.join_type.sql(),
        element.table_name,
        element.sql_alias,
        on_condition(element)
    )
}

/// FROM-clause fragments for one scope, declaration order preserved.
pub fn from_fragments(arena: &ScopeArena, scope: ScopeId) -> Vec<FromFragment> {
    arena
        .elements_in(scope)
        .iter()
        .map(|&id| {
            let element = arena.element(id);
            if element.is_root() {
                FromFragment {
                    sql_alias: element.sql_alias.clone(),
                    class_alias: element.class_alias.clone(),
                    is_root: true,
                    from_text: format!("{} {}", element.table_name, element.sql_alias),
                    join_text: String::new(),
                    where_text: String::new(),
                }
            } else {
                FromFragment {
                    sql_alias: element.sql_alias.clone(),
                    class_alias: element.class_alias.clone(),
                    is_root: false,
                    from_text: String::new(),
                    join_text: join_text(element),
                    where_text: String::new(),
                }
            }
        })
        .collect()
}

/// FROM clause text: each root followed by the joins hanging off it, so an
/// ON condition only references tables already in its joined-table
/// expression.
fn from_clause_text(arena: &ScopeArena, scope: ScopeId) -> String {
    fn append_joins(
        arena: &ScopeArena,
        scope: ScopeId,
        element: FromElementId,
        out: &mut String,
    ) {
        for &child in &arena.element(element).destinations {
            let record = arena.element(child);
            if record.scope != scope {
                continue;
            }
            out.push(' ');
            out.push_str(&join_text(record));
            append_joins(arena, scope, child, out);
        }
    }

    let mut segments = Vec::new();
    for &id in arena.elements_in(scope) {
        let element = arena.element(id);
        if !element.is_root() {
            continue;
        }
        let mut segment = format!("{} {}", element.table_name, element.sql_alias);
        append_joins(arena, scope, id, &mut segment);
        segments.push(segment);
    }
    segments.join(", ")
}

pub fn render_query_block(arena: &ScopeArena, block: &QueryBlock) -> String {
    let mut sql = String::from(if block.distinct {
        "select distinct "
    } else {
        "select "
    });
    sql.push_str(block.select_text.as_deref().unwrap_or("*"));

    if let Some(scope) = block.resolved_scope {
        sql.push_str(" from ");
        sql.push_str(&from_clause_text(arena, scope));
    }
    if let Some(where_clause) = &block.where_clause {
        sql.push_str(" where ");
        sql.push_str(&render_expr(arena, where_clause));
    }
    if !block.group_by.is_empty() {
        let items: Vec<String> = block
            .group_by
            .iter()
            .map(|e| render_expr(arena, e))
            .collect();
        sql.push_str(" group by ");
        sql.push_str(&items.join(", "));
    }
    if let Some(having) = &block.having {
        sql.push_str(" having ");
        sql.push_str(&render_expr(arena, having));
    }
    if !block.order_by.is_empty() {
        let items: Vec<String> = block
            .order_by
            .iter()
            .map(|item| {
                let mut text = render_expr(arena, &item.expr);
                if item.descending {
                    text.push_str(" desc");
                }
                text
            })
            .collect();
        sql.push_str(" order by ");
        sql.push_str(&items.join(", "));
    }
    sql
}

pub fn render_statement(
    statement: &Statement,
    arena: &ScopeArena,
    _projection: &ProjectionDescriptor,
) -> String {
    match statement.kind {
        StatementKind::Select | StatementKind::Insert => {
            render_query_block(arena, &statement.query)
        }
        StatementKind::Update => {
            let table = bulk_target_table(arena, &statement.query);
            let assignments: Vec<String> = statement
                .assignments
                .iter()
                .map(|a| {
                    format!(
                        "{} = {}",
                        a.path.res().text,
                        render_expr(arena, &a.value)
                    )
                })
                .collect();
            let mut sql = format!("update {} set {}", table, assignments.join(", "));
            if let Some(where_clause) = &statement.query.where_clause {
                sql.push_str(" where ");
                sql.push_str(&render_expr(arena, where_clause));
            }
            sql
        }
        StatementKind::Delete => {
            let table = bulk_target_table(arena, &statement.query);
            let mut sql = format!("delete from {}", table);
            if let Some(where_clause) = &statement.query.where_clause {
                sql.push_str(" where ");
                sql.push_str(&render_expr(arena, where_clause));
            }
            sql
        }
    }
}

fn bulk_target_table(arena: &ScopeArena, block: &QueryBlock) -> String {
    block
        .resolved_scope
        .and_then(|scope| arena.elements_in(scope).first().copied())
        .map(|id| arena.element(id).table_name.clone())
        .unwrap_or_default()
}
