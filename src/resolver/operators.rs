//! Operator resolution and typing.
//!
//! Operands resolve before their operator types itself. Comparisons put
//! the walk into "comparative" mode so multi-column operands render with
//! tuple parentheses, feed expected types into untyped parameters, and
//! trigger the row-value expansion when the dialect cannot compare tuples
//! natively.

use crate::hql::expr::{
    BetweenNode, BinaryOp, CaseNode, DereferenceKind, Expr, FragmentNode, FunctionNode,
    InListNode, IsNullNode, Literal, UnaryNode, UnaryOp,
};
use crate::meta::types::{PrimitiveKind, RelationalType};

use super::errors::{QueryError, SemanticError, TranslationError};
use super::path::ParentContext;
use super::{collect_param_ids, Translator};

impl Translator<'_> {
    /// Resolve a direct operand. Paths get the predicate parent context so
    /// association endpoints resolve in place instead of forcing joins.
    fn resolve_operand(
        &mut self,
        expr: &mut Expr,
        in_predicate: bool,
    ) -> Result<(), TranslationError> {
        match &mut *expr {
            Expr::Path(path) if in_predicate => {
                self.resolve_path(path, false, None, ParentContext::Predicate)?;
            }
            other => self.resolve_expr(other)?,
        }
        if let Expr::Path(path) = expr {
            if path.res().kind() == Some(DereferenceKind::Collection) {
                return Err(SemanticError::UnexpectedCollection(path.path()).into());
            }
        }
        Ok(())
    }

    pub(crate) fn resolve_binary(&mut self, expr: &mut Expr) -> Result<(), TranslationError> {
        let Expr::Binary(node) = expr else {
            unreachable!("resolve_binary dispatched on a non-binary node")
        };
        let op = node.op;
        let comparison = op.is_comparison();

        if comparison {
            self.comparative_depth += 1;
        }
        let lhs_result = self.resolve_operand(&mut node.lhs, comparison);
        let rhs_result = self.resolve_operand(&mut node.rhs, comparison);
        if comparison {
            self.comparative_depth -= 1;
        }
        lhs_result?;
        rhs_result?;

        if op.is_arithmetic()
            && (matches!(node.lhs.as_ref(), Expr::Literal(Literal::Null))
                || matches!(node.rhs.as_ref(), Expr::Literal(Literal::Null)))
        {
            return Err(SemanticError::MissingOperand {
                operator: op.sql().to_string(),
            }
            .into());
        }

        let lhs_ty = node.lhs.effective_ty();
        let rhs_ty = node.rhs.effective_ty();

        // Untyped parameters take the opposite operand's type; the first
        // inference sticks.
        self.infer_param(&mut node.lhs, rhs_ty.as_ref());
        self.infer_param(&mut node.rhs, lhs_ty.as_ref());

        node.ty = if op.is_arithmetic() {
            self.arithmetic_type(op, lhs_ty.as_ref(), rhs_ty.as_ref())?
        } else {
            Some(RelationalType::primitive(PrimitiveKind::Boolean))
        };

        if op.is_equality() {
            let lhs_span = node.lhs.span();
            let rhs_span = node.rhs.span();
            if lhs_span > 1 || rhs_span > 1 {
                if lhs_ty.is_some() && rhs_ty.is_some() && lhs_span != rhs_span {
                    return Err(QueryError::RowValueColumnMismatch {
                        lhs: lhs_span,
                        rhs: rhs_span,
                    }
                    .into());
                }
                if !self
                    .oracle
                    .dialect()
                    .supports_row_value_constructor_syntax
                {
                    if let Some(replacement) = expand_row_value(expr) {
                        *expr = replacement;
                    }
                }
            }
        }
        Ok(())
    }

    fn infer_param(&mut self, operand: &mut Expr, opposite: Option<&RelationalType>) {
        let Expr::Param(param) = operand else {
            return;
        };
        let Some(ty) = opposite else { return };
        if param.expected.is_none() {
            param.expected = Some(ty.clone());
        }
        if let Some(id) = param.id {
            self.params.infer(id, ty);
        }
    }

    fn arithmetic_type(
        &self,
        op: BinaryOp,
        lhs: Option<&RelationalType>,
        rhs: Option<&RelationalType>,
    ) -> Result<Option<RelationalType>, TranslationError> {
        let lhs_datetime = lhs.is_some_and(|t| t.is_datetime());
        let rhs_datetime = rhs.is_some_and(|t| t.is_datetime());

        if matches!(op, BinaryOp::Multiply | BinaryOp::Divide | BinaryOp::Modulo)
            && (lhs_datetime || rhs_datetime)
        {
            return Err(SemanticError::DatetimeMultiplication {
                operator: op.sql().to_string(),
            }
            .into());
        }
        if lhs_datetime && rhs_datetime {
            return match op {
                // An interval between two datetimes.
                BinaryOp::Subtract => {
                    Ok(Some(RelationalType::primitive(PrimitiveKind::Double)))
                }
                _ => Err(SemanticError::DatetimeAddition {
                    operator: op.sql().to_string(),
                }
                .into()),
            };
        }
        if lhs_datetime {
            return Ok(lhs.cloned());
        }
        if rhs_datetime {
            return Ok(rhs.cloned());
        }
        if let (Some(l), Some(r)) = (lhs, rhs) {
            if let Some(wider) = RelationalType::wider_numeric(l, r) {
                return Ok(Some(wider));
            }
        }
        Ok(lhs.or(rhs).cloned())
    }

    pub(crate) fn resolve_unary(&mut self, node: &mut UnaryNode) -> Result<(), TranslationError> {
        self.resolve_operand(&mut node.operand, node.op == UnaryOp::Not)?;
        node.ty = match node.op {
            UnaryOp::Negate => node.operand.effective_ty(),
            UnaryOp::Not => Some(RelationalType::primitive(PrimitiveKind::Boolean)),
        };
        Ok(())
    }

    pub(crate) fn resolve_between(
        &mut self,
        node: &mut BetweenNode,
    ) -> Result<(), TranslationError> {
        self.comparative_depth += 1;
        let result = self
            .resolve_operand(&mut node.expr, true)
            .and_then(|_| self.resolve_operand(&mut node.low, true))
            .and_then(|_| self.resolve_operand(&mut node.high, true));
        self.comparative_depth -= 1;
        result?;

        let expected = node.expr.effective_ty();
        self.infer_param(&mut node.low, expected.as_ref());
        self.infer_param(&mut node.high, expected.as_ref());
        self.infer_param(&mut node.expr, node.low.effective_ty().as_ref());
        Ok(())
    }

    pub(crate) fn resolve_in_list(
        &mut self,
        node: &mut InListNode,
    ) -> Result<(), TranslationError> {
        self.comparative_depth += 1;
        let mut result = self.resolve_operand(&mut node.expr, true);
        if result.is_ok() {
            for item in &mut node.list {
                result = self.resolve_operand(item, true);
                if result.is_err() {
                    break;
                }
            }
        }
        self.comparative_depth -= 1;
        result?;

        let expected = node.expr.effective_ty();
        for item in &mut node.list {
            self.infer_param(item, expected.as_ref());
        }
        let first_item_ty = node.list.first().and_then(|i| i.effective_ty());
        self.infer_param(&mut node.expr, first_item_ty.as_ref());
        Ok(())
    }

    pub(crate) fn resolve_is_null(
        &mut self,
        node: &mut IsNullNode,
    ) -> Result<(), TranslationError> {
        self.resolve_operand(&mut node.expr, true)
    }

    pub(crate) fn resolve_case(&mut self, node: &mut CaseNode) -> Result<(), TranslationError> {
        if let Some(operand) = &mut node.operand {
            self.resolve_operand(operand, false)?;
        }
        for (when, then) in &mut node.when_then {
            self.resolve_expr(when)?;
            self.resolve_expr(then)?;
        }
        if let Some(else_expr) = &mut node.else_expr {
            self.resolve_expr(else_expr)?;
        }

        // The result type is the first typed branch.
        node.ty = node
            .when_then
            .iter()
            .filter_map(|(_, then)| then.effective_ty())
            .next()
            .or_else(|| node.else_expr.as_ref().and_then(|e| e.effective_ty()));
        Ok(())
    }

    pub(crate) fn resolve_function(
        &mut self,
        node: &mut FunctionNode,
    ) -> Result<(), TranslationError> {
        let descriptor = self
            .oracle
            .sql_function(&node.name)
            .ok_or_else(|| QueryError::UnknownFunction(node.name.clone()))?;

        let counts_distinct = node.distinct && node.name.eq_ignore_ascii_case("count");
        if counts_distinct {
            self.count_distinct_depth += 1;
        }
        let mut result = Ok(());
        for arg in &mut node.args {
            result = self.resolve_expr(arg);
            if result.is_err() {
                break;
            }
        }
        if counts_distinct {
            self.count_distinct_depth -= 1;
        }
        result?;

        node.ty = descriptor
            .return_type
            .or_else(|| node.args.first().and_then(|a| a.effective_ty()));
        Ok(())
    }
}

/// Expand a multi-column equality into per-column comparisons: equality
/// becomes a conjunction, inequality a disjunction. Only paths and
/// parameters decompose into columns; anything else keeps the original
/// form.
fn expand_row_value(expr: &Expr) -> Option<Expr> {
    let Expr::Binary(node) = expr else {
        return None;
    };
    let span = node.lhs.span().max(node.rhs.span());
    let lhs_columns = side_columns(&node.lhs, span)?;
    let rhs_columns = side_columns(&node.rhs, span)?;

    let (column_op, combiner) = match node.op {
        BinaryOp::Equal => ("=", BinaryOp::And),
        BinaryOp::NotEqual => ("<>", BinaryOp::Or),
        _ => return None,
    };
    let embedded = {
        let mut ids = collect_param_ids(&node.lhs);
        ids.extend(collect_param_ids(&node.rhs));
        ids
    };

    let mut pieces = lhs_columns
        .iter()
        .zip(rhs_columns.iter())
        .enumerate()
        .map(|(i, (l, r))| {
            Expr::Fragment(FragmentNode {
                sql: format!("{} {} {}", l, column_op, r),
                ty: Some(RelationalType::primitive(PrimitiveKind::Boolean)),
                embedded_params: if i == 0 { embedded.clone() } else { Vec::new() },
            })
        })
        .collect::<Vec<_>>()
        .into_iter();

    let first = pieces.next()?;
    let mut combined = pieces.fold(first, |acc, piece| Expr::binary(combiner, acc, piece));
    if let Expr::Binary(b) = &mut combined {
        b.ty = Some(RelationalType::primitive(PrimitiveKind::Boolean));
    }
    Some(combined)
}

fn side_columns(expr: &Expr, span: usize) -> Option<Vec<String>> {
    match expr {
        Expr::Path(path) => {
            let columns = &path.res().columns;
            (columns.len() == span).then(|| columns.clone())
        }
        Expr::Param(_) => Some(vec!["?".to_string(); span]),
        _ => None,
    }
}
