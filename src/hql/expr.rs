//! Expression and path nodes.
//!
//! Path expressions are the interesting part: each node carries a
//! [`PathResolution`] which starts `Unresolved` and transitions exactly once
//! to a terminal [`DereferenceKind`]. The transition is monotonic - the
//! resolver treats a second resolve call on a terminal node as a no-op by
//! contract, which is what makes re-entrant visits (a path resolved
//! top-down by its parent and again for type inference) safe.

use crate::meta::types::{PrimitiveKind, RelationalType};
use crate::resolver::from_element::FromElementId;

use super::statement::{JoinType, QueryBlock};

/// Terminal classification of a resolved path node.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DereferenceKind {
    Entity,
    Component,
    Collection,
    Primitive,
    /// Identifier shortcut: the path ends in the association target's id
    /// property and was satisfied from FK columns without a join.
    Identifier,
    /// The path is not a property reference at all but a mapped constant.
    Constant,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum ResolutionState {
    #[default]
    Unresolved,
    Resolved(DereferenceKind),
}

/// Mutable resolution annotations shared by all path node kinds.
#[derive(Clone, Debug, Default)]
pub struct PathResolution {
    pub state: ResolutionState,
    /// The table reference this node reads from (or the join it produced).
    pub from_element: Option<FromElementId>,
    pub ty: Option<RelationalType>,
    /// Qualified column names this node resolves to.
    pub columns: Vec<String>,
    /// Rendered SQL text.
    pub text: String,
    /// Ids of dynamic-filter parameters embedded in this node's join
    /// condition; preserved across operator rewrites.
    pub embedded_params: Vec<usize>,
}

impl PathResolution {
    pub fn is_resolved(&self) -> bool {
        !matches!(self.state, ResolutionState::Unresolved)
    }

    pub fn kind(&self) -> Option<DereferenceKind> {
        match self.state {
            ResolutionState::Resolved(kind) => Some(kind),
            ResolutionState::Unresolved => None,
        }
    }
}

#[derive(Clone, Debug)]
pub struct IdentNode {
    pub name: String,
    pub res: PathResolution,
}

#[derive(Clone, Debug)]
pub struct DotNode {
    pub lhs: Box<PathExpr>,
    pub property: String,
    /// The unresolved property path relative to the owning table reference;
    /// widens across component chains and identifier shortcuts.
    pub property_path: String,
    pub join_type: JoinType,
    pub fetch: bool,
    pub res: PathResolution,
}

#[derive(Clone, Debug)]
pub struct IndexNode {
    pub collection: Box<PathExpr>,
    pub index: Box<Expr>,
    pub res: PathResolution,
}

/// A dotted or indexed path expression.
#[derive(Clone, Debug)]
pub enum PathExpr {
    Ident(IdentNode),
    Dot(DotNode),
    Index(IndexNode),
}

impl PathExpr {
    pub fn ident(name: impl Into<String>) -> Self {
        Self::Ident(IdentNode {
            name: name.into(),
            res: PathResolution::default(),
        })
    }

    pub fn dot(lhs: PathExpr, property: impl Into<String>) -> Self {
        let property = property.into();
        Self::Dot(DotNode {
            lhs: Box::new(lhs),
            property_path: property.clone(),
            property,
            join_type: JoinType::Inner,
            fetch: false,
            res: PathResolution::default(),
        })
    }

    /// Build a path from dotted text: `"a.b.c"`.
    pub fn from_dotted(path: &str) -> Self {
        let mut segments = path.split('.');
        let mut node = Self::ident(segments.next().unwrap_or_default());
        for segment in segments {
            node = Self::dot(node, segment);
        }
        node
    }

    pub fn index(collection: PathExpr, index: Expr) -> Self {
        Self::Index(IndexNode {
            collection: Box::new(collection),
            index: Box::new(index),
            res: PathResolution::default(),
        })
    }

    pub fn res(&self) -> &PathResolution {
        match self {
            Self::Ident(n) => &n.res,
            Self::Dot(n) => &n.res,
            Self::Index(n) => &n.res,
        }
    }

    pub fn res_mut(&mut self) -> &mut PathResolution {
        match self {
            Self::Ident(n) => &mut n.res,
            Self::Dot(n) => &mut n.res,
            Self::Index(n) => &mut n.res,
        }
    }

    /// Full dotted source text of the path.
    pub fn path(&self) -> String {
        match self {
            Self::Ident(n) => n.name.clone(),
            Self::Dot(n) => format!("{}.{}", n.lhs.path(), n.property),
            Self::Index(n) => format!("{}[]", n.collection.path()),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Literal {
    Integer(i64),
    Float(f64),
    String(String),
    Boolean(bool),
    Null,
}

impl Literal {
    pub fn ty(&self) -> Option<RelationalType> {
        match self {
            Self::Integer(_) => Some(RelationalType::primitive(PrimitiveKind::Long)),
            Self::Float(_) => Some(RelationalType::primitive(PrimitiveKind::Double)),
            Self::String(_) => Some(RelationalType::primitive(PrimitiveKind::String)),
            Self::Boolean(_) => Some(RelationalType::primitive(PrimitiveKind::Boolean)),
            Self::Null => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UnaryOp {
    Negate,
    Not,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulo,
    Equal,
    NotEqual,
    LessThan,
    LessThanOrEqual,
    GreaterThan,
    GreaterThanOrEqual,
    Like,
    NotLike,
    And,
    Or,
}

impl BinaryOp {
    pub fn is_arithmetic(&self) -> bool {
        matches!(
            self,
            Self::Add | Self::Subtract | Self::Multiply | Self::Divide | Self::Modulo
        )
    }

    pub fn is_comparison(&self) -> bool {
        matches!(
            self,
            Self::Equal
                | Self::NotEqual
                | Self::LessThan
                | Self::LessThanOrEqual
                | Self::GreaterThan
                | Self::GreaterThanOrEqual
                | Self::Like
                | Self::NotLike
        )
    }

    /// Equality-class comparisons are the ones eligible for the row-value
    /// conjunction rewrite.
    pub fn is_equality(&self) -> bool {
        matches!(self, Self::Equal | Self::NotEqual)
    }

    pub fn is_logical(&self) -> bool {
        matches!(self, Self::And | Self::Or)
    }

    pub fn sql(&self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Subtract => "-",
            Self::Multiply => "*",
            Self::Divide => "/",
            Self::Modulo => "%",
            Self::Equal => "=",
            Self::NotEqual => "<>",
            Self::LessThan => "<",
            Self::LessThanOrEqual => "<=",
            Self::GreaterThan => ">",
            Self::GreaterThanOrEqual => ">=",
            Self::Like => "like",
            Self::NotLike => "not like",
            Self::And => "and",
            Self::Or => "or",
        }
    }
}

#[derive(Clone, Debug)]
pub struct ParamNode {
    /// Name for named parameters, None for positional ones.
    pub name: Option<String>,
    /// Occurrence id assigned during resolution.
    pub id: Option<usize>,
    pub expected: Option<RelationalType>,
}

#[derive(Clone, Debug)]
pub struct UnaryNode {
    pub op: UnaryOp,
    pub operand: Box<Expr>,
    pub ty: Option<RelationalType>,
}

#[derive(Clone, Debug)]
pub struct BinaryNode {
    pub op: BinaryOp,
    pub lhs: Box<Expr>,
    pub rhs: Box<Expr>,
    pub ty: Option<RelationalType>,
}

#[derive(Clone, Debug)]
pub struct BetweenNode {
    pub negated: bool,
    pub expr: Box<Expr>,
    pub low: Box<Expr>,
    pub high: Box<Expr>,
}

#[derive(Clone, Debug)]
pub struct InListNode {
    pub negated: bool,
    pub expr: Box<Expr>,
    pub list: Vec<Expr>,
}

#[derive(Clone, Debug)]
pub struct IsNullNode {
    pub negated: bool,
    pub expr: Box<Expr>,
}

#[derive(Clone, Debug)]
pub struct CaseNode {
    /// Simple case operand; None for the searched form.
    pub operand: Option<Box<Expr>>,
    pub when_then: Vec<(Expr, Expr)>,
    pub else_expr: Option<Box<Expr>>,
    pub ty: Option<RelationalType>,
}

#[derive(Clone, Debug)]
pub struct FunctionNode {
    pub name: String,
    pub args: Vec<Expr>,
    pub distinct: bool,
    pub ty: Option<RelationalType>,
}

/// Collection pseudo-function call form: `size(c.items)`, `elements(...)`.
#[derive(Clone, Debug)]
pub struct CollectionFnNode {
    pub name: String,
    pub path: Box<PathExpr>,
    pub ty: Option<RelationalType>,
    pub text: String,
}

#[derive(Clone, Debug)]
pub struct ExistsNode {
    pub negated: bool,
    pub query: Box<QueryBlock>,
}

/// A resolver-generated SQL fragment (row-value rewrites, index conditions).
#[derive(Clone, Debug)]
pub struct FragmentNode {
    pub sql: String,
    pub ty: Option<RelationalType>,
    pub embedded_params: Vec<usize>,
}

#[derive(Clone, Debug)]
pub enum Expr {
    Path(PathExpr),
    Literal(Literal),
    Param(ParamNode),
    Unary(UnaryNode),
    Binary(BinaryNode),
    Between(BetweenNode),
    InList(InListNode),
    IsNull(IsNullNode),
    Case(CaseNode),
    Function(FunctionNode),
    CollectionFn(CollectionFnNode),
    Subquery(Box<QueryBlock>),
    Exists(ExistsNode),
    Fragment(FragmentNode),
}

impl Expr {
    pub fn path(path: PathExpr) -> Self {
        Self::Path(path)
    }

    pub fn dotted(path: &str) -> Self {
        Self::Path(PathExpr::from_dotted(path))
    }

    pub fn int(value: i64) -> Self {
        Self::Literal(Literal::Integer(value))
    }

    pub fn string(value: impl Into<String>) -> Self {
        Self::Literal(Literal::String(value.into()))
    }

    pub fn param() -> Self {
        Self::Param(ParamNode {
            name: None,
            id: None,
            expected: None,
        })
    }

    pub fn named_param(name: impl Into<String>) -> Self {
        Self::Param(ParamNode {
            name: Some(name.into()),
            id: None,
            expected: None,
        })
    }

    pub fn binary(op: BinaryOp, lhs: Expr, rhs: Expr) -> Self {
        Self::Binary(BinaryNode {
            op,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
            ty: None,
        })
    }

    pub fn eq(lhs: Expr, rhs: Expr) -> Self {
        Self::binary(BinaryOp::Equal, lhs, rhs)
    }

    pub fn and(lhs: Expr, rhs: Expr) -> Self {
        Self::binary(BinaryOp::And, lhs, rhs)
    }

    pub fn add(lhs: Expr, rhs: Expr) -> Self {
        Self::binary(BinaryOp::Add, lhs, rhs)
    }

    /// The resolved relational type of this expression, when known.
    pub fn ty(&self) -> Option<&RelationalType> {
        match self {
            Self::Path(p) => p.res().ty.as_ref(),
            Self::Literal(_) => None, // literals answer through literal_ty()
            Self::Param(p) => p.expected.as_ref(),
            Self::Unary(n) => n.ty.as_ref(),
            Self::Binary(n) => n.ty.as_ref(),
            Self::Case(n) => n.ty.as_ref(),
            Self::Function(n) => n.ty.as_ref(),
            Self::CollectionFn(n) => n.ty.as_ref(),
            Self::Fragment(n) => n.ty.as_ref(),
            Self::Between(_) | Self::InList(_) | Self::IsNull(_) | Self::Exists(_) => None,
            Self::Subquery(_) => None,
        }
    }

    /// Like [`Expr::ty`] but materializing literal types too.
    pub fn effective_ty(&self) -> Option<RelationalType> {
        match self {
            Self::Literal(lit) => lit.ty(),
            other => other.ty().cloned(),
        }
    }

    pub fn is_parameter(&self) -> bool {
        matches!(self, Self::Param(_))
    }

    /// Column span of this expression's resolved type (1 when untyped:
    /// literals and parameters bind a single column unless inference said
    /// otherwise).
    pub fn span(&self) -> usize {
        self.effective_ty().map(|t| t.span().max(1)).unwrap_or(1)
    }
}
