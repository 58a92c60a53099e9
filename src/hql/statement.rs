//! Statement and clause model.

use serde::{Deserialize, Serialize};

use crate::resolver::from_element::ScopeId;

use super::expr::{Expr, PathExpr};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JoinType {
    Inner,
    LeftOuter,
    RightOuter,
    Full,
}

impl JoinType {
    pub fn sql(&self) -> &'static str {
        match self {
            Self::Inner => "inner join",
            Self::LeftOuter => "left outer join",
            Self::RightOuter => "right outer join",
            Self::Full => "full join",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StatementKind {
    Select,
    Update,
    Delete,
    Insert,
}

/// One entry of a FROM clause: an entity root, or an explicit join off an
/// already-declared path.
#[derive(Clone, Debug)]
pub enum FromDeclaration {
    Root {
        entity: String,
        alias: Option<String>,
    },
    Join {
        path: PathExpr,
        alias: Option<String>,
        join_type: JoinType,
        fetch: bool,
        /// `with`-clause predicate folded into the join condition.
        with: Option<Expr>,
    },
}

/// One projection of the select list.
#[derive(Clone, Debug)]
pub enum SelectItem {
    Expr {
        expr: Expr,
        alias: Option<String>,
    },
    /// Dynamic instantiation: `select new com.acme.Summary(x, y)`.
    Constructor {
        class: String,
        args: Vec<Expr>,
        alias: Option<String>,
    },
    /// `select new map(a, b)` pseudo-constructor.
    MapConstructor {
        args: Vec<Expr>,
        alias: Option<String>,
    },
    /// `select new list(a, b)` pseudo-constructor.
    ListConstructor {
        args: Vec<Expr>,
        alias: Option<String>,
    },
    /// `select entry(m)` over a map-valued path.
    MapEntry {
        path: PathExpr,
        alias: Option<String>,
    },
}

#[derive(Clone, Debug)]
pub struct OrderItem {
    pub expr: Expr,
    pub descending: bool,
}

/// One query block; subqueries nest through [`Expr::Subquery`] and
/// [`Expr::Exists`], each getting its own resolution scope chained to the
/// enclosing one.
#[derive(Clone, Debug, Default)]
pub struct QueryBlock {
    pub from: Vec<FromDeclaration>,
    pub select: Vec<SelectItem>,
    pub distinct: bool,
    pub where_clause: Option<Expr>,
    pub group_by: Vec<Expr>,
    pub having: Option<Expr>,
    pub order_by: Vec<OrderItem>,
    /// Scope this block resolved into; set during resolution.
    pub resolved_scope: Option<ScopeId>,
    /// Rendered select-list text; set during resolution.
    pub select_text: Option<String>,
}

impl QueryBlock {
    pub fn from_entity(entity: impl Into<String>, alias: impl Into<String>) -> Self {
        Self {
            from: vec![FromDeclaration::Root {
                entity: entity.into(),
                alias: Some(alias.into()),
            }],
            ..Default::default()
        }
    }
}

/// Assignment in an UPDATE set-clause.
#[derive(Clone, Debug)]
pub struct Assignment {
    pub path: PathExpr,
    pub value: Expr,
}

#[derive(Clone, Debug)]
pub struct Statement {
    pub kind: StatementKind,
    pub query: QueryBlock,
    /// UPDATE set-clause assignments; empty for other statement kinds.
    pub assignments: Vec<Assignment>,
}

impl Statement {
    pub fn select(query: QueryBlock) -> Self {
        Self {
            kind: StatementKind::Select,
            query,
            assignments: Vec::new(),
        }
    }

    pub fn update(query: QueryBlock, assignments: Vec<Assignment>) -> Self {
        Self {
            kind: StatementKind::Update,
            query,
            assignments,
        }
    }

    pub fn delete(query: QueryBlock) -> Self {
        Self {
            kind: StatementKind::Delete,
            query,
            assignments: Vec::new(),
        }
    }
}
