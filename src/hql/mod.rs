//! HQL syntax tree as handed over by the (external) parser.
//!
//! Node kinds correspond 1:1 to what the resolver understands: path
//! expressions (ident / dot / index), operators, clauses and statements.
//! Path nodes carry hoisted mutable resolution state which the resolver
//! fills in; everything else on the tree is plain data.

pub mod expr;
pub mod statement;

pub use expr::{
    BinaryNode, BinaryOp, DereferenceKind, DotNode, Expr, IdentNode, IndexNode, Literal,
    PathExpr, PathResolution, ResolutionState, UnaryOp,
};
pub use statement::{
    Assignment, FromDeclaration, JoinType, OrderItem, QueryBlock, SelectItem, Statement,
    StatementKind,
};
