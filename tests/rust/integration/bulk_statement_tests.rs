//! Bulk UPDATE and DELETE statements: unaliased rendering, multi-table
//! qualification and subquery restrictions.

use hqlc::hql::expr::{BinaryOp, Expr, ExistsNode, PathExpr};
use hqlc::hql::statement::{Assignment, QueryBlock, Statement};
use hqlc::meta::{PrimitiveKind, RelationalType};

use crate::common;

#[test]
fn test_delete_renders_without_alias() {
    let mut block = QueryBlock::from_entity("LineItem", "li");
    block.where_clause = Some(Expr::eq(Expr::dotted("li.quantity"), Expr::int(0)));
    let mut stmt = Statement::delete(block);
    let output = common::translate_default(&mut stmt);

    assert_eq!(output.sql, "delete from line_items where qty = 0");
}

#[test]
fn test_delete_without_restriction() {
    let mut stmt = Statement::delete(QueryBlock::from_entity("LineItem", "li"));
    let output = common::translate_default(&mut stmt);
    assert_eq!(output.sql, "delete from line_items");
}

#[test]
fn test_update_renders_without_alias() {
    let mut block = QueryBlock::from_entity("Order", "o");
    block.where_clause = Some(Expr::eq(
        Expr::dotted("o.status"),
        Expr::string("OPEN"),
    ));
    let mut stmt = Statement::update(
        block,
        vec![Assignment {
            path: PathExpr::from_dotted("o.status"),
            value: Expr::string("HELD"),
        }],
    );
    let output = common::translate_default(&mut stmt);

    assert_eq!(
        output.sql,
        "update orders set status = 'HELD' where status = 'OPEN'"
    );
}

#[test]
fn test_multi_table_update_qualifies_with_table_name() {
    let mut block = QueryBlock::from_entity("Account", "a");
    block.where_clause = Some(Expr::binary(
        BinaryOp::LessThan,
        Expr::dotted("a.balance"),
        Expr::int(0),
    ));
    let mut stmt = Statement::update(
        block,
        vec![Assignment {
            path: PathExpr::from_dotted("a.balance"),
            value: Expr::int(0),
        }],
    );
    let output = common::translate_default(&mut stmt);

    assert_eq!(
        output.sql,
        "update accounts set accounts.balance = 0 where accounts.balance < 0"
    );
}

#[test]
fn test_update_parameter_takes_assigned_property_type() {
    let block = QueryBlock::from_entity("Order", "o");
    let mut stmt = Statement::update(
        block,
        vec![Assignment {
            path: PathExpr::from_dotted("o.total"),
            value: Expr::named_param("t"),
        }],
    );
    let output = common::translate_default(&mut stmt);

    assert!(output.sql.contains("set total_amount = ?"), "{}", output.sql);
    assert_eq!(
        output.parameters[0].expected_type,
        Some(RelationalType::primitive(PrimitiveKind::Double))
    );
}

#[test]
fn test_delete_with_correlated_subquery_uses_aliases_inside() {
    let mut inner = QueryBlock::from_entity("Order", "o");
    inner.where_clause = Some(Expr::eq(
        Expr::dotted("o.customer.id"),
        Expr::dotted("c.id"),
    ));
    let mut block = QueryBlock::from_entity("Customer", "c");
    block.where_clause = Some(Expr::Exists(ExistsNode {
        negated: false,
        query: Box::new(inner),
    }));
    let mut stmt = Statement::delete(block);
    let output = common::translate_default(&mut stmt);

    assert_eq!(
        output.sql,
        "delete from customers where exists (select order1_.order_id \
         from orders order1_ where order1_.customer_fk = customer_id)"
    );
}

#[test]
fn test_bulk_foreign_key_restriction_stays_joinless() {
    let mut block = QueryBlock::from_entity("Order", "o");
    block.where_clause = Some(Expr::eq(
        Expr::dotted("o.customer.id"),
        Expr::named_param("cid"),
    ));
    let mut stmt = Statement::delete(block);
    let output = common::translate_default(&mut stmt);

    assert_eq!(output.sql, "delete from orders where customer_fk = ?");
    assert_eq!(output.from_fragments.len(), 1);
}
