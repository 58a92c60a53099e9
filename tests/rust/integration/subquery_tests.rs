//! Subqueries: correlated references, scope-local aliases and join
//! adoption across scope boundaries.

use hqlc::hql::expr::{BinaryOp, Expr, ExistsNode};
use hqlc::hql::statement::{QueryBlock, SelectItem, Statement};
use hqlc::resolver::{QueryError, TranslationError};

use crate::common;

#[test]
fn test_exists_subquery_correlates_to_outer_alias() {
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
    let mut stmt = Statement::select(block);
    let output = common::translate_default(&mut stmt);

    assert!(
        output.sql.contains(
            "exists (select order1_.order_id from orders order1_ \
             where order1_.customer_fk = customer0_.customer_id)"
        ),
        "{}",
        output.sql
    );
    assert_eq!(
        output.from_fragments.len(),
        1,
        "the subquery's table must not leak into the outer FROM: {}",
        output.sql
    );
}

#[test]
fn test_not_exists_renders_negation() {
    let inner = QueryBlock::from_entity("Order", "o");
    let mut block = QueryBlock::from_entity("Customer", "c");
    block.where_clause = Some(Expr::Exists(ExistsNode {
        negated: true,
        query: Box::new(inner),
    }));
    let mut stmt = Statement::select(block);
    let output = common::translate_default(&mut stmt);

    assert!(output.sql.contains("not exists (select"), "{}", output.sql);
}

#[test]
fn test_subquery_may_shadow_an_outer_alias() {
    // The inner block redeclares "o"; aliases are scope-local.
    let mut inner = QueryBlock::from_entity("Order", "o");
    inner.select = vec![SelectItem::Expr {
        expr: Expr::dotted("o.total"),
        alias: None,
    }];
    let mut block = QueryBlock::from_entity("Order", "o");
    block.where_clause = Some(Expr::binary(
        BinaryOp::GreaterThanOrEqual,
        Expr::dotted("o.total"),
        Expr::Subquery(Box::new(inner)),
    ));
    let mut stmt = Statement::select(block);
    let output = common::translate_default(&mut stmt);

    assert!(
        output.sql.contains(
            "order0_.total_amount >= (select order1_.total_amount from orders order1_)"
        ),
        "each scope binds its own alias: {}",
        output.sql
    );
}

#[test]
fn test_subquery_declares_its_own_joins() {
    // The outer query already joined o.customer; the subquery's FROM must
    // not adopt it for its own declaration.
    let mut inner = QueryBlock::from_entity("Order", "i");
    inner.where_clause = Some(Expr::eq(
        Expr::dotted("i.customer.name"),
        Expr::string("Ada"),
    ));
    let mut block = QueryBlock::from_entity("Order", "o");
    block.where_clause = Some(Expr::and(
        Expr::eq(Expr::dotted("o.customer.name"), Expr::string("Ada")),
        Expr::Exists(ExistsNode {
            negated: false,
            query: Box::new(inner),
        }),
    ));
    let mut stmt = Statement::select(block);
    let output = common::translate_default(&mut stmt);

    assert!(
        output
            .sql
            .contains("inner join customers customer1_ on (order0_.customer_fk = customer1_.customer_id)"),
        "{}",
        output.sql
    );
    assert!(
        output
            .sql
            .contains("inner join customers customer3_ on (order2_.customer_fk = customer3_.customer_id)"),
        "the subquery materializes its own join: {}",
        output.sql
    );
}

#[test]
fn test_subquery_select_list_has_no_scalar_aliases() {
    let mut inner = QueryBlock::from_entity("Order", "o2");
    inner.select = vec![SelectItem::Expr {
        expr: Expr::dotted("o2.customer.id"),
        alias: None,
    }];
    let mut block = QueryBlock::from_entity("Customer", "c");
    block.where_clause = Some(Expr::InList(hqlc::hql::expr::InListNode {
        negated: false,
        expr: Box::new(Expr::dotted("c.id")),
        list: vec![Expr::Subquery(Box::new(inner))],
    }));
    let mut stmt = Statement::select(block);
    let output = common::translate_default(&mut stmt);

    assert!(
        output.sql.contains("(select order1_.customer_fk from orders order1_)"),
        "{}",
        output.sql
    );
    assert!(
        !output.sql.contains("customer_fk as col_"),
        "subquery projections carry no positional aliases: {}",
        output.sql
    );
}

#[test]
fn test_unknown_alias_inside_subquery_is_reported() {
    let mut inner = QueryBlock::from_entity("Order", "o");
    inner.where_clause = Some(Expr::eq(
        Expr::dotted("nobody.id"),
        Expr::dotted("o.customer.id"),
    ));
    let mut block = QueryBlock::from_entity("Customer", "c");
    block.where_clause = Some(Expr::Exists(ExistsNode {
        negated: false,
        query: Box::new(inner),
    }));
    let mut stmt = Statement::select(block);
    let err = common::translate_err(&mut stmt);
    assert!(
        matches!(err, TranslationError::Query(QueryError::UnresolvedPath { .. })),
        "{:?}",
        err
    );
}
