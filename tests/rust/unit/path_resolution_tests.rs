//! Path resolution: alias binding, foreign-key shortcuts, implied joins
//! and join reuse.

use hqlc::hql::expr::{BinaryOp, Expr, IsNullNode, PathExpr};
use hqlc::hql::statement::{
    FromDeclaration, JoinType, QueryBlock, SelectItem, Statement,
};
use hqlc::resolver::{QueryError, TranslationError};
use hqlc::TranslatorConfig;

use crate::common;

fn select_where(where_clause: Expr) -> Statement {
    let mut block = QueryBlock::from_entity("Order", "o");
    block.where_clause = Some(where_clause);
    Statement::select(block)
}

#[test]
fn test_scalar_property_stays_on_root() {
    let mut block = QueryBlock::from_entity("Order", "o");
    block.select = vec![SelectItem::Expr {
        expr: Expr::dotted("o.total"),
        alias: None,
    }];
    let mut stmt = Statement::select(block);
    let output = common::translate_default(&mut stmt);

    assert_eq!(
        output.from_fragments.len(),
        1,
        "a scalar property must not add table references: {}",
        output.sql
    );
    assert!(
        output.sql.contains("order0_.total_amount as col_0_0_"),
        "scalar column should render off the root alias: {}",
        output.sql
    );
    assert!(output.sql.contains("from orders order0_"), "{}", output.sql);
}

#[test]
fn test_identifier_shortcut_avoids_join() {
    let mut stmt = select_where(Expr::eq(
        Expr::dotted("o.customer.id"),
        Expr::named_param("cid"),
    ));
    let output = common::translate_default(&mut stmt);

    assert_eq!(
        output.from_fragments.len(),
        1,
        "dereferencing the id of a non-nullable association must read the \
         foreign key in place: {}",
        output.sql
    );
    assert!(
        output.sql.contains("order0_.customer_fk = ?"),
        "{}",
        output.sql
    );
    assert!(!output.sql.contains("customers"), "{}", output.sql);
}

#[test]
fn test_nullable_association_id_joins() {
    let mut stmt = select_where(Expr::eq(
        Expr::dotted("o.approver.id"),
        Expr::int(7),
    ));
    let output = common::translate_default(&mut stmt);

    assert_eq!(output.from_fragments.len(), 2, "{}", output.sql);
    assert!(
        output
            .sql
            .contains("inner join employees employee1_ on (order0_.approver_fk = employee1_.employee_id)"),
        "a nullable association cannot answer through its foreign key: {}",
        output.sql
    );
}

#[test]
fn test_non_identifier_dereference_joins() {
    let mut stmt = select_where(Expr::eq(
        Expr::dotted("o.customer.name"),
        Expr::string("Ada"),
    ));
    let output = common::translate_default(&mut stmt);

    assert_eq!(output.from_fragments.len(), 2, "{}", output.sql);
    assert!(
        output
            .sql
            .contains("inner join customers customer1_ on (order0_.customer_fk = customer1_.customer_id)"),
        "{}",
        output.sql
    );
    assert!(
        output.sql.contains("customer1_.name = 'Ada'"),
        "{}",
        output.sql
    );
}

#[test]
fn test_same_path_reuses_join() {
    let mut stmt = select_where(Expr::and(
        Expr::eq(Expr::dotted("o.customer.name"), Expr::string("Ada")),
        Expr::eq(Expr::dotted("o.customer.address.city"), Expr::string("Turin")),
    ));
    let output = common::translate_default(&mut stmt);

    assert_eq!(
        output.from_fragments.len(),
        2,
        "two navigations of the same path must share one join: {}",
        output.sql
    );
    assert!(
        output.sql.contains("customer1_.city = 'Turin'"),
        "component columns should read off the joined table: {}",
        output.sql
    );
}

#[test]
fn test_explicit_join_alias_is_shared_by_implicit_path() {
    let mut block = QueryBlock::from_entity("Order", "o");
    block.from.push(FromDeclaration::Join {
        path: PathExpr::from_dotted("o.customer"),
        alias: Some("c".to_string()),
        join_type: JoinType::Inner,
        fetch: false,
        with: None,
    });
    block.where_clause = Some(Expr::and(
        Expr::eq(Expr::dotted("c.name"), Expr::string("Ada")),
        Expr::eq(Expr::dotted("o.customer.address.city"), Expr::string("Turin")),
    ));
    let mut stmt = Statement::select(block);
    let output = common::translate_default(&mut stmt);

    assert_eq!(
        output.from_fragments.len(),
        2,
        "the implicit navigation should adopt the declared join: {}",
        output.sql
    );
}

#[test]
fn test_naked_property_binds_to_sole_root() {
    let mut block = QueryBlock::from_entity("Order", "o");
    block.where_clause = Some(Expr::binary(
        BinaryOp::GreaterThan,
        Expr::path(PathExpr::ident("total")),
        Expr::int(10),
    ));
    let mut stmt = Statement::select(block);
    let output = common::translate_default(&mut stmt);

    assert!(
        output.sql.contains("order0_.total_amount > 10"),
        "{}",
        output.sql
    );
}

#[test]
fn test_qualified_constant_renders_as_literal() {
    let mut stmt = select_where(Expr::eq(
        Expr::dotted("o.status"),
        Expr::dotted("com.acme.Status.OPEN"),
    ));
    let output = common::translate_default(&mut stmt);

    assert!(
        output.sql.contains("order0_.status = 'OPEN'"),
        "{}",
        output.sql
    );
}

#[test]
fn test_unresolvable_head_is_reported() {
    let mut stmt = select_where(Expr::eq(
        Expr::dotted("missing.name"),
        Expr::string("x"),
    ));
    let err = common::translate_err(&mut stmt);
    assert!(
        matches!(err, TranslationError::Query(QueryError::UnresolvedPath { .. })),
        "{:?}",
        err
    );
}

#[test]
fn test_collection_element_property_needs_explicit_join() {
    let mut stmt = select_where(Expr::eq(
        Expr::dotted("o.lineItems.quantity"),
        Expr::int(1),
    ));
    let err = common::translate_err(&mut stmt);
    assert!(
        matches!(
            err,
            TranslationError::Query(QueryError::IllegalCollectionDereference { .. })
        ),
        "{:?}",
        err
    );
}

#[test]
fn test_duplicate_alias_in_one_scope() {
    let mut block = QueryBlock::default();
    block.from = vec![
        FromDeclaration::Root {
            entity: "Order".to_string(),
            alias: Some("o".to_string()),
        },
        FromDeclaration::Root {
            entity: "Customer".to_string(),
            alias: Some("o".to_string()),
        },
    ];
    let mut stmt = Statement::select(block);
    let err = common::translate_err(&mut stmt);
    assert!(
        matches!(err, TranslationError::Query(QueryError::DuplicateAlias(ref a)) if a == "o"),
        "{:?}",
        err
    );
}

#[test]
fn test_strict_compliance_matches_aliases_case_insensitively() {
    let mut block = QueryBlock::default();
    block.from = vec![
        FromDeclaration::Root {
            entity: "Order".to_string(),
            alias: Some("o".to_string()),
        },
        FromDeclaration::Root {
            entity: "Customer".to_string(),
            alias: Some("O".to_string()),
        },
    ];
    let mut stmt = Statement::select(block);

    let cat = common::catalog();
    let config = TranslatorConfig {
        strict_compliance: true,
        ..Default::default()
    };
    let err = common::translate_with(&mut stmt, &cat, &config)
        .expect_err("strict compliance folds alias case");
    assert!(
        matches!(err, TranslationError::Query(QueryError::DuplicateAlias(_))),
        "{:?}",
        err
    );

    // Case-sensitive by default, so the same statement is fine.
    let mut relaxed = Statement::select(QueryBlock {
        from: vec![
            FromDeclaration::Root {
                entity: "Order".to_string(),
                alias: Some("o".to_string()),
            },
            FromDeclaration::Root {
                entity: "Customer".to_string(),
                alias: Some("O".to_string()),
            },
        ],
        ..Default::default()
    });
    common::translate_default(&mut relaxed);
}

#[test]
fn test_polymorphic_association_joins_per_subtype() {
    let mut block = QueryBlock::from_entity("Ticket", "t");
    block.where_clause = Some(Expr::eq(
        Expr::dotted("t.owner.name"),
        Expr::string("Acme"),
    ));
    let mut stmt = Statement::select(block);
    let output = common::translate_default(&mut stmt);

    assert!(
        output.sql.contains(
            "on ((ticket0_.person_fk = party1_.party_id) or (ticket0_.company_fk = party1_.party_id))"
        ),
        "a polymorphic target joins on a per-subtype disjunction: {}",
        output.sql
    );
}

#[test]
fn test_resolution_is_idempotent() {
    // The same path node appears in the select list and gets re-visited
    // when the projection assembles; the second visit must not create a
    // second join.
    let mut block = QueryBlock::from_entity("Order", "o");
    block.select = vec![SelectItem::Expr {
        expr: Expr::dotted("o.customer.name"),
        alias: None,
    }];
    block.order_by = vec![hqlc::hql::statement::OrderItem {
        expr: Expr::dotted("o.customer.name"),
        descending: true,
    }];
    let mut stmt = Statement::select(block);
    let output = common::translate_default(&mut stmt);

    assert_eq!(output.from_fragments.len(), 2, "{}", output.sql);
    assert!(
        output.sql.contains("order by customer1_.name desc"),
        "{}",
        output.sql
    );
}

#[test]
fn test_association_comparison_reads_foreign_key_in_place() {
    let mut stmt = select_where(Expr::eq(
        Expr::dotted("o.customer"),
        Expr::named_param("c"),
    ));
    let output = common::translate_default(&mut stmt);

    assert_eq!(
        output.from_fragments.len(),
        1,
        "comparing an association endpoint must not join its target: {}",
        output.sql
    );
    assert!(
        output.sql.contains("order0_.customer_fk = ?"),
        "{}",
        output.sql
    );
    assert!(!output.sql.contains("customers"), "{}", output.sql);
}

#[test]
fn test_association_null_check_reads_foreign_key_in_place() {
    let mut stmt = select_where(Expr::IsNull(IsNullNode {
        negated: false,
        expr: Box::new(Expr::dotted("o.approver")),
    }));
    let output = common::translate_default(&mut stmt);

    assert_eq!(output.from_fragments.len(), 1, "{}", output.sql);
    assert!(
        output.sql.contains("order0_.approver_fk is null"),
        "a null check against a nullable association must test the foreign \
         key, not a joined row: {}",
        output.sql
    );
    assert!(!output.sql.contains("employees"), "{}", output.sql);
}

#[test]
fn test_naked_property_with_several_roots_is_ambiguous() {
    let mut block = QueryBlock::from_entity("Customer", "c");
    block.from.push(FromDeclaration::Root {
        entity: "Order".to_string(),
        alias: Some("o".to_string()),
    });
    block.where_clause = Some(Expr::eq(Expr::dotted("id"), Expr::int(1)));
    let mut stmt = Statement::select(block);
    let err = common::translate_err(&mut stmt);

    assert!(
        matches!(
            err,
            TranslationError::Query(QueryError::AmbiguousNakedProperty { ref property })
                if property == "id"
        ),
        "{:?}",
        err
    );
}
