//! Select-list assembly: scalar naming, returnable entities, result
//! transforms and fetch-owner validation.

use hqlc::hql::expr::{Expr, PathExpr};
use hqlc::hql::statement::{
    FromDeclaration, JoinType, QueryBlock, SelectItem, Statement,
};
use hqlc::resolver::{QueryError, ResultTransform, TranslationError};
use hqlc::TranslatorConfig;

use crate::common;

#[test]
fn test_scalar_columns_are_positionally_named() {
    let mut block = QueryBlock::from_entity("Order", "o");
    block.select = vec![
        SelectItem::Expr {
            expr: Expr::dotted("o.status"),
            alias: None,
        },
        SelectItem::Expr {
            expr: Expr::dotted("o.total"),
            alias: Some("t".to_string()),
        },
    ];
    let mut stmt = Statement::select(block);
    let output = common::translate_default(&mut stmt);

    assert!(
        output
            .sql
            .contains("select order0_.status as col_0_0_, order0_.total_amount as col_1_0_"),
        "{}",
        output.sql
    );
    assert!(output.projection.scalar);
    assert_eq!(
        output.projection.projections[1].user_alias.as_deref(),
        Some("t")
    );
}

#[test]
fn test_entity_projection_is_returnable() {
    let mut block = QueryBlock::from_entity("Order", "o");
    block.select = vec![SelectItem::Expr {
        expr: Expr::dotted("o"),
        alias: None,
    }];
    let mut stmt = Statement::select(block);
    let output = common::translate_default(&mut stmt);

    assert!(output.sql.contains("select order0_.*"), "{}", output.sql);
    assert!(!output.projection.scalar);
    assert!(output.projection.projections[0].returnable_entity);
}

#[test]
fn test_shallow_query_collapses_entities_to_identifiers() {
    let mut block = QueryBlock::from_entity("Order", "o");
    block.select = vec![SelectItem::Expr {
        expr: Expr::dotted("o"),
        alias: None,
    }];
    let mut stmt = Statement::select(block);

    let cat = common::catalog();
    let config = TranslatorConfig {
        shallow_query: true,
        ..Default::default()
    };
    let output = common::translate_with(&mut stmt, &cat, &config)
        .expect("translation should succeed");

    assert!(
        output.sql.contains("select order0_.order_id as col_0_0_"),
        "{}",
        output.sql
    );
    assert!(output.projection.scalar);
}

#[test]
fn test_omitted_select_projects_the_root() {
    let block = QueryBlock::from_entity("Customer", "c");
    let mut stmt = Statement::select(block);
    let output = common::translate_default(&mut stmt);

    assert!(output.sql.contains("select customer0_.*"), "{}", output.sql);
    assert_eq!(output.projection.projections.len(), 1);
}

#[test]
fn test_omitted_select_includes_fetched_joins() {
    let mut block = QueryBlock::from_entity("Order", "o");
    block.from.push(FromDeclaration::Join {
        path: PathExpr::from_dotted("o.customer"),
        alias: Some("c".to_string()),
        join_type: JoinType::Inner,
        fetch: true,
        with: None,
    });
    let mut stmt = Statement::select(block);
    let output = common::translate_default(&mut stmt);

    assert!(
        output.sql.contains("select order0_.*, customer1_.*"),
        "{}",
        output.sql
    );
    assert_eq!(output.projection.projections.len(), 2);
}

#[test]
fn test_constructor_arguments_flatten_to_scalars() {
    let mut block = QueryBlock::from_entity("Order", "o");
    block.select = vec![SelectItem::Constructor {
        class: "com.acme.OrderSummary".to_string(),
        args: vec![Expr::dotted("o.status"), Expr::dotted("o.total")],
        alias: None,
    }];
    let mut stmt = Statement::select(block);
    let output = common::translate_default(&mut stmt);

    assert_eq!(
        output.projection.transform,
        ResultTransform::Constructor {
            class: "com.acme.OrderSummary".to_string()
        }
    );
    assert!(
        output
            .sql
            .contains("order0_.status as col_0_0_, order0_.total_amount as col_1_0_"),
        "{}",
        output.sql
    );
    assert!(output.projection.scalar);
}

#[test]
fn test_mixed_items_never_reuse_scalar_names() {
    let mut block = QueryBlock::from_entity("Order", "o");
    block.select = vec![
        SelectItem::Constructor {
            class: "com.acme.Pair".to_string(),
            args: vec![Expr::dotted("o.status"), Expr::dotted("o.total")],
            alias: None,
        },
        SelectItem::Expr {
            expr: Expr::dotted("o.placedOn"),
            alias: None,
        },
    ];
    let mut stmt = Statement::select(block);
    let output = common::translate_default(&mut stmt);

    assert!(output.sql.contains("as col_0_0_"), "{}", output.sql);
    assert!(output.sql.contains("as col_1_0_"), "{}", output.sql);
    assert!(
        output.sql.contains("order0_.placed_on as col_2_0_"),
        "the plain item continues the flattened numbering: {}",
        output.sql
    );
}

#[test]
fn test_composite_identifier_expands_one_column_per_position() {
    let mut block = QueryBlock::from_entity("Order", "o");
    block.select = vec![SelectItem::Expr {
        expr: Expr::dotted("o.shipment.id"),
        alias: None,
    }];
    let mut stmt = Statement::select(block);
    let output = common::translate_default(&mut stmt);

    assert!(
        output
            .sql
            .contains("order0_.ship_no_fk as col_0_0_, order0_.ship_region_fk as col_0_1_"),
        "{}",
        output.sql
    );
}

#[test]
fn test_selecting_a_collection_is_rejected() {
    let mut block = QueryBlock::from_entity("Order", "o");
    block.select = vec![SelectItem::Expr {
        expr: Expr::dotted("o.lineItems"),
        alias: None,
    }];
    let mut stmt = Statement::select(block);
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
fn test_fetch_requires_selected_owner() {
    let mut block = QueryBlock::from_entity("Order", "o");
    block.from.push(FromDeclaration::Join {
        path: PathExpr::from_dotted("o.lineItems"),
        alias: Some("li".to_string()),
        join_type: JoinType::Inner,
        fetch: true,
        with: None,
    });
    block.select = vec![SelectItem::Expr {
        expr: Expr::dotted("o.customer"),
        alias: None,
    }];
    let mut stmt = Statement::select(block);
    let err = common::translate_err(&mut stmt);
    assert!(
        matches!(
            err,
            TranslationError::Query(QueryError::FetchWithoutSelectOwner { .. })
        ),
        "{:?}",
        err
    );
}

#[test]
fn test_fetch_with_selected_owner_passes() {
    let mut block = QueryBlock::from_entity("Order", "o");
    block.from.push(FromDeclaration::Join {
        path: PathExpr::from_dotted("o.lineItems"),
        alias: Some("li".to_string()),
        join_type: JoinType::Inner,
        fetch: true,
        with: None,
    });
    block.select = vec![SelectItem::Expr {
        expr: Expr::dotted("o"),
        alias: None,
    }];
    let mut stmt = Statement::select(block);
    let output = common::translate_default(&mut stmt);
    assert!(output.sql.contains("select order0_.*"), "{}", output.sql);
}

#[test]
fn test_map_entry_projects_index_and_element() {
    let mut block = QueryBlock::from_entity("Order", "o");
    block.from.push(FromDeclaration::Join {
        path: PathExpr::from_dotted("o.lineItems"),
        alias: Some("li".to_string()),
        join_type: JoinType::Inner,
        fetch: false,
        with: None,
    });
    block.select = vec![
        SelectItem::Expr {
            expr: Expr::dotted("o"),
            alias: None,
        },
        SelectItem::MapEntry {
            path: PathExpr::ident("li"),
            alias: None,
        },
    ];
    let mut stmt = Statement::select(block);
    let output = common::translate_default(&mut stmt);

    assert_eq!(output.projection.transform, ResultTransform::MapEntry);
    assert!(
        output
            .sql
            .contains("lineitem1_.line_no as col_1_0_, lineitem1_.line_item_id as col_1_1_"),
        "{}",
        output.sql
    );
}

#[test]
fn test_entry_over_unindexed_collection_is_rejected() {
    let mut block = QueryBlock::from_entity("Customer", "c");
    block.from.push(FromDeclaration::Join {
        path: PathExpr::from_dotted("c.orders"),
        alias: Some("o".to_string()),
        join_type: JoinType::Inner,
        fetch: false,
        with: None,
    });
    block.select = vec![SelectItem::MapEntry {
        path: PathExpr::ident("o"),
        alias: None,
    }];
    let mut stmt = Statement::select(block);
    let err = common::translate_err(&mut stmt);
    assert!(
        matches!(err, TranslationError::Query(QueryError::NotIndexed { .. })),
        "{:?}",
        err
    );
}
