//! Shared mapping fixture: a small commerce model exercising every mapping
//! shape the resolver understands (scalars, components, to-one
//! associations, one-to-many / many-to-many / value collections, composite
//! identifiers, polymorphic targets, constants).

use std::collections::BTreeMap;

use hqlc::meta::catalog::{
    CollectionMapping, ElementSpec, EntityMapping, IndexSpec, MappingCatalog, PropertySpec,
};
use hqlc::meta::{ConstantValue, DialectCapabilities, PrimitiveKind};
use hqlc::hql::Statement;
use hqlc::resolver::TranslationError;
use hqlc::{translate, TranslationOutput, TranslatorConfig};

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

pub fn catalog() -> MappingCatalog {
    catalog_with_dialect(DialectCapabilities::default())
}

pub fn catalog_with_dialect(dialect: DialectCapabilities) -> MappingCatalog {
    let mut cat = MappingCatalog::new().with_dialect(dialect);

    let mut address = BTreeMap::new();
    address.insert(
        "city".to_string(),
        PropertySpec::Scalar {
            ty: PrimitiveKind::String,
            columns: strings(&["city"]),
        },
    );
    address.insert(
        "street".to_string(),
        PropertySpec::Scalar {
            ty: PrimitiveKind::String,
            columns: strings(&["street"]),
        },
    );

    cat.add_entity(
        EntityMapping::new("Customer", "customers", "id", strings(&["customer_id"]))
            .with_scalar("name", PrimitiveKind::String, strings(&["name"]))
            .with_component("address", "Address", address)
            .with_collection("orders", "Customer.orders")
            .with_collection("nicknames", "Customer.nicknames"),
    );
    cat.add_entity(
        EntityMapping::new("Order", "orders", "id", strings(&["order_id"]))
            .with_scalar("total", PrimitiveKind::Double, strings(&["total_amount"]))
            .with_scalar("placedOn", PrimitiveKind::Timestamp, strings(&["placed_on"]))
            .with_scalar("shippedOn", PrimitiveKind::Timestamp, strings(&["shipped_on"]))
            .with_scalar("status", PrimitiveKind::String, strings(&["status"]))
            .with_association("customer", "Customer", strings(&["customer_fk"]), false)
            .with_association("approver", "Employee", strings(&["approver_fk"]), true)
            .with_association(
                "shipment",
                "Shipment",
                strings(&["ship_no_fk", "ship_region_fk"]),
                false,
            )
            .with_collection("lineItems", "Order.lineItems"),
    );
    cat.add_entity(
        EntityMapping::new("Employee", "employees", "id", strings(&["employee_id"]))
            .with_scalar("name", PrimitiveKind::String, strings(&["name"])),
    );
    cat.add_entity(EntityMapping::new(
        "Shipment",
        "shipments",
        "id",
        strings(&["ship_no", "ship_region"]),
    ));
    cat.add_entity(
        EntityMapping::new("LineItem", "line_items", "id", strings(&["line_item_id"]))
            .with_scalar("quantity", PrimitiveKind::Integer, strings(&["qty"]))
            .with_association("product", "Product", strings(&["product_fk"]), false),
    );
    cat.add_entity(
        EntityMapping::new("Product", "products", "id", strings(&["product_id"]))
            .with_scalar("name", PrimitiveKind::String, strings(&["name"]))
            .with_collection("categories", "Product.categories"),
    );
    cat.add_entity(
        EntityMapping::new("Category", "categories", "id", strings(&["category_id"]))
            .with_scalar("name", PrimitiveKind::String, strings(&["name"])),
    );
    cat.add_entity(
        EntityMapping::new("Party", "parties", "id", strings(&["party_id"]))
            .with_scalar("name", PrimitiveKind::String, strings(&["name"])),
    );

    // Polymorphic association target: joined through per-subtype columns.
    let mut ticket = EntityMapping::new("Ticket", "tickets", "id", strings(&["ticket_id"]))
        .with_association("owner", "Party", Vec::new(), false);
    ticket.polymorphic.insert(
        "owner".to_string(),
        vec![strings(&["person_fk"]), strings(&["company_fk"])],
    );
    cat.add_entity(ticket);

    // Multi-table entity for bulk-statement column qualification.
    let mut account = EntityMapping::new("Account", "accounts", "id", strings(&["account_id"]))
        .with_scalar("balance", PrimitiveKind::Double, strings(&["balance"]));
    account.multi_table = true;
    cat.add_entity(account);

    cat.add_collection(CollectionMapping {
        role: "Order.lineItems".to_string(),
        table: "line_items".to_string(),
        key_columns: strings(&["order_fk"]),
        element: ElementSpec::Entity {
            entity: "LineItem".to_string(),
            columns: strings(&["line_item_id"]),
        },
        index: Some(IndexSpec {
            ty: PrimitiveKind::Integer,
            columns: strings(&["line_no"]),
        }),
        many_to_many: false,
    });
    cat.add_collection(CollectionMapping {
        role: "Customer.orders".to_string(),
        table: "orders".to_string(),
        key_columns: strings(&["customer_fk"]),
        element: ElementSpec::Entity {
            entity: "Order".to_string(),
            columns: strings(&["order_id"]),
        },
        index: None,
        many_to_many: false,
    });
    cat.add_collection(CollectionMapping {
        role: "Customer.nicknames".to_string(),
        table: "nicknames".to_string(),
        key_columns: strings(&["customer_fk"]),
        element: ElementSpec::Value {
            ty: PrimitiveKind::String,
            columns: strings(&["nickname"]),
        },
        index: None,
        many_to_many: false,
    });
    cat.add_collection(CollectionMapping {
        role: "Product.categories".to_string(),
        table: "product_categories".to_string(),
        key_columns: strings(&["product_fk"]),
        element: ElementSpec::Entity {
            entity: "Category".to_string(),
            columns: strings(&["category_fk"]),
        },
        index: None,
        many_to_many: true,
    });

    cat.add_constant(
        "com.acme.Status.OPEN",
        ConstantValue::String("OPEN".to_string()),
    );
    cat
}

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn translate_default(statement: &mut Statement) -> TranslationOutput {
    init_logging();
    let cat = catalog();
    translate(statement, &cat, &TranslatorConfig::default())
        .expect("translation should succeed")
}

pub fn translate_err(statement: &mut Statement) -> TranslationError {
    init_logging();
    let cat = catalog();
    translate(statement, &cat, &TranslatorConfig::default())
        .expect_err("translation should fail")
}

pub fn translate_with(
    statement: &mut Statement,
    cat: &MappingCatalog,
    config: &TranslatorConfig,
) -> Result<TranslationOutput, TranslationError> {
    init_logging();
    translate(statement, cat, config)
}
