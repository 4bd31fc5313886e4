//! Integration tests for contour-store
//!
//! These tests drive the SQLite store through the shared access helpers,
//! the same path the protocol adapters use.

use contour_domain::access;
use contour_domain::model::{baseline, feature};
use contour_domain::traits::RowStore;
use contour_domain::{ColumnValue, ContractError, Entity, Product, Revision, Table};
use contour_store::{SqliteStore, StoreError};
use serde_json::{json, Value};

fn user_body(name: &str) -> Value {
    json!({
        "emailAddress": format!("{}@example.com", name.to_lowercase()),
        "name": name,
        "status": "ACTIVE",
        "metadata": {"plan": "pro"},
        "tags": ["admin"],
        "paymentMethod": "DEBIT_CARD",
        "paymentDetails": {"type": "VISA", "bank": "First Bank"}
    })
}

fn product_body(name: &str, price: f64) -> Value {
    json!({
        "name": name,
        "price": price,
        "category": "tools",
        "inStock": true,
        "specifications": [{"key": "weight", "value": "2kg"}]
    })
}

#[test]
fn test_store_initialization() {
    let store = SqliteStore::in_memory(Revision::Baseline);
    assert!(store.is_ok(), "Store should initialize successfully");
    assert!(store.unwrap().close().is_ok());
}

#[test]
fn test_create_and_fetch_user() {
    let mut store = SqliteStore::in_memory(Revision::Baseline).unwrap();
    let projection = Revision::Baseline.projection(Entity::User);

    let id = access::create(&mut store, projection, &user_body("Alice")).unwrap();
    let user: baseline::User = access::fetch_as(&store, projection, id).unwrap();

    assert_eq!(user.id, id);
    assert_eq!(user.email_address, "alice@example.com");
    assert_eq!(user.status, baseline::UserStatus::Active);
    assert_eq!(user.metadata.get("plan"), Some(&json!("pro")));
    assert_eq!(user.tags, vec!["admin".to_string()]);
    assert_eq!(user.description, None);
    assert_eq!(user.payment_details.get("bank"), Some(&json!("First Bank")));
}

#[test]
fn test_list_in_insertion_order() {
    let mut store = SqliteStore::in_memory(Revision::Baseline).unwrap();
    let projection = Revision::Baseline.projection(Entity::Product);

    for (i, name) in ["Hammer", "Saw", "Drill"].iter().enumerate() {
        access::create(&mut store, projection, &product_body(name, 10.0 + i as f64)).unwrap();
    }

    let products: Vec<Product> = access::fetch_all_as(&store, projection).unwrap();
    let names: Vec<&str> = products.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["Hammer", "Saw", "Drill"]);
    assert_eq!(products[2].price, 12.0);
    assert_eq!(products[0].specifications[0].key, "weight");
}

#[test]
fn test_replace_rewrites_every_field() {
    let mut store = SqliteStore::in_memory(Revision::Baseline).unwrap();
    let projection = Revision::Baseline.projection(Entity::User);
    let id = access::create(&mut store, projection, &user_body("Alice")).unwrap();

    let replacement = json!({
        "emailAddress": "alice@new.example.com",
        "name": "Alice B",
        "status": "INACTIVE",
        "paymentMethod": "PAYPAL"
    });
    access::replace(&mut store, projection, id, &replacement).unwrap();

    let user = access::fetch(&store, projection, id).unwrap();
    assert_eq!(user["name"], json!("Alice B"));
    assert_eq!(user["metadata"], json!({}));
    assert_eq!(user["tags"], json!([]));
    assert_eq!(user["paymentDetails"], json!({}));
}

#[test]
fn test_replace_missing_row() {
    let mut store = SqliteStore::in_memory(Revision::Baseline).unwrap();
    let projection = Revision::Baseline.projection(Entity::User);

    let err = access::replace(&mut store, projection, 999_999, &user_body("Ghost")).unwrap_err();
    assert!(matches!(err, ContractError::NotFound { id: 999_999, .. }));
    assert!(store.list(Table::Users).unwrap().is_empty());
}

#[test]
fn test_delete_twice() {
    let mut store = SqliteStore::in_memory(Revision::Baseline).unwrap();
    let projection = Revision::Baseline.projection(Entity::Product);
    let id = access::create(&mut store, projection, &product_body("Hammer", 9.5)).unwrap();

    assert_eq!(store.delete(Table::Products, id).unwrap(), 1);
    assert_eq!(store.delete(Table::Products, id).unwrap(), 0);
    assert!(matches!(
        access::fetch(&store, projection, id),
        Err(ContractError::NotFound { .. })
    ));
}

#[test]
fn test_ids_are_not_reused() {
    let mut store = SqliteStore::in_memory(Revision::Baseline).unwrap();
    let projection = Revision::Baseline.projection(Entity::Product);

    let first = access::create(&mut store, projection, &product_body("A", 1.0)).unwrap();
    let second = access::create(&mut store, projection, &product_body("B", 2.0)).unwrap();
    assert!(access::remove(&mut store, projection, second).unwrap());

    let third = access::create(&mut store, projection, &product_body("C", 3.0)).unwrap();
    assert!(first < second);
    assert!(third > second, "Deleted id should not be handed out again");
}

#[test]
fn test_baseline_order_roundtrip() {
    let mut store = SqliteStore::in_memory(Revision::Baseline).unwrap();
    let projection = Revision::Baseline.projection(Entity::Order);

    let body = json!({
        "userId": 1,
        "productIds": [1, 2],
        "status": "CREATED",
        "total": 42.5,
        "discountCode": "SPRING",
        "shippingAddress": {
            "street": "1 Main St",
            "city": "Springfield",
            "zipCode": "12345",
            "country": "US"
        }
    });
    let id = access::create(&mut store, projection, &body).unwrap();

    let order: baseline::Order = access::fetch_as(&store, projection, id).unwrap();
    assert_eq!(order.product_ids, vec![1, 2]);
    assert_eq!(order.discount_code.as_deref(), Some("SPRING"));
    assert_eq!(order.shipping_address.zip_code, "12345");
}

#[test]
fn test_feature_schema_columns() {
    let mut store = SqliteStore::in_memory(Revision::Feature).unwrap();
    let users = Revision::Feature.projection(Entity::User);
    let orders = Revision::Feature.projection(Entity::Order);

    let user_id = access::create(
        &mut store,
        users,
        &json!({
            "emailAddress": "bob@example.com",
            "name": "Bob",
            "status": "SUSPENDED",
            "description": "",
            "tag": "vip",
            "paymentMethod": "BANK_TRANSFER",
            "paymentDetails": {"accountNumber": "123", "routingNumber": "456"},
            "phoneNumber": "+1 555 0100"
        }),
    )
    .unwrap();

    let row = store.get(Table::Users, user_id).unwrap().unwrap();
    assert_eq!(row.get("email_address"), &ColumnValue::Text("bob@example.com".into()));
    assert_eq!(row.get("phone_number"), &ColumnValue::Text("+1 555 0100".into()));

    let order_id = access::create(
        &mut store,
        orders,
        &json!({"userId": user_id, "productIds": [], "status": "CREATED", "total": 0.0}),
    )
    .unwrap();

    let order: feature::Order = access::fetch_as(&store, orders, order_id).unwrap();
    assert!(order.shipping_address.is_none());
}

#[test]
fn test_invalid_column_rejected() {
    let mut store = SqliteStore::in_memory(Revision::Baseline).unwrap();

    let result = store.insert(
        Table::Products,
        &[("name) VALUES ('x'); --", ColumnValue::Text("x".into()))],
    );
    assert!(matches!(result, Err(StoreError::InvalidColumn(_))));
}

#[test]
fn test_null_json_columns_default() {
    let mut store = SqliteStore::in_memory(Revision::Baseline).unwrap();
    let projection = Revision::Baseline.projection(Entity::User);

    let id = store
        .insert(
            Table::Users,
            &[
                ("email", ColumnValue::Text("raw@example.com".into())),
                ("name", ColumnValue::Text("Raw".into())),
                ("status", ColumnValue::Text("PENDING".into())),
                ("payment_method", ColumnValue::Text("CREDIT_CARD".into())),
            ],
        )
        .unwrap();

    let user = access::fetch(&store, projection, id).unwrap();
    assert_eq!(user["metadata"], json!({}));
    assert_eq!(user["tags"], json!([]));
    assert_eq!(user["description"], Value::Null);
}

#[test]
fn test_empty_update_reports_existence() {
    let mut store = SqliteStore::in_memory(Revision::Baseline).unwrap();
    let id = access::create(
        &mut store,
        Revision::Baseline.projection(Entity::Product),
        &product_body("Hammer", 9.5),
    )
    .unwrap();

    assert_eq!(store.update(Table::Products, id, &[]).unwrap(), 1);
    assert_eq!(store.update(Table::Products, id + 1, &[]).unwrap(), 0);
}
