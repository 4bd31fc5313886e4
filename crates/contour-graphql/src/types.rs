//! GraphQL types shared by both revisions

use async_graphql::{Context, Enum, InputObject, SimpleObject, ID};
use contour_domain::{access, Entity, Revision};
use serde_json::{json, Value};

use crate::with_store;

/// Lifecycle of an order
#[derive(Enum, Copy, Clone, Debug, Eq, PartialEq)]
#[graphql(remote = "contour_domain::OrderStatus")]
pub enum OrderStatus {
    /// Order placed
    Created,
    /// Being prepared
    Processing,
    /// Handed to the carrier
    Shipped,
    /// Received by the customer
    Delivered,
}

/// Credit card payment
#[derive(SimpleObject, Clone, Debug, PartialEq)]
pub struct CreditCard {
    /// Card network
    #[graphql(name = "type")]
    pub card_type: String,
    /// Last four digits
    pub last4: String,
}

/// Debit card payment
#[derive(SimpleObject, Clone, Debug, PartialEq)]
pub struct DebitCard {
    /// Card network
    #[graphql(name = "type")]
    pub card_type: String,
    /// Issuing bank
    pub bank: String,
}

/// PayPal payment
#[derive(SimpleObject, Clone, Debug, PartialEq)]
pub struct PayPal {
    /// Account email
    pub email: String,
}

/// One `{key, value}` product specification
#[derive(SimpleObject, Clone, Debug, PartialEq)]
pub struct ProductSpec {
    /// Specification name
    pub key: String,
    /// Specification value
    pub value: String,
}

/// Product specification on write
#[derive(InputObject, Clone, Debug)]
pub struct ProductSpecInput {
    /// Specification name
    pub key: String,
    /// Specification value
    pub value: String,
}

/// A catalogue product
#[derive(SimpleObject, Clone, Debug, PartialEq)]
pub struct Product {
    /// Store-assigned id
    pub id: ID,
    /// Display name
    pub name: String,
    /// Unit price
    pub price: f64,
    /// Category label
    pub category: String,
    /// Availability flag
    pub in_stock: bool,
    /// Ordered specifications
    pub specifications: Vec<ProductSpec>,
}

impl From<contour_domain::Product> for Product {
    fn from(product: contour_domain::Product) -> Self {
        Self {
            id: ID::from(product.id),
            name: product.name,
            price: product.price,
            category: product.category,
            in_stock: product.in_stock,
            specifications: product
                .specifications
                .into_iter()
                .map(|spec| ProductSpec {
                    key: spec.key,
                    value: spec.value,
                })
                .collect(),
        }
    }
}

/// REST wire object for a product write
pub(crate) fn product_body(
    name: String,
    price: f64,
    category: String,
    in_stock: bool,
    specifications: Vec<ProductSpecInput>,
) -> Value {
    let specifications: Vec<Value> = specifications
        .into_iter()
        .map(|spec| json!({"key": spec.key, "value": spec.value}))
        .collect();

    json!({
        "name": name,
        "price": price,
        "category": category,
        "inStock": in_stock,
        "specifications": specifications,
    })
}

/// Every product, in insertion order
pub(crate) fn list_products(ctx: &Context<'_>, revision: Revision) -> async_graphql::Result<Vec<Product>> {
    let products: Vec<contour_domain::Product> =
        with_store(ctx, |store| access::fetch_all_as(&*store, revision.projection(Entity::Product)))?;
    Ok(products.into_iter().map(Product::from).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use contour_domain::ProductSpec as DomainSpec;

    #[test]
    fn test_order_status_remote_conversion() {
        let status: OrderStatus = contour_domain::OrderStatus::Shipped.into();
        assert_eq!(status, OrderStatus::Shipped);

        let back: contour_domain::OrderStatus = OrderStatus::Delivered.into();
        assert_eq!(back.as_str(), "DELIVERED");
    }

    #[test]
    fn test_product_from_record() {
        let product = Product::from(contour_domain::Product {
            id: 3,
            name: "Lamp".to_string(),
            price: 12.5,
            category: "home".to_string(),
            in_stock: false,
            specifications: vec![DomainSpec {
                key: "watts".to_string(),
                value: "40".to_string(),
            }],
        });

        assert_eq!(product.id, ID::from("3"));
        assert!(!product.in_stock);
        assert_eq!(product.specifications[0].value, "40");
    }

    #[test]
    fn test_product_body_uses_wire_names() {
        let body = product_body(
            "Lamp".to_string(),
            1.0,
            "home".to_string(),
            true,
            vec![ProductSpecInput {
                key: "k".to_string(),
                value: "v".to_string(),
            }],
        );
        assert_eq!(body["inStock"], json!(true));
        assert_eq!(body["specifications"], json!([{"key": "k", "value": "v"}]));
    }
}
