//! Typed entity records
//!
//! Decoded wire objects deserialize into these records, which is what the
//! GraphQL and gRPC adapters reshape from. Shapes that are identical across
//! revisions live here; the diverging ones live in [`baseline`] and
//! [`feature`].

use serde::{Deserialize, Serialize};

pub mod baseline;
pub mod feature;

/// Lifecycle of an order (identical in both revisions)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
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

impl OrderStatus {
    /// Allow-list of wire values
    pub const NAMES: &'static [&'static str] = &["CREATED", "PROCESSING", "SHIPPED", "DELIVERED"];

    /// Get the wire value
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Created => "CREATED",
            OrderStatus::Processing => "PROCESSING",
            OrderStatus::Shipped => "SHIPPED",
            OrderStatus::Delivered => "DELIVERED",
        }
    }

    /// Parse a wire value
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "CREATED" => Some(OrderStatus::Created),
            "PROCESSING" => Some(OrderStatus::Processing),
            "SHIPPED" => Some(OrderStatus::Shipped),
            "DELIVERED" => Some(OrderStatus::Delivered),
            _ => None,
        }
    }
}

/// One `{key, value}` entry of a product's specifications
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductSpec {
    /// Specification name
    pub key: String,
    /// Specification value
    pub value: String,
}

/// A catalogue product (identical in both revisions)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Store-assigned id
    pub id: i64,
    /// Display name
    pub name: String,
    /// Unit price
    pub price: f64,
    /// Category label
    pub category: String,
    /// Availability flag (persisted as 0/1)
    pub in_stock: bool,
    /// Ordered key/value specifications
    #[serde(default)]
    pub specifications: Vec<ProductSpec>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_order_status_names_parse() {
        for name in OrderStatus::NAMES {
            let status = OrderStatus::parse(name).unwrap();
            assert_eq!(status.as_str(), *name);
        }
        assert_eq!(OrderStatus::parse("CANCELLED"), None);
    }

    #[test]
    fn test_order_status_serde_matches_names() {
        let value = serde_json::to_value(OrderStatus::Processing).unwrap();
        assert_eq!(value, json!("PROCESSING"));
    }

    #[test]
    fn test_product_from_wire() {
        let product: Product = serde_json::from_value(json!({
            "id": 1,
            "name": "Widget",
            "price": 9.5,
            "category": "tools",
            "inStock": true,
            "specifications": [{"key": "color", "value": "red"}]
        }))
        .unwrap();

        assert!(product.in_stock);
        assert_eq!(product.specifications[0].key, "color");
    }
}
