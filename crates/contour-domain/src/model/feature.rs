//! Feature revision records (the breaking-change variant)
//!
//! Differences from [`super::baseline`]:
//! - `UserStatus` drops `PENDING` and adds `SUSPENDED`
//! - `User` loses `metadata`, collapses `tags` into a single `tag`, makes
//!   `description` required and adds a required `phoneNumber`
//! - `Address` is `{street, city, postalCode}` and `Order.shippingAddress`
//!   is nullable

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::OrderStatus;
use crate::PaymentMethodKind;

/// Account status in the feature revision
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserStatus {
    /// Active account
    Active,
    /// Deactivated account
    Inactive,
    /// Suspended by an operator
    Suspended,
}

impl UserStatus {
    /// Allow-list of wire values
    pub const NAMES: &'static [&'static str] = &["ACTIVE", "INACTIVE", "SUSPENDED"];

    /// Get the wire value
    pub fn as_str(&self) -> &'static str {
        match self {
            UserStatus::Active => "ACTIVE",
            UserStatus::Inactive => "INACTIVE",
            UserStatus::Suspended => "SUSPENDED",
        }
    }
}

/// A user as the feature revision exposes it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Store-assigned id
    pub id: i64,
    /// Contact address (column `email_address`)
    pub email_address: String,
    /// Display name
    pub name: String,
    /// Account status
    pub status: UserStatus,
    /// Free text, required in this revision
    pub description: String,
    /// Single tag replacing the `tags` list
    pub tag: String,
    /// Payment classification
    pub payment_method: PaymentMethodKind,
    /// Fields of the payment input the classification was derived from
    #[serde(default)]
    pub payment_details: Map<String, Value>,
    /// Contact phone number
    pub phone_number: String,
}

/// Shipping address as stored in the feature revision
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Address {
    /// Street line
    pub street: String,
    /// City
    pub city: String,
    /// Postal code (replaces `zipCode` + `country`)
    pub postal_code: String,
}

/// An order as the feature revision exposes it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    /// Store-assigned id
    pub id: i64,
    /// Owning user (not enforced)
    pub user_id: i64,
    /// Ordered product ids
    #[serde(default)]
    pub product_ids: Vec<i64>,
    /// Order status
    pub status: OrderStatus,
    /// Order total
    pub total: f64,
    /// Applied discount code, if any
    #[serde(default)]
    pub discount_code: Option<String>,
    /// Shipping address, nullable in this revision
    #[serde(default)]
    pub shipping_address: Option<Address>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_null_shipping_address() {
        let order: Order = serde_json::from_value(json!({
            "id": 4,
            "userId": 1,
            "productIds": [1, 2],
            "status": "SHIPPED",
            "total": 12.5,
            "discountCode": null,
            "shippingAddress": null
        }))
        .unwrap();

        assert_eq!(order.shipping_address, None);
        assert_eq!(order.status, OrderStatus::Shipped);
    }

    #[test]
    fn test_pending_is_not_feature() {
        let result: Result<UserStatus, _> = serde_json::from_value(json!("PENDING"));
        assert!(result.is_err());
    }
}
