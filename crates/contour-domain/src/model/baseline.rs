//! Baseline revision records

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::OrderStatus;
use crate::PaymentMethodKind;

/// Account status in the baseline revision
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserStatus {
    /// Active account
    Active,
    /// Deactivated account
    Inactive,
    /// Awaiting activation
    Pending,
}

impl UserStatus {
    /// Allow-list of wire values
    pub const NAMES: &'static [&'static str] = &["ACTIVE", "INACTIVE", "PENDING"];

    /// Get the wire value
    pub fn as_str(&self) -> &'static str {
        match self {
            UserStatus::Active => "ACTIVE",
            UserStatus::Inactive => "INACTIVE",
            UserStatus::Pending => "PENDING",
        }
    }
}

/// A user as the baseline revision exposes it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Store-assigned id
    pub id: i64,
    /// Contact address (column `email`)
    pub email_address: String,
    /// Display name
    pub name: String,
    /// Account status
    pub status: UserStatus,
    /// Free text, nullable
    #[serde(default)]
    pub description: Option<String>,
    /// Arbitrary key-value mapping
    #[serde(default)]
    pub metadata: Map<String, Value>,
    /// Ordered tags
    #[serde(default)]
    pub tags: Vec<String>,
    /// Payment classification
    pub payment_method: PaymentMethodKind,
    /// Fields of the payment input the classification was derived from
    #[serde(default)]
    pub payment_details: Map<String, Value>,
}

/// Flat shipping address as stored in the baseline revision
///
/// Missing fields default to empty strings so a `{}` column still decodes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Address {
    /// Street line
    pub street: String,
    /// City
    pub city: String,
    /// Postal code
    pub zip_code: String,
    /// Country
    pub country: String,
}

/// An order as the baseline revision exposes it
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
    /// Required shipping address
    #[serde(default)]
    pub shipping_address: Address,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_user_defaults_composite_fields() {
        let user: User = serde_json::from_value(json!({
            "id": 1,
            "emailAddress": "ada@example.com",
            "name": "Ada",
            "status": "PENDING",
            "paymentMethod": "PAYPAL"
        }))
        .unwrap();

        assert_eq!(user.status, UserStatus::Pending);
        assert!(user.metadata.is_empty());
        assert!(user.tags.is_empty());
        assert_eq!(user.description, None);
    }

    #[test]
    fn test_empty_address_decodes() {
        let address: Address = serde_json::from_value(json!({})).unwrap();
        assert_eq!(address, Address::default());
    }

    #[test]
    fn test_suspended_is_not_baseline() {
        let result: Result<UserStatus, _> = serde_json::from_value(json!("SUSPENDED"));
        assert!(result.is_err());
    }
}
