//! Payment method module
//!
//! Rows persist only a classification string (`CREDIT_CARD`, `DEBIT_CARD`,
//! `PAYPAL`, `BANK_TRANSFER`) plus the raw input fields as a JSON object.
//! Write paths that receive an input object classify it by field presence;
//! read paths rebuild the tagged variant from classification and details.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{Revision, ValidationError};

/// Payment classification persisted in the `payment_method` column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PaymentMethodKind {
    /// Credit card
    #[serde(rename = "CREDIT_CARD")]
    CreditCard,
    /// Debit card
    #[serde(rename = "DEBIT_CARD")]
    DebitCard,
    /// PayPal account
    #[serde(rename = "PAYPAL")]
    PayPal,
    /// Bank transfer (feature revision only)
    #[serde(rename = "BANK_TRANSFER")]
    BankTransfer,
}

impl PaymentMethodKind {
    /// Get the persisted classification string
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethodKind::CreditCard => "CREDIT_CARD",
            PaymentMethodKind::DebitCard => "DEBIT_CARD",
            PaymentMethodKind::PayPal => "PAYPAL",
            PaymentMethodKind::BankTransfer => "BANK_TRANSFER",
        }
    }

    /// Parse a classification string
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "CREDIT_CARD" => Some(PaymentMethodKind::CreditCard),
            "DEBIT_CARD" => Some(PaymentMethodKind::DebitCard),
            "PAYPAL" => Some(PaymentMethodKind::PayPal),
            "BANK_TRANSFER" => Some(PaymentMethodKind::BankTransfer),
            _ => None,
        }
    }
}

impl std::str::FromStr for PaymentMethodKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("Invalid payment method: {}", s))
    }
}

/// Shape recognized from the fields present on a [`PaymentMethodInput`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentShape {
    /// `email` without `type` or `bank`
    PayPal,
    /// `bank` present
    DebitCard,
    /// `type` and `last4` present
    CreditCard,
    /// `accountNumber` present (feature revision only)
    BankTransfer,
    /// None of the above. Persisted as `CREDIT_CARD`.
    ///
    /// Open question: nobody has confirmed whether silently treating
    /// unrecognized input as a credit card is intended or hides malformed
    /// requests. Adapters log a warning when this case is hit.
    Unrecognized,
}

impl PaymentShape {
    /// Classification persisted for this shape
    pub fn kind(&self) -> PaymentMethodKind {
        match self {
            PaymentShape::PayPal => PaymentMethodKind::PayPal,
            PaymentShape::DebitCard => PaymentMethodKind::DebitCard,
            PaymentShape::CreditCard => PaymentMethodKind::CreditCard,
            PaymentShape::BankTransfer => PaymentMethodKind::BankTransfer,
            PaymentShape::Unrecognized => PaymentMethodKind::CreditCard,
        }
    }

    /// Whether this is the fallback case
    pub fn is_fallback(&self) -> bool {
        matches!(self, PaymentShape::Unrecognized)
    }
}

/// Payment input object as write paths receive it
///
/// Every field is optional; which ones are present decides the
/// classification. Empty strings count as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PaymentMethodInput {
    /// Card network, e.g. `visa`
    #[serde(rename = "type")]
    pub card_type: Option<String>,
    /// Last four card digits
    pub last4: Option<String>,
    /// Issuing bank
    pub bank: Option<String>,
    /// PayPal account email
    pub email: Option<String>,
    /// Bank account number
    pub account_number: Option<String>,
    /// Bank routing number
    pub routing_number: Option<String>,
}

fn present(field: &Option<String>) -> bool {
    field.as_deref().is_some_and(|v| !v.is_empty())
}

impl PaymentMethodInput {
    /// Recognize the input's shape by field presence
    ///
    /// Rules are evaluated in order; bank-transfer fields are only considered
    /// when the revision accepts `BANK_TRANSFER`.
    pub fn shape(&self, revision: Revision) -> PaymentShape {
        let card_type = present(&self.card_type);
        let last4 = present(&self.last4);
        let bank = present(&self.bank);
        let email = present(&self.email);
        let bank_transfer = revision.accepts_payment_method(PaymentMethodKind::BankTransfer)
            && present(&self.account_number);

        match (card_type, last4, bank, email, bank_transfer) {
            (false, _, false, true, _) => PaymentShape::PayPal,
            (_, _, true, _, _) => PaymentShape::DebitCard,
            (true, true, _, _, _) => PaymentShape::CreditCard,
            (_, _, _, _, true) => PaymentShape::BankTransfer,
            _ => PaymentShape::Unrecognized,
        }
    }

    /// Derive the classification and check it against the revision's allow-list
    pub fn classify(&self, revision: Revision) -> Result<PaymentMethodKind, ValidationError> {
        let kind = self.shape(revision).kind();
        revision.check_payment_method(kind)?;
        Ok(kind)
    }

    /// Present fields keyed by their wire names, for the `payment_details` column
    pub fn details(&self) -> Map<String, Value> {
        let fields = [
            ("type", &self.card_type),
            ("last4", &self.last4),
            ("bank", &self.bank),
            ("email", &self.email),
            ("accountNumber", &self.account_number),
            ("routingNumber", &self.routing_number),
        ];

        fields
            .into_iter()
            .filter(|(_, value)| present(value))
            .filter_map(|(key, value)| value.clone().map(|v| (key.to_string(), Value::String(v))))
            .collect()
    }
}

/// Tagged payment variant rebuilt on read
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymentMethod {
    /// Credit card
    CreditCard {
        /// Card network
        card_type: String,
        /// Last four digits
        last4: String,
    },
    /// Debit card
    DebitCard {
        /// Card network
        card_type: String,
        /// Issuing bank
        bank: String,
    },
    /// PayPal account
    PayPal {
        /// Account email
        email: String,
    },
    /// Bank transfer
    BankTransfer {
        /// Account number
        account_number: String,
        /// Routing number
        routing_number: String,
    },
}

impl PaymentMethod {
    /// Rebuild the variant named by `kind` from persisted details
    ///
    /// Missing detail fields become empty strings.
    pub fn reconstruct(kind: PaymentMethodKind, details: &Map<String, Value>) -> Self {
        let field = |key: &str| {
            details
                .get(key)
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string()
        };

        match kind {
            PaymentMethodKind::CreditCard => PaymentMethod::CreditCard {
                card_type: field("type"),
                last4: field("last4"),
            },
            PaymentMethodKind::DebitCard => PaymentMethod::DebitCard {
                card_type: field("type"),
                bank: field("bank"),
            },
            PaymentMethodKind::PayPal => PaymentMethod::PayPal {
                email: field("email"),
            },
            PaymentMethodKind::BankTransfer => PaymentMethod::BankTransfer {
                account_number: field("accountNumber"),
                routing_number: field("routingNumber"),
            },
        }
    }

    /// Classification of this variant
    pub fn kind(&self) -> PaymentMethodKind {
        match self {
            PaymentMethod::CreditCard { .. } => PaymentMethodKind::CreditCard,
            PaymentMethod::DebitCard { .. } => PaymentMethodKind::DebitCard,
            PaymentMethod::PayPal { .. } => PaymentMethodKind::PayPal,
            PaymentMethod::BankTransfer { .. } => PaymentMethodKind::BankTransfer,
        }
    }
}
