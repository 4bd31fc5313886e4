//! Revision module - the two deployable schema variants

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::projection::{self, EntityProjection};
use crate::{Entity, PaymentMethodKind, ValidationError};

/// Schema revision a process is deployed with
///
/// The two revisions are separate configurations of the same projection
/// layer, not a migration history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Revision {
    /// Stable shapes
    #[default]
    Baseline,
    /// Variant with deliberate breaking changes
    Feature,
}

const BASELINE_PAYMENT_METHODS: &[PaymentMethodKind] = &[
    PaymentMethodKind::CreditCard,
    PaymentMethodKind::DebitCard,
    PaymentMethodKind::PayPal,
];

const FEATURE_PAYMENT_METHODS: &[PaymentMethodKind] = &[
    PaymentMethodKind::CreditCard,
    PaymentMethodKind::DebitCard,
    PaymentMethodKind::PayPal,
    PaymentMethodKind::BankTransfer,
];

impl Revision {
    /// Get the revision name
    pub fn as_str(&self) -> &'static str {
        match self {
            Revision::Baseline => "baseline",
            Revision::Feature => "feature",
        }
    }

    /// Parse a revision name
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "baseline" => Some(Revision::Baseline),
            "feature" => Some(Revision::Feature),
            _ => None,
        }
    }

    /// Projection for one entity
    pub fn projection(&self, entity: Entity) -> &'static EntityProjection {
        match (self, entity) {
            (Revision::Baseline, Entity::User) => &projection::BASELINE_USER,
            (Revision::Baseline, Entity::Product) => &projection::PRODUCT,
            (Revision::Baseline, Entity::Order) => &projection::BASELINE_ORDER,
            (Revision::Feature, Entity::User) => &projection::FEATURE_USER,
            (Revision::Feature, Entity::Product) => &projection::PRODUCT,
            (Revision::Feature, Entity::Order) => &projection::FEATURE_ORDER,
        }
    }

    /// Projections for every entity, in route order
    pub fn projections(&self) -> [&'static EntityProjection; 3] {
        [
            self.projection(Entity::User),
            self.projection(Entity::Product),
            self.projection(Entity::Order),
        ]
    }

    /// Closed set of payment classifications this revision accepts
    pub fn payment_methods(&self) -> &'static [PaymentMethodKind] {
        match self {
            Revision::Baseline => BASELINE_PAYMENT_METHODS,
            Revision::Feature => FEATURE_PAYMENT_METHODS,
        }
    }

    /// Whether a classification is in this revision's allow-list
    pub fn accepts_payment_method(&self, kind: PaymentMethodKind) -> bool {
        self.payment_methods().contains(&kind)
    }

    /// Reject a classification outside this revision's allow-list
    pub fn check_payment_method(&self, kind: PaymentMethodKind) -> Result<(), ValidationError> {
        if self.accepts_payment_method(kind) {
            return Ok(());
        }

        Err(ValidationError::InvalidEnum {
            field: "paymentMethod",
            value: kind.as_str().to_string(),
            allowed: self
                .payment_methods()
                .iter()
                .map(PaymentMethodKind::as_str)
                .collect::<Vec<_>>()
                .join(", "),
        })
    }
}

impl fmt::Display for Revision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Revision {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("Invalid revision: {}", s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_revision() {
        assert_eq!(Revision::parse("Feature"), Some(Revision::Feature));
        assert_eq!("baseline".parse::<Revision>().unwrap(), Revision::Baseline);
        assert!("v2".parse::<Revision>().is_err());
    }

    #[test]
    fn test_bank_transfer_is_feature_only() {
        assert!(!Revision::Baseline.accepts_payment_method(PaymentMethodKind::BankTransfer));
        assert!(Revision::Feature.accepts_payment_method(PaymentMethodKind::BankTransfer));

        let err = Revision::Baseline
            .check_payment_method(PaymentMethodKind::BankTransfer)
            .unwrap_err();
        assert!(err.to_string().contains("CREDIT_CARD, DEBIT_CARD, PAYPAL"));
    }

    #[test]
    fn test_projections_cover_every_table() {
        for revision in [Revision::Baseline, Revision::Feature] {
            let tables: Vec<_> = revision.projections().iter().map(|p| p.entity.table()).collect();
            assert_eq!(tables.len(), 3);
            assert_eq!(revision.projection(Entity::Order).collection, "orders");
        }
    }
}
