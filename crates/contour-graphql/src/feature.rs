//! Feature revision schema
//!
//! Breaking changes against [`crate::baseline`]: `PENDING` is replaced by
//! `SUSPENDED`, the payment union gains `BankTransfer`, users trade
//! `description`/`metadata`/`tags` for `tag` and `phoneNumber`, addresses
//! are flat and an order's shipping address may be null. Only reads and
//! `createUser` are exposed.

use async_graphql::{Context, Enum, InputObject, Object, Result, SimpleObject, Union, ID};
use contour_domain::model::feature;
use contour_domain::{access, ContractError, Entity, EntityProjection, Revision};
use serde_json::{json, Value};

use crate::types::{self, CreditCard, DebitCard, OrderStatus, PayPal, Product};
use crate::{classify_payment, found, parse_id, to_graphql_error, with_store};

const REVISION: Revision = Revision::Feature;

fn users() -> &'static EntityProjection {
    REVISION.projection(Entity::User)
}

fn orders() -> &'static EntityProjection {
    REVISION.projection(Entity::Order)
}

/// Account status
#[derive(Enum, Copy, Clone, Debug, Eq, PartialEq)]
#[graphql(remote = "contour_domain::model::feature::UserStatus")]
pub enum UserStatus {
    /// Active account
    Active,
    /// Deactivated account
    Inactive,
    /// Suspended by an operator
    Suspended,
}

/// Bank transfer payment
#[derive(SimpleObject, Clone, Debug, PartialEq)]
pub struct BankTransfer {
    /// Account number
    pub account_number: String,
    /// Routing number
    pub routing_number: String,
}

/// Payment method rebuilt from the stored classification
#[derive(Union, Clone, Debug, PartialEq)]
pub enum PaymentMethod {
    /// Credit card
    CreditCard(CreditCard),
    /// Debit card
    DebitCard(DebitCard),
    /// PayPal
    PayPal(PayPal),
    /// Bank transfer
    BankTransfer(BankTransfer),
}

impl From<contour_domain::PaymentMethod> for PaymentMethod {
    fn from(method: contour_domain::PaymentMethod) -> Self {
        use contour_domain::PaymentMethod as Domain;

        match method {
            Domain::CreditCard { card_type, last4 } => PaymentMethod::CreditCard(CreditCard { card_type, last4 }),
            Domain::DebitCard { card_type, bank } => PaymentMethod::DebitCard(DebitCard { card_type, bank }),
            Domain::PayPal { email } => PaymentMethod::PayPal(PayPal { email }),
            Domain::BankTransfer {
                account_number,
                routing_number,
            } => PaymentMethod::BankTransfer(BankTransfer {
                account_number,
                routing_number,
            }),
        }
    }
}

/// Payment input; the fields present decide the classification
#[derive(InputObject, Clone, Debug, Default)]
pub struct PaymentMethodInput {
    /// Card network (credit and debit cards)
    #[graphql(name = "type")]
    pub card_type: Option<String>,
    /// Last four digits (credit card)
    pub last4: Option<String>,
    /// Issuing bank (debit card)
    pub bank: Option<String>,
    /// Account email (PayPal)
    pub email: Option<String>,
    /// Account number (bank transfer)
    pub account_number: Option<String>,
    /// Routing number (bank transfer)
    pub routing_number: Option<String>,
}

impl From<PaymentMethodInput> for contour_domain::PaymentMethodInput {
    fn from(input: PaymentMethodInput) -> Self {
        Self {
            card_type: input.card_type,
            last4: input.last4,
            bank: input.bank,
            email: input.email,
            account_number: input.account_number,
            routing_number: input.routing_number,
        }
    }
}

/// A user account
#[derive(SimpleObject, Clone, Debug, PartialEq)]
pub struct User {
    /// Store-assigned id
    pub id: ID,
    /// Contact address
    pub email: String,
    /// Display name
    pub name: String,
    /// Account status
    pub status: UserStatus,
    /// Single tag
    pub tag: String,
    /// Contact phone number
    pub phone_number: String,
    /// Payment method
    pub payment_method: PaymentMethod,
}

impl From<feature::User> for User {
    fn from(user: feature::User) -> Self {
        let method = contour_domain::PaymentMethod::reconstruct(user.payment_method, &user.payment_details);

        Self {
            id: ID::from(user.id),
            email: user.email_address,
            name: user.name,
            status: user.status.into(),
            tag: user.tag,
            phone_number: user.phone_number,
            payment_method: method.into(),
        }
    }
}

/// Shipping address
#[derive(SimpleObject, Clone, Debug, PartialEq)]
pub struct Address {
    /// Street line
    pub street: String,
    /// City
    pub city: String,
    /// Postal code
    pub postal_code: String,
}

impl From<feature::Address> for Address {
    fn from(address: feature::Address) -> Self {
        Self {
            street: address.street,
            city: address.city,
            postal_code: address.postal_code,
        }
    }
}

/// A placed order
#[derive(SimpleObject, Clone, Debug)]
pub struct Order {
    /// Store-assigned id
    pub id: ID,
    /// Owning user
    pub user_id: ID,
    /// Ordered product ids
    pub product_ids: Vec<ID>,
    /// Order status
    pub status: OrderStatus,
    /// Order total
    pub total: f64,
    /// Applied discount code
    pub discount_code: Option<String>,
    /// Shipping address, if any
    pub shipping_address: Option<Address>,
}

impl From<feature::Order> for Order {
    fn from(order: feature::Order) -> Self {
        Self {
            id: ID::from(order.id),
            user_id: ID::from(order.user_id),
            product_ids: order.product_ids.into_iter().map(ID::from).collect(),
            status: order.status.into(),
            total: order.total,
            discount_code: order.discount_code,
            shipping_address: order.shipping_address.map(Address::from),
        }
    }
}

fn user_body(
    email: String,
    name: String,
    status: UserStatus,
    tag: String,
    phone_number: String,
    payment_method: PaymentMethodInput,
) -> Result<Value, ContractError> {
    let payment: contour_domain::PaymentMethodInput = payment_method.into();
    let kind = classify_payment(&payment, REVISION)?;
    let status: feature::UserStatus = status.into();

    // The column is required but this schema no longer exposes it
    Ok(json!({
        "emailAddress": email,
        "name": name,
        "status": status.as_str(),
        "description": "",
        "tag": tag,
        "paymentMethod": kind.as_str(),
        "paymentDetails": payment.details(),
        "phoneNumber": phone_number,
    }))
}

/// Feature query root
pub struct QueryRoot;

#[Object]
impl QueryRoot {
    /// One user, `null` when absent
    async fn user(&self, ctx: &Context<'_>, id: ID) -> Result<Option<User>> {
        let record: Option<feature::User> = with_store(ctx, |store| {
            found(access::fetch_as(&*store, users(), parse_id(&id)?))
        })?;
        Ok(record.map(User::from))
    }

    /// Every user
    async fn users(&self, ctx: &Context<'_>) -> Result<Vec<User>> {
        let records: Vec<feature::User> = with_store(ctx, |store| access::fetch_all_as(&*store, users()))?;
        Ok(records.into_iter().map(User::from).collect())
    }

    /// One order, `null` when absent
    async fn order(&self, ctx: &Context<'_>, id: ID) -> Result<Option<Order>> {
        let record: Option<feature::Order> = with_store(ctx, |store| {
            found(access::fetch_as(&*store, orders(), parse_id(&id)?))
        })?;
        Ok(record.map(Order::from))
    }

    /// Every product
    async fn products(&self, ctx: &Context<'_>) -> Result<Vec<Product>> {
        types::list_products(ctx, REVISION)
    }
}

/// Feature mutation root
pub struct MutationRoot;

#[Object]
impl MutationRoot {
    /// Create a user and return it as stored
    #[allow(clippy::too_many_arguments)]
    async fn create_user(
        &self,
        ctx: &Context<'_>,
        email: String,
        name: String,
        status: UserStatus,
        tag: String,
        phone_number: String,
        payment_method: PaymentMethodInput,
    ) -> Result<User> {
        let body = user_body(email, name, status, tag, phone_number, payment_method)
            .map_err(to_graphql_error)?;

        let record: feature::User = with_store(ctx, |store| {
            let id = access::create(store, users(), &body)?;
            access::fetch_as(&*store, users(), id)
        })?;

        tracing::info!(id = %record.id, "User created over GraphQL");
        Ok(record.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contour_domain::PaymentMethodKind;
    use serde_json::Map;

    #[test]
    fn test_account_number_is_bank_transfer() {
        let body = user_body(
            "a@b.com".to_string(),
            "A".to_string(),
            UserStatus::Suspended,
            "vip".to_string(),
            "555".to_string(),
            PaymentMethodInput {
                account_number: Some("123".to_string()),
                routing_number: Some("456".to_string()),
                ..Default::default()
            },
        )
        .unwrap();

        assert_eq!(body["paymentMethod"], json!("BANK_TRANSFER"));
        assert_eq!(body["status"], json!("SUSPENDED"));
        assert_eq!(body["description"], json!(""));
    }

    #[test]
    fn test_bank_transfer_variant() {
        let mut details = Map::new();
        details.insert("accountNumber".to_string(), json!("123"));
        let method: PaymentMethod =
            contour_domain::PaymentMethod::reconstruct(PaymentMethodKind::BankTransfer, &details).into();

        assert_eq!(
            method,
            PaymentMethod::BankTransfer(BankTransfer {
                account_number: "123".to_string(),
                routing_number: String::new(),
            })
        );
    }
}
