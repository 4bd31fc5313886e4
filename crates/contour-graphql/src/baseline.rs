//! Baseline revision schema
//!
//! Full CRUD over users, products and orders. Payment methods are a union
//! on read and a presence-classified input object on write; the flat stored
//! shipping address is exposed nested as `location` + `postal`.

use async_graphql::{Context, Enum, InputObject, Json, Object, Result, SimpleObject, Union, ID};
use contour_domain::model::baseline;
use contour_domain::{access, ContractError, Entity, EntityProjection, Revision};
use serde_json::{json, Map, Value};

use crate::types::{self, CreditCard, DebitCard, OrderStatus, PayPal, Product, ProductSpecInput};
use crate::{classify_payment, found, parse_id, to_graphql_error, with_store};

const REVISION: Revision = Revision::Baseline;

fn users() -> &'static EntityProjection {
    REVISION.projection(Entity::User)
}

fn products() -> &'static EntityProjection {
    REVISION.projection(Entity::Product)
}

fn orders() -> &'static EntityProjection {
    REVISION.projection(Entity::Order)
}

/// Account status
#[derive(Enum, Copy, Clone, Debug, Eq, PartialEq)]
#[graphql(remote = "contour_domain::model::baseline::UserStatus")]
pub enum UserStatus {
    /// Active account
    Active,
    /// Deactivated account
    Inactive,
    /// Awaiting activation
    Pending,
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
}

impl TryFrom<contour_domain::PaymentMethod> for PaymentMethod {
    type Error = ContractError;

    fn try_from(method: contour_domain::PaymentMethod) -> Result<Self, Self::Error> {
        use contour_domain::PaymentMethod as Domain;

        match method {
            Domain::CreditCard { card_type, last4 } => {
                Ok(PaymentMethod::CreditCard(CreditCard { card_type, last4 }))
            }
            Domain::DebitCard { card_type, bank } => {
                Ok(PaymentMethod::DebitCard(DebitCard { card_type, bank }))
            }
            Domain::PayPal { email } => Ok(PaymentMethod::PayPal(PayPal { email })),
            Domain::BankTransfer { .. } => Err(ContractError::Storage(
                "BANK_TRANSFER is not a baseline payment method".to_string(),
            )),
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
}

impl From<PaymentMethodInput> for contour_domain::PaymentMethodInput {
    fn from(input: PaymentMethodInput) -> Self {
        Self {
            card_type: input.card_type,
            last4: input.last4,
            bank: input.bank,
            email: input.email,
            ..Default::default()
        }
    }
}

/// A user account
#[derive(SimpleObject, Clone, Debug)]
pub struct User {
    /// Store-assigned id
    pub id: ID,
    /// Contact address
    pub email: String,
    /// Display name
    pub name: String,
    /// Account status
    pub status: UserStatus,
    /// Free text
    pub description: Option<String>,
    /// Arbitrary key-value mapping
    pub metadata: Option<Json<Map<String, Value>>>,
    /// Ordered tags
    pub tags: Vec<String>,
    /// Payment method
    pub payment_method: PaymentMethod,
}

impl TryFrom<baseline::User> for User {
    type Error = ContractError;

    fn try_from(user: baseline::User) -> Result<Self, Self::Error> {
        let method = contour_domain::PaymentMethod::reconstruct(user.payment_method, &user.payment_details);

        Ok(Self {
            id: ID::from(user.id),
            email: user.email_address,
            name: user.name,
            status: user.status.into(),
            description: user.description,
            metadata: Some(Json(user.metadata)),
            tags: user.tags,
            payment_method: method.try_into()?,
        })
    }
}

/// Street part of an address
#[derive(SimpleObject, Clone, Debug, PartialEq)]
pub struct Location {
    /// Street line
    pub street: String,
    /// City
    pub city: String,
}

/// Postal part of an address
#[derive(SimpleObject, Clone, Debug, PartialEq)]
pub struct Postal {
    /// Postal code
    pub zip_code: String,
    /// Country
    pub country: String,
}

/// Shipping address, nested
#[derive(SimpleObject, Clone, Debug, PartialEq)]
pub struct Address {
    /// Street and city
    pub location: Location,
    /// Postal code and country
    pub postal: Postal,
}

impl From<baseline::Address> for Address {
    fn from(address: baseline::Address) -> Self {
        Self {
            location: Location {
                street: address.street,
                city: address.city,
            },
            postal: Postal {
                zip_code: address.zip_code,
                country: address.country,
            },
        }
    }
}

/// Street part of an address on write
#[derive(InputObject, Clone, Debug)]
pub struct LocationInput {
    /// Street line
    pub street: String,
    /// City
    pub city: String,
}

/// Postal part of an address on write
#[derive(InputObject, Clone, Debug)]
pub struct PostalInput {
    /// Postal code
    pub zip_code: String,
    /// Country
    pub country: String,
}

/// Shipping address on write
#[derive(InputObject, Clone, Debug)]
pub struct AddressInput {
    /// Street and city
    pub location: LocationInput,
    /// Postal code and country
    pub postal: PostalInput,
}

impl AddressInput {
    /// Flatten into the stored `{street, city, zipCode, country}` shape
    fn into_wire(self) -> Value {
        json!({
            "street": self.location.street,
            "city": self.location.city,
            "zipCode": self.postal.zip_code,
            "country": self.postal.country,
        })
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
    /// Shipping address
    pub shipping_address: Address,
}

impl From<baseline::Order> for Order {
    fn from(order: baseline::Order) -> Self {
        Self {
            id: ID::from(order.id),
            user_id: ID::from(order.user_id),
            product_ids: order.product_ids.into_iter().map(ID::from).collect(),
            status: order.status.into(),
            total: order.total,
            discount_code: order.discount_code,
            shipping_address: order.shipping_address.into(),
        }
    }
}

struct UserArgs {
    email: String,
    name: String,
    status: UserStatus,
    description: Option<String>,
    metadata: Option<Json<Map<String, Value>>>,
    tags: Vec<String>,
    payment_method: PaymentMethodInput,
}

impl UserArgs {
    fn into_body(self) -> Result<Value, ContractError> {
        let payment: contour_domain::PaymentMethodInput = self.payment_method.into();
        let kind = classify_payment(&payment, REVISION)?;
        let status: baseline::UserStatus = self.status.into();

        Ok(json!({
            "emailAddress": self.email,
            "name": self.name,
            "status": status.as_str(),
            "description": self.description,
            "metadata": self.metadata.map(|m| m.0).unwrap_or_default(),
            "tags": self.tags,
            "paymentMethod": kind.as_str(),
            "paymentDetails": payment.details(),
        }))
    }
}

struct OrderArgs {
    user_id: ID,
    product_ids: Vec<ID>,
    status: OrderStatus,
    total: f64,
    discount_code: Option<String>,
    shipping_address: AddressInput,
}

impl OrderArgs {
    fn into_body(self) -> Result<Value, ContractError> {
        let product_ids = self
            .product_ids
            .iter()
            .map(parse_id)
            .collect::<Result<Vec<_>, _>>()?;
        let status: contour_domain::OrderStatus = self.status.into();

        Ok(json!({
            "userId": parse_id(&self.user_id)?,
            "productIds": product_ids,
            "status": status.as_str(),
            "total": self.total,
            "discountCode": self.discount_code,
            "shippingAddress": self.shipping_address.into_wire(),
        }))
    }
}

fn user_from(record: baseline::User) -> Result<User> {
    User::try_from(record).map_err(to_graphql_error)
}

fn save_user(ctx: &Context<'_>, id: Option<i64>, args: UserArgs) -> Result<User> {
    let body = args.into_body().map_err(to_graphql_error)?;
    let record: baseline::User = with_store(ctx, |store| {
        let id = match id {
            Some(id) => {
                access::replace(store, users(), id, &body)?;
                id
            }
            None => access::create(store, users(), &body)?,
        };
        access::fetch_as(&*store, users(), id)
    })?;
    user_from(record)
}

fn save_order(ctx: &Context<'_>, id: Option<i64>, args: OrderArgs) -> Result<Order> {
    let body = args.into_body().map_err(to_graphql_error)?;
    let record: baseline::Order = with_store(ctx, |store| {
        let id = match id {
            Some(id) => {
                access::replace(store, orders(), id, &body)?;
                id
            }
            None => access::create(store, orders(), &body)?,
        };
        access::fetch_as(&*store, orders(), id)
    })?;
    Ok(record.into())
}

fn save_product(ctx: &Context<'_>, id: Option<i64>, body: Value) -> Result<Product> {
    let record: contour_domain::Product = with_store(ctx, |store| {
        let id = match id {
            Some(id) => {
                access::replace(store, products(), id, &body)?;
                id
            }
            None => access::create(store, products(), &body)?,
        };
        access::fetch_as(&*store, products(), id)
    })?;
    Ok(record.into())
}

fn delete(ctx: &Context<'_>, projection: &'static EntityProjection, id: &ID) -> Result<bool> {
    with_store(ctx, |store| {
        let id = parse_id(id)?;
        if access::remove(store, projection, id)? {
            Ok(true)
        } else {
            Err(ContractError::NotFound {
                entity: projection.entity,
                id,
            })
        }
    })
}

/// Baseline query root
pub struct QueryRoot;

#[Object]
impl QueryRoot {
    /// One user, `null` when absent
    async fn user(&self, ctx: &Context<'_>, id: ID) -> Result<Option<User>> {
        let record: Option<baseline::User> = with_store(ctx, |store| {
            found(access::fetch_as(&*store, users(), parse_id(&id)?))
        })?;
        record.map(user_from).transpose()
    }

    /// Every user
    async fn users(&self, ctx: &Context<'_>) -> Result<Vec<User>> {
        let records: Vec<baseline::User> = with_store(ctx, |store| access::fetch_all_as(&*store, users()))?;
        records.into_iter().map(user_from).collect()
    }

    /// One order, `null` when absent
    async fn order(&self, ctx: &Context<'_>, id: ID) -> Result<Option<Order>> {
        let record: Option<baseline::Order> = with_store(ctx, |store| {
            found(access::fetch_as(&*store, orders(), parse_id(&id)?))
        })?;
        Ok(record.map(Order::from))
    }

    /// Every order
    async fn orders(&self, ctx: &Context<'_>) -> Result<Vec<Order>> {
        let records: Vec<baseline::Order> = with_store(ctx, |store| access::fetch_all_as(&*store, orders()))?;
        Ok(records.into_iter().map(Order::from).collect())
    }

    /// Every product
    async fn products(&self, ctx: &Context<'_>) -> Result<Vec<Product>> {
        types::list_products(ctx, REVISION)
    }
}

/// Baseline mutation root
pub struct MutationRoot;

#[Object]
impl MutationRoot {
    #[allow(clippy::too_many_arguments)]
    async fn create_user(
        &self,
        ctx: &Context<'_>,
        email: String,
        name: String,
        status: UserStatus,
        description: Option<String>,
        metadata: Option<Json<Map<String, Value>>>,
        tags: Vec<String>,
        payment_method: PaymentMethodInput,
    ) -> Result<User> {
        let args = UserArgs {
            email,
            name,
            status,
            description,
            metadata,
            tags,
            payment_method,
        };
        save_user(ctx, None, args)
    }

    #[allow(clippy::too_many_arguments)]
    async fn update_user(
        &self,
        ctx: &Context<'_>,
        id: ID,
        email: String,
        name: String,
        status: UserStatus,
        description: Option<String>,
        metadata: Option<Json<Map<String, Value>>>,
        tags: Vec<String>,
        payment_method: PaymentMethodInput,
    ) -> Result<User> {
        let id = parse_id(&id).map_err(to_graphql_error)?;
        let args = UserArgs {
            email,
            name,
            status,
            description,
            metadata,
            tags,
            payment_method,
        };
        save_user(ctx, Some(id), args)
    }

    async fn delete_user(&self, ctx: &Context<'_>, id: ID) -> Result<bool> {
        delete(ctx, users(), &id)
    }

    async fn create_product(
        &self,
        ctx: &Context<'_>,
        name: String,
        price: f64,
        category: String,
        in_stock: bool,
        specifications: Vec<ProductSpecInput>,
    ) -> Result<Product> {
        let body = types::product_body(name, price, category, in_stock, specifications);
        save_product(ctx, None, body)
    }

    #[allow(clippy::too_many_arguments)]
    async fn update_product(
        &self,
        ctx: &Context<'_>,
        id: ID,
        name: String,
        price: f64,
        category: String,
        in_stock: bool,
        specifications: Vec<ProductSpecInput>,
    ) -> Result<Product> {
        let id = parse_id(&id).map_err(to_graphql_error)?;
        let body = types::product_body(name, price, category, in_stock, specifications);
        save_product(ctx, Some(id), body)
    }

    async fn delete_product(&self, ctx: &Context<'_>, id: ID) -> Result<bool> {
        delete(ctx, products(), &id)
    }

    #[allow(clippy::too_many_arguments)]
    async fn create_order(
        &self,
        ctx: &Context<'_>,
        user_id: ID,
        product_ids: Vec<ID>,
        status: OrderStatus,
        total: f64,
        discount_code: Option<String>,
        shipping_address: AddressInput,
    ) -> Result<Order> {
        let args = OrderArgs {
            user_id,
            product_ids,
            status,
            total,
            discount_code,
            shipping_address,
        };
        save_order(ctx, None, args)
    }

    #[allow(clippy::too_many_arguments)]
    async fn update_order(
        &self,
        ctx: &Context<'_>,
        id: ID,
        user_id: ID,
        product_ids: Vec<ID>,
        status: OrderStatus,
        total: f64,
        discount_code: Option<String>,
        shipping_address: AddressInput,
    ) -> Result<Order> {
        let id = parse_id(&id).map_err(to_graphql_error)?;
        let args = OrderArgs {
            user_id,
            product_ids,
            status,
            total,
            discount_code,
            shipping_address,
        };
        save_order(ctx, Some(id), args)
    }

    async fn delete_order(&self, ctx: &Context<'_>, id: ID) -> Result<bool> {
        delete(ctx, orders(), &id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contour_domain::PaymentMethodKind;

    #[test]
    fn test_user_body_classifies_payment() {
        let args = UserArgs {
            email: "a@b.com".to_string(),
            name: "A".to_string(),
            status: UserStatus::Pending,
            description: None,
            metadata: None,
            tags: vec![],
            payment_method: PaymentMethodInput {
                bank: Some("Chase".to_string()),
                ..Default::default()
            },
        };

        let body = args.into_body().unwrap();
        assert_eq!(body["status"], json!("PENDING"));
        assert_eq!(body["paymentMethod"], json!("DEBIT_CARD"));
        assert_eq!(body["paymentDetails"], json!({"bank": "Chase"}));
        assert_eq!(body["metadata"], json!({}));
    }

    #[test]
    fn test_bank_transfer_is_not_a_baseline_variant() {
        let method = contour_domain::PaymentMethod::reconstruct(PaymentMethodKind::BankTransfer, &Map::new());
        assert!(PaymentMethod::try_from(method).is_err());
    }

    #[test]
    fn test_address_nesting() {
        let address = Address::from(baseline::Address {
            street: "1 Main".to_string(),
            city: "Springfield".to_string(),
            zip_code: "12345".to_string(),
            country: "US".to_string(),
        });
        assert_eq!(address.location.city, "Springfield");
        assert_eq!(address.postal.zip_code, "12345");
    }

    #[test]
    fn test_order_body_rejects_bad_product_id() {
        let args = OrderArgs {
            user_id: ID::from("1"),
            product_ids: vec![ID::from("x")],
            status: OrderStatus::Created,
            total: 1.0,
            discount_code: None,
            shipping_address: AddressInput {
                location: LocationInput {
                    street: "s".to_string(),
                    city: "c".to_string(),
                },
                postal: PostalInput {
                    zip_code: "z".to_string(),
                    country: "US".to_string(),
                },
            },
        };
        assert!(matches!(args.into_body(), Err(ContractError::Validation(_))));
    }
}
