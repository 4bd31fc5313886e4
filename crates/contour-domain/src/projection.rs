//! Projection module - table-driven mapping between rows and wire objects
//!
//! Each [`EntityProjection`] lists the fields of one entity in one revision.
//! A [`FieldSpec`] ties a wire name to a column, a [`FieldKind`] and a
//! [`Presence`]. Decoding turns a [`Row`] into a JSON wire object; encoding
//! validates a JSON request body and turns it into the column list the store
//! writes. Both directions are driven by the same table, so the two
//! revisions differ only in their tables.

use serde_json::{Map, Number, Value};

use crate::model::{baseline, feature, OrderStatus};
use crate::{Column, ColumnValue, ContractError, Entity, Row, ValidationError};

/// Whether a field must be supplied, and how an absent value is persisted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presence {
    /// Must be present and non-null on write
    Required,
    /// May be absent; JSON fields are written and read back as `{}` / `[]`
    Optional,
    /// May be absent; stays `null` in both directions
    Nullable,
}

/// Shape of a JSON-text-encoded column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JsonShape {
    /// Any JSON object
    Object,
    /// Array of strings
    StringList,
    /// Array of integers
    IntegerList,
    /// Array of `{key, value}` string pairs
    KeyValueList,
    /// Object with exactly these string fields
    Record {
        /// Field names, all required
        keys: &'static [&'static str],
        /// Error description when the value does not match
        expected: &'static str,
    },
}

impl JsonShape {
    /// Value substituted for an absent or null column
    pub fn empty(&self) -> Value {
        match self {
            JsonShape::Object | JsonShape::Record { .. } => Value::Object(Map::new()),
            JsonShape::StringList | JsonShape::IntegerList | JsonShape::KeyValueList => {
                Value::Array(Vec::new())
            }
        }
    }

    fn expected(&self) -> &'static str {
        match self {
            JsonShape::Object => "a JSON object",
            JsonShape::StringList => "an array of strings",
            JsonShape::IntegerList => "an array of integers",
            JsonShape::KeyValueList => "an array of {key, value} string pairs",
            JsonShape::Record { expected, .. } => *expected,
        }
    }

    /// Check a wire value against the shape, dropping unknown record keys
    fn normalize(&self, field: &'static str, value: &Value) -> Result<Value, ValidationError> {
        let invalid = || ValidationError::InvalidType {
            field,
            expected: self.expected(),
        };

        match self {
            JsonShape::Object => value.as_object().map(|_| value.clone()).ok_or_else(invalid),
            JsonShape::StringList => match value.as_array() {
                Some(items) if items.iter().all(Value::is_string) => Ok(value.clone()),
                _ => Err(invalid()),
            },
            JsonShape::IntegerList => match value.as_array() {
                Some(items) if items.iter().all(Value::is_i64) => Ok(value.clone()),
                _ => Err(invalid()),
            },
            JsonShape::KeyValueList => {
                let items = value.as_array().ok_or_else(invalid)?;
                items
                    .iter()
                    .map(|item| {
                        let key = item.get("key").and_then(Value::as_str);
                        let val = item.get("value").and_then(Value::as_str);
                        match (key, val) {
                            (Some(key), Some(val)) => {
                                Ok(serde_json::json!({ "key": key, "value": val }))
                            }
                            _ => Err(invalid()),
                        }
                    })
                    .collect::<Result<Vec<_>, _>>()
                    .map(Value::Array)
            }
            JsonShape::Record { keys, .. } => {
                let object = value.as_object().ok_or_else(invalid)?;
                let mut record = Map::new();
                for key in keys.iter() {
                    let text = object.get(*key).and_then(Value::as_str).ok_or_else(invalid)?;
                    record.insert(key.to_string(), Value::String(text.to_string()));
                }
                Ok(Value::Object(record))
            }
        }
    }
}

/// Type of a field, as seen on the wire and in its column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// JSON integer, INTEGER column
    Integer,
    /// JSON number, REAL column
    Decimal,
    /// JSON string, TEXT column
    Text,
    /// JSON boolean, INTEGER column holding 0/1
    Bool,
    /// JSON string restricted to an allow-list, TEXT column
    Enum(&'static [&'static str]),
    /// JSON value of the given shape, JSON-encoded TEXT column
    Json(JsonShape),
}

/// One row of a projection table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    /// Field name in REST JSON bodies
    pub wire: &'static str,
    /// Column name in the store
    pub column: &'static str,
    /// Field type
    pub kind: FieldKind,
    /// Presence rule
    pub presence: Presence,
}

const fn field(wire: &'static str, column: &'static str, kind: FieldKind, presence: Presence) -> FieldSpec {
    FieldSpec {
        wire,
        column,
        kind,
        presence,
    }
}

impl FieldSpec {
    fn invalid(&self, expected: &'static str) -> ValidationError {
        ValidationError::InvalidType {
            field: self.wire,
            expected,
        }
    }

    fn encode_absent(&self) -> Result<ColumnValue, ValidationError> {
        match (self.presence, self.kind) {
            (Presence::Required, _) => Err(ValidationError::MissingField(self.wire)),
            (Presence::Optional, FieldKind::Json(shape)) => Ok(ColumnValue::Text(shape.empty().to_string())),
            (Presence::Optional | Presence::Nullable, _) => Ok(ColumnValue::Null),
        }
    }

    /// Validate one wire value and turn it into a column value
    pub fn encode(&self, value: Option<&Value>) -> Result<Column, ValidationError> {
        let value = match value {
            None | Some(Value::Null) => return self.encode_absent().map(|v| (self.column, v)),
            Some(value) => value,
        };

        let encoded = match self.kind {
            FieldKind::Integer => value
                .as_i64()
                .map(ColumnValue::Integer)
                .ok_or_else(|| self.invalid("an integer"))?,
            FieldKind::Decimal => value
                .as_f64()
                .map(ColumnValue::Real)
                .ok_or_else(|| self.invalid("a number"))?,
            FieldKind::Text => value
                .as_str()
                .map(|s| ColumnValue::Text(s.to_string()))
                .ok_or_else(|| self.invalid("a string"))?,
            FieldKind::Bool => value
                .as_bool()
                .map(|b| ColumnValue::Integer(i64::from(b)))
                .ok_or_else(|| self.invalid("a boolean"))?,
            FieldKind::Enum(allowed) => {
                let text = value.as_str().ok_or_else(|| self.invalid("a string"))?;
                if !allowed.contains(&text) {
                    return Err(ValidationError::InvalidEnum {
                        field: self.wire,
                        value: text.to_string(),
                        allowed: allowed.join(", "),
                    });
                }
                ColumnValue::Text(text.to_string())
            }
            FieldKind::Json(shape) => ColumnValue::Text(shape.normalize(self.wire, value)?.to_string()),
        };

        Ok((self.column, encoded))
    }

    /// Turn one column value into its wire value
    ///
    /// Absent, null and blank JSON columns decode to the shape's empty value
    /// (or `null` for nullable fields) instead of failing.
    pub fn decode(&self, value: &ColumnValue) -> Result<Value, String> {
        match (self.kind, value) {
            (FieldKind::Json(shape), ColumnValue::Null) => Ok(self.json_default(shape)),
            (FieldKind::Json(shape), ColumnValue::Text(text)) if text.trim().is_empty() => {
                Ok(self.json_default(shape))
            }
            (FieldKind::Json(shape), ColumnValue::Text(text)) => {
                match serde_json::from_str::<Value>(text).map_err(|e| e.to_string())? {
                    Value::Null => Ok(self.json_default(shape)),
                    parsed => Ok(parsed),
                }
            }
            (FieldKind::Bool, ColumnValue::Null) => Ok(Value::Bool(false)),
            (_, ColumnValue::Null) => Ok(Value::Null),
            (FieldKind::Bool, ColumnValue::Integer(i)) => Ok(Value::Bool(*i != 0)),
            (FieldKind::Integer, ColumnValue::Integer(i)) => Ok(Value::from(*i)),
            (FieldKind::Decimal, ColumnValue::Real(f)) => Ok(number(*f)),
            (FieldKind::Decimal, ColumnValue::Integer(i)) => Ok(number(*i as f64)),
            (FieldKind::Text | FieldKind::Enum(_), ColumnValue::Text(text)) => Ok(Value::String(text.clone())),
            (kind, other) => Err(format!("unexpected {:?} for {:?} field", other, kind)),
        }
    }

    fn json_default(&self, shape: JsonShape) -> Value {
        match self.presence {
            Presence::Nullable => Value::Null,
            Presence::Required | Presence::Optional => shape.empty(),
        }
    }
}

fn number(value: f64) -> Value {
    Number::from_f64(value).map(Value::Number).unwrap_or(Value::Null)
}

/// Field-mapping table of one entity in one revision
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntityProjection {
    /// Entity described
    pub entity: Entity,
    /// REST collection name (`/api/{collection}`)
    pub collection: &'static str,
    /// Every non-id field
    pub fields: &'static [FieldSpec],
}

impl EntityProjection {
    /// Look up a field by wire name
    pub fn field(&self, wire: &str) -> Option<&'static FieldSpec> {
        self.fields.iter().find(|f| f.wire == wire)
    }

    /// Decode a row into a wire object (`id` first, then every field)
    pub fn decode(&self, row: &Row) -> Result<Value, ContractError> {
        let mut object = Map::new();
        object.insert("id".to_string(), Value::from(row.id));

        for field in self.fields {
            let value = field.decode(row.get(field.column)).map_err(|reason| {
                ContractError::Storage(format!(
                    "{} {} has an undecodable {} column: {}",
                    self.entity, row.id, field.column, reason
                ))
            })?;
            object.insert(field.wire.to_string(), value);
        }

        Ok(Value::Object(object))
    }

    /// Validate a wire object and produce the full column list to write
    ///
    /// Any `id` in the body is ignored; ids are assigned by the store.
    pub fn encode(&self, body: &Value) -> Result<Vec<Column>, ValidationError> {
        let object = body.as_object().ok_or(ValidationError::NotAnObject)?;
        self.fields
            .iter()
            .map(|field| field.encode(object.get(field.wire)))
            .collect()
    }
}

const BASELINE_PAYMENT_NAMES: &[&str] = &["CREDIT_CARD", "DEBIT_CARD", "PAYPAL"];
const FEATURE_PAYMENT_NAMES: &[&str] = &["CREDIT_CARD", "DEBIT_CARD", "PAYPAL", "BANK_TRANSFER"];

const BASELINE_ADDRESS: JsonShape = JsonShape::Record {
    keys: &["street", "city", "zipCode", "country"],
    expected: "an object with string fields street, city, zipCode, country",
};

const FEATURE_ADDRESS: JsonShape = JsonShape::Record {
    keys: &["street", "city", "postalCode"],
    expected: "an object with string fields street, city, postalCode",
};

/// Baseline users
pub static BASELINE_USER: EntityProjection = EntityProjection {
    entity: Entity::User,
    collection: "users",
    fields: &[
        field("emailAddress", "email", FieldKind::Text, Presence::Required),
        field("name", "name", FieldKind::Text, Presence::Required),
        field("status", "status", FieldKind::Enum(baseline::UserStatus::NAMES), Presence::Required),
        field("description", "description", FieldKind::Text, Presence::Optional),
        field("metadata", "metadata", FieldKind::Json(JsonShape::Object), Presence::Optional),
        field("tags", "tags", FieldKind::Json(JsonShape::StringList), Presence::Optional),
        field("paymentMethod", "payment_method", FieldKind::Enum(BASELINE_PAYMENT_NAMES), Presence::Required),
        field("paymentDetails", "payment_details", FieldKind::Json(JsonShape::Object), Presence::Optional),
    ],
};

/// Feature users
pub static FEATURE_USER: EntityProjection = EntityProjection {
    entity: Entity::User,
    collection: "users",
    fields: &[
        field("emailAddress", "email_address", FieldKind::Text, Presence::Required),
        field("name", "name", FieldKind::Text, Presence::Required),
        field("status", "status", FieldKind::Enum(feature::UserStatus::NAMES), Presence::Required),
        field("description", "description", FieldKind::Text, Presence::Required),
        field("tag", "tag", FieldKind::Text, Presence::Required),
        field("paymentMethod", "payment_method", FieldKind::Enum(FEATURE_PAYMENT_NAMES), Presence::Required),
        field("paymentDetails", "payment_details", FieldKind::Json(JsonShape::Object), Presence::Optional),
        field("phoneNumber", "phone_number", FieldKind::Text, Presence::Required),
    ],
};

/// Products (same in both revisions)
pub static PRODUCT: EntityProjection = EntityProjection {
    entity: Entity::Product,
    collection: "products",
    fields: &[
        field("name", "name", FieldKind::Text, Presence::Required),
        field("price", "price", FieldKind::Decimal, Presence::Required),
        field("category", "category", FieldKind::Text, Presence::Required),
        field("inStock", "in_stock", FieldKind::Bool, Presence::Required),
        field("specifications", "specifications", FieldKind::Json(JsonShape::KeyValueList), Presence::Optional),
    ],
};

/// Baseline orders
pub static BASELINE_ORDER: EntityProjection = EntityProjection {
    entity: Entity::Order,
    collection: "orders",
    fields: &[
        field("userId", "user_id", FieldKind::Integer, Presence::Required),
        field("productIds", "product_ids", FieldKind::Json(JsonShape::IntegerList), Presence::Required),
        field("status", "status", FieldKind::Enum(OrderStatus::NAMES), Presence::Required),
        field("total", "total", FieldKind::Decimal, Presence::Required),
        field("discountCode", "discount_code", FieldKind::Text, Presence::Optional),
        field("shippingAddress", "shipping_address", FieldKind::Json(BASELINE_ADDRESS), Presence::Required),
    ],
};

/// Feature orders
pub static FEATURE_ORDER: EntityProjection = EntityProjection {
    entity: Entity::Order,
    collection: "orders",
    fields: &[
        field("userId", "user_id", FieldKind::Integer, Presence::Required),
        field("productIds", "product_ids", FieldKind::Json(JsonShape::IntegerList), Presence::Required),
        field("status", "status", FieldKind::Enum(OrderStatus::NAMES), Presence::Required),
        field("total", "total", FieldKind::Decimal, Presence::Required),
        field("discountCode", "discount_code", FieldKind::Text, Presence::Optional),
        field("shippingAddress", "shipping_address", FieldKind::Json(FEATURE_ADDRESS), Presence::Nullable),
    ],
};


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    proptest! {
        /// Property: a product survives encode then decode unchanged
        #[test]
        fn test_product_roundtrip(
            name in "[a-zA-Z ]{1,24}",
            price in -1.0e6f64..1.0e6,
            in_stock: bool,
            specs in proptest::collection::vec(("[a-z]{1,8}", "[a-z0-9]{0,8}"), 0..4),
        ) {
            let specifications: Vec<Value> = specs
                .iter()
                .map(|(k, v)| json!({"key": k, "value": v}))
                .collect();
            let body = json!({
                "name": name,
                "price": price,
                "category": "misc",
                "inStock": in_stock,
                "specifications": specifications,
            });

            let row = PRODUCT
                .encode(&body)
                .unwrap()
                .into_iter()
                .fold(Row::new(7), |row, (name, value)| row.with(name, value));
            let decoded = PRODUCT.decode(&row).unwrap();

            prop_assert_eq!(&decoded["name"], &body["name"]);
            prop_assert_eq!(decoded["price"].as_f64(), Some(price));
            prop_assert_eq!(&decoded["inStock"], &body["inStock"]);
            prop_assert_eq!(&decoded["specifications"], &body["specifications"]);
        }

        /// Property: order statuses outside the allow-list never encode
        #[test]
        fn test_unknown_order_status_rejected(status in "[A-Z_]{1,12}") {
            prop_assume!(!OrderStatus::NAMES.contains(&status.as_str()));
            let body = json!({"userId": 1, "productIds": [], "status": status, "total": 1.0});
            let rejected = matches!(
                FEATURE_ORDER.encode(&body),
                Err(ValidationError::InvalidEnum { field: "status", .. })
            );
            prop_assert!(rejected);
        }
    }
}
