//! Type conversions between proto and domain types
//!
//! `google.protobuf.Struct` carries arbitrary JSON objects (user metadata),
//! so most of this module is the Struct <-> serde_json bridge.

use contour_domain::model::baseline;
use prost_types::value::Kind;
use prost_types::{ListValue, Struct};
use serde_json::{json, Map, Number, Value};

use crate::proto;

/// Error type for conversion failures
#[derive(Debug, thiserror::Error)]
pub enum ConversionError {
    /// JSON has no representation for NaN or infinity
    #[error("Invalid number in {field}: {value}")]
    NonFiniteNumber {
        /// Top-level field the number was found in
        field: &'static str,
        /// Offending value
        value: f64,
    },
}

/// Convert a protobuf Value to a JSON value
fn value_to_json(field: &'static str, value: prost_types::Value) -> Result<Value, ConversionError> {
    Ok(match value.kind {
        None | Some(Kind::NullValue(_)) => Value::Null,
        Some(Kind::BoolValue(b)) => Value::Bool(b),
        Some(Kind::StringValue(s)) => Value::String(s),
        Some(Kind::NumberValue(n)) => Number::from_f64(n)
            .map(Value::Number)
            .ok_or(ConversionError::NonFiniteNumber { field, value: n })?,
        Some(Kind::StructValue(s)) => Value::Object(struct_to_json(field, s)?),
        Some(Kind::ListValue(list)) => Value::Array(
            list.values
                .into_iter()
                .map(|v| value_to_json(field, v))
                .collect::<Result<_, _>>()?,
        ),
    })
}

/// Convert a protobuf Struct to a JSON object
pub fn struct_to_json(field: &'static str, s: Struct) -> Result<Map<String, Value>, ConversionError> {
    s.fields
        .into_iter()
        .map(|(key, value)| Ok((key, value_to_json(field, value)?)))
        .collect()
}

/// Convert a JSON value to a protobuf Value
fn json_to_value(value: &Value) -> prost_types::Value {
    let kind = match value {
        Value::Null => Kind::NullValue(0),
        Value::Bool(b) => Kind::BoolValue(*b),
        // Struct numbers are doubles; large integers lose precision
        Value::Number(n) => Kind::NumberValue(n.as_f64().unwrap_or_default()),
        Value::String(s) => Kind::StringValue(s.clone()),
        Value::Array(items) => Kind::ListValue(ListValue {
            values: items.iter().map(json_to_value).collect(),
        }),
        Value::Object(map) => Kind::StructValue(json_to_struct(map)),
    };

    prost_types::Value { kind: Some(kind) }
}

/// Convert a JSON object to a protobuf Struct
pub fn json_to_struct(map: &Map<String, Value>) -> Struct {
    Struct {
        fields: map
            .iter()
            .map(|(key, value)| (key.clone(), json_to_value(value)))
            .collect(),
    }
}

/// Convert a baseline user record to its proto message
pub fn user_to_proto(user: baseline::User) -> proto::User {
    proto::User {
        id: user.id,
        email: user.email_address,
        name: user.name,
        status: user.status.as_str().to_string(),
        description: user.description,
        metadata: Some(json_to_struct(&user.metadata)),
        tags: user.tags,
        payment_method: user.payment_method.as_str().to_string(),
    }
}

/// Convert a CreateUser request to a baseline user wire object
///
/// The result goes through the same projection as a REST body, so field
/// validation (status and payment allow-lists) is not repeated here.
pub fn create_request_to_body(req: proto::CreateUserRequest) -> Result<Value, ConversionError> {
    let metadata = req
        .metadata
        .map(|s| struct_to_json("metadata", s))
        .transpose()?
        .unwrap_or_default();

    Ok(json!({
        "emailAddress": req.email,
        "name": req.name,
        "status": req.status,
        "description": req.description,
        "metadata": metadata,
        "tags": req.tags,
        "paymentMethod": req.payment_method,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use contour_domain::PaymentMethodKind;

    #[test]
    fn test_struct_roundtrip() {
        let original = json!({
            "plan": "pro",
            "seats": 3.0,
            "flags": [true, null, "x"],
            "billing": {"country": "NL"}
        });
        let map = original.as_object().unwrap();

        let back = struct_to_json("metadata", json_to_struct(map)).unwrap();
        assert_eq!(Value::Object(back), original);
    }

    #[test]
    fn test_missing_kind_is_null() {
        let mut s = Struct::default();
        s.fields.insert("empty".to_string(), prost_types::Value { kind: None });

        let map = struct_to_json("metadata", s).unwrap();
        assert_eq!(map["empty"], Value::Null);
    }

    #[test]
    fn test_non_finite_number_rejected() {
        let mut s = Struct::default();
        s.fields.insert(
            "ratio".to_string(),
            prost_types::Value {
                kind: Some(Kind::NumberValue(f64::NAN)),
            },
        );

        let err = struct_to_json("metadata", s).unwrap_err();
        assert!(err.to_string().starts_with("Invalid number in metadata"));
    }

    #[test]
    fn test_user_to_proto() {
        let user = baseline::User {
            id: 7,
            email_address: "ada@example.com".to_string(),
            name: "Ada".to_string(),
            status: baseline::UserStatus::Pending,
            description: None,
            metadata: Map::new(),
            tags: vec!["a".to_string()],
            payment_method: PaymentMethodKind::PayPal,
            payment_details: Map::new(),
        };

        let proto = user_to_proto(user);
        assert_eq!(proto.email, "ada@example.com");
        assert_eq!(proto.status, "PENDING");
        assert_eq!(proto.payment_method, "PAYPAL");
        assert_eq!(proto.description, None);
        assert!(proto.metadata.unwrap().fields.is_empty());
    }

    #[test]
    fn test_create_request_uses_rest_wire_names() {
        let body = create_request_to_body(proto::CreateUserRequest {
            email: "a@b.com".to_string(),
            name: "A".to_string(),
            status: "ACTIVE".to_string(),
            description: Some("hi".to_string()),
            metadata: None,
            tags: vec![],
            payment_method: "CREDIT_CARD".to_string(),
        })
        .unwrap();

        assert_eq!(body["emailAddress"], json!("a@b.com"));
        assert_eq!(body["metadata"], json!({}));
        assert_eq!(body["paymentMethod"], json!("CREDIT_CARD"));
    }
}
