//! Error taxonomy shared by every adapter

use crate::Entity;
use thiserror::Error;

/// A request failed validation before reaching the store
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// The body was not a JSON object
    #[error("Request body must be a JSON object")]
    NotAnObject,

    /// A required field was absent or null
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    /// A field had the wrong JSON type or shape
    #[error("Invalid field {field}: expected {expected}")]
    InvalidType {
        /// Wire name of the field
        field: &'static str,
        /// Description of the expected shape
        expected: &'static str,
    },

    /// An enum field held a value outside the allow-list
    #[error("Invalid {field} {value:?}: expected one of {allowed}")]
    InvalidEnum {
        /// Wire name of the field
        field: &'static str,
        /// Value that was supplied
        value: String,
        /// Comma-separated allow-list
        allowed: String,
    },

    /// An id could not be parsed
    #[error("Invalid id: {0}")]
    InvalidId(String),
}

/// Outcome of any entity operation, independent of transport
#[derive(Error, Debug)]
pub enum ContractError {
    /// Missing or invalid input
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Lookup, update or delete found no row
    #[error("{entity} not found")]
    NotFound {
        /// Entity that was looked up
        entity: Entity,
        /// Requested id
        id: i64,
    },

    /// Underlying engine failure or undecodable row
    #[error("Storage error: {0}")]
    Storage(String),
}

impl ContractError {
    /// Wrap any displayable store error
    pub fn storage(err: impl std::fmt::Display) -> Self {
        ContractError::Storage(err.to_string())
    }

    /// Stable machine-readable code, used by GraphQL error extensions
    pub fn code(&self) -> &'static str {
        match self {
            ContractError::Validation(_) => "VALIDATION_ERROR",
            ContractError::NotFound { .. } => "NOT_FOUND",
            ContractError::Storage(_) => "STORAGE_ERROR",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_message() {
        let err = ContractError::NotFound {
            entity: Entity::User,
            id: 3,
        };
        assert_eq!(err.to_string(), "User not found");
        assert_eq!(err.code(), "NOT_FOUND");
    }

    #[test]
    fn test_validation_is_transparent() {
        let err: ContractError = ValidationError::MissingField("name").into();
        assert_eq!(err.to_string(), "Missing required field: name");
        assert_eq!(err.code(), "VALIDATION_ERROR");
    }
}
