#![warn(missing_docs)]

//! Contour GraphQL Layer
//!
//! One `async-graphql` schema per revision, both resolving through the same
//! projection helpers the REST adapter uses:
//! - [`baseline`]: full CRUD over users, products and orders
//! - [`feature`]: the breaking-change variant (reads plus `createUser`)
//!
//! The server picks one with [`GraphQLSchema::build`] and hands it requests.

use async_graphql::{Context, EmptySubscription, ErrorExtensions, Schema, ID};
use contour_domain::{
    access, ContractError, PaymentMethodInput, PaymentMethodKind, Revision, ValidationError,
};
use contour_store::{SharedStore, SqliteStore};

pub mod baseline;
pub mod feature;
pub mod types;

/// Schema served for the baseline revision
pub type BaselineSchema = Schema<baseline::QueryRoot, baseline::MutationRoot, EmptySubscription>;

/// Schema served for the feature revision
pub type FeatureSchema = Schema<feature::QueryRoot, feature::MutationRoot, EmptySubscription>;

/// The schema of the active revision
#[derive(Clone)]
pub enum GraphQLSchema {
    /// Baseline SDL
    Baseline(BaselineSchema),
    /// Feature SDL
    Feature(FeatureSchema),
}

impl GraphQLSchema {
    /// Build the schema for `revision` over a shared store
    pub fn build(revision: Revision, store: SharedStore) -> Self {
        match revision {
            Revision::Baseline => GraphQLSchema::Baseline(
                Schema::build(baseline::QueryRoot, baseline::MutationRoot, EmptySubscription)
                    .data(store)
                    .extension(async_graphql::extensions::Tracing)
                    .finish(),
            ),
            Revision::Feature => GraphQLSchema::Feature(
                Schema::build(feature::QueryRoot, feature::MutationRoot, EmptySubscription)
                    .data(store)
                    .extension(async_graphql::extensions::Tracing)
                    .finish(),
            ),
        }
    }

    /// Revision this schema serves
    pub fn revision(&self) -> Revision {
        match self {
            GraphQLSchema::Baseline(_) => Revision::Baseline,
            GraphQLSchema::Feature(_) => Revision::Feature,
        }
    }

    /// Execute one GraphQL request
    pub async fn execute(&self, request: impl Into<async_graphql::Request>) -> async_graphql::Response {
        match self {
            GraphQLSchema::Baseline(schema) => schema.execute(request).await,
            GraphQLSchema::Feature(schema) => schema.execute(request).await,
        }
    }

    /// SDL of the schema
    pub fn sdl(&self) -> String {
        match self {
            GraphQLSchema::Baseline(schema) => schema.sdl(),
            GraphQLSchema::Feature(schema) => schema.sdl(),
        }
    }
}

/// Convert a domain failure into a GraphQL error with a `code` extension
pub fn to_graphql_error(err: ContractError) -> async_graphql::Error {
    let code = err.code();
    async_graphql::Error::new(err.to_string()).extend_with(|_, e| e.set("code", code))
}

/// Run a synchronous store operation under the shared lock
pub(crate) fn with_store<T>(
    ctx: &Context<'_>,
    op: impl FnOnce(&mut SqliteStore) -> Result<T, ContractError>,
) -> async_graphql::Result<T> {
    let store = ctx.data::<SharedStore>()?;
    let mut guard = access::lock(store).map_err(to_graphql_error)?;
    op(&mut *guard).map_err(to_graphql_error)
}

/// Treat a missing row as an absent result
pub(crate) fn found<T>(result: Result<T, ContractError>) -> Result<Option<T>, ContractError> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(ContractError::NotFound { .. }) => Ok(None),
        Err(e) => Err(e),
    }
}

/// Parse a GraphQL ID into a row id
pub(crate) fn parse_id(id: &ID) -> Result<i64, ContractError> {
    id.parse::<i64>()
        .map_err(|_| ValidationError::InvalidId(id.to_string()).into())
}

/// Classify a payment input, warning when the fallback applies
pub(crate) fn classify_payment(
    input: &PaymentMethodInput,
    revision: Revision,
) -> Result<PaymentMethodKind, ContractError> {
    let shape = input.shape(revision);
    if shape.is_fallback() {
        tracing::warn!(
            revision = %revision,
            "Unrecognized payment method input, storing as {}",
            shape.kind().as_str()
        );
    }

    revision.check_payment_method(shape.kind())?;
    Ok(shape.kind())
}
