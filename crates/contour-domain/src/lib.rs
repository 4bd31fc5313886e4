//! Contour Domain Layer
//!
//! Shared shape definitions and the translation layer between persisted rows
//! and the wire shapes each protocol adapter exposes.
//!
//! ## Key Concepts
//!
//! - **Row**: a flat record with JSON-text-encoded composite columns
//! - **Revision**: one of the two deployable schema variants (baseline, feature)
//! - **Projection**: a field-mapping table (wire name, column, kind, presence)
//!   per revision and entity, used to decode rows and encode request bodies
//! - **Payment method**: a tagged variant derived from an input object by
//!   field presence and persisted as a plain classification string
//!
//! ## Architecture
//!
//! - No transport or storage dependencies
//! - Storage is reached through the [`traits::RowStore`] trait
//! - Adapters share the [`access`] helpers instead of issuing raw store calls

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod access;
pub mod error;
pub mod model;
pub mod payment;
pub mod projection;
pub mod revision;
pub mod row;
pub mod traits;

// Re-exports for convenience
pub use error::{ContractError, ValidationError};
pub use model::{OrderStatus, Product, ProductSpec};
pub use payment::{PaymentMethod, PaymentMethodInput, PaymentMethodKind, PaymentShape};
pub use projection::{EntityProjection, FieldKind, FieldSpec, JsonShape, Presence};
pub use revision::Revision;
pub use row::{Column, ColumnValue, Entity, Row, Table};
