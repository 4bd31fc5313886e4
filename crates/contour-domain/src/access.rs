//! Entity access helpers
//!
//! The one translation path every adapter goes through: encode the wire
//! body with the projection, run the store call, decode rows back.

use std::sync::{Mutex, MutexGuard};

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::traits::RowStore;
use crate::{ContractError, EntityProjection};

/// Lock a shared store, reporting a poisoned lock as a storage failure
pub fn lock<S>(store: &Mutex<S>) -> Result<MutexGuard<'_, S>, ContractError> {
    store
        .lock()
        .map_err(|_| ContractError::Storage("store lock poisoned".to_string()))
}

/// Fetch one entity as a wire object
pub fn fetch<S: RowStore>(
    store: &S,
    projection: &EntityProjection,
    id: i64,
) -> Result<Value, ContractError> {
    let row = store
        .get(projection.entity.table(), id)
        .map_err(ContractError::storage)?
        .ok_or(ContractError::NotFound {
            entity: projection.entity,
            id,
        })?;

    projection.decode(&row)
}

/// Fetch every entity of a table as wire objects, in insertion order
pub fn fetch_all<S: RowStore>(
    store: &S,
    projection: &EntityProjection,
) -> Result<Vec<Value>, ContractError> {
    store
        .list(projection.entity.table())
        .map_err(ContractError::storage)?
        .iter()
        .map(|row| projection.decode(row))
        .collect()
}

/// Fetch one entity and deserialize it into a typed record
pub fn fetch_as<T, S>(store: &S, projection: &EntityProjection, id: i64) -> Result<T, ContractError>
where
    T: DeserializeOwned,
    S: RowStore,
{
    let value = fetch(store, projection, id)?;
    into_record(projection, value)
}

/// Fetch every entity and deserialize each into a typed record
pub fn fetch_all_as<T, S>(store: &S, projection: &EntityProjection) -> Result<Vec<T>, ContractError>
where
    T: DeserializeOwned,
    S: RowStore,
{
    fetch_all(store, projection)?
        .into_iter()
        .map(|value| into_record(projection, value))
        .collect()
}

/// Deserialize a decoded wire object into a typed record
pub fn into_record<T: DeserializeOwned>(
    projection: &EntityProjection,
    value: Value,
) -> Result<T, ContractError> {
    let id = value.get("id").and_then(Value::as_i64).unwrap_or_default();
    serde_json::from_value(value).map_err(|e| {
        ContractError::Storage(format!(
            "{} {} does not match the {} shape: {}",
            projection.entity, id, projection.entity, e
        ))
    })
}

/// Validate a wire body and insert it; returns the generated id
pub fn create<S: RowStore>(
    store: &mut S,
    projection: &EntityProjection,
    body: &Value,
) -> Result<i64, ContractError> {
    let columns = projection.encode(body)?;
    store
        .insert(projection.entity.table(), &columns)
        .map_err(ContractError::storage)
}

/// Validate a wire body and replace every projected column of an entity
pub fn replace<S: RowStore>(
    store: &mut S,
    projection: &EntityProjection,
    id: i64,
    body: &Value,
) -> Result<(), ContractError> {
    let columns = projection.encode(body)?;
    let affected = store
        .update(projection.entity.table(), id, &columns)
        .map_err(ContractError::storage)?;

    if affected == 0 {
        return Err(ContractError::NotFound {
            entity: projection.entity,
            id,
        });
    }

    Ok(())
}

/// Hard-delete an entity; `false` when no row had this id
pub fn remove<S: RowStore>(
    store: &mut S,
    projection: &EntityProjection,
    id: i64,
) -> Result<bool, ContractError> {
    let affected = store
        .delete(projection.entity.table(), id)
        .map_err(ContractError::storage)?;
    Ok(affected > 0)
}
