//! Shared create-or-update machinery for the entity store.
//!
//! Every mirrored entity is keyed by an identity that already exists before the row
//! does (the remote id), so `create` must be idempotent: a second `create` with the
//! same id updates the stored row instead of inserting a duplicate. This module holds
//! that rule once for all entities.

use crate::errors::{Error, Result};
use sea_orm::{
    ActiveModelBehavior, ActiveModelTrait, ActiveValue, ConnectionTrait, EntityTrait,
    IntoActiveModel, PrimaryKeyTrait, Set, Value, prelude::DateTime,
};

/// Local bookkeeping timestamps maintained by the store.
pub trait Stamped {
    /// Fill `created_at`, `updated_at` and any other insert-only defaults.
    fn stamp_insert(&mut self, now: DateTime);
    /// Refresh `updated_at`.
    fn stamp_update(&mut self, now: DateTime);
}

/// Current local bookkeeping time.
#[must_use]
pub fn now() -> DateTime {
    chrono::Utc::now().naive_utc()
}

/// Writes `value` into `slot` when present, leaving the slot untouched otherwise.
pub fn set_some<V: Into<Value>>(slot: &mut ActiveValue<V>, value: Option<V>) {
    if let Some(value) = value {
        *slot = Set(value);
    }
}

/// Inserts `fields` as a new row, or updates the existing row with identity `id`.
///
/// Only the fields set in `fields` are written on update; insert-only defaults such as
/// `created_at` are applied solely when the row is new.
pub async fn create_or_update<E, A, C>(db: &C, id: i64, mut fields: A) -> Result<E::Model>
where
    C: ConnectionTrait,
    E: EntityTrait,
    A: ActiveModelTrait<Entity = E> + ActiveModelBehavior + Stamped + Send,
    E::Model: IntoActiveModel<A>,
    i64: Into<<E::PrimaryKey as PrimaryKeyTrait>::ValueType>,
{
    let stamp = now();
    if E::find_by_id(id).one(db).await?.is_some() {
        fields.stamp_update(stamp);
        fields.update(db).await.map_err(Into::into)
    } else {
        fields.stamp_insert(stamp);
        fields.insert(db).await.map_err(Into::into)
    }
}

/// Applies a partial update to the row with identity `id`.
///
/// # Errors
/// Returns [`Error::NotInDatabase`] when no such row exists.
pub async fn update_existing<E, A, C>(
    db: &C,
    entity: &'static str,
    id: i64,
    mut changes: A,
) -> Result<E::Model>
where
    C: ConnectionTrait,
    E: EntityTrait,
    A: ActiveModelTrait<Entity = E> + ActiveModelBehavior + Stamped + Send,
    E::Model: IntoActiveModel<A>,
    i64: Into<<E::PrimaryKey as PrimaryKeyTrait>::ValueType>,
{
    if E::find_by_id(id).one(db).await?.is_none() {
        return Err(Error::not_in_database(entity, id));
    }

    changes.stamp_update(now());
    changes.update(db).await.map_err(Into::into)
}

/// Removes the row with identity `id` and returns it as it was before deletion.
///
/// # Errors
/// Returns [`Error::NotInDatabase`] when no such row exists.
pub async fn delete_existing<E, C>(db: &C, entity: &'static str, id: i64) -> Result<E::Model>
where
    C: ConnectionTrait,
    E: EntityTrait,
    E::ActiveModel: Send,
    E::Model: IntoActiveModel<E::ActiveModel>,
    i64: Into<<E::PrimaryKey as PrimaryKeyTrait>::ValueType>,
{
    let snapshot = E::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| Error::not_in_database(entity, id))?;

    snapshot.clone().into_active_model().delete(db).await?;
    Ok(snapshot)
}
