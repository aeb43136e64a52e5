//! Sale store - Persists the local audit trail of purchases.
//!
//! Sales get a local autoincrementing id, so unlike the mirrored entities `create_sale`
//! always inserts. Rows are never deleted during normal operation.

use crate::{
    core::upsert::{Stamped, delete_existing, now, set_some, update_existing},
    entities::{Sale, SaleStatus, sale},
    errors::Result,
};
use sea_orm::{QueryOrder, Set, prelude::*};

/// A freshly computed sale, before it is posted.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewSale {
    /// Units bought
    pub quantity: i64,
    /// `quantity × item.price` in cents
    pub total_price: i64,
    /// Item bought
    pub item_id: i64,
    /// Item name snapshot
    pub item_name: String,
    /// Buyer
    pub user_id: i64,
    /// Buyer student number snapshot
    pub user_student_number: String,
}

/// A partial update; `None` keeps the stored value.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SaleChanges {
    /// New lifecycle state
    pub status: Option<SaleStatus>,
    /// Id assigned by the remote
    pub remote_id: Option<Option<i64>>,
    /// Human-readable reference assigned by the remote
    pub remote_reference: Option<Option<String>>,
    /// Creation time reported by the remote
    pub remote_created_at: Option<Option<DateTime>>,
    /// Failure or mismatch detail
    pub error_message: Option<Option<String>>,
}

impl SaleChanges {
    fn into_active_model(self, id: i64) -> sale::ActiveModel {
        let mut model = sale::ActiveModel {
            id: Set(id),
            ..Default::default()
        };
        set_some(&mut model.status, self.status);
        set_some(&mut model.remote_id, self.remote_id);
        set_some(&mut model.remote_reference, self.remote_reference);
        set_some(&mut model.remote_created_at, self.remote_created_at);
        set_some(&mut model.error_message, self.error_message);
        model
    }
}

/// Inserts a sale in the `NotPosted` state.
///
/// # Errors
/// Returns `Database` if the write fails.
pub async fn create_sale(db: &DatabaseConnection, new: NewSale) -> Result<sale::Model> {
    let mut model = sale::ActiveModel {
        quantity: Set(new.quantity),
        total_price: Set(new.total_price),
        item_id: Set(new.item_id),
        item_name: Set(new.item_name),
        user_id: Set(new.user_id),
        user_student_number: Set(new.user_student_number),
        status: Set(SaleStatus::NotPosted),
        remote_id: Set(None),
        remote_reference: Set(None),
        remote_created_at: Set(None),
        error_message: Set(None),
        ..Default::default()
    };
    model.stamp_insert(now());
    model.insert(db).await.map_err(Into::into)
}

/// Updates only the fields present in `changes`.
///
/// # Errors
/// Returns `NotInDatabase` if the sale does not exist.
pub async fn update_sale(
    db: &DatabaseConnection,
    sale_id: i64,
    changes: SaleChanges,
) -> Result<sale::Model> {
    update_existing(db, "sale", sale_id, changes.into_active_model(sale_id)).await
}

/// Deletes a sale and returns the row as it was. Reserved for manual administration.
///
/// # Errors
/// Returns `NotInDatabase` if the sale does not exist, or `Database` if the delete fails.
pub async fn delete_sale(db: &DatabaseConnection, sale_id: i64) -> Result<sale::Model> {
    delete_existing::<Sale, _>(db, "sale", sale_id).await
}

/// Retrieves a sale by local id.
///
/// # Errors
/// Returns `Database` if the query fails.
pub async fn get_sale_by_id(db: &DatabaseConnection, sale_id: i64) -> Result<Option<sale::Model>> {
    Sale::find_by_id(sale_id).one(db).await.map_err(Into::into)
}

/// Lists a user's sales, ordered by id.
///
/// # Errors
/// Returns `Database` if the query fails.
pub async fn get_sales_by_user_id(
    db: &DatabaseConnection,
    user_id: i64,
) -> Result<Vec<sale::Model>> {
    Sale::find()
        .filter(sale::Column::UserId.eq(user_id))
        .order_by_asc(sale::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Lists the sales of an item, ordered by id.
///
/// # Errors
/// Returns `Database` if the query fails.
pub async fn get_sales_by_item_id(
    db: &DatabaseConnection,
    item_id: i64,
) -> Result<Vec<sale::Model>> {
    Sale::find()
        .filter(sale::Column::ItemId.eq(item_id))
        .order_by_asc(sale::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Lists every sale, ordered by id.
///
/// # Errors
/// Returns `Database` if the query fails.
pub async fn get_all_sales(db: &DatabaseConnection) -> Result<Vec<sale::Model>> {
    Sale::find()
        .order_by_asc(sale::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}
