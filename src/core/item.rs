//! Item store - Persists products synchronized from the remote commerce system.
//!
//! Items are upserted by remote id every time their folder syncs, so remote data
//! always wins over whatever was stored before.

use crate::{
    core::upsert::{create_or_update, delete_existing, set_some, update_existing},
    entities::{Item, item},
    errors::Result,
};
use sea_orm::{QueryOrder, Set, prelude::*};

/// Every mirrored field of an item.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewItem {
    /// Remote product id
    pub id: i64,
    /// Product name
    pub name: String,
    /// Unit price in cents
    pub price: i64,
    /// Whether the item may be ordered
    pub published: bool,
    /// Image URL
    pub media_url: Option<String>,
    /// Owning folder
    pub folder_id: i64,
}

/// A partial update; `None` keeps the stored value.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ItemChanges {
    /// New name
    pub name: Option<String>,
    /// New unit price in cents
    pub price: Option<i64>,
    /// Whether the item may be sold
    pub published: Option<bool>,
    /// `Some(None)` clears the image
    pub media_url: Option<Option<String>>,
    /// Moves the item to another folder
    pub folder_id: Option<i64>,
}

impl From<NewItem> for item::ActiveModel {
    fn from(new: NewItem) -> Self {
        Self {
            id: Set(new.id),
            name: Set(new.name),
            price: Set(new.price),
            published: Set(new.published),
            media_url: Set(new.media_url),
            folder_id: Set(new.folder_id),
            ..Default::default()
        }
    }
}

impl ItemChanges {
    fn into_active_model(self, id: i64) -> item::ActiveModel {
        let mut model = item::ActiveModel {
            id: Set(id),
            ..Default::default()
        };
        set_some(&mut model.name, self.name);
        set_some(&mut model.price, self.price);
        set_some(&mut model.published, self.published);
        set_some(&mut model.media_url, self.media_url);
        set_some(&mut model.folder_id, self.folder_id);
        model
    }
}

/// Stores an item, or overwrites every field of the existing item with the same id.
///
/// # Errors
/// Returns `Database` if the write fails.
pub async fn create_item(db: &DatabaseConnection, new: NewItem) -> Result<item::Model> {
    let id = new.id;
    create_or_update(db, id, item::ActiveModel::from(new)).await
}

/// Updates only the fields present in `changes`.
///
/// # Errors
/// Returns `NotInDatabase` if the item does not exist.
pub async fn update_item(
    db: &DatabaseConnection,
    item_id: i64,
    changes: ItemChanges,
) -> Result<item::Model> {
    update_existing(db, "item", item_id, changes.into_active_model(item_id)).await
}

/// Deletes an item and returns the row as it was. Sales keep their `item_name` snapshot.
///
/// # Errors
/// Returns `NotInDatabase` if the item does not exist, or `Database` if the delete fails.
pub async fn delete_item(db: &DatabaseConnection, item_id: i64) -> Result<item::Model> {
    delete_existing::<Item, _>(db, "item", item_id).await
}

/// Retrieves an item by id.
///
/// # Errors
/// Returns `Database` if the query fails.
pub async fn get_item_by_id(db: &DatabaseConnection, item_id: i64) -> Result<Option<item::Model>> {
    Item::find_by_id(item_id).one(db).await.map_err(Into::into)
}

/// Lists the items stored for a folder, ordered by id, whether or not the folder is fresh.
///
/// # Errors
/// Returns `Database` if the query fails.
pub async fn get_items_by_folder_id(
    db: &DatabaseConnection,
    folder_id: i64,
) -> Result<Vec<item::Model>> {
    Item::find()
        .filter(item::Column::FolderId.eq(folder_id))
        .order_by_asc(item::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Lists every item, ordered by id.
///
/// # Errors
/// Returns `Database` if the query fails.
pub async fn get_all_items(db: &DatabaseConnection) -> Result<Vec<item::Model>> {
    Item::find()
        .order_by_asc(item::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}
