//! Folder store - Persists the product categories the shop displays.
//!
//! Registering a folder that already exists updates its name and media but never
//! resets `synchronized_at`; only a completed sync moves that timestamp.

use crate::{
    core::upsert::{create_or_update, delete_existing, set_some, update_existing},
    entities::{Folder, folder},
    errors::Result,
};
use sea_orm::{QueryOrder, Set, prelude::*};

/// Registration data for a folder.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewFolder {
    /// Remote folder id
    pub id: i64,
    /// Display name
    pub name: String,
    /// Image URL
    pub media_url: Option<String>,
}

/// A partial update; `None` keeps the stored value.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FolderChanges {
    /// New display name
    pub name: Option<String>,
    /// `Some(None)` clears the image
    pub media_url: Option<Option<String>>,
    /// Last completed item sync
    pub synchronized_at: Option<DateTime>,
}

impl From<NewFolder> for folder::ActiveModel {
    fn from(new: NewFolder) -> Self {
        Self {
            id: Set(new.id),
            name: Set(new.name),
            media_url: Set(new.media_url),
            ..Default::default()
        }
    }
}

impl FolderChanges {
    fn into_active_model(self, id: i64) -> folder::ActiveModel {
        let mut model = folder::ActiveModel {
            id: Set(id),
            ..Default::default()
        };
        set_some(&mut model.name, self.name);
        set_some(&mut model.media_url, self.media_url);
        set_some(&mut model.synchronized_at, self.synchronized_at);
        model
    }
}

/// Registers a folder, or updates name and media of an already registered one.
///
/// # Errors
/// Returns `Database` if the write fails.
pub async fn create_folder(db: &DatabaseConnection, new: NewFolder) -> Result<folder::Model> {
    let id = new.id;
    create_or_update(db, id, folder::ActiveModel::from(new)).await
}

/// Updates only the fields present in `changes`.
///
/// # Errors
/// Returns `NotInDatabase` if the folder does not exist.
pub async fn update_folder(
    db: &DatabaseConnection,
    folder_id: i64,
    changes: FolderChanges,
) -> Result<folder::Model> {
    update_existing(db, "folder", folder_id, changes.into_active_model(folder_id)).await
}

/// Deletes a folder and returns the row as it was. Its items and sales are kept.
///
/// # Errors
/// Returns `NotInDatabase` if the folder does not exist, or `Database` if the delete fails.
pub async fn delete_folder(db: &DatabaseConnection, folder_id: i64) -> Result<folder::Model> {
    delete_existing::<Folder, _>(db, "folder", folder_id).await
}

/// Retrieves a folder by id.
///
/// # Errors
/// Returns `Database` if the query fails.
pub async fn get_folder_by_id(
    db: &DatabaseConnection,
    folder_id: i64,
) -> Result<Option<folder::Model>> {
    Folder::find_by_id(folder_id).one(db).await.map_err(Into::into)
}

/// Lists every folder, ordered by id.
///
/// # Errors
/// Returns `Database` if the query fails.
pub async fn get_all_folders(db: &DatabaseConnection) -> Result<Vec<folder::Model>> {
    Folder::find()
        .order_by_asc(folder::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}
