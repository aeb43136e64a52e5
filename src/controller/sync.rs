//! Folder synchronization.
//!
//! A folder is fresh while `now - synchronized_at < interval`. Loading a stale folder
//! pulls its products from the remote and upserts them before moving `synchronized_at`.
//! When the remote call fails nothing is written and the error propagates unchanged;
//! serving stale items instead is the caller's decision.

use crate::{
    api::CommerceApi,
    config::app::AppConfig,
    core::{
        folder::{self, FolderChanges, NewFolder},
        item::{self, NewItem},
        upsert::now,
    },
    entities::{folder::Model as Folder, item::Model as Item},
    errors::{Error, Result},
};
use chrono::{NaiveDateTime, TimeDelta};
use sea_orm::DatabaseConnection;
use std::{sync::Arc, time::Duration};
use tracing::{debug, info, instrument, warn};

/// Whether a folder synchronized at `synchronized_at` needs a new sync at `now`.
#[must_use]
pub fn is_stale(synchronized_at: NaiveDateTime, now: NaiveDateTime, interval: Duration) -> bool {
    let interval = TimeDelta::from_std(interval).unwrap_or(TimeDelta::MAX);
    now.signed_duration_since(synchronized_at) >= interval
}

/// Keeps the local folder and item mirror fresh.
#[derive(Debug)]
pub struct SyncController<A> {
    db: DatabaseConnection,
    api: A,
    config: Arc<AppConfig>,
}

impl<A: CommerceApi> SyncController<A> {
    /// Creates a controller using `config` for the folder set and staleness interval.
    pub const fn new(db: DatabaseConnection, api: A, config: Arc<AppConfig>) -> Self {
        Self { db, api, config }
    }

    /// Registers a folder, or renames it and replaces its media if it already exists.
    /// Never touches `synchronized_at` of an existing folder.
    #[instrument(skip(self))]
    pub async fn add_or_update_folder(&self, new: NewFolder) -> Result<Folder> {
        folder::create_folder(&self.db, new).await
    }

    /// Registers every `[[folders]]` entry of the configuration.
    #[instrument(skip(self))]
    pub async fn register_configured_folders(&self) -> Result<Vec<Folder>> {
        let mut folders = Vec::with_capacity(self.config.folders.len());
        for entry in &self.config.folders {
            let registered = self
                .add_or_update_folder(NewFolder {
                    id: entry.id,
                    name: entry.name.clone(),
                    media_url: entry.media_url.clone(),
                })
                .await?;
            folders.push(registered);
        }
        info!(count = folders.len(), "Registered configured folders");
        Ok(folders)
    }

    /// Returns the folder, synchronizing its items first when forced or stale.
    ///
    /// `sync_interval` defaults to the configured interval and `timeout` to the client's.
    ///
    /// # Errors
    /// `FolderNotInLocalStore` when the folder was never registered. Remote errors from
    /// the product fetch propagate with `synchronized_at` left as it was.
    #[instrument(skip(self))]
    pub async fn load_folder(
        &self,
        folder_id: i64,
        force_sync: bool,
        sync_interval: Option<Duration>,
        timeout: Option<Duration>,
    ) -> Result<Folder> {
        let folder = folder::get_folder_by_id(&self.db, folder_id)
            .await?
            .ok_or(Error::FolderNotInLocalStore { folder_id })?;

        let interval = sync_interval.unwrap_or_else(|| self.config.sync.interval());
        if !force_sync && !is_stale(folder.synchronized_at, now(), interval) {
            debug!(synchronized_at = %folder.synchronized_at, "Folder is fresh, skipping sync");
            return Ok(folder);
        }

        self.sync_folder(folder_id, timeout).await
    }

    async fn sync_folder(&self, folder_id: i64, timeout: Option<Duration>) -> Result<Folder> {
        let records = self
            .api
            .fetch_products_in_folder(folder_id, timeout)
            .await
            .inspect_err(|e| warn!(folder_id, error = %e, "Folder sync failed"))?;

        let count = records.len();
        for record in records {
            item::create_item(&self.db, NewItem::from(record)).await?;
        }

        let folder = folder::update_folder(
            &self.db,
            folder_id,
            FolderChanges {
                synchronized_at: Some(now()),
                ..Default::default()
            },
        )
        .await?;
        info!(folder_id, items = count, "Folder synchronized");
        Ok(folder)
    }

    /// [`Self::load_folder`] followed by the folder's stored items, ordered by id.
    #[instrument(skip(self))]
    pub async fn load_folder_items(
        &self,
        folder_id: i64,
        force_sync: bool,
        sync_interval: Option<Duration>,
        timeout: Option<Duration>,
    ) -> Result<(Folder, Vec<Item>)> {
        let folder = self
            .load_folder(folder_id, force_sync, sync_interval, timeout)
            .await?;
        let items = item::get_items_by_folder_id(&self.db, folder_id).await?;
        Ok((folder, items))
    }

    /// Pulls one product from the remote and upserts it.
    ///
    /// # Errors
    /// `ItemNotFound` when the remote has no such product; the stored row is kept.
    #[instrument(skip(self))]
    pub async fn refresh_item(&self, item_id: i64, timeout: Option<Duration>) -> Result<Item> {
        let record = self.api.fetch_product(item_id, timeout).await?;
        item::create_item(&self.db, NewItem::from(record)).await
    }
}
