//! Shared test utilities for `streeplijst`.
//!
//! This module provides common helper functions for setting up test databases,
//! creating test entities with sensible defaults, and an in-memory stand-in for the
//! remote commerce system.

#![allow(clippy::unwrap_used)]

use crate::{
    api::{CommerceApi, ConfirmedLine, ItemRecord, SaleConfirmation, UserRecord},
    config::app::{AppConfig, FolderConfig},
    core::{
        folder::{self, NewFolder},
        item::{self, NewItem},
        user::{self, NewUser},
    },
    entities,
    errors::{Error, Result},
};
use chrono::NaiveDate;
use sea_orm::DatabaseConnection;
use std::{
    collections::HashMap,
    sync::{
        Arc, Mutex,
        atomic::{AtomicI64, AtomicUsize, Ordering},
    },
    time::Duration,
};

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Default application config with two folders and a 4 hour sync interval.
pub fn test_config() -> Arc<AppConfig> {
    Arc::new(AppConfig {
        folders: vec![
            FolderConfig {
                id: 1991,
                name: "Chips".to_string(),
                media_url: Some("http://x/chips".to_string()),
            },
            FolderConfig {
                id: 1998,
                name: "Speciaal".to_string(),
                media_url: None,
            },
        ],
        ..AppConfig::default()
    })
}

/// A user with a signed mandate.
///
/// # Defaults
/// * `first_name`: "Test"
/// * `last_name`: "Gebruiker"
/// * `date_of_birth`: 1999-12-31
pub fn test_new_user(id: i64, student_number: &str) -> NewUser {
    NewUser {
        id,
        student_number: student_number.to_string(),
        first_name: "Test".to_string(),
        last_name: "Gebruiker".to_string(),
        last_name_prefix: None,
        date_of_birth: NaiveDate::from_ymd_opt(1999, 12, 31).unwrap(),
        has_signed_mandate: true,
        profile_picture_url: None,
    }
}

/// Stores [`test_new_user`].
pub async fn create_test_user(
    db: &DatabaseConnection,
    id: i64,
    student_number: &str,
) -> Result<entities::user::Model> {
    user::create_user(db, test_new_user(id, student_number)).await
}

/// Registers a folder with media URL `http://x`.
pub async fn create_test_folder(
    db: &DatabaseConnection,
    id: i64,
    name: &str,
) -> Result<entities::folder::Model> {
    folder::create_folder(
        db,
        NewFolder {
            id,
            name: name.to_string(),
            media_url: Some("http://x".to_string()),
        },
    )
    .await
}

/// Stores a published item named "Testproduct" without media.
pub async fn create_test_item(
    db: &DatabaseConnection,
    id: i64,
    price: i64,
    folder_id: i64,
) -> Result<entities::item::Model> {
    item::create_item(
        db,
        NewItem {
            id,
            name: "Testproduct".to_string(),
            price,
            published: true,
            media_url: None,
            folder_id,
        },
    )
    .await
}

/// Remote member record matching [`test_new_user`], with the given mandate state.
pub fn test_user_record(id: i64, student_number: &str, signed: bool) -> UserRecord {
    UserRecord {
        id,
        student_number: student_number.to_string(),
        first_name: "Test".to_string(),
        last_name: "Gebruiker".to_string(),
        last_name_prefix: None,
        date_of_birth: NaiveDate::from_ymd_opt(1999, 12, 31).unwrap(),
        has_signed_mandate: signed,
        profile_picture_url: String::new(),
    }
}

/// Remote product record, published, with media.
pub fn test_item_record(id: i64, folder_id: i64, price: i64) -> ItemRecord {
    ItemRecord {
        id,
        name: format!("Product {id}"),
        price,
        published: true,
        media_url: format!("http://x/{id}.png"),
        folder_id,
        folder_name: None,
    }
}

/// What [`FakeCommerce::post_sale`] answers.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PostScript {
    /// Confirm with `quantity × price` of the stored product
    #[default]
    Confirm,
    /// Confirm with this total instead
    ConfirmWithTotal(i64),
    /// Confirm with two lines whose totals overflow `i64` when summed
    ConfirmOverflowingLines,
    /// Fail with [`Error::Timeout`]
    Timeout,
    /// Fail with [`Error::UserNotSigned`]
    MandateMissing,
    /// Fail with [`Error::Remote`] carrying this status
    HttpError(u16),
    /// Fail with [`Error::Unexpected`]
    Unexpected,
}

/// Scripted in-memory [`CommerceApi`] that counts its calls.
#[derive(Debug, Default)]
pub struct FakeCommerce {
    users: Mutex<HashMap<String, UserRecord>>,
    products: Mutex<HashMap<i64, ItemRecord>>,
    folder_fetch_fails: Mutex<bool>,
    post_script: Mutex<PostScript>,
    next_remote_id: AtomicI64,
    user_calls: AtomicUsize,
    product_calls: AtomicUsize,
    folder_calls: AtomicUsize,
    post_calls: AtomicUsize,
}

impl FakeCommerce {
    /// Empty fake that confirms every sale.
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Makes `fetch_user` find this member by student number.
    pub fn add_user(&self, record: UserRecord) {
        self.users
            .lock()
            .unwrap()
            .insert(record.student_number.clone(), record);
    }

    /// Adds or replaces a remote product.
    pub fn add_product(&self, record: ItemRecord) {
        self.products.lock().unwrap().insert(record.id, record);
    }

    /// Makes the product unknown to the remote.
    pub fn remove_product(&self, item_id: i64) {
        self.products.lock().unwrap().remove(&item_id);
    }

    /// Makes folder fetches time out until reset.
    pub fn fail_folder_fetch(&self, fail: bool) {
        *self.folder_fetch_fails.lock().unwrap() = fail;
    }

    /// Sets the answer for subsequent `post_sale` calls.
    pub fn script_post(&self, script: PostScript) {
        *self.post_script.lock().unwrap() = script;
    }

    /// Number of `fetch_user` calls so far.
    pub fn user_calls(&self) -> usize {
        self.user_calls.load(Ordering::SeqCst)
    }

    /// Number of `fetch_product` calls so far.
    pub fn product_calls(&self) -> usize {
        self.product_calls.load(Ordering::SeqCst)
    }

    /// Number of `fetch_products_in_folder` calls so far.
    pub fn folder_calls(&self) -> usize {
        self.folder_calls.load(Ordering::SeqCst)
    }

    /// Number of `post_sale` calls so far.
    pub fn post_calls(&self) -> usize {
        self.post_calls.load(Ordering::SeqCst)
    }

    fn confirm(&self, item_id: i64, quantity: i64, total: Option<i64>) -> SaleConfirmation {
        let price = self
            .products
            .lock()
            .unwrap()
            .get(&item_id)
            .map_or(0, |p| p.price);
        let remote_id = self.next_remote_id.fetch_add(1, Ordering::SeqCst) + 1000;
        SaleConfirmation {
            remote_id,
            reference: format!("S-{remote_id}"),
            created_at: NaiveDate::from_ymd_opt(2020, 10, 18)
                .unwrap()
                .and_hms_opt(12, 0, 0)
                .unwrap(),
            lines: vec![ConfirmedLine {
                product_id: Some(item_id),
                quantity: Some(quantity),
                price,
                total_price: total.unwrap_or(price * quantity),
            }],
        }
    }
}

impl CommerceApi for FakeCommerce {
    async fn fetch_user(
        &self,
        student_number: &str,
        _timeout: Option<Duration>,
    ) -> Result<UserRecord> {
        self.user_calls.fetch_add(1, Ordering::SeqCst);
        self.users
            .lock()
            .unwrap()
            .get(student_number)
            .cloned()
            .ok_or_else(|| Error::UserNotFound {
                student_number: student_number.to_string(),
            })
    }

    async fn fetch_product(&self, item_id: i64, _timeout: Option<Duration>) -> Result<ItemRecord> {
        self.product_calls.fetch_add(1, Ordering::SeqCst);
        self.products
            .lock()
            .unwrap()
            .get(&item_id)
            .cloned()
            .ok_or(Error::ItemNotFound { item_id })
    }

    async fn fetch_products_in_folder(
        &self,
        folder_id: i64,
        _timeout: Option<Duration>,
    ) -> Result<Vec<ItemRecord>> {
        self.folder_calls.fetch_add(1, Ordering::SeqCst);
        if *self.folder_fetch_fails.lock().unwrap() {
            return Err(Error::Timeout {
                message: format!("products in folder {folder_id}"),
            });
        }
        let mut items: Vec<ItemRecord> = self
            .products
            .lock()
            .unwrap()
            .values()
            .filter(|p| p.folder_id == folder_id)
            .cloned()
            .collect();
        if items.is_empty() {
            return Err(Error::FolderNotFound { folder_id });
        }
        items.sort_by_key(|p| p.id);
        Ok(items)
    }

    async fn post_sale(
        &self,
        _user_id: i64,
        item_id: i64,
        quantity: i64,
        _timeout: Option<Duration>,
    ) -> Result<SaleConfirmation> {
        self.post_calls.fetch_add(1, Ordering::SeqCst);
        let script = *self.post_script.lock().unwrap();
        match script {
            PostScript::Confirm => Ok(self.confirm(item_id, quantity, None)),
            PostScript::ConfirmWithTotal(total) => Ok(self.confirm(item_id, quantity, Some(total))),
            PostScript::ConfirmOverflowingLines => {
                let mut confirmation = self.confirm(item_id, quantity, Some(i64::MAX));
                confirmation.lines.push(ConfirmedLine {
                    product_id: Some(item_id),
                    quantity: Some(1),
                    price: 1,
                    total_price: 1,
                });
                Ok(confirmation)
            }
            PostScript::Timeout => Err(Error::Timeout {
                message: "POST /sales".to_string(),
            }),
            PostScript::MandateMissing => Err(Error::UserNotSigned {
                message: "User has no valid SDD mandate".to_string(),
            }),
            PostScript::HttpError(status) => Err(Error::Remote {
                status: Some(status),
                message: "rejected".to_string(),
            }),
            PostScript::Unexpected => Err(Error::Unexpected {
                message: "garbled response".to_string(),
            }),
        }
    }
}
