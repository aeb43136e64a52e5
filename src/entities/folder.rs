//! Folder entity - A product category mirrored from the remote commerce system.
//!
//! `synchronized_at` records the last successful item sync. New folders start at
//! [`never_synchronized`] so the first load always reaches the remote.

use crate::core::upsert::Stamped;
use chrono::NaiveDate;
use sea_orm::{Set, entity::prelude::*};
use serde::{Deserialize, Serialize};

/// Folder database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "folders")]
pub struct Model {
    /// Remote folder (category) id
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: i64,
    /// Display name (e.g. "Chips", "Frisdrank")
    pub name: String,
    /// Image URL shown on the folder tab
    pub media_url: Option<String>,
    /// Last successful item sync
    pub synchronized_at: DateTime,
    /// When the row was first stored
    pub created_at: DateTime,
    /// When the row was last written
    pub updated_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

/// The earliest instant stored for `synchronized_at`, meaning "never synchronized".
///
/// Year 1 rather than `NaiveDateTime::MIN`, which does not survive SQLite's text storage.
#[must_use]
pub fn never_synchronized() -> DateTime {
    NaiveDate::from_ymd_opt(1, 1, 1)
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .unwrap_or_default()
}

impl Stamped for ActiveModel {
    fn stamp_insert(&mut self, now: DateTime) {
        self.created_at = Set(now);
        self.updated_at = Set(now);
        if self.synchronized_at.is_not_set() {
            self.synchronized_at = Set(never_synchronized());
        }
    }

    fn stamp_update(&mut self, now: DateTime) {
        self.updated_at = Set(now);
    }
}
