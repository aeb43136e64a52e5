//! Item entity - A purchasable product belonging to one folder.
//!
//! Every field is overwritten from the remote on each folder sync, local edits are
//! never authoritative. Prices are integer cents.

use crate::core::upsert::Stamped;
use sea_orm::{Set, entity::prelude::*};
use serde::{Deserialize, Serialize};

/// Item database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "items")]
pub struct Model {
    /// Remote product id
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: i64,
    /// Product name
    pub name: String,
    /// Unit price in cents
    pub price: i64,
    /// Unpublished items are not orderable
    pub published: bool,
    /// Product image URL
    pub media_url: Option<String>,
    /// Owning folder. Not a foreign key, deleting the folder leaves the item alone.
    pub folder_id: i64,
    /// When the row was first stored
    pub created_at: DateTime,
    /// When the row was last written
    pub updated_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Stamped for ActiveModel {
    fn stamp_insert(&mut self, now: DateTime) {
        self.created_at = Set(now);
        self.updated_at = Set(now);
    }

    fn stamp_update(&mut self, now: DateTime) {
        self.updated_at = Set(now);
    }
}
