//! User entity - A member mirrored from the remote commerce system.
//!
//! The `id` is assigned remotely and never changes once stored. `student_number`
//! is the login key and is unique. Users are created on their first successful
//! login and refreshed on every later one.

use crate::core::upsert::Stamped;
use sea_orm::{Set, entity::prelude::*};
use serde::{Deserialize, Serialize};

/// User database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
    /// Remote member id
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: i64,
    /// Student (or employee) number, used for login lookup
    #[sea_orm(unique)]
    pub student_number: String,
    /// Given name
    pub first_name: String,
    /// Family name without prefix
    pub last_name: String,
    /// Family name prefix (e.g. "van der")
    pub last_name_prefix: Option<String>,
    /// Date of birth
    pub date_of_birth: Date,
    /// Whether the user signed a direct-debit mandate
    pub has_signed_mandate: bool,
    /// Profile picture URL
    pub profile_picture_url: Option<String>,
    /// When the row was first stored
    pub created_at: DateTime,
    /// When the row was last written
    pub updated_at: DateTime,
}

/// Users are referenced by sales through a plain column, no relation is declared.
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
