//! Sale entity - A local record of one purchase and the outcome of posting it.
//!
//! Sales keep denormalized snapshots (`item_name`, `user_student_number`) so the audit
//! trail survives deletion of the item or user. `total_price` is fixed at creation from
//! the local item price and later checked against the remote's confirmed total.

use crate::core::upsert::Stamped;
use sea_orm::{Set, entity::prelude::*};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Posting state of a sale. Everything except `NotPosted` is terminal.
#[derive(
    Copy, Clone, Debug, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
pub enum SaleStatus {
    /// Created locally, not yet sent to the remote
    #[sea_orm(string_value = "not_posted")]
    NotPosted,
    /// Confirmed remotely and the totals agree
    #[sea_orm(string_value = "ok")]
    Ok,
    /// Confirmed remotely but the remote total differs from the local one
    #[sea_orm(string_value = "ok_total_price_mismatch")]
    OkTotalPriceMismatch,
    /// No confirmation within the timeout; the remote may still have processed it
    #[sea_orm(string_value = "timeout")]
    Timeout,
    /// Rejected because the user has no signed direct-debit mandate
    #[sea_orm(string_value = "sdd_not_signed")]
    SddNotSigned,
    /// Rejected with any other HTTP or transport error
    #[sea_orm(string_value = "http_error")]
    HttpError,
    /// Failed for a reason outside the remote taxonomy
    #[sea_orm(string_value = "unknown_error")]
    UnknownError,
}

impl SaleStatus {
    /// Whether no further automatic transition can happen from this status.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        !matches!(self, Self::NotPosted)
    }

    /// Whether money changed hands remotely.
    #[must_use]
    pub const fn is_completed(self) -> bool {
        matches!(self, Self::Ok | Self::OkTotalPriceMismatch)
    }
}

impl fmt::Display for SaleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::NotPosted => "not_posted",
            Self::Ok => "ok",
            Self::OkTotalPriceMismatch => "ok_total_price_mismatch",
            Self::Timeout => "timeout",
            Self::SddNotSigned => "sdd_not_signed",
            Self::HttpError => "http_error",
            Self::UnknownError => "unknown_error",
        };
        f.write_str(text)
    }
}

/// Sale database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "sales")]
pub struct Model {
    /// Local identifier, unrelated to the remote sale id
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Number of units bought
    pub quantity: i64,
    /// `quantity × item.price` in cents at creation time
    pub total_price: i64,
    /// Item that was bought
    pub item_id: i64,
    /// Item name at creation time
    pub item_name: String,
    /// Buyer
    pub user_id: i64,
    /// Buyer's student number at creation time
    pub user_student_number: String,
    /// Posting state
    pub status: SaleStatus,
    /// Remote sale id, set on success
    pub remote_id: Option<i64>,
    /// Human-readable remote reference, set on success
    pub remote_reference: Option<String>,
    /// Creation time reported by the remote
    pub remote_created_at: Option<DateTime>,
    /// Failure or mismatch description
    pub error_message: Option<String>,
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
