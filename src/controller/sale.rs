//! Sale creation and posting.
//!
//! A sale is created `NotPosted` from local snapshots of the item and user, then posted
//! to the remote exactly once. Whatever the remote answers, the terminal status is
//! written before `post_sale` returns or fails, so callers can always inspect it.

use crate::{
    api::{CommerceApi, SaleConfirmation},
    core::{
        item::get_item_by_id,
        sale::{self, NewSale, SaleChanges},
        user::get_user_by_id,
    },
    entities::{SaleStatus, sale::Model as Sale},
    errors::{Error, Result},
};
use sea_orm::DatabaseConnection;
use std::time::Duration;
use tracing::{info, instrument, warn};

/// The remote confirmed a different total than the one stored locally.
///
/// Not an error: the sale went through remotely. The text is kept in `error_message`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
#[error(
    "Total price mismatch for sale {sale_id}: stored {local} cents, remote confirmed {remote} cents"
)]
pub struct TotalPriceMismatch {
    /// Local sale id
    pub sale_id: i64,
    /// Stored `total_price`
    pub local: i64,
    /// Sum of the confirmed line totals
    pub remote: i64,
}

/// How a single post attempt ended.
#[derive(Debug)]
enum PostOutcome {
    Confirmed(SaleConfirmation),
    MandateMissing(Error),
    TimedOut(Error),
    Rejected(Error),
    Failed(Error),
}

impl PostOutcome {
    fn classify(result: Result<SaleConfirmation>) -> Self {
        match result {
            Ok(confirmation) => Self::Confirmed(confirmation),
            Err(e @ Error::UserNotSigned { .. }) => Self::MandateMissing(e),
            Err(e @ Error::Timeout { .. }) => Self::TimedOut(e),
            Err(e @ Error::Remote { .. }) => Self::Rejected(e),
            Err(e) => Self::Failed(e),
        }
    }
}

fn failure(status: SaleStatus, error: &Error) -> SaleChanges {
    SaleChanges {
        status: Some(status),
        error_message: Some(Some(error.to_string())),
        ..Default::default()
    }
}

fn confirmed(sale: &Sale, confirmation: SaleConfirmation) -> SaleChanges {
    let (status, error_message) = match confirmation.total_price() {
        Some(remote_total) if remote_total == sale.total_price => (SaleStatus::Ok, None),
        Some(remote_total) => {
            let mismatch = TotalPriceMismatch {
                sale_id: sale.id,
                local: sale.total_price,
                remote: remote_total,
            };
            warn!(%mismatch, "Remote total differs from local total");
            (SaleStatus::OkTotalPriceMismatch, Some(mismatch.to_string()))
        }
        None => {
            let message = format!(
                "Total price mismatch for sale {}: stored {} cents, remote confirmed line totals overflow",
                sale.id, sale.total_price
            );
            warn!(%message, "Remote line totals overflow");
            (SaleStatus::OkTotalPriceMismatch, Some(message))
        }
    };
    SaleChanges {
        status: Some(status),
        remote_id: Some(Some(confirmation.remote_id)),
        remote_reference: Some(Some(confirmation.reference)),
        remote_created_at: Some(Some(confirmation.created_at)),
        error_message: Some(error_message),
    }
}

/// Creates sales and drives them to a terminal status.
#[derive(Debug)]
pub struct SaleController<A> {
    db: DatabaseConnection,
    api: A,
}

impl<A: CommerceApi> SaleController<A> {
    /// Creates a controller over the local store and the remote API.
    pub const fn new(db: DatabaseConnection, api: A) -> Self {
        Self { db, api }
    }

    /// Stores a `NotPosted` sale with `total_price = quantity × item.price`.
    ///
    /// # Errors
    /// `InvalidQuantity` for a non-positive quantity or an overflowing total,
    /// `NotInDatabase` when the item or user is not stored locally, and
    /// `ItemNotPublished` for an unpublished item.
    #[instrument(skip(self))]
    pub async fn create_sale(&self, quantity: i64, item_id: i64, user_id: i64) -> Result<Sale> {
        if quantity <= 0 {
            return Err(Error::InvalidQuantity { quantity });
        }
        let item = get_item_by_id(&self.db, item_id)
            .await?
            .ok_or_else(|| Error::not_in_database("item", item_id))?;
        let user = get_user_by_id(&self.db, user_id)
            .await?
            .ok_or_else(|| Error::not_in_database("user", user_id))?;
        if !item.published {
            return Err(Error::ItemNotPublished { item_id });
        }
        let total_price = quantity
            .checked_mul(item.price)
            .ok_or(Error::InvalidQuantity { quantity })?;

        let sale = sale::create_sale(
            &self.db,
            NewSale {
                quantity,
                total_price,
                item_id,
                item_name: item.name,
                user_id,
                user_student_number: user.student_number,
            },
        )
        .await?;
        info!(sale_id = sale.id, total_price, "Sale created");
        Ok(sale)
    }

    /// Posts a `NotPosted` sale and stores the outcome.
    ///
    /// A total mismatch is recorded as `OkTotalPriceMismatch` and is not an error.
    ///
    /// # Errors
    /// `AlreadyPosted` when the sale has a terminal status; the remote is not contacted.
    /// Otherwise the remote error, after the matching terminal status is stored.
    #[instrument(skip(self))]
    pub async fn post_sale(&self, sale_id: i64, timeout: Option<Duration>) -> Result<Sale> {
        let sale = sale::get_sale_by_id(&self.db, sale_id)
            .await?
            .ok_or_else(|| Error::not_in_database("sale", sale_id))?;
        if sale.status.is_terminal() {
            return Err(Error::AlreadyPosted {
                sale_id,
                status: sale.status.to_string(),
            });
        }

        let result = self
            .api
            .post_sale(sale.user_id, sale.item_id, sale.quantity, timeout)
            .await;

        let (changes, error) = match PostOutcome::classify(result) {
            PostOutcome::Confirmed(confirmation) => (confirmed(&sale, confirmation), None),
            PostOutcome::MandateMissing(e) => (failure(SaleStatus::SddNotSigned, &e), Some(e)),
            PostOutcome::TimedOut(e) => (failure(SaleStatus::Timeout, &e), Some(e)),
            PostOutcome::Rejected(e) => (failure(SaleStatus::HttpError, &e), Some(e)),
            PostOutcome::Failed(e) => (failure(SaleStatus::UnknownError, &e), Some(e)),
        };

        let posted = sale::update_sale(&self.db, sale_id, changes).await?;
        match error {
            None => {
                info!(status = %posted.status, remote_id = ?posted.remote_id, "Sale posted");
                Ok(posted)
            }
            Some(e) => {
                warn!(status = %posted.status, error = %e, "Sale post failed");
                Err(e)
            }
        }
    }
}
