//! Remote commerce client.
//!
//! [`CommerceApi`] is the seam between the controllers and the network. The production
//! implementation is [`CongressusClient`]; tests substitute an in-memory double.
//!
//! Every call takes an optional timeout. `None` means the client's configured default.

pub mod client;
pub mod records;

pub use client::CongressusClient;
pub use records::{ConfirmedLine, ItemRecord, SaleConfirmation, UserRecord};

use crate::errors::Result;
use std::{future::Future, sync::Arc, time::Duration};

/// Operations the controllers need from the remote commerce system.
pub trait CommerceApi {
    /// Looks a member up by student number.
    ///
    /// # Errors
    /// `UserNotFound` when no member has that student number.
    fn fetch_user(
        &self,
        student_number: &str,
        timeout: Option<Duration>,
    ) -> impl Future<Output = Result<UserRecord>> + Send;

    /// Fetches one product.
    ///
    /// # Errors
    /// `ItemNotFound` when the remote answers 404.
    fn fetch_product(
        &self,
        item_id: i64,
        timeout: Option<Duration>,
    ) -> impl Future<Output = Result<ItemRecord>> + Send;

    /// Fetches every product in a folder.
    ///
    /// # Errors
    /// `FolderNotFound` when the remote returns no products.
    fn fetch_products_in_folder(
        &self,
        folder_id: i64,
        timeout: Option<Duration>,
    ) -> impl Future<Output = Result<Vec<ItemRecord>>> + Send;

    /// Posts a single-line sale paid by direct debit.
    ///
    /// # Errors
    /// `UserNotSigned` when the buyer has no mandate, `Timeout` when no answer arrived in
    /// time, `Remote` for any other rejection.
    fn post_sale(
        &self,
        user_id: i64,
        item_id: i64,
        quantity: i64,
        timeout: Option<Duration>,
    ) -> impl Future<Output = Result<SaleConfirmation>> + Send;
}

impl<T: CommerceApi + Send + Sync> CommerceApi for Arc<T> {
    fn fetch_user(
        &self,
        student_number: &str,
        timeout: Option<Duration>,
    ) -> impl Future<Output = Result<UserRecord>> + Send {
        T::fetch_user(self, student_number, timeout)
    }

    fn fetch_product(
        &self,
        item_id: i64,
        timeout: Option<Duration>,
    ) -> impl Future<Output = Result<ItemRecord>> + Send {
        T::fetch_product(self, item_id, timeout)
    }

    fn fetch_products_in_folder(
        &self,
        folder_id: i64,
        timeout: Option<Duration>,
    ) -> impl Future<Output = Result<Vec<ItemRecord>>> + Send {
        T::fetch_products_in_folder(self, folder_id, timeout)
    }

    fn post_sale(
        &self,
        user_id: i64,
        item_id: i64,
        quantity: i64,
        timeout: Option<Duration>,
    ) -> impl Future<Output = Result<SaleConfirmation>> + Send {
        T::post_sale(self, user_id, item_id, quantity, timeout)
    }
}
